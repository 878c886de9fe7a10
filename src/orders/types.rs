//! Order request types.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_AMOUNT: &str = "1.00";

/// One entry of the browser's cart. Both fields may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CartItem {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: Option<String>,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub cart: Vec<CartItem>,
}

/// Accept `"10.00"` as well as a bare JSON number, kept as its decimal text.
fn amount_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "amount must be a string or number, got {}",
                other
            )))
        }
    })
}

/// The single purchase unit sent to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub currency: String,
    pub amount: String,
}

/// Pick currency and amount from the first cart item.
///
/// Later items are ignored. Missing values fall back to `USD` / `1.00`
/// independently; present values are passed through untouched.
pub fn resolve_line_item(cart: &[CartItem]) -> LineItem {
    let first = cart.first();
    LineItem {
        currency: first
            .and_then(|item| item.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        amount: first
            .and_then(|item| item.amount.clone())
            .unwrap_or_else(|| DEFAULT_AMOUNT.to_string()),
    }
}

/// Checkout intent. Only capture-on-completion is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutPaymentIntent {
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountWithBreakdown {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseUnitRequest {
    pub amount: AmountWithBreakdown,
}

/// Processor-side create-order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub intent: CheckoutPaymentIntent,
    pub purchase_units: Vec<PurchaseUnitRequest>,
}

impl OrderRequest {
    /// Capture-intent order with one purchase unit.
    pub fn capture(item: &LineItem) -> Self {
        Self {
            intent: CheckoutPaymentIntent::Capture,
            purchase_units: vec![PurchaseUnitRequest {
                amount: AmountWithBreakdown {
                    currency_code: item.currency.clone(),
                    value: item.amount.clone(),
                },
            }],
        }
    }
}
