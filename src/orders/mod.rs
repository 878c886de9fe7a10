//! Order lifecycle, delegated to the payment processor.
//!
//! # Data Flow
//! ```text
//! POST /orders {cart}
//!     → types.rs (resolve_line_item: first item or USD/1.00)
//!     → gateway.rs (span, log, counter)
//!     → processor.rs (OrderProcessor trait)
//!     → paypal.rs (OAuth token + Orders v2 REST)
//! ```

pub mod gateway;
pub mod paypal;
pub mod processor;
pub mod types;

pub use gateway::{OrderError, OrderGateway};
pub use paypal::PaypalClient;
pub use processor::{OrderProcessor, ProcessorError};
pub use types::{resolve_line_item, CartItem, CreateOrderRequest, LineItem, OrderRequest};
