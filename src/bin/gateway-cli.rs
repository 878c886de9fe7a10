use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Smoke-test CLI for a running checkout gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the PayPal client id the gateway hands to browsers
    ClientId,
    /// Create a single-item order
    CreateOrder {
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long, default_value = "1.00")]
        amount: String,
    },
    /// Capture an approved order
    Capture {
        order_id: String,
    },
    /// Post a UI metric event
    Metric {
        name: String,
        #[arg(long, default_value_t = 1.0)]
        value: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::ClientId => client.get(format!("{}/clientid", base)).send().await?,
        Commands::CreateOrder { currency, amount } => {
            client
                .post(format!("{}/orders", base))
                .json(&json!({ "cart": [{ "currency": currency, "amount": amount }] }))
                .send()
                .await?
        }
        Commands::Capture { order_id } => {
            client
                .post(format!("{}/capture/{}", base, order_id))
                .send()
                .await?
        }
        Commands::Metric { name, value } => {
            client
                .post(format!("{}/ui/metric", base))
                .json(&json!({ "name": name, "value": value, "attrs": { "source": "gateway-cli" } }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
