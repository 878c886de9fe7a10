//! Checkout gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │               CHECKOUT GATEWAY               │
//!                      │                                              │
//!   Browser            │  ┌──────────┐   ┌───────────────┐            │
//!   ───────────────────┼─▶│   http   │──▶│ order gateway │────────────┼──▶ PayPal
//!                      │  │  server  │   └───────┬───────┘            │    Orders v2
//!                      │  │          │           │ counters           │
//!                      │  │          │   ┌───────▼───────┐            │
//!                      │  │          │──▶│ metrics       │──export────┼──▶ OTLP
//!                      │  │          │   │ registry      │            │    collector
//!                      │  │          │   └───────────────┘            │      ▲
//!                      │  │          │   ┌───────────────┐            │      │
//!                      │  │          │──▶│ telemetry     │──relay─────┼──────┘
//!                      │  └────┬─────┘   │ relay         │            │
//!                      │       │         └───────────────┘            │
//!                      │       ▼ static files (fallback)              │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use checkout_gateway::config;
use checkout_gateway::lifecycle::{signals, startup};

#[derive(Parser)]
#[command(name = "checkout-gateway")]
#[command(about = "PayPal checkout backend with an OTLP relay", long_about = None)]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // a missing .env is normal outside development
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // logging is not up yet; config errors go straight to stderr
    let config = match config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("checkout-gateway: {}", e);
            std::process::exit(2);
        }
    };

    startup::run(config, signals::shutdown_signal()).await
}
