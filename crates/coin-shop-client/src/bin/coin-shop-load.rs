//! Coin Shop load generator.
//!
//! Configured through environment variables:
//!
//! - `COIN_SHOP_URL` (default `http://localhost:8080`)
//! - `LOAD_USERNAME` / `LOAD_PASSWORD` (default `load-user` / `load-password`)
//! - `LOAD_TARGET`: `info` or `buy:<item>` (default `info`)
//! - `LOAD_RPS` (default 1000)
//! - `LOAD_DURATION_SECONDS` (default 10)
//! - `LOAD_WARMUP_PURCHASES`: comma-separated items bought first (default `cup,cup,cup,cup`)

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coin_shop_client::{load, CoinShopClient, LoadConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.into());

    let defaults = LoadConfig::default();
    let config = LoadConfig {
        target: var("LOAD_TARGET", "info").parse()?,
        requests_per_second: var("LOAD_RPS", "1000").parse()?,
        duration: Duration::from_secs(var("LOAD_DURATION_SECONDS", "10").parse()?),
        warmup_purchases: std::env::var("LOAD_WARMUP_PURCHASES")
            .map(|items| {
                items
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.warmup_purchases),
    };

    let mut client = CoinShopClient::new(var("COIN_SHOP_URL", "http://localhost:8080"))?;
    client
        .authenticate(
            var("LOAD_USERNAME", "load-user"),
            var("LOAD_PASSWORD", "load-password"),
        )
        .await?;

    let report = load::run(&client, &config).await?;
    println!("{report}");

    Ok(())
}
