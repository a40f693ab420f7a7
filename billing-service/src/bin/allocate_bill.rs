use anyhow::{bail, Context, Result};
use billing_client::{domain::AllocationRequest, BillingApi};
use billing_service::{config::AppConfig, observability, service};
use std::env;

/// Splits one bill and prints the result as JSON.
///
/// usage: allocate_bill <request.json> [--remote]
///
/// With `--remote` the split is computed by the remote API instead of locally.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!("usage: allocate_bill <request.json> [--remote]");
    };
    let remote = args.iter().any(|a| a == "--remote");

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let request: AllocationRequest =
        serde_json::from_str(&contents).with_context(|| format!("invalid request in {path}"))?;

    let cfg = AppConfig::load()?;
    let api = cfg.api_client()?;

    let result = if remote {
        api.calculate(&request).await?
    } else {
        service::allocate(&api, &cfg.allocation, &request).await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
