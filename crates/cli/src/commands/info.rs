//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ClientConfig;
use dispatcher::RequestBuilder;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

use super::load_config;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ClientInfo {
    project_id: String,
    host: String,
    protocol: String,
    transport: String,
    write_key: String,
    endpoints: EndpointInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<RetryInfo>,
}

#[derive(Serialize)]
struct EndpointInfo {
    batch: String,
    single: String,
}

#[derive(Serialize)]
struct RetryInfo {
    max_attempts: u32,
    base_backoff_ms: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let path = &args.config.config;
    info!(config = %path.display(), "Loading configuration info");

    let config = load_config(path)?;
    let info = build_client_info(&config)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize client info")?;
        println!("{}", json);
    } else {
        print_client_info(&info);
    }

    Ok(())
}

fn build_client_info(config: &ClientConfig) -> Result<ClientInfo> {
    let builder = RequestBuilder::new(config).context("Failed to resolve endpoints")?;
    let transport = if config.transport_mode.is_legacy() {
        "xhr (deprecated)"
    } else {
        "fetch"
    };

    Ok(ClientInfo {
        project_id: config.project_id.clone(),
        host: config.host.clone(),
        protocol: config.protocol.to_string(),
        transport: transport.to_string(),
        write_key: config.write_key.redacted(),
        endpoints: EndpointInfo {
            batch: builder.events_url(None).to_string(),
            single: format!("{}/{{collection}}", builder.events_url(None)),
        },
        timeout_ms: config.timeout_ms,
        retry: config.retry.map(|r| RetryInfo {
            max_attempts: r.max_attempts,
            base_backoff_ms: r.base_backoff_ms,
        }),
    })
}

fn print_client_info(info: &ClientInfo) {
    println!("eventwire client");
    println!("   ├─ Project: {}", info.project_id);
    println!("   ├─ Host: {}://{}", info.protocol, info.host);
    println!("   ├─ Transport: {}", info.transport);
    println!("   ├─ Write key: {}", info.write_key);
    match info.timeout_ms {
        Some(ms) => println!("   ├─ Timeout: {} ms", ms),
        None => println!("   ├─ Timeout: none"),
    }
    match &info.retry {
        Some(retry) => println!(
            "   └─ Retry: {} attempts, {} ms base backoff",
            retry.max_attempts, retry.base_backoff_ms
        ),
        None => println!("   └─ Retry: disabled"),
    }

    println!("\nEndpoints");
    println!("   ├─ Batch:  POST {}", info.endpoints.batch);
    println!("   └─ Single: POST {}", info.endpoints.single);
    println!();
}
