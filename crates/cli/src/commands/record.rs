//! `record` command implementation.

use anyhow::{Context, Result};
use dispatcher::{validator, EventClient};
use tracing::info;

use crate::cli::RecordArgs;
use crate::error::CliError;
use crate::session::{print_outcome, Session};

use super::{load_config, parse_json, read_json_file};

/// Execute the `record` command
pub async fn run_record(args: &RecordArgs) -> Result<()> {
    let config = load_config(&args.config.config)?;

    let properties = match (&args.properties, &args.properties_file) {
        (Some(inline), _) => parse_json("--properties", inline)?,
        (None, Some(path)) => read_json_file(path)?,
        (None, None) => anyhow::bail!("either --properties or --properties-file is required"),
    };

    let client = EventClient::new(config).context("Failed to build event client")?;
    info!(
        collection = %args.collection,
        transport = client.transport_name(),
        "Recording event"
    );

    if args.dry_run {
        client.gate().check()?;
        let request = validator::validate_single(&args.collection, properties)?;
        let mut descriptor = client.request_builder().build_single(&request)?;
        descriptor.headers.authorization = client.config().write_key.redacted();
        println!(
            "{}",
            serde_json::to_string_pretty(&descriptor).context("Failed to render request")?
        );
        return Ok(());
    }

    let mut session = Session::new(client);
    let outcome = session.record_event(&args.collection, properties).await;
    let printed = print_outcome(&outcome);
    session.print_summary();

    printed.map_err(|e| CliError::dispatch_failed(e.to_string()).into())
}
