//! `batch` command implementation.

use anyhow::{Context, Result};
use dispatcher::{validator, EventClient};
use tracing::info;

use crate::cli::BatchArgs;
use crate::error::CliError;
use crate::session::{print_outcome, Session};

use super::{load_config, read_json_file};

/// Execute the `batch` command
pub async fn run_batch(args: &BatchArgs) -> Result<()> {
    let config = load_config(&args.config.config)?;
    let batch = read_json_file(&args.file)?;

    let client = EventClient::new(config).context("Failed to build event client")?;
    info!(
        file = %args.file.display(),
        transport = client.transport_name(),
        "Recording batch"
    );

    if args.dry_run {
        client.gate().check()?;
        let request = validator::validate_batch(batch)?;
        info!(
            collections = request.len(),
            events = request.event_count(),
            "Batch is valid"
        );
        let mut descriptor = client.request_builder().build_batch(&request)?;
        descriptor.headers.authorization = client.config().write_key.redacted();
        println!(
            "{}",
            serde_json::to_string_pretty(&descriptor).context("Failed to render request")?
        );
        return Ok(());
    }

    let mut session = Session::new(client);
    let outcome = session.record_events(batch).await;
    let printed = print_outcome(&outcome);
    session.print_summary();

    printed.map_err(|e| CliError::dispatch_failed(e.to_string()).into())
}
