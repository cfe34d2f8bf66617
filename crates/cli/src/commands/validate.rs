//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ClientConfig, Protocol};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    project_id: String,
    host: String,
    protocol: String,
    transport_mode: String,
    write_key: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let path = &args.config.config;
    info!(config = %path.display(), "Validating configuration");

    let result = validate_config(path);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(path: &std::path::Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", path.display())),
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_with_env(path) {
        Ok(config) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&config),
            summary: Some(ConfigSummary {
                project_id: config.project_id.clone(),
                host: config.host.clone(),
                protocol: config.protocol.to_string(),
                transport_mode: format!("{:?}", config.transport_mode).to_lowercase(),
                write_key: config.write_key.redacted(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ClientConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.transport_mode.is_legacy() {
        warnings.push(
            "transport_mode = \"legacy\" selects the deprecated callback transport".to_string(),
        );
    }

    if config.protocol == Protocol::Http {
        warnings.push("protocol is http: the write key is sent unencrypted".to_string());
    }

    if config.retry.is_some() && config.transport_mode.is_legacy() {
        warnings.push("retry is ignored by the legacy transport".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Project: {}", summary.project_id);
            println!("  Host: {}://{}", summary.protocol, summary.host);
            println!("  Transport: {}", summary.transport_mode);
            println!("  Write key: {}", summary.write_key);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
