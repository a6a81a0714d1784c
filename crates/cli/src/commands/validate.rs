//! `validate` command implementation.

use anyhow::{Context, Result};
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
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<BlueprintSummary>,
}

#[derive(Serialize)]
struct BlueprintSummary {
    batch_limit: usize,
    open_marker: String,
    close_marker: String,
    consumer_count: usize,
    worker_total: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating blueprint");

    let result = validate_blueprint(args);

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
        anyhow::bail!("Blueprint validation failed")
    }
}

fn validate_blueprint(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let worker_total = blueprint.consumers.iter().map(|c| c.worker_count).sum();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(BlueprintSummary {
                    batch_limit: blueprint.batch.limit,
                    open_marker: blueprint.batch.open_marker.clone(),
                    close_marker: blueprint.batch.close_marker.clone(),
                    consumer_count: blueprint.consumers.len(),
                    worker_total,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect blueprint warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.consumers.is_empty() {
        warnings.push("No consumers configured - batches will be dropped".to_string());
    }

    if blueprint.batch.limit == 0 {
        warnings.push(
            "batch.limit is 0 - batches close only on delimiters or end of stream".to_string(),
        );
    }

    for consumer in &blueprint.consumers {
        if consumer.kind == contracts::ConsumerKind::File && !consumer.params.contains_key("dir") {
            warnings.push(format!(
                "Consumer '{}' has no 'dir' param - log files go to the working directory",
                consumer.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Blueprint is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Batch limit: {}", summary.batch_limit);
            println!(
                "  Markers: '{}' / '{}'",
                summary.open_marker, summary.close_marker
            );
            println!("  Consumers: {}", summary.consumer_count);
            println!("  Workers: {}", summary.worker_total);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Blueprint is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {
            config: "/definitely/not/here.toml".into(),
            json: false,
        };
        let result = validate_blueprint(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_validate_good_blueprint_with_warnings() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[[consumers]]\nname = \"file\"\nkind = \"file\"\nworker_count = 2"
        )
        .unwrap();

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        let result = validate_blueprint(&args);
        assert!(result.valid);

        let summary = result.summary.unwrap();
        assert_eq!(summary.consumer_count, 1);
        assert_eq!(summary.worker_total, 2);

        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("batch.limit is 0")));
        assert!(warnings.iter().any(|w| w.contains("'dir' param")));
    }
}
