//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{ConsumerConfig, ConsumerKind, PipelineBlueprint};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading blueprint");
            if !path.exists() {
                anyhow::bail!("Blueprint file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load blueprint from {}", path.display()))?
        }
        None => {
            info!("No blueprint given, using default consumers");
            default_blueprint()
        }
    };

    apply_overrides(&mut blueprint, args);

    info!(
        limit = blueprint.batch.limit,
        open_marker = %blueprint.batch.open_marker,
        close_marker = %blueprint.batch.close_marker,
        consumers = blueprint.consumers.len(),
        "Blueprint loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - blueprint is valid, exiting");
        print_blueprint_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        input: args.input.clone(),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let pipeline = Pipeline::new(pipeline_config);
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    tokio::select! {
        result = pipeline.run() => {
            let stats = result.context("Pipeline execution failed")?;
            info!(
                lines = stats.lines,
                batches = stats.batches,
                commands = stats.commands,
                duration_secs = stats.duration.as_secs_f64(),
                "Pipeline completed successfully"
            );
            stats.print_summary();
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("bulkline finished");
    Ok(())
}

/// Default consumer set: one console writer and a pair of file writers
fn default_blueprint() -> PipelineBlueprint {
    PipelineBlueprint {
        batch: Default::default(),
        consumers: vec![
            ConsumerConfig {
                name: "console".to_string(),
                kind: ConsumerKind::Console,
                worker_count: 1,
                queue_capacity: 64,
                params: Default::default(),
            },
            ConsumerConfig {
                name: "file".to_string(),
                kind: ConsumerKind::File,
                worker_count: 2,
                queue_capacity: 64,
                params: Default::default(),
            },
        ],
    }
}

fn apply_overrides(blueprint: &mut PipelineBlueprint, args: &RunArgs) {
    if let Some(limit) = args.limit {
        blueprint.batch.limit = limit;
    }
    if let Some(capacity) = args.queue_capacity {
        info!(capacity, "Overriding queue capacity from CLI");
        for consumer in &mut blueprint.consumers {
            consumer.queue_capacity = capacity;
        }
    }
    for consumer in &mut blueprint.consumers {
        if consumer.kind == ConsumerKind::File && !consumer.params.contains_key("dir") {
            consumer.params.insert(
                "dir".to_string(),
                args.output_dir.display().to_string(),
            );
        }
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print blueprint summary for dry-run mode
fn print_blueprint_summary(blueprint: &PipelineBlueprint) {
    println!("\n=== Blueprint Summary ===\n");
    println!("Batch:");
    if blueprint.batch.limit == 0 {
        println!("  Limit: unlimited (single batch per stream)");
    } else {
        println!("  Limit: {}", blueprint.batch.limit);
    }
    println!(
        "  Markers: '{}' / '{}'",
        blueprint.batch.open_marker, blueprint.batch.close_marker
    );

    println!("\nConsumers ({}):", blueprint.consumers.len());
    for consumer in &blueprint.consumers {
        println!(
            "  - {} ({:?}) - {} workers, queue capacity {}",
            consumer.name, consumer.kind, consumer.worker_count, consumer.queue_capacity
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse_run(args: &[&str]) -> RunArgs {
        let cli = Cli::parse_from(args.iter().copied());
        match cli.command {
            crate::cli::Commands::Run(run) => run,
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_limit_override_applies() {
        let args = parse_run(&["bulkline", "run", "3"]);
        let mut bp = default_blueprint();
        apply_overrides(&mut bp, &args);
        assert_eq!(bp.batch.limit, 3);
    }

    #[test]
    fn test_output_dir_fills_missing_file_params() {
        let args = parse_run(&["bulkline", "run", "--output-dir", "/tmp/out"]);
        let mut bp = default_blueprint();
        apply_overrides(&mut bp, &args);

        let file = &bp.consumers[1];
        assert_eq!(file.params.get("dir").map(String::as_str), Some("/tmp/out"));
        // Console consumers take no params
        assert!(bp.consumers[0].params.is_empty());
    }

    #[test]
    fn test_explicit_dir_param_wins_over_output_dir() {
        let args = parse_run(&["bulkline", "run", "--output-dir", "/tmp/out"]);
        let mut bp = default_blueprint();
        bp.consumers[1]
            .params
            .insert("dir".to_string(), "/var/log/bulk".to_string());
        apply_overrides(&mut bp, &args);

        assert_eq!(
            bp.consumers[1].params.get("dir").map(String::as_str),
            Some("/var/log/bulk")
        );
    }

    #[test]
    fn test_queue_capacity_override_hits_every_consumer() {
        let args = parse_run(&["bulkline", "run", "--queue-capacity", "8"]);
        let mut bp = default_blueprint();
        apply_overrides(&mut bp, &args);
        assert!(bp.consumers.iter().all(|c| c.queue_capacity == 8));
    }

    #[test]
    fn test_default_blueprint_is_valid() {
        let bp = default_blueprint();
        assert_eq!(bp.consumers[0].worker_count, 1);
        assert_eq!(bp.consumers[1].worker_count, 2);
        assert!(config_loader::validate(&bp).is_ok());
    }
}
