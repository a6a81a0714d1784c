//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Blueprint info for JSON output
#[derive(Serialize)]
struct BlueprintInfo {
    batch: BatchInfo,
    consumers: Vec<ConsumerInfo>,
}

#[derive(Serialize)]
struct BatchInfo {
    limit: usize,
    open_marker: String,
    close_marker: String,
}

#[derive(Serialize)]
struct ConsumerInfo {
    name: String,
    kind: String,
    worker_count: usize,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint info");

    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    if args.json {
        let info = build_blueprint_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize blueprint info")?;
        println!("{}", json);
    } else {
        print_blueprint_info(&blueprint, args);
    }

    Ok(())
}

fn build_blueprint_info(blueprint: &contracts::PipelineBlueprint, args: &InfoArgs) -> BlueprintInfo {
    let consumers = blueprint
        .consumers
        .iter()
        .map(|c| ConsumerInfo {
            name: c.name.clone(),
            kind: format!("{:?}", c.kind),
            worker_count: c.worker_count,
            queue_capacity: c.queue_capacity,
            params: if args.params {
                c.params.clone()
            } else {
                Default::default()
            },
        })
        .collect();

    BlueprintInfo {
        batch: BatchInfo {
            limit: blueprint.batch.limit,
            open_marker: blueprint.batch.open_marker.clone(),
            close_marker: blueprint.batch.close_marker.clone(),
        },
        consumers,
    }
}

fn print_blueprint_info(blueprint: &contracts::PipelineBlueprint, args: &InfoArgs) {
    println!("=== Bulkline Blueprint ===\n");

    println!("Batch");
    if blueprint.batch.limit == 0 {
        println!("   ├─ Limit: unlimited");
    } else {
        println!("   ├─ Limit: {}", blueprint.batch.limit);
    }
    println!("   ├─ Open marker: '{}'", blueprint.batch.open_marker);
    println!("   └─ Close marker: '{}'", blueprint.batch.close_marker);

    println!("\nConsumers ({})", blueprint.consumers.len());
    for (i, consumer) in blueprint.consumers.iter().enumerate() {
        let is_last = i == blueprint.consumers.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} ({:?}) - {} workers, queue capacity {}",
            prefix, consumer.name, consumer.kind, consumer.worker_count, consumer.queue_capacity
        );

        if args.params && !consumer.params.is_empty() {
            for (j, (key, value)) in consumer.params.iter().enumerate() {
                let param_is_last = j == consumer.params.len() - 1;
                let param_prefix = if param_is_last { "└─" } else { "├─" };
                println!("   {}  {} {} = {}", child_prefix, param_prefix, key, value);
            }
        }
    }

    println!();
}
