//! Blueprint validation.
//!
//! Rules:
//! - batch markers non-empty and distinct from each other
//! - consumer names non-empty and unique
//! - worker_count > 0
//! - queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint};

/// Validate a pipeline blueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_markers(blueprint)?;
    validate_consumer_names(blueprint)?;
    validate_consumer_sizes(blueprint)?;
    Ok(())
}

fn validate_markers(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let batch = &blueprint.batch;
    if batch.open_marker.trim().is_empty() {
        return Err(ContractError::config_validation(
            "batch.open_marker",
            "marker cannot be empty",
        ));
    }
    if batch.close_marker.trim().is_empty() {
        return Err(ContractError::config_validation(
            "batch.close_marker",
            "marker cannot be empty",
        ));
    }
    if batch.open_marker.trim() == batch.close_marker.trim() {
        return Err(ContractError::config_validation(
            "batch.close_marker",
            format!(
                "open and close markers must differ, both are '{}'",
                batch.open_marker.trim()
            ),
        ));
    }
    Ok(())
}

fn validate_consumer_names(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, consumer) in blueprint.consumers.iter().enumerate() {
        if consumer.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("consumers[{idx}].name"),
                "consumer name cannot be empty",
            ));
        }
        if !seen.insert(&consumer.name) {
            return Err(ContractError::config_validation(
                format!("consumers[name={}]", consumer.name),
                "duplicate consumer name",
            ));
        }
    }
    Ok(())
}

fn validate_consumer_sizes(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    for consumer in &blueprint.consumers {
        if consumer.worker_count == 0 {
            return Err(ContractError::config_validation(
                format!("consumers[{}].worker_count", consumer.name),
                "worker_count must be > 0",
            ));
        }
        if consumer.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("consumers[{}].queue_capacity", consumer.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}
