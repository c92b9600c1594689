//! Command implementations for the precis CLI.

pub mod ask;
pub mod chat;
pub mod results;

use anyhow::Context;
use precis_models::ModelFactory;
use precis_orchestrator::{SummarizeClient, SummarizeOrchestrator};
use std::sync::Arc;
use tracing::debug;

use crate::config::PrecisConfig;

/// Builds an orchestrator from the merged configuration.
pub fn build_orchestrator(
    config: &PrecisConfig,
    specific_model: bool,
) -> anyhow::Result<SummarizeOrchestrator> {
    let model_config = config.model_config().context("Invalid model configuration")?;
    let model = ModelFactory::create(model_config).context("Failed to create model")?;
    let summarizer = Arc::new(SummarizeClient::new(config.summarize_base_url()));

    let mut orchestrator_config = config.orchestrator_config();
    orchestrator_config.specific_model |= specific_model;

    debug!(
        model_id = %model.model_id(),
        summarize_base_url = %summarizer.base_url(),
        specific_model = orchestrator_config.specific_model,
        "Orchestrator ready"
    );

    Ok(SummarizeOrchestrator::new(model, summarizer, orchestrator_config))
}
