//! PMP Prompt Chain
//!
//! Step-gated prompt chaining over an uploaded document:
//! - A document is uploaded once and seeds a stateful conversation
//! - Three steps run in order, each gated on the previous result
//! - Re-running a step invalidates every later result
//! - The final result is offered as a downloadable artifact

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{ChainController, Credentials, SessionInitializer, WorkflowState};
use tracing::info;

/// Build the chain controller backed by the configured Gemini service
pub fn build_controller(config: &AppConfig) -> anyhow::Result<ChainController> {
    let factory = Arc::new(config.gemini.service_factory());
    let initializer = SessionInitializer::with_poll_config(factory, config.chain.poll_config());
    let controller_config = config.chain.controller_config()?;

    info!(
        model = %config.gemini.model,
        reuse_session_on_rerun = controller_config.reuse_session_on_rerun,
        "Chain controller configured"
    );

    Ok(ChainController::with_config(initializer, controller_config))
}

/// Initial workflow state, preloaded with a configured API key if any
pub fn initial_workflow(config: &AppConfig) -> anyhow::Result<WorkflowState> {
    let state = WorkflowState::new();

    match config.gemini.resolve_api_key() {
        Some(key) => {
            info!("Using preconfigured Gemini API key");
            Ok(state.with_credentials(Credentials::new(key)?))
        }
        None => Ok(state),
    }
}

/// Create the application state with default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default())
}

/// Create the application state with custom configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let controller = Arc::new(build_controller(config)?);
    let workflow = initial_workflow(config)?;

    Ok(AppState::new(controller, workflow).with_max_upload_bytes(config.server.max_upload_bytes))
}
