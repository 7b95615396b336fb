//! Application state shared by the HTTP handlers

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ChainController, WorkflowState};

/// Default cap on uploaded document size (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state
///
/// The server drives one workflow. Handlers hold the lock for the whole
/// operation, so step invocations are strictly sequential.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ChainController>,
    pub workflow: Arc<Mutex<WorkflowState>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(controller: Arc<ChainController>, initial: WorkflowState) -> Self {
        Self {
            controller,
            workflow: Arc::new(Mutex::new(initial)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
