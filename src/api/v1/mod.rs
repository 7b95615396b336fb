//! v1 API endpoints

pub mod chain;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/chain", get(chain::get_chain))
        .route("/chain/credentials", put(chain::put_credentials))
        .route(
            "/chain/document",
            put(chain::put_document).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/chain/steps/{step}", post(chain::run_step))
        .route("/chain/run", post(chain::run_chain))
        .route("/chain/reset", post(chain::reset_chain))
        .route("/chain/artifact", get(chain::get_artifact))
}
