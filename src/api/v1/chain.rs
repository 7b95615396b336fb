//! Chain endpoints - credentials, document upload, step execution, artifact

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ArtifactQuery, ChainStateResponse, CredentialsRequest, Json, StepRequestBody,
};
use crate::domain::{Artifact, Credentials, Document, WorkflowState};

fn state_view(app: &AppState, workflow: &WorkflowState) -> Json<ChainStateResponse> {
    Json(ChainStateResponse::from_state(
        workflow,
        app.controller.definitions(),
    ))
}

/// GET /v1/chain
pub async fn get_chain(State(app): State<AppState>) -> Json<ChainStateResponse> {
    let workflow = app.workflow.lock().await;
    state_view(&app, &workflow)
}

/// PUT /v1/chain/credentials
///
/// A different key discards the session and every result.
pub async fn put_credentials(
    State(app): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<ChainStateResponse>, ApiError> {
    let credentials = Credentials::new(request.api_key)?;

    let mut workflow = app.workflow.lock().await;
    *workflow = workflow.clone().with_credentials(credentials);

    info!("API key supplied");

    Ok(state_view(&app, &workflow))
}

/// PUT /v1/chain/document
///
/// Accepts a multipart form with the document in a field named `file`.
pub async fn put_document(
    State(app): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChainStateResponse>, ApiError> {
    let mut document = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let mut parsed = Document::new(file_name, data)?;
        if let Some(mime) = content_type.filter(|m| m != "application/octet-stream") {
            parsed = parsed.with_mime_type(mime);
        }
        document = Some(parsed);
        break;
    }

    let document =
        document.ok_or_else(|| ApiError::bad_request("Missing multipart field 'file'").with_param("file"))?;

    info!(
        document = %document.display_name(),
        size_bytes = document.size_bytes(),
        "Document received"
    );

    let mut workflow = app.workflow.lock().await;
    *workflow = workflow.clone().with_document(document);

    Ok(state_view(&app, &workflow))
}

/// POST /v1/chain/steps/{step}
pub async fn run_step(
    State(app): State<AppState>,
    Path(step): Path<usize>,
    body: Option<Json<StepRequestBody>>,
) -> Result<Json<ChainStateResponse>, ApiError> {
    let request = body
        .map(Json::into_inner)
        .unwrap_or_default()
        .into_request(step);

    let mut workflow = app.workflow.lock().await;
    let next = app.controller.run_step(&workflow, request).await?;
    *workflow = next;

    Ok(state_view(&app, &workflow))
}

/// POST /v1/chain/run
///
/// Runs every step in order. Steps completed before a failure are kept.
pub async fn run_chain(
    State(app): State<AppState>,
) -> Result<Json<ChainStateResponse>, ApiError> {
    let mut workflow = app.workflow.lock().await;

    match app.controller.run_chain(&workflow).await {
        Ok(next) => {
            *workflow = next;
            Ok(state_view(&app, &workflow))
        }
        Err(err) => {
            warn!(step = err.step, error = %err.source, "Automatic run stopped");
            *workflow = (*err.state).clone();
            Err(err.into())
        }
    }
}

/// POST /v1/chain/reset
pub async fn reset_chain(State(app): State<AppState>) -> Json<ChainStateResponse> {
    let mut workflow = app.workflow.lock().await;
    *workflow = workflow.reset();

    info!("Workflow reset");

    state_view(&app, &workflow)
}

/// GET /v1/chain/artifact
pub async fn get_artifact(
    State(app): State<AppState>,
    Query(query): Query<ArtifactQuery>,
) -> Result<Response, ApiError> {
    let format = query.format;
    let workflow = app.workflow.lock().await;

    let artifact = Artifact::from_state(&workflow, format).ok_or_else(|| {
        ApiError::not_found("No artifact available until the final step has a result")
    })?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.content,
    )
        .into_response())
}
