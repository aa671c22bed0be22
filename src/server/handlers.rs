//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::error::CertVerifyError;
use crate::pipeline::validate::ImageRequest;
use crate::pipeline::verdict::Verdict;

/// `POST /process-image`
///
/// A body that is not a JSON object is a 400; missing fields are left to the
/// validator so they get their specific error.
pub async fn process_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(request) = payload.map_err(|e| CertVerifyError::InvalidRequestBody {
        detail: e.body_text(),
    })?;

    let verdict = state.verifier.verify(&request).await?;
    Ok(Json(verdict))
}

pub async fn livez() {
    tracing::debug!("service is live");
}

pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    tracing::debug!("service is healthy");
    Json(json!({
        "status": "ok",
        "model": state.verifier.model_name(),
    }))
}
