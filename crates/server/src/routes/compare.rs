use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use compare::{CompareMode, CompareRequest};

/// Comparison request body.
///
/// `product_tokens` entries may be product UUIDs or slugs; `mode` defaults
/// to `"raw"`. Trace and may-contain lines are excluded unless opted in.
#[derive(Debug, Deserialize)]
pub struct CompareBody {
    #[serde(default)]
    pub product_tokens: Vec<String>,

    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub include_trace: bool,

    #[serde(default)]
    pub include_may_contain: bool,
}

/// Compare the latest ingredient lists of two or more products.
///
/// `POST /compare`
///
/// Validation failures (fewer than two tokens, unknown mode, fewer than
/// two resolvable products) are 400s naming the violated precondition.
/// A rule-data or store failure in canonical mode is a 503.
pub async fn compare_products(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CompareBody>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(body) = payload.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let mode = CompareMode::parse(body.mode.as_deref().unwrap_or("raw"))?;
    let request = CompareRequest {
        product_tokens: body.product_tokens,
        mode,
        include_trace: body.include_trace,
        include_may_contain: body.include_may_contain,
    };

    let result = state.engine.compare(&request)?;
    Ok(Json(result))
}
