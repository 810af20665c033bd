use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use store::{SearchFilter, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT};
use uuid::Uuid;

/// Query parameters for the product listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Search request body. All filters are optional equality filters;
/// products whose latest ingredient list mentions any excluded canonical
/// id are filtered out.
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub species: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub life_stage: Option<String>,

    #[serde(default)]
    pub exclude_canonical_ids: Vec<String>,

    #[serde(default)]
    pub limit: Option<usize>,
}

/// List active products with their brand, ordered by brand then name.
///
/// `GET /catalog/products?limit=N`
pub async fn list_products(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let items = state.store.list_products(limit)?;

    Ok(Json(json!({
        "items": items,
        "next_cursor": null,
    })))
}

/// Product detail with its latest ingredient list.
///
/// `GET /catalog/products/{token}` where the token is a product UUID or
/// slug. Inactive products are still served here; they only drop out of
/// listing and search.
pub async fn product_detail(
    State(state): State<Arc<ServerState>>,
    Path(token): Path<String>,
) -> ServerResult<impl IntoResponse> {
    match state.store.product_detail(&token)? {
        Some(detail) => Ok(Json(detail)),
        None => Err(ServerError::NotFound("Product not found.".to_string())),
    }
}

/// Filtered product search.
///
/// `POST /catalog/search`
pub async fn search_products(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(body) = payload.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let mut exclude = Vec::with_capacity(body.exclude_canonical_ids.len());
    for raw in &body.exclude_canonical_ids {
        let id = Uuid::parse_str(raw).map_err(|_| {
            ServerError::BadRequest(format!("exclude_canonical_ids entry is not a UUID: {raw}"))
        })?;
        exclude.push(id);
    }

    let filter = SearchFilter {
        species: body.species,
        format: body.format,
        life_stage: body.life_stage,
        exclude_canonical_ids: exclude,
        limit: body.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    };
    let items = state.store.search_products(&filter)?;

    Ok(Json(json!({ "items": items })))
}
