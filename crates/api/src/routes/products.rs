//! Product lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use composer::ComposeResult;
use contracts::{
    ProductByIdRequest, ProductByIdResponse, ProductsBySearchTermRequest,
    ProductsBySearchTermResponse,
};
use serde::Deserialize;

use crate::compose::{ResultHandlers, compose_endpoint};
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
}

/// GET /product/{id}: details, price and reviews of one product.
#[tracing::instrument(skip(state))]
pub async fn by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Response, ApiError> {
    compose_endpoint(
        &state.composer,
        &ProductByIdRequest::new(id),
        ProductByIdResponse::default(),
        ResultHandlers::new(),
    )
    .await
}

/// GET /products?searchTerm=: products matching a term.
///
/// A search without matches answers 200 with an empty list.
#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    compose_endpoint(
        &state.composer,
        &ProductsBySearchTermRequest::new(params.search_term),
        ProductsBySearchTermResponse::new(),
        ResultHandlers::new().on_not_found(
            |result: ComposeResult<ProductsBySearchTermResponse>| {
                Json(result.response).into_response()
            },
        ),
    )
    .await
}
