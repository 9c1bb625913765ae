//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::Response;
use contracts::{CompleteCheckoutRequest, CompleteCheckoutResponse};

use crate::compose::{ResultHandlers, compose_endpoint};
use crate::error::ApiError;
use crate::routes::AppState;

/// POST /checkout/complete: reserves stock and verifies the customer.
///
/// When either step fails the other is rolled back and the endpoint answers
/// 500.
#[tracing::instrument(skip(state, request))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompleteCheckoutRequest>,
) -> Result<Response, ApiError> {
    compose_endpoint(
        &state.composer,
        &request,
        CompleteCheckoutResponse::for_order(request.order_id),
        ResultHandlers::new(),
    )
    .await
}
