//! Maps composed results onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use composer::{ComposeResult, ParticipatorLookup, ServiceComposer};
use serde::Serialize;

use crate::error::ApiError;

type Handler<Resp> = Box<dyn FnOnce(ComposeResult<Resp>) -> Response + Send>;

/// Per-endpoint overrides for the success, error and not-found outcomes.
pub struct ResultHandlers<Resp> {
    on_success: Option<Handler<Resp>>,
    on_errors: Option<Handler<Resp>>,
    on_not_found: Option<Handler<Resp>>,
}

impl<Resp> ResultHandlers<Resp> {
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_errors: None,
            on_not_found: None,
        }
    }

    pub fn on_success(
        mut self,
        handler: impl FnOnce(ComposeResult<Resp>) -> Response + Send + 'static,
    ) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    pub fn on_errors(
        mut self,
        handler: impl FnOnce(ComposeResult<Resp>) -> Response + Send + 'static,
    ) -> Self {
        self.on_errors = Some(Box::new(handler));
        self
    }

    pub fn on_not_found(
        mut self,
        handler: impl FnOnce(ComposeResult<Resp>) -> Response + Send + 'static,
    ) -> Self {
        self.on_not_found = Some(Box::new(handler));
        self
    }
}

impl<Resp> Default for ResultHandlers<Resp> {
    fn default() -> Self {
        Self::new()
    }
}

/// Composes `response` for `request` and turns the outcome into a response.
///
/// Recorded errors become 500 with the messages joined by `" / "`, not-found
/// becomes an empty 404, and anything else is the response as JSON. Errors
/// win over not-found. Aborted compositions surface as [`ApiError::Compose`].
pub async fn compose_endpoint<L, Req, Resp>(
    composer: &ServiceComposer<L>,
    request: &Req,
    response: Resp,
    handlers: ResultHandlers<Resp>,
) -> Result<Response, ApiError>
where
    L: ParticipatorLookup,
    Req: Send + Sync + 'static,
    Resp: Serialize + Send + Sync + 'static,
{
    let result = composer.compose(request, response).await?;
    Ok(respond(result, handlers))
}

/// Maps an already composed result using `handlers`.
pub fn respond<Resp: Serialize>(
    result: ComposeResult<Resp>,
    handlers: ResultHandlers<Resp>,
) -> Response {
    if result.has_errors() {
        return match handlers.on_errors {
            Some(handler) => handler(result),
            None => {
                let body = serde_json::json!({ "error": result.errors.join(" / ") });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        };
    }

    if result.not_found_or_no_results {
        return match handlers.on_not_found {
            Some(handler) => handler(result),
            None => StatusCode::NOT_FOUND.into_response(),
        };
    }

    match handlers.on_success {
        Some(handler) => handler(result),
        None => Json(result.response).into_response(),
    }
}
