//! The contract every participating service implements.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::error::ParticipationError;
use crate::result::OngoingComposition;

/// A unit of work contributing part of the response for one
/// request/response pair.
///
/// Only [`participate`](Self::participate) is required. Participators that
/// depend on other contributions express it through [`ready`](Self::ready)
/// rather than through ordering.
///
/// # Example
///
/// ```rust,ignore
/// struct Pricing;
///
/// #[async_trait]
/// impl Participator<ProductsBySearchTermRequest, Vec<ProductBySearchTerm>> for Pricing {
///     fn ready(&self, composition: &OngoingComposition<Vec<ProductBySearchTerm>>) -> bool {
///         composition.structure_initialized()
///     }
///
///     async fn participate(
///         &self,
///         _request: &ProductsBySearchTermRequest,
///         composition: &OngoingComposition<Vec<ProductBySearchTerm>>,
///     ) -> Result<(), ParticipationError> {
///         for product in composition.response_mut().iter_mut() {
///             product.current_price_cents = 299;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Participator<Req, Resp>: Send + Sync
where
    Req: Send + Sync + 'static,
    Resp: Send + Sync + 'static,
{
    /// Name used in logs, errors and the configuration page.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this participator seeds the response structure. At most one
    /// participator per pair may return true.
    fn is_structure_initializer(&self) -> bool {
        false
    }

    /// Pure readiness predicate, queried before every wave until it returns
    /// true.
    fn ready(&self, _composition: &OngoingComposition<Resp>) -> bool {
        true
    }

    /// Contributes to the response.
    async fn participate(
        &self,
        request: &Req,
        composition: &OngoingComposition<Resp>,
    ) -> Result<(), ParticipationError>;

    /// Compensates a previous successful participation after a sibling failed.
    async fn rollback(
        &self,
        _request: &Req,
        _composition: &OngoingComposition<Resp>,
    ) -> Result<(), ParticipationError> {
        Ok(())
    }
}

/// Awaits a participator future, turning a panic into a [`ParticipationError`].
pub(crate) async fn guarded<F>(future: F) -> Result<(), ParticipationError>
where
    F: Future<Output = Result<(), ParticipationError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Err(ParticipationError::from_panic(payload)),
    }
}
