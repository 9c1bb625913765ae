//! Rollback of completed participators after a failed wave.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::observer::{ComposeObserver, CompositionContext};
use crate::participator::{Participator, guarded};
use crate::result::OngoingComposition;

/// Rolls back every completed participator concurrently.
///
/// Rollback failures (including panics) are reported to the observer and
/// otherwise swallowed: they never reach the result's errors and never
/// replace the failure that triggered compensation. Returns the number of
/// rollbacks that failed.
#[tracing::instrument(skip_all, fields(participators = completed.len()))]
pub async fn compensate<Req, Resp>(
    completed: &[Arc<dyn Participator<Req, Resp>>],
    request: &Req,
    composition: &OngoingComposition<Resp>,
    context: &CompositionContext,
    observer: &dyn ComposeObserver,
) -> usize
where
    Req: Send + Sync + 'static,
    Resp: Send + Sync + 'static,
{
    observer.on_compensation_started(context, completed.len());

    let outcomes = join_all(completed.iter().map(|participator| async move {
        let outcome = guarded(participator.rollback(request, composition)).await;
        (participator.name(), outcome)
    }))
    .await;

    let mut failed = 0;
    for (name, outcome) in outcomes {
        if let Err(error) = outcome {
            failed += 1;
            observer.on_rollback_failed(context, name, &error);
        }
    }

    metrics::counter!("composition_rollbacks_total").increment(completed.len() as u64);
    metrics::counter!("composition_rollbacks_failed").increment(failed as u64);
    observer.on_compensation_completed(context, completed.len(), failed);

    failed
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::ParticipationError;
    use crate::observer::NoOpObserver;

    #[derive(Default)]
    struct Undo {
        rollbacks: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Participator<(), Vec<u8>> for Undo {
        async fn participate(
            &self,
            _request: &(),
            _composition: &OngoingComposition<Vec<u8>>,
        ) -> Result<(), ParticipationError> {
            Ok(())
        }

        async fn rollback(
            &self,
            _request: &(),
            _composition: &OngoingComposition<Vec<u8>>,
        ) -> Result<(), ParticipationError> {
            self.rollbacks.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ParticipationError::failed("cannot undo"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_rolls_back_everything_and_counts_failures() {
        let ok = Arc::new(Undo::default());
        let broken = Arc::new(Undo {
            fail: true,
            ..Undo::default()
        });
        let completed = vec![
            ok.clone() as Arc<dyn Participator<(), Vec<u8>>>,
            broken.clone(),
        ];
        let composition = OngoingComposition::new(Vec::new());

        let failed = compensate(
            &completed,
            &(),
            &composition,
            &CompositionContext::of::<(), Vec<u8>>(),
            &NoOpObserver,
        )
        .await;

        assert_eq!(failed, 1);
        assert_eq!(ok.rollbacks.load(Ordering::SeqCst), 1);
        assert_eq!(broken.rollbacks.load(Ordering::SeqCst), 1);
        assert!(!composition.has_errors());
    }

    #[tokio::test]
    async fn test_nothing_to_compensate() {
        let composition = OngoingComposition::new(Vec::new());
        let failed = compensate::<(), Vec<u8>>(
            &[],
            &(),
            &composition,
            &CompositionContext::of::<(), Vec<u8>>(),
            &NoOpObserver,
        )
        .await;
        assert_eq!(failed, 0);
    }
}
