//! Wave orchestrator composing a response from its participators.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::compensation::compensate;
use crate::config::ComposerConfig;
use crate::error::{ComposeError, PARTICIPATION_FAILED, ParticipationError, Result};
use crate::observer::{ComposeObserver, CompositionContext, TracingObserver};
use crate::participator::{Participator, guarded};
use crate::registry::ParticipatorLookup;
use crate::result::{ComposeResult, OngoingComposition};
use crate::state::CompositionState;

type ParticipatorRef<Req, Resp> = Arc<dyn Participator<Req, Resp>>;

/// Composes responses by running participators in readiness-gated waves.
///
/// An optional structure initializer runs alone first. After that, every
/// participator whose [`ready`](Participator::ready) predicate holds runs
/// concurrently with the others in the same wave, until none remain, one
/// reports not-found, errors are recorded, or a participator fails. A
/// failure rolls back every participator that already completed.
pub struct ServiceComposer<L: ParticipatorLookup> {
    lookup: L,
    config: ComposerConfig,
    observer: Arc<dyn ComposeObserver>,
}

impl<L: ParticipatorLookup> ServiceComposer<L> {
    /// Creates a composer reporting through [`TracingObserver`].
    pub fn new(lookup: L, config: ComposerConfig) -> Self {
        Self::with_observer(lookup, config, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        lookup: L,
        config: ComposerConfig,
        observer: Arc<dyn ComposeObserver>,
    ) -> Self {
        Self {
            lookup,
            config,
            observer,
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Composes `response` for `request`.
    ///
    /// Participator failures never surface as `Err`; they are recorded on the
    /// returned result. `Err` is reserved for wiring mistakes: no
    /// participators, several structure initializers, a wave that never
    /// becomes ready, or the wave ceiling being reached.
    #[tracing::instrument(
        skip_all,
        fields(
            request = std::any::type_name::<Req>(),
            response = std::any::type_name::<Resp>()
        )
    )]
    pub async fn compose<Req, Resp>(
        &self,
        request: &Req,
        response: Resp,
    ) -> Result<ComposeResult<Resp>>
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        metrics::counter!("compositions_total").increment(1);
        let started = std::time::Instant::now();
        let context = CompositionContext::of::<Req, Resp>();

        let composition = OngoingComposition::new(response);
        let outcome = match self.validate(&context) {
            Ok(participators) => {
                self.observer.on_composition_started(&context, participators.len());
                self.run(&context, participators, request, &composition).await
            }
            Err(err) => Err(err),
        };

        metrics::histogram!("composition_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok((state, waves)) => {
                match state {
                    CompositionState::Completed => {
                        metrics::counter!("compositions_completed").increment(1)
                    }
                    CompositionState::NotFound => {
                        metrics::counter!("compositions_not_found").increment(1)
                    }
                    _ => metrics::counter!("compositions_failed").increment(1),
                }
                self.observer.on_composition_finished(&context, state, waves);
                Ok(composition.into_result())
            }
            Err(err) => {
                metrics::counter!("compositions_aborted").increment(1);
                self.observer.on_composition_aborted(&context, &err);
                Err(err)
            }
        }
    }

    /// Fetches the participators and checks the pair is composable.
    fn validate<Req, Resp>(
        &self,
        context: &CompositionContext,
    ) -> Result<Vec<ParticipatorRef<Req, Resp>>>
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        let participators = self.lookup.lookup::<Req, Resp>();

        if participators.is_empty() {
            return Err(ComposeError::NoParticipators {
                request: context.request,
                response: context.response,
            });
        }

        let initializers = participators
            .iter()
            .filter(|p| p.is_structure_initializer())
            .count();
        if initializers > 1 {
            return Err(ComposeError::MultipleStructureInitializers {
                count: initializers,
                request: context.request,
                response: context.response,
            });
        }

        Ok(participators)
    }

    /// Drives the wave loop to a terminal state, returning it together with
    /// the number of readiness waves run.
    async fn run<Req, Resp>(
        &self,
        context: &CompositionContext,
        participators: Vec<ParticipatorRef<Req, Resp>>,
        request: &Req,
        composition: &OngoingComposition<Resp>,
    ) -> Result<(CompositionState, usize)>
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        let (initializers, mut remaining): (Vec<_>, Vec<_>) = participators
            .into_iter()
            .partition(|p| p.is_structure_initializer());
        let mut completed: Vec<ParticipatorRef<Req, Resp>> = Vec::new();

        // Structural wave
        if let Some(initializer) = initializers.into_iter().next() {
            tracing::debug!(participator = initializer.name(), "structural wave started");
            self.observer.on_wave_started(context, 0, &[initializer.name()]);

            let outcome = guarded(initializer.participate(request, composition)).await;
            composition.mark_structure_initialized();

            match outcome {
                Ok(()) => completed.push(initializer),
                Err(error) => {
                    let failed = vec![initializer];
                    let failures = vec![(failed[0].name(), error)];
                    return Ok((
                        self.fail(
                            context,
                            CompositionState::StructuralWave,
                            failures,
                            &failed,
                            request,
                            composition,
                        )
                        .await,
                        0,
                    ));
                }
            }
        }

        let mut waves = 0;
        loop {
            if let Some(terminal) = composition.short_circuit() {
                return Ok((terminal, waves));
            }

            if remaining.is_empty() {
                return Ok((CompositionState::Completed, waves));
            }

            if waves >= self.config.max_wave_count {
                return Err(ComposeError::WaveLimitExceeded {
                    max_wave_count: self.config.max_wave_count,
                    request: context.request,
                    response: context.response,
                });
            }

            let (ready, not_ready): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|p| p.ready(composition));
            if ready.is_empty() {
                return Err(ComposeError::NoParticipatorsReady {
                    remaining: not_ready.iter().map(|p| p.name()).collect(),
                    request: context.request,
                    response: context.response,
                });
            }
            remaining = not_ready;

            waves += 1;
            metrics::counter!("composition_waves_total").increment(1);
            let names: Vec<&'static str> = ready.iter().map(|p| p.name()).collect();
            tracing::debug!(wave = waves, participators = ?names, "readiness wave started");
            self.observer.on_wave_started(context, waves, &names);

            let outcomes = join_all(
                ready
                    .iter()
                    .map(|p| guarded(p.participate(request, composition))),
            )
            .await;

            let mut failures = Vec::new();
            for (participator, outcome) in ready.into_iter().zip(outcomes) {
                match outcome {
                    Ok(()) => completed.push(participator),
                    Err(error) => failures.push((participator.name(), error)),
                }
            }

            if !failures.is_empty() {
                return Ok((
                    self.fail(
                        context,
                        CompositionState::ReadyWave,
                        failures,
                        &completed,
                        request,
                        composition,
                    )
                    .await,
                    waves,
                ));
            }
        }
    }

    /// Records a single user-facing error for the failed wave, reports each
    /// failure in full, and compensates every completed participator.
    async fn fail<Req, Resp>(
        &self,
        context: &CompositionContext,
        state: CompositionState,
        failures: Vec<(&'static str, ParticipationError)>,
        completed: &[ParticipatorRef<Req, Resp>],
        request: &Req,
        composition: &OngoingComposition<Resp>,
    ) -> CompositionState
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        debug_assert!(state.can_compensate());

        for (name, error) in &failures {
            self.observer.on_participation_failed(context, name, error);
        }
        composition.push_error(PARTICIPATION_FAILED);

        tracing::debug!(from = %state, failures = failures.len(), "compensating");
        compensate(completed, request, composition, context, self.observer.as_ref()).await;

        CompositionState::Failed
    }
}
