//! Composition observer trait

use crate::error::{ComposeError, ParticipationError};
use crate::state::CompositionState;

/// Identifies the request/response pair being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionContext {
    pub request: &'static str,
    pub response: &'static str,
}

impl CompositionContext {
    pub fn of<Req, Resp>() -> Self {
        Self {
            request: std::any::type_name::<Req>(),
            response: std::any::type_name::<Resp>(),
        }
    }
}

/// Observer for composition lifecycle events.
///
/// Passed to the composer at construction so hosts choose where diagnostics
/// go. Wave `0` is the structural wave.
pub trait ComposeObserver: Send + Sync + 'static {
    fn on_composition_started(&self, context: &CompositionContext, participators: usize);
    fn on_wave_started(
        &self,
        context: &CompositionContext,
        wave: usize,
        participators: &[&'static str],
    );
    fn on_participation_failed(
        &self,
        context: &CompositionContext,
        participator: &str,
        error: &ParticipationError,
    );
    fn on_compensation_started(&self, context: &CompositionContext, participators: usize);
    fn on_rollback_failed(
        &self,
        context: &CompositionContext,
        participator: &str,
        error: &ParticipationError,
    );
    fn on_compensation_completed(
        &self,
        context: &CompositionContext,
        participators: usize,
        failed: usize,
    );
    fn on_composition_finished(
        &self,
        context: &CompositionContext,
        state: CompositionState,
        waves: usize,
    );
    fn on_composition_aborted(&self, context: &CompositionContext, error: &ComposeError);
}

/// No-op observer
pub struct NoOpObserver;

impl ComposeObserver for NoOpObserver {
    fn on_composition_started(&self, _context: &CompositionContext, _participators: usize) {}
    fn on_wave_started(
        &self,
        _context: &CompositionContext,
        _wave: usize,
        _participators: &[&'static str],
    ) {
    }
    fn on_participation_failed(
        &self,
        _context: &CompositionContext,
        _participator: &str,
        _error: &ParticipationError,
    ) {
    }
    fn on_compensation_started(&self, _context: &CompositionContext, _participators: usize) {}
    fn on_rollback_failed(
        &self,
        _context: &CompositionContext,
        _participator: &str,
        _error: &ParticipationError,
    ) {
    }
    fn on_compensation_completed(
        &self,
        _context: &CompositionContext,
        _participators: usize,
        _failed: usize,
    ) {
    }
    fn on_composition_finished(
        &self,
        _context: &CompositionContext,
        _state: CompositionState,
        _waves: usize,
    ) {
    }
    fn on_composition_aborted(&self, _context: &CompositionContext, _error: &ComposeError) {}
}

/// Tracing-based observer
pub struct TracingObserver;

impl ComposeObserver for TracingObserver {
    fn on_composition_started(&self, context: &CompositionContext, participators: usize) {
        tracing::debug!(
            request = %context.request,
            response = %context.response,
            participators,
            "Composition started"
        );
    }

    fn on_wave_started(
        &self,
        context: &CompositionContext,
        wave: usize,
        participators: &[&'static str],
    ) {
        tracing::debug!(
            request = %context.request,
            wave,
            participators = ?participators,
            "Wave started"
        );
    }

    fn on_participation_failed(
        &self,
        context: &CompositionContext,
        participator: &str,
        error: &ParticipationError,
    ) {
        tracing::error!(
            request = %context.request,
            response = %context.response,
            participator = %participator,
            error = ?error,
            "Participation failed"
        );
    }

    fn on_compensation_started(&self, context: &CompositionContext, participators: usize) {
        tracing::info!(request = %context.request, participators, "Compensation started");
    }

    fn on_rollback_failed(
        &self,
        context: &CompositionContext,
        participator: &str,
        error: &ParticipationError,
    ) {
        tracing::error!(
            request = %context.request,
            response = %context.response,
            participator = %participator,
            error = ?error,
            "Rollback failed"
        );
    }

    fn on_compensation_completed(
        &self,
        context: &CompositionContext,
        participators: usize,
        failed: usize,
    ) {
        tracing::info!(request = %context.request, participators, failed, "Compensation completed");
    }

    fn on_composition_finished(
        &self,
        context: &CompositionContext,
        state: CompositionState,
        waves: usize,
    ) {
        match state {
            CompositionState::Failed => tracing::warn!(
                request = %context.request,
                response = %context.response,
                %state,
                waves,
                "Composition failed"
            ),
            _ => tracing::info!(
                request = %context.request,
                response = %context.response,
                %state,
                waves,
                "Composition finished"
            ),
        }
    }

    fn on_composition_aborted(&self, context: &CompositionContext, error: &ComposeError) {
        tracing::error!(
            request = %context.request,
            response = %context.response,
            error = %error,
            "Composition aborted"
        );
    }
}
