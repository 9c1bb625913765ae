//! Composer error types.

use std::any::Any;

use thiserror::Error;

/// User-facing error recorded when one or more participators fail.
///
/// The underlying failures are reported to the observer, never to the caller.
pub const PARTICIPATION_FAILED: &str =
    "One or more participators failed while composing the response";

/// Configuration-level errors that abort a composition.
///
/// These indicate wiring mistakes rather than per-request failures, so they
/// are returned to the caller instead of being recorded on the result.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// No participators are registered for the request/response pair.
    #[error(
        "No participators are available for request {request} / response {response}. There must be at least one."
    )]
    NoParticipators {
        request: &'static str,
        response: &'static str,
    },

    /// More than one participator claims to initialize the response structure.
    #[error(
        "More than one participator ({count}) has 'is_structure_initializer' set to true for request {request} / response {response}. There can only be one per composition."
    )]
    MultipleStructureInitializers {
        count: usize,
        request: &'static str,
        response: &'static str,
    },

    /// The wave loop hit the configured ceiling with participators remaining.
    #[error(
        "Composition for request {request} / response {response} exceeded the maximum of {max_wave_count} participation waves; check for a participator that never becomes ready"
    )]
    WaveLimitExceeded {
        max_wave_count: usize,
        request: &'static str,
        response: &'static str,
    },

    /// Participators remain but none of them reports ready.
    #[error(
        "No participators are ready for request {request} / response {response}; {count} remaining: {names}",
        count = .remaining.len(),
        names = .remaining.join(", ")
    )]
    NoParticipatorsReady {
        remaining: Vec<&'static str>,
        request: &'static str,
        response: &'static str,
    },
}

/// Errors raised by a participator while participating or rolling back.
#[derive(Debug, Error)]
pub enum ParticipationError {
    /// The participator could not make its contribution.
    #[error("{0}")]
    Failed(String),

    /// A lower-level error surfaced by the participator.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// The participator panicked.
    #[error("Participator panicked: {0}")]
    Panicked(String),
}

impl ParticipationError {
    /// Creates a failure with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        ParticipationError::Failed(reason.into())
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ParticipationError::Panicked(message)
    }
}

/// Errors raised while wiring participators into a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same participator type was registered twice for one pair.
    #[error(
        "Participator {participator} is registered more than once for request {request} / response {response}"
    )]
    DuplicateParticipator {
        participator: &'static str,
        request: &'static str,
        response: &'static str,
    },
}

/// Convenience type alias for composition results.
pub type Result<T> = std::result::Result<T, ComposeError>;
