//! Composition state machine.

use serde::{Deserialize, Serialize};

/// The state of a composition in its lifecycle.
///
/// State transitions:
/// ```text
/// StructuralWave ──► ReadyWave ──┬──► Completed
///                      ▲   │     ├──► NotFound
///                      └───┘     └──► Failed (after compensation)
/// ```
///
/// The short-circuit paths (`NotFound`, and `Failed` from voluntarily
/// recorded errors) may also be taken directly after the structural wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositionState {
    /// The structure initializer is running on its own.
    StructuralWave,

    /// A batch of ready participators is running concurrently.
    ReadyWave,

    /// Every participator contributed (terminal state).
    Completed,

    /// A participator reported that nothing was found (terminal state).
    NotFound,

    /// The composition recorded errors (terminal state).
    Failed,
}

impl CompositionState {
    /// Returns true if a failure in this state rolls back completed
    /// participators.
    pub fn can_compensate(&self) -> bool {
        matches!(
            self,
            CompositionState::StructuralWave | CompositionState::ReadyWave
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionState::StructuralWave => "StructuralWave",
            CompositionState::ReadyWave => "ReadyWave",
            CompositionState::Completed => "Completed",
            CompositionState::NotFound => "NotFound",
            CompositionState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CompositionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
