//! The accumulator shared by participators and the result handed back to
//! callers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::state::CompositionState;

/// The in-flight composition every participator reads and mutates.
///
/// Participators running in the same wave share this value. Guards returned
/// by [`response`](Self::response) and [`response_mut`](Self::response_mut)
/// must be dropped before the participator awaits anything; participators in
/// one wave are expected to write disjoint parts of the response.
#[derive(Debug)]
pub struct OngoingComposition<Resp> {
    response: RwLock<Resp>,
    not_found_or_no_results: AtomicBool,
    structure_initialized: AtomicBool,
    errors: Mutex<Vec<String>>,
}

impl<Resp> OngoingComposition<Resp> {
    /// Wraps a (possibly pre-populated) response shell.
    pub fn new(response: Resp) -> Self {
        Self {
            response: RwLock::new(response),
            not_found_or_no_results: AtomicBool::new(false),
            structure_initialized: AtomicBool::new(false),
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Borrows the response under construction.
    pub fn response(&self) -> RwLockReadGuard<'_, Resp> {
        self.response
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutably borrows the response under construction.
    pub fn response_mut(&self) -> RwLockWriteGuard<'_, Resp> {
        self.response
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn not_found_or_no_results(&self) -> bool {
        self.not_found_or_no_results.load(Ordering::SeqCst)
    }

    /// Ends the composition after the current wave without treating it as a
    /// failure.
    pub fn mark_not_found_or_no_results(&self) {
        self.not_found_or_no_results.store(true, Ordering::SeqCst);
    }

    /// True once the structure initializer has run.
    pub fn structure_initialized(&self) -> bool {
        self.structure_initialized.load(Ordering::SeqCst)
    }

    pub fn mark_structure_initialized(&self) {
        self.structure_initialized.store(true, Ordering::SeqCst);
    }

    /// Records a user-facing error. The composition stops after the current
    /// wave; no rollback is triggered.
    pub fn push_error(&self, error: impl Into<String>) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Returns a snapshot of the errors recorded so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The terminal state this composition would settle in if it stopped now,
    /// or `None` while it should keep going.
    pub(crate) fn short_circuit(&self) -> Option<CompositionState> {
        if self.has_errors() {
            Some(CompositionState::Failed)
        } else if self.not_found_or_no_results() {
            Some(CompositionState::NotFound)
        } else {
            None
        }
    }

    /// Consumes the accumulator, producing the value returned to callers.
    pub fn into_result(self) -> ComposeResult<Resp> {
        ComposeResult {
            response: self
                .response
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            not_found_or_no_results: self.not_found_or_no_results.into_inner(),
            structure_initialized: self.structure_initialized.into_inner(),
            errors: self
                .errors
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// The outcome of one composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeResult<Resp> {
    pub response: Resp,
    pub not_found_or_no_results: bool,
    pub structure_initialized: bool,
    pub errors: Vec<String>,
}

impl<Resp> ComposeResult<Resp> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The terminal state of the composition. Errors take precedence over
    /// not-found.
    pub fn outcome(&self) -> CompositionState {
        if self.has_errors() {
            CompositionState::Failed
        } else if self.not_found_or_no_results {
            CompositionState::NotFound
        } else {
            CompositionState::Completed
        }
    }

    pub fn into_response(self) -> Resp {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_composition_has_no_flags() {
        let composition = OngoingComposition::new(vec![1, 2]);
        assert!(!composition.not_found_or_no_results());
        assert!(!composition.structure_initialized());
        assert!(!composition.has_errors());
        assert_eq!(composition.short_circuit(), None);
        assert_eq!(*composition.response(), vec![1, 2]);
    }

    #[test]
    fn test_response_mut_updates_in_place() {
        let composition = OngoingComposition::new(Vec::<u32>::new());
        composition.response_mut().push(3);
        assert_eq!(composition.into_result().response, vec![3]);
    }

    #[test]
    fn test_errors_take_precedence_over_not_found() {
        let composition = OngoingComposition::new(());
        composition.mark_not_found_or_no_results();
        assert_eq!(composition.short_circuit(), Some(CompositionState::NotFound));

        composition.push_error("broken");
        assert_eq!(composition.short_circuit(), Some(CompositionState::Failed));

        let result = composition.into_result();
        assert!(result.has_errors());
        assert!(result.not_found_or_no_results);
        assert_eq!(result.outcome(), CompositionState::Failed);
    }

    #[test]
    fn test_outcome_completed() {
        let composition = OngoingComposition::new("done");
        composition.mark_structure_initialized();
        let result = composition.into_result();
        assert!(result.structure_initialized);
        assert_eq!(result.outcome(), CompositionState::Completed);
        assert_eq!(result.into_response(), "done");
    }
}
