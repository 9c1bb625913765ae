//! Response composition from independent participators.
//!
//! Each participator owns part of a response. The [`ServiceComposer`] looks
//! up the participators registered for a request/response pair and runs
//! them in waves:
//! 1. The structure initializer, if any, runs alone and seeds the response shape
//! 2. Every participator whose readiness predicate holds runs concurrently
//! 3. Waves repeat until all participators ran, one reports not-found, or errors are recorded
//!
//! If any participator fails, every participator that already completed is
//! rolled back concurrently and the result carries a single user-facing error.

pub mod compensation;
pub mod composer;
pub mod config;
pub mod error;
pub mod observer;
pub mod participator;
pub mod registry;
pub mod result;
pub mod state;

pub use composer::ServiceComposer;
pub use config::{ComposerConfig, DEFAULT_MAX_WAVE_COUNT};
pub use error::{ComposeError, PARTICIPATION_FAILED, ParticipationError, RegistryError};
pub use observer::{ComposeObserver, CompositionContext, NoOpObserver, TracingObserver};
pub use participator::Participator;
pub use registry::{
    Configurator, ImplementorSet, ParticipatorLookup, ParticipatorRegistry, RegistryBuilder,
};
pub use result::{ComposeResult, OngoingComposition};
pub use state::CompositionState;
