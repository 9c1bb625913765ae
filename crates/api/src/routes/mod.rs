//! HTTP route handlers.

pub mod checkout;
pub mod configuration;
pub mod health;
pub mod metrics;
pub mod products;

use std::sync::Arc;

use composer::{ParticipatorRegistry, ServiceComposer};
use services::Services;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub composer: ServiceComposer<Arc<ParticipatorRegistry>>,
    pub services: Services,
    /// Text removed from type names on the configuration page.
    pub text_filters: Vec<String>,
}

impl AppState {
    pub fn registry(&self) -> &ParticipatorRegistry {
        self.composer.lookup()
    }
}
