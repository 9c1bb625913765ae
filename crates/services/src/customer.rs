//! Customer service: owns customer records and verifies checkouts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use composer::{
    Configurator, OngoingComposition, ParticipationError, Participator, RegistryBuilder,
};
use contracts::{CompleteCheckoutRequest, CompleteCheckoutResponse, CustomerId};
use uuid::Uuid;

use crate::error::{Result, ServiceError};

/// The customer present in the demo directory.
pub const DEMO_CUSTOMER: Uuid = Uuid::from_u128(0xb22aa987_c172_4b87_9168_58f89e697f8e);

/// In-memory customer directory.
#[derive(Debug, Clone, Default)]
pub struct CustomerDirectory {
    customers: Arc<RwLock<HashMap<CustomerId, String>>>,
    rollbacks: Arc<AtomicUsize>,
}

impl CustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        let directory = Self::new();
        directory.add_customer(CustomerId::from_uuid(DEMO_CUSTOMER), "Ada Lovelace");
        directory
    }

    pub fn add_customer(&self, id: CustomerId, name: impl Into<String>) {
        self.customers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, name.into());
    }

    pub fn verify(&self, id: CustomerId) -> Result<String> {
        self.customers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(ServiceError::UnknownCustomer(id))
    }

    /// Returns how many checkout verifications have been rolled back.
    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

/// Verifies the customer placing a checkout.
pub struct VerifyCustomerParticipator {
    directory: CustomerDirectory,
}

#[async_trait]
impl Participator<CompleteCheckoutRequest, CompleteCheckoutResponse>
    for VerifyCustomerParticipator
{
    async fn participate(
        &self,
        request: &CompleteCheckoutRequest,
        composition: &OngoingComposition<CompleteCheckoutResponse>,
    ) -> std::result::Result<(), ParticipationError> {
        let name = self.directory.verify(request.customer_id)?;
        composition.response_mut().customer_name = Some(name);
        Ok(())
    }

    async fn rollback(
        &self,
        request: &CompleteCheckoutRequest,
        composition: &OngoingComposition<CompleteCheckoutResponse>,
    ) -> std::result::Result<(), ParticipationError> {
        tracing::info!(customer_id = %request.customer_id, "customer verification rolled back");
        composition.response_mut().customer_name = None;
        self.directory.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Configurator for CustomerDirectory {
    fn configure(&self, registry: &mut RegistryBuilder) {
        registry.register::<CompleteCheckoutRequest, CompleteCheckoutResponse, _>(
            VerifyCustomerParticipator {
                directory: self.clone(),
            },
        );
    }
}
