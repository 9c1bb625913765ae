//! Service error types.

use composer::ParticipationError;
use contracts::CustomerId;
use thiserror::Error;

/// Errors raised by the in-memory services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A product referenced by the response is unknown to the service.
    #[error("Unknown product: {0}")]
    UnknownProduct(u32),

    /// The customer does not exist.
    #[error("Customer {0} does not exist")]
    UnknownCustomer(CustomerId),

    /// Not enough stock to reserve the requested quantity.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: u32,
        requested: u32,
        available: u32,
    },

    /// The warehouse refused to take reservations.
    #[error("Warehouse unavailable")]
    WarehouseUnavailable,
}

impl From<ServiceError> for ParticipationError {
    fn from(err: ServiceError) -> Self {
        ParticipationError::Source(Box::new(err))
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
