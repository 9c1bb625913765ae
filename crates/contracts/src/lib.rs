//! Request and response contracts shared between the composer API and the
//! services that participate in building responses.

pub mod checkout;
pub mod ids;
pub mod products;

pub use checkout::{CheckoutItem, CompleteCheckoutRequest, CompleteCheckoutResponse};
pub use ids::{CustomerId, OrderId};
pub use products::{
    ProductByIdRequest, ProductByIdResponse, ProductBySearchTerm, ProductReview,
    ProductsBySearchTermRequest, ProductsBySearchTermResponse,
};
