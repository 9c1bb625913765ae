//! In-memory services that each own one slice of the product and checkout
//! data and contribute it to composed responses.
//!
//! Every store is cheap to clone and implements [`composer::Configurator`],
//! registering its participators for the request/response pairs it serves.

pub mod customer;
pub mod error;
pub mod pricing;
pub mod product_details;
pub mod reviews;
pub mod warehouse;

use composer::{Configurator, ParticipatorRegistry, RegistryBuilder, RegistryError};
use contracts::{
    CompleteCheckoutRequest, CompleteCheckoutResponse, ProductByIdRequest, ProductByIdResponse,
    ProductsBySearchTermRequest, ProductsBySearchTermResponse,
};

pub use customer::{CustomerDirectory, DEMO_CUSTOMER};
pub use error::ServiceError;
pub use pricing::PriceList;
pub use product_details::ProductCatalog;
pub use reviews::ReviewStore;
pub use warehouse::Warehouse;

/// All services, sharing state with any clone.
#[derive(Debug, Clone, Default)]
pub struct Services {
    pub catalog: ProductCatalog,
    pub prices: PriceList,
    pub reviews: ReviewStore,
    pub warehouse: Warehouse,
    pub customers: CustomerDirectory,
}

impl Services {
    /// Services seeded with the demo catalog.
    pub fn demo() -> Self {
        Self {
            catalog: ProductCatalog::demo(),
            prices: PriceList::demo(),
            reviews: ReviewStore::demo(),
            warehouse: Warehouse::demo(),
            customers: CustomerDirectory::demo(),
        }
    }
}

impl Configurator for Services {
    fn configure(&self, registry: &mut RegistryBuilder) {
        registry
            .declare::<ProductsBySearchTermRequest, ProductsBySearchTermResponse>()
            .declare::<ProductByIdRequest, ProductByIdResponse>()
            .declare::<CompleteCheckoutRequest, CompleteCheckoutResponse>()
            .add_configurator(&self.catalog)
            .add_configurator(&self.prices)
            .add_configurator(&self.reviews)
            .add_configurator(&self.warehouse)
            .add_configurator(&self.customers);
    }
}

/// Builds a registry holding every participator the services provide.
pub fn configure_all(services: &Services) -> Result<ParticipatorRegistry, RegistryError> {
    let mut builder = ParticipatorRegistry::builder();
    builder.add_configurator(services);
    builder.build()
}
