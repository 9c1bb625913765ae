//! Product details service: owns product names and descriptions and seeds
//! product search results.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use composer::{
    Configurator, OngoingComposition, ParticipationError, Participator, RegistryBuilder,
};
use contracts::{
    ProductByIdRequest, ProductByIdResponse, ProductBySearchTerm, ProductsBySearchTermRequest,
    ProductsBySearchTermResponse,
};

#[derive(Debug, Clone)]
struct ProductDetails {
    name: String,
    description: String,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<u32, ProductDetails>,
    /// Search term to product ids, in result order.
    index: HashMap<String, Vec<u32>>,
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with the demo products indexed under `"abc"`.
    pub fn demo() -> Self {
        let catalog = Self::new();
        catalog.add_product(1, "Chocolate Hobnobs", "Literally the best biscuits on the planet");
        catalog.add_product(2, "Twinings English Breakfast Tea Bags", "Tea doesn't get any finer");
        catalog.add_product(3, "Kettle", "A fancy one");
        catalog.add_product(123, "My first product", "My first description");
        catalog.index_term("abc", &[1, 2, 3]);
        catalog
    }

    pub fn add_product(&self, id: u32, name: impl Into<String>, description: impl Into<String>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .insert(
                id,
                ProductDetails {
                    name: name.into(),
                    description: description.into(),
                },
            );
    }

    pub fn index_term(&self, term: impl Into<String>, ids: &[u32]) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .index
            .insert(term.into(), ids.to_vec());
    }

    /// Returns stub search entries for `term`, empty when nothing matches.
    pub fn search(&self, term: &str) -> Vec<ProductBySearchTerm> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .index
            .get(term)
            .into_iter()
            .flatten()
            .filter_map(|id| {
                state
                    .products
                    .get(id)
                    .map(|p| ProductBySearchTerm::stub(*id, p.name.clone(), p.description.clone()))
            })
            .collect()
    }

    fn details(&self, id: u32) -> Option<ProductDetails> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .get(&id)
            .cloned()
    }
}

/// Seeds search results with one stub per matching product.
pub struct SearchSkeletonParticipator {
    catalog: ProductCatalog,
}

#[async_trait]
impl Participator<ProductsBySearchTermRequest, ProductsBySearchTermResponse>
    for SearchSkeletonParticipator
{
    fn is_structure_initializer(&self) -> bool {
        true
    }

    async fn participate(
        &self,
        request: &ProductsBySearchTermRequest,
        composition: &OngoingComposition<ProductsBySearchTermResponse>,
    ) -> Result<(), ParticipationError> {
        let matches = self.catalog.search(&request.search_term);
        if matches.is_empty() {
            tracing::debug!(search_term = %request.search_term, "no products matched");
            composition.mark_not_found_or_no_results();
            return Ok(());
        }

        composition.response_mut().extend(matches);
        Ok(())
    }
}

/// Fills in name and description for a single product.
pub struct ProductDetailsParticipator {
    catalog: ProductCatalog,
}

#[async_trait]
impl Participator<ProductByIdRequest, ProductByIdResponse> for ProductDetailsParticipator {
    async fn participate(
        &self,
        request: &ProductByIdRequest,
        composition: &OngoingComposition<ProductByIdResponse>,
    ) -> Result<(), ParticipationError> {
        let Some(details) = self.catalog.details(request.product_id) else {
            composition.mark_not_found_or_no_results();
            return Ok(());
        };

        let mut response = composition.response_mut();
        response.name = details.name;
        response.description = details.description;
        Ok(())
    }
}

impl Configurator for ProductCatalog {
    fn configure(&self, registry: &mut RegistryBuilder) {
        registry
            .register::<ProductsBySearchTermRequest, ProductsBySearchTermResponse, _>(
                SearchSkeletonParticipator {
                    catalog: self.clone(),
                },
            )
            .register::<ProductByIdRequest, ProductByIdResponse, _>(ProductDetailsParticipator {
                catalog: self.clone(),
            });
    }
}
