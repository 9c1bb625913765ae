//! Reviews service: owns customer reviews and their averages.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use composer::{
    Configurator, OngoingComposition, ParticipationError, Participator, RegistryBuilder,
};
use contracts::{
    ProductByIdRequest, ProductByIdResponse, ProductReview, ProductsBySearchTermRequest,
    ProductsBySearchTermResponse,
};

/// In-memory review store keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct ReviewStore {
    reviews: Arc<RwLock<HashMap<u32, Vec<ProductReview>>>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        let store = Self::new();
        store.add_review(1, ProductReview::new(4, "Crunchy"));
        store.add_review(2, ProductReview::new(5, "Proper brew"));
        store.add_review(3, ProductReview::new(3, "Boils water"));
        store.add_review(123, ProductReview::new(5, "Really good!"));
        store.add_review(123, ProductReview::new(4, "Packing was torn, but it didn't matter"));
        store.add_review(123, ProductReview::new(1, "I hate everything"));
        store
    }

    pub fn add_review(&self, product_id: u32, review: ProductReview) {
        self.reviews
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(product_id)
            .or_default()
            .push(review);
    }

    /// Reviews for a product, `None` when the product was never reviewed.
    pub fn reviews_for(&self, product_id: u32) -> Option<Vec<ProductReview>> {
        self.reviews
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id)
            .cloned()
    }

    /// Rounded-down average rating, 0 when there are no reviews.
    pub fn average_for(&self, product_id: u32) -> u8 {
        let reviews = self.reviews.read().unwrap_or_else(PoisonError::into_inner);
        match reviews.get(&product_id) {
            Some(list) if !list.is_empty() => {
                let total: u32 = list.iter().map(|r| u32::from(r.rating)).sum();
                (total / list.len() as u32) as u8
            }
            _ => 0,
        }
    }
}

/// Adds average ratings to search results once entries exist.
pub struct SearchReviewsParticipator {
    store: ReviewStore,
}

#[async_trait]
impl Participator<ProductsBySearchTermRequest, ProductsBySearchTermResponse>
    for SearchReviewsParticipator
{
    fn ready(&self, composition: &OngoingComposition<ProductsBySearchTermResponse>) -> bool {
        !composition.response().is_empty()
    }

    async fn participate(
        &self,
        _request: &ProductsBySearchTermRequest,
        composition: &OngoingComposition<ProductsBySearchTermResponse>,
    ) -> Result<(), ParticipationError> {
        for product in composition.response_mut().iter_mut() {
            product.average_review = self.store.average_for(product.id);
        }
        Ok(())
    }
}

pub struct ProductReviewsParticipator {
    store: ReviewStore,
}

#[async_trait]
impl Participator<ProductByIdRequest, ProductByIdResponse> for ProductReviewsParticipator {
    async fn participate(
        &self,
        request: &ProductByIdRequest,
        composition: &OngoingComposition<ProductByIdResponse>,
    ) -> Result<(), ParticipationError> {
        match self.store.reviews_for(request.product_id) {
            Some(reviews) => composition.response_mut().reviews = reviews,
            None => composition.mark_not_found_or_no_results(),
        }
        Ok(())
    }
}

impl Configurator for ReviewStore {
    fn configure(&self, registry: &mut RegistryBuilder) {
        registry
            .register::<ProductsBySearchTermRequest, ProductsBySearchTermResponse, _>(
                SearchReviewsParticipator {
                    store: self.clone(),
                },
            )
            .register::<ProductByIdRequest, ProductByIdResponse, _>(ProductReviewsParticipator {
                store: self.clone(),
            });
    }
}
