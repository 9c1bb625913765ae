//! Pricing service: owns current product prices.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use composer::{
    Configurator, OngoingComposition, ParticipationError, Participator, RegistryBuilder,
};
use contracts::{
    ProductByIdRequest, ProductByIdResponse, ProductsBySearchTermRequest,
    ProductsBySearchTermResponse,
};

use crate::error::ServiceError;

/// In-memory price list, in cents.
#[derive(Debug, Clone, Default)]
pub struct PriceList {
    prices: Arc<RwLock<HashMap<u32, i64>>>,
}

impl PriceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        let prices = Self::new();
        prices.set_price(1, 299);
        prices.set_price(2, 149);
        prices.set_price(3, 4999);
        prices.set_price(123, 1212);
        prices
    }

    pub fn set_price(&self, product_id: u32, cents: i64) {
        self.prices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product_id, cents);
    }

    pub fn price_of(&self, product_id: u32) -> Option<i64> {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id)
            .copied()
    }
}

/// Prices every seeded search entry.
pub struct SearchPricingParticipator {
    prices: PriceList,
}

#[async_trait]
impl Participator<ProductsBySearchTermRequest, ProductsBySearchTermResponse>
    for SearchPricingParticipator
{
    fn ready(&self, composition: &OngoingComposition<ProductsBySearchTermResponse>) -> bool {
        composition.structure_initialized()
    }

    async fn participate(
        &self,
        _request: &ProductsBySearchTermRequest,
        composition: &OngoingComposition<ProductsBySearchTermResponse>,
    ) -> Result<(), ParticipationError> {
        for product in composition.response_mut().iter_mut() {
            product.current_price_cents = self
                .prices
                .price_of(product.id)
                .ok_or(ServiceError::UnknownProduct(product.id))?;
        }
        Ok(())
    }
}

pub struct ProductPricingParticipator {
    prices: PriceList,
}

#[async_trait]
impl Participator<ProductByIdRequest, ProductByIdResponse> for ProductPricingParticipator {
    async fn participate(
        &self,
        request: &ProductByIdRequest,
        composition: &OngoingComposition<ProductByIdResponse>,
    ) -> Result<(), ParticipationError> {
        // Unknown products are reported as not found by the details service.
        if let Some(price) = self.prices.price_of(request.product_id) {
            composition.response_mut().current_price_cents = price;
        }
        Ok(())
    }
}

impl Configurator for PriceList {
    fn configure(&self, registry: &mut RegistryBuilder) {
        registry
            .register::<ProductsBySearchTermRequest, ProductsBySearchTermResponse, _>(
                SearchPricingParticipator {
                    prices: self.clone(),
                },
            )
            .register::<ProductByIdRequest, ProductByIdResponse, _>(ProductPricingParticipator {
                prices: self.clone(),
            });
    }
}

#[cfg(test)]
mod tests {
    use contracts::ProductBySearchTerm;

    use super::*;

    #[tokio::test]
    async fn test_prices_seeded_entries() {
        let participator = SearchPricingParticipator {
            prices: PriceList::demo(),
        };
        let composition = OngoingComposition::new(vec![
            ProductBySearchTerm::stub(1, "a", "a"),
            ProductBySearchTerm::stub(3, "c", "c"),
        ]);
        assert!(!participator.ready(&composition));
        composition.mark_structure_initialized();
        assert!(participator.ready(&composition));

        participator
            .participate(&ProductsBySearchTermRequest::new("abc"), &composition)
            .await
            .unwrap();

        let response = composition.response();
        assert_eq!(response[0].current_price_cents, 299);
        assert_eq!(response[1].current_price_cents, 4999);
    }

    #[tokio::test]
    async fn test_unknown_product_fails() {
        let participator = SearchPricingParticipator {
            prices: PriceList::demo(),
        };
        let composition = OngoingComposition::new(vec![ProductBySearchTerm::stub(77, "x", "x")]);

        let err = participator
            .participate(&ProductsBySearchTermRequest::new("abc"), &composition)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown product: 77");
    }
}
