//! Warehouse service: owns stock levels and checkout reservations.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use composer::{
    Configurator, OngoingComposition, ParticipationError, Participator, RegistryBuilder,
};
use contracts::{
    CheckoutItem, CompleteCheckoutRequest, CompleteCheckoutResponse, OrderId,
    ProductsBySearchTermRequest, ProductsBySearchTermResponse,
};

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone)]
struct Reservation {
    order_id: OrderId,
    /// Product id and reserved quantity.
    lines: Vec<(u32, u32)>,
}

#[derive(Debug, Default)]
struct WarehouseState {
    stock: HashMap<u32, u32>,
    reservations: HashMap<String, Reservation>,
    next_id: u32,
    fail_on_reserve: bool,
    released: usize,
}

/// In-memory warehouse.
#[derive(Debug, Clone, Default)]
pub struct Warehouse {
    state: Arc<RwLock<WarehouseState>>,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        let warehouse = Self::new();
        warehouse.set_stock(1, 49_039);
        warehouse.set_stock(2, 2_934_830);
        warehouse.set_stock(3, 393);
        warehouse.set_stock(123, 10);
        warehouse
    }

    pub fn set_stock(&self, product_id: u32, level: u32) {
        self.write().stock.insert(product_id, level);
    }

    /// Current stock level, 0 for products the warehouse never stocked.
    pub fn stock_level(&self, product_id: u32) -> u32 {
        self.read().stock.get(&product_id).copied().unwrap_or(0)
    }

    /// Configures the warehouse to refuse reservations.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.write().fail_on_reserve = fail;
    }

    /// Returns the number of active reservations.
    pub fn reservation_count(&self) -> usize {
        self.read().reservations.len()
    }

    pub fn has_reservation(&self, reservation_id: &str) -> bool {
        self.read().reservations.contains_key(reservation_id)
    }

    /// Returns how many reservations have been released.
    pub fn released_count(&self) -> usize {
        self.read().released
    }

    /// Reserves stock for every item, all or nothing.
    pub fn reserve(&self, order_id: OrderId, items: &[CheckoutItem]) -> Result<String> {
        let mut state = self.write();

        if state.fail_on_reserve {
            return Err(ServiceError::WarehouseUnavailable);
        }

        // Lines for the same product draw from one stock level.
        let mut requested: BTreeMap<u32, u32> = BTreeMap::new();
        for item in items {
            let total = requested.entry(item.product_id).or_default();
            *total = total.saturating_add(item.quantity);
        }

        for (&product_id, &quantity) in &requested {
            let available = state.stock.get(&product_id).copied().unwrap_or(0);
            if available < quantity {
                return Err(ServiceError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available,
                });
            }
        }

        let mut lines = Vec::with_capacity(requested.len());
        for (product_id, quantity) in requested {
            if let Some(level) = state.stock.get_mut(&product_id) {
                *level -= quantity;
            }
            lines.push((product_id, quantity));
        }

        state.next_id += 1;
        let reservation_id = format!("RES-{:04}", state.next_id);
        state
            .reservations
            .insert(reservation_id.clone(), Reservation { order_id, lines });

        tracing::info!(%order_id, %reservation_id, "stock reserved");
        Ok(reservation_id)
    }

    /// Releases a reservation and returns its stock. Unknown ids are ignored.
    pub fn release(&self, reservation_id: &str) {
        let mut state = self.write();
        let Some(reservation) = state.reservations.remove(reservation_id) else {
            return;
        };

        for (product_id, quantity) in reservation.lines {
            let level = state.stock.entry(product_id).or_default();
            *level = level.saturating_add(quantity);
        }
        state.released += 1;

        tracing::info!(
            order_id = %reservation.order_id,
            reservation_id,
            "reservation released"
        );
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, WarehouseState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, WarehouseState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Adds stock levels to search results.
pub struct SearchStockParticipator {
    warehouse: Warehouse,
}

#[async_trait]
impl Participator<ProductsBySearchTermRequest, ProductsBySearchTermResponse>
    for SearchStockParticipator
{
    fn ready(&self, composition: &OngoingComposition<ProductsBySearchTermResponse>) -> bool {
        composition.structure_initialized()
    }

    async fn participate(
        &self,
        _request: &ProductsBySearchTermRequest,
        composition: &OngoingComposition<ProductsBySearchTermResponse>,
    ) -> std::result::Result<(), ParticipationError> {
        for product in composition.response_mut().iter_mut() {
            product.stock_level = self.warehouse.stock_level(product.id);
        }
        Ok(())
    }
}

/// Reserves stock for a checkout and releases it on rollback.
pub struct ReserveStockParticipator {
    warehouse: Warehouse,
}

#[async_trait]
impl Participator<CompleteCheckoutRequest, CompleteCheckoutResponse> for ReserveStockParticipator {
    async fn participate(
        &self,
        request: &CompleteCheckoutRequest,
        composition: &OngoingComposition<CompleteCheckoutResponse>,
    ) -> std::result::Result<(), ParticipationError> {
        let reservation_id = self.warehouse.reserve(request.order_id, &request.items)?;
        composition.response_mut().reservation_id = Some(reservation_id);
        Ok(())
    }

    async fn rollback(
        &self,
        _request: &CompleteCheckoutRequest,
        composition: &OngoingComposition<CompleteCheckoutResponse>,
    ) -> std::result::Result<(), ParticipationError> {
        let reservation_id = composition.response_mut().reservation_id.take();
        if let Some(reservation_id) = reservation_id {
            self.warehouse.release(&reservation_id);
        }
        Ok(())
    }
}

impl Configurator for Warehouse {
    fn configure(&self, registry: &mut RegistryBuilder) {
        registry
            .register::<ProductsBySearchTermRequest, ProductsBySearchTermResponse, _>(
                SearchStockParticipator {
                    warehouse: self.clone(),
                },
            )
            .register::<CompleteCheckoutRequest, CompleteCheckoutResponse, _>(
                ReserveStockParticipator {
                    warehouse: self.clone(),
                },
            );
    }
}

#[cfg(test)]
mod tests {
    use contracts::CustomerId;
    use uuid::Uuid;

    use super::*;

    fn checkout(items: Vec<CheckoutItem>) -> CompleteCheckoutRequest {
        CompleteCheckoutRequest {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            address_id: Uuid::new_v4(),
            items,
        }
    }

    #[test]
    fn test_reserve_and_release() {
        let warehouse = Warehouse::demo();
        let id = warehouse
            .reserve(OrderId::new(), &[CheckoutItem::new(3, 4999, 3)])
            .unwrap();

        assert_eq!(id, "RES-0001");
        assert_eq!(warehouse.stock_level(3), 390);
        assert!(warehouse.has_reservation(&id));

        warehouse.release(&id);
        assert_eq!(warehouse.stock_level(3), 393);
        assert_eq!(warehouse.reservation_count(), 0);
        assert_eq!(warehouse.released_count(), 1);
    }

    #[test]
    fn test_insufficient_stock_reserves_nothing() {
        let warehouse = Warehouse::demo();
        let err = warehouse
            .reserve(
                OrderId::new(),
                &[CheckoutItem::new(1, 299, 1), CheckoutItem::new(3, 4999, 400)],
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InsufficientStock {
                product_id: 3,
                requested: 400,
                available: 393
            }
        ));
        assert_eq!(warehouse.stock_level(1), 49_039);
        assert_eq!(warehouse.reservation_count(), 0);
    }

    #[test]
    fn test_repeated_product_lines_share_stock() {
        let warehouse = Warehouse::demo();
        let err = warehouse
            .reserve(
                OrderId::new(),
                &[CheckoutItem::new(3, 4999, 300), CheckoutItem::new(3, 4999, 300)],
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InsufficientStock {
                product_id: 3,
                requested: 600,
                available: 393
            }
        ));
        assert_eq!(warehouse.stock_level(3), 393);
        assert_eq!(warehouse.reservation_count(), 0);

        let id = warehouse
            .reserve(
                OrderId::new(),
                &[CheckoutItem::new(3, 4999, 100), CheckoutItem::new(3, 4999, 200)],
            )
            .unwrap();
        assert_eq!(warehouse.stock_level(3), 93);

        warehouse.release(&id);
        assert_eq!(warehouse.stock_level(3), 393);
    }

    #[tokio::test]
    async fn test_rollback_releases_reservation() {
        let warehouse = Warehouse::demo();
        let participator = ReserveStockParticipator {
            warehouse: warehouse.clone(),
        };
        let request = checkout(vec![CheckoutItem::new(2, 149, 10)]);
        let composition =
            OngoingComposition::new(CompleteCheckoutResponse::for_order(request.order_id));

        participator.participate(&request, &composition).await.unwrap();
        assert_eq!(warehouse.reservation_count(), 1);

        participator.rollback(&request, &composition).await.unwrap();
        assert_eq!(warehouse.reservation_count(), 0);
        assert_eq!(composition.response().reservation_id, None);

        // A second rollback finds nothing to release.
        participator.rollback(&request, &composition).await.unwrap();
        assert_eq!(warehouse.released_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_warehouse_fails() {
        let warehouse = Warehouse::demo();
        warehouse.set_fail_on_reserve(true);
        let participator = ReserveStockParticipator { warehouse };
        let request = checkout(vec![CheckoutItem::new(1, 299, 1)]);
        let composition = OngoingComposition::new(CompleteCheckoutResponse::default());

        let err = participator
            .participate(&request, &composition)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Warehouse unavailable");
    }
}
