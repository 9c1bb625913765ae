//! Checkout contracts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{CustomerId, OrderId};

/// Completes checkout of an order on behalf of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteCheckoutRequest {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub address_id: Uuid,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: u32,
    pub purchase_price_cents: i64,
    pub quantity: u32,
}

impl CheckoutItem {
    pub fn new(product_id: u32, purchase_price_cents: i64, quantity: u32) -> Self {
        Self {
            product_id,
            purchase_price_cents,
            quantity,
        }
    }
}

/// Outcome of a checkout.
///
/// The warehouse writes `reservation_id`; the customer service writes
/// `customer_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteCheckoutResponse {
    pub order_id: Option<OrderId>,
    pub reservation_id: Option<String>,
    pub customer_name: Option<String>,
}

impl CompleteCheckoutResponse {
    /// Creates an empty response shell for the given order.
    pub fn for_order(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            ..Self::default()
        }
    }
}
