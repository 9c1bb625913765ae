//! Product lookup contracts.

use serde::{Deserialize, Serialize};

/// Search for products whose details match a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsBySearchTermRequest {
    pub search_term: String,
}

impl ProductsBySearchTermRequest {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
        }
    }
}

/// One entry of a product search.
///
/// The details service seeds `id`, `name` and `description`; pricing,
/// reviews and the warehouse fill in the remaining fields by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBySearchTerm {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub current_price_cents: i64,
    pub average_review: u8,
    pub stock_level: u32,
}

impl ProductBySearchTerm {
    /// Creates a stub entry carrying only identity and details.
    pub fn stub(id: u32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Response shape for a product search.
pub type ProductsBySearchTermResponse = Vec<ProductBySearchTerm>;

/// Look up a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductByIdRequest {
    pub product_id: u32,
}

impl ProductByIdRequest {
    pub fn new(product_id: u32) -> Self {
        Self { product_id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductByIdResponse {
    pub name: String,
    pub description: String,
    pub current_price_cents: i64,
    pub reviews: Vec<ProductReview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReview {
    pub rating: u8,
    pub comment: String,
}

impl ProductReview {
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
        }
    }
}
