//! Book catalog record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bookhaven_core::BookId;

/// A book in the catalog.
///
/// Owned by the catalog backend; the client only ever holds read-only
/// copies of these records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique, stable identifier issued by the catalog backend.
    pub id: BookId,
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Long-form description.
    pub description: String,
    /// Price in the store currency. Non-negative.
    pub price: Decimal,
    /// Cover image reference.
    pub image_url: String,
    /// Free-text category label (e.g. "Fiction", "Science Fiction").
    pub category: String,
    /// ISBN.
    pub isbn: String,
    /// Units in stock at the backend. Informational only; the cart does
    /// not enforce it.
    pub stock_quantity: u32,
    /// Average rating on a 0-5 scale, if the book has been rated.
    #[serde(default)]
    pub rating: Option<f64>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}
