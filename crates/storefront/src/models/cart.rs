//! Cart line item.

use serde::{Deserialize, Serialize};

use super::Book;

/// One (book, quantity) pair in a cart.
///
/// Invariant: a cart holds at most one line item per distinct book ID;
/// adding the same book again merges into the existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineItem {
    /// The book being purchased. A full snapshot is kept so the cart can
    /// render and total itself without a catalog round trip.
    pub book: Book,
    /// Number of copies. Always positive; a quantity update to zero or
    /// below removes the line instead.
    pub quantity: u32,
}
