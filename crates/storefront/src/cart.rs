//! Shopping cart store.
//!
//! Owns the list of (book, quantity) line items and their derived totals.
//! Every mutation persists synchronously before returning and then
//! notifies subscribers. No operation here can fail: persistence problems
//! are logged and the in-memory state stays authoritative.

use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bookhaven_core::BookId;

use crate::models::{Book, CartLineItem};
use crate::persist::StateStore;
use crate::subscribe::{ListenerSet, Subscription};

/// Namespaced persistence key for the cart record.
pub const CART_STORE_KEY: &str = "cart-store";

const CART_SCHEMA_VERSION: u32 = 1;

/// Durable shape of the cart. The only cart artifact that survives a
/// restart.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartRecord {
    /// Schema version for forward-compatible reads.
    pub version: u32,
    /// Line items in insertion order.
    pub items: Vec<CartLineItem>,
}

/// The shopping cart.
///
/// Constructed once at process start and passed by reference to
/// consumers. Rehydrates from its [`StateStore`] on construction; a
/// missing or unreadable record yields an empty cart.
pub struct CartStore {
    items: Mutex<Vec<CartLineItem>>,
    persist: Box<dyn StateStore<CartRecord>>,
    listeners: ListenerSet,
}

impl CartStore {
    /// Create the store, rehydrating any persisted cart.
    #[must_use]
    pub fn new(persist: Box<dyn StateStore<CartRecord>>) -> Self {
        let items = match persist.load() {
            Ok(Some(record)) => {
                debug!(lines = record.items.len(), "rehydrated cart");
                record.items
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                // Local recovery: a corrupt record becomes an empty cart.
                warn!(error = %err, "failed to load persisted cart, starting empty");
                Vec::new()
            }
        };

        Self {
            items: Mutex::new(items),
            persist,
            listeners: ListenerSet::new(),
        }
    }

    /// Add `quantity` copies of `book` to the cart.
    ///
    /// If a line item for the book already exists its quantity is
    /// incremented; otherwise a new line is appended. No stock check is
    /// performed against `book.stock_quantity`. A zero quantity is a
    /// no-op.
    pub fn add_item(&self, book: Book, quantity: u32) {
        if quantity == 0 {
            debug!(book_id = %book.id, "ignoring add_item with zero quantity");
            return;
        }

        {
            let mut items = self.lock_items();
            if let Some(line) = items.iter_mut().find(|line| line.book.id == book.id) {
                line.quantity += quantity;
            } else {
                items.push(CartLineItem { book, quantity });
            }
            self.save(&items);
        }
        self.listeners.notify();
    }

    /// Remove the line item for `book_id`, if present.
    pub fn remove_item(&self, book_id: &BookId) {
        {
            let mut items = self.lock_items();
            items.retain(|line| &line.book.id != book_id);
            self.save(&items);
        }
        self.listeners.notify();
    }

    /// Set the quantity of the line item for `book_id`.
    ///
    /// A quantity of zero or below removes the line, exactly like
    /// [`CartStore::remove_item`]. No-op if the book is not in the cart.
    pub fn update_quantity(&self, book_id: &BookId, quantity: i32) {
        let Ok(quantity) = u32::try_from(quantity) else {
            self.remove_item(book_id);
            return;
        };
        if quantity == 0 {
            self.remove_item(book_id);
            return;
        }

        {
            let mut items = self.lock_items();
            if let Some(line) = items.iter_mut().find(|line| &line.book.id == book_id) {
                line.quantity = quantity;
            }
            self.save(&items);
        }
        self.listeners.notify();
    }

    /// Empty the cart.
    pub fn clear(&self) {
        {
            let mut items = self.lock_items();
            items.clear();
            self.save(&items);
        }
        self.listeners.notify();
    }

    /// Sum of `price * quantity` over all line items.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lock_items()
            .iter()
            .map(|line| line.book.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Sum of quantities over all line items.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lock_items().iter().map(|line| line.quantity).sum()
    }

    /// Snapshot of the line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock_items().clone()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    /// Register a listener invoked after every committed mutation.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<CartLineItem>> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Persist the current items. Called with the state lock held so
    /// saves land in mutation order.
    fn save(&self, items: &[CartLineItem]) {
        let record = CartRecord {
            version: CART_SCHEMA_VERSION,
            items: items.to_vec(),
        };
        if let Err(err) = self.persist.save(&record) {
            warn!(error = %err, "failed to persist cart");
        }
    }
}
