//! Cart store integration tests: mutation semantics, derived totals, and
//! rehydration through the file-backed persistence layer.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bookhaven_core::BookId;
use bookhaven_integration_tests::sample_books;
use bookhaven_storefront::cart::{CART_STORE_KEY, CartRecord, CartStore};
use bookhaven_storefront::persist::JsonFileStore;

fn file_backed_store(dir: &std::path::Path) -> CartStore {
    CartStore::new(Box::new(JsonFileStore::<CartRecord>::new(
        dir,
        CART_STORE_KEY,
    )))
}

#[test]
fn cart_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let books = sample_books();

    {
        let cart = file_backed_store(dir.path());
        cart.add_item(books[0].clone(), 2);
        cart.add_item(books[2].clone(), 1);
    }

    // A fresh store over the same data dir sees the same cart.
    let rehydrated = file_backed_store(dir.path());
    assert_eq!(rehydrated.len(), 2);
    assert_eq!(rehydrated.total_items(), 3);
    assert_eq!(
        rehydrated.total_price(),
        books[0].price * Decimal::from(2) + books[2].price
    );
}

#[test]
fn cart_record_is_written_under_the_namespaced_key() {
    let dir = tempfile::tempdir().unwrap();
    let cart = file_backed_store(dir.path());
    cart.add_item(sample_books()[0].clone(), 1);

    let path = dir.path().join(format!("{CART_STORE_KEY}.json"));
    let raw = std::fs::read_to_string(path).unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(record["version"], 1);
    assert_eq!(record["items"].as_array().unwrap().len(), 1);
}

#[test]
fn corrupt_cart_file_recovers_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{CART_STORE_KEY}.json")),
        "{\"version\":1,\"items\":[{\"broken\"",
    )
    .unwrap();

    let cart = file_backed_store(dir.path());
    assert!(cart.is_empty());

    // The store keeps working and overwrites the bad record.
    cart.add_item(sample_books()[0].clone(), 1);
    let reloaded = file_backed_store(dir.path());
    assert_eq!(reloaded.total_items(), 1);
}

#[test]
fn worked_example_add_to_existing_line() {
    let dir = tempfile::tempdir().unwrap();
    let cart = file_backed_store(dir.path());

    let mut book_a = sample_books()[0].clone();
    book_a.price = dec!(10);

    cart.add_item(book_a.clone(), 1);
    cart.add_item(book_a, 2);

    let items = cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(cart.total_price(), dec!(30));
}

#[test]
fn update_quantity_zero_equals_remove() {
    let dir = tempfile::tempdir().unwrap();
    let books = sample_books();

    let removed = file_backed_store(dir.path());
    removed.add_item(books[0].clone(), 2);
    removed.remove_item(&BookId::new("1"));

    let updated = {
        let dir = tempfile::tempdir().unwrap();
        let cart = file_backed_store(dir.path());
        cart.add_item(books[0].clone(), 2);
        cart.update_quantity(&BookId::new("1"), 0);
        cart.items()
    };

    assert_eq!(removed.items().len(), updated.len());
    assert!(removed.is_empty());
}

#[test]
fn clear_then_totals_are_zero_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let cart = file_backed_store(dir.path());
        for book in sample_books() {
            cart.add_item(book, 1);
        }
        cart.clear();
    }

    let rehydrated = file_backed_store(dir.path());
    assert_eq!(rehydrated.total_price(), Decimal::ZERO);
    assert_eq!(rehydrated.total_items(), 0);
}
