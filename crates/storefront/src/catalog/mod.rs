//! Catalog query engine.
//!
//! Pure, synchronous transformation of a book collection: text search
//! over title/author, category and price filtering, and a stable
//! multi-key sort. Identical inputs always yield identical ordered
//! output. Fetching the collection itself is the [`CatalogClient`]'s job.

mod client;

pub use client::{BookOrder, CatalogClient, CatalogError, ListBooksParams};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Category label that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Sort key for catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Newest first (descending creation time). The default.
    #[default]
    Newest,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Highest rated first; unrated books sort as rating 0.
    Rating,
    /// Title A-Z, case-insensitive.
    Title,
}

impl SortKey {
    /// Parse a sort key from its wire label.
    ///
    /// Unknown labels fall back to [`SortKey::Newest`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            "title" => Self::Title,
            _ => Self::Newest,
        }
    }
}

/// A catalog query: filters plus a sort key. Constructed per query, never
/// persisted.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    /// Free-text query matched against title and author. Empty or absent
    /// means no text filter.
    pub text: Option<String>,
    /// Category label; absent or [`ALL_CATEGORIES`] means no filter.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub price_min: Decimal,
    /// Inclusive upper price bound.
    pub price_max: Decimal,
    /// Sort key.
    pub sort: SortKey,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            text: None,
            category: None,
            price_min: Decimal::ZERO,
            price_max: Decimal::MAX,
            sort: SortKey::default(),
        }
    }
}

/// Run a query over a book collection.
///
/// Filters are applied first (their order does not affect the result),
/// then a stable sort by the query's key; ties keep the filtered input
/// order.
#[must_use]
pub fn query(books: &[Book], spec: &CatalogQuery) -> Vec<Book> {
    let text = spec
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    let category = spec
        .category
        .as_deref()
        .filter(|c| *c != ALL_CATEGORIES);

    let mut result: Vec<Book> = books
        .iter()
        .filter(|book| match &text {
            Some(needle) => {
                book.title.to_lowercase().contains(needle)
                    || book.author.to_lowercase().contains(needle)
            }
            None => true,
        })
        .filter(|book| category.is_none_or(|label| book.category == label))
        .filter(|book| book.price >= spec.price_min && book.price <= spec.price_max)
        .cloned()
        .collect();

    sort_books(&mut result, spec.sort);
    result
}

/// Stable in-place sort by the given key.
fn sort_books(books: &mut [Book], key: SortKey) {
    match key {
        SortKey::Newest => books.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PriceLow => books.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceHigh => books.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Rating => books.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
        }),
        SortKey::Title => {
            books.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use bookhaven_core::BookId;

    use super::*;

    fn book(id: &str, title: &str, author: &str, category: &str, price: Decimal) -> Book {
        // Later ids are created later, so `Newest` ordering is by id desc.
        let day: u32 = id.parse().unwrap();
        Book {
            id: BookId::new(id),
            title: title.to_string(),
            author: author.to_string(),
            description: String::new(),
            price,
            image_url: String::new(),
            category: category.to_string(),
            isbn: String::new(),
            stock_quantity: 10,
            rating: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book("1", "The Great Gatsby", "F. Scott Fitzgerald", "Fiction", dec!(12.99)),
            book("2", "To Kill a Mockingbird", "Harper Lee", "Fiction", dec!(14.99)),
            book("3", "1984", "George Orwell", "Science Fiction", dec!(13.99)),
            book("4", "Dune", "Frank Herbert", "Science Fiction", dec!(18.99)),
        ]
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn test_default_query_returns_all_newest_first() {
        let result = query(&shelf(), &CatalogQuery::default());
        assert_eq!(
            titles(&result),
            ["Dune", "1984", "To Kill a Mockingbird", "The Great Gatsby"]
        );
    }

    #[test]
    fn test_text_filter_matches_title_case_insensitively() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                text: Some("dune".to_string()),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(titles(&result), ["Dune"]);
    }

    #[test]
    fn test_text_filter_matches_author() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                text: Some("orwell".to_string()),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(titles(&result), ["1984"]);
    }

    #[test]
    fn test_empty_text_is_no_filter() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                text: Some(String::new()),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                category: Some("Science Fiction".to_string()),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(titles(&result), ["Dune", "1984"]);
    }

    #[test]
    fn test_all_category_is_no_filter() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                category: Some(ALL_CATEGORIES.to_string()),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                price_min: dec!(13.99),
                price_max: dec!(14.99),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(titles(&result), ["1984", "To Kill a Mockingbird"]);
    }

    #[test]
    fn test_price_low_sorts_ascending() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                sort: SortKey::PriceLow,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(
            titles(&result),
            ["The Great Gatsby", "1984", "To Kill a Mockingbird", "Dune"]
        );
    }

    #[test]
    fn test_price_low_example_from_storefront() {
        let books = vec![
            book("8", "Dune", "Frank Herbert", "Science Fiction", dec!(18.99)),
            book("3", "1984", "George Orwell", "Science Fiction", dec!(13.99)),
        ];
        let result = query(
            &books,
            &CatalogQuery {
                sort: SortKey::PriceLow,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(titles(&result), ["1984", "Dune"]);
    }

    #[test]
    fn test_price_high_sorts_descending() {
        let result = query(
            &shelf(),
            &CatalogQuery {
                sort: SortKey::PriceHigh,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(
            titles(&result),
            ["Dune", "To Kill a Mockingbird", "1984", "The Great Gatsby"]
        );
    }

    #[test]
    fn test_rating_sort_treats_missing_as_zero() {
        let mut books = shelf();
        for (book, rating) in books.iter_mut().zip([Some(4.5), None, Some(4.7), Some(4.4)]) {
            book.rating = rating;
        }
        let result = query(
            &books,
            &CatalogQuery {
                sort: SortKey::Rating,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(
            titles(&result),
            ["1984", "The Great Gatsby", "Dune", "To Kill a Mockingbird"]
        );
    }

    #[test]
    fn test_title_sort_is_case_insensitive() {
        let books = vec![
            book("1", "zebra stories", "A", "Fiction", dec!(1)),
            book("2", "Aardvark Tales", "B", "Fiction", dec!(1)),
            book("3", "middle March", "C", "Fiction", dec!(1)),
        ];
        let result = query(
            &books,
            &CatalogQuery {
                sort: SortKey::Title,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(
            titles(&result),
            ["Aardvark Tales", "middle March", "zebra stories"]
        );
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut books = shelf();
        for book in &mut books {
            book.price = dec!(9.99);
        }
        let result = query(
            &books,
            &CatalogQuery {
                sort: SortKey::PriceLow,
                ..CatalogQuery::default()
            },
        );
        // All prices equal: the filtered input order survives.
        assert_eq!(
            titles(&result),
            ["The Great Gatsby", "To Kill a Mockingbird", "1984", "Dune"]
        );
    }

    #[test]
    fn test_filters_commute() {
        let spec = CatalogQuery {
            text: Some("the".to_string()),
            category: Some("Fiction".to_string()),
            price_min: dec!(10),
            price_max: dec!(20),
            ..CatalogQuery::default()
        };

        // Narrow by category first, then run the full query over the
        // remainder: the end result is identical.
        let narrowed: Vec<Book> = shelf()
            .into_iter()
            .filter(|b| b.category == "Fiction")
            .collect();
        let via_prefilter = query(&narrowed, &spec);
        let direct = query(&shelf(), &spec);

        assert_eq!(titles(&direct), titles(&via_prefilter));
    }

    #[test]
    fn test_query_does_not_mutate_input() {
        let books = shelf();
        let _ = query(
            &books,
            &CatalogQuery {
                sort: SortKey::Title,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(titles(&books).first().copied(), Some("The Great Gatsby"));
    }

    #[test]
    fn test_sort_key_parse_falls_back_to_newest() {
        assert_eq!(SortKey::parse("price-low"), SortKey::PriceLow);
        assert_eq!(SortKey::parse("price-high"), SortKey::PriceHigh);
        assert_eq!(SortKey::parse("rating"), SortKey::Rating);
        assert_eq!(SortKey::parse("title"), SortKey::Title);
        assert_eq!(SortKey::parse("newest"), SortKey::Newest);
        assert_eq!(SortKey::parse("definitely-not-a-key"), SortKey::Newest);
    }

    #[test]
    fn test_sort_key_serde_labels() {
        let json = serde_json::to_string(&SortKey::PriceLow).unwrap();
        assert_eq!(json, "\"price-low\"");
    }
}
