//! HTTP client for the remote catalog service.
//!
//! Read-only: the storefront lists books and never writes catalog data.

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::models::Book;

/// Errors that can occur when fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response body.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Server-side ordering for a book listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookOrder {
    /// Order by creation time.
    #[default]
    CreatedAt,
    /// Order by price.
    Price,
    /// Order by rating.
    Rating,
    /// Order by title.
    Title,
}

impl BookOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Price => "price",
            Self::Rating => "rating",
            Self::Title => "title",
        }
    }
}

/// Parameters for [`CatalogClient::list_books`].
#[derive(Debug, Clone, Copy)]
pub struct ListBooksParams {
    /// Column to order by.
    pub order_by: BookOrder,
    /// Descending order when true.
    pub descending: bool,
    /// Maximum number of records to return.
    pub limit: Option<u32>,
}

impl Default for ListBooksParams {
    fn default() -> Self {
        // Newest first, matching the storefront's default shelf view.
        Self {
            order_by: BookOrder::CreatedAt,
            descending: true,
            limit: None,
        }
    }
}

/// Catalog API client.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "apikey",
            reqwest::header::HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| CatalogError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// List books from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn list_books(&self, params: ListBooksParams) -> Result<Vec<Book>, CatalogError> {
        let direction = if params.descending { "desc" } else { "asc" };
        let mut url = format!(
            "{}/rest/v1/books?order={}.{direction}",
            self.base_url.as_str().trim_end_matches('/'),
            params.order_by.as_str(),
        );
        if let Some(limit) = params.limit {
            url.push_str(&format!("&limit={limit}"));
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let books: Vec<Book> = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        debug!(count = books.len(), "listed books");
        Ok(books)
    }
}
