//! Integration tests for Bookhaven.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookhaven-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart mutation, totals, and rehydration tests
//! - `session_store` - Auth lifecycle tests against a scripted identity service
//! - `catalog_query` - Query engine tests over the sample shelf
//!
//! This crate's library holds the shared fixtures: a sample book shelf
//! mirroring the seed catalog, and a scriptable in-process identity
//! service.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use bookhaven_core::{BookId, Email, UserId, UserRole};
use bookhaven_storefront::identity::{
    IdentityError, IdentityService, NewProfile, Profile, RemoteSession,
};
use bookhaven_storefront::models::Book;

/// Build a book with sensible defaults for tests.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn book(
    id: &str,
    title: &str,
    author: &str,
    category: &str,
    price: Decimal,
    rating: Option<f64>,
    created_at: DateTime<Utc>,
) -> Book {
    Book {
        id: BookId::new(id),
        title: title.to_string(),
        author: author.to_string(),
        description: format!("{title} by {author}"),
        price,
        image_url: format!("https://images.example.com/{id}.jpeg"),
        category: category.to_string(),
        isbn: format!("978-0-00-{id:0>6}-0"),
        stock_quantity: 10,
        rating,
        created_at,
        updated_at: created_at,
    }
}

/// The seed catalog used across the integration tests.
#[must_use]
pub fn sample_books() -> Vec<Book> {
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 10, 0, 0).single().expect("valid date");
    vec![
        book(
            "1",
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "Fiction",
            Decimal::new(1299, 2),
            Some(4.5),
            day(15),
        ),
        book(
            "2",
            "To Kill a Mockingbird",
            "Harper Lee",
            "Fiction",
            Decimal::new(1499, 2),
            Some(4.8),
            day(14),
        ),
        book(
            "3",
            "1984",
            "George Orwell",
            "Science Fiction",
            Decimal::new(1399, 2),
            Some(4.7),
            day(13),
        ),
        book(
            "4",
            "Pride and Prejudice",
            "Jane Austen",
            "Romance",
            Decimal::new(1199, 2),
            Some(4.6),
            day(12),
        ),
        book(
            "5",
            "The Catcher in the Rye",
            "J.D. Salinger",
            "Fiction",
            Decimal::new(1599, 2),
            Some(4.2),
            day(11),
        ),
        book(
            "6",
            "Harry Potter and the Sorcerer's Stone",
            "J.K. Rowling",
            "Fantasy",
            Decimal::new(1699, 2),
            Some(4.9),
            day(10),
        ),
        book(
            "7",
            "The Lord of the Rings",
            "J.R.R. Tolkien",
            "Fantasy",
            Decimal::new(2499, 2),
            Some(4.8),
            day(9),
        ),
        book(
            "8",
            "Dune",
            "Frank Herbert",
            "Science Fiction",
            Decimal::new(1899, 2),
            Some(4.4),
            day(8),
        ),
    ]
}

/// One registered account in the scripted identity service.
#[derive(Clone)]
pub struct Account {
    pub user_id: UserId,
    pub email: Email,
    pub password: String,
    pub profile: Option<Profile>,
}

/// Scriptable in-process identity service.
///
/// Holds a set of accounts and an optional "active session", and records
/// profile creations so tests can assert on registration side effects.
#[derive(Default)]
pub struct ScriptedIdentity {
    accounts: Mutex<Vec<Account>>,
    active_session: Mutex<Option<RemoteSession>>,
    created_profiles: Mutex<Vec<NewProfile>>,
    /// When true every call fails with a 503.
    pub outage: std::sync::atomic::AtomicBool,
}

impl ScriptedIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account the service will accept.
    pub fn with_account(self, account: Account) -> Self {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(account);
        self
    }

    /// Pretend a session from a previous run is still alive.
    pub fn with_active_session(self, session: RemoteSession) -> Self {
        *self
            .active_session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(session);
        self
    }

    /// Profiles created through `create_profile`.
    #[must_use]
    pub fn created_profiles(&self) -> Vec<NewProfile> {
        self.created_profiles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn check_outage(&self) -> Result<(), IdentityError> {
        if self.outage.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(IdentityError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn find_account(&self, email: &Email) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .find(|a| &a.email == email)
            .cloned()
    }
}

#[async_trait]
impl IdentityService for ScriptedIdentity {
    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<RemoteSession, IdentityError> {
        self.check_outage()?;
        let account = self
            .find_account(email)
            .filter(|a| a.password == password)
            .ok_or(IdentityError::InvalidCredentials)?;

        let session = RemoteSession {
            user_id: account.user_id,
            email: account.email,
        };
        *self
            .active_session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(session.clone());
        Ok(session)
    }

    async fn register(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<RemoteSession, IdentityError> {
        self.check_outage()?;
        if self.find_account(email).is_some() {
            return Err(IdentityError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let account = Account {
            user_id: UserId::new(format!("u-{}", email.local_part())),
            email: email.clone(),
            password: password.to_owned(),
            profile: None,
        };
        let session = RemoteSession {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
        };
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(account);
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<RemoteSession>, IdentityError> {
        self.check_outage()?;
        Ok(self
            .active_session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn end_session(&self) -> Result<(), IdentityError> {
        // The session is gone either way; the error only affects the
        // caller's bookkeeping.
        *self
            .active_session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        self.check_outage()
    }

    async fn profile(&self, user_id: &UserId) -> Result<Profile, IdentityError> {
        self.check_outage()?;
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .find(|a| &a.user_id == user_id)
            .and_then(|a| a.profile.clone())
            .ok_or_else(|| IdentityError::ProfileNotFound(user_id.clone()))
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), IdentityError> {
        self.check_outage()?;
        let mut accounts = self
            .accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(account) = accounts.iter_mut().find(|a| a.user_id == profile.user_id) {
            account.profile = Some(Profile {
                full_name: profile.full_name.clone(),
                role: profile.role,
                created_at: Utc::now(),
            });
        }
        self.created_profiles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(profile.clone());
        Ok(())
    }
}

/// A ready-made customer account with a profile.
#[must_use]
pub fn reader_account() -> Account {
    Account {
        user_id: UserId::new("u-reader"),
        email: Email::parse("reader@example.com").expect("valid fixture email"),
        password: "correct-horse".to_string(),
        profile: Some(Profile {
            full_name: "Avid Reader".to_string(),
            role: UserRole::Customer,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
                .single()
                .expect("valid date"),
        }),
    }
}
