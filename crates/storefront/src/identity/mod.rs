//! Remote identity/profile service interface.
//!
//! The storefront consumes the identity backend through the
//! [`IdentityService`] trait; [`HttpIdentityClient`] is the production
//! implementation and tests substitute in-process fakes.

mod client;

pub use client::HttpIdentityClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bookhaven_core::{Email, UserId, UserRole};

/// Errors that can occur when talking to the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The service rejected the supplied email/password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No profile record exists for an authenticated user.
    #[error("profile not found for user: {0}")]
    ProfileNotFound(UserId),

    /// HTTP request failed (network, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

/// The authenticated remote session: who the identity service says the
/// current user is.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSession {
    /// Identity-service user ID.
    pub user_id: UserId,
    /// Email the session was established with.
    pub email: Email,
}

/// A profile record associated with an identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Display name.
    pub full_name: String,
    /// Role assigned by the store.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a profile record at registration time.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    /// Identity-service user ID the profile belongs to.
    pub user_id: UserId,
    /// Account email, denormalized into the profile.
    pub email: Email,
    /// Display name supplied at sign-up.
    pub full_name: String,
    /// Role; always `customer` for self-service registration.
    pub role: UserRole,
}

/// The consumed identity/profile backend.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Authenticate with email and password, establishing a session.
    ///
    /// # Errors
    ///
    /// `IdentityError::InvalidCredentials` when the service rejects the
    /// pair; transport or service errors otherwise.
    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<RemoteSession, IdentityError>;

    /// Create a new account. Does not establish a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses the registration (e.g.
    /// email already in use) or the request fails.
    async fn register(&self, email: &Email, password: &str)
    -> Result<RemoteSession, IdentityError>;

    /// Return the existing session, if the service still has one.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport or service failure; an absent
    /// session is `Ok(None)`.
    async fn current_session(&self) -> Result<Option<RemoteSession>, IdentityError>;

    /// Terminate the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails; callers may ignore it.
    async fn end_session(&self) -> Result<(), IdentityError>;

    /// Fetch the profile record for a user.
    ///
    /// # Errors
    ///
    /// `IdentityError::ProfileNotFound` when the identity exists but has
    /// no profile record; transport or service errors otherwise.
    async fn profile(&self, user_id: &UserId) -> Result<Profile, IdentityError>;

    /// Create a profile record for a freshly registered user.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses the record or the request
    /// fails.
    async fn create_profile(&self, profile: &NewProfile) -> Result<(), IdentityError>;
}
