//! HTTP client for the identity/profile service.
//!
//! Speaks the identity backend's REST API: password-grant token exchange
//! for sign-in, a signup endpoint for registration, and a `profiles`
//! resource for the profile records. The bearer token for the current
//! session is held in memory only; restarts re-resolve the session
//! through `current_session`.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use bookhaven_core::{Email, UserId};

use crate::config::IdentityConfig;

use super::{IdentityError, IdentityService, NewProfile, Profile, RemoteSession};

/// HTTP implementation of [`IdentityService`].
pub struct HttpIdentityClient {
    client: reqwest::Client,
    base_url: url::Url,
    access_token: Mutex<Option<SecretString>>,
}

impl HttpIdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();

        // Publishable API key, sent on every request.
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| IdentityError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            access_token: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn bearer(&self) -> Option<String> {
        self.access_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    fn store_token(&self, token: Option<SecretString>) {
        *self
            .access_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = token;
    }

    async fn api_error(response: reqwest::Response) -> IdentityError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        IdentityError::Api { status, message }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<RemoteSession, IdentityError> {
        let url = self.endpoint("/auth/v1/token?grant_type=password");
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        self.store_token(Some(SecretString::from(token.access_token)));
        debug!(user_id = %token.user.id, "authenticated");

        Ok(RemoteSession {
            user_id: token.user.id,
            email: token.user.email,
        })
    }

    async fn register(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<RemoteSession, IdentityError> {
        let url = self.endpoint("/auth/v1/signup");
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let user: RemoteUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        Ok(RemoteSession {
            user_id: user.id,
            email: user.email,
        })
    }

    async fn current_session(&self) -> Result<Option<RemoteSession>, IdentityError> {
        let Some(bearer) = self.bearer() else {
            return Ok(None);
        };

        let url = self.endpoint("/auth/v1/user");
        let response = self
            .client
            .get(&url)
            .header("Authorization", bearer)
            .send()
            .await?;
        let status = response.status();

        // An expired or revoked token means no session, not a failure.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.store_token(None);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let user: RemoteUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        Ok(Some(RemoteSession {
            user_id: user.id,
            email: user.email,
        }))
    }

    async fn end_session(&self) -> Result<(), IdentityError> {
        let bearer = self.bearer();
        // The local token is dropped regardless of what the service says.
        self.store_token(None);

        let Some(bearer) = bearer else {
            return Ok(());
        };

        let url = self.endpoint("/auth/v1/logout");
        let response = self
            .client
            .post(&url)
            .header("Authorization", bearer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(())
    }

    async fn profile(&self, user_id: &UserId) -> Result<Profile, IdentityError> {
        let url = format!(
            "{}?user_id=eq.{}",
            self.endpoint("/rest/v1/profiles"),
            user_id
        );

        let mut request = self.client.get(&url);
        if let Some(bearer) = self.bearer() {
            request = request.header("Authorization", bearer);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut profiles: Vec<Profile> = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        profiles
            .pop()
            .ok_or_else(|| IdentityError::ProfileNotFound(user_id.clone()))
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), IdentityError> {
        let url = self.endpoint("/rest/v1/profiles");

        let mut request = self.client.post(&url).json(profile);
        if let Some(bearer) = self.bearer() {
            request = request.header("Authorization", bearer);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(())
    }
}

/// Response from the password-grant token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: RemoteUser,
}

/// User resource embedded in auth responses.
#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: UserId,
    email: Email,
}
