//! Session error types.

use thiserror::Error;

use crate::identity::IdentityError;

/// Errors surfaced by `sign_in` and `sign_up`.
///
/// The `Display` rendering is the human-readable failure reason handed to
/// presentation code; the store itself never panics across its boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The supplied email is not structurally valid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bookhaven_core::EmailError),

    /// The identity service rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The identity exists but has no profile record, or the profile
    /// operation failed. Treated as an authentication failure.
    #[error("account profile could not be resolved")]
    ProfileMissing,

    /// The identity service refused the request (e.g. email already
    /// registered).
    #[error("identity service rejected the request: {0}")]
    Rejected(String),

    /// The identity service could not be reached or failed internally.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for SessionError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::ProfileNotFound(_) => Self::ProfileMissing,
            IdentityError::Api { status, message } if status >= 500 => {
                Self::Unavailable(format!("{status}: {message}"))
            }
            IdentityError::Api { message, .. } => Self::Rejected(message),
            IdentityError::Http(e) => Self::Unavailable(e.to_string()),
            IdentityError::Parse(msg) => Self::Unavailable(msg),
        }
    }
}
