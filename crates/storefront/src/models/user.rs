//! User identity domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookhaven_core::{Email, UserId, UserRole};

/// The authenticated user as resolved from the identity service.
///
/// Assembled from the remote session (id, email) and the profile record
/// (name, role, creation time). The client never fabricates one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Identity-service user ID.
    pub id: UserId,
    /// Sign-in email address.
    pub email: Email,
    /// Display name from the profile record.
    pub full_name: String,
    /// Role from the profile record.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
