//! User roles.

use serde::{Deserialize, Serialize};

/// Role of a storefront user.
///
/// Issued by the remote identity service alongside the profile record;
/// the client never assigns a role locally other than the registration
/// default of `Customer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A regular shopper.
    #[default]
    Customer,
    /// Store staff with access to the admin surfaces.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
