//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address.
///
/// This type provides basic validation for email addresses, ensuring they
/// have a valid structure with a local part and domain separated by an @ symbol.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Must contain an @ symbol
/// - Local part (before @) must not be empty
/// - Domain part (after @) must not be empty
///
/// ## Examples
///
/// ```
/// use bookhaven_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());           // empty
/// assert!(Email::parse("no-at-symbol").is_err()); // missing @
/// assert!(Email::parse("@domain.com").is_err());  // empty local part
/// assert!(Email::parse("user@").is_err());        // empty domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 254 characters
    /// - Does not contain an @ symbol
    /// - Has an empty local part or domain
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
