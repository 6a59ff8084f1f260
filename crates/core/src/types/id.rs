//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// Both the catalog backend and the identity service issue opaque string
/// identifiers, so the wrapped representation is `String` rather than a
/// numeric type.
///
/// # Example
///
/// ```rust
/// # use bookhaven_core::define_id;
/// define_id!(BookId);
/// define_id!(UserId);
///
/// let book_id = BookId::new("b-42");
/// let user_id = UserId::new("u-42");
///
/// // These are different types, so this won't compile:
/// // let _: BookId = user_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(BookId);
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_as_str() {
        let id = BookId::new("b-1");
        assert_eq!(id.as_str(), "b-1");
    }

    #[test]
    fn test_display() {
        let id = UserId::new("u-7");
        assert_eq!(format!("{id}"), "u-7");
    }

    #[test]
    fn test_from_str() {
        let id: BookId = "b-3".into();
        assert_eq!(id, BookId::new("b-3"));
    }

    #[test]
    fn test_serde_transparent() {
        let id = BookId::new("b-9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"b-9\"");

        let parsed: BookId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
