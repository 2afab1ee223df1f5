//! Newtype IDs for type-safe document references.
//!
//! Every entity lives in a document collection keyed by an opaque string id.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing an order id where a product id is expected.

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `generate()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use sareine_core::define_id;
/// define_id!(CartId);
/// define_id!(WishlistId);
///
/// let cart = CartId::new("abc");
/// let wishlist = WishlistId::new("abc");
///
/// // These are different types, so this won't compile:
/// // let _: CartId = wishlist;
/// # let _ = (cart, wishlist);
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
            /// Wrap an existing document id.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random document id (20 lowercase hex chars).
            #[must_use]
            pub fn generate() -> Self {
                let mut id = ::uuid::Uuid::new_v4().simple().to_string();
                id.truncate(20);
                Self(id)
            }

            /// Get the underlying id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the id string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the id is empty (or only whitespace).
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
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

// Standard document ids
define_id!(OrderId);
define_id!(PreorderId);
define_id!(ProductId);
define_id!(UserId);
define_id!(EmailLogId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_twenty_hex_chars() {
        let id = ProductId::generate();
        assert_eq!(id.as_str().len(), 20);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
    }

    #[test]
    fn test_serde_transparent() {
        let id = OrderId::new("ord_123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ord_123\"");

        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_is_blank() {
        assert!(UserId::new("  ").is_blank());
        assert!(!UserId::new("u1").is_blank());
    }
}
