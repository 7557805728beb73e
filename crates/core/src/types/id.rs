//! Newtype IDs for type-safe entity references.
//!
//! Fixture documents key customers, stores, partners and products by UUID
//! strings, so every ID here wraps a `String`. Order IDs are database-generated
//! `ObjectId`s and live in the ops crate instead.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
/// - `From<Id> for Bson` (with the `mongodb` feature)
///
/// # Example
///
/// ```rust
/// # use quickdrop_core::define_id;
/// define_id!(CustomerId);
/// define_id!(StoreId);
///
/// let customer = CustomerId::new("0d4a13c3");
/// let store = StoreId::new("0d4a13c3");
///
/// assert_eq!(customer.as_str(), store.as_str());
/// // These are different types, so this won't compile:
/// // let _: CustomerId = store;
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
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID, returning the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "mongodb")]
        impl From<$name> for ::bson::Bson {
            fn from(id: $name) -> Self {
                ::bson::Bson::String(id.0)
            }
        }

        // `From<&$name> for Bson` is provided by bson's blanket
        // `impl<T: Clone + Into<Bson>> From<&T> for Bson`.
    };
}

// Define standard entity IDs
define_id!(CustomerId);
define_id!(StoreId);
define_id!(PartnerId);
define_id!(ProductId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = ProductId::new("345d1a0e-a274-44fe-875c-901a5d01bedc");
        assert_eq!(id.to_string(), "345d1a0e-a274-44fe-875c-901a5d01bedc");
        assert_eq!(id.as_str(), "345d1a0e-a274-44fe-875c-901a5d01bedc");
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = CustomerId::new("abc");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc\"");

        let back: CustomerId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_from_str() {
        let id: PartnerId = "74426dcf".parse().expect("infallible");
        assert_eq!(id.into_inner(), "74426dcf");
    }
}
