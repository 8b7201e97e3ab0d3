//! Newtype IDs for backend-owned portfolio entities.
//!
//! The REST backend assigns numeric IDs to projects and certifications.
//! Wrapping them keeps a project ID from being passed where a certification
//! ID is expected when building admin URLs.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `Display`, `FromStr`, `From<i64>` and `Into<i64>`
///
/// # Example
///
/// ```rust
/// # use portfolio_core::define_id;
/// define_id!(PostId);
/// define_id!(TagId);
///
/// let post_id = PostId::new(1);
/// assert_eq!(post_id.to_string(), "1");
/// assert_eq!("7".parse::<TagId>().unwrap(), TagId::new(7));
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProjectId);
define_id!(CertificationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_deserialize_from_numbers() {
        let id: ProjectId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ProjectId::new(42));
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("9".parse::<CertificationId>().unwrap().as_i64(), 9);
        assert!("nine".parse::<CertificationId>().is_err());
    }
}
