//! Newtype IDs for type-safe entity references.
//!
//! Every row in the hosted backend is keyed by a UUID. Use the `define_id!`
//! macro to create wrappers that prevent accidentally passing a review ID
//! where a business ID is expected.

/// Macro to define a type-safe UUID wrapper.
///
/// Creates a newtype wrapper around `uuid::Uuid` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `random()`, `as_uuid()`
/// - `Display`, `FromStr` and `From<Uuid>` implementations
///
/// # Example
///
/// ```rust
/// # use sol_city_core::define_id;
/// define_id!(PostId);
/// define_id!(CommentId);
///
/// let post_id = PostId::random();
/// let parsed: PostId = post_id.to_string().parse().unwrap();
/// assert_eq!(post_id, parsed);
///
/// // These are different types, so this won't compile:
/// // let _: CommentId = post_id;
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
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Identity provider user IDs (also the key of `profiles` and `user_roles`)
define_id!(UserId);

// Table row IDs
define_id!(BusinessId);
define_id!(ReviewId);
define_id!(NewsPostId);
define_id!(EventId);
define_id!(PropertyId);
define_id!(RoleAssignmentId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_and_display_agree() {
        let id: BusinessId = "6f1c2a1e-4b7d-4c55-9a59-2f1e6c1d0b11".parse().unwrap();
        assert_eq!(id.to_string(), "6f1c2a1e-4b7d-4c55-9a59-2f1e6c1d0b11");
    }

    #[test]
    fn test_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
