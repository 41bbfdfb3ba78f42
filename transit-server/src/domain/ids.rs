//! Schedule identifier types.
//!
//! Feed identifiers are opaque strings. Wrapping them in distinct types
//! keeps a stop id from being passed where a trip id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! feed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a feed identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

feed_id!(
    /// Identifier of a physical stop.
    StopId
);
feed_id!(
    /// Identifier of a route (a named line).
    RouteId
);
feed_id!(
    /// Identifier of one scheduled run along a route.
    TripId
);
