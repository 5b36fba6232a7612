//! Strongly-typed ID wrappers for tracker entities
//!
//! Each entity gets its own UUID newtype so a defect id can never be passed
//! where a project id is expected. Ids display in a short prefixed form
//! (`def-1a2b3c4d`) and can be looked up by either that form or the full UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Display prefix for this id type
            pub const PREFIX: &'static str = $prefix;

            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Full hyphenated UUID, used as the persisted record key
            pub fn key(&self) -> String {
                self.0.to_string()
            }

            /// Parse an ID from a full UUID, with or without the display prefix
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix($prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Whether a user-supplied identifier refers to this id
            ///
            /// Accepts the full UUID, the prefixed full UUID, or the short
            /// display form.
            pub fn matches(&self, identifier: &str) -> bool {
                let identifier = identifier.trim();
                identifier == self.to_string()
                    || Self::parse(identifier).map_or(false, |parsed| parsed == *self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, &self.0.simple().to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(UserId, "usr-");
define_id!(ProjectId, "prj-");
define_id!(DefectId, "def-");
define_id!(CommentId, "cmt-");
define_id!(HistoryId, "his-");
