//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A session duration below the one-minute floor.
    #[error("duration must be at least {min} minute, got {value}")]
    DurationTooShort { value: i64, min: u32 },

    /// A time-of-day string that is not `HH:mm`.
    #[error("invalid time of day: {value:?} (expected HH:mm)")]
    InvalidTime { value: String },

    /// Unknown chart granularity.
    #[error("invalid granularity: {value} (expected day, week, month or year)")]
    InvalidGranularity { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Generates a fresh random ID.
            ///
            /// IDs are the first nine hex digits of a v4 UUID, short enough to type.
            pub fn generate() -> Self {
                let mut id = Uuid::new_v4().simple().to_string();
                id.truncate(9);
                Self(id)
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated task identifier.
    ///
    /// A task keeps its ID when archived, so the resulting history record
    /// shares it.
    TaskId, "task ID"
);

define_string_id!(
    /// A validated history record identifier.
    HistoryId, "history ID"
);

define_string_id!(
    /// A validated preset identifier (e.g. `p1`).
    PresetId, "preset ID"
);

impl From<TaskId> for HistoryId {
    fn from(id: TaskId) -> Self {
        Self(id.0)
    }
}

/// A session length in whole minutes, never below one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Minutes(u32);

impl Minutes {
    /// The shortest allowed session.
    pub const MIN: Self = Self(1);

    /// Creates a duration after validation.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value < Self::MIN.0 {
            return Err(ValidationError::DurationTooShort {
                value: i64::from(value),
                min: Self::MIN.0,
            });
        }
        Ok(Self(value))
    }

    /// Creates a duration, flooring at [`Minutes::MIN`] and saturating at `u32::MAX`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let floor = i64::from(Self::MIN.0);
        Self(u32::try_from(value.max(floor)).unwrap_or(u32::MAX))
    }

    /// Returns the inner minute count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Converts to a `chrono::Duration`.
    #[must_use]
    pub fn to_duration(self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.0))
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl TryFrom<u32> for Minutes {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Minutes> for u32 {
    fn from(m: Minutes) -> Self {
        m.0
    }
}
