//! Serde adapters for the persisted document shape.

use serde::{Deserialize, Deserializer, Serializer};

use crate::constants::VOLUNTEER_ID;

/// `Option<String>` employee reference. `None` is the volunteer assignment
/// and travels as `"VOLUNTEER"`.
pub mod volunteer {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_str(id),
            None => serializer.serialize_str(VOLUNTEER_ID),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(from_wire(raw.as_deref().unwrap_or("")))
    }

    /// Map a wire value to the in-memory reference.
    pub fn from_wire(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == VOLUNTEER_ID {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Optional text where an empty string means absent.
pub mod empty_as_none {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|v| !v.is_empty()))
    }
}

/// Trimmed, non-empty optional text.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
