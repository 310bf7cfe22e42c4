//! Assistance type catalog entry.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistanceType {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssistanceTypeInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

impl AssistanceTypeInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_input;

    #[test]
    fn blank_name_is_rejected() {
        let err = validate_input(&AssistanceTypeInput::new("   ")).unwrap_err();
        assert!(err.to_string().contains("name: Name is required"));
    }
}
