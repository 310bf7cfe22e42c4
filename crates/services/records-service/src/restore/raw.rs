//! Untrusted document as read from a backup.

use serde_json::Value;

use common::{AppError, AppResult};

use super::coerce::RawRecord;

/// Collections that must be present for a backup to be accepted
pub const REQUIRED_COLLECTIONS: &[&str] =
    &["employees", "beneficiaries", "assistanceTypes", "operations"];

/// A document whose collections are lists of untyped records.
///
/// `None` means the collection was absent from the source.
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    pub users: Option<Vec<RawRecord>>,
    pub employees: Option<Vec<RawRecord>>,
    pub beneficiaries: Option<Vec<RawRecord>>,
    pub assistance_types: Option<Vec<RawRecord>>,
    pub operations: Option<Vec<RawRecord>>,
    pub tasks: Option<Vec<RawRecord>>,
    pub organization_name: Option<String>,
    pub organization_logo: Option<String>,
}

impl RawDocument {
    pub fn from_json_str(text: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
            .map_err(|e| AppError::corrupt(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> AppResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(AppError::corrupt("document root is not an object"));
        };

        let mut take = |name: &str| -> AppResult<Option<Vec<RawRecord>>> {
            match root.remove(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Array(items)) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(record) => Ok(record),
                        _ => Err(AppError::corrupt(format!(
                            "'{}' contains an entry that is not a record",
                            name
                        ))),
                    })
                    .collect::<AppResult<Vec<_>>>()
                    .map(Some),
                Some(_) => Err(AppError::corrupt(format!("'{}' is not a list", name))),
            }
        };

        let users = take("users")?;
        let employees = take("employees")?;
        let beneficiaries = take("beneficiaries")?;
        let assistance_types = take("assistanceTypes")?;
        let operations = take("operations")?;
        let tasks = take("tasks")?;

        let text_field = |v: Option<&Value>| match v {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Ok(Self {
            organization_name: text_field(root.get("organizationName")),
            organization_logo: text_field(root.get("organizationLogo")),
            users,
            employees,
            beneficiaries,
            assistance_types,
            operations,
            tasks,
        })
    }

    /// Names of required collections that are absent.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let present = [
            self.employees.is_some(),
            self.beneficiaries.is_some(),
            self.assistance_types.is_some(),
            self.operations.is_some(),
        ];
        REQUIRED_COLLECTIONS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }
}
