//! Backup workbook → raw document.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use common::{AppError, AppResult};

use super::sheets::{
    SheetLayout, ASSISTANCE_TYPES, BENEFICIARIES, EMPLOYEES, OPERATIONS, SETTINGS, TASKS, USERS,
};
use crate::restore::coerce::{self, RawRecord};
use crate::restore::RawDocument;

/// Parse a backup workbook off the async runtime.
pub async fn read_backup(bytes: Vec<u8>) -> AppResult<RawDocument> {
    tokio::task::spawn_blocking(move || parse_backup(&bytes))
        .await
        .map_err(|e| AppError::internal(format!("Task join error: {e}")))?
}

/// Parse a backup workbook.
///
/// Absent sheets read as empty collections, except tasks which stay absent
/// so the reconciler falls back to the seed task list.
pub fn parse_backup(bytes: &[u8]) -> AppResult<RawDocument> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| AppError::corrupt(format!("not a readable workbook: {e}")))?;
    let sheet_names = workbook.sheet_names();
    debug!(sheets = ?sheet_names, "Reading backup workbook");

    let mut read = |layout: &SheetLayout| -> AppResult<Option<Vec<RawRecord>>> {
        let Some(name) = sheet_names.iter().find(|n| layout.matches(n)) else {
            return Ok(None);
        };
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| AppError::corrupt(format!("sheet '{name}' is unreadable: {e}")))?;
        Ok(Some(range_to_records(&range)))
    };

    let employees = read(&EMPLOYEES)?;
    let beneficiaries = read(&BENEFICIARIES)?;
    let assistance_types = read(&ASSISTANCE_TYPES)?;
    let operations = read(&OPERATIONS)?;
    let users = read(&USERS)?;
    let tasks = read(&TASKS)?;
    let settings = read(&SETTINGS)?;

    let organization_name = settings
        .as_ref()
        .and_then(|rows| rows.first())
        .and_then(|row| coerce::optional_text(row, "organizationName"));

    Ok(RawDocument {
        users: Some(users.unwrap_or_default()),
        employees: Some(employees.unwrap_or_default()),
        beneficiaries: Some(beneficiaries.unwrap_or_default()),
        assistance_types: Some(assistance_types.unwrap_or_default()),
        operations: Some(operations.unwrap_or_default()),
        tasks,
        organization_name,
        organization_logo: None,
    })
}

/// First row is the header; each later row becomes one record.
fn range_to_records(range: &Range<Data>) -> Vec<RawRecord> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let columns: Vec<String> = header.iter().map(|c| cell_to_string(c).trim().to_string()).collect();

    rows.filter_map(|row| {
        let mut record = RawRecord::new();
        for (column, cell) in columns.iter().zip(row) {
            if column.is_empty() {
                continue;
            }
            if let Some(value) = cell_to_value(cell) {
                record.insert(column.clone(), value);
            }
        }
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Value::String(s.clone()))
        }
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Some(Value::String(
                naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )),
            None => {
                warn!(value = %dt, "Unreadable date cell skipped");
                None
            }
        },
        Data::Error(e) => {
            warn!(error = ?e, "Error cell skipped");
            None
        }
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell_to_value(cell) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
