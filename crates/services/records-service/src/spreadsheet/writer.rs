//! Workbook encoding.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use serde_json::Value;

use common::{AppError, AppResult};
use domain::{Document, Note};

use super::sheets::{
    SheetLayout, ASSISTANCE_TYPES, BENEFICIARIES, EMPLOYEES, OPERATIONS, SETTINGS, TASKS, USERS,
};
use crate::restore::coerce::format_notes;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// One worksheet: a header row and data rows.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(name: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// One row per record, one column per layout field.
    pub fn from_records<T: Serialize>(layout: &SheetLayout, records: &[T]) -> AppResult<Self> {
        let mut table = Table::new(layout.name, layout.columns.iter().copied());
        for record in records {
            let value = serde_json::to_value(record)?;
            let row = layout
                .columns
                .iter()
                .map(|column| json_to_cell(value.get(*column)))
                .collect();
            table.push(row);
        }
        Ok(table)
    }
}

fn json_to_cell(value: Option<&Value>) -> Cell {
    match value {
        None | Some(Value::Null) => Cell::Empty,
        Some(Value::String(s)) => Cell::Text(s.clone()),
        Some(Value::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Some(Value::Bool(b)) => Cell::Bool(*b),
        Some(list @ Value::Array(_)) => match serde_json::from_value::<Vec<Note>>(list.clone()) {
            Ok(notes) => Cell::Text(format_notes(&notes)),
            Err(_) => Cell::Text(list.to_string()),
        },
        Some(other) => Cell::Text(other.to_string()),
    }
}

/// Every collection of the document, one sheet each.
pub fn backup_tables(doc: &Document) -> AppResult<Vec<Table>> {
    let mut settings = Table::new(SETTINGS.name, SETTINGS.columns.iter().copied());
    settings.push(vec![Cell::Text(doc.organization_name.clone())]);

    Ok(vec![
        Table::from_records(&EMPLOYEES, &doc.employees)?,
        Table::from_records(&BENEFICIARIES, &doc.beneficiaries)?,
        Table::from_records(&ASSISTANCE_TYPES, &doc.assistance_types)?,
        Table::from_records(&OPERATIONS, &doc.operations)?,
        Table::from_records(&USERS, &doc.users)?,
        Table::from_records(&TASKS, &doc.tasks)?,
        settings,
    ])
}

/// Encode tables off the async runtime.
pub async fn write_workbook(tables: Vec<Table>) -> AppResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode(&tables).map_err(AppError::spreadsheet))
        .await
        .map_err(|e| AppError::internal(format!("Task join error: {e}")))?
}

pub fn encode(tables: &[Table]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.name.as_str())?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name.as_str(), &header)?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let c = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(r, c, text.as_str())?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }
    }

    workbook.save_to_buffer()
}
