//! XLSX backup and export workbooks.

mod reader;
pub mod sheets;
mod writer;

pub use reader::{parse_backup, read_backup};
pub use writer::{backup_tables, encode, write_workbook, Cell, Table};
