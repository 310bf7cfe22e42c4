//! Filters shared by list and report operations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Inclusive `YYYY-MM-DD` range; an open end matches everything on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        let clean = |d: Option<String>| d.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            from: clean(from),
            to: clean(to),
        }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Dates are compared as text, which orders ISO dates correctly.
    pub fn contains(&self, date: &str) -> bool {
        self.from.as_deref().map_or(true, |from| date >= from)
            && self.to.as_deref().map_or(true, |to| date <= to)
    }
}

/// Case-insensitive text ordering for sort columns
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Exact match on an optional filter value; blank means no filter.
pub fn matches_exact(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        Some(f) if !f.is_empty() => f == value,
        _ => true,
    }
}
