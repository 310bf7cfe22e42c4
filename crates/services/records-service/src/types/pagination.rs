//! Pagination and sorting types for list operations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use domain::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination parameters, reusable across all list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_page() -> usize {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> usize {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Offset of the first row on this page
    pub fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1) * self.limit()
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> usize {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper, reusable for all list responses
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, page: usize, per_page: usize, total: usize) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            0
        };

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Cut one page out of an already filtered and sorted list.
    pub fn from_rows(rows: Vec<T>, params: PaginationParams) -> Self {
        let total = rows.len();
        let data = rows
            .into_iter()
            .skip(params.offset())
            .take(params.limit())
            .collect();
        Self::new(data, params.page.max(1), params.limit(), total)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// Case-insensitive substring match used by every search box.
pub fn matches_search(needle: Option<&str>, haystacks: &[&str]) -> bool {
    let needle = match needle.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_lowercase(),
        _ => return true,
    };
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_cut_from_the_full_list() {
        let rows: Vec<u32> = (1..=23).collect();
        let page = Paginated::from_rows(rows, PaginationParams::new(3, 10));

        assert_eq!(page.data, vec![21, 22, 23]);
        assert_eq!(
            page.meta,
            PaginationMeta {
                page: 3,
                per_page: 10,
                total: 23,
                total_pages: 3
            }
        );
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let rows: Vec<u32> = (1..=5).collect();
        let page = Paginated::from_rows(rows, PaginationParams::new(0, 2));
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.meta.page, 1);
    }

    #[test]
    fn empty_search_matches_everything() {
        assert!(matches_search(None, &["x"]));
        assert!(matches_search(Some("  "), &["x"]));
        assert!(matches_search(Some("AB"), &["xxabyy"]));
        assert!(!matches_search(Some("zz"), &["xxabyy", "q"]));
    }
}
