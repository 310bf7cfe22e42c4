//! Shared request/response types.

mod filters;
mod pagination;

pub use filters::{compare_text, matches_exact, DateRange};
pub use pagination::{matches_search, Paginated, PaginationMeta, PaginationParams, SortDirection};
