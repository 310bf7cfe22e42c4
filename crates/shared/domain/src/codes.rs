//! Human-readable record codes (`B001`, `OP012`).
//!
//! A new code is always the highest numeric suffix in use plus one, so freed
//! numbers are never handed out again.

use crate::constants::CODE_PAD_WIDTH;

/// Numeric suffix of `code` after removing the first occurrence of `prefix`.
///
/// Mirrors a lenient integer parse: leading whitespace, an optional sign and
/// leading digits. Trailing garbage is ignored; no digits means no suffix.
pub fn parse_suffix(prefix: &str, code: &str) -> Option<i64> {
    let rest = code.replacen(prefix, "", 1);
    let rest = rest.trim_start();

    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// `^PREFIX\d+$`
pub fn is_valid_code(prefix: &str, code: &str) -> bool {
    code.strip_prefix(prefix)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Highest parseable suffix, or 0 when nothing parses.
pub fn max_suffix<'a, I>(prefix: &str, codes: I) -> i64
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .filter_map(|code| parse_suffix(prefix, code))
        .max()
        .unwrap_or(0)
        .max(0)
}

/// `prefix` followed by `number` zero-padded to the minimum width.
pub fn format_code(prefix: &str, number: i64) -> String {
    format!("{}{:0width$}", prefix, number, width = CODE_PAD_WIDTH)
}

/// Next free code for `prefix` given the codes already in use.
pub fn next_code<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    format_code(prefix, max_suffix(prefix, existing) + 1)
}

/// Hands out codes from a running maximum, used when repairing many records.
#[derive(Debug, Clone)]
pub struct CodeAllocator {
    prefix: &'static str,
    current: i64,
}

impl CodeAllocator {
    pub fn new<'a, I>(prefix: &'static str, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            prefix,
            current: max_suffix(prefix, existing),
        }
    }

    pub fn allocate(&mut self) -> String {
        self.current += 1;
        format_code(self.prefix, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BENEFICIARY_CODE_PREFIX, OPERATION_CODE_PREFIX};

    #[test]
    fn next_code_uses_highest_suffix() {
        let existing = ["B001", "B007", "B003"];
        assert_eq!(next_code(BENEFICIARY_CODE_PREFIX, existing), "B008");
    }

    #[test]
    fn next_code_on_empty_collection_starts_at_one() {
        assert_eq!(next_code(OPERATION_CODE_PREFIX, []), "OP001");
    }

    #[test]
    fn wide_numbers_are_not_truncated() {
        assert_eq!(next_code(BENEFICIARY_CODE_PREFIX, ["B999"]), "B1000");
    }

    #[test]
    fn freed_numbers_are_not_reused() {
        let mut codes = vec!["B001".to_string(), "B002".to_string(), "B003".to_string()];
        codes.retain(|c| c != "B003");
        let next = next_code(BENEFICIARY_CODE_PREFIX, codes.iter().map(String::as_str));
        assert_eq!(next, "B003");

        codes.retain(|c| c != "B002");
        codes.push(next);
        let after = next_code(BENEFICIARY_CODE_PREFIX, codes.iter().map(String::as_str));
        assert_eq!(after, "B004");
    }

    #[test]
    fn lenient_suffix_parse() {
        assert_eq!(parse_suffix("B", "B012"), Some(12));
        assert_eq!(parse_suffix("B", "B12x"), Some(12));
        assert_eq!(parse_suffix("B", "7B"), Some(7));
        assert_eq!(parse_suffix("B", "Bx"), None);
        assert_eq!(parse_suffix("OP", "OP"), None);
        assert_eq!(parse_suffix("OP", "OP-4"), Some(-4));
    }

    #[test]
    fn code_shape() {
        assert!(is_valid_code("B", "B001"));
        assert!(is_valid_code("OP", "OP1234"));
        assert!(!is_valid_code("B", "B"));
        assert!(!is_valid_code("B", "b001"));
        assert!(!is_valid_code("B", "B01a"));
        assert!(!is_valid_code("OP", "B001"));
    }

    #[test]
    fn allocator_continues_from_running_max() {
        let mut alloc = CodeAllocator::new(OPERATION_CODE_PREFIX, ["OP004", "junk"]);
        assert_eq!(alloc.allocate(), "OP005");
        assert_eq!(alloc.allocate(), "OP006");
    }
}
