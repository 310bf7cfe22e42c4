//! Field coercion for untrusted records.
//!
//! Backups come from older releases, hand-edited JSON and spreadsheets, so
//! every field is read leniently and falls back to a declared default.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use domain::validation::DATE_PREFIX_RE;
use domain::{Note, MAX_RECORD_ID, NOTE_TIMESTAMP_FORMAT};

/// One untyped record
pub type RawRecord = Map<String, Value>;

/// `[timestamp] text`
static NOTE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.*?)\]\s(.*)$").expect("note line pattern is valid"));

/// Naive timestamp layouts accepted besides RFC 3339, read as UTC
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    NOTE_TIMESTAMP_FORMAT,
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

fn field<'a>(record: &'a RawRecord, name: &str) -> Option<&'a Value> {
    record.get(name).filter(|v| !v.is_null())
}

/// Render a number without a spurious `.0`.
fn number_to_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{f:.0}")
        }
        _ => n.to_string(),
    }
}

/// Strings as-is, numbers and booleans rendered, anything else empty.
pub fn text(record: &RawRecord, name: &str) -> String {
    match field(record, name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_to_string(n),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Like [`text`], with blank meaning absent.
pub fn optional_text(record: &RawRecord, name: &str) -> Option<String> {
    let value = text(record, name);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Numeric value of a number or numeric string.
pub fn number(record: &RawRecord, name: &str) -> Option<f64> {
    let parsed = match field(record, name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// A non-negative integral id up to [`MAX_RECORD_ID`], `None` when it
/// needs repair.
pub fn id(record: &RawRecord, name: &str) -> Option<u64> {
    if let Some(Value::Number(n)) = field(record, name) {
        if let Some(v) = n.as_u64() {
            return (v <= MAX_RECORD_ID).then_some(v);
        }
    }
    number(record, name)
        .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= MAX_RECORD_ID as f64)
        .map(|f| f as u64)
}

/// Truthiness. `"false"` and `"0"` count as false.
pub fn flag(record: &RawRecord, name: &str) -> bool {
    match field(record, name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0")
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

/// Allow-listed value, `None` when absent or unknown.
pub fn choice<T>(record: &RawRecord, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    optional_text(record, name).and_then(|v| parse(v.trim()))
}

/// `YYYY-MM-DD` prefix of a date-like value.
pub fn date(record: &RawRecord, name: &str) -> Option<String> {
    let value = text(record, name);
    let value = value.trim();
    if !DATE_PREFIX_RE.is_match(value) {
        return None;
    }
    value.get(..10).map(str::to_string)
}

/// Date field that must be present; empty when it is not.
pub fn required_date(record: &RawRecord, name: &str) -> String {
    date(record, name).unwrap_or_default()
}

/// Parse an RFC 3339 or naive (UTC) timestamp.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn timestamp(record: &RawRecord, name: &str) -> Option<DateTime<Utc>> {
    optional_text(record, name).and_then(|v| parse_timestamp(&v))
}

/// Notes from a JSON list or from newline-joined spreadsheet lines.
///
/// Entries whose timestamp cannot be parsed are dropped.
pub fn notes(record: &RawRecord, name: &str) -> Vec<Note> {
    match field(record, name) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                Some(Note {
                    text: text(obj, "text"),
                    date: timestamp(obj, "date")?,
                })
            })
            .collect(),
        Some(Value::String(joined)) => joined.lines().filter_map(parse_note_line).collect(),
        _ => Vec::new(),
    }
}

fn parse_note_line(line: &str) -> Option<Note> {
    let caps = NOTE_LINE_RE.captures(line.trim_end_matches('\r'))?;
    let stamp = caps.get(1)?.as_str();
    let text = caps.get(2)?.as_str();
    if stamp.is_empty() || text.is_empty() {
        return None;
    }
    Some(Note {
        text: text.to_string(),
        date: parse_timestamp(stamp)?,
    })
}

/// Spreadsheet form of a note list.
pub fn format_notes(notes: &[Note]) -> String {
    notes
        .iter()
        .map(|n| format!("[{}] {}", n.date.format(NOTE_TIMESTAMP_FORMAT), n.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn text_renders_scalars() {
        let r = record(json!({"a": "x", "b": 1012345678.0, "c": true, "d": null, "e": 2.5}));
        assert_eq!(text(&r, "a"), "x");
        assert_eq!(text(&r, "b"), "1012345678");
        assert_eq!(text(&r, "c"), "true");
        assert_eq!(text(&r, "d"), "");
        assert_eq!(text(&r, "e"), "2.5");
        assert_eq!(text(&r, "missing"), "");
    }

    #[test]
    fn ids_must_be_non_negative_integers() {
        let r = record(json!({"a": 3, "b": "7", "c": 2.5, "d": -1, "e": "x", "f": 4.0}));
        assert_eq!(id(&r, "a"), Some(3));
        assert_eq!(id(&r, "b"), Some(7));
        assert_eq!(id(&r, "c"), None);
        assert_eq!(id(&r, "d"), None);
        assert_eq!(id(&r, "e"), None);
        assert_eq!(id(&r, "f"), Some(4));
        assert_eq!(id(&r, "missing"), None);
    }

    #[test]
    fn oversized_ids_need_repair() {
        let r = record(json!({"max": u64::MAX, "edge": MAX_RECORD_ID, "over": 1e300}));
        assert_eq!(id(&r, "max"), None);
        assert_eq!(id(&r, "edge"), Some(MAX_RECORD_ID));
        assert_eq!(id(&r, "over"), None);
    }

    #[test]
    fn flag_truthiness() {
        let r = record(json!({
            "t": true, "one": 1, "yes": "yes",
            "f": false, "zero": 0, "empty": "", "sfalse": "false", "szero": "0", "null": null
        }));
        for name in ["t", "one", "yes"] {
            assert!(flag(&r, name), "{name} should be true");
        }
        for name in ["f", "zero", "empty", "sfalse", "szero", "null", "missing"] {
            assert!(!flag(&r, name), "{name} should be false");
        }
    }

    #[test]
    fn dates_are_truncated_or_dropped() {
        let r = record(json!({"a": "2023-02-01T10:00:00Z", "b": "01/02/2023", "c": "2023-02-01"}));
        assert_eq!(date(&r, "a").as_deref(), Some("2023-02-01"));
        assert_eq!(date(&r, "b"), None);
        assert_eq!(date(&r, "c").as_deref(), Some("2023-02-01"));
        assert_eq!(required_date(&r, "missing"), "");
    }

    #[test]
    fn dates_need_ascii_digits() {
        let r = record(json!({"a": "٢٠٢٣-١٠-٢٦", "b": "2023-1٠-26"}));
        assert_eq!(date(&r, "a"), None);
        assert_eq!(date(&r, "b"), None);
        assert_eq!(required_date(&r, "a"), "");
    }

    #[test]
    fn spreadsheet_notes_keep_only_parseable_lines() {
        let r = record(json!({
            "notes": "[2023-10-26 10:00:00] first\nno brackets\n[yesterday] bad date\n[2023-11-15T14:30:00Z] second"
        }));
        let parsed = notes(&r, "notes");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "first");
        assert_eq!(
            parsed[0].date,
            Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 0).unwrap()
        );
        assert_eq!(parsed[1].text, "second");
    }

    #[test]
    fn note_lines_format_back_to_the_same_notes() {
        let original = vec![Note {
            text: "متابعة".to_string(),
            date: Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 0).unwrap(),
        }];
        let joined = format_notes(&original);
        assert_eq!(joined, "[2023-10-26 10:00:00] متابعة");

        let r = record(json!({ "notes": joined }));
        assert_eq!(notes(&r, "notes"), original);
    }

    #[test]
    fn json_notes_need_a_timestamp() {
        let r = record(json!({"notes": [
            {"text": "ok", "date": "2023-10-26T10:00:00.000Z"},
            {"text": "no date"}
        ]}));
        let parsed = notes(&r, "notes");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, "ok");
    }
}
