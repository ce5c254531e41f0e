//! # Parser Module
//!
//! Decodes Claude Code transcript lines and Claude Desktop JSON documents into
//! [`UsageRecord`] token counts.
//!
//! Two shapes are understood:
//!
//! - Line-delimited logs (`.jsonl`): every line is an independent JSON value with
//!   `usage` at the top level and/or under `message.usage`. Both locations are summed.
//! - Single JSON documents: an object with `usage`, an object with a `messages` array
//!   whose items carry `usage`, or an array of items carrying `usage`.
//!
//! Missing or malformed token fields count as zero. Undecodable lines are skipped and
//! counted; a file that cannot be read at all is reported as a [`ParseError`].

use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ParseError;
use crate::models::{FileTally, UsageRecord};

/// How a file's contents are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON value per line
    Lines,
    /// A single JSON document
    Document,
}

impl LogFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => Self::Lines,
            _ => Self::Document,
        }
    }
}

fn token_count(value: Option<&Value>) -> u64 {
    let Some(number) = value.and_then(|v| v.as_number()) else {
        return 0;
    };
    if let Some(u) = number.as_u64() {
        return u;
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            f as u64
        }
        _ => 0,
    }
}

/// Token counts of one `usage` block; anything that is not an object is empty.
pub fn usage_block(usage: &Value) -> UsageRecord {
    if !usage.is_object() {
        return UsageRecord::default();
    }
    UsageRecord::new(
        token_count(usage.get("input_tokens")),
        token_count(usage.get("output_tokens")),
    )
}

/// Usage carried by one transcript record.
///
/// A record may report usage both at the top level and nested under `message`; the
/// two are added together even when they describe the same request.
pub fn parse_record(value: &Value) -> UsageRecord {
    let mut usage = UsageRecord::default();
    if let Some(top) = value.get("usage") {
        usage.add(usage_block(top));
    }
    if let Some(nested) = value
        .get("message")
        .filter(|m| m.is_object())
        .and_then(|m| m.get("usage"))
    {
        usage.add(usage_block(nested));
    }
    usage
}

/// Decode a single line. `None` means the line is not valid JSON.
pub fn parse_jsonl_line(line: &[u8]) -> Option<UsageRecord> {
    let value: Value = serde_json::from_slice(line).ok()?;
    Some(parse_record(&value))
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

/// Sum every decodable line of a line-delimited log.
///
/// Only I/O errors abort; bad lines (including invalid UTF-8) are counted in
/// `records_skipped`.
pub fn parse_jsonl<R: BufRead>(mut reader: R) -> io::Result<FileTally> {
    let mut tally = FileTally::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if is_blank(&buf) {
            continue;
        }
        match parse_jsonl_line(&buf) {
            Some(usage) => tally.usage.add(usage),
            None => tally.records_skipped += 1,
        }
    }
    Ok(tally)
}

/// Sum every `usage` block found in a Desktop JSON document.
pub fn parse_document(value: &Value) -> UsageRecord {
    let mut usage = UsageRecord::default();
    match value {
        Value::Object(obj) => {
            if let Some(direct) = obj.get("usage") {
                usage.add(usage_block(direct));
            }
            if let Some(Value::Array(messages)) = obj.get("messages") {
                for msg in messages {
                    if let Some(u) = msg.get("usage") {
                        usage.add(usage_block(u));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if let Some(u) = item.get("usage") {
                    usage.add(usage_block(u));
                }
            }
        }
        _ => {}
    }
    usage
}

/// Parse a file in the format implied by its extension.
pub fn parse_file(path: &Path) -> Result<FileTally, ParseError> {
    let io_err = |source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    };
    match LogFormat::for_path(path) {
        LogFormat::Lines => {
            let file = File::open(path).map_err(io_err)?;
            parse_jsonl(BufReader::new(file)).map_err(io_err)
        }
        LogFormat::Document => {
            let bytes = fs::read(path).map_err(io_err)?;
            let value: Value =
                serde_json::from_slice(&bytes).map_err(|source| ParseError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(FileTally {
                usage: parse_document(&value),
                records_skipped: 0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_top_level_and_nested_usage_are_added() {
        let v = json!({
            "usage": {"input_tokens": 10, "output_tokens": 5},
            "message": {"usage": {"input_tokens": 10, "output_tokens": 5}}
        });
        assert_eq!(parse_record(&v), UsageRecord::new(20, 10));
    }

    #[test]
    fn test_nested_usage_only() {
        let v = json!({"type": "assistant", "message": {"usage": {"input_tokens": 7, "output_tokens": 3}}});
        assert_eq!(parse_record(&v).total_tokens(), 10);
    }

    #[test]
    fn test_malformed_fields_count_as_zero() {
        let v = json!({"usage": {"input_tokens": "lots", "output_tokens": -4}});
        assert!(parse_record(&v).is_empty());
        let v = json!({"usage": {"input_tokens": 12.0, "output_tokens": 1.5}});
        assert_eq!(parse_record(&v), UsageRecord::new(12, 0));
        let v = json!({"usage": [1, 2], "message": "text"});
        assert!(parse_record(&v).is_empty());
    }

    #[test]
    fn test_non_object_line_contributes_nothing() {
        assert_eq!(parse_jsonl_line(b"42"), Some(UsageRecord::default()));
        assert_eq!(parse_jsonl_line(b"{not json"), None);
    }

    #[test]
    fn test_jsonl_skips_bad_lines_and_keeps_going() {
        let data = concat!(
            "{\"message\":{\"usage\":{\"input_tokens\":100,\"output_tokens\":20}}}\n",
            "garbage\n",
            "\n",
            "{\"usage\":{\"input_tokens\":3,\"output_tokens\":4}}\n",
            "{\"truncated\":\n",
            "{\"usage\":{\"input_tokens\":1}}",
        );
        let tally = parse_jsonl(Cursor::new(data)).unwrap();
        assert_eq!(tally.usage, UsageRecord::new(104, 24));
        assert_eq!(tally.records_skipped, 2);
    }

    #[test]
    fn test_jsonl_invalid_utf8_line_is_skipped() {
        let mut data = b"{\"usage\":{\"input_tokens\":5,\"output_tokens\":5}}\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let tally = parse_jsonl(Cursor::new(data)).unwrap();
        assert_eq!(tally.usage.total_tokens(), 10);
        assert_eq!(tally.records_skipped, 1);
    }

    #[test]
    fn test_document_messages_array() {
        let v = json!({"messages": [
            {"usage": {"input_tokens": 100, "output_tokens": 50}},
            {"usage": {"input_tokens": 10, "output_tokens": 5}}
        ]});
        assert_eq!(parse_document(&v).total_tokens(), 165);
    }

    #[test]
    fn test_document_direct_usage_and_messages_are_summed() {
        let v = json!({
            "usage": {"input_tokens": 1, "output_tokens": 1},
            "messages": [{"usage": {"input_tokens": 2, "output_tokens": 2}}, "skip", 3]
        });
        assert_eq!(parse_document(&v).total_tokens(), 6);
    }

    #[test]
    fn test_document_array_of_items() {
        let v = json!([
            {"usage": {"input_tokens": 4, "output_tokens": 6}},
            {"no_usage": true},
            null
        ]);
        assert_eq!(parse_document(&v).total_tokens(), 10);
    }

    #[test]
    fn test_document_without_usage_is_zero() {
        assert!(parse_document(&json!({"settings": {"theme": "dark"}})).is_empty());
        assert!(parse_document(&json!("string")).is_empty());
    }

    #[test]
    fn test_log_format_for_path() {
        assert_eq!(LogFormat::for_path(Path::new("a/b.jsonl")), LogFormat::Lines);
        assert_eq!(LogFormat::for_path(Path::new("a/b.JSONL")), LogFormat::Lines);
        assert_eq!(LogFormat::for_path(Path::new("a/b.json")), LogFormat::Document);
    }

    #[test]
    fn test_parse_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.jsonl");
        assert!(matches!(parse_file(&missing), Err(ParseError::Io { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"usage\": ").unwrap();
        assert!(matches!(parse_file(&broken), Err(ParseError::Json { .. })));
    }
}
