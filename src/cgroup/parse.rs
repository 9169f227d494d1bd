//! Line parsers for the text formats used by cgroup pseudo-files.
//!
//! The kernel emits a handful of line-oriented layouts with no schema
//! enforcement:
//!
//! - **Flat keyed** (`memory.stat`): one `key value` pair per line.
//! - **Nested keyed** (`memory.pressure`): a category key followed by
//!   `subkey=value` tokens, with the same sub-key set on every line.
//! - **Scalar** (`memory.max`, `memory.current`): a single value, where the
//!   literal `max` stands for "unlimited".
//!
//! All parsers fail fast: a single malformed line fails the whole read
//! instead of yielding a partial result, so consumers never see silently
//! truncated metrics.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that may occur when parsing cgroup pseudo-file content.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected `key value` at line {line}, got `{content}`")]
    FlatShape { content: String, line: usize },

    #[error("missing key at line {line}")]
    MissingKey { line: usize },

    #[error("expected `subkey=value` at line {line}, got `{token}`")]
    NestedToken { token: String, line: usize },

    #[error("sub-key set at line {line} differs from the first line")]
    SubkeyMismatch { line: usize },

    #[error("invalid value for '{key}' at line {line}: '{value}': {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid scalar value `{value}`: {source}")]
    InvalidScalar {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("expected a scalar value, found an empty file")]
    EmptyScalar,
}

/// One row of a flat-keyed file: `key value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatKeyedRow {
    pub key: String,
    pub value: i64,
}

/// One row of a nested-keyed file: a category key plus ordered
/// `subkey=value` entries.
///
/// Sub-values stay as validated strings: pressure files report decimal
/// fractions (`avg10=0.00`) next to integer totals, and the kernel does not
/// promise one numeric type per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedKeyedRow {
    pub key: String,
    pub entries: Vec<(String, String)>,
}

impl NestedKeyedRow {
    fn subkeys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(subkey, _)| subkey.as_str())
    }
}

/// A signed 64-bit scalar, or the kernel's `max` sentinel for "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Int64OrMax {
    Value(i64),
    Max,
}

impl Int64OrMax {
    /// Collapses the sentinel into [`i64::MAX`] for callers that need a
    /// plain integer.
    pub fn as_i64(self) -> i64 {
        match self {
            Int64OrMax::Value(v) => v,
            Int64OrMax::Max => i64::MAX,
        }
    }
}

/// Parses a single flat-keyed line into a [`FlatKeyedRow`].
///
/// The line must split into exactly two whitespace-separated tokens; more or
/// fewer is a format error, as is a value that does not parse as a base-10
/// `i64`.
pub fn parse_flat_keyed_line(content: &str, line: usize) -> Result<FlatKeyedRow, ParseError> {
    let mut tokens = content.split_whitespace();
    let (Some(key), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(ParseError::FlatShape {
            content: content.to_owned(),
            line,
        });
    };

    let parsed = value
        .parse::<i64>()
        .map_err(|source| ParseError::InvalidKeyValue {
            key: key.to_owned(),
            value: value.to_owned(),
            line,
            source,
        })?;

    Ok(FlatKeyedRow {
        key: key.to_owned(),
        value: parsed,
    })
}

/// Parses a whole flat-keyed file, preserving line order.
///
/// Returns exactly one row per input line; any malformed line fails the
/// whole parse.
pub fn parse_flat_keyed(lines: &[String]) -> Result<Vec<FlatKeyedRow>, ParseError> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, content)| parse_flat_keyed_line(content, idx + 1))
        .collect()
}

/// Parses a single nested-keyed line into a [`NestedKeyedRow`].
///
/// The first token is the category key; every following token must have the
/// shape `subkey=value` with a non-empty value.
pub fn parse_nested_keyed_line(content: &str, line: usize) -> Result<NestedKeyedRow, ParseError> {
    let mut tokens = content.split_whitespace();
    let key = tokens.next().ok_or(ParseError::MissingKey { line })?;

    let mut entries = Vec::new();
    for token in tokens {
        let (subkey, value) = token
            .split_once('=')
            .filter(|(subkey, value)| !subkey.is_empty() && !value.is_empty())
            .ok_or_else(|| ParseError::NestedToken {
                token: token.to_owned(),
                line,
            })?;
        entries.push((subkey.to_owned(), value.to_owned()));
    }

    Ok(NestedKeyedRow {
        key: key.to_owned(),
        entries,
    })
}

/// Parses a whole nested-keyed file, preserving line order.
///
/// Well-formed cgroup output is structurally homogeneous: every line of one
/// file carries the same sub-keys, in the same order. A line whose sub-key
/// set deviates from the first line fails the whole parse.
pub fn parse_nested_keyed(lines: &[String]) -> Result<Vec<NestedKeyedRow>, ParseError> {
    let mut rows: Vec<NestedKeyedRow> = Vec::with_capacity(lines.len());

    for (idx, content) in lines.iter().enumerate() {
        let row = parse_nested_keyed_line(content, idx + 1)?;
        if let Some(first) = rows.first() {
            if !first.subkeys().eq(row.subkeys()) {
                return Err(ParseError::SubkeyMismatch { line: idx + 1 });
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Extracts an [`Int64OrMax`] from scalar-file content.
///
/// Only the first line is significant. The literal `max` (surrounding
/// whitespace tolerated) maps to the unbounded marker; anything else must
/// parse as a base-10 signed 64-bit integer with no extraneous characters.
pub fn parse_scalar(lines: &[String]) -> Result<Int64OrMax, ParseError> {
    let value = lines.first().ok_or(ParseError::EmptyScalar)?.trim();

    if value == "max" {
        return Ok(Int64OrMax::Max);
    }

    value
        .parse::<i64>()
        .map(Int64OrMax::Value)
        .map_err(|source| ParseError::InvalidScalar {
            value: value.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flat_keyed_memory_stat() {
        let input = lines(&["anon 1048576", "file 2097152"]);
        let rows = parse_flat_keyed(&input).unwrap();
        assert_eq!(
            rows,
            vec![
                FlatKeyedRow {
                    key: "anon".into(),
                    value: 1048576,
                },
                FlatKeyedRow {
                    key: "file".into(),
                    value: 2097152,
                },
            ]
        );
    }

    #[test]
    fn test_flat_keyed_preserves_order_and_count() {
        let input = lines(&["c 3", "a 1", "b 2"]);
        let rows = parse_flat_keyed(&input).unwrap();
        assert_eq!(rows.len(), 3);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_flat_keyed_rejects_extra_tokens() {
        let input = lines(&["anon 1048576 extra"]);
        let err = parse_flat_keyed(&input).unwrap_err();
        assert!(matches!(err, ParseError::FlatShape { line: 1, .. }));
    }

    #[test]
    fn test_flat_keyed_rejects_lone_key() {
        let input = lines(&["anon 1", "file"]);
        let err = parse_flat_keyed(&input).unwrap_err();
        assert!(matches!(err, ParseError::FlatShape { line: 2, .. }));
    }

    #[test]
    fn test_flat_keyed_rejects_non_numeric_value() {
        let input = lines(&["anon abc"]);
        let err = parse_flat_keyed(&input).unwrap_err();
        match err {
            ParseError::InvalidKeyValue {
                key, value, line, ..
            } => {
                assert_eq!(key, "anon");
                assert_eq!(value, "abc");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_keyed_memory_pressure() {
        let input = lines(&[
            "some avg10=0.00 avg60=0.00 avg300=0.00 total=0",
            "full avg10=0.00 avg60=0.00 avg300=0.00 total=0",
        ]);
        let rows = parse_nested_keyed(&input).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "some");
        assert_eq!(
            rows[0].entries,
            vec![
                ("avg10".to_string(), "0.00".to_string()),
                ("avg60".to_string(), "0.00".to_string()),
                ("avg300".to_string(), "0.00".to_string()),
                ("total".to_string(), "0".to_string()),
            ]
        );
        assert_eq!(rows[1].key, "full");
    }

    #[test]
    fn test_nested_keyed_rejects_subkey_mismatch() {
        let input = lines(&[
            "some avg10=0.00 avg60=0.00 avg300=0.00 total=0",
            "full avg10=0.00 avg60=0.00 total=0",
        ]);
        let err = parse_nested_keyed(&input).unwrap_err();
        assert!(matches!(err, ParseError::SubkeyMismatch { line: 2 }));
    }

    #[test]
    fn test_nested_keyed_rejects_renamed_subkey() {
        let input = lines(&["some avg10=0.00 total=0", "full avg60=0.00 total=0"]);
        let err = parse_nested_keyed(&input).unwrap_err();
        assert!(matches!(err, ParseError::SubkeyMismatch { line: 2 }));
    }

    #[test]
    fn test_nested_keyed_rejects_bare_token() {
        let input = lines(&["some avg10"]);
        let err = parse_nested_keyed(&input).unwrap_err();
        match err {
            ParseError::NestedToken { token, line } => {
                assert_eq!(token, "avg10");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nested_keyed_rejects_empty_value() {
        let input = lines(&["some avg10="]);
        let err = parse_nested_keyed(&input).unwrap_err();
        assert!(matches!(err, ParseError::NestedToken { .. }));
    }

    #[test]
    fn test_scalar_max_sentinel() {
        assert_eq!(parse_scalar(&lines(&["max"])).unwrap(), Int64OrMax::Max);
        assert_eq!(parse_scalar(&lines(&["  max  "])).unwrap(), Int64OrMax::Max);
    }

    #[test]
    fn test_scalar_value() {
        let value = parse_scalar(&lines(&["9223372036854775807"])).unwrap();
        assert_eq!(value, Int64OrMax::Value(9223372036854775807));
        assert_eq!(value.as_i64(), i64::MAX);
    }

    #[test]
    fn test_scalar_first_line_wins() {
        let value = parse_scalar(&lines(&["4096", "8192"])).unwrap();
        assert_eq!(value, Int64OrMax::Value(4096));
    }

    #[test]
    fn test_scalar_rejects_garbage() {
        let err = parse_scalar(&lines(&["4096kb"])).unwrap_err();
        assert!(matches!(err, ParseError::InvalidScalar { .. }));
    }

    #[test]
    fn test_scalar_rejects_empty_file() {
        let err = parse_scalar(&[]).unwrap_err();
        assert!(matches!(err, ParseError::EmptyScalar));
    }

    #[test]
    fn test_max_collapses_to_i64_max() {
        assert_eq!(Int64OrMax::Max.as_i64(), i64::MAX);
    }
}
