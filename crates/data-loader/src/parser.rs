//! Parsers for the catalog export files.
//!
//! All files are UTF-8, one record per line, fields separated by `::`:
//! - users.dat: userId::displayName
//! - series.dat: seriesId::title::kind::thumbnailKey
//! - likes.dat: userId::seriesId::timestamp
//!
//! Blank lines are skipped. Line numbers in errors are 1-based.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const USERS_FILE: &str = "users.dat";
const SERIES_FILE: &str = "series.dat";
const LIKES_FILE: &str = "likes.dat";

/// Read a whole file, mapping a missing file to `FileNotFound`
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Split every non-blank line into exactly `expected` fields.
///
/// Yields `(line_no, fields)` pairs.
fn split_records<'a>(
    content: &'a str,
    file: &'static str,
    expected: usize,
) -> impl Iterator<Item = Result<(usize, Vec<&'a str>)>> + 'a {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(idx, line)| {
            let line_no = idx + 1;
            let fields: Vec<&str> = line.trim().split("::").map(str::trim).collect();
            if fields.len() != expected {
                return Err(DataLoadError::FieldCountMismatch {
                    file: file.to_string(),
                    expected,
                    found: fields.len(),
                    line: line_no,
                });
            }
            Ok((line_no, fields))
        })
}

fn parse_number<T>(file: &str, line: usize, field: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", field, e),
    })
}

fn require_non_empty<'a>(file: &str, line: usize, field: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Missing {}", field),
        });
    }
    Ok(value)
}

fn parse_series_kind(s: &str) -> Result<SeriesKind> {
    match s.to_ascii_lowercase().as_str() {
        "comic" => Ok(SeriesKind::Comic),
        "novel" => Ok(SeriesKind::Novel),
        _ => Err(DataLoadError::InvalidValue {
            field: "kind".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse the users.dat file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    parse_users_str(&read_file(path)?)
}

pub(crate) fn parse_users_str(content: &str) -> Result<Vec<User>> {
    split_records(content, USERS_FILE, 2)
        .map(|record| {
            let (line_no, fields) = record?;
            Ok(User {
                id: require_non_empty(USERS_FILE, line_no, "userId", fields[0])?.to_string(),
                display_name: fields[1].to_string(),
            })
        })
        .collect()
}

/// Parse the series.dat file
pub fn parse_series(path: &Path) -> Result<Vec<Series>> {
    parse_series_str(&read_file(path)?)
}

pub(crate) fn parse_series_str(content: &str) -> Result<Vec<Series>> {
    split_records(content, SERIES_FILE, 4)
        .map(|record| {
            let (line_no, fields) = record?;
            let thumbnail = match fields[3] {
                "" => None,
                key => Some(key.to_string()),
            };
            Ok(Series {
                id: parse_number(SERIES_FILE, line_no, "seriesId", fields[0])?,
                title: require_non_empty(SERIES_FILE, line_no, "title", fields[1])?.to_string(),
                kind: parse_series_kind(fields[2])?,
                thumbnail,
            })
        })
        .collect()
}

/// Parse the likes.dat file
pub fn parse_likes(path: &Path) -> Result<Vec<Like>> {
    parse_likes_str(&read_file(path)?)
}

pub(crate) fn parse_likes_str(content: &str) -> Result<Vec<Like>> {
    split_records(content, LIKES_FILE, 3)
        .map(|record| {
            let (line_no, fields) = record?;
            Ok(Like {
                user_id: require_non_empty(LIKES_FILE, line_no, "userId", fields[0])?.to_string(),
                series_id: parse_number(LIKES_FILE, line_no, "seriesId", fields[1])?,
                timestamp: parse_number(LIKES_FILE, line_no, "timestamp", fields[2])?,
            })
        })
        .collect()
}
