//! `KEY=value` config file reader/writer
//!
//! One entry per line. Lines starting with `#` are comments and are dropped on
//! read. Values may be double-quoted; inside quotes a backslash escapes the
//! next character (`\n`, `\t`, `\\`, `\"`). Unknown escapes are kept verbatim.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::syntax::{COMMENT_PREFIX, SEPARATOR, TAB_EXPANSION};
use crate::fs::FileSystem;

/// One value to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub quoted: bool,
}

impl ConfigEntry {
    pub fn quoted(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into(), quoted: true }
    }

    pub fn plain(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into(), quoted: false }
    }
}

/// A group of in-memory settings persisted to one config file
pub trait ConfigSection {
    /// File name inside the game directory
    fn file_name(&self) -> &'static str;

    /// Comment lines written at the top of the file
    fn header(&self) -> &'static [&'static str];

    /// Take a decoded value for `key`. Returns false for unknown keys or
    /// rejected values, in which case the in-memory value is unchanged.
    fn apply(&mut self, key: &str, value: &str) -> bool;

    /// Current values in file order
    fn entries(&self) -> Vec<ConfigEntry>;
}

pub fn is_comment_line(line: &str) -> bool {
    line.starts_with(COMMENT_PREFIX)
}

/// Raw (still escaped) contents of the first quoted string in `text`.
/// An unterminated quote runs to the end of the text.
pub fn extract_quoted_value(text: &str) -> Option<&str> {
    let start = text.find('"')? + 1;
    let body = &text[start..];

    let bytes = body.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'"' {
            continue;
        }
        let backslashes = bytes[..i].iter().rev().take_while(|&&c| c == b'\\').count();
        if backslashes % 2 == 0 {
            return Some(&body[..i]);
        }
    }
    Some(body)
}

/// Unquoted value with surrounding spaces and tabs removed
pub fn extract_value(text: &str) -> &str {
    text.trim_matches([' ', '\t'])
}

/// Decode the escape sequences allowed inside quoted values
pub fn unescape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push_str(TAB_EXPANSION),
            Some('\\') => output.push('\\'),
            Some('"') => output.push('"'),
            Some(other) => {
                output.push('\\');
                output.push(other);
            }
            None => output.push('\\'),
        }
    }
    output
}

/// Inverse of [`unescape`] for everything except `\t`
pub fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => output.push_str("\\\\"),
            '"' => output.push_str("\\\""),
            '\n' => output.push_str("\\n"),
            '\r' => {}
            other => output.push(other),
        }
    }
    output
}

/// Right-hand side of an entry as the game reads it
pub fn decode_value(raw: &str) -> String {
    let trimmed = extract_value(raw);
    if trimmed.starts_with('"') {
        extract_quoted_value(trimmed).map(unescape).unwrap_or_default()
    } else {
        trimmed.to_string()
    }
}

/// A strictly positive decimal integer, digits only
pub fn parse_positive_int(value: &str) -> Option<u32> {
    let value = extract_value(value);
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u32>().ok().filter(|&n| n > 0)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn format_value(value: &str, quoted: bool) -> String {
    if quoted {
        format!("\"{}\"", escape(value))
    } else {
        value.replace("\r\n", "\n").replace('\n', "\\n")
    }
}

/// Replace the value of `key` in place, or append `key=value`.
///
/// Keys are compared with all whitespace removed. Whitespace after `=` on the
/// existing line is kept.
pub fn update_or_add_line(lines: &mut Vec<String>, key: &str, value: &str, quoted: bool) {
    let clean_key = strip_whitespace(key);
    let formatted = format_value(value, quoted);

    for line in lines.iter_mut() {
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        let Some(eq) = line.find(SEPARATOR) else {
            continue;
        };
        if strip_whitespace(&line[..eq]) != clean_key {
            continue;
        }

        let rest = &line[eq + 1..];
        let spaces_len = rest.len() - rest.trim_start().len();
        *line = format!("{}={}{}", &line[..eq], &rest[..spaces_len], formatted);
        return;
    }

    lines.push(format!("{clean_key}={formatted}"));
}

/// Non-comment lines of `path`; a missing file reads as empty
pub fn read_lines(fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>> {
    if !fs.exists(path) {
        return Ok(Vec::new());
    }
    let contents = fs.read_text(path)?;
    Ok(contents
        .lines()
        .filter(|line| !is_comment_line(line))
        .map(str::to_string)
        .collect())
}

/// Parse every entry of `path` and hand recognised keys to `section`
pub fn load_entries(fs: &dyn FileSystem, path: &Path, section: &mut dyn ConfigSection) -> Result<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();

    for line in read_lines(fs, path)? {
        let Some((key, raw)) = line.split_once(SEPARATOR) else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = decode_value(raw);
        if !section.apply(key, &value) {
            debug!(file = section.file_name(), key = %key, "Ignored config entry");
        }
        entries.insert(key.to_string(), value);
    }

    Ok(entries)
}

/// Rewrite `path` with the section's current values, keeping unrelated lines
pub fn write_section(fs: &dyn FileSystem, path: &Path, section: &dyn ConfigSection) -> Result<()> {
    let mut lines = read_lines(fs, path)?;
    for entry in section.entries() {
        update_or_add_line(&mut lines, &entry.key, &entry.value, entry.quoted);
    }

    let mut contents = String::new();
    for line in section.header().iter().copied().map(str::to_string).chain(lines) {
        contents.push_str(&line);
        contents.push('\n');
    }

    fs.write_text(path, &contents)
        .with_context(|| format!("Failed to update {}", section.file_name()))?;
    info!(path = %path.display(), "Updated config file");
    Ok(())
}

/// Create `path` with default contents when it is missing. Returns true if created.
pub fn ensure_file(fs: &dyn FileSystem, path: &Path, section: &dyn ConfigSection) -> Result<bool> {
    if fs.exists(path) {
        return Ok(false);
    }
    info!(path = %path.display(), "Config file not found, creating default");
    write_section(fs, path, section)?;
    Ok(true)
}
