use std::fmt::Write as _;
use std::fs;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::CatalogEntry;
use crate::error::ScopeError;

const QUARANTINE_PREFIX: &str = "[QUARANTINE]";
const QUARANTINE_DECORATOR: &str = "decorators.Quarantine";

// Letters, marks, numbers, punctuation, symbols and the ASCII space print as-is in Go.
fn printable_regex() -> &'static Regex {
    static PRINTABLE: OnceLock<Regex> = OnceLock::new();
    PRINTABLE.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{M}\p{N}\p{P}\p{S} ]$").expect("Invalid regex")
    })
}

fn is_go_printable(ch: char) -> bool {
    let mut buf = [0u8; 4];
    printable_regex().is_match(ch.encode_utf8(&mut buf))
}

/// Double-quoted Go string literal for `text`, escaped the way `%q` escapes it.
pub fn go_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            c if is_go_printable(c) => quoted.push(c),
            '\u{07}' => quoted.push_str("\\a"),
            '\u{08}' => quoted.push_str("\\b"),
            '\u{0c}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{0b}' => quoted.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(quoted, "\\x{:02x}", c as u32);
            }
            c if (c as u32) < 0x10000 => {
                let _ = write!(quoted, "\\u{:04x}", c as u32);
            }
            c => {
                let _ = write!(quoted, "\\U{:08x}", c as u32);
            }
        }
    }
    quoted.push('"');
    quoted
}

/// Rewrites the first quoted occurrence of `leaf_text` into its quarantined form.
///
/// Content without such an occurrence is returned unchanged.
pub fn quarantine_source(content: &str, leaf_text: &str) -> Result<String, ScopeError> {
    if leaf_text.is_empty() {
        return Err(ScopeError::EmptyLeafText);
    }
    let needle = go_quote(leaf_text);
    let replacement = format!(
        "{}, {QUARANTINE_DECORATOR}",
        go_quote(&format!("{QUARANTINE_PREFIX}{leaf_text}"))
    );
    Ok(content.replacen(&needle, &replacement, 1))
}

/// Quarantines `entry` in its source file; returns whether the file changed.
pub fn quarantine_entry(entry: &CatalogEntry) -> Result<bool, ScopeError> {
    let content = fs::read_to_string(&entry.file)?;
    let rewritten = quarantine_source(&content, &entry.leaf_text)?;
    if rewritten == content {
        tracing::warn!(
            file = %entry.file.display(),
            test = %entry.full_name(),
            "leaf text not found in source, nothing quarantined"
        );
        return Ok(false);
    }
    fs::write(&entry.file, rewritten)?;
    tracing::info!(file = %entry.file.display(), test = %entry.full_name(), "test quarantined");
    Ok(true)
}
