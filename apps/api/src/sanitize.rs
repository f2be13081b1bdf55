//! Text cleaners applied before anything is persisted or sent upstream.
//!
//! Every function here is pure and idempotent: feeding an output back in
//! returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;

/// Hard ceiling (in chars) for any text column, marker included.
pub const STORAGE_MAX_CHARS: usize = 65_000;
pub const TRUNCATION_MARKER: &str = "...(内容过长已截断)";

const FILE_NAME_MAX_CHARS: usize = 200;
const DEFAULT_FILE_NAME: &str = "document";
const DEFAULT_MODEL_ID: &str = "default";

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {3,}").unwrap());
static UNDERSCORE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{2,}").unwrap());
static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static TAB_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t{2,}").unwrap());

/// Cleans a model identifier for use in the gateway routing header.
/// Output only ever contains `[A-Za-z0-9/_-]`; falls back to `"default"`.
pub fn sanitize_model_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter_map(|c| match c {
            '\n' | '\r' => None,
            ':' | ';' | ',' | ' ' => Some('-'),
            c if c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();

    if cleaned.is_empty() {
        DEFAULT_MODEL_ID.to_string()
    } else {
        cleaned
    }
}

/// Makes text safe for a TEXT column: strips control characters (tab and
/// newline survive), drops U+FFFD left behind by lossy decoding, collapses long
/// space runs, trims and caps the length.
pub fn sanitize_for_storage(text: &str) -> String {
    let filtered: String = text.chars().filter(|&c| !is_stripped_char(c)).collect();
    let collapsed = SPACE_RUN.replace_all(&filtered, "  ");
    truncate_with_marker(collapsed.trim())
}

/// Same as [`sanitize_for_storage`] for raw bytes that may not be valid UTF-8.
pub fn sanitize_bytes_for_storage(bytes: &[u8]) -> String {
    sanitize_for_storage(&String::from_utf8_lossy(bytes))
}

fn is_stripped_char(c: char) -> bool {
    c == char::REPLACEMENT_CHARACTER
        || c == '\u{7f}'
        || (c < '\u{20}' && c != '\t' && c != '\n')
}

fn truncate_with_marker(text: &str) -> String {
    if text.chars().count() <= STORAGE_MAX_CHARS {
        return text.to_string();
    }
    let keep = STORAGE_MAX_CHARS - TRUNCATION_MARKER.chars().count();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Produces a file name that is safe on every filesystem we write to.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let collapsed = UNDERSCORE_RUN.replace_all(&replaced, "_");
    let trimmed = trim_file_name(&collapsed);
    let capped: String = trimmed.chars().take(FILE_NAME_MAX_CHARS).collect();
    let capped = trim_file_name(&capped);

    if capped.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        capped.to_string()
    }
}

fn trim_file_name(name: &str) -> &str {
    name.trim_matches(|c| c == '_' || c == ' ')
}

/// Keeps printable ASCII (and tab) so the value can go into an HTTP header.
pub fn sanitize_header_value(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|&c| c == '\t' || (' '..='~').contains(&c))
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        DEFAULT_MODEL_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Storage sanitation plus layout tidying for uploaded document text.
pub fn clean_document_content(text: &str) -> String {
    let stored = sanitize_for_storage(text);
    let lines: Vec<&str> = stored.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    let joined = NEWLINE_RUN.replace_all(&joined, "\n\n");
    let joined = TAB_RUN.replace_all(&joined, "\t");
    joined.trim().to_string()
}
