//! Field-level validation shared by the reference-data resources.
//!
//! DTO shape checks (lengths, e-mail format, numeric ranges) live on the DTOs
//! themselves via `validator`; the rules here are the ones that need a regex
//! or that several DTOs share.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an entity name.
pub const MAX_NAME_LENGTH: usize = 150;

/// Minimum / maximum length of a short code (e.g. `"MH"`, `"MH-PUNE"`).
pub const MIN_CODE_LENGTH: usize = 2;
pub const MAX_CODE_LENGTH: usize = 20;

/// Maximum length of a free-text search term.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Upper bound for `sort_order` columns.
pub const MAX_SORT_ORDER: i32 = 10_000;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a short code: upper-case letters, digits, `-` and `_`,
/// starting with a letter or digit.
pub fn validate_code(code: &str) -> Result<(), String> {
    let len = code.chars().count();
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&len) {
        return Err(format!(
            "Code must be between {MIN_CODE_LENGTH} and {MAX_CODE_LENGTH} characters"
        ));
    }
    if !CODE_RE.is_match(code) {
        return Err(format!(
            "Invalid code '{code}'. Use upper-case letters, digits, '-' or '_'"
        ));
    }
    Ok(())
}

/// Validate an entity name: non-blank and within the length limit.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate an optional code / name pair from an update DTO.
pub fn validate_optional(
    name: Option<&str>,
    code: Option<&str>,
) -> Result<(), String> {
    if let Some(name) = name {
        validate_name(name)?;
    }
    if let Some(code) = code {
        validate_code(code)?;
    }
    Ok(())
}

/// Validate a `sort_order` value.
pub fn validate_sort_order(sort_order: i32) -> Result<(), String> {
    if !(0..=MAX_SORT_ORDER).contains(&sort_order) {
        return Err(format!("sort_order must be between 0 and {MAX_SORT_ORDER}"));
    }
    Ok(())
}

/// Turn a raw `?search=` value into an `ILIKE` pattern.
///
/// Blank input yields `None`. `%`, `_` and `\` are escaped so the term matches
/// literally; the result is wrapped in `%...%`.
pub fn search_pattern(search: Option<&str>) -> Result<Option<String>, String> {
    let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if term.chars().count() > MAX_SEARCH_LENGTH {
        return Err(format!(
            "Search term exceeds maximum length of {MAX_SEARCH_LENGTH} characters"
        ));
    }
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Ok(Some(escaped))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
