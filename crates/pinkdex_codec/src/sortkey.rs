//! Sort key normalization.
//!
//! [`sanitize`] turns an author, title, or series string into the key used
//! both for catalog order and for physical shelf order. The rules are fixed
//! by decades of printed shelf lists; changing any of them moves books.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static ARTICLE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r", (?:A|AN|THE)$").unwrap());

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-/,: ]+").unwrap());

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Z0-9()<> ]").unwrap());

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s*(.*)$").unwrap());

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Width every digit run is padded to.
pub const NUMBER_WIDTH: usize = 6;

/// Normalizes a string into its sort key.
///
/// Total: every input yields a key. Applying it to its own output is a
/// no-op, except for keys holding two or more numbers where a number
/// leads. The canonical brackets `<` `>` pass through unchanged; neither
/// can appear in a raw field since `<` separates fields.
///
/// ```
/// use pinkdex_codec::sanitize;
///
/// assert_eq!(sanitize("Hobbit, The"), "HOBBIT");
/// assert_eq!(sanitize("2001: a space odyssey"), "A SPACE ODYSSEY 002001");
/// assert_eq!(sanitize("Foundation (Trilogy)"), "FOUNDATION <TRILOGY>");
/// ```
#[must_use]
pub fn sanitize(s: &str) -> String {
    let s = s.trim().to_uppercase();
    let s = ARTICLE_SUFFIX.replace(&s, "");
    let s = SEPARATORS.replace_all(&s, " ");
    let s = DISALLOWED.replace_all(&s, "");
    let s = s.strip_prefix('(').unwrap_or(&s);
    let s = LEADING_NUMBER.replace(s, "$2 $1");
    let s = DIGITS.replace_all(&s, |caps: &Captures<'_>| {
        format!("{:0>width$}", &caps[0], width = NUMBER_WIDTH)
    });
    s.replace('(', "<").replace(')', ">")
}

/// Splits a `display=sortby` element.
///
/// Returns the display half and, when present, the sort-by half.
#[must_use]
pub fn split_sortby(s: &str) -> (&str, Option<&str>) {
    match s.split_once('=') {
        Some((display, sortby)) => (display, Some(sortby)),
        None => (s, None),
    }
}

/// Returns the half of a `display=sortby` element used for ordering.
#[must_use]
pub fn sortby_text(s: &str) -> &str {
    match split_sortby(s) {
        (_, Some(sortby)) => sortby,
        (display, None) => display,
    }
}
