//! Contact address shape check.

use regex_lite::Regex;
use std::sync::LazyLock;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Returns true if `email` looks like `local-part@domain.tld`.
///
/// This is a shape check only: word characters, dots and dashes around a
/// single `@`, with at least one dot in the domain. Word characters are
/// ASCII only (`[A-Za-z0-9_]`), so non-ASCII local parts are refused.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}
