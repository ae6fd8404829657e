//! Final clean-up applied to every successful conversion.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n").expect("Line break regex pattern is valid and should compile"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Excess newline regex pattern is valid and should compile"));

/// Right-trim every line, join with `\n`, then collapse runs of three or more
/// newlines to exactly two.
///
/// Idempotent: `normalize_markdown(&normalize_markdown(s)) == normalize_markdown(s)`.
///
/// ```rust
/// use docdown::text::normalize_markdown;
///
/// assert_eq!(normalize_markdown("Hello, World!\n\n\n\nDone."), "Hello, World!\n\nDone.");
/// ```
pub fn normalize_markdown(text: &str) -> String {
    let joined = LINE_BREAK.split(text).map(str::trim_end).collect::<Vec<_>>().join("\n");
    EXCESS_NEWLINES.replace_all(&joined, "\n\n").into_owned()
}
