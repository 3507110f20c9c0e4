//! Line normalization for extracted report text.
//!
//! Lab reports come out of layout extraction with inconsistent spacing around
//! punctuation, stray quotes and a handful of accented letters. Every line is
//! passed through [`normalize_line`] before classification so that prefix and
//! regex matching downstream sees a stable form.
//!
//! Rules, applied in order:
//! 1. Runs of spaces and tabs collapse to a single space
//! 2. No space before `;` or `(`, no space after `.`, `;` or `)`
//! 3. Quote characters touching `-`, `;`, `(` or `)` are removed
//! 4. Em-dash becomes `-`, accented vowels lose their accent, backtick and
//!    acute accent become `'`
//! 5. Leading and trailing whitespace is trimmed

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of blanks
    static ref RE_BLANKS: Regex = Regex::new(r"[ \t]+").unwrap();

    /// Space before a semicolon or opening parenthesis
    static ref RE_SPACE_BEFORE: Regex = Regex::new(r" ([;(])").unwrap();

    /// Space after a period, semicolon or closing parenthesis
    static ref RE_SPACE_AFTER: Regex = Regex::new(r"([.;)]) ").unwrap();

    /// Quote following a separator
    static ref RE_QUOTE_AFTER: Regex = Regex::new(r#"([-;()])['"]"#).unwrap();

    /// Quote preceding a separator
    static ref RE_QUOTE_BEFORE: Regex = Regex::new(r#"['"]([-;()])"#).unwrap();
}

/// Character substitutions applied after the spacing rules.
const CHAR_REPLACEMENTS: &[(char, char)] = &[
    ('—', '-'),
    ('à', 'a'),
    ('ú', 'u'),
    ('`', '\''),
    ('´', '\''),
    ('è', 'e'),
    ('é', 'e'),
    ('í', 'i'),
    ('ï', 'i'),
    ('ò', 'o'),
    ('ó', 'o'),
];

/// Normalize one line of extracted text.
///
/// Returns an empty string for blank input; callers skip those lines.
///
/// # Examples
///
/// ```
/// use labtool::text::normalize_line;
///
/// assert_eq!(normalize_line("  Pla-Glucosa ; c.subst.  "), "Pla-Glucosa;c.subst.");
/// assert_eq!(normalize_line("Metge:   Dr.  Martí"), "Metge: Dr.Marti");
/// assert_eq!(normalize_line(" \t "), "");
/// ```
pub fn normalize_line(raw: &str) -> String {
    let s = RE_BLANKS.replace_all(raw, " ");

    let s = RE_SPACE_BEFORE.replace_all(&s, "$1");
    let s = RE_SPACE_AFTER.replace_all(&s, "$1");

    let s = RE_QUOTE_AFTER.replace_all(&s, "$1");
    let s = RE_QUOTE_BEFORE.replace_all(&s, "$1");

    let s: String = s
        .chars()
        .map(|c| {
            CHAR_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect();

    s.trim().to_string()
}
