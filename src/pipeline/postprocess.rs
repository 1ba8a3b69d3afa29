//! Post-processing: deterministic cleanup of model replies before parsing.
//!
//! Vision models follow the catalog format closely but not exactly. They wrap
//! the reply in ` ``` ` fences, bold the field labels (`**Product Name:**`),
//! or emit `\r\n`. The parser matches labels at the very start of a line, so
//! these quirks would turn a perfectly good reply into an `Unknown` product.
//!
//! ## Rule Order
//!
//! Fences are stripped before line endings are normalised so the fence regex
//! sees the raw reply; label emphasis is removed after trailing whitespace is
//! trimmed so the label regex can anchor on clean lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model reply.
///
/// Rules (applied in order):
/// 1. Strip outer code fences
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Unwrap emphasised or heading-marked field labels
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 6. Trim the whole reply
pub fn clean_reply(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = unwrap_field_labels(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Unwrap field labels ──────────────────────────────────────────────
//
// `**Product Name:** Foo`, `## Specifications:` and `*Category*: Bar` become
// `Product Name: Foo`, `Specifications:` and `Category: Bar`. Only a label at
// the start of a line is touched; emphasis inside values is kept.

static RE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:#{1,6}\s+)?\*{1,2}([A-Za-z][A-Za-z ]*?)(:?)\*{1,2}(:?)").unwrap()
});

static RE_HEADING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+([A-Za-z][A-Za-z ]*:)").unwrap());

fn unwrap_field_labels(input: &str) -> String {
    let s = RE_LABEL.replace_all(input, "$1$2$3");
    RE_HEADING_LABEL.replace_all(&s, "$1").to_string()
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
