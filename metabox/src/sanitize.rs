//! Default value cleaning applied before persistence.
//!
//! Every submitted value passes through exactly one sanitizer. A per-field
//! function wins; otherwise a block-level sanitizer handles the whole map;
//! otherwise the field type picks one of the defaults below. Fields marked
//! `Sanitize::None` bypass cleaning entirely.

use std::sync::LazyLock;

use regex::Regex;

use metabox_fields::FieldType;
use metabox_host::MetaValue;

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script/style regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)</?([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("valid html tag regex")
});

static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\son[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("valid event attribute regex")
});

/// Tags the rich-HTML sanitizer keeps; everything else is stripped.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "cite", "code", "del", "div", "em", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "q", "s", "span", "strong",
    "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// The type-driven default for a submitted text value.
///
/// List and map values pass through untouched: a structured value belongs to
/// a complex field whose custom renderer/sanitizer pair owns its cleaning.
pub fn default_for_type(type_: &FieldType, value: MetaValue) -> MetaValue {
    let MetaValue::Text(s) = value else {
        return value;
    };
    MetaValue::Text(match type_ {
        FieldType::Number | FieldType::Range => number(&s),
        FieldType::Email => email(&s),
        FieldType::Textarea | FieldType::RichText => rich_html(&s),
        _ => text_field(&s),
    })
}

/// Single-line plain text: tags removed, whitespace runs collapsed.
pub fn text_field(value: &str) -> String {
    let no_blocks = SCRIPT_STYLE_RE.replace_all(value, "");
    let no_tags = TAG_RE.replace_all(&no_blocks, "");
    let mut out = String::with_capacity(no_tags.len());
    let mut at_space = true;
    for c in no_tags.chars() {
        if c.is_whitespace() || c.is_control() {
            if !at_space {
                out.push(' ');
                at_space = true;
            }
        } else {
            out.push(c);
            at_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// The numeric prefix of the input, normalized. Input with no digits comes
/// back empty, so the save step's delete-on-empty rule clears the field.
pub fn number(value: &str) -> String {
    let trimmed = value.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => {
                end = i + 1;
                seen_digit = true;
            }
            '.' if !seen_dot => {
                end = i + 1;
                seen_dot = true;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return String::new();
    }
    let parsed: f64 = trimmed[..end].parse().unwrap_or(0.0);
    if parsed.fract() == 0.0 && parsed.abs() < 1e15 {
        format!("{}", parsed as i64)
    } else {
        parsed.to_string()
    }
}

/// A canonical email address, or empty when the input cannot be one.
pub fn email(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.@-".contains(*c))
        .collect();
    let Some((local, domain)) = cleaned.split_once('@') else {
        return String::new();
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return String::new();
    }
    cleaned
}

/// Multi-line HTML restricted to the allowed tag set, with script and style
/// blocks (including their content) and inline event handlers removed.
pub fn rich_html(value: &str) -> String {
    let no_blocks = SCRIPT_STYLE_RE.replace_all(value, "");
    let filtered = HTML_TAG_RE.replace_all(&no_blocks, |caps: &regex::Captures<'_>| {
        let name = caps[1].to_ascii_lowercase();
        if ALLOWED_TAGS.contains(&name.as_str()) {
            EVENT_ATTR_RE.replace_all(&caps[0], "").into_owned()
        } else {
            String::new()
        }
    });
    filtered.into_owned()
}
