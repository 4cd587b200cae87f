//! Small HTML assembly helpers shared by the rendering strategies.

use std::borrow::Cow;

/// Fill `{slot}` placeholders in a template.
///
/// Unknown placeholders are left untouched so a theme override with a typo
/// degrades visibly instead of eating content.
pub fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in slots {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Escape a value for a double-quoted attribute.
pub fn esc_attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Escape text content (textarea bodies, option labels are left raw).
pub fn esc_text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

/// ` checked="checked"` when the condition holds.
pub fn checked(condition: bool) -> &'static str {
    if condition {
        " checked=\"checked\""
    } else {
        ""
    }
}

/// ` selected="selected"` when the condition holds.
pub fn selected(condition: bool) -> &'static str {
    if condition {
        " selected=\"selected\""
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_named_slots() {
        assert_eq!(
            fill("<p class=\"{class}\">{field}</p>", &[("class", "c"), ("field", "x")]),
            "<p class=\"c\">x</p>"
        );
    }

    #[test]
    fn fill_replaces_every_occurrence() {
        assert_eq!(fill("{a}-{a}", &[("a", "1")]), "1-1");
    }

    #[test]
    fn fill_leaves_unknown_slots() {
        assert_eq!(fill("{title}", &[("desc", "d")]), "{title}");
    }

    #[test]
    fn escaping() {
        assert_eq!(esc_attr("a\"b"), "a&quot;b");
        assert_eq!(esc_text("<b>"), "&lt;b&gt;");
    }

    #[test]
    fn toggles() {
        assert_eq!(checked(true), " checked=\"checked\"");
        assert_eq!(checked(false), "");
        assert_eq!(selected(true), " selected=\"selected\"");
    }
}
