//! Shared text helpers for human-facing output.

use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// Removes angle-bracket-delimited markup from a string.
///
/// Upstream text fields embed presentation markup (e.g. `<b>145</b>` in a
/// stock description); every field surfaced in a "plain" form goes through
/// this. Non-greedy: a stray `<` with no matching `>` is left untouched.
#[must_use]
pub fn strip_tags(s: &str) -> String {
    tag_regex().replace_all(s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_bold_markup() {
        assert_eq!(strip_tags("<b>145</b> pcs"), "145 pcs");
    }

    #[test]
    fn strips_nested_and_attributed_tags() {
        assert_eq!(
            strip_tags(r#"<span class="loc">Aisle <b>12</b></span>"#),
            "Aisle 12"
        );
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(strip_tags("Self-serve area"), "Self-serve area");
    }

    #[test]
    fn leaves_unclosed_angle_bracket() {
        assert_eq!(strip_tags("a < b"), "a < b");
    }
}
