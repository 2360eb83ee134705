use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(&str, &str); 5] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
];

const NON_BREAKING_SPACES: [char; 3] = ['\u{00A0}', '\u{2007}', '\u{202F}'];

/// Canonicalize extracted text.
///
/// Line structure is kept so headings can still be found line by line:
/// horizontal whitespace collapses to one space, every line is trimmed, and
/// runs of blank lines shrink to a single paragraph break. Bullet glyphs
/// become `- `. The function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

    // Must run before NFC, otherwise a second pass could compose characters
    // that the removal made adjacent.
    result = result.replace('\u{FFFD}', "");
    for (ligature, replacement) in &LIGATURES {
        result = result.replace(ligature, replacement);
    }

    result = result.replace(NON_BREAKING_SPACES, " ");

    static RE_BULLET: OnceLock<Regex> = OnceLock::new();
    let re_bullet = RE_BULLET
        .get_or_init(|| Regex::new(r"[•●▪◦■□‣∙○◆►▸][^\S\n]*").expect("valid bullet regex"));
    result = re_bullet.replace_all(&result, "- ").into_owned();

    result = result.nfc().collect();

    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r"[^\S\n]+").expect("valid space regex"));

    let mut lines: Vec<String> = Vec::new();
    for line in result.split('\n') {
        let collapsed = re_spaces.replace_all(line, " ");
        let trimmed = collapsed.trim();
        if trimmed.is_empty() && lines.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        lines.push(trimmed.to_string());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize("Hello world."), "Hello world.");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  \n\n \t "), "");
    }

    #[test]
    fn test_collapses_horizontal_whitespace() {
        assert_eq!(normalize("a  \t  b"), "a b");
    }

    #[test]
    fn test_trims_each_line() {
        assert_eq!(normalize("  first  \n   second "), "first\nsecond");
    }

    #[test]
    fn test_keeps_single_paragraph_break() {
        assert_eq!(normalize("one\n\n\n\ntwo"), "one\n\ntwo");
        assert_eq!(normalize("one\n  \n\t\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn test_drops_leading_and_trailing_blank_lines() {
        assert_eq!(normalize("\n\n  body  \n\n"), "body");
    }

    #[test]
    fn test_non_breaking_space() {
        assert_eq!(normalize("a\u{00A0}b"), "a b");
        assert_eq!(normalize("a\u{202F}\u{00A0} b"), "a b");
    }

    #[test]
    fn test_bullets_become_dash_prefix() {
        assert_eq!(normalize("\u{2022} Item"), "- Item");
        assert_eq!(normalize("\u{25CF}Item"), "- Item");
        assert_eq!(normalize("  \u{25AA}   Item"), "- Item");
    }

    #[test]
    fn test_ligature_fix() {
        assert_eq!(normalize("\u{FB01}nd"), "find");
        assert_eq!(normalize("a\u{FB04}e"), "affle");
    }

    #[test]
    fn test_replacement_char_removed() {
        assert_eq!(normalize("Hello\u{FFFD}World"), "HelloWorld");
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_nfc_normalization() {
        assert_eq!(normalize("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain",
            "  CHAPTER 1  \n\n\n body\ttext \u{00A0} here \n",
            "\u{2022}\u{2022} double bullet",
            "e\u{FFFD}\u{0301} and \u{FB01}\u{0301}",
            "line\r\n\r\n\r\nnext\u{000C}page",
            "\u{25CF}\n\u{25CF}",
            "mixed \u{2003}em\u{2003}spaces\n \n \n- already - dashed",
            "trailing bullet \u{2022}",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
