use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncate `s` to at most `max_width` terminal columns, appending "..." when cut.
///
/// Widths of 3 columns or fewer leave no room for the ellipsis, so the text is
/// cut bare. Returns `Cow::Borrowed` whenever the input already fits.
///
/// ```
/// use taskmaster::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("buy milk", 20), "buy milk");
/// assert_eq!(truncate_to_width("water the plants", 10), "water t...");
/// assert_eq!(truncate_to_width("abc", 2), "ab");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Make a store-supplied title safe to paint on a terminal.
///
/// Titles come from a remote service and are rendered on a single row, so
/// ANSI escape sequences (CSI and OSC) and C0/DEL control characters are
/// removed, and line breaks and tabs become plain spaces.
pub fn sanitize_title(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c.is_control()) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI: parameters run until a final byte in 0x40..=0x7e
                    for f in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&f) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    // OSC: terminated by BEL or ST (ESC \)
                    while let Some(f) = chars.next() {
                        if f == '\u{07}' {
                            break;
                        }
                        if f == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("short", 10), Cow::Borrowed(_)));
    }

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_wide_chars_truncation() {
        // each CJK char is two columns
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
        assert_eq!(truncate_to_width("你好", 1), "");
    }

    #[test]
    fn test_narrow_widths_skip_ellipsis() {
        assert_eq!(truncate_to_width("Test!", 0), "");
        assert_eq!(truncate_to_width("Test!", 3), "Tes");
    }

    #[test]
    fn test_sanitize_clean_title_borrowed() {
        assert!(matches!(sanitize_title("buy milk"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_strips_csi() {
        assert_eq!(sanitize_title("\u{1b}[31mred\u{1b}[0m"), "red");
    }

    #[test]
    fn test_sanitize_strips_osc() {
        assert_eq!(
            sanitize_title("a\u{1b}]0;pwned\u{07}b"),
            "ab"
        );
        assert_eq!(
            sanitize_title("a\u{1b}]8;;http://x\u{1b}\\b"),
            "ab"
        );
    }

    #[test]
    fn test_sanitize_flattens_newlines() {
        assert_eq!(sanitize_title("line one\nline two"), "line one line two");
    }

    #[test]
    fn test_sanitize_drops_bell_and_del() {
        assert_eq!(sanitize_title("ding\u{07}\u{7f}!"), "ding!");
    }

    proptest! {
        #[test]
        fn truncated_never_exceeds_width(s in "\\PC{0,40}", width in 0usize..30) {
            prop_assert!(display_width(&truncate_to_width(&s, width)) <= width);
        }

        #[test]
        fn sanitized_has_no_controls(s in ".{0,40}") {
            prop_assert!(!sanitize_title(&s).chars().any(|c| c.is_control()));
        }
    }
}
