use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Terminal column width of `s`, counting CJK and emoji as two columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shortens `s` to at most `max_width` terminal columns, ending with "..."
/// when text was cut.
///
/// Widths of three columns or fewer have no room for the ellipsis, so the
/// result is just the characters that fit.
///
/// ```
/// use feedpulse::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let room = if max_width > ELLIPSIS_WIDTH {
        max_width - ELLIPSIS_WIDTH
    } else {
        max_width
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > room {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width > ELLIPSIS_WIDTH {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

/// Cleans feed-supplied text for single-line terminal display.
///
/// Drops ANSI escape sequences (CSI and OSC) and C0 control characters,
/// then collapses every run of whitespace, newlines included, into one
/// space and trims the ends. Text that needs none of this is borrowed.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    let clean = !s.bytes().any(|b| b < 0x20 || b == 0x7f)
        && !s.starts_with(char::is_whitespace)
        && !s.ends_with(char::is_whitespace)
        && !s.contains("  ");
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI ends at the first byte in 0x40..=0x7e
                    for n in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&n) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    // OSC ends at BEL or ESC '\'
                    while let Some(n) = chars.next() {
                        if n == '\x07' {
                            break;
                        }
                        if n == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            c if c.is_whitespace() => pending_space = true,
            c if c.is_control() => {}
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    Cow::Owned(out)
}
