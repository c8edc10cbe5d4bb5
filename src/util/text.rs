use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Average adult reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string to fit within `max_width` terminal columns.
///
/// Appends "..." when text was cut. Widths of three columns or fewer cannot
/// hold a character plus the ellipsis, so those return the prefix that fits.
///
/// ```
/// use newshub::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
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

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Cuts a description to at most `max_chars` characters, appending "..." when
/// anything was removed. Used for the one-line previews in article lists.
pub fn preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((byte_idx, _)) => Cow::Owned(format!("{}{}", &text[..byte_idx], ELLIPSIS)),
    }
}

/// Estimated reading time in whole minutes, rounded up.
///
/// Whitespace-only or empty text reads in zero minutes.
pub fn reading_time_minutes(text: &str) -> usize {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Removes terminal control characters and ANSI escape sequences.
///
/// Upstream headline text is rendered straight into the terminal, so CSI
/// (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ESC \`) sequences are dropped
/// entirely along with C0 controls and DEL. Tab, newline and carriage return
/// survive. Clean input is returned borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let dirty = s
        .chars()
        .any(|c| c == '\x1b' || c == '\x7f' || (c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')));
    if !dirty {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_ascii_control() || c == '\x7f' => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}
