use std::ops::Range;

use chrono::NaiveDate;

use crate::model::task::Priority;

/// What kind of inline tag a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `+name`
    Project,
    /// `@name`
    Context,
    /// `#{YYYY-MM-DD}`
    Due(NaiveDate),
}

/// An inline tag found in a task line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Byte range of the whole token, sigil included
    pub span: Range<usize>,
    /// The tag name, or the date text for due tokens
    pub value: &'a str,
}

/// Split a leading `(L) ` priority marker off a line.
///
/// The marker must be at position 0, hold a letter in `A..=X` and be
/// followed by one whitespace character. Returns the parsed priority and the
/// text after the marker.
pub fn split_priority(line: &str) -> (Option<Priority>, &str) {
    let b = line.as_bytes();
    if b.len() >= 4
        && b[0] == b'('
        && b[2] == b')'
        && b[3].is_ascii_whitespace()
        && let Some(p) = Priority::new(b[1] as char)
    {
        return (Some(p), &line[4..]);
    }
    (None, line)
}

/// Split a leading `YYYY-MM-DD ` creation date off a line.
pub fn split_created(s: &str) -> (Option<NaiveDate>, &str) {
    let b = s.as_bytes();
    if b.len() < 11 || b[10] != b' ' {
        return (None, s);
    }
    let shape_ok = b[..10]
        .iter()
        .enumerate()
        .all(|(i, c)| if i == 4 || i == 7 { *c == b'-' } else { c.is_ascii_digit() });
    if !shape_ok {
        return (None, s);
    }
    match NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
        Ok(date) => (Some(date), &s[11..]),
        Err(_) => (None, s),
    }
}

/// Remove a leading priority marker. No-op when there is none.
pub fn strip_priority(line: &str) -> String {
    split_priority(line).1.to_string()
}

/// Replace the leading priority marker, or insert one at position 0.
pub fn set_priority(line: &str, priority: Priority) -> String {
    let (_, rest) = split_priority(line);
    format!("({}) {}", priority, rest)
}

/// Insert text right after the priority marker, or at line start.
pub fn insert_after_priority(line: &str, text: &str) -> String {
    let (priority, rest) = split_priority(line);
    match priority {
        Some(_) => {
            let marker_len = line.len() - rest.len();
            format!("{}{}{}", &line[..marker_len], text, rest)
        }
        None => format!("{}{}", text, line),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scan a line for `+project`, `@context` and `#{date}` tokens in one pass.
///
/// Sigils may appear anywhere, not only at word starts. A `#{...}` token
/// that does not name a real calendar date is skipped.
pub fn scan_tokens(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '+' | '@' => {
                let name_start = start + 1;
                let mut end = name_start;
                while let Some(&(i, w)) = chars.peek() {
                    if !is_word_char(w) {
                        break;
                    }
                    end = i + w.len_utf8();
                    chars.next();
                }
                if end > name_start {
                    let kind = if c == '+' {
                        TokenKind::Project
                    } else {
                        TokenKind::Context
                    };
                    tokens.push(Token {
                        kind,
                        span: start..end,
                        value: &line[name_start..end],
                    });
                }
            }
            '#' => {
                if let Some((date, len)) = parse_due(&line[start..]) {
                    let end = start + len;
                    tokens.push(Token {
                        kind: TokenKind::Due(date),
                        span: start..end,
                        value: &line[start + 2..end - 1],
                    });
                    while chars.peek().is_some_and(|&(i, _)| i < end) {
                        chars.next();
                    }
                }
            }
            _ => {}
        }
    }

    tokens
}

/// Parse `#{YYYY-M-D}` at the start of `s`; month and day take one or two
/// digits. Returns the date and the byte length of the token.
fn parse_due(s: &str) -> Option<(NaiveDate, usize)> {
    let b = s.as_bytes();
    if !s.starts_with("#{") {
        return None;
    }
    let mut pos = 2;
    let year = take_digits(b, &mut pos, 4, 4)?;
    expect_byte(b, &mut pos, b'-')?;
    let month = take_digits(b, &mut pos, 1, 2)?;
    expect_byte(b, &mut pos, b'-')?;
    let day = take_digits(b, &mut pos, 1, 2)?;
    expect_byte(b, &mut pos, b'}')?;
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    Some((date, pos))
}

fn take_digits(b: &[u8], pos: &mut usize, min: usize, max: usize) -> Option<u32> {
    let start = *pos;
    while *pos < b.len() && *pos - start < max && b[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos - start < min {
        return None;
    }
    b[start..*pos]
        .iter()
        .try_fold(0u32, |acc, d| acc.checked_mul(10)?.checked_add(u32::from(d - b'0')))
}

fn expect_byte(b: &[u8], pos: &mut usize, want: u8) -> Option<()> {
    if b.get(*pos) == Some(&want) {
        *pos += 1;
        Some(())
    } else {
        None
    }
}

/// Remove every token accepted by `pred`, along with one whitespace
/// character directly after it.
pub fn remove_tokens(line: &str, pred: impl Fn(&TokenKind) -> bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for token in scan_tokens(line).into_iter().filter(|t| pred(&t.kind)) {
        out.push_str(&line[last..token.span.start]);
        last = token.span.end;
        if line.as_bytes().get(last).is_some_and(u8::is_ascii_whitespace) {
            last += 1;
        }
    }
    out.push_str(&line[last..]);
    out
}
