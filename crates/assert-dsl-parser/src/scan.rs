//! Position helpers shared by the tokenizer, the constraint assembler and the
//! message tokenizer.
//!
//! All indices are byte offsets. Every structural character of the language
//! is ASCII, so scanning bytes never splits a multi-byte character.

use crate::ast::Span;
use crate::grammar::{is_word_byte, ARGUMENT_SEPARATOR, STRING_DELIMITER};

const QUOTE: u8 = STRING_DELIMITER as u8;

/// Remove whitespace outside string literals.
pub fn strip_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    for c in input.chars() {
        if c == STRING_DELIMITER {
            in_string = !in_string;
        }
        if in_string || !c.is_whitespace() {
            out.push(c);
        }
    }
    out
}

/// Returns true if `index` falls inside a string literal.
///
/// An odd number of delimiters after the index means one of them closes a
/// literal the index sits in.
pub fn is_within_string(text: &str, index: usize) -> bool {
    text.as_bytes()
        .get(index + 1..)
        .map_or(0, |rest| rest.iter().filter(|&&b| b == QUOTE).count())
        % 2
        == 1
}

/// Byte offset of the first `target` that is not inside a string literal.
///
/// Scans forward, so an unterminated literal after the target does not
/// hide it.
pub fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        if c == STRING_DELIMITER {
            in_string = !in_string;
        } else if c == target && !in_string {
            return Some(i);
        }
    }
    None
}

/// Map a span in `strip_whitespace(source)` back onto `source`.
pub fn denormalize_span(source: &str, span: Span) -> Span {
    let mut kept = 0;
    let mut in_string = false;
    let mut start = None;
    let mut end = None;

    for (i, c) in source.char_indices() {
        if c == STRING_DELIMITER {
            in_string = !in_string;
        }
        if !in_string && c.is_whitespace() {
            continue;
        }
        if start.is_none() && kept >= span.start {
            start = Some(i);
        }
        kept += c.len_utf8();
        if end.is_none() && kept >= span.end {
            end = Some(i + c.len_utf8());
        }
    }

    let start = start.unwrap_or(source.len());
    if span.is_empty() {
        return start..start;
    }
    start..end.unwrap_or(source.len()).max(start)
}

/// Offset of the bracket closing the one at `open`, counting depth and
/// skipping quoted regions.
pub fn find_closing_bracket(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            QUOTE => {
                let close = bytes[i + 1..].iter().position(|&b| b == QUOTE)?;
                i += close + 1;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Returns true if `index` lies inside the argument list of a function call.
///
/// Walks left to the nearest enclosing, depth-balanced `(` that directly
/// follows a word character, then requires its closing bracket to lie
/// after `index`. Grouping brackets are stepped over.
pub fn is_within_call(text: &str, index: usize) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut j = index.min(bytes.len());

    while j > 0 {
        j -= 1;
        match bytes[j] {
            b')' => depth += 1,
            b'(' if depth > 0 => depth -= 1,
            b'(' if j > 0 && is_word_byte(bytes[j - 1]) => {
                return find_closing_bracket(text, j).is_some_and(|close| close > index);
            }
            _ => {}
        }
    }

    false
}

/// Split an argument list on top-level commas.
///
/// Returns each argument with its byte offset in `text`. Commas nested in
/// brackets or string literals do not split. An empty or all-whitespace
/// list yields no arguments.
pub fn split_arguments(text: &str) -> Vec<(usize, &str)> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let bytes = text.as_bytes();
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            QUOTE => in_string = !in_string,
            _ if in_string => {}
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b if b == ARGUMENT_SEPARATOR as u8 && depth == 0 => {
                args.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push((start, &text[start..]));

    args
}
