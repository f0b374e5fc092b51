//! Message templates with embedded references.
//!
//! A template is free text in which `$path` and `#path` references,
//! registered statements and function calls are replaced by their values:
//!
//! ```
//! use assert_dsl::eval::FunctionRegistry;
//! use assert_dsl::render_message;
//! use serde_json::json;
//!
//! let model = json!({"a": {"b": 5}});
//! let state = json!({"c": 7});
//! let text = render_message("value is $a.b and #c", &model, &state, &FunctionRegistry::new());
//! assert_eq!(text.unwrap(), "value is 5 and 7");
//! ```

use std::sync::LazyLock;

use assert_dsl_parser::grammar::{is_identifier, is_word_char, MODEL_PREFIX, OPEN_BRACKET};
use assert_dsl_parser::scan::{denormalize_span, find_closing_bracket, is_within_call};
use assert_dsl_parser::{compile, FunctionNames, ParseError, Path, Span};
use regex::Regex;
use tracing::debug;

use crate::eval::{Context, Evaluator, FunctionRegistry};
use crate::Error;

/// A `$`/`#` prefix followed by dotted word segments. Trailing dots are
/// punctuation, not part of the path.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$#][A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*").expect("reference pattern is valid")
});

/// What a message reference refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceKind {
    ModelRef(Path),
    StateRef(Path),
    Statement(String),
    /// A call, compiled from the reference text when resolved.
    Call,
}

/// A substitutable piece of a message template.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReference<'a> {
    pub kind: ReferenceKind,
    /// Byte range in the template.
    pub span: Span,
    pub text: &'a str,
}

/// Find every reference in a template, in template order.
///
/// The template is split on whitespace, except whitespace inside the
/// argument list of a call. Each piece is then trimmed to the reference it
/// carries, if any.
pub fn tokenize_message<'a, N>(
    template: &'a str,
    names: &N,
) -> Result<Vec<MessageReference<'a>>, ParseError>
where
    N: FunctionNames + ?Sized,
{
    let mut references = Vec::new();
    for (start, word) in split_words(template) {
        trim_word(word, start, names, &mut references)?;
    }
    Ok(references)
}

fn split_words(template: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;

    for (i, c) in template.char_indices() {
        if c.is_whitespace() && !is_within_call(template, i) {
            if let Some(s) = start.take() {
                words.push((s, &template[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push((s, &template[s..]));
    }

    words
}

fn trim_word<'a, N>(
    word: &'a str,
    start: usize,
    names: &N,
    references: &mut Vec<MessageReference<'a>>,
) -> Result<(), ParseError>
where
    N: FunctionNames + ?Sized,
{
    let name_len = word.find(|c: char| !is_word_char(c)).unwrap_or(word.len());
    let name = &word[..name_len];

    if is_identifier(name) && names.is_registered(name) {
        let (kind, end) = if word[name_len..].starts_with(OPEN_BRACKET) {
            let close = find_closing_bracket(word, name_len).ok_or_else(|| {
                let at = start + name_len;
                ParseError::syntax(format!("unmatched '(' in call to '{}'", name), at..at + 1)
            })?;
            (ReferenceKind::Call, close + 1)
        } else {
            (ReferenceKind::Statement(name.to_string()), name_len)
        };
        references.push(MessageReference {
            kind,
            span: start..start + end,
            text: &word[..end],
        });
        return Ok(());
    }

    for m in REFERENCE_PATTERN.find_iter(word) {
        let text = m.as_str();
        let path = Path::parse(&text[1..]);
        let kind = if text.starts_with(MODEL_PREFIX) {
            ReferenceKind::ModelRef(path)
        } else {
            ReferenceKind::StateRef(path)
        };
        references.push(MessageReference {
            kind,
            span: start + m.start()..start + m.end(),
            text,
        });
    }
    Ok(())
}

/// Replace every reference in `template` with its value.
///
/// Model references resolve first, then state references, then statements
/// and calls in template order. A reference that resolves to nothing is
/// left in the output as written.
pub fn render_message(
    template: &str,
    model: &dyn Context,
    state: &dyn Context,
    functions: &FunctionRegistry,
) -> Result<String, Error> {
    let references = tokenize_message(template, functions)?;
    let evaluator = Evaluator::new(model, state, functions);
    let mut values: Vec<Option<String>> = vec![None; references.len()];

    for (i, reference) in references.iter().enumerate() {
        if let ReferenceKind::ModelRef(path) = &reference.kind {
            let value = model.lookup(path);
            if !value.is_missing() {
                values[i] = Some(value.to_string());
            }
        }
    }
    for (i, reference) in references.iter().enumerate() {
        if let ReferenceKind::StateRef(path) = &reference.kind {
            let value = state.lookup(path);
            if !value.is_missing() {
                values[i] = Some(value.to_string());
            }
        }
    }
    for (i, reference) in references.iter().enumerate() {
        let value = match &reference.kind {
            ReferenceKind::Statement(name) => evaluator.eval_call(name, &[]),
            ReferenceKind::Call => {
                // Compiler positions refer to the call with whitespace removed.
                let expr = compile(reference.text, functions).map_err(|e| {
                    e.map_span(|span| denormalize_span(reference.text, span))
                        .shifted(reference.span.start)
                })?;
                evaluator.eval(&expr)
            }
            _ => continue,
        };
        if !value.is_missing() {
            values[i] = Some(value.to_string());
        }
    }

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for (reference, value) in references.iter().zip(values) {
        out.push_str(&template[cursor..reference.span.start]);
        match value {
            Some(value) => out.push_str(&value),
            None => {
                debug!("message reference {} did not resolve", reference.text);
                out.push_str(reference.text);
            }
        }
        cursor = reference.span.end;
    }
    out.push_str(&template[cursor..]);

    Ok(out)
}
