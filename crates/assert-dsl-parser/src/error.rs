//! Compile-time error types.

use thiserror::Error;

use crate::ast::Span;

/// An error raised while tokenizing or compiling an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Malformed token, unmatched bracket or quote, or an exhausted scan.
    #[error("syntax error at {}: {message}", span.start)]
    Syntax { message: String, span: Span },

    /// An identifier that is not a registered function name.
    #[error("unknown function '{name}' at {}", span.start)]
    UnknownFunction { name: String, span: Span },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn unknown_function(name: impl Into<String>, span: Span) -> Self {
        Self::UnknownFunction {
            name: name.into(),
            span,
        }
    }

    /// Byte range of the offending input.
    pub fn span(&self) -> Span {
        match self {
            Self::Syntax { span, .. } | Self::UnknownFunction { span, .. } => span.clone(),
        }
    }

    /// Returns a copy of this error with its span moved by `offset` bytes.
    ///
    /// Used when a sub-expression is compiled on its own and its positions
    /// must be reported against the enclosing text.
    pub fn shifted(self, offset: usize) -> Self {
        self.map_span(|span| span.start + offset..span.end + offset)
    }

    /// Returns a copy of this error with its span replaced by `f(span)`.
    pub fn map_span(self, f: impl FnOnce(Span) -> Span) -> Self {
        match self {
            Self::Syntax { message, span } => Self::Syntax {
                message,
                span: f(span),
            },
            Self::UnknownFunction { name, span } => Self::UnknownFunction {
                name,
                span: f(span),
            },
        }
    }
}

/// Registering a function name that is already registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("function '{name}' is already registered")]
pub struct DuplicateFunctionError {
    pub name: String,
}
