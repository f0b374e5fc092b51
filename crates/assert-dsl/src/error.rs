//! Errors raised while registering functions or compiling assertions.

use thiserror::Error;

use assert_dsl_parser::{DuplicateFunctionError, ParseError};

/// Error returned by [`Env`](crate::Env) and the compile entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("function '{name}' is already registered")]
    DuplicateFunction { name: String },

    /// Function names must be identifiers and must not be activation keywords.
    #[error("'{name}' is not a valid function name")]
    InvalidFunctionName { name: String },

    #[error("invalid activation '{activation}': expected ALWAYS, WHEN(<condition>) or a statement")]
    InvalidActivation { activation: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<DuplicateFunctionError> for Error {
    fn from(err: DuplicateFunctionError) -> Self {
        Error::DuplicateFunction { name: err.name }
    }
}

impl Error {
    /// The underlying compile error, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}
