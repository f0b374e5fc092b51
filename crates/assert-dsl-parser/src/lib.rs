//! Tokenizer and expression compiler for the assertion language.
//!
//! An expression is compiled against a set of registered function names:
//! an identifier is only meaningful if it names a registered function, and
//! whether it is followed by a bracket decides between a call and a
//! statement reference.
//!
//! ```
//! use assert_dsl_parser::{compile, BinaryOp, Expr};
//!
//! let ast = compile("add(2, 3) * 4 == 20", &["add"]).unwrap();
//! assert!(matches!(ast.node, Expr::Binary { op: BinaryOp::Eq, .. }));
//! ```

pub mod ast;
mod error;
pub mod grammar;
mod lexer;
mod names;
mod parser;
pub mod scan;

pub use ast::{BinaryOp, Expr, Path, Span, Spanned, SpannedExpr};
pub use error::{DuplicateFunctionError, ParseError};
pub use lexer::{next_token, SpannedToken, Token};
pub use names::{FunctionNames, NameRegistry};
pub use parser::{parse_tokens, Parser};

/// Normalize whitespace and tokenize an expression.
///
/// Spans refer to the normalized text, which is returned alongside the tokens.
pub fn lex<N>(source: &str, names: &N) -> Result<(String, Vec<SpannedToken>), ParseError>
where
    N: FunctionNames + ?Sized,
{
    let normalized = scan::strip_whitespace(source);
    let tokens = lexer::tokenize(&normalized, names)?;
    Ok((normalized, tokens))
}

/// Compile an expression into a tree.
pub fn compile<N>(source: &str, names: &N) -> Result<SpannedExpr, ParseError>
where
    N: FunctionNames + ?Sized,
{
    let normalized = scan::strip_whitespace(source);
    parser::compile_fragment(&normalized, 0, names)
}
