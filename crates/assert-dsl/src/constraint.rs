//! Assertions of the form `<activation>:<condition>`.
//!
//! The activation decides whether the condition applies:
//!
//! - `ALWAYS` applies unconditionally
//! - `WHEN(<expr>)` applies when the bracketed expression is truthy
//! - a bare registered name applies when that statement is truthy
//!
//! An inactive constraint holds vacuously.

use std::fmt;
use std::sync::Arc;

use assert_dsl_parser::grammar::{
    is_identifier, is_keyword, ACTIVATION_SEPARATOR, ALWAYS, OPEN_BRACKET, WHEN,
};
use assert_dsl_parser::scan::{find_closing_bracket, find_unquoted, strip_whitespace};
use assert_dsl_parser::{lex, parse_tokens, ParseError, SpannedExpr};

use crate::eval::{Context, Evaluator, FunctionRegistry};
use crate::observe::{CompileObserver, TracingObserver};
use crate::Error;

/// When a constraint's condition must hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Always,
    /// `WHEN(<expr>)`
    Conditional(SpannedExpr),
    /// A registered statement used as the gate.
    StatementGate(String),
}

/// Outcome of checking a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The activation did not hold, so the condition was not evaluated.
    Inactive,
    Satisfied,
    Violated,
}

impl Verdict {
    pub fn is_violated(self) -> bool {
        self == Verdict::Violated
    }
}

/// A compiled assertion.
///
/// Holds the function registry it was compiled against, so functions
/// registered afterwards never change its meaning.
#[derive(Debug, Clone)]
pub struct Constraint {
    source: String,
    activation: Activation,
    condition: SpannedExpr,
    functions: Arc<FunctionRegistry>,
}

impl Constraint {
    /// Compile an assertion, reporting stages to `tracing`.
    pub fn compile(assertion: &str, functions: Arc<FunctionRegistry>) -> Result<Self, Error> {
        Self::compile_observed(assertion, functions, &TracingObserver)
    }

    /// Compile an assertion, reporting stages to `observer`.
    ///
    /// Error positions are byte offsets into the assertion with whitespace
    /// outside string literals removed.
    pub fn compile_observed(
        assertion: &str,
        functions: Arc<FunctionRegistry>,
        observer: &dyn CompileObserver,
    ) -> Result<Self, Error> {
        let normalized = strip_whitespace(assertion);
        let separator = find_unquoted(&normalized, ACTIVATION_SEPARATOR).ok_or_else(|| {
            ParseError::syntax(
                "missing activation separator ':'",
                normalized.len()..normalized.len(),
            )
        })?;

        let activation_text = &normalized[..separator];
        let condition_text = &normalized[separator + 1..];
        observer.on_split(activation_text, condition_text);

        let activation = compile_activation(activation_text, &functions, observer)?;
        let condition = compile_observed(condition_text, separator + 1, &functions, observer)?;

        let constraint = Self {
            source: assertion.to_string(),
            activation,
            condition,
            functions,
        };
        observer.on_compiled(&constraint);
        Ok(constraint)
    }

    /// The assertion text this constraint was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn condition(&self) -> &SpannedExpr {
        &self.condition
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Returns true if the activation holds for the given contexts.
    pub fn is_active(&self, model: &dyn Context, state: &dyn Context) -> bool {
        let evaluator = Evaluator::new(model, state, &self.functions);
        match &self.activation {
            Activation::Always => true,
            Activation::Conditional(expr) => evaluator.eval(expr).is_truthy(),
            Activation::StatementGate(name) => evaluator.eval_call(name, &[]).is_truthy(),
        }
    }

    /// Check the constraint, telling a vacuous pass apart from a real one.
    pub fn check(&self, model: &dyn Context, state: &dyn Context) -> Verdict {
        if !self.is_active(model, state) {
            return Verdict::Inactive;
        }

        let evaluator = Evaluator::new(model, state, &self.functions);
        if evaluator.eval(&self.condition).is_truthy() {
            Verdict::Satisfied
        } else {
            Verdict::Violated
        }
    }

    /// Returns false only when the activation holds and the condition does not.
    pub fn evaluate(&self, model: &dyn Context, state: &dyn Context) -> bool {
        !self.check(model, state).is_violated()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn compile_activation(
    text: &str,
    functions: &FunctionRegistry,
    observer: &dyn CompileObserver,
) -> Result<Activation, Error> {
    if text == ALWAYS {
        return Ok(Activation::Always);
    }

    if text.starts_with(WHEN) && text[WHEN.len()..].starts_with(OPEN_BRACKET) {
        let open = WHEN.len();
        let close = find_closing_bracket(text, open)
            .ok_or_else(|| ParseError::syntax("unmatched '(' in WHEN activation", open..open + 1))?;
        if close + 1 != text.len() {
            return Err(ParseError::syntax(
                "unexpected text after WHEN condition",
                close + 1..text.len(),
            )
            .into());
        }
        let guard = compile_observed(&text[open + 1..close], open + 1, functions, observer)?;
        return Ok(Activation::Conditional(guard));
    }

    if is_identifier(text) && !is_keyword(text) {
        if functions.contains(text) {
            return Ok(Activation::StatementGate(text.to_string()));
        }
        return Err(ParseError::unknown_function(text, 0..text.len()).into());
    }

    Err(Error::InvalidActivation {
        activation: text.to_string(),
    })
}

/// Tokenize and compile `source`, whose first byte sits at `base` in the
/// enclosing text.
pub(crate) fn compile_observed(
    source: &str,
    base: usize,
    functions: &FunctionRegistry,
    observer: &dyn CompileObserver,
) -> Result<SpannedExpr, ParseError> {
    let (normalized, tokens) = lex(source, functions).map_err(|e| e.shifted(base))?;
    observer.on_tokens(&normalized, &tokens);
    parse_tokens(&tokens, functions).map_err(|e| e.shifted(base))
}
