//! Compile-time observation hooks.
//!
//! An [`Env`](crate::Env) reports each stage of compiling an assertion to its
//! observer. The default observer forwards everything to `tracing`, so the
//! stages show up under `RUST_LOG=assert_dsl=trace` without any setup in the
//! library itself.

use assert_dsl_parser::SpannedToken;
use tracing::{debug, trace};

use crate::Constraint;

/// Receives compile stages. Every hook defaults to doing nothing.
pub trait CompileObserver: Send + Sync {
    /// An assertion was split into its activation and condition text.
    fn on_split(&self, _activation: &str, _condition: &str) {}

    /// An expression was tokenized. `source` is the whitespace-normalized text.
    fn on_tokens(&self, _source: &str, _tokens: &[SpannedToken]) {}

    /// A constraint finished compiling.
    fn on_compiled(&self, _constraint: &Constraint) {}
}

/// Emits compile stages as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CompileObserver for TracingObserver {
    fn on_split(&self, activation: &str, condition: &str) {
        debug!("split assertion into activation {:?} and condition {:?}", activation, condition);
    }

    fn on_tokens(&self, source: &str, tokens: &[SpannedToken]) {
        trace!("tokenized {:?} into {} tokens: {:?}", source, tokens.len(), tokens);
    }

    fn on_compiled(&self, constraint: &Constraint) {
        debug!("compiled constraint {:?}", constraint.source());
    }
}

/// Ignores every compile stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CompileObserver for NoopObserver {}
