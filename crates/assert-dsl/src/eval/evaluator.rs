//! Tree-walking evaluator for assertion expressions.
//!
//! The evaluator performs depth-first traversal of the AST, evaluating
//! each node and returning a `Value`. It supports:
//!
//! - Arithmetic, comparison, and equality operators
//! - Short-circuit evaluation for `&&` and `||`
//! - Function calls and statements via the function registry
//!
//! Evaluation never fails. Anything that cannot be computed is `Missing`.

use std::cmp::Ordering;
use std::sync::Arc;

use assert_dsl_parser::{BinaryOp, Expr, SpannedExpr};
use tracing::warn;

use super::{CallContext, Context, FunctionRegistry, Value};

/// The assertion expression evaluator.
///
/// Evaluates an AST against the model and state contexts and a function
/// registry.
pub struct Evaluator<'a> {
    model: &'a dyn Context,
    state: &'a dyn Context,
    functions: &'a FunctionRegistry,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator.
    pub fn new(
        model: &'a dyn Context,
        state: &'a dyn Context,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Self {
            model,
            state,
            functions,
        }
    }

    /// Evaluate an expression.
    pub fn eval(&self, expr: &SpannedExpr) -> Value {
        self.eval_expr(expr)
    }

    fn eval_expr(&self, expr: &SpannedExpr) -> Value {
        match &expr.node {
            // Data access
            Expr::ModelRef(path) => self.model.lookup(path),
            Expr::StateRef(path) => self.state.lookup(path),

            // Literals
            Expr::String(s) => Value::String(Arc::from(s.as_str())),
            Expr::Number(n) => Value::Number(*n),

            Expr::Call { name, args } => self.eval_call(name, args),
            Expr::Statement(name) => self.eval_call(name, &[]),

            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Group(inner) => self.eval_expr(inner),
        }
    }

    /// Invoke a registered function. Arguments are evaluated left to right
    /// before the call.
    pub fn eval_call(&self, name: &str, args: &[SpannedExpr]) -> Value {
        let Some(function) = self.functions.get(name) else {
            warn!("call to unregistered function '{}' evaluates to missing", name);
            return Value::Missing;
        };

        let args: Vec<Value> = args.iter().map(|arg| self.eval_expr(arg)).collect();
        function.call(&CallContext::new(self.model, self.state), &args)
    }

    fn eval_binary(&self, op: BinaryOp, left: &SpannedExpr, right: &SpannedExpr) -> Value {
        // Short-circuit operators
        match op {
            BinaryOp::And => {
                let result =
                    self.eval_expr(left).is_truthy() && self.eval_expr(right).is_truthy();
                return Value::Bool(result);
            }
            BinaryOp::Or => {
                let result =
                    self.eval_expr(left).is_truthy() || self.eval_expr(right).is_truthy();
                return Value::Bool(result);
            }
            _ => {}
        }

        let left = self.eval_expr(left);
        let right = self.eval_expr(right);

        match op {
            BinaryOp::Add => add(&left, &right),
            BinaryOp::Sub => arithmetic(&left, &right, |a, b| a - b),
            BinaryOp::Mul => arithmetic(&left, &right, |a, b| a * b),
            BinaryOp::Div => arithmetic(&left, &right, |a, b| a / b),
            BinaryOp::Mod => arithmetic(&left, &right, |a, b| a % b),

            BinaryOp::Eq => Value::Bool(left.equals(&right)),
            BinaryOp::Ne => Value::Bool(!left.equals(&right)),

            BinaryOp::Lt => ordered(&left, &right, |o| o == Ordering::Less),
            BinaryOp::Le => ordered(&left, &right, |o| o != Ordering::Greater),
            BinaryOp::Gt => ordered(&left, &right, |o| o == Ordering::Greater),
            BinaryOp::Ge => ordered(&left, &right, |o| o != Ordering::Less),

            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }
}

/// `+` concatenates when either side is a string, otherwise adds numbers.
fn add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Missing, _) | (_, Value::Missing) => Value::Missing,
        (Value::String(_), _) | (_, Value::String(_)) => {
            Value::String(Arc::from(format!("{}{}", left, right)))
        }
        _ => arithmetic(left, right, |a, b| a + b),
    }
}

fn arithmetic(left: &Value, right: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(f(*a, *b)),
        _ => Value::Missing,
    }
}

fn ordered(left: &Value, right: &Value, f: impl Fn(Ordering) -> bool) -> Value {
    Value::Bool(left.compare(right).is_some_and(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{EmptyContext, Function};
    use assert_dsl_parser::compile;
    use serde_json::json;

    fn registry() -> FunctionRegistry {
        let mut functions = FunctionRegistry::new();
        functions
            .register(Function::new("add", |_, args| {
                Value::Number(args.iter().filter_map(Value::as_f64).sum())
            }))
            .unwrap();
        functions
            .register(Function::new("mul", |_, args| {
                Value::Number(args.iter().filter_map(Value::as_f64).product())
            }))
            .unwrap();
        functions
            .register(Function::statement("ready", |ctx| {
                ctx.state.lookup(&assert_dsl_parser::Path::parse("ready"))
            }))
            .unwrap();
        functions
    }

    fn eval_with(source: &str, model: &dyn Context, state: &dyn Context) -> Value {
        let functions = registry();
        let ast = compile(source, &functions).unwrap();
        Evaluator::new(model, state, &functions).eval(&ast)
    }

    fn eval(source: &str) -> Value {
        eval_with(source, &EmptyContext, &EmptyContext)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("2 + 3 * 4"), Value::from(14));
        assert_eq!(eval("(2 + 3) * 4"), Value::from(20));
        assert_eq!(eval("7 % 4 - 1"), Value::from(2));
        assert_eq!(eval("1 / 4"), Value::from(0.25));
        assert_eq!(eval("8 - 4 - 2"), Value::from(2));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(eval("1 / 0"), Value::Number(f64::INFINITY));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("'a' + 'b'"), Value::from("ab"));
        assert_eq!(eval("'n' + 1"), Value::from("n1"));
        assert_eq!(eval("'a' + 'b' == 'ab'"), Value::Bool(true));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1 < 2"), Value::Bool(true));
        assert_eq!(eval("2 <= 2"), Value::Bool(true));
        assert_eq!(eval("'b' > 'a'"), Value::Bool(true));
        assert_eq!(eval("3 >= 4"), Value::Bool(false));
        assert_eq!(eval("'1' < 2"), Value::Bool(false));
    }

    #[test]
    fn test_missing_values() {
        let model = json!({"a": {"b": 5}});
        assert_eq!(eval_with("$a.b == 5", &model, &EmptyContext), Value::Bool(true));
        assert_eq!(eval_with("$a.c == 5", &model, &EmptyContext), Value::Bool(false));
        assert_eq!(eval_with("$a.c != 5", &model, &EmptyContext), Value::Bool(true));
        assert_eq!(eval_with("$a.c < 5", &model, &EmptyContext), Value::Bool(false));
        assert!(eval_with("$a.c + 1", &model, &EmptyContext).is_missing());
    }

    #[test]
    fn test_logical_short_circuit() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut functions = FunctionRegistry::new();
        functions
            .register(Function::statement("probe", move |_| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Value::Bool(true)
            }))
            .unwrap();

        let evaluator = Evaluator::new(&EmptyContext, &EmptyContext, &functions);
        let ast = compile("1 == 2 && probe", &functions).unwrap();
        assert_eq!(evaluator.eval(&ast), Value::Bool(false));
        let ast = compile("1 == 1 || probe", &functions).unwrap();
        assert_eq!(evaluator.eval(&ast), Value::Bool(true));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let ast = compile("1 == 1 && probe", &functions).unwrap();
        assert_eq!(evaluator.eval(&ast), Value::Bool(true));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_calls_and_statements() {
        assert_eq!(eval("add(mul(2, 3), 4) == 10"), Value::Bool(true));
        assert_eq!(eval("add()"), Value::from(0));

        let state = json!({"ready": true});
        assert_eq!(eval_with("ready", &EmptyContext, &state), Value::Bool(true));
        assert_eq!(eval_with("ready && 1 == 1", &EmptyContext, &state), Value::Bool(true));
        assert!(eval("ready").is_missing());
    }

    #[test]
    fn test_unregistered_function_is_missing() {
        let ast = compile("gone(1)", &["gone"]).unwrap();
        let functions = FunctionRegistry::new();
        let result = Evaluator::new(&EmptyContext, &EmptyContext, &functions).eval(&ast);
        assert!(result.is_missing());
    }

    #[test]
    fn test_state_whole_object() {
        let state = json!({"n": 1});
        assert_eq!(
            eval_with("# == #", &EmptyContext, &state),
            Value::Bool(true)
        );
    }
}
