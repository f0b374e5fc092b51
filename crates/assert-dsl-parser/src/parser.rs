//! Expression compiler - hand-written precedence climbing over the token stream.
//!
//! Precedence, tightest first: `* / %`, `+ -`, `< <= > >=`, `== !=`, `&&`,
//! `||`. Every level is left associative and brackets group.

use crate::ast::{BinaryOp, Expr, Span, Spanned, SpannedExpr};
use crate::error::ParseError;
use crate::grammar::MAX_NESTING_DEPTH;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::names::FunctionNames;
use crate::scan::split_arguments;

/// Recursive descent parser for one expression.
pub struct Parser<'a, N: ?Sized> {
    tokens: &'a [SpannedToken],
    pos: usize,
    /// Needed to compile the arguments of call tokens.
    names: &'a N,
    /// Brackets and calls enclosing the current position.
    depth: usize,
}

impl<'a, N> Parser<'a, N>
where
    N: FunctionNames + ?Sized,
{
    /// Create a new parser for the given token stream.
    pub fn new(tokens: &'a [SpannedToken], names: &'a N) -> Self {
        Self {
            tokens,
            pos: 0,
            names,
            depth: 0,
        }
    }

    /// Start at `depth` levels of enclosing brackets.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    // === Utility Methods ===

    /// Peek at the current token without consuming it.
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    /// Get the span of the current token.
    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| self.eof_span())
    }

    /// Get the span representing end-of-input.
    fn eof_span(&self) -> Span {
        let end = self.tokens.last().map(|(_, s)| s.end).unwrap_or(0);
        end..end
    }

    /// Advance to the next token, returning the current one.
    fn advance(&mut self) -> Option<&'a SpannedToken> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it is one of `ops`.
    fn match_operator(&mut self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token::Operator(op)) if ops.contains(op) => {
                let op = *op;
                self.advance();
                Some(op)
            }
            _ => None,
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // === Expression Parsing ===

    /// Parse an expression (entry point).
    pub fn parse_expr(&mut self) -> Result<SpannedExpr, ParseError> {
        self.parse_or()
    }

    /// Parse logical OR: expr || expr
    fn parse_or(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_and()?;
        while let Some(op) = self.match_operator(&[BinaryOp::Or]) {
            let right = self.parse_and()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Parse logical AND: expr && expr
    fn parse_and(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_equality()?;
        while let Some(op) = self.match_operator(&[BinaryOp::And]) {
            let right = self.parse_equality()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Parse equality: == !=
    fn parse_equality(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_relation()?;
        while let Some(op) = self.match_operator(&[BinaryOp::Eq, BinaryOp::Ne]) {
            let right = self.parse_relation()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Parse relational operators: < <= > >=
    fn parse_relation(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_addition()?;
        while let Some(op) =
            self.match_operator(&[BinaryOp::Lt, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Ge])
        {
            let right = self.parse_addition()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Parse additive operators: + -
    fn parse_addition(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_mult()?;
        while let Some(op) = self.match_operator(&[BinaryOp::Add, BinaryOp::Sub]) {
            let right = self.parse_mult()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Parse multiplicative operators: * / %
    fn parse_mult(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_atom()?;
        while let Some(op) = self.match_operator(&[BinaryOp::Mul, BinaryOp::Div, BinaryOp::Mod]) {
            let right = self.parse_atom()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Parse an operand: reference, literal, call, statement, or bracketed group.
    fn parse_atom(&mut self) -> Result<SpannedExpr, ParseError> {
        let span = self.peek_span();

        let Some((token, _)) = self.advance() else {
            return Err(ParseError::syntax("unexpected end of expression", span));
        };

        match token {
            Token::ModelRef(path) => Ok(Spanned::new(Expr::ModelRef(path.clone()), span)),
            Token::StateRef(path) => Ok(Spanned::new(Expr::StateRef(path.clone()), span)),
            Token::String(s) => Ok(Spanned::new(Expr::String(s.clone()), span)),
            Token::Number(n) => Ok(Spanned::new(Expr::Number(*n), span)),
            Token::Statement(name) => Ok(Spanned::new(Expr::Statement(name.clone()), span)),
            Token::Call {
                name,
                args,
                args_offset,
            } => {
                check_depth(self.depth + 1, &span)?;
                let args = self.parse_arguments(name, args, *args_offset)?;
                Ok(Spanned::new(
                    Expr::Call {
                        name: name.clone(),
                        args,
                    },
                    span,
                ))
            }

            // A sign directly before a number is part of the literal.
            Token::Operator(op @ (BinaryOp::Add | BinaryOp::Sub)) => match self.peek() {
                Some(Token::Number(n)) => {
                    let n = if *op == BinaryOp::Sub { -*n } else { *n };
                    let end = self.peek_span().end;
                    self.advance();
                    Ok(Spanned::new(Expr::Number(n), span.start..end))
                }
                _ => Err(ParseError::syntax(
                    format!("expected operand, found operator '{}'", op),
                    span,
                )),
            },
            Token::Operator(op) => Err(ParseError::syntax(
                format!("expected operand, found operator '{}'", op),
                span,
            )),

            Token::OpenBracket => {
                check_depth(self.depth + 1, &span)?;
                self.depth += 1;
                let inner = self.parse_expr();
                self.depth -= 1;
                let inner = inner?;
                match self.advance() {
                    Some((Token::CloseBracket, close)) => Ok(Spanned::new(
                        Expr::Group(Box::new(inner)),
                        span.start..close.end,
                    )),
                    _ => Err(ParseError::syntax("unmatched '('", span)),
                }
            }
            Token::CloseBracket => Err(ParseError::syntax("unmatched ')'", span)),
        }
    }

    /// Compile each top-level, comma-separated argument on its own.
    fn parse_arguments(
        &self,
        name: &str,
        args: &str,
        args_offset: usize,
    ) -> Result<Vec<SpannedExpr>, ParseError> {
        split_arguments(args)
            .into_iter()
            .map(|(rel, text)| {
                let at = args_offset + rel;
                if text.is_empty() {
                    return Err(ParseError::syntax(
                        format!("empty argument in call to '{}'", name),
                        at..at,
                    ));
                }
                compile_nested(text, at, self.names, self.depth + 1)
            })
            .collect()
    }
}

fn check_depth(depth: usize, span: &Span) -> Result<(), ParseError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ParseError::syntax(
            "maximum nesting depth reached",
            span.clone(),
        ));
    }
    Ok(())
}

fn binary(op: BinaryOp, left: SpannedExpr, right: SpannedExpr) -> SpannedExpr {
    let span = left.span.start..right.span.end;
    Spanned::new(
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

/// Parse a complete token stream into one expression.
pub fn parse_tokens<N>(tokens: &[SpannedToken], names: &N) -> Result<SpannedExpr, ParseError>
where
    N: FunctionNames + ?Sized,
{
    parse_nested(tokens, names, 0)
}

fn parse_nested<N>(
    tokens: &[SpannedToken],
    names: &N,
    depth: usize,
) -> Result<SpannedExpr, ParseError>
where
    N: FunctionNames + ?Sized,
{
    if tokens.is_empty() {
        return Err(ParseError::syntax("empty expression", 0..0));
    }

    let mut parser = Parser::new(tokens, names).with_depth(depth);
    let ast = parser.parse_expr()?;

    match parser.peek() {
        None => Ok(ast),
        Some(Token::CloseBracket) => Err(ParseError::syntax("unmatched ')'", parser.peek_span())),
        Some(token) => Err(ParseError::syntax(
            format!("unexpected token '{}'", token),
            parser.peek_span(),
        )),
    }
}

/// Tokenize and parse a normalized fragment whose first byte sits at `base`
/// in the enclosing expression. Spans and errors are reported against the
/// enclosing expression.
pub(crate) fn compile_fragment<N>(
    source: &str,
    base: usize,
    names: &N,
) -> Result<SpannedExpr, ParseError>
where
    N: FunctionNames + ?Sized,
{
    compile_nested(source, base, names, 0)
}

fn compile_nested<N>(
    source: &str,
    base: usize,
    names: &N,
    depth: usize,
) -> Result<SpannedExpr, ParseError>
where
    N: FunctionNames + ?Sized,
{
    let tokens: Vec<SpannedToken> = tokenize(source, names)
        .map_err(|e| e.shifted(base))?
        .into_iter()
        .map(|(token, span)| (shift_token(token, base), span.start + base..span.end + base))
        .collect();

    parse_nested(&tokens, names, depth)
}

fn shift_token(token: Token, base: usize) -> Token {
    match token {
        Token::Call {
            name,
            args,
            args_offset,
        } => Token::Call {
            name,
            args,
            args_offset: args_offset + base,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Path;

    const NAMES: [&str; 3] = ["add", "mul", "ready"];

    fn parse(source: &str) -> Result<SpannedExpr, ParseError> {
        compile_fragment(source, 0, &NAMES)
    }

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let ast = parse("2+3*4").unwrap();
        let Expr::Binary { op, left, right } = ast.node else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(left.node, num(2.0));
        assert!(matches!(right.node, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn brackets_group() {
        let ast = parse("(2+3)*4").unwrap();
        let Expr::Binary { op, left, .. } = ast.node else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Mul);
        assert!(matches!(left.node, Expr::Group(_)));
        assert_eq!(left.span, 0..5);
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        let ast = parse("8-4-2").unwrap();
        let Expr::Binary { left, right, .. } = ast.node else {
            panic!("expected binary");
        };
        assert!(matches!(left.node, Expr::Binary { op: BinaryOp::Sub, .. }));
        assert_eq!(right.node, num(2.0));
    }

    #[test]
    fn equality_is_looser_than_relation() {
        let ast = parse("1<2==2>1").unwrap();
        assert!(matches!(ast.node, Expr::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn or_is_loosest() {
        let ast = parse("1==1&&2==2||ready").unwrap();
        let Expr::Binary { op, left, right } = ast.node else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(left.node, Expr::Binary { op: BinaryOp::And, .. }));
        assert_eq!(right.node, Expr::Statement("ready".to_string()));
    }

    #[test]
    fn call_arguments_are_compiled() {
        let ast = parse("add(mul(2,3),$a.b)").unwrap();
        let Expr::Call { name, args } = ast.node else {
            panic!("expected call");
        };
        assert_eq!(name, "add");
        assert_eq!(args.len(), 2);
        assert!(matches!(&args[0].node, Expr::Call { name, args } if name == "mul" && args.len() == 2));
        assert_eq!(args[0].span, 4..12);
        assert_eq!(args[1].node, Expr::ModelRef(Path::parse("a.b")));
        assert_eq!(args[1].span, 13..17);
    }

    #[test]
    fn zero_argument_call() {
        let ast = parse("ready()").unwrap();
        assert_eq!(
            ast.node,
            Expr::Call {
                name: "ready".to_string(),
                args: vec![]
            }
        );
    }

    #[test]
    fn signed_number_literal() {
        let ast = parse("$a>-1").unwrap();
        let Expr::Binary { right, .. } = ast.node else {
            panic!("expected binary");
        };
        assert_eq!(right.node, num(-1.0));
        assert_eq!(right.span, 3..5);
    }

    #[test]
    fn errors() {
        assert!(matches!(parse(""), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("1+"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("*1"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("12$a"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("()"), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn unmatched_open_bracket_points_at_bracket() {
        assert_eq!(
            parse("1+(2*3").unwrap_err(),
            ParseError::syntax("unmatched '('", 2..3)
        );
    }

    #[test]
    fn unmatched_close_bracket() {
        assert_eq!(
            parse("1+2)").unwrap_err(),
            ParseError::syntax("unmatched ')'", 3..4)
        );
    }

    #[test]
    fn nesting_depth_is_capped() {
        let nest = |open: &str, close: &str, depth: usize| {
            format!("{}1{}", open.repeat(depth), close.repeat(depth))
        };

        assert!(parse(&nest("(", ")", MAX_NESTING_DEPTH)).is_ok());
        assert!(parse(&nest("add(", ")", MAX_NESTING_DEPTH)).is_ok());

        for (open, close) in [("(", ")"), ("add(", ")"), ("mul(1,(", "))")] {
            let err = parse(&nest(open, close, MAX_NESTING_DEPTH + 1)).unwrap_err();
            assert!(
                matches!(err, ParseError::Syntax { ref message, .. } if message == "maximum nesting depth reached"),
                "{}: {:?}",
                open,
                err
            );
        }
    }

    #[test]
    fn very_deep_nesting_fails_cleanly() {
        let source = format!("{}1{}", "add(".repeat(500), ")".repeat(500));
        assert!(parse(&source).is_err());
        let source = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
        assert!(parse(&source).is_err());
    }

    #[test]
    fn nested_argument_errors_use_outer_positions() {
        assert_eq!(
            parse("add(1,sub(2))").unwrap_err(),
            ParseError::unknown_function("sub", 6..9)
        );
        assert_eq!(
            parse("add(1,,2)").unwrap_err(),
            ParseError::syntax("empty argument in call to 'add'", 6..6)
        );
    }
}
