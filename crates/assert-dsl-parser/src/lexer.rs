//! Expression tokenizer.
//!
//! Classifies the token starting at an offset by its leading character, in a
//! fixed priority order: data access, string literal, number, registered
//! identifier, operator. Identifiers can only be classified against the
//! registered function names, so the scan is hand-written; operator spellings
//! are matched by a small logos lexer.

use logos::Logos;

use crate::ast::{BinaryOp, Path, Span};
use crate::error::ParseError;
use crate::grammar::{
    is_word_byte, CLOSE_BRACKET, FORBIDDEN_IN_STRING, MAX_ITERATIONS, MODEL_PREFIX, OPEN_BRACKET,
    STATE_PREFIX, STRING_DELIMITER,
};
use crate::names::FunctionNames;
use crate::scan::find_closing_bracket;

/// A token with its source span.
pub type SpannedToken = (Token, Span);

/// Assertion language tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ModelRef(Path),
    StateRef(Path),
    String(String),
    Number(f64),
    /// A registered function followed by its raw, bracket-balanced argument text.
    Call {
        name: String,
        args: String,
        /// Offset of the first argument byte in the tokenized input.
        args_offset: usize,
    },
    /// A registered function referenced without brackets.
    Statement(String),
    Operator(BinaryOp),
    OpenBracket,
    CloseBracket,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::ModelRef(path) => write!(f, "{}{}", MODEL_PREFIX, path),
            Token::StateRef(path) => write!(f, "{}{}", STATE_PREFIX, path),
            Token::String(s) => write!(f, "'{}'", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::Call { name, args, .. } => write!(f, "{}({})", name, args),
            Token::Statement(name) => write!(f, "{}", name),
            Token::Operator(op) => write!(f, "{}", op),
            Token::OpenBracket => write!(f, "{}", OPEN_BRACKET),
            Token::CloseBracket => write!(f, "{}", CLOSE_BRACKET),
        }
    }
}

/// Operator and bracket spellings. Multi-char spellings win by longest match,
/// and a lone `&`, `|`, `=` or `!` matches nothing.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    #[token("<=")]
    Le,
    #[token("<")]
    Lt,
    #[token(">=")]
    Ge,
    #[token(">")]
    Gt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
}

impl Symbol {
    fn into_token(self) -> Token {
        match self {
            Symbol::Le => Token::Operator(BinaryOp::Le),
            Symbol::Lt => Token::Operator(BinaryOp::Lt),
            Symbol::Ge => Token::Operator(BinaryOp::Ge),
            Symbol::Gt => Token::Operator(BinaryOp::Gt),
            Symbol::EqEq => Token::Operator(BinaryOp::Eq),
            Symbol::Ne => Token::Operator(BinaryOp::Ne),
            Symbol::And => Token::Operator(BinaryOp::And),
            Symbol::Or => Token::Operator(BinaryOp::Or),
            Symbol::Plus => Token::Operator(BinaryOp::Add),
            Symbol::Minus => Token::Operator(BinaryOp::Sub),
            Symbol::Star => Token::Operator(BinaryOp::Mul),
            Symbol::Slash => Token::Operator(BinaryOp::Div),
            Symbol::Percent => Token::Operator(BinaryOp::Mod),
            Symbol::LParen => Token::OpenBracket,
            Symbol::RParen => Token::CloseBracket,
        }
    }
}

/// Classify the token starting at `offset` and return it with its end offset.
///
/// `input` must already be whitespace-normalized.
pub fn next_token<N>(input: &str, offset: usize, names: &N) -> Result<(Token, usize), ParseError>
where
    N: FunctionNames + ?Sized,
{
    let rest = &input[offset..];
    let Some(lead) = rest.chars().next() else {
        return Err(ParseError::syntax("unexpected end of input", offset..offset));
    };

    match lead {
        MODEL_PREFIX | STATE_PREFIX => {
            let len = 1 + rest[1..]
                .bytes()
                .take_while(|&b| is_word_byte(b) || b == b'.')
                .count();
            let path = Path::parse(&rest[1..len]);
            let token = if lead == MODEL_PREFIX {
                Token::ModelRef(path)
            } else {
                Token::StateRef(path)
            };
            Ok((token, offset + len))
        }
        STRING_DELIMITER => {
            let close = rest[1..].find(STRING_DELIMITER).ok_or_else(|| {
                ParseError::syntax("unterminated string literal", offset..offset + 1)
            })?;
            let text = &rest[1..1 + close];
            if let Some(pos) = text.find(FORBIDDEN_IN_STRING) {
                let at = offset + 1 + pos;
                return Err(ParseError::syntax(
                    format!("string literal must not contain '{}'", FORBIDDEN_IN_STRING),
                    at..at + 1,
                ));
            }
            Ok((Token::String(text.to_string()), offset + close + 2))
        }
        c if c.is_ascii_digit() || (c == '.' && rest[1..].starts_with(|d: char| d.is_ascii_digit())) => {
            lex_number(rest, offset)
        }
        c if c.is_ascii_alphabetic() || c == '_' => lex_identifier(input, offset, names),
        c => {
            let mut lexer = Symbol::lexer(rest);
            match lexer.next() {
                Some(Ok(symbol)) => Ok((symbol.into_token(), offset + lexer.span().end)),
                _ => Err(ParseError::syntax(
                    format!("unexpected character '{}'", c),
                    offset..offset + c.len_utf8(),
                )),
            }
        }
    }
}

fn lex_number(rest: &str, offset: usize) -> Result<(Token, usize), ParseError> {
    let len = rest
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    let text = &rest[..len];
    let span = offset..offset + len;

    // `(\d*\.)?\d+`: at most one dot, never trailing.
    if text.ends_with('.') || text.matches('.').count() > 1 {
        return Err(ParseError::syntax(
            format!("invalid number literal '{}'", text),
            span,
        ));
    }

    text.parse::<f64>()
        .map(|n| (Token::Number(n), span.end))
        .map_err(|_| ParseError::syntax(format!("invalid number literal '{}'", text), span))
}

fn lex_identifier<N>(input: &str, offset: usize, names: &N) -> Result<(Token, usize), ParseError>
where
    N: FunctionNames + ?Sized,
{
    let len = input[offset..].bytes().take_while(|&b| is_word_byte(b)).count();
    let end = offset + len;
    let name = &input[offset..end];

    if !names.is_registered(name) {
        return Err(ParseError::unknown_function(name, offset..end));
    }

    if !input[end..].starts_with(OPEN_BRACKET) {
        return Ok((Token::Statement(name.to_string()), end));
    }

    let close = find_closing_bracket(input, end).ok_or_else(|| {
        ParseError::syntax(format!("unmatched '(' in call to '{}'", name), end..end + 1)
    })?;

    Ok((
        Token::Call {
            name: name.to_string(),
            args: input[end + 1..close].to_string(),
            args_offset: end + 1,
        },
        close + 1,
    ))
}

/// Tokenize a whitespace-normalized expression.
pub fn tokenize<N>(input: &str, names: &N) -> Result<Vec<SpannedToken>, ParseError>
where
    N: FunctionNames + ?Sized,
{
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut iterations = 0;

    while offset < input.len() {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            return Err(ParseError::syntax(
                "maximum parsing iterations reached",
                offset..input.len(),
            ));
        }

        let (token, end) = next_token(input, offset, names)?;
        tokens.push((token, offset..end));
        offset = end;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 3] = ["add", "mul", "ready"];

    fn lex_tokens(input: &str) -> Vec<Token> {
        tokenize(input, &NAMES)
            .unwrap()
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    fn lex_error(input: &str) -> ParseError {
        tokenize(input, &NAMES).unwrap_err()
    }

    #[test]
    fn lex_data_access() {
        assert_eq!(
            lex_tokens("$a.b.c"),
            vec![Token::ModelRef(Path::parse("a.b.c"))]
        );
        assert_eq!(lex_tokens("#count"), vec![Token::StateRef(Path::parse("count"))]);
        assert_eq!(lex_tokens("$"), vec![Token::ModelRef(Path::root())]);
        assert_eq!(
            lex_tokens("#==$"),
            vec![
                Token::StateRef(Path::root()),
                Token::Operator(BinaryOp::Eq),
                Token::ModelRef(Path::root())
            ]
        );
    }

    #[test]
    fn lex_strings() {
        assert_eq!(lex_tokens("'hello'"), vec![Token::String("hello".to_string())]);
        assert_eq!(lex_tokens("'a:b'"), vec![Token::String("a:b".to_string())]);
        assert_eq!(lex_tokens("'x y'"), vec![Token::String("x y".to_string())]);
        assert_eq!(lex_tokens("''"), vec![Token::String(String::new())]);
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(lex_tokens("42"), vec![Token::Number(42.0)]);
        assert_eq!(lex_tokens("3.14"), vec![Token::Number(3.14)]);
        assert_eq!(lex_tokens(".5"), vec![Token::Number(0.5)]);
    }

    #[test]
    fn lex_calls_and_statements() {
        assert_eq!(
            lex_tokens("add(mul(2,3),4)"),
            vec![Token::Call {
                name: "add".to_string(),
                args: "mul(2,3),4".to_string(),
                args_offset: 4,
            }]
        );
        assert_eq!(lex_tokens("ready"), vec![Token::Statement("ready".to_string())]);
        assert_eq!(
            lex_tokens("ready&&add()"),
            vec![
                Token::Statement("ready".to_string()),
                Token::Operator(BinaryOp::And),
                Token::Call {
                    name: "add".to_string(),
                    args: String::new(),
                    args_offset: 11,
                }
            ]
        );
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            lex_tokens("1<=2"),
            vec![
                Token::Number(1.0),
                Token::Operator(BinaryOp::Le),
                Token::Number(2.0)
            ]
        );
        assert_eq!(
            lex_tokens("1<2"),
            vec![
                Token::Number(1.0),
                Token::Operator(BinaryOp::Lt),
                Token::Number(2.0)
            ]
        );
        assert_eq!(
            lex_tokens("(1+2)*3%4/5-6"),
            vec![
                Token::OpenBracket,
                Token::Number(1.0),
                Token::Operator(BinaryOp::Add),
                Token::Number(2.0),
                Token::CloseBracket,
                Token::Operator(BinaryOp::Mul),
                Token::Number(3.0),
                Token::Operator(BinaryOp::Mod),
                Token::Number(4.0),
                Token::Operator(BinaryOp::Div),
                Token::Number(5.0),
                Token::Operator(BinaryOp::Sub),
                Token::Number(6.0)
            ]
        );
        assert_eq!(
            lex_tokens("1!=2||1>=2"),
            vec![
                Token::Number(1.0),
                Token::Operator(BinaryOp::Ne),
                Token::Number(2.0),
                Token::Operator(BinaryOp::Or),
                Token::Number(1.0),
                Token::Operator(BinaryOp::Ge),
                Token::Number(2.0)
            ]
        );
    }

    #[test]
    fn every_operator_is_one_token() {
        for op in crate::grammar::OPERATORS {
            let tokens = tokenize(op, &NAMES).unwrap();
            assert_eq!(tokens.len(), 1, "{}", op);
            assert_eq!(tokens[0].0.to_string(), op);
        }
    }

    #[test]
    fn lex_spans() {
        let tokens = tokenize("$a<='x'", &NAMES).unwrap();
        let spans: Vec<_> = tokens.into_iter().map(|(_, span)| span).collect();
        assert_eq!(spans, vec![0..2, 2..4, 4..7]);
    }

    #[test]
    fn single_ampersand_is_rejected() {
        let err = lex_error("1&2");
        assert_eq!(err, ParseError::syntax("unexpected character '&'", 1..2));
    }

    #[test]
    fn single_equals_is_rejected() {
        assert!(matches!(lex_error("1=2"), ParseError::Syntax { span, .. } if span == (1..2)));
    }

    #[test]
    fn unterminated_string_points_at_quote() {
        assert_eq!(
            lex_error("$a=='abc"),
            ParseError::syntax("unterminated string literal", 4..5)
        );
    }

    #[test]
    fn backtick_in_string_is_rejected() {
        assert!(matches!(lex_error("'a`b'"), ParseError::Syntax { span, .. } if span == (2..3)));
    }

    #[test]
    fn unmatched_call_bracket() {
        assert!(matches!(lex_error("add(1,2"), ParseError::Syntax { span, .. } if span == (3..4)));
    }

    #[test]
    fn unknown_identifier() {
        assert_eq!(
            lex_error("1+sub(1)"),
            ParseError::unknown_function("sub", 2..5)
        );
    }

    #[test]
    fn invalid_numbers() {
        assert!(matches!(lex_error("1.2.3"), ParseError::Syntax { .. }));
        assert!(matches!(lex_error("1."), ParseError::Syntax { .. }));
    }

    #[test]
    fn iteration_cap() {
        let input = vec!["1"; MAX_ITERATIONS + 1].join("+");
        let err = lex_error(&input);
        assert!(matches!(
            err,
            ParseError::Syntax { ref message, .. } if message == "maximum parsing iterations reached"
        ));
    }
}
