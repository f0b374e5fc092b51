//! Fixed symbols of the assertion language.

/// Prefix for model data access (`$a.b.c`).
pub const MODEL_PREFIX: char = '$';

/// Prefix for state data access (`#a.b.c`).
pub const STATE_PREFIX: char = '#';

/// Delimiter of string literals. There is no escape sequence for it.
pub const STRING_DELIMITER: char = '\'';

/// A string literal must never contain this character.
pub const FORBIDDEN_IN_STRING: char = '`';

/// Separates the activation from the condition.
pub const ACTIVATION_SEPARATOR: char = ':';

/// Separates function call arguments.
pub const ARGUMENT_SEPARATOR: char = ',';

/// Separates the segments of a data access path.
pub const PATH_SEPARATOR: char = '.';

pub const OPEN_BRACKET: char = '(';
pub const CLOSE_BRACKET: char = ')';

/// Activation keyword: the condition must always hold.
pub const ALWAYS: &str = "ALWAYS";

/// Activation keyword: the condition must hold when the bracketed guard holds.
pub const WHEN: &str = "WHEN";

/// Every operator and bracket spelling the tokenizer accepts.
pub const OPERATORS: [&str; 15] = [
    "<", "<=", "==", "!=", ">=", ">", "+", "-", "*", "/", "%", "(", ")", "&&", "||",
];

/// Upper bound on tokenizer iterations for a single expression.
pub const MAX_ITERATIONS: usize = 1000;

/// Upper bound on nested brackets and calls in one expression.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Word characters make up identifiers and path segments.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte variant of [`is_word_char`], for scanning ASCII structure in UTF-8 text.
pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns true if `name` is a syntactically valid function name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(is_word_char),
        _ => false,
    }
}

/// Returns true if `name` is an activation keyword.
pub fn is_keyword(name: &str) -> bool {
    name == ALWAYS || name == WHEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("add"));
        assert!(is_identifier("_private2"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn keywords() {
        assert!(is_keyword("ALWAYS"));
        assert!(is_keyword("WHEN"));
        assert!(!is_keyword("when"));
    }
}
