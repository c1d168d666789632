//! Amount formulas for invoice template lines.
//!
//! ```text
//! expr := "if" "(" criterion ")" expr [ "else" expr ]
//!       | "(" expr ")"
//!       | amount
//! ```
//!
//! Tokens are whitespace separated; `(`, `)`, `[`, `]`, `{` and `}` are always
//! tokens of their own. Criteria combine party tags with `and` / `or`.

mod criterion;
mod lexer;
mod parser;

use thiserror::Error;

pub use criterion::Criterion;
pub use lexer::{tokenize, Token};
pub use parser::AmountFormula;

/// Parse failure with the offending token and its character position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected end of formula, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected token `{token}` at position {position}, expected {expected}")]
    UnexpectedToken {
        token: String,
        position: usize,
        expected: &'static str,
    },
    #[error("bracket `{bracket}` at position {position} is never closed")]
    UnclosedBracket { bracket: char, position: usize },
    #[error("unexpected token `{token}` at position {position} after complete formula")]
    TrailingTokens { token: String, position: usize },
    #[error("`{token}` at position {position} is not an amount")]
    InvalidAmount { token: String, position: usize },
    #[error("criterion at position {position} is empty")]
    EmptyCriterion { position: usize },
}

pub(crate) fn closing_bracket(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        _ => None,
    }
}

pub(crate) fn is_closing_bracket(token: &str) -> bool {
    matches!(token, ")" | "]" | "}")
}
