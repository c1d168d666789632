use std::fmt;

use super::{closing_bracket, is_closing_bracket, FormulaError, Token};
use crate::domain::party::same_tag;

/// Boolean condition over a party's tags.
///
/// Tags match case-insensitively and only as whole tags: `c` matches the tag
/// `C` but not `abc`. Adjacent terms without an operator are combined with `and`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Tag(String),
    And(Box<Criterion>, Box<Criterion>),
    Or(Box<Criterion>, Box<Criterion>),
}

impl Criterion {
    pub fn parse(text: &str) -> Result<Criterion, FormulaError> {
        let tokens = super::tokenize(text);
        Criterion::parse_tokens(&tokens, 0)
    }

    /// Parses a criterion from the tokens between an `if (` and its closing bracket.
    /// `position` locates the criterion when it is empty.
    pub fn parse_tokens(tokens: &[Token], position: usize) -> Result<Criterion, FormulaError> {
        if tokens.is_empty() {
            return Err(FormulaError::EmptyCriterion { position });
        }
        let mut parser = CriterionParser { tokens, index: 0 };
        let criterion = parser.or_expression()?;
        if let Some(token) = parser.peek() {
            return Err(FormulaError::UnexpectedToken {
                token: token.text.clone(),
                position: token.position,
                expected: "`and`, `or` or end of criterion",
            });
        }
        Ok(criterion)
    }

    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        match self {
            Criterion::Tag(tag) => tags.iter().any(|candidate| same_tag(candidate.as_ref(), tag)),
            Criterion::And(left, right) => left.matches(tags) && right.matches(tags),
            Criterion::Or(left, right) => left.matches(tags) || right.matches(tags),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Tag(tag) => f.write_str(tag),
            Criterion::And(left, right) => write!(f, "( {left} and {right} )"),
            Criterion::Or(left, right) => write!(f, "( {left} or {right} )"),
        }
    }
}

struct CriterionParser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> CriterionParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.index);
        self.index += 1;
        token
    }

    fn or_expression(&mut self) -> Result<Criterion, FormulaError> {
        let mut left = self.and_expression()?;
        while self.peek().is_some_and(|token| token.is_keyword("or")) {
            self.index += 1;
            let right = self.and_expression()?;
            left = Criterion::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expression(&mut self) -> Result<Criterion, FormulaError> {
        let mut left = self.primary()?;
        loop {
            match self.peek() {
                Some(token) if token.is_keyword("and") => {
                    self.index += 1;
                }
                Some(token) if starts_primary(token) => {}
                _ => break,
            }
            let right = self.primary()?;
            left = Criterion::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Criterion, FormulaError> {
        let token = self.next().ok_or(FormulaError::UnexpectedEnd {
            expected: "tag or `(`",
        })?;
        if let Some(close) = closing_bracket(&token.text) {
            let inner = self.or_expression()?;
            return match self.next() {
                Some(closing) if closing.is(close) => Ok(inner),
                Some(other) => Err(FormulaError::UnexpectedToken {
                    token: other.text.clone(),
                    position: other.position,
                    expected: "closing bracket",
                }),
                None => Err(FormulaError::UnclosedBracket {
                    bracket: token.text.chars().next().unwrap_or('('),
                    position: token.position,
                }),
            };
        }
        if !starts_primary(token) {
            return Err(FormulaError::UnexpectedToken {
                token: token.text.clone(),
                position: token.position,
                expected: "tag or `(`",
            });
        }
        Ok(Criterion::Tag(token.text.clone()))
    }
}

fn starts_primary(token: &Token) -> bool {
    !is_closing_bracket(&token.text) && !token.is_keyword("and") && !token.is_keyword("or")
}
