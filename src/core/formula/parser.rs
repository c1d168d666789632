use std::fmt;

use crate::domain::Amount;

use super::{closing_bracket, tokenize, Criterion, FormulaError, Token};

/// Parsed amount formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountFormula {
    Constant(Amount),
    IfThenElse {
        criterion: Criterion,
        then: Box<AmountFormula>,
        otherwise: Option<Box<AmountFormula>>,
    },
}

impl AmountFormula {
    /// Parses formula text; amounts use `decimal_separator`. Parsing is all or nothing.
    pub fn parse(text: &str, decimal_separator: char) -> Result<AmountFormula, FormulaError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = FormulaParser {
            tokens: &tokens,
            index: 0,
            decimal_separator,
        };
        let formula = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(FormulaError::TrailingTokens {
                token: token.text.clone(),
                position: token.position,
            });
        }
        Ok(formula)
    }

    /// Amount for a party with the given tags, or `None` when the line does not apply.
    pub fn evaluate<S: AsRef<str>>(&self, tags: &[S]) -> Option<Amount> {
        match self {
            AmountFormula::Constant(amount) => Some(*amount),
            AmountFormula::IfThenElse {
                criterion,
                then,
                otherwise,
            } => {
                if criterion.matches(tags) {
                    then.evaluate(tags)
                } else {
                    otherwise.as_ref().and_then(|formula| formula.evaluate(tags))
                }
            }
        }
    }
}

impl fmt::Display for AmountFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountFormula::Constant(amount) => write!(f, "{amount}"),
            AmountFormula::IfThenElse {
                criterion,
                then,
                otherwise,
            } => {
                write!(f, "if ( {criterion} ) {then}")?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {otherwise}")?;
                }
                Ok(())
            }
        }
    }
}

struct FormulaParser<'a> {
    tokens: &'a [Token],
    index: usize,
    decimal_separator: char,
}

impl<'a> FormulaParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self, expected: &'static str) -> Result<&'a Token, FormulaError> {
        let token = self
            .tokens
            .get(self.index)
            .ok_or(FormulaError::UnexpectedEnd { expected })?;
        self.index += 1;
        Ok(token)
    }

    fn expression(&mut self) -> Result<AmountFormula, FormulaError> {
        let token = self.next("amount, `if` or `(`")?;
        if token.is_keyword("if") {
            return self.conditional();
        }
        if token.is("(") {
            let inner = self.expression()?;
            return match self.tokens.get(self.index) {
                Some(closing) if closing.is(")") => {
                    self.index += 1;
                    Ok(inner)
                }
                Some(other) => Err(FormulaError::UnexpectedToken {
                    token: other.text.clone(),
                    position: other.position,
                    expected: "`)`",
                }),
                None => Err(FormulaError::UnclosedBracket {
                    bracket: '(',
                    position: token.position,
                }),
            };
        }
        Amount::parse(&token.text, self.decimal_separator)
            .map(AmountFormula::Constant)
            .ok_or_else(|| FormulaError::InvalidAmount {
                token: token.text.clone(),
                position: token.position,
            })
    }

    fn conditional(&mut self) -> Result<AmountFormula, FormulaError> {
        let open = self.next("`(` after `if`")?;
        if !open.is("(") {
            return Err(FormulaError::UnexpectedToken {
                token: open.text.clone(),
                position: open.position,
                expected: "`(` after `if`",
            });
        }
        let criterion_tokens = self.criterion_tokens(open)?;
        let criterion = Criterion::parse_tokens(criterion_tokens, open.position)?;
        let then = self.expression()?;
        let otherwise = match self.peek() {
            Some(token) if token.is_keyword("else") => {
                self.index += 1;
                Some(Box::new(self.expression()?))
            }
            _ => None,
        };
        Ok(AmountFormula::IfThenElse {
            criterion,
            then: Box::new(then),
            otherwise,
        })
    }

    /// Collects tokens up to the bracket closing `open`, honouring nested brackets.
    fn criterion_tokens(&mut self, open: &Token) -> Result<&'a [Token], FormulaError> {
        let start = self.index;
        let mut expected_closers: Vec<&'static str> = vec![")"];
        while let Some(token) = self.tokens.get(self.index) {
            self.index += 1;
            if let Some(close) = closing_bracket(&token.text) {
                expected_closers.push(close);
            } else if expected_closers.last().is_some_and(|close| token.is(close)) {
                expected_closers.pop();
                if expected_closers.is_empty() {
                    return Ok(&self.tokens[start..self.index - 1]);
                }
            }
        }
        Err(FormulaError::UnclosedBracket {
            bracket: '(',
            position: open.position,
        })
    }
}
