//! Condition expressions for `if` / `elseif`
//!
//! Precedence from loosest to tightest: `or` (`||`), `and` (`&&`),
//! `not` (`!`), comparison, then operands and parentheses.

use super::super::error::TemplateError;
use super::super::unit::{CompareOp, Expr};
use super::args::parse_operand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok<'a> {
    Open,
    Close,
    Not,
    And,
    Or,
    Cmp(CompareOp),
    Atom(&'a str),
}

fn lex(text: &str, line: usize) -> Result<Vec<Tok<'_>>, TemplateError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];
        let (tok, len) = match bytes[i] {
            b if b.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            b'(' => (Tok::Open, 1),
            b')' => (Tok::Close, 1),
            _ if rest.starts_with("&&") => (Tok::And, 2),
            _ if rest.starts_with("||") => (Tok::Or, 2),
            _ if rest.starts_with("==") => (Tok::Cmp(CompareOp::Eq), 2),
            _ if rest.starts_with("!=") => (Tok::Cmp(CompareOp::Ne), 2),
            _ if rest.starts_with("<=") => (Tok::Cmp(CompareOp::Le), 2),
            _ if rest.starts_with(">=") => (Tok::Cmp(CompareOp::Ge), 2),
            b'<' => (Tok::Cmp(CompareOp::Lt), 1),
            b'>' => (Tok::Cmp(CompareOp::Gt), 1),
            b'!' => (Tok::Not, 1),
            q @ (b'\'' | b'"') => {
                let close = rest[1..].find(q as char).ok_or_else(|| {
                    TemplateError::malformed(format!("Unterminated string in '{}'", text), line)
                })?;
                (Tok::Atom(&rest[..close + 2]), close + 2)
            }
            _ => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || "()!&|=<>'\"".contains(c))
                    .unwrap_or(rest.len());
                if len == 0 {
                    return Err(TemplateError::malformed(
                        format!("Unexpected character in condition '{}'", text),
                        line,
                    ));
                }
                let word = &rest[..len];
                let tok = match word {
                    "and" => Tok::And,
                    "or" => Tok::Or,
                    "not" => Tok::Not,
                    _ => Tok::Atom(word),
                };
                (tok, len)
            }
        };
        tokens.push(tok);
        i += len;
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Tok<'a>>,
    pos: usize,
    text: &'a str,
    line: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Tok<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Tok<'a>> {
        let tok = self.peek();
        self.pos += 1;
        tok
    }

    fn error(&self, detail: &str) -> TemplateError {
        TemplateError::malformed(format!("{} in condition '{}'", detail, self.text), self.line)
    }

    fn or(&mut self) -> Result<Expr, TemplateError> {
        let mut left = self.and()?;
        while self.peek() == Some(Tok::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = Expr::Or {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, TemplateError> {
        let mut left = self.not()?;
        while self.peek() == Some(Tok::And) {
            self.pos += 1;
            let right = self.not()?;
            left = Expr::And {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, TemplateError> {
        if self.peek() == Some(Tok::Not) {
            self.pos += 1;
            let inner = self.not()?;
            return Ok(Expr::Not {
                inner: Box::new(inner),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, TemplateError> {
        let left = self.primary()?;
        if let Some(Tok::Cmp(op)) = self.peek() {
            self.pos += 1;
            let right = self.primary()?;
            return Ok(Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, TemplateError> {
        match self.bump() {
            Some(Tok::Open) => {
                let inner = self.or()?;
                match self.bump() {
                    Some(Tok::Close) => Ok(inner),
                    _ => Err(self.error("Missing ')'")),
                }
            }
            Some(Tok::Atom(atom)) => Ok(Expr::Operand {
                operand: parse_operand(atom, self.line)?,
            }),
            Some(_) => Err(self.error("Unexpected operator")),
            None => Err(self.error("Unexpected end")),
        }
    }
}

/// Parse an `if` / `elseif` condition
pub(crate) fn parse_condition(text: &str, line: usize) -> Result<Expr, TemplateError> {
    let mut parser = Parser {
        tokens: lex(text, line)?,
        pos: 0,
        text: text.trim(),
        line,
    };
    let expr = parser.or()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("Trailing tokens"));
    }
    Ok(expr)
}
