//! Template compiler
//!
//! Turns merged template source into a [`CompiledUnit`]. Inheritance markers
//! are expected to be resolved already; any that remain are dropped.

mod args;
mod expr;

use std::vec;

use super::directive::Directive;
use super::error::TemplateError;
use super::lexer::{tokenize, Token, TokenKind};
use super::unit::{Branch, CompiledUnit, Node, PathExpr};

pub(crate) use args::{parse_args, parse_pipeline};
pub(crate) use expr::parse_condition;

/// Compile template source
pub fn compile(source: &str) -> Result<CompiledUnit, TemplateError> {
    let mut compiler = Compiler {
        src: source,
        tokens: tokenize(source)?.into_iter(),
    };
    let (nodes, terminator) = compiler.parse_body()?;
    if let Some(end) = terminator {
        return Err(end.unexpected());
    }
    Ok(CompiledUnit::new(nodes))
}

/// Directive that ended a body
struct Terminator<'a> {
    directive: Directive<'a>,
    line: usize,
}

impl Terminator<'_> {
    fn unexpected(&self) -> TemplateError {
        let keyword = match self.directive {
            Directive::ElseIf(_) => "elseif",
            Directive::Else => "else",
            Directive::EndIf => "endif",
            Directive::EndFor => "endfor",
            _ => "directive",
        };
        TemplateError::Unexpected {
            keyword: keyword.to_string(),
            line: self.line,
        }
    }
}

struct Compiler<'a> {
    src: &'a str,
    tokens: vec::IntoIter<Token<'a>>,
}

impl<'a> Compiler<'a> {
    /// Parse nodes until a closing or continuation directive, or end of input
    fn parse_body(&mut self) -> Result<(Vec<Node>, Option<Terminator<'a>>), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token.kind {
                TokenKind::Text => push_text(&mut nodes, token.source(self.src)),
                TokenKind::Interpolation { expr } => {
                    let pipeline = parse_pipeline(expr, token.line)?;
                    nodes.push(Node::Output {
                        value: pipeline.value,
                        filters: pipeline.filters,
                        escape: pipeline.escape,
                    });
                }
                TokenKind::MacroCall { name, args } => nodes.push(Node::Macro {
                    name: name.to_string(),
                    args: parse_args(args, token.line)?,
                }),
                TokenKind::Directive { content } => {
                    let directive = Directive::parse(content, token.line)?;
                    match directive {
                        d if d.is_inheritance_marker() => {}
                        Directive::If(cond) => nodes.push(self.parse_if(cond, token.line)?),
                        Directive::For { binding, iterable } => {
                            nodes.push(self.parse_for(binding, iterable, token.line)?)
                        }
                        directive => {
                            return Ok((
                                nodes,
                                Some(Terminator {
                                    directive,
                                    line: token.line,
                                }),
                            ))
                        }
                    }
                }
            }
        }
        Ok((nodes, None))
    }

    fn parse_if(&mut self, condition: &str, line: usize) -> Result<Node, TemplateError> {
        let mut branches = Vec::new();
        let mut condition = parse_condition(condition, line)?;

        loop {
            let (body, terminator) = self.parse_body()?;
            branches.push(Branch { condition, body });

            let end = terminator.ok_or(TemplateError::Unclosed {
                construct: "if",
                line,
            })?;
            match end.directive {
                Directive::ElseIf(next) => condition = parse_condition(next, end.line)?,
                Directive::Else => {
                    let (otherwise, terminator) = self.parse_body()?;
                    return match terminator {
                        Some(Terminator {
                            directive: Directive::EndIf,
                            ..
                        }) => Ok(Node::If {
                            branches,
                            otherwise: Some(otherwise),
                        }),
                        Some(other) => Err(other.unexpected()),
                        None => Err(TemplateError::Unclosed {
                            construct: "if",
                            line,
                        }),
                    };
                }
                Directive::EndIf => {
                    return Ok(Node::If {
                        branches,
                        otherwise: None,
                    })
                }
                _ => return Err(end.unexpected()),
            }
        }
    }

    fn parse_for(
        &mut self,
        binding: &str,
        iterable: &str,
        line: usize,
    ) -> Result<Node, TemplateError> {
        let iterable = PathExpr::parse(iterable).ok_or_else(|| {
            TemplateError::malformed(format!("Invalid loop source: '{}'", iterable), line)
        })?;

        let (body, terminator) = self.parse_body()?;
        match terminator {
            Some(Terminator {
                directive: Directive::EndFor,
                ..
            }) => Ok(Node::For {
                binding: binding.to_string(),
                iterable,
                body,
            }),
            Some(other) => Err(other.unexpected()),
            None => Err(TemplateError::Unclosed {
                construct: "for",
                line,
            }),
        }
    }
}

/// Append text, merging with a preceding text node
fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text { text: previous }) = nodes.last_mut() {
        previous.push_str(text);
    } else {
        nodes.push(Node::Text {
            text: text.to_string(),
        });
    }
}
