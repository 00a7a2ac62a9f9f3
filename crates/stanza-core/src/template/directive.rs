//! `[% ... %]` directive classification

use super::error::TemplateError;
use super::unit::is_identifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive<'a> {
    /// `extends 'parent'`
    Extends(&'a str),
    /// `block name`
    Block(&'a str),
    /// `endblock` or `endblock name`
    EndBlock,
    /// `super`; replaced by the parent block body during inheritance
    Super,
    If(&'a str),
    /// `elseif cond`, `elif cond` or `else if cond`
    ElseIf(&'a str),
    Else,
    EndIf,
    For { binding: &'a str, iterable: &'a str },
    EndFor,
}

impl<'a> Directive<'a> {
    /// Classify the content between `[%` and `%]`
    pub fn parse(content: &'a str, line: usize) -> Result<Self, TemplateError> {
        let content = content.trim();
        let (keyword, rest) = match content.find(char::is_whitespace) {
            Some(i) => (&content[..i], content[i..].trim()),
            None => (content, ""),
        };

        let directive = match keyword {
            "extends" => Directive::Extends(parse_template_name(rest, line)?),
            "block" => Directive::Block(parse_block_name(rest, line)?),
            "endblock" => Directive::EndBlock,
            "super" => Directive::Super,
            "if" => Directive::If(require_expr(keyword, rest, line)?),
            "elseif" | "elif" => Directive::ElseIf(require_expr(keyword, rest, line)?),
            "else" => match rest.strip_prefix("if") {
                Some(cond) if cond.starts_with(char::is_whitespace) => {
                    Directive::ElseIf(require_expr("else if", cond.trim(), line)?)
                }
                _ if rest.is_empty() => Directive::Else,
                _ => {
                    return Err(TemplateError::malformed(
                        format!("Unexpected text after else: '{}'", rest),
                        line,
                    ))
                }
            },
            "endif" => Directive::EndIf,
            "for" => parse_for(rest, line)?,
            "endfor" => Directive::EndFor,
            "" => return Err(TemplateError::malformed("Empty directive", line)),
            other => {
                return Err(TemplateError::UnknownDirective {
                    keyword: other.to_string(),
                    line,
                })
            }
        };
        Ok(directive)
    }

    /// Block markers and inheritance directives, dropped before execution
    pub fn is_inheritance_marker(&self) -> bool {
        matches!(
            self,
            Directive::Extends(_) | Directive::Block(_) | Directive::EndBlock | Directive::Super
        )
    }
}

fn require_expr<'a>(keyword: &str, rest: &'a str, line: usize) -> Result<&'a str, TemplateError> {
    if rest.is_empty() {
        Err(TemplateError::malformed(
            format!("[% {} %] requires a condition", keyword),
            line,
        ))
    } else {
        Ok(rest)
    }
}

/// `'name'`, `"name"` or a bare name
fn parse_template_name(rest: &str, line: usize) -> Result<&str, TemplateError> {
    let name = match rest.as_bytes().first() {
        Some(&q) if q == b'\'' || q == b'"' => {
            let inner = &rest[1..];
            let close = inner.find(q as char).ok_or_else(|| {
                TemplateError::malformed(format!("Unterminated template name in extends {}", rest), line)
            })?;
            &inner[..close]
        }
        _ => rest,
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(TemplateError::malformed(
            format!("Invalid extends target: '{}'", rest),
            line,
        ));
    }
    Ok(name)
}

fn parse_block_name(rest: &str, line: usize) -> Result<&str, TemplateError> {
    let valid = !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(rest)
    } else {
        Err(TemplateError::malformed(
            format!("Invalid block name: '{}'", rest),
            line,
        ))
    }
}

/// `x in items`
fn parse_for(rest: &str, line: usize) -> Result<Directive<'_>, TemplateError> {
    let malformed = || {
        TemplateError::malformed(
            format!("Invalid for syntax: expected 'for x in items', got 'for {}'", rest),
            line,
        )
    };

    let split = rest.find(char::is_whitespace).ok_or_else(malformed)?;
    let binding = &rest[..split];
    let iterable = rest[split..]
        .trim_start()
        .strip_prefix("in")
        .filter(|r| r.starts_with(char::is_whitespace))
        .map(str::trim)
        .ok_or_else(malformed)?;

    if !is_identifier(binding) || iterable.is_empty() {
        return Err(malformed());
    }
    Ok(Directive::For { binding, iterable })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Directive<'_> {
        Directive::parse(content, 1).unwrap()
    }

    #[test]
    fn test_extends_quoted_and_bare() {
        assert_eq!(parse(" extends 'base' "), Directive::Extends("base"));
        assert_eq!(parse(r#"extends "layouts/main""#), Directive::Extends("layouts/main"));
        assert_eq!(parse("extends base"), Directive::Extends("base"));
    }

    #[test]
    fn test_block_markers() {
        assert_eq!(parse(" block title "), Directive::Block("title"));
        assert_eq!(parse("endblock"), Directive::EndBlock);
        assert_eq!(parse("endblock title"), Directive::EndBlock);
        assert_eq!(parse("super"), Directive::Super);
    }

    #[test]
    fn test_conditionals() {
        assert_eq!(parse("if user.admin"), Directive::If("user.admin"));
        assert_eq!(parse("elseif a and b"), Directive::ElseIf("a and b"));
        assert_eq!(parse("elif a"), Directive::ElseIf("a"));
        assert_eq!(parse("else if a"), Directive::ElseIf("a"));
        assert_eq!(parse("else"), Directive::Else);
        assert_eq!(parse("endif"), Directive::EndIf);
    }

    #[test]
    fn test_for_loop() {
        assert_eq!(
            parse("for item in cart.items"),
            Directive::For {
                binding: "item",
                iterable: "cart.items"
            }
        );
        assert_eq!(parse("endfor"), Directive::EndFor);
    }

    #[test]
    fn test_invalid_for_syntax() {
        for content in ["for", "for x", "for x of y", "for x in", "for 1x in y", "for x inside y"] {
            assert!(
                Directive::parse(content, 3).is_err(),
                "'{}' should be rejected",
                content
            );
        }
    }

    #[test]
    fn test_if_without_condition() {
        assert!(Directive::parse("if", 1).is_err());
        assert!(Directive::parse("elseif  ", 1).is_err());
    }

    #[test]
    fn test_unknown_directive() {
        let err = Directive::parse("include 'x'", 7).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownDirective {
                keyword: "include".into(),
                line: 7
            }
        );
    }

    #[test]
    fn test_inheritance_markers() {
        assert!(parse("block a").is_inheritance_marker());
        assert!(parse("super").is_inheritance_marker());
        assert!(!parse("endif").is_inheritance_marker());
    }
}
