//! Operands, argument lists and filter pipelines

use serde_json::{Number, Value};

use super::super::error::TemplateError;
use super::super::unit::{is_identifier, FilterCall, Operand, PathExpr};

/// Filter name that disables HTML escaping for an interpolation
pub(crate) const RAW_FILTER: &str = "raw";

/// Parsed `[[ ... ]]` body
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub value: Operand,
    pub filters: Vec<FilterCall>,
    pub escape: bool,
}

/// Split `text` on `sep` outside quotes and parentheses
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if c == sep && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a single literal or variable path
pub(crate) fn parse_operand(text: &str, line: usize) -> Result<Operand, TemplateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TemplateError::malformed("Expected a value", line));
    }

    if let Some(literal) = parse_string_literal(text) {
        return Ok(Operand::Literal(Value::String(literal.to_string())));
    }

    match text {
        "true" => return Ok(Operand::Literal(Value::Bool(true))),
        "false" => return Ok(Operand::Literal(Value::Bool(false))),
        "null" => return Ok(Operand::Literal(Value::Null)),
        _ => {}
    }

    if let Some(number) = parse_number(text) {
        return Ok(Operand::Literal(Value::Number(number)));
    }

    PathExpr::parse(text)
        .map(Operand::Path)
        .ok_or_else(|| TemplateError::malformed(format!("Invalid expression: '{}'", text), line))
}

fn parse_string_literal(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    // `'a' 'b'` is two literals, not one
    (!inner.contains(quote)).then_some(inner)
}

fn parse_number(text: &str) -> Option<Number> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Number::from(n));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Parse a comma-separated argument list; blank input means no arguments
pub(crate) fn parse_args(text: &str, line: usize) -> Result<Vec<Operand>, TemplateError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(text, ',')
        .into_iter()
        .map(|arg| {
            if arg.trim().is_empty() {
                Err(TemplateError::malformed(
                    format!("Empty argument in '({})'", text.trim()),
                    line,
                ))
            } else {
                parse_operand(arg, line)
            }
        })
        .collect()
}

/// Parse `value | filter | filter(args)`
///
/// `raw` anywhere in the chain turns escaping off and is not kept as a filter.
pub(crate) fn parse_pipeline(expr: &str, line: usize) -> Result<Pipeline, TemplateError> {
    let mut segments = split_top_level(expr, '|').into_iter();
    let value = parse_operand(segments.next().unwrap_or(""), line)?;

    let mut filters = Vec::new();
    let mut escape = true;
    for segment in segments {
        let call = parse_filter_call(segment, line)?;
        if call.name == RAW_FILTER {
            if !call.args.is_empty() {
                return Err(TemplateError::malformed("raw takes no arguments", line));
            }
            escape = false;
        } else {
            filters.push(call);
        }
    }

    Ok(Pipeline {
        value,
        filters,
        escape,
    })
}

fn parse_filter_call(segment: &str, line: usize) -> Result<FilterCall, TemplateError> {
    let segment = segment.trim();
    let (name, args) = match segment.find('(') {
        Some(open) => {
            let inner = segment[open + 1..].strip_suffix(')').ok_or_else(|| {
                TemplateError::malformed(format!("Unclosed filter arguments: '{}'", segment), line)
            })?;
            (segment[..open].trim(), parse_args(inner, line)?)
        }
        None => (segment, Vec::new()),
    };

    if !is_identifier(name) {
        return Err(TemplateError::malformed(
            format!("Invalid filter name: '{}'", name),
            line,
        ));
    }
    Ok(FilterCall {
        name: name.to_string(),
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(text: &str) -> Operand {
        Operand::Path(PathExpr::parse(text).unwrap())
    }

    #[test]
    fn test_split_top_level_respects_quotes_and_parens() {
        assert_eq!(split_top_level("a | b(1|2) | c", '|'), vec!["a ", " b(1|2) ", " c"]);
        assert_eq!(split_top_level(r#""x,y", 'z', 3"#, ','), vec![r#""x,y""#, " 'z'", " 3"]);
        assert_eq!(split_top_level("", ','), vec![""]);
    }

    #[test]
    fn test_parse_operand_literals() {
        assert_eq!(parse_operand("'hi'", 1).unwrap(), Operand::Literal(json!("hi")));
        assert_eq!(parse_operand(r#""a b""#, 1).unwrap(), Operand::Literal(json!("a b")));
        assert_eq!(parse_operand("42", 1).unwrap(), Operand::Literal(json!(42)));
        assert_eq!(parse_operand("-3", 1).unwrap(), Operand::Literal(json!(-3)));
        assert_eq!(parse_operand("1.5", 1).unwrap(), Operand::Literal(json!(1.5)));
        assert_eq!(parse_operand("true", 1).unwrap(), Operand::Literal(json!(true)));
        assert_eq!(parse_operand("null", 1).unwrap(), Operand::Literal(Value::Null));
    }

    #[test]
    fn test_parse_operand_paths() {
        assert_eq!(parse_operand(" user.name ", 1).unwrap(), path("user.name"));
        assert_eq!(parse_operand("items.0", 1).unwrap(), path("items.0"));
        assert!(parse_operand("a b", 1).is_err());
        assert!(parse_operand("'unterminated", 1).is_err());
        assert!(parse_operand("", 1).is_err());
    }

    #[test]
    fn test_parse_args() {
        assert!(parse_args("  ", 1).unwrap().is_empty());
        assert_eq!(
            parse_args(r#"name, "x, y", 2"#, 1).unwrap(),
            vec![path("name"), Operand::Literal(json!("x, y")), Operand::Literal(json!(2))]
        );
        assert!(parse_args("a,,b", 1).is_err());
        assert!(parse_args("a,", 1).is_err());
    }

    #[test]
    fn test_parse_pipeline() {
        let pipeline = parse_pipeline(r#" title | truncate(10) | default("none") "#, 4).unwrap();
        assert_eq!(pipeline.value, path("title"));
        assert!(pipeline.escape);
        let names: Vec<&str> = pipeline.filters.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["truncate", "default"]);
        assert_eq!(pipeline.filters[1].args, vec![Operand::Literal(json!("none"))]);
    }

    #[test]
    fn test_raw_disables_escaping() {
        let pipeline = parse_pipeline("body | upper | raw", 1).unwrap();
        assert!(!pipeline.escape);
        assert_eq!(pipeline.filters.len(), 1);
        assert_eq!(pipeline.filters[0].name, "upper");
    }

    #[test]
    fn test_pipeline_errors() {
        for expr in ["", "x |", "x | 9bad", "x | f(", "x | raw(1)"] {
            let err = parse_pipeline(expr, 2).unwrap_err();
            assert_eq!(err.line(), 2, "'{}'", expr);
        }
    }
}
