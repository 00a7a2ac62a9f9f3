//! Block marker utilities used by the inheritance resolver
//!
//! Works on raw source text: markers are located through the lexer and regions
//! are returned as byte ranges so callers can splice text directly.

use std::ops::Range;

use super::directive::Directive;
use super::error::TemplateError;
use super::lexer::{tokenize, Token, TokenKind};

/// Directive keywords that matter for inheritance
const MARKER_KEYWORDS: [&str; 4] = ["extends", "block", "endblock", "super"];

/// An inheritance-relevant directive and where it sits in the source
#[derive(Debug, Clone)]
pub(crate) struct Marker<'a> {
    pub directive: Directive<'a>,
    pub span: Range<usize>,
    pub line: usize,
}

/// `[% block name %] body [% endblock %]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockRegion<'a> {
    pub name: &'a str,
    /// Whole region including both markers
    pub outer: Range<usize>,
    /// Text between the markers
    pub body: Range<usize>,
}

/// Collect inheritance markers in document order
///
/// Other directives are left alone; they are the compiler's business.
pub(crate) fn scan_markers(src: &str) -> Result<Vec<Marker<'_>>, TemplateError> {
    let mut markers = Vec::new();
    for token in tokenize(src)? {
        if let Some(marker) = marker_of(&token)? {
            markers.push(marker);
        }
    }
    Ok(markers)
}

fn marker_of<'a>(token: &Token<'a>) -> Result<Option<Marker<'a>>, TemplateError> {
    let TokenKind::Directive { content } = token.kind else {
        return Ok(None);
    };
    let keyword = content.split_whitespace().next().unwrap_or("");
    if !MARKER_KEYWORDS.contains(&keyword) {
        return Ok(None);
    }
    let directive = Directive::parse(content, token.line)?;
    Ok(Some(Marker {
        directive,
        span: token.start..token.end,
        line: token.line,
    }))
}

/// Find the `endblock` matching the `block` at `open`
///
/// Returns the index into `markers`. Respects nested blocks.
pub(crate) fn find_block_end(markers: &[Marker<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, marker) in markers.iter().enumerate().skip(open + 1) {
        match marker.directive {
            Directive::Block(_) => depth += 1,
            Directive::EndBlock if depth == 0 => return Some(i),
            Directive::EndBlock => depth -= 1,
            _ => {}
        }
    }
    None
}

fn region_at<'a>(
    markers: &[Marker<'a>],
    open: usize,
    name: &'a str,
) -> Result<(BlockRegion<'a>, usize), TemplateError> {
    let close = find_block_end(markers, open).ok_or(TemplateError::Unclosed {
        construct: "block",
        line: markers[open].line,
    })?;
    let region = BlockRegion {
        name,
        outer: markers[open].span.start..markers[close].span.end,
        body: markers[open].span.end..markers[close].span.start,
    };
    Ok((region, close))
}

fn check_balanced(markers: &[Marker<'_>]) -> Result<(), TemplateError> {
    let mut depth = 0usize;
    for marker in markers {
        match marker.directive {
            Directive::Block(_) => depth += 1,
            Directive::EndBlock if depth == 0 => {
                return Err(TemplateError::Unexpected {
                    keyword: "endblock".to_string(),
                    line: marker.line,
                })
            }
            Directive::EndBlock => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}

/// Every block region at any nesting depth, ordered by opening position
pub(crate) fn all_blocks(src: &str) -> Result<Vec<BlockRegion<'_>>, TemplateError> {
    let markers = scan_markers(src)?;
    check_balanced(&markers)?;
    let mut regions = Vec::new();
    for (i, marker) in markers.iter().enumerate() {
        if let Directive::Block(name) = marker.directive {
            regions.push(region_at(&markers, i, name)?.0);
        }
    }
    Ok(regions)
}

/// Block regions that are not nested inside another block
pub(crate) fn top_level_blocks(src: &str) -> Result<Vec<BlockRegion<'_>>, TemplateError> {
    let markers = scan_markers(src)?;
    check_balanced(&markers)?;
    let mut regions = Vec::new();
    let mut i = 0;
    while i < markers.len() {
        if let Directive::Block(name) = markers[i].directive {
            let (region, close) = region_at(&markers, i, name)?;
            regions.push(region);
            i = close + 1;
        } else {
            i += 1;
        }
    }
    Ok(regions)
}

/// Target of the first `extends` directive, if any
pub(crate) fn find_extends(src: &str) -> Result<Option<&str>, TemplateError> {
    Ok(scan_markers(src)?
        .into_iter()
        .find_map(|m| match m.directive {
            Directive::Extends(target) => Some(target),
            _ => None,
        }))
}

/// Replace every `[% super %]` in `src` with `parent_body`
pub(crate) fn replace_super(src: &str, parent_body: &str) -> Result<String, TemplateError> {
    let markers = scan_markers(src)?;
    Ok(splice(src, &markers, |directive| {
        matches!(directive, Directive::Super).then_some(parent_body)
    }))
}

/// Remove every inheritance marker, keeping enclosed content
pub(crate) fn strip_markers(src: &str) -> Result<String, TemplateError> {
    let markers = scan_markers(src)?;
    Ok(splice(src, &markers, |_| Some("")))
}

/// Copy `src`, substituting marker spans for which `replacement` returns text
fn splice<'r, F>(src: &str, markers: &[Marker<'_>], replacement: F) -> String
where
    F: Fn(&Directive<'_>) -> Option<&'r str>,
{
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    for marker in markers {
        if let Some(text) = replacement(&marker.directive) {
            out.push_str(&src[cursor..marker.span.start]);
            out.push_str(text);
            cursor = marker.span.end;
        }
    }
    out.push_str(&src[cursor..]);
    out
}
