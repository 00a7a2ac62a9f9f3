//! Tokenization for template markup
//!
//! Splits source text into literal text and the three markup constructs:
//!
//! - `[[ expr ]]` interpolation
//! - `[% directive %]` control directive
//! - `##name(args)##` macro call
//!
//! Tokens carry byte spans into the source so the inheritance resolver can
//! splice text without re-rendering it. Closing delimiters inside quoted
//! strings do not terminate a construct.

use super::error::TemplateError;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// Literal text between constructs
    Text,

    /// `[[ expr ]]`; `expr` is untrimmed
    Interpolation { expr: &'a str },

    /// `[% content %]`; `content` is untrimmed
    Directive { content: &'a str },

    /// `##name(args)##`
    MacroCall { name: &'a str, args: &'a str },
}

/// A single token with its source span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
    /// Line number where the token starts
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Raw source text covered by this token
    pub fn source<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end]
    }
}

/// Which construct an opener introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    Interpolation,
    Directive,
    Macro,
}

/// Iterator over tokens in a template string
///
/// Scanning is forward-only; each byte is visited a bounded number of times.
/// After the first error the stream is exhausted.
pub(crate) struct TokenStream<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    /// Find the next construct opener at or after `from`
    fn find_opener(&self, from: usize) -> Option<(usize, Opener)> {
        let bytes = self.bytes;
        let mut i = from;
        while i + 1 < bytes.len() {
            match (bytes[i], bytes[i + 1]) {
                (b'[', b'[') => return Some((i, Opener::Interpolation)),
                (b'[', b'%') => return Some((i, Opener::Directive)),
                (b'#', b'#') if self.macro_name_end(i + 2).is_some() => {
                    return Some((i, Opener::Macro));
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// If an identifier followed by `(` starts at `at`, return the identifier end
    fn macro_name_end(&self, at: usize) -> Option<usize> {
        let bytes = self.bytes;
        let first = *bytes.get(at)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
        let mut end = at + 1;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        (bytes.get(end) == Some(&b'(')).then_some(end)
    }

    fn emit(&mut self, kind: TokenKind<'a>, start: usize, end: usize) -> Token<'a> {
        let token = Token {
            kind,
            start,
            end,
            line: self.line,
        };
        self.line += count_newlines(&self.src[start..end]);
        self.pos = end;
        token
    }

    fn fail(&mut self, message: &str) -> TemplateError {
        let line = self.line;
        self.pos = self.bytes.len();
        TemplateError::malformed(message, line)
    }

    fn lex_construct(&mut self, start: usize, opener: Opener) -> Result<Token<'a>, TemplateError> {
        let src = self.src;
        match opener {
            Opener::Interpolation => {
                let close = find_unquoted(self.bytes, start + 2, b"]]")
                    .ok_or_else(|| self.fail("Unclosed [[ interpolation"))?;
                let expr = &src[start + 2..close];
                Ok(self.emit(TokenKind::Interpolation { expr }, start, close + 2))
            }
            Opener::Directive => {
                let close = find_unquoted(self.bytes, start + 2, b"%]")
                    .ok_or_else(|| self.fail("Unclosed [% directive"))?;
                let content = &src[start + 2..close];
                Ok(self.emit(TokenKind::Directive { content }, start, close + 2))
            }
            Opener::Macro => {
                // find_opener only reports a macro when name + `(` follow
                let name_end = self
                    .macro_name_end(start + 2)
                    .ok_or_else(|| self.fail("Malformed ## macro call"))?;
                let close = find_unquoted(self.bytes, name_end + 1, b")##")
                    .ok_or_else(|| self.fail("Unclosed ## macro call, expected )##"))?;
                let name = &src[start + 2..name_end];
                let args = &src[name_end + 1..close];
                Ok(self.emit(TokenKind::MacroCall { name, args }, start, close + 3))
            }
        }
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        if start >= self.bytes.len() {
            return None;
        }

        match self.find_opener(start) {
            Some((at, opener)) if at == start => Some(self.lex_construct(start, opener)),
            Some((at, _)) => Some(Ok(self.emit(TokenKind::Text, start, at))),
            None => {
                let end = self.bytes.len();
                Some(Ok(self.emit(TokenKind::Text, start, end)))
            }
        }
    }
}

/// Tokenize a whole template
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    TokenStream::new(src).collect()
}

/// Find `needle` at or after `from`, skipping over quoted substrings
///
/// A quote opens with `'` or `"` and closes with the same character.
pub(crate) fn find_unquoted(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => quote = Some(b),
            None if bytes[i..].starts_with(needle) => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind<'_>> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_plain_text_is_single_token() {
        assert_eq!(kinds("just text"), vec![TokenKind::Text]);
    }

    #[test]
    fn test_interpolation_between_text() {
        let tokens = tokenize("Hello [[ name ]]!").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Interpolation { expr: " name " });
        assert_eq!(tokens[1].start, 6);
        assert_eq!(tokens[1].end, 16);
        assert_eq!(tokens[2].source("Hello [[ name ]]!"), "!");
    }

    #[test]
    fn test_directive_and_macro() {
        assert_eq!(
            kinds(r#"[% if x %]##greet("a, b")##[% endif %]"#),
            vec![
                TokenKind::Directive { content: " if x " },
                TokenKind::MacroCall {
                    name: "greet",
                    args: r#""a, b""#
                },
                TokenKind::Directive { content: " endif " },
            ]
        );
    }

    #[test]
    fn test_hash_without_call_is_text() {
        assert_eq!(kinds("## Heading\n#hashtag ##"), vec![TokenKind::Text]);
    }

    #[test]
    fn test_closing_delimiter_inside_quotes() {
        let tokens = tokenize(r#"[[ x | default("]]") ]]"#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::Interpolation {
                expr: r#" x | default("]]") "#
            }
        );
    }

    #[test]
    fn test_macro_args_with_paren_in_quotes() {
        let tokens = tokenize(r#"##say(")##", 'x')##"#).unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::MacroCall {
                name: "say",
                args: r#"")##", 'x'"#
            }
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\nb\n[[ x ]]\n[% y %]").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 3, 4]);
    }

    #[test]
    fn test_unclosed_interpolation_errors() {
        let err = tokenize("Hello [[ name").unwrap_err();
        assert!(matches!(err, TemplateError::MalformedSyntax { line: 1, .. }));
    }

    #[test]
    fn test_unclosed_directive_errors() {
        let err = tokenize("line\n[% if x").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_unclosed_macro_errors() {
        assert!(tokenize("##greet(\"x\"").is_err());
    }

    #[test]
    fn test_single_bracket_is_text() {
        assert_eq!(kinds("a[0] and [b] %]"), vec![TokenKind::Text]);
    }

    #[test]
    fn test_spans_cover_source() {
        let src = "x[[a]]y[%b%]z##m()##";
        let tokens = tokenize(src).unwrap();
        let rebuilt: String = tokens.iter().map(|t| t.source(src)).collect();
        assert_eq!(rebuilt, src);
    }
}
