//! Template compile error types

use std::fmt;

use crate::error::StanzaError;

/// Errors raised while lexing or parsing template markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Malformed template syntax
    MalformedSyntax {
        /// Error message
        message: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// `[% keyword %]` that is not part of the directive vocabulary
    UnknownDirective {
        /// The directive keyword
        keyword: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// Opening construct without its closing directive
    Unclosed {
        /// Which construct was left open (`if`, `for`, `block`)
        construct: &'static str,
        /// Line number of the opening directive
        line: usize,
    },

    /// Closing or continuation directive with nothing to close
    Unexpected {
        /// The offending directive keyword
        keyword: String,
        /// Line number where the error occurred
        line: usize,
    },
}

impl TemplateError {
    pub(crate) fn malformed(message: impl Into<String>, line: usize) -> Self {
        TemplateError::MalformedSyntax {
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            TemplateError::MalformedSyntax { line, .. }
            | TemplateError::UnknownDirective { line, .. }
            | TemplateError::Unclosed { line, .. }
            | TemplateError::Unexpected { line, .. } => *line,
        }
    }

    /// Attach the template name, producing the crate-level error
    pub fn in_template(self, template: &str) -> StanzaError {
        StanzaError::Syntax {
            template: template.to_string(),
            line: self.line(),
            message: self.to_string(),
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::MalformedSyntax { message, line } => {
                write!(f, "Malformed syntax at line {}: {}", line, message)
            }
            TemplateError::UnknownDirective { keyword, line } => {
                write!(f, "Unknown directive '{}' at line {}", keyword, line)
            }
            TemplateError::Unclosed { construct, line } => {
                write!(
                    f,
                    "Unclosed [% {} %] opened at line {}. Add [% end{} %]",
                    construct, line, construct
                )
            }
            TemplateError::Unexpected { keyword, line } => {
                write!(f, "Unexpected [% {} %] at line {}", keyword, line)
            }
        }
    }
}

impl std::error::Error for TemplateError {}
