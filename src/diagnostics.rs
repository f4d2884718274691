//! Unified, `miette`-based diagnostics for kisexp.
//!
//! # Overview
//!
//! Every failure surfaced by the codec, the tree builder, the printer or the
//! configuration loader is a [`SexpError`]. Errors are built through the
//! `err_msg!` and `err_ctx!` macros so call sites never assemble an
//! [`ErrorContext`] by hand.
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(UnsupportedValue, "empty list has no tag")`
//!
//! - **Use `err_ctx!` when a source and span are available.**
//!   - `err_ctx!(Parse, "Missing closing parenthesis", &src, span)`
//!
//! # Failure model
//!
//! No operation retries. Malformed input shape is reported to the caller
//! immediately; query patterns never fail (a malformed pattern simply matches
//! nothing) and schema lookups cannot fail.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// Byte range into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Source text plus a display name, attached to parse diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Source context for real file content.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Source context for text that did not come from a file.
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self::from_file("<input>", content)
    }

    pub fn to_named_source(&self) -> SourceArc {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

/// Type-safe error classification, mirroring the [`SexpError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Text is not a well-formed s-expression.
    Parse,
    /// A value is neither an atom nor a well-formed list, or cannot be emitted.
    UnsupportedValue,
    /// A layout profile could not be read or decoded.
    Config,
    /// File system failure.
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::UnsupportedValue => "UnsupportedValue",
            ErrorType::Config => "Config",
            ErrorType::Io => "Io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Unified error type for every kisexp failure mode.
#[derive(Debug, Error)]
pub enum SexpError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Unsupported value: {message}")]
    UnsupportedValue {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl SexpError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            SexpError::Parse { ctx, .. } => ctx,
            SexpError::UnsupportedValue { ctx, .. } => ctx,
            SexpError::Config { ctx, .. } => ctx,
            SexpError::Io { ctx, .. } => ctx,
        }
    }

    fn message(&self) -> &str {
        match self {
            SexpError::Parse { message, .. }
            | SexpError::UnsupportedValue { message, .. }
            | SexpError::Config { message, .. }
            | SexpError::Io { message, .. } => message,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            SexpError::Parse { .. } => ErrorType::Parse,
            SexpError::UnsupportedValue { .. } => ErrorType::UnsupportedValue,
            SexpError::Config { .. } => ErrorType::Config,
            SexpError::Io { .. } => ErrorType::Io,
        }
    }

    /// Attaches an underlying error as the `source()` of this one.
    pub fn caused_by(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        let slot = match &mut self {
            SexpError::Parse { source, .. }
            | SexpError::UnsupportedValue { source, .. }
            | SexpError::Config { source, .. }
            | SexpError::Io { source, .. } => source,
        };
        *slot = Some(Box::new(cause));
        self
    }

    /// Replaces the help text shown under the diagnostic.
    pub fn with_help(mut self, text: impl Into<String>) -> Self {
        let ctx = match &mut self {
            SexpError::Parse { ctx, .. }
            | SexpError::UnsupportedValue { ctx, .. }
            | SexpError::Config { ctx, .. }
            | SexpError::Io { ctx, .. } => ctx,
        };
        ctx.help = Some(text.into());
        self
    }
}

impl Diagnostic for SexpError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            SexpError::Parse { .. } => "kisexp::parse",
            SexpError::UnsupportedValue { .. } => "kisexp::unsupported_value",
            SexpError::Config { .. } => "kisexp::config",
            SexpError::Io { .. } => "kisexp::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.get_ctx().span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

impl From<std::io::Error> for SexpError {
    fn from(error: std::io::Error) -> Self {
        crate::err_msg!(Io, error.to_string()).caused_by(error)
    }
}

/// Constructs a [`SexpError`] variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr, $($arg:expr),+ $(,)?) => {
        $crate::SexpError::$variant {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::SexpError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a [`SexpError`] variant carrying a named source and a span.
#[macro_export]
macro_rules! err_ctx {
    // Message, src, span, help
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::SexpError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    // Message, src, span
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::SexpError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
            source: None,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_msg_formats_arguments() {
        let err = crate::err_msg!(UnsupportedValue, "bad head {} at {}", "42", 3);
        assert_eq!(err.error_type(), ErrorType::UnsupportedValue);
        assert_eq!(err.to_string(), "Unsupported value: bad head 42 at 3");
    }

    #[test]
    fn err_ctx_carries_label() {
        let src = SourceContext::anonymous("(a b").to_named_source();
        let err = crate::err_ctx!(Parse, "Missing closing parenthesis", &src, Span { start: 4, end: 4 });
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 4);
        assert_eq!(labels[0].len(), 1);
        assert!(err.source_code().is_some());
    }

    #[test]
    fn io_errors_keep_their_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.kicad_sym");
        let err: SexpError = io.into();
        assert_eq!(err.error_type(), ErrorType::Io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
