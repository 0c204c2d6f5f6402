//! Shared diagnostic model.
//!
//! Lexer, parser, validator, and decompiler all report problems through
//! the same [`Diagnostic`] type. Diagnostics are accumulated, never
//! thrown: each stage keeps going after a problem so that a single run
//! surfaces as many findings as possible, in discovery order.
//!
//! A document compiles if and only if no Error-severity diagnostic was
//! produced; warnings and infos never block output.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::span::SourceSpan;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

/// A single finding with severity, message, source range, and a stable
/// machine-readable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: SourceSpan,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            severity,
            message: message.into(),
            span,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Error, message, span)
    }

    pub fn warning(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Warning, message, span)
    }

    pub fn info(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Info, message, span)
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:{}: {}",
            self.severity.label(),
            self.span.start.row + 1,
            self.span.start.column + 1,
            self.message
        )
    }
}

/// True when any diagnostic in the slice is Error severity.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Render diagnostics one per line in the `[SEVERITY] line:col: message`
/// format, with the severity tag coloured by level.
pub fn render_diagnostics<W: WriteColor>(
    diagnostics: &[Diagnostic],
    writer: &mut W,
) -> io::Result<()> {
    for diagnostic in diagnostics {
        let color = match diagnostic.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Cyan,
        };
        writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(writer, "[{}]", diagnostic.severity.label())?;
        writer.reset()?;
        writeln!(
            writer,
            " {}:{}: {}",
            diagnostic.span.start.row + 1,
            diagnostic.span.start.column + 1,
            diagnostic.message
        )?;
    }
    Ok(())
}
