//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Files, SimpleFile};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;

/// Compile error with source location
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Syntax error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("Type error at {span:?}: {message}")]
    Type { message: String, span: Span },

    #[error("Code generation error: {message}")]
    Codegen { message: String },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::Type {
            message: message.into(),
            span,
        }
    }

    pub fn codegen(message: impl Into<String>) -> Self {
        Self::Codegen {
            message: message.into(),
        }
    }

    /// Source location of the error, absent for internal code generation failures
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lexer { span, .. }
            | CompileError::Parser { span, .. }
            | CompileError::Type { span, .. } => Some(*span),
            CompileError::Codegen { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Lexer { message, .. }
            | CompileError::Parser { message, .. }
            | CompileError::Type { message, .. }
            | CompileError::Codegen { message } => message,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            CompileError::Lexer { .. } => "Lexer error",
            CompileError::Parser { .. } => "Syntax error",
            CompileError::Type { .. } => "Type error",
            CompileError::Codegen { .. } => "Code generation error",
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// How diagnostics are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticStyle {
    /// Source line, caret under the offending column, message
    #[default]
    Caret,
    /// codespan-reporting output with labels
    Rich,
}

/// Diagnostic reporter for the single source being compiled
pub struct DiagnosticReporter {
    file: SimpleFile<String, String>,
    style: DiagnosticStyle,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: SimpleFile::new(name.into(), source.into()),
            style: DiagnosticStyle::default(),
            config: term::Config::default(),
        }
    }

    pub fn with_style(mut self, style: DiagnosticStyle) -> Self {
        self.style = style;
        self
    }

    /// Format `error` without colour
    pub fn render(&self, error: &CompileError) -> String {
        match self.style {
            DiagnosticStyle::Caret => self.render_caret(error),
            DiagnosticStyle::Rich => {
                let mut buffer = Buffer::no_color();
                self.emit_rich(&mut buffer, error);
                String::from_utf8_lossy(buffer.as_slice()).into_owned()
            }
        }
    }

    /// Write the diagnostic for `error` to standard error
    pub fn report_error(&self, error: &CompileError) {
        match self.style {
            DiagnosticStyle::Caret => eprintln!("{}", self.render_caret(error)),
            DiagnosticStyle::Rich => {
                let writer = StandardStream::stderr(ColorChoice::Auto);
                self.emit_rich(&mut writer.lock(), error);
            }
        }
    }

    fn render_caret(&self, error: &CompileError) -> String {
        let Some(span) = error.span() else {
            return format!("{}: {}", error.title().to_lowercase(), error.message());
        };

        let source = self.file.source().as_str();
        // End of input points past trailing line breaks onto the last real line
        let offset = if span.start >= source.len() {
            source.trim_end_matches(['\n', '\r']).len()
        } else {
            span.start
        };
        let line_range = self
            .file
            .line_index((), offset)
            .and_then(|line| self.file.line_range((), line))
            .unwrap_or(0..source.len());

        let line = source[line_range.start..line_range.end.min(source.len())]
            .trim_end_matches(['\n', '\r']);
        let column = source[line_range.start..offset].chars().count();

        format!("{}\n{}^ {}", line, " ".repeat(column), error.message())
    }

    fn emit_rich(&self, writer: &mut dyn WriteColor, error: &CompileError) {
        let mut diagnostic = Diagnostic::error().with_message(error.title());
        diagnostic = match error.span() {
            Some(span) => diagnostic.with_labels(vec![
                Label::primary((), span.range()).with_message(error.message()),
            ]),
            None => diagnostic.with_notes(vec![error.message().to_string()]),
        };

        let _ = term::emit(writer, &self.config, &self.file, &diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_points_at_offset() {
        let source = "int main() { return x; }";
        let reporter = DiagnosticReporter::new("<input>", source);
        let error = CompileError::parser("undefined variable 'x'", Span::new(20, 21));

        assert_eq!(
            reporter.render(&error),
            "int main() { return x; }\n                    ^ undefined variable 'x'"
        );
    }

    #[test]
    fn test_caret_uses_offending_line_only() {
        let source = "int main() {\n  return 1 @ 2;\n}";
        let reporter = DiagnosticReporter::new("<input>", source);
        let error = CompileError::lexer("invalid token '@'", Span::new(24, 25));

        assert_eq!(
            reporter.render(&error),
            "  return 1 @ 2;\n           ^ invalid token '@'"
        );
    }

    #[test]
    fn test_caret_at_end_of_input() {
        let source = "1 +";
        let reporter = DiagnosticReporter::new("<input>", source);
        let error = CompileError::parser("expected an expression", Span::point(3));

        assert_eq!(reporter.render(&error), "1 +\n   ^ expected an expression");
    }

    #[test]
    fn test_caret_at_end_of_input_skips_trailing_newlines() {
        let source = "int main() {\n  return 1 +\n\n";
        let reporter = DiagnosticReporter::new("<input>", source);
        let error = CompileError::parser("expected an expression", Span::point(source.len()));

        assert_eq!(
            reporter.render(&error),
            "  return 1 +\n            ^ expected an expression"
        );
    }

    #[test]
    fn test_codegen_error_has_no_caret() {
        let reporter = DiagnosticReporter::new("<input>", "");
        let error = CompileError::codegen("unbalanced operand stack");
        assert_eq!(
            reporter.render(&error),
            "code generation error: unbalanced operand stack"
        );
    }

    #[test]
    fn test_rich_style_mentions_message() {
        let source = "int main() { return *1; }";
        let reporter = DiagnosticReporter::new("prog.c", source).with_style(DiagnosticStyle::Rich);
        let error = CompileError::type_error("invalid pointer dereference", Span::new(20, 22));

        let text = reporter.render(&error);
        assert!(text.contains("Type error"));
        assert!(text.contains("invalid pointer dereference"));
        assert!(text.contains("prog.c"));
    }
}
