use crate::parser::Span;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    UnclosedBlock,
    UnterminatedString,
    UnterminatedComment,
    InvalidNumber,
    InvalidSyntax,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "Unexpected token",
            ErrorKind::UnexpectedEof => "Unexpected end of file",
            ErrorKind::UnclosedBlock => "Unclosed block",
            ErrorKind::UnterminatedString => "Unterminated string",
            ErrorKind::UnterminatedComment => "Unterminated comment",
            ErrorKind::InvalidNumber => "Invalid number",
            ErrorKind::InvalidSyntax => "Invalid syntax",
        }
    }
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub related_span: Option<Span>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            related_span: None,
            related_label: None,
            help: None,
        }
    }

    /// Add a related span with a label (e.g., "opened here")
    pub fn with_related(mut self, span: Span) -> Self {
        self.related_span = Some(span);
        self
    }

    /// Set the label for the related span
    pub fn with_related_label(mut self, label: impl Into<String>) -> Self {
        self.related_label = Some(label.into());
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let line = self.span.start.line + 1;
        let col = self.span.start.col + 1;
        output.push_str(&format!(" {}file:{} {}:{}:{}\n", dim, reset, filename, line, col));

        let message = if color { highlight_quoted(&self.message) } else { self.message.clone() };
        output.push_str(&format!("{}error:{} {}\n", red, reset, message));

        if let Some(source_line) = source.lines().nth(self.span.start.line) {
            let width = format!("{}", line).len().max(2);
            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
            output.push_str(&format!("{}{:>width$} |{} {}\n", dim, line, reset, source_line, width = width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim,
                "",
                reset,
                " ".repeat(self.span.start.col),
                red,
                "^".repeat(underline_len(&self.span, source_line)),
                reset,
                width = width
            ));
        }

        if let Some(ref related) = self.related_span {
            let related_line = related.start.line + 1;
            if let Some(source_line) = source.lines().nth(related.start.line) {
                let width = format!("{}", related_line).len().max(2);
                let label = self.related_label.as_deref().unwrap_or("opened here");
                output.push_str(&format!("{}{:>width$} |{} {}\n", dim, related_line, reset, source_line, width = width));
                output.push_str(&format!(
                    "{}{:>width$} |{} {}{}{} {}{}\n",
                    dim,
                    "",
                    reset,
                    " ".repeat(related.start.col),
                    dim,
                    "^".repeat(underline_len(related, source_line)),
                    label,
                    reset,
                    width = width
                ));
            }
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                let content = if color { highlight_quoted(help_line) } else { help_line.to_string() };
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, content));
                } else {
                    output.push_str(&format!("       {}\n", content));
                }
            }
        }

        output.push('\n');
        output
    }
}

fn underline_len(span: &Span, source_line: &str) -> usize {
    if span.end.line == span.start.line {
        span.end.col.saturating_sub(span.start.col).max(1)
    } else {
        source_line.chars().count().saturating_sub(span.start.col).max(1)
    }
}

/// Render 'quoted' code in messages as highlighted `code`
fn highlight_quoted(text: &str) -> String {
    const KEYWORD: &str = "\x1b[38;5;173m";
    const RESET: &str = "\x1b[0m";

    let mut result = String::with_capacity(text.len() * 2);
    let mut rest = text;
    while let Some(open) = rest.find('\'') {
        let Some(close) = rest[open + 1..].find('\'') else {
            break;
        };
        result.push_str(&rest[..open]);
        result.push_str(KEYWORD);
        result.push('`');
        result.push_str(&rest[open + 1..open + 1 + close]);
        result.push('`');
        result.push_str(RESET);
        rest = &rest[open + close + 2..];
    }
    result.push_str(rest);
    result
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.kind.as_str(),
            self.span.start.line + 1,
            self.span.start.col + 1,
            self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Failure to locate a function or method in a Go file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("could not locate function {0:?}")]
    FunctionNotFound(String),

    #[error("could not locate method {name:?} with receiver {receiver:?}")]
    MethodNotFound { receiver: String, name: String },

    /// The lookup string has no `Receiver.` part or an empty method name
    #[error("invalid method name {0:?}, expected \"Receiver.Method\"")]
    InvalidMethodName(String),

    #[error("invalid method receiver in {0:?}")]
    InvalidMethodReceiver(String),
}

/// Failure inside the protobuf file model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    #[error("could not locate message {0:?}")]
    MessageNotFound(String),

    #[error("could not locate service {0:?}")]
    ServiceNotFound(String),

    #[error("could not locate import {0:?}")]
    ImportNotFound(String),

    #[error("could not locate enum {0:?}")]
    EnumNotFound(String),

    #[error("could not locate rpc {name:?} in service {service:?}")]
    RpcNotFound { service: String, name: String },

    #[error("could not locate field {name:?} in message {message:?}")]
    FieldNotFound { message: String, name: String },

    #[error("could not locate oneof {name:?} in message {message:?}")]
    OneofNotFound { message: String, name: String },

    #[error("message {message:?} already has a field named {name:?}")]
    DuplicateField { message: String, name: String },

    #[error("service {service:?} already has an rpc named {name:?}")]
    DuplicateRpc { service: String, name: String },

    #[error("message {0:?} is already defined")]
    DuplicateMessage(String),

    #[error("message {message:?} has no free field number left")]
    NoFreeSequence { message: String },

    #[error("index {index} is out of bounds for {list} of length {len}")]
    IndexOutOfBounds { list: &'static str, index: usize, len: usize },
}

/// Failure of a single mutation recipe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Proto(#[from] ProtoError),

    #[error("could not locate {0}")]
    AnchorNotFound(String),
}

impl RecipeError {
    pub fn anchor(description: impl Into<String>) -> Self {
        RecipeError::AnchorNotFound(description.into())
    }
}

/// Failure of a mutation sequence on one file
#[derive(Debug, Error)]
pub enum MutateError {
    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("{}: step {step:?} failed: {source}", path.display())]
    Step {
        path: PathBuf,
        step: &'static str,
        source: RecipeError,
    },
}

impl MutateError {
    /// Render the error, with source context for syntax errors
    pub fn render(&self, source: &str) -> String {
        self.render_inner(source, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str) -> String {
        self.render_inner(source, true)
    }

    fn render_inner(&self, source: &str, color: bool) -> String {
        match self {
            MutateError::Parse { path, source: err } if color => err.render_color(source, &path.display().to_string()),
            MutateError::Parse { path, source: err } => err.render(source, &path.display().to_string()),
            other if color => format!("\x1b[1;31merror:\x1b[0m {}\n", other),
            other => format!("error: {}\n", other),
        }
    }
}

/// Invalid scaffolding options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid field {0:?}, expected \"name\" or \"name:type\"")]
    InvalidField(String),

    #[error("unknown data type {0:?}")]
    UnknownType(String),

    #[error("invalid name {0:?}")]
    InvalidName(String),

    #[error("could not read options: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Position;

    fn span(line: usize, col: usize, len: usize) -> Span {
        Span {
            start: Position { byte: 0, line, col },
            end: Position { byte: 0, line, col: col + len },
        }
    }

    #[test]
    fn test_render_points_at_column() {
        let source = "package x\n\nfunc (\n";
        let err = ParseError::new(ErrorKind::UnexpectedEof, "expected ')'", span(2, 5, 1)).with_help("close the parameter list");
        let rendered = err.render(source, "x.go");
        assert!(rendered.contains("x.go:3:6"));
        assert!(rendered.contains(" 3 | func ("));
        assert!(rendered.contains("     ^"));
        assert!(rendered.contains("help: close the parameter list"));
    }

    #[test]
    fn test_render_related_label_in_color() {
        let source = "func f() {\n\tx := 1\n";
        let err = ParseError::new(ErrorKind::UnclosedBlock, "expected '}', found ''", span(2, 0, 0))
            .with_related(span(0, 9, 1))
            .with_related_label("block opened here");
        let plain = err.render(source, "f.go");
        assert!(plain.contains("block opened here"));
        assert!(!plain.contains('\x1b'));
        let colored = err.render_color(source, "f.go");
        assert!(colored.contains("\x1b[1;31merror:\x1b[0m"));
        assert!(colored.contains("block opened here"));
    }

    #[test]
    fn test_mutate_error_render_color() {
        let err = MutateError::Step {
            path: PathBuf::from("x/blog/handler.go"),
            step: "handler cases",
            source: RecipeError::anchor("switch in \"NewHandler\""),
        };
        assert_eq!(err.render(""), "error: x/blog/handler.go: step \"handler cases\" failed: could not locate switch in \"NewHandler\"\n");
        assert!(err.render_color("").starts_with("\x1b[1;31merror:\x1b[0m x/blog/handler.go"));
    }

    #[test]
    fn test_display_includes_kind_and_location() {
        let err = ParseError::new(ErrorKind::UnexpectedToken, "expected '{'", span(0, 3, 1));
        assert_eq!(err.to_string(), "Unexpected token at 1:4: expected '{'");
    }

    #[test]
    fn test_highlight_quoted() {
        let highlighted = highlight_quoted("expected 'func' here");
        assert!(highlighted.contains("`func`"));
        assert!(highlighted.starts_with("expected "));
        assert_eq!(highlight_quoted("no quotes"), "no quotes");
    }

    #[test]
    fn test_recipe_error_messages() {
        let err: RecipeError = LookupError::FunctionNotFound("DefaultGenesis".into()).into();
        assert_eq!(err.to_string(), "could not locate function \"DefaultGenesis\"");
        assert_eq!(
            RecipeError::anchor("composite literal with desc \"valid genesis state\"").to_string(),
            "could not locate composite literal with desc \"valid genesis state\""
        );
    }
}
