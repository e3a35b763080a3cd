pub mod go;
pub mod proto;

// Re-export Position and Span from the parser so every tree shares one span type
pub use crate::parser::{Position, Span};

/// What separates a node from the one before it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Spacing {
    /// Same line (only meaningful inside inline lists)
    None,
    /// Plain line break
    #[default]
    NewLine,
    /// Line break plus one empty line
    EmptyLine,
}

/// How a bracketed element list is laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// `T{a, b}`
    #[default]
    Inline,
    /// One element per line, each followed by a comma
    Lines,
}

/// Comments and spacing attached to a statement-like node.
///
/// Leading comments keep their `//` or `/* */` markers. The trailing comment
/// is the one written after the node on its last line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decor {
    pub before: Spacing,
    pub comments: Vec<String>,
    pub trailing: Option<String>,
}

impl Decor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decor preceded by an empty line
    pub fn spaced() -> Self {
        Self { before: Spacing::EmptyLine, ..Self::default() }
    }

    /// Add a `//` line comment above the node
    pub fn with_comment(mut self, text: &str) -> Self {
        self.comments.push(line_comment(text));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before != Spacing::EmptyLine && self.comments.is_empty() && self.trailing.is_none()
    }
}

/// Turn comment text into a `//` comment unless it already is one
pub fn line_comment(text: &str) -> String {
    if text.starts_with("//") || text.starts_with("/*") {
        text.to_string()
    } else {
        format!("// {}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_adds_marker_once() {
        assert_eq!(line_comment("Set all the post"), "// Set all the post");
        assert_eq!(line_comment("// already"), "// already");
        assert_eq!(line_comment("/* block */"), "/* block */");
    }

    #[test]
    fn test_decor_with_comment() {
        let decor = Decor::spaced().with_comment("TODO: Determine the simulation weight value");
        assert_eq!(decor.before, Spacing::EmptyLine);
        assert_eq!(decor.comments, vec!["// TODO: Determine the simulation weight value"]);
        assert!(!decor.is_empty());
        assert!(Decor::new().is_empty());
    }
}
