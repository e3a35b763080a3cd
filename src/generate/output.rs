/// Output buffer that accumulates generated code line by line
pub struct Output {
    lines: Vec<String>,
    current_line: String,
    indent: usize,
    unit: &'static str,
}

impl Output {
    /// Buffer indenting with `unit` per level
    pub fn new(unit: &'static str) -> Self {
        Self {
            lines: Vec::new(),
            current_line: String::new(),
            indent: 0,
            unit,
        }
    }

    /// Add text, indenting first when the line is fresh
    pub fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.current_line.is_empty() {
            self.current_line.push_str(&self.unit.repeat(self.indent));
        }
        self.current_line.push_str(text);
    }

    /// End the current line
    pub fn newline(&mut self) {
        let line = std::mem::take(&mut self.current_line);
        self.lines.push(line.trim_end().to_string());
    }

    /// End the current line unless it is still empty
    pub fn ensure_newline(&mut self) {
        if !self.current_line.is_empty() {
            self.newline();
        }
    }

    /// Separate what follows by one empty line, never more
    pub fn blank_line(&mut self) {
        self.ensure_newline();
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Run `f` one level deeper
    pub fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent();
        f(self);
        self.dedent();
    }

    /// Finish and return the generated code, ending in exactly one newline
    pub fn finish(mut self) -> String {
        self.ensure_newline();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        let mut code = self.lines.join("\n");
        code.push('\n');
        code
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new("\t")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_applies_once_per_line() {
        let mut out = Output::new("  ");
        out.push("message A {");
        out.newline();
        out.indented(|out| {
            out.push("string a");
            out.push(" = 1;");
            out.newline();
        });
        out.push("}");
        assert_eq!(out.finish(), "message A {\n  string a = 1;\n}\n");
    }

    #[test]
    fn test_blank_line_collapses() {
        let mut out = Output::default();
        out.push("a");
        out.blank_line();
        out.blank_line();
        out.push("b");
        out.blank_line();
        assert_eq!(out.finish(), "a\n\nb\n");
    }

    #[test]
    fn test_blank_line_at_start_is_skipped() {
        let mut out = Output::default();
        out.blank_line();
        out.push("x");
        assert_eq!(out.finish(), "x\n");
    }
}
