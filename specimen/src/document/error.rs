// Document error types
// YAML syntax errors with line/column info and the offending source lines

use std::fmt;

/// Syntax error raised while reading a YAML stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentError {
    /// Error message
    pub message: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Surrounding source lines, with a marker under the error column
    pub context: String,
}

impl DocumentError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            context: String::new(),
        }
    }

    /// Create context from source content
    pub fn with_source_context(mut self, source: &str, context_lines: usize) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let start = self.line.saturating_sub(context_lines + 1);
        let end = (self.line + context_lines).min(lines.len());

        let mut context = String::new();
        for (i, line) in lines.iter().enumerate().take(end).skip(start) {
            let line_num = i + 1;
            let prefix = if line_num == self.line { ">" } else { " " };
            context.push_str(&format!("{} {:4} | {}\n", prefix, line_num, line));

            if line_num == self.line && self.column > 0 {
                let indicator = " ".repeat(self.column - 1) + "^";
                context.push_str(&format!("       | {}\n", indicator));
            }
        }

        self.context = context;
        self
    }

    /// Multi-line rendering including the source excerpt
    pub fn render(&self) -> String {
        if self.context.is_empty() {
            return self.to_string();
        }
        format!("{}\n{}", self, self.context.trim_end())
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

impl std::error::Error for DocumentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_position() {
        let err = DocumentError::new("mapping values are not allowed", 2, 9);
        assert_eq!(
            err.to_string(),
            "mapping values are not allowed (line 2, column 9)"
        );
    }

    #[test]
    fn test_source_context_marks_line_and_column() {
        let source = "content:\n  - box: a: b\n  - input: {}\n";
        let err = DocumentError::new("bad", 2, 11).with_source_context(source, 1);

        assert!(err.context.contains(">    2 |   - box: a: b"));
        assert!(err.context.contains("     1 | content:"));
        assert!(err.context.contains("       |           ^"));
        assert!(err.render().starts_with("bad (line 2, column 11)\n"));
    }

    #[test]
    fn test_render_without_context() {
        let err = DocumentError::new("bad", 1, 1);
        assert_eq!(err.render(), err.to_string());
    }
}
