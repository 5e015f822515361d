//! Indent-aware string builder for Solidity fragments.
//!
//! Solidity output uses 4-space indentation. Fragments are rendered at the
//! indent level of the skeleton line they replace.

const INDENT: &str = "    ";

pub struct CodeWriter {
    buf: String,
    indent_level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::at_indent(0)
    }

    /// Start writing at `level` indent steps, e.g. 1 for contract members.
    pub fn at_indent(level: usize) -> Self {
        Self {
            buf: String::with_capacity(1024),
            indent_level: level,
        }
    }

    /// Write a complete line (appends newline).
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write `text {` and increase indent (e.g. `if (cond) {`).
    pub fn block_open(&mut self, text: &str) {
        self.line(&format!("{} {{", text));
        self.indent();
    }

    /// Decrease indent and write `}`.
    pub fn block_close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Decrease indent, write `} else if (cond) {` and re-indent.
    pub fn block_else_if(&mut self, cond: &str) {
        self.dedent();
        self.line(&format!("}} else if ({}) {{", cond));
        self.indent();
    }

    /// Consume the writer and return the generated string.
    pub fn finish(self) -> String {
        self.buf
    }

    /// Like `finish`, without the final newline, for substituting into a
    /// skeleton line that already ends in one.
    pub fn finish_fragment(self) -> String {
        let mut buf = self.buf;
        while buf.ends_with('\n') {
            buf.pop();
        }
        buf
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
