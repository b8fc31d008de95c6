//! Text buffer with indentation tracking.
//!
//! Unlike a writer with sticky state, formatting is chosen per write: every [`CodeBuffer::append`] call states whether
//! its lines are indented and whether a line terminator follows.

/// Indentation width and line terminator shared by every buffer of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub indent_width: usize,
    pub line_ending: &'static str,
}

/// Formatting of a single append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendMode {
    /// Prefix every non-empty line with the current indentation
    pub indent: bool,
    /// Terminate the text with a line ending
    pub newline: bool,
}

impl AppendMode {
    /// A complete, indented line
    pub const LINE: AppendMode = AppendMode {
        indent: true,
        newline: true,
    };
    /// Text continuing the current line
    pub const INLINE: AppendMode = AppendMode {
        indent: false,
        newline: false,
    };
    /// Indented text that the next append continues
    pub const START: AppendMode = AppendMode {
        indent: true,
        newline: false,
    };
    /// Text that finishes the current line
    pub const END: AppendMode = AppendMode {
        indent: false,
        newline: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBuffer {
    text: String,
    depth: usize,
    layout: Layout,
}

impl CodeBuffer {
    pub fn new(layout: Layout) -> Self {
        Self {
            text: String::new(),
            depth: 0,
            layout,
        }
    }

    /// A buffer whose appends start `depth` levels deep.
    pub fn with_depth(layout: Layout, depth: usize) -> Self {
        Self {
            text: String::new(),
            depth,
            layout,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Increase indentation level
    pub fn indent(&mut self) {
        self.depth += 1;
    }

    /// Decrease indentation level
    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append `text`, splitting it on line breaks.
    ///
    /// With `mode.indent`, each non-empty line is prefixed with `indent_width * depth` spaces. With `mode.newline`,
    /// one line terminator is written after the text.
    pub fn append(&mut self, text: &str, mode: AppendMode) {
        let prefix = " ".repeat(self.layout.indent_width * self.depth);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.text.push_str(self.layout.line_ending);
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if mode.indent && !line.is_empty() {
                self.text.push_str(&prefix);
            }
            self.text.push_str(line);
        }
        if mode.newline {
            self.text.push_str(self.layout.line_ending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout {
            indent_width: 4,
            line_ending: "\n",
        }
    }

    // ========================================
    // Append mode tests
    // ========================================

    #[test]
    fn test_line_is_indented_and_terminated() {
        let mut buffer = CodeBuffer::new(layout());
        buffer.indent();
        buffer.append("return;", AppendMode::LINE);
        assert_eq!(buffer.text(), "    return;\n");
    }

    #[test]
    fn test_inline_pieces_join_on_one_line() {
        let mut buffer = CodeBuffer::new(layout());
        buffer.indent();
        buffer.append("if (", AppendMode::START);
        buffer.append("x", AppendMode::INLINE);
        buffer.append(")", AppendMode::END);
        assert_eq!(buffer.text(), "    if (x)\n");
    }

    #[test]
    fn test_multiline_text_indents_every_line_but_empty_ones() {
        let mut buffer = CodeBuffer::new(layout());
        buffer.indent();
        buffer.append("a;\n\nb;", AppendMode::LINE);
        assert_eq!(buffer.text(), "    a;\n\n    b;\n");
    }

    #[test]
    fn test_crlf_text_is_normalized() {
        let mut buffer = CodeBuffer::new(Layout {
            indent_width: 2,
            line_ending: "\r\n",
        });
        buffer.indent();
        buffer.append("a;\r\nb;", AppendMode::LINE);
        assert_eq!(buffer.text(), "  a;\r\n  b;\r\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut buffer = CodeBuffer::with_depth(layout(), 1);
        buffer.dedent();
        buffer.dedent();
        assert_eq!(buffer.depth(), 0);
    }
}
