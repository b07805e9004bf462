//! Indentation-aware text printer shared by the emitters.

/// Accumulates generated source text.
///
/// Lines are started with [`print_on_newline`](Self::print_on_newline),
/// which writes the current indentation; nested blocks are opened with
/// [`within_block`](Self::within_block).
#[derive(Debug)]
pub struct CodePrinter {
    output: String,
    indent_width: usize,
    indent_level: usize,
    start_of_indent_level: bool,
}

impl Default for CodePrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodePrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_width: 2,
            indent_level: 0,
            start_of_indent_level: false,
        }
    }

    /// Appends text to the current line.
    pub fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Ends the current line. Nothing is written into an empty output.
    pub fn print_newline(&mut self) {
        if !self.output.is_empty() {
            self.output.push('\n');
            self.start_of_indent_level = false;
        }
    }

    /// Separates declarations with a blank line, except directly after a
    /// block was opened.
    pub fn print_newline_if_needed(&mut self) {
        if !self.start_of_indent_level {
            self.print_newline();
        }
    }

    /// Starts a new indented line holding `text`. Empty text is ignored.
    pub fn print_on_newline(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.print_newline();
        self.print_indent();
        self.print(text);
    }

    pub fn print_indent(&mut self) {
        let width = self.indent_level * self.indent_width;
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    /// Runs `f` one indentation level deeper.
    pub fn with_indent(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent_level += 1;
        self.start_of_indent_level = true;
        f(self);
        self.indent_level -= 1;
    }

    /// Prints `open`, runs `f` indented and closes the block on its own
    /// line.
    pub fn within_block(&mut self, open: &str, close: &str, f: impl FnOnce(&mut Self)) {
        self.print(open);
        self.with_indent(f);
        self.print_on_newline(close);
    }

    /// Prints `{ ... }` after the current text.
    pub fn within_braces(&mut self, f: impl FnOnce(&mut Self)) {
        self.within_block(" {", "}", f);
    }

    /// Returns the output, terminated by a single newline.
    pub fn finish(mut self) -> String {
        while self.output.ends_with('\n') {
            self.output.pop();
        }
        self.output.push('\n');
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_indented() {
        let mut printer = CodePrinter::new();
        printer.print("struct Data");
        printer.within_braces(|p| {
            p.print_on_newline("let a: Int");
            p.print_on_newline("struct Inner");
            p.within_braces(|p| p.print_on_newline("let b: String"));
        });

        insta::assert_snapshot!(printer.finish(), @r###"
        struct Data {
          let a: Int
          struct Inner {
            let b: String
          }
        }
        "###);
    }

    #[test]
    fn test_newline_if_needed() {
        let mut printer = CodePrinter::new();
        printer.print("enum A");
        printer.within_braces(|p| {
            p.print_newline_if_needed();
            p.print_on_newline("case a");
            p.print_newline_if_needed();
            p.print_on_newline("case b");
        });

        assert_eq!(printer.finish(), "enum A {\n  case a\n\n  case b\n}\n");
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut printer = CodePrinter::new();
        printer.print_newline();
        printer.print_on_newline("");
        printer.print_on_newline("a");
        assert_eq!(printer.finish(), "a\n");
    }
}
