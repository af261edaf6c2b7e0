use std::fmt::Write as _;

/// Configuration for rendering syntax trees back to source.
#[derive(Debug, Clone)]
pub struct PrettyOptions {
    /// Number of spaces to indent per nesting level.
    pub indent_size: usize,
    /// Render blocks on multiple lines; single-line otherwise.
    pub multiline_blocks: bool,
    /// Append node ids as trailing comments (debugging aid).
    pub show_ids: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            multiline_blocks: true,
            show_ids: false,
        }
    }
}

impl PrettyOptions {
    pub fn compact() -> Self {
        Self {
            multiline_blocks: false,
            ..Self::default()
        }
    }
}

/// Output buffer plus indentation state shared by printers.
pub struct PrettyCtx<'a> {
    pub options: &'a PrettyOptions,
    indent: usize,
    out: String,
}

impl<'a> PrettyCtx<'a> {
    pub fn new(options: &'a PrettyOptions) -> Self {
        Self {
            options,
            indent: 0,
            out: String::new(),
        }
    }

    pub fn write(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
    }

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push(' ');
        }
    }

    /// Break the line when blocks are multiline, otherwise emit a single space.
    pub fn newline(&mut self) {
        if self.options.multiline_blocks {
            self.out.push('\n');
            self.write_indent();
        } else {
            self.out.push(' ');
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent += self.options.indent_size;
    }

    pub fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(self.options.indent_size);
    }

    pub fn with_indent<F>(&mut self, mut f_closure: F)
    where
        F: FnMut(&mut Self),
    {
        self.increase_indent();
        f_closure(self);
        self.decrease_indent();
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_char(ch: char) -> String {
    match ch {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        ch if ch.is_control() => format!("\\u{:04x}", ch as u32),
        _ => ch.to_string(),
    }
}
