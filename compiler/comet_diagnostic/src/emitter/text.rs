//! Plain-text emitter.
//!
//! ```text
//! src/main.cm:2:9: error[E6001]: division by zero
//!   --> src/main.cm:2:13: divisor evaluates to zero
//!   = note: ...
//! ```

use std::io::{self, Write};

use crate::{Diagnostic, Label, SourceMap};

use super::DiagnosticEmitter;

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Writes diagnostics as `path:line:col: severity[CODE]: message` lines.
pub struct TextEmitter<'s, W: Write> {
    writer: W,
    sources: &'s SourceMap,
}

impl<'s, W: Write> TextEmitter<'s, W> {
    pub fn new(writer: W, sources: &'s SourceMap) -> Self {
        TextEmitter { writer, sources }
    }

    /// Recover the writer, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn location(&self, label: &Label) -> Option<String> {
        label
            .file
            .map(|file| self.sources.describe(file, label.span.start))
    }
}

impl<'s> TextEmitter<'s, io::Stderr> {
    pub fn stderr(sources: &'s SourceMap) -> Self {
        Self::new(io::stderr(), sources)
    }
}

impl<W: Write> DiagnosticEmitter for TextEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let primary = diagnostic.primary_label();
        if let Some(location) = primary.and_then(|label| self.location(label)) {
            let _ = write!(self.writer, "{location}: ");
        }
        let _ = writeln!(
            self.writer,
            "{}[{}]: {}",
            diagnostic.severity, diagnostic.code, diagnostic.message
        );

        for label in &diagnostic.labels {
            if label.message.is_empty() {
                continue;
            }
            let marker = if label.is_primary { "-->" } else { ":::" };
            match self.location(label) {
                Some(location) => {
                    let _ = writeln!(self.writer, "  {marker} {location}: {}", label.message);
                }
                None => {
                    let _ = writeln!(self.writer, "  {marker} {}", label.message);
                }
            }
        }

        for note in &diagnostic.notes {
            let _ = writeln!(self.writer, "  = note: {note}");
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            let _ = writeln!(
                self.writer,
                "error: comptime evaluation failed with {error_count} error{}; {warning_count} warning{} emitted",
                plural_s(error_count),
                plural_s(warning_count)
            );
        } else if warning_count > 0 {
            let _ = writeln!(
                self.writer,
                "warning: {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}
