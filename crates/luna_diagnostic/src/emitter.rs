use std::io;

use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::{Config, Diagnostic};

pub trait DiagnosticEmitter {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, source_name: &str);
}

impl DiagnosticEmitter for Vec<Diagnostic> {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, _source_name: &str) {
        self.push(diagnostic);
    }
}

/// Writes diagnostics with a gutter and colors to stderr.
pub struct PrettyDiagnosticEmitter {
    stream: StandardStream,
    config: Config,
}

impl PrettyDiagnosticEmitter {
    pub fn new(color_choice: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stderr(color_choice),
            config: Config::default(),
        }
    }
}

impl Default for PrettyDiagnosticEmitter {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

impl DiagnosticEmitter for PrettyDiagnosticEmitter {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, source_name: &str) {
        let mut stream = self.stream.lock();

        let _ = diagnostic.write_to_stream(source_name, &self.config, &mut stream);
        let _ = stream.reset();
    }
}

/// Writes each diagnostic in its plain form, one after another.
pub struct PlainDiagnosticEmitter<W: io::Write> {
    writer: W,
}

impl<W: io::Write> PlainDiagnosticEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> DiagnosticEmitter for PlainDiagnosticEmitter<W> {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, _source_name: &str) {
        let _ = writeln!(self.writer, "{}", diagnostic.to_plain_string());
    }
}
