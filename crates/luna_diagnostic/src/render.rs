use std::io;

use termcolor::{ColorSpec, WriteColor};
use unicode_width::UnicodeWidthStr;

use super::{Config, Diagnostic, Severity, Snippet, SnippetKind};

impl Diagnostic {
    pub fn write_to_stream(
        &self,
        source_name: &str,
        config: &Config,
        stream: &mut impl WriteColor,
    ) -> io::Result<()> {
        DiagnosticWriter {
            diagnostic: self,
            source_name,
            stream,
            config,
        }
        .draw_all()
    }
}

struct DiagnosticWriter<'stream, 'a, W: WriteColor> {
    diagnostic: &'a Diagnostic,
    source_name: &'a str,

    stream: &'stream mut W,
    config: &'a Config,
}

impl<'a, W: WriteColor> DiagnosticWriter<'_, 'a, W> {
    fn draw_all(mut self) -> io::Result<()> {
        self.draw_header()?;

        for snippet in &self.diagnostic.snippets {
            self.draw_snippet(snippet)?;
        }

        for note in &self.diagnostic.notes {
            self.stream.set_color(&self.config.emphasis)?;
            write!(self.stream, "note:")?;
            self.stream.reset()?;
            writeln!(self.stream, " {note}")?;
        }

        writeln!(self.stream)?;

        Ok(())
    }

    fn draw_header(&mut self) -> io::Result<()> {
        self.stream.set_color(self.get_primary_color())?;
        write!(self.stream, "{}:", self.diagnostic.severity.as_str())?;
        self.stream.reset()?;

        writeln!(self.stream, " {}", self.diagnostic.message)
    }

    fn draw_snippet(&mut self, snippet: &Snippet) -> io::Result<()> {
        let location = &snippet.location;
        let line_num_width = 1 + location.line_number.max(1).ilog10() as usize;

        self.stream.set_color(&self.config.subtle)?;
        writeln!(
            self.stream,
            "In {}:{}:{}",
            self.source_name,
            location.line_number,
            location.column + 1
        )?;
        self.stream.reset()?;

        self.draw_gutter(Some(location.line_number), line_num_width)?;
        writeln!(self.stream, "{}", location.line)?;

        self.draw_gutter(None, line_num_width)?;

        let before: String = location.line.chars().take(location.column).collect();
        let offset = before.width();

        let underlined: String = location
            .line
            .chars()
            .skip(location.column)
            .take(location.width)
            .collect();
        let underline_width = underlined.width().max(1);

        self.stream.set_color(self.get_snippet_color(snippet.kind))?;
        write!(self.stream, "{:<offset$}", "")?;
        for _ in 0..underline_width {
            write!(self.stream, "{}", self.config.underline)?;
        }

        if snippet.label.is_empty() {
            writeln!(self.stream)?;
        } else {
            writeln!(
                self.stream,
                "{}{}",
                self.config.underline_after, snippet.label
            )?;
        }

        self.stream.reset()
    }

    fn draw_gutter(&mut self, line: Option<usize>, line_num_width: usize) -> io::Result<()> {
        self.stream.set_color(&self.config.subtle)?;

        if let Some(line) = line {
            write!(self.stream, "{line:>line_num_width$}")?;
        } else {
            write!(self.stream, "{:>line_num_width$}", "")?;
        }

        write!(self.stream, " {} ", self.config.gutter)?;

        self.stream.reset()
    }

    fn get_primary_color(&self) -> &'a ColorSpec {
        match self.diagnostic.severity {
            Severity::Warning => &self.config.warning_color,
            Severity::Error => &self.config.error_color,
        }
    }

    fn get_snippet_color(&self, kind: SnippetKind) -> &'a ColorSpec {
        match kind {
            SnippetKind::Primary => self.get_primary_color(),
            SnippetKind::Secondary => &self.config.emphasis,
        }
    }
}

#[cfg(test)]
mod tests {
    use termcolor::NoColor;

    use crate::tests::location;
    use crate::{Config, Diagnostic, Snippet};

    #[must_use]
    fn diagnostic_to_string(diagnostic: &Diagnostic) -> String {
        let config = Config::default();
        let mut stream = NoColor::new(vec![]);

        diagnostic
            .write_to_stream("main.lu", &config, &mut stream)
            .unwrap();

        String::from_utf8(stream.into_inner()).unwrap()
    }

    #[test]
    fn snippet_with_gutter() {
        let diagnostic = Diagnostic::error()
            .with_message("Could not resolve y")
            .with_snippet(Snippet::primary(
                "not found in this scope",
                location("    return y", 12, 11, 1),
            ));

        let rendered = diagnostic_to_string(&diagnostic);
        assert!(rendered.ends_with("scope\n\n"));

        insta::assert_snapshot!(rendered.trim_end(), @r###"
        Error: Could not resolve y
        In main.lu:12:12
        12 │     return y
           │            ^ not found in this scope
        "###);
    }

    #[test]
    fn wide_characters_shift_the_underline() {
        let diagnostic = Diagnostic::warning()
            .with_message("wide")
            .with_snippet(Snippet::secondary("", location("\"日本\" x", 1, 5, 1)))
            .with_note("east asian characters take two columns");

        let rendered = diagnostic_to_string(&diagnostic);
        let underline = rendered.lines().nth(3).unwrap();

        assert_eq!(underline, "  │        ^");
        assert!(rendered.contains("note: east asian characters take two columns"));
    }
}
