mod emitter;
mod render;

use std::fmt;
use std::rc::Rc;

pub use emitter::{DiagnosticEmitter, PlainDiagnosticEmitter, PrettyDiagnosticEmitter};
pub use termcolor;
use termcolor::{Color, ColorSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,

    pub message: String,
    pub snippets: Vec<Snippet>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            message: String::new(),
            snippets: vec![],
            notes: vec![],
        }
    }

    pub fn warning() -> Self {
        Self::new(Severity::Warning)
    }

    pub fn error() -> Self {
        Self::new(Severity::Error)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_snippet(mut self, snippet: Snippet) -> Self {
        self.snippets.push(snippet);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Renders the message followed, for every snippet, by the source line and a
    /// caret underline. No colors, no gutter.
    pub fn to_plain_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        for snippet in &self.snippets {
            let location = &snippet.location;
            let offset = location.column;
            let underline = "^".repeat(location.width.max(1));

            write!(f, "\n{}\n{:offset$}{underline}", location.line, "")?;
        }

        for note in &self.notes {
            write!(f, "\nnote: {note}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub label: String,
    pub kind: SnippetKind,
    pub location: Location,
}

impl Snippet {
    pub fn new(kind: SnippetKind, label: impl Into<String>, location: impl AsLocation) -> Self {
        Self {
            label: label.into(),
            kind,
            location: location.as_location(),
        }
    }

    pub fn primary(label: impl Into<String>, location: impl AsLocation) -> Self {
        Self::new(SnippetKind::Primary, label, location)
    }

    pub fn secondary(label: impl Into<String>, location: impl AsLocation) -> Self {
        Self::new(SnippetKind::Secondary, label, location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnippetKind {
    Primary,
    Secondary,
}

/// Where a snippet points: the whole text of one source line plus the
/// character range of the offending text within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: Rc<str>,
    /// 1-based.
    pub line_number: usize,
    /// In characters, not bytes.
    pub column: usize,
    pub width: usize,
}

pub trait AsLocation {
    fn as_location(&self) -> Location;
}

impl AsLocation for Location {
    fn as_location(&self) -> Location {
        self.clone()
    }
}

impl<T: AsLocation> AsLocation for &T {
    fn as_location(&self) -> Location {
        (**self).as_location()
    }
}

/// Anything that can be reported to the user.
pub trait IntoDiagnostic {
    fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
    fn into_diagnostic(self) -> Diagnostic {
        self
    }
}

#[derive(Debug)]
pub struct Config {
    pub error_color: ColorSpec,
    pub warning_color: ColorSpec,

    pub emphasis: ColorSpec,
    pub subtle: ColorSpec,

    pub gutter: &'static str,
    pub underline: &'static str,
    pub underline_after: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        let mut error_color = ColorSpec::new();
        error_color.set_fg(Some(Color::Red));
        error_color.set_bold(true);

        let mut warning_color = ColorSpec::new();
        warning_color.set_fg(Some(Color::Yellow));
        warning_color.set_bold(true);

        let mut subtle = ColorSpec::new();
        subtle.set_italic(true);
        subtle.set_dimmed(true);

        let mut emphasis = ColorSpec::new();
        emphasis.set_bold(true);

        Self {
            error_color,
            warning_color,
            emphasis,
            subtle,

            gutter: "│",
            underline: "^",
            underline_after: " ",
        }
    }
}
