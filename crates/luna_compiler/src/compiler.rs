use clap::ValueEnum;
use luna_diagnostic::{DiagnosticEmitter, IntoDiagnostic, Severity};

use crate::{CompilerError, CompilerResult};

/// How far to run the pipeline, and what to print at the end of it.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    /// One line per token.
    Tokens,
    /// The syntax tree.
    Syntax,
    /// The checked module.
    Module,
    /// Generated C++.
    #[default]
    Cpp,
}

pub struct Compiler<D: DiagnosticEmitter> {
    pub diagnostics: D,
}

impl<D: DiagnosticEmitter> Compiler<D> {
    pub fn new(diagnostics: D) -> Self {
        Self { diagnostics }
    }

    pub fn compile_source(&mut self, name: &str, source: &str) -> CompilerResult<String> {
        self.emit(name, source, Emit::Cpp)
    }

    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn emit(&mut self, name: &str, source: &str, emit: Emit) -> CompilerResult<String> {
        if emit == Emit::Tokens {
            let tokens = self.check(name, luna_frontend::lex(source))?;

            let output = tokens.iter().map(|token| format!("{token:?}\n")).collect();
            return Ok(output);
        }

        let module_name = module_name(name);
        let tree = self.check(name, luna_frontend::parse(module_name, source))?;
        if emit == Emit::Syntax {
            return Ok(tree.dump());
        }

        let compilation = self.check(name, luna_middle::compile(&tree))?;
        self.report(name, compilation.errors)?;
        if emit == Emit::Module {
            return Ok(compilation.module.dump());
        }

        Ok(luna_backend::generate(&compilation.module)?)
    }

    /// Reports the error of a stage that can't continue past it.
    fn check<T, E: IntoDiagnostic>(
        &mut self,
        name: &str,
        result: Result<T, E>,
    ) -> CompilerResult<T> {
        result.map_err(|error| {
            self.diagnostics.emit_diagnostic(error.into_diagnostic(), name);
            CompilerError::HadErrors
        })
    }

    fn report<I: IntoIterator>(&mut self, name: &str, diagnostics: I) -> CompilerResult<()>
    where
        I::Item: IntoDiagnostic,
    {
        let mut had_errors = false;

        for diagnostic in diagnostics {
            let diagnostic = diagnostic.into_diagnostic();
            had_errors |= diagnostic.severity >= Severity::Error;
            self.diagnostics.emit_diagnostic(diagnostic, name);
        }

        if had_errors {
            Err(CompilerError::HadErrors)
        } else {
            Ok(())
        }
    }
}

/// The file stem of `name`, which is how the module is known.
fn module_name(name: &str) -> &str {
    std::path::Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}
