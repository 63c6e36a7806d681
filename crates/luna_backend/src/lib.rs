//! Lowers a checked module to a single C++ translation unit.

mod cpp;

#[cfg(test)]
mod tests;

use luna_diagnostic::{Diagnostic, IntoDiagnostic};
use luna_ir::module::Module;
use luna_middle::entry_point::{find_entry_point, EntryPointError};

use cpp::CodeGenerator;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error(transparent)]
    EntryPoint(#[from] EntryPointError),
}

pub type CodegenResult<T> = Result<T, CodegenError>;

impl IntoDiagnostic for CodegenError {
    fn into_diagnostic(self) -> Diagnostic {
        match self {
            CodegenError::EntryPoint(error) => error.into_diagnostic(),
        }
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(module = %module.name))]
pub fn generate(module: &Module) -> CodegenResult<String> {
    let entry_point = find_entry_point(module)?;

    let output = CodeGenerator::new(module).run(entry_point);
    tracing::debug!(bytes = output.len(), "generated C++");

    Ok(output)
}
