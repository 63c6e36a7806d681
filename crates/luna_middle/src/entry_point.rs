use luna_diagnostic::{Diagnostic, IntoDiagnostic};
use luna_ir::module::{FuncId, Module};

pub const ENTRY_POINT: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryPointError {
    #[error("Could not find entry point 'main'")]
    Missing,
}

impl IntoDiagnostic for EntryPointError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error().with_message(self.to_string())
    }
}

/// The first function called `main`, scanning user types in declaration order.
pub fn find_entry_point(module: &Module) -> Result<FuncId, EntryPointError> {
    module
        .user_funcs()
        .find(|&func| module.symbols.funcs[func].name == ENTRY_POINT)
        .ok_or(EntryPointError::Missing)
}
