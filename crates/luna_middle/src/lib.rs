//! Semantic passes: signatures first, then function bodies.

#[cfg(test)]
mod tests;

mod body;
mod signatures;

pub mod entry_point;
pub mod type_resolver;

pub use body::{SemanticError, SemanticErrorKind};
pub use signatures::SignatureError;

use luna_frontend::ast::SyntaxTree;
use luna_ir::module::Module;
use type_resolver::TypeResolver;

/// A checked module plus every error found in function bodies. Statements
/// that failed to compile are missing from the module.
#[derive(Debug)]
pub struct Compilation {
    pub module: Module,
    pub errors: Vec<SemanticError>,
}

#[tracing::instrument(level = "debug", skip_all, fields(module = %tree.module_name))]
pub fn compile(tree: &SyntaxTree) -> Result<Compilation, SignatureError> {
    let mut module = Module::new(&tree.module_name);
    let mut resolver = TypeResolver::new(&mut module.symbols);

    let bodies = signatures::declare_signatures(tree, &mut module, &mut resolver)?;
    let entry_point_error = body::check_entry_point(&module, &bodies);
    let mut errors = body::compile_bodies(&mut module, &resolver, bodies);
    errors.extend(entry_point_error);

    tracing::debug!(errors = errors.len(), "compiled module");

    Ok(Compilation { module, errors })
}
