use luna_diagnostic::{Diagnostic, IntoDiagnostic, Snippet};
use luna_frontend::ast::{FunctionDeclaration, SyntaxTree, TypeDeclaration};
use luna_frontend::token::Token;
use luna_ir::module::{FuncId, Function, FunctionArg, Module, Type, TypeId};

use crate::type_resolver::TypeResolver;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Could not resolve type {}", .0.text)]
    UnknownType(Token),

    #[error("Type {} is built in and can't be redeclared", .0.text)]
    BuiltinRedeclared(Token),

    #[error("Type with name {} already declared", .second.text)]
    DuplicateType { first: Token, second: Token },

    #[error("Function with name {} already declared on type {owner}", .second.text)]
    DuplicateFunction {
        owner: String,
        first: Token,
        second: Token,
    },

    #[error("Argument with name {} already declared", .second.text)]
    DuplicateArgument { first: Token, second: Token },
}

impl IntoDiagnostic for SignatureError {
    fn into_diagnostic(self) -> Diagnostic {
        let diagnostic = Diagnostic::error().with_message(self.to_string());

        match self {
            SignatureError::UnknownType(token) | SignatureError::BuiltinRedeclared(token) => {
                diagnostic.with_snippet(Snippet::primary("", &token))
            }

            SignatureError::DuplicateType { first, second }
            | SignatureError::DuplicateFunction { first, second, .. }
            | SignatureError::DuplicateArgument { first, second } => diagnostic
                .with_snippet(Snippet::secondary("first declared here", &first))
                .with_snippet(Snippet::primary("declared again here", &second)),
        }
    }
}

/// Declares every user type, then every function signature, so bodies can
/// refer to anything in the module regardless of order.
///
/// Returns the functions whose bodies still need compiling.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn declare_signatures<'t>(
    tree: &'t SyntaxTree,
    module: &mut Module,
    resolver: &mut TypeResolver,
) -> Result<Vec<(FuncId, &'t FunctionDeclaration)>, SignatureError> {
    let mut declared: Vec<(TypeId, &TypeDeclaration)> = vec![];

    for decl in &tree.types {
        let name = &decl.name.text;

        if TypeResolver::is_builtin(name) {
            return Err(SignatureError::BuiltinRedeclared(decl.name.clone()));
        }

        if let Some((_, first)) = declared.iter().find(|(_, first)| first.name.text == *name) {
            return Err(SignatureError::DuplicateType {
                first: first.name.clone(),
                second: decl.name.clone(),
            });
        }

        let ty = module.symbols.types.insert(Type {
            name: name.clone(),
            builtin: None,
            functions: vec![],
        });
        resolver.register_user_type(name, ty);

        module.types.push(ty);
        declared.push((ty, decl));
    }

    let mut bodies = vec![];

    for (owner, decl) in declared {
        let mut seen: Vec<&Token> = vec![];

        for func_decl in &decl.functions {
            if let Some(first) = seen.iter().find(|first| first.text == func_decl.name.text) {
                return Err(SignatureError::DuplicateFunction {
                    owner: decl.name.text.clone(),
                    first: (*first).clone(),
                    second: func_decl.name.clone(),
                });
            }
            seen.push(&func_decl.name);

            let func = declare_function(owner, func_decl, resolver)?;
            let func_id = module.symbols.funcs.insert(func);
            module.symbols.types[owner].functions.push(func_id);

            bodies.push((func_id, func_decl));
        }
    }

    tracing::debug!(
        types = module.types.len(),
        functions = bodies.len(),
        "declared signatures"
    );

    Ok(bodies)
}

fn declare_function(
    owner: TypeId,
    decl: &FunctionDeclaration,
    resolver: &TypeResolver,
) -> Result<Function, SignatureError> {
    let resolve = |token: &Token| {
        resolver
            .resolve(&token.text)
            .ok_or_else(|| SignatureError::UnknownType(token.clone()))
    };

    let mut args: Vec<FunctionArg> = vec![];
    for (i, arg) in decl.args.iter().enumerate() {
        if let Some(first) = decl.args[..i].iter().find(|first| first.name.text == arg.name.text) {
            return Err(SignatureError::DuplicateArgument {
                first: first.name.clone(),
                second: arg.name.clone(),
            });
        }

        args.push(FunctionArg {
            name: arg.name.text.clone(),
            ty: resolve(&arg.ty)?,
        });
    }

    let ret_ty = decl.return_type.as_ref().map(resolve).transpose()?;

    // there are no instances, so every function is static whether marked or not
    Ok(Function {
        owner,
        is_static: true,
        name: decl.name.text.clone(),
        args,
        variadic: false,
        ret_ty,
        statements: vec![],
    })
}
