use std::collections::HashMap;

use luna_ir::module::{BuiltinType, Function, FunctionArg, Symbols, Type, TypeId};

/// Maps type names to types. The built-in types are created up front, so they
/// take the first ids of every module.
pub struct TypeResolver {
    builtins: [TypeId; 4],
    user_types: HashMap<String, TypeId>,
}

impl TypeResolver {
    pub fn new(symbols: &mut Symbols) -> Self {
        let builtins = BuiltinType::ALL.map(|builtin| {
            symbols.types.insert(Type {
                name: builtin.name().to_owned(),
                builtin: Some(builtin),
                functions: vec![],
            })
        });

        let resolver = Self {
            builtins,
            user_types: HashMap::new(),
        };

        let console = resolver.builtin(BuiltinType::Console);
        let write_line = symbols.funcs.insert(Function {
            owner: console,
            is_static: true,
            name: "writeLine".to_owned(),
            args: vec![FunctionArg {
                name: "msg".to_owned(),
                ty: resolver.builtin(BuiltinType::String),
            }],
            variadic: true,
            ret_ty: None,
            statements: vec![],
        });
        symbols.types[console].functions.push(write_line);

        resolver
    }

    pub fn builtin(&self, builtin: BuiltinType) -> TypeId {
        self.builtins[builtin as usize]
    }

    pub fn is_builtin(name: &str) -> bool {
        BuiltinType::ALL.iter().any(|builtin| builtin.name() == name)
    }

    /// Returns the type previously registered under `name`, if any.
    pub fn register_user_type(&mut self, name: &str, ty: TypeId) -> Option<TypeId> {
        self.user_types.insert(name.to_owned(), ty)
    }

    pub fn resolve(&self, name: &str) -> Option<TypeId> {
        BuiltinType::ALL
            .into_iter()
            .find(|builtin| builtin.name() == name)
            .map(|builtin| self.builtin(builtin))
            .or_else(|| self.user_types.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use luna_ir::module::{BuiltinType, Symbols, TypeId};

    use super::TypeResolver;

    #[test]
    fn builtins_come_first() {
        let mut symbols = Symbols::default();
        let resolver = TypeResolver::new(&mut symbols);

        assert_eq!(resolver.resolve("int"), Some(TypeId(0)));
        assert_eq!(resolver.resolve("string"), Some(TypeId(1)));
        assert_eq!(resolver.resolve("bool"), Some(TypeId(2)));
        assert_eq!(resolver.resolve("Console"), Some(TypeId(3)));
        assert_eq!(resolver.resolve("Program"), None);

        let console = &symbols.types[resolver.builtin(BuiltinType::Console)];
        let write_line = &symbols.funcs[console.functions[0]];
        assert_eq!(write_line.name, "writeLine");
        assert!(write_line.variadic);
    }

    #[test]
    fn user_types_resolve_after_registration() {
        let mut symbols = Symbols::default();
        let mut resolver = TypeResolver::new(&mut symbols);

        assert_eq!(resolver.register_user_type("Program", TypeId(4)), None);
        assert_eq!(resolver.resolve("Program"), Some(TypeId(4)));
        assert_eq!(
            resolver.register_user_type("Program", TypeId(5)),
            Some(TypeId(4))
        );
    }
}
