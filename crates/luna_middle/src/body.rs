use std::collections::HashSet;

use luna_diagnostic::{Diagnostic, IntoDiagnostic, Snippet};
use luna_frontend::ast;
use luna_frontend::token::{Token, TokenKind};
use luna_ir::module::*;

use crate::entry_point::ENTRY_POINT;
use crate::type_resolver::TypeResolver;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub token: Option<Token>,
}

impl SemanticError {
    fn new(kind: SemanticErrorKind, token: &Token) -> Self {
        Self {
            kind,
            token: Some(token.clone()),
        }
    }
}

impl IntoDiagnostic for SemanticError {
    fn into_diagnostic(self) -> Diagnostic {
        let diagnostic = Diagnostic::error().with_message(self.kind.to_string());

        match self.token {
            Some(token) => diagnostic.with_snippet(Snippet::primary("", &token)),
            None => diagnostic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticErrorKind {
    #[error("Could not resolve {0}")]
    Unresolved(String),

    #[error("{0} is a type and can't be invoked as a function")]
    TypeInvoked(String),

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("{0} is not a variable")]
    NotAVariable(String),

    #[error("Type {ty} has no function named '{name}'")]
    NoSuchFunction { ty: String, name: String },

    #[error("Type {ty} has no field named '{name}'")]
    NoSuchField { ty: String, name: String },

    #[error("Member access expected after type {0}")]
    MemberAccessExpected(String),

    #[error("{0} has no members")]
    NoMembers(String),

    #[error("Assign operator expected")]
    AssignExpected,

    #[error("Result of calling {0} can't be assigned to")]
    AssignToCall(String),

    #[error("Variable {0} can't be modified because declared with 'let'")]
    Immutable(String),

    #[error("Argument {0} can't be modified")]
    AssignToArgument(String),

    #[error("Variable with name {0} already declared")]
    AlreadyDeclared(String),

    #[error("Could not determine type for variable {0}")]
    UnknownVariableType(String),

    #[error("Expression doesn't produce a value")]
    NoValue,

    #[error("Function must return a value of type {0}")]
    MissingReturnValue(String),

    #[error("Function doesn't return a value")]
    UnexpectedReturnValue,

    #[error("Function must return a value of type {expected}, not {found}")]
    ReturnTypeMismatch { expected: String, found: String },

    #[error("Can't assign a value of type {found} to variable {name} of type {expected}")]
    AssignTypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Entry point {0}.main can't take arguments")]
    EntryPointArguments(String),

    #[error("If condition must be of type bool, not {0}")]
    ConditionNotBool(String),

    #[error("Function {name} takes {expected} arguments, but {found} were given")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Argument {index} of {name} must be of type {expected}, not {found}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: String,
        found: String,
    },
}

pub type SemanticResult<T> = Result<T, SemanticError>;

#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn compile_bodies(
    module: &mut Module,
    resolver: &TypeResolver,
    bodies: Vec<(FuncId, &ast::FunctionDeclaration)>,
) -> Vec<SemanticError> {
    let mut errors = vec![];

    for (func, decl) in bodies {
        let mut compiler = BodyCompiler::new(&mut module.symbols, resolver, func);
        let statements = compiler.compile_block(&decl.statements);

        tracing::debug!(
            function = %decl.name.text,
            statements = statements.len(),
            errors = compiler.errors.len(),
            "compiled body"
        );

        errors.append(&mut compiler.errors);
        module.symbols.funcs[func].statements = statements;
    }

    errors
}

/// The generated `main` calls the entry point without arguments.
pub(crate) fn check_entry_point(
    module: &Module,
    bodies: &[(FuncId, &ast::FunctionDeclaration)],
) -> Option<SemanticError> {
    let (func, decl) = bodies
        .iter()
        .find(|(_, decl)| decl.name.text == ENTRY_POINT)?;

    if decl.args.is_empty() {
        return None;
    }

    let owner = module.symbols.funcs[*func].owner;
    Some(SemanticError::new(
        SemanticErrorKind::EntryPointArguments(module.type_name(owner).to_owned()),
        &decl.name,
    ))
}

struct BodyCompiler<'m> {
    symbols: &'m mut Symbols,
    resolver: &'m TypeResolver,

    func: FuncId,
    owner: TypeId,

    local_stack: Vec<LocalId>,
    /// Every argument and local name of the function, visible or not.
    declared_names: HashSet<String>,

    errors: Vec<SemanticError>,
}

impl<'m> BodyCompiler<'m> {
    fn new(symbols: &'m mut Symbols, resolver: &'m TypeResolver, func: FuncId) -> Self {
        let function = &symbols.funcs[func];
        let owner = function.owner;
        let declared_names = function.args.iter().map(|arg| arg.name.clone()).collect();

        Self {
            symbols,
            resolver,

            func,
            owner,

            local_stack: vec![],
            declared_names,

            errors: vec![],
        }
    }

    /// Compiles each statement on its own. A statement with an error is
    /// reported and left out.
    fn compile_block(&mut self, statements: &[ast::Stmt]) -> Vec<Stmt> {
        let scope = self.start_scope();

        let mut compiled = vec![];
        for stmt in statements {
            match self.compile_stmt(stmt) {
                Ok(stmt) => compiled.push(stmt),
                Err(error) => {
                    tracing::debug!(%error, "dropped statement");
                    self.errors.push(error);
                }
            }
        }

        self.end_scope(scope);

        compiled
    }

    fn compile_stmt(&mut self, stmt: &ast::Stmt) -> SemanticResult<Stmt> {
        match stmt {
            ast::Stmt::Declaration {
                is_mutable,
                name,
                initializer,
            } => {
                if self.declared_names.contains(&name.text) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::AlreadyDeclared(name.text.clone()),
                        name,
                    ));
                }

                let Some(initializer) = initializer else {
                    return Err(SemanticError::new(
                        SemanticErrorKind::UnknownVariableType(name.text.clone()),
                        name,
                    ));
                };

                let (initializer, ty) = self.compile_value(initializer)?;

                let local = self.declare_local(Local {
                    name: name.text.clone(),
                    ty,
                    is_mutable: *is_mutable,
                    initializer: Some(initializer),
                });

                Ok(Stmt::Declaration(local))
            }

            ast::Stmt::Return { keyword, value } => {
                let ret_ty = self.symbols.funcs[self.func].ret_ty;

                match (ret_ty, value) {
                    (None, None) => Ok(Stmt::Return(None)),

                    (Some(expected), None) => Err(SemanticError::new(
                        SemanticErrorKind::MissingReturnValue(self.type_name(expected)),
                        keyword,
                    )),

                    (None, Some(value)) => Err(SemanticError::new(
                        SemanticErrorKind::UnexpectedReturnValue,
                        value.first_token(),
                    )),

                    (Some(expected), Some(value)) => {
                        let (compiled, found) = self.compile_value(value)?;

                        if found != expected {
                            return Err(SemanticError::new(
                                SemanticErrorKind::ReturnTypeMismatch {
                                    expected: self.type_name(expected),
                                    found: self.type_name(found),
                                },
                                value.first_token(),
                            ));
                        }

                        Ok(Stmt::Return(Some(compiled)))
                    }
                }
            }

            ast::Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let (compiled, ty) = self.compile_value(condition)?;

                if ty != self.resolver.builtin(BuiltinType::Bool) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::ConditionNotBool(self.type_name(ty)),
                        condition.first_token(),
                    ));
                }

                Ok(Stmt::If {
                    condition: compiled,
                    then_branch: self.compile_block(then_branch),
                    else_branch: self.compile_block(else_branch),
                })
            }

            ast::Stmt::ExprOrAssign { chain, value } => self.compile_expr_or_assign(chain, value),
        }
    }

    fn compile_expr_or_assign(
        &mut self,
        chain: &ast::VarOrCallChain,
        value: &Option<ast::Expr>,
    ) -> SemanticResult<Stmt> {
        let (compiled, _) = self.compile_chain(chain)?;

        let (Some(last), Some(last_token)) = (compiled.last(), chain.segments.last()) else {
            return Err(SemanticError::new(
                SemanticErrorKind::AssignExpected,
                chain.first_token(),
            ));
        };
        let last_token = &last_token.name;

        let Some(value) = value else {
            return match last.args {
                Some(_) => Ok(Stmt::ExprOrAssign {
                    chain: compiled,
                    value: None,
                }),
                None => Err(SemanticError::new(
                    SemanticErrorKind::AssignExpected,
                    last_token,
                )),
            };
        };

        let target = match last.symbol {
            _ if last.args.is_some() => {
                return Err(SemanticError::new(
                    SemanticErrorKind::AssignToCall(last_token.text.clone()),
                    last_token,
                ))
            }

            Symbol::Local(local) => &self.symbols.locals[local],

            Symbol::Arg { .. } | Symbol::Func(_) => {
                return Err(SemanticError::new(
                    SemanticErrorKind::AssignToArgument(last_token.text.clone()),
                    last_token,
                ))
            }
        };

        if !target.is_mutable {
            return Err(SemanticError::new(
                SemanticErrorKind::Immutable(target.name.clone()),
                last_token,
            ));
        }
        let (name, expected) = (target.name.clone(), target.ty);

        let (value_compiled, found) = self.compile_value(value)?;
        if found != expected {
            return Err(SemanticError::new(
                SemanticErrorKind::AssignTypeMismatch {
                    name,
                    expected: self.type_name(expected),
                    found: self.type_name(found),
                },
                value.first_token(),
            ));
        }

        Ok(Stmt::ExprOrAssign {
            chain: compiled,
            value: Some(value_compiled),
        })
    }

    fn compile_expr(&mut self, expr: &ast::Expr) -> SemanticResult<Expr> {
        match expr {
            ast::Expr::BinOp { op, lhs, rhs, .. } => {
                let (lhs, lhs_ty) = self.compile_value(lhs)?;
                let (rhs, _) = self.compile_value(rhs)?;

                let ty = if op.is_comparison() {
                    self.resolver.builtin(BuiltinType::Bool)
                } else {
                    lhs_ty
                };

                Ok(Expr::new(
                    ExprKind::BinOp {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    Some(ty),
                ))
            }

            ast::Expr::Parenthesized(inner) => {
                let inner = self.compile_expr(inner)?;
                let ty = inner.ty;

                Ok(Expr::new(ExprKind::Parenthesized(Box::new(inner)), ty))
            }

            ast::Expr::Literal(token) => {
                let (literal, ty) = if token.kind == TokenKind::Number {
                    (Literal::Int(token.text.clone()), BuiltinType::Int)
                } else {
                    (Literal::Str(token.text.clone()), BuiltinType::String)
                };

                Ok(Expr::new(
                    ExprKind::Literal(literal),
                    Some(self.resolver.builtin(ty)),
                ))
            }

            ast::Expr::Chain(chain) => {
                let (chain, ty) = self.compile_chain(chain)?;
                Ok(Expr::new(ExprKind::Chain(chain), ty))
            }
        }
    }

    /// Like [`Self::compile_expr`], but the expression has to produce a value.
    fn compile_value(&mut self, expr: &ast::Expr) -> SemanticResult<(Expr, TypeId)> {
        let compiled = self.compile_expr(expr)?;

        match compiled.ty {
            Some(ty) => Ok((compiled, ty)),
            None => Err(SemanticError::new(
                SemanticErrorKind::NoValue,
                expr.first_token(),
            )),
        }
    }

    /// A chain is either a single local, argument or sibling function, or a
    /// type name followed by a call to one of its functions.
    fn compile_chain(
        &mut self,
        chain: &ast::VarOrCallChain,
    ) -> SemanticResult<(Chain, Option<TypeId>)> {
        let mut segments = vec![];
        let mut ty = None;
        let mut static_owner = None;

        for (i, segment) in chain.segments.iter().enumerate() {
            let name = &segment.name;

            if i == 0 {
                if let Some(symbol) = self.lookup(&name.text) {
                    let (compiled, segment_ty) = self.compile_segment(segment, symbol)?;
                    segments.push(compiled);
                    ty = segment_ty;
                    continue;
                }

                let Some(type_id) = self.resolver.resolve(&name.text) else {
                    return Err(SemanticError::new(
                        SemanticErrorKind::Unresolved(name.text.clone()),
                        name,
                    ));
                };

                if segment.args.is_some() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::TypeInvoked(name.text.clone()),
                        name,
                    ));
                }

                if chain.segments.len() == 1 {
                    return Err(SemanticError::new(
                        SemanticErrorKind::MemberAccessExpected(name.text.clone()),
                        name,
                    ));
                }

                static_owner = Some(type_id);
                continue;
            }

            let Some(owner) = static_owner.take() else {
                let previous = &chain.segments[i - 1].name;
                return Err(SemanticError::new(
                    SemanticErrorKind::NoMembers(previous.text.clone()),
                    name,
                ));
            };

            let owner_type = &self.symbols.types[owner];

            if segment.args.is_none() {
                return Err(SemanticError::new(
                    SemanticErrorKind::NoSuchField {
                        ty: owner_type.name.clone(),
                        name: name.text.clone(),
                    },
                    name,
                ));
            }

            let Some(func) = owner_type.lookup_function(&name.text, &self.symbols.funcs) else {
                return Err(SemanticError::new(
                    SemanticErrorKind::NoSuchFunction {
                        ty: owner_type.name.clone(),
                        name: name.text.clone(),
                    },
                    name,
                ));
            };

            let (compiled, segment_ty) = self.compile_segment(segment, Symbol::Func(func))?;
            segments.push(compiled);
            ty = segment_ty;
        }

        Ok((Chain { segments }, ty))
    }

    fn compile_segment(
        &mut self,
        segment: &ast::VarOrCall,
        symbol: Symbol,
    ) -> SemanticResult<(Segment, Option<TypeId>)> {
        let name = &segment.name;

        match (&segment.args, symbol) {
            (Some(args), Symbol::Func(func)) => {
                let args = self.compile_call_args(name, func, args)?;
                let ret_ty = self.symbols.funcs[func].ret_ty;

                Ok((
                    Segment {
                        symbol,
                        args: Some(args),
                    },
                    ret_ty,
                ))
            }

            (Some(_), Symbol::Local(_) | Symbol::Arg { .. }) => Err(SemanticError::new(
                SemanticErrorKind::NotAFunction(name.text.clone()),
                name,
            )),

            (None, Symbol::Func(_)) => Err(SemanticError::new(
                SemanticErrorKind::NotAVariable(name.text.clone()),
                name,
            )),

            (None, Symbol::Local(local)) => {
                let ty = self.symbols.locals[local].ty;
                Ok((Segment { symbol, args: None }, Some(ty)))
            }

            (None, Symbol::Arg { func, index }) => {
                let ty = self.symbols.funcs[func].args[index].ty;
                Ok((Segment { symbol, args: None }, Some(ty)))
            }
        }
    }

    fn compile_call_args(
        &mut self,
        name: &Token,
        func: FuncId,
        args: &[ast::Expr],
    ) -> SemanticResult<Vec<Expr>> {
        let callee = &self.symbols.funcs[func];
        let params: Vec<TypeId> = callee.args.iter().map(|arg| arg.ty).collect();

        let count_ok = if callee.variadic {
            args.len() >= params.len()
        } else {
            args.len() == params.len()
        };

        if !count_ok {
            return Err(SemanticError::new(
                SemanticErrorKind::ArgumentCount {
                    name: callee.name.clone(),
                    expected: params.len(),
                    found: args.len(),
                },
                name,
            ));
        }

        let mut compiled = vec![];
        for (i, arg) in args.iter().enumerate() {
            let (arg_compiled, found) = self.compile_value(arg)?;

            // extra arguments of a variadic function can have any type
            if let Some(&expected) = params.get(i) {
                if found != expected {
                    return Err(SemanticError::new(
                        SemanticErrorKind::ArgumentType {
                            name: name.text.clone(),
                            index: i + 1,
                            expected: self.type_name(expected),
                            found: self.type_name(found),
                        },
                        arg.first_token(),
                    ));
                }
            }

            compiled.push(arg_compiled);
        }

        Ok(compiled)
    }

    /// Locals in visible scopes first, innermost wins, then arguments, then
    /// functions of the owner type.
    fn lookup(&self, name: &str) -> Option<Symbol> {
        if let Some(&local) = self
            .local_stack
            .iter()
            .rev()
            .find(|&&local| self.symbols.locals[local].name == name)
        {
            return Some(Symbol::Local(local));
        }

        let func = &self.symbols.funcs[self.func];
        if let Some(index) = func.args.iter().position(|arg| arg.name == name) {
            return Some(Symbol::Arg {
                func: self.func,
                index,
            });
        }

        self.symbols.types[self.owner]
            .lookup_function(name, &self.symbols.funcs)
            .map(Symbol::Func)
    }

    #[must_use]
    fn start_scope(&self) -> usize {
        self.local_stack.len()
    }

    fn end_scope(&mut self, start: usize) {
        self.local_stack.truncate(start);
    }

    #[must_use]
    fn declare_local(&mut self, local: Local) -> LocalId {
        self.declared_names.insert(local.name.clone());

        let id = self.symbols.locals.insert(local);
        self.local_stack.push(id);

        id
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.symbols.types[ty].name.clone()
    }
}
