use luna_utils::keyvec::KeyVec;

use crate::{BinOp, Node, NodeCopy};

luna_utils::declare_key_type! {
    pub struct TypeId;
}

luna_utils::declare_key_type! {
    pub struct FuncId;
}

luna_utils::declare_key_type! {
    pub struct LocalId;
}

#[derive(Node!, Default)]
pub struct Symbols {
    pub types: KeyVec<TypeId, Type>,
    pub funcs: KeyVec<FuncId, Function>,
    pub locals: KeyVec<LocalId, Local>,
}

/// One compilation unit. `types` lists the user-declared types in declaration
/// order; the built-in types only live in `symbols`.
#[derive(Node!)]
pub struct Module {
    pub name: String,
    pub types: Vec<TypeId>,
    pub symbols: Symbols,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: vec![],
            symbols: Symbols::default(),
        }
    }

    pub fn type_name(&self, ty: TypeId) -> &str {
        &self.symbols.types[ty].name
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Local(local) => &self.symbols.locals[local].name,
            Symbol::Arg { func, index } => &self.symbols.funcs[func].args[index].name,
            Symbol::Func(func) => &self.symbols.funcs[func].name,
        }
    }

    /// Functions of the user types, in declaration order.
    pub fn user_funcs(&self) -> impl Iterator<Item = FuncId> + '_ {
        self.types
            .iter()
            .flat_map(|&ty| self.symbols.types[ty].functions.iter().copied())
    }
}

#[derive(Node!)]
pub struct Type {
    pub name: String,
    pub builtin: Option<BuiltinType>,
    pub functions: Vec<FuncId>,
}

impl Type {
    pub fn lookup_function(&self, name: &str, funcs: &KeyVec<FuncId, Function>) -> Option<FuncId> {
        self.functions
            .iter()
            .copied()
            .find(|&func| funcs[func].name == name)
    }
}

#[derive(NodeCopy!, PartialOrd, Ord)]
pub enum BuiltinType {
    Int,
    String,
    Bool,
    Console,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 4] = [
        BuiltinType::Int,
        BuiltinType::String,
        BuiltinType::Bool,
        BuiltinType::Console,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Int => "int",
            BuiltinType::String => "string",
            BuiltinType::Bool => "bool",
            BuiltinType::Console => "Console",
        }
    }
}

#[derive(Node!)]
pub struct Function {
    pub owner: TypeId,
    pub is_static: bool,
    pub name: String,

    pub args: Vec<FunctionArg>,
    /// Accepts any number of extra arguments after `args`.
    pub variadic: bool,
    pub ret_ty: Option<TypeId>,

    pub statements: Vec<Stmt>,
}

#[derive(Node!)]
pub struct FunctionArg {
    pub name: String,
    pub ty: TypeId,
}

/// A declared local. Referenced both by its `Stmt::Declaration` and by every
/// expression that reads or assigns it.
#[derive(Node!)]
pub struct Local {
    pub name: String,
    pub ty: TypeId,
    pub is_mutable: bool,
    pub initializer: Option<Expr>,
}

#[derive(NodeCopy!)]
pub enum Symbol {
    Local(LocalId),
    Arg { func: FuncId, index: usize },
    Func(FuncId),
}

#[derive(Node!)]
pub enum Stmt {
    Declaration(LocalId),
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    ExprOrAssign {
        chain: Chain,
        value: Option<Expr>,
    },
}

#[derive(Node!)]
pub struct Expr {
    pub kind: ExprKind,
    /// `None` only for calls to functions without a return type.
    pub ty: Option<TypeId>,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Option<TypeId>) -> Self {
        Self { kind, ty }
    }
}

#[derive(Node!)]
pub enum ExprKind {
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Parenthesized(Box<Expr>),
    Literal(Literal),
    Chain(Chain),
}

#[derive(Node!)]
pub enum Literal {
    Int(String),
    Str(String),
}

#[derive(Node!)]
pub struct Chain {
    pub segments: Vec<Segment>,
}

impl Chain {
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }
}

/// `args` is `Some` for a call, even an empty one, and `None` for a plain access.
#[derive(Node!)]
pub struct Segment {
    pub symbol: Symbol,
    pub args: Option<Vec<Expr>>,
}
