use luna_ir::BinOp;

use crate::token::Token;
use crate::Node;

#[derive(Node!)]
pub struct SyntaxTree {
    pub module_name: String,
    pub types: Vec<TypeDeclaration>,
}

#[derive(Node!)]
pub struct TypeDeclaration {
    pub name: Token,
    pub functions: Vec<FunctionDeclaration>,
}

#[derive(Node!)]
pub struct FunctionDeclaration {
    pub name: Token,
    pub is_static: bool,
    pub args: Vec<ArgDeclaration>,
    pub return_type: Option<TypeName>,
    pub statements: Vec<Stmt>,
}

#[derive(Node!)]
pub struct ArgDeclaration {
    pub name: Token,
    pub ty: TypeName,
}

/// A type as written in a signature. Resolved during the signature pass.
pub type TypeName = Token;

#[derive(Node!)]
pub enum Stmt {
    Declaration {
        is_mutable: bool,
        name: Token,
        initializer: Option<Expr>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    If {
        keyword: Token,
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    ExprOrAssign {
        chain: VarOrCallChain,
        value: Option<Expr>,
    },
}

#[derive(Node!)]
pub enum Expr {
    BinOp {
        op: BinOp,
        op_token: Token,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Parenthesized(Box<Expr>),
    Literal(Token),
    Chain(VarOrCallChain),
}

impl Expr {
    /// The token diagnostics about this expression point at.
    pub fn first_token(&self) -> &Token {
        match self {
            Expr::BinOp { lhs, .. } => lhs.first_token(),
            Expr::Parenthesized(inner) => inner.first_token(),
            Expr::Literal(token) => token,
            Expr::Chain(chain) => chain.first_token(),
        }
    }
}

/// `a.b(c).d`. Never empty.
#[derive(Node!)]
pub struct VarOrCallChain {
    pub segments: Vec<VarOrCall>,
}

impl VarOrCallChain {
    pub fn first_token(&self) -> &Token {
        &self.segments[0].name
    }
}

/// `args` is `Some` for a call, even an empty one, and `None` for a plain access.
#[derive(Node!)]
pub struct VarOrCall {
    pub name: Token,
    pub args: Option<Vec<Expr>>,
}
