use luna_ir::module::*;

pub(crate) const PRELUDE: &str = "\
#include <cstdio>
#include <cstdarg>

class Console {
public:
    static void writeLine(const char* msg, ...) {
        va_list args;
        va_start(args, msg);
        vfprintf(stdout, msg, args);
        va_end(args);
        fprintf(stdout, \"\\n\");
    }
};
";

pub struct CodeGenerator<'m> {
    module: &'m Module,
    output: String,
}

impl<'m> CodeGenerator<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            module,
            output: String::new(),
        }
    }

    pub fn run(mut self, entry_point: FuncId) -> String {
        let module = self.module;

        self.output.push_str(PRELUDE);

        // Classes only hold prototypes so that any function can call any
        // other, whatever order the types were declared in.
        for &ty in &module.types {
            self.push_line(0, "");
            self.gen_class(ty);
        }

        for func in module.user_funcs() {
            self.push_line(0, "");
            self.gen_func_def(func);
        }

        self.push_line(0, "");
        self.gen_main(entry_point);

        self.output
    }

    fn gen_class(&mut self, ty: TypeId) {
        let module = self.module;
        let ty = &module.symbols.types[ty];

        self.push_line(0, format!("class {} {{", ty.name));
        self.push_line(0, "public:");

        for &func in &ty.functions {
            let func = &module.symbols.funcs[func];
            let prototype = format!(
                "{}{} {}({});",
                if func.is_static { "static " } else { "" },
                self.return_type(func),
                func.name,
                self.params(func),
            );
            self.push_line(1, prototype);
        }

        self.push_line(0, "};");
    }

    fn gen_func_def(&mut self, func: FuncId) {
        let module = self.module;
        let func = &module.symbols.funcs[func];

        self.push_line(
            0,
            format!(
                "{} {}::{}({}) {{",
                self.return_type(func),
                module.type_name(func.owner),
                func.name,
                self.params(func),
            ),
        );
        self.gen_block(1, &func.statements);
        self.push_line(0, "}");
    }

    fn gen_main(&mut self, entry_point: FuncId) {
        let module = self.module;
        let func = &module.symbols.funcs[entry_point];
        let call = format!("{}::{}()", module.type_name(func.owner), func.name);

        let returns_int = func
            .ret_ty
            .is_some_and(|ty| module.symbols.types[ty].builtin == Some(BuiltinType::Int));

        self.push_line(0, "int main() {");
        if returns_int {
            self.push_line(1, format!("return {call};"));
        } else {
            self.push_line(1, format!("{call};"));
            self.push_line(1, "return 0;");
        }
        self.push_line(0, "}");
    }

    fn gen_block(&mut self, indent: u8, statements: &[Stmt]) {
        for stmt in statements {
            self.gen_stmt(indent, stmt);
        }
    }

    fn gen_stmt(&mut self, indent: u8, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration(local) => {
                let module = self.module;
                let local = &module.symbols.locals[*local];

                // `let` is enforced by the checker, so no `const` here
                let line = match &local.initializer {
                    Some(init) => format!(
                        "{} {} = {};",
                        self.type_name(local.ty),
                        local.name,
                        self.gen_expr(init)
                    ),
                    None => format!("{} {};", self.type_name(local.ty), local.name),
                };
                self.push_line(indent, line);
            }

            Stmt::Return(None) => self.push_line(indent, "return;"),
            Stmt::Return(Some(value)) => {
                let line = format!("return {};", self.gen_expr(value));
                self.push_line(indent, line);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let line = format!("if ({}) {{", self.gen_expr(condition));
                self.push_line(indent, line);
                self.gen_block(indent + 1, then_branch);

                if !else_branch.is_empty() {
                    self.push_line(indent, "} else {");
                    self.gen_block(indent + 1, else_branch);
                }

                self.push_line(indent, "}");
            }

            Stmt::ExprOrAssign { chain, value } => {
                let line = match value {
                    Some(value) => {
                        format!("{} = {};", self.gen_chain(chain), self.gen_expr(value))
                    }
                    None => format!("{};", self.gen_chain(chain)),
                };
                self.push_line(indent, line);
            }
        }
    }

    fn gen_expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::BinOp { op, lhs, rhs } => {
                let (lhs, rhs) = (self.gen_expr(lhs), self.gen_expr(rhs));
                format!("{lhs} {} {rhs}", op.as_str())
            }
            ExprKind::Parenthesized(inner) => format!("({})", self.gen_expr(inner)),
            ExprKind::Literal(Literal::Int(n)) => n.clone(),
            // the body is emitted verbatim, so C++ escapes pass straight through
            ExprKind::Literal(Literal::Str(s)) => format!("\"{s}\""),
            ExprKind::Chain(chain) => self.gen_chain(chain),
        }
    }

    fn gen_chain(&self, chain: &Chain) -> String {
        chain
            .segments
            .iter()
            .map(|segment| self.gen_segment(segment))
            .collect()
    }

    fn gen_segment(&self, segment: &Segment) -> String {
        let name = self.module.symbol_name(segment.symbol);

        match (segment.symbol, &segment.args) {
            (Symbol::Func(func), Some(args)) => {
                let owner = self.module.symbols.funcs[func].owner;
                let args = args
                    .iter()
                    .map(|arg| self.gen_expr(arg))
                    .collect::<Vec<_>>()
                    .join(", ");

                format!("{}::{name}({args})", self.module.type_name(owner))
            }
            _ => name.to_owned(),
        }
    }

    fn params(&self, func: &Function) -> String {
        func.args
            .iter()
            .map(|arg| format!("{} {}", self.type_name(arg.ty), arg.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn return_type(&self, func: &Function) -> &'m str {
        func.ret_ty.map_or("void", |ty| self.type_name(ty))
    }

    fn type_name(&self, ty: TypeId) -> &'m str {
        let module = self.module;
        let ty = &module.symbols.types[ty];

        match ty.builtin {
            Some(BuiltinType::Int) => "int",
            Some(BuiltinType::String) => "const char*",
            Some(BuiltinType::Bool) => "bool",
            Some(BuiltinType::Console) | None => &ty.name,
        }
    }

    fn push_line(&mut self, indent: u8, s: impl AsRef<str>) {
        const INDENT: &str = "    ";

        for _ in 0..indent {
            self.output.push_str(INDENT);
        }

        self.output.push_str(s.as_ref());
        self.output.push('\n');
    }
}
