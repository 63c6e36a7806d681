use std::fmt::Write;

use crate::module::*;

const INDENT: &str = "  ";

impl Module {
    /// Renders the checked module in a source-like form with every local typed
    /// and every call qualified by its owner type.
    pub fn dump(&self) -> String {
        let mut dumper = Dumper {
            module: self,
            output: String::new(),
        };
        dumper.dump_module();
        dumper.output
    }
}

struct Dumper<'m> {
    module: &'m Module,
    output: String,
}

impl Dumper<'_> {
    fn dump_module(&mut self) {
        self.push_line(0, &format!("module {}", self.module.name));

        for &ty in &self.module.types {
            let ty = &self.module.symbols.types[ty];
            self.push_line(0, &format!("type {}", ty.name));

            for &func in &ty.functions {
                self.dump_function(func);
            }
        }
    }

    fn dump_function(&mut self, func_id: FuncId) {
        let func = &self.module.symbols.funcs[func_id];

        let args = func
            .args
            .iter()
            .map(|arg| format!("{}: {}", arg.name, self.module.type_name(arg.ty)))
            .collect::<Vec<_>>()
            .join(", ");

        let mut signature = format!("fun {}({args})", func.name);
        if func.is_static {
            signature.insert_str(0, "static ");
        }
        if let Some(ret_ty) = func.ret_ty {
            let _ = write!(signature, ": {}", self.module.type_name(ret_ty));
        }

        self.push_line(1, &signature);
        self.dump_block(2, &func.statements);
    }

    fn dump_block(&mut self, indent: usize, statements: &[Stmt]) {
        for stmt in statements {
            self.dump_stmt(indent, stmt);
        }
    }

    fn dump_stmt(&mut self, indent: usize, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration(local) => {
                let local = &self.module.symbols.locals[*local];
                let keyword = if local.is_mutable { "var" } else { "let" };

                let mut line = format!(
                    "{keyword} {}: {}",
                    local.name,
                    self.module.type_name(local.ty)
                );
                if let Some(initializer) = &local.initializer {
                    let _ = write!(line, " = {}", self.expr(initializer));
                }

                self.push_line(indent, &line);
            }

            Stmt::Return(None) => self.push_line(indent, "return"),
            Stmt::Return(Some(value)) => {
                let line = format!("return {}", self.expr(value));
                self.push_line(indent, &line);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let line = format!("if {}", self.expr(condition));
                self.push_line(indent, &line);
                self.dump_block(indent + 1, then_branch);

                if !else_branch.is_empty() {
                    self.push_line(indent, "else");
                    self.dump_block(indent + 1, else_branch);
                }
            }

            Stmt::ExprOrAssign { chain, value } => {
                let mut line = self.chain(chain);
                if let Some(value) = value {
                    let _ = write!(line, " = {}", self.expr(value));
                }

                self.push_line(indent, &line);
            }
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::BinOp { op, lhs, rhs } => {
                format!("{} {} {}", self.expr(lhs), op.as_str(), self.expr(rhs))
            }
            ExprKind::Parenthesized(inner) => format!("({})", self.expr(inner)),
            ExprKind::Literal(Literal::Int(n)) => n.clone(),
            ExprKind::Literal(Literal::Str(s)) => format!("{s:?}"),
            ExprKind::Chain(chain) => self.chain(chain),
        }
    }

    fn chain(&self, chain: &Chain) -> String {
        chain
            .segments
            .iter()
            .map(|segment| self.segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn segment(&self, segment: &Segment) -> String {
        let name = self.module.symbol_name(segment.symbol);

        let Some(args) = &segment.args else {
            return name.to_owned();
        };

        let args = args
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Vec<_>>()
            .join(", ");

        match segment.symbol {
            Symbol::Func(func) => {
                let owner = self.module.symbols.funcs[func].owner;
                format!("{}.{name}({args})", self.module.type_name(owner))
            }
            Symbol::Local(_) | Symbol::Arg { .. } => format!("{name}({args})"),
        }
    }

    fn push_line(&mut self, indent: usize, line: &str) {
        for _ in 0..indent {
            self.output.push_str(INDENT);
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use crate::module::*;
    use crate::BinOp;

    #[test]
    fn dump_typed_module() {
        let mut module = Module::new("main");
        let symbols = &mut module.symbols;

        let int = symbols.types.insert(Type {
            name: "int".to_owned(),
            builtin: Some(BuiltinType::Int),
            functions: vec![],
        });
        let program = symbols.types.insert(Type {
            name: "Program".to_owned(),
            builtin: None,
            functions: vec![],
        });
        module.types.push(program);

        let main = symbols.funcs.next_key();
        let x = symbols.locals.insert(Local {
            name: "x".to_owned(),
            ty: int,
            is_mutable: false,
            initializer: Some(Expr::new(
                ExprKind::Literal(Literal::Int("5".to_owned())),
                Some(int),
            )),
        });

        let read_x = Expr::new(
            ExprKind::Chain(Chain {
                segments: vec![Segment {
                    symbol: Symbol::Local(x),
                    args: None,
                }],
            }),
            Some(int),
        );
        let call_main = Expr::new(
            ExprKind::Chain(Chain {
                segments: vec![Segment {
                    symbol: Symbol::Func(main),
                    args: Some(vec![]),
                }],
            }),
            Some(int),
        );

        let _ = symbols.funcs.insert(Function {
            owner: program,
            is_static: true,
            name: "main".to_owned(),
            args: vec![],
            variadic: false,
            ret_ty: Some(int),
            statements: vec![
                Stmt::Declaration(x),
                Stmt::Return(Some(Expr::new(
                    ExprKind::BinOp {
                        op: BinOp::Sub,
                        lhs: Box::new(read_x),
                        rhs: Box::new(call_main),
                    },
                    Some(int),
                ))),
            ],
        });
        symbols.types[program].functions.push(main);

        insta::assert_snapshot!(module.dump(), @r###"
        module main
        type Program
          static fun main(): int
            let x: int = 5
            return x - Program.main()
        "###);
    }
}
