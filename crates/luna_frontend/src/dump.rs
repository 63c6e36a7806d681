use crate::ast::*;

const INDENT: &str = "  ";

impl SyntaxTree {
    /// Renders the tree one node per line, children indented under their parent.
    pub fn dump(&self) -> String {
        let mut dumper = TreeDumper {
            output: String::new(),
        };

        dumper.node(0, &format!("SyntaxTree {}", self.module_name));
        for ty in &self.types {
            dumper.type_decl(1, ty);
        }

        dumper.output
    }
}

struct TreeDumper {
    output: String,
}

impl TreeDumper {
    fn type_decl(&mut self, depth: usize, ty: &TypeDeclaration) {
        self.node(depth, &format!("TypeDeclaration {}", ty.name.text));

        for func in &ty.functions {
            self.function_decl(depth + 1, func);
        }
    }

    fn function_decl(&mut self, depth: usize, func: &FunctionDeclaration) {
        let args = func
            .args
            .iter()
            .map(|arg| format!("{}: {}", arg.name.text, arg.ty.text))
            .collect::<Vec<_>>()
            .join(", ");

        let modifier = if func.is_static { "static " } else { "" };
        let ret = match &func.return_type {
            Some(ty) => format!(": {}", ty.text),
            None => String::new(),
        };

        self.node(
            depth,
            &format!("FunctionDeclaration {modifier}{}({args}){ret}", func.name.text),
        );
        self.statements(depth + 1, &func.statements);
    }

    fn statements(&mut self, depth: usize, statements: &[Stmt]) {
        for stmt in statements {
            self.stmt(depth, stmt);
        }
    }

    fn stmt(&mut self, depth: usize, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration {
                is_mutable,
                name,
                initializer,
            } => {
                let keyword = if *is_mutable { "var" } else { "let" };
                self.node(depth, &format!("Declaration {keyword} {}", name.text));

                if let Some(initializer) = initializer {
                    self.expr(depth + 1, initializer);
                }
            }

            Stmt::Return { value, .. } => {
                self.node(depth, "Return");

                if let Some(value) = value {
                    self.expr(depth + 1, value);
                }
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.node(depth, "If");
                self.expr(depth + 1, condition);

                self.node(depth + 1, "Then");
                self.statements(depth + 2, then_branch);

                if !else_branch.is_empty() {
                    self.node(depth + 1, "Else");
                    self.statements(depth + 2, else_branch);
                }
            }

            Stmt::ExprOrAssign { chain, value } => {
                let label = if value.is_some() { "Assign" } else { "ExprStatement" };
                self.node(depth, label);

                self.chain(depth + 1, chain);
                if let Some(value) = value {
                    self.expr(depth + 1, value);
                }
            }
        }
    }

    fn expr(&mut self, depth: usize, expr: &Expr) {
        match expr {
            Expr::BinOp { op, lhs, rhs, .. } => {
                self.node(depth, &format!("BinOp {}", op.as_str()));
                self.expr(depth + 1, lhs);
                self.expr(depth + 1, rhs);
            }

            Expr::Parenthesized(inner) => {
                self.node(depth, "Parenthesized");
                self.expr(depth + 1, inner);
            }

            Expr::Literal(token) => {
                self.node(depth, &format!("Literal {} {:?}", token.kind, token.text));
            }

            Expr::Chain(chain) => self.chain(depth, chain),
        }
    }

    fn chain(&mut self, depth: usize, chain: &VarOrCallChain) {
        self.node(depth, "Chain");

        for segment in &chain.segments {
            match &segment.args {
                None => self.node(depth + 1, &format!("Access {}", segment.name.text)),
                Some(args) => {
                    self.node(depth + 1, &format!("Call {}", segment.name.text));
                    for arg in args {
                        self.expr(depth + 2, arg);
                    }
                }
            }
        }
    }

    fn node(&mut self, depth: usize, line: &str) {
        for _ in 0..depth {
            self.output.push_str(INDENT);
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}
