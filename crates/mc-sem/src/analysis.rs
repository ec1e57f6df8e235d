//! Two-phase semantic analyzer (§4.3).
//!
//! Phase A registers every top-level function signature before any body is
//! checked, so forward references and mutual recursion type-check. Phase B
//! walks each function body bottom-up, reporting diagnostics and
//! continuing rather than aborting (collect-and-continue, §7).

use mc_par::{BinOp, Expr, ExternFunctionDecl, FunctionDecl, Item, Program, Stmt, UnOp};
use mc_util::Handler;

use crate::scope::{Symbol, SymbolTable};
use crate::types::Type;

struct CurrentFunction {
    name: String,
    return_type: Type,
    has_seen_return: bool,
}

/// Threads the "current function" and scope cursor explicitly, rather than
/// through module-level mutable state (SPEC_FULL §9 redesign note).
pub struct SemanticAnalyzer<'a> {
    table: SymbolTable,
    handler: &'a Handler,
    current_function: Option<CurrentFunction>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            table: SymbolTable::new(),
            handler,
            current_function: None,
        }
    }

    pub fn analyze_program(&mut self, program: &Program) {
        self.collect_signatures(program);
        for item in &program.items {
            if let Item::FunctionDecl(f) = item {
                self.analyze_function_body(f);
            }
        }
    }

    // --- Phase A ----------------------------------------------------------

    fn collect_signatures(&mut self, program: &Program) {
        for item in &program.items {
            match item {
                Item::FunctionDecl(f) => self.declare_function(&f.name, &f.params, f.return_type, f.line, f.column),
                Item::ExternFunctionDecl(f) => {
                    self.declare_extern(f)
                }
            }
        }
    }

    fn declare_extern(&mut self, f: &ExternFunctionDecl) {
        self.declare_function(&f.name, &f.params, f.return_type, f.line, f.column);
    }

    fn declare_function(&mut self, name: &str, params: &[mc_par::Param], return_type: mc_par::TypeName, line: u32, column: u32) {
        let symbol = Symbol::Function {
            name: name.to_string(),
            return_type: Type::from_ast(return_type),
            params: params.iter().map(|p| (p.name.clone(), Type::from_ast(p.ty))).collect(),
            line,
            column,
        };
        if !self.table.define(symbol) {
            self.handler.redefined_symbol(name, line, column);
        }
    }

    // --- Phase B ------------------------------------------------------------

    fn analyze_function_body(&mut self, f: &FunctionDecl) {
        let (return_type, params) = match self.table.resolve(&f.name) {
            Some(Symbol::Function { return_type, params, .. }) => (*return_type, params.clone()),
            _ => return, // name collided at phase A; nothing sound to check against
        };

        self.current_function = Some(CurrentFunction {
            name: f.name.clone(),
            return_type,
            has_seen_return: false,
        });
        self.table.enter_scope(f.name.clone());

        for (name, ty) in &params {
            self.table.define(Symbol::Variable {
                name: name.clone(),
                ty: *ty,
                line: f.line,
                column: f.column,
                is_constant: false,
                is_initialized: true,
            });
        }

        for stmt in &f.body {
            self.analyze_stmt(stmt);
        }

        let seen_return = self.current_function.as_ref().map(|c| c.has_seen_return).unwrap_or(false);
        if return_type != Type::Void && !seen_return {
            self.handler.semantic_error(
                format!("function `{}` must return a value", f.name),
                f.line,
                f.column,
            );
        }

        self.table.exit_scope();
        self.current_function = None;
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VariableDecl { name, ty, value, line, column } => {
                let declared = Type::from_ast(*ty);
                let actual = self.analyze_expr(value);
                if !actual.is_assignable_to(&declared) {
                    self.handler.type_error(&declared.to_string(), &actual.to_string(), *line, *column);
                }
                if !self.table.define(Symbol::Variable {
                    name: name.clone(),
                    ty: declared,
                    line: *line,
                    column: *column,
                    is_constant: false,
                    is_initialized: true,
                }) {
                    self.handler.redefined_symbol(name, *line, *column);
                }
            }
            Stmt::Assignment { name, value, line, column } => {
                let actual = self.analyze_expr(value);
                match self.table.resolve(name) {
                    None => self.handler.undefined_symbol(name, *line, *column),
                    Some(Symbol::Function { .. }) => self.handler.invalid_assignment(name, *line, *column),
                    Some(Symbol::Variable { ty, is_constant, .. }) => {
                        let ty = *ty;
                        if *is_constant {
                            self.handler.constant_assignment(name, *line, *column);
                        } else if !actual.is_assignable_to(&ty) {
                            // Unified on the assignability relation rather
                            // than exact equality (SPEC_FULL §9 item 4).
                            self.handler.type_error(&ty.to_string(), &actual.to_string(), *line, *column);
                        }
                        self.table.mark_initialized(name);
                    }
                }
            }
            Stmt::If { cond, then_branch, else_branch, line, column } => {
                let cond_ty = self.analyze_expr(cond);
                if cond_ty != Type::Bool && cond_ty != Type::Unknown {
                    self.handler.type_error("bool", &cond_ty.to_string(), *line, *column);
                }
                self.table.enter_scope("if");
                for s in then_branch {
                    self.analyze_stmt(s);
                }
                self.table.exit_scope();
                if let Some(else_branch) = else_branch {
                    self.table.enter_scope("else");
                    for s in else_branch {
                        self.analyze_stmt(s);
                    }
                    self.table.exit_scope();
                }
            }
            Stmt::While { cond, body, line, column } => {
                let cond_ty = self.analyze_expr(cond);
                if cond_ty != Type::Bool && cond_ty != Type::Unknown {
                    self.handler.type_error("bool", &cond_ty.to_string(), *line, *column);
                }
                self.table.enter_scope("while");
                for s in body {
                    self.analyze_stmt(s);
                }
                self.table.exit_scope();
            }
            Stmt::For { init, cond, step, body, line, column } => {
                // Accepted syntactically (§6.1); only code generation
                // refuses it (§9). Still type-checked so a program mixing
                // a `for` loop with other errors reports all of them.
                self.table.enter_scope("for");
                self.analyze_stmt(init);
                let cond_ty = self.analyze_expr(cond);
                if cond_ty != Type::Bool && cond_ty != Type::Unknown {
                    self.handler.type_error("bool", &cond_ty.to_string(), *line, *column);
                }
                self.analyze_stmt(step);
                for s in body {
                    self.analyze_stmt(s);
                }
                self.table.exit_scope();
            }
            Stmt::Return { value, line, column } => {
                let Some(current) = &mut self.current_function else {
                    self.handler.semantic_error("return outside of a function", *line, *column);
                    return;
                };
                current.has_seen_return = true;
                let return_type = current.return_type;
                match value {
                    Some(expr) => {
                        let actual = self.analyze_expr(expr);
                        if !actual.is_assignable_to(&return_type) {
                            self.handler.type_error(&return_type.to_string(), &actual.to_string(), *line, *column);
                        }
                    }
                    None => {
                        if return_type != Type::Void {
                            self.handler.semantic_error(
                                format!("expected a return value of type `{return_type}`"),
                                *line,
                                *column,
                            );
                        }
                    }
                }
            }
            Stmt::ExprStmt { expr, .. } => {
                self.analyze_expr(expr);
            }
            Stmt::Block { body, .. } => {
                self.table.enter_scope("block");
                for s in body {
                    self.analyze_stmt(s);
                }
                self.table.exit_scope();
            }
        }
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::IntLiteral { .. } => Type::I32,
            Expr::FloatLiteral { .. } => Type::F32,
            Expr::BoolLiteral { .. } => Type::Bool,
            Expr::StringLiteral { .. } => Type::String,
            Expr::Identifier { name, line, column } => match self.table.resolve(name) {
                None => {
                    self.handler.undefined_symbol(name, *line, *column);
                    Type::Unknown
                }
                Some(Symbol::Variable { ty, is_initialized, .. }) => {
                    let ty = *ty;
                    if !is_initialized {
                        self.handler.uninitialized_variable(name, *line, *column);
                    }
                    ty
                }
                Some(Symbol::Function { return_type, .. }) => *return_type,
            },
            Expr::Unary { op, operand, line, column } => {
                let ty = self.analyze_expr(operand);
                match op {
                    UnOp::Not => {
                        if ty != Type::Bool && ty != Type::Unknown {
                            self.handler.type_error("bool", &ty.to_string(), *line, *column);
                            return Type::Bool;
                        }
                        Type::Bool
                    }
                    UnOp::Neg => {
                        if !ty.is_numeric() && ty != Type::Unknown {
                            self.handler.incompatible_types(&ty.to_string(), &ty.to_string(), "-", *line, *column);
                            return Type::Unknown;
                        }
                        ty
                    }
                }
            }
            Expr::Binary { op, left, right, line, column } => {
                let lty = self.analyze_expr(left);
                let rty = self.analyze_expr(right);
                match op {
                    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                        if lty == Type::Unknown || rty == Type::Unknown {
                            return Type::Unknown;
                        }
                        if !lty.is_numeric() || !rty.is_numeric() {
                            self.handler.incompatible_types(&lty.to_string(), &rty.to_string(), &op.to_string(), *line, *column);
                            return Type::Unknown;
                        }
                        lty.widen_with(&rty)
                    }
                    BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
                        if lty != Type::Unknown && rty != Type::Unknown && !lty.is_comparable_with(&rty) {
                            self.handler.incompatible_types(&lty.to_string(), &rty.to_string(), &op.to_string(), *line, *column);
                        }
                        Type::Bool
                    }
                    BinOp::And | BinOp::Or => {
                        if (lty != Type::Bool && lty != Type::Unknown) || (rty != Type::Bool && rty != Type::Unknown) {
                            self.handler.incompatible_types(&lty.to_string(), &rty.to_string(), &op.to_string(), *line, *column);
                        }
                        Type::Bool
                    }
                }
            }
            Expr::Call { callee, args, line, column } => {
                let arg_types: Vec<Type> = args.iter().map(|a| self.analyze_expr(a)).collect();
                match self.table.resolve(callee) {
                    None => {
                        self.handler.function_not_found(callee, *line, *column);
                        Type::Unknown
                    }
                    Some(Symbol::Variable { .. }) => {
                        self.handler.function_not_found(callee, *line, *column);
                        Type::Unknown
                    }
                    Some(Symbol::Function { return_type, params, .. }) => {
                        let return_type = *return_type;
                        if params.len() != arg_types.len() {
                            self.handler.wrong_argument_count(callee, params.len(), arg_types.len(), *line, *column);
                            return return_type;
                        }
                        for (i, ((_, param_ty), arg_ty)) in params.iter().zip(arg_types.iter()).enumerate() {
                            if !arg_ty.is_assignable_to(param_ty) {
                                self.handler.type_error(
                                    &param_ty.to_string(),
                                    &arg_ty.to_string(),
                                    args[i].line(),
                                    args[i].column(),
                                );
                            }
                        }
                        return_type
                    }
                }
            }
            Expr::Cast { expr, target, line, column } => {
                let from = self.analyze_expr(expr);
                let target = Type::from_ast(*target);
                if !from.is_cast_admissible_to(&target) {
                    self.handler.incompatible_types(&from.to_string(), &target.to_string(), "as", *line, *column);
                    return Type::Unknown;
                }
                target
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_lex::Lexer;
    use mc_par::Parser;

    fn analyze(src: &str) -> Handler {
        let handler = Handler::new();
        let tokens = Lexer::new(src, &handler).tokenize();
        let program = Parser::new(tokens, &handler).parse();
        let mut analyzer = SemanticAnalyzer::new(&handler);
        analyzer.analyze_program(&program);
        handler
    }

    #[test]
    fn s1_smallest_valid_program_has_no_errors() {
        let h = analyze(": main () : i32 { return 0; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn s2_widening_on_return_is_allowed() {
        let h = analyze(": f () : i64 { return 1; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn s3_branching_abs_has_no_errors() {
        let h = analyze(": abs (x : i32) : i32 { if (x < 0) { return -x; } else { return x; } }");
        assert!(!h.has_errors());
    }

    #[test]
    fn s4_while_loop_sum_to_has_no_errors() {
        let h = analyze(
            ": sum_to (n : i32) : i32 { s : i32 = 0; i : i32 = 0; while (i < n) { s = s + i; i = i + 1; } return s; }",
        );
        assert!(!h.has_errors());
    }

    #[test]
    fn s5_undefined_symbol_on_assignment() {
        let h = analyze(": main () : void { y = 1; }");
        assert!(h.has_errors());
        assert_eq!(h.errors()[0].kind, mc_util::DiagnosticKind::UndefinedSymbol);
    }

    #[test]
    fn s6_wrong_argument_count_skips_per_arg_type_check() {
        let h = analyze(": f (x : i32) : i32 { return x; } : main () : void { f(1, 2); }");
        assert!(h.has_errors());
        assert_eq!(h.error_count(), 1);
        assert_eq!(h.errors()[0].kind, mc_util::DiagnosticKind::WrongArgumentCount);
    }

    #[test]
    fn forward_reference_to_a_later_function_type_checks() {
        let h = analyze(": f () : i32 { return g(); } : g () : i32 { return 1; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn mutual_recursion_type_checks() {
        let h = analyze(
            ": even (n : i32) : bool { return odd(n); } : odd (n : i32) : bool { return even(n); }",
        );
        assert!(!h.has_errors());
    }

    #[test]
    fn redefining_a_name_in_the_same_scope_reports_once_at_second_decl() {
        let h = analyze(": main () : i32 { x : i32 = 1; x : i32 = 2; return x; }");
        assert_eq!(h.error_count(), 1);
        assert_eq!(h.errors()[0].kind, mc_util::DiagnosticKind::RedefinedSymbol);
    }

    #[test]
    fn shadowing_an_outer_variable_in_an_inner_scope_is_allowed() {
        let h = analyze(": main () : i32 { x : i32 = 1; if (true) { x : f32 = 2.0; } return x; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn reading_uninitialized_variable_is_a_warning_not_an_error() {
        // Not directly expressible without a declare-without-init form in
        // this grammar (every `variableDecl` initializes), so this
        // exercises the same code path via a variable that is read back
        // immediately after being defined — i.e. confirms no warning fires
        // for a normal, initialized read.
        let h = analyze(": main () : i32 { x : i32 = 1; return x; }");
        assert!(!h.has_warnings());
    }

    #[test]
    fn if_condition_must_be_bool() {
        let h = analyze(": main () : void { if (1) {} }");
        assert!(h.has_errors());
        assert_eq!(h.errors()[0].kind, mc_util::DiagnosticKind::TypeError);
    }

    #[test]
    fn missing_return_in_non_void_function_is_a_semantic_error() {
        let h = analyze(": f () : i32 { }");
        assert!(h.has_errors());
        assert_eq!(h.errors()[0].kind, mc_util::DiagnosticKind::SemanticError);
    }

    #[test]
    fn void_return_with_no_expression_is_fine() {
        let h = analyze(": main () : void { return; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn void_return_with_an_expression_is_an_error() {
        let h = analyze(": main () : void { return 1; }");
        assert!(h.has_errors());
    }

    #[test]
    fn constant_cannot_be_reassigned() {
        // constants are not reachable from this grammar's `variableDecl`
        // alone (there is no `const` keyword in §6.1); exercised directly
        // against the symbol table instead in scope.rs's tests. Here we
        // confirm a plain, non-constant variable CAN be reassigned.
        let h = analyze(": main () : i32 { x : i32 = 1; x = 2; return x; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn assignment_uses_assignability_not_exact_equality() {
        let h = analyze(": main () : void { x : i64 = 1; x = 2; }");
        assert!(!h.has_errors());
    }

    #[test]
    fn print_builtin_accepts_a_string_literal() {
        let h = analyze(": main () : void { print(\"hi\"); }");
        assert!(!h.has_errors());
    }
}
