//! Recursive-descent parser with a Pratt-parsing expression core.

use mc_lex::{SpannedToken, Token};
use mc_util::Handler;

use crate::ast::*;

/// Binding powers for Pratt parsing of binary operators. Higher binds
/// tighter. Mirrors the grammar's expr production ordering (multiplicative
/// tighter than additive, tighter than comparison, tighter than logical).
mod bp {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const COMPARISON: u8 = 3;
    pub const ADDITIVE: u8 = 4;
    pub const MULTIPLICATIVE: u8 = 5;
}

fn infix_binding_power(tok: &Token) -> Option<(u8, u8, BinOp)> {
    let (bp, op) = match tok {
        Token::OrOr => (bp::OR, BinOp::Or),
        Token::AndAnd => (bp::AND, BinOp::And),
        Token::Lt => (bp::COMPARISON, BinOp::Lt),
        Token::Le => (bp::COMPARISON, BinOp::Le),
        Token::Gt => (bp::COMPARISON, BinOp::Gt),
        Token::Ge => (bp::COMPARISON, BinOp::Ge),
        Token::EqEq => (bp::COMPARISON, BinOp::Eq),
        Token::NotEq => (bp::COMPARISON, BinOp::Ne),
        Token::Plus => (bp::ADDITIVE, BinOp::Add),
        Token::Minus => (bp::ADDITIVE, BinOp::Sub),
        Token::Star => (bp::MULTIPLICATIVE, BinOp::Mul),
        Token::Slash => (bp::MULTIPLICATIVE, BinOp::Div),
        Token::Percent => (bp::MULTIPLICATIVE, BinOp::Rem),
        _ => return None,
    };
    // All binary operators here are left-associative: the right binding
    // power is one higher than the left so a run of same-precedence
    // operators nests left (`a - b - c` => `(a - b) - c`).
    Some((bp, bp + 1, op))
}

pub struct Parser<'a> {
    tokens: Vec<SpannedToken>,
    position: usize,
    handler: &'a Handler,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<SpannedToken>, handler: &'a Handler) -> Self {
        Self {
            tokens,
            position: 0,
            handler,
        }
    }

    fn current(&self) -> &SpannedToken {
        // `tokenize` always ends with an Eof token, so this never runs off
        // the end as long as callers stop advancing once they see Eof.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> SpannedToken {
        let tok = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        tok
    }

    fn check(&self, kind: &Token) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: Token, context: &str) -> SpannedToken {
        if self.check(&kind) {
            self.advance()
        } else {
            let cur = self.current().clone();
            self.handler.syntax_error(
                format!("expected `{kind}` {context}, found `{}`", cur.kind),
                cur.span.line,
                cur.span.column,
            );
            cur
        }
    }

    fn ident(&mut self) -> (String, u32, u32) {
        let tok = self.current().clone();
        if let Token::Ident(name) = tok.kind {
            self.advance();
            (name, tok.span.line, tok.span.column)
        } else {
            self.handler.syntax_error(
                format!("expected identifier, found `{}`", tok.kind),
                tok.span.line,
                tok.span.column,
            );
            self.advance();
            ("<error>".to_string(), tok.span.line, tok.span.column)
        }
    }

    fn type_name(&mut self) -> TypeName {
        let tok = self.current().clone();
        let ty = match tok.kind {
            Token::I8 => TypeName::I8,
            Token::I16 => TypeName::I16,
            Token::I32 => TypeName::I32,
            Token::I64 => TypeName::I64,
            Token::U8 => TypeName::U8,
            Token::U16 => TypeName::U16,
            Token::U32 => TypeName::U32,
            Token::U64 => TypeName::U64,
            Token::F32 => TypeName::F32,
            Token::F64 => TypeName::F64,
            Token::Bool => TypeName::Bool,
            Token::StringType => TypeName::String,
            Token::Void => TypeName::Void,
            _ => {
                self.handler.syntax_error(
                    format!("expected a type, found `{}`", tok.kind),
                    tok.span.line,
                    tok.span.column,
                );
                return TypeName::Void;
            }
        };
        self.advance();
        ty
    }

    /// Parse a whole program: `(functionDecl | externFunctionDecl)* EOF`.
    pub fn parse(mut self) -> Program {
        let mut items = Vec::new();
        while !self.check(&Token::Eof) {
            match self.parse_item() {
                Some(item) => items.push(item),
                None => {
                    // Recovery: skip to the next item boundary so one
                    // malformed declaration doesn't suppress every
                    // diagnostic after it.
                    self.recover_to_item_boundary();
                }
            }
        }
        Program { items }
    }

    fn recover_to_item_boundary(&mut self) {
        if self.check(&Token::Eof) {
            return;
        }
        self.advance();
        while !self.check(&Token::Eof) && !self.check(&Token::Colon) && !self.check(&Token::Extern) {
            self.advance();
        }
    }

    fn parse_item(&mut self) -> Option<Item> {
        match &self.current().kind {
            Token::Extern => Some(Item::ExternFunctionDecl(self.parse_extern_function_decl())),
            Token::Colon => Some(Item::FunctionDecl(self.parse_function_decl())),
            _ => {
                let cur = self.current().clone();
                self.handler.syntax_error(
                    format!("expected a function declaration, found `{}`", cur.kind),
                    cur.span.line,
                    cur.span.column,
                );
                None
            }
        }
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.check(&Token::RParen) {
            return params;
        }
        loop {
            let (name, line, column) = self.ident();
            self.eat(Token::Colon, "after parameter name");
            let ty = self.type_name();
            params.push(Param { name, ty, line, column });
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        params
    }

    fn parse_function_decl(&mut self) -> FunctionDecl {
        let start = self.current().clone();
        self.eat(Token::Colon, "to start a function declaration");
        let (name, line, column) = self.ident();
        self.eat(Token::LParen, "after function name");
        let params = self.parse_params();
        self.eat(Token::RParen, "after parameter list");
        self.eat(Token::Colon, "before return type");
        let return_type = self.type_name();
        let body = self.parse_block_stmts();
        let _ = start;
        FunctionDecl {
            name,
            params,
            return_type,
            body,
            line,
            column,
        }
    }

    fn parse_extern_function_decl(&mut self) -> ExternFunctionDecl {
        self.eat(Token::Extern, "");
        self.eat(Token::Colon, "after `extern`");
        let (name, line, column) = self.ident();
        self.eat(Token::LParen, "after function name");
        let params = self.parse_params();
        self.eat(Token::RParen, "after parameter list");
        self.eat(Token::Colon, "before return type");
        let return_type = self.type_name();
        self.eat(Token::Semicolon, "after extern declaration");
        ExternFunctionDecl {
            name,
            params,
            return_type,
            line,
            column,
        }
    }

    fn parse_block_stmts(&mut self) -> Vec<Stmt> {
        self.eat(Token::LBrace, "to start a block");
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) && !self.check(&Token::Eof) {
            stmts.push(self.parse_stmt());
        }
        self.eat(Token::RBrace, "to close a block");
        stmts
    }

    fn parse_stmt(&mut self) -> Stmt {
        match &self.current().kind {
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::For => self.parse_for(),
            Token::Return => self.parse_return(),
            Token::LBrace => {
                let tok = self.current().clone();
                let body = self.parse_block_stmts();
                Stmt::Block {
                    body,
                    line: tok.span.line,
                    column: tok.span.column,
                }
            }
            Token::Ident(_) if self.peek_is_assignment() => self.parse_assignment(),
            Token::Ident(_) if self.peek_is_var_decl() => self.parse_variable_decl(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn peek_is_assignment(&self) -> bool {
        matches!(self.tokens.get(self.position + 1), Some(t) if t.kind == Token::Assign)
    }

    fn peek_is_var_decl(&self) -> bool {
        matches!(self.tokens.get(self.position + 1), Some(t) if t.kind == Token::Colon)
    }

    fn parse_variable_decl(&mut self) -> Stmt {
        let (name, line, column) = self.ident();
        self.eat(Token::Colon, "after variable name");
        let ty = self.type_name();
        self.eat(Token::Assign, "in variable declaration");
        let value = self.parse_expr();
        self.eat(Token::Semicolon, "after variable declaration");
        Stmt::VariableDecl { name, ty, value, line, column }
    }

    fn parse_assignment(&mut self) -> Stmt {
        let (name, line, column) = self.ident();
        self.eat(Token::Assign, "in assignment");
        let value = self.parse_expr();
        self.eat(Token::Semicolon, "after assignment");
        Stmt::Assignment { name, value, line, column }
    }

    fn parse_if(&mut self) -> Stmt {
        let tok = self.advance();
        self.eat(Token::LParen, "after `if`");
        let cond = self.parse_expr();
        self.eat(Token::RParen, "after if condition");
        let then_branch = self.parse_block_stmts();
        let else_branch = if self.check(&Token::Else) {
            self.advance();
            Some(self.parse_block_stmts())
        } else {
            None
        };
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            line: tok.span.line,
            column: tok.span.column,
        }
    }

    fn parse_while(&mut self) -> Stmt {
        let tok = self.advance();
        self.eat(Token::LParen, "after `while`");
        let cond = self.parse_expr();
        self.eat(Token::RParen, "after while condition");
        let body = self.parse_block_stmts();
        Stmt::While {
            cond,
            body,
            line: tok.span.line,
            column: tok.span.column,
        }
    }

    /// `for (init; cond; step) { body }`. The grammar carries `for` in
    /// `stmt`; this parses it into a real node even though the generator
    /// later refuses to lower it (§9).
    fn parse_for(&mut self) -> Stmt {
        let tok = self.advance();
        self.eat(Token::LParen, "after `for`");
        let init = Box::new(self.parse_stmt());
        let cond = self.parse_expr();
        self.eat(Token::Semicolon, "after for-loop condition");
        let step = Box::new(self.parse_assignment_no_semicolon());
        self.eat(Token::RParen, "after for-loop clauses");
        let body = self.parse_block_stmts();
        Stmt::For {
            init,
            cond,
            step,
            body,
            line: tok.span.line,
            column: tok.span.column,
        }
    }

    fn parse_assignment_no_semicolon(&mut self) -> Stmt {
        let (name, line, column) = self.ident();
        self.eat(Token::Assign, "in for-loop step");
        let value = self.parse_expr();
        Stmt::Assignment { name, value, line, column }
    }

    fn parse_return(&mut self) -> Stmt {
        let tok = self.advance();
        let value = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.eat(Token::Semicolon, "after return statement");
        Stmt::Return {
            value,
            line: tok.span.line,
            column: tok.span.column,
        }
    }

    fn parse_expr_stmt(&mut self) -> Stmt {
        let expr = self.parse_expr();
        let (line, column) = (expr.line(), expr.column());
        self.eat(Token::Semicolon, "after expression statement");
        Stmt::ExprStmt { expr, line, column }
    }

    // --- Expressions (Pratt core) ----------------------------------------

    pub fn parse_expr(&mut self) -> Expr {
        self.parse_expr_with_min_bp(0)
    }

    fn parse_expr_with_min_bp(&mut self, min_bp: u8) -> Expr {
        let mut left = self.parse_prefix();

        loop {
            let Some((left_bp, right_bp, op)) = infix_binding_power(&self.current().kind) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            let tok = self.advance();
            let right = self.parse_expr_with_min_bp(right_bp);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line: tok.span.line,
                column: tok.span.column,
            };
        }

        left
    }

    fn parse_prefix(&mut self) -> Expr {
        let tok = self.current().clone();
        match &tok.kind {
            Token::Minus => {
                self.advance();
                let operand = self.parse_expr_with_min_bp(u8::MAX);
                Expr::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                    line: tok.span.line,
                    column: tok.span.column,
                }
            }
            Token::Bang => {
                self.advance();
                let operand = self.parse_expr_with_min_bp(u8::MAX);
                Expr::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    line: tok.span.line,
                    column: tok.span.column,
                }
            }
            Token::LParen => self.parse_paren_or_cast(),
            Token::IntLiteral(v) => {
                self.advance();
                Expr::IntLiteral { value: *v, line: tok.span.line, column: tok.span.column }
            }
            Token::FloatLiteral(v) => {
                self.advance();
                Expr::FloatLiteral { value: *v, line: tok.span.line, column: tok.span.column }
            }
            Token::BoolLiteral(v) => {
                self.advance();
                Expr::BoolLiteral { value: *v, line: tok.span.line, column: tok.span.column }
            }
            Token::StringLiteral(v) => {
                self.advance();
                Expr::StringLiteral { value: v.clone(), line: tok.span.line, column: tok.span.column }
            }
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&Token::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&Token::RParen) {
                        loop {
                            args.push(self.parse_expr());
                            if self.check(&Token::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.eat(Token::RParen, "after call arguments");
                    Expr::Call { callee: name, args, line: tok.span.line, column: tok.span.column }
                } else {
                    Expr::Identifier { name, line: tok.span.line, column: tok.span.column }
                }
            }
            _ => {
                self.handler.syntax_error(
                    format!("expected an expression, found `{}`", tok.kind),
                    tok.span.line,
                    tok.span.column,
                );
                self.advance();
                Expr::IntLiteral { value: 0, line: tok.span.line, column: tok.span.column }
            }
        }
    }

    /// Either `( expr )` or the cast form `( expr as : T )`.
    fn parse_paren_or_cast(&mut self) -> Expr {
        let tok = self.advance(); // '('
        let inner = self.parse_expr();
        if self.check(&Token::As) {
            self.advance();
            self.eat(Token::Colon, "after `as`");
            let target = self.type_name();
            self.eat(Token::RParen, "after cast");
            Expr::Cast {
                expr: Box::new(inner),
                target,
                line: tok.span.line,
                column: tok.span.column,
            }
        } else {
            self.eat(Token::RParen, "after parenthesized expression");
            inner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_lex::Lexer;

    fn parse(src: &str) -> (Program, Handler) {
        let handler = Handler::new();
        let tokens = Lexer::new(src, &handler).tokenize();
        let program = Parser::new(tokens, &handler).parse();
        (program, handler)
    }

    #[test]
    fn parses_smallest_valid_program() {
        let (program, handler) = parse(": main () : i32 { return 0; }");
        assert!(!handler.has_errors());
        assert_eq!(program.items.len(), 1);
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        assert_eq!(f.name, "main");
        assert_eq!(f.return_type, TypeName::I32);
        assert_eq!(f.body.len(), 1);
    }

    #[test]
    fn parses_extern_decl() {
        let (program, handler) = parse("extern : puts (s : string) : void;");
        assert!(!handler.has_errors());
        let Item::ExternFunctionDecl(f) = &program.items[0] else { panic!() };
        assert_eq!(f.name, "puts");
        assert_eq!(f.params[0].ty, TypeName::String);
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let (program, _) = parse(": f () : i32 { return 1 + 2 * 3; } ");
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        let Stmt::Return { value: Some(Expr::Binary { op: BinOp::Add, right, .. }), .. } = &f.body[0] else {
            panic!("expected top-level `+`")
        };
        assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let (program, _) = parse(": f () : i32 { return 1 - 2 - 3; }");
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        let Stmt::Return { value: Some(Expr::Binary { op: BinOp::Sub, left, .. }), .. } = &f.body[0] else {
            panic!()
        };
        // (1 - 2) - 3: the left child of the outer `-` is itself a `-`.
        assert!(matches!(**left, Expr::Binary { op: BinOp::Sub, .. }));
    }

    #[test]
    fn parses_if_else() {
        let (program, handler) = parse(
            ": abs (x : i32) : i32 { if (x < 0) { return -x; } else { return x; } }",
        );
        assert!(!handler.has_errors());
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        assert!(matches!(f.body[0], Stmt::If { else_branch: Some(_), .. }));
    }

    #[test]
    fn parses_while_loop() {
        let (program, handler) = parse(
            ": sum_to (n : i32) : i32 { s : i32 = 0; i : i32 = 0; while (i < n) { s = s + i; i = i + 1; } return s; }",
        );
        assert!(!handler.has_errors());
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        assert_eq!(f.body.len(), 4);
        assert!(matches!(f.body[2], Stmt::While { .. }));
    }

    #[test]
    fn parses_cast_expression() {
        let (program, handler) = parse(": f () : i64 { return (1 as : i64); }");
        assert!(!handler.has_errors());
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        assert!(matches!(
            f.body[0],
            Stmt::Return { value: Some(Expr::Cast { target: TypeName::I64, .. }), .. }
        ));
    }

    #[test]
    fn call_with_multiple_arguments() {
        let (program, handler) = parse(": main () : void { f(1, 2); }");
        assert!(!handler.has_errors());
        let Item::FunctionDecl(f) = &program.items[0] else { panic!() };
        let Stmt::ExprStmt { expr: Expr::Call { args, .. }, .. } = &f.body[0] else { panic!() };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn return_with_no_expression_is_not_an_error() {
        let (_, handler) = parse(": f () : void { return; }");
        assert!(!handler.has_errors());
    }

    #[test]
    fn invalid_expression_start_reports_syntax_error() {
        let (_, handler) = parse(": f () : i32 { return *; }");
        assert!(handler.has_errors());
    }
}
