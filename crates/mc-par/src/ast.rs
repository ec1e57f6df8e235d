//! Abstract syntax tree for M (§6.1 grammar).
//!
//! A tagged union plus pattern matching, per the redesign flag against the
//! source's dynamic-dispatch visitor classes: every node carries its own
//! `line`/`column` and exposes its children as plain fields, satisfying the
//! parse-tree interface contract in §6.2 without needing a separate visitor
//! trait.

/// A type name as written in source (`i32`, `string`, `void`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeName {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    String,
    Void,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    FunctionDecl(FunctionDecl),
    ExternFunctionDecl(ExternFunctionDecl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeName,
    pub body: Vec<Stmt>,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExternFunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeName,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    VariableDecl {
        name: String,
        ty: TypeName,
        value: Expr,
        line: u32,
        column: u32,
    },
    Assignment {
        name: String,
        value: Expr,
        line: u32,
        column: u32,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        line: u32,
        column: u32,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        line: u32,
        column: u32,
    },
    /// Accepted by the grammar; the semantic analyzer does not reject it,
    /// but the IR generator refuses to lower it (see SPEC_FULL §9).
    For {
        init: Box<Stmt>,
        cond: Expr,
        step: Box<Stmt>,
        body: Vec<Stmt>,
        line: u32,
        column: u32,
    },
    Return {
        value: Option<Expr>,
        line: u32,
        column: u32,
    },
    ExprStmt {
        expr: Expr,
        line: u32,
        column: u32,
    },
    Block {
        body: Vec<Stmt>,
        line: u32,
        column: u32,
    },
}

impl Stmt {
    pub fn line(&self) -> u32 {
        match self {
            Stmt::VariableDecl { line, .. }
            | Stmt::Assignment { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::ExprStmt { line, .. }
            | Stmt::Block { line, .. } => *line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            Stmt::VariableDecl { column, .. }
            | Stmt::Assignment { column, .. }
            | Stmt::If { column, .. }
            | Stmt::While { column, .. }
            | Stmt::For { column, .. }
            | Stmt::Return { column, .. }
            | Stmt::ExprStmt { column, .. }
            | Stmt::Block { column, .. } => *column,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    IntLiteral {
        value: i64,
        line: u32,
        column: u32,
    },
    FloatLiteral {
        value: f64,
        line: u32,
        column: u32,
    },
    BoolLiteral {
        value: bool,
        line: u32,
        column: u32,
    },
    StringLiteral {
        value: String,
        line: u32,
        column: u32,
    },
    Identifier {
        name: String,
        line: u32,
        column: u32,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        line: u32,
        column: u32,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
        column: u32,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        line: u32,
        column: u32,
    },
    Cast {
        expr: Box<Expr>,
        target: TypeName,
        line: u32,
        column: u32,
    },
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::IntLiteral { line, .. }
            | Expr::FloatLiteral { line, .. }
            | Expr::BoolLiteral { line, .. }
            | Expr::StringLiteral { line, .. }
            | Expr::Identifier { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Call { line, .. }
            | Expr::Cast { line, .. } => *line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            Expr::IntLiteral { column, .. }
            | Expr::FloatLiteral { column, .. }
            | Expr::BoolLiteral { column, .. }
            | Expr::StringLiteral { column, .. }
            | Expr::Identifier { column, .. }
            | Expr::Unary { column, .. }
            | Expr::Binary { column, .. }
            | Expr::Call { column, .. }
            | Expr::Cast { column, .. } => *column,
        }
    }
}
