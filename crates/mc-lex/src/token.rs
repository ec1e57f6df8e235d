use std::fmt;

/// A lexical unit of M source code.
///
/// Each variant carries whatever payload it needs (an identifier's text, a
/// literal's parsed value); everything else is carried by the
/// [`SpannedToken`] wrapper around it.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    // --- Keywords -------------------------------------------------------
    /// "extern" - marks a function declaration with no body, satisfied by
    /// a runtime/builtin definition.
    ///
    /// Usage: `extern : puts(s : string) : void;`
    Extern,

    /// "return" - exits the current function, optionally with a value.
    ///
    /// Usage: `return 0;`
    Return,

    /// "if" - conditional statement.
    ///
    /// Usage: `if (x < 0) { ... }`
    If,

    /// "else" - alternative branch of an `if`.
    Else,

    /// "while" - condition-first loop.
    ///
    /// Usage: `while (i < n) { ... }`
    While,

    /// "for" - accepted by the grammar; rejected by the IR generator (see
    /// the generator's module documentation).
    For,

    /// "as" - explicit cast operator.
    ///
    /// Usage: `(x as : i64)`
    As,

    // --- Type keywords ---------------------------------------------------
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
    /// The `string` type keyword. Named `StringType` to avoid clashing with
    /// `StringLiteral`.
    StringType,
    Void,

    // --- Punctuation / operators -----------------------------------------
    Colon,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,
    Assign,

    // --- Literals and identifiers -----------------------------------------
    Ident(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BoolLiteral(bool),

    Eof,
}

impl Token {
    /// Look up the keyword variant for an identifier's text, if any.
    pub fn keyword(ident: &str) -> Option<Token> {
        Some(match ident {
            "extern" => Token::Extern,
            "return" => Token::Return,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "for" => Token::For,
            "as" => Token::As,
            "i8" => Token::I8,
            "i16" => Token::I16,
            "i32" => Token::I32,
            "i64" => Token::I64,
            "u8" => Token::U8,
            "u16" => Token::U16,
            "u32" => Token::U32,
            "u64" => Token::U64,
            "f32" => Token::F32,
            "f64" => Token::F64,
            "bool" => Token::Bool,
            "string" => Token::StringType,
            "void" => Token::Void,
            "true" => Token::BoolLiteral(true),
            "false" => Token::BoolLiteral(false),
            _ => return None,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Extern => write!(f, "extern"),
            Token::Return => write!(f, "return"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::For => write!(f, "for"),
            Token::As => write!(f, "as"),
            Token::I8 => write!(f, "i8"),
            Token::I16 => write!(f, "i16"),
            Token::I32 => write!(f, "i32"),
            Token::I64 => write!(f, "i64"),
            Token::U8 => write!(f, "u8"),
            Token::U16 => write!(f, "u16"),
            Token::U32 => write!(f, "u32"),
            Token::U64 => write!(f, "u64"),
            Token::F32 => write!(f, "f32"),
            Token::F64 => write!(f, "f64"),
            Token::Bool => write!(f, "bool"),
            Token::StringType => write!(f, "string"),
            Token::Void => write!(f, "void"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Assign => write!(f, "="),
            Token::Ident(s) => write!(f, "{s}"),
            Token::IntLiteral(n) => write!(f, "{n}"),
            Token::FloatLiteral(n) => write!(f, "{n}"),
            Token::StringLiteral(s) => write!(f, "{s:?}"),
            Token::BoolLiteral(b) => write!(f, "{b}"),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}

/// A [`Token`] paired with the source span it was lexed from.
#[derive(Clone, Debug, PartialEq)]
pub struct SpannedToken {
    pub kind: Token,
    pub span: mc_util::Span,
}

impl SpannedToken {
    /// The original source text this token was lexed from, reconstructed
    /// from its payload for identifiers/literals or its canonical spelling
    /// otherwise — this is the `text()` accessor the parse-tree interface
    /// contract (§6.2) requires of every token.
    pub fn text(&self) -> String {
        self.kind.to_string()
    }
}
