use std::fmt;

/// The abstract cause of a diagnostic, independent of the specific message.
/// `Display` produces the `<kind-description>` text used by the
/// `<filename>:<line>:<col>: error: <kind-description>: <message>` rendering
/// format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    SyntaxError,
    SemanticError,
    TypeError,
    UndefinedSymbol,
    RedefinedSymbol,
    IncompatibleTypes,
    FunctionNotFound,
    WrongArgumentCount,
    InvalidAssignment,
    ConstantAssignment,
    UninitializedVariable,
    UnreachableCode,
    NotImplemented,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::SyntaxError => "syntax error",
            DiagnosticKind::SemanticError => "semantic error",
            DiagnosticKind::TypeError => "type error",
            DiagnosticKind::UndefinedSymbol => "undefined symbol",
            DiagnosticKind::RedefinedSymbol => "symbol redefinition",
            DiagnosticKind::IncompatibleTypes => "incompatible types",
            DiagnosticKind::FunctionNotFound => "function not found",
            DiagnosticKind::WrongArgumentCount => "wrong argument count",
            DiagnosticKind::InvalidAssignment => "invalid assignment",
            DiagnosticKind::ConstantAssignment => "constant assignment",
            DiagnosticKind::UninitializedVariable => "uninitialized variable",
            DiagnosticKind::UnreachableCode => "unreachable code",
            DiagnosticKind::NotImplemented => "not implemented",
        };
        write!(f, "{s}")
    }
}
