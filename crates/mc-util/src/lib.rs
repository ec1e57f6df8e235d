//! mc-util - Core Utilities and Foundation Types
//!
//! Foundation types shared by every later compiler stage: source spans,
//! typed index vectors for the scope arena, and the diagnostics sink that
//! every later pass reports into.

pub mod diagnostic;
pub mod index_vec;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticKind, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
