//! mc-sem - Semantic analysis for M.
//!
//! Two-phase scope and type checking over the parse tree: [`analysis`]
//! implements the phases themselves, [`scope`] is the arena-indexed symbol
//! table they share, and [`types`] is the closed primitive type system the
//! IR generator mirrors when it emits coercions.

mod analysis;
pub mod scope;
pub mod types;

pub use analysis::SemanticAnalyzer;
pub use scope::{Symbol, SymbolTable};
pub use types::Type;
