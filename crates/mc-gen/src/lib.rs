//! mc-gen - LLVM IR code generation for M.
//!
//! Walks the checked AST directly (no intervening MIR/LIR stage — see
//! SPEC_FULL §9 on the "two near-duplicate generators" redesign flag) and
//! emits an `inkwell`-backed LLVM module: one [`generator::IrGenerator`],
//! a backend-agnostic [`types`] mapping from the checker's primitive
//! types to LLVM types, and a [`error::CodeGenError`] for the handful of
//! fatal, non-recoverable conditions the generator can hit.
//!
//! This crate is only ever invoked once semantic analysis has produced
//! zero errors (§7): every error here is either a deliberate refusal of an
//! unsupported construct (`for`, non-literal-argument string use) or a
//! genuine backend failure (target init, verification, object emission).
//!
//! Known limitation, not an oversight: unsigned integer types reach this
//! crate with no distinct lowering of their own — `u8`..`u64` arithmetic,
//! division, remainder, and comparison are emitted identically to the
//! same-width signed instructions.

mod error;
mod generator;
pub mod types;

pub use error::{CodeGenError, Result};
pub use generator::IrGenerator;
