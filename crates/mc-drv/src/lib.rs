//! mc-drv - Compiler Driver
//!
//! ============================================================================
//! COMPILATION PIPELINE
//! ============================================================================
//!
//! ```text
//! Source file (.m)
//!        |
//!        v
//!   [Lexer]   (mc-lex)  ──▶ Token stream
//!        |
//!        v
//!   [Parser]  (mc-par)  ──▶ Parse tree
//!        |
//!        v
//!   [Semantic analysis] (mc-sem) ──▶ Diagnostics; stop here if any are errors
//!        |
//!        v
//!   [IR generation] (mc-gen) ──▶ LLVM module
//!        |
//!        v
//!   [Optimize + verify] ──▶ `.ll` / `.o`
//! ```
//!
//! Single file in, no linking stage: this driver's whole job is turning one
//! `.m` file into IR text and/or an object file next to it. Unlike a
//! multi-file driver there is no source map, no incremental cache, and no
//! target-triple override — one [`Config`] fully describes a run.
//!
//! Exit codes (§6.3): `0` success, `1` usage error or compilation failure.

mod config;

pub use config::{Config, UsageError};

use std::fs;
use std::path::PathBuf;

use inkwell::context::Context;
use mc_gen::IrGenerator;
use mc_lex::Lexer;
use mc_par::Parser;
use mc_sem::SemanticAnalyzer;
use mc_util::diagnostic::render::render_diagnostic;
use mc_util::Handler;

#[derive(Debug)]
pub enum CompileError {
    Io(PathBuf, std::io::Error),
    Usage(UsageError),
    Failed,
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Io(path, e) => write!(f, "could not read {}: {}", path.display(), e),
            CompileError::Usage(e) => write!(f, "{e}"),
            CompileError::Failed => write!(f, "compilation failed"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<UsageError> for CompileError {
    fn from(e: UsageError) -> Self {
        CompileError::Usage(e)
    }
}

/// Entry point called by `main()`. Parses `argv`, runs the pipeline on the
/// single input file, and writes whichever outputs `Config` requested.
pub fn run(args: &[String]) -> Result<(), CompileError> {
    let config = Config::parse(args)?;
    compile_file(&config)
}

fn compile_file(config: &Config) -> Result<(), CompileError> {
    let filename = config.input_file.display().to_string();
    let source = fs::read_to_string(&config.input_file).map_err(|e| CompileError::Io(config.input_file.clone(), e))?;

    let handler = Handler::new();

    let tokens = Lexer::new(&source, &handler).tokenize();
    let program = Parser::new(tokens, &handler).parse();

    let mut analyzer = SemanticAnalyzer::new(&handler);
    analyzer.analyze_program(&program);

    for warning in handler.warnings() {
        eprintln!("{}", render_diagnostic(&warning, &filename, &source));
    }

    if handler.error_count() > 0 {
        for error in handler.errors() {
            eprintln!("{}", render_diagnostic(&error, &filename, &source));
        }
        return Err(CompileError::Failed);
    }

    let context = Context::create();
    let module_name = config
        .input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");
    let mut generator = IrGenerator::new(&context, module_name, &handler);
    generator.declare_prototypes(&program);

    if let Err(e) = generator.emit_bodies(&program) {
        if handler.error_count() > 0 {
            for error in handler.errors() {
                eprintln!("{}", render_diagnostic(&error, &filename, &source));
            }
        } else {
            eprintln!("{filename}: {e}");
        }
        return Err(CompileError::Failed);
    }

    if let Err(e) = generator.optimize_and_verify(config.opt_level) {
        eprintln!("{filename}: {e}");
        return Err(CompileError::Failed);
    }

    if config.emit_ll {
        let out = config.input_file.with_extension("ll");
        if let Err(e) = fs::write(&out, generator.emit_ir_string()) {
            return Err(CompileError::Io(out, e));
        }
    }

    if config.emit_o {
        let out = config.input_file.with_extension("o");
        if let Err(e) = generator.write_object_file(&out) {
            eprintln!("{filename}: {e}");
            return Err(CompileError::Failed);
        }
    }

    Ok(())
}
