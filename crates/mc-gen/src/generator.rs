//! AST → LLVM IR lowering (§4.4, §4.5).
//!
//! One [`IrGenerator`], not two: it walks `mc_par::ast` directly and emits
//! into an `inkwell` module. The three phases from the distilled spec map
//! to three public entry points: [`IrGenerator::declare_prototypes`],
//! [`IrGenerator::emit_bodies`], [`IrGenerator::optimize_and_verify`].
//!
//! `locals` is the "local environment" stack from the data model: a fresh
//! frame is pushed on entry to every lexical block (function body, `if`/
//! `else` arm, `while` body) and popped on exit; lookup walks the stack
//! innermost-first, exactly paralleling the checker's scope tree.

use indexmap::IndexMap;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::passes::{PassManager, PassManagerBuilder};
use inkwell::targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue, PointerValue};
use inkwell::{AddressSpace, FloatPredicate, IntPredicate, OptimizationLevel};
use std::path::Path;

use mc_par::{ast, BinOp, UnOp};
use mc_sem::Type;
use mc_util::Handler;

use crate::error::{CodeGenError, Result};
use crate::types::{basic_type, float_type, int_type};

struct FunctionInfo<'ctx> {
    value: FunctionValue<'ctx>,
    params: Vec<Type>,
    return_type: Type,
}

/// The three builtins always in global scope (§6.5), declared as external
/// prototypes the same way a user `extern` declaration is.
const BUILTINS: &[(&str, &[Type], Type)] = &[
    ("print", &[Type::String], Type::Void),
    ("println", &[Type::String], Type::Void),
    ("toString", &[Type::I32], Type::String),
];

pub struct IrGenerator<'ctx, 'a> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    handler: &'a Handler,
    functions: IndexMap<String, FunctionInfo<'ctx>>,
    locals: Vec<IndexMap<String, (PointerValue<'ctx>, Type)>>,
}

impl<'ctx, 'a> IrGenerator<'ctx, 'a> {
    pub fn new(context: &'ctx Context, module_name: &str, handler: &'a Handler) -> Self {
        Self {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            handler,
            functions: IndexMap::new(),
            locals: Vec::new(),
        }
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn emit_ir_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    // --- Phase 1: prototype declaration ------------------------------------

    /// Idempotent: re-declaring an already-declared name is a no-op. This
    /// is what makes forward and mutually recursive calls possible at the
    /// IR level, mirroring phase A of the semantic analyzer.
    pub fn declare_prototypes(&mut self, program: &ast::Program) {
        for (name, params, ret) in BUILTINS {
            self.declare_prototype(name, params.to_vec(), *ret, true);
        }
        for item in &program.items {
            match item {
                ast::Item::FunctionDecl(f) => {
                    let params = f.params.iter().map(|p| Type::from_ast(p.ty)).collect();
                    self.declare_prototype(&f.name, params, Type::from_ast(f.return_type), false);
                }
                ast::Item::ExternFunctionDecl(f) => {
                    let params = f.params.iter().map(|p| Type::from_ast(p.ty)).collect();
                    self.declare_prototype(&f.name, params, Type::from_ast(f.return_type), true);
                }
            }
        }
    }

    fn declare_prototype(&mut self, name: &str, params: Vec<Type>, return_type: Type, is_extern: bool) {
        if self.functions.contains_key(name) {
            return;
        }
        let param_types: Vec<BasicMetadataTypeEnum> =
            params.iter().map(|ty| basic_type(self.context, *ty).into()).collect();
        let fn_type = if return_type == Type::Void {
            self.context.void_type().fn_type(&param_types, false)
        } else {
            basic_type(self.context, return_type).fn_type(&param_types, false)
        };
        let linkage = if is_extern { Some(Linkage::External) } else { None };
        let value = self.module.add_function(name, fn_type, linkage);
        self.functions.insert(name.to_string(), FunctionInfo { value, params, return_type });
    }

    // --- Phase 2: body emission ---------------------------------------------

    pub fn emit_bodies(&mut self, program: &ast::Program) -> Result<()> {
        for item in &program.items {
            if let ast::Item::FunctionDecl(f) = item {
                self.emit_function_body(f)?;
            }
        }
        Ok(())
    }

    fn emit_function_body(&mut self, f: &ast::FunctionDecl) -> Result<()> {
        let (function, param_types, return_type) = {
            let info = self
                .functions
                .get(&f.name)
                .unwrap_or_else(|| unreachable!("`{}` was declared in phase 1", f.name));
            (info.value, info.params.clone(), info.return_type)
        };

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);
        self.push_scope();

        for (i, (param, ty)) in f.params.iter().zip(param_types.iter()).enumerate() {
            let incoming = function
                .get_nth_param(i as u32)
                .unwrap_or_else(|| unreachable!("function has {} declared parameters", f.params.len()));
            let slot = self
                .builder
                .build_alloca(basic_type(self.context, *ty), &param.name)
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
            self.builder
                .build_store(slot, incoming)
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
            self.bind_local(param.name.clone(), slot, *ty);
        }

        for stmt in &f.body {
            self.lower_stmt(stmt, function, return_type)?;
        }

        self.ensure_terminated(return_type)?;

        self.pop_scope();
        Ok(())
    }

    /// Inserts a default terminator if the current block fell off the end
    /// of a statement list without one — reachable merge blocks where every
    /// arm of an `if`/`else` already returned (S3), or an `if` with no
    /// `else` whose `then` arm returns, leave exactly this kind of
    /// well-formed-but-unterminated block behind. Grounded on the teacher's
    /// own "ensure function has a terminator" fallback
    /// (`faxc-gen/src/llvm.rs`), generalized from its hardcoded `i64` zero
    /// to whatever the enclosing function actually returns.
    fn ensure_terminated(&self, return_type: Type) -> Result<()> {
        if self.block_terminated() {
            return Ok(());
        }
        let value = match return_type {
            Type::Void => None,
            other => Some(self.default_value(other)),
        };
        self.builder
            .build_return(value.as_ref())
            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
        Ok(())
    }

    fn default_value(&self, ty: Type) -> BasicValueEnum<'ctx> {
        if ty.is_float() {
            float_type(self.context, ty).const_float(0.0).into()
        } else if ty == Type::String {
            self.context.ptr_type(AddressSpace::default()).const_null().into()
        } else {
            int_type(self.context, ty).const_int(0, false).into()
        }
    }

    // --- Phase 3: optimization & verification --------------------------------

    /// Runs the backend's standard `O1`-`O3` pipeline when `opt_level > 0`,
    /// then always verifies the module. A verification failure is fatal
    /// (testable property 1: every accepted program's IR passes the
    /// verifier).
    pub fn optimize_and_verify(&self, opt_level: u8) -> Result<()> {
        if opt_level > 0 {
            let level = match opt_level {
                1 => OptimizationLevel::Less,
                2 => OptimizationLevel::Default,
                _ => OptimizationLevel::Aggressive,
            };
            let pass_manager = PassManager::create(());
            let builder = PassManagerBuilder::create();
            builder.set_optimization_level(level);
            builder.populate_module_pass_manager(&pass_manager);
            pass_manager.run_on(&self.module);
        }
        self.module
            .verify()
            .map_err(|e| CodeGenError::VerificationFailed(e.to_string()))
    }

    fn target_machine(&self) -> Result<TargetMachine> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(|e| CodeGenError::TargetInitFailed(e))?;
        let triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&triple).map_err(|e| CodeGenError::TargetInitFailed(e.to_string()))?;
        target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::Default,
                CodeModel::Default,
            )
            .ok_or_else(|| CodeGenError::TargetInitFailed("failed to create target machine".to_string()))
    }

    pub fn write_object_file(&self, path: &Path) -> Result<()> {
        let machine = self.target_machine()?;
        machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|e| CodeGenError::ObjectEmitFailed(e.to_string()))
    }

    // --- Local environment ----------------------------------------------------

    fn push_scope(&mut self) {
        self.locals.push(IndexMap::new());
    }

    fn pop_scope(&mut self) {
        self.locals.pop();
    }

    fn bind_local(&mut self, name: String, slot: PointerValue<'ctx>, ty: Type) {
        self.locals
            .last_mut()
            .unwrap_or_else(|| unreachable!("a scope is always pushed before binding a local"))
            .insert(name, (slot, ty));
    }

    fn lookup_local(&self, name: &str) -> (PointerValue<'ctx>, Type) {
        self.locals
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
            .unwrap_or_else(|| unreachable!("`{name}` was resolved by semantic analysis"))
    }

    fn block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|b| b.get_terminator())
            .is_some()
    }

    // --- Statement lowering -----------------------------------------------

    fn lower_stmt(&mut self, stmt: &ast::Stmt, function: FunctionValue<'ctx>, return_type: Type) -> Result<()> {
        match stmt {
            ast::Stmt::VariableDecl { name, ty, value, .. } => {
                let declared = Type::from_ast(*ty);
                let (val, val_ty) = self.lower_expr(value)?;
                let casted = self.cast_to_type(val, val_ty, declared)?;
                let slot = self
                    .builder
                    .build_alloca(basic_type(self.context, declared), name)
                    .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                self.builder
                    .build_store(slot, casted)
                    .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                self.bind_local(name.clone(), slot, declared);
                Ok(())
            }
            ast::Stmt::Assignment { name, value, .. } => {
                let (slot, ty) = self.lookup_local(name);
                let (val, val_ty) = self.lower_expr(value)?;
                let casted = self.cast_to_type(val, val_ty, ty)?;
                self.builder
                    .build_store(slot, casted)
                    .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                Ok(())
            }
            ast::Stmt::If { cond, then_branch, else_branch, .. } => {
                self.lower_if(cond, then_branch, else_branch.as_deref(), function, return_type)
            }
            ast::Stmt::While { cond, body, .. } => self.lower_while(cond, body, function, return_type),
            ast::Stmt::For { line, column, .. } => {
                self.handler.not_implemented("the `for` statement", *line, *column);
                Err(CodeGenError::NotImplemented("the `for` statement".to_string()))
            }
            ast::Stmt::Return { value, .. } => {
                match value {
                    Some(expr) => {
                        let (val, val_ty) = self.lower_expr(expr)?;
                        let casted = self.cast_to_type(val, val_ty, return_type)?;
                        self.builder
                            .build_return(Some(&casted))
                            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                    }
                    None => {
                        self.builder
                            .build_return(None)
                            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                    }
                }
                Ok(())
            }
            ast::Stmt::ExprStmt { expr, .. } => {
                self.lower_expr(expr)?;
                Ok(())
            }
            ast::Stmt::Block { body, .. } => {
                self.push_scope();
                for s in body {
                    self.lower_stmt(s, function, return_type)?;
                }
                self.pop_scope();
                Ok(())
            }
        }
    }

    fn lower_if(
        &mut self,
        cond: &ast::Expr,
        then_branch: &[ast::Stmt],
        else_branch: Option<&[ast::Stmt]>,
        function: FunctionValue<'ctx>,
        return_type: Type,
    ) -> Result<()> {
        let (cond_val, _) = self.lower_expr(cond)?;
        let then_bb = self.context.append_basic_block(function, "then");
        let else_bb = else_branch.map(|_| self.context.append_basic_block(function, "else"));
        let endif_bb = self.context.append_basic_block(function, "endif");

        self.builder
            .build_conditional_branch(cond_val.into_int_value(), then_bb, else_bb.unwrap_or(endif_bb))
            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;

        self.builder.position_at_end(then_bb);
        self.push_scope();
        for s in then_branch {
            self.lower_stmt(s, function, return_type)?;
        }
        self.pop_scope();
        if !self.block_terminated() {
            self.builder
                .build_unconditional_branch(endif_bb)
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
        }

        if let (Some(else_bb), Some(else_stmts)) = (else_bb, else_branch) {
            self.builder.position_at_end(else_bb);
            self.push_scope();
            for s in else_stmts {
                self.lower_stmt(s, function, return_type)?;
            }
            self.pop_scope();
            if !self.block_terminated() {
                self.builder
                    .build_unconditional_branch(endif_bb)
                    .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
            }
        }

        self.builder.position_at_end(endif_bb);
        Ok(())
    }

    fn lower_while(
        &mut self,
        cond: &ast::Expr,
        body: &[ast::Stmt],
        function: FunctionValue<'ctx>,
        return_type: Type,
    ) -> Result<()> {
        let whilecond = self.context.append_basic_block(function, "whilecond");
        let whilebody = self.context.append_basic_block(function, "whilebody");
        let whileend = self.context.append_basic_block(function, "whileend");

        self.builder
            .build_unconditional_branch(whilecond)
            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;

        self.builder.position_at_end(whilecond);
        let (cond_val, _) = self.lower_expr(cond)?;
        self.builder
            .build_conditional_branch(cond_val.into_int_value(), whilebody, whileend)
            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;

        self.builder.position_at_end(whilebody);
        self.push_scope();
        for s in body {
            self.lower_stmt(s, function, return_type)?;
        }
        self.pop_scope();
        if !self.block_terminated() {
            self.builder
                .build_unconditional_branch(whilecond)
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
        }

        self.builder.position_at_end(whileend);
        Ok(())
    }

    // --- Expression lowering ------------------------------------------------

    /// Returns the lowered SSA value paired with its static type, so
    /// callers (variable decls, returns, call arguments, binary ops) can
    /// cast it without re-deriving the type from scratch.
    fn lower_expr(&mut self, expr: &ast::Expr) -> Result<(BasicValueEnum<'ctx>, Type)> {
        match expr {
            ast::Expr::IntLiteral { value, .. } => {
                Ok((self.context.i32_type().const_int(*value as u64, true).into(), Type::I32))
            }
            ast::Expr::FloatLiteral { value, .. } => {
                Ok((self.context.f32_type().const_float(*value).into(), Type::F32))
            }
            ast::Expr::BoolLiteral { value, .. } => {
                Ok((self.context.bool_type().const_int(*value as u64, false).into(), Type::Bool))
            }
            ast::Expr::StringLiteral { line, column, .. } => {
                self.handler.not_implemented("a string literal outside a builtin call argument", *line, *column);
                Err(CodeGenError::NotImplemented("string literal emission".to_string()))
            }
            ast::Expr::Identifier { name, .. } => {
                let (slot, ty) = self.lookup_local(name);
                let loaded = self
                    .builder
                    .build_load(basic_type(self.context, ty), slot, name)
                    .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                Ok((loaded, ty))
            }
            ast::Expr::Unary { op, operand, .. } => self.lower_unary(*op, operand),
            ast::Expr::Binary { op, left, right, .. } => self.lower_binary(*op, left, right),
            ast::Expr::Call { callee, args, .. } => self.lower_call(callee, args),
            ast::Expr::Cast { expr, target, .. } => {
                let (val, from) = self.lower_expr(expr)?;
                let to = Type::from_ast(*target);
                Ok((self.cast_to_type(val, from, to)?, to))
            }
        }
    }

    fn lower_unary(&mut self, op: UnOp, operand: &ast::Expr) -> Result<(BasicValueEnum<'ctx>, Type)> {
        let (val, ty) = self.lower_expr(operand)?;
        match op {
            UnOp::Neg => {
                let result = if ty.is_float() {
                    self.builder.build_float_neg(val.into_float_value(), "negtmp")
                        .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?
                        .into()
                } else {
                    self.builder.build_int_neg(val.into_int_value(), "negtmp")
                        .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?
                        .into()
                };
                Ok((result, ty))
            }
            UnOp::Not => {
                let one = self.context.bool_type().const_int(1, false);
                let result = self
                    .builder
                    .build_xor(val.into_int_value(), one, "nottmp")
                    .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                Ok((result.into(), Type::Bool))
            }
        }
    }

    fn lower_binary(&mut self, op: BinOp, left: &ast::Expr, right: &ast::Expr) -> Result<(BasicValueEnum<'ctx>, Type)> {
        let (lval, lty) = self.lower_expr(left)?;
        let (rval, rty) = self.lower_expr(right)?;

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                let common = lty.widen_with(&rty);
                let l = self.cast_to_type(lval, lty, common)?;
                let r = self.cast_to_type(rval, rty, common)?;
                let result = if common.is_float() {
                    let (l, r) = (l.into_float_value(), r.into_float_value());
                    match op {
                        BinOp::Add => self.builder.build_float_add(l, r, "addtmp"),
                        BinOp::Sub => self.builder.build_float_sub(l, r, "subtmp"),
                        BinOp::Mul => self.builder.build_float_mul(l, r, "multmp"),
                        BinOp::Div => self.builder.build_float_div(l, r, "divtmp"),
                        BinOp::Rem => self.builder.build_float_rem(l, r, "remtmp"),
                        _ => unreachable!(),
                    }
                    .map(Into::into)
                } else {
                    let (l, r) = (l.into_int_value(), r.into_int_value());
                    match op {
                        BinOp::Add => self.builder.build_int_add(l, r, "addtmp"),
                        BinOp::Sub => self.builder.build_int_sub(l, r, "subtmp"),
                        BinOp::Mul => self.builder.build_int_mul(l, r, "multmp"),
                        BinOp::Div => self.builder.build_int_signed_div(l, r, "divtmp"),
                        BinOp::Rem => self.builder.build_int_signed_rem(l, r, "remtmp"),
                        _ => unreachable!(),
                    }
                    .map(Into::into)
                }
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                Ok((result, common))
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
                let common = if lty == rty { lty } else { lty.widen_with(&rty) };
                let l = self.cast_to_type(lval, lty, common)?;
                let r = self.cast_to_type(rval, rty, common)?;
                let result = if common.is_float() {
                    let predicate = match op {
                        BinOp::Lt => FloatPredicate::OLT,
                        BinOp::Le => FloatPredicate::OLE,
                        BinOp::Gt => FloatPredicate::OGT,
                        BinOp::Ge => FloatPredicate::OGE,
                        BinOp::Eq => FloatPredicate::OEQ,
                        BinOp::Ne => FloatPredicate::ONE,
                        _ => unreachable!(),
                    };
                    self.builder
                        .build_float_compare(predicate, l.into_float_value(), r.into_float_value(), "cmptmp")
                } else {
                    let predicate = match op {
                        BinOp::Lt => IntPredicate::SLT,
                        BinOp::Le => IntPredicate::SLE,
                        BinOp::Gt => IntPredicate::SGT,
                        BinOp::Ge => IntPredicate::SGE,
                        BinOp::Eq => IntPredicate::EQ,
                        BinOp::Ne => IntPredicate::NE,
                        _ => unreachable!(),
                    };
                    let (l, r) = if common == Type::String {
                        let i64_ty = self.context.i64_type();
                        (
                            self.builder.build_ptr_to_int(l.into_pointer_value(), i64_ty, "strcmpl"),
                            self.builder.build_ptr_to_int(r.into_pointer_value(), i64_ty, "strcmpr"),
                        )
                    } else {
                        (Ok(l.into_int_value()), Ok(r.into_int_value()))
                    };
                    let (l, r) = (
                        l.map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?,
                        r.map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?,
                    );
                    self.builder.build_int_compare(predicate, l, r, "cmptmp")
                }
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                Ok((result.into(), Type::Bool))
            }
            BinOp::And | BinOp::Or => {
                let (l, r) = (lval.into_int_value(), rval.into_int_value());
                // No short-circuit evaluation, per §4.4: both operands are
                // always evaluated before the bitwise op is applied.
                let result = if op == BinOp::And {
                    self.builder.build_and(l, r, "andtmp")
                } else {
                    self.builder.build_or(l, r, "ortmp")
                }
                .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;
                Ok((result.into(), Type::Bool))
            }
        }
    }

    fn lower_call(&mut self, callee: &str, args: &[ast::Expr]) -> Result<(BasicValueEnum<'ctx>, Type)> {
        let (function, params, return_type) = {
            let info = self
                .functions
                .get(callee)
                .unwrap_or_else(|| unreachable!("`{callee}` was resolved by semantic analysis"));
            (info.value, info.params.clone(), info.return_type)
        };

        let is_builtin_string_sink = matches!(callee, "print" | "println");
        let mut arg_values: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for (arg, param_ty) in args.iter().zip(params.iter()) {
            let value = if is_builtin_string_sink {
                if let ast::Expr::StringLiteral { value, .. } = arg {
                    self.builder
                        .build_global_string_ptr(value, ".str")
                        .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?
                        .as_pointer_value()
                        .into()
                } else {
                    let (val, ty) = self.lower_expr(arg)?;
                    self.cast_to_type(val, ty, *param_ty)?
                }
            } else {
                let (val, ty) = self.lower_expr(arg)?;
                self.cast_to_type(val, ty, *param_ty)?
            };
            arg_values.push(value.into());
        }

        let name = if return_type == Type::Void { "" } else { "calltmp" };
        let call = self
            .builder
            .build_call(function, &arg_values, name)
            .map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))?;

        let value = call
            .try_as_basic_value()
            .left()
            .unwrap_or_else(|| self.context.bool_type().const_int(0, false).into());
        Ok((value, return_type))
    }

    // --- `cast_to_type` (§4.4) -----------------------------------------------

    /// Deterministic coercion applied at every store, return, and
    /// call-argument site. Rule 2 sign-extends even across the unsigned
    /// integer widths (§9's open-question resolution: signedness is
    /// conveyed by operation choice, never by the IR integer type itself).
    fn cast_to_type(&self, value: BasicValueEnum<'ctx>, from: Type, to: Type) -> Result<BasicValueEnum<'ctx>> {
        if from == to {
            return Ok(value);
        }
        let result = if from.is_integer() && to.is_integer() {
            let (from_w, to_w) = (from.int_width().unwrap(), to.int_width().unwrap());
            let iv = value.into_int_value();
            let target = int_type(self.context, to);
            if to_w > from_w {
                self.builder.build_int_s_extend(iv, target, "sext").map(Into::into)
            } else if to_w < from_w {
                self.builder.build_int_truncate(iv, target, "trunc").map(Into::into)
            } else {
                Ok(iv.into())
            }
        } else if from.is_float() && to.is_float() {
            let fv = value.into_float_value();
            let target = float_type(self.context, to);
            match (from, to) {
                (Type::F32, Type::F64) => self.builder.build_float_ext(fv, target, "fpext").map(Into::into),
                (Type::F64, Type::F32) => self.builder.build_float_trunc(fv, target, "fptrunc").map(Into::into),
                _ => Ok(fv.into()),
            }
        } else if from.is_integer() && to.is_float() {
            let target = float_type(self.context, to);
            self.builder.build_signed_int_to_float(value.into_int_value(), target, "sitofp").map(Into::into)
        } else if from.is_float() && to.is_integer() {
            let target = int_type(self.context, to);
            self.builder.build_float_to_signed_int(value.into_float_value(), target, "fptosi").map(Into::into)
        } else {
            // Unreachable for well-typed input; pass through unchanged as
            // recovery behavior rather than panicking (§4.4 rule 6).
            Ok(value)
        };
        result.map_err(|e| CodeGenError::InvalidOperandType(e.to_string()))
    }
}
