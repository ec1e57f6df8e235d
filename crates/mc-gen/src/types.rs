//! Type mapping from the checker's primitive types to LLVM IR types (§4.4).
//!
//! `string` has no storage representation of its own outside this mapping:
//! it is always an opaque `ptr` to a nul-terminated byte buffer, matching
//! how the three builtins (`print`, `println`, `toString`) expect it.

use inkwell::context::Context;
use inkwell::types::{BasicTypeEnum, FloatType, IntType};
use inkwell::AddressSpace;

use mc_sem::Type;

pub fn int_type<'ctx>(context: &'ctx Context, ty: Type) -> IntType<'ctx> {
    match ty {
        Type::I8 | Type::U8 => context.i8_type(),
        Type::I16 | Type::U16 => context.i16_type(),
        Type::I32 | Type::U32 => context.i32_type(),
        Type::I64 | Type::U64 => context.i64_type(),
        Type::Bool => context.bool_type(),
        other => unreachable!("{other} is not an integer type"),
    }
}

pub fn float_type<'ctx>(context: &'ctx Context, ty: Type) -> FloatType<'ctx> {
    match ty {
        Type::F32 => context.f32_type(),
        Type::F64 => context.f64_type(),
        other => unreachable!("{other} is not a float type"),
    }
}

/// The LLVM type used for every value of the checker's `Type`. `Void` has no
/// `BasicTypeEnum` representation; callers that need a function's return
/// type handle `Void` separately before calling this.
pub fn basic_type<'ctx>(context: &'ctx Context, ty: Type) -> BasicTypeEnum<'ctx> {
    match ty {
        Type::Bool => context.bool_type().into(),
        Type::I8 | Type::U8 | Type::I16 | Type::U16 | Type::I32 | Type::U32 | Type::I64 | Type::U64 => {
            int_type(context, ty).into()
        }
        Type::F32 | Type::F64 => float_type(context, ty).into(),
        Type::String => context.ptr_type(AddressSpace::default()).into(),
        Type::Void | Type::Unknown => unreachable!("{ty} has no value representation"),
    }
}
