// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! One-shot decode of a single instruction: opcode identification (via
//! [`crate::opcodes`]) followed by its immediate, if any.
//!
//! This module does not track block/loop/if nesting — it decodes exactly
//! one instruction and returns the number of bytes it occupied. A
//! function body is a flat sequence of these, terminated by the outermost
//! `End`; reconstructing the control tree (and rejecting mismatched
//! `end`/`else`) is [`crate::validate`]'s job.

use alloc::vec::Vec;

use wafer_error::{kinds, Result};
use wafer_format::leb128;
use wafer_format::{BlockType, Features, ReferenceType, ValueType};

use crate::opcodes::{read_raw_opcode, RawOpcode, MISC_PREFIX, SIMD_PREFIX, THREADS_PREFIX};

/// The alignment hint and constant offset carried by every memory
/// instruction, plus (with `multi_memory`) which memory it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemArg {
    pub align_log2: u32,
    pub offset: u64,
    pub memory_index: u32,
}

const MULTI_MEMORY_FLAG: u32 = 0x40;

fn read_mem_arg(bytes: &[u8], pos: usize, features: &Features) -> Result<(MemArg, usize)> {
    let (raw_align, align_len) = leb128::read_u32(bytes, pos)?;
    let mut cursor = pos + align_len;
    let (memory_index, align_log2) = if raw_align & MULTI_MEMORY_FLAG != 0 {
        if !features.multi_memory {
            return Err(kinds::feature_disabled(pos as u64, "explicit memory index", "multi-memory"));
        }
        let (mem_index, mem_len) = leb128::read_u32(bytes, cursor)?;
        cursor += mem_len;
        (mem_index, raw_align & !MULTI_MEMORY_FLAG)
    } else {
        (0, raw_align)
    };
    let (offset, offset_len) = leb128::read_u64(bytes, cursor)?;
    cursor += offset_len;
    Ok((MemArg { align_log2, offset, memory_index }, cursor - pos))
}

/// The targets of a `br_table`: zero or more label depths plus the
/// mandatory default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrTable {
    pub targets: Vec<u32>,
    pub default: u32,
}

/// A fully decoded WebAssembly instruction and its immediate, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // --- Control ---
    Unreachable,
    Nop,
    Block(BlockType),
    Loop(BlockType),
    If(BlockType),
    Else,
    End,
    Br(u32),
    BrIf(u32),
    BrTable(BrTable),
    Return,
    Call(u32),
    CallIndirect { type_index: u32, table_index: u32 },
    ReturnCall(u32),
    ReturnCallIndirect { type_index: u32, table_index: u32 },

    // --- Parametric ---
    Drop,
    Select,
    TypedSelect(ValueType),

    // --- Variable ---
    LocalGet(u32),
    LocalSet(u32),
    LocalTee(u32),
    GlobalGet(u32),
    GlobalSet(u32),

    // --- Table ---
    TableGet(u32),
    TableSet(u32),
    TableInit { elem_index: u32, table_index: u32 },
    ElemDrop(u32),
    TableCopy { dst_table: u32, src_table: u32 },
    TableGrow(u32),
    TableSize(u32),
    TableFill(u32),

    // --- Memory ---
    I32Load(MemArg),
    I64Load(MemArg),
    F32Load(MemArg),
    F64Load(MemArg),
    I32Load8S(MemArg),
    I32Load8U(MemArg),
    I32Load16S(MemArg),
    I32Load16U(MemArg),
    I64Load8S(MemArg),
    I64Load8U(MemArg),
    I64Load16S(MemArg),
    I64Load16U(MemArg),
    I64Load32S(MemArg),
    I64Load32U(MemArg),
    I32Store(MemArg),
    I64Store(MemArg),
    F32Store(MemArg),
    F64Store(MemArg),
    I32Store8(MemArg),
    I32Store16(MemArg),
    I64Store8(MemArg),
    I64Store16(MemArg),
    I64Store32(MemArg),
    MemorySize(u32),
    MemoryGrow(u32),
    MemoryCopy { dst_mem: u32, src_mem: u32 },
    MemoryFill(u32),
    MemoryInit { data_index: u32, mem: u32 },
    DataDrop(u32),

    // --- Numeric const ---
    I32Const(i32),
    I64Const(i64),
    F32Const(u32),
    F64Const(u64),

    // --- Numeric: comparisons & arithmetic (unit immediate) ---
    I32Eqz,
    I32Eq,
    I32Ne,
    I32LtS,
    I32LtU,
    I32GtS,
    I32GtU,
    I32LeS,
    I32LeU,
    I32GeS,
    I32GeU,
    I64Eqz,
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
    I32Clz,
    I32Ctz,
    I32Popcnt,
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
    I32Shl,
    I32ShrS,
    I32ShrU,
    I32Rotl,
    I32Rotr,
    I64Clz,
    I64Ctz,
    I64Popcnt,
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64Rotl,
    I64Rotr,
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32Copysign,
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64Copysign,

    // --- Conversions ---
    I32WrapI64,
    I32TruncF32S,
    I32TruncF32U,
    I32TruncF64S,
    I32TruncF64U,
    I64ExtendI32S,
    I64ExtendI32U,
    I64TruncF32S,
    I64TruncF32U,
    I64TruncF64S,
    I64TruncF64U,
    F32ConvertI32S,
    F32ConvertI32U,
    F32ConvertI64S,
    F32ConvertI64U,
    F32DemoteF64,
    F64ConvertI32S,
    F64ConvertI32U,
    F64ConvertI64S,
    F64ConvertI64U,
    F64PromoteF32,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ReinterpretI32,
    F64ReinterpretI64,

    // --- Sign extension (sign_extension) ---
    I32Extend8S,
    I32Extend16S,
    I64Extend8S,
    I64Extend16S,
    I64Extend32S,

    // --- Saturating truncation (saturating_float_to_int) ---
    I32TruncSatF32S,
    I32TruncSatF32U,
    I32TruncSatF64S,
    I32TruncSatF64U,
    I64TruncSatF32S,
    I64TruncSatF32U,
    I64TruncSatF64S,
    I64TruncSatF64U,

    // --- Reference types ---
    RefNull(ReferenceType),
    RefIsNull,
    RefFunc(u32),

    // --- SIMD (representative subset) ---
    V128Load(MemArg),
    V128Store(MemArg),
    V128Const([u8; 16]),
    I32x4Add,
    I32x4Sub,
    F32x4Add,

    // --- Threads / atomics (representative subset) ---
    AtomicFence,
    I32AtomicLoad(MemArg),
    I64AtomicLoad(MemArg),
    I32AtomicStore(MemArg),
    I64AtomicStore(MemArg),
    MemoryAtomicWait32 { memarg: MemArg },
    MemoryAtomicNotify { memarg: MemArg },
}

macro_rules! feature_gate {
    ($pos:expr, $features:expr, $flag:ident, $name:literal, $feature_name:literal) => {
        if !$features.$flag {
            return Err(kinds::feature_disabled($pos as u64, $name, $feature_name));
        }
    };
}

/// Decodes exactly one instruction at `pos`, returning it and the number
/// of bytes (opcode + immediate) it occupied.
pub fn decode_instruction(bytes: &[u8], pos: usize, features: &Features) -> Result<(Instruction, usize)> {
    let (raw, raw_len) = read_raw_opcode(bytes, pos)?;
    let body_pos = pos + raw_len;

    match raw {
        RawOpcode::Plain(byte) => decode_plain(bytes, byte, pos, body_pos, features),
        RawOpcode::Misc(subcode) => decode_misc(bytes, subcode, pos, body_pos, features).map(|(i, l)| (i, raw_len + l)),
        RawOpcode::Simd(subcode) => decode_simd(bytes, subcode, pos, body_pos, features).map(|(i, l)| (i, raw_len + l)),
        RawOpcode::Threads(subcode) => {
            decode_threads(bytes, subcode, pos, body_pos, features).map(|(i, l)| (i, raw_len + l))
        }
    }
}

fn decode_plain(
    bytes: &[u8],
    byte: u8,
    opcode_pos: usize,
    pos: usize,
    features: &Features,
) -> Result<(Instruction, usize)> {
    use Instruction as I;

    macro_rules! index {
        () => {{
            let (v, l) = leb128::read_u32(bytes, pos)?;
            (v, l)
        }};
    }

    let (instr, body_len): (Instruction, usize) = match byte {
        0x00 => (I::Unreachable, 0),
        0x01 => (I::Nop, 0),
        0x02 => {
            let (bt, l) = BlockType::read(bytes, pos, features)?;
            (I::Block(bt), l)
        }
        0x03 => {
            let (bt, l) = BlockType::read(bytes, pos, features)?;
            (I::Loop(bt), l)
        }
        0x04 => {
            let (bt, l) = BlockType::read(bytes, pos, features)?;
            (I::If(bt), l)
        }
        0x05 => (I::Else, 0),
        0x0b => (I::End, 0),
        0x0c => {
            let (v, l) = index!();
            (I::Br(v), l)
        }
        0x0d => {
            let (v, l) = index!();
            (I::BrIf(v), l)
        }
        0x0e => {
            let (table, l) = read_br_table(bytes, pos)?;
            (I::BrTable(table), l)
        }
        0x0f => (I::Return, 0),
        0x10 => {
            let (v, l) = index!();
            (I::Call(v), l)
        }
        0x11 => {
            let (type_index, l1) = leb128::read_u32(bytes, pos)?;
            let (table_index, l2) = leb128::read_u32(bytes, pos + l1)?;
            (I::CallIndirect { type_index, table_index }, l1 + l2)
        }
        0x12 => {
            feature_gate!(opcode_pos, features, tail_call, "return_call", "tail-call");
            let (v, l) = index!();
            (I::ReturnCall(v), l)
        }
        0x13 => {
            feature_gate!(opcode_pos, features, tail_call, "return_call_indirect", "tail-call");
            let (type_index, l1) = leb128::read_u32(bytes, pos)?;
            let (table_index, l2) = leb128::read_u32(bytes, pos + l1)?;
            (I::ReturnCallIndirect { type_index, table_index }, l1 + l2)
        }
        0x1a => (I::Drop, 0),
        0x1b => (I::Select, 0),
        0x1c => {
            feature_gate!(opcode_pos, features, reference_types, "select t*", "reference-types");
            let (count, l1) = leb128::read_u32(bytes, pos)?;
            if count != 1 {
                return Err(kinds::invalid_block_type(pos as u64));
            }
            let (ty, l2) = ValueType::read(bytes, pos + l1, features)?;
            (I::TypedSelect(ty), l1 + l2)
        }
        0x20 => {
            let (v, l) = index!();
            (I::LocalGet(v), l)
        }
        0x21 => {
            let (v, l) = index!();
            (I::LocalSet(v), l)
        }
        0x22 => {
            let (v, l) = index!();
            (I::LocalTee(v), l)
        }
        0x23 => {
            let (v, l) = index!();
            (I::GlobalGet(v), l)
        }
        0x24 => {
            let (v, l) = index!();
            (I::GlobalSet(v), l)
        }
        0x25 => {
            feature_gate!(opcode_pos, features, reference_types, "table.get", "reference-types");
            let (v, l) = index!();
            (I::TableGet(v), l)
        }
        0x26 => {
            feature_gate!(opcode_pos, features, reference_types, "table.set", "reference-types");
            let (v, l) = index!();
            (I::TableSet(v), l)
        }
        0x28 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Load(m), l)
        }
        0x29 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load(m), l)
        }
        0x2a => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::F32Load(m), l)
        }
        0x2b => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::F64Load(m), l)
        }
        0x2c => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Load8S(m), l)
        }
        0x2d => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Load8U(m), l)
        }
        0x2e => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Load16S(m), l)
        }
        0x2f => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Load16U(m), l)
        }
        0x30 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load8S(m), l)
        }
        0x31 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load8U(m), l)
        }
        0x32 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load16S(m), l)
        }
        0x33 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load16U(m), l)
        }
        0x34 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load32S(m), l)
        }
        0x35 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Load32U(m), l)
        }
        0x36 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Store(m), l)
        }
        0x37 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Store(m), l)
        }
        0x38 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::F32Store(m), l)
        }
        0x39 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::F64Store(m), l)
        }
        0x3a => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Store8(m), l)
        }
        0x3b => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32Store16(m), l)
        }
        0x3c => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Store8(m), l)
        }
        0x3d => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Store16(m), l)
        }
        0x3e => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64Store32(m), l)
        }
        0x3f => {
            let (mem, l1) = leb128::read_u32(bytes, pos)?;
            if mem != 0 && !features.multi_memory {
                return Err(kinds::feature_disabled(pos as u64, "memory.size of mem != 0", "multi-memory"));
            }
            (I::MemorySize(mem), l1)
        }
        0x40 => {
            let (mem, l1) = leb128::read_u32(bytes, pos)?;
            if mem != 0 && !features.multi_memory {
                return Err(kinds::feature_disabled(pos as u64, "memory.grow of mem != 0", "multi-memory"));
            }
            (I::MemoryGrow(mem), l1)
        }
        0x41 => {
            let (v, l) = leb128::read_i32(bytes, pos)?;
            (I::I32Const(v), l)
        }
        0x42 => {
            let (v, l) = leb128::read_i64(bytes, pos)?;
            (I::I64Const(v), l)
        }
        0x43 => {
            let bits = read_f32_bits(bytes, pos)?;
            (I::F32Const(bits), 4)
        }
        0x44 => {
            let bits = read_f64_bits(bytes, pos)?;
            (I::F64Const(bits), 8)
        }
        0x45 => (I::I32Eqz, 0),
        0x46 => (I::I32Eq, 0),
        0x47 => (I::I32Ne, 0),
        0x48 => (I::I32LtS, 0),
        0x49 => (I::I32LtU, 0),
        0x4a => (I::I32GtS, 0),
        0x4b => (I::I32GtU, 0),
        0x4c => (I::I32LeS, 0),
        0x4d => (I::I32LeU, 0),
        0x4e => (I::I32GeS, 0),
        0x4f => (I::I32GeU, 0),
        0x50 => (I::I64Eqz, 0),
        0x51 => (I::I64Eq, 0),
        0x52 => (I::I64Ne, 0),
        0x53 => (I::I64LtS, 0),
        0x54 => (I::I64LtU, 0),
        0x55 => (I::I64GtS, 0),
        0x56 => (I::I64GtU, 0),
        0x57 => (I::I64LeS, 0),
        0x58 => (I::I64LeU, 0),
        0x59 => (I::I64GeS, 0),
        0x5a => (I::I64GeU, 0),
        0x5b => (I::F32Eq, 0),
        0x5c => (I::F32Ne, 0),
        0x5d => (I::F32Lt, 0),
        0x5e => (I::F32Gt, 0),
        0x5f => (I::F32Le, 0),
        0x60 => (I::F32Ge, 0),
        0x61 => (I::F64Eq, 0),
        0x62 => (I::F64Ne, 0),
        0x63 => (I::F64Lt, 0),
        0x64 => (I::F64Gt, 0),
        0x65 => (I::F64Le, 0),
        0x66 => (I::F64Ge, 0),
        0x67 => (I::I32Clz, 0),
        0x68 => (I::I32Ctz, 0),
        0x69 => (I::I32Popcnt, 0),
        0x6a => (I::I32Add, 0),
        0x6b => (I::I32Sub, 0),
        0x6c => (I::I32Mul, 0),
        0x6d => (I::I32DivS, 0),
        0x6e => (I::I32DivU, 0),
        0x6f => (I::I32RemS, 0),
        0x70 => (I::I32RemU, 0),
        0x71 => (I::I32And, 0),
        0x72 => (I::I32Or, 0),
        0x73 => (I::I32Xor, 0),
        0x74 => (I::I32Shl, 0),
        0x75 => (I::I32ShrS, 0),
        0x76 => (I::I32ShrU, 0),
        0x77 => (I::I32Rotl, 0),
        0x78 => (I::I32Rotr, 0),
        0x79 => (I::I64Clz, 0),
        0x7a => (I::I64Ctz, 0),
        0x7b => (I::I64Popcnt, 0),
        0x7c => (I::I64Add, 0),
        0x7d => (I::I64Sub, 0),
        0x7e => (I::I64Mul, 0),
        0x7f => (I::I64DivS, 0),
        0x80 => (I::I64DivU, 0),
        0x81 => (I::I64RemS, 0),
        0x82 => (I::I64RemU, 0),
        0x83 => (I::I64And, 0),
        0x84 => (I::I64Or, 0),
        0x85 => (I::I64Xor, 0),
        0x86 => (I::I64Shl, 0),
        0x87 => (I::I64ShrS, 0),
        0x88 => (I::I64ShrU, 0),
        0x89 => (I::I64Rotl, 0),
        0x8a => (I::I64Rotr, 0),
        0x8b => (I::F32Abs, 0),
        0x8c => (I::F32Neg, 0),
        0x8d => (I::F32Ceil, 0),
        0x8e => (I::F32Floor, 0),
        0x8f => (I::F32Trunc, 0),
        0x90 => (I::F32Nearest, 0),
        0x91 => (I::F32Sqrt, 0),
        0x92 => (I::F32Add, 0),
        0x93 => (I::F32Sub, 0),
        0x94 => (I::F32Mul, 0),
        0x95 => (I::F32Div, 0),
        0x96 => (I::F32Min, 0),
        0x97 => (I::F32Max, 0),
        0x98 => (I::F32Copysign, 0),
        0x99 => (I::F64Abs, 0),
        0x9a => (I::F64Neg, 0),
        0x9b => (I::F64Ceil, 0),
        0x9c => (I::F64Floor, 0),
        0x9d => (I::F64Trunc, 0),
        0x9e => (I::F64Nearest, 0),
        0x9f => (I::F64Sqrt, 0),
        0xa0 => (I::F64Add, 0),
        0xa1 => (I::F64Sub, 0),
        0xa2 => (I::F64Mul, 0),
        0xa3 => (I::F64Div, 0),
        0xa4 => (I::F64Min, 0),
        0xa5 => (I::F64Max, 0),
        0xa6 => (I::F64Copysign, 0),
        0xa7 => (I::I32WrapI64, 0),
        0xa8 => (I::I32TruncF32S, 0),
        0xa9 => (I::I32TruncF32U, 0),
        0xaa => (I::I32TruncF64S, 0),
        0xab => (I::I32TruncF64U, 0),
        0xac => (I::I64ExtendI32S, 0),
        0xad => (I::I64ExtendI32U, 0),
        0xae => (I::I64TruncF32S, 0),
        0xaf => (I::I64TruncF32U, 0),
        0xb0 => (I::I64TruncF64S, 0),
        0xb1 => (I::I64TruncF64U, 0),
        0xb2 => (I::F32ConvertI32S, 0),
        0xb3 => (I::F32ConvertI32U, 0),
        0xb4 => (I::F32ConvertI64S, 0),
        0xb5 => (I::F32ConvertI64U, 0),
        0xb6 => (I::F32DemoteF64, 0),
        0xb7 => (I::F64ConvertI32S, 0),
        0xb8 => (I::F64ConvertI32U, 0),
        0xb9 => (I::F64ConvertI64S, 0),
        0xba => (I::F64ConvertI64U, 0),
        0xbb => (I::F64PromoteF32, 0),
        0xbc => (I::I32ReinterpretF32, 0),
        0xbd => (I::I64ReinterpretF64, 0),
        0xbe => (I::F32ReinterpretI32, 0),
        0xbf => (I::F64ReinterpretI64, 0),
        0xc0 => {
            feature_gate!(opcode_pos, features, sign_extension, "i32.extend8_s", "sign-extension");
            (I::I32Extend8S, 0)
        }
        0xc1 => {
            feature_gate!(opcode_pos, features, sign_extension, "i32.extend16_s", "sign-extension");
            (I::I32Extend16S, 0)
        }
        0xc2 => {
            feature_gate!(opcode_pos, features, sign_extension, "i64.extend8_s", "sign-extension");
            (I::I64Extend8S, 0)
        }
        0xc3 => {
            feature_gate!(opcode_pos, features, sign_extension, "i64.extend16_s", "sign-extension");
            (I::I64Extend16S, 0)
        }
        0xc4 => {
            feature_gate!(opcode_pos, features, sign_extension, "i64.extend32_s", "sign-extension");
            (I::I64Extend32S, 0)
        }
        0xd0 => {
            feature_gate!(opcode_pos, features, reference_types, "ref.null", "reference-types");
            let (rt, l) = ReferenceType::read(bytes, pos, features)?;
            (I::RefNull(rt), l)
        }
        0xd1 => {
            feature_gate!(opcode_pos, features, reference_types, "ref.is_null", "reference-types");
            (I::RefIsNull, 0)
        }
        0xd2 => {
            feature_gate!(opcode_pos, features, reference_types, "ref.func", "reference-types");
            let (v, l) = index!();
            (I::RefFunc(v), l)
        }
        _ => return Err(kinds::unknown_opcode(opcode_pos as u64, u32::from(byte))),
    };
    Ok((instr, body_len))
}

fn decode_misc(
    bytes: &[u8],
    subcode: u32,
    opcode_pos: usize,
    pos: usize,
    features: &Features,
) -> Result<(Instruction, usize)> {
    use Instruction as I;

    let (instr, len): (Instruction, usize) = match subcode {
        0 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i32.trunc_sat_f32_s", "saturating-float-to-int");
            (I::I32TruncSatF32S, 0)
        }
        1 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i32.trunc_sat_f32_u", "saturating-float-to-int");
            (I::I32TruncSatF32U, 0)
        }
        2 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i32.trunc_sat_f64_s", "saturating-float-to-int");
            (I::I32TruncSatF64S, 0)
        }
        3 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i32.trunc_sat_f64_u", "saturating-float-to-int");
            (I::I32TruncSatF64U, 0)
        }
        4 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i64.trunc_sat_f32_s", "saturating-float-to-int");
            (I::I64TruncSatF32S, 0)
        }
        5 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i64.trunc_sat_f32_u", "saturating-float-to-int");
            (I::I64TruncSatF32U, 0)
        }
        6 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i64.trunc_sat_f64_s", "saturating-float-to-int");
            (I::I64TruncSatF64S, 0)
        }
        7 => {
            feature_gate!(opcode_pos, features, saturating_float_to_int, "i64.trunc_sat_f64_u", "saturating-float-to-int");
            (I::I64TruncSatF64U, 0)
        }
        8 => {
            feature_gate!(opcode_pos, features, bulk_memory, "memory.init", "bulk-memory");
            let (data_index, l1) = leb128::read_u32(bytes, pos)?;
            let (mem, l2) = leb128::read_u32(bytes, pos + l1)?;
            (I::MemoryInit { data_index, mem }, l1 + l2)
        }
        9 => {
            feature_gate!(opcode_pos, features, bulk_memory, "data.drop", "bulk-memory");
            let (v, l) = leb128::read_u32(bytes, pos)?;
            (I::DataDrop(v), l)
        }
        10 => {
            feature_gate!(opcode_pos, features, bulk_memory, "memory.copy", "bulk-memory");
            let (dst_mem, l1) = leb128::read_u32(bytes, pos)?;
            let (src_mem, l2) = leb128::read_u32(bytes, pos + l1)?;
            (I::MemoryCopy { dst_mem, src_mem }, l1 + l2)
        }
        11 => {
            feature_gate!(opcode_pos, features, bulk_memory, "memory.fill", "bulk-memory");
            let (mem, l) = leb128::read_u32(bytes, pos)?;
            (I::MemoryFill(mem), l)
        }
        12 => {
            feature_gate!(opcode_pos, features, bulk_memory, "table.init", "bulk-memory");
            let (elem_index, l1) = leb128::read_u32(bytes, pos)?;
            let (table_index, l2) = leb128::read_u32(bytes, pos + l1)?;
            (I::TableInit { elem_index, table_index }, l1 + l2)
        }
        13 => {
            feature_gate!(opcode_pos, features, bulk_memory, "elem.drop", "bulk-memory");
            let (v, l) = leb128::read_u32(bytes, pos)?;
            (I::ElemDrop(v), l)
        }
        14 => {
            feature_gate!(opcode_pos, features, bulk_memory, "table.copy", "bulk-memory");
            let (dst_table, l1) = leb128::read_u32(bytes, pos)?;
            let (src_table, l2) = leb128::read_u32(bytes, pos + l1)?;
            (I::TableCopy { dst_table, src_table }, l1 + l2)
        }
        15 => {
            feature_gate!(opcode_pos, features, reference_types, "table.grow", "reference-types");
            let (v, l) = leb128::read_u32(bytes, pos)?;
            (I::TableGrow(v), l)
        }
        16 => {
            feature_gate!(opcode_pos, features, reference_types, "table.size", "reference-types");
            let (v, l) = leb128::read_u32(bytes, pos)?;
            (I::TableSize(v), l)
        }
        17 => {
            feature_gate!(opcode_pos, features, bulk_memory, "table.fill", "bulk-memory");
            let (v, l) = leb128::read_u32(bytes, pos)?;
            (I::TableFill(v), l)
        }
        _ => return Err(kinds::unknown_opcode(opcode_pos as u64, 0xfc00 | subcode)),
    };
    Ok((instr, len))
}

fn decode_simd(
    bytes: &[u8],
    subcode: u32,
    opcode_pos: usize,
    pos: usize,
    features: &Features,
) -> Result<(Instruction, usize)> {
    use Instruction as I;

    feature_gate!(opcode_pos, features, simd, "SIMD instruction", "simd");

    let (instr, len): (Instruction, usize) = match subcode {
        0 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::V128Load(m), l)
        }
        11 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::V128Store(m), l)
        }
        12 => {
            let bytes16: [u8; 16] = bytes
                .get(pos..pos + 16)
                .ok_or_else(|| kinds::unexpected_eof(pos as u64, 16))?
                .try_into()
                .expect("slice of length 16");
            (I::V128Const(bytes16), 16)
        }
        174 => (I::I32x4Add, 0),
        161 => (I::I32x4Sub, 0),
        228 => (I::F32x4Add, 0),
        _ => return Err(kinds::unknown_opcode(opcode_pos as u64, 0xfd00 | subcode)),
    };
    Ok((instr, len))
}

fn decode_threads(
    bytes: &[u8],
    subcode: u32,
    opcode_pos: usize,
    pos: usize,
    features: &Features,
) -> Result<(Instruction, usize)> {
    use Instruction as I;

    feature_gate!(opcode_pos, features, threads, "atomic instruction", "threads");

    let (instr, len): (Instruction, usize) = match subcode {
        0x00 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::MemoryAtomicNotify { memarg: m }, l)
        }
        0x01 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::MemoryAtomicWait32 { memarg: m }, l)
        }
        0x03 => (I::AtomicFence, 1), // reserved byte follows
        0x10 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32AtomicLoad(m), l)
        }
        0x11 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64AtomicLoad(m), l)
        }
        0x17 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I32AtomicStore(m), l)
        }
        0x18 => {
            let (m, l) = read_mem_arg(bytes, pos, features)?;
            (I::I64AtomicStore(m), l)
        }
        _ => return Err(kinds::unknown_opcode(opcode_pos as u64, 0xfe00 | subcode)),
    };
    Ok((instr, len))
}

fn read_br_table(bytes: &[u8], pos: usize) -> Result<(BrTable, usize)> {
    let (count, mut len) = leb128::read_u32(bytes, pos)?;
    let mut targets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (target, target_len) = leb128::read_u32(bytes, pos + len)?;
        targets.push(target);
        len += target_len;
    }
    let (default, default_len) = leb128::read_u32(bytes, pos + len)?;
    len += default_len;
    Ok((BrTable { targets, default }, len))
}

fn read_f32_bits(bytes: &[u8], pos: usize) -> Result<u32> {
    let slice: [u8; 4] =
        bytes.get(pos..pos + 4).ok_or_else(|| kinds::unexpected_eof(pos as u64, 4))?.try_into().unwrap();
    Ok(u32::from_le_bytes(slice))
}

fn read_f64_bits(bytes: &[u8], pos: usize) -> Result<u64> {
    let slice: [u8; 8] =
        bytes.get(pos..pos + 8).ok_or_else(|| kinds::unexpected_eof(pos as u64, 8))?.try_into().unwrap();
    Ok(u64::from_le_bytes(slice))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> Features {
        Features::all()
    }

    #[test]
    fn decodes_i32_const() {
        let bytes = [0x41, 0x2a]; // i32.const 42
        let (instr, len) = decode_instruction(&bytes, 0, &features()).unwrap();
        assert_eq!(instr, Instruction::I32Const(42));
        assert_eq!(len, 2);
    }

    #[test]
    fn decodes_end_as_zero_operand() {
        let (instr, len) = decode_instruction(&[0x0b], 0, &features()).unwrap();
        assert_eq!(instr, Instruction::End);
        assert_eq!(len, 1);
    }

    #[test]
    fn decodes_call_indirect_pair() {
        let bytes = [0x11, 0x03, 0x00];
        let (instr, len) = decode_instruction(&bytes, 0, &features()).unwrap();
        assert_eq!(instr, Instruction::CallIndirect { type_index: 3, table_index: 0 });
        assert_eq!(len, 3);
    }

    #[test]
    fn rejects_sign_extension_when_disabled() {
        let mut f = Features::mvp();
        f.sign_extension = false;
        let err = decode_instruction(&[0xc0], 0, &f).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::FEATURE_DISABLED);
    }

    #[test]
    fn decodes_br_table() {
        // count=2, targets=[1,2], default=0
        let bytes = [0x0e, 0x02, 0x01, 0x02, 0x00];
        let (instr, len) = decode_instruction(&bytes, 0, &features()).unwrap();
        assert_eq!(instr, Instruction::BrTable(BrTable { targets: alloc::vec![1, 2], default: 0 }));
        assert_eq!(len, 5);
    }

    #[test]
    fn decodes_memory_init_via_misc_prefix() {
        let bytes = [MISC_PREFIX, 0x08, 0x00, 0x00];
        let (instr, len) = decode_instruction(&bytes, 0, &features()).unwrap();
        assert_eq!(instr, Instruction::MemoryInit { data_index: 0, mem: 0 });
        assert_eq!(len, 4);
    }

    #[test]
    fn unknown_simd_subcode_is_unknown_opcode() {
        let bytes = [SIMD_PREFIX, 0xff, 0x7f];
        let err = decode_instruction(&bytes, 0, &features()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::UNKNOWN_OPCODE);
    }

    #[test]
    fn threads_require_feature() {
        let bytes = [THREADS_PREFIX, 0x10, 0x00, 0x00];
        let err = decode_instruction(&bytes, 0, &Features::wasm_2_0()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::FEATURE_DISABLED);
    }
}
