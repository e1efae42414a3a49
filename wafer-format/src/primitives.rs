// wafer - wafer-format
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Binary primitives shared by every section reader: value/reference/block
//! types, `Limits`, `Mutability`, `ExternalKind`, length-prefixed vectors,
//! and the UTF-8 name reader.

use alloc::string::String;
use alloc::vec::Vec;

use wafer_error::{kinds, Result};

use crate::leb128;

/// A WebAssembly number, vector, or reference type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
    V128,
    FuncRef,
    ExternRef,
    /// The bottom reference type (`function_references`): a subtype of
    /// every reference type.
    NullRef,
    /// The exception reference type (`exceptions`).
    ExnRef,
}

impl ValueType {
    /// Decodes a value-type byte. `v128` requires `simd`; the reference
    /// types require `reference_types`.
    pub fn read(bytes: &[u8], pos: usize, features: &crate::Features) -> Result<(Self, usize)> {
        let byte = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
        let ty = match byte {
            0x7f => Self::I32,
            0x7e => Self::I64,
            0x7d => Self::F32,
            0x7c => Self::F64,
            0x7b if features.simd => Self::V128,
            0x7b => return Err(kinds::feature_disabled(pos as u64, "v128", "simd")),
            0x70 => Self::FuncRef,
            0x6f if features.reference_types => Self::ExternRef,
            0x6f => return Err(kinds::feature_disabled(pos as u64, "externref", "reference-types")),
            0x71 if features.function_references => Self::NullRef,
            0x71 => return Err(kinds::feature_disabled(pos as u64, "nullref", "function-references")),
            0x69 if features.exceptions => Self::ExnRef,
            0x69 => return Err(kinds::feature_disabled(pos as u64, "exnref", "exceptions")),
            _ => return Err(kinds::invalid_value_type(pos as u64, byte)),
        };
        Ok((ty, 1))
    }

    /// Encodes this type as its single defining byte.
    pub fn encode_byte(self) -> u8 {
        match self {
            Self::I32 => 0x7f,
            Self::I64 => 0x7e,
            Self::F32 => 0x7d,
            Self::F64 => 0x7c,
            Self::V128 => 0x7b,
            Self::FuncRef => 0x70,
            Self::ExternRef => 0x6f,
            Self::NullRef => 0x71,
            Self::ExnRef => 0x69,
        }
    }

    /// True for any reference type (`funcref`/`externref`/`nullref`/
    /// `exnref`).
    pub fn is_reference(self) -> bool {
        matches!(self, Self::FuncRef | Self::ExternRef | Self::NullRef | Self::ExnRef)
    }
}

/// A reference type, the restriction of [`ValueType`] used by tables and
/// `ref.null`/`ref.func`/`ref.is_null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    FuncRef,
    ExternRef,
}

impl ReferenceType {
    pub fn read(bytes: &[u8], pos: usize, features: &crate::Features) -> Result<(Self, usize)> {
        let byte = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
        let ty = match byte {
            0x70 => Self::FuncRef,
            0x6f if features.reference_types => Self::ExternRef,
            0x6f => return Err(kinds::feature_disabled(pos as u64, "externref", "reference-types")),
            _ => return Err(kinds::invalid_reference_type(pos as u64, byte)),
        };
        Ok((ty, 1))
    }

    pub fn encode_byte(self) -> u8 {
        match self {
            Self::FuncRef => 0x70,
            Self::ExternRef => 0x6f,
        }
    }
}

impl From<ReferenceType> for ValueType {
    fn from(rt: ReferenceType) -> Self {
        match rt {
            ReferenceType::FuncRef => Self::FuncRef,
            ReferenceType::ExternRef => Self::ExternRef,
        }
    }
}

/// The result type of a `block`/`loop`/`if`: empty, a single value type, or
/// a reference to a function type in the type section (requires
/// `multi_value` when it names more than one result).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Empty,
    Value(ValueType),
    FuncType(u32),
}

impl BlockType {
    /// Decodes a block type: `0x40` (empty), a value-type byte, or a
    /// non-negative `s33` naming a type index.
    pub fn read(bytes: &[u8], pos: usize, features: &crate::Features) -> Result<(Self, usize)> {
        if bytes.get(pos) == Some(&0x40) {
            return Ok((Self::Empty, 1));
        }
        if let Some(&byte) = bytes.get(pos) {
            if matches!(byte, 0x7f | 0x7e | 0x7d | 0x7c | 0x7b | 0x70 | 0x6f | 0x71 | 0x69) {
                let (vt, len) = ValueType::read(bytes, pos, features)?;
                return Ok((Self::Value(vt), len));
            }
        }
        let (raw, len) = leb128::read_s33(bytes, pos)?;
        if raw < 0 {
            return Err(kinds::invalid_block_type(pos as u64));
        }
        Ok((Self::FuncType(raw as u32), len))
    }
}

/// Table/memory bounds: a required minimum and an optional maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: u64,
    pub max: Option<u64>,
    /// `true` for a 64-bit (`memory64`) memory/table index space.
    pub is_64: bool,
    /// `true` if the memory is declared `shared` (requires `threads`).
    pub shared: bool,
}

impl Limits {
    /// Decodes the flags byte + min (+ max) encoding used by memories and
    /// tables. Flag bit 0 selects the presence of `max`, bit 1 selects
    /// `shared` (memories only, requires `threads`), bit 2 selects 64-bit
    /// indices (requires `memory64`).
    pub fn read(bytes: &[u8], pos: usize, features: &crate::Features) -> Result<(Self, usize)> {
        let flags = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
        if flags & !0b111 != 0 {
            return Err(kinds::invalid_flag_bits(pos as u64, u32::from(flags)));
        }
        let has_max = flags & 0b001 != 0;
        let shared = flags & 0b010 != 0;
        let is_64 = flags & 0b100 != 0;
        if shared && !features.threads {
            return Err(kinds::feature_disabled(pos as u64, "shared memory", "threads"));
        }
        if is_64 && !features.memory64 {
            return Err(kinds::feature_disabled(pos as u64, "64-bit memory", "memory64"));
        }

        let mut cursor = pos + 1;
        let (min, min_len) = read_limit_value(bytes, cursor, is_64)?;
        cursor += min_len;
        let max = if has_max {
            let (value, len) = read_limit_value(bytes, cursor, is_64)?;
            cursor += len;
            Some(value)
        } else {
            None
        };

        if let Some(max) = max {
            if min > max {
                return Err(kinds::invalid_limits());
            }
        }

        Ok((Self { min, max, is_64, shared }, cursor - pos))
    }
}

fn read_limit_value(bytes: &[u8], pos: usize, is_64: bool) -> Result<(u64, usize)> {
    if is_64 {
        leb128::read_u64(bytes, pos)
    } else {
        leb128::read_u32(bytes, pos).map(|(v, len)| (u64::from(v), len))
    }
}

/// Whether a global can be updated after instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Const,
    Var,
}

impl Mutability {
    pub fn read(bytes: &[u8], pos: usize) -> Result<(Self, usize)> {
        let byte = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
        match byte {
            0x00 => Ok((Self::Const, 1)),
            0x01 => Ok((Self::Var, 1)),
            _ => Err(kinds::invalid_flag_bits(pos as u64, u32::from(byte))),
        }
    }

    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Var)
    }
}

/// The kind of entity an import or export names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    Function,
    Table,
    Memory,
    Global,
    Event,
}

impl ExternalKind {
    pub fn read(bytes: &[u8], pos: usize) -> Result<(Self, usize)> {
        let byte = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
        match byte {
            0x00 => Ok((Self::Function, 1)),
            0x01 => Ok((Self::Table, 1)),
            0x02 => Ok((Self::Memory, 1)),
            0x03 => Ok((Self::Global, 1)),
            0x04 => Ok((Self::Event, 1)),
            _ => Err(kinds::invalid_flag_bits(pos as u64, u32::from(byte))),
        }
    }
}

/// Reads a length-prefixed UTF-8 name, validating the full Unicode
/// encoding form (not just ASCII), and returns it alongside the number of
/// bytes (prefix + payload) consumed.
pub fn read_name(bytes: &[u8], pos: usize) -> Result<(String, usize)> {
    let (len, len_size) = leb128::read_u32(bytes, pos)?;
    let start = pos + len_size;
    let end = start
        .checked_add(len as usize)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| kinds::unexpected_eof(start as u64, len as usize))?;
    let slice = &bytes[start..end];
    let s = validate_utf8(slice, start as u64)?;
    Ok((String::from(s), len_size + len as usize))
}

/// Validates `bytes` as UTF-8 per RFC 3629, reporting the absolute offset
/// of the first invalid byte on failure rather than a relative one.
pub fn validate_utf8(bytes: &[u8], base_offset: u64) -> Result<&str> {
    core::str::from_utf8(bytes).map_err(|e| {
        let pos = base_offset + e.valid_up_to() as u64;
        kinds::invalid_utf8(pos)
    })
}

/// Reads a length-prefixed vector by applying `read_elem` to each entry in
/// turn, returning the elements and total bytes consumed (including the
/// length prefix). The declared count is rejected before it is ever used
/// to size an allocation if it exceeds the bytes remaining in `bytes`,
/// since every element takes at least one byte to encode.
pub fn read_vec<T>(
    bytes: &[u8],
    pos: usize,
    mut read_elem: impl FnMut(&[u8], usize) -> Result<(T, usize)>,
) -> Result<(Vec<T>, usize)> {
    let (count, len_size) = leb128::read_u32(bytes, pos)?;
    let mut cursor = pos + len_size;
    let remaining = bytes.len().saturating_sub(cursor);
    if count as usize > remaining {
        return Err(kinds::integer_too_large(pos as u64));
    }
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (elem, elem_len) = read_elem(bytes, cursor)?;
        cursor += elem_len;
        out.push(elem);
    }
    Ok((out, cursor - pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> crate::Features {
        crate::Features::wasm_2_0()
    }

    #[test]
    fn value_type_round_trip() {
        for &(byte, expected) in &[
            (0x7fu8, ValueType::I32),
            (0x7e, ValueType::I64),
            (0x7d, ValueType::F32),
            (0x7c, ValueType::F64),
            (0x70, ValueType::FuncRef),
        ] {
            let (ty, len) = ValueType::read(&[byte], 0, &features()).unwrap();
            assert_eq!(ty, expected);
            assert_eq!(len, 1);
            assert_eq!(ty.encode_byte(), byte);
        }
    }

    #[test]
    fn v128_requires_simd() {
        let mut f = features();
        f.simd = false;
        let err = ValueType::read(&[0x7b], 0, &f).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::FEATURE_DISABLED);
    }

    #[test]
    fn limits_rejects_min_greater_than_max() {
        // flags=1 (has max), min=5, max=3
        let err = Limits::read(&[0x01, 0x05, 0x03], 0, &features()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::INVALID_LIMITS);
    }

    #[test]
    fn limits_without_max() {
        let (limits, len) = Limits::read(&[0x00, 0x01], 0, &features()).unwrap();
        assert_eq!(limits.min, 1);
        assert_eq!(limits.max, None);
        assert_eq!(len, 2);
    }

    #[test]
    fn name_round_trips_utf8() {
        let mut bytes = Vec::new();
        crate::leb128::write_u32(5, &mut bytes);
        bytes.extend_from_slice("hello".as_bytes());
        let (name, len) = read_name(&bytes, 0).unwrap();
        assert_eq!(name, "hello");
        assert_eq!(len, bytes.len());
    }

    #[test]
    fn name_rejects_invalid_utf8() {
        let mut bytes = Vec::new();
        crate::leb128::write_u32(2, &mut bytes);
        bytes.extend_from_slice(&[0xff, 0xfe]);
        let err = read_name(&bytes, 0).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::INVALID_UTF8);
    }

    #[test]
    fn block_type_empty_and_value_and_index() {
        let (bt, len) = BlockType::read(&[0x40], 0, &features()).unwrap();
        assert_eq!(bt, BlockType::Empty);
        assert_eq!(len, 1);

        let (bt, _) = BlockType::read(&[0x7f], 0, &features()).unwrap();
        assert_eq!(bt, BlockType::Value(ValueType::I32));

        let (bt, _) = BlockType::read(&[0x05], 0, &features()).unwrap();
        assert_eq!(bt, BlockType::FuncType(5));
    }
}
