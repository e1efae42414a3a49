// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Readers for the payload of each section kind.
//!
//! Every reader here takes the full module byte slice plus the absolute
//! `[pos, end)` range of the section's payload, so errors always carry an
//! absolute offset into the module being decoded — never an offset
//! relative to the section. The module driver in [`crate::module`] is
//! responsible for slicing out `end` from the section's declared size and
//! checking the reader consumed exactly that many bytes.

use alloc::string::String;
use alloc::vec::Vec;

use wafer_error::{kinds, Result};
use wafer_format::leb128;
use wafer_format::{
    read_name, read_vec, BlockType, Data, DataMode, Element, ElementItems, ElementMode, Export,
    ExternalKind, Features, FuncType, Global, GlobalType, Import, ImportDesc, Limits, Mutability,
    ReferenceType, TableType, ValueType,
};

fn check_exact(pos: usize, end: usize) -> Result<()> {
    if pos != end {
        return Err(kinds::section_size_mismatch(pos as u64));
    }
    Ok(())
}

/// A single entry of the `name` custom section's function-name or
/// local-name subsections: an index paired with its UTF-8 name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAssoc {
    pub index: u32,
    pub name: String,
}

/// The decoded `name` custom section: module name, function names, and
/// per-function local names, in strictly ascending subsection-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSection {
    pub module_name: Option<String>,
    pub function_names: Vec<NameAssoc>,
    pub local_names: Vec<(u32, Vec<NameAssoc>)>,
}

pub fn read_type_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<FuncType>> {
    let (types, len) = read_vec(bytes, pos, |bytes, pos| {
        let tag = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
        if tag != 0x60 {
            return Err(kinds::invalid_flag_bits(pos as u64, u32::from(tag)));
        }
        let (params, l1) = read_vec(bytes, pos + 1, |b, p| ValueType::read(b, p, features))?;
        let (results, l2) = read_vec(bytes, pos + 1 + l1, |b, p| ValueType::read(b, p, features))?;
        if results.len() > 1 && !features.multi_value {
            return Err(kinds::feature_disabled(pos as u64, "multiple results", "multi-value"));
        }
        Ok((FuncType { params, results }, 1 + l1 + l2))
    })?;
    check_exact(pos + len, end)?;
    Ok(types)
}

fn read_import_desc(bytes: &[u8], pos: usize, features: &Features) -> Result<(ImportDesc, usize)> {
    let kind = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
    match kind {
        0x00 => {
            let (idx, l) = leb128::read_u32(bytes, pos + 1)?;
            Ok((ImportDesc::Function(idx), 1 + l))
        }
        0x01 => {
            let (elem, l1) = ReferenceType::read(bytes, pos + 1, features)?;
            let (limits, l2) = Limits::read(bytes, pos + 1 + l1, features)?;
            Ok((ImportDesc::Table(TableType { element: elem, limits }), 1 + l1 + l2))
        }
        0x02 => {
            let (limits, l) = Limits::read(bytes, pos + 1, features)?;
            Ok((ImportDesc::Memory(limits), 1 + l))
        }
        0x03 => {
            let (value_type, l1) = ValueType::read(bytes, pos + 1, features)?;
            let (mutability, l2) = Mutability::read(bytes, pos + 1 + l1)?;
            if mutability.is_mutable() && !features.mutable_globals {
                return Err(kinds::feature_disabled(pos as u64, "mutable global import", "mutable-globals"));
            }
            Ok((ImportDesc::Global(GlobalType { value_type, mutability }), 1 + l1 + l2))
        }
        0x04 => {
            if !features.exceptions {
                return Err(kinds::feature_disabled(pos as u64, "event import", "exceptions"));
            }
            let (idx, l) = leb128::read_u32(bytes, pos + 1)?;
            Ok((ImportDesc::Event(idx), 1 + l))
        }
        _ => Err(kinds::invalid_flag_bits(pos as u64, u32::from(kind))),
    }
}

pub fn read_import_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<Import>> {
    let (imports, len) = read_vec(bytes, pos, |bytes, pos| {
        let (module, l1) = read_name(bytes, pos)?;
        let (name, l2) = read_name(bytes, pos + l1)?;
        let (desc, l3) = read_import_desc(bytes, pos + l1 + l2, features)?;
        Ok((Import { module, name, desc }, l1 + l2 + l3))
    })?;
    check_exact(pos + len, end)?;
    Ok(imports)
}

pub fn read_function_section(bytes: &[u8], pos: usize, end: usize) -> Result<Vec<u32>> {
    let (indices, len) = read_vec(bytes, pos, leb128::read_u32)?;
    check_exact(pos + len, end)?;
    Ok(indices)
}

pub fn read_table_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<TableType>> {
    let (tables, len) = read_vec(bytes, pos, |bytes, pos| {
        let (element, l1) = ReferenceType::read(bytes, pos, features)?;
        let (limits, l2) = Limits::read(bytes, pos + l1, features)?;
        Ok((TableType { element, limits }, l1 + l2))
    })?;
    check_exact(pos + len, end)?;
    Ok(tables)
}

pub fn read_memory_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<Limits>> {
    let (memories, len) = read_vec(bytes, pos, |bytes, pos| Limits::read(bytes, pos, features))?;
    check_exact(pos + len, end)?;
    if memories.len() > 1 && !features.multi_memory {
        return Err(kinds::multiple_memories());
    }
    Ok(memories)
}

/// Reads a constant expression and returns its `(offset, len)` byte span,
/// without interpreting it. The span runs from `pos` up to and including
/// the terminating `end` (0x0b) opcode.
pub fn read_const_expr_span(bytes: &[u8], pos: usize, features: &wafer_format::Features) -> Result<(u64, u32, usize)> {
    let mut cursor = pos;
    loop {
        let (instr, len) = crate::instructions::decode_instruction(bytes, cursor, features)?;
        cursor += len;
        if instr == crate::instructions::Instruction::End {
            break;
        }
    }
    Ok((pos as u64, (cursor - pos) as u32, cursor - pos))
}

pub fn read_global_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<Global>> {
    let mut cursor = pos;
    let (count, len) = leb128::read_u32(bytes, pos)?;
    cursor += len;
    let remaining = end.saturating_sub(cursor);
    if count as usize > remaining {
        return Err(kinds::integer_too_large(pos as u64));
    }
    let mut globals = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (value_type, l1) = ValueType::read(bytes, cursor, features)?;
        let (mutability, l2) = Mutability::read(bytes, cursor + l1)?;
        let expr_start = cursor + l1 + l2;
        let (init_expr_offset, init_expr_len, expr_len) = read_const_expr_span(bytes, expr_start, features)?;
        globals.push(Global { global_type: GlobalType { value_type, mutability }, init_expr_offset, init_expr_len });
        cursor = expr_start + expr_len;
    }
    check_exact(cursor, end)?;
    Ok(globals)
}

fn read_export_kind(bytes: &[u8], pos: usize) -> Result<(ExternalKind, usize)> {
    ExternalKind::read(bytes, pos)
}

pub fn read_export_section(bytes: &[u8], pos: usize, end: usize) -> Result<Vec<Export>> {
    let (exports, len) = read_vec(bytes, pos, |bytes, pos| {
        let (name, l1) = read_name(bytes, pos)?;
        let (kind, l2) = read_export_kind(bytes, pos + l1)?;
        let (index, l3) = leb128::read_u32(bytes, pos + l1 + l2)?;
        Ok((Export { name, kind, index }, l1 + l2 + l3))
    })?;
    check_exact(pos + len, end)?;
    Ok(exports)
}

pub fn read_start_section(bytes: &[u8], pos: usize, end: usize) -> Result<u32> {
    let (index, len) = leb128::read_u32(bytes, pos)?;
    check_exact(pos + len, end)?;
    Ok(index)
}

fn read_element_mode(
    bytes: &[u8],
    pos: usize,
    flags: u32,
    features: &Features,
) -> Result<(ElementMode, usize)> {
    match flags & 0b11 {
        0 | 4 => {
            let expr_start = pos;
            let (offset, expr_len, consumed) = read_const_expr_span(bytes, expr_start, features)?;
            Ok((
                ElementMode::Active { table_index: 0, offset_expr_offset: offset, offset_expr_len: expr_len },
                consumed,
            ))
        }
        1 | 5 => Ok((ElementMode::Passive, 0)),
        2 | 6 => {
            let (table_index, l1) = leb128::read_u32(bytes, pos)?;
            let (offset, expr_len, expr_consumed) = read_const_expr_span(bytes, pos + l1, features)?;
            Ok((
                ElementMode::Active { table_index, offset_expr_offset: offset, offset_expr_len: expr_len },
                l1 + expr_consumed,
            ))
        }
        3 | 7 => Ok((ElementMode::Declared, 0)),
        _ => unreachable!("flags & 0b11 is at most 3"),
    }
}

pub fn read_element_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<Element>> {
    let (elements, len) = read_vec(bytes, pos, |bytes, pos| {
        let (flags, l0) = leb128::read_u32(bytes, pos)?;
        if flags > 7 {
            return Err(kinds::invalid_flag_bits(pos as u64, flags));
        }
        if flags != 0 && !features.bulk_memory && !features.reference_types {
            return Err(kinds::feature_disabled(pos as u64, "non-MVP element segment", "bulk-memory"));
        }
        let mut cursor = pos + l0;
        let (mode, mode_len) = read_element_mode(bytes, cursor, flags, features)?;
        cursor += mode_len;

        let uses_expr_items = flags & 0b100 != 0;
        let element_type = if flags & 0b011 == 0 {
            ReferenceType::FuncRef
        } else if uses_expr_items {
            let (rt, l) = ReferenceType::read(bytes, cursor, features)?;
            cursor += l;
            rt
        } else {
            let kind_byte = *bytes.get(cursor).ok_or_else(|| kinds::unexpected_eof(cursor as u64, 1))?;
            if kind_byte != 0x00 {
                return Err(kinds::invalid_flag_bits(cursor as u64, u32::from(kind_byte)));
            }
            cursor += 1;
            ReferenceType::FuncRef
        };

        let (items, items_len) = if uses_expr_items {
            let (exprs, l) = read_vec(bytes, cursor, |bytes, pos| {
                let (offset, elen, consumed) = read_const_expr_span(bytes, pos, features)?;
                Ok(((offset, elen), consumed))
            })?;
            (ElementItems::Exprs(exprs), l)
        } else {
            let (indices, l) = read_vec(bytes, cursor, |bytes, pos| leb128::read_u32(bytes, pos))?;
            (ElementItems::Indices(indices), l)
        };
        cursor += items_len;

        Ok((Element { element_type, mode, items }, cursor - pos))
    })?;
    check_exact(pos + len, end)?;
    Ok(elements)
}

/// A decoded function body: its locals and the raw byte span of its
/// instruction sequence (validated, not parsed into a tree, by
/// [`crate::validate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBody {
    pub locals: Vec<(u32, ValueType)>,
    pub code_offset: u64,
    pub code_len: u32,
}

pub fn read_code_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<FunctionBody>> {
    let (bodies, len) = read_vec(bytes, pos, |bytes, pos| {
        let (body_size, size_len) = leb128::read_u32(bytes, pos)?;
        let body_start = pos + size_len;
        let body_end = body_start
            .checked_add(body_size as usize)
            .ok_or_else(|| kinds::section_size_mismatch(body_start as u64))?;
        if body_end > bytes.len() {
            return Err(kinds::unexpected_eof(body_start as u64, body_size as usize));
        }

        let (local_groups, locals_len) = read_vec(bytes, body_start, |bytes, pos| {
            let (count, l1) = leb128::read_u32(bytes, pos)?;
            let (value_type, l2) = ValueType::read(bytes, pos + l1, features)?;
            Ok(((count, value_type), l1 + l2))
        })?;
        let locals = local_groups;

        let code_offset = (body_start + locals_len) as u64;
        let code_len = (body_end - (body_start + locals_len)) as u32;

        Ok((
            FunctionBody { locals, code_offset, code_len },
            size_len + (body_end - body_start),
        ))
    })?;
    check_exact(pos + len, end)?;
    Ok(bodies)
}

fn read_data_mode(bytes: &[u8], pos: usize, flags: u32, features: &Features) -> Result<(DataMode, usize)> {
    match flags {
        0 => {
            let (offset, expr_len, consumed) = read_const_expr_span(bytes, pos, features)?;
            Ok((DataMode::Active { memory_index: 0, offset_expr_offset: offset, offset_expr_len: expr_len }, consumed))
        }
        1 => Ok((DataMode::Passive, 0)),
        2 => {
            let (memory_index, l1) = leb128::read_u32(bytes, pos)?;
            let (offset, expr_len, expr_consumed) = read_const_expr_span(bytes, pos + l1, features)?;
            Ok((DataMode::Active { memory_index, offset_expr_offset: offset, offset_expr_len: expr_len }, l1 + expr_consumed))
        }
        _ => Err(kinds::invalid_flag_bits(pos as u64, flags)),
    }
}

pub fn read_data_section(bytes: &[u8], pos: usize, end: usize, features: &Features) -> Result<Vec<Data>> {
    let (segments, len) = read_vec(bytes, pos, |bytes, pos| {
        let (flags, l0) = leb128::read_u32(bytes, pos)?;
        if flags != 0 && !features.bulk_memory {
            return Err(kinds::feature_disabled(pos as u64, "passive/explicit-memory data segment", "bulk-memory"));
        }
        let mut cursor = pos + l0;
        let (mode, mode_len) = read_data_mode(bytes, cursor, flags, features)?;
        cursor += mode_len;
        let (byte_len, len_size) = leb128::read_u32(bytes, cursor)?;
        cursor += len_size;
        let data_offset = cursor as u64;
        cursor = cursor
            .checked_add(byte_len as usize)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| kinds::unexpected_eof(data_offset, byte_len as usize))?;
        Ok((Data { mode, offset: data_offset, len: byte_len }, cursor - pos))
    })?;
    check_exact(pos + len, end)?;
    Ok(segments)
}

pub fn read_data_count_section(bytes: &[u8], pos: usize, end: usize) -> Result<u32> {
    let (count, len) = leb128::read_u32(bytes, pos)?;
    check_exact(pos + len, end)?;
    Ok(count)
}

const NAME_MODULE: u8 = 0;
const NAME_FUNCTION: u8 = 1;
const NAME_LOCAL: u8 = 2;

fn read_name_map(bytes: &[u8], pos: usize, end: usize) -> Result<(Vec<NameAssoc>, usize)> {
    let (assocs, len) = read_vec(bytes, pos, |bytes, pos| {
        let (index, l1) = leb128::read_u32(bytes, pos)?;
        let (name, l2) = read_name(bytes, pos + l1)?;
        Ok((NameAssoc { index, name }, l1 + l2))
    })?;
    check_exact(pos + len, end)?;
    Ok((assocs, len))
}

pub fn read_name_section(bytes: &[u8], pos: usize, end: usize) -> Result<NameSection> {
    let mut out = NameSection::default();
    let mut cursor = pos;
    let mut last_id: Option<u8> = None;
    while cursor < end {
        let id = *bytes.get(cursor).ok_or_else(|| kinds::unexpected_eof(cursor as u64, 1))?;
        if let Some(last) = last_id {
            if id <= last {
                return Err(kinds::section_out_of_order(cursor as u64, "name subsection"));
            }
        }
        last_id = Some(id);
        let (size, size_len) = leb128::read_u32(bytes, cursor + 1)?;
        let sub_start = cursor + 1 + size_len;
        let sub_end = sub_start
            .checked_add(size as usize)
            .ok_or_else(|| kinds::section_size_mismatch(sub_start as u64))?;
        match id {
            NAME_MODULE => {
                let (name, len) = read_name(bytes, sub_start)?;
                check_exact(sub_start + len, sub_end)?;
                out.module_name = Some(name);
            }
            NAME_FUNCTION => {
                let (assocs, _) = read_name_map(bytes, sub_start, sub_end)?;
                out.function_names = assocs;
            }
            NAME_LOCAL => {
                let (groups, _) = read_vec(bytes, sub_start, |bytes, pos| {
                    let (func_index, l1) = leb128::read_u32(bytes, pos)?;
                    let (assocs, l2) = read_name_map(bytes, pos + l1, pos + l1 + name_map_len(bytes, pos + l1)?)?;
                    Ok(((func_index, assocs), l1 + l2))
                })?;
                out.local_names = groups;
            }
            _ => {
                // Unknown subsection id: skip, per the custom-section
                // tolerance the rest of the format extends to.
            }
        }
        cursor = sub_end;
    }
    check_exact(cursor, end)?;
    Ok(out)
}

fn name_map_len(bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, l0) = leb128::read_u32(bytes, pos)?;
    let mut cursor = pos + l0;
    for _ in 0..count {
        let (_, l1) = leb128::read_u32(bytes, cursor)?;
        let (_, l2) = read_name(bytes, cursor + l1)?;
        cursor += l1 + l2;
    }
    Ok(cursor - pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> Features {
        Features::wasm_2_0()
    }

    #[test]
    fn type_section_reads_one_func_type() {
        // count=1, (params=[i32], results=[])
        let bytes = [0x01, 0x60, 0x01, 0x7f, 0x00];
        let types = read_type_section(&bytes, 0, bytes.len(), &features()).unwrap();
        assert_eq!(types, alloc::vec![FuncType { params: alloc::vec![ValueType::I32], results: alloc::vec![] }]);
    }

    #[test]
    fn function_section_reads_indices() {
        let bytes = [0x02, 0x00, 0x01];
        let indices = read_function_section(&bytes, 0, bytes.len()).unwrap();
        assert_eq!(indices, alloc::vec![0, 1]);
    }

    #[test]
    fn export_section_reads_one_entry() {
        let mut bytes = Vec::new();
        bytes.push(0x01); // count
        leb128::write_u32(4, &mut bytes);
        bytes.extend_from_slice(b"main");
        bytes.push(0x00); // function kind
        bytes.push(0x00); // index
        let exports = read_export_section(&bytes, 0, bytes.len()).unwrap();
        assert_eq!(exports[0].name, "main");
        assert_eq!(exports[0].kind, ExternalKind::Function);
        assert_eq!(exports[0].index, 0);
    }

    #[test]
    fn memory_section_rejects_second_memory_without_multi_memory() {
        let bytes = [0x02, 0x00, 0x01, 0x00, 0x01];
        let err = read_memory_section(&bytes, 0, bytes.len(), &features()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::MULTIPLE_MEMORIES);
    }

    #[test]
    fn code_section_reads_one_empty_body() {
        // count=1, body_size=2, locals_count=0, end
        let bytes = [0x01, 0x02, 0x00, 0x0b];
        let bodies = read_code_section(&bytes, 0, bytes.len(), &features()).unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].locals.len(), 0);
        assert_eq!(bodies[0].code_len, 1);
    }
}
