// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Re-encodes a decoded [`crate::module::Module`] back into bytes.
//!
//! The decoder is deliberately lazy: function bodies, constant-expression
//! initializers, and data segment payloads are kept as raw byte spans
//! into the original input rather than parsed into trees. The writer
//! mirrors that design — it copies those spans verbatim from the
//! `source` the module was decoded from, and only re-encodes the parts
//! that were fully structured (counts, type bytes, flags). Every
//! length-prefixed integer it emits is canonical (shortest-form)
//! LEB128, even when the source module used a longer encoding.

use alloc::vec::Vec;

use wafer_format::leb128;
use wafer_format::{
    Data, DataMode, Element, ElementItems, ElementMode, Export, ExternalKind, FuncType, Global,
    Import, ImportDesc, Limits, Mutability, ReferenceType, SectionId, TableType, ValueType, MAGIC,
    VERSION,
};

use crate::module::Module;
use crate::sections::{FunctionBody, NameAssoc, NameSection};

/// Serializes `module` to a standalone `.wasm` byte vector. `source` must
/// be the exact byte slice `module` was decoded from — code bodies,
/// constant expressions, and data payloads are copied out of it.
pub fn write_module(module: &Module, source: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION);

    if !module.types.is_empty() {
        write_section(&mut out, SectionId::Type, |buf| write_type_section(buf, &module.types));
    }
    if !module.imports.is_empty() {
        write_section(&mut out, SectionId::Import, |buf| write_import_section(buf, &module.imports));
    }
    if !module.functions.is_empty() {
        write_section(&mut out, SectionId::Function, |buf| write_u32_vec(buf, &module.functions));
    }
    if !module.tables.is_empty() {
        write_section(&mut out, SectionId::Table, |buf| write_table_section(buf, &module.tables));
    }
    if !module.memories.is_empty() {
        write_section(&mut out, SectionId::Memory, |buf| write_memory_section(buf, &module.memories));
    }
    if !module.events.is_empty() {
        write_section(&mut out, SectionId::Event, |buf| write_u32_vec(buf, &module.events));
    }
    if !module.globals.is_empty() {
        write_section(&mut out, SectionId::Global, |buf| write_global_section(buf, &module.globals, source));
    }
    if !module.exports.is_empty() {
        write_section(&mut out, SectionId::Export, |buf| write_export_section(buf, &module.exports));
    }
    if let Some(start) = module.start {
        write_section(&mut out, SectionId::Start, |buf| leb128::write_u32(start, buf));
    }
    if !module.elements.is_empty() {
        write_section(&mut out, SectionId::Element, |buf| write_element_section(buf, &module.elements, source));
    }
    if let Some(count) = module.data_count {
        write_section(&mut out, SectionId::DataCount, |buf| leb128::write_u32(count, buf));
    }
    if !module.code.is_empty() {
        write_section(&mut out, SectionId::Code, |buf| write_code_section(buf, &module.code, source));
    }
    if !module.data.is_empty() {
        write_section(&mut out, SectionId::Data, |buf| write_data_section(buf, &module.data, source));
    }
    if let Some(names) = &module.names {
        write_section(&mut out, SectionId::Custom, |buf| write_name_section(buf, names));
    }
    for (name, offset, len) in &module.custom_sections {
        write_section(&mut out, SectionId::Custom, |buf| {
            write_name(buf, name);
            buf.extend_from_slice(&source[*offset as usize..(*offset + u64::from(*len)) as usize]);
        });
    }

    out
}

fn write_section(out: &mut Vec<u8>, id: SectionId, body: impl FnOnce(&mut Vec<u8>)) {
    let mut payload = Vec::new();
    body(&mut payload);
    out.push(id.to_u8());
    leb128::write_u32(payload.len() as u32, out);
    out.extend_from_slice(&payload);
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    leb128::write_u32(name.len() as u32, out);
    out.extend_from_slice(name.as_bytes());
}

fn write_u32_vec(out: &mut Vec<u8>, values: &[u32]) {
    leb128::write_u32(values.len() as u32, out);
    for &v in values {
        leb128::write_u32(v, out);
    }
}

fn write_value_type(out: &mut Vec<u8>, ty: ValueType) {
    out.push(ty.encode_byte());
}

fn write_reference_type(out: &mut Vec<u8>, ty: ReferenceType) {
    out.push(ty.encode_byte());
}

fn write_limits(out: &mut Vec<u8>, limits: &Limits) {
    let flags = (limits.max.is_some() as u8) | ((limits.shared as u8) << 1) | ((limits.is_64 as u8) << 2);
    out.push(flags);
    write_limit_value(out, limits.min, limits.is_64);
    if let Some(max) = limits.max {
        write_limit_value(out, max, limits.is_64);
    }
}

fn write_limit_value(out: &mut Vec<u8>, value: u64, is_64: bool) {
    if is_64 {
        leb128::write_u64(value, out);
    } else {
        leb128::write_u32(value as u32, out);
    }
}

fn write_mutability(out: &mut Vec<u8>, mutability: Mutability) {
    out.push(if mutability.is_mutable() { 0x01 } else { 0x00 });
}

fn write_external_kind(out: &mut Vec<u8>, kind: ExternalKind) {
    out.push(match kind {
        ExternalKind::Function => 0x00,
        ExternalKind::Table => 0x01,
        ExternalKind::Memory => 0x02,
        ExternalKind::Global => 0x03,
        ExternalKind::Event => 0x04,
    });
}

fn write_span(out: &mut Vec<u8>, source: &[u8], offset: u64, len: u32) {
    out.extend_from_slice(&source[offset as usize..(offset + u64::from(len)) as usize]);
}

fn write_type_section(out: &mut Vec<u8>, types: &[FuncType]) {
    leb128::write_u32(types.len() as u32, out);
    for func_type in types {
        out.push(0x60);
        leb128::write_u32(func_type.params.len() as u32, out);
        for &ty in &func_type.params {
            write_value_type(out, ty);
        }
        leb128::write_u32(func_type.results.len() as u32, out);
        for &ty in &func_type.results {
            write_value_type(out, ty);
        }
    }
}

fn write_import_section(out: &mut Vec<u8>, imports: &[Import]) {
    leb128::write_u32(imports.len() as u32, out);
    for import in imports {
        write_name(out, &import.module);
        write_name(out, &import.name);
        match &import.desc {
            ImportDesc::Function(type_index) => {
                out.push(0x00);
                leb128::write_u32(*type_index, out);
            }
            ImportDesc::Table(table_type) => {
                out.push(0x01);
                write_reference_type(out, table_type.element);
                write_limits(out, &table_type.limits);
            }
            ImportDesc::Memory(limits) => {
                out.push(0x02);
                write_limits(out, limits);
            }
            ImportDesc::Global(global_type) => {
                out.push(0x03);
                write_value_type(out, global_type.value_type);
                write_mutability(out, global_type.mutability);
            }
            ImportDesc::Event(type_index) => {
                out.push(0x04);
                leb128::write_u32(*type_index, out);
            }
        }
    }
}

fn write_table_section(out: &mut Vec<u8>, tables: &[TableType]) {
    leb128::write_u32(tables.len() as u32, out);
    for table in tables {
        write_reference_type(out, table.element);
        write_limits(out, &table.limits);
    }
}

fn write_memory_section(out: &mut Vec<u8>, memories: &[Limits]) {
    leb128::write_u32(memories.len() as u32, out);
    for limits in memories {
        write_limits(out, limits);
    }
}

fn write_global_section(out: &mut Vec<u8>, globals: &[Global], source: &[u8]) {
    leb128::write_u32(globals.len() as u32, out);
    for global in globals {
        write_value_type(out, global.global_type.value_type);
        write_mutability(out, global.global_type.mutability);
        write_span(out, source, global.init_expr_offset, global.init_expr_len);
    }
}

fn write_export_section(out: &mut Vec<u8>, exports: &[Export]) {
    leb128::write_u32(exports.len() as u32, out);
    for export in exports {
        write_name(out, &export.name);
        write_external_kind(out, export.kind);
        leb128::write_u32(export.index, out);
    }
}

fn write_element_section(out: &mut Vec<u8>, elements: &[Element], source: &[u8]) {
    leb128::write_u32(elements.len() as u32, out);
    for element in elements {
        let uses_expr_items = matches!(element.items, ElementItems::Exprs(_));
        let is_func_ref_default = element.element_type == ReferenceType::FuncRef;

        let flags: u32 = match (&element.mode, uses_expr_items, is_func_ref_default) {
            (ElementMode::Active { table_index: 0, .. }, false, true) => 0,
            (ElementMode::Active { table_index: 0, .. }, true, true) => 0b100,
            (ElementMode::Passive, false, _) => 0b001,
            (ElementMode::Passive, true, _) => 0b101,
            (ElementMode::Active { .. }, false, _) => 0b010,
            (ElementMode::Active { .. }, true, _) => 0b110,
            (ElementMode::Declared, false, _) => 0b011,
            (ElementMode::Declared, true, _) => 0b111,
        };
        leb128::write_u32(flags, out);

        match &element.mode {
            ElementMode::Active { table_index, offset_expr_offset, offset_expr_len } => {
                if flags & 0b010 != 0 {
                    leb128::write_u32(*table_index, out);
                }
                write_span(out, source, *offset_expr_offset, *offset_expr_len);
            }
            ElementMode::Passive | ElementMode::Declared => {}
        }

        if flags & 0b011 != 0 {
            if uses_expr_items {
                write_reference_type(out, element.element_type);
            } else {
                out.push(0x00);
            }
        }

        match &element.items {
            ElementItems::Indices(indices) => write_u32_vec(out, indices),
            ElementItems::Exprs(exprs) => {
                leb128::write_u32(exprs.len() as u32, out);
                for &(offset, len) in exprs {
                    write_span(out, source, offset, len);
                }
            }
        }
    }
}

fn write_code_section(out: &mut Vec<u8>, bodies: &[FunctionBody], source: &[u8]) {
    leb128::write_u32(bodies.len() as u32, out);
    for body in bodies {
        let mut payload = Vec::new();
        leb128::write_u32(body.locals.len() as u32, &mut payload);
        for &(count, ty) in &body.locals {
            leb128::write_u32(count, &mut payload);
            write_value_type(&mut payload, ty);
        }
        write_span(&mut payload, source, body.code_offset, body.code_len);
        leb128::write_u32(payload.len() as u32, out);
        out.extend_from_slice(&payload);
    }
}

fn write_data_section(out: &mut Vec<u8>, segments: &[Data], source: &[u8]) {
    leb128::write_u32(segments.len() as u32, out);
    for data in segments {
        match &data.mode {
            DataMode::Active { memory_index: 0, offset_expr_offset, offset_expr_len } => {
                leb128::write_u32(0, out);
                write_span(out, source, *offset_expr_offset, *offset_expr_len);
            }
            DataMode::Active { memory_index, offset_expr_offset, offset_expr_len } => {
                leb128::write_u32(2, out);
                leb128::write_u32(*memory_index, out);
                write_span(out, source, *offset_expr_offset, *offset_expr_len);
            }
            DataMode::Passive => {
                leb128::write_u32(1, out);
            }
        }
        leb128::write_u32(data.len, out);
        write_span(out, source, data.offset, data.len);
    }
}

fn write_name_map(out: &mut Vec<u8>, assocs: &[NameAssoc]) {
    leb128::write_u32(assocs.len() as u32, out);
    for assoc in assocs {
        leb128::write_u32(assoc.index, out);
        write_name(out, &assoc.name);
    }
}

fn write_name_section(out: &mut Vec<u8>, names: &NameSection) {
    write_name(out, "name");
    if let Some(module_name) = &names.module_name {
        write_subsection(out, 0, |buf| write_name(buf, module_name));
    }
    if !names.function_names.is_empty() {
        write_subsection(out, 1, |buf| write_name_map(buf, &names.function_names));
    }
    if !names.local_names.is_empty() {
        write_subsection(out, 2, |buf| {
            leb128::write_u32(names.local_names.len() as u32, buf);
            for (func_index, assocs) in &names.local_names {
                leb128::write_u32(*func_index, buf);
                write_name_map(buf, assocs);
            }
        });
    }
}

fn write_subsection(out: &mut Vec<u8>, id: u8, body: impl FnOnce(&mut Vec<u8>)) {
    let mut payload = Vec::new();
    body(&mut payload);
    out.push(id);
    leb128::write_u32(payload.len() as u32, out);
    out.extend_from_slice(&payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::decode_module;
    use wafer_format::Features;

    #[test]
    fn round_trips_smallest_empty_module() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION);
        let module = decode_module(&bytes, &Features::wasm_2_0()).unwrap();
        let written = write_module(&module, &bytes);
        assert_eq!(written, bytes);
    }

    #[test]
    fn round_trips_module_with_one_exported_function() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION);
        bytes.extend_from_slice(&[0x01, 0x04, 0x01, 0x60, 0x00, 0x00]); // type: () -> ()
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]); // function 0: type 0
        bytes.extend_from_slice(&[0x07, 0x05, 0x01, 0x01, b'f', 0x00, 0x00]); // export "f" func 0
        bytes.extend_from_slice(&[0x0a, 0x04, 0x01, 0x02, 0x00, 0x0b]); // code: 1 body, no locals, end

        let module = decode_module(&bytes, &Features::wasm_2_0()).unwrap();
        let written = write_module(&module, &bytes);
        assert_eq!(written, bytes);

        let reparsed = decode_module(&written, &Features::wasm_2_0()).unwrap();
        assert_eq!(reparsed.exports.len(), 1);
        assert_eq!(reparsed.exports[0].name, "f");
    }
}
