// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The lazy module driver: walks the section table in a single linear
//! pass, enforcing the fixed ascending order (Custom excepted) and
//! dispatching each section's payload to its reader in [`crate::sections`].
//!
//! "Lazy" here means the driver never buffers more than one section's
//! worth of parsed state at a time — it does not, for instance, decode
//! every function body up front just to report the module's shape; code
//! section bodies are kept as raw byte spans until [`crate::validate`]
//! walks them.

use alloc::string::String;
use alloc::vec::Vec;

use wafer_error::{kinds, Result};
use wafer_format::leb128;
use wafer_format::{
    read_name, Data, Element, Export, Features, FuncType, Global, Import, Limits, SectionId,
    TableType, MAGIC, VERSION,
};

use crate::sections::{self, FunctionBody, NameSection};

/// A fully decoded core module: every section's contents, plus whichever
/// custom sections were not recognized as `name`.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    pub functions: Vec<u32>,
    pub tables: Vec<TableType>,
    pub memories: Vec<Limits>,
    pub globals: Vec<Global>,
    pub exports: Vec<Export>,
    pub start: Option<u32>,
    pub elements: Vec<Element>,
    pub code: Vec<FunctionBody>,
    pub data: Vec<Data>,
    pub data_count: Option<u32>,
    /// Type indices of module-defined exception tags, in the event index
    /// space (after any imported events).
    pub events: Vec<u32>,
    pub names: Option<NameSection>,
    pub custom_sections: Vec<(String, u64, u32)>,
}

fn read_section_header(bytes: &[u8], pos: usize) -> Result<(u8, usize, usize)> {
    let id_byte = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
    let (size, size_len) = leb128::read_u32(bytes, pos + 1)?;
    Ok((id_byte, pos + 1 + size_len, size as usize))
}

/// Decodes an entire module from `bytes`, honoring `features`.
pub fn decode_module(bytes: &[u8], features: &Features) -> Result<Module> {
    if bytes.len() < 8 {
        return Err(kinds::unexpected_eof(bytes.len() as u64, 8 - bytes.len()));
    }
    if bytes[0..4] != MAGIC {
        return Err(kinds::invalid_magic(0));
    }
    if bytes[4..8] != VERSION {
        let found = u32::from_le_bytes(bytes[4..8].try_into().expect("4-byte slice"));
        return Err(kinds::invalid_version(4, found));
    }

    let mut module = Module::default();
    let mut cursor = 8usize;
    let mut last_ordered: Option<SectionId> = None;

    while cursor < bytes.len() {
        let (id_byte, payload_start, payload_size) = read_section_header(bytes, cursor)?;
        let payload_end = payload_start
            .checked_add(payload_size)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| kinds::unexpected_eof(payload_start as u64, payload_size))?;

        let id = SectionId::from_u8(id_byte).ok_or_else(|| kinds::unknown_section_id(cursor as u64, id_byte))?;

        if id.is_ordered() {
            if let Some(last) = last_ordered {
                if id == last {
                    return Err(kinds::duplicate_section(cursor as u64, section_name(id)));
                }
                if id.layout_order() < last.layout_order() {
                    return Err(kinds::section_out_of_order(cursor as u64, section_name(id)));
                }
            }
            last_ordered = Some(id);
        }

        #[cfg(feature = "logging")]
        log::debug!("decode_module: section {} at offset {}, {} payload bytes", section_name(id), cursor, payload_size);

        match id {
            SectionId::Custom => {
                let (name, name_len) = read_name(bytes, payload_start)?;
                let body_start = payload_start + name_len;
                if name == "name" {
                    module.names = Some(sections::read_name_section(bytes, body_start, payload_end)?);
                } else {
                    module.custom_sections.push((name, body_start as u64, (payload_end - body_start) as u32));
                }
            }
            SectionId::Type => {
                module.types = sections::read_type_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Import => {
                module.imports = sections::read_import_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Function => {
                module.functions = sections::read_function_section(bytes, payload_start, payload_end)?;
            }
            SectionId::Table => {
                module.tables = sections::read_table_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Memory => {
                module.memories = sections::read_memory_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Global => {
                module.globals = sections::read_global_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Export => {
                module.exports = sections::read_export_section(bytes, payload_start, payload_end)?;
            }
            SectionId::Start => {
                module.start = Some(sections::read_start_section(bytes, payload_start, payload_end)?);
            }
            SectionId::Element => {
                module.elements = sections::read_element_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Code => {
                module.code = sections::read_code_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::Data => {
                module.data = sections::read_data_section(bytes, payload_start, payload_end, features)?;
            }
            SectionId::DataCount => {
                module.data_count = Some(sections::read_data_count_section(bytes, payload_start, payload_end)?);
            }
            SectionId::Event => {
                if !features.exceptions {
                    return Err(kinds::feature_disabled(cursor as u64, "event section", "exceptions"));
                }
                // Tags carry a type index just like functions do, so the
                // section shape is the same vector-of-indices encoding —
                // but they live in their own index space, not the function
                // one.
                module.events = sections::read_function_section(bytes, payload_start, payload_end)?;
            }
        }

        cursor = payload_end;
    }

    if module.functions.len() != module.code.len() {
        return Err(kinds::function_code_count_mismatch(module.functions.len() as u32, module.code.len() as u32));
    }
    if let Some(count) = module.data_count {
        if count as usize != module.data.len() {
            return Err(kinds::data_count_mismatch());
        }
    }

    Ok(module)
}

fn section_name(id: SectionId) -> &'static str {
    match id {
        SectionId::Custom => "custom",
        SectionId::Type => "type",
        SectionId::Import => "import",
        SectionId::Function => "function",
        SectionId::Table => "table",
        SectionId::Memory => "memory",
        SectionId::Global => "global",
        SectionId::Export => "export",
        SectionId::Start => "start",
        SectionId::Element => "element",
        SectionId::Code => "code",
        SectionId::Data => "data",
        SectionId::DataCount => "data count",
        SectionId::Event => "event",
    }
}

/// A tagged-dispatch callback table over a decoded module's top-level
/// entities, for callers who only care about a handful of sections and
/// would rather not match on every field of [`Module`] themselves. Every
/// method has a no-op default; override only what you need.
pub trait ModuleVisitor {
    fn visit_type(&mut self, _index: u32, _func_type: &FuncType) {}
    fn visit_import(&mut self, _index: u32, _import: &Import) {}
    fn visit_function(&mut self, _index: u32, _type_index: u32) {}
    fn visit_table(&mut self, _index: u32, _table: &TableType) {}
    fn visit_memory(&mut self, _index: u32, _limits: &Limits) {}
    fn visit_global(&mut self, _index: u32, _global: &Global) {}
    fn visit_export(&mut self, _export: &Export) {}
    fn visit_start(&mut self, _func_index: u32) {}
    fn visit_element(&mut self, _index: u32, _element: &Element) {}
    fn visit_code(&mut self, _func_index: u32, _body: &FunctionBody) {}
    fn visit_data(&mut self, _index: u32, _data: &Data) {}
    fn visit_event(&mut self, _index: u32, _type_index: u32) {}
}

/// Drives `visitor` over every entity in `module`, in section order.
pub fn walk_module(module: &Module, visitor: &mut impl ModuleVisitor) {
    for (i, t) in module.types.iter().enumerate() {
        visitor.visit_type(i as u32, t);
    }
    for (i, imp) in module.imports.iter().enumerate() {
        visitor.visit_import(i as u32, imp);
    }
    for (i, type_index) in module.functions.iter().enumerate() {
        visitor.visit_function(i as u32, *type_index);
    }
    for (i, t) in module.tables.iter().enumerate() {
        visitor.visit_table(i as u32, t);
    }
    for (i, m) in module.memories.iter().enumerate() {
        visitor.visit_memory(i as u32, m);
    }
    for (i, g) in module.globals.iter().enumerate() {
        visitor.visit_global(i as u32, g);
    }
    for export in &module.exports {
        visitor.visit_export(export);
    }
    if let Some(start) = module.start {
        visitor.visit_start(start);
    }
    for (i, e) in module.elements.iter().enumerate() {
        visitor.visit_element(i as u32, e);
    }
    for (i, body) in module.code.iter().enumerate() {
        visitor.visit_code(i as u32, body);
    }
    for (i, d) in module.data.iter().enumerate() {
        visitor.visit_data(i as u32, d);
    }
    for (i, type_index) in module.events.iter().enumerate() {
        visitor.visit_event(i as u32, *type_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_module_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION);
        bytes
    }

    #[test]
    fn decodes_smallest_empty_module() {
        let bytes = empty_module_bytes();
        let module = decode_module(&bytes, &Features::wasm_2_0()).unwrap();
        assert!(module.types.is_empty());
        assert!(module.code.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = [0u8; 8];
        let err = decode_module(&bytes, &Features::wasm_2_0()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::INVALID_MAGIC);
    }

    #[test]
    fn rejects_truncated_header() {
        let bytes = [0x00, 0x61, 0x73];
        let err = decode_module(&bytes, &Features::wasm_2_0()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::UNEXPECTED_EOF);
    }

    #[test]
    fn rejects_out_of_order_sections() {
        let mut bytes = empty_module_bytes();
        // Export section (id 7, empty vector) before Type section (id 1).
        bytes.extend_from_slice(&[0x07, 0x01, 0x00]);
        bytes.extend_from_slice(&[0x01, 0x01, 0x00]);
        let err = decode_module(&bytes, &Features::wasm_2_0()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::SECTION_OUT_OF_ORDER);
    }

    #[test]
    fn accepts_data_count_between_element_and_code() {
        let mut bytes = empty_module_bytes();
        // Element section (id 9, empty vector).
        bytes.extend_from_slice(&[0x09, 0x01, 0x00]);
        // DataCount section (id 12, count 0) — layout-ordered before Code
        // even though its wire id is numerically larger.
        bytes.extend_from_slice(&[0x0c, 0x01, 0x00]);
        // Code section (id 10, empty vector).
        bytes.extend_from_slice(&[0x0a, 0x01, 0x00]);
        let module = decode_module(&bytes, &Features::wasm_2_0()).unwrap();
        assert_eq!(module.data_count, Some(0));
    }

    #[test]
    fn rejects_duplicate_sections() {
        let mut bytes = empty_module_bytes();
        bytes.extend_from_slice(&[0x01, 0x01, 0x00]);
        bytes.extend_from_slice(&[0x01, 0x01, 0x00]);
        let err = decode_module(&bytes, &Features::wasm_2_0()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::DUPLICATE_SECTION);
    }

    #[test]
    fn rejects_function_code_count_mismatch() {
        let mut bytes = empty_module_bytes();
        // Type section: one func type () -> ()
        bytes.extend_from_slice(&[0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);
        // Function section: one function using type 0.
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        // No code section at all.
        let err = decode_module(&bytes, &Features::wasm_2_0()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::FUNCTION_CODE_COUNT_MISMATCH);
    }

    #[test]
    fn walk_module_visits_every_type() {
        #[derive(Default)]
        struct CountTypes(u32);
        impl ModuleVisitor for CountTypes {
            fn visit_type(&mut self, _index: u32, _func_type: &FuncType) {
                self.0 += 1;
            }
        }

        let mut bytes = empty_module_bytes();
        bytes.extend_from_slice(&[0x01, 0x07, 0x02, 0x60, 0x00, 0x00, 0x60, 0x00, 0x00]);
        let module = decode_module(&bytes, &Features::wasm_2_0()).unwrap();
        let mut counter = CountTypes::default();
        walk_module(&module, &mut counter);
        assert_eq!(counter.0, 2);
    }
}
