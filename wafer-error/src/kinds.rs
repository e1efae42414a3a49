// wafer - wafer-error
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! One constructor function per entry in the error taxonomy.
//!
//! Call sites build errors through these rather than `Error::new` directly,
//! so the category/code pairing for a given failure lives in exactly one
//! place.

use alloc::format;
use alloc::string::String;

use crate::codes;
use crate::errors::{Error, ErrorCategory};

// --- Structural ---

/// Fewer bytes remained than `needed` more at `pos`.
pub fn unexpected_eof(pos: u64, needed: usize) -> Error {
    Error::new(
        ErrorCategory::Structural,
        codes::UNEXPECTED_EOF,
        format!("unexpected end of input: {needed} more byte(s) required"),
    )
    .at_offset(pos)
}

/// A LEB128 integer kept its continuation bit set past the maximum byte
/// count for its target width.
pub fn integer_representation_too_long(pos: u64) -> Error {
    Error::new(
        ErrorCategory::Structural,
        codes::INTEGER_REPRESENTATION_TOO_LONG,
        "integer representation too long",
    )
    .at_offset(pos)
}

/// A LEB128 integer decoded to a magnitude that does not fit its target
/// width, or whose final byte's unused high bits disagree with the sign of
/// the value so far.
pub fn integer_too_large(pos: u64) -> Error {
    Error::new(ErrorCategory::Structural, codes::INTEGER_TOO_LARGE, "integer too large").at_offset(pos)
}

/// The 4-byte magic number was not `\0asm`.
pub fn invalid_magic(pos: u64) -> Error {
    Error::new(ErrorCategory::Structural, codes::INVALID_MAGIC, "invalid magic number").at_offset(pos)
}

/// The 4-byte version field named a version this decoder does not
/// understand.
pub fn invalid_version(pos: u64, found: u32) -> Error {
    Error::new(ErrorCategory::Structural, codes::INVALID_VERSION, format!("unsupported version {found}"))
        .at_offset(pos)
}

/// A section id byte did not name a known section.
pub fn unknown_section_id(pos: u64, id: u8) -> Error {
    Error::new(ErrorCategory::Structural, codes::UNKNOWN_SECTION_ID, format!("unknown section id {id}"))
        .at_offset(pos)
}

/// A known section appeared out of the module's fixed ascending order.
pub fn section_out_of_order(pos: u64, section: impl Into<String>) -> Error {
    Error::new(
        ErrorCategory::Structural,
        codes::SECTION_OUT_OF_ORDER,
        format!("section {} appeared out of order", section.into()),
    )
    .at_offset(pos)
}

/// A known section (other than Custom) appeared more than once.
pub fn duplicate_section(pos: u64, section: impl Into<String>) -> Error {
    Error::new(
        ErrorCategory::Structural,
        codes::DUPLICATE_SECTION,
        format!("duplicate section {}", section.into()),
    )
    .at_offset(pos)
}

/// A section's declared element count cannot fit in the bytes remaining in
/// its span.
pub fn section_size_mismatch(pos: u64) -> Error {
    Error::new(
        ErrorCategory::Structural,
        codes::SECTION_SIZE_MISMATCH,
        "section element count inconsistent with section size",
    )
    .at_offset(pos)
}

// --- Encoding ---

/// A byte string claimed to be UTF-8 failed the Unicode encoding form at
/// byte `pos` relative to the start of the input.
pub fn invalid_utf8(pos: u64) -> Error {
    Error::new(ErrorCategory::Encoding, codes::INVALID_UTF8, "invalid UTF-8").at_offset(pos)
}

/// An opcode (or prefixed-opcode subcode) has no defined meaning.
pub fn unknown_opcode(pos: u64, opcode: u32) -> Error {
    Error::new(ErrorCategory::Encoding, codes::UNKNOWN_OPCODE, format!("unknown opcode 0x{opcode:x}"))
        .at_offset(pos)
}

/// A flags byte used bit patterns with no defined meaning.
pub fn invalid_flag_bits(pos: u64, flags: u32) -> Error {
    Error::new(ErrorCategory::Encoding, codes::INVALID_FLAG_BITS, format!("invalid flag bits 0x{flags:x}"))
        .at_offset(pos)
}

/// A byte reserved by the spec to be zero was non-zero.
pub fn reserved_byte_nonzero(pos: u64) -> Error {
    Error::new(ErrorCategory::Encoding, codes::RESERVED_BYTE_NONZERO, "reserved byte must be zero")
        .at_offset(pos)
}

/// A value-type byte has no defined meaning.
pub fn invalid_value_type(pos: u64, byte: u8) -> Error {
    Error::new(
        ErrorCategory::Encoding,
        codes::INVALID_VALUE_TYPE,
        format!("invalid value type byte 0x{byte:x}"),
    )
    .at_offset(pos)
}

/// A reference-type byte has no defined meaning.
pub fn invalid_reference_type(pos: u64, byte: u8) -> Error {
    Error::new(
        ErrorCategory::Encoding,
        codes::INVALID_REFERENCE_TYPE,
        format!("invalid reference type byte 0x{byte:x}"),
    )
    .at_offset(pos)
}

/// A block-type encoding was neither the void byte, a value-type byte, nor
/// a valid non-negative type index.
pub fn invalid_block_type(pos: u64) -> Error {
    Error::new(ErrorCategory::Encoding, codes::INVALID_BLOCK_TYPE, "invalid block type encoding")
        .at_offset(pos)
}

/// A string literal's backslash escape named no defined escape sequence.
pub fn invalid_escape(pos: u64) -> Error {
    Error::new(ErrorCategory::Encoding, codes::INVALID_ESCAPE, "invalid escape sequence").at_offset(pos)
}

/// A byte outside the text format's allowed character set appeared where a
/// token was expected.
pub fn invalid_character(pos: u64, byte: u8) -> Error {
    Error::new(ErrorCategory::Encoding, codes::INVALID_CHARACTER, format!("invalid character 0x{byte:x}"))
        .at_offset(pos)
}

// --- Feature-gated ---

/// `construct` requires `feature`, which the active configuration does not
/// enable.
pub fn feature_disabled(pos: u64, construct: impl Into<String>, feature: &'static str) -> Error {
    Error::new(
        ErrorCategory::FeatureGated,
        codes::FEATURE_DISABLED,
        format!("{} requires the '{feature}' feature", construct.into()),
    )
    .at_offset(pos)
}

// --- Module validation ---

/// `index` referenced an entry beyond the end of `space`, which only has
/// `len` entries.
pub fn index_out_of_bounds(space: &'static str, index: u32, len: u32) -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::INDEX_OUT_OF_BOUNDS,
        format!("{space} index {index} out of bounds (have {len})"),
    )
}

/// Two exports used the same `name`.
pub fn duplicate_export(name: impl Into<String>) -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::DUPLICATE_EXPORT,
        format!("duplicate export name {:?}", name.into()),
    )
}

/// The start function's type was not `[] -> []`.
pub fn invalid_start_signature(func_index: u32) -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::INVALID_START_SIGNATURE,
        format!("start function {func_index} must have type [] -> []"),
    )
}

/// More than one memory was declared/imported without `multi-memory`.
pub fn multiple_memories() -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::MULTIPLE_MEMORIES,
        "more than one memory requires the 'multi-memory' feature",
    )
}

/// The data-count section's count disagreed with the data section, or is
/// missing while a bulk-memory data instruction needs it.
pub fn data_count_mismatch() -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::DATA_COUNT_MISMATCH,
        "data count section inconsistent with data section",
    )
}

/// A memory's or table's limits were internally inconsistent or exceeded
/// the format's ceiling.
pub fn invalid_limits() -> Error {
    Error::new(ErrorCategory::ModuleValidation, codes::INVALID_LIMITS, "invalid limits: min exceeds max")
}

/// A table referenced where a `funcref` table is required held a different
/// element type.
pub fn type_mismatch_table() -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::TYPE_MISMATCH_TABLE,
        "table element type must be funcref here",
    )
}

/// The function section declared a different number of functions than the
/// code section supplied bodies for.
pub fn function_code_count_mismatch(functions: u32, bodies: u32) -> Error {
    Error::new(
        ErrorCategory::ModuleValidation,
        codes::FUNCTION_CODE_COUNT_MISMATCH,
        format!("function section declares {functions} function(s) but code section has {bodies} bodie(s)"),
    )
}

// --- Code validation ---

/// An instruction's operand did not match the type it required.
pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Error {
    Error::new(
        ErrorCategory::CodeValidation,
        codes::TYPE_MISMATCH,
        format!("type mismatch: expected {}, found {}", expected.into(), found.into()),
    )
}

/// The value stack held fewer values than an instruction needed to pop.
pub fn stack_underflow() -> Error {
    Error::new(ErrorCategory::CodeValidation, codes::STACK_UNDERFLOW, "value stack underflow")
}

/// At `end`/`else`, the value stack did not match the frame's declared
/// result arity/types exactly.
pub fn stack_height_mismatch() -> Error {
    Error::new(
        ErrorCategory::CodeValidation,
        codes::STACK_HEIGHT_MISMATCH,
        "value stack height does not match block result type",
    )
}

/// A branch targeted a label depth beyond the current label stack.
pub fn unknown_label(depth: u32) -> Error {
    Error::new(ErrorCategory::CodeValidation, codes::UNKNOWN_LABEL, format!("unknown label {depth}"))
}

/// `global.set` targeted an immutable global.
pub fn immutable_global(global_index: u32) -> Error {
    Error::new(
        ErrorCategory::CodeValidation,
        codes::IMMUTABLE_GLOBAL,
        format!("global {global_index} is immutable"),
    )
}

/// `ref.func` named a function index not reachable from any declared
/// element segment or export.
pub fn undeclared_function_reference(func_index: u32) -> Error {
    Error::new(
        ErrorCategory::CodeValidation,
        codes::UNDECLARED_FUNCTION_REFERENCE,
        format!("function {func_index} is not declared for ref.func"),
    )
}

/// `br_table`'s targets did not all agree on label-type arity.
pub fn inconsistent_label_arity() -> Error {
    Error::new(
        ErrorCategory::CodeValidation,
        codes::INCONSISTENT_LABEL_ARITY,
        "br_table targets disagree on label arity",
    )
}

/// A function body had unread bytes after its final `end`, or never
/// reached one.
pub fn malformed_function_body() -> Error {
    Error::new(
        ErrorCategory::CodeValidation,
        codes::MALFORMED_FUNCTION_BODY,
        "function body malformed: missing or misplaced end",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_eof_carries_offset() {
        let err = unexpected_eof(12, 4);
        assert_eq!(err.offset, Some(12));
        assert_eq!(err.code, codes::UNEXPECTED_EOF);
    }

    #[test]
    fn type_mismatch_message_names_both_types() {
        let err = type_mismatch("i32", "i64");
        assert!(err.message.contains("i32"));
        assert!(err.message.contains("i64"));
    }
}
