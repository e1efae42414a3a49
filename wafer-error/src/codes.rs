// wafer - wafer-error
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Numeric error codes, grouped by range per [`crate::ErrorCategory`].
//!
//! Ranges follow the core specification's error taxonomy (§7): structural
//! (1000s), encoding (2000s), feature-gated (2900s), module validation
//! (3000s), code validation (4000s).

// --- Structural (1000-1999) ---

/// Fewer bytes remained than the construct being decoded required.
pub const UNEXPECTED_EOF: u16 = 1000;
/// A LEB128 integer used more bytes than its width permits with the
/// continuation bit still set.
pub const INTEGER_REPRESENTATION_TOO_LONG: u16 = 1001;
/// A LEB128 integer's decoded magnitude exceeds its target width.
pub const INTEGER_TOO_LARGE: u16 = 1002;
/// The 4-byte magic number was not `\0asm`.
pub const INVALID_MAGIC: u16 = 1003;
/// The 4-byte version was not a version this decoder understands.
pub const INVALID_VERSION: u16 = 1004;
/// A section id byte did not name a known section.
pub const UNKNOWN_SECTION_ID: u16 = 1005;
/// A known section appeared out of the module's fixed ascending order.
pub const SECTION_OUT_OF_ORDER: u16 = 1006;
/// A known section (other than Custom) appeared more than once.
pub const DUPLICATE_SECTION: u16 = 1007;
/// A section's encoded element count, when multiplied by its minimum
/// element size, exceeds the bytes remaining in the enclosing span.
pub const SECTION_SIZE_MISMATCH: u16 = 1008;

// --- Encoding (2000-2899) ---

/// A byte string claimed to be UTF-8 failed the Unicode encoding form.
pub const INVALID_UTF8: u16 = 2000;
/// An opcode (or prefixed-opcode subcode) has no defined meaning.
pub const UNKNOWN_OPCODE: u16 = 2001;
/// A flags byte (limits, element segment, data segment) used bit patterns
/// with no defined meaning.
pub const INVALID_FLAG_BITS: u16 = 2002;
/// A byte reserved by the spec to be zero was non-zero.
pub const RESERVED_BYTE_NONZERO: u16 = 2003;
/// A value-type byte has no defined meaning.
pub const INVALID_VALUE_TYPE: u16 = 2004;
/// A reference-type byte has no defined meaning.
pub const INVALID_REFERENCE_TYPE: u16 = 2005;
/// A block-type encoding was not the reserved void/value-type byte and was
/// not a valid non-negative type index either.
pub const INVALID_BLOCK_TYPE: u16 = 2006;
/// A string literal's backslash escape named no defined escape sequence.
pub const INVALID_ESCAPE: u16 = 2007;
/// A byte outside the text format's allowed character set appeared where a
/// token was expected.
pub const INVALID_CHARACTER: u16 = 2008;

// --- Feature-gated (2900-2999) ---

/// A construct requires a WebAssembly proposal the active feature
/// configuration does not enable.
pub const FEATURE_DISABLED: u16 = 2900;

// --- Module validation (3000-3999) ---

/// An index referenced an entry beyond the end of its index space.
pub const INDEX_OUT_OF_BOUNDS: u16 = 3000;
/// Two exports used the same name.
pub const DUPLICATE_EXPORT: u16 = 3001;
/// The start function's type was not `[] -> []`.
pub const INVALID_START_SIGNATURE: u16 = 3002;
/// More than one memory was declared/imported without the multi-memory
/// feature enabled.
pub const MULTIPLE_MEMORIES: u16 = 3003;
/// The data-count section's count did not match the data section's entry
/// count, or a `memory.init`/`data.drop` appeared without a data-count
/// section.
pub const DATA_COUNT_MISMATCH: u16 = 3004;
/// A memory's or table's limits were internally inconsistent (`min > max`)
/// or exceeded the format's own ceiling.
pub const INVALID_LIMITS: u16 = 3005;
/// The element type of a table referenced by `call_indirect` or an active
/// element segment was not `funcref`.
pub const TYPE_MISMATCH_TABLE: u16 = 3006;
/// The function section's entry count did not match the code section's.
pub const FUNCTION_CODE_COUNT_MISMATCH: u16 = 3007;

// --- Code validation (4000-4999) ---

/// An operand's type did not match what the instruction required.
pub const TYPE_MISMATCH: u16 = 4000;
/// The value stack held fewer values than an instruction needed to pop.
pub const STACK_UNDERFLOW: u16 = 4001;
/// At `end` (or `else`), the value stack did not hold exactly the current
/// frame's declared result types.
pub const STACK_HEIGHT_MISMATCH: u16 = 4002;
/// A branch (`br`, `br_if`, `br_table`) targeted a label depth beyond the
/// current label stack.
pub const UNKNOWN_LABEL: u16 = 4003;
/// `global.set` targeted a global declared `const`.
pub const IMMUTABLE_GLOBAL: u16 = 4004;
/// `ref.func` named a function index not present in any declared-function
/// element segment or export.
pub const UNDECLARED_FUNCTION_REFERENCE: u16 = 4005;
/// `br_table`'s targets did not all agree on label-type arity.
pub const INCONSISTENT_LABEL_ARITY: u16 = 4006;
/// A function body had unread bytes, or ended without a terminating `end`.
pub const MALFORMED_FUNCTION_BODY: u16 = 4007;
