// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Opcode identification: reads the leading byte (or prefix byte plus LEB
//! subcode) that tags an instruction, without yet interpreting what it
//! means or reading its immediate. [`crate::instructions`] builds on this
//! to decode a full [`crate::instructions::Instruction`].
//!
//! Feature gating happens at the instruction level, not here: the same
//! `0xFC` prefix carries both the saturating-truncation opcodes (gated on
//! `saturating_float_to_int`) and the bulk-memory opcodes (gated on
//! `bulk_memory`), so only the instruction decoder — which knows which
//! specific subcode it is looking at — can decide which feature applies.

use wafer_error::{kinds, Result};
use wafer_format::leb128;

/// Opcode prefix introducing the "misc" extended opcode space (bulk
/// memory, saturating truncation): subcode follows as a LEB128 `u32`.
pub const MISC_PREFIX: u8 = 0xfc;
/// Opcode prefix introducing the SIMD extended opcode space.
pub const SIMD_PREFIX: u8 = 0xfd;
/// Opcode prefix introducing the threads/atomics extended opcode space.
pub const THREADS_PREFIX: u8 = 0xfe;

/// A raw, uninterpreted opcode: either a plain byte or one of the three
/// prefix bytes plus its LEB128 subcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOpcode {
    Plain(u8),
    Misc(u32),
    Simd(u32),
    Threads(u32),
}

/// Reads the leading byte of an instruction and, if it is one of the
/// three prefix bytes, the subcode that follows it.
pub fn read_raw_opcode(bytes: &[u8], pos: usize) -> Result<(RawOpcode, usize)> {
    let byte = *bytes.get(pos).ok_or_else(|| kinds::unexpected_eof(pos as u64, 1))?;
    match byte {
        MISC_PREFIX => {
            let (subcode, len) = leb128::read_u32(bytes, pos + 1)?;
            Ok((RawOpcode::Misc(subcode), 1 + len))
        }
        SIMD_PREFIX => {
            let (subcode, len) = leb128::read_u32(bytes, pos + 1)?;
            Ok((RawOpcode::Simd(subcode), 1 + len))
        }
        THREADS_PREFIX => {
            let (subcode, len) = leb128::read_u32(bytes, pos + 1)?;
            Ok((RawOpcode::Threads(subcode), 1 + len))
        }
        plain => Ok((RawOpcode::Plain(plain), 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_opcode_is_one_byte() {
        let (raw, len) = read_raw_opcode(&[0x0b], 0).unwrap();
        assert_eq!(raw, RawOpcode::Plain(0x0b));
        assert_eq!(len, 1);
    }

    #[test]
    fn misc_prefix_reads_leb_subcode() {
        let (raw, len) = read_raw_opcode(&[MISC_PREFIX, 0x08], 0).unwrap();
        assert_eq!(raw, RawOpcode::Misc(8));
        assert_eq!(len, 2);
    }

    #[test]
    fn truncated_prefix_is_unexpected_eof() {
        let err = read_raw_opcode(&[SIMD_PREFIX], 0).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::UNEXPECTED_EOF);
    }
}
