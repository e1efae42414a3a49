// wafer - wafer-format
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Property tests: every value round-trips through the LEB128 codec, and
//! the decoder never panics on arbitrary byte strings.

use proptest::prelude::*;
use wafer_format::leb128;

proptest! {
    #[test]
    fn u32_round_trips(value: u32) {
        let mut buf = Vec::new();
        leb128::write_u32(value, &mut buf);
        let (decoded, len) = leb128::read_u32(&buf, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(len, buf.len());
    }

    #[test]
    fn i64_round_trips(value: i64) {
        let mut buf = Vec::new();
        leb128::write_i64(value, &mut buf);
        let (decoded, len) = leb128::read_i64(&buf, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(len, buf.len());
    }

    #[test]
    fn decoder_never_panics_on_arbitrary_bytes(bytes: Vec<u8>) {
        let _ = leb128::read_u32(&bytes, 0);
        let _ = leb128::read_u64(&bytes, 0);
        let _ = leb128::read_i32(&bytes, 0);
        let _ = leb128::read_i64(&bytes, 0);
    }
}
