// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! End-to-end tests against modules assembled by a trusted external
//! assembler (`wat`), rather than hand-built byte vectors, to cross-check
//! the decoder/validator/writer against real WAT fixtures.

use wafer_decoder::{decode_module, validate_module, write_module};
use wafer_format::Features;

fn assemble(wat_text: &str) -> Vec<u8> {
    wat::parse_str(wat_text).expect("fixture should be valid WAT")
}

#[test]
fn decodes_and_validates_an_assembled_module() {
    let bytes = assemble(
        r#"
        (module
          (func $add (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add)
          (export "add" (func $add)))
        "#,
    );

    let features = Features::wasm_2_0();
    let module = decode_module(&bytes, &features).expect("decode");
    assert_eq!(module.types.len(), 1);
    assert_eq!(module.functions.len(), 1);
    assert_eq!(module.exports.len(), 1);
    assert_eq!(module.exports[0].name, "add");

    validate_module(&module, &bytes, &features).expect("validate");
}

#[test]
fn round_trips_an_assembled_module_byte_for_byte() {
    let bytes = assemble(
        r#"
        (module
          (memory 1)
          (global $counter (mut i32) (i32.const 0))
          (func $bump (result i32)
            global.get $counter
            i32.const 1
            i32.add
            global.set $counter
            global.get $counter))
        "#,
    );

    let features = Features::wasm_2_0();
    let module = decode_module(&bytes, &features).expect("decode");
    validate_module(&module, &bytes, &features).expect("validate");

    let written = write_module(&module, &bytes);
    assert_eq!(written, bytes);
}

#[test]
fn rejects_a_function_that_returns_the_wrong_type() {
    let bytes = assemble(
        r#"
        (module
          (func $bad (result i32)
            i64.const 0))
        "#,
    );

    let features = Features::wasm_2_0();
    let module = decode_module(&bytes, &features).expect("decode");
    let err = validate_module(&module, &bytes, &features).unwrap_err();
    assert_eq!(err.code, wafer_error::codes::TYPE_MISMATCH);
}

#[test]
fn rejects_an_out_of_bounds_local_index() {
    let bytes = assemble(
        r#"
        (module
          (func $bad (result i32)
            local.get 5))
        "#,
    );

    let features = Features::wasm_2_0();
    let module = decode_module(&bytes, &features).expect("decode");
    let err = validate_module(&module, &bytes, &features).unwrap_err();
    assert_eq!(err.code, wafer_error::codes::INDEX_OUT_OF_BOUNDS);
}

#[test]
fn accepts_a_table_and_element_segment_with_ref_func() {
    let bytes = assemble(
        r#"
        (module
          (table 1 funcref)
          (func $f (result i32) i32.const 0)
          (elem (i32.const 0) $f))
        "#,
    );

    let features = Features::wasm_2_0();
    let module = decode_module(&bytes, &features).expect("decode");
    validate_module(&module, &bytes, &features).expect("validate");
}
