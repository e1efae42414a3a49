// wafer - wafer-error
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Integration tests for the `wafer-error` crate's public surface.

use wafer_error::context::ContextStack;
use wafer_error::{codes, kinds, Error, ErrorCategory, Result};

#[test]
fn error_new_has_no_offset_or_context() {
    let err = Error::new(ErrorCategory::Structural, codes::INVALID_MAGIC, "bad magic");
    assert_eq!(err.offset, None);
    assert!(err.context.is_empty());
}

#[test]
fn result_alias_propagates_with_question_mark() {
    fn inner() -> Result<u32> {
        Err(kinds::stack_underflow())
    }

    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    let err = outer().unwrap_err();
    assert_eq!(err.category, ErrorCategory::CodeValidation);
    assert_eq!(err.code, codes::STACK_UNDERFLOW);
}

#[test]
fn context_stack_attaches_to_error() {
    let mut ctx = ContextStack::new();
    let _module = ctx.enter("module");
    let result: Result<()> = {
        let _section = ctx.enter("section Code");
        Err(kinds::malformed_function_body().with_context(ctx.snapshot()))
    };
    let err = result.unwrap_err();
    assert_eq!(err.context, vec!["module".to_string(), "section Code".to_string()]);
    assert_eq!(ctx.depth(), 1);
}

#[test]
fn display_is_human_readable_and_never_panics() {
    let err = kinds::unknown_opcode(42, 0xfc05).at_offset(42);
    let rendered = err.to_string();
    assert!(rendered.contains("unknown opcode"));
    assert!(rendered.contains("0x2a"));
}

#[test]
fn utf8_error_conversion_round_trips_category_and_code() {
    let bytes: &[u8] = &[0xff, 0xfe];
    let utf8_err = core::str::from_utf8(bytes).unwrap_err();
    let err: Error = utf8_err.into();
    assert_eq!(err.category, ErrorCategory::Encoding);
    assert_eq!(err.code, codes::INVALID_UTF8);
}
