// wafer - wafer-text
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(clippy::missing_panics_doc)]

//! Lexer for the WebAssembly text format.
//!
//! This crate tokenizes WAT source — parentheses, `$`-identifiers,
//! string and number literals, and keywords (both the fixed structural
//! reserved words and instruction mnemonics, legacy spellings normalized
//! to their modern form) — and nothing past that: no grammar, no AST, no
//! desugaring, no human-readable printer. Building a module from a token
//! stream, or printing one back to text, is a different layer's job.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod lexer;
pub mod prelude;
pub mod token;

pub use lexer::Lexer;
pub use token::{ReservedWord, Span, Token, TokenKind};
