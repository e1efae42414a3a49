// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(clippy::missing_panics_doc)]

//! Lazy WebAssembly core module decoder, two-pass validator, and
//! bit-exact re-encoder.
//!
//! A binary module is walked once ([`module::decode_module`]), section by
//! section, in the fixed ascending order the format requires. Everything
//! that can be deferred is: function bodies, element-item expressions,
//! and global/data initializers are kept as raw `(offset, len)` byte
//! spans into the caller's buffer rather than parsed into instruction
//! trees at decode time — [`validate::validate_module`] is what actually
//! walks those spans, running the reference type-checking algorithm over
//! every function body and resolving the legality of every `ref.func`.
//!
//! - [`opcodes`] — the raw opcode byte/subcode constants.
//! - [`instructions`] — single-instruction decoding, `decode_instruction`.
//! - [`sections`] — one reader per section id, operating on absolute
//!   positions into the whole module buffer.
//! - [`module`] — the section-table driver and the decoded [`module::Module`].
//! - [`validate`] — index-space construction and per-function stack-machine
//!   validation.
//! - [`write`] — re-encodes a [`module::Module`] back to bytes, copying the
//!   byte spans [`module::decode_module`] deferred.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod instructions;
pub mod module;
pub mod opcodes;
pub mod prelude;
pub mod sections;
pub mod validate;
pub mod write;

pub use module::{decode_module, walk_module, Module, ModuleVisitor};
pub use validate::validate_module;
pub use wafer_format::Features;
pub use write::write_module;
