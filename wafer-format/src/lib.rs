// wafer - wafer-format
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! The WebAssembly core data model and binary primitives shared by the
//! decoder and text lexer: the LEB128 codec, value/block/reference
//! types, `Limits`, the module entity types, the section id list, and
//! the `Features` configuration every one of those primitive decoders is
//! threaded through.
//!
//! This crate does not drive a module end to end — it has no notion of
//! "the current section" or "the current function" — that sequencing
//! lives in `wafer-decoder`, which this crate has no dependency on.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod features;
pub mod leb128;
pub mod module;
pub mod prelude;
pub mod primitives;
pub mod section;

pub use features::Features;
pub use module::{
    Data, DataMode, Element, ElementItems, ElementMode, Export, FuncType, Global, GlobalType, Import,
    ImportDesc, TableType, MAGIC, VERSION,
};
pub use primitives::{read_name, read_vec, BlockType, ExternalKind, Limits, Mutability, ReferenceType, ValueType};
pub use section::SectionId;
