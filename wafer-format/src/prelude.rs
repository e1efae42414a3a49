// wafer - wafer-format
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Common imports for `wafer-format` consumers.

pub use alloc::string::String;
pub use alloc::vec::Vec;

pub use wafer_error::prelude::*;

pub use crate::features::Features;
pub use crate::leb128;
pub use crate::module::{
    Data, DataMode, Element, ElementItems, ElementMode, Export, FuncType, Global, GlobalType, Import,
    ImportDesc, TableType, MAGIC, VERSION,
};
pub use crate::primitives::{
    read_name, read_vec, validate_utf8, BlockType, ExternalKind, Limits, Mutability, ReferenceType,
    ValueType,
};
pub use crate::section::SectionId;
