// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Common imports for `wafer-decoder` consumers.

pub use wafer_format::prelude::*;

pub use crate::instructions::{decode_instruction, Instruction, MemArg};
pub use crate::module::{decode_module, walk_module, Module, ModuleVisitor};
pub use crate::sections::{FunctionBody, NameAssoc, NameSection};
pub use crate::validate::validate_module;
pub use crate::write::write_module;
