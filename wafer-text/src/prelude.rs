// wafer - wafer-text
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Common imports for `wafer-text` consumers.

pub use wafer_error::prelude::*;

pub use crate::lexer::Lexer;
pub use crate::token::{ReservedWord, Span, Token, TokenKind};
