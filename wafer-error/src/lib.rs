// wafer - wafer-error
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(clippy::missing_panics_doc)]

//! Shared error type for the `wafer` WebAssembly core.
//!
//! Every decode, parse, and validation failure in this workspace is reported
//! as an [`Error`]: a category, a numeric code, a message, and the context
//! stack of named sub-parses that were active when the failure happened.
//! Nothing in this workspace panics on malformed input — failures are
//! values, propagated with `?`.
//!
//! - [`codes`] holds the numeric error codes, grouped by range, one range
//!   per category in the core specification's error taxonomy.
//! - [`kinds`] holds one constructor per entry in that taxonomy (structural,
//!   encoding, feature-gated, module validation, code validation).
//! - [`context`] holds the scoped context-stack guard pushed on entry to a
//!   named sub-parse (`"module"`, `"section Code"`, `"function 3"`, ...) and
//!   popped on exit, attached to any error raised while it was live.
//!
//! ```
//! use wafer_error::{kinds, Result};
//!
//! fn decode_u32(byte: u8) -> Result<u32> {
//!     if byte & 0x80 != 0 {
//!         return Err(kinds::integer_representation_too_long(0));
//!     }
//!     Ok(u32::from(byte))
//! }
//! ```

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod codes;
pub mod context;
pub mod errors;
pub mod kinds;
pub mod prelude;

pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for `wafer` operations.
pub type Result<T> = core::result::Result<T, Error>;
