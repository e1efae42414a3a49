// wafer - wafer-error
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Common imports for `wafer-error` consumers.
//!
//! Every crate in the workspace does `use wafer_error::prelude::*;` instead
//! of importing `Error`, `Result`, `codes`, and `kinds` individually.

pub use core::{
    fmt,
    fmt::{Debug, Display},
};

pub use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use crate::{codes, kinds, Error, ErrorCategory, Result};
