// wafer - wafer-error
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The [`Error`] type and [`ErrorCategory`] taxonomy.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Top-level grouping of an [`Error`], matching the ranges in [`crate::codes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed binary structure: bad magic, truncated input, LEB128
    /// canonicalization failures, section ordering violations.
    Structural,
    /// Well-formed structurally but using bytes with no defined meaning:
    /// invalid UTF-8, unknown opcodes, bad flag bits, non-zero reserved
    /// bytes.
    Encoding,
    /// A construct that is only valid under a WebAssembly proposal the
    /// caller's feature configuration did not enable.
    FeatureGated,
    /// Module-level validation: index bounds, duplicate exports, the start
    /// function's signature, the data-count section.
    ModuleValidation,
    /// Function-body validation: the stack-machine type checker.
    CodeValidation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Structural => "structural",
            Self::Encoding => "encoding",
            Self::FeatureGated => "feature-gated",
            Self::ModuleValidation => "module validation",
            Self::CodeValidation => "code validation",
        };
        f.write_str(s)
    }
}

/// An error produced while decoding, parsing, or validating a WebAssembly
/// module.
///
/// This is a value, never a panic: every fallible operation in this
/// workspace returns `Result<T, Error>` and propagates failures with `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The error's category, per the core specification's taxonomy.
    pub category: ErrorCategory,
    /// A stable, machine-readable code (see [`crate::codes`]).
    pub code: u16,
    /// A human-readable message.
    pub message: String,
    /// The byte offset into the input at which the error was detected, if
    /// known.
    pub offset: Option<u64>,
    /// The context stack active when the error was raised, outermost first
    /// (e.g. `["module", "section Code", "function 3", "expression"]`).
    pub context: Vec<String>,
}

impl Error {
    /// Creates a new error with no offset or context attached.
    pub fn new(category: ErrorCategory, code: u16, message: impl Into<String>) -> Self {
        Self { category, code, message: message.into(), offset: None, context: Vec::new() }
    }

    /// Attaches (or overwrites) the byte offset at which this error was
    /// detected.
    #[must_use]
    pub fn at_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attaches a context stack, outermost frame first.
    #[must_use]
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)?;
        if let Some(offset) = self.offset {
            write!(f, " (at offset 0x{offset:x})")?;
        }
        if !self.context.is_empty() {
            write!(f, " [{}]", self.context.join(" > "))?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<core::str::Utf8Error> for Error {
    fn from(e: core::str::Utf8Error) -> Self {
        Error::new(ErrorCategory::Encoding, crate::codes::INVALID_UTF8, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset_and_context() {
        let err = Error::new(ErrorCategory::Structural, crate::codes::INVALID_MAGIC, "bad magic")
            .at_offset(0)
            .with_context(vec!["module".to_string()]);
        let rendered = err.to_string();
        assert!(rendered.contains("bad magic"));
        assert!(rendered.contains("0x0"));
        assert!(rendered.contains("module"));
    }

    #[test]
    fn equality_is_structural() {
        let a = Error::new(ErrorCategory::Encoding, 1, "x");
        let b = Error::new(ErrorCategory::Encoding, 1, "x");
        assert_eq!(a, b);
    }
}
