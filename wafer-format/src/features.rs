// wafer - wafer-format
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The feature-set configuration threaded through every decode and
//! validate call.
//!
//! Lives in `wafer-format` (not `wafer-decoder`, which re-exports it)
//! because the primitive decoders in this crate — `ValueType::read`,
//! `Limits::read` — need it to gate reference types, `v128`, and 64-bit
//! memories; putting it one layer up would make those decoders take no
//! feature parameter and silently accept post-MVP encodings regardless of
//! configuration.

/// Which WebAssembly proposals a decode or validate call should accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub mutable_globals: bool,
    pub sign_extension: bool,
    pub reference_types: bool,
    pub bulk_memory: bool,
    pub multi_value: bool,
    pub tail_call: bool,
    pub simd: bool,
    pub threads: bool,
    pub exceptions: bool,
    pub function_references: bool,
    pub memory64: bool,
    pub multi_memory: bool,
    pub saturating_float_to_int: bool,
}

impl Features {
    /// The WebAssembly 1.0 (MVP) feature set: nothing past the original
    /// release enabled.
    pub const fn mvp() -> Self {
        Self {
            mutable_globals: true,
            sign_extension: false,
            reference_types: false,
            bulk_memory: false,
            multi_value: false,
            tail_call: false,
            simd: false,
            threads: false,
            exceptions: false,
            function_references: false,
            memory64: false,
            multi_memory: false,
            saturating_float_to_int: false,
        }
    }

    /// The feature set stabilized in the WebAssembly 2.0 core
    /// specification: sign-extension, reference types, bulk memory,
    /// multi-value, and saturating float-to-int conversions.
    pub const fn wasm_2_0() -> Self {
        Self {
            mutable_globals: true,
            sign_extension: true,
            reference_types: true,
            bulk_memory: true,
            multi_value: true,
            tail_call: false,
            simd: false,
            threads: false,
            exceptions: false,
            function_references: false,
            memory64: false,
            multi_memory: false,
            saturating_float_to_int: true,
        }
    }

    /// Every feature this workspace understands, enabled.
    pub const fn all() -> Self {
        Self {
            mutable_globals: true,
            sign_extension: true,
            reference_types: true,
            bulk_memory: true,
            multi_value: true,
            tail_call: true,
            simd: true,
            threads: true,
            exceptions: true,
            function_references: true,
            memory64: true,
            multi_memory: true,
            saturating_float_to_int: true,
        }
    }

    #[must_use]
    pub const fn with_simd(mut self, enabled: bool) -> Self {
        self.simd = enabled;
        self
    }

    #[must_use]
    pub const fn with_threads(mut self, enabled: bool) -> Self {
        self.threads = enabled;
        self
    }

    #[must_use]
    pub const fn with_tail_call(mut self, enabled: bool) -> Self {
        self.tail_call = enabled;
        self
    }

    #[must_use]
    pub const fn with_memory64(mut self, enabled: bool) -> Self {
        self.memory64 = enabled;
        self
    }

    #[must_use]
    pub const fn with_multi_memory(mut self, enabled: bool) -> Self {
        self.multi_memory = enabled;
        self
    }

    #[must_use]
    pub const fn with_exceptions(mut self, enabled: bool) -> Self {
        self.exceptions = enabled;
        self
    }

    #[must_use]
    pub const fn with_function_references(mut self, enabled: bool) -> Self {
        self.function_references = enabled;
        self
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::wasm_2_0()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mvp_has_no_post_mvp_features() {
        let f = Features::mvp();
        assert!(!f.simd);
        assert!(!f.reference_types);
        assert!(!f.bulk_memory);
        assert!(f.mutable_globals);
    }

    #[test]
    fn builder_methods_only_touch_their_own_field() {
        let f = Features::mvp().with_simd(true).with_threads(true);
        assert!(f.simd);
        assert!(f.threads);
        assert!(!f.reference_types);
    }
}
