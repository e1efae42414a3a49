// wafer - wafer-format
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The fixed, ascending-order section identifiers of a core WebAssembly
//! module.

/// A known section identifier. Custom sections (id 0) may repeat and may
/// appear anywhere; every other section must appear at most once and in
/// this declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
    DataCount = 12,
    /// Tag types for the exception-handling proposal (requires
    /// `exceptions`).
    Event = 13,
}

impl SectionId {
    /// Maps a section id byte to its `SectionId`, or `None` if the byte
    /// names no known section.
    pub fn from_u8(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::Custom,
            1 => Self::Type,
            2 => Self::Import,
            3 => Self::Function,
            4 => Self::Table,
            5 => Self::Memory,
            6 => Self::Global,
            7 => Self::Export,
            8 => Self::Start,
            9 => Self::Element,
            10 => Self::Code,
            11 => Self::Data,
            12 => Self::DataCount,
            13 => Self::Event,
            _ => return None,
        })
    }

    /// This section's id byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// `true` for every section id except `Custom` — these are the ones
    /// the module-order and at-most-once invariants apply to.
    pub fn is_ordered(self) -> bool {
        !matches!(self, Self::Custom)
    }

    /// This section's position in the fixed binary layout. Unlike the
    /// wire id byte, this is monotonic in layout order: `Tag` (id 13) sits
    /// between `Memory` and `Global`, and `DataCount` (id 12) sits between
    /// `Element` and `Code`, even though their id numbers are larger than
    /// the sections that follow them. Module-order checks must compare
    /// this, not the raw id byte.
    pub fn layout_order(self) -> u8 {
        match self {
            Self::Custom => 0,
            Self::Type => 1,
            Self::Import => 2,
            Self::Function => 3,
            Self::Table => 4,
            Self::Memory => 5,
            Self::Event => 6,
            Self::Global => 7,
            Self::Export => 8,
            Self::Start => 9,
            Self::Element => 10,
            Self::DataCount => 11,
            Self::Code => 12,
            Self::Data => 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_known_id() {
        for id in 0u8..=13 {
            let section = SectionId::from_u8(id).unwrap();
            assert_eq!(section.to_u8(), id);
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(SectionId::from_u8(14).is_none());
        assert!(SectionId::from_u8(255).is_none());
    }

    #[test]
    fn only_custom_is_unordered() {
        assert!(!SectionId::Custom.is_ordered());
        assert!(SectionId::Type.is_ordered());
        assert!(SectionId::DataCount.is_ordered());
    }
}
