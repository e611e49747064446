//! Rarity grades and same-name variants.

use std::fmt;

/// Rarity grade of an entry carrier. Attack/defense jewels usually sit at
/// Rare1/Rare2; special ones at Rare3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    /// Common.
    Rare1,
    /// Uncommon.
    Rare2,
    /// Rare.
    Rare3,
}

impl Rarity {
    /// The payload literal.
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Rare1 => "Rare1",
            Rarity::Rare2 => "Rare2",
            Rarity::Rare3 => "Rare3",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinguishes same-name carriers within one rarity. `VariantX` marks the
/// dual-entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// First (default) variant.
    #[default]
    Variant1,
    /// Second variant.
    Variant2,
    /// Third variant.
    Variant3,
    /// Dual-entry variant.
    VariantX,
}

impl Variant {
    /// The payload literal, also used as the id suffix of derived carriers.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Variant1 => "Variant1",
            Variant::Variant2 => "Variant2",
            Variant::Variant3 => "Variant3",
            Variant::VariantX => "VariantX",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
