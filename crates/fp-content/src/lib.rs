//! Game resource schemas for the Forgepoint content compiler.
//!
//! Each module defines resources implementing
//! [`Resource`](fp_core::Resource) plus the serializers they share. Authoring
//! code builds the structs, registers them in a
//! [`Registry`](fp_core::Registry), and runs [`compile`](fp_core::compile).

/// Accessory patterns and accessories.
pub mod accessory;
/// Combat actions, animations, and key vocabularies.
pub mod action;
/// Attribute vocabularies and attribute map serializers.
pub mod attribute;
/// Script-driven passive effects.
pub mod buff;
/// Characters and styles.
pub mod character;
/// Entries and entry reference serializers.
pub mod entry;
/// Equipment and its derivation tree.
pub mod equipment;
/// Jewels.
pub mod jewel;
/// Perks.
pub mod perk;
/// Rarity grades and same-name variants.
pub mod rarity;
/// Script compilation helpers.
pub mod script;
/// Collision shapes.
pub mod shape;
/// Slot layouts.
pub mod slot;
/// Stages.
pub mod stage;

#[cfg(test)]
pub(crate) mod testutil;
