//! Resource identifiers and categories.
//!
//! A [`ResourceId`] is a globally unique dotted string such as
//! `"Jewel.Haste.Variant1"`. The prefix before the first dot names the
//! resource's [`Category`]; the rest is free-form within a restricted
//! word-and-dot grammar. Action-local ids may carry a trailing `#segment`
//! (`"Action.LK.Slash#windup"`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::MAX_SYMBOL_LEN;
use crate::error::{Error, Result};

static RE_RES_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*(?:#[A-Za-z0-9_-]+)?$").expect("id regex")
});

/// A resource identifier string.
pub type ResourceId = String;

/// The declared kind of a resource, used as its id prefix.
///
/// Carrying the prefix as data keeps id validation independent of the
/// concrete resource types, which live outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// A playable character shell; owns styles and equipment.
    Character,
    /// One build/job of a character.
    Style,
    /// A craftable weapon or armor piece.
    Equipment,
    /// A stackable effect definition carried by items.
    Entry,
    /// A talent-tree node.
    Perk,
    /// A random-entry generation pattern for accessories.
    AccessoryPattern,
    /// An accessory item with pattern-rolled entries.
    Accessory,
    /// A socketable gem carrying an entry.
    Jewel,
    /// A combat action (attack, dodge, idle, ...).
    Action,
    /// A runtime passive effect driven by scripts.
    Buff,
    /// A crafting material.
    Material,
    /// A battle stage.
    Stage,
    /// A traversal zone within a stage.
    Zone,
}

impl Category {
    /// All categories, in a stable order.
    pub const ALL: &'static [Category] = &[
        Category::Character,
        Category::Style,
        Category::Equipment,
        Category::Entry,
        Category::Perk,
        Category::AccessoryPattern,
        Category::Accessory,
        Category::Jewel,
        Category::Action,
        Category::Buff,
        Category::Material,
        Category::Stage,
        Category::Zone,
    ];

    /// The category name, equal to the id prefix without the trailing dot.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Character => "Character",
            Category::Style => "Style",
            Category::Equipment => "Equipment",
            Category::Entry => "Entry",
            Category::Perk => "Perk",
            Category::AccessoryPattern => "AccessoryPattern",
            Category::Accessory => "Accessory",
            Category::Jewel => "Jewel",
            Category::Action => "Action",
            Category::Buff => "Buff",
            Category::Material => "Material",
            Category::Stage => "Stage",
            Category::Zone => "Zone",
        }
    }

    /// The id prefix of this category, including the trailing dot.
    pub fn prefix(self) -> String {
        format!("{}.", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate an id structurally: grammar, length cap, and category prefix.
pub fn validate_id(id: &str, category: Category, path: &str) -> Result<()> {
    if id.len() > MAX_SYMBOL_LEN {
        return Err(Error::range(path, format!("len() must <= {MAX_SYMBOL_LEN}")));
    }
    if !RE_RES_ID.is_match(id) {
        return Err(Error::pattern(path, "must match the ResourceId pattern"));
    }
    let prefix = category.prefix();
    if !id.starts_with(&prefix) {
        return Err(Error::pattern(path, format!("must start with \"{prefix}\"")));
    }
    Ok(())
}

/// Split an id into its category prefix and remainder, if the prefix names a
/// known category.
pub fn split_category(id: &str) -> Option<(Category, &str)> {
    let (prefix, rest) = id.split_once('.')?;
    Category::ALL
        .iter()
        .find(|c| c.as_str() == prefix)
        .map(|c| (*c, rest))
}
