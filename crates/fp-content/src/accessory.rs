//! Accessories: entry carriers with pattern-rolled random entries.
//!
//! An [`AccessoryPattern`] describes how random entries are rolled as an
//! accessory levels up: a space-separated pattern like `"S A AB"` (one token
//! per roll step, the first always the fixed `S` entry) plus two weighted
//! entry pools. Patterns are session-cached by the runtime, so they are
//! written with the cache flag set.

use std::any::Any;

use fp_core::coerce::{FloatBounds, IntBounds, RawFloat, coerce_int};
use fp_core::config::MAX_ENTRY_PLUS;
use fp_core::error::{Error, Result};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Registry, Resource, ResourceId};
use serde_json::Value;

use crate::entry::Entry;
use crate::rarity::{Rarity, Variant};

/// A random-entry generation pattern.
#[derive(Debug, Clone)]
pub struct AccessoryPattern {
    /// Resource id (`AccessoryPattern.*`).
    pub id: ResourceId,
    /// Rarity grade; accessories using this pattern must match it.
    pub rare: Rarity,
    /// Roll pattern, e.g. `"S A AB"`: `S` first, then `A`/`B`/`AB` tokens
    /// naming which pool each step rolls from.
    pub pattern: String,
    /// Level cap; must equal token count × `MAX_ENTRY_PLUS`.
    pub max_level: i64,
    /// High-value entry pool with roll weights.
    pub a_pool: Vec<(ResourceId, RawFloat)>,
    /// Low-value entry pool with roll weights.
    pub b_pool: Vec<(ResourceId, RawFloat)>,
}

impl AccessoryPattern {
    fn serialize_pattern(&self, path: &str) -> Result<Value> {
        let tokens: Vec<&str> = self.pattern.split(' ').collect();
        let expected_level = tokens.len() as i64 * MAX_ENTRY_PLUS;
        if self.max_level != expected_level {
            return Err(Error::range(
                format!("<{}>.max_level", self.id),
                format!("must = {expected_level}"),
            ));
        }
        let mut out: Vec<Value> = Vec::with_capacity(tokens.len().saturating_sub(1));
        for (idx, token) in tokens.iter().enumerate() {
            if idx == 0 {
                if *token != "S" {
                    return Err(Error::pattern(path, "must be a pattern like 'S A AB'"));
                }
            } else if matches!(*token, "A" | "B" | "AB") {
                out.push(Value::from(*token));
            } else {
                return Err(Error::pattern(path, "must be a pattern like 'S A AB'"));
            }
        }
        Ok(Value::Array(out))
    }

    fn serialize_pool(
        &self,
        cx: &Context<'_>,
        pool: &[(ResourceId, RawFloat)],
        path: &str,
    ) -> Result<Value> {
        let weighted = cx.registry().resolve_weighted(
            pool,
            Category::Entry,
            path,
            FloatBounds::at_least(0.0),
        )?;
        let mut map = serde_json::Map::new();
        for (id, weight) in weighted {
            map.insert(id, Value::from(weight));
        }
        Ok(Value::Object(map))
    }
}

impl Resource for AccessoryPattern {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::AccessoryPattern
    }

    fn cache(&self) -> bool {
        true
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let mut p = Payload::resource(Category::AccessoryPattern, &self.id);
        p.set("rare", self.rare.as_str());
        p.set(
            "max_level",
            coerce_int(self.max_level, &h("max_level"), IntBounds::at_least(1))?,
        );
        p.set("pattern", self.serialize_pattern(&h("pattern"))?);
        p.set("a_pool", self.serialize_pool(cx, &self.a_pool, &h("a_pool"))?);
        p.set("b_pool", self.serialize_pool(cx, &self.b_pool, &h("b_pool"))?);
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for AccessoryPattern {
    const CATEGORY: Category = Category::AccessoryPattern;
}

/// An accessory item.
#[derive(Debug, Clone)]
pub struct Accessory {
    /// Resource id (`Accessory.*`).
    pub id: ResourceId,
    /// Pattern rolled when this accessory levels up.
    pub pattern: ResourceId,
    /// Rarity grade; must match the pattern's.
    pub rare: Rarity,
    /// Fixed entry.
    pub entry: ResourceId,
    /// Piece count of the fixed entry.
    pub piece: i64,
    /// Same-name variant marker.
    pub variant: Variant,
}

impl Accessory {
    /// Derive an accessory from its entry and pattern; the rarity is taken
    /// from the pattern and the id from the entry
    /// (`Entry.<rest>` → `Accessory.<rest>.<variant>`).
    pub fn derived(
        registry: &Registry,
        pattern: &str,
        entry: &str,
        piece: i64,
        variant: Variant,
    ) -> Result<Accessory> {
        let Some(rest) = entry.strip_prefix("Entry.") else {
            return Err(Error::pattern(entry, "must start with \"Entry.\""));
        };
        if registry.find::<Entry>(entry).is_none() {
            return Err(Error::reference(entry, "entry is not declared"));
        }
        let Some(pat) = registry.find::<AccessoryPattern>(pattern) else {
            return Err(Error::reference(pattern, "pattern is not declared"));
        };
        Ok(Accessory {
            id: format!("Accessory.{rest}.{variant}"),
            pattern: pattern.to_owned(),
            rare: pat.rare,
            entry: entry.to_owned(),
            piece,
            variant,
        })
    }
}

impl Resource for Accessory {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Accessory
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let pattern = cx
            .registry()
            .get::<AccessoryPattern>(&self.pattern, &h("pattern"))?;
        let entry = cx.registry().get::<Entry>(&self.entry, &h("entry"))?;
        if pattern.rare != self.rare {
            return Err(Error::reference(h("pattern"), "pattern rare mismatch"));
        }

        let mut p = Payload::resource(Category::Accessory, &self.id);
        p.set("pattern", pattern.id.as_str());
        p.set("rare", self.rare.as_str());
        p.set("entry", entry.id.as_str());
        p.set(
            "piece",
            coerce_int(self.piece, &h("piece"), IntBounds::between(1, entry.max_piece))?,
        );
        p.set("variant", self.variant.as_str());
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Accessory {
    const CATEGORY: Category = Category::Accessory;
}
