//! Jewels: socketable entry carriers matched to slot types.
//!
//! A jewel carries one entry at a fixed piece count; the `VariantX` form
//! carries a second, weaker entry alongside. Jewel ids are usually derived
//! from their entry (`Entry.Haste` → `Jewel.Haste.Variant1`).

use std::any::Any;

use fp_core::coerce::{IntBounds, coerce_int};
use fp_core::error::{Error, Result};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Registry, Resource, ResourceId};
use serde_json::Value;

use crate::entry::Entry;
use crate::rarity::{Rarity, Variant};
use crate::slot::SlotType;

/// A socketable gem.
#[derive(Debug, Clone)]
pub struct Jewel {
    /// Resource id (`Jewel.*`).
    pub id: ResourceId,
    /// Which slot type accepts this jewel.
    pub slot_type: SlotType,
    /// Rarity grade.
    pub rare: Rarity,
    /// Carried entry.
    pub entry: ResourceId,
    /// Piece count of the carried entry, 1..=its `max_piece`.
    pub piece: i64,
    /// Second entry of the `VariantX` form.
    pub sub_entry: Option<ResourceId>,
    /// Piece count of the second entry.
    pub sub_piece: Option<i64>,
    /// Same-name variant marker.
    pub variant: Variant,
}

impl Jewel {
    /// Derive a single-entry jewel from an entry, id
    /// `Jewel.<rest>.<variant>`.
    pub fn derived(
        registry: &Registry,
        slot_type: SlotType,
        rare: Rarity,
        entry: &str,
        piece: i64,
        variant: Variant,
    ) -> Result<Jewel> {
        let id = derive_id(registry, entry, variant)?;
        Ok(Jewel {
            id,
            slot_type,
            rare,
            entry: entry.to_owned(),
            piece,
            sub_entry: None,
            sub_piece: None,
            variant,
        })
    }

    /// Derive the dual-entry `VariantX` form.
    pub fn derived_x(
        registry: &Registry,
        slot_type: SlotType,
        rare: Rarity,
        entry: &str,
        piece: i64,
        sub_entry: &str,
        sub_piece: i64,
    ) -> Result<Jewel> {
        let id = derive_id(registry, entry, Variant::VariantX)?;
        Ok(Jewel {
            id,
            slot_type,
            rare,
            entry: entry.to_owned(),
            piece,
            sub_entry: Some(sub_entry.to_owned()),
            sub_piece: Some(sub_piece),
            variant: Variant::VariantX,
        })
    }
}

fn derive_id(registry: &Registry, entry: &str, variant: Variant) -> Result<ResourceId> {
    let Some(rest) = entry.strip_prefix("Entry.") else {
        return Err(Error::pattern(entry, "must start with \"Entry.\""));
    };
    if registry.find::<Entry>(entry).is_none() {
        return Err(Error::reference(entry, "entry is not declared"));
    }
    Ok(format!("Jewel.{rest}.{variant}"))
}

impl Resource for Jewel {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Jewel
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let entry = cx.registry().get::<Entry>(&self.entry, &h("entry"))?;

        let mut p = Payload::resource(Category::Jewel, &self.id);
        p.set("slot_type", self.slot_type.as_str());
        p.set("rare", self.rare.as_str());
        p.set("entry", entry.id.as_str());
        p.set(
            "piece",
            coerce_int(
                self.piece,
                &h("piece"),
                IntBounds::between(1, entry.max_piece),
            )?,
        );
        if let Some(sub_id) = &self.sub_entry {
            let sub_entry = cx.registry().get::<Entry>(sub_id, &h("sub_entry"))?;
            let sub_piece = self.sub_piece.ok_or_else(|| {
                Error::type_mismatch(h("sub_piece"), "an int when sub_entry is set")
            })?;
            p.set("sub_entry", sub_entry.id.as_str());
            p.set(
                "sub_piece",
                coerce_int(
                    sub_piece,
                    &h("sub_piece"),
                    IntBounds::between(1, sub_entry.max_piece),
                )?,
            );
        }
        p.set("variant", self.variant.as_str());
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Jewel {
    const CATEGORY: Category = Category::Jewel;
}
