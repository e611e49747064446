//! Equipment: craftable gear arranged in a derivation tree.
//!
//! Every character has three equipment slots, one per [`Position`]. Pieces
//! form a derivation tree through `parents`; a parent must share the slot
//! position and the character, and the referenced parent level must exist.

use std::any::Any;

use fp_core::coerce::{IntBounds, RawFloat, RawInt, StrRules, coerce_int_range, coerce_string};
use fp_core::error::{Error, Result};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use serde_json::Value;

use crate::attribute::{AttrClass, serialize_attributes};
use crate::character::Character;
use crate::entry::serialize_entry_levels;
use crate::script::{extract_arg_names, serialize_script, serialize_script_args};
use crate::slot::{SlotDef, serialize_slot_defs};

/// Equipment slot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Primary weapon slot.
    Position1,
    /// Secondary weapon slot.
    Position2,
    /// Armor slot.
    Position3,
}

impl Position {
    /// The payload literal.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Position1 => "Position1",
            Position::Position2 => "Position2",
            Position::Position3 => "Position3",
        }
    }
}

/// A piece of equipment.
#[derive(Debug, Clone)]
pub struct Equipment {
    /// Resource id (`Equipment.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Icon path.
    pub icon: String,
    /// Corner badge icon.
    pub sub_icon: Option<String>,
    /// Owning character; must list this equipment back.
    pub character: ResourceId,
    /// Slot position this piece fits.
    pub position: Position,
    /// Derivation tree parents as `(id, level)`; the level must exist on the
    /// parent.
    pub parents: Option<Vec<(ResourceId, i64)>>,
    /// Level range as `[min, max]`, within `0..=99`.
    pub level: Vec<RawInt>,
    /// Per-level attributes (primary and secondary).
    pub attributes: Vec<(String, Vec<RawFloat>)>,
    /// Per-level slot layouts.
    pub slots: Option<Vec<SlotDef>>,
    /// Per-level entry grants as `(id, [[piece, plus]; levels])`.
    pub entries: Option<Vec<(ResourceId, Vec<[i64; 2]>)>>,
    /// Behavior script source.
    pub script: Option<String>,
    /// Per-level script arguments.
    pub script_args: Option<Vec<(String, Vec<RawFloat>)>>,
}

impl Equipment {
    /// Upper end of the level range, unchecked.
    pub fn max_level(&self) -> i64 {
        match self.level.last() {
            Some(RawInt::Int(v)) => *v,
            Some(RawInt::Bool(b)) => i64::from(*b),
            None => 0,
        }
    }

    fn serialize_parents(&self, cx: &Context<'_>, path: &str) -> Result<Option<Value>> {
        let Some(parents) = &self.parents else {
            return Ok(None);
        };
        let mut map = serde_json::Map::new();
        for (pid, level) in parents {
            let item_path = format!("{path}[{pid}]");
            let parent = cx.registry().get::<Equipment>(pid, &item_path)?;
            if parent.position != self.position {
                return Err(Error::reference(&item_path, "position mismatch with parent"));
            }
            if parent.character != self.character {
                return Err(Error::reference(&item_path, "character mismatch with parent"));
            }
            if *level > parent.max_level() {
                return Err(Error::range(&item_path, "out of parent's max level"));
            }
            map.insert(pid.clone(), Value::from(*level));
        }
        Ok(Some(Value::Object(map)))
    }
}

impl Resource for Equipment {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Equipment
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let character = cx.registry().get::<Character>(&self.character, &h("character"))?;
        if !character.equipments.contains(&self.id) {
            return Err(Error::reference(h("character"), "Character and Equipment mismatch"));
        }
        let (lo, hi) = coerce_int_range(&self.level, &h("level"), IntBounds::between(0, 99))?;
        let size = (hi - lo + 1) as usize;

        let mut p = Payload::resource(Category::Equipment, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set("icon", coerce_string(&self.icon, &h("icon"), StrRules::default())?);
        if let Some(sub_icon) = &self.sub_icon {
            p.set("sub_icon", coerce_string(sub_icon, &h("sub_icon"), StrRules::default())?);
        }
        p.set("character", character.id.as_str());
        p.set("position", self.position.as_str());
        p.set_opt("parents", self.serialize_parents(cx, &h("parents"))?);
        p.set("level", vec![lo, hi]);
        p.set(
            "attributes",
            serialize_attributes(
                &[AttrClass::Primary, AttrClass::Secondary],
                &self.attributes,
                size,
                &h("attributes"),
                None,
            )?,
        );
        if let Some(slots) = &self.slots {
            p.set("slots", serialize_slot_defs(slots, size, &h("slots"), None)?);
        }
        if let Some(entries) = &self.entries {
            p.set("entries", serialize_entry_levels(cx, entries, size, &h("entries"), None)?);
        }
        if let Some(script) = &self.script {
            let arg_names =
                extract_arg_names(&[self.script_args.as_deref()], &h("script_args"))?;
            p.set(
                "script",
                serialize_script(cx, script, arg_names.as_deref(), &h("script"))?,
            );
        }
        if let Some(args) = &self.script_args {
            p.set("script_args", serialize_script_args(args, size, &h("script_args"), None)?);
        }
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Equipment {
    const CATEGORY: Category = Category::Equipment;
}
