//! Playable characters and their styles.
//!
//! A character carries everything shared by its playstyles (level range,
//! collision capsule, skeleton). A [`Style`] is one build of a character and
//! carries the per-level tables sized by the character's level span. The two
//! reference each other, and both directions are checked.

use std::any::Any;

use fp_core::coerce::{
    FileRules, FloatBounds, IntBounds, RawFloat, RawInt, StrRules, coerce_file, coerce_float,
    coerce_int_range, coerce_string,
};
use fp_core::error::{Error, Result};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use serde_json::Value;

use crate::attribute::{AttrClass, serialize_attributes};
use crate::perk::Perk;
use crate::shape::Capsule;
use crate::slot::{SlotDef, serialize_slot_defs};

/// A playable character. One character owns several styles; data shared by
/// all of them lives here.
#[derive(Debug, Clone)]
pub struct Character {
    /// Resource id (`Character.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Level range as `[min, max]`.
    pub level: Vec<RawInt>,
    /// Styles belonging to this character.
    pub styles: Vec<ResourceId>,
    /// Equipment usable by this character.
    pub equipments: Vec<ResourceId>,
    /// Collision capsule used for movement.
    pub bounding_capsule: Capsule,
    /// Skeleton file (`.ozz`) driving animation playback.
    pub skeleton: String,
}

impl Character {
    /// Number of levels in the character's range, endpoints inclusive.
    pub fn level_span(&self, path: &str) -> Result<usize> {
        let (lo, hi) = coerce_int_range(&self.level, path, IntBounds::at_least(0))?;
        Ok((hi - lo + 1) as usize)
    }
}

impl Resource for Character {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Character
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let (lo, hi) = coerce_int_range(&self.level, &h("level"), IntBounds::at_least(0))?;
        let skeleton = coerce_file(
            &self.skeleton,
            &h("skeleton"),
            FileRules { extension: Some(".ozz"), allow_absolute: false },
        )?;
        let meta = cx.skeleton_meta(&skeleton, &h("skeleton"))?;
        if meta.joint_count < 1 {
            return Err(Error::reference(h("skeleton"), "skeleton has no joints"));
        }

        let mut p = Payload::resource(Category::Character, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set("level", vec![lo, hi]);
        p.set(
            "styles",
            cx.registry().resolve_ids_where::<Style>(&self.styles, &h("styles"), |style| {
                style.character == self.id
            })?,
        );
        p.set(
            "equipments",
            cx.registry().resolve_ids_where::<crate::equipment::Equipment>(
                &self.equipments,
                &h("equipments"),
                |equip| equip.character == self.id,
            )?,
        );
        p.set("bounding_capsule", self.bounding_capsule.serialize(&h("bounding_capsule"))?);
        p.set("skeleton", skeleton);
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Character {
    const CATEGORY: Category = Category::Character;
}

/// One build of a character. Per-level tables are sized by the owning
/// character's level span.
#[derive(Debug, Clone)]
pub struct Style {
    /// Resource id (`Style.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Owning character; must list this style back.
    pub character: ResourceId,
    /// Per-level attributes (primary and secondary).
    pub attributes: Vec<(String, Vec<RawFloat>)>,
    /// Per-level slot layouts.
    pub slots: Vec<SlotDef>,
    /// Level-independent combat parameters.
    pub fixed_attributes: FixedAttributes,
    /// Perks unlocked by this style.
    pub perks: Vec<ResourceId>,
    /// Perks unlocked elsewhere but usable here.
    pub usable_perks: Option<Vec<ResourceId>>,
    /// Actions available to this style.
    pub actions: Vec<ResourceId>,
    /// Icon path.
    pub icon: String,
    /// Render model file (`.vrm`).
    pub view_model: String,
}

impl Resource for Style {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let character = cx.registry().get::<Character>(&self.character, &h("character"))?;
        if !character.styles.contains(&self.id) {
            return Err(Error::reference(h("character"), "Character and Style mismatch"));
        }
        let size = character.level_span(&h("character"))?;

        let mut p = Payload::resource(Category::Style, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set("character", character.id.as_str());
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
        p.set("slots", serialize_slot_defs(&self.slots, size, &h("slots"), None)?);
        p.set("fixed_attributes", self.fixed_attributes.serialize(&h("fixed_attributes"))?);
        p.set(
            "perks",
            cx.registry().resolve_ids_where::<Perk>(&self.perks, &h("perks"), |perk| {
                perk.style == self.id
            })?,
        );
        if let Some(usable) = &self.usable_perks {
            p.set(
                "usable_perks",
                cx.registry().resolve_ids_where::<Perk>(usable, &h("usable_perks"), |perk| {
                    perk.usable_styles
                        .as_deref()
                        .is_some_and(|styles| styles.contains(&self.id))
                })?,
            );
        }
        p.set(
            "actions",
            cx.registry().resolve_ids(&self.actions, Category::Action, &h("actions"))?,
        );
        p.set("icon", coerce_string(&self.icon, &h("icon"), StrRules::default())?);
        p.set(
            "view_model",
            coerce_file(
                &self.view_model,
                &h("view_model"),
                FileRules { extension: Some(".vrm"), allow_absolute: false },
            )?,
        );
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Style {
    const CATEGORY: Category = Category::Style;
}

/// Combat parameters that do not vary with level.
///
/// The two `*_param` pairs feed the reduction formula
/// `P1 + (1 - P1) * defense / (P2 + defense)`.
#[derive(Debug, Clone)]
pub struct FixedAttributes {
    /// Damage reduction floor, in `0..=1`.
    pub damage_reduce_param_1: RawFloat,
    /// Damage reduction defense scale, at least 0.
    pub damage_reduce_param_2: RawFloat,
    /// Damage reduction ratio while guarding, in `0..=1`.
    pub guard_damage_ratio_1: RawFloat,
    /// Posture damage reduction floor, in `0..=1`.
    pub deposture_reduce_param_1: RawFloat,
    /// Posture damage reduction defense scale, at least 0.
    pub deposture_reduce_param_2: RawFloat,
    /// Posture damage reduction ratio while guarding, in `0..=1`.
    pub guard_deposture_ratio_1: RawFloat,
    /// Damage bonus against weakened enemies, at least 0.
    pub weak_damage_up: RawFloat,
}

impl FixedAttributes {
    /// Serialize to a flat object; error paths extend `path` per field.
    pub fn serialize(&self, path: &str) -> Result<Value> {
        let ratio = FloatBounds::between(0.0, 1.0);
        let scale = FloatBounds::at_least(0.0);
        let field = |name: &str, raw: &RawFloat, bounds| {
            coerce_float(raw.clone(), &format!("{path}.{name}"), bounds)
        };
        let mut map = serde_json::Map::new();
        map.insert(
            "damage_reduce_param_1".to_owned(),
            field("damage_reduce_param_1", &self.damage_reduce_param_1, ratio)?.into(),
        );
        map.insert(
            "damage_reduce_param_2".to_owned(),
            field("damage_reduce_param_2", &self.damage_reduce_param_2, scale)?.into(),
        );
        map.insert(
            "guard_damage_ratio_1".to_owned(),
            field("guard_damage_ratio_1", &self.guard_damage_ratio_1, ratio)?.into(),
        );
        map.insert(
            "deposture_reduce_param_1".to_owned(),
            field("deposture_reduce_param_1", &self.deposture_reduce_param_1, ratio)?.into(),
        );
        map.insert(
            "deposture_reduce_param_2".to_owned(),
            field("deposture_reduce_param_2", &self.deposture_reduce_param_2, scale)?.into(),
        );
        map.insert(
            "guard_deposture_ratio_1".to_owned(),
            field("guard_deposture_ratio_1", &self.guard_deposture_ratio_1, ratio)?.into(),
        );
        map.insert(
            "weak_damage_up".to_owned(),
            field("weak_damage_up", &self.weak_damage_up, scale)?.into(),
        );
        Ok(Value::Object(map))
    }
}
