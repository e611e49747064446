//! Perks: talent tree nodes unlocked per style.

use std::any::Any;

use fp_core::coerce::{IntBounds, RawFloat, StrRules, coerce_int, coerce_string};
use fp_core::error::{Error, Result};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use serde_json::Value;

use crate::action::serialize_action_args;
use crate::attribute::{AttrClass, serialize_attribute_values};
use crate::character::Style;
use crate::entry::serialize_entry_pairs;
use crate::script::{extract_arg_names, serialize_script, serialize_script_arg_values};
use crate::slot::{SlotDef, serialize_slot_def};

/// A talent tree node. Unlocked through its owning style; `usable_styles`
/// lets sibling styles of the same character use it once unlocked.
#[derive(Debug, Clone)]
pub struct Perk {
    /// Resource id (`Perk.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Icon path.
    pub icon: String,
    /// Owning style; must list this perk back.
    pub style: ResourceId,
    /// Maximum rank of this node.
    pub max_level: i64,
    /// Other styles allowed to use the perk; nonempty when present, must not
    /// repeat the owning style, and every style must reference back.
    pub usable_styles: Option<Vec<ResourceId>>,
    /// Talent tree parents as `(id, level)`; the level must not exceed the
    /// parent's `max_level`.
    pub parents: Option<Vec<(ResourceId, i64)>>,
    /// Flat attribute grants (primary and secondary).
    pub attributes: Option<Vec<(String, RawFloat)>>,
    /// Slot grant.
    pub slot: Option<SlotDef>,
    /// Entry grants as `(id, [piece, plus])`.
    pub entries: Option<Vec<(ResourceId, [i64; 2])>>,
    /// Action parameter overrides.
    pub action_args: Option<Vec<(String, i64)>>,
    /// Behavior script source.
    pub script: Option<String>,
    /// Scalar script arguments.
    pub script_args: Option<Vec<(String, RawFloat)>>,
}

impl Perk {
    fn check_usable_styles(&self, cx: &Context<'_>, own: &Style) -> Result<Option<Vec<String>>> {
        let Some(usable) = &self.usable_styles else {
            return Ok(None);
        };
        let h = |field: &str| format!("<{}>.{field}", self.id);
        if usable.is_empty() {
            return Err(Error::range(h("usable_styles"), "len() must >= 1"));
        }
        if usable.contains(&self.style) {
            return Err(Error::reference(
                h("style"),
                "style doesn't need to be in usable_styles",
            ));
        }
        let mut out = Vec::with_capacity(usable.len());
        for (idx, id) in usable.iter().enumerate() {
            let item_path = format!("{}[{idx}]", h("usable_styles"));
            let style = cx.registry().get::<Style>(id, &item_path)?;
            let listed = style
                .usable_perks
                .as_deref()
                .is_some_and(|perks| perks.contains(&self.id));
            if !listed {
                return Err(Error::reference(&item_path, "Style and Perk mismatch"));
            }
            if style.character != own.character {
                return Err(Error::reference(
                    &item_path,
                    "style/usable_styles must be in the same Character",
                ));
            }
            out.push(id.clone());
        }
        Ok(Some(out))
    }

    fn serialize_parents(&self, cx: &Context<'_>, own: &Style) -> Result<Option<Value>> {
        let Some(parents) = &self.parents else {
            return Ok(None);
        };
        let mut map = serde_json::Map::new();
        for (pid, level) in parents {
            let item_path = format!("<{}>.parents[{pid}]", self.id);
            let parent = cx.registry().get::<Perk>(pid, &item_path)?;
            let parent_style = cx.registry().get::<Style>(&parent.style, &item_path)?;
            if parent_style.character != own.character {
                return Err(Error::reference(&item_path, "character mismatch with parent"));
            }
            if *level > parent.max_level {
                return Err(Error::range(&item_path, "out of parent's max level"));
            }
            map.insert(pid.clone(), Value::from(*level));
        }
        Ok(Some(Value::Object(map)))
    }
}

impl Resource for Perk {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Perk
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let style = cx.registry().get::<Style>(&self.style, &h("style"))?;
        if !style.perks.contains(&self.id) {
            return Err(Error::reference(h("style"), "Style and Perk mismatch"));
        }

        let mut p = Payload::resource(Category::Perk, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set("icon", coerce_string(&self.icon, &h("icon"), StrRules::default())?);
        p.set("style", style.id.as_str());
        p.set(
            "max_level",
            coerce_int(self.max_level, &h("max_level"), IntBounds::at_least(0))?,
        );
        p.set_opt("usable_styles", self.check_usable_styles(cx, style)?);
        p.set_opt("parents", self.serialize_parents(cx, style)?);
        if let Some(attrs) = &self.attributes {
            p.set(
                "attributes",
                serialize_attribute_values(
                    &[AttrClass::Primary, AttrClass::Secondary],
                    attrs,
                    &h("attributes"),
                )?,
            );
        }
        if let Some(slot) = &self.slot {
            p.set("slot", serialize_slot_def(slot, &h("slot"))?.to_vec());
        }
        if let Some(entries) = &self.entries {
            p.set("entries", serialize_entry_pairs(cx, entries, &h("entries"))?);
        }
        if let Some(args) = &self.action_args {
            p.set("action_args", serialize_action_args(args, &h("action_args"))?);
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
            p.set("script_args", serialize_script_arg_values(args, &h("script_args"))?);
        }
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Perk {
    const CATEGORY: Category = Category::Perk;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeAssets, FakeScripts, entry, fixed_attributes};
    use fp_core::Registry;
    use serde_json::json;

    fn style(id: &str, perks: &[&str], usable_perks: Option<&[&str]>) -> Style {
        Style {
            id: id.to_owned(),
            name: "Blade".to_owned(),
            character: "Character.Lyra".to_owned(),
            attributes: vec![],
            slots: vec![],
            fixed_attributes: fixed_attributes(),
            perks: perks.iter().map(|s| (*s).to_owned()).collect(),
            usable_perks: usable_perks.map(|ps| ps.iter().map(|s| (*s).to_owned()).collect()),
            actions: vec![],
            icon: "icons/blade".to_owned(),
            view_model: "models/lyra.vrm".to_owned(),
        }
    }

    fn perk(id: &str, style: &str) -> Perk {
        Perk {
            id: id.to_owned(),
            name: "Sharp Edge".to_owned(),
            icon: "icons/sharp".to_owned(),
            style: style.to_owned(),
            max_level: 3,
            usable_styles: None,
            parents: None,
            attributes: None,
            slot: None,
            entries: None,
            action_args: None,
            script: None,
            script_args: None,
        }
    }

    fn seeded() -> Registry {
        let mut reg = Registry::new();
        reg.add(style("Style.Lyra.Blade", &["Perk.Sharp"], None)).unwrap();
        reg.add(perk("Perk.Sharp", "Style.Lyra.Blade")).unwrap();
        reg
    }

    fn cx_serialize(reg: &Registry, perk: &Perk) -> fp_core::Result<Value> {
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(reg, &scripts, &assets);
        perk.serialize(&cx)
    }

    #[test]
    fn payload_carries_grants() {
        let mut reg = seeded();
        reg.add(entry("Entry.Haste", 3)).unwrap();
        let mut p = perk("Perk.Sharp", "Style.Lyra.Blade");
        p.attributes = Some(vec![("AttackUp".to_owned(), 0.05.into())]);
        p.slot = Some("A1".into());
        p.entries = Some(vec![("Entry.Haste".to_owned(), [1, 2])]);
        p.action_args = Some(vec![("combo_window".to_owned(), 12)]);

        let v = cx_serialize(&reg, &p).unwrap();
        assert_eq!(v["max_level"], json!(3));
        assert_eq!(v["attributes"], json!({ "AttackUp": 0.05 }));
        assert_eq!(v["slot"], json!([0, 1, 0]));
        assert_eq!(v["entries"], json!({ "Entry.Haste": [1, 2] }));
        assert_eq!(v["action_args"], json!({ "combo_window": 12 }));
    }

    #[test]
    fn owning_style_must_list_the_perk() {
        let mut reg = Registry::new();
        reg.add(style("Style.Lyra.Blade", &[], None)).unwrap();
        let p = perk("Perk.Sharp", "Style.Lyra.Blade");
        reg.add(p.clone()).unwrap();
        let err = cx_serialize(&reg, &p).unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
    }

    #[test]
    fn usable_styles_excludes_the_owner_and_references_back() {
        let mut reg = seeded();
        reg.add(style("Style.Lyra.Lance", &[], Some(&["Perk.Sharp"]))).unwrap();

        let mut p = perk("Perk.Sharp", "Style.Lyra.Blade");
        p.usable_styles = Some(vec!["Style.Lyra.Lance".to_owned()]);
        let v = cx_serialize(&reg, &p).unwrap();
        assert_eq!(v["usable_styles"], json!(["Style.Lyra.Lance"]));

        p.usable_styles = Some(vec!["Style.Lyra.Blade".to_owned()]);
        let err = cx_serialize(&reg, &p).unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));

        p.usable_styles = Some(vec![]);
        let err = cx_serialize(&reg, &p).unwrap_err();
        assert!(matches!(err, Error::RangeViolation { .. }));
    }

    #[test]
    fn parent_rank_is_capped() {
        let mut reg = Registry::new();
        reg.add(style("Style.Lyra.Blade", &["Perk.Sharp", "Perk.Edge"], None)).unwrap();
        reg.add(perk("Perk.Sharp", "Style.Lyra.Blade")).unwrap();
        let mut child = perk("Perk.Edge", "Style.Lyra.Blade");
        child.parents = Some(vec![("Perk.Sharp".to_owned(), 9)]);
        reg.add(child.clone()).unwrap();

        let err = cx_serialize(&reg, &child).unwrap_err();
        assert!(matches!(err, Error::RangeViolation { .. }));
    }
}
