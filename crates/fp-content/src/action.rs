//! Actions: the combat state machine nodes.
//!
//! A character is always inside exactly one action. Pressing a key searches
//! the current action's `derives`, then every action's `enter_key`; the new
//! action is entered when its enter level beats the current derive level.
//! Per-argument fields let one authored action expand into a family of
//! parametrized variants at load time.

use std::any::Any;

use fp_core::coerce::{
    FileRules, FloatBounds, IntBounds, RawFloat, RawInt, RawTime, coerce_bool, coerce_file,
    coerce_int, coerce_symbol, coerce_time,
};
use fp_core::error::{Error, Result};
use fp_core::inline::{
    ArgumentTable, Inline, InlineCollector, Switch, coerce_inline_float, coerce_inline_int,
    coerce_inline_time, coerce_switch,
};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use serde_json::Value;

use crate::character::Style;
use crate::script::serialize_script;

/// Idle state, the lowest enter and derive level.
pub const LEVEL_IDLE: i64 = 0;
/// Movement, slightly above idle to order the two.
pub const LEVEL_MOVE: i64 = 50;
/// Recovery phase of normal attacks.
pub const LEVEL_ATTACK: i64 = 100;
/// Recovery phase of skills.
pub const LEVEL_SKILL: i64 = 200;
/// High-priority special derives.
pub const LEVEL_DERIVE: i64 = 300;
/// Recovery phase of ultimates.
pub const LEVEL_ULTIMATE: i64 = 400;
/// Windup and execution of any action.
pub const LEVEL_ACTION: i64 = 500;
/// Cannot be interrupted.
pub const LEVEL_UNBREAKABLE: i64 = 600;

/// Keys that can start an action from anywhere.
pub const ENTER_KEYS: &[&str] = &[
    "Run", "Dash", "Walk", "View", "Dodge", "Jump", "Guard", "Interact", "Lock", "LockSwitch",
    "Attack1", "Attack2", "Attack3", "Shot1", "Shot2", "Aim", "Reload", "Extra1", "Extra2",
    "Extra3", "Skill1", "Skill2", "Skill3", "Skill4", "Item1", "Item2", "Item3", "Item4", "Item5",
    "Item6", "Item7", "Item8",
];

/// Keys valid only inside an action's derive window.
pub const DERIVE_KEYS: &[&str] = &[
    "DeriveMove", "DeriveLight", "DeriveHeavy", "DeriveMiddle", "DeriveShot", "DeriveAim",
    "DeriveExtra",
];

/// Coerce an enter or derive level into the valid band.
pub fn coerce_action_level(raw: impl Into<RawInt>, path: &str) -> Result<i64> {
    coerce_int(raw, path, IntBounds::between(LEVEL_IDLE, LEVEL_UNBREAKABLE))
}

fn check_key(vocabulary: &[&str], key: &str, path: &str) -> Result<String> {
    if !vocabulary.contains(&key) {
        return Err(Error::pattern(path, format!("key \"{key}\" not supported")));
    }
    Ok(key.to_owned())
}

/// Serialize a name-to-integer parameter override map; names follow the
/// script argument grammar.
pub fn serialize_action_args(args: &[(String, i64)], path: &str) -> Result<Value> {
    let mut map = serde_json::Map::new();
    for (name, val) in args {
        let item_path = format!("{path}[{name}]");
        let name = coerce_symbol(name, &item_path, Some(&crate::script::RE_ARG))?;
        map.insert(name, Value::from(coerce_int(*val, &item_path, IntBounds::NONE)?));
    }
    Ok(Value::Object(map))
}

/// One animation clip reference.
///
/// A duration mismatch between the file and `duration` is scaled at load
/// time, so only the file's existence is checked here.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Clip file (`.ozz`).
    pub file: String,
    /// Playback duration in ticks, at least 1.
    pub duration: RawTime,
    /// Loop count; 0 plays forever.
    pub times: i64,
    /// Blend additively over the base pose.
    pub additive: RawInt,
    /// Progress matching offset for limb blending; bounded by `duration`.
    pub body_progress: Option<RawTime>,
}

impl Animation {
    /// Single-clip shorthand playing once, non-additive.
    pub fn once(file: &str, duration: impl Into<RawTime>) -> Self {
        Animation {
            file: file.to_owned(),
            duration: duration.into(),
            times: 1,
            additive: false.into(),
            body_progress: None,
        }
    }

    /// Serialize and verify the clip through the asset reader.
    pub fn serialize(&self, cx: &Context<'_>, path: &str) -> Result<Value> {
        let file = coerce_file(
            &self.file,
            &format!("{path}.file"),
            FileRules { extension: Some(".ozz"), allow_absolute: false },
        )?;
        cx.animation_meta(&file, &format!("{path}.file"))?;
        let duration = coerce_time(
            self.duration.clone(),
            &format!("{path}.duration"),
            IntBounds::at_least(1),
        )?;
        let mut map = serde_json::Map::new();
        map.insert("file".to_owned(), Value::from(file));
        map.insert("duration".to_owned(), Value::from(duration));
        map.insert(
            "times".to_owned(),
            Value::from(coerce_int(self.times, &format!("{path}.times"), IntBounds::at_least(0))?),
        );
        map.insert(
            "additive".to_owned(),
            Value::from(coerce_bool(self.additive, &format!("{path}.additive"))?),
        );
        if let Some(progress) = &self.body_progress {
            map.insert(
                "body_progress".to_owned(),
                Value::from(coerce_time(
                    progress.clone(),
                    &format!("{path}.body_progress"),
                    IntBounds::between(0, duration),
                )?),
            );
        }
        Ok(Value::Object(map))
    }
}

/// A combat action.
#[derive(Debug, Clone)]
pub struct Action {
    /// Resource id (`Action.*`).
    pub id: ResourceId,
    /// Whether the action is active; may follow an expansion argument.
    pub enabled: Switch,
    /// Owning character.
    pub character: ResourceId,
    /// Styles allowed to use the action; each must reference back.
    pub styles: Vec<ResourceId>,
    /// Expansion arguments as `(name, [min, max])` step ranges.
    pub arguments: Vec<(String, [i64; 2])>,
    /// Main animation clip.
    pub anim_main: Animation,
    /// Global entry key.
    pub enter_key: Option<String>,
    /// Entry level compared against the current action's derive level.
    pub enter_level: i64,
    /// Derive level during the recovery phase.
    pub derive_level: Inline<RawInt>,
    /// Offset where the derive window opens.
    pub derive_start: Inline<RawTime>,
    /// Derive window length; absent means until the action ends.
    pub derive_duration: Option<Inline<RawTime>>,
    /// Cooldown per use in seconds.
    pub cool_down_time: Inline<RawFloat>,
    /// Derive-only keys valid inside this action.
    pub derives: Vec<String>,
    /// Behavior script source, compiled with the expansion argument names.
    pub script: Option<String>,
}

impl Resource for Action {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Action
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        cx.registry().get_by(Category::Character, &self.character, &h("character"))?;
        let mut styles = Vec::with_capacity(self.styles.len());
        for (idx, id) in self.styles.iter().enumerate() {
            let item_path = format!("{}[{idx}]", h("styles"));
            let style = cx.registry().get::<Style>(id, &item_path)?;
            if style.character != self.character {
                return Err(Error::reference(&item_path, "character mismatch with styles"));
            }
            if !style.actions.contains(&self.id) {
                return Err(Error::reference(&item_path, "Style and Action mismatch"));
            }
            styles.push(id.clone());
        }

        let table = ArgumentTable::coerce(&self.arguments, &h("arguments"))?;
        let mut inline = InlineCollector::new();

        let mut p = Payload::resource(Category::Action, &self.id);
        p.set("enabled", coerce_switch(&table, &self.enabled, &h("enabled"))?);
        p.set("character", self.character.as_str());
        p.set("styles", styles);
        if !table.is_empty() {
            p.set("arguments", table.to_value());
        }
        p.set("anim_main", self.anim_main.serialize(cx, &h("anim_main"))?);
        if let Some(key) = &self.enter_key {
            p.set("enter_key", check_key(ENTER_KEYS, key, &h("enter_key"))?);
        }
        p.set("enter_level", coerce_action_level(self.enter_level, &h("enter_level"))?);
        p.set_opt(
            "derive_level",
            coerce_inline_int(
                &mut inline,
                &table,
                &self.derive_level,
                "derive_level",
                &h("derive_level"),
                IntBounds::between(LEVEL_IDLE, LEVEL_UNBREAKABLE),
            )?,
        );
        p.set_opt(
            "derive_start",
            coerce_inline_time(
                &mut inline,
                &table,
                &self.derive_start,
                "derive_start",
                &h("derive_start"),
                IntBounds::at_least(0),
            )?,
        );
        if let Some(duration) = &self.derive_duration {
            p.set_opt(
                "derive_duration",
                coerce_inline_time(
                    &mut inline,
                    &table,
                    duration,
                    "derive_duration",
                    &h("derive_duration"),
                    IntBounds::at_least(0),
                )?,
            );
        }
        p.set_opt(
            "cool_down_time",
            coerce_inline_float(
                &mut inline,
                &table,
                &self.cool_down_time,
                "cool_down_time",
                &h("cool_down_time"),
                FloatBounds::at_least(0.0),
            )?,
        );
        if !self.derives.is_empty() {
            let mut derives = Vec::with_capacity(self.derives.len());
            for (idx, key) in self.derives.iter().enumerate() {
                let item_path = format!("{}[{idx}]", h("derives"));
                let key = check_key(DERIVE_KEYS, key, &item_path)?;
                if derives.contains(&key) {
                    return Err(Error::duplicate(&item_path, format!("{key} listed twice")));
                }
                derives.push(key);
            }
            p.set("derives", derives);
        }
        if let Some(script) = &self.script {
            let arg_names: Vec<String> = self.arguments.iter().map(|(n, _)| n.clone()).collect();
            let arg_names = (!arg_names.is_empty()).then_some(arg_names);
            p.set("script", serialize_script(cx, script, arg_names.as_deref(), &h("script"))?);
        }
        p.set_opt("inline", inline.into_value());
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Action {
    const CATEGORY: Category = Category::Action;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::shape::Capsule;
    use crate::testutil::{FakeAssets, FakeScripts, fixed_attributes};
    use fp_core::Registry;
    use serde_json::json;

    fn world(action_id: &str) -> Registry {
        let mut reg = Registry::new();
        reg.add(Character {
            id: "Character.Lyra".to_owned(),
            name: "Lyra".to_owned(),
            level: vec![1.into(), 3.into()],
            styles: vec!["Style.Lyra.Blade".to_owned()],
            equipments: vec![],
            bounding_capsule: Capsule { half_height: 0.6.into(), radius: 0.3.into() },
            skeleton: "models/lyra.ozz".to_owned(),
        })
        .unwrap();
        reg.add(Style {
            id: "Style.Lyra.Blade".to_owned(),
            name: "Blade".to_owned(),
            character: "Character.Lyra".to_owned(),
            attributes: vec![],
            slots: vec![],
            fixed_attributes: fixed_attributes(),
            perks: vec![],
            usable_perks: None,
            actions: vec![action_id.to_owned()],
            icon: "icons/blade".to_owned(),
            view_model: "models/lyra.vrm".to_owned(),
        })
        .unwrap();
        reg
    }

    fn slash(id: &str) -> Action {
        Action {
            id: id.to_owned(),
            enabled: Switch::Flag(true),
            character: "Character.Lyra".to_owned(),
            styles: vec!["Style.Lyra.Blade".to_owned()],
            arguments: vec![],
            anim_main: Animation::once("anims/slash.ozz", 45),
            enter_key: Some("Attack1".to_owned()),
            enter_level: LEVEL_ATTACK,
            derive_level: Inline::scalar(LEVEL_ATTACK),
            derive_start: Inline::scalar(30),
            derive_duration: None,
            cool_down_time: Inline::scalar(0.0),
            derives: vec!["DeriveLight".to_owned()],
            script: None,
        }
    }

    fn serialize(reg: &Registry, action: &Action) -> fp_core::Result<Value> {
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(reg, &scripts, &assets);
        action.serialize(&cx)
    }

    #[test]
    fn scalar_action_has_no_inline_block() {
        let reg = world("Action.Lyra.Slash");
        let v = serialize(&reg, &slash("Action.Lyra.Slash")).unwrap();
        assert_eq!(v["enabled"], json!(true));
        assert_eq!(v["enter_key"], json!("Attack1"));
        assert_eq!(v["enter_level"], json!(LEVEL_ATTACK));
        assert_eq!(v["derive_start"], json!(30));
        assert_eq!(v["derives"], json!(["DeriveLight"]));
        assert!(v.get("arguments").is_none());
        assert!(v.get("inline").is_none());
    }

    #[test]
    fn per_argument_fields_expand_into_the_inline_block() {
        let reg = world("Action.Lyra.Combo");
        let mut action = slash("Action.Lyra.Combo");
        action.arguments = vec![("combo".to_owned(), [1, 3])];
        action.enabled = Switch::Argument("combo".to_owned());
        action.derive_start = Inline::per("combo", [20, 25, 30]);

        let v = serialize(&reg, &action).unwrap();
        assert_eq!(v["enabled"], json!("combo"));
        assert_eq!(v["arguments"], json!({ "combo": [1, 3] }));
        assert!(v.get("derive_start").is_none());
        assert_eq!(
            v["inline"],
            json!([{ "k": ["combo", "derive_start"], "v": [20, 25, 30] }])
        );
    }

    #[test]
    fn style_must_list_the_action() {
        let reg = world("Action.Lyra.Other");
        let err = serialize(&reg, &slash("Action.Lyra.Slash")).unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
    }

    #[test]
    fn keys_are_vocabulary_checked() {
        let reg = world("Action.Lyra.Slash");
        let mut action = slash("Action.Lyra.Slash");
        action.enter_key = Some("Attack9".to_owned());
        assert!(serialize(&reg, &action).is_err());

        let mut action = slash("Action.Lyra.Slash");
        action.derives = vec!["Dodge".to_owned()];
        let err = serialize(&reg, &action).unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
    }

    #[test]
    fn body_progress_is_bounded_by_the_clip_duration() {
        let reg = world("Action.Lyra.Slash");
        let mut action = slash("Action.Lyra.Slash");
        action.anim_main.body_progress = Some(90.into());
        let err = serialize(&reg, &action).unwrap_err();
        assert!(matches!(err, Error::RangeViolation { .. }));
    }
}
