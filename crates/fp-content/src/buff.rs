//! Buffs: script-driven passive effects.

use std::any::Any;

use fp_core::coerce::{RawFloat, StrRules, coerce_string};
use fp_core::error::Result;
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use serde_json::Value;

use crate::script::{serialize_script, serialize_script_arg_values};

/// A passive effect driven entirely by its hook scripts. `arguments` names
/// the variables callers may pass in; every hook script sees them.
#[derive(Debug, Clone, Default)]
pub struct Buff {
    /// Resource id (`Buff.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Icon path.
    pub icon: String,
    /// Caller-tunable variables with their default values.
    pub arguments: Vec<(String, RawFloat)>,
    /// Runs when the buff is applied.
    pub on_start: Option<String>,
    /// Runs when the buff expires or is removed.
    pub on_finish: Option<String>,
    /// Runs on every outgoing hit.
    pub on_hit: Option<String>,
    /// Runs on every incoming hit.
    pub on_hurt: Option<String>,
    /// Runs every logic tick.
    pub on_tick: Option<String>,
}

impl Resource for Buff {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Buff
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let arg_names: Vec<String> = self.arguments.iter().map(|(n, _)| n.clone()).collect();

        let mut p = Payload::resource(Category::Buff, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set("icon", coerce_string(&self.icon, &h("icon"), StrRules::default())?);
        p.set(
            "arguments",
            serialize_script_arg_values(&self.arguments, &h("arguments"))?,
        );
        let hooks: [(&str, &Option<String>); 5] = [
            ("on_start", &self.on_start),
            ("on_finish", &self.on_finish),
            ("on_hit", &self.on_hit),
            ("on_hurt", &self.on_hurt),
            ("on_tick", &self.on_tick),
        ];
        for (field, source) in hooks {
            if let Some(source) = source {
                p.set(field, serialize_script(cx, source, Some(&arg_names), &h(field))?);
            }
        }
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Buff {
    const CATEGORY: Category = Category::Buff;
}
