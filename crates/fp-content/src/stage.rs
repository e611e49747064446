//! Stages: combat scenes.

use std::any::Any;

use fp_core::coerce::{FileRules, StrRules, coerce_file, coerce_string};
use fp_core::error::Result;
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use serde_json::Value;

/// A combat scene, split into a logic file and a render file.
#[derive(Debug, Clone)]
pub struct Stage {
    /// Resource id (`Stage.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Logic scene file (`.json`).
    pub stage_file: String,
    /// Render scene file (`.tscn`).
    pub view_stage_file: String,
}

impl Resource for Stage {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Stage
    }

    fn serialize(&self, _cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let mut p = Payload::resource(Category::Stage, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set(
            "stage_file",
            coerce_file(
                &self.stage_file,
                &h("stage_file"),
                FileRules { extension: Some(".json"), allow_absolute: false },
            )?,
        );
        p.set(
            "view_stage_file",
            coerce_file(
                &self.view_stage_file,
                &h("view_stage_file"),
                FileRules { extension: Some(".tscn"), allow_absolute: false },
            )?,
        );
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Stage {
    const CATEGORY: Category = Category::Stage;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeAssets, FakeScripts};
    use fp_core::{Error, Registry};
    use serde_json::json;

    #[test]
    fn both_scene_files_are_extension_checked() {
        let reg = Registry::new();
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(&reg, &scripts, &assets);

        let stage = Stage {
            id: "Stage.Arena".to_owned(),
            name: "Arena".to_owned(),
            stage_file: "stages/arena.json".to_owned(),
            view_stage_file: "stages/arena.tscn".to_owned(),
        };
        let v = stage.serialize(&cx).unwrap();
        assert_eq!(v["stage_file"], json!("stages/arena.json"));
        assert_eq!(v["view_stage_file"], json!("stages/arena.tscn"));

        let bad = Stage { view_stage_file: "stages/arena.scn".to_owned(), ..stage };
        let err = bad.serialize(&cx).unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
    }
}
