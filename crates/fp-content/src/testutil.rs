//! Test doubles for the external collaborators, shared by unit and
//! integration tests.

use std::cell::RefCell;

use fp_core::external::{AnimationMeta, AssetMetaReader, ScriptCompiler, SkeletonMeta};
use serde_json::{Value, json};

use crate::character::FixedAttributes;
use crate::entry::Entry;

/// Recording fake script compiler.
///
/// Compiles every script to `{"body": source, "args": [...]}` and keeps the
/// call list. A source equal to `fail_on` is rejected instead, to exercise
/// fail-stop paths.
#[derive(Debug, Default)]
pub struct FakeScripts {
    /// Every `(source, arguments)` pair compiled so far.
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
    /// Script source that should fail to compile.
    pub fail_on: Option<String>,
}

impl ScriptCompiler for FakeScripts {
    fn compile_script(&self, source: &str, arguments: &[String]) -> Result<Value, String> {
        if self.fail_on.as_deref() == Some(source) {
            return Err("forced compile failure".to_owned());
        }
        self.calls
            .borrow_mut()
            .push((source.to_owned(), arguments.to_vec()));
        Ok(json!({ "body": source, "args": arguments }))
    }
}

/// Fake asset reader answering every path with fixed metadata.
#[derive(Debug)]
pub struct FakeAssets {
    /// Joint count reported for every skeleton.
    pub joint_count: u32,
    /// Duration in ticks reported for every animation.
    pub duration: i64,
}

impl Default for FakeAssets {
    fn default() -> Self {
        FakeAssets { joint_count: 24, duration: 600 }
    }
}

impl AssetMetaReader for FakeAssets {
    fn skeleton_meta(&self, _path: &str) -> Result<SkeletonMeta, String> {
        Ok(SkeletonMeta { joint_count: self.joint_count })
    }

    fn animation_meta(&self, _path: &str) -> Result<AnimationMeta, String> {
        Ok(AnimationMeta { duration: self.duration })
    }
}

/// Bounded fixed-attribute block accepted by every style.
pub fn fixed_attributes() -> FixedAttributes {
    FixedAttributes {
        damage_reduce_param_1: 0.1.into(),
        damage_reduce_param_2: 100.0.into(),
        guard_damage_ratio_1: 0.5.into(),
        deposture_reduce_param_1: 0.1.into(),
        deposture_reduce_param_2: 100.0.into(),
        guard_deposture_ratio_1: 0.5.into(),
        weak_damage_up: 0.25.into(),
    }
}

/// Minimal valid entry for tests; override fields with struct update syntax.
pub fn entry(id: &str, max_piece: i64) -> Entry {
    Entry {
        id: id.to_owned(),
        name: "Test Entry".to_owned(),
        icon: "icons/test".to_owned(),
        color: None,
        max_piece,
        attributes: None,
        script: None,
        script_args: None,
    }
}
