//! Shared state for one compilation pass.
//!
//! A [`Context`] bundles the registry with the external collaborators and
//! hands out monotonically increasing script ids. Resources receive it in
//! [`Resource::serialize`](crate::registry::Resource::serialize) and use it
//! for cross-resource lookups and asset cross-checks.

use std::cell::Cell;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::external::{AnimationMeta, AssetMetaReader, ScriptCompiler, SkeletonMeta};
use crate::registry::Registry;

/// Per-pass compilation state.
pub struct Context<'a> {
    registry: &'a Registry,
    scripts: &'a dyn ScriptCompiler,
    assets: &'a dyn AssetMetaReader,
    next_script_id: Cell<u64>,
}

impl<'a> Context<'a> {
    /// Bundle the registry with the external collaborators.
    pub fn new(
        registry: &'a Registry,
        scripts: &'a dyn ScriptCompiler,
        assets: &'a dyn AssetMetaReader,
    ) -> Self {
        Context {
            registry,
            scripts,
            assets,
            next_script_id: Cell::new(1),
        }
    }

    /// The registry being compiled.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Compile embedded script source and stamp it with a pass-unique id.
    ///
    /// Ids start at 1 and increase with every compiled script across the
    /// whole pass, never per resource. A compiler failure is reported as a
    /// pattern violation at `path`.
    pub fn compile_script(&self, source: &str, arguments: &[String], path: &str) -> Result<Value> {
        let compiled = self
            .scripts
            .compile_script(source, arguments)
            .map_err(|msg| Error::pattern(path, msg))?;
        let Value::Object(mut obj) = compiled else {
            return Err(Error::pattern(path, "script compiler returned a non-object"));
        };
        let id = self.next_script_id.get();
        self.next_script_id.set(id + 1);
        obj.insert("id".to_owned(), Value::from(id));
        Ok(Value::Object(obj))
    }

    /// Read skeleton metadata, scoping a reader failure to `path`.
    pub fn skeleton_meta(&self, file: &str, path: &str) -> Result<SkeletonMeta> {
        self.assets
            .skeleton_meta(file)
            .map_err(|msg| Error::reference(path, msg))
    }

    /// Read animation metadata, scoping a reader failure to `path`.
    pub fn animation_meta(&self, file: &str, path: &str) -> Result<AnimationMeta> {
        self.assets
            .animation_meta(file)
            .map_err(|msg| Error::reference(path, msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoScripts;

    impl ScriptCompiler for EchoScripts {
        fn compile_script(&self, source: &str, _arguments: &[String]) -> std::result::Result<Value, String> {
            if source.is_empty() {
                return Err("empty script".to_owned());
            }
            Ok(json!({ "body": source }))
        }
    }

    struct NoAssets;

    impl AssetMetaReader for NoAssets {
        fn skeleton_meta(&self, path: &str) -> std::result::Result<SkeletonMeta, String> {
            Err(format!("{path}: no such asset"))
        }

        fn animation_meta(&self, path: &str) -> std::result::Result<AnimationMeta, String> {
            Err(format!("{path}: no such asset"))
        }
    }

    #[test]
    fn script_ids_increase_across_the_pass() {
        let reg = Registry::new();
        let cx = Context::new(&reg, &EchoScripts, &NoAssets);
        let a = cx.compile_script("x", &[], "a.script").unwrap();
        let b = cx.compile_script("y", &[], "b.script").unwrap();
        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
        assert_eq!(a["body"], "x");
    }

    #[test]
    fn compiler_failure_is_scoped_to_the_field() {
        let reg = Registry::new();
        let cx = Context::new(&reg, &EchoScripts, &NoAssets);
        let err = cx.compile_script("", &[], "<Action.Hit>.script").unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
        assert_eq!(err.to_string(), "<Action.Hit>.script: empty script");
    }

    #[test]
    fn asset_failure_is_scoped_to_the_field() {
        let reg = Registry::new();
        let cx = Context::new(&reg, &EchoScripts, &NoAssets);
        let err = cx.skeleton_meta("ch/lk.skel", "<Character.LK>.skeleton").unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
    }
}
