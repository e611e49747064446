//! The compile pass.
//!
//! One call turns a fully declared registry into a container on disk. The
//! pass is fail-stop: the first invalid resource aborts everything and the
//! output directory ends up with two empty files instead of a half-written
//! container.

use std::path::Path;

use crate::context::Context;
use crate::error::Result;
use crate::external::{AssetMetaReader, ScriptCompiler};
use crate::registry::Registry;
use crate::writer::ContainerWriter;

/// Serialize every registered resource into `out_dir` in declaration order.
pub fn compile(
    registry: &Registry,
    scripts: &dyn ScriptCompiler,
    assets: &dyn AssetMetaReader,
    out_dir: &Path,
) -> Result<()> {
    let cx = Context::new(registry, scripts, assets);
    let mut writer = ContainerWriter::create(out_dir)?;
    for resource in registry.iter() {
        let payload = resource.serialize(&cx)?;
        let bytes = serde_json::to_string(&payload).map_err(std::io::Error::other)?;
        writer.write(resource.id(), &bytes, resource.cache())?;
    }
    writer.close()
}
