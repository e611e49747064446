//! Contracts for the external collaborators.
//!
//! Two services live outside this repository: the script mini-language
//! compiler and the mesh/animation metadata reader. The core never interprets
//! script source or asset bytes itself — it calls through these traits and
//! converts any failure into a validation error scoped to the calling
//! field's path (see [`Context`](crate::context::Context)).

use serde_json::Value;

/// Compiles embedded script source into an opaque payload fragment.
pub trait ScriptCompiler {
    /// Compile `source` with the given declared argument names.
    ///
    /// The returned object is embedded into the resource payload after the
    /// core merges in a monotonically increasing script id. The error string
    /// is the compiler's own message, surfaced verbatim.
    fn compile_script(&self, source: &str, arguments: &[String]) -> Result<Value, String>;
}

/// Metadata extracted from a skeleton asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonMeta {
    /// Number of joints in the skeleton.
    pub joint_count: u32,
}

/// Metadata extracted from an animation asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationMeta {
    /// Animation length in logic ticks.
    pub duration: i64,
}

/// Reads mesh/animation metadata for cross-checks.
///
/// Used only to validate authored values (joint counts, durations) against
/// the assets they name; never drives control flow.
pub trait AssetMetaReader {
    /// Read skeleton metadata from an asset path.
    fn skeleton_meta(&self, path: &str) -> Result<SkeletonMeta, String>;

    /// Read animation metadata from an asset path.
    fn animation_meta(&self, path: &str) -> Result<AnimationMeta, String>;
}
