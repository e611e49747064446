//! Core engine of the Forgepoint content compiler: coercion, the resource
//! registry, parametrized expansion, and the indexed container writer.
//!
//! This crate knows nothing about concrete game resources. Schemas implement
//! [`Resource`](registry::Resource) on their own types and drive everything
//! through [`compile`](compile::compile).

/// Raw value coercion: ints, booleans, times, floats, strings, files, lists,
/// ranges.
pub mod coerce;
/// The single compile pass over a registry.
pub mod compile;
/// Compile-time constants: tick rate and authoring limits.
pub mod config;
/// Per-pass state shared by serializing resources.
pub mod context;
/// Error types used throughout the crate.
pub mod error;
/// Contracts for the script compiler and asset metadata reader.
pub mod external;
/// Resource identifiers and category prefixes.
pub mod id;
/// Parametrized (per-argument) value expansion.
pub mod inline;
/// Ordered payload object builder.
pub mod payload;
/// Plus-value channel merging.
pub mod plus;
/// The insertion-ordered resource registry and reference resolver.
pub mod registry;
/// Two-file indexed container output.
pub mod writer;

/// Re-export error types.
pub use error::{Error, Result};
/// Re-export id types.
pub use id::{Category, ResourceId};
/// Re-export registry types.
pub use registry::{Keyed, Registry, Resource};
/// Re-export the compile entry point.
pub use compile::compile;
/// Re-export the compile context.
pub use context::Context;
