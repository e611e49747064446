//! Product constants shared by the coercion library and the content schemas.
//!
//! These are fixed properties of the runtime the bundle targets, not
//! deployment knobs, so they live here as constants rather than in a
//! runtime-loaded configuration.

/// Logic ticks per authored second. Time strings like `"2s"` convert to
/// `round(TICK_RATE * 2)` ticks.
pub const TICK_RATE: f64 = 60.0;

/// Maximum length of a symbol or [`ResourceId`](crate::id) in bytes.
pub const MAX_SYMBOL_LEN: usize = 64;

/// Maximum length of a display name.
pub const MAX_NAME_LEN: usize = 48;

/// Number of "+" stacks that fit into one entry piece. Content schemas use
/// this to cap plus totals against piece counts.
pub const MAX_ENTRY_PLUS: i64 = 3;
