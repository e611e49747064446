//! Gem slots.
//!
//! Slots come in three types matching the jewel types. A slot layout can be
//! authored either as a compact code (`"A1D2S1"`, letters in any order, each
//! at most once) or as an explicit `[special, attack, defense]` triple; both
//! serialize to the triple, in that order.

use std::sync::LazyLock;

use fp_core::coerce::{IntBounds, coerce_int};
use fp_core::error::{Error, Result};
use regex::Regex;
use serde_json::Value;

/// Which slot a jewel fits into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    /// Offensive slot.
    Attack,
    /// Defensive slot.
    Defense,
    /// Utility slot, usually high rarity.
    Special,
}

impl SlotType {
    /// The payload literal.
    pub fn as_str(self) -> &'static str {
        match self {
            SlotType::Attack => "Attack",
            SlotType::Defense => "Defense",
            SlotType::Special => "Special",
        }
    }
}

static RE_SLOTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ADS]\d+)?([ADS]\d+)?([ADS]\d+)?$").expect("slot regex")
});

/// One slot layout, as authored.
#[derive(Debug, Clone)]
pub enum SlotDef {
    /// Compact code like `"A1D2S1"`; omitted letters mean zero.
    Code(String),
    /// Explicit `[special, attack, defense]` counts.
    Counts([i64; 3]),
}

impl From<&str> for SlotDef {
    fn from(v: &str) -> Self {
        SlotDef::Code(v.to_owned())
    }
}

impl From<[i64; 3]> for SlotDef {
    fn from(v: [i64; 3]) -> Self {
        SlotDef::Counts(v)
    }
}

/// Coerce one layout to its `(special, attack, defense)` triple.
pub fn serialize_slot_def(def: &SlotDef, path: &str) -> Result<[i64; 3]> {
    match def {
        SlotDef::Code(code) => {
            let Some(capture) = RE_SLOTS.captures(code) else {
                return Err(Error::pattern(path, "must be an A_D_S_ code"));
            };
            let mut attack = 0;
            let mut defense = 0;
            let mut special = 0;
            for group in capture.iter().skip(1).flatten() {
                let text = group.as_str();
                let count: i64 = text[1..].parse().map_err(|_| {
                    Error::pattern(path, "must be an A_D_S_ code")
                })?;
                match &text[..1] {
                    "A" => attack = count,
                    "D" => defense = count,
                    _ => special = count,
                }
            }
            Ok([special, attack, defense])
        }
        SlotDef::Counts(counts) => {
            let mut out = [0; 3];
            for (i, v) in counts.iter().enumerate() {
                out[i] = coerce_int(*v, &format!("{path}[{i}]"), IntBounds::at_least(0))?;
            }
            Ok(out)
        }
    }
}

/// Coerce a per-level layout list of exactly `size` entries; `zero` is
/// prepended when given.
pub fn serialize_slot_defs(
    defs: &[SlotDef],
    size: usize,
    path: &str,
    zero: Option<[i64; 3]>,
) -> Result<Value> {
    if defs.len() != size {
        return Err(Error::range(path, format!("len() must = {size}")));
    }
    let mut out: Vec<Value> = Vec::with_capacity(size + 1);
    if let Some(zero) = zero {
        out.push(Value::from(zero.to_vec()));
    }
    for (i, def) in defs.iter().enumerate() {
        let triple = serialize_slot_def(def, &format!("{path}[{i}]"))?;
        out.push(Value::from(triple.to_vec()));
    }
    Ok(Value::Array(out))
}
