//! Plus-value channels.
//!
//! An authored map key may carry a trailing `+` to target the "plus" channel
//! of the same base name (`"AttackUp+"` alongside `"AttackUp"`). The merger
//! folds both spellings into one record stream keyed by `(base, plus)` so the
//! runtime never re-parses names.

use serde_json::Value;

use crate::error::{Error, Result};

/// Split a trailing `+` off an authored key.
pub fn split_plus(name: &str) -> (&str, bool) {
    match name.strip_suffix('+') {
        Some(base) => (base, true),
        None => (name, false),
    }
}

/// One merged channel: base name, plus flag, coerced value.
#[derive(Debug, Clone, PartialEq)]
pub struct PlusRecord {
    /// Base name with any trailing `+` removed.
    pub base: String,
    /// Whether the authored key targeted the plus channel.
    pub plus: bool,
    /// The coerced channel value.
    pub value: Value,
}

impl PlusRecord {
    /// Serialize as `{"k": [base, plus], "v": value}`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "k": [&self.base, self.plus], "v": self.value })
    }
}

/// Serialize a record list in authoring order.
pub fn records_value(records: &[PlusRecord]) -> Value {
    Value::Array(records.iter().map(PlusRecord::to_value).collect())
}

/// Merge an authored map with plus-suffixed keys into channel records.
///
/// Base names must pass `vocabulary`; each value is coerced by `coerce_value`
/// with the item's path. A repeated `(base, plus)` pair fails, so
/// `"AttackUp+"` may coexist with `"AttackUp"` but not appear twice itself.
pub fn merge_plus<V>(
    entries: &[(String, V)],
    path: &str,
    vocabulary: impl Fn(&str) -> bool,
    mut coerce_value: impl FnMut(&V, &str) -> Result<Value>,
) -> Result<Vec<PlusRecord>> {
    let mut out: Vec<PlusRecord> = Vec::with_capacity(entries.len());
    for (name, raw) in entries {
        let item_path = format!("{path}[{name}]");
        let (base, plus) = split_plus(name);
        if !vocabulary(base) {
            return Err(Error::pattern(&item_path, format!("{base} is not a known name")));
        }
        if out.iter().any(|r| r.base == base && r.plus == plus) {
            return Err(Error::duplicate(&item_path, "channel already set"));
        }
        let value = coerce_value(raw, &item_path)?;
        out.push(PlusRecord {
            base: base.to_owned(),
            plus,
            value,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_detects_the_suffix() {
        assert_eq!(split_plus("AttackUp"), ("AttackUp", false));
        assert_eq!(split_plus("AttackUp+"), ("AttackUp", true));
        assert_eq!(split_plus("+"), ("", true));
    }

    fn merge(entries: &[(String, i64)]) -> Result<Vec<PlusRecord>> {
        merge_plus(
            entries,
            "f.attrs",
            |base| base == "AttackUp" || base == "DefenseUp",
            |v, _| Ok(json!(*v)),
        )
    }

    #[test]
    fn both_channels_of_one_base_coexist() {
        let entries = [
            ("AttackUp".to_owned(), 10),
            ("AttackUp+".to_owned(), 5),
            ("DefenseUp".to_owned(), 3),
        ];
        let records = merge(&entries).unwrap();
        assert_eq!(
            records_value(&records),
            json!([
                { "k": ["AttackUp", false], "v": 10 },
                { "k": ["AttackUp", true], "v": 5 },
                { "k": ["DefenseUp", false], "v": 3 },
            ])
        );
    }

    #[test]
    fn repeated_channel_fails() {
        let entries = [("AttackUp+".to_owned(), 10), ("AttackUp+".to_owned(), 5)];
        let err = merge(&entries).unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
        assert!(err.to_string().contains("f.attrs[AttackUp+]"));
    }

    #[test]
    fn unknown_base_fails() {
        let entries = [("ManaUp".to_owned(), 10)];
        let err = merge(&entries).unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
    }

    #[test]
    fn coercion_failure_carries_the_item_path() {
        let entries = [("AttackUp".to_owned(), -1)];
        let err = merge_plus(
            &entries,
            "f.attrs",
            |_| true,
            |v, p| {
                if *v < 0 {
                    Err(Error::range(p, "must >= 0"))
                } else {
                    Ok(json!(*v))
                }
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "f.attrs[AttackUp]: must >= 0");
    }
}
