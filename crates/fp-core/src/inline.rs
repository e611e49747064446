//! Parametrized value expansion.
//!
//! Some resources declare integer-valued arguments (a level, a charge count)
//! and let individual fields vary along one of them. A field authored as a
//! scalar serializes in place; a field authored per-argument is expanded into
//! an out-of-band record collected by [`InlineCollector`] and attached to the
//! payload as a whole, while the field itself is left out.

use indexmap::IndexMap;
use serde_json::Value;

use crate::coerce::{FloatBounds, IntBounds, RawFloat, RawInt, RawTime, coerce_float, coerce_int, coerce_symbol, coerce_time};
use crate::error::{Error, Result};

/// Declared arguments of a resource: name → inclusive integer range.
///
/// Authoring order is kept; it is the order the table serializes in.
#[derive(Debug, Clone, Default)]
pub struct ArgumentTable {
    entries: IndexMap<String, (u32, u32)>,
}

impl ArgumentTable {
    /// Coerce an authored argument map.
    ///
    /// Names follow the symbol grammar; ranges need `0 <= min <= max`.
    pub fn coerce<S: AsRef<str>>(raw: &[(S, [i64; 2])], path: &str) -> Result<Self> {
        let mut entries = IndexMap::with_capacity(raw.len());
        for (name, range) in raw {
            let name_path = format!("{path}[{}]", name.as_ref());
            let name = coerce_symbol(name.as_ref(), &name_path, None)?;
            let min = coerce_int(range[0], &name_path, IntBounds::at_least(0))?;
            let max = coerce_int(range[1], &name_path, IntBounds::at_least(min))?;
            if entries.insert(name.clone(), (min as u32, max as u32)).is_some() {
                return Err(Error::duplicate(&name_path, "argument declared twice"));
            }
        }
        Ok(ArgumentTable { entries })
    }

    /// Range of one argument, if declared.
    pub fn get(&self, name: &str) -> Option<(u32, u32)> {
        self.entries.get(name).copied()
    }

    /// Number of values an argument spans (`max - min + 1`).
    pub fn span(&self, name: &str) -> Option<usize> {
        let (min, max) = self.get(name)?;
        Some((max - min) as usize + 1)
    }

    /// Whether no arguments are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as `{name: [min, max], ...}` in authoring order.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, (min, max)) in &self.entries {
            map.insert(name.clone(), Value::from(vec![*min, *max]));
        }
        Value::Object(map)
    }
}

/// A field that is either a plain on/off flag or gated by an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Switch {
    /// Always this value.
    Flag(bool),
    /// Controlled by the named declared argument.
    Argument(String),
}

impl From<bool> for Switch {
    fn from(v: bool) -> Self {
        Switch::Flag(v)
    }
}

impl From<&str> for Switch {
    fn from(v: &str) -> Self {
        Switch::Argument(v.to_owned())
    }
}

impl From<String> for Switch {
    fn from(v: String) -> Self {
        Switch::Argument(v)
    }
}

/// Coerce a switch: a flag passes through, an argument name must be declared.
pub fn coerce_switch(table: &ArgumentTable, raw: &Switch, path: &str) -> Result<Value> {
    match raw {
        Switch::Flag(v) => Ok(Value::Bool(*v)),
        Switch::Argument(name) => {
            let name = coerce_symbol(name, path, None)?;
            if table.get(&name).is_none() {
                return Err(Error::reference(path, format!("{name} is not a declared argument")));
            }
            Ok(Value::String(name))
        }
    }
}

/// A field value that is either a single scalar or one value per step of a
/// declared argument's range.
#[derive(Debug, Clone)]
pub enum Inline<T> {
    /// One value for every argument combination.
    Scalar(T),
    /// One value per step of `argument`'s range, low to high.
    PerArgument {
        /// The declared argument this field varies along.
        argument: String,
        /// Exactly `max - min + 1` values.
        values: Vec<T>,
    },
}

impl<T> Inline<T> {
    /// Shorthand for [`Inline::Scalar`] with conversion.
    pub fn scalar(value: impl Into<T>) -> Self {
        Inline::Scalar(value.into())
    }

    /// Shorthand for [`Inline::PerArgument`] with element conversion.
    pub fn per<V: Into<T>>(argument: &str, values: impl IntoIterator<Item = V>) -> Self {
        Inline::PerArgument {
            argument: argument.to_owned(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Collects the expanded per-argument records of one payload.
#[derive(Debug, Default)]
pub struct InlineCollector {
    records: Vec<Value>,
}

impl InlineCollector {
    /// Start an empty collector.
    pub fn new() -> Self {
        InlineCollector::default()
    }

    /// Whether no field expanded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish: the record list, or `None` when no field expanded so the
    /// payload key can be omitted.
    pub fn into_value(self) -> Option<Value> {
        if self.records.is_empty() {
            None
        } else {
            Some(Value::Array(self.records))
        }
    }

    fn push(&mut self, argument: &str, field: &str, values: Vec<Value>) {
        self.records.push(serde_json::json!({
            "k": [argument, field],
            "v": values,
        }));
    }
}

fn expanded_axis<'t, T>(
    table: &ArgumentTable,
    argument: &str,
    values: &'t [T],
    path: &str,
) -> Result<&'t [T]> {
    let Some(span) = table.span(argument) else {
        return Err(Error::reference(
            path,
            format!("{argument} is not a declared argument"),
        ));
    };
    if values.len() != span {
        return Err(Error::range(
            path,
            format!("must hold {span} values, one per {argument} step"),
        ));
    }
    Ok(values)
}

/// Coerce a possibly per-argument time field.
///
/// A scalar coerces in place and is returned; a per-argument value expands
/// into `collector` under `field` and `None` is returned so the caller skips
/// the payload key.
pub fn coerce_inline_time(
    collector: &mut InlineCollector,
    table: &ArgumentTable,
    raw: &Inline<RawTime>,
    field: &str,
    path: &str,
    bounds: IntBounds,
) -> Result<Option<i64>> {
    match raw {
        Inline::Scalar(v) => Ok(Some(coerce_time(v.clone(), path, bounds)?)),
        Inline::PerArgument { argument, values } => {
            let values = expanded_axis(table, argument, values, path)?;
            let mut out = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                out.push(Value::from(coerce_time(v.clone(), &item_path, bounds)?));
            }
            collector.push(argument, field, out);
            Ok(None)
        }
    }
}

/// Coerce a possibly per-argument float field. Same contract as
/// [`coerce_inline_time`].
pub fn coerce_inline_float(
    collector: &mut InlineCollector,
    table: &ArgumentTable,
    raw: &Inline<RawFloat>,
    field: &str,
    path: &str,
    bounds: FloatBounds,
) -> Result<Option<f64>> {
    match raw {
        Inline::Scalar(v) => Ok(Some(coerce_float(v.clone(), path, bounds)?)),
        Inline::PerArgument { argument, values } => {
            let values = expanded_axis(table, argument, values, path)?;
            let mut out = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                out.push(Value::from(coerce_float(v.clone(), &item_path, bounds)?));
            }
            collector.push(argument, field, out);
            Ok(None)
        }
    }
}

/// Coerce a possibly per-argument integer field. Same contract as
/// [`coerce_inline_time`].
pub fn coerce_inline_int(
    collector: &mut InlineCollector,
    table: &ArgumentTable,
    raw: &Inline<RawInt>,
    field: &str,
    path: &str,
    bounds: IntBounds,
) -> Result<Option<i64>> {
    match raw {
        Inline::Scalar(v) => Ok(Some(coerce_int(*v, path, bounds)?)),
        Inline::PerArgument { argument, values } => {
            let values = expanded_axis(table, argument, values, path)?;
            let mut out = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                out.push(Value::from(coerce_int(*v, &item_path, bounds)?));
            }
            collector.push(argument, field, out);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> ArgumentTable {
        ArgumentTable::coerce(&[("level", [0, 2]), ("charge", [1, 1])], "args").unwrap()
    }

    #[test]
    fn table_coercion_checks_names_and_ranges() {
        let t = table();
        assert_eq!(t.get("level"), Some((0, 2)));
        assert_eq!(t.span("level"), Some(3));
        assert_eq!(t.span("charge"), Some(1));
        assert_eq!(t.to_value(), json!({ "level": [0, 2], "charge": [1, 1] }));

        let err = ArgumentTable::coerce(&[("level", [2, 0])], "args").unwrap_err();
        assert!(matches!(err, Error::RangeViolation { .. }));

        let err = ArgumentTable::coerce(&[("bad name", [0, 1])], "args").unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));

        let err =
            ArgumentTable::coerce(&[("level", [0, 1]), ("level", [0, 2])], "args").unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
    }

    #[test]
    fn switch_flag_and_argument() {
        let t = table();
        assert_eq!(coerce_switch(&t, &Switch::from(true), "f").unwrap(), json!(true));
        assert_eq!(coerce_switch(&t, &Switch::from("level"), "f").unwrap(), json!("level"));
        let err = coerce_switch(&t, &Switch::from("mana"), "f").unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
    }

    #[test]
    fn scalar_stays_in_place() {
        let t = table();
        let mut col = InlineCollector::new();
        let v = coerce_inline_time(
            &mut col,
            &t,
            &Inline::scalar("2s"),
            "duration",
            "f.duration",
            IntBounds::NONE,
        )
        .unwrap();
        assert_eq!(v, Some(120));
        assert!(col.into_value().is_none());
    }

    #[test]
    fn per_argument_expands_into_records() {
        let t = table();
        let mut col = InlineCollector::new();
        let v = coerce_inline_float(
            &mut col,
            &t,
            &Inline::per("level", ["10%", "20%", "30%"]),
            "power",
            "f.power",
            FloatBounds::NONE,
        )
        .unwrap();
        assert_eq!(v, None);
        assert_eq!(
            col.into_value().unwrap(),
            json!([{ "k": ["level", "power"], "v": [0.1, 0.2, 0.3] }])
        );
    }

    #[test]
    fn wrong_expansion_length_fails() {
        let t = table();
        let mut col = InlineCollector::new();
        let err = coerce_inline_float(
            &mut col,
            &t,
            &Inline::per("level", [1.0, 2.0]),
            "power",
            "f.power",
            FloatBounds::NONE,
        )
        .unwrap_err();
        assert!(matches!(err, Error::RangeViolation { .. }));
    }

    #[test]
    fn undeclared_axis_fails() {
        let t = table();
        let mut col = InlineCollector::new();
        let err = coerce_inline_int(
            &mut col,
            &t,
            &Inline::per("mana", [1, 2]),
            "cost",
            "f.cost",
            IntBounds::NONE,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
    }
}
