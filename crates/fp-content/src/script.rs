//! Embedded script fields.
//!
//! Several resources carry script source plus a map of tunable arguments.
//! The source goes through the external compiler (see
//! [`Context::compile_script`](fp_core::Context::compile_script)); the
//! argument maps serialize next to it so the runtime can feed values in.

use std::sync::LazyLock;

use fp_core::Context;
use fp_core::coerce::{FloatBounds, RawFloat, coerce_float, coerce_float_list, coerce_symbol};
use fp_core::error::{Error, Result};
use fp_core::plus::{merge_plus, records_value};
use regex::Regex;
use serde_json::Value;

pub(crate) static RE_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("arg regex"));

/// Collect the declared argument names across several maps, rejecting a name
/// that appears twice. `None` when nothing is declared.
pub fn extract_arg_names<V>(
    groups: &[Option<&[(String, V)]>],
    path: &str,
) -> Result<Option<Vec<String>>> {
    let mut names: Vec<String> = Vec::new();
    for group in groups.iter().flatten() {
        for (name, _) in *group {
            if names.contains(name) {
                return Err(Error::duplicate(
                    path,
                    format!("duplicate script argument \"{name}\""),
                ));
            }
            names.push(name.clone());
        }
    }
    Ok(if names.is_empty() { None } else { Some(names) })
}

/// Compile script source with its declared argument names.
pub fn serialize_script(
    cx: &Context<'_>,
    source: &str,
    arg_names: Option<&[String]>,
    path: &str,
) -> Result<Value> {
    cx.compile_script(source, arg_names.unwrap_or(&[]), path)
}

/// Serialize a per-level argument map: name → `size` floats, `zero`
/// prepended when given.
pub fn serialize_script_args(
    args: &[(String, Vec<RawFloat>)],
    size: usize,
    path: &str,
    zero: Option<f64>,
) -> Result<Value> {
    let mut map = serde_json::Map::new();
    for (name, vals) in args {
        let item_path = format!("{path}[{name}]");
        let name = coerce_symbol(name, &item_path, Some(&RE_ARG))?;
        let vals = coerce_float_list(vals, size, &item_path, FloatBounds::NONE, zero)?;
        map.insert(name, Value::from(vals));
    }
    Ok(Value::Object(map))
}

/// Serialize a scalar argument map: name → one float.
pub fn serialize_script_arg_values(args: &[(String, RawFloat)], path: &str) -> Result<Value> {
    let mut map = serde_json::Map::new();
    for (name, val) in args {
        let item_path = format!("{path}[{name}]");
        let name = coerce_symbol(name, &item_path, Some(&RE_ARG))?;
        let val = coerce_float(val.clone(), &item_path, FloatBounds::NONE)?;
        map.insert(name, Value::from(val));
    }
    Ok(Value::Object(map))
}

/// Serialize a per-level argument map whose names may carry a plus channel,
/// producing ordered channel records.
pub fn serialize_script_args_plus(
    args: &[(String, Vec<RawFloat>)],
    size: usize,
    path: &str,
    zero: Option<f64>,
) -> Result<Value> {
    let records = merge_plus(
        args,
        path,
        |base| RE_ARG.is_match(base),
        |vals, item_path| {
            let vals = coerce_float_list(vals, size, item_path, FloatBounds::NONE, zero)?;
            Ok(Value::from(vals))
        },
    )?;
    Ok(records_value(&records))
}
