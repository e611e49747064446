//! Entries: stackable effects carried by equipment, accessories and jewels.
//!
//! An entry activates once the wearer collects enough pieces of it; the plus
//! channel tracks refinement of those pieces. `MAX_ENTRY_PLUS` pluses per
//! piece is the hard cap enforced wherever entries are referenced.

use std::any::Any;
use std::sync::LazyLock;

use fp_core::coerce::{IntBounds, RawFloat, StrRules, coerce_int, coerce_int_list, coerce_string};
use fp_core::config::MAX_ENTRY_PLUS;
use fp_core::error::{Error, Result};
use fp_core::payload::Payload;
use fp_core::{Category, Context, Resource, ResourceId};
use regex::Regex;
use serde_json::Value;

use crate::attribute::{AttrClass, serialize_attributes_plus};
use crate::script::{extract_arg_names, serialize_script, serialize_script_args_plus};

static RE_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("color regex"));

/// A stackable effect definition.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Resource id (`Entry.*`).
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Icon asset name.
    pub icon: String,
    /// Optional `#rrggbb` tint.
    pub color: Option<String>,
    /// Piece cap, 1..=99; attribute/argument lists are sized by it.
    pub max_piece: i64,
    /// Per-piece attribute gains; keys may carry a plus channel.
    pub attributes: Option<Vec<(String, Vec<RawFloat>)>>,
    /// Effect script source.
    pub script: Option<String>,
    /// Per-piece script arguments; names may carry a plus channel.
    pub script_args: Option<Vec<(String, Vec<RawFloat>)>>,
}

impl Resource for Entry {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        Category::Entry
    }

    fn serialize(&self, cx: &Context<'_>) -> Result<Value> {
        let h = |field: &str| format!("<{}>.{field}", self.id);
        let max_piece = coerce_int(self.max_piece, &h("max_piece"), IntBounds::between(1, 99))?;

        let mut p = Payload::resource(Category::Entry, &self.id);
        p.set("name", coerce_string(&self.name, &h("name"), StrRules::default())?);
        p.set("icon", coerce_string(&self.icon, &h("icon"), StrRules::default())?);
        if let Some(color) = &self.color {
            p.set(
                "color",
                coerce_string(color, &h("color"), StrRules::matching(&RE_COLOR))?,
            );
        }
        p.set("max_piece", max_piece);
        if let Some(attrs) = &self.attributes {
            p.set(
                "attributes",
                serialize_attributes_plus(
                    &[AttrClass::Primary, AttrClass::Secondary],
                    attrs,
                    max_piece as usize,
                    &h("attributes"),
                    Some(0.0),
                )?,
            );
        }
        if let Some(script) = &self.script {
            let arg_names = extract_arg_names(
                &[self.script_args.as_deref()],
                &h("script_args"),
            )?;
            p.set(
                "script",
                serialize_script(cx, script, arg_names.as_deref(), &h("script"))?,
            );
        }
        if let Some(args) = &self.script_args {
            p.set(
                "script_args",
                serialize_script_args_plus(args, max_piece as usize, &h("script_args"), Some(0.0))?,
            );
        }
        Ok(p.into_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fp_core::Keyed for Entry {
    const CATEGORY: Category = Category::Entry;
}

fn check_piece_pair(pair: [i64; 2], max_piece: i64, path: &str) -> Result<Vec<i64>> {
    let pair = coerce_int_list(
        &[pair[0].into(), pair[1].into()],
        2,
        path,
        IntBounds::between(0, 99),
        None,
    )?;
    if pair[0] > max_piece {
        return Err(Error::range(path, "[0] must <= entry.max_piece"));
    }
    if pair[1] > pair[0] * MAX_ENTRY_PLUS {
        return Err(Error::range(path, format!("[1] must <= [0] * {MAX_ENTRY_PLUS}")));
    }
    Ok(pair)
}

/// Serialize an entry reference map with one `[piece, plus]` pair per entry.
///
/// Each pair is capped by the target entry: pieces by its `max_piece`,
/// pluses by `piece * MAX_ENTRY_PLUS`.
pub fn serialize_entry_pairs(
    cx: &Context<'_>,
    entries: &[(ResourceId, [i64; 2])],
    path: &str,
) -> Result<Value> {
    let mut map = serde_json::Map::new();
    for (id, pair) in entries {
        let item_path = format!("{path}[{id}]");
        let entry = cx.registry().get::<Entry>(id, &item_path)?;
        let pair = check_piece_pair(*pair, entry.max_piece, &item_path)?;
        map.insert(id.clone(), Value::from(pair));
    }
    Ok(Value::Object(map))
}

/// Serialize an entry reference map with one `[piece, plus]` pair per level,
/// `size` pairs per entry; `zero` is prepended when given.
pub fn serialize_entry_levels(
    cx: &Context<'_>,
    entries: &[(ResourceId, Vec<[i64; 2]>)],
    size: usize,
    path: &str,
    zero: Option<[i64; 2]>,
) -> Result<Value> {
    let mut map = serde_json::Map::new();
    for (id, pairs) in entries {
        let item_path = format!("{path}[{id}]");
        let entry = cx.registry().get::<Entry>(id, &item_path)?;
        if pairs.len() != size {
            return Err(Error::range(&item_path, format!("len() must = {size}")));
        }
        let mut out: Vec<Value> = Vec::with_capacity(size + 1);
        if let Some(zero) = zero {
            out.push(Value::from(zero.to_vec()));
        }
        for (idx, pair) in pairs.iter().enumerate() {
            let pair = check_piece_pair(*pair, entry.max_piece, &format!("{item_path}[{idx}]"))?;
            out.push(Value::from(pair));
        }
        map.insert(id.clone(), Value::Array(out));
    }
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeAssets, FakeScripts, entry};
    use fp_core::Registry;
    use serde_json::json;

    #[test]
    fn entry_payload_shape() {
        let mut reg = Registry::new();
        reg.add(entry("Entry.AttackCore", 2)).unwrap();
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(&reg, &scripts, &assets);

        let e = Entry {
            attributes: Some(vec![(
                "AttackUp".to_owned(),
                vec!["5%".into(), "10%".into()],
            )]),
            color: Some("#ff8800".to_owned()),
            ..entry("Entry.Haste", 2)
        };
        let v = e.serialize(&cx).unwrap();
        assert_eq!(v["T"], "Entry");
        assert_eq!(v["max_piece"], 2);
        assert_eq!(v["color"], "#ff8800");
        assert_eq!(
            v["attributes"],
            json!([{ "k": ["AttackUp", false], "v": [0.0, 0.05, 0.1] }])
        );
        assert!(v.get("script").is_none());
    }

    #[test]
    fn bad_color_fails() {
        let reg = Registry::new();
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(&reg, &scripts, &assets);
        let e = Entry { color: Some("#ff88".to_owned()), ..entry("Entry.Haste", 2) };
        let err = e.serialize(&cx).unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
        assert!(err.to_string().contains("<Entry.Haste>.color"));
    }

    #[test]
    fn pair_caps_follow_the_target_entry() {
        let mut reg = Registry::new();
        reg.add(entry("Entry.Haste", 3)).unwrap();
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(&reg, &scripts, &assets);

        let ok = vec![("Entry.Haste".to_owned(), [3, 9])];
        let v = serialize_entry_pairs(&cx, &ok, "e.entries").unwrap();
        assert_eq!(v, json!({ "Entry.Haste": [3, 9] }));

        let too_many_pieces = vec![("Entry.Haste".to_owned(), [4, 0])];
        assert!(serialize_entry_pairs(&cx, &too_many_pieces, "e.entries").is_err());

        let too_many_pluses = vec![("Entry.Haste".to_owned(), [3, 10])];
        assert!(serialize_entry_pairs(&cx, &too_many_pluses, "e.entries").is_err());
    }

    #[test]
    fn leveled_pairs_check_length_per_entry() {
        let mut reg = Registry::new();
        reg.add(entry("Entry.Haste", 3)).unwrap();
        let scripts = FakeScripts::default();
        let assets = FakeAssets::default();
        let cx = Context::new(&reg, &scripts, &assets);

        let entries = vec![("Entry.Haste".to_owned(), vec![[1, 0], [2, 3]])];
        let v = serialize_entry_levels(&cx, &entries, 2, "q.entries", Some([0, 0])).unwrap();
        assert_eq!(v, json!({ "Entry.Haste": [[0, 0], [1, 0], [2, 3]] }));

        assert!(serialize_entry_levels(&cx, &entries, 3, "q.entries", None).is_err());
    }
}
