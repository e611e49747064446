//! Resource registry and reference resolution.
//!
//! The [`Registry`] owns every declared resource behind the [`Resource`]
//! trait, keyed by id in insertion order. That order is the single source of
//! truth for output ordering: the compile pass walks it front to back, so a
//! resource may freely reference one declared later.
//!
//! References between resources stay plain id strings until the compile
//! pass; the `resolve_*` family checks grammar, presence, and category at
//! serialization time and returns the id unchanged on success.

use std::any::Any;

use indexmap::IndexMap;

use crate::coerce::{FloatBounds, RawFloat, coerce_float};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::id::{Category, ResourceId, validate_id};

/// A declared resource that can serialize itself into a container payload.
pub trait Resource: Any {
    /// Full resource id, including the category prefix.
    fn id(&self) -> &str;

    /// Category this resource belongs to.
    fn category(&self) -> Category;

    /// Whether the container should mark this payload for session caching.
    fn cache(&self) -> bool {
        false
    }

    /// Validate the authored fields and produce the payload object.
    fn serialize(&self, cx: &Context<'_>) -> Result<serde_json::Value>;

    /// Upcast for typed lookups.
    fn as_any(&self) -> &dyn Any;
}

/// Statically ties a resource type to its category, enabling the typed
/// lookups ([`Registry::get`], [`Registry::find`], [`Registry::find_all`]).
pub trait Keyed: Resource + Sized {
    /// The one category every value of this type belongs to.
    const CATEGORY: Category;
}

/// Insertion-ordered store of all declared resources.
#[derive(Default)]
pub struct Registry {
    resources: IndexMap<String, Box<dyn Resource>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Declare a resource.
    ///
    /// Fails on a malformed id, a wrong category prefix, or a duplicate id.
    pub fn add<R: Resource>(&mut self, resource: R) -> Result<()> {
        let id = resource.id().to_owned();
        let path = format!("<{id}>.id");
        validate_id(&id, resource.category(), &path)?;
        if self.resources.contains_key(&id) {
            return Err(Error::duplicate(&path, "id already declared"));
        }
        self.resources.insert(id, Box::new(resource));
        Ok(())
    }

    /// Number of declared resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Walk every resource in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.values().map(|r| &**r)
    }

    /// Look up a resource by id, checking grammar and category prefix.
    pub fn get_by(&self, category: Category, id: &str, path: &str) -> Result<&dyn Resource> {
        validate_id(id, category, path)?;
        match self.resources.get(id) {
            Some(r) => Ok(&**r),
            None => Err(Error::reference(path, format!("{id} is not declared"))),
        }
    }

    /// Look up a resource by id with a concrete type.
    pub fn get<T: Keyed>(&self, id: &str, path: &str) -> Result<&T> {
        let res = self.get_by(T::CATEGORY, id, path)?;
        res.as_any().downcast_ref::<T>().ok_or_else(|| {
            Error::reference(path, format!("{id} is not a {}", T::CATEGORY.as_str()))
        })
    }

    /// Look up without error reporting; `None` for absent or wrong type.
    pub fn find<T: Keyed>(&self, id: &str) -> Option<&T> {
        self.resources.get(id)?.as_any().downcast_ref::<T>()
    }

    /// All resources of a type matching a predicate, in declaration order.
    pub fn find_all<T: Keyed>(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<&T> {
        self.resources
            .values()
            .filter_map(|r| r.as_any().downcast_ref::<T>())
            .filter(|r| pred(r))
            .collect()
    }

    /// Resolve a single reference: grammar, category prefix, presence.
    ///
    /// Returns the id unchanged, ready to embed in a payload.
    pub fn resolve(&self, id: &str, category: Category, path: &str) -> Result<String> {
        self.get_by(category, id, path)?;
        Ok(id.to_owned())
    }

    /// Resolve a reference to a typed resource and require the target to
    /// reference back, e.g. a style must list the character that names it.
    pub fn resolve_where<T: Keyed>(
        &self,
        id: &str,
        path: &str,
        back_ref: impl FnOnce(&T) -> bool,
    ) -> Result<String> {
        let target = self.get::<T>(id, path)?;
        if !back_ref(target) {
            return Err(Error::reference(
                path,
                format!("{id} does not reference back"),
            ));
        }
        Ok(id.to_owned())
    }

    /// Resolve a list of references, rejecting duplicates within the list.
    pub fn resolve_ids(
        &self,
        ids: &[ResourceId],
        category: Category,
        path: &str,
    ) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            let resolved = self.resolve(id, category, &item_path)?;
            if out.contains(&resolved) {
                return Err(Error::duplicate(&item_path, format!("{id} listed twice")));
            }
            out.push(resolved);
        }
        Ok(out)
    }

    /// Typed, back-referenced variant of [`Registry::resolve_ids`].
    pub fn resolve_ids_where<T: Keyed>(
        &self,
        ids: &[ResourceId],
        path: &str,
        mut back_ref: impl FnMut(&T) -> bool,
    ) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            let resolved = self.resolve_where::<T>(id, &item_path, &mut back_ref)?;
            if out.contains(&resolved) {
                return Err(Error::duplicate(&item_path, format!("{id} listed twice")));
            }
            out.push(resolved);
        }
        Ok(out)
    }

    /// Resolve an id-to-weight table: every id must resolve, every weight
    /// must coerce within `bounds`, and ids must be unique.
    pub fn resolve_weighted(
        &self,
        pairs: &[(ResourceId, RawFloat)],
        category: Category,
        path: &str,
        bounds: FloatBounds,
    ) -> Result<Vec<(String, f64)>> {
        let mut out: Vec<(String, f64)> = Vec::with_capacity(pairs.len());
        for (i, (id, raw)) in pairs.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            let resolved = self.resolve(id, category, &item_path)?;
            if out.iter().any(|(seen, _)| *seen == resolved) {
                return Err(Error::duplicate(&item_path, format!("{id} listed twice")));
            }
            let weight = coerce_float(raw.clone(), &item_path, bounds)?;
            out.push((resolved, weight));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        id: String,
        tagged: bool,
    }

    impl Resource for Probe {
        fn id(&self) -> &str {
            &self.id
        }

        fn category(&self) -> Category {
            Category::Buff
        }

        fn serialize(&self, _cx: &Context<'_>) -> Result<serde_json::Value> {
            Ok(serde_json::json!({ "T": "Buff", "id": self.id }))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Keyed for Probe {
        const CATEGORY: Category = Category::Buff;
    }

    fn probe(id: &str) -> Probe {
        Probe { id: id.to_owned(), tagged: false }
    }

    fn seeded() -> Registry {
        let mut reg = Registry::new();
        reg.add(probe("Buff.Haste")).unwrap();
        reg.add(Probe { id: "Buff.Slow".to_owned(), tagged: true }).unwrap();
        reg
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut reg = seeded();
        let err = reg.add(probe("Buff.Haste")).unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
    }

    #[test]
    fn add_rejects_wrong_prefix() {
        let mut reg = Registry::new();
        let err = reg
            .add(Probe { id: "Jewel.Haste".to_owned(), tagged: false })
            .unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let reg = seeded();
        let ids: Vec<_> = reg.iter().map(Resource::id).collect();
        assert_eq!(ids, ["Buff.Haste", "Buff.Slow"]);
    }

    #[test]
    fn typed_get_and_find() {
        let reg = seeded();
        assert!(reg.get::<Probe>("Buff.Haste", "p").is_ok());
        assert!(reg.find::<Probe>("Buff.Missing").is_none());
        let tagged = reg.find_all::<Probe>(|p| p.tagged);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id, "Buff.Slow");
    }

    #[test]
    fn resolve_reports_missing_target() {
        let reg = seeded();
        let err = reg
            .resolve("Buff.Missing", Category::Buff, "f.buff")
            .unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
        assert!(err.to_string().contains("f.buff"));
    }

    #[test]
    fn resolve_where_checks_back_reference() {
        let reg = seeded();
        let err = reg
            .resolve_where::<Probe>("Buff.Haste", "f.buff", |p| p.tagged)
            .unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
        assert!(
            reg.resolve_where::<Probe>("Buff.Slow", "f.buff", |p| p.tagged)
                .is_ok()
        );
    }

    #[test]
    fn resolve_ids_rejects_duplicates_in_list() {
        let reg = seeded();
        let ids = ["Buff.Haste".to_owned(), "Buff.Haste".to_owned()];
        let err = reg.resolve_ids(&ids, Category::Buff, "f.buffs").unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
        assert!(err.to_string().contains("f.buffs[1]"));
    }

    #[test]
    fn resolve_weighted_coerces_and_bounds_weights() {
        let reg = seeded();
        let pairs = [
            ("Buff.Haste".to_owned(), RawFloat::from("30%")),
            ("Buff.Slow".to_owned(), RawFloat::from(0.7)),
        ];
        let out = reg
            .resolve_weighted(&pairs, Category::Buff, "f.w", FloatBounds::between(0.0, 1.0))
            .unwrap();
        assert_eq!(out[0], ("Buff.Haste".to_owned(), 0.3));
        assert_eq!(out[1], ("Buff.Slow".to_owned(), 0.7));

        let bad = [("Buff.Haste".to_owned(), RawFloat::from(2.0))];
        let err = reg
            .resolve_weighted(&bad, Category::Buff, "f.w", FloatBounds::between(0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::RangeViolation { .. }));
    }
}
