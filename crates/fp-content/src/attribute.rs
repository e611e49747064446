//! Attribute vocabulary and the attribute-map serializers.
//!
//! Attributes come in three classes. Primary attributes are the flat combat
//! stats a character sheet shows. Secondary attributes are additive
//! up/down modifiers. Final attributes are multiplicative ratios applied
//! after everything else. Schemas pick which classes a field accepts.

use fp_core::coerce::{FloatBounds, RawFloat, coerce_float, coerce_float_list};
use fp_core::error::{Error, Result};
use fp_core::plus::{merge_plus, records_value};
use serde_json::Value;

/// Flat combat stats.
pub const PRIMARY: &[&str] = &[
    "MaxHealth",
    "HealthCureRatio",
    "MaxPosture",
    "PostureRecovery",
    "PhysicalAttack",
    "ElementalAttack",
    "ArcaneAttack",
    "PhysicalDefense",
    "ElementalDefense",
    "ArcaneDefense",
];

/// Additive modifiers over the primary stats.
pub const SECONDARY: &[&str] = &[
    "MaxHealthUp",
    "MaxPostureUp",
    "PostureRecoveryUp",
    "AttackUp",
    "AttackDown",
    "PhysicalAttackUp",
    "PhysicalAttackDown",
    "ElementalAttackUp",
    "ElementalAttackDown",
    "ArcaneAttackUp",
    "ArcaneAttackDown",
    "DefenseUp",
    "DefenseDown",
    "PhysicalDefenseUp",
    "PhysicalDefenseDown",
    "CutDefenseUp",
    "CutDefenseDown",
    "BluntDefenseUp",
    "BluntDefenseDown",
    "AmmoDefenseUp",
    "AmmoDefenseDown",
    "ElementalDefenseUp",
    "ElementalDefenseDown",
    "FireDefenseUp",
    "FireDefenseDown",
    "IceDefenseUp",
    "IceDefenseDown",
    "ThunderDefenseUp",
    "ThunderDefenseDown",
    "ArcaneDefenseUp",
    "ArcaneDefenseDown",
    "CriticalChance",
    "CriticalDamage",
    "DamageUp",
    "DamageDown",
    "PhysicalDamageUp",
    "PhysicalDamageDown",
    "CutDamageUp",
    "CutDamageDown",
    "BluntDamageUp",
    "BluntDamageDown",
    "AmmoDamageUp",
    "AmmoDamageDown",
    "ElementalDamageUp",
    "ElementalDamageDown",
    "FireDamageUp",
    "FireDamageDown",
    "IceDamageUp",
    "IceDamageDown",
    "ThunderDamageUp",
    "ThunderDamageDown",
    "ArcaneDamageUp",
    "ArcaneDamageDown",
    "NormalDamageUp",
    "NormalDamageDown",
    "SkillDamageUp",
    "SkillDamageDown",
    "BurstDamageUp",
    "BurstDamageDown",
    "MeleeDamageUp",
    "MeleeDamageDown",
    "RangedDamageUp",
    "RangedDamageDown",
    "DepostureUp",
    "DepostureDown",
    "PhysicalDepostureUp",
    "PhysicalDepostureDown",
    "ElementalDepostureUp",
    "ElementalDepostureDown",
    "ArcaneDepostureUp",
    "ArcaneDepostureDown",
    "MeleeDepostureUp",
    "MeleeDepostureDown",
    "RangedDepostureUp",
    "RangedDepostureDown",
    "PerfectDodgeTime",
    "PerfectGuardTime",
];

/// Multiplicative ratios applied after primary/secondary resolution.
pub const FINAL: &[&str] = &[
    "FinalMaxHealthRatio",
    "FinalMaxPostureRatio",
    "FinalPostureRecoveryRatio",
    "FinalDamageRatio",
    "FinalPhysicalDamageRatio",
    "FinalCutDamageRatio",
    "FinalBluntDamageRatio",
    "FinalAmmoDamageRatio",
    "FinalElementalDamageRatio",
    "FinalFireDamageRatio",
    "FinalIceDamageRatio",
    "FinalThunderDamageRatio",
    "FinalArcaneDamageRatio",
    "FinalNormalDamageRatio",
    "FinalSkillDamageRatio",
    "FinalBurstDamageRatio",
    "FinalMeleeDamageRatio",
    "FinalRangedDamageRatio",
    "FinalDepostureRatio",
    "FinalPhysicalDepostureRatio",
    "FinalElementalDepostureRatio",
    "FinalArcaneDepostureRatio",
    "FinalNormalDepostureRatio",
    "FinalSkillDepostureRatio",
    "FinalBurstDepostureRatio",
    "FinalMeleeDepostureRatio",
    "FinalRangedDepostureRatio",
];

/// Which attribute class a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrClass {
    /// A [`PRIMARY`] stat.
    Primary,
    /// A [`SECONDARY`] modifier.
    Secondary,
    /// A [`FINAL`] ratio.
    Final,
}

/// Classify an attribute name, `None` for unknown names.
pub fn classify(name: &str) -> Option<AttrClass> {
    if PRIMARY.contains(&name) {
        Some(AttrClass::Primary)
    } else if SECONDARY.contains(&name) {
        Some(AttrClass::Secondary)
    } else if FINAL.contains(&name) {
        Some(AttrClass::Final)
    } else {
        None
    }
}

fn supported(allowed: &[AttrClass]) -> impl Fn(&str) -> bool + '_ {
    move |name| classify(name).is_some_and(|c| allowed.contains(&c))
}

/// Serialize a per-level attribute map: every value list must hold `size`
/// floats, `zero` is prepended when given.
pub fn serialize_attributes(
    allowed: &[AttrClass],
    attrs: &[(String, Vec<RawFloat>)],
    size: usize,
    path: &str,
    zero: Option<f64>,
) -> Result<Value> {
    let ok = supported(allowed);
    let mut map = serde_json::Map::new();
    for (name, vals) in attrs {
        let item_path = format!("{path}[{name}]");
        if !ok(name) {
            return Err(Error::pattern(&item_path, "attribute not supported"));
        }
        let vals = coerce_float_list(vals, size, &item_path, FloatBounds::NONE, zero)?;
        map.insert(name.clone(), Value::from(vals));
    }
    Ok(Value::Object(map))
}

/// Serialize a scalar attribute map (one float per attribute).
pub fn serialize_attribute_values(
    allowed: &[AttrClass],
    attrs: &[(String, RawFloat)],
    path: &str,
) -> Result<Value> {
    let ok = supported(allowed);
    let mut map = serde_json::Map::new();
    for (name, val) in attrs {
        let item_path = format!("{path}[{name}]");
        if !ok(name) {
            return Err(Error::pattern(&item_path, "attribute not supported"));
        }
        let val = coerce_float(val.clone(), &item_path, FloatBounds::NONE)?;
        map.insert(name.clone(), Value::from(val));
    }
    Ok(Value::Object(map))
}

/// Serialize a per-level attribute map whose keys may carry a plus channel
/// (`"AttackUp+"`), producing ordered channel records.
pub fn serialize_attributes_plus(
    allowed: &[AttrClass],
    attrs: &[(String, Vec<RawFloat>)],
    size: usize,
    path: &str,
    zero: Option<f64>,
) -> Result<Value> {
    let records = merge_plus(attrs, path, supported(allowed), |vals, item_path| {
        let vals = coerce_float_list(vals, size, item_path, FloatBounds::NONE, zero)?;
        Ok(Value::from(vals))
    })?;
    Ok(records_value(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_covers_the_three_classes() {
        assert_eq!(classify("MaxHealth"), Some(AttrClass::Primary));
        assert_eq!(classify("AttackUp"), Some(AttrClass::Secondary));
        assert_eq!(classify("FinalDamageRatio"), Some(AttrClass::Final));
        assert_eq!(classify("ManaUp"), None);
    }

    #[test]
    fn leveled_map_serializes_with_zero_prepend() {
        let attrs = vec![(
            "MaxHealth".to_owned(),
            vec![RawFloat::from(100.0), RawFloat::from(200.0)],
        )];
        let v = serialize_attributes(
            &[AttrClass::Primary],
            &attrs,
            2,
            "s.attributes",
            Some(0.0),
        )
        .unwrap();
        assert_eq!(v, json!({ "MaxHealth": [0.0, 100.0, 200.0] }));
    }

    #[test]
    fn class_restriction_is_enforced() {
        let attrs = vec![("FinalDamageRatio".to_owned(), RawFloat::from(1.5))];
        let err =
            serialize_attribute_values(&[AttrClass::Primary, AttrClass::Secondary], &attrs, "p")
                .unwrap_err();
        assert!(matches!(err, Error::PatternViolation { .. }));
        assert!(err.to_string().contains("p[FinalDamageRatio]"));
    }

    #[test]
    fn plus_channels_merge_into_records() {
        let attrs = vec![
            ("AttackUp".to_owned(), vec![RawFloat::from("10%")]),
            ("AttackUp+".to_owned(), vec![RawFloat::from("5%")]),
        ];
        let v = serialize_attributes_plus(&[AttrClass::Secondary], &attrs, 1, "e.attrs", None)
            .unwrap();
        assert_eq!(
            v,
            json!([
                { "k": ["AttackUp", false], "v": [0.1] },
                { "k": ["AttackUp", true], "v": [0.05] },
            ])
        );
    }
}
