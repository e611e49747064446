//! Value coercion library.
//!
//! Pure functions that turn raw authored scalars into canonical typed values
//! with bounds checks. Authored content is deliberately permissive — a time
//! may be a tick count or `"1.5m"`, a float may be `0.12` or `"12%"` — and
//! the permissive side is modeled as explicit sum types ([`RawInt`],
//! [`RawTime`], [`RawFloat`]) rather than dynamic values, so every branch is
//! statically matched.
//!
//! Every function takes the dotted path of the field being coerced and
//! reports failures through [`Error`](crate::error::Error) qualified with
//! that path. Nothing is truncated or guessed: a value either converts
//! exactly or the whole compilation fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{MAX_SYMBOL_LEN, TICK_RATE};
use crate::error::{Error, Result};

static RE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(s|m|h|ms|min)$").expect("time regex"));
static RE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?%$").expect("percent regex"));
static RE_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("symbol regex"));

// ---------------------------------------------------------------------------
// Raw authored scalars
// ---------------------------------------------------------------------------

/// An authored integer-or-boolean scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInt {
    /// A plain integer.
    Int(i64),
    /// A boolean, accepted where the field allows truthiness.
    Bool(bool),
}

impl From<i64> for RawInt {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RawInt {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for RawInt {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// An authored time: either a tick count or a suffixed duration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTime {
    /// A count of logic ticks, passed through unchanged.
    Ticks(i64),
    /// A duration string such as `"2s"`, `"1.5m"`, `"500ms"`.
    Text(String),
}

impl From<i64> for RawTime {
    fn from(v: i64) -> Self {
        Self::Ticks(v)
    }
}

impl From<i32> for RawTime {
    fn from(v: i32) -> Self {
        Self::Ticks(i64::from(v))
    }
}

impl From<&str> for RawTime {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawTime {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// An authored float: either a number or a percent string.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFloat {
    /// A plain number.
    Number(f64),
    /// A percent string such as `"12.5%"`, interpreted as value / 100.
    Text(String),
}

impl From<f64> for RawFloat {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for RawFloat {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<i32> for RawFloat {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for RawFloat {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawFloat {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Optional inclusive bounds for integer and tick values.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntBounds {
    /// Inclusive lower bound.
    pub min: Option<i64>,
    /// Inclusive upper bound.
    pub max: Option<i64>,
    /// Accept booleans as 0/1.
    pub allow_bool: bool,
}

impl IntBounds {
    /// No bounds.
    pub const NONE: Self = Self {
        min: None,
        max: None,
        allow_bool: false,
    };

    /// Inclusive lower bound only.
    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            ..Self::NONE
        }
    }

    /// Inclusive upper bound only.
    pub fn at_most(max: i64) -> Self {
        Self {
            max: Some(max),
            ..Self::NONE
        }
    }

    /// Inclusive lower and upper bounds.
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            allow_bool: false,
        }
    }

    /// Also accept booleans as 0/1.
    pub fn or_bool(mut self) -> Self {
        self.allow_bool = true;
        self
    }

    fn check(&self, value: i64, path: &str) -> Result<i64> {
        if let Some(min) = self.min
            && value < min
        {
            return Err(Error::range(path, format!("must >= {min}")));
        }
        if let Some(max) = self.max
            && value > max
        {
            return Err(Error::range(path, format!("must <= {max}")));
        }
        Ok(value)
    }
}

/// Optional inclusive bounds for float values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatBounds {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

impl FloatBounds {
    /// No bounds.
    pub const NONE: Self = Self {
        min: None,
        max: None,
    };

    /// Inclusive lower bound only.
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Inclusive lower and upper bounds.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    fn check(&self, value: f64, path: &str) -> Result<f64> {
        if let Some(min) = self.min
            && value < min
        {
            return Err(Error::range(path, format!("must >= {min}")));
        }
        if let Some(max) = self.max
            && value > max
        {
            return Err(Error::range(path, format!("must <= {max}")));
        }
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Scalar coercion
// ---------------------------------------------------------------------------

/// Coerce a bool-or-int to a boolean. Integers are truthy (non-zero).
pub fn coerce_bool(raw: impl Into<RawInt>, _path: &str) -> Result<bool> {
    match raw.into() {
        RawInt::Bool(b) => Ok(b),
        RawInt::Int(n) => Ok(n != 0),
    }
}

/// Coerce an integer, optionally accepting booleans, with inclusive bounds.
pub fn coerce_int(raw: impl Into<RawInt>, path: &str, bounds: IntBounds) -> Result<i64> {
    let value = match raw.into() {
        RawInt::Int(n) => n,
        RawInt::Bool(b) => {
            if !bounds.allow_bool {
                return Err(Error::type_mismatch(path, "an int"));
            }
            i64::from(b)
        }
    };
    bounds.check(value, path)
}

/// Coerce a time to a tick count.
///
/// Tick counts pass through unchanged; strings must match
/// `^(\d+(\.\d+)*)(s|m|h|ms|min)$` and convert as
/// `round(TICK_RATE * n * factor)`. Bounds apply to the converted ticks.
pub fn coerce_time(raw: impl Into<RawTime>, path: &str, bounds: IntBounds) -> Result<i64> {
    let ticks = match raw.into() {
        RawTime::Ticks(n) => n,
        RawTime::Text(text) => parse_time_text(&text, path)?,
    };
    bounds.check(ticks, path)
}

fn parse_time_text(text: &str, path: &str) -> Result<i64> {
    let capture = RE_TIME
        .captures(text)
        .ok_or_else(|| Error::pattern(path, "must be an int/time"))?;
    let number: f64 = capture[1]
        .parse()
        .map_err(|_| Error::pattern(path, "must be an int/time"))?;
    // h reads as 60 * 24 minutes; shipped content depends on this factor.
    let factor = match &capture[2] {
        "s" => 1.0,
        "m" | "min" => 60.0,
        "h" => 60.0 * 24.0,
        "ms" => 0.001,
        _ => return Err(Error::pattern(path, "must be an int/time")),
    };
    Ok((TICK_RATE * number * factor).round() as i64)
}

/// Coerce a float, accepting percent strings, with inclusive bounds.
pub fn coerce_float(raw: impl Into<RawFloat>, path: &str, bounds: FloatBounds) -> Result<f64> {
    let value = match raw.into() {
        RawFloat::Number(n) => n,
        RawFloat::Text(text) => {
            if !RE_PERCENT.is_match(&text) {
                return Err(Error::pattern(path, "must be an int/float/percent"));
            }
            let number: f64 = text[..text.len() - 1]
                .parse()
                .map_err(|_| Error::pattern(path, "must be an int/float/percent"))?;
            number / 100.0
        }
    };
    bounds.check(value, path)
}

/// Length and pattern constraints for string coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrRules<'a> {
    /// Minimum length in bytes.
    pub min_len: Option<usize>,
    /// Maximum length in bytes.
    pub max_len: Option<usize>,
    /// Required full-match grammar.
    pub pattern: Option<&'a Regex>,
}

impl<'a> StrRules<'a> {
    /// No constraints.
    pub const NONE: Self = Self {
        min_len: None,
        max_len: None,
        pattern: None,
    };

    /// Require the string to match `pattern`.
    pub fn matching(pattern: &'a Regex) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::NONE
        }
    }
}

/// Validate a string against length and pattern rules.
pub fn coerce_string(raw: &str, path: &str, rules: StrRules<'_>) -> Result<String> {
    if let Some(min) = rules.min_len
        && raw.len() < min
    {
        return Err(Error::range(path, format!("len() must >= {min}")));
    }
    if let Some(max) = rules.max_len
        && raw.len() > max
    {
        return Err(Error::range(path, format!("len() must <= {max}")));
    }
    if let Some(pattern) = rules.pattern
        && !pattern.is_match(raw)
    {
        return Err(Error::pattern(
            path,
            format!("must match pattern \"{pattern}\""),
        ));
    }
    Ok(raw.to_string())
}

/// Validate a symbol: 1..=[`MAX_SYMBOL_LEN`] bytes of the default word
/// grammar, or a caller-supplied grammar.
pub fn coerce_symbol(raw: &str, path: &str, pattern: Option<&Regex>) -> Result<String> {
    coerce_string(
        raw,
        path,
        StrRules {
            min_len: Some(1),
            max_len: Some(MAX_SYMBOL_LEN),
            pattern: Some(pattern.unwrap_or(&RE_SYMBOL)),
        },
    )
}

/// Constraints for file-path coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRules<'a> {
    /// Required extension, including the dot (e.g. `".ozz"`).
    pub extension: Option<&'a str>,
    /// Allow absolute paths.
    pub allow_absolute: bool,
}

/// Validate and normalize a file path.
///
/// The path must carry the required extension, must be relative unless
/// explicitly allowed absolute, and is normalized lexically with forward
/// slashes (`a\b//./c` becomes `a/b/c`).
pub fn coerce_file(raw: &str, path: &str, rules: FileRules<'_>) -> Result<String> {
    if let Some(ext) = rules.extension
        && !raw.ends_with(ext)
    {
        return Err(Error::pattern(path, format!("must have extension {ext}")));
    }
    if !rules.allow_absolute && (raw.starts_with('/') || raw.starts_with('\\')) {
        return Err(Error::pattern(path, "must be a relative path"));
    }
    Ok(normalize_path(raw))
}

fn normalize_path(raw: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), None | Some(&"..")) {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    let mut normalized = parts.join("/");
    if raw.starts_with(['/', '\\']) {
        normalized.insert(0, '/');
    }
    if normalized.is_empty() {
        normalized.push('.');
    }
    normalized
}

// ---------------------------------------------------------------------------
// Lists and ranges
// ---------------------------------------------------------------------------

fn check_len(len: usize, size: usize, path: &str) -> Result<()> {
    if len != size {
        return Err(Error::range(path, format!("len() must = {size}")));
    }
    Ok(())
}

/// Coerce an exact-length list of integers, optionally prepending `zero` as a
/// synthetic first element (used by level tables whose level 0 row is
/// implicit).
pub fn coerce_int_list(
    raw: &[RawInt],
    size: usize,
    path: &str,
    bounds: IntBounds,
    zero: Option<i64>,
) -> Result<Vec<i64>> {
    check_len(raw.len(), size, path)?;
    let mut out = Vec::with_capacity(raw.len() + usize::from(zero.is_some()));
    if let Some(z) = zero {
        out.push(z);
    }
    for (idx, item) in raw.iter().enumerate() {
        out.push(coerce_int(*item, &format!("{path}[{idx}]"), bounds)?);
    }
    Ok(out)
}

/// Coerce an exact-length list of times to tick counts.
pub fn coerce_time_list(
    raw: &[RawTime],
    size: usize,
    path: &str,
    bounds: IntBounds,
    zero: Option<i64>,
) -> Result<Vec<i64>> {
    check_len(raw.len(), size, path)?;
    let mut out = Vec::with_capacity(raw.len() + usize::from(zero.is_some()));
    if let Some(z) = zero {
        out.push(z);
    }
    for (idx, item) in raw.iter().enumerate() {
        out.push(coerce_time(item.clone(), &format!("{path}[{idx}]"), bounds)?);
    }
    Ok(out)
}

/// Coerce an exact-length list of floats.
pub fn coerce_float_list(
    raw: &[RawFloat],
    size: usize,
    path: &str,
    bounds: FloatBounds,
    zero: Option<f64>,
) -> Result<Vec<f64>> {
    check_len(raw.len(), size, path)?;
    let mut out = Vec::with_capacity(raw.len() + usize::from(zero.is_some()));
    if let Some(z) = zero {
        out.push(z);
    }
    for (idx, item) in raw.iter().enumerate() {
        out.push(coerce_float(item.clone(), &format!("{path}[{idx}]"), bounds)?);
    }
    Ok(out)
}

/// Coerce a `[min, max]` integer pair. Equal endpoints are allowed.
pub fn coerce_int_range(raw: &[RawInt], path: &str, bounds: IntBounds) -> Result<(i64, i64)> {
    let pair = coerce_int_list(raw, 2, path, bounds, None)?;
    if pair[0] > pair[1] {
        return Err(Error::range(path, "range[0] must <= range[1]"));
    }
    Ok((pair[0], pair[1]))
}

/// Coerce a `[min, max]` time pair to ticks. Equal endpoints are allowed.
pub fn coerce_time_range(raw: &[RawTime], path: &str, bounds: IntBounds) -> Result<(i64, i64)> {
    let pair = coerce_time_list(raw, 2, path, bounds, None)?;
    if pair[0] > pair[1] {
        return Err(Error::range(path, "range[0] must <= range[1]"));
    }
    Ok((pair[0], pair[1]))
}

/// Coerce a `[min, max]` float pair.
///
/// Unlike the int and time ranges, equal endpoints are rejected: float ranges
/// describe continuous spans and a zero-width span has always been refused
/// here. Tests pin the asymmetry.
pub fn coerce_float_range(raw: &[RawFloat], path: &str, bounds: FloatBounds) -> Result<(f64, f64)> {
    let pair = coerce_float_list(raw, 2, path, bounds, None)?;
    if pair[0] >= pair[1] {
        return Err(Error::range(path, "range[0] must < range[1]"));
    }
    Ok((pair[0], pair[1]))
}
