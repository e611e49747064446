//! Collision shapes embedded in resource payloads.

use fp_core::coerce::{FloatBounds, RawFloat, coerce_float};
use fp_core::error::Result;
use serde_json::{Value, json};

/// Axis-aligned box given by half extents.
#[derive(Debug, Clone)]
pub struct BoxShape {
    /// Half extent along x.
    pub half_x: RawFloat,
    /// Half extent along y.
    pub half_y: RawFloat,
    /// Half extent along z.
    pub half_z: RawFloat,
}

impl BoxShape {
    /// Coerce to the payload object; all extents must be non-negative.
    pub fn serialize(&self, path: &str) -> Result<Value> {
        Ok(json!({
            "half_x": coerce_float(self.half_x.clone(), &format!("{path}.half_x"), FloatBounds::at_least(0.0))?,
            "half_y": coerce_float(self.half_y.clone(), &format!("{path}.half_y"), FloatBounds::at_least(0.0))?,
            "half_z": coerce_float(self.half_z.clone(), &format!("{path}.half_z"), FloatBounds::at_least(0.0))?,
        }))
    }
}

/// Sphere given by its radius.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Sphere radius.
    pub radius: RawFloat,
}

impl Sphere {
    /// Coerce to the payload object; the radius must be non-negative.
    pub fn serialize(&self, path: &str) -> Result<Value> {
        Ok(json!({
            "radius": coerce_float(self.radius.clone(), &format!("{path}.radius"), FloatBounds::at_least(0.0))?,
        }))
    }
}

/// Vertical capsule given by half height and radius.
#[derive(Debug, Clone)]
pub struct Capsule {
    /// Half height of the cylinder section.
    pub half_height: RawFloat,
    /// Capsule radius.
    pub radius: RawFloat,
}

impl Capsule {
    /// Coerce to the payload object; both measures must be non-negative.
    pub fn serialize(&self, path: &str) -> Result<Value> {
        Ok(json!({
            "half_height": coerce_float(self.half_height.clone(), &format!("{path}.half_height"), FloatBounds::at_least(0.0))?,
            "radius": coerce_float(self.radius.clone(), &format!("{path}.radius"), FloatBounds::at_least(0.0))?,
        }))
    }
}
