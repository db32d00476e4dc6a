//! Control point types shared by the curve evaluator, camera and meshes.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Coordinate-wise arithmetic needed to interpolate between control points.
///
/// Implemented for [`Point2`] and [`Point3`] so the same De Casteljau and
/// Bernstein code serves planar and spatial curves.
pub trait ControlPoint:
    Copy
    + std::fmt::Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
{
    /// Number of coordinates written per point into flat buffers.
    const DIM: usize;
    const ZERO: Self;

    /// Appends this point's coordinates to a vertex buffer.
    fn push_coords(&self, out: &mut Vec<f32>);

    fn is_finite(&self) -> bool;

    /// Linear interpolation, `self + (other - self) * t`.
    ///
    /// Evaluated as `self * (1 - t) + other * t` so that `t == 0` and
    /// `t == 1` reproduce the end points bit-for-bit.
    #[inline]
    fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` when the length is below
    /// `min_length` (normalising would amplify rounding noise into garbage).
    pub fn try_normalize(self, min_length: f64) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > min_length {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

impl Add for Point2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl Neg for Point2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Add for Point3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Point3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl ControlPoint for Point2 {
    const DIM: usize = 2;
    const ZERO: Self = Self::new(0.0, 0.0);

    fn push_coords(&self, out: &mut Vec<f32>) {
        out.push(self.x as f32);
        out.push(self.y as f32);
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl ControlPoint for Point3 {
    const DIM: usize = 3;
    const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    fn push_coords(&self, out: &mut Vec<f32>) {
        out.push(self.x as f32);
        out.push(self.y as f32);
        out.push(self.z as f32);
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Deserialize)]
struct LoosePoint {
    x: f64,
    y: f64,
    z: Option<f64>,
}

/// Control points whose dimension is read from the data: a list where every
/// object has `z` is spatial, one where none does is planar. Mixed lists are
/// rejected rather than silently dropping `z`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<LoosePoint>")]
pub enum PointList {
    Spatial(Vec<Point3>),
    Planar(Vec<Point2>),
}

impl TryFrom<Vec<LoosePoint>> for PointList {
    type Error = GeometryError;

    fn try_from(raw: Vec<LoosePoint>) -> Result<Self, GeometryError> {
        let spatial: Vec<Point3> = raw
            .iter()
            .filter_map(|p| p.z.map(|z| Point3::new(p.x, p.y, z)))
            .collect();
        if spatial.is_empty() {
            Ok(Self::Planar(raw.iter().map(|p| Point2::new(p.x, p.y)).collect()))
        } else if spatial.len() == raw.len() {
            Ok(Self::Spatial(spatial))
        } else {
            Err(GeometryError::MixedDimensions {
                spatial: spatial.len(),
                total: raw.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point2::new(-1.0, 2.0);
        let b = Point2::new(3.0, -2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point2::new(1.0, 0.0));
    }

    #[test]
    fn lerp_extrapolates() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(a.lerp(b, 2.0), Point3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Point3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn normalize_rejects_short_vectors() {
        assert!(Point3::new(1e-12, 0.0, 0.0).try_normalize(1e-9).is_none());
        let n = Point3::new(3.0, 0.0, 4.0).try_normalize(1e-9).unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn push_coords_writes_dim_values() {
        let mut buf = Vec::new();
        Point2::new(1.0, 2.0).push_coords(&mut buf);
        Point3::new(3.0, 4.0, 5.0).push_coords(&mut buf);
        assert_eq!(buf, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn point_list_dimension_follows_data() {
        let planar: PointList = serde_json::from_str(r#"[{"x": 1, "y": 2}, {"x": 3, "y": 4}]"#).unwrap();
        assert_eq!(planar, PointList::Planar(vec![Point2::new(1.0, 2.0), Point2::new(3.0, 4.0)]));

        let spatial: PointList = serde_json::from_str(r#"[{"x": 1, "y": 2, "z": 3}]"#).unwrap();
        assert_eq!(spatial, PointList::Spatial(vec![Point3::new(1.0, 2.0, 3.0)]));

        let empty: PointList = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, PointList::Planar(Vec::new()));
    }

    #[test]
    fn mixed_point_list_is_rejected() {
        let err = serde_json::from_str::<PointList>(r#"[{"x": 0, "y": 0, "z": 1}, {"x": 1, "y": 1}]"#).unwrap_err();
        assert!(err.to_string().contains("1 of 2"), "{}", err);
    }
}
