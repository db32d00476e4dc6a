//! 4x4 homogeneous transforms in WebGL's column-major layout.
//!
//! Element (column `c`, row `r`) lives at index `c * 4 + r`, so
//! [`Matrix4::to_f32_array`] can be handed straight to `uniformMatrix4fv`
//! with `transpose = false`.
//!
//! Angles are radians everywhere in this module. Rotations are right-handed:
//! [`rotation_z`] by `π/2` takes the +X axis onto +Y.

use crate::error::{GeometryError, Result};
use crate::point::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

/// Shortest `eye - target` or `up × forward` accepted by [`look_at`].
pub const MIN_BASIS_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(pub [f64; 16]);

impl Matrix4 {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Builds a matrix from 16 column-major values.
    pub fn from_cols_slice(values: &[f64]) -> Option<Self> {
        let cols: [f64; 16] = values.try_into().ok()?;
        Some(Self(cols))
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.0[col * 4 + row]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Single-precision copy for GPU upload.
    pub fn to_f32_array(&self) -> [f32; 16] {
        self.0.map(|v| v as f32)
    }

    /// Overwrites the translation column (indices 12, 13, 14) and leaves the
    /// rotation/scale block untouched.
    pub fn translate_in_place(&mut self, tx: f64, ty: f64, tz: f64) {
        self.0[12] = tx;
        self.0[13] = ty;
        self.0[14] = tz;
    }

    pub fn transpose(&self) -> Self {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[row * 4 + col] = self.0[col * 4 + row];
            }
        }
        Self(out)
    }

    /// Inverse of a rotation + translation matrix: `[Rᵀ | -Rᵀ t]`.
    ///
    /// Only valid when the upper 3x3 block is orthonormal (view matrices,
    /// camera world matrices). Scale or shear gives a wrong result.
    pub fn rigid_inverse(&self) -> Self {
        let m = &self.0;
        let (r00, r01, r02) = (m[0], m[4], m[8]);
        let (r10, r11, r12) = (m[1], m[5], m[9]);
        let (r20, r21, r22) = (m[2], m[6], m[10]);
        let (tx, ty, tz) = (m[12], m[13], m[14]);

        let itx = -(r00 * tx + r10 * ty + r20 * tz);
        let ity = -(r01 * tx + r11 * ty + r21 * tz);
        let itz = -(r02 * tx + r12 * ty + r22 * tz);

        Self([
            r00, r01, r02, 0.0, //
            r10, r11, r12, 0.0, //
            r20, r21, r22, 0.0, //
            itx, ity, itz, 1.0,
        ])
    }

    /// `M · v` for a homogeneous column vector.
    pub fn transform_vec4(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|k| self.0[k * 4 + row] * v[k]).sum();
        }
        out
    }

    /// Transforms a point with `w = 1` and returns the raw clip-space result.
    pub fn transform_point(&self, p: Point3) -> [f64; 4] {
        self.transform_vec4([p.x, p.y, p.z, 1.0])
    }

    /// Transforms a point and performs the perspective divide.
    pub fn project_point(&self, p: Point3) -> Result<Point3> {
        let [x, y, z, w] = self.transform_point(p);
        if w == 0.0 {
            return Err(GeometryError::PointAtInfinity);
        }
        Ok(Point3::new(x / w, y / w, z / w))
    }

    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        multiply(&self, &rhs)
    }
}

/// Four rows, tab separated, three decimals; near-zero noise prints as 0.
impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..4 {
                let mut v = self.get(col, row);
                if v.abs() < 1e-5 {
                    v = 0.0;
                }
                if col > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{:.3}", v)?;
            }
        }
        Ok(())
    }
}

pub fn identity() -> Matrix4 {
    Matrix4::IDENTITY
}

pub fn translation(tx: f64, ty: f64, tz: f64) -> Matrix4 {
    let mut m = Matrix4::IDENTITY;
    m.translate_in_place(tx, ty, tz);
    m
}

pub fn scaling(sx: f64, sy: f64, sz: f64) -> Matrix4 {
    let mut m = Matrix4::IDENTITY;
    m.0[0] = sx;
    m.0[5] = sy;
    m.0[10] = sz;
    m
}

pub fn rotation_x(angle: f64) -> Matrix4 {
    let (s, c) = angle.sin_cos();
    Matrix4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, s, 0.0, //
        0.0, -s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

pub fn rotation_y(angle: f64) -> Matrix4 {
    let (s, c) = angle.sin_cos();
    Matrix4([
        c, 0.0, -s, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        s, 0.0, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

pub fn rotation_z(angle: f64) -> Matrix4 {
    let (s, c) = angle.sin_cos();
    Matrix4([
        c, s, 0.0, 0.0, //
        -s, c, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// `a · b` with `out[c*4+r] = Σ_k a[k*4+r] * b[c*4+k]`.
pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = a.0[row] * b.0[col * 4]
                + a.0[4 + row] * b.0[col * 4 + 1]
                + a.0[8 + row] * b.0[col * 4 + 2]
                + a.0[12 + row] * b.0[col * 4 + 3];
        }
    }
    Matrix4(out)
}

fn ensure_finite(values: &[f64], what: &'static str) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::DegenerateProjection(what))
    }
}

fn ensure_extent(lo: f64, hi: f64, what: &'static str) -> Result<()> {
    if lo == hi {
        Err(GeometryError::DegenerateProjection(what))
    } else {
        Ok(())
    }
}

/// OpenGL `glFrustum`: the last row is `(0, 0, -1, 0)` so clip `w = -z`.
pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Result<Matrix4> {
    ensure_finite(&[left, right, bottom, top, near, far], "non-finite frustum bounds")?;
    ensure_extent(left, right, "left == right")?;
    ensure_extent(bottom, top, "bottom == top")?;
    ensure_extent(near, far, "near == far")?;

    let rl = 1.0 / (right - left);
    let tb = 1.0 / (top - bottom);
    let fn_ = 1.0 / (far - near);

    Ok(Matrix4([
        2.0 * near * rl, 0.0, 0.0, 0.0, //
        0.0, 2.0 * near * tb, 0.0, 0.0, //
        (right + left) * rl, (top + bottom) * tb, -(far + near) * fn_, -1.0, //
        0.0, 0.0, -2.0 * far * near * fn_, 0.0,
    ]))
}

/// Symmetric perspective projection; near maps to NDC z = -1, far to +1.
pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Result<Matrix4> {
    ensure_finite(&[fov_y, aspect, near, far], "non-finite perspective parameters")?;
    if fov_y <= 0.0 || fov_y >= std::f64::consts::PI {
        return Err(GeometryError::DegenerateProjection("field of view outside (0, π)"));
    }
    if aspect == 0.0 {
        return Err(GeometryError::DegenerateProjection("aspect ratio is zero"));
    }
    ensure_extent(near, far, "near == far")?;

    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    Ok(Matrix4([
        f / aspect, 0.0, 0.0, 0.0, //
        0.0, f, 0.0, 0.0, //
        0.0, 0.0, (far + near) * nf, -1.0, //
        0.0, 0.0, 2.0 * far * near * nf, 0.0,
    ]))
}

pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Result<Matrix4> {
    ensure_finite(&[left, right, bottom, top, near, far], "non-finite orthographic bounds")?;
    ensure_extent(left, right, "left == right")?;
    ensure_extent(bottom, top, "bottom == top")?;
    ensure_extent(near, far, "near == far")?;

    let rl = right - left;
    let tb = top - bottom;
    let fn_ = far - near;

    Ok(Matrix4([
        2.0 / rl, 0.0, 0.0, 0.0, //
        0.0, 2.0 / tb, 0.0, 0.0, //
        0.0, 0.0, -2.0 / fn_, 0.0, //
        -(right + left) / rl, -(top + bottom) / tb, -(far + near) / fn_, 1.0,
    ]))
}

/// Right-handed view matrix mapping world space into camera space.
///
/// Fails instead of normalising a near-zero vector when `eye == target` or
/// `up` is parallel to the viewing direction.
pub fn look_at(eye: Point3, target: Point3, up: Point3) -> Result<Matrix4> {
    let forward = (eye - target)
        .try_normalize(MIN_BASIS_LENGTH)
        .ok_or(GeometryError::DegenerateBasis("eye coincides with target"))?;
    let right = up
        .cross(forward)
        .try_normalize(MIN_BASIS_LENGTH)
        .ok_or(GeometryError::DegenerateBasis("up vector parallel to view direction"))?;
    let true_up = forward.cross(right);

    Ok(Matrix4([
        right.x, true_up.x, forward.x, 0.0, //
        right.y, true_up.y, forward.y, 0.0, //
        right.z, true_up.z, forward.z, 0.0, //
        -right.dot(eye), -true_up.dot(eye), -forward.dot(eye), 1.0,
    ]))
}

/// Order in which translation, rotation and scale are composed into a model
/// matrix. `Trs` means `T · R · S` (scale applied first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransformOrder {
    #[default]
    Trs,
    Tsr,
    Rts,
    Rst,
    Str,
    Srt,
}

impl FromStr for TransformOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRS" => Ok(Self::Trs),
            "TSR" => Ok(Self::Tsr),
            "RTS" => Ok(Self::Rts),
            "RST" => Ok(Self::Rst),
            "STR" => Ok(Self::Str),
            "SRT" => Ok(Self::Srt),
            other => Err(format!("unknown transform order '{}'", other)),
        }
    }
}

/// Translation, Euler rotation (radians) and scale of a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    pub translation: Point3,
    pub rotation: Point3,
    pub scale: Point3,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            translation: Point3::new(0.0, 0.0, 0.0),
            rotation: Point3::new(0.0, 0.0, 0.0),
            scale: Point3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Model matrix from `params`; the rotation block is `Rz · Ry · Rx`.
pub fn compose(params: &TransformParams, order: TransformOrder) -> Matrix4 {
    let t = translation(params.translation.x, params.translation.y, params.translation.z);
    let r = rotation_z(params.rotation.z) * rotation_y(params.rotation.y) * rotation_x(params.rotation.x);
    let s = scaling(params.scale.x, params.scale.y, params.scale.z);

    match order {
        TransformOrder::Trs => t * (r * s),
        TransformOrder::Tsr => t * (s * r),
        TransformOrder::Rts => r * (t * s),
        TransformOrder::Rst => r * (s * t),
        TransformOrder::Str => s * (t * r),
        TransformOrder::Srt => s * (r * t),
    }
}
