//! Bézier curve evaluation, tessellation and tangents.
//!
//! Two evaluators are provided and must agree to rounding error:
//!
//! - [`de_casteljau`] repeatedly interpolates between neighbouring points and
//!   keeps every intermediate stage, which is what the construction overlay
//!   and [`tangent`] draw from.
//! - [`bernstein_evaluate`] sums the binomial-weighted basis directly.
//!
//! A degree-`n` curve has `n + 1` control points. The parameter `t` is not
//! clamped; values outside `[0, 1]` extrapolate.

use crate::error::{GeometryError, Result};
use crate::point::{ControlPoint, Point3};
use crate::transform::Matrix4;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One level of the De Casteljau reduction.
pub type CurveStage<P> = Vec<P>;

/// Evaluator used by [`tessellate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "casteljau")]
    DeCasteljau,
    #[serde(rename = "bernstein")]
    Bernstein,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "casteljau" | "decasteljau" | "de_casteljau" => Ok(Self::DeCasteljau),
            "bernstein" => Ok(Self::Bernstein),
            other => Err(format!("unknown curve algorithm '{}'", other)),
        }
    }
}

fn check_input<P: ControlPoint>(points: &[P], t: f64) -> Result<()> {
    check_points(points)?;
    if !t.is_finite() {
        return Err(GeometryError::NonFiniteParameter(t));
    }
    Ok(())
}

fn check_points<P: ControlPoint>(points: &[P]) -> Result<()> {
    if points.is_empty() {
        return Err(GeometryError::EmptyControlPoints);
    }
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(GeometryError::NonFiniteControlPoint(index)),
        None => Ok(()),
    }
}

/// All stages of the De Casteljau reduction at `t`.
///
/// Stage 0 is a copy of `points`; stage `k` holds `n + 1 - k` points and the
/// last stage holds the curve point itself.
pub fn de_casteljau<P: ControlPoint>(points: &[P], t: f64) -> Result<Vec<CurveStage<P>>> {
    check_input(points, t)?;

    let mut stages = Vec::with_capacity(points.len());
    stages.push(points.to_vec());

    while stages[stages.len() - 1].len() > 1 {
        let prev = &stages[stages.len() - 1];
        let next: CurveStage<P> = prev.windows(2).map(|w| w[0].lerp(w[1], t)).collect();
        stages.push(next);
    }

    Ok(stages)
}

/// Curve point at `t` via De Casteljau without keeping the stages.
pub fn de_casteljau_point<P: ControlPoint>(points: &[P], t: f64) -> Result<P> {
    check_input(points, t)?;

    let mut scratch = points.to_vec();
    for len in (1..scratch.len()).rev() {
        for i in 0..len {
            scratch[i] = scratch[i].lerp(scratch[i + 1], t);
        }
    }
    Ok(scratch[0])
}

/// Highest degree [`binomial_coefficients`] accepts. The middle of row 1029
/// is the first entry past `f64::MAX`.
pub const MAX_DEGREE: usize = 1000;

/// Row `n` of Pascal's triangle, `C(n, 0) ..= C(n, n)`.
///
/// Built by the downward accumulation `C[k] += C[k - 1]`, so no factorial is
/// ever formed. Values are exact up to `n = 56`.
pub fn binomial_coefficients(n: usize) -> Result<Vec<f64>> {
    if n > MAX_DEGREE {
        return Err(GeometryError::DegreeTooHigh { degree: n, max: MAX_DEGREE });
    }
    let mut c = vec![0.0; n + 1];
    c[0] = 1.0;
    for i in 1..=n {
        for k in (1..=i).rev() {
            c[k] += c[k - 1];
        }
    }
    Ok(c)
}

/// Curve point at `t` from the Bernstein form
/// `Σ C(n,k) (1-t)^(n-k) t^k P_k`.
///
/// `t == 0` and `t == 1` return the end points bit-for-bit. Each power is
/// taken directly with `powi` rather than by dividing a running `(1-t)^n`,
/// which loses precision as `t` approaches 1.
pub fn bernstein_evaluate<P: ControlPoint>(points: &[P], t: f64, coefficients: &[f64]) -> Result<P> {
    check_input(points, t)?;
    if coefficients.len() != points.len() {
        return Err(GeometryError::CoefficientCount {
            expected: points.len(),
            found: coefficients.len(),
        });
    }

    let n = points.len() - 1;
    if t == 0.0 {
        return Ok(points[0]);
    }
    if t == 1.0 {
        return Ok(points[n]);
    }

    let u = 1.0 - t;
    let point = points
        .iter()
        .zip(coefficients)
        .enumerate()
        .fold(P::ZERO, |acc, (k, (p, c))| {
            let w = c * u.powi((n - k) as i32) * t.powi(k as i32);
            acc + *p * w
        });
    Ok(point)
}

/// First derivative at `t`: `n · (Q₁ − Q₀)` where `Q` is the second-to-last
/// De Casteljau stage, so the tangent is built from the same reduction as the
/// drawn curve point. A single-point curve has a zero tangent.
pub fn tangent<P: ControlPoint>(points: &[P], t: f64) -> Result<P> {
    let stages = de_casteljau(points, t)?;
    let degree = points.len() - 1;
    if degree == 0 {
        return Ok(P::ZERO);
    }

    let q = &stages[stages.len() - 2];
    Ok((q[1] - q[0]) * degree as f64)
}

/// Samples the curve at `t_i = i / segments` for `i = 0..=segments`.
///
/// Returns a flat `[x0, y0, (z0,) x1, ...]` buffer of
/// `(segments + 1) * P::DIM` floats ready for a line-strip upload.
pub fn tessellate<P: ControlPoint>(points: &[P], segments: usize, algorithm: Algorithm) -> Result<Vec<f32>> {
    check_points(points)?;
    if segments == 0 {
        return Err(GeometryError::ZeroSegments);
    }

    log::trace!(
        "tessellating degree {} curve into {} segments with {:?}",
        points.len() - 1,
        segments,
        algorithm
    );

    let coefficients = match algorithm {
        Algorithm::Bernstein => binomial_coefficients(points.len() - 1)?,
        Algorithm::DeCasteljau => Vec::new(),
    };

    let mut out = Vec::with_capacity((segments + 1) * P::DIM);
    for i in 0..=segments {
        let t = i as f64 / segments as f64;
        let p = match algorithm {
            Algorithm::DeCasteljau => de_casteljau_point(points, t)?,
            Algorithm::Bernstein => bernstein_evaluate(points, t, &coefficients)?,
        };
        p.push_coords(&mut out);
    }
    Ok(out)
}

/// A Bézier curve that owns its control points.
///
/// Points are copied in; later changes go through [`BezierCurve::set_point`]
/// or [`BezierCurve::set_points`]. Deserializing runs the same checks as
/// [`BezierCurve::new`], so a curve always has at least one finite point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "CurvePoints<P>",
    bound(deserialize = "P: ControlPoint + Deserialize<'de>")
)]
pub struct BezierCurve<P> {
    points: Vec<P>,
}

#[derive(Deserialize)]
struct CurvePoints<P> {
    points: Vec<P>,
}

impl<P: ControlPoint> TryFrom<CurvePoints<P>> for BezierCurve<P> {
    type Error = GeometryError;

    fn try_from(raw: CurvePoints<P>) -> Result<Self> {
        check_points(&raw.points)?;
        Ok(Self { points: raw.points })
    }
}

impl<P: ControlPoint> BezierCurve<P> {
    pub fn new(points: &[P]) -> Result<Self> {
        check_points(points)?;
        Ok(Self { points: points.to_vec() })
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    pub fn set_point(&mut self, index: usize, point: P) -> Result<()> {
        if !point.is_finite() {
            return Err(GeometryError::NonFiniteControlPoint(index));
        }
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(GeometryError::IndexOutOfRange { index, len })?;
        *slot = point;
        Ok(())
    }

    pub fn set_points(&mut self, points: &[P]) -> Result<()> {
        check_points(points)?;
        self.points = points.to_vec();
        Ok(())
    }

    pub fn evaluate(&self, t: f64) -> Result<P> {
        de_casteljau_point(&self.points, t)
    }

    pub fn stages(&self, t: f64) -> Result<Vec<CurveStage<P>>> {
        de_casteljau(&self.points, t)
    }

    pub fn tangent(&self, t: f64) -> Result<P> {
        tangent(&self.points, t)
    }

    pub fn tessellate(&self, segments: usize, algorithm: Algorithm) -> Result<Vec<f32>> {
        tessellate(&self.points, segments, algorithm)
    }
}

impl BezierCurve<Point3> {
    /// Index of the control point drawn closest to `screen`, if any lies
    /// within `threshold` pixels.
    ///
    /// `screen` and `viewport` are in pixels with the origin at the top left,
    /// as mouse events report them. Points behind the camera are skipped.
    pub fn pick_control_point(
        &self,
        screen: (f64, f64),
        viewport: (f64, f64),
        view: &Matrix4,
        projection: &Matrix4,
        threshold: f64,
    ) -> Option<usize> {
        let view_projection = *projection * *view;
        let (width, height) = viewport;

        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let [x, y, _, w] = view_projection.transform_point(*p);
                if w <= 0.0 {
                    return None;
                }
                let px = (x / w + 1.0) * 0.5 * width;
                let py = (1.0 - y / w) * 0.5 * height;
                let dist = (px - screen.0).hypot(py - screen.1);
                (dist < threshold).then_some((i, dist))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}
