//! JavaScript-facing API.
//!
//! Matrices cross the boundary as 16-element column-major `Float32Array`s,
//! control points as arrays of `{x, y}` or `{x, y, z}` objects. Every
//! rejected input comes back as a thrown string and a `warn` log line.

use crate::animation::{CurveAnimation, PlaybackMode};
use crate::bezier::{self, Algorithm, BezierCurve};
use crate::camera::{Camera, OrbitCamera};
use crate::config::SceneConfig;
use crate::mesh::{self, Mesh, SweepDetail};
use crate::point::{Point3, PointList};
use crate::transform::{self, Matrix4, TransformOrder, TransformParams};
use js_sys::Float32Array;
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

fn js_error(err: impl Display) -> JsValue {
    log::warn!("rejected call: {}", err);
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

fn matrix_out(m: Matrix4) -> Float32Array {
    Float32Array::from(&m.to_f32_array()[..])
}

fn matrix_in(values: &[f32]) -> Result<Matrix4, JsValue> {
    let wide: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    Matrix4::from_cols_slice(&wide)
        .ok_or_else(|| js_error(format!("expected 16 matrix elements, got {}", values.len())))
}

fn vec3_in(values: &[f64], what: &str) -> Result<Point3, JsValue> {
    match values {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(js_error(format!("{} must have 3 components, got {}", what, values.len()))),
    }
}

fn points_in(value: JsValue) -> Result<PointList, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

fn spatial_points_in(value: JsValue) -> Result<Vec<Point3>, JsValue> {
    match points_in(value)? {
        PointList::Spatial(points) => Ok(points),
        PointList::Planar(points) if points.is_empty() => Ok(Vec::new()),
        PointList::Planar(_) => Err(js_error("expected {x, y, z} control points")),
    }
}

// ============================================================================
// Transforms
// ============================================================================

#[wasm_bindgen]
pub fn identity() -> Float32Array {
    matrix_out(transform::identity())
}

#[wasm_bindgen]
pub fn translation(tx: f64, ty: f64, tz: f64) -> Float32Array {
    matrix_out(transform::translation(tx, ty, tz))
}

/// Rewrites only the translation column of `matrix`.
#[wasm_bindgen(js_name = translateInPlace)]
pub fn translate_in_place(matrix: &mut [f32], tx: f64, ty: f64, tz: f64) -> Result<(), JsValue> {
    let mut m = matrix_in(matrix)?;
    m.translate_in_place(tx, ty, tz);
    matrix.copy_from_slice(&m.to_f32_array());
    Ok(())
}

#[wasm_bindgen]
pub fn scaling(sx: f64, sy: f64, sz: f64) -> Float32Array {
    matrix_out(transform::scaling(sx, sy, sz))
}

#[wasm_bindgen(js_name = rotationX)]
pub fn rotation_x(radians: f64) -> Float32Array {
    matrix_out(transform::rotation_x(radians))
}

#[wasm_bindgen(js_name = rotationY)]
pub fn rotation_y(radians: f64) -> Float32Array {
    matrix_out(transform::rotation_y(radians))
}

#[wasm_bindgen(js_name = rotationZ)]
pub fn rotation_z(radians: f64) -> Float32Array {
    matrix_out(transform::rotation_z(radians))
}

#[wasm_bindgen]
pub fn multiply(a: &[f32], b: &[f32]) -> Result<Float32Array, JsValue> {
    Ok(matrix_out(matrix_in(a)? * matrix_in(b)?))
}

#[wasm_bindgen]
pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Result<Float32Array, JsValue> {
    transform::frustum(left, right, bottom, top, near, far)
        .map(matrix_out)
        .map_err(js_error)
}

#[wasm_bindgen]
pub fn perspective(fov_y_radians: f64, aspect: f64, near: f64, far: f64) -> Result<Float32Array, JsValue> {
    transform::perspective(fov_y_radians, aspect, near, far)
        .map(matrix_out)
        .map_err(js_error)
}

#[wasm_bindgen]
pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Result<Float32Array, JsValue> {
    transform::orthographic(left, right, bottom, top, near, far)
        .map(matrix_out)
        .map_err(js_error)
}

#[wasm_bindgen(js_name = lookAt)]
pub fn look_at(eye: &[f64], target: &[f64], up: &[f64]) -> Result<Float32Array, JsValue> {
    let eye = vec3_in(eye, "eye")?;
    let target = vec3_in(target, "target")?;
    let up = vec3_in(up, "up")?;
    transform::look_at(eye, target, up).map(matrix_out).map_err(js_error)
}

/// Model matrix from translation, Euler rotation in radians and scale,
/// composed in `order` (`"TRS"`, `"RTS"`, ...).
#[wasm_bindgen(js_name = composeTransform)]
pub fn compose_transform(
    translation: &[f64],
    rotation_radians: &[f64],
    scale: &[f64],
    order: &str,
) -> Result<Float32Array, JsValue> {
    let params = TransformParams {
        translation: vec3_in(translation, "translation")?,
        rotation: vec3_in(rotation_radians, "rotation")?,
        scale: vec3_in(scale, "scale")?,
    };
    let order: TransformOrder = order.parse().map_err(js_error)?;
    Ok(matrix_out(transform::compose(&params, order)))
}

#[wasm_bindgen(js_name = formatMatrix)]
pub fn format_matrix(matrix: &[f32]) -> Result<String, JsValue> {
    Ok(matrix_in(matrix)?.to_string())
}

// ============================================================================
// Curves
// ============================================================================

/// Every De Casteljau stage at `t`, as an array of point arrays.
#[wasm_bindgen(js_name = deCasteljau)]
pub fn de_casteljau(points: JsValue, t: f64) -> Result<JsValue, JsValue> {
    match points_in(points)? {
        PointList::Spatial(p) => to_js(&bezier::de_casteljau(&p, t).map_err(js_error)?),
        PointList::Planar(p) => to_js(&bezier::de_casteljau(&p, t).map_err(js_error)?),
    }
}

#[wasm_bindgen(js_name = bernsteinEvaluate)]
pub fn bernstein_evaluate(points: JsValue, t: f64, coefficients: &[f64]) -> Result<JsValue, JsValue> {
    match points_in(points)? {
        PointList::Spatial(p) => to_js(&bezier::bernstein_evaluate(&p, t, coefficients).map_err(js_error)?),
        PointList::Planar(p) => to_js(&bezier::bernstein_evaluate(&p, t, coefficients).map_err(js_error)?),
    }
}

#[wasm_bindgen(js_name = binomialCoefficients)]
pub fn binomial_coefficients(n: usize) -> Result<Vec<f64>, JsValue> {
    bezier::binomial_coefficients(n).map_err(js_error)
}

/// Line-strip vertices, 2 or 3 floats per sample depending on the points.
#[wasm_bindgen]
pub fn tessellate(points: JsValue, segments: usize, algorithm: &str) -> Result<Vec<f32>, JsValue> {
    let algorithm: Algorithm = algorithm.parse().map_err(js_error)?;
    let out = match points_in(points)? {
        PointList::Spatial(p) => bezier::tessellate(&p, segments, algorithm),
        PointList::Planar(p) => bezier::tessellate(&p, segments, algorithm),
    };
    out.map_err(js_error)
}

/// Index of the control point within `threshold` pixels of the cursor, if
/// any. `view` and `projection` are the matrices the scene is drawn with.
#[wasm_bindgen(js_name = pickControlPoint)]
#[allow(clippy::too_many_arguments)]
pub fn pick_control_point(
    points: JsValue,
    screen_x: f64,
    screen_y: f64,
    width: f64,
    height: f64,
    view: &[f32],
    projection: &[f32],
    threshold: f64,
) -> Result<Option<u32>, JsValue> {
    let curve = BezierCurve::new(&spatial_points_in(points)?).map_err(js_error)?;
    let picked = curve.pick_control_point(
        (screen_x, screen_y),
        (width, height),
        &matrix_in(view)?,
        &matrix_in(projection)?,
        threshold,
    );
    Ok(picked.map(|i| i as u32))
}

#[wasm_bindgen]
pub fn tangent(points: JsValue, t: f64) -> Result<JsValue, JsValue> {
    match points_in(points)? {
        PointList::Spatial(p) => to_js(&bezier::tangent(&p, t).map_err(js_error)?),
        PointList::Planar(p) => to_js(&bezier::tangent(&p, t).map_err(js_error)?),
    }
}

// ============================================================================
// Meshes
// ============================================================================

fn mesh_out(mesh: Result<Mesh, crate::error::GeometryError>) -> Result<JsValue, JsValue> {
    to_js(&mesh.map_err(js_error)?)
}

#[wasm_bindgen(js_name = cubeMesh)]
pub fn cube_mesh(tess: u32) -> Result<JsValue, JsValue> {
    mesh_out(mesh::cube(tess))
}

#[wasm_bindgen(js_name = sphereMesh)]
pub fn sphere_mesh(tess: u32) -> Result<JsValue, JsValue> {
    mesh_out(mesh::sphere(tess))
}

#[wasm_bindgen(js_name = torusMesh)]
pub fn torus_mesh(tess: u32) -> Result<JsValue, JsValue> {
    mesh_out(mesh::torus(tess))
}

/// `profile` is a planar curve of `{x: radius, y: height}` points. `detail`
/// is `"low"`, `"medium"` or `"high"`.
#[wasm_bindgen(js_name = sweptSurfaceMesh)]
pub fn swept_surface_mesh(profile: JsValue, sweep_radians: f64, detail: &str) -> Result<JsValue, JsValue> {
    let profile = match points_in(profile)? {
        PointList::Planar(points) => points,
        PointList::Spatial(_) => return Err(js_error("swept profile must be planar {x, y} points")),
    };
    let detail: SweepDetail = serde_json::from_value(serde_json::Value::String(detail.to_string()))
        .map_err(js_error)?;
    let (curve_steps, base_slices) = detail.steps();
    mesh_out(mesh::swept_surface(&profile, sweep_radians, curve_steps, base_slices))
}

#[wasm_bindgen(js_name = parseObj)]
pub fn parse_obj(text: &str) -> Result<JsValue, JsValue> {
    mesh_out(mesh::parse_obj(text))
}

// ============================================================================
// Stateful helpers
// ============================================================================

/// Playback state for the point that rides along a curve.
#[wasm_bindgen]
pub struct CurveAnimator {
    inner: CurveAnimation,
}

#[wasm_bindgen]
impl CurveAnimator {
    /// `mode` is `"wrap"` or `"ping_pong"`.
    #[wasm_bindgen(constructor)]
    pub fn new(speed: f64, mode: &str) -> Result<CurveAnimator, JsValue> {
        let mode: PlaybackMode = serde_json::from_value(serde_json::Value::String(mode.to_string()))
            .map_err(js_error)?;
        Ok(CurveAnimator {
            inner: CurveAnimation::new(speed, mode),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn t(&self) -> f64 {
        self.inner.t()
    }

    #[wasm_bindgen(js_name = setT)]
    pub fn set_t(&mut self, t: f64) {
        self.inner.set_t(t);
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: f64) {
        self.inner.set_speed(speed);
    }

    #[wasm_bindgen(getter, js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn play(&mut self) {
        self.inner.play();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn toggle(&mut self) -> bool {
        self.inner.toggle()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Advances by `dt_seconds` and returns the new `t`.
    pub fn step(&mut self, dt_seconds: f64) -> f64 {
        self.inner.step(dt_seconds)
    }

    /// Model matrix of the marker at the current `t` on a spatial curve.
    #[wasm_bindgen(js_name = modelMatrix)]
    pub fn model_matrix(&self, points: JsValue) -> Result<Float32Array, JsValue> {
        let curve = BezierCurve::new(&spatial_points_in(points)?).map_err(js_error)?;
        self.inner.model_matrix(&curve).map(matrix_out).map_err(js_error)
    }
}

/// Orbit camera plus projection settings, built from a JSON scene config.
#[wasm_bindgen]
pub struct OrbitView {
    orbit: OrbitCamera,
    camera: Camera,
}

#[wasm_bindgen]
impl OrbitView {
    /// Builds the view from a JSON config; an empty string uses defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<OrbitView, JsValue> {
        let config = if config_json.trim().is_empty() {
            SceneConfig::default()
        } else {
            SceneConfig::from_json(config_json).map_err(js_error)?
        };
        if let Ok(level) = config.level_filter() {
            log::set_max_level(level);
        }
        Ok(OrbitView {
            orbit: config.camera.to_orbit().map_err(js_error)?,
            camera: config.camera.to_camera(),
        })
    }

    /// Angles in radians, e.g. mouse delta times a sensitivity factor.
    pub fn rotate(&mut self, d_azimuth: f64, d_elevation: f64) {
        self.orbit.rotate(d_azimuth, d_elevation);
    }

    pub fn dolly(&mut self, delta: f64) {
        self.orbit.dolly(delta);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.orbit.pan(dx, dy);
    }

    pub fn reset(&mut self) {
        self.orbit.reset();
    }

    /// Returns `true` when the new projection is perspective.
    #[wasm_bindgen(js_name = toggleProjection)]
    pub fn toggle_projection(&mut self) -> bool {
        self.camera.toggle_projection() == crate::camera::ProjectionKind::Perspective
    }

    pub fn eye(&self) -> Vec<f64> {
        let e = self.orbit.eye();
        vec![e.x, e.y, e.z]
    }

    #[wasm_bindgen(js_name = viewMatrix)]
    pub fn view_matrix(&self) -> Result<Float32Array, JsValue> {
        self.orbit.view_matrix().map(matrix_out).map_err(js_error)
    }

    #[wasm_bindgen(js_name = projectionMatrix)]
    pub fn projection_matrix(&self, aspect: f64) -> Result<Float32Array, JsValue> {
        self.camera.projection_matrix(aspect).map(matrix_out).map_err(js_error)
    }
}

#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: log::LevelFilter = level.parse().map_err(js_error)?;
    log::set_max_level(filter);
    Ok(())
}
