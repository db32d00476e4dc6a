#![cfg(target_arch = "wasm32")]

use curvekit::wasm::bindings::*;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Serialize)]
struct P2 {
    x: f64,
    y: f64,
}

fn points(list: &[(f64, f64)]) -> JsValue {
    let v: Vec<P2> = list.iter().map(|&(x, y)| P2 { x, y }).collect();
    serde_wasm_bindgen::to_value(&v).unwrap()
}

fn cubic() -> JsValue {
    points(&[(-1.0, 0.0), (-0.5, 1.0), (0.5, 1.0), (1.0, 0.0)])
}

#[wasm_bindgen_test]
fn identity_is_column_major() {
    let m = identity().to_vec();
    assert_eq!(m.len(), 16);
    for (i, v) in m.iter().enumerate() {
        assert_eq!(*v, if i % 5 == 0 { 1.0 } else { 0.0 });
    }
}

#[wasm_bindgen_test]
fn translation_lands_in_last_column() {
    let m = translation(1.0, 2.0, 3.0).to_vec();
    assert_eq!(&m[12..15], &[1.0, 2.0, 3.0]);
    let mut buf = identity().to_vec();
    translate_in_place(&mut buf, 4.0, 5.0, 6.0).unwrap();
    assert_eq!(&buf[12..15], &[4.0, 5.0, 6.0]);
}

#[wasm_bindgen_test]
fn multiply_rejects_short_matrices() {
    assert!(multiply(&[1.0; 15], &identity().to_vec()).is_err());
    let t = translation(1.0, 0.0, 0.0).to_vec();
    let out = multiply(&identity().to_vec(), &t).unwrap().to_vec();
    assert_eq!(out, t);
}

#[wasm_bindgen_test]
fn degenerate_projections_throw() {
    assert!(frustum(1.0, 1.0, -1.0, 1.0, 0.1, 10.0).is_err());
    assert!(orthographic(-1.0, 1.0, -1.0, 1.0, 5.0, 5.0).is_err());
    assert!(perspective(0.8, 1.5, 0.1, 100.0).is_ok());
    assert!(look_at(&[0.0, 0.0, 5.0], &[0.0, 0.0, 5.0], &[0.0, 1.0, 0.0]).is_err());
    assert!(look_at(&[0.0, 0.0], &[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).is_err());
}

#[wasm_bindgen_test]
fn compose_parses_order() {
    assert!(compose_transform(&[1.0, 0.0, 0.0], &[0.0; 3], &[1.0; 3], "trs").is_ok());
    assert!(compose_transform(&[1.0, 0.0, 0.0], &[0.0; 3], &[1.0; 3], "XYZ").is_err());
}

#[wasm_bindgen_test]
fn tessellate_planar_curve() {
    let out = tessellate(cubic(), 10, "casteljau").unwrap();
    assert_eq!(out.len(), 11 * 2);
    assert_eq!(&out[..2], &[-1.0, 0.0]);
    assert_eq!(&out[20..], &[1.0, 0.0]);
    let bern = tessellate(cubic(), 10, "bernstein").unwrap();
    for (a, b) in out.iter().zip(bern.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
    assert!(tessellate(cubic(), 0, "casteljau").is_err());
    assert!(tessellate(points(&[]), 4, "casteljau").is_err());
    assert!(tessellate(cubic(), 4, "spline").is_err());
}

#[wasm_bindgen_test]
fn stages_and_binomials() {
    let stages = de_casteljau(cubic(), 0.5).unwrap();
    let stages: Vec<Vec<curvekit::Point2>> = serde_wasm_bindgen::from_value(stages).unwrap();
    assert_eq!(stages.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 3, 2, 1]);
    assert!((stages[3][0].y - 0.75).abs() < 1e-12);
    assert_eq!(binomial_coefficients(3).unwrap(), vec![1.0, 3.0, 3.0, 1.0]);
    assert!(binomial_coefficients(u32::MAX as usize).is_err());
    assert!(bernstein_evaluate(cubic(), 0.5, &[1.0, 3.0]).is_err());
}

#[wasm_bindgen_test]
fn meshes_have_indices() {
    let cube: curvekit::mesh::Mesh = serde_wasm_bindgen::from_value(cube_mesh(2).unwrap()).unwrap();
    assert_eq!(cube.triangle_count(), 6 * 2 * 2 * 2);
    assert!(sphere_mesh(0).is_err());
    let swept = swept_surface_mesh(cubic(), std::f64::consts::PI, "low").unwrap();
    let swept: curvekit::mesh::Mesh = serde_wasm_bindgen::from_value(swept).unwrap();
    assert!(swept.vertex_count() > 0);
    assert!(swept_surface_mesh(cubic(), 3.0 * std::f64::consts::PI, "low").is_err());

    let tri: curvekit::mesh::Mesh = serde_wasm_bindgen::from_value(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap()).unwrap();
    assert_eq!(tri.triangle_count(), 1);
    assert!(parse_obj("v a b c").is_err());
}

#[derive(Serialize)]
struct P3 {
    x: f64,
    y: f64,
    z: f64,
}

fn spatial(list: &[(f64, f64, f64)]) -> JsValue {
    let v: Vec<P3> = list.iter().map(|&(x, y, z)| P3 { x, y, z }).collect();
    serde_wasm_bindgen::to_value(&v).unwrap()
}

#[wasm_bindgen_test]
fn mixed_dimensions_are_rejected() {
    let mixed = js_sys::Array::new();
    mixed.push(&spatial(&[(0.0, 0.0, 1.0)]).dyn_into::<js_sys::Array>().unwrap().get(0));
    mixed.push(&points(&[(1.0, 1.0)]).dyn_into::<js_sys::Array>().unwrap().get(0));
    assert!(tessellate(mixed.into(), 4, "casteljau").is_err());
}

#[wasm_bindgen_test]
fn picking_and_marker_matrix() {
    let pts = || spatial(&[(-2.0, 0.0, 0.0), (0.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
    let view = look_at(&[0.0, 0.0, 10.0], &[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap().to_vec();
    let proj = perspective(std::f64::consts::FRAC_PI_2, 1.0, 0.1, 100.0).unwrap().to_vec();
    assert_eq!(pick_control_point(pts(), 400.0, 400.0, 800.0, 800.0, &view, &proj, 5.0).unwrap(), Some(1));
    assert_eq!(pick_control_point(pts(), 10.0, 10.0, 800.0, 800.0, &view, &proj, 5.0).unwrap(), None);
    assert!(pick_control_point(cubic(), 0.0, 0.0, 800.0, 800.0, &view, &proj, 5.0).is_err());

    let anim = CurveAnimator::new(0.2, "wrap").unwrap();
    let model = anim.model_matrix(pts()).unwrap().to_vec();
    assert!((model[12] + 2.0).abs() < 1e-6);
}

#[wasm_bindgen_test]
fn animator_wraps() {
    let mut anim = CurveAnimator::new(0.5, "wrap").unwrap();
    assert!(!anim.is_playing());
    anim.play();
    let t = anim.step(3.0);
    assert!((t - 0.5).abs() < 1e-12, "t = {}", t);
    assert!(CurveAnimator::new(0.5, "bounce").is_err());
}

#[wasm_bindgen_test]
fn orbit_view_from_config() {
    let mut view = OrbitView::new("").unwrap();
    assert_eq!(view.view_matrix().unwrap().length(), 16);
    assert!(!view.toggle_projection());
    assert!(view.projection_matrix(1.5).is_ok());
    assert!(OrbitView::new("{ nope").is_err());
}
