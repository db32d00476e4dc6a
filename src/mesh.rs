//! Indexed triangle meshes for the primitive viewers.
//!
//! Every generator lays its vertices out as a `(rows + 1) x (cols + 1)` grid
//! per surface patch and emits two triangles per grid cell, wound
//! `i0, i2, i1` / `i1, i2, i3`. [`parse_obj`] instead emits one vertex per
//! face corner with sequential indices.

use crate::bezier;
use crate::error::{GeometryError, Result};
use crate::point::{Point2, Point3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Flat vertex attribute buffers ready for upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// xyz per vertex
    pub positions: Vec<f32>,
    /// Unit xyz per vertex
    pub normals: Vec<f32>,
    /// rgb per vertex
    pub colors: Vec<f32>,
    /// uv per vertex
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, p: Point3, normal: Point3, color: [f64; 3], uv: [f64; 2]) {
        self.positions.extend([p.x as f32, p.y as f32, p.z as f32]);
        self.normals.extend([normal.x as f32, normal.y as f32, normal.z as f32]);
        self.colors.extend(color.map(|c| c as f32));
        self.texcoords.extend(uv.map(|c| c as f32));
    }

    fn push_grid(&mut self, base: u32, rows: u32, cols: u32) {
        for i in 0..rows {
            for j in 0..cols {
                let i0 = base + i * (cols + 1) + j;
                let i1 = i0 + 1;
                let i2 = i0 + (cols + 1);
                let i3 = i2 + 1;
                self.indices.extend([i0, i2, i1, i1, i2, i3]);
            }
        }
    }
}

fn check_tess(tess: u32) -> Result<()> {
    if tess == 0 {
        Err(GeometryError::ZeroTessellation)
    } else {
        Ok(())
    }
}

struct CubeFace {
    normal: Point3,
    up: Point3,
    color: [f64; 3],
}

const CUBE_FACES: [CubeFace; 6] = [
    CubeFace { normal: Point3::new(0.0, 0.0, 1.0), up: Point3::new(0.0, 1.0, 0.0), color: [1.0, 0.3, 0.3] },
    CubeFace { normal: Point3::new(0.0, 0.0, -1.0), up: Point3::new(0.0, 1.0, 0.0), color: [0.3, 1.0, 0.3] },
    CubeFace { normal: Point3::new(1.0, 0.0, 0.0), up: Point3::new(0.0, 1.0, 0.0), color: [0.3, 0.3, 1.0] },
    CubeFace { normal: Point3::new(-1.0, 0.0, 0.0), up: Point3::new(0.0, 1.0, 0.0), color: [1.0, 1.0, 0.3] },
    CubeFace { normal: Point3::new(0.0, 1.0, 0.0), up: Point3::new(0.0, 0.0, -1.0), color: [1.0, 0.3, 1.0] },
    CubeFace { normal: Point3::new(0.0, -1.0, 0.0), up: Point3::new(0.0, 0.0, 1.0), color: [0.3, 1.0, 1.0] },
];

/// Axis-aligned cube spanning `[-1, 1]³`, each face split into `tess x tess`
/// quads and coloured flat per face.
pub fn cube(tess: u32) -> Result<Mesh> {
    check_tess(tess)?;
    let mut mesh = Mesh::default();

    for face in &CUBE_FACES {
        let base = mesh.vertex_count() as u32;
        let right = face.up.cross(face.normal);
        for i in 0..=tess {
            for j in 0..=tess {
                let s = f64::from(i) / f64::from(tess) * 2.0 - 1.0;
                let t = f64::from(j) / f64::from(tess) * 2.0 - 1.0;
                let p = face.normal + right * s + face.up * t;
                mesh.push_vertex(p, face.normal, face.color, [(s + 1.0) / 2.0, (t + 1.0) / 2.0]);
            }
        }
        mesh.push_grid(base, tess, tess);
    }

    log::debug!("cube tess={} -> {} vertices", tess, mesh.vertex_count());
    Ok(mesh)
}

/// Unit sphere with `tess` stacks from pole to pole and `2 * tess` slices.
/// Colours encode position.
pub fn sphere(tess: u32) -> Result<Mesh> {
    check_tess(tess)?;
    let stacks = tess;
    let slices = tess * 2;
    let mut mesh = Mesh::default();

    for i in 0..=stacks {
        let v = f64::from(i) / f64::from(stacks);
        let (ring, y) = (v * PI).sin_cos();
        for j in 0..=slices {
            let u = f64::from(j) / f64::from(slices);
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();
            let p = Point3::new(ring * cos_theta, y, ring * sin_theta);
            mesh.push_vertex(p, p, [(p.x + 1.0) / 2.0, (p.y + 1.0) / 2.0, (p.z + 1.0) / 2.0], [u, v]);
        }
    }
    mesh.push_grid(0, stacks, slices);

    log::debug!("sphere tess={} -> {} vertices", tess, mesh.vertex_count());
    Ok(mesh)
}

pub const TORUS_MAJOR_RADIUS: f64 = 0.7;
pub const TORUS_MINOR_RADIUS: f64 = 0.3;

/// Torus around the Y axis: a tube of radius 0.3 swept along a ring of
/// radius 0.7, `tess` rings by `tess` sides.
pub fn torus(tess: u32) -> Result<Mesh> {
    check_tess(tess)?;
    let mut mesh = Mesh::default();

    for i in 0..=tess {
        let u = f64::from(i) / f64::from(tess);
        let (sin_theta, cos_theta) = (u * TAU).sin_cos();
        for j in 0..=tess {
            let v = f64::from(j) / f64::from(tess);
            let (sin_phi, cos_phi) = (v * TAU).sin_cos();
            let reach = TORUS_MAJOR_RADIUS + TORUS_MINOR_RADIUS * cos_phi;
            let p = Point3::new(reach * cos_theta, TORUS_MINOR_RADIUS * sin_phi, reach * sin_theta);
            let normal = Point3::new(cos_phi * cos_theta, sin_phi, cos_phi * sin_theta);
            mesh.push_vertex(p, normal, [(cos_phi + 1.0) / 2.0, (sin_phi + 1.0) / 2.0, (cos_theta + 1.0) / 2.0], [u, v]);
        }
    }
    mesh.push_grid(0, tess, tess);

    log::debug!("torus tess={} -> {} vertices", tess, mesh.vertex_count());
    Ok(mesh)
}

/// Preset sampling densities for [`swept_surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepDetail {
    Low,
    #[default]
    Medium,
    High,
}

impl SweepDetail {
    /// `(curve_steps, base_slices)`
    pub fn steps(self) -> (u32, u32) {
        match self {
            Self::Low => (8, 16),
            Self::Medium => (16, 32),
            Self::High => (32, 64),
        }
    }
}

/// Surface of revolution: the planar profile `(radius, z)` is revolved about
/// the Z axis through `sweep_angle` radians, at most one full turn.
///
/// The profile is sampled at `curve_steps + 1` parameters. `base_slices` is
/// the slice count of a full turn; a partial sweep gets its share of them,
/// never fewer than 3. Colours and the `v` texture coordinate run with
/// height along the profile.
pub fn swept_surface(profile: &[Point2], sweep_angle: f64, curve_steps: u32, base_slices: u32) -> Result<Mesh> {
    if !sweep_angle.is_finite() || sweep_angle <= 0.0 || sweep_angle > TAU {
        return Err(GeometryError::InvalidSweepAngle(sweep_angle));
    }
    check_tess(curve_steps)?;
    check_tess(base_slices)?;
    let slices = ((f64::from(base_slices) * sweep_angle / TAU).floor() as u32).max(3);

    let samples = (0..=curve_steps)
        .map(|i| -> Result<(Point2, Point2)> {
            let t = f64::from(i) / f64::from(curve_steps);
            Ok((bezier::de_casteljau_point(profile, t)?, bezier::tangent(profile, t)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let z_min = samples.iter().map(|(p, _)| p.y).fold(f64::INFINITY, f64::min);
    let z_max = samples.iter().map(|(p, _)| p.y).fold(f64::NEG_INFINITY, f64::max);
    let z_range = z_max - z_min;

    let mut mesh = Mesh::default();
    for (sample, d) in &samples {
        let h = if z_range > 0.0 { (sample.y - z_min) / z_range } else { 0.0 };
        for j in 0..=slices {
            let u = f64::from(j) / f64::from(slices);
            let (sin_theta, cos_theta) = (sweep_angle * u).sin_cos();
            let p = Point3::new(sample.x * cos_theta, sample.x * sin_theta, sample.y);
            // (dz, -dr) is perpendicular to the profile in its own plane
            let normal = Point3::new(d.y * cos_theta, d.y * sin_theta, -d.x)
                .try_normalize(1e-12)
                .unwrap_or(Point3::new(0.0, 0.0, 1.0));
            mesh.push_vertex(p, normal, [1.0, h, 1.0 - h], [u, h]);
        }
    }
    mesh.push_grid(0, curve_steps, slices);

    log::debug!(
        "swept surface {:.1} deg, {} steps x {} slices -> {} vertices, {} triangles",
        sweep_angle.to_degrees(),
        curve_steps,
        slices,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

const OBJ_DEFAULT_NORMAL: [f64; 3] = [0.0, 1.0, 0.0];
const OBJ_COLOR: [f64; 3] = [0.8, 0.8, 0.8];

/// Parses the `v`, `vt`, `vn` and `f` records of a Wavefront OBJ file.
///
/// Polygons are fan-triangulated from their first corner and every corner
/// becomes its own vertex. Corners without a texture or normal reference, or
/// whose reference does not resolve, get uv `(0, 0)` and normal `(0, 1, 0)`.
/// Negative references count back from the most recent record. Other record
/// types (`o`, `g`, `usemtl`, ...) are ignored.
pub fn parse_obj(text: &str) -> Result<Mesh> {
    let mut positions: Vec<[f64; 3]> = Vec::new();
    let mut normals: Vec<[f64; 3]> = Vec::new();
    let mut uvs: Vec<[f64; 2]> = Vec::new();
    let mut mesh = Mesh::default();

    for (line_no, raw) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let mut fields = raw.split_whitespace();
        match fields.next() {
            Some("v") => positions.push(obj_floats(fields, line_no)?),
            Some("vn") => normals.push(obj_floats(fields, line_no)?),
            Some("vt") => uvs.push(obj_floats(fields, line_no)?),
            Some("f") => {
                let corners = fields
                    .map(|c| obj_corner(c, line_no, &positions, &uvs, &normals))
                    .collect::<Result<Vec<_>>>()?;
                for i in 1..corners.len().saturating_sub(1) {
                    for &(p, uv, n) in &[corners[0], corners[i], corners[i + 1]] {
                        let index = mesh.vertex_count() as u32;
                        mesh.push_vertex(p, n, OBJ_COLOR, uv);
                        mesh.indices.push(index);
                    }
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "OBJ parsed: {} positions, {} normals, {} vertices",
        positions.len(),
        normals.len(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

fn obj_error(line: usize, message: impl Into<String>) -> GeometryError {
    GeometryError::ObjParse { line, message: message.into() }
}

fn obj_floats<'a, const N: usize>(mut fields: impl Iterator<Item = &'a str>, line: usize) -> Result<[f64; N]> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let field = fields
            .next()
            .ok_or_else(|| obj_error(line, format!("expected {} numbers", N)))?;
        *slot = field
            .parse()
            .map_err(|_| obj_error(line, format!("'{}' is not a number", field)))?;
    }
    Ok(out)
}

/// Resolves a 1-based (or negative, relative) OBJ reference.
fn obj_lookup<T: Copy>(items: &[T], reference: i64) -> Option<T> {
    let index = match reference {
        r if r > 0 => usize::try_from(r - 1).ok()?,
        r if r < 0 => items.len().checked_sub(usize::try_from(r.unsigned_abs()).ok()?)?,
        _ => return None,
    };
    items.get(index).copied()
}

fn obj_corner(
    corner: &str,
    line: usize,
    positions: &[[f64; 3]],
    uvs: &[[f64; 2]],
    normals: &[[f64; 3]],
) -> Result<(Point3, [f64; 2], Point3)> {
    let mut refs = corner.split('/').map(|s| {
        if s.is_empty() {
            Ok(0)
        } else {
            s.parse::<i64>()
                .map_err(|_| obj_error(line, format!("bad face reference '{}'", corner)))
        }
    });
    let vi = refs.next().unwrap_or(Ok(0))?;
    let ti = refs.next().unwrap_or(Ok(0))?;
    let ni = refs.next().unwrap_or(Ok(0))?;

    let p = obj_lookup(positions, vi).ok_or_else(|| {
        obj_error(line, format!("vertex reference {} out of range for {} positions", vi, positions.len()))
    })?;
    let uv = obj_lookup(uvs, ti).unwrap_or([0.0, 0.0]);
    let n = obj_lookup(normals, ni).unwrap_or(OBJ_DEFAULT_NORMAL);
    Ok((Point3::from(p), uv, Point3::from(n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &Mesh) -> impl Iterator<Item = [f32; 3]> + '_ {
        mesh.positions.chunks(3).map(|c| [c[0], c[1], c[2]])
    }

    fn normals(mesh: &Mesh) -> impl Iterator<Item = [f32; 3]> + '_ {
        mesh.normals.chunks(3).map(|c| [c[0], c[1], c[2]])
    }

    fn assert_consistent(mesh: &Mesh) {
        let n = mesh.vertex_count();
        assert_eq!(mesh.positions.len(), n * 3);
        assert_eq!(mesh.normals.len(), n * 3);
        assert_eq!(mesh.colors.len(), n * 3);
        assert_eq!(mesh.texcoords.len(), n * 2);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < n));
        for v in normals(mesh) {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5, "normal {:?} is not unit length", v);
        }
    }

    fn vase_profile() -> Vec<Point2> {
        vec![
            Point2::new(0.05, -0.8),
            Point2::new(0.3, -0.4),
            Point2::new(0.25, 0.2),
            Point2::new(0.08, 0.8),
        ]
    }

    #[test]
    fn cube_counts_and_bounds() {
        let mesh = cube(2).unwrap();
        assert_consistent(&mesh);
        assert_eq!(mesh.vertex_count(), 6 * 9);
        assert_eq!(mesh.triangle_count(), 6 * 4 * 2);
        for (p, n) in positions(&mesh).zip(normals(&mesh)) {
            let max = p.iter().fold(0f32, |m, v| m.max(v.abs()));
            assert!((max - 1.0).abs() < 1e-6, "{:?} not on the cube surface", p);
            // the face normal's axis is the one pinned at ±1
            let axis = n.iter().position(|c| c.abs() == 1.0).unwrap();
            assert_eq!(p[axis], n[axis]);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let mesh = sphere(6).unwrap();
        assert_consistent(&mesh);
        assert_eq!(mesh.vertex_count(), 7 * 13);
        assert_eq!(mesh.triangle_count(), 6 * 12 * 2);
        for (p, n) in positions(&mesh).zip(normals(&mesh)) {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
            assert_eq!(p, n);
        }
    }

    #[test]
    fn torus_vertices_keep_tube_radius() {
        let mesh = torus(8).unwrap();
        assert_consistent(&mesh);
        for (p, n) in positions(&mesh).zip(normals(&mesh)) {
            let ring = (p[0] * p[0] + p[2] * p[2]).sqrt() - TORUS_MAJOR_RADIUS as f32;
            let tube = (ring * ring + p[1] * p[1]).sqrt();
            assert!((tube - TORUS_MINOR_RADIUS as f32).abs() < 1e-5);
            // stepping out along the normal grows the tube radius
            let q = [p[0] + 0.1 * n[0], p[1] + 0.1 * n[1], p[2] + 0.1 * n[2]];
            let ring = (q[0] * q[0] + q[2] * q[2]).sqrt() - TORUS_MAJOR_RADIUS as f32;
            assert!(((ring * ring + q[1] * q[1]).sqrt() - 0.4).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_tessellation_is_rejected() {
        assert_eq!(cube(0), Err(GeometryError::ZeroTessellation));
        assert_eq!(sphere(0), Err(GeometryError::ZeroTessellation));
        assert_eq!(torus(0), Err(GeometryError::ZeroTessellation));
        assert_eq!(swept_surface(&vase_profile(), PI, 0, 16), Err(GeometryError::ZeroTessellation));
        assert_eq!(swept_surface(&vase_profile(), PI, 8, 0), Err(GeometryError::ZeroTessellation));
    }

    #[test]
    fn full_sweep_uses_all_slices() {
        let (steps, slices) = SweepDetail::Medium.steps();
        let mesh = swept_surface(&vase_profile(), TAU, steps, slices).unwrap();
        assert_consistent(&mesh);
        assert_eq!(mesh.vertex_count(), 17 * 33);
        assert_eq!(mesh.triangle_count(), 16 * 32 * 2);
    }

    #[test]
    fn narrow_sweep_keeps_three_slices() {
        let (steps, slices) = SweepDetail::Low.steps();
        let mesh = swept_surface(&vase_profile(), 0.1, steps, slices).unwrap();
        assert_eq!(mesh.vertex_count(), 9 * 4);
    }

    #[test]
    fn swept_rings_follow_profile() {
        let profile = vase_profile();
        let (steps, slices) = SweepDetail::High.steps();
        let mesh = swept_surface(&profile, PI, steps, slices).unwrap();
        assert_consistent(&mesh);
        let stride = (slices / 2 + 1) as usize;
        for i in 0..=steps as usize {
            let expected = bezier::de_casteljau_point(&profile, i as f64 / steps as f64).unwrap();
            for j in 0..stride {
                let p = positions(&mesh).nth(i * stride + j).unwrap();
                let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
                assert!((r - expected.x as f32).abs() < 1e-5);
                assert!((p[2] - expected.y as f32).abs() < 1e-6);
            }
        }
        // first ring starts at the bottom of the profile, v = 0
        assert_eq!(mesh.texcoords[1], 0.0);
    }

    #[test]
    fn cylinder_normals_point_outward() {
        let wall = [Point2::new(1.0, -1.0), Point2::new(1.0, 1.0)];
        let mesh = swept_surface(&wall, TAU, 2, 8).unwrap();
        assert_consistent(&mesh);
        for (p, n) in positions(&mesh).zip(normals(&mesh)) {
            assert!(n[2].abs() < 1e-6);
            // radial, up to the profile's orientation
            assert!((p[0] * n[1] - p[1] * n[0]).abs() < 1e-5, "{:?} {:?}", p, n);
        }
    }

    #[test]
    fn bad_sweep_input_is_rejected() {
        for angle in [0.0, -1.0, f64::NAN, TAU + 1e-9, 4.0 * PI, 1e300] {
            assert!(
                matches!(swept_surface(&vase_profile(), angle, 8, 16), Err(GeometryError::InvalidSweepAngle(_))),
                "angle {} accepted",
                angle
            );
        }
        assert_eq!(swept_surface(&[], PI, 8, 16), Err(GeometryError::EmptyControlPoints));
    }

    const QUAD_OBJ: &str = "\
# unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn obj_polygons_are_fan_triangulated() {
        let mesh = parse_obj(QUAD_OBJ).unwrap();
        assert_consistent(&mesh);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        let corners: Vec<[f32; 3]> = positions(&mesh).collect();
        assert_eq!(
            corners,
            vec![
                [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
            ]
        );
        assert_eq!(&mesh.texcoords[4..6], &[1.0, 1.0]);
        assert!(normals(&mesh).all(|n| n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn obj_missing_references_fall_back() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\nf 1 2//7 -1/1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(normals(&mesh).all(|n| n == [0.0, 1.0, 0.0]));
        assert_eq!(mesh.texcoords, vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5]);
        // -1 is the last position
        assert_eq!(&mesh.positions[6..9], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn obj_errors_name_the_line() {
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 x 0\n"),
            Err(GeometryError::ObjParse { line: 2, .. })
        ));
        assert!(matches!(parse_obj("v 0 0\n"), Err(GeometryError::ObjParse { line: 1, .. })));
        assert!(matches!(
            parse_obj("v 0 0 0\nf 1 2 3\n"),
            Err(GeometryError::ObjParse { line: 2, .. })
        ));
        // degenerate faces produce nothing
        assert_eq!(parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap().vertex_count(), 0);
    }
}
