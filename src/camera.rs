//! Orbit camera and projection settings for the scene viewers.

use crate::error::{GeometryError, Result};
use crate::point::Point3;
use crate::transform::{self, Matrix4};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Keeps the orbit eye off the poles, where `look_at` with a +Y up vector
/// has no defined right axis.
pub const ELEVATION_LIMIT: f64 = FRAC_PI_2 - 0.01;

const WORLD_UP: Point3 = Point3::new(0.0, 1.0, 0.0);

/// Camera circling a target at a fixed distance.
///
/// Azimuth is measured around +Y starting from +Z, elevation up from the XZ
/// plane. Both are radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    pub target: Point3,
    azimuth: f64,
    elevation: f64,
    distance: f64,
    min_distance: f64,
    max_distance: f64,
    home: (f64, f64, f64),
}

impl OrbitCamera {
    pub fn new(azimuth: f64, elevation: f64, distance: f64, min_distance: f64, max_distance: f64) -> Result<Self> {
        if !(min_distance > 0.0 && min_distance <= max_distance && max_distance.is_finite()) {
            return Err(GeometryError::InvalidOrbit("orbit distance range must satisfy 0 < min <= max"));
        }
        if !(azimuth.is_finite() && elevation.is_finite() && distance.is_finite()) {
            return Err(GeometryError::InvalidOrbit("non-finite orbit parameters"));
        }
        let elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        let distance = distance.clamp(min_distance, max_distance);
        Ok(Self {
            target: Point3::new(0.0, 0.0, 0.0),
            azimuth,
            elevation,
            distance,
            min_distance,
            max_distance,
            home: (azimuth, elevation, distance),
        })
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Orbits by the given angles; elevation stops just short of the poles.
    pub fn rotate(&mut self, d_azimuth: f64, d_elevation: f64) {
        if d_azimuth.is_finite() {
            self.azimuth += d_azimuth;
        }
        if d_elevation.is_finite() {
            self.elevation = (self.elevation + d_elevation).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        }
    }

    /// Scales the distance by `1 + 0.1 * delta` (positive moves away).
    pub fn dolly(&mut self, delta: f64) {
        if delta.is_finite() {
            self.distance = (self.distance * (1.0 + delta * 0.1)).clamp(self.min_distance, self.max_distance);
        }
    }

    /// Moves the target in the XY plane.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.target.x += dx;
        self.target.y += dy;
    }

    /// Back to the construction angles and distance, centred on the origin.
    pub fn reset(&mut self) {
        let (azimuth, elevation, distance) = self.home;
        self.azimuth = azimuth;
        self.elevation = elevation;
        self.distance = distance;
        self.target = Point3::new(0.0, 0.0, 0.0);
    }

    pub fn eye(&self) -> Point3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target
            + Point3::new(
                self.distance * cos_el * sin_az,
                self.distance * sin_el,
                self.distance * cos_el * cos_az,
            )
    }

    pub fn view_matrix(&self) -> Result<Matrix4> {
        transform::look_at(self.eye(), self.target, WORLD_UP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}

/// Projection parameters shared by both projection kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub kind: ProjectionKind,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    pub near: f64,
    pub far: f64,
    /// Half the visible height of the orthographic view volume.
    pub ortho_half_height: f64,
}

impl Camera {
    /// Switches between perspective and orthographic and returns the new kind.
    pub fn toggle_projection(&mut self) -> ProjectionKind {
        self.kind = match self.kind {
            ProjectionKind::Perspective => ProjectionKind::Orthographic,
            ProjectionKind::Orthographic => ProjectionKind::Perspective,
        };
        self.kind
    }

    pub fn projection_matrix(&self, aspect: f64) -> Result<Matrix4> {
        match self.kind {
            ProjectionKind::Perspective => transform::perspective(self.fov_y, aspect, self.near, self.far),
            ProjectionKind::Orthographic => {
                let h = self.ortho_half_height;
                transform::orthographic(-h * aspect, h * aspect, -h, h, self.near, self.far)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::Perspective,
            fov_y: 45f64.to_radians(),
            near: 0.1,
            far: 100.0,
            ortho_half_height: 3.0,
        }
    }
}
