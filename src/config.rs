//! Scene configuration loaded from JSON.
//!
//! Angles are stored in degrees here because that is what the UI sliders
//! produce; they are converted to radians exactly once, when the camera and
//! orbit are built.

use crate::animation::{CurveAnimation, PlaybackMode};
use crate::bezier::Algorithm;
use crate::camera::{Camera, OrbitCamera, ProjectionKind};
use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub segments: usize,
    pub algorithm: Algorithm,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            segments: 100,
            algorithm: Algorithm::DeCasteljau,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub projection: ProjectionKind,
    pub fov_y_degrees: f64,
    pub near: f64,
    pub far: f64,
    pub ortho_half_height: f64,
    pub distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub azimuth_degrees: f64,
    pub elevation_degrees: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            ortho_half_height: 3.0,
            distance: 8.0,
            min_distance: 2.0,
            max_distance: 30.0,
            azimuth_degrees: 40.0,
            elevation_degrees: 23.0,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera {
            kind: self.projection,
            fov_y: self.fov_y_degrees.to_radians(),
            near: self.near,
            far: self.far,
            ortho_half_height: self.ortho_half_height,
        }
    }

    pub fn to_orbit(&self) -> Result<OrbitCamera, ConfigError> {
        Ok(OrbitCamera::new(
            self.azimuth_degrees.to_radians(),
            self.elevation_degrees.to_radians(),
            self.distance,
            self.min_distance,
            self.max_distance,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Curve parameter units per second.
    pub speed: f64,
    pub mode: PlaybackMode,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: 0.2,
            mode: PlaybackMode::Wrap,
        }
    }
}

impl AnimationConfig {
    pub fn to_animation(&self) -> CurveAnimation {
        CurveAnimation::new(self.speed, self.mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub curve: CurveConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            curve: CurveConfig::default(),
            camera: CameraConfig::default(),
            animation: AnimationConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl SceneConfig {
    /// Parses and validates a config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.curve.segments == 0 {
            return Err(ConfigError::Invalid("curve.segments must be at least 1".into()));
        }
        let cam = &self.camera;
        if !(cam.near < cam.far) {
            return Err(ConfigError::Invalid(format!(
                "camera.near ({}) must be less than camera.far ({})",
                cam.near, cam.far
            )));
        }
        if !(cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_y_degrees must be in (0, 180), got {}",
                cam.fov_y_degrees
            )));
        }
        if !(cam.ortho_half_height > 0.0) {
            return Err(ConfigError::Invalid("camera.ortho_half_height must be positive".into()));
        }
        if !(self.animation.speed > 0.0 && self.animation.speed.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "animation.speed must be positive, got {}",
                self.animation.speed
            )));
        }
        self.level_filter()?;
        cam.to_orbit()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level '{}'", self.log_level)))
    }
}
