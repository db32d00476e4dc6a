//! Playback state for a point travelling along a curve.
//!
//! The render loop owns one [`CurveAnimation`] and calls
//! [`CurveAnimation::step`] once per frame with the elapsed time.

use crate::bezier::BezierCurve;
use crate::error::Result;
use crate::point::{ControlPoint, Point3};
use crate::transform::{rotation_y, scaling, translation, Matrix4};
use serde::{Deserialize, Serialize};

/// What happens when `t` runs past the end of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Jump back to the start.
    #[default]
    Wrap,
    /// Reverse direction at either end.
    PingPong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveAnimation {
    t: f64,
    playing: bool,
    /// Curve parameter units per second.
    speed: f64,
    mode: PlaybackMode,
    direction: f64,
}

impl CurveAnimation {
    pub fn new(speed: f64, mode: PlaybackMode) -> Self {
        let mut anim = Self {
            t: 0.0,
            playing: false,
            speed: 0.0,
            mode,
            direction: 1.0,
        };
        anim.set_speed(speed);
        anim
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flips between playing and paused and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn reset(&mut self) {
        self.t = 0.0;
        self.direction = 1.0;
    }

    /// Scrubs to `t`, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_t(&mut self, t: f64) {
        if t.is_finite() {
            self.t = t.clamp(0.0, 1.0);
        }
    }

    /// Negative or non-finite speeds stop the animation in place.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
        self.direction = 1.0;
    }

    /// Advances `t` by `speed * dt` when playing and returns the new `t`.
    pub fn step(&mut self, dt_seconds: f64) -> f64 {
        if !self.playing || !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return self.t;
        }

        let delta = self.speed * dt_seconds;
        match self.mode {
            PlaybackMode::Wrap => {
                self.t += delta;
                if self.t > 1.0 {
                    self.t -= (self.t - 1.0).ceil();
                }
            }
            PlaybackMode::PingPong => {
                self.t += delta * self.direction;
                if self.t >= 1.0 {
                    self.t = 1.0;
                    self.direction = -1.0;
                } else if self.t <= 0.0 {
                    self.t = 0.0;
                    self.direction = 1.0;
                }
            }
        }
        self.t
    }

    /// Curve point at the current `t`.
    pub fn position<P: ControlPoint>(&self, curve: &BezierCurve<P>) -> Result<P> {
        curve.evaluate(self.t)
    }

    /// Curve tangent at the current `t`.
    pub fn heading<P: ControlPoint>(&self, curve: &BezierCurve<P>) -> Result<P> {
        curve.tangent(self.t)
    }

    /// Model matrix for the marker riding the curve: placed at the current
    /// position, yawed about +Y to face along the tangent's XZ projection,
    /// and scaled to [`MARKER_SCALE`].
    ///
    /// A tangent parallel to Y leaves the marker unrotated.
    pub fn model_matrix(&self, curve: &BezierCurve<Point3>) -> Result<Matrix4> {
        let p = self.position(curve)?;
        let heading = self.heading(curve)?;

        let mut model = translation(p.x, p.y, p.z);
        if heading.x != 0.0 || heading.z != 0.0 {
            model = model * rotation_y(heading.x.atan2(heading.z));
        }
        Ok(model * scaling(MARKER_SCALE, MARKER_SCALE, MARKER_SCALE))
    }
}

/// Uniform scale of the marker placed by [`CurveAnimation::model_matrix`].
pub const MARKER_SCALE: f64 = 0.3;

impl Default for CurveAnimation {
    fn default() -> Self {
        Self::new(0.2, PlaybackMode::Wrap)
    }
}
