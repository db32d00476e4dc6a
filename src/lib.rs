#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Curve and transform math for WebGL scenes.
//!
//! The host-testable core is plain Rust: [`bezier`] evaluates and tessellates
//! Bézier curves, [`transform`] builds column-major 4x4 matrices, and the
//! remaining modules layer cameras, playback state, primitive meshes and
//! configuration on top. The browser-facing bindings live in `wasm` and are
//! compiled only for wasm32.

pub mod animation;
pub mod bezier;
pub mod camera;
pub mod config;
pub mod error;
pub mod mesh;
pub mod point;
pub mod transform;

pub use bezier::{Algorithm, BezierCurve, CurveStage};
pub use error::GeometryError;
pub use point::{ControlPoint, Point2, Point3, PointList};
pub use transform::Matrix4;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    pub mod bindings;

    #[wasm_bindgen(start)]
    pub fn start() {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        // A second call (e.g. from tests that re-enter start) keeps the first logger.
        #[cfg(feature = "console_log")]
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("curvekit wasm module initialized");
    }
}
