//! Error types for curve and transform math.
//!
//! Every variant is a precondition violation: the math itself never fails
//! once its inputs are valid, so there is nothing to retry.

use thiserror::Error;

/// Rejected input to a curve, matrix, camera or mesh operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A curve needs at least one control point
    #[error("curve has no control points")]
    EmptyControlPoints,

    #[error("curve parameter must be finite, got {0}")]
    NonFiniteParameter(f64),

    #[error("control point {0} has a non-finite coordinate")]
    NonFiniteControlPoint(usize),

    #[error("tessellation needs at least one segment")]
    ZeroSegments,

    /// Bernstein weights must cover every control point
    #[error("expected {expected} binomial coefficients, got {found}")]
    CoefficientCount { expected: usize, found: usize },

    /// Projection bounds that would divide by zero or produce inf/NaN
    #[error("degenerate projection: {0}")]
    DegenerateProjection(&'static str),

    /// Look-at basis could not be normalised (eye on target or up parallel to forward)
    #[error("degenerate camera basis: {0}")]
    DegenerateBasis(&'static str),

    #[error("tessellation level must be at least 1")]
    ZeroTessellation,

    #[error("sweep angle must be in (0, 2π], got {0}")]
    InvalidSweepAngle(f64),

    /// Bernstein rows past this degree overflow `f64`
    #[error("curve degree {degree} exceeds the supported maximum of {max}")]
    DegreeTooHigh { degree: usize, max: usize },

    /// Orbit distance range or starting angles unusable
    #[error("invalid orbit: {0}")]
    InvalidOrbit(&'static str),

    #[error("OBJ line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("control point index {index} out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("point has w = 0 and cannot be projected")]
    PointAtInfinity,

    #[error("control points mix 2D and 3D: {spatial} of {total} have a z coordinate")]
    MixedDimensions { spatial: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
