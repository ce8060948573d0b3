//! Errors for rejected workspace transitions.

/// A state transition the workspace refused to perform.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReviewError {
    /// Override counts were edited while override mode was off.
    #[error("override mode is not active")]
    OverrideInactive,

    /// An interval index outside `0..INTERVAL_COUNT` was addressed.
    #[error("interval index {index} out of range (0..{count})")]
    IntervalOutOfRange { index: usize, count: usize },

    /// Both calibration points landed on the same pixel.
    #[error("calibration points coincide; cannot derive a scale")]
    DegenerateCalibration,

    /// An item kind string was neither `palo` nor `mark`.
    #[error("unknown item kind `{0}`")]
    UnknownKind(String),
}
