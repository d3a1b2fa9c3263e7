use thiserror::Error;

/// Errors raised by the scoring engine itself.
///
/// Missing or insufficient data (no ratings, no interactions, no similar
/// items) is never an error; those are first-class states carried in the
/// response tag. These variants cover genuine contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("{attribute} {value} is outside the declared catalog bounds (max {max})")]
    InvalidAttribute {
        attribute: &'static str,
        value: u32,
        max: u32,
    },
}
