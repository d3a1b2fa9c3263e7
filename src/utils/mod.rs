use crate::error::EngineError;

pub mod metrics;
pub mod validation;

/// Cosine similarity between two equal-length vectors, in [-1, 1].
///
/// Comparing vectors of different lengths is a programmer error and fails
/// loudly. A zero-magnitude vector carries no signal and compares as
/// exactly 0.0 against anything, which also sidesteps the divide-by-zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EngineError> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}
