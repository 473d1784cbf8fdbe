//! Round-trip error metrics

use ndarray::ArrayViewD;

use crate::{Error, Result};

fn check_shapes(original: &ArrayViewD<f32>, restored: &ArrayViewD<f32>) -> Result<()> {
    if original.shape() != restored.shape() {
        return Err(Error::shape(original.shape(), restored.shape()));
    }
    if original.is_empty() {
        return Err(Error::InvalidParameter("empty tensor".to_string()));
    }
    Ok(())
}

/// Mean squared error between a tensor and its dequantized version
pub fn quantization_mse(original: &ArrayViewD<f32>, restored: &ArrayViewD<f32>) -> Result<f32> {
    check_shapes(original, restored)?;
    let sum_sq: f32 = original
        .iter()
        .zip(restored.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    Ok(sum_sq / original.len() as f32)
}

/// Largest elementwise absolute error
pub fn max_abs_error(original: &ArrayViewD<f32>, restored: &ArrayViewD<f32>) -> Result<f32> {
    check_shapes(original, restored)?;
    Ok(original
        .iter()
        .zip(restored.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f32::max))
}
