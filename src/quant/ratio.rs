//! Adam optimizer-state update ratio
//!
//! Checkpoints that quantize optimizer moments store the second moment as the
//! per-element update ratio `1 / (sqrt(v) + eps)` instead of `v` itself.

use ndarray::{ArrayD, ArrayViewD};

/// Adam's default epsilon
pub const ADAM_EPSILON: f32 = 1e-8;

/// `1 / (sqrt(v) + eps)` elementwise
pub fn adam_update_ratio(variance: &ArrayViewD<f32>, eps: f32) -> ArrayD<f32> {
    variance.mapv(|v| 1.0 / (v.sqrt() + eps))
}

/// Inverse of [`adam_update_ratio`]: recover `v` from a stored ratio
pub fn variance_from_ratio(ratio: &ArrayViewD<f32>, eps: f32) -> ArrayD<f32> {
    ratio.mapv(|r| (1.0 / r - eps).max(0.0).powi(2))
}
