//! Interchangeable numeric backends for the elementwise codec arithmetic
//!
//! - **ndarray**: general-purpose n-dimensional arrays
//! - **trueno**: multi-backend SIMD vectors
//!
//! Both perform the same IEEE-754 single-precision operation per element, so
//! selecting one over the other changes placement and speed, never values.

use std::fmt;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use trueno::vector::Vector;

use crate::{Error, Result};

/// Elementwise arithmetic used by the codecs
///
/// Slices are flattened, already-broadcast buffers of equal length.
pub trait NumericBackend: Send + Sync + fmt::Debug {
    /// Backend identifier for logs
    fn name(&self) -> &'static str;

    /// `a + b`
    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// `a - b`
    fn sub(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// `a * b`
    fn mul(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// `a / b`
    fn div(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// `a * s`
    fn mul_scalar(&self, a: &[f32], s: f32) -> Result<Vec<f32>>;

    /// `a / s` (a true division, not a multiply by the reciprocal)
    fn div_scalar(&self, a: &[f32], s: f32) -> Result<Vec<f32>>;
}

fn check_len(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::shape(&[a.len()], &[b.len()]));
    }
    Ok(())
}

/// ndarray strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct NdarrayBackend;

impl NumericBackend for NdarrayBackend {
    fn name(&self) -> &'static str {
        "ndarray"
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_len(a, b)?;
        Ok((&ArrayView1::from(a) + &ArrayView1::from(b)).to_vec())
    }

    fn sub(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_len(a, b)?;
        Ok((&ArrayView1::from(a) - &ArrayView1::from(b)).to_vec())
    }

    fn mul(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_len(a, b)?;
        Ok((&ArrayView1::from(a) * &ArrayView1::from(b)).to_vec())
    }

    fn div(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_len(a, b)?;
        Ok((&ArrayView1::from(a) / &ArrayView1::from(b)).to_vec())
    }

    fn mul_scalar(&self, a: &[f32], s: f32) -> Result<Vec<f32>> {
        Ok(ArrayView1::from(a).mapv(|v| v * s).to_vec())
    }

    fn div_scalar(&self, a: &[f32], s: f32) -> Result<Vec<f32>> {
        Ok(ArrayView1::from(a).mapv(|v| v / s).to_vec())
    }
}

/// trueno SIMD strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct TruenoBackend;

impl TruenoBackend {
    fn binary<F, E>(a: &[f32], b: &[f32], op: F) -> Result<Vec<f32>>
    where
        F: FnOnce(&Vector<f32>, &Vector<f32>) -> std::result::Result<Vector<f32>, E>,
        E: fmt::Display,
    {
        check_len(a, b)?;
        if a.is_empty() {
            return Ok(Vec::new());
        }
        let a_vec = Vector::from_slice(a);
        let b_vec = Vector::from_slice(b);
        let result = op(&a_vec, &b_vec).map_err(|e| Error::Backend(e.to_string()))?;
        Ok(result.as_slice().to_vec())
    }
}

impl NumericBackend for TruenoBackend {
    fn name(&self) -> &'static str {
        "trueno"
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        Self::binary(a, b, |x, y| x.add(y))
    }

    fn sub(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        Self::binary(a, b, |x, y| x.sub(y))
    }

    fn mul(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        Self::binary(a, b, |x, y| x.mul(y))
    }

    fn div(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        Self::binary(a, b, |x, y| x.div(y))
    }

    fn mul_scalar(&self, a: &[f32], s: f32) -> Result<Vec<f32>> {
        if a.is_empty() {
            return Ok(Vec::new());
        }
        let scaled = Vector::from_slice(a)
            .scale(s)
            .map_err(|e| Error::Backend(e.to_string()))?;
        Ok(scaled.as_slice().to_vec())
    }

    fn div_scalar(&self, a: &[f32], s: f32) -> Result<Vec<f32>> {
        Self::binary(a, &vec![s; a.len()], |x, y| x.div(y))
    }
}

/// Backend selector carried in configs and passed to every codec call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ndarray (default)
    #[default]
    Ndarray,
    /// trueno SIMD
    Trueno,
}

impl Backend {
    /// Strategy implementing this selection
    pub fn ops(self) -> &'static dyn NumericBackend {
        match self {
            Backend::Ndarray => &NdarrayBackend,
            Backend::Trueno => &TruenoBackend,
        }
    }
}
