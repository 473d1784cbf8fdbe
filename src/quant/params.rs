//! Bit-width bounds and the shared round/clip step

use crate::{Error, Result};

/// Widest quantized element supported (everything fits in `i8` / `u8`)
pub const MAX_QUANT_BITS: u8 = 8;

/// Largest symmetric level: `bnt = 2^(bits-1) - 1`
///
/// Symmetric codes live in `[-bnt - 1, bnt]`. One bit leaves no magnitude, so
/// `bits` must be in `2..=8`.
pub fn symmetric_bound(bits: u8) -> Result<i32> {
    if !(2..=MAX_QUANT_BITS).contains(&bits) {
        return Err(Error::InvalidParameter(format!(
            "symmetric quantization needs 2..={MAX_QUANT_BITS} bits, got {bits}"
        )));
    }
    Ok((1i32 << (bits - 1)) - 1)
}

/// Largest asymmetric level: `qmax = 2^bits - 1` (with `qmin = 0`)
pub fn asymmetric_bound(bits: u8) -> Result<i32> {
    if !(1..=MAX_QUANT_BITS).contains(&bits) {
        return Err(Error::InvalidParameter(format!(
            "asymmetric quantization needs 1..={MAX_QUANT_BITS} bits, got {bits}"
        )));
    }
    Ok((1i32 << bits) - 1)
}

/// Round half to even, then clip. NaN passes through untouched.
#[inline]
pub(crate) fn round_clip(value: f32, lo: f32, hi: f32) -> f32 {
    value.round_ties_even().clamp(lo, hi)
}
