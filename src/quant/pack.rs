//! Signed int4 packing: two 4-bit values per byte
//!
//! Byte layout: `[high nibble | low nibble]`, each a two's-complement value in
//! `[-8, 7]`.

use ndarray::{concatenate, Array, ArrayD, ArrayView, ArrayViewD, Axis, Dimension, Zip};

use crate::{Error, Result};

/// Merge two signed nibbles into one byte
///
/// Inputs outside `[-8, 7]` are truncated by the shift and mask.
#[inline]
pub fn merge_nibbles(high: i8, low: i8) -> i8 {
    (high << 4) | (low & 0x0F)
}

fn split_wide(byte: i16) -> (i8, i8) {
    let mut high = byte >> 4;
    let low = byte & 0x0F;
    if high > 8 {
        high -= 16;
    }
    let low = if low > 7 { low - 16 } else { low };
    (high as i8, low as i8)
}

/// Split a signed byte into its `(high, low)` nibbles
#[inline]
pub fn split_nibbles(byte: i8) -> (i8, i8) {
    split_wide(i16::from(byte))
}

/// Split a raw unsigned byte into `(high, low)` nibbles
///
/// The high nibble is logically shifted, so `9..=15` is folded back to
/// `-7..=-1` while `8` stays `8`.
#[inline]
pub fn split_raw_nibbles(byte: u8) -> (i8, i8) {
    split_wide(i16::from(byte))
}

/// Elementwise [`merge_nibbles`] over two tensors of equal shape
pub fn merge_int4<D: Dimension>(
    high: &ArrayView<i8, D>,
    low: &ArrayView<i8, D>,
) -> Result<Array<i8, D>> {
    if high.shape() != low.shape() {
        return Err(Error::shape(high.shape(), low.shape()));
    }
    Ok(Zip::from(high).and(low).map_collect(|&h, &l| merge_nibbles(h, l)))
}

/// Elementwise [`split_nibbles`]: returns `(high, low)` tensors
pub fn split_int8<D: Dimension>(packed: &ArrayView<i8, D>) -> (Array<i8, D>, Array<i8, D>) {
    (
        packed.mapv(|b| split_nibbles(b).0),
        packed.mapv(|b| split_nibbles(b).1),
    )
}

/// Elementwise [`split_raw_nibbles`] for packed bytes stored unsigned
pub fn split_uint8<D: Dimension>(packed: &ArrayView<u8, D>) -> (Array<i8, D>, Array<i8, D>) {
    (
        packed.mapv(|b| split_raw_nibbles(b).0),
        packed.mapv(|b| split_raw_nibbles(b).1),
    )
}

/// Pack a 4-bit tensor into half as many bytes along axis 0
///
/// The first half of the rows becomes the high nibbles and the second half
/// the low nibbles. Axis 0 must have even length.
pub fn pack_int4(q: &ArrayViewD<i8>) -> Result<ArrayD<i8>> {
    let rows = match q.shape().first() {
        Some(&rows) => rows,
        None => {
            return Err(Error::InvalidParameter(
                "cannot pack a 0-d tensor".to_string(),
            ))
        }
    };
    if rows % 2 != 0 {
        let mut expected = q.shape().to_vec();
        expected[0] = rows + 1;
        return Err(Error::shape(&expected, q.shape()));
    }
    let (high, low) = q.view().split_at(Axis(0), rows / 2);
    merge_int4(&high, &low)
}

/// Inverse of [`pack_int4`]
pub fn unpack_int4(packed: &ArrayViewD<i8>) -> Result<ArrayD<i8>> {
    if packed.ndim() == 0 {
        return Err(Error::InvalidParameter(
            "cannot unpack a 0-d tensor".to_string(),
        ));
    }
    let (high, low) = split_int8(packed);
    Ok(concatenate(Axis(0), &[high.view(), low.view()])?)
}
