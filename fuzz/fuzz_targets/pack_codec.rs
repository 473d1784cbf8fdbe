#![no_main]

use libfuzzer_sys::fuzz_target;
use cuantizar::quant::{merge_int4, split_int8, split_raw_nibbles, split_uint8};
use ndarray::Array1;

/// Fuzz target for int4 packing
///
/// Splitting any byte must never panic, nibbles must stay in [-8, 8], and
/// re-merging signed nibbles must give back the original byte.
fuzz_target!(|bytes: Vec<u8>| {
    let unsigned = Array1::from(bytes.clone());
    let signed = unsigned.mapv(|b| b as i8);

    let (high, low) = split_int8(&signed.view());
    assert!(high.iter().chain(low.iter()).all(|&n| (-8..=8).contains(&n)));

    let merged = merge_int4(&high.view(), &low.view()).unwrap();
    assert_eq!(merged, signed);

    let (raw_high, raw_low) = split_uint8(&unsigned.view());
    for ((&b, &h), &l) in bytes.iter().zip(raw_high.iter()).zip(raw_low.iter()) {
        assert_eq!(split_raw_nibbles(b), (h, l));
    }
});
