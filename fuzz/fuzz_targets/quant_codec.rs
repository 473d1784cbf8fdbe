#![no_main]

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use cuantizar::config::QuantSpec;
use cuantizar::quant::{dequantize_weight, quantize_weight};
use ndarray::ArrayD;

/// Fuzz target for the config-driven codecs
///
/// Arbitrary shapes, bit widths and group sizes must produce either an error
/// or codes of the input's shape, never a panic.
#[derive(Arbitrary, Debug)]
struct CodecFuzzInput {
    rows: u8,
    cols: u8,
    bits: u8,
    group_size: u8,
    symmetric: bool,
    grouped: bool,
    values: Vec<u8>,
}

fn bytes_to_f32(bytes: &[u8], size: usize) -> Vec<f32> {
    // Map 0..255 to -10.0..10.0 range
    bytes
        .iter()
        .cycle()
        .take(size)
        .map(|&b| ((b as f32) / 255.0) * 20.0 - 10.0)
        .collect()
}

fuzz_target!(|input: CodecFuzzInput| {
    let rows = (input.rows as usize % 32).max(1);
    let cols = (input.cols as usize % 32).max(1);
    if input.values.is_empty() {
        return;
    }

    let x = ArrayD::from_shape_vec(vec![rows, cols], bytes_to_f32(&input.values, rows * cols))
        .unwrap();

    let mut spec = if input.symmetric {
        QuantSpec::symmetric(input.bits % 10)
    } else {
        QuantSpec::asymmetric(input.bits % 10)
    };
    if input.grouped {
        spec = spec.with_group_size(input.group_size as usize % 8);
    }

    if let Ok(q) = quantize_weight(&x.view(), &spec) {
        assert_eq!(q.shape(), x.shape());
        let restored = dequantize_weight(&q, &spec).unwrap();
        assert_eq!(restored.shape(), x.shape());
    }
});
