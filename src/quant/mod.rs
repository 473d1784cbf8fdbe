//! Quantization codecs for checkpoint weights
//!
//! - Channel-wise symmetric (absmax) and asymmetric (min/max) codecs
//! - Group-wise driver over row groups of 2-D matrices
//! - Signed int4 packing, two values per byte
//! - Tensor-parallel shard slicing of scales and mins
//! - Interchangeable ndarray / trueno arithmetic backends

pub mod asymmetric;
mod backend;
mod dispatch;
pub mod group;
mod layout;
mod metrics;
mod pack;
mod params;
mod ratio;
mod shard;
mod stats;
pub mod symmetric;

pub use backend::{Backend, NdarrayBackend, NumericBackend, TruenoBackend};
pub use dispatch::{dequantize_weight, quantize_weight, QuantizedWeight};
pub use metrics::{max_abs_error, quantization_mse};
pub use pack::{
    merge_int4, merge_nibbles, pack_int4, split_int8, split_nibbles, split_raw_nibbles,
    split_uint8, unpack_int4,
};
pub use params::{asymmetric_bound, symmetric_bound, MAX_QUANT_BITS};
pub use ratio::{adam_update_ratio, variance_from_ratio, ADAM_EPSILON};
pub use shard::{slice_for_shard, Shard, ShardLayout};
pub use stats::{abs_max_per_channel, min_max_per_channel, EPSILON};
