//! # Cuantizar: Checkpoint Weight Quantization
//!
//! Cuantizar shrinks model checkpoint tensors to low-bit integer codes and
//! restores them to floating point on load, including on a single
//! tensor-parallel shard of a larger tensor.
//!
//! ## Architecture
//!
//! - **quant**: channel-wise and group-wise codecs, statistics, int4 packing,
//!   shard slicing, numeric backends
//! - **config**: declarative YAML quantization settings
//!
//! ## Example
//!
//! ```
//! use cuantizar::config::QuantSpec;
//! use cuantizar::quant::{dequantize_weight, quantize_weight};
//! use ndarray::arr2;
//!
//! let w = arr2(&[[0.5f32, -1.0], [2.0, 0.25]]).into_dyn();
//! let spec = QuantSpec::symmetric(8).with_group_size(2);
//!
//! let q = quantize_weight(&w.view(), &spec).unwrap();
//! let restored = dequantize_weight(&q, &spec).unwrap();
//! assert_eq!(restored.shape(), w.shape());
//! ```

pub mod config;
pub mod quant;

pub mod error;

// Re-export commonly used types
pub use config::QuantSpec;
pub use error::{Error, Result};
pub use quant::{Backend, QuantizedWeight, Shard};
