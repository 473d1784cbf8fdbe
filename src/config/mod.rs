//! Declarative YAML configuration
//!
//! # Example
//!
//! ```yaml
//! bits: 4
//! symmetric: false
//! group_size: 64
//! backend: trueno
//! shard:
//!   rank: 0
//!   degree: 2
//! ```

mod load;
mod schema;
mod validate;

pub use load::{load_config, parse_config};
pub use schema::QuantSpec;
pub use validate::{validate_config, ValidationError};
