//! Load quantization settings from YAML

use std::fs;
use std::path::Path;

use super::schema::QuantSpec;
use super::validate::validate_config;
use crate::error::{Error, Result};

/// Parse and validate a quantization spec from a YAML string
pub fn parse_config(yaml: &str) -> Result<QuantSpec> {
    let spec: QuantSpec = serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {}", e)))?;

    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {}", e)))?;

    Ok(spec)
}

/// Load quantization spec from YAML file
///
/// Read failures surface as [`Error::Io`]; parse and validation failures as
/// [`Error::ConfigError`].
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<QuantSpec> {
    let yaml_content = fs::read_to_string(config_path)?;
    parse_config(&yaml_content)
}
