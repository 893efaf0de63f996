//! JSON extraction requests
//!
//! A request file names the variables to pull and the output options:
//!
//! ```json
//! {
//!   "variables": { "no2": "PRODUCT/nitrogendioxide_tropospheric_column" },
//!   "output": {
//!     "output_dir": "subsets",
//!     "preserve_groups": true,
//!     "compression": "zlib",
//!     "compression_level": 9
//!   }
//! }
//! ```

use crate::errors::{IoFailure, Result, SubsetError};
use crate::output::OutputSpec;
use crate::selection::VariableSelection;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn default_shuffle() -> bool {
    true
}

/// Output section of a request, before validation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub preserve_groups: bool,
    #[serde(default)]
    pub compression: Option<String>,
    #[serde(default)]
    pub compression_level: Option<i64>,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
}

impl OutputOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_name: None,
            preserve_groups: false,
            compression: None,
            compression_level: None,
            shuffle: default_shuffle(),
        }
    }

    /// Validates into an [`OutputSpec`].
    pub fn to_output_spec(&self) -> Result<OutputSpec> {
        let mut spec = OutputSpec::from_options(
            self.output_dir.clone(),
            self.output_name.clone(),
            self.preserve_groups,
            self.compression.as_deref(),
            self.compression_level,
        )?;
        spec.compression = spec.compression.map(|c| c.with_shuffle(self.shuffle));
        Ok(spec)
    }
}

/// A complete extraction request: what to select and where to write it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionRequest {
    pub variables: VariableSelection,
    pub output: OutputOptions,
}

impl ExtractionRequest {
    pub fn new(variables: VariableSelection, output: OutputOptions) -> Self {
        Self { variables, output }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let request: Self = serde_json::from_str(json)
            .map_err(|e| SubsetError::configuration(format!("Invalid request: {}", e)))?;
        request.output.to_output_spec()?;
        Ok(request)
    }

    /// Reads and validates a request file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| SubsetError::file_access(path, IoFailure::Io(e)))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{CompressionScheme, Layout};

    #[test]
    fn parses_full_request() {
        let request = ExtractionRequest::from_json_str(
            r#"{
                "variables": ["PRODUCT/latitude", "PRODUCT/longitude"],
                "output": {
                    "output_dir": "out",
                    "preserve_groups": true,
                    "compression": "zlib",
                    "compression_level": 9,
                    "shuffle": false
                }
            }"#,
        )
        .unwrap();

        assert_eq!(request.variables.len(), 2);
        let spec = request.output.to_output_spec().unwrap();
        assert_eq!(spec.layout, Layout::Hierarchical);
        let compression = spec.compression.unwrap();
        assert_eq!(compression.scheme, CompressionScheme::Zlib);
        assert_eq!(compression.level, 9);
        assert!(!compression.shuffle);
    }

    #[test]
    fn defaults_to_flat_uncompressed() {
        let request = ExtractionRequest::from_json_str(
            r#"{"variables": {"lat": "PRODUCT/latitude"}, "output": {"output_dir": "out"}}"#,
        )
        .unwrap();
        let spec = request.output.to_output_spec().unwrap();
        assert_eq!(spec.layout, Layout::Flat);
        assert!(spec.compression.is_none());
        assert!(spec.output_name.is_none());
    }

    #[test]
    fn invalid_compression_is_a_configuration_error() {
        let result = ExtractionRequest::from_json_str(
            r#"{"variables": ["a"], "output": {"output_dir": "out", "compression": "szip"}}"#,
        );
        assert!(matches!(result, Err(SubsetError::Configuration(_))));

        let result = ExtractionRequest::from_json_str(
            r#"{"variables": ["a"], "output": {"output_dir": "out", "compression": "zlib", "compression_level": 11}}"#,
        );
        assert!(matches!(result, Err(SubsetError::Configuration(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = ExtractionRequest::from_json_str(
            r#"{"variables": ["a"], "output": {"output_dir": "out", "fletcher": true}}"#,
        );
        assert!(matches!(result, Err(SubsetError::Configuration(_))));
    }
}
