//! Variable listing and description
//!
//! This module answers "what is in this file?": the full set of addressable
//! variable paths, and per-variable type/shape/attribute summaries.

use crate::data_source::open_source;
use crate::errors::Result;
use crate::path::VariablePath;
use std::path::Path;
use tracing::debug;

/// Information about a dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// Structured metadata for one variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMetadata {
    pub path: VariablePath,
    pub data_type: String,
    pub dimensions: Vec<DimensionInfo>,
    pub attribute_names: Vec<String>,
    pub total_elements: usize,
    pub estimated_size_bytes: usize,
}

impl VariableMetadata {
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.length).collect()
    }

    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }
}

/// Lists every variable path in the file, depth first.
///
/// Within a group the variables come first in name order, followed by the
/// sub-groups in name order. Repeated calls on an unmodified file return the
/// same sequence.
///
/// # Errors
///
/// `FileAccess` if the file cannot be opened, `Format` if it is not a NetCDF
/// or HDF5 file.
pub fn list_variables(source_path: impl AsRef<Path>) -> Result<Vec<VariablePath>> {
    let source = open_source(source_path.as_ref())?;
    let variables = source.list_variables()?;
    debug!(
        path = %source_path.as_ref().display(),
        count = variables.len(),
        "listed variables"
    );
    Ok(variables)
}

/// Describes one variable without reading its data.
pub fn describe_variable(
    source_path: impl AsRef<Path>,
    variable: &VariablePath,
) -> Result<VariableMetadata> {
    let source = open_source(source_path.as_ref())?;
    source.describe_variable(variable)
}

/// Formats a byte count the way humans read it.
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
