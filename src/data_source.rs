//! Data source abstraction for hierarchical array files
//!
//! A [`DataSource`] is an opened, read-only source file. [`open_source`] picks the
//! implementation by sniffing the file's magic bytes rather than trusting its
//! extension, so `.nc`, `.nc4`, `.h5` and extension-less files all work.

use crate::errors::{Result, SubsetError};
use crate::metadata::{DimensionInfo, VariableMetadata};
use crate::netcdf_io::NetCDFSource;
use crate::path::{GroupPath, VariablePath};
use crate::values::{ArrayData, Attribute};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// File families recognized by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// NetCDF classic (`CDF\x01`)
    Classic,
    /// NetCDF 64-bit offset (`CDF\x02`)
    Offset64,
    /// NetCDF 64-bit data, CDF-5 (`CDF\x05`)
    Cdf5,
    /// HDF5 container, which includes NetCDF-4
    Hdf5,
}

impl SourceFormat {
    /// Identifies the format from the first bytes of a file.
    pub fn from_magic(header: &[u8]) -> Option<Self> {
        match header {
            [b'C', b'D', b'F', 1, ..] => Some(SourceFormat::Classic),
            [b'C', b'D', b'F', 2, ..] => Some(SourceFormat::Offset64),
            [b'C', b'D', b'F', 5, ..] => Some(SourceFormat::Cdf5),
            h if h.starts_with(&HDF5_SIGNATURE) => Some(SourceFormat::Hdf5),
            _ => None,
        }
    }

    /// Reads the header of `path` and identifies its format.
    ///
    /// # Errors
    ///
    /// `FileAccess` when the file cannot be opened or read, `Format` when the
    /// header matches no known family.
    pub fn sniff(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| SubsetError::file_access(path, e))?;
        let mut header = Vec::with_capacity(HDF5_SIGNATURE.len());
        file.by_ref()
            .take(HDF5_SIGNATURE.len() as u64)
            .read_to_end(&mut header)
            .map_err(|e| SubsetError::file_access(path, e))?;

        Self::from_magic(&header).ok_or_else(|| {
            SubsetError::format(path, "unrecognized file signature (expected NetCDF or HDF5)")
        })
    }

    /// Whether the format can hold nested groups.
    pub fn supports_groups(self) -> bool {
        matches!(self, SourceFormat::Hdf5)
    }
}

/// Everything read from one variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableContents {
    pub data: ArrayData,
    pub dimensions: Vec<DimensionInfo>,
    pub attributes: Vec<Attribute>,
}

/// Read-only access to an opened source file
pub trait DataSource {
    /// Path the source was opened from.
    fn path(&self) -> &Path;

    fn format(&self) -> SourceFormat;

    /// All variable paths, depth first, in a stable order.
    fn list_variables(&self) -> Result<Vec<VariablePath>>;

    /// Whether a variable exists at `variable`.
    fn contains(&self, variable: &VariablePath) -> bool;

    /// Type, shape and attribute names of a variable, without its data.
    fn describe_variable(&self, variable: &VariablePath) -> Result<VariableMetadata>;

    /// Raw values, dimensions and attributes of a variable.
    fn read_variable(&self, variable: &VariablePath) -> Result<VariableContents>;

    /// Attributes of a group; the root group's are the global attributes.
    fn group_attributes(&self, group: &GroupPath) -> Result<Vec<Attribute>>;
}

/// Opens `path` with the implementation matching its format.
pub fn open_source(path: &Path) -> Result<Box<dyn DataSource>> {
    let format = SourceFormat::sniff(path)?;
    debug!(path = %path.display(), ?format, "opening source");
    match format {
        SourceFormat::Classic | SourceFormat::Offset64 | SourceFormat::Cdf5 | SourceFormat::Hdf5 => {
            Ok(Box::new(NetCDFSource::open(path, format)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_magic_bytes() {
        assert_eq!(SourceFormat::from_magic(b"CDF\x01rest"), Some(SourceFormat::Classic));
        assert_eq!(SourceFormat::from_magic(b"CDF\x02"), Some(SourceFormat::Offset64));
        assert_eq!(SourceFormat::from_magic(b"CDF\x05"), Some(SourceFormat::Cdf5));
        assert_eq!(SourceFormat::from_magic(&HDF5_SIGNATURE), Some(SourceFormat::Hdf5));
        assert_eq!(SourceFormat::from_magic(b"PK\x03\x04"), None);
        assert_eq!(SourceFormat::from_magic(b""), None);
    }

    #[test]
    fn only_hdf5_has_groups() {
        assert!(SourceFormat::Hdf5.supports_groups());
        assert!(!SourceFormat::Classic.supports_groups());
    }
}
