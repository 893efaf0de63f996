//! ncsubset: variable subsetting for NetCDF and HDF5 files
//!
//! Satellite products such as TROPOMI L2 files carry hundreds of variables
//! spread over nested groups, while most analyses need a dozen. ncsubset
//! reads a chosen set of variables (data, dimensions and attributes) and
//! writes them to a new, much smaller NetCDF-4 file, either flat or with the
//! source group hierarchy recreated, optionally deflate-compressed.
//!
//! ## Key Features
//!
//! - **Format Detection**: NetCDF classic, 64-bit offset, CDF-5 and NetCDF-4/HDF5 by magic bytes
//! - **Group Paths**: Variables addressed as `GROUP/SUBGROUP/name`
//! - **All-or-nothing Selection**: Missing paths are reported before any data is read
//! - **Flat or Hierarchical Output**: With name-collision checks and renaming
//! - **Compression**: zlib/gzip deflate, level 0-9, with shuffle
//! - **Batch Processing**: Many files in parallel using Rayon
//!
//! ## Module Organization
//!
//! - [`path`]: Group and variable paths
//! - [`selection`]: Which variables to extract and what to call them
//! - [`data_source`]: Format detection and the read-only source abstraction
//! - [`metadata`]: Variable listing and description
//! - [`extract`]: Reading a selection into memory
//! - [`output`]: Output layout, naming and compression settings
//! - [`netcdf_io`]: NetCDF reading and writing
//! - [`config`]: JSON extraction requests
//! - [`parallel`]: Multi-file processing
//! - [`presets`]: Ready-made selections
//! - [`errors`]: Centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ncsubset::prelude::*;
//!
//! let selection = VariableSelection::from_paths([
//!     "PRODUCT/latitude",
//!     "PRODUCT/longitude",
//!     "PRODUCT/nitrogendioxide_tropospheric_column",
//! ])?;
//! let spec = OutputSpec::new("subsets")
//!     .preserve_groups()
//!     .with_compression(Compression::parse("zlib", Some(4))?);
//!
//! let output = extract_and_write("S5P_NO2.nc", &selection, &spec)?;
//! println!("wrote {}", output.display());
//! # Ok::<(), ncsubset::SubsetError>(())
//! ```

pub mod config;
pub mod data_source;
pub mod errors;
pub mod extract;
pub mod metadata;
pub mod netcdf_io;
pub mod output;
pub mod parallel;
pub mod path;
pub mod presets;
pub mod selection;
pub mod values;

pub use config::{ExtractionRequest, OutputOptions};
pub use data_source::{open_source, DataSource, SourceFormat, VariableContents};
pub use errors::{IoFailure, Result, SubsetError};
pub use extract::{
    extract, extract_and_write, extract_from, ExtractedVariable, ExtractionResult, GroupTree,
};
pub use metadata::{describe_variable, format_size, list_variables, DimensionInfo, VariableMetadata};
pub use output::{derive_output_name, Compression, CompressionScheme, Layout, OutputSpec};
pub use parallel::{process_files_parallel, BatchReport, ParallelConfig};
pub use path::{leaf_name, GroupPath, VariablePath, MAX_NAME_LEN};
pub use selection::{SelectionEntry, VariableSelection};
pub use values::{ArrayData, AttrValue, Attribute};

/// Common imports for typical use
pub mod prelude {
    pub use crate::config::{ExtractionRequest, OutputOptions};
    pub use crate::errors::{Result, SubsetError};
    pub use crate::extract::{extract, extract_and_write, ExtractionResult};
    pub use crate::output::{Compression, CompressionScheme, Layout, OutputSpec};
    pub use crate::parallel::{process_files_parallel, ParallelConfig};
    pub use crate::path::VariablePath;
    pub use crate::selection::VariableSelection;
}
