//! NetCDF I/O: reading source files and writing subset files
//!
//! # Organization
//!
//! - [`reader`]: [`NetCDFSource`], the [`DataSource`](crate::data_source::DataSource)
//!   implementation for NetCDF classic and NetCDF-4/HDF5 files
//! - [`writer`]: [`NetCDFWriter`], which serializes an
//!   [`ExtractionResult`](crate::extract::ExtractionResult) in flat or hierarchical layout

pub mod reader;
pub mod writer;

pub use reader::NetCDFSource;
pub use writer::{write, NetCDFWriter};
