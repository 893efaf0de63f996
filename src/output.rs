//! Output options: where to write, which layout, and how to compress
//!
//! An [`OutputSpec`] is validated as a whole before the writer touches the
//! filesystem, so a bad compression setting never leaves a stray file behind.

use crate::errors::{Result, SubsetError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Suffix appended to the input file stem when no output name is given
pub const SUBSET_SUFFIX: &str = "_SUB";

/// Compression level used when a scheme is given without one
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 4;

/// Highest deflate level
pub const MAX_DEFLATE_LEVEL: u8 = 9;

/// How selected variables are arranged in the output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Every variable at the file root under its output name
    #[default]
    Flat,
    /// Every variable inside a copy of its source group path
    Hierarchical,
}

impl Layout {
    pub fn from_preserve_groups(preserve_groups: bool) -> Self {
        if preserve_groups {
            Layout::Hierarchical
        } else {
            Layout::Flat
        }
    }
}

/// Lossless compression schemes the NetCDF backend can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    Zlib,
    /// Same deflate filter as `Zlib`, accepted under its HDF5 name
    Gzip,
}

impl CompressionScheme {
    pub fn name(self) -> &'static str {
        match self {
            CompressionScheme::Zlib => "zlib",
            CompressionScheme::Gzip => "gzip",
        }
    }

    /// Valid level range for the scheme.
    pub fn level_range(self) -> std::ops::RangeInclusive<u8> {
        match self {
            CompressionScheme::Zlib | CompressionScheme::Gzip => 0..=MAX_DEFLATE_LEVEL,
        }
    }
}

impl fmt::Display for CompressionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionScheme {
    type Err = SubsetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zlib" | "deflate" => Ok(CompressionScheme::Zlib),
            "gzip" => Ok(CompressionScheme::Gzip),
            "lzf" | "szip" => Err(SubsetError::configuration(format!(
                "Compression scheme '{}' cannot be written by the NetCDF backend; use zlib or gzip",
                s
            ))),
            _ => Err(SubsetError::configuration(format!(
                "Unsupported compression: '{}'. Valid options: zlib, gzip",
                s
            ))),
        }
    }
}

/// Per-variable compression applied at write time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub scheme: CompressionScheme,
    pub level: u8,
    /// Byte-shuffle filter ahead of deflate
    pub shuffle: bool,
}

impl Compression {
    /// Builds a validated compression setting with shuffle enabled.
    pub fn new(scheme: CompressionScheme, level: u8) -> Result<Self> {
        let compression = Self {
            scheme,
            level,
            shuffle: true,
        };
        compression.validate()?;
        Ok(compression)
    }

    /// Parses a scheme name and optional level (default 4).
    pub fn parse(scheme: &str, level: Option<i64>) -> Result<Self> {
        let scheme: CompressionScheme = scheme.parse()?;
        let level = match level {
            None => DEFAULT_COMPRESSION_LEVEL,
            Some(level) => u8::try_from(level).map_err(|_| level_error(scheme, level))?,
        };
        Self::new(scheme, level)
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheme.level_range().contains(&self.level) {
            Ok(())
        } else {
            Err(level_error(self.scheme, i64::from(self.level)))
        }
    }
}

fn level_error(scheme: CompressionScheme, level: i64) -> SubsetError {
    let range = scheme.level_range();
    SubsetError::configuration(format!(
        "Compression level {} is outside {}..={} for {}",
        level,
        range.start(),
        range.end(),
        scheme
    ))
}

/// Where and how an extraction result is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub output_dir: PathBuf,
    /// File name inside `output_dir`; derived from the source when `None`
    pub output_name: Option<String>,
    pub layout: Layout,
    pub compression: Option<Compression>,
}

impl OutputSpec {
    /// Flat, uncompressed output into `output_dir` with a derived name.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_name: None,
            layout: Layout::default(),
            compression: None,
        }
    }

    /// Builds output settings from loosely typed options, validating compression.
    ///
    /// A level without a scheme is rejected rather than silently ignored.
    pub fn from_options(
        output_dir: impl Into<PathBuf>,
        output_name: Option<String>,
        preserve_groups: bool,
        compression: Option<&str>,
        compression_level: Option<i64>,
    ) -> Result<Self> {
        let compression = match (compression, compression_level) {
            (Some(scheme), level) => Some(Compression::parse(scheme, level)?),
            (None, Some(level)) => {
                return Err(SubsetError::configuration(format!(
                    "Compression level {} given without a compression scheme",
                    level
                )))
            }
            (None, None) => None,
        };
        let spec = Self {
            output_dir: output_dir.into(),
            output_name,
            layout: Layout::from_preserve_groups(preserve_groups),
            compression,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn preserve_groups(self) -> Self {
        self.with_layout(Layout::Hierarchical)
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Checks everything that can be checked without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if let Some(compression) = &self.compression {
            compression.validate()?;
        }
        if let Some(name) = &self.output_name {
            let bare = Path::new(name).file_name().map(|n| n == name.as_str());
            if name.trim().is_empty() || bare != Some(true) {
                return Err(SubsetError::configuration(format!(
                    "Output name '{}' must be a plain file name",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Full output path for a result extracted from `source`.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let name = match &self.output_name {
            Some(name) => name.clone(),
            None => derive_output_name(source),
        };
        self.output_dir.join(name)
    }
}

/// `<stem>_SUB.<ext>`, keeping the source extension (`nc` when it has none).
pub fn derive_output_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let extension = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "nc".to_string());
    format!("{}{}.{}", stem, SUBSET_SUFFIX, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_sub_suffix_name() {
        assert_eq!(
            derive_output_name(Path::new("/data/S5P_OFFL_L2__NO2.nc")),
            "S5P_OFFL_L2__NO2_SUB.nc"
        );
        assert_eq!(derive_output_name(Path::new("granule.h5")), "granule_SUB.h5");
        assert_eq!(derive_output_name(Path::new("granule")), "granule_SUB.nc");
    }

    #[test]
    fn output_path_prefers_explicit_name() {
        let spec = OutputSpec::new("/tmp/out").with_name("custom.nc");
        assert_eq!(spec.output_path(Path::new("in.nc")), PathBuf::from("/tmp/out/custom.nc"));
        let spec = OutputSpec::new("/tmp/out");
        assert_eq!(spec.output_path(Path::new("a/in.nc")), PathBuf::from("/tmp/out/in_SUB.nc"));
    }

    #[test]
    fn parses_compression_schemes() {
        assert_eq!("zlib".parse::<CompressionScheme>().unwrap(), CompressionScheme::Zlib);
        assert_eq!("GZIP".parse::<CompressionScheme>().unwrap(), CompressionScheme::Gzip);
        assert!(matches!("lzf".parse::<CompressionScheme>(), Err(SubsetError::Configuration(_))));
        assert!(matches!("brotli".parse::<CompressionScheme>(), Err(SubsetError::Configuration(_))));
    }

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(Compression::parse("zlib", Some(10)).is_err());
        assert!(Compression::parse("zlib", Some(-1)).is_err());
        assert_eq!(Compression::parse("zlib", None).unwrap().level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(Compression::parse("gzip", Some(9)).unwrap().level, 9);
        let forged = Compression {
            scheme: CompressionScheme::Zlib,
            level: 12,
            shuffle: false,
        };
        assert!(OutputSpec::new("out").with_compression(forged).validate().is_err());
    }

    #[test]
    fn from_options_checks_level_without_scheme() {
        let err = OutputSpec::from_options("out", None, true, None, Some(5)).unwrap_err();
        assert!(matches!(err, SubsetError::Configuration(_)));

        let spec = OutputSpec::from_options("out", None, true, Some("zlib"), Some(6)).unwrap();
        assert_eq!(spec.layout, Layout::Hierarchical);
        assert_eq!(spec.compression.map(|c| c.level), Some(6));
    }

    #[test]
    fn output_name_must_be_a_file_name() {
        assert!(OutputSpec::new("out").with_name("nested/file.nc").validate().is_err());
        assert!(OutputSpec::new("out").with_name("  ").validate().is_err());
        assert!(OutputSpec::new("out").with_name("file.nc").validate().is_ok());
    }
}
