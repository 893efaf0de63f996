//! Defines command-line interface options using `clap` for the ncsubset binary.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Extract variable subsets from NetCDF / HDF5 files
#[derive(Parser, Debug)]
#[command(name = "ncsubset", version, about = "Extract variable subsets from NetCDF files")]
pub struct Args {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every variable path in a file
    List {
        /// Path to the NetCDF file
        file: PathBuf,
    },

    /// Describe a variable (data type, shape, and attributes)
    Describe {
        /// Path to the NetCDF file
        file: PathBuf,
        /// Variable path, e.g. PRODUCT/latitude
        variable: String,
    },

    /// Extract variables into new files
    Extract(ExtractArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ExtractArgs {
    /// Source files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// JSON request file with `variables` and `output` sections
    #[arg(long, conflicts_with_all = ["vars", "preset", "output_dir"])]
    pub config: Option<PathBuf>,

    /// Variable to extract, as PATH or NAME=PATH to rename it
    #[arg(long = "var", value_parser = parse_var_arg)]
    pub vars: Vec<(Option<String>, String)>,

    /// Named variable preset (e.g. tropomi-no2)
    #[arg(long, conflicts_with = "vars")]
    pub preset: Option<String>,

    /// Directory for the output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name (single input only); defaults to <stem>_SUB.<ext>
    #[arg(long)]
    pub name: Option<String>,

    /// Recreate the source group hierarchy instead of writing flat
    #[arg(long, default_value_t = false)]
    pub preserve_groups: bool,

    /// Compression scheme (zlib or gzip)
    #[arg(long)]
    pub compression: Option<String>,

    /// Compression level (0-9)
    #[arg(long)]
    pub level: Option<i64>,

    /// Disable the shuffle filter
    #[arg(long, default_value_t = false)]
    pub no_shuffle: bool,

    /// Number of threads for multi-file runs. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

fn parse_var_arg(s: &str) -> Result<(Option<String>, String), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((Some(name.to_string()), path.to_string()))
        }
        Some(_) => Err("Invalid format: Expected 'PATH' or 'NAME=PATH'.".to_string()),
        None if s.is_empty() => Err("Variable path is empty".to_string()),
        None => Ok((None, s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_var_arguments() {
        assert_eq!(
            parse_var_arg("PRODUCT/latitude").unwrap(),
            (None, "PRODUCT/latitude".to_string())
        );
        assert_eq!(
            parse_var_arg("lat=PRODUCT/latitude").unwrap(),
            (Some("lat".to_string()), "PRODUCT/latitude".to_string())
        );
        assert!(parse_var_arg("=PRODUCT/latitude").is_err());
        assert!(parse_var_arg("").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
