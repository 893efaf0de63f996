//! Entry point for the ncsubset binary.
//! Parses the command line, sets up logging and dispatches to the library.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Args, Command, ExtractArgs};
use ncsubset::prelude::*;
use ncsubset::{describe_variable, format_size, list_variables, presets};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::List { file } => {
            for path in list_variables(&file)? {
                println!("{}", path);
            }
        }
        Command::Describe { file, variable } => describe(&file, &variable)?,
        Command::Extract(extract_args) => run_extract(extract_args)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn describe(file: &std::path::Path, variable: &str) -> Result<()> {
    let path = VariablePath::parse(variable)?;
    let meta = describe_variable(file, &path)?;

    println!("Variable: {}", meta.path);
    println!("  Data type: {}", meta.data_type);
    if meta.is_scalar() {
        println!("  Dimensions: (scalar)");
    } else {
        let dims: Vec<String> = meta
            .dimensions
            .iter()
            .map(|d| {
                if d.is_unlimited {
                    format!("{}={} (unlimited)", d.name, d.length)
                } else {
                    format!("{}={}", d.name, d.length)
                }
            })
            .collect();
        println!("  Dimensions: [{}]", dims.join(", "));
    }
    println!("  Attributes: {}", meta.attribute_names.join(", "));
    println!("  Total elements: {}", meta.total_elements);
    println!("  Estimated size: {}", format_size(meta.estimated_size_bytes));
    Ok(())
}

fn build_request(args: &ExtractArgs) -> Result<ExtractionRequest> {
    if let Some(config) = &args.config {
        let mut request = ExtractionRequest::from_json_file(config)
            .with_context(|| format!("loading {}", config.display()))?;
        if args.name.is_some() {
            request.output.output_name = args.name.clone();
        }
        return Ok(request);
    }

    let variables = match (&args.preset, args.vars.is_empty()) {
        (Some(preset), _) => match presets::by_name(preset) {
            Some(selection) => selection?,
            None => bail!("unknown preset '{}'", preset),
        },
        (None, false) => VariableSelection::from_mapping(
            args.vars
                .iter()
                .map(|(name, path)| (name.clone().unwrap_or_else(|| path.clone()), path.as_str())),
        )?,
        (None, true) => bail!("nothing to extract: pass --var, --preset or --config"),
    };

    let Some(output_dir) = args.output_dir.clone() else {
        bail!("--output-dir is required without --config");
    };

    let output = OutputOptions {
        output_dir,
        output_name: args.name.clone(),
        preserve_groups: args.preserve_groups,
        compression: args.compression.clone(),
        compression_level: args.level,
        shuffle: !args.no_shuffle,
    };
    Ok(ExtractionRequest::new(variables, output))
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let request = build_request(&args)?;

    if let [file] = args.files.as_slice() {
        let spec = request.output.to_output_spec()?;
        let output = extract_and_write(file, &request.variables, &spec)?;
        println!("{}", output.display());
        return Ok(());
    }

    let config = ParallelConfig::new(args.threads);
    let report = process_files_parallel(&args.files, &request, &config)?;
    for (_, output) in &report.successful {
        println!("{}", output.display());
    }
    for (file, error) in &report.failed {
        eprintln!("{}: {}", file.display(), error);
    }
    if !report.all_succeeded() {
        bail!("{} of {} files failed", report.failed.len(), report.total());
    }
    Ok(())
}
