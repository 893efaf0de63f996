//! Batch extraction over many files
//!
//! Each file is an independent request with its own source and destination
//! handles. Requests run on a dedicated Rayon pool; one file failing does not
//! stop the others.

use crate::config::ExtractionRequest;
use crate::errors::{Result, SubsetError};
use crate::extract::extract_and_write;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Worker count; `None` uses every available core
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Create a configuration that uses all available CPU cores
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Number of workers the pool will get.
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        let threads = self.effective_threads();
        if threads == 0 {
            return Err(SubsetError::configuration(
                "Parallel processing needs at least one thread",
            ));
        }
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| {
                SubsetError::configuration(format!(
                    "Failed to initialize thread pool with {} threads: {}",
                    threads, e
                ))
            })
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(source, output)` pairs, in input order
    pub successful: Vec<(PathBuf, PathBuf)>,
    /// `(source, error)` pairs, in input order
    pub failed: Vec<(PathBuf, SubsetError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs `request` against every file in `files` in parallel.
///
/// # Errors
///
/// Only pool setup and request validation fail the call as a whole; per-file
/// failures are collected in [`BatchReport::failed`].
pub fn process_files_parallel(
    files: &[PathBuf],
    request: &ExtractionRequest,
    config: &ParallelConfig,
) -> Result<BatchReport> {
    let spec = request.output.to_output_spec()?;
    if files.len() > 1 && spec.output_name.is_some() {
        return Err(SubsetError::configuration(
            "A fixed output name cannot be used for more than one input file",
        ));
    }
    let pool = config.build_pool()?;
    let done = AtomicUsize::new(0);

    info!(
        files = files.len(),
        threads = pool.current_num_threads(),
        "starting batch extraction"
    );

    let outcomes: Vec<(PathBuf, Result<PathBuf>)> = pool.install(|| {
        files
            .par_iter()
            .map(|file| {
                let outcome = extract_and_write(file, &request.variables, &spec);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                match &outcome {
                    Ok(output) => info!(
                        progress = %format!("{}/{}", finished, files.len()),
                        output = %output.display(),
                        "processed file"
                    ),
                    Err(e) => warn!(
                        progress = %format!("{}/{}", finished, files.len()),
                        file = %file.display(),
                        error = %e,
                        "failed file"
                    ),
                }
                (file.clone(), outcome)
            })
            .collect()
    });

    let mut report = BatchReport::default();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(output) => report.successful.push((file, output)),
            Err(e) => report.failed.push((file, e)),
        }
    }

    info!(
        successful = report.successful.len(),
        failed = report.failed.len(),
        "batch extraction finished"
    );
    Ok(report)
}
