//! Compiling many pages at once.
//!
//! Each page compiles independently with no shared state, so pages are
//! spread over a rayon pool.

use crate::options::Options;
use crate::page::{CompiledPage, PageError, compile_page};
use rayon::prelude::*;

/// One page source to compile.
#[derive(Debug, Clone)]
pub struct PageInput {
    /// Caller's identifier, typically the file path.
    pub id: String,
    /// Page source including front matter.
    pub source: String,
}

/// Outcome for one input, in input order.
#[derive(Debug)]
pub struct PageResult {
    /// Identifier matching the input.
    pub id: String,
    /// The compiled page or why it failed.
    pub result: Result<CompiledPage, PageError>,
}

/// Counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Inputs given.
    pub total: usize,
    /// Pages compiled.
    pub succeeded: usize,
    /// Pages that failed.
    pub failed: usize,
}

/// Options for batch compilation.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
    /// Keep going after a failed page. Defaults to true.
    pub continue_on_error: Option<bool>,
    /// Rendering options shared by every page.
    pub options: Options,
}

/// Results of a batch plus its counts.
#[derive(Debug)]
pub struct BatchOutcome {
    /// One result per processed input, in input order.
    pub results: Vec<PageResult>,
    /// Counts over `results`.
    pub stats: BatchStats,
}

/// Compiles pages in parallel.
///
/// With `continue_on_error` disabled, pages are compiled in order and the
/// batch stops after the first failure; later inputs get no result.
pub fn compile_pages(inputs: Vec<PageInput>, batch: &BatchOptions) -> BatchOutcome {
    let total = inputs.len();
    let continue_on_error = batch.continue_on_error.unwrap_or(true);
    let pool = batch.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .ok()
    });

    let process = |input: PageInput| PageResult {
        result: compile_page(&input.source, &batch.options),
        id: input.id,
    };

    let results: Vec<PageResult> = if continue_on_error {
        match &pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process).collect()),
            None => inputs.into_par_iter().map(process).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(total);
        for input in inputs {
            let result = process(input);
            let failed = result.result.is_err();
            results.push(result);
            if failed {
                break;
            }
        }
        results
    };

    let failed = results.iter().filter(|page| page.result.is_err()).count();
    let stats = BatchStats {
        total,
        succeeded: results.len() - failed,
        failed,
    };
    log::debug!(
        "Compiled {} pages: {} succeeded, {} failed",
        stats.total,
        stats.succeeded,
        stats.failed
    );

    BatchOutcome { results, stats }
}
