//! Directory-level extraction: scan, fan out to the worker pool, merge.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use pathctx_pool::WorkerPool;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::aggregate::OutputAggregator;
use crate::config::{ExtractorConfig, SourceLanguage};
use crate::error::{ExtractError, Result};
use crate::extract::Extractor;
use crate::shard::{Shard, ShardStats};

/// Directory under the output directory holding per-worker shards.
pub const SHARD_DIR: &str = ".shards";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_seen: usize,
    pub files_extracted: usize,
    pub files_failed: usize,
    pub contexts: usize,
    pub vocab_entries: usize,
    pub tokens_path: PathBuf,
    pub vocab_path: PathBuf,
}

/// Source files under `root` for `language`, sorted by path.
pub fn collect_sources(root: &Path, language: SourceLanguage) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        // Symlinks are kept and resolved when the file is read.
        .filter(|entry| !entry.file_type().is_dir() && language.matches(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Extracts every source file under `input_dir` into `output_dir/tokens.txt`
/// and `output_dir/vocab.txt`.
pub fn run_batch(
    config: &ExtractorConfig,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchSummary> {
    let extractor = Arc::new(Extractor::new(config.clone())?);
    if !input_dir.is_dir() {
        return Err(ExtractError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input directory {} does not exist", input_dir.display()),
        )));
    }

    let started = Instant::now();
    let files = collect_sources(input_dir, config.language);
    info!(
        files = files.len(),
        threads = config.num_threads,
        batch = config.batch_size,
        "starting extraction"
    );

    let shard_dir = output_dir.join(SHARD_DIR);
    fs::create_dir_all(&shard_dir)?;
    let shards = (0..config.num_threads)
        .map(|index| Shard::create(&shard_dir, index))
        .collect::<Result<Vec<_>>>()?;

    let pool = WorkerPool::new(shards)?;
    let mut handles = Vec::new();
    for chunk in files.chunks(config.batch_size) {
        let batch = chunk.to_vec();
        let extractor = Arc::clone(&extractor);
        let handle = pool.submit(move |shard: &mut Shard| {
            for path in &batch {
                shard.process(&extractor, path);
            }
        })?;
        handles.push((handle, chunk.len()));
    }
    let shards = pool.shutdown()?;

    for (mut handle, files) in handles {
        if let Some(Err(e)) = handle.try_wait() {
            warn!(files, error = %e, "extraction task aborted");
        }
    }

    let finished = shards
        .into_iter()
        .map(Shard::finish)
        .collect::<Result<Vec<_>>>()?;
    let mut stats = ShardStats::default();
    for shard in &finished {
        stats.absorb(shard.stats);
    }

    let aggregator = OutputAggregator::new(output_dir);
    let merged = aggregator.merge(&finished)?;
    fs::remove_dir_all(&shard_dir)?;

    info!(
        files = files.len(),
        extracted = stats.files_extracted,
        failed = stats.files_failed,
        contexts = stats.contexts,
        vocab = merged.vocab_entries,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "extraction finished"
    );

    Ok(BatchSummary {
        files_seen: files.len(),
        files_extracted: stats.files_extracted,
        files_failed: stats.files_failed,
        contexts: stats.contexts,
        vocab_entries: merged.vocab_entries,
        tokens_path: aggregator.tokens_path().to_path_buf(),
        vocab_path: aggregator.vocab_path().to_path_buf(),
    })
}
