//! Worker-local partial output: a tokens file written line by line and a
//! vocabulary kept in memory until the worker is done.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::extract::Extractor;
use crate::vocab::Vocabulary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShardStats {
    pub files_extracted: usize,
    pub files_failed: usize,
    pub contexts: usize,
}

impl ShardStats {
    pub fn absorb(&mut self, other: ShardStats) {
        self.files_extracted += other.files_extracted;
        self.files_failed += other.files_failed;
        self.contexts += other.contexts;
    }
}

/// Files left behind by a finished shard.
#[derive(Debug, Clone)]
pub struct ShardFiles {
    pub tokens: PathBuf,
    pub vocab: PathBuf,
    pub stats: ShardStats,
}

pub struct Shard {
    index: usize,
    tokens_path: PathBuf,
    vocab_path: PathBuf,
    writer: BufWriter<File>,
    vocab: Vocabulary,
    stats: ShardStats,
}

impl Shard {
    pub fn tokens_file_name(index: usize) -> String {
        format!("tokens-{index}.part")
    }

    pub fn vocab_file_name(index: usize) -> String {
        format!("vocab-{index}.part")
    }

    pub fn create(dir: &Path, index: usize) -> Result<Self> {
        let tokens_path = dir.join(Self::tokens_file_name(index));
        let writer = BufWriter::new(File::create(&tokens_path)?);
        Ok(Self {
            index,
            tokens_path,
            vocab_path: dir.join(Self::vocab_file_name(index)),
            writer,
            vocab: Vocabulary::new(),
            stats: ShardStats::default(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stats(&self) -> ShardStats {
        self.stats
    }

    /// Extracts `path` and appends its line. Failures are logged and counted;
    /// a failed file leaves neither a line nor vocabulary entries behind.
    pub fn process(&mut self, extractor: &Extractor, path: &Path) {
        let mut scratch = Vocabulary::new();
        let outcome = extractor
            .extract_file(path, &mut scratch)
            .and_then(|record| {
                writeln!(self.writer, "{}", record.to_line())?;
                Ok(record.contexts.len())
            });

        match outcome {
            Ok(contexts) => {
                self.vocab.merge(scratch);
                self.stats.files_extracted += 1;
                self.stats.contexts += contexts;
            }
            Err(e) => {
                warn!(shard = self.index, file = %path.display(), error = %e, "skipping file");
                self.stats.files_failed += 1;
            }
        }
    }

    /// Flushes the tokens file and writes the shard vocabulary.
    pub fn finish(mut self) -> Result<ShardFiles> {
        self.writer.flush()?;
        let vocab_file = BufWriter::new(File::create(&self.vocab_path)?);
        self.vocab.write_to(vocab_file)?;
        debug!(
            shard = self.index,
            files = self.stats.files_extracted,
            vocab = self.vocab.len(),
            "shard finished"
        );
        Ok(ShardFiles {
            tokens: self.tokens_path,
            vocab: self.vocab_path,
            stats: self.stats,
        })
    }
}
