use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::shard::ShardFiles;
use crate::vocab::Vocabulary;

pub const TOKENS_FILE: &str = "tokens.txt";
pub const VOCAB_FILE: &str = "vocab.txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub lines: usize,
    pub vocab_entries: usize,
}

/// Concatenates shard token files and merges shard vocabularies.
pub struct OutputAggregator {
    tokens_path: PathBuf,
    vocab_path: PathBuf,
}

impl OutputAggregator {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            tokens_path: output_dir.join(TOKENS_FILE),
            vocab_path: output_dir.join(VOCAB_FILE),
        }
    }

    pub fn tokens_path(&self) -> &Path {
        &self.tokens_path
    }

    pub fn vocab_path(&self) -> &Path {
        &self.vocab_path
    }

    /// Merges `shards` in order (later vocabulary values win) and removes the
    /// shard files once both outputs are written.
    pub fn merge(&self, shards: &[ShardFiles]) -> Result<MergeSummary> {
        let mut tokens = BufWriter::new(File::create(&self.tokens_path)?);
        let mut lines = 0;
        for shard in shards {
            let reader = BufReader::new(File::open(&shard.tokens)?);
            for line in reader.lines() {
                writeln!(tokens, "{}", line?)?;
                lines += 1;
            }
        }
        tokens.flush()?;

        let mut vocab = Vocabulary::new();
        for shard in shards {
            vocab.merge(Vocabulary::read_from(File::open(&shard.vocab)?)?);
        }
        vocab.write_to(BufWriter::new(File::create(&self.vocab_path)?))?;

        for shard in shards {
            remove_if_present(&shard.tokens)?;
            remove_if_present(&shard.vocab)?;
        }

        info!(
            lines,
            vocab = vocab.len(),
            shards = shards.len(),
            "merged shard output"
        );
        Ok(MergeSummary {
            lines,
            vocab_entries: vocab.len(),
        })
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
