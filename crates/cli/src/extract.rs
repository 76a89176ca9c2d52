use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use pathctx_core::aggregate::VOCAB_FILE;
use pathctx_core::{BatchSummary, Extractor, ExtractorConfig, Vocabulary, run_batch};
use tabled::{Table, Tabled};
use tracing::info;

use crate::ExtractArgs;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Extracted")]
    extracted: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Contexts")]
    contexts: usize,
    #[tabled(rename = "Vocabulary")]
    vocab: usize,
}

impl From<&BatchSummary> for SummaryRow {
    fn from(summary: &BatchSummary) -> Self {
        Self {
            files: summary.files_seen,
            extracted: summary.files_extracted,
            failed: summary.files_failed,
            contexts: summary.contexts,
            vocab: summary.vocab_entries,
        }
    }
}

pub fn build_config(args: &ExtractArgs) -> anyhow::Result<ExtractorConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    if let Some(v) = args.max_path_length {
        config.max_path_length = v;
    }
    if let Some(v) = args.max_path_width {
        config.max_path_width = v;
    }
    if let Some(v) = args.threads {
        config.num_threads = v;
    }
    if let Some(v) = args.batch_size {
        config.batch_size = v;
    }
    if let Some(v) = args.traversal {
        config.traversal = v;
    }
    if let Some(v) = args.tokens {
        config.token_encoding = v;
    }
    if let Some(v) = args.paths {
        config.path_encoding = v;
    }
    if let Some(v) = args.lang {
        config.language = v;
    }
    config.export_vectors |= args.export_vectors;

    config.validate()?;
    Ok(config)
}

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    if args.input.is_dir() {
        fs::create_dir_all(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
        let summary = run_batch(&config, &args.input, &args.output)?;
        info!("Tokens written to {}", summary.tokens_path.display());
        info!("Vocabulary written to {}", summary.vocab_path.display());
        println!("{}", Table::new([SummaryRow::from(&summary)]));
        Ok(())
    } else if args.input.is_file() {
        let stdout = io::stdout();
        let vocab_path = run_single(&config, &args.input, &args.output, stdout.lock())?;
        if let Some(path) = vocab_path {
            info!("Vocabulary written to {}", path.display());
        }
        Ok(())
    } else {
        bail!("input {} does not exist", args.input.display())
    }
}

/// Prints span-prefixed contexts of one file to `out`. Hashed tokens are
/// resolvable through `output_dir/vocab.txt`, written only when non-empty.
pub fn run_single<W: Write>(
    config: &ExtractorConfig,
    path: &Path,
    output_dir: &Path,
    mut out: W,
) -> anyhow::Result<Option<PathBuf>> {
    let extractor = Extractor::new(config.clone())?;
    let mut vocab = Vocabulary::new();
    let record = extractor
        .extract_file(path, &mut vocab)
        .with_context(|| format!("extracting {}", path.display()))?;

    for line in record.span_lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    if vocab.is_empty() {
        return Ok(None);
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let vocab_path = output_dir.join(VOCAB_FILE);
    let file = File::create(&vocab_path)
        .with_context(|| format!("creating {}", vocab_path.display()))?;
    let mut writer = BufWriter::new(file);
    vocab.write_to(&mut writer)?;
    writer.flush()?;
    Ok(Some(vocab_path))
}
