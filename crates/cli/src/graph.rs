use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use pathctx_core::{SourceLanguage, SyntaxTree};
use tracing::{info, warn};

pub fn run(source: &Path, output: &Path, language: SourceLanguage) -> anyhow::Result<()> {
    let bytes = fs::read(source).with_context(|| format!("reading {}", source.display()))?;
    let tree = SyntaxTree::parse(bytes, language)?;
    if tree.has_errors() {
        warn!("{} has syntax errors; recovery nodes are included", source.display());
    }

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    tree.write_dot(BufWriter::new(file))?;
    info!("Wrote parse tree of {} to {}", source.display(), output.display());
    Ok(())
}
