mod extract;
mod graph;

use clap::{Args, Parser, Subcommand};
use pathctx_core::{PathEncoding, SourceLanguage, TokenEncoding, TraversalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pathctx",
    version,
    about = "Extracts path contexts from C/C++ syntax trees",
    long_about = "pathctx parses C and C++ sources with tree-sitter and emits, per file, the \
                  bounded set of leaf-path-leaf triplets connecting its terminals, together with \
                  a vocabulary of hashed terminal text. Directories are processed in parallel."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract path contexts from a directory or a single file
    #[command(
        long_about = "With a directory, every matching source file is extracted on a worker pool \
                            and the results land in <OUTPUT>/tokens.txt and <OUTPUT>/vocab.txt. \
                            With a single file, contexts are printed one per line to stdout, \
                            prefixed with the byte spans of both terminals."
    )]
    Extract(ExtractArgs),
    /// Dump the parse tree of a source file as a Graphviz DOT graph
    Graph {
        /// Source file to parse
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
        /// Where to write the DOT file
        #[arg(value_name = "OUT")]
        output: PathBuf,
        /// Grammar to parse with
        #[arg(long)]
        lang: Option<SourceLanguage>,
    },
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Directory of sources, or a single source file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Output directory for tokens.txt and vocab.txt
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,
    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Maximum number of nodes on a path
    #[arg(long)]
    pub max_path_length: Option<usize>,
    /// Maximum paths of one length per ancestor
    #[arg(long)]
    pub max_path_width: Option<usize>,
    /// Worker threads
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
    /// Files per submitted task
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// root-terminal (rt) or terminal-terminal (tpt)
    #[arg(long)]
    pub traversal: Option<TraversalMode>,
    /// value-first (0) or type-first (1)
    #[arg(long)]
    pub tokens: Option<TokenEncoding>,
    /// ids or hashed
    #[arg(long)]
    pub paths: Option<PathEncoding>,
    /// c or cpp
    #[arg(long)]
    pub lang: Option<SourceLanguage>,
    /// Label lines with task|status|id
    #[arg(long)]
    pub export_vectors: bool,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = pathctx_core::logging::init_logging("cli", true);

    match cli.command {
        Commands::Extract(args) => extract::run(args),
        Commands::Graph {
            source,
            output,
            lang,
        } => graph::run(&source, &output, lang.unwrap_or_default()),
    }
}
