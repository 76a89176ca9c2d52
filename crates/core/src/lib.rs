//! Path-context extraction from C and C++ syntax trees.
//!
//! A file is parsed into a [`SyntaxTree`], walked by a [`PathEnumerator`],
//! tokenized by a [`TokenPolicy`] and rendered by a [`PathFormatter`].
//! [`run_batch`] drives this over a directory on a work-stealing pool and
//! merges the per-worker shards into one tokens file and one vocabulary.

pub mod error;
pub mod logging;
pub mod util;

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod extract;
pub mod format;
pub mod label;
pub mod shard;
pub mod token;
pub mod traversal;
pub mod tree;
pub mod vocab;

pub use aggregate::{MergeSummary, OutputAggregator};
pub use batch::{BatchSummary, collect_sources, run_batch};
pub use config::{ExtractorConfig, PathEncoding, SourceLanguage, TokenEncoding, TraversalMode};
pub use error::{ExtractError, Result};
pub use extract::{Extractor, FileRecord};
pub use format::{PathContext, PathFormatter, decode_ids};
pub use label::FileLabel;
pub use shard::{Shard, ShardFiles, ShardStats};
pub use token::{TerminalRole, TokenForm, TokenPolicy, TokenizedNode};
pub use traversal::{Branch, PathEnumerator, PathStep, TerminalPair};
pub use tree::{SyntaxNode, SyntaxTree};
pub use vocab::Vocabulary;
