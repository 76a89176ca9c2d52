use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{ExtractorConfig, TraversalMode};
use crate::error::Result;
use crate::format::{PathContext, PathFormatter};
use crate::label::FileLabel;
use crate::token::{TokenPolicy, TokenizedNode};
use crate::traversal::PathEnumerator;
use crate::tree::SyntaxTree;
use crate::vocab::Vocabulary;

/// Contexts extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub label: String,
    pub contexts: Vec<PathContext>,
}

impl FileRecord {
    /// `label ctx1 ctx2 ...` without the trailing newline.
    pub fn to_line(&self) -> String {
        let mut line = self.label.clone();
        for ctx in &self.contexts {
            line.push(' ');
            line.push_str(&ctx.text);
        }
        line
    }

    /// One `s1|e1|s2|e2 ctx` line per context.
    pub fn span_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.contexts
            .iter()
            .map(|ctx| format!("{} {}", ctx.span_prefix(), ctx.text))
    }
}

/// Turns parsed files into path contexts according to one configuration.
///
/// An `Extractor` is immutable and is shared by all workers of a batch.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    enumerator: PathEnumerator,
    policy: TokenPolicy,
    formatter: PathFormatter,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let policy = TokenPolicy::new(config.token_encoding);
        Self::with_policy(config, policy)
    }

    /// Like [`Extractor::new`] with a custom token policy.
    pub fn with_policy(config: ExtractorConfig, policy: TokenPolicy) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            enumerator: PathEnumerator::new(config.max_path_length, config.max_path_width),
            formatter: PathFormatter::new(config.path_encoding),
            policy,
            config,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Contexts of an already parsed tree, in traversal order.
    pub fn contexts(&self, tree: &SyntaxTree, vocab: &mut Vocabulary) -> Vec<PathContext> {
        match self.config.traversal {
            TraversalMode::TerminalTerminal => self.terminal_contexts(tree, vocab),
            TraversalMode::RootTerminal => self.branch_contexts(tree, vocab),
        }
    }

    fn terminal_contexts(&self, tree: &SyntaxTree, vocab: &mut Vocabulary) -> Vec<PathContext> {
        let mut contexts = Vec::new();
        for pair in self.enumerator.terminal_to_terminal(tree.root()) {
            if !self.policy.admits_pair(tree, &pair) {
                continue;
            }
            let up: Vec<TokenizedNode> = pair
                .up
                .iter()
                .map(|node| self.policy.tokenize(tree, node, vocab))
                .collect();
            let down: Vec<TokenizedNode> = pair
                .down
                .iter()
                .map(|node| self.policy.tokenize(tree, node, vocab))
                .collect();
            let (Some((left, up_inner)), Some((right, down_inner))) =
                (up.split_first(), down.split_last())
            else {
                continue;
            };

            let up_ids: Vec<&str> = up_inner.iter().map(|node| node.id.as_str()).collect();
            let down_ids: Vec<&str> = down_inner.iter().map(|node| node.id.as_str()).collect();
            contexts.push(PathContext {
                text: self
                    .formatter
                    .render(&left.name, &up_ids, &down_ids, &right.name),
                left_span: pair.left().byte_range(),
                right_span: pair.right().byte_range(),
            });
        }
        contexts
    }

    fn branch_contexts(&self, tree: &SyntaxTree, vocab: &mut Vocabulary) -> Vec<PathContext> {
        let mut contexts = Vec::new();
        for branch in self.enumerator.bounded_root_to_terminal(tree.root()) {
            if !self.policy.admits_branch(tree, &branch) {
                continue;
            }
            let nodes = branch.root_first();
            let (root, terminal) = (branch.root(), branch.terminal());
            let inner: Vec<String> = nodes
                .get(1..nodes.len().saturating_sub(1))
                .unwrap_or_default()
                .iter()
                .map(|node| self.policy.canonical_tag(node))
                .collect();

            let terminal_hash = vocab.record_text(&tree.node_text(&terminal));
            let token = self.policy.terminal_token(tree, &terminal, vocab);
            contexts.push(PathContext {
                text: self.formatter.render_branch(
                    &self.policy.canonical_tag(&root),
                    &inner,
                    terminal_hash,
                    &token,
                ),
                left_span: root.byte_range(),
                right_span: terminal.byte_range(),
            });
        }
        contexts
    }

    /// Parses `source` and extracts its contexts. Vocabulary entries are only
    /// added to `vocab` once extraction succeeded.
    pub fn extract_source(
        &self,
        source: impl AsRef<[u8]>,
        vocab: &mut Vocabulary,
    ) -> Result<Vec<PathContext>> {
        let tree = SyntaxTree::parse(source.as_ref(), self.config.language)?;
        let mut scratch = Vocabulary::new();
        let contexts = self.contexts(&tree, &mut scratch);
        vocab.merge(scratch);
        Ok(contexts)
    }

    pub fn extract_file(&self, path: &Path, vocab: &mut Vocabulary) -> Result<FileRecord> {
        // Raw bytes: legacy encodings in comments or strings must not fail the file.
        let source = fs::read(path)?;
        let contexts = self.extract_source(&source, vocab)?;
        debug!(file = %path.display(), contexts = contexts.len(), "extracted file");
        Ok(FileRecord {
            path: path.to_path_buf(),
            label: FileLabel::from_path(path).render(self.config.export_vectors),
            contexts,
        })
    }
}
