//! Parsed syntax tree and the node handles the extractor navigates.

use std::borrow::Cow;
use std::io::{self, Write};
use std::ops::Range;

use tree_sitter::{Node, Parser, Tree};

use crate::config::SourceLanguage;
use crate::error::{ExtractError, Result};

/// A parsed file. Owns both the tree-sitter tree and the source bytes, so
/// every [`SyntaxNode`] borrowed from it can resolve its text.
pub struct SyntaxTree {
    tree: Tree,
    source: Vec<u8>,
    language: SourceLanguage,
}

impl SyntaxTree {
    /// Parses `source` with the grammar of `language`. Syntax errors do not
    /// fail the parse; the grammar's recovery nodes end up in the tree.
    /// The bytes need not be valid UTF-8.
    pub fn parse(source: impl Into<Vec<u8>>, language: SourceLanguage) -> Result<Self> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| ExtractError::Parse(format!("cannot load {language} grammar: {e}")))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ExtractError::Parse("parser produced no tree".to_string()))?;
        Ok(Self {
            tree,
            source,
            language,
        })
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), 0)
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Source text of a terminal; empty for internal nodes. Invalid UTF-8
    /// is replaced with U+FFFD.
    pub fn node_text(&self, node: &SyntaxNode<'_>) -> Cow<'_, str> {
        if !node.is_terminal() {
            return Cow::Borrowed("");
        }
        self.text_at(node.byte_range())
    }

    fn text_at(&self, range: Range<usize>) -> Cow<'_, str> {
        String::from_utf8_lossy(self.source.get(range).unwrap_or_default())
    }

    /// Dumps every node (named or not) as a Graphviz digraph.
    pub fn write_dot<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "digraph tree {{")?;
        writeln!(out, "  node [shape=box, fontname=\"monospace\"];")?;

        let mut stack = vec![self.tree.root_node()];
        while let Some(node) = stack.pop() {
            let mut label = format!("{} ({})", escape_dot(node.kind()), node.grammar_id());
            if node.child_count() == 0 && node.is_named() {
                let text = self.text_at(node.byte_range());
                label.push_str("\\n");
                label.push_str(&escape_dot(&text));
            }
            let style = if node.is_extra() {
                ", style=dashed"
            } else if !node.is_named() {
                ", style=dotted"
            } else {
                ""
            };
            writeln!(out, "  n{} [label=\"{}\"{}];", node.id(), label, style)?;

            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            for child in &children {
                writeln!(out, "  n{} -> n{};", node.id(), child.id())?;
            }
            stack.extend(children.into_iter().rev());
        }

        writeln!(out, "}}")
    }
}

fn escape_dot(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Borrowed handle to one node of a [`SyntaxTree`], remembering its position
/// among its parent's children.
#[derive(Clone, Copy, Debug)]
pub struct SyntaxNode<'t> {
    node: Node<'t>,
    ordinal: usize,
}

impl<'t> SyntaxNode<'t> {
    fn new(node: Node<'t>, ordinal: usize) -> Self {
        Self { node, ordinal }
    }

    /// Grammar type as written in the grammar (before aliasing).
    pub fn grammar_type(&self) -> &'static str {
        self.node.grammar_name()
    }

    /// Visible node type (after aliasing).
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn grammar_id(&self) -> u16 {
        self.node.grammar_id()
    }

    /// Identity of the node within its tree.
    pub fn id(&self) -> usize {
        self.node.id()
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.node.byte_range()
    }

    /// (row, column) of the first byte.
    pub fn start_point(&self) -> (usize, usize) {
        let p = self.node.start_position();
        (p.row, p.column)
    }

    pub fn end_point(&self) -> (usize, usize) {
        let p = self.node.end_position();
        (p.row, p.column)
    }

    pub fn child_count(&self) -> usize {
        self.node.child_count()
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.node
            .child(index as _)
            .map(|child| SyntaxNode::new(child, index))
    }

    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .enumerate()
            .map(|(index, child)| SyntaxNode::new(child, index))
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.node.child_count() == 0
    }

    /// A real grammar leaf: named and not injected by the parser (comments).
    pub fn is_named_terminal(&self) -> bool {
        self.is_terminal() && self.node.is_named() && !self.node.is_extra()
    }

    pub fn is_named(&self) -> bool {
        self.node.is_named()
    }

    pub fn is_extra(&self) -> bool {
        self.node.is_extra()
    }

    /// Zero-width node inserted by error recovery.
    pub fn is_missing(&self) -> bool {
        self.node.is_missing()
    }

    pub fn is_fork(&self) -> bool {
        self.node.child_count() >= 2
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for SyntaxNode<'_> {}
