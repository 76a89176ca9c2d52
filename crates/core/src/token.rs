//! Maps retained nodes to canonical tokens and decides which paths are kept.

use crate::config::TokenEncoding;
use crate::traversal::{Branch, TerminalPair};
use crate::tree::{SyntaxNode, SyntaxTree};
use crate::util::pad_id;
use crate::vocab::Vocabulary;

/// Grammar categories of named terminals that get a dedicated spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalRole {
    Identifier,
    PrimitiveType,
    NumberLiteral,
    StringContent,
    Other,
}

impl TerminalRole {
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "identifier" => Some(Self::Identifier),
            "primitive_type" => Some(Self::PrimitiveType),
            "number_literal" => Some(Self::NumberLiteral),
            "string_content" => Some(Self::StringContent),
            _ => None,
        }
    }

    /// Classifies by visible kind, then by the grammar type behind any alias,
    /// so `field_identifier` counts as an identifier.
    pub fn classify(node: &SyntaxNode<'_>) -> Self {
        Self::from_type_name(node.kind())
            .or_else(|| Self::from_type_name(node.grammar_type()))
            .unwrap_or(Self::Other)
    }
}

/// How a terminal is spelled in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenForm {
    /// The source text.
    Value,
    /// The grammar type, before aliasing.
    Type,
    /// Decimal hash of the source text, recorded in the vocabulary.
    HashedValue,
}

impl TokenForm {
    pub fn select(role: TerminalRole, encoding: TokenEncoding) -> Self {
        use TerminalRole::*;
        match (role, encoding) {
            (Identifier, TokenEncoding::ValueFirst) => TokenForm::Value,
            (Identifier, TokenEncoding::TypeFirst) => TokenForm::Type,
            (PrimitiveType | NumberLiteral, _) => TokenForm::Value,
            (StringContent, TokenEncoding::ValueFirst) => TokenForm::Type,
            (StringContent, TokenEncoding::TypeFirst) => TokenForm::HashedValue,
            (Other, _) => TokenForm::Type,
        }
    }
}

/// Canonical id plus, for terminals, the token name. Internal nodes carry an
/// empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedNode {
    pub id: String,
    pub name: String,
}

impl TokenizedNode {
    pub fn is_terminal(&self) -> bool {
        !self.name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub encoding: TokenEncoding,
    /// Terminal pairs with fewer nodes than this are dropped. Every pair has
    /// at least three, so the default drops sibling terminals of one fork,
    /// which covers one-line preprocessor directives.
    pub min_path_nodes: usize,
    /// Branches with fewer nodes than this are dropped.
    pub min_branch_nodes: usize,
    /// Child whose grammar id stands in for a `unary_expression`.
    pub unary_child: usize,
    /// Child whose grammar id stands in for a `binary_expression`.
    pub binary_child: usize,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self::new(TokenEncoding::default())
    }
}

impl TokenPolicy {
    pub fn new(encoding: TokenEncoding) -> Self {
        Self {
            encoding,
            min_path_nodes: 4,
            min_branch_nodes: 2,
            unary_child: 0,
            binary_child: 1,
        }
    }

    fn redirect(&self, node: &SyntaxNode<'_>) -> Option<usize> {
        match node.kind() {
            "unary_expression" => Some(self.unary_child),
            "binary_expression" => Some(self.binary_child),
            _ => None,
        }
    }

    /// Grammar id used for `node` in a structural path. Expressions take the
    /// id of their operator child so `a + b` and `a - b` stay apart.
    pub fn canonical_id(&self, node: &SyntaxNode<'_>) -> u16 {
        self.redirect(node)
            .and_then(|index| node.child(index))
            .map_or_else(|| node.grammar_id(), |child| child.grammar_id())
    }

    pub fn canonical_tag(&self, node: &SyntaxNode<'_>) -> String {
        pad_id(self.canonical_id(node))
    }

    pub fn tokenize(
        &self,
        tree: &SyntaxTree,
        node: &SyntaxNode<'_>,
        vocab: &mut Vocabulary,
    ) -> TokenizedNode {
        let name = if node.is_terminal() {
            self.terminal_token(tree, node, vocab)
        } else {
            String::new()
        };
        TokenizedNode {
            id: self.canonical_tag(node),
            name,
        }
    }

    /// Spelling of a terminal. Never empty; never contains a comma or
    /// whitespace. Hashed spellings are recorded in `vocab`.
    pub fn terminal_token(
        &self,
        tree: &SyntaxTree,
        node: &SyntaxNode<'_>,
        vocab: &mut Vocabulary,
    ) -> String {
        let text = tree.node_text(node);
        match TokenForm::select(TerminalRole::classify(node), self.encoding) {
            TokenForm::Type => node.grammar_type().to_string(),
            TokenForm::HashedValue => vocab.record_text(&text).to_string(),
            TokenForm::Value if is_plain(&text) => text.into_owned(),
            TokenForm::Value => vocab.record_text(&text).to_string(),
        }
    }

    /// An endpoint is usable when it is a real, non-empty grammar leaf.
    pub fn admits_endpoint(&self, tree: &SyntaxTree, node: &SyntaxNode<'_>) -> bool {
        node.is_terminal()
            && !node.is_extra()
            && !node.is_missing()
            && !tree.node_text(node).is_empty()
    }

    pub fn admits_pair(&self, tree: &SyntaxTree, pair: &TerminalPair<'_>) -> bool {
        pair.len() >= self.min_path_nodes
            && self.admits_endpoint(tree, &pair.left())
            && self.admits_endpoint(tree, &pair.right())
    }

    pub fn admits_branch(&self, tree: &SyntaxTree, branch: &Branch<'_>) -> bool {
        branch.len() >= self.min_branch_nodes && self.admits_endpoint(tree, &branch.terminal())
    }
}

fn is_plain(text: &str) -> bool {
    !text.is_empty() && !text.chars().any(|c| c == ',' || c.is_whitespace())
}
