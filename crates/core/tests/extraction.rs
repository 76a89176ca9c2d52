use std::collections::HashMap;

use pathctx_core::{
    Extractor, ExtractorConfig, PathEncoding, PathEnumerator, SourceLanguage, SyntaxNode,
    SyntaxTree, TokenEncoding, TokenPolicy, TraversalMode, Vocabulary, decode_ids,
};

const PROGRAM: &str = r#"#include <stdio.h>
/* compute */
int add(int a, int b) { return a + b; }

int main(void) {
    int total = 0;
    for (int i = 0; i < 10; i++) {
        total += add(i, -i);  // negate
    }
    printf("total: %d\n", total);
    return 0;
}
"#;

fn config(traversal: TraversalMode, length: usize, width: usize) -> ExtractorConfig {
    ExtractorConfig {
        language: SourceLanguage::C,
        traversal,
        max_path_length: length,
        max_path_width: width,
        ..ExtractorConfig::default()
    }
}

fn named_terminals(node: SyntaxNode<'_>) -> usize {
    if node.is_named_terminal() {
        return 1;
    }
    node.children().into_iter().map(named_terminals).sum()
}

#[test]
fn one_branch_per_named_terminal() {
    for (source, language) in [
        (PROGRAM, SourceLanguage::C),
        ("int x = 1 + 2;", SourceLanguage::C),
        (
            "template <typename T> T max(T a, T b) { return a > b ? a : b; }",
            SourceLanguage::Cpp,
        ),
        ("/* hello */", SourceLanguage::C),
    ] {
        let tree = SyntaxTree::parse(source, language).unwrap();
        let branches = PathEnumerator::new(1, 1).root_to_terminal(tree.root());
        assert_eq!(branches.len(), named_terminals(tree.root()), "{source}");
        assert!(branches.iter().all(|b| b.terminal().is_named_terminal()));
    }
}

#[test]
fn pairs_respect_length_and_width_bounds() {
    let tree = SyntaxTree::parse(PROGRAM, SourceLanguage::C).unwrap();
    for (length, width) in [(3, 1), (5, 2), (8, 2), (12, 4)] {
        let pairs = PathEnumerator::new(length, width).terminal_to_terminal(tree.root());
        assert!(!pairs.is_empty());

        let mut per_ancestor: HashMap<(usize, usize, usize), usize> = HashMap::new();
        for pair in &pairs {
            assert!(pair.len() <= length, "{} > {length}", pair.len());
            *per_ancestor
                .entry((pair.left().id(), pair.apex().id(), pair.len()))
                .or_default() += 1;
        }
        assert!(per_ancestor.values().all(|&count| count <= width));
    }
}

#[test]
fn output_is_deterministic() {
    for traversal in [TraversalMode::RootTerminal, TraversalMode::TerminalTerminal] {
        for path_encoding in [PathEncoding::Ids, PathEncoding::Hashed] {
            let extractor = Extractor::new(ExtractorConfig {
                path_encoding,
                ..config(traversal, 8, 2)
            })
            .unwrap();

            let mut first_vocab = Vocabulary::new();
            let mut second_vocab = Vocabulary::new();
            let first = extractor.extract_source(PROGRAM, &mut first_vocab).unwrap();
            let second = extractor.extract_source(PROGRAM, &mut second_vocab).unwrap();
            assert_eq!(first, second);
            assert_eq!(first_vocab, second_vocab);
        }
    }
}

#[test]
fn id_paths_decode_to_traversal_ids() {
    let extractor = Extractor::new(config(TraversalMode::TerminalTerminal, 8, 3)).unwrap();
    let policy = TokenPolicy::new(TokenEncoding::ValueFirst);
    let tree = SyntaxTree::parse(PROGRAM, SourceLanguage::C).unwrap();

    let contexts = extractor.contexts(&tree, &mut Vocabulary::new());
    let admitted: Vec<_> = PathEnumerator::new(8, 3)
        .terminal_to_terminal(tree.root())
        .into_iter()
        .filter(|pair| policy.admits_pair(&tree, pair))
        .collect();
    assert_eq!(contexts.len(), admitted.len());

    for (ctx, pair) in contexts.iter().zip(&admitted) {
        let (_, path, _) = ctx.fields().unwrap();
        let expected: Vec<u16> = pair
            .up_inner()
            .iter()
            .chain(pair.down_inner())
            .map(|node| policy.canonical_id(node))
            .collect();
        assert_eq!(decode_ids(path), Some(expected), "{ctx}");
    }
}

#[test]
fn assignment_scenario_pairs_identifier_with_literals() {
    let extractor = Extractor::new(config(TraversalMode::TerminalTerminal, 6, 10)).unwrap();
    let contexts = extractor
        .extract_source("int x = 1 + 2;", &mut Vocabulary::new())
        .unwrap();

    let fields: Vec<(&str, &str, &str)> =
        contexts.iter().map(|ctx| ctx.fields().unwrap()).collect();
    assert!(fields.iter().any(|(l, _, r)| *l == "x" && *r == "1"));
    assert!(fields.iter().any(|(l, _, r)| *l == "x" && *r == "2"));

    // Sibling terminals of one fork are too short to keep.
    assert!(!fields.iter().any(|(l, _, r)| *l == "1" && *r == "2"));
}

#[test]
fn preprocessor_directives_alone_yield_nothing() {
    let extractor = Extractor::new(config(TraversalMode::TerminalTerminal, 8, 4)).unwrap();
    for source in ["#define N 10\n", "#include <stdio.h>\n", "#define DEBUG\n"] {
        let contexts = extractor
            .extract_source(source, &mut Vocabulary::new())
            .unwrap();
        assert!(contexts.is_empty(), "{source}");
    }

    let contexts = extractor
        .extract_source("#define N 10\nint x = N;\n", &mut Vocabulary::new())
        .unwrap();
    let fields: Vec<(&str, &str, &str)> =
        contexts.iter().map(|ctx| ctx.fields().unwrap()).collect();
    assert!(!fields.iter().any(|(l, _, r)| *l == "N" && *r == "preproc_arg"));
    assert!(fields.iter().any(|(l, _, r)| *l == "int" && *r == "x"));
}

#[test]
fn recovered_nodes_never_become_endpoints() {
    for source in ["int x = 1 + ;", "int f( {\n  return 0;\n"] {
        for traversal in [TraversalMode::RootTerminal, TraversalMode::TerminalTerminal] {
            let extractor = Extractor::new(config(traversal, 10, 4)).unwrap();
            let tree = SyntaxTree::parse(source, SourceLanguage::C).unwrap();
            assert!(tree.has_errors());
            let contexts = extractor.contexts(&tree, &mut Vocabulary::new());
            if source.contains('+') {
                assert!(!contexts.is_empty());
            }
            for ctx in &contexts {
                assert!(!ctx.left_span.is_empty(), "{source}: {ctx}");
                assert!(!ctx.right_span.is_empty(), "{source}: {ctx}");
            }
        }
    }
}

#[test]
fn comment_only_source_yields_nothing() {
    for traversal in [TraversalMode::RootTerminal, TraversalMode::TerminalTerminal] {
        let extractor = Extractor::new(config(traversal, 8, 2)).unwrap();
        let mut vocab = Vocabulary::new();
        let contexts = extractor.extract_source("/* hello */", &mut vocab).unwrap();
        assert!(contexts.is_empty());
        assert!(vocab.is_empty());
    }
}

#[test]
fn contexts_never_contain_whitespace() {
    for token_encoding in [TokenEncoding::ValueFirst, TokenEncoding::TypeFirst] {
        for traversal in [TraversalMode::RootTerminal, TraversalMode::TerminalTerminal] {
            let extractor = Extractor::new(ExtractorConfig {
                token_encoding,
                ..config(traversal, 10, 4)
            })
            .unwrap();
            let contexts = extractor
                .extract_source(PROGRAM, &mut Vocabulary::new())
                .unwrap();
            assert!(!contexts.is_empty());
            for ctx in &contexts {
                assert!(!ctx.text.chars().any(char::is_whitespace), "{ctx}");
                assert_eq!(ctx.text.matches(',').count(), 2, "{ctx}");
            }
        }
    }
}

#[test]
fn type_first_hashes_strings_into_the_vocabulary() {
    let extractor = Extractor::new(ExtractorConfig {
        token_encoding: TokenEncoding::TypeFirst,
        ..config(TraversalMode::TerminalTerminal, 10, 4)
    })
    .unwrap();
    let mut vocab = Vocabulary::new();
    let contexts = extractor.extract_source(PROGRAM, &mut vocab).unwrap();

    let (hash, _) = vocab
        .iter()
        .find(|(_, text)| *text == "total: %d")
        .expect("string content recorded");
    let hash = hash.to_string();
    assert!(contexts.iter().any(|ctx| {
        let (left, _, right) = ctx.fields().unwrap();
        left == hash || right == hash
    }));
    assert!(!contexts.iter().any(|ctx| ctx.text.contains("total:")));
}

#[test]
fn root_terminal_contexts_follow_bounded_branches() {
    let extractor = Extractor::new(config(TraversalMode::RootTerminal, 64, 1024)).unwrap();
    let tree = SyntaxTree::parse(PROGRAM, SourceLanguage::C).unwrap();
    let mut vocab = Vocabulary::new();
    let contexts = extractor.contexts(&tree, &mut vocab);

    // Comments are extra and never become branches.
    assert_eq!(contexts.len(), named_terminals(tree.root()));
    for ctx in &contexts {
        let (_, path, _) = ctx.fields().unwrap();
        let (ids, hash) = path.split_once('_').unwrap();
        assert!(decode_ids(ids).is_some());
        assert!(vocab.get(hash.parse().unwrap()).is_some());
    }
}
