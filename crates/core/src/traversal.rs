//! Depth-first path enumeration over a [`SyntaxTree`](crate::SyntaxTree).
//!
//! Only forks (nodes with two or more children) and named terminals are kept
//! on a path; single-child chains collapse into the nearest retained node.

use std::collections::HashMap;

use crate::tree::SyntaxNode;

/// A retained node on a branch, with the index of its own child through
/// which the branch continues downward (`None` on the terminal).
#[derive(Clone, Copy, Debug)]
pub struct PathStep<'t> {
    pub node: SyntaxNode<'t>,
    pub via: Option<usize>,
}

/// A root-to-terminal node sequence, stored root first.
#[derive(Clone, Debug)]
pub struct Branch<'t> {
    steps: Vec<PathStep<'t>>,
}

impl<'t> Branch<'t> {
    pub fn steps(&self) -> &[PathStep<'t>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Topmost retained node of the branch.
    pub fn root(&self) -> SyntaxNode<'t> {
        self.steps[0].node
    }

    pub fn terminal(&self) -> SyntaxNode<'t> {
        self.steps[self.steps.len() - 1].node
    }

    pub fn root_first(&self) -> Vec<SyntaxNode<'t>> {
        self.steps.iter().map(|step| step.node).collect()
    }

    pub fn leaf_first(&self) -> Vec<SyntaxNode<'t>> {
        self.steps.iter().rev().map(|step| step.node).collect()
    }
}

/// Two terminals joined through their lowest common retained ancestor.
///
/// `up` runs from the left terminal to the ancestor (both included), `down`
/// from just below the ancestor to the right terminal (included).
#[derive(Clone, Debug)]
pub struct TerminalPair<'t> {
    pub up: Vec<SyntaxNode<'t>>,
    pub down: Vec<SyntaxNode<'t>>,
}

impl<'t> TerminalPair<'t> {
    pub fn left(&self) -> SyntaxNode<'t> {
        self.up[0]
    }

    pub fn right(&self) -> SyntaxNode<'t> {
        self.down[self.down.len() - 1]
    }

    pub fn apex(&self) -> SyntaxNode<'t> {
        self.up[self.up.len() - 1]
    }

    /// Total number of nodes on the path.
    pub fn len(&self) -> usize {
        self.up.len() + self.down.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes strictly between the two terminals, ancestor side first.
    pub fn up_inner(&self) -> &[SyntaxNode<'t>] {
        &self.up[1..]
    }

    pub fn down_inner(&self) -> &[SyntaxNode<'t>] {
        &self.down[..self.down.len() - 1]
    }
}

enum Frame<'t> {
    Enter {
        node: SyntaxNode<'t>,
        parent_retained: bool,
    },
    Exit,
}

/// Walks `start` depth-first, left to right, and returns one branch per named
/// terminal. With `limit`, subtrees whose branches would exceed that many
/// retained nodes are not descended into.
fn collect_branches<'t>(start: SyntaxNode<'t>, limit: Option<usize>) -> Vec<Branch<'t>> {
    let mut branches = Vec::new();
    let mut path: Vec<PathStep<'t>> = Vec::new();
    let mut stack = vec![Frame::Enter {
        node: start,
        parent_retained: false,
    }];

    while let Some(frame) = stack.pop() {
        let (node, parent_retained) = match frame {
            Frame::Enter {
                node,
                parent_retained,
            } => (node, parent_retained),
            Frame::Exit => {
                path.pop();
                continue;
            }
        };

        let retained = node.is_fork() || node.is_named_terminal();
        if retained && limit.is_some_and(|max| path.len() + 1 > max) {
            continue;
        }

        if parent_retained {
            if let Some(parent) = path.last_mut() {
                parent.via = Some(node.ordinal());
            }
        }

        if retained {
            path.push(PathStep { node, via: None });
            stack.push(Frame::Exit);
        }

        if node.is_named_terminal() {
            branches.push(Branch {
                steps: path.clone(),
            });
            continue;
        }

        for child in node.children().into_iter().rev() {
            stack.push(Frame::Enter {
                node: child,
                parent_retained: retained,
            });
        }
    }

    branches
}

/// Enumerates root-to-terminal branches and bounded terminal-to-terminal
/// pairs.
///
/// Bounds: a pair longer than `max_length` nodes is dropped, and for every
/// ancestor at most `max_width` pairs of each exact length are kept, in
/// discovery order.
#[derive(Debug, Clone, Copy)]
pub struct PathEnumerator {
    max_length: usize,
    max_width: usize,
}

impl PathEnumerator {
    pub fn new(max_length: usize, max_width: usize) -> Self {
        Self {
            max_length,
            max_width,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Every branch from `root` to a named terminal, unbounded.
    pub fn root_to_terminal<'t>(&self, root: SyntaxNode<'t>) -> Vec<Branch<'t>> {
        collect_branches(root, None)
    }

    /// Branches from `root` subject to the length and width bounds, with the
    /// root acting as the single ancestor for the width count.
    pub fn bounded_root_to_terminal<'t>(&self, root: SyntaxNode<'t>) -> Vec<Branch<'t>> {
        let mut width: HashMap<usize, usize> = HashMap::new();
        collect_branches(root, Some(self.max_length))
            .into_iter()
            .filter(|branch| {
                let seen = width.entry(branch.len()).or_insert(0);
                if *seen >= self.max_width {
                    return false;
                }
                *seen += 1;
                true
            })
            .collect()
    }

    /// For every terminal `A` and every retained ancestor `rl` of `A`, pairs
    /// `A` with each terminal `B` under the children of `rl` to the right of
    /// the one leading to `A`. The `A → rl` half is shared by all of them.
    pub fn terminal_to_terminal<'t>(&self, root: SyntaxNode<'t>) -> Vec<TerminalPair<'t>> {
        let mut pairs = Vec::new();

        for branch in collect_branches(root, None) {
            let steps: Vec<&PathStep<'t>> = branch.steps().iter().rev().collect();

            for rl in 1..steps.len() {
                let up_len = rl + 1;
                // The shortest possible down half is the terminal alone.
                if up_len + 1 > self.max_length {
                    break;
                }

                let apex = steps[rl];
                let Some(toward_first) = apex.via else {
                    continue;
                };
                let up: Vec<SyntaxNode<'t>> = steps[..=rl].iter().map(|step| step.node).collect();
                let mut width: HashMap<usize, usize> = HashMap::new();

                for sibling in apex.node.children().into_iter().skip(toward_first + 1) {
                    for down in collect_branches(sibling, Some(self.max_length - up_len)) {
                        let len = up_len + down.len();
                        if len > self.max_length {
                            continue;
                        }
                        let seen = width.entry(len).or_insert(0);
                        if *seen >= self.max_width {
                            continue;
                        }
                        *seen += 1;

                        pairs.push(TerminalPair {
                            up: up.clone(),
                            down: down.root_first(),
                        });
                    }
                }
            }
        }

        pairs
    }
}
