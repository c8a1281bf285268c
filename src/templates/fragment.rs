//! Tree-fragment features
//!
//! These templates copy part of a candidate parse and use the bracketed copy
//! itself as the feature. Nodes that are not expanded print as a bare label.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Fragment, Template};
use crate::templates::head_code;
use crate::tree::{HeadType, NodeId, Tree};

/// Which preterminals keep their word in an [`NGramTree`] fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lexicalize {
    #[default]
    None = 0,
    ClosedClass = 1,
    Functional = 2,
    All = 3,
}

/// Go up `n` ancestors from `id`
fn ancestor(tree: &Tree, id: NodeId, n: usize) -> Option<NodeId> {
    (0..n).try_fold(id, |id, _| tree.parent(id))
}

/// Write `id` as `(cat child...)`, or its bare label when nothing is kept
fn write_node(
    tree: &Tree,
    id: NodeId,
    children: &[NodeId],
    out: &mut String,
    mut write_child: impl FnMut(NodeId, &mut String),
) {
    let label = tree.symbols.resolve(tree.cat(id));
    if children.is_empty() {
        out.push_str(&label);
        return;
    }
    out.push('(');
    out.push_str(&label);
    for &child in children {
        out.push(' ');
        write_child(child, out);
    }
    out.push(')');
}

/// The smallest subtree covering each window of `ngram` adjacent words
#[derive(Debug, Clone)]
pub struct NGramTree {
    ngram: usize,
    lexicalize: Lexicalize,
    collapse: bool,
    nancs: usize,
    identifier: String,
}

impl NGramTree {
    pub fn new(ngram: usize, lexicalize: Lexicalize, collapse: bool, nancs: usize) -> Self {
        Self {
            ngram,
            lexicalize,
            collapse,
            nancs,
            identifier: format!(
                "NGramTree:{ngram}:{}:{}:{nancs}",
                lexicalize as u8,
                u8::from(collapse)
            ),
        }
    }

    fn expands(&self, tree: &Tree, id: NodeId, left: usize, right: usize) -> bool {
        let node = tree.node(id);
        !node.children.is_empty()
            && node.left < right
            && node.right > left
            && (tree.is_nonterminal(id)
                || match self.lexicalize {
                    Lexicalize::None => false,
                    Lexicalize::ClosedClass => tree.is_closed_class(id),
                    Lexicalize::Functional => tree.is_functional(id),
                    Lexicalize::All => true,
                })
    }

    fn write(&self, tree: &Tree, id: NodeId, left: usize, right: usize, out: &mut String) {
        let children: Vec<NodeId> = if self.expands(tree, id, left, right) {
            tree.children(id)
                .iter()
                .copied()
                .filter(|&c| !self.collapse || tree.node(c).right > left)
                .take_while(|&c| !self.collapse || tree.node(c).left < right)
                .collect()
        } else {
            Vec::new()
        };
        write_node(tree, id, &children, out, |child, out| {
            self.write(tree, child, left, right, out)
        });
    }
}

impl Default for NGramTree {
    fn default() -> Self {
        Self::new(2, Lexicalize::None, false, 0)
    }
}

impl Template for NGramTree {
    type Feature = Fragment;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Fragment>) {
        let tree = &parse.tree;
        let pts = tree.preterminals();
        for (i, &pt) in pts.iter().enumerate() {
            let right = i + self.ngram;
            if right >= pts.len() {
                break;
            }
            let mut top = pt;
            while tree.node(top).right < right {
                match tree.parent(top) {
                    Some(parent) => top = parent,
                    None => break,
                }
            }
            let Some(top) = ancestor(tree, top, self.nancs) else {
                return;
            };
            let mut text = String::new();
            self.write(tree, top, i, right, &mut text);
            counts.incr(Fragment(text));
        }
    }
}

/// The maximal projection of each word, pruned to the head path
#[derive(Debug, Clone)]
pub struct HeadTree {
    collapse: bool,
    lexicalize: bool,
    nancs: usize,
    head_type: HeadType,
    identifier: String,
}

impl HeadTree {
    pub fn new(collapse: bool, lexicalize: bool, nancs: usize, head_type: HeadType) -> Self {
        Self {
            collapse,
            lexicalize,
            nancs,
            head_type,
            identifier: format!(
                "HeadTree:{}:{}:{nancs}:{}",
                u8::from(collapse),
                u8::from(lexicalize),
                head_code(head_type)
            ),
        }
    }

    /// Children next to the head path.
    ///
    /// A child is dropped while it and its right sibling lie before the head
    /// word; the list ends at the first child whose left sibling starts
    /// after it.
    fn kept_children(&self, tree: &Tree, id: NodeId, headleft: usize) -> Vec<NodeId> {
        let children = tree.children(id);
        if !self.collapse {
            return children.to_vec();
        }
        let mut kept = Vec::with_capacity(children.len());
        for (k, &child) in children.iter().enumerate() {
            let node = tree.node(child);
            let left = k
                .checked_sub(1)
                .map_or(node.left, |prev| tree.node(children[prev]).left);
            let right = children
                .get(k + 1)
                .map_or(node.right, |&next| tree.node(next).right);
            if right <= headleft {
                continue;
            }
            if left > headleft {
                break;
            }
            kept.push(child);
        }
        kept
    }

    fn write(&self, tree: &Tree, id: NodeId, headleft: usize, out: &mut String) {
        let expand =
            tree.is_nonterminal(id) || (self.lexicalize && tree.node(id).left == headleft);
        let children = if expand {
            self.kept_children(tree, id, headleft)
        } else {
            Vec::new()
        };
        write_node(tree, id, &children, out, |child, out| {
            self.write(tree, child, headleft, out)
        });
    }
}

impl Default for HeadTree {
    fn default() -> Self {
        Self::new(true, false, 0, HeadType::Semantic)
    }
}

impl Template for HeadTree {
    type Feature = Fragment;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Fragment>) {
        let tree = &parse.tree;
        for (i, &pt) in tree.preterminals().iter().enumerate() {
            let mut top = pt;
            while let Some(parent) = tree.parent(top) {
                if tree.headchild(parent, self.head_type) != Some(top) {
                    break;
                }
                top = parent;
            }
            let Some(top) = ancestor(tree, top, self.nancs) else {
                return;
            };
            let mut text = String::new();
            self.write(tree, top, i, &mut text);
            counts.incr(Fragment(text));
        }
    }
}
