//! Labelled-edge precision and recall counts
//!
//! An edge is a labelled span measured in non-punctuation words. Every
//! nonterminal except the root contributes one, with `PRT` relabelled as
//! `ADVP`. These counts become the `G=`, `P=` and `W=` fields of a
//! feature-counts file.

use crate::symbol::{Sym, sym};
use crate::tree::Tree;
use rustc_hash::FxHashMap;

/// Multiset of labelled edges in one tree
#[derive(Debug, Clone, Default)]
pub struct Edges {
    counts: FxHashMap<(Sym, usize, usize), usize>,
    nedges: usize,
}

impl Edges {
    pub fn new(tree: &Tree) -> Self {
        // word_offset[i] = number of non-punctuation words before preterminal i
        let mut word_offset = Vec::with_capacity(tree.len() + 1);
        word_offset.push(0);
        for &pt in tree.preterminals() {
            let last = word_offset[word_offset.len() - 1];
            word_offset.push(last + usize::from(!tree.is_punctuation(pt)));
        }

        let mut edges = Self::default();
        for id in tree.nodes_preorder() {
            if tree.is_root(id) || !tree.is_nonterminal(id) {
                continue;
            }
            let node = tree.node(id);
            let (left, right) = (word_offset[node.left], word_offset[node.right]);
            if left == right {
                continue;
            }
            let cat = if node.cat == sym::PRT { sym::ADVP } else { node.cat };
            *edges.counts.entry((cat, left, right)).or_default() += 1;
            edges.nedges += 1;
        }
        edges
    }

    pub fn nedges(&self) -> usize {
        self.nedges
    }

    /// Size of the multiset intersection with `other`
    pub fn common(&self, other: &Edges) -> usize {
        self.counts
            .iter()
            .map(|(edge, &n)| n.min(other.counts.get(edge).copied().unwrap_or(0)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolPool;
    use crate::treebank::parse_tree;

    #[test]
    fn test_edges_skip_root_preterminals_and_punctuation() {
        let pool = SymbolPool::new();
        let tree = parse_tree("(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))", &pool, false)
            .unwrap();
        let edges = Edges::new(&tree);
        // S 0-3, NP 0-2, VP 2-3
        assert_eq!(edges.nedges(), 3);
    }

    #[test]
    fn test_common_edges() {
        let pool = SymbolPool::new();
        let gold = parse_tree("(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))", &pool, false)
            .unwrap();
        let test = parse_tree("(S1 (S (NP (DT The)) (VP (NN dog) (VBZ barks)) (. .)))", &pool, false)
            .unwrap();
        let (gold, test) = (Edges::new(&gold), Edges::new(&test));
        assert_eq!(test.nedges(), 3);
        assert_eq!(gold.common(&test), 1);
        assert_eq!(test.common(&gold), 1);
        assert_eq!(gold.common(&gold), 3);
    }

    #[test]
    fn test_prt_matches_advp() {
        let pool = SymbolPool::new();
        let gold = parse_tree("(S1 (VP (VB give) (PRT (RP up))))", &pool, false).unwrap();
        let test = parse_tree("(S1 (VP (VB give) (ADVP (RP up))))", &pool, false).unwrap();
        assert_eq!(Edges::new(&gold).common(&Edges::new(&test)), 2);
    }
}
