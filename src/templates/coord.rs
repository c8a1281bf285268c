//! Coordination parallelism
//!
//! Both templates compare adjacent conjuncts of a coordination node,
//! skipping punctuation and conjunctions between them.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template};
use crate::tree::{NodeId, Tree};

/// Deepest structural comparison made by [`CoPar`]
const MAX_DEPTH: i32 = 5;

/// Adjacent conjuncts of a coordination node
fn conjuncts(tree: &Tree, id: NodeId) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
    let children: Vec<NodeId> = tree
        .children(id)
        .iter()
        .copied()
        .filter(|&c| !tree.is_punctuation(c) && !tree.is_conjunction(c))
        .collect();
    (1..children.len()).map(move |i| (children[i - 1], children[i]))
}

/// Counts parallel and non-parallel conjunct pairs at depths 1 to 5.
///
/// The key is `(depth, match)` where match is 1 if the two conjuncts agree
/// in category down to that depth and 0 if they differ. Pairs that agree
/// but run out of structure before the depth is reached are not counted.
#[derive(Debug, Clone)]
pub struct CoPar {
    ignore_preterms: bool,
    identifier: String,
}

impl CoPar {
    pub fn new(ignore_preterms: bool) -> Self {
        Self {
            ignore_preterms,
            identifier: format!("CoPar:{}", u8::from(ignore_preterms)),
        }
    }

    /// 1 on a match to `depth`, 0 on a mismatch, -1 if either side has
    /// nothing at `depth`
    fn match_nodes(&self, tree: &Tree, depth: i32, a: NodeId, b: NodeId) -> i32 {
        if tree.cat(a) != tree.cat(b) {
            return 0;
        }
        if depth == 1 {
            return 1;
        }
        if tree.is_preterminal(a) || tree.is_preterminal(b) {
            return -1;
        }
        self.match_lists(tree, depth - 1, tree.children(a), tree.children(b))
    }

    fn match_lists(&self, tree: &Tree, depth: i32, a: &[NodeId], b: &[NodeId]) -> i32 {
        let (a, b) = if self.ignore_preterms {
            let skip = |nodes: &[NodeId]| {
                nodes.iter().position(|&n| !tree.is_preterminal(n)).unwrap_or(nodes.len())
            };
            (&a[skip(a)..], &b[skip(b)..])
        } else {
            (a, b)
        };
        match (a.split_first(), b.split_first()) {
            (None, None) => -1,
            (None, Some(_)) | (Some(_), None) => 0,
            (Some((&first_a, rest_a)), Some((&first_b, rest_b))) => {
                let head = self.match_nodes(tree, depth, first_a, first_b);
                let rest = self.match_lists(tree, depth, rest_a, rest_b);
                if head == 0 || rest == 0 {
                    0
                } else if head == 1 || rest == 1 {
                    1
                } else {
                    -1
                }
            }
        }
    }
}

impl Default for CoPar {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Template for CoPar {
    type Feature = (i32, i32);

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<(i32, i32)>) {
        let tree = &parse.tree;
        for id in tree.nodes_preorder() {
            if !tree.is_coordination(id) {
                continue;
            }
            for depth in 1..=MAX_DEPTH {
                for (prev, child) in conjuncts(tree, id) {
                    let m = self.match_nodes(tree, depth, prev, child);
                    if m != -1 {
                        counts.incr((depth, m));
                    }
                }
            }
        }
    }
}

/// Length difference of adjacent conjuncts, clamped to [-5, 5], and whether
/// the later conjunct is the last child
#[derive(Debug, Clone, Copy, Default)]
pub struct CoLenPar;

impl Template for CoLenPar {
    type Feature = (i32, i32);

    fn identifier(&self) -> &str {
        "CoLenPar"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<(i32, i32)>) {
        let tree = &parse.tree;
        let size = |id: NodeId| {
            let node = tree.node(id);
            (node.right - node.left) as i32
        };
        for id in tree.nodes_preorder() {
            if !tree.is_coordination(id) {
                continue;
            }
            for (prev, child) in conjuncts(tree, id) {
                let dsize = (size(child) - size(prev)).clamp(-5, 5);
                let last = i32::from(tree.next_sibling(child).is_none());
                counts.incr((dsize, last));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tests::{keys, parse, rendered};

    const PARALLEL: &str =
        "(S1 (S (NP (NP (NNS cats)) (CC and) (NP (NNS dogs))) (VP (VBP run))))";
    const SKEWED: &str =
        "(S1 (S (NP (NP (DT the) (NNS cats)) (CC and) (NP (NNS dogs))) (VP (VBP run))))";

    #[test]
    fn test_parallel_conjuncts() {
        let parse = parse(PARALLEL);
        let copar = CoPar::new(false);
        assert_eq!(copar.identifier(), "CoPar:0");
        // below depth 2 the conjuncts are bare preterminals
        assert_eq!(keys(&copar, &parse), vec!["(1 1)", "(2 1)"]);
    }

    #[test]
    fn test_ignored_preterminals() {
        let parse = parse(PARALLEL);
        assert_eq!(keys(&CoPar::new(true), &parse), vec!["(1 1)"]);
    }

    #[test]
    fn test_mismatch_at_every_depth() {
        let parse = parse(SKEWED);
        assert_eq!(
            keys(&CoPar::default(), &parse),
            vec!["(1 1)", "(2 0)", "(3 0)", "(4 0)", "(5 0)"]
        );
    }

    #[test]
    fn test_one_sided_preterminal_is_not_counted() {
        // the second conjunct's NN dominates another NN
        let parse = parse("(S1 (NP (NP (NN x)) (CC and) (NP (NN (NN y)))))");
        assert_eq!(keys(&CoPar::default(), &parse), vec!["(1 1)", "(2 1)"]);
    }

    #[test]
    fn test_no_coordination() {
        let parse = parse("(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))");
        assert!(keys(&CoPar::default(), &parse).is_empty());
        assert!(keys(&CoLenPar, &parse).is_empty());
    }

    #[test]
    fn test_conjunct_lengths() {
        let skewed = parse(SKEWED);
        assert_eq!(rendered(&CoLenPar, &skewed), vec![("(-1 1)".to_string(), 1.0)]);

        let long = parse(
            "(S1 (NP (NP (NNS cats)) (, ,) (NP (JJ big) (JJ old) (JJ fat) (JJ lazy) (JJ grey) \
             (NNS dogs)) (CC and) (NP (NNS fish)) (. .)))",
        );
        assert_eq!(keys(&CoLenPar, &long), vec!["(-5 0)", "(5 0)"]);
    }
}
