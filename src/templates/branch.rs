//! Branching-direction features
//!
//! These walk sibling lists from one end and ignore punctuation, so a
//! trailing full stop does not take a constituent off the right branch.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template};
use crate::tree::{NodeId, Tree};

/// Counts nodes on the rightmost branch (key 1) and off it (key 0)
#[derive(Debug, Clone, Copy, Default)]
pub struct RightBranch;

impl RightBranch {
    fn visit(tree: &Tree, nodes: &[NodeId], rightmost: i32, counts: &mut FeatureCounts<i32>) {
        let mut rightmost = rightmost;
        for &node in nodes.iter().rev() {
            if tree.is_punctuation(node) {
                continue;
            }
            counts.incr(rightmost);
            if tree.is_nonterminal(node) {
                Self::visit(tree, tree.children(node), rightmost, counts);
            }
            rightmost = 0;
        }
    }
}

impl Template for RightBranch {
    type Feature = i32;

    fn identifier(&self) -> &str {
        "RightBranch"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        let tree = &parse.tree;
        Self::visit(tree, &[tree.root], 1, counts);
    }
}

/// `floor(log2(n))`, for `n >= 1`
#[inline]
fn log2_bin(n: usize) -> i32 {
    n.max(1).ilog2() as i32
}

/// Per word, the binned length of the left-branching chain ending there
#[derive(Debug, Clone, Copy, Default)]
pub struct LeftBranchLength;

impl LeftBranchLength {
    fn visit(tree: &Tree, nodes: &[NodeId], leftmost: usize, counts: &mut FeatureCounts<i32>) {
        let mut leftmost = leftmost;
        for &node in nodes {
            if tree.is_punctuation(node) {
                continue;
            }
            if tree.is_preterminal(node) {
                counts.incr(log2_bin(leftmost));
            } else {
                Self::visit(tree, tree.children(node), leftmost + 1, counts);
            }
            leftmost = 1;
        }
    }
}

impl Template for LeftBranchLength {
    type Feature = i32;

    fn identifier(&self) -> &str {
        "LeftBranchLength"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        let tree = &parse.tree;
        Self::visit(tree, &[tree.root], 1, counts);
    }
}

/// Per word, the binned length of the right-branching chain ending there
#[derive(Debug, Clone, Copy, Default)]
pub struct RightBranchLength;

impl RightBranchLength {
    fn visit(tree: &Tree, nodes: &[NodeId], rightmost: usize, counts: &mut FeatureCounts<i32>) {
        let mut rightmost = rightmost;
        for &node in nodes.iter().rev() {
            if tree.is_punctuation(node) {
                continue;
            }
            if tree.is_preterminal(node) {
                counts.incr(log2_bin(rightmost));
            } else {
                Self::visit(tree, tree.children(node), rightmost + 1, counts);
            }
            rightmost = 1;
        }
    }
}

impl Template for RightBranchLength {
    type Feature = i32;

    fn identifier(&self) -> &str {
        "RightBranchLength"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        let tree = &parse.tree;
        Self::visit(tree, &[tree.root], 1, counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tests::{parse, rendered};

    const DOG: &str = "(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))";
    const PARK: &str = "(S1 (S (NP (NP (DT The) (NN dog)) (PP (IN in) (NP (DT the) (NN park)))) (VP (VBZ barks))))";

    #[test]
    fn test_right_branch_ignores_final_punctuation() {
        let parse = parse(DOG);
        // ROOT, S, VP and VBZ are on the right branch
        assert_eq!(
            rendered(&RightBranch, &parse),
            vec![("0".to_string(), 3.0), ("1".to_string(), 4.0)]
        );
    }

    #[test]
    fn test_branch_lengths() {
        let parse = parse(DOG);
        // The: ROOT S NP DT; dog: 1; barks: 1 + VP
        assert_eq!(
            rendered(&LeftBranchLength, &parse),
            vec![
                ("0".to_string(), 1.0),
                ("1".to_string(), 1.0),
                ("2".to_string(), 1.0)
            ]
        );
        // barks: ROOT S VP VBZ; dog: 1 + NN; The: 1
        assert_eq!(
            rendered(&RightBranchLength, &parse),
            vec![
                ("0".to_string(), 1.0),
                ("1".to_string(), 1.0),
                ("2".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn test_strictly_right_branching() {
        let parse = parse("(S1 (X (A a) (X (B b) (X (C c) (D d)))))");
        // ROOT, three Xs and D are on the right branch; A, B and C are not
        assert_eq!(
            rendered(&RightBranch, &parse),
            vec![("0".to_string(), 3.0), ("1".to_string(), 5.0)]
        );
        // d sits at the end of a chain of five
        assert_eq!(
            rendered(&RightBranchLength, &parse),
            vec![("0".to_string(), 3.0), ("2".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_deep_left_branch() {
        let parse = parse(PARK);
        // The: ROOT S NP NP DT is a chain of 5; dog 1; in 2; the 2; park 1; barks 2
        assert_eq!(
            rendered(&LeftBranchLength, &parse),
            vec![
                ("0".to_string(), 2.0),
                ("1".to_string(), 3.0),
                ("2".to_string(), 1.0)
            ]
        );
    }
}
