//! Words in their vertical context

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template};
use crate::symbol::Sym;
use crate::templates::semantic_first_code;
use crate::tree::HeadType;

/// A word followed by `nanccats` categories, starting with its own tag.
///
/// Words with fewer than `nanccats` nodes above them are not counted.
#[derive(Debug, Clone)]
pub struct Word {
    nanccats: usize,
    identifier: String,
}

impl Word {
    pub fn new(nanccats: usize) -> Self {
        Self {
            nanccats,
            identifier: format!("Word:{nanccats}"),
        }
    }
}

impl Default for Word {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Template for Word {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        'words: for &pt in tree.preterminals() {
            let mut f = vec![tree.word(pt)];
            let mut node = Some(pt);
            for _ in 0..self.nanccats {
                let Some(n) = node else {
                    continue 'words;
                };
                f.push(tree.cat(n));
                node = tree.parent(n);
            }
            counts.incr(f);
        }
    }
}

/// A word projected up to its maximal projection, plus `nancs` ancestors
#[derive(Debug, Clone)]
pub struct WProj {
    head_type: HeadType,
    include_nonmaximal: bool,
    nancs: usize,
    identifier: String,
}

impl WProj {
    pub fn new(head_type: HeadType, include_nonmaximal: bool, nancs: usize) -> Self {
        Self {
            head_type,
            include_nonmaximal,
            nancs,
            identifier: format!(
                "WProj:{}:{}:{nancs}",
                semantic_first_code(head_type),
                u8::from(include_nonmaximal)
            ),
        }
    }
}

impl Default for WProj {
    fn default() -> Self {
        Self::new(HeadType::Semantic, false, 1)
    }
}

impl Template for WProj {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        for &pt in tree.preterminals() {
            if tree.is_punctuation(pt) {
                continue;
            }
            let mut f = vec![tree.word(pt)];
            let mut node = pt;
            // the root never counts as a projection
            while let Some(parent) = tree.parent(node) {
                if tree.is_root(parent) || tree.headchild(parent, self.head_type) != Some(node) {
                    break;
                }
                if self.include_nonmaximal {
                    f.push(tree.cat(node));
                }
                node = parent;
            }

            let mut node = Some(node);
            for _ in 0..=self.nancs {
                let Some(n) = node else {
                    break;
                };
                f.push(tree.cat(n));
                node = tree.parent(n);
            }
            counts.incr(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tests::{keys, parse};

    const DOG: &str = "(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))";

    #[test]
    fn test_word_categories() {
        let parse = parse(DOG);
        assert_eq!(
            keys(&Word::new(2), &parse),
            vec!["(. . S)", "(The DT NP)", "(barks VBZ VP)", "(dog NN NP)"]
        );
    }

    #[test]
    fn test_word_needs_enough_ancestors() {
        let parse = parse(DOG);
        // the final stop has only S and ROOT above it
        assert_eq!(
            keys(&Word::new(4), &parse),
            vec!["(The DT NP S ROOT)", "(barks VBZ VP S ROOT)", "(dog NN NP S ROOT)"]
        );
    }

    #[test]
    fn test_projections() {
        let parse = parse(DOG);
        let wproj = WProj::default();
        assert_eq!(wproj.identifier(), "WProj:0:0:1");
        assert_eq!(
            keys(&wproj, &parse),
            vec!["(The DT NP)", "(barks S ROOT)", "(dog NP S)"]
        );
    }

    #[test]
    fn test_nonmaximal_projections() {
        let parse = parse(DOG);
        let wproj = WProj::new(HeadType::Syntactic, true, 0);
        assert_eq!(wproj.identifier(), "WProj:1:1:0");
        assert_eq!(
            keys(&wproj, &parse),
            vec!["(The DT)", "(barks VBZ VP S)", "(dog NN NP)"]
        );
    }
}
