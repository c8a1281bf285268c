//! Head alignment features
//!
//! Agreement between a clause and its subject, disagreement between
//! syntactic and semantic heads, and the right-branching context of each
//! non-head child.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template, symbol_quantize};
use crate::symbol::{Sym, sym};
use crate::templates::head_code;
use crate::tree::{HeadType, NodeId};

/// Subject head POS paired with the clause's head POS.
///
/// The subject of an S or SINV is its last NP child before the first VP.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjVerbAgr;

impl Template for SubjVerbAgr {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        "SubjVerbAgr"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        for id in tree.nodes_preorder() {
            let cat = tree.cat(id);
            if cat != sym::S && cat != sym::SINV {
                continue;
            }
            let Some(verb) = tree.lexhead(id, HeadType::Syntactic) else {
                continue;
            };
            let subject = tree
                .children(id)
                .iter()
                .copied()
                .take_while(|&c| tree.cat(c) != sym::VP)
                .filter(|&c| tree.cat(c) == sym::NP)
                .last();
            let Some(noun) = subject.and_then(|s| tree.lexhead(s, HeadType::Semantic)) else {
                continue;
            };
            counts.incr(vec![tree.cat(noun), tree.cat(verb)]);
        }
    }
}

/// How much of each head [`SynSemHeads`] writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynSemAnnotation {
    /// Parts of speech only
    #[default]
    None = 0,
    /// Also the syntactic head word
    LexSyn = 1,
    /// Both head words
    LexAll = 2,
}

/// Syntactic and semantic lexical heads of nodes where they differ
#[derive(Debug, Clone)]
pub struct SynSemHeads {
    annotation: SynSemAnnotation,
    identifier: String,
}

impl SynSemHeads {
    pub fn new(annotation: SynSemAnnotation) -> Self {
        Self {
            annotation,
            identifier: format!("SynSemHeads:{}", annotation as u8),
        }
    }
}

impl Default for SynSemHeads {
    fn default() -> Self {
        Self::new(SynSemAnnotation::None)
    }
}

impl Template for SynSemHeads {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        let cat_or_end = |head: Option<_>| head.map_or(sym::ENDMARKER, |h| tree.cat(h));
        for id in tree.nodes_preorder() {
            let syntactic = tree.lexhead(id, HeadType::Syntactic);
            let semantic = tree.lexhead(id, HeadType::Semantic);
            if syntactic == semantic {
                continue;
            }

            let mut f = vec![cat_or_end(syntactic)];
            if self.annotation != SynSemAnnotation::None {
                let Some(head) = syntactic else { continue };
                f.push(tree.word(head));
            }
            f.push(cat_or_end(semantic));
            if self.annotation == SynSemAnnotation::LexAll {
                let Some(head) = semantic else { continue };
                f.push(tree.word(head));
            }
            counts.incr(f);
        }
    }
}

/// Category and head distance of each non-head child.
///
/// Children after the head child carry a post-head marker. The distance is
/// the number of words between a child's lexical head and its right edge,
/// binned.
#[derive(Debug, Clone)]
pub struct RBContext {
    label_coordination: bool,
    label_parent: bool,
    label_governor: bool,
    head_type: HeadType,
    identifier: String,
}

impl RBContext {
    pub fn new(
        label_coordination: bool,
        label_parent: bool,
        label_governor: bool,
        head_type: HeadType,
    ) -> Self {
        Self {
            label_coordination,
            label_parent,
            label_governor,
            head_type,
            identifier: format!(
                "RBContext:{}:{}:{}:{}",
                u8::from(label_coordination),
                u8::from(label_parent),
                u8::from(label_governor),
                head_code(head_type)
            ),
        }
    }
}

impl Default for RBContext {
    fn default() -> Self {
        Self::new(false, false, false, HeadType::Syntactic)
    }
}

impl Template for RBContext {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        let distance = |id: NodeId, lexhead: NodeId| {
            symbol_quantize(tree.node(id).right - tree.node(lexhead).right)
        };
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let Some(headchild) = tree.headchild(id, self.head_type) else {
                continue;
            };
            let Some(lexhead) = tree.lexhead(headchild, self.head_type) else {
                continue;
            };

            let mut f = Vec::new();
            if self.label_coordination && tree.is_coordination(id) {
                f.push(sym::CONJUNCTMARKER);
            }
            if self.label_parent {
                f.push(tree.cat(id));
            }
            if self.label_governor {
                f.push(tree.cat(headchild));
                f.push(distance(headchild, lexhead));
            }
            for &child in tree.children(id) {
                if child == headchild {
                    f.push(sym::POSTHEADMARKER);
                    continue;
                }
                let Some(lexhead) = tree.lexhead(child, self.head_type) else {
                    continue;
                };
                let mut instance = f.clone();
                instance.push(tree.cat(child));
                instance.push(distance(child, lexhead));
                counts.incr(instance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tests::{keys, parse};

    const DOG: &str = "(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))";
    const WILL: &str = "(S1 (S (NP (PRP She)) (VP (MD will) (VP (VB leave)))))";

    #[test]
    fn test_subject_verb_agreement() {
        let parse = parse(DOG);
        assert_eq!(keys(&SubjVerbAgr, &parse), vec!["(NN VBZ)"]);
    }

    #[test]
    fn test_subject_precedes_verb_phrase() {
        // the NP after the VP is not a subject
        let parse = parse("(S1 (S (VP (VB Go)) (NP (NN home))))");
        assert!(keys(&SubjVerbAgr, &parse).is_empty());
    }

    #[test]
    fn test_syntactic_semantic_heads() {
        let will = parse(WILL);
        assert_eq!(keys(&SynSemHeads::default(), &will), vec!["(MD VB)"]);
        let lex_syn = SynSemHeads::new(SynSemAnnotation::LexSyn);
        assert_eq!(lex_syn.identifier(), "SynSemHeads:1");
        assert_eq!(keys(&lex_syn, &will), vec!["(MD will VB)"]);
        assert_eq!(
            keys(&SynSemHeads::new(SynSemAnnotation::LexAll), &will),
            vec!["(MD will VB leave)"]
        );
        assert!(keys(&SynSemHeads::default(), &parse(DOG)).is_empty());
    }

    #[test]
    fn test_right_branch_context() {
        let parse = parse(DOG);
        let template = RBContext::default();
        assert_eq!(template.identifier(), "RBContext:0:0:0:0");
        assert_eq!(
            keys(&template, &parse),
            vec!["(*POSTHEAD* . 0)", "(DT 0)", "(NP 0)"]
        );
    }

    #[test]
    fn test_right_branch_context_labels() {
        let parse = parse(DOG);
        let template = RBContext::new(false, true, true, HeadType::Syntactic);
        // parent, head child and its distance come first
        assert!(keys(&template, &parse).contains(&"(S VP 0 NP 0)".to_string()));
    }
}
