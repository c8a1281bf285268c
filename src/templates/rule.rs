//! Rule-shape features
//!
//! [`Rule`], [`NGram`] and [`NNGram`] describe a local tree by the
//! categories of its children, optionally lexicalized, followed by a chain
//! of ancestor categories. They share a [`RuleConfig`] that controls
//! lexicalization and ancestor annotation.
//!
//! Lexicalization is applied per child at two levels: [`Level::Pos`] adds
//! the lexical head's part of speech (when it differs from the child) and
//! [`Level::Lexical`] adds the head word. An instance is only emitted if the
//! highest level actually reached equals the highest level configured, so a
//! lexicalized template never degrades to its unlexicalized counterpart.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template, is_bounding, symbol_quantize};
use crate::symbol::{Sym, sym};
use crate::templates::semantic_first_code;
use crate::tree::{HeadType, NodeId, Tree};
use std::iter;

/// How much of a lexical head to add to a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Level {
    #[default]
    None = 0,
    Pos = 1,
    Lexical = 2,
}

/// Lexicalization and ancestor annotation shared by the rule templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleConfig {
    /// Ancestor categories above the local tree
    pub nanccats: usize,
    /// Mark the first bounding node below a non-bounding one
    pub label_root: bool,
    /// Mark coordination and adjunction parents
    pub label_conjunct: bool,
    /// Lexicalization of the head child
    pub head: Level,
    /// Lexicalization of children headed by function words
    pub functional: Level,
    /// Lexicalization of every child
    pub all: Level,
    pub head_type: HeadType,
}

impl RuleConfig {
    pub fn new(nanccats: usize) -> Self {
        Self {
            nanccats,
            label_root: false,
            label_conjunct: false,
            head: Level::None,
            functional: Level::None,
            all: Level::None,
            head_type: HeadType::Syntactic,
        }
    }

    pub fn root(mut self, label_root: bool) -> Self {
        self.label_root = label_root;
        self
    }

    pub fn conjunct(mut self, label_conjunct: bool) -> Self {
        self.label_conjunct = label_conjunct;
        self
    }

    pub fn lexicalize(mut self, head: Level, functional: Level) -> Self {
        self.head = head;
        self.functional = functional;
        self
    }

    pub fn all(mut self, all: Level) -> Self {
        self.all = all;
        self
    }

    pub fn head_type(mut self, head_type: HeadType) -> Self {
        self.head_type = head_type;
        self
    }

    fn identifier(&self, stem: &str) -> String {
        format!(
            "{stem}:{}:{}:{}:{}:{}:{}:{}",
            self.nanccats,
            u8::from(self.label_root),
            u8::from(self.label_conjunct),
            self.head as u8,
            self.functional as u8,
            self.all as u8,
            semantic_first_code(self.head_type),
        )
    }

    fn max_level(&self) -> Level {
        self.head.max(self.functional).max(self.all)
    }

    fn lexicalized_at(&self, level: Level, tree: &Tree, lexhead: NodeId, is_head: bool) -> bool {
        self.all >= level
            || (tree.is_functional(lexhead) && self.functional >= level)
            || (is_head && self.head >= level)
    }

    /// Push `node` as a child of `parent`, lexicalized as configured
    fn push_child(
        &self,
        tree: &Tree,
        node: NodeId,
        parent: NodeId,
        f: &mut Vec<Sym>,
        highest: &mut Level,
    ) {
        let is_head = tree.headchild(parent, self.head_type) == Some(node);
        f.push(tree.cat(node));
        let Some(lexhead) = tree.lexhead(node, self.head_type) else {
            return;
        };
        if !self.lexicalized_at(Level::Pos, tree, lexhead, is_head) {
            return;
        }
        if lexhead != node {
            f.push(sym::HEADMARKER);
            f.push(tree.cat(lexhead));
            *highest = (*highest).max(Level::Pos);
        }
        if !self.lexicalized_at(Level::Lexical, tree, lexhead, is_head) {
            return;
        }
        f.push(tree.word(lexhead));
        *highest = Level::Lexical;
    }

    fn push_ancestors(&self, tree: &Tree, node: NodeId, f: &mut Vec<Sym>) {
        f.push(sym::ENDMARKER);
        let mut node = node;
        let mut parent = tree.parent(node);
        for _ in 0..=self.nanccats {
            let Some(p) = parent else {
                break;
            };
            f.push(tree.cat(node));
            if self.label_conjunct {
                let last = tree.is_last_nonpunctuation(p);
                if tree.is_coordination(p) {
                    f.push(if last { sym::LASTCONJUNCTMARKER } else { sym::CONJUNCTMARKER });
                } else if tree.is_adjunction(p) {
                    f.push(if last { sym::LASTADJUNCTMARKER } else { sym::ADJUNCTMARKER });
                }
            }
            node = p;
            parent = tree.parent(node);
        }

        if self.label_root {
            let mut up = parent;
            while let Some(n) = up {
                if is_bounding(tree, Some(n)) && !is_bounding(tree, tree.parent(n)) {
                    f.push(sym::NONROOTMARKER);
                    break;
                }
                up = tree.parent(n);
            }
        }
    }
}

/// Children of a local tree plus up to `nanctrees` enclosing local trees
#[derive(Debug, Clone)]
pub struct Rule {
    nanctrees: usize,
    config: RuleConfig,
    identifier: String,
}

impl Rule {
    pub fn new(nanctrees: usize, config: RuleConfig) -> Self {
        Self {
            nanctrees,
            config,
            identifier: config.identifier(&format!("Rule:{nanctrees}")),
        }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::new(0, RuleConfig::new(0))
    }
}

impl Template for Rule {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        let config = &self.config;
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let mut f = Vec::new();
            let mut highest = Level::None;
            for &child in tree.children(id) {
                config.push_child(tree, child, id, &mut f, &mut highest);
            }

            let mut node = id;
            for _ in 0..self.nanctrees {
                let Some(parent) = tree.parent(node) else {
                    break;
                };
                f.push(sym::ENDMARKER);
                for &child in tree.children(parent) {
                    if child == node {
                        f.push(sym::CHILDMARKER);
                        f.push(tree.cat(child));
                    } else {
                        // head status is tested against `node`, so siblings never count as heads
                        config.push_child(tree, child, node, &mut f, &mut highest);
                    }
                }
                node = parent;
            }

            if highest != config.max_level() {
                continue;
            }
            config.push_ancestors(tree, node, &mut f);
            counts.incr(f);
        }
    }
}

/// `[⊥, c1 .. cn, ⊥]` for a nonterminal's children
fn padded_children(tree: &Tree, node: NodeId) -> Vec<Option<NodeId>> {
    iter::once(None)
        .chain(tree.children(node).iter().copied().map(Some))
        .chain(iter::once(None))
        .collect()
}

/// Windows of `fraglen` adjacent children, marked for their side of the head
#[derive(Debug, Clone)]
pub struct NGram {
    fraglen: usize,
    config: RuleConfig,
    identifier: String,
}

impl NGram {
    pub fn new(fraglen: usize, config: RuleConfig) -> Self {
        Self {
            fraglen,
            config,
            identifier: config.identifier(&format!("NGram:{fraglen}")),
        }
    }
}

impl Default for NGram {
    fn default() -> Self {
        Self::new(3, RuleConfig::new(1))
    }
}

impl Template for NGram {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        let config = &self.config;
        'nodes: for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) || tree.children(id).len() < self.fraglen {
                continue;
            }
            let headchild = tree.headchild(id, config.head_type);
            let window = padded_children(tree, id);
            let mut headposition = sym::PREHEADMARKER;

            for start in 0..=window.len() - self.fraglen {
                if window[start] == headchild {
                    headposition = sym::POSTHEADMARKER;
                }
                let mut f = Vec::new();
                let mut highest = Level::None;
                let mut includes_headchild = false;
                for &child in &window[start..start + self.fraglen] {
                    match child {
                        Some(child) => config.push_child(tree, child, id, &mut f, &mut highest),
                        None => f.push(sym::ENDMARKER),
                    }
                    if child == headchild {
                        includes_headchild = true;
                    }
                }
                f.push(headposition);

                if !includes_headchild && config.head != Level::None {
                    if let Some(headchild) = headchild {
                        config.push_child(tree, headchild, id, &mut f, &mut highest);
                    }
                }

                if highest != config.max_level() {
                    continue 'nodes;
                }
                config.push_ancestors(tree, id, &mut f);
                counts.incr(f);
            }
        }
    }
}

/// [`NGram`] with optional quantized direction and distance to the head
#[derive(Debug, Clone)]
pub struct NNGram {
    fraglen: usize,
    config: RuleConfig,
    headdir: bool,
    headdist: bool,
    identifier: String,
}

impl NNGram {
    pub fn new(fraglen: usize, config: RuleConfig, headdir: bool, headdist: bool) -> Self {
        let stem = format!(
            "NNGram:{fraglen}:{}:{}",
            u8::from(headdir),
            u8::from(headdist)
        );
        Self {
            fraglen,
            config,
            headdir,
            headdist,
            identifier: config.identifier(&stem),
        }
    }
}

impl Template for NNGram {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        let config = &self.config;
        let fraglen = self.fraglen;
        'nodes: for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let children = tree.children(id);
            let headchild = tree.headchild(id, config.head_type);
            let headlocation = headchild
                .and_then(|h| children.iter().position(|&c| c == h))
                .unwrap_or(0);
            if children.len() + 1 < fraglen {
                continue;
            }
            let window = padded_children(tree, id);
            let mut headposition = sym::PREHEADMARKER;

            for start in 0..=window.len() - fraglen {
                if window[start] == headchild {
                    headposition = sym::POSTHEADMARKER;
                }
                let mut f = Vec::new();
                let mut highest = Level::None;
                let mut includes_headchild = false;
                for &child in &window[start..start + fraglen] {
                    match child {
                        Some(child) => {
                            config.push_child(tree, child, id, &mut f, &mut highest);
                            includes_headchild |= Some(child) == headchild;
                        }
                        None => f.push(sym::ENDMARKER),
                    }
                }

                // the head child sits at window index headlocation + 1
                if self.headdir {
                    if includes_headchild {
                        f.push(symbol_quantize(headlocation + 1 - start));
                    } else {
                        f.push(headposition);
                    }
                }
                if self.headdist {
                    let gap = if headlocation + 1 < start {
                        start - headlocation - 1
                    } else if headlocation + 1 >= start + fraglen {
                        headlocation + 2 - (start + fraglen)
                    } else {
                        0
                    };
                    f.push(symbol_quantize(gap));
                }
                if config.head != Level::None {
                    match headchild {
                        Some(headchild) => {
                            config.push_child(tree, headchild, id, &mut f, &mut highest)
                        }
                        None => f.push(sym::HEADMARKER),
                    }
                }

                if highest != config.max_level() {
                    continue 'nodes;
                }
                config.push_ancestors(tree, id, &mut f);
                counts.incr(f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tests::{keys, parse, rendered};

    const DOG: &str = "(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))";

    #[test]
    fn test_identifiers() {
        assert_eq!(Rule::default().identifier(), "Rule:0:0:0:0:0:0:0:1");
        let config = RuleConfig::new(1)
            .root(true)
            .lexicalize(Level::Lexical, Level::Pos)
            .head_type(HeadType::Semantic);
        assert_eq!(NGram::new(2, config).identifier(), "NGram:2:1:1:0:2:1:0:0");
        assert_eq!(
            NNGram::new(3, RuleConfig::new(1), true, false).identifier(),
            "NNGram:3:1:0:1:0:0:0:0:0:1"
        );
    }

    #[test]
    fn test_unlexicalized_rules() {
        let parse = parse(DOG);
        assert_eq!(
            keys(&Rule::default(), &parse),
            vec!["(DT NN _ NP)", "(NP VP . _ S)", "(S _)", "(VBZ _ VP)"]
        );
    }

    #[test]
    fn test_head_lexicalized_rules() {
        let parse = parse(DOG);
        let rule = Rule::new(0, RuleConfig::new(0).lexicalize(Level::Lexical, Level::None));
        assert_eq!(
            keys(&rule, &parse),
            vec![
                "(DT NN dog _ NP)",
                "(NP VP *HEAD* VBZ barks . _ S)",
                "(S *HEAD* VBZ barks _)",
                "(VBZ barks _ VP)",
            ]
        );
    }

    #[test]
    fn test_enclosing_local_tree() {
        let parse = parse(DOG);
        let keys = keys(&Rule::new(1, RuleConfig::new(0)), &parse);
        assert!(keys.contains(&"(DT NN _ *CHILD* NP VP . _ S)".to_string()));
        // the top local tree has no parent to add
        assert!(keys.contains(&"(S _)".to_string()));
    }

    #[test]
    fn test_conjunct_markers() {
        let parse = parse("(S1 (S (NP (NP (NNS cats)) (CC and) (NP (NNS dogs))) (VP (VBP run))))");
        let rule = Rule::new(0, RuleConfig::new(1).conjunct(true));
        let found = rendered(&rule, &parse);
        assert!(found.contains(&("(NNS _ NP *CONJ* NP)".to_string(), 2.0)));
    }

    #[test]
    fn test_root_marker() {
        let parse = parse(DOG);
        let keys = keys(&Rule::new(0, RuleConfig::new(0).root(true)), &parse);
        assert!(keys.contains(&"(DT NN _ NP *NONROOT*)".to_string()));
        assert!(keys.contains(&"(NP VP . _ S)".to_string()));
    }

    #[test]
    fn test_ngram_windows() {
        let parse = parse(DOG);
        let keys = keys(&NGram::new(2, RuleConfig::new(1)), &parse);
        assert_eq!(keys.len(), 7);
        for expected in [
            "(_ NP *PREHEAD* _ S)",
            "(NP VP *PREHEAD* _ S)",
            "(VP . *POSTHEAD* _ S)",
            "(. _ *POSTHEAD* _ S)",
            "(DT NN *PREHEAD* _ NP S)",
        ] {
            assert!(keys.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_ngram_level_check_abandons_node() {
        let parse = parse(DOG);
        let ngram = NGram::new(2, RuleConfig::new(0).lexicalize(Level::None, Level::Lexical));
        // a window without a function word ends the walk of its node
        assert_eq!(
            keys(&ngram, &parse),
            vec!["(DT The NN *PREHEAD* _ NP)", "(_ DT The *PREHEAD* _ NP)"]
        );
    }

    #[test]
    fn test_nngram_direction_and_distance() {
        let parse = parse(DOG);
        let keys = keys(&NNGram::new(2, RuleConfig::new(1), true, true), &parse);
        for expected in [
            "(_ NP *PREHEAD* 2 _ S)",
            "(NP VP 1 0 _ S)",
            "(VP . 0 0 _ S)",
            "(. _ *POSTHEAD* 1 _ S)",
        ] {
            assert!(keys.contains(&expected.to_string()), "missing {expected}");
        }
    }
}
