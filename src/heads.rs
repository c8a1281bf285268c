//! Head annotation
//!
//! Fills in the head slots and word-class flags of a freshly read [`Tree`].
//! Head children come from a [`HeadFinder`]; the crate ships
//! [`RuleTableHeads`], a compact Collins-style priority table with a few
//! semantic overrides (auxiliaries, prepositions and complementizers defer
//! to their complements). Lexical heads are then propagated bottom-up.

use crate::symbol::sym;
use crate::tree::{HeadType, NodeId, Tree};
use std::sync::Arc;

/// Tags treated as punctuation
const PUNCTUATION_TAGS: [&str; 8] = ["''", ":", "#", ",", ".", "``", "-LRB-", "-RRB-"];

/// Tags of closed-class words
const CLOSED_CLASS_TAGS: [&str; 15] = [
    "CC", "DT", "EX", "IN", "MD", "PDT", "POS", "PRP", "PRP$", "RP", "TO", "WDT", "WP", "WP$",
    "WRB",
];

/// Verb forms that make a verbal preterminal functional
const AUXILIARIES: [&str; 30] = [
    "be", "is", "am", "are", "was", "were", "been", "being", "'s", "'re", "'m", "have", "has",
    "had", "having", "'ve", "'d", "do", "does", "did", "will", "would", "shall", "should", "can",
    "could", "may", "might", "must", "ca",
];

/// Something that picks the head child of a nonterminal
pub trait HeadFinder {
    fn headchild(&self, tree: &Tree, node: NodeId, head_type: HeadType) -> Option<NodeId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    LeftToRight,
    RightToLeft,
}

/// One priority list. An empty list takes the first child in `direction`.
struct HeadRule {
    direction: Direction,
    cats: &'static [&'static str],
}

use Direction::{LeftToRight, RightToLeft};

const fn rule(direction: Direction, cats: &'static [&'static str]) -> HeadRule {
    HeadRule { direction, cats }
}

const NP_RULES: [HeadRule; 6] = [
    rule(RightToLeft, &["POS", "NN", "NNP", "NNPS", "NNS", "NX", "JJR"]),
    rule(LeftToRight, &["NP"]),
    rule(RightToLeft, &["$", "ADJP", "PRN"]),
    rule(RightToLeft, &["CD"]),
    rule(RightToLeft, &["JJ", "JJS", "RB", "QP"]),
    rule(RightToLeft, &[]),
];

fn syntactic_rules(cat: &str) -> &'static [HeadRule] {
    const ADJP: [HeadRule; 1] = [rule(
        LeftToRight,
        &[
            "NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS", "DT",
            "FW", "RBR", "RBS", "SBAR", "RB",
        ],
    )];
    const ADVP: [HeadRule; 1] = [rule(
        RightToLeft,
        &["RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN"],
    )];
    const CONJP: [HeadRule; 1] = [rule(RightToLeft, &["CC", "RB", "IN"])];
    const LST: [HeadRule; 1] = [rule(RightToLeft, &["LS", ":"])];
    const PP: [HeadRule; 1] = [rule(RightToLeft, &["IN", "TO", "VBG", "VBN", "RP", "FW"])];
    const PRT: [HeadRule; 1] = [rule(RightToLeft, &["RP"])];
    const QP: [HeadRule; 1] = [rule(
        LeftToRight,
        &["$", "IN", "NNS", "NN", "JJ", "RB", "DT", "CD", "NCD", "QP", "JJR", "JJS"],
    )];
    const RRC: [HeadRule; 1] = [rule(RightToLeft, &["VP", "NP", "ADVP", "ADJP", "PP"])];
    const S: [HeadRule; 1] = [rule(
        LeftToRight,
        &["TO", "IN", "VP", "S", "SBAR", "ADJP", "UCP", "NP"],
    )];
    const SBAR: [HeadRule; 1] = [rule(
        LeftToRight,
        &[
            "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT", "S", "SQ", "SINV", "SBAR", "FRAG",
        ],
    )];
    const SBARQ: [HeadRule; 1] = [rule(LeftToRight, &["SQ", "S", "SINV", "SBARQ", "FRAG"])];
    const SINV: [HeadRule; 1] = [rule(
        LeftToRight,
        &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "S", "SINV", "ADJP", "NP"],
    )];
    const SQ: [HeadRule; 1] = [rule(
        LeftToRight,
        &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "SQ"],
    )];
    const VP: [HeadRule; 1] = [rule(
        LeftToRight,
        &[
            "TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NN", "NNS", "NP",
        ],
    )];
    const WHADJP: [HeadRule; 1] = [rule(LeftToRight, &["CC", "WRB", "JJ", "ADJP"])];
    const WHADVP: [HeadRule; 1] = [rule(RightToLeft, &["CC", "WRB"])];
    const WHNP: [HeadRule; 1] = [rule(
        LeftToRight,
        &["WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP"],
    )];
    const WHPP: [HeadRule; 1] = [rule(RightToLeft, &["IN", "TO", "FW"])];
    const LEFTMOST: [HeadRule; 1] = [rule(LeftToRight, &[])];
    const RIGHTMOST: [HeadRule; 1] = [rule(RightToLeft, &[])];

    match cat {
        "NP" | "NX" | "NAC" => &NP_RULES,
        "ADJP" => &ADJP,
        "ADVP" => &ADVP,
        "CONJP" => &CONJP,
        "LST" => &LST,
        "PP" => &PP,
        "PRT" => &PRT,
        "QP" => &QP,
        "RRC" => &RRC,
        "S" => &S,
        "SBAR" => &SBAR,
        "SBARQ" => &SBARQ,
        "SINV" => &SINV,
        "SQ" => &SQ,
        "VP" => &VP,
        "WHADJP" => &WHADJP,
        "WHADVP" => &WHADVP,
        "WHNP" => &WHNP,
        "WHPP" => &WHPP,
        "FRAG" | "UCP" | "X" => &RIGHTMOST,
        _ => &LEFTMOST,
    }
}

const PP_SEMANTIC: HeadRule = rule(
    LeftToRight,
    &["NP", "S", "SBAR", "SQ", "VP", "ADJP", "ADVP", "PP"],
);
const SBAR_SEMANTIC: HeadRule = rule(LeftToRight, &["S", "SQ", "SINV", "SBAR", "FRAG"]);

/// Fixed head-rule table
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTableHeads;

impl RuleTableHeads {
    /// Search `candidates` for the first category of `rule`, in rule order
    fn search(&self, candidates: &[(NodeId, Arc<str>)], rule: &HeadRule) -> Option<NodeId> {
        let ordered = |cat: Option<&str>| -> Option<NodeId> {
            let matches = |(_, c): &&(NodeId, Arc<str>)| cat.is_none_or(|cat| &**c == cat);
            match rule.direction {
                LeftToRight => candidates.iter().find(matches),
                RightToLeft => candidates.iter().rev().find(matches),
            }
            .map(|&(id, _)| id)
        };
        if rule.cats.is_empty() {
            return ordered(None);
        }
        rule.cats.iter().find_map(|&cat| ordered(Some(cat)))
    }

    fn syntactic(&self, candidates: &[(NodeId, Arc<str>)], cat: &str) -> Option<NodeId> {
        let rules = syntactic_rules(cat);
        rules
            .iter()
            .find_map(|rule| self.search(candidates, rule))
            .or_else(|| {
                let direction = rules.first().map_or(LeftToRight, |r| r.direction);
                self.search(candidates, &HeadRule { direction, cats: &[] })
            })
    }
}

impl HeadFinder for RuleTableHeads {
    fn headchild(&self, tree: &Tree, node: NodeId, head_type: HeadType) -> Option<NodeId> {
        let candidates: Vec<(NodeId, Arc<str>)> = tree
            .children(node)
            .iter()
            .filter(|&&c| !tree.is_punctuation(c))
            .map(|&c| (c, tree.symbols.resolve(tree.cat(c))))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let cat = tree.symbols.resolve(tree.cat(node));
        let syntactic = self.syntactic(&candidates, &cat);
        if head_type == HeadType::Syntactic {
            return syntactic;
        }
        let semantic = match &*cat {
            "VP" => syntactic.filter(|&h| tree.is_functional(h)).and_then(|h| {
                candidates
                    .iter()
                    .skip_while(|&&(c, _)| c != h)
                    .skip(1)
                    .find(|(_, c)| &**c == "VP")
                    .map(|&(id, _)| id)
            }),
            "PP" => self.search(&candidates, &PP_SEMANTIC),
            "SBAR" => self.search(&candidates, &SBAR_SEMANTIC),
            _ => None,
        };
        semantic.or(syntactic)
    }
}

/// Compute flags, head children and lexical heads for every node
pub fn annotate(tree: &mut Tree, finder: &impl HeadFinder) {
    for id in 0..tree.nodes.len() {
        if tree.is_terminal(id) {
            continue;
        }
        let cat = tree.symbols.resolve(tree.cat(id));
        let conjunction = tree.cat(id) == sym::CC || tree.cat(id) == sym::CONJP;
        let mut flags = tree.flags(id);
        flags.conjunction = conjunction;
        if tree.is_preterminal(id) {
            let word = tree.symbols.resolve(tree.word(id));
            flags.punctuation = PUNCTUATION_TAGS.contains(&&*cat);
            flags.closed_class = CLOSED_CLASS_TAGS.contains(&&*cat);
            flags.functional = flags.closed_class
                || ((cat.starts_with("VB") || &*cat == "MD")
                    && AUXILIARIES.contains(&word.to_lowercase().as_str()));
        }
        tree.nodes[id].flags = flags;
    }

    for id in 0..tree.nodes.len() {
        if !tree.is_nonterminal(id) {
            continue;
        }
        let syntactic = finder.headchild(tree, id, HeadType::Syntactic);
        let semantic = finder.headchild(tree, id, HeadType::Semantic);
        let node = &mut tree.nodes[id];
        node.syntactic_headchild = syntactic;
        node.semantic_headchild = semantic;
    }

    // children always have larger ids than their parents
    for id in (0..tree.nodes.len()).rev() {
        if tree.is_terminal(id) {
            continue;
        }
        let (syntactic, semantic) = if tree.is_preterminal(id) {
            (Some(id), Some(id))
        } else {
            let node = tree.node(id);
            (
                node.syntactic_headchild
                    .and_then(|h| tree.lexhead(h, HeadType::Syntactic)),
                node.semantic_headchild
                    .and_then(|h| tree.lexhead(h, HeadType::Semantic)),
            )
        };
        let node = &mut tree.nodes[id];
        node.syntactic_lexhead = syntactic;
        node.semantic_lexhead = semantic;
    }

    for id in 0..tree.nodes.len() {
        if !tree.is_nonterminal(id) {
            continue;
        }
        let children = tree.children(id);
        let coordination = children.iter().skip(1).any(|&c| tree.is_conjunction(c));
        let adjunction = !coordination
            && children.len() >= 2
            && tree
                .headchild(id, HeadType::Syntactic)
                .is_some_and(|h| tree.cat(h) == tree.cat(id));
        let flags = &mut tree.nodes[id].flags;
        flags.coordination = coordination;
        flags.adjunction = adjunction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolPool;
    use crate::treebank::parse_tree;

    fn find(tree: &Tree, cat: &str) -> NodeId {
        let pool = &tree.symbols;
        tree.nodes_preorder()
            .into_iter()
            .find(|&n| &*pool.resolve(tree.cat(n)) == cat)
            .unwrap()
    }

    fn word(tree: &Tree, id: Option<NodeId>) -> String {
        tree.symbols.resolve(tree.word(id.unwrap())).to_string()
    }

    #[test]
    fn test_np_and_clause_heads() {
        let pool = SymbolPool::new();
        let tree = parse_tree(
            "(S1 (S (NP (DT The) (JJ old) (NN dog)) (VP (VBZ barks)) (. .)))",
            &pool,
            false,
        )
        .unwrap();
        let np = find(&tree, "NP");
        let s = find(&tree, "S");
        assert_eq!(word(&tree, tree.lexhead(np, HeadType::Syntactic)), "dog");
        assert_eq!(word(&tree, tree.lexhead(s, HeadType::Syntactic)), "barks");
        assert_eq!(word(&tree, tree.lexhead(tree.root, HeadType::Semantic)), "barks");
    }

    #[test]
    fn test_semantic_heads_skip_auxiliaries() {
        let pool = SymbolPool::new();
        let tree = parse_tree(
            "(S1 (S (NP (PRP She)) (VP (MD will) (VP (VB leave) (PP (IN for) (NP (NNP Rome)))))))",
            &pool,
            false,
        )
        .unwrap();
        let vp = find(&tree, "VP");
        let pp = find(&tree, "PP");
        assert_eq!(word(&tree, tree.lexhead(vp, HeadType::Syntactic)), "will");
        assert_eq!(word(&tree, tree.lexhead(vp, HeadType::Semantic)), "leave");
        assert_eq!(word(&tree, tree.lexhead(pp, HeadType::Syntactic)), "for");
        assert_eq!(word(&tree, tree.lexhead(pp, HeadType::Semantic)), "Rome");
    }

    #[test]
    fn test_word_class_flags() {
        let pool = SymbolPool::new();
        let tree = parse_tree(
            "(S1 (S (NP (PRP It)) (VP (VBZ is) (ADJP (JJ red))) (. .)))",
            &pool,
            false,
        )
        .unwrap();
        let pts = tree.preterminals();
        assert!(tree.is_closed_class(pts[0]));
        assert!(tree.is_functional(pts[1]));
        assert!(!tree.is_closed_class(pts[1]));
        assert!(!tree.is_functional(pts[2]));
        assert!(tree.is_punctuation(pts[3]));
    }

    #[test]
    fn test_coordination_and_adjunction() {
        let pool = SymbolPool::new();
        let tree = parse_tree(
            "(S1 (S (NP (NP (NNS cats)) (CC and) (NP (NNS dogs))) (VP (VBP run) (ADVP (RB fast)))))",
            &pool,
            false,
        )
        .unwrap();
        let coord = find(&tree, "NP");
        assert!(tree.is_coordination(coord));
        assert!(!tree.is_adjunction(coord));

        let tree = parse_tree(
            "(S1 (S (NP (NP (NNS cats)) (PP (IN from) (NP (NNP Rome)))) (VP (VBP run))))",
            &pool,
            false,
        )
        .unwrap();
        let adj = find(&tree, "NP");
        assert!(tree.is_adjunction(adj));
        assert!(!tree.is_coordination(adj));
    }

    #[test]
    fn test_punctuation_only_constituent_has_no_head() {
        let pool = SymbolPool::new();
        let tree = parse_tree("(S1 (S (NP (NN x)) (FRAG (, ,) (. .))))", &pool, false).unwrap();
        let frag = find(&tree, "FRAG");
        assert_eq!(tree.headchild(frag, HeadType::Syntactic), None);
        assert_eq!(tree.lexhead(frag, HeadType::Semantic), None);
    }
}
