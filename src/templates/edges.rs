//! Constituent edge contexts
//!
//! Every nonterminal is described by its category and the preterminals
//! around its left and right edges. Positions are preterminal offsets, so
//! punctuation counts, and a position outside the sentence reads as `_`.
//! Windows inside the constituent (after the left edge, before the right
//! edge) must fit within it or the node is skipped.

use crate::corpus::Parse;
use crate::feature::{
    FeatureCounts, Template, quantize, spans_preterminals, suffix, symbol_quantize,
};
use crate::symbol::{Sym, sym};
use crate::tree::{NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Tag,
    Word,
}

impl Token {
    #[inline]
    fn of(self, tree: &Tree, pt: NodeId) -> Sym {
        match self {
            Token::Tag => tree.cat(pt),
            Token::Word => tree.word(pt),
        }
    }
}

/// The `n` positions before `edge`, nearest first
fn preceding(edge: usize, n: usize) -> impl Iterator<Item = Option<usize>> {
    (1..=n).map(move |i| edge.checked_sub(i))
}

/// The `n` positions from `edge` on
fn following(edge: usize, n: usize, len: usize) -> impl Iterator<Item = Option<usize>> {
    (0..n).map(move |i| Some(edge + i).filter(|&j| j < len))
}

fn push_tokens(
    tree: &Tree,
    positions: impl Iterator<Item = Option<usize>>,
    token: Token,
    f: &mut Vec<Sym>,
) {
    let pts = tree.preterminals();
    f.extend(positions.map(|p| p.map_or(sym::ENDMARKER, |j| token.of(tree, pts[j]))));
}

/// Window sizes around the two edges of a constituent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Widths {
    left_prec: usize,
    left_succ: usize,
    right_prec: usize,
    right_succ: usize,
}

/// Tag and word windows, pushed side by side for each edge window
#[derive(Debug, Clone, Copy)]
struct EdgeWalk {
    binned: bool,
    tags: Widths,
    words: Widths,
}

impl EdgeWalk {
    fn enumerate_into(&self, tree: &Tree, counts: &mut FeatureCounts<Vec<Sym>>) {
        if !spans_preterminals(tree) {
            return;
        }
        let len = tree.len();
        let inner = self
            .tags
            .left_succ
            .max(self.tags.right_prec)
            .max(self.words.left_succ)
            .max(self.words.right_prec);
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let node = tree.node(id);
            let (left, right) = (node.left, node.right);
            if inner > right - left {
                continue;
            }

            let mut f = Vec::new();
            if self.binned {
                f.push(symbol_quantize(right - left));
            }
            f.push(node.cat);
            let (tags, words) = (&self.tags, &self.words);
            push_tokens(tree, preceding(left, tags.left_prec), Token::Tag, &mut f);
            push_tokens(tree, preceding(left, words.left_prec), Token::Word, &mut f);
            push_tokens(tree, following(left, tags.left_succ, len), Token::Tag, &mut f);
            push_tokens(tree, following(left, words.left_succ, len), Token::Word, &mut f);
            push_tokens(tree, preceding(right, tags.right_prec), Token::Tag, &mut f);
            push_tokens(tree, preceding(right, words.right_prec), Token::Word, &mut f);
            push_tokens(tree, following(right, tags.right_succ, len), Token::Tag, &mut f);
            push_tokens(tree, following(right, words.right_succ, len), Token::Word, &mut f);
            counts.incr(f);
        }
    }
}

/// Tags around each edge of a constituent
#[derive(Debug, Clone)]
pub struct Edges {
    walk: EdgeWalk,
    identifier: String,
}

impl Edges {
    pub fn new(
        binned: bool,
        left_prec: usize,
        left_succ: usize,
        right_prec: usize,
        right_succ: usize,
    ) -> Self {
        let tags = Widths {
            left_prec,
            left_succ,
            right_prec,
            right_succ,
        };
        Self {
            walk: EdgeWalk {
                binned,
                tags,
                words: Widths::default(),
            },
            identifier: format!(
                "Edges:{}:{left_prec}:{left_succ}:{right_prec}:{right_succ}",
                u8::from(binned)
            ),
        }
    }
}

impl Template for Edges {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        self.walk.enumerate_into(&parse.tree, counts);
    }
}

/// Words around each edge of a constituent
#[derive(Debug, Clone)]
pub struct WordEdges {
    walk: EdgeWalk,
    identifier: String,
}

impl WordEdges {
    pub fn new(
        binned: bool,
        left_prec: usize,
        left_succ: usize,
        right_prec: usize,
        right_succ: usize,
    ) -> Self {
        let words = Widths {
            left_prec,
            left_succ,
            right_prec,
            right_succ,
        };
        Self {
            walk: EdgeWalk {
                binned,
                tags: Widths::default(),
                words,
            },
            identifier: format!(
                "WordEdges:{}:{left_prec}:{left_succ}:{right_prec}:{right_succ}",
                u8::from(binned)
            ),
        }
    }
}

impl Template for WordEdges {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        self.walk.enumerate_into(&parse.tree, counts);
    }
}

/// Tags and words around each edge, with separate widths for each
#[derive(Debug, Clone)]
pub struct WEdges {
    walk: EdgeWalk,
    identifier: String,
}

impl WEdges {
    /// Widths come in (tags, words) pairs: left preceding, left following,
    /// right preceding, right following.
    pub fn new(
        binned: bool,
        left_prec: [usize; 2],
        left_succ: [usize; 2],
        right_prec: [usize; 2],
        right_succ: [usize; 2],
    ) -> Self {
        let widths = |i: usize| Widths {
            left_prec: left_prec[i],
            left_succ: left_succ[i],
            right_prec: right_prec[i],
            right_succ: right_succ[i],
        };
        let identifier = format!(
            "WEdges:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            u8::from(binned),
            left_prec[0],
            left_prec[1],
            left_succ[0],
            left_succ[1],
            right_prec[0],
            right_prec[1],
            right_succ[0],
            right_succ[1],
        );
        Self {
            walk: EdgeWalk {
                binned,
                tags: widths(0),
                words: widths(1),
            },
            identifier,
        }
    }
}

impl Template for WEdges {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        self.walk.enumerate_into(&parse.tree, counts);
    }
}

/// Tokens to the left of a constituent, counted from `left` itself.
///
/// This is one position off from [`Edges`]; existing models depend on it.
fn neighbours_left(left: usize, n: usize) -> impl Iterator<Item = Option<usize>> {
    (0..n).map(move |i| (i <= left).then(|| left - i))
}

/// Category, binned length and neighbouring tags
#[derive(Debug, Clone)]
pub struct Neighbours {
    nleft: usize,
    nright: usize,
    identifier: String,
}

impl Neighbours {
    pub fn new(nleft: usize, nright: usize) -> Self {
        Self {
            nleft,
            nright,
            identifier: format!("Neighbours:{nleft}:{nright}"),
        }
    }
}

impl Template for Neighbours {
    type Feature = (i32, Vec<Sym>);

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<(i32, Vec<Sym>)>) {
        let tree = &parse.tree;
        if !spans_preterminals(tree) {
            return;
        }
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let node = tree.node(id);
            let mut f = vec![node.cat];
            push_tokens(tree, neighbours_left(node.left, self.nleft), Token::Tag, &mut f);
            push_tokens(tree, following(node.right, self.nright, tree.len()), Token::Tag, &mut f);
            counts.incr((quantize(node.right - node.left), f));
        }
    }
}

/// Category, optional binned length and neighbouring words
#[derive(Debug, Clone)]
pub struct WordNeighbours {
    binned: bool,
    nleft: usize,
    nright: usize,
    identifier: String,
}

impl WordNeighbours {
    pub fn new(binned: bool, nleft: usize, nright: usize) -> Self {
        Self {
            binned,
            nleft,
            nright,
            identifier: format!("WordNeighbours:{}:{nleft}:{nright}", u8::from(binned)),
        }
    }
}

impl Template for WordNeighbours {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        if !spans_preterminals(tree) {
            return;
        }
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let node = tree.node(id);
            let mut f = Vec::new();
            if self.binned {
                f.push(symbol_quantize(node.right - node.left));
            }
            f.push(node.cat);
            push_tokens(tree, neighbours_left(node.left, self.nleft), Token::Word, &mut f);
            push_tokens(tree, following(node.right, self.nright, tree.len()), Token::Word, &mut f);
            counts.incr(f);
        }
    }
}

/// What [`WSEdges`] reads from the positions on one side of one edge.
///
/// Each count is a number of positions, walking away from the edge.
/// Punctuation positions give the punctuation tag or `0`, closed-class
/// positions give closed-class words (and punctuation) or the tag, and word
/// positions give the word cut to `nsuffix` characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeSpec {
    pub punct: usize,
    pub pos: usize,
    pub closed: usize,
    pub word: usize,
    pub nsuffix: usize,
}

impl EdgeSpec {
    pub const fn new(punct: usize, pos: usize, closed: usize, word: usize) -> Self {
        Self {
            punct,
            pos,
            closed,
            word,
            nsuffix: 0,
        }
    }

    pub const fn suffix(mut self, nsuffix: usize) -> Self {
        self.nsuffix = nsuffix;
        self
    }

    fn identifier(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.punct, self.pos, self.closed, self.word, self.nsuffix
        )
    }

    fn width(&self) -> usize {
        self.punct.max(self.pos).max(self.word)
    }

    fn push(&self, tree: &Tree, position: isize, direction: isize, f: &mut Vec<Sym>) {
        let pts = tree.preterminals();
        let at = |i: usize| -> Option<NodeId> {
            let j = position + i as isize * direction;
            usize::try_from(j).ok().and_then(|j| pts.get(j).copied())
        };
        for i in 0..self.punct {
            f.push(at(i).map_or(sym::ENDMARKER, |pt| {
                if tree.is_punctuation(pt) { tree.cat(pt) } else { sym::ZERO }
            }));
        }
        for i in 0..self.pos {
            f.push(at(i).map_or(sym::ENDMARKER, |pt| tree.cat(pt)));
        }
        for i in 0..self.closed {
            f.push(at(i).map_or(sym::ENDMARKER, |pt| {
                if tree.is_closed_class(pt) || tree.is_punctuation(pt) {
                    tree.word(pt)
                } else {
                    tree.cat(pt)
                }
            }));
        }
        for i in 0..self.word {
            f.push(at(i).map_or(sym::ENDMARKER, |pt| {
                suffix(&tree.symbols, tree.word(pt), self.nsuffix)
            }));
        }
    }
}

/// Edge contexts with an [`EdgeSpec`] for each of the four edge sides
#[derive(Debug, Clone)]
pub struct WSEdges {
    left_left: EdgeSpec,
    left_right: EdgeSpec,
    right_left: EdgeSpec,
    right_right: EdgeSpec,
    binned: bool,
    identifier: String,
}

impl WSEdges {
    pub fn new(
        binned: bool,
        left_left: EdgeSpec,
        left_right: EdgeSpec,
        right_left: EdgeSpec,
        right_right: EdgeSpec,
    ) -> Self {
        let identifier = format!(
            "WSEdges:{}:ll{}:lr{}:rl{}:rr{}",
            u8::from(binned),
            left_left.identifier(),
            left_right.identifier(),
            right_left.identifier(),
            right_right.identifier()
        );
        Self {
            left_left,
            left_right,
            right_left,
            right_right,
            binned,
            identifier,
        }
    }
}

impl Template for WSEdges {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        if !spans_preterminals(tree) {
            return;
        }
        let len = tree.len();
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let node = tree.node(id);
            let (left, right) = (node.left, node.right);
            if left + self.left_right.width() > right
                || left + self.right_left.width() > right
                || left + 1 < self.left_left.width()
                || right + self.right_right.width() > len
            {
                continue;
            }

            let mut f = vec![node.cat];
            if self.binned {
                f.push(symbol_quantize(right - left));
            }
            let (left, right) = (left as isize, right as isize);
            self.left_left.push(tree, left - 1, -1, &mut f);
            self.left_right.push(tree, left, 1, &mut f);
            self.right_left.push(tree, right - 1, -1, &mut f);
            self.right_right.push(tree, right, 1, &mut f);
            counts.incr(f);
        }
    }
}

/// Constituent weight and position relative to the end of the sentence
#[derive(Debug, Clone, Copy, Default)]
pub struct Heavy;

impl Template for Heavy {
    type Feature = (Vec<i32>, Vec<Sym>);

    fn identifier(&self) -> &str {
        "Heavy"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Self::Feature>) {
        let tree = &parse.tree;
        if !spans_preterminals(tree) {
            return;
        }
        let pts = tree.preterminals();
        let punct_word = |pt: Option<&NodeId>| match pt {
            Some(&pt) if tree.is_punctuation(pt) => tree.word(pt),
            _ => sym::ENDMARKER,
        };
        for id in tree.nodes_preorder() {
            if !tree.is_nonterminal(id) {
                continue;
            }
            let node = tree.node(id);
            let (left, right) = (node.left, node.right);
            let final_punct = punct_word(right.checked_sub(1).and_then(|i| pts.get(i)));
            let following_punct = punct_word(pts.get(right));
            counts.incr((
                vec![quantize(right - left), quantize(pts.len() - right)],
                vec![node.cat, final_punct, following_punct],
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tests::{keys, parse};

    // The0 dog1 barks2 .3
    const DOG: &str = "(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))";

    #[test]
    fn test_tag_edges() {
        let parse = parse(DOG);
        let edges = Edges::new(false, 1, 0, 0, 1);
        assert_eq!(edges.identifier(), "Edges:0:1:0:0:1");
        assert_eq!(
            keys(&edges, &parse),
            vec!["(NP _ VBZ)", "(ROOT _ _)", "(S _ _)", "(VP NN .)"]
        );
    }

    #[test]
    fn test_inner_window_must_fit() {
        let parse = parse(DOG);
        // the VP spans one word
        assert_eq!(
            keys(&Edges::new(false, 0, 2, 0, 0), &parse),
            vec!["(NP DT NN)", "(ROOT DT NN)", "(S DT NN)"]
        );
    }

    #[test]
    fn test_inner_windows_on_both_sides() {
        let parse = parse(DOG);
        // the one-word VP is skipped; the two-word NP fits each window
        assert_eq!(
            keys(&Edges::new(false, 0, 2, 2, 0), &parse),
            vec!["(NP DT NN NN DT)", "(ROOT DT NN . VBZ)", "(S DT NN . VBZ)"]
        );
    }

    #[test]
    fn test_word_edges_binned() {
        let parse = parse(DOG);
        assert_eq!(
            keys(&WordEdges::new(true, 1, 0, 0, 1), &parse),
            vec!["(1 VP dog .)", "(2 NP _ barks)", "(4 ROOT _ _)", "(4 S _ _)"]
        );
    }

    #[test]
    fn test_mixed_edges() {
        let parse = parse(DOG);
        let wedges = WEdges::new(false, [1, 1], [0, 0], [0, 0], [0, 0]);
        assert_eq!(wedges.identifier(), "WEdges:0:1:1:0:0:0:0:0:0");
        assert!(keys(&wedges, &parse).contains(&"(VP NN dog)".to_string()));
    }

    #[test]
    fn test_neighbours_start_inside() {
        let parse = parse(DOG);
        assert_eq!(
            keys(&Neighbours::new(1, 1), &parse),
            vec!["(1 (VP VBZ .))", "(2 (NP DT VBZ))", "(4 (ROOT DT _))", "(4 (S DT _))"]
        );
        assert!(
            keys(&WordNeighbours::new(false, 1, 0), &parse).contains(&"(VP barks)".to_string())
        );
    }

    #[test]
    fn test_wsedges_outer_right() {
        let parse = parse(DOG);
        let empty = EdgeSpec::default();
        let wsedges = WSEdges::new(false, empty, empty, empty, EdgeSpec::new(1, 1, 1, 1));
        assert_eq!(
            wsedges.identifier(),
            "WSEdges:0:ll0:0:0:0:0:lr0:0:0:0:0:rl0:0:0:0:0:rr1:1:1:1:0"
        );
        // constituents ending at the sentence edge have no room on the right
        assert_eq!(
            keys(&wsedges, &parse),
            vec!["(NP 0 VBZ VBZ barks)", "(VP . . . .)"]
        );
    }

    #[test]
    fn test_wsedges_outer_left_binned() {
        let parse = parse(DOG);
        let empty = EdgeSpec::default();
        let wsedges = WSEdges::new(true, EdgeSpec::new(0, 1, 0, 0), empty, empty, empty);
        assert_eq!(
            keys(&wsedges, &parse),
            vec!["(NP 2 _)", "(ROOT 4 _)", "(S 4 _)", "(VP 1 NN)"]
        );
    }

    #[test]
    fn test_heavy() {
        let parse = parse(DOG);
        assert_eq!(
            keys(&Heavy, &parse),
            vec![
                "((1 1) (VP _ .))",
                "((2 2) (NP _ _))",
                "((4 0) (ROOT . _))",
                "((4 0) (S . _))",
            ]
        );
    }
}
