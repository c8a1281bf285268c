//! Named feature sets
//!
//! Each set registers a fixed list of configured templates, in a fixed
//! order, into a fresh [`FeatureRegistry`]. Feature ids follow registration
//! order, so reordering a set changes the meaning of existing weight files.
//! A template whose identifier is already registered is skipped.

use crate::config::ConfigError;
use crate::registry::FeatureRegistry;
use crate::symbol::SymbolPool;
use crate::templates::{
    CoLenPar, CoPar, EdgeSpec, Edges, HeadInfo, HeadTree, Heads, Heavy, Level, Lexicalize,
    NGram, NGramTree, NLogP, NNGram, Neighbours, RBContext, RightBranch, Rule, RuleConfig,
    WEdges, WProj, WSEdges, WSHeads, Word, WordEdges,
};
use crate::tree::HeadType::{self, Semantic, Syntactic};

/// Every name accepted by [`build`]
pub const FEATURE_SETS: [&str; 21] = [
    "nfeatures",
    "sfeatures",
    "conll",
    "050902",
    "071114",
    "splh",
    "splhnn",
    "splhlocal",
    "splhsuffix0",
    "splhsuffix1",
    "splhsuffix3",
    "wedges",
    "ws",
    "wsall",
    "wshead",
    "wsedge",
    "wsedge0",
    "wsedge1",
    "wsngram",
    "wsngramtree",
    "wsrbcontext",
];

pub fn is_known(name: &str) -> bool {
    FEATURE_SETS.contains(&name)
}

/// Build the registry for the feature set `name`
pub fn build(name: &str, symbols: SymbolPool) -> Result<FeatureRegistry, ConfigError> {
    let mut r = FeatureRegistry::new(symbols);
    match name {
        "nfeatures" => nfeatures(&mut r),
        "sfeatures" => sfeatures(&mut r),
        "conll" => conll(&mut r),
        "050902" => features_050902(&mut r),
        "071114" => features_071114(&mut r),
        "splh" => splh(&mut r, false, false),
        "splhnn" => splh(&mut r, false, true),
        "splhlocal" => splh(&mut r, true, false),
        "splhsuffix0" => splh_suffix(&mut r, 0, false),
        "splhsuffix1" => splh_suffix(&mut r, 1, false),
        "splhsuffix3" => splh_suffix(&mut r, 3, false),
        "wedges" => wedges(&mut r),
        "ws" => ws(&mut r, WsParts::default()),
        "wsall" => ws(
            &mut r,
            WsParts {
                heads: true,
                edges: EdgeBins::Both,
                ngram: true,
                ngramtree: true,
                rbcontext: true,
            },
        ),
        "wshead" => ws(&mut r, WsParts::only_heads()),
        "wsedge" => ws(&mut r, WsParts::only_edges(EdgeBins::Both)),
        "wsedge0" => ws(&mut r, WsParts::only_edges(EdgeBins::Unbinned)),
        "wsedge1" => ws(&mut r, WsParts::only_edges(EdgeBins::Binned)),
        "wsngram" => ws(
            &mut r,
            WsParts {
                ngram: true,
                ..WsParts::none()
            },
        ),
        "wsngramtree" => ws(
            &mut r,
            WsParts {
                ngramtree: true,
                ..WsParts::none()
            },
        ),
        "wsrbcontext" => ws(
            &mut r,
            WsParts {
                rbcontext: true,
                ..WsParts::none()
            },
        ),
        _ => return Err(ConfigError::UnknownFeatureSet(name.to_string())),
    }
    log::info!("There are {} feature classes.", r.len());
    Ok(r)
}

fn rule(nanctrees: usize, config: RuleConfig) -> Rule {
    Rule::new(nanctrees, config)
}

fn ngram(fraglen: usize, config: RuleConfig) -> NGram {
    NGram::new(fraglen, config)
}

/// One ancestor category, as the n-gram templates use
fn anc1() -> RuleConfig {
    RuleConfig::new(1)
}

fn lexical(head: Level, functional: Level) -> RuleConfig {
    RuleConfig::new(0).lexicalize(head, functional)
}

fn rbcontext(coordination: bool, parent: bool, governor: bool) -> RBContext {
    RBContext::new(coordination, parent, governor, Syntactic)
}

fn wsheads(
    nheads: usize,
    governor: HeadInfo,
    dependent: HeadInfo,
    head_type: HeadType,
) -> WSHeads {
    WSHeads::new(0, true, nheads, governor, dependent, head_type)
}

/// Local-tree rules shared by most sets
fn local_rules(r: &mut FeatureRegistry) {
    r.push(rule(0, RuleConfig::new(1)));
    r.push(rule(0, RuleConfig::new(0).root(true)));
    r.push(rule(0, RuleConfig::new(0).conjunct(true)));
    r.push(rule(0, lexical(Level::Lexical, Level::None)));
    r.push(rule(0, lexical(Level::None, Level::Lexical)));
    r.push(rule(0, lexical(Level::Lexical, Level::Lexical)));
}

/// Plain, parent and root-marked grandparent rules
fn ancestor_rules(r: &mut FeatureRegistry) {
    r.push(Rule::default());
    r.push(rule(1, RuleConfig::new(0)));
    r.push(rule(1, RuleConfig::new(1).root(true)));
}

fn ngrams(r: &mut FeatureRegistry) {
    r.push(ngram(1, anc1().conjunct(true)));
    r.push(ngram(2, anc1().root(true).conjunct(true)));
    r.push(ngram(3, anc1().root(true).conjunct(true)));
    r.push(ngram(2, anc1().lexicalize(Level::Lexical, Level::None)));
    r.push(ngram(2, anc1().lexicalize(Level::None, Level::Lexical)));
}

fn nngrams(r: &mut FeatureRegistry) {
    let nngram = |fraglen, config| NNGram::new(fraglen, config, true, true);
    r.push(nngram(1, anc1().conjunct(true)));
    r.push(nngram(2, anc1().root(true).conjunct(true)));
    r.push(nngram(3, anc1().root(true).conjunct(true)));
    r.push(nngram(2, anc1().lexicalize(Level::Lexical, Level::None)));
    r.push(nngram(2, anc1().lexicalize(Level::Lexical, Level::Lexical)));
}

fn words(r: &mut FeatureRegistry) {
    r.push(Word::new(1));
    r.push(Word::new(2));
    r.push(WProj::default());
}

fn ngram_trees(r: &mut FeatureRegistry) {
    r.push(NGramTree::new(2, Lexicalize::None, true, 0));
    r.push(NGramTree::new(2, Lexicalize::All, true, 0));
    r.push(NGramTree::new(3, Lexicalize::Functional, true, 0));
}

fn head_trees(r: &mut FeatureRegistry) {
    r.push(HeadTree::new(true, false, 0, Syntactic));
    r.push(HeadTree::new(true, false, 0, Semantic));
    r.push(HeadTree::new(true, true, 0, Semantic));
}

fn heads(r: &mut FeatureRegistry) {
    r.push(Heads::new(2, false, false, Syntactic));
    r.push(Heads::new(2, true, true, Syntactic));
    r.push(Heads::new(2, true, true, Semantic));
    r.push(Heads::new(3, false, false, Syntactic));
}

fn rbcontexts(r: &mut FeatureRegistry) {
    r.push(rbcontext(false, false, false));
    r.push(rbcontext(false, true, false));
    r.push(rbcontext(false, true, true));
    r.push(rbcontext(true, false, false));
    r.push(rbcontext(true, true, false));
    r.push(rbcontext(true, true, true));
}

fn coordination(r: &mut FeatureRegistry) {
    r.push(CoPar::new(false));
    r.push(CoLenPar);
}

/// Call `push` with every (binned, lp, ls, rp, rs) window whose widths are
/// at most `maxwidth` and sum to at most `maxsumwidth`
fn edge_grid(maxwidth: usize, maxsumwidth: usize, mut push: impl FnMut(bool, [usize; 4])) {
    for binned in [false, true] {
        for lp in 0..=maxwidth {
            for ls in 0..=maxwidth {
                for rp in 0..=maxwidth {
                    for rs in 0..=maxwidth {
                        if lp + ls + rp + rs <= maxsumwidth {
                            push(binned, [lp, ls, rp, rs]);
                        }
                    }
                }
            }
        }
    }
}

fn edges(r: &mut FeatureRegistry, maxwidth: usize, maxsumwidth: usize) {
    edge_grid(maxwidth, maxsumwidth, |b, [lp, ls, rp, rs]| {
        r.push(Edges::new(b, lp, ls, rp, rs));
    });
    edge_grid(maxwidth, maxsumwidth, |b, [lp, ls, rp, rs]| {
        r.push(WordEdges::new(b, lp, ls, rp, rs));
    });
}

fn conll(r: &mut FeatureRegistry) {
    r.push(NLogP);
    r.push(Rule::default());
    local_rules(r);
    r.push(rule(1, RuleConfig::new(0)));
    r.push(rule(1, RuleConfig::new(1)));
    ngrams(r);
    words(r);
    r.push(RightBranch);
    r.push(Heavy);
    ngram_trees(r);
    head_trees(r);
    heads(r);
    r.push(Neighbours::new(0, 0));
    r.push(Neighbours::new(0, 1));
    r.push(Neighbours::new(1, 0));
    coordination(r);
}

fn features_050902(r: &mut FeatureRegistry) {
    r.push(NLogP);
    r.push(Rule::default());
    local_rules(r);
    ngrams(r);
    words(r);
    r.push(RightBranch);
    r.push(Heavy);
    ngram_trees(r);
    head_trees(r);
    heads(r);
    coordination(r);
    edges(r, 2, 2);
}

fn features_071114(r: &mut FeatureRegistry) {
    r.push(NLogP);
    rbcontexts(r);
    ancestor_rules(r);
    local_rules(r);
    ngrams(r);
    words(r);
    r.push(RightBranch);
    r.push(Heavy);
    ngram_trees(r);
    head_trees(r);
    heads(r);
    coordination(r);
    edges(r, 2, 2);
}

/// `local` leaves out the templates that look beyond one local tree
fn splh(r: &mut FeatureRegistry, local: bool, nngram: bool) {
    r.push(NLogP);
    r.push(RightBranch);
    r.push(Heavy);
    rbcontexts(r);
    ancestor_rules(r);
    local_rules(r);
    ngrams(r);
    if nngram {
        nngrams(r);
    }
    words(r);
    head_trees(r);
    heads(r);
    edges(r, 2, 3);
    if !local {
        ngram_trees(r);
        coordination(r);
    }
}

fn splh_suffix(r: &mut FeatureRegistry, nsuffix: usize, local: bool) {
    r.push(NLogP);
    r.push(RightBranch);
    r.push(Heavy);
    rbcontexts(r);
    ancestor_rules(r);
    local_rules(r);
    ngrams(r);
    words(r);
    head_trees(r);

    r.push(wsheads(2, HeadInfo::Pos, HeadInfo::Pos, Syntactic));
    r.push(wsheads(2, HeadInfo::Lexical, HeadInfo::Lexical, Syntactic));
    r.push(wsheads(2, HeadInfo::Lexical, HeadInfo::Lexical, Semantic));
    r.push(wsheads(3, HeadInfo::Pos, HeadInfo::Pos, Syntactic));
    if nsuffix > 0 {
        r.push(WSHeads::new(
            nsuffix,
            true,
            2,
            HeadInfo::Lexical,
            HeadInfo::Lexical,
            Syntactic,
        ));
    }

    let pos = |n| EdgeSpec::new(0, n, 0, 0);
    let word = |n| EdgeSpec::new(0, n, 0, n);
    edge_grid(2, 3, |b, [lp, ls, rp, rs]| {
        r.push(WSEdges::new(b, pos(lp), pos(ls), pos(rp), pos(rs)));
        if lp + ls + rp + rs > 0 {
            r.push(WSEdges::new(b, word(lp), word(ls), word(rp), word(rs)));
            if nsuffix > 0 {
                let suffix = |n| word(n).suffix(nsuffix);
                r.push(WSEdges::new(b, suffix(lp), suffix(ls), suffix(rp), suffix(rs)));
            }
        }
    });

    if !local {
        ngram_trees(r);
        coordination(r);
    }
}

fn wedges(r: &mut FeatureRegistry) {
    r.push(NLogP);
    r.push(RightBranch);
    r.push(Heavy);
    edge_grid(1, 2, |b, [lp, ls, rp, rs]| {
        for lpw in 0..=lp {
            for lsw in 0..=ls {
                for rpw in 0..=rp {
                    for rsw in 0..=rs {
                        r.push(WEdges::new(b, [lp, lpw], [ls, lsw], [rp, rpw], [rs, rsw]));
                    }
                }
            }
        }
    });
}

/// Which edge templates the `ws` sets include, by binning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeBins {
    None,
    Unbinned,
    Binned,
    Both,
}

#[derive(Debug, Clone, Copy)]
struct WsParts {
    heads: bool,
    edges: EdgeBins,
    ngram: bool,
    ngramtree: bool,
    rbcontext: bool,
}

impl WsParts {
    fn none() -> Self {
        Self {
            heads: false,
            edges: EdgeBins::None,
            ngram: false,
            ngramtree: false,
            rbcontext: false,
        }
    }

    fn only_heads() -> Self {
        Self {
            heads: true,
            ..Self::none()
        }
    }

    fn only_edges(edges: EdgeBins) -> Self {
        Self {
            edges,
            ..Self::none()
        }
    }
}

impl Default for WsParts {
    fn default() -> Self {
        Self::only_edges(EdgeBins::Both)
    }
}

const EMPTY: EdgeSpec = EdgeSpec::new(0, 0, 0, 0);
const PUNCT1: EdgeSpec = EdgeSpec::new(1, 0, 0, 0);
const POS1: EdgeSpec = EdgeSpec::new(1, 1, 0, 0);
const CLOSED1: EdgeSpec = EdgeSpec::new(1, 1, 1, 0);
const WORD1: EdgeSpec = EdgeSpec::new(1, 1, 1, 1);
const PUNCT2: EdgeSpec = EdgeSpec::new(2, 0, 0, 0);
const POS2: EdgeSpec = EdgeSpec::new(2, 1, 0, 0);
const CLOSED2: EdgeSpec = EdgeSpec::new(2, 1, 1, 0);
const WORD2: EdgeSpec = EdgeSpec::new(2, 1, 1, 1);

/// Head-dependency templates of the `ws` and `nfeatures` sets
fn ws_heads(r: &mut FeatureRegistry) {
    use HeadInfo::{ClosedClass, Lexical, Pos};
    r.push(wsheads(2, Pos, Pos, Syntactic));
    r.push(wsheads(2, Pos, ClosedClass, Syntactic));
    r.push(wsheads(2, ClosedClass, Pos, Syntactic));
    r.push(wsheads(2, ClosedClass, ClosedClass, Syntactic));
    r.push(wsheads(2, Lexical, ClosedClass, Syntactic));
    r.push(wsheads(2, ClosedClass, Lexical, Syntactic));
    r.push(wsheads(2, Lexical, Lexical, Syntactic));
    r.push(wsheads(2, Lexical, Lexical, Semantic));
    r.push(wsheads(3, Pos, Pos, Syntactic));
    r.push(wsheads(3, Pos, Pos, Semantic));
    r.push(wsheads(3, Pos, ClosedClass, Syntactic));
    r.push(wsheads(3, ClosedClass, Pos, Syntactic));
    r.push(wsheads(3, ClosedClass, ClosedClass, Syntactic));
}

fn ws(r: &mut FeatureRegistry, parts: WsParts) {
    r.push(NLogP);
    r.push(RightBranch);
    r.push(Heavy);

    if parts.heads {
        ws_heads(r);
    }

    let bins: &[bool] = match parts.edges {
        EdgeBins::None => &[],
        EdgeBins::Unbinned => &[false],
        EdgeBins::Binned => &[true],
        EdgeBins::Both => &[false, true],
    };
    let contexts = [PUNCT1, POS1, CLOSED1, WORD1, PUNCT2, POS2, CLOSED2];
    for &b in bins {
        r.push(WSEdges::new(b, EMPTY, EMPTY, EMPTY, EMPTY));
        // punctuation on both sides of the constituent
        r.push(WSEdges::new(b, PUNCT2, EMPTY, EMPTY, PUNCT2));
        for context in contexts {
            r.push(WSEdges::new(b, context, EMPTY, EMPTY, EMPTY));
            r.push(WSEdges::new(b, EMPTY, context, EMPTY, EMPTY));
            r.push(WSEdges::new(b, EMPTY, EMPTY, context, EMPTY));
            r.push(WSEdges::new(b, EMPTY, EMPTY, EMPTY, context));
            for outer in [PUNCT1, POS1, CLOSED1] {
                r.push(WSEdges::new(b, context, EMPTY, EMPTY, outer));
                r.push(WSEdges::new(b, EMPTY, context, EMPTY, outer));
                r.push(WSEdges::new(b, EMPTY, EMPTY, context, outer));
            }
        }
    }

    if parts.ngram {
        let lexicalized = [
            (Level::Lexical, Level::None),
            (Level::None, Level::Lexical),
            (Level::Lexical, Level::Lexical),
        ];
        for (root, conjunct) in [(false, false), (false, true), (true, false), (true, true)] {
            r.push(ngram(1, anc1().root(root).conjunct(conjunct)));
        }
        r.push(ngram(2, anc1().root(true).conjunct(true)));
        r.push(ngram(3, anc1().root(true).conjunct(true)));
        for (root, conjunct) in [(false, false), (true, false), (false, true)] {
            let config = anc1().root(root).conjunct(conjunct);
            for &(head, functional) in &lexicalized {
                r.push(ngram(1, config.lexicalize(head, functional)));
            }
            for &(head, functional) in &lexicalized[..2] {
                r.push(ngram(2, config.lexicalize(head, functional)));
            }
        }
    }

    if parts.ngramtree {
        for (n, lexicalize) in [
            (2, Lexicalize::None),
            (2, Lexicalize::Functional),
            (2, Lexicalize::All),
            (3, Lexicalize::None),
            (3, Lexicalize::Functional),
            (3, Lexicalize::All),
            (4, Lexicalize::None),
            (4, Lexicalize::Functional),
        ] {
            r.push(NGramTree::new(n, lexicalize, true, 0));
        }
    }

    if parts.rbcontext {
        for coordination in [false, true] {
            for parent in [false, true] {
                for governor in [false, true] {
                    r.push(rbcontext(coordination, parent, governor));
                }
            }
        }
    }
}

fn nfeatures(r: &mut FeatureRegistry) {
    r.push(NLogP);
    r.push(RightBranch);
    r.push(Heavy);

    r.push(CoPar::new(false));
    r.push(CoPar::new(true));
    r.push(CoLenPar);

    r.push(Word::new(1));
    r.push(Word::new(2));
    r.push(WProj::default());

    ws_heads(r);

    rbcontexts(r);
    r.push(RBContext::new(false, false, false, Semantic));
    r.push(RBContext::new(true, false, false, Semantic));
    r.push(RBContext::new(true, true, true, Semantic));

    r.push(rule(0, RuleConfig::new(1)));
    r.push(rule(1, RuleConfig::new(0)));
    r.push(rule(1, RuleConfig::new(1)));
    r.push(rule(0, RuleConfig::new(2)));
    r.push(rule(0, RuleConfig::new(0).root(true)));
    r.push(rule(0, RuleConfig::new(0).conjunct(true)));
    r.push(rule(0, lexical(Level::Lexical, Level::None)));
    r.push(rule(0, lexical(Level::None, Level::Lexical)));
    r.push(rule(0, lexical(Level::Lexical, Level::Lexical)));

    r.push(ngram(1, anc1().conjunct(true)));
    r.push(ngram(2, anc1()));
    r.push(ngram(2, anc1().root(true).conjunct(true)));
    r.push(ngram(3, anc1()));
    r.push(ngram(3, anc1().root(true).conjunct(true)));
    r.push(ngram(4, anc1()));
    r.push(ngram(2, anc1().lexicalize(Level::Lexical, Level::None)));
    r.push(ngram(2, anc1().lexicalize(Level::None, Level::Lexical)));

    r.push(NGramTree::new(2, Lexicalize::None, true, 0));
    r.push(NGramTree::new(2, Lexicalize::Functional, true, 0));
    r.push(NGramTree::new(2, Lexicalize::All, true, 0));
    r.push(NGramTree::new(3, Lexicalize::None, true, 0));
    r.push(NGramTree::new(3, Lexicalize::Functional, true, 0));

    head_trees(r);

    let e = |ll, lr, rl, rr| WSEdges::new(false, ll, lr, rl, rr);
    let binned = |ll, lr, rl, rr| WSEdges::new(true, ll, lr, rl, rr);

    r.push(e(PUNCT1, EMPTY, EMPTY, EMPTY));
    r.push(e(POS1, EMPTY, EMPTY, EMPTY));
    r.push(e(CLOSED1, EMPTY, EMPTY, EMPTY));
    r.push(e(PUNCT1, EMPTY, PUNCT1, PUNCT1));
    r.push(binned(PUNCT1, EMPTY, PUNCT1, PUNCT1));
    r.push(e(CLOSED1, CLOSED1, EMPTY, EMPTY));
    r.push(binned(CLOSED1, CLOSED1, EMPTY, EMPTY));
    r.push(e(CLOSED1, CLOSED1, PUNCT1, PUNCT1));
    r.push(e(WORD1, WORD1, EMPTY, EMPTY));

    // inner windows alone and against one outer window
    let inner = [PUNCT1, POS1, CLOSED1, WORD1, PUNCT2, POS2, CLOSED2];
    let paired = [PUNCT1, POS1, CLOSED1];
    for context in inner {
        r.push(e(EMPTY, context, EMPTY, EMPTY));
    }
    for outer in paired {
        for context in paired {
            r.push(e(EMPTY, context, EMPTY, outer));
        }
    }
    for context in inner {
        r.push(e(EMPTY, EMPTY, context, EMPTY));
    }
    for outer in paired {
        for context in paired {
            r.push(e(EMPTY, EMPTY, context, outer));
        }
    }

    for (context, with_binned) in [
        (PUNCT1, true),
        (PUNCT2, false),
        (POS1, true),
        (POS2, false),
        (CLOSED1, true),
        (CLOSED2, false),
        (WORD1, true),
        (WORD2, false),
    ] {
        r.push(e(EMPTY, EMPTY, EMPTY, context));
        if with_binned {
            r.push(binned(EMPTY, EMPTY, EMPTY, context));
        }
    }
}

fn sfeatures(r: &mut FeatureRegistry) {
    r.push(NLogP);
    r.push(RightBranch);
    r.push(Heavy);

    r.push(CoPar::new(false));

    r.push(rbcontext(false, true, false));
    r.push(rbcontext(false, true, true));
    r.push(rbcontext(true, false, false));
    r.push(rbcontext(true, true, false));
    r.push(rbcontext(true, true, true));

    r.push(rule(0, RuleConfig::new(0).root(true)));
    r.push(rule(0, lexical(Level::Lexical, Level::Lexical)));

    r.push(ngram(2, anc1()));
    r.push(ngram(2, anc1().lexicalize(Level::None, Level::Lexical)));

    r.push(WProj::default());

    r.push(NGramTree::new(2, Lexicalize::All, true, 0));

    r.push(HeadTree::new(true, false, 0, Syntactic));

    r.push(wsheads(2, HeadInfo::Lexical, HeadInfo::Lexical, Semantic));
    r.push(wsheads(3, HeadInfo::Pos, HeadInfo::Pos, Semantic));
    r.push(wsheads(3, HeadInfo::ClosedClass, HeadInfo::ClosedClass, Syntactic));

    let e = |ll, lr, rl, rr| WSEdges::new(false, ll, lr, rl, rr);
    r.push(e(CLOSED1, EMPTY, EMPTY, EMPTY));
    r.push(e(PUNCT1, EMPTY, PUNCT1, PUNCT1));
    r.push(WSEdges::new(true, PUNCT1, EMPTY, PUNCT1, PUNCT1));
    r.push(e(CLOSED1, CLOSED1, EMPTY, EMPTY));
    r.push(WSEdges::new(true, CLOSED1, CLOSED1, EMPTY, EMPTY));
    r.push(e(WORD1, WORD1, EMPTY, EMPTY));

    r.push(e(EMPTY, CLOSED1, EMPTY, EMPTY));
    r.push(e(EMPTY, WORD1, EMPTY, EMPTY));
    r.push(e(EMPTY, PUNCT2, EMPTY, EMPTY));
    r.push(e(EMPTY, CLOSED1, EMPTY, PUNCT1));
    r.push(e(EMPTY, PUNCT1, EMPTY, CLOSED1));

    r.push(e(EMPTY, EMPTY, PUNCT1, EMPTY));
    r.push(e(EMPTY, EMPTY, PUNCT2, EMPTY));
    r.push(e(EMPTY, EMPTY, PUNCT1, PUNCT1));
    r.push(e(EMPTY, EMPTY, PUNCT1, CLOSED1));
    r.push(e(EMPTY, EMPTY, POS1, CLOSED1));

    r.push(e(EMPTY, EMPTY, EMPTY, PUNCT1));
    r.push(e(EMPTY, EMPTY, EMPTY, PUNCT2));
    r.push(e(EMPTY, EMPTY, EMPTY, POS1));
    r.push(WSEdges::new(true, EMPTY, EMPTY, EMPTY, POS1));
    r.push(e(EMPTY, EMPTY, EMPTY, CLOSED1));
    r.push(e(EMPTY, EMPTY, EMPTY, CLOSED2));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry(name: &str) -> FeatureRegistry {
        build(name, SymbolPool::new()).unwrap()
    }

    #[test]
    fn test_every_set_builds_with_unique_identifiers() {
        for name in FEATURE_SETS {
            let r = registry(name);
            assert!(!r.is_empty(), "{name}");
            let identifiers: HashSet<&str> = r.identifiers().collect();
            assert_eq!(identifiers.len(), r.len(), "{name}");
        }
    }

    #[test]
    fn test_default_set_size() {
        assert_eq!(registry("nfeatures").len(), 109);
    }

    #[test]
    fn test_edge_grid_size() {
        // 15 windows with widths summing to at most 2, binned and unbinned,
        // for tags and for words
        assert_eq!(registry("071114").len(), 38 + 60);
    }

    #[test]
    fn test_unbinned_edge_set() {
        let r = registry("wsedge0");
        let edges: Vec<&str> = r.identifiers().filter(|i| i.starts_with("WSEdges")).collect();
        assert_eq!(edges.len(), 2 + 7 * 13);
        assert!(edges.iter().all(|i| i.starts_with("WSEdges:0:")));
    }

    #[test]
    fn test_unknown_set() {
        let Err(err) = build("nfeature", SymbolPool::new()) else {
            panic!("misspelt feature set accepted");
        };
        assert!(matches!(err, ConfigError::UnknownFeatureSet(name) if name == "nfeature"));
    }
}
