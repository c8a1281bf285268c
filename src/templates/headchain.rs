//! Head-to-head dependency chains
//!
//! Starting from each preterminal, climb to the first ancestor whose head
//! child is not on the path, descend to that head child's lexical head and
//! repeat until `nheads` words are collected. Coordinations are transparent:
//! the walk passes through them on the way up and, when descending, may fan
//! out over every conjunct, so one word can yield several chains.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template, suffix};
use crate::symbol::Sym;
use crate::templates::head_code;
use crate::tree::{HeadType, NodeId, Tree};

/// The walk shared by [`Heads`] and [`WSHeads`]
trait HeadWalk {
    fn nheads(&self) -> usize;

    fn head_type(&self) -> HeadType;

    /// Push the governor annotation for preterminal `head`
    fn push_governor(&self, tree: &Tree, head: NodeId, f: &mut Vec<Sym>);

    /// May the walk climb from `node` through its coordination parent?
    fn climbs_coordination(&self, tree: &Tree, node: NodeId) -> bool;

    /// When descending into `head`, the conjuncts to fan out over, if any
    fn conjuncts(&self, tree: &Tree, head: NodeId) -> Option<Vec<NodeId>>;

    fn visit_ancestors(
        &self,
        tree: &Tree,
        node: NodeId,
        nsofar: usize,
        f: &mut Vec<Sym>,
        counts: &mut FeatureCounts<Vec<Sym>>,
    ) {
        if nsofar == self.nheads() {
            counts.incr(f.clone());
            return;
        }
        let Some(ancestor) = tree.parent(node) else {
            return;
        };
        if tree.is_coordination(ancestor) {
            if self.climbs_coordination(tree, node) {
                self.visit_ancestors(tree, ancestor, nsofar, f, counts);
            }
            return;
        }
        match tree.headchild(ancestor, self.head_type()) {
            Some(hchild) if hchild != node => {
                self.visit_descendants(tree, ancestor, nsofar, f, hchild, counts)
            }
            _ => self.visit_ancestors(tree, ancestor, nsofar, f, counts),
        }
    }

    fn visit_descendants(
        &self,
        tree: &Tree,
        ancestor: NodeId,
        nsofar: usize,
        f: &mut Vec<Sym>,
        head: NodeId,
        counts: &mut FeatureCounts<Vec<Sym>>,
    ) {
        if tree.is_preterminal(head) {
            let len = f.len();
            self.push_governor(tree, head, f);
            self.visit_ancestors(tree, ancestor, nsofar + 1, f, counts);
            f.truncate(len);
            return;
        }
        match self.conjuncts(tree, head) {
            Some(conjuncts) => {
                for child in conjuncts {
                    self.visit_descendants(tree, ancestor, nsofar, f, child, counts);
                }
            }
            None => {
                if let Some(hchild) = tree.headchild(head, self.head_type()) {
                    self.visit_descendants(tree, ancestor, nsofar, f, hchild, counts);
                }
            }
        }
    }
}

/// Chains of `nheads` tags, optionally with the governor's and dependent's words
#[derive(Debug, Clone)]
pub struct Heads {
    nheads: usize,
    governorlex: bool,
    dependentlex: bool,
    head_type: HeadType,
    identifier: String,
}

impl Heads {
    pub fn new(nheads: usize, governorlex: bool, dependentlex: bool, head_type: HeadType) -> Self {
        Self {
            nheads,
            governorlex,
            dependentlex,
            head_type,
            identifier: format!(
                "Heads:{nheads}:{}:{}:{}",
                u8::from(governorlex),
                u8::from(dependentlex),
                head_code(head_type)
            ),
        }
    }
}

impl Default for Heads {
    fn default() -> Self {
        Self::new(2, true, true, HeadType::Syntactic)
    }
}

impl HeadWalk for Heads {
    fn nheads(&self) -> usize {
        self.nheads
    }

    fn head_type(&self) -> HeadType {
        self.head_type
    }

    fn push_governor(&self, tree: &Tree, head: NodeId, f: &mut Vec<Sym>) {
        f.push(tree.cat(head));
        if self.governorlex {
            f.push(tree.word(head));
        }
    }

    fn climbs_coordination(&self, _tree: &Tree, _node: NodeId) -> bool {
        true
    }

    fn conjuncts(&self, tree: &Tree, head: NodeId) -> Option<Vec<NodeId>> {
        if !tree.is_coordination(head) {
            return None;
        }
        let cat = tree.cat(head);
        let hcat = tree.headchild(head, self.head_type).map(|h| tree.cat(h));
        Some(
            tree.children(head)
                .iter()
                .copied()
                .filter(|&c| tree.cat(c) == cat || Some(tree.cat(c)) == hcat)
                .collect(),
        )
    }
}

impl Template for Heads {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        for &pt in tree.preterminals() {
            let mut f = vec![tree.cat(pt)];
            if self.dependentlex {
                f.push(tree.word(pt));
            }
            self.visit_ancestors(tree, pt, 1, &mut f, counts);
        }
    }
}

/// How much of a word [`WSHeads`] records beside its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadInfo {
    Pos = 0,
    ClosedClass = 1,
    /// The word truncated to its suffix
    Lexical = 2,
}

/// [`Heads`] with suffix truncation and optional distribution over conjuncts
#[derive(Debug, Clone)]
pub struct WSHeads {
    nsuffix: usize,
    distribute: bool,
    nheads: usize,
    governor: HeadInfo,
    dependent: HeadInfo,
    head_type: HeadType,
    identifier: String,
}

impl WSHeads {
    pub fn new(
        nsuffix: usize,
        distribute: bool,
        nheads: usize,
        governor: HeadInfo,
        dependent: HeadInfo,
        head_type: HeadType,
    ) -> Self {
        Self {
            nsuffix,
            distribute,
            nheads,
            governor,
            dependent,
            head_type,
            identifier: format!(
                "WSHeads:{nsuffix}:{}:{nheads}:{}:{}:{}",
                u8::from(distribute),
                governor as u8,
                dependent as u8,
                head_code(head_type)
            ),
        }
    }

    fn push_word(&self, tree: &Tree, pt: NodeId, info: HeadInfo, f: &mut Vec<Sym>) {
        match info {
            HeadInfo::Pos => {}
            HeadInfo::ClosedClass => f.push(tree.word(pt)),
            HeadInfo::Lexical => f.push(suffix(&tree.symbols, tree.word(pt), self.nsuffix)),
        }
    }
}

impl HeadWalk for WSHeads {
    fn nheads(&self) -> usize {
        self.nheads
    }

    fn head_type(&self) -> HeadType {
        self.head_type
    }

    fn push_governor(&self, tree: &Tree, head: NodeId, f: &mut Vec<Sym>) {
        f.push(tree.cat(head));
        self.push_word(tree, head, self.governor, f);
    }

    /// Without distribution only the last conjunct sees past the coordination
    fn climbs_coordination(&self, tree: &Tree, node: NodeId) -> bool {
        self.distribute || tree.next_sibling(node).is_none()
    }

    fn conjuncts(&self, tree: &Tree, head: NodeId) -> Option<Vec<NodeId>> {
        if !(self.distribute && tree.is_coordination(head)) {
            return None;
        }
        let cat = tree.cat(head);
        Some(
            tree.children(head)
                .iter()
                .copied()
                .filter(|&c| tree.cat(c) == cat)
                .collect(),
        )
    }
}

impl Template for WSHeads {
    type Feature = Vec<Sym>;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Vec<Sym>>) {
        let tree = &parse.tree;
        for &pt in tree.preterminals() {
            let mut f = vec![tree.cat(pt)];
            self.push_word(tree, pt, self.dependent, &mut f);
            self.visit_ancestors(tree, pt, 1, &mut f, counts);
        }
    }
}
