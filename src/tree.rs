//! Annotated phrase-structure trees
//!
//! A [`Tree`] is an arena of [`Node`]s addressed by [`NodeId`]. Parents own
//! their children through `children`; parent links and the four head slots
//! are plain indices. Terminals are leaves whose category is the word, and a
//! preterminal has exactly one terminal child. Spans are preterminal offsets,
//! punctuation included.

use crate::symbol::{Sym, SymbolPool};
use std::fmt;

/// Unique identifier for a node
pub type NodeId = usize;

/// Which head annotation to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadType {
    Syntactic,
    Semantic,
}

/// Word-class and construction flags computed during annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub punctuation: bool,
    pub conjunction: bool,
    pub closed_class: bool,
    pub functional: bool,
    pub coordination: bool,
    pub adjunction: bool,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub cat: Sym,
    pub left: usize,
    pub right: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub syntactic_headchild: Option<NodeId>,
    pub semantic_headchild: Option<NodeId>,
    pub syntactic_lexhead: Option<NodeId>,
    pub semantic_lexhead: Option<NodeId>,
    pub flags: NodeFlags,
}

impl Node {
    fn new(cat: Sym, parent: Option<NodeId>) -> Self {
        Self {
            cat,
            left: 0,
            right: 0,
            parent,
            children: Vec::new(),
            syntactic_headchild: None,
            semantic_headchild: None,
            syntactic_lexhead: None,
            semantic_lexhead: None,
            flags: NodeFlags::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root: NodeId,
    pub symbols: SymbolPool,
    preterminals: Vec<NodeId>,
}

impl Tree {
    /// Create a tree holding only a root node
    pub fn new(root_cat: Sym, symbols: SymbolPool) -> Self {
        Self {
            nodes: vec![Node::new(root_cat, None)],
            root: 0,
            symbols,
            preterminals: Vec::new(),
        }
    }

    /// Append a child under `parent` and return its id
    pub fn add_child(&mut self, parent: NodeId, cat: Sym) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(cat, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    /// Compute spans and the preterminal list. Call after the last `add_child`.
    pub fn finish(&mut self) {
        self.preterminals.clear();
        let mut stack = vec![(self.root, false)];
        while let Some((id, visited)) = stack.pop() {
            if visited {
                let node = &self.nodes[id];
                if let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) {
                    let (left, right) = (self.nodes[first].left, self.nodes[last].right);
                    let node = &mut self.nodes[id];
                    node.left = left;
                    node.right = right;
                }
                continue;
            }
            if self.is_preterminal(id) {
                let position = self.preterminals.len();
                self.preterminals.push(id);
                let terminal = self.nodes[id].children[0];
                for n in [id, terminal] {
                    self.nodes[n].left = position;
                    self.nodes[n].right = position + 1;
                }
                continue;
            }
            stack.push((id, true));
            for &child in self.nodes[id].children.iter().rev() {
                stack.push((child, false));
            }
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn cat(&self, id: NodeId) -> Sym {
        self.nodes[id].cat
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    #[inline]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes[id].flags
    }

    /// Number of words (preterminals) in the tree
    pub fn len(&self) -> usize {
        self.preterminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preterminals.is_empty()
    }

    /// Preterminals in string order
    pub fn preterminals(&self) -> &[NodeId] {
        &self.preterminals
    }

    #[inline]
    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes[id].parent.is_none()
    }

    #[inline]
    pub fn is_terminal(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    #[inline]
    pub fn is_preterminal(&self, id: NodeId) -> bool {
        let children = &self.nodes[id].children;
        children.len() == 1 && self.is_terminal(children[0])
    }

    #[inline]
    pub fn is_nonterminal(&self, id: NodeId) -> bool {
        !self.is_terminal(id) && !self.is_preterminal(id)
    }

    #[inline]
    pub fn is_punctuation(&self, id: NodeId) -> bool {
        self.nodes[id].flags.punctuation
    }

    #[inline]
    pub fn is_conjunction(&self, id: NodeId) -> bool {
        self.nodes[id].flags.conjunction
    }

    #[inline]
    pub fn is_coordination(&self, id: NodeId) -> bool {
        self.nodes[id].flags.coordination
    }

    #[inline]
    pub fn is_adjunction(&self, id: NodeId) -> bool {
        self.nodes[id].flags.adjunction
    }

    #[inline]
    pub fn is_closed_class(&self, id: NodeId) -> bool {
        self.nodes[id].flags.closed_class
    }

    #[inline]
    pub fn is_functional(&self, id: NodeId) -> bool {
        self.nodes[id].flags.functional
    }

    /// Word of a preterminal (its terminal's category)
    #[inline]
    pub fn word(&self, preterminal: NodeId) -> Sym {
        self.nodes[self.nodes[preterminal].children[0]].cat
    }

    #[inline]
    pub fn headchild(&self, id: NodeId, head_type: HeadType) -> Option<NodeId> {
        match head_type {
            HeadType::Syntactic => self.nodes[id].syntactic_headchild,
            HeadType::Semantic => self.nodes[id].semantic_headchild,
        }
    }

    #[inline]
    pub fn lexhead(&self, id: NodeId, head_type: HeadType) -> Option<NodeId> {
        match head_type {
            HeadType::Syntactic => self.nodes[id].syntactic_lexhead,
            HeadType::Semantic => self.nodes[id].semantic_lexhead,
        }
    }

    fn sibling_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes[id].parent?;
        let index = self.nodes[parent].children.iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_index(id)?;
        self.nodes[parent].children.get(index + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_index(id)?;
        index
            .checked_sub(1)
            .map(|i| self.nodes[parent].children[i])
    }

    /// True if every following sibling is punctuation
    pub fn is_last_nonpunctuation(&self, id: NodeId) -> bool {
        match self.sibling_index(id) {
            Some((parent, index)) => self.nodes[parent].children[index + 1..]
                .iter()
                .all(|&c| self.is_punctuation(c)),
            None => true,
        }
    }

    /// Nodes in pre-order, terminals excluded
    pub fn nodes_preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.is_terminal(id) {
                continue;
            }
            order.push(id);
            if self.is_nonterminal(id) {
                stack.extend(self.nodes[id].children.iter().rev());
            }
        }
        order
    }

    /// Write the subtree at `id` in bracketed form
    pub fn write_subtree(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        if node.children.is_empty() {
            out.push_str(&self.symbols.resolve(node.cat));
            return;
        }
        out.push('(');
        out.push_str(&self.symbols.resolve(node.cat));
        for &child in &node.children {
            out.push(' ');
            self.write_subtree(child, out);
        }
        out.push(')');
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        self.write_subtree(self.root, &mut text);
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> Tree {
        // (ROOT (S (NP (DT the) (NN dog)) (VP (VBZ barks)) (. .)))
        let pool = SymbolPool::new();
        let mut tree = Tree::new(pool.intern("ROOT"), pool.clone());
        let s = tree.add_child(0, pool.intern("S"));
        let np = tree.add_child(s, pool.intern("NP"));
        let dt = tree.add_child(np, pool.intern("DT"));
        tree.add_child(dt, pool.intern("the"));
        let nn = tree.add_child(np, pool.intern("NN"));
        tree.add_child(nn, pool.intern("dog"));
        let vp = tree.add_child(s, pool.intern("VP"));
        let vbz = tree.add_child(vp, pool.intern("VBZ"));
        tree.add_child(vbz, pool.intern("barks"));
        let stop = tree.add_child(s, pool.intern("."));
        tree.add_child(stop, pool.intern("."));
        tree.finish();
        tree
    }

    #[test]
    fn test_spans() {
        let tree = create_test_tree();
        assert_eq!(tree.len(), 4);
        let s = tree.children(tree.root)[0];
        let np = tree.children(s)[0];
        let vp = tree.children(s)[1];
        assert_eq!((tree.node(tree.root).left, tree.node(tree.root).right), (0, 4));
        assert_eq!((tree.node(np).left, tree.node(np).right), (0, 2));
        assert_eq!((tree.node(vp).left, tree.node(vp).right), (2, 3));
    }

    #[test]
    fn test_node_kinds() {
        let tree = create_test_tree();
        let s = tree.children(tree.root)[0];
        let np = tree.children(s)[0];
        let dt = tree.children(np)[0];
        let the = tree.children(dt)[0];
        assert!(tree.is_nonterminal(np));
        assert!(tree.is_preterminal(dt));
        assert!(tree.is_terminal(the));
        assert_eq!(&*tree.symbols.resolve(tree.word(dt)), "the");
    }

    #[test]
    fn test_siblings() {
        let tree = create_test_tree();
        let s = tree.children(tree.root)[0];
        let [np, vp, stop] = [0, 1, 2].map(|i| tree.children(s)[i]);
        assert_eq!(tree.next_sibling(np), Some(vp));
        assert_eq!(tree.prev_sibling(vp), Some(np));
        assert_eq!(tree.prev_sibling(np), None);
        assert_eq!(tree.next_sibling(stop), None);
        assert_eq!(tree.next_sibling(tree.root), None);
    }

    #[test]
    fn test_preorder_and_display() {
        let tree = create_test_tree();
        // root, S, NP, DT, NN, VP, VBZ, .
        assert_eq!(tree.nodes_preorder().len(), 8);
        assert_eq!(
            tree.to_string(),
            "(ROOT (S (NP (DT the) (NN dog)) (VP (VBZ barks)) (. .)))"
        );
    }
}
