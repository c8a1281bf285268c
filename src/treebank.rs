//! Penn treebank bracketed tree reader
//!
//! Parses bracketed trees with a pest grammar and builds annotated [`Tree`]s.
//! Function tags and coindexation are stripped from categories (`NP-SBJ-1`
//! becomes `NP`), empty elements (`-NONE-`) are removed along with any
//! constituent they leave empty, and the top node is normalized to `ROOT`.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use thiserror::Error;

use crate::heads::{RuleTableHeads, annotate};
use crate::symbol::{SymbolPool, sym};
use crate::tree::{NodeId, Tree};

#[derive(Parser)]
#[grammar = "treebank.pest"]
struct TreebankParser;

/// Error type for tree reading failures
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Tree error: {0}")]
    Syntax(#[from] pest::error::Error<Rule>),

    #[error("Tree error: no words left after removing empty elements")]
    Empty,
}

/// Labels accepted as the top node of a tree
const ROOT_LABELS: [&str; 4] = ["", "S1", "TOP", "ROOT"];

struct Bracket<'a> {
    label: &'a str,
    word: Option<&'a str>,
    children: Vec<Bracket<'a>>,
}

/// Parse one bracketed tree and annotate its heads.
///
/// With `lowercase` set, terminals are lowercased as they are interned.
pub fn parse_tree(text: &str, symbols: &SymbolPool, lowercase: bool) -> Result<Tree, TreeError> {
    let mut pairs = TreebankParser::parse(Rule::tree, text)?;
    let node = pairs
        .next()
        .and_then(|tree| tree.into_inner().next())
        .ok_or(TreeError::Empty)?;
    let top = prune(to_bracket(node)).ok_or(TreeError::Empty)?;

    let mut tree = Tree::new(sym::ROOT, symbols.clone());
    let root = tree.root;
    if top.word.is_none() && ROOT_LABELS.contains(&top.label) {
        for child in &top.children {
            add_bracket(&mut tree, root, child, lowercase);
        }
    } else {
        add_bracket(&mut tree, root, &top, lowercase);
    }
    tree.finish();
    annotate(&mut tree, &RuleTableHeads);
    Ok(tree)
}

fn to_bracket(pair: Pair<'_, Rule>) -> Bracket<'_> {
    let mut bracket = Bracket {
        label: "",
        word: None,
        children: Vec::new(),
    };
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::label => bracket.label = inner.as_str(),
            Rule::word => bracket.word = Some(inner.as_str()),
            Rule::node => bracket.children.push(to_bracket(inner)),
            _ => {}
        }
    }
    bracket
}

/// Remove empty elements and constituents that dominate nothing else
fn prune(bracket: Bracket<'_>) -> Option<Bracket<'_>> {
    if bracket.word.is_some() {
        return (bracket.label != "-NONE-").then_some(bracket);
    }
    let children: Vec<_> = bracket.children.into_iter().filter_map(prune).collect();
    if children.is_empty() {
        return None;
    }
    Some(Bracket { children, ..bracket })
}

/// Strip function tags and indices, keeping labels such as `-LRB-` intact
fn category(label: &str) -> &str {
    if label.starts_with('-') {
        return label;
    }
    match label.find(['-', '=']) {
        Some(i) if i > 0 => &label[..i],
        _ => label,
    }
}

fn add_bracket(tree: &mut Tree, parent: NodeId, bracket: &Bracket<'_>, lowercase: bool) {
    let label = match category(bracket.label) {
        "" => "X",
        cat => cat,
    };
    let cat = tree.symbols.intern(label);
    let id = tree.add_child(parent, cat);
    match bracket.word {
        Some(word) => {
            let word = if lowercase {
                tree.symbols.intern(&word.to_lowercase())
            } else {
                tree.symbols.intern(word)
            };
            tree.add_child(id, word);
        }
        None => {
            for child in &bracket.children {
                add_bracket(tree, id, child, lowercase);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let pool = SymbolPool::new();
        let tree = parse_tree("(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))", &pool, false)
            .unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.cat(tree.root), sym::ROOT);
        assert_eq!(
            tree.to_string(),
            "(ROOT (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))"
        );
    }

    #[test]
    fn test_unlabelled_root_and_lowercase() {
        let pool = SymbolPool::new();
        let tree = parse_tree("( (S (NP (NNP Kim)) (VP (VBD left))))", &pool, true).unwrap();
        assert_eq!(tree.to_string(), "(ROOT (S (NP (NNP kim)) (VP (VBD left))))");
    }

    #[test]
    fn test_bare_constituent_is_wrapped() {
        let pool = SymbolPool::new();
        let tree = parse_tree("(NP (DT a) (NN cat))", &pool, false).unwrap();
        assert_eq!(tree.to_string(), "(ROOT (NP (DT a) (NN cat)))");
    }

    #[test]
    fn test_function_tags_and_empty_elements() {
        let pool = SymbolPool::new();
        let text = "(S1 (S (NP-SBJ-1 (NNP Kim)) (VP (VBD tried) (S (NP-SBJ (-NONE- *-1)) (VP (TO to) (VP (VB leave)))))))";
        let tree = parse_tree(text, &pool, false).unwrap();
        assert_eq!(
            tree.to_string(),
            "(ROOT (S (NP (NNP Kim)) (VP (VBD tried) (S (VP (TO to) (VP (VB leave)))))))"
        );
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_bracket_labels_kept() {
        assert_eq!(category("-LRB-"), "-LRB-");
        assert_eq!(category("NP-SBJ=2"), "NP");
        assert_eq!(category("PRP$"), "PRP$");
    }

    #[test]
    fn test_parse_errors() {
        let pool = SymbolPool::new();
        assert!(matches!(
            parse_tree("(S (NP (DT the)", &pool, false),
            Err(TreeError::Syntax(_))
        ));
        assert!(matches!(
            parse_tree("(S1 (-NONE- *))", &pool, false),
            Err(TreeError::Empty)
        ));
    }
}
