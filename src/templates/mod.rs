//! Feature template families
//!
//! Each submodule holds one family of [`Template`](crate::feature::Template)
//! implementations. Identifiers encode every constructor parameter, with
//! booleans and enums written as integers, so two differently configured
//! templates never share an identifier.

pub mod alignment; // SubjVerbAgr, SynSemHeads, RBContext
pub mod branch; // Right/left branching
pub mod coord; // Coordination parallelism
pub mod edges; // Edge contexts and heaviness
pub mod fragment; // NGramTree, HeadTree
pub mod headchain; // Heads, WSHeads
pub mod rule; // Rule, NGram, NNGram
pub mod scalar; // Log-probability features
pub mod word; // Word, WProj

pub use alignment::{RBContext, SubjVerbAgr, SynSemAnnotation, SynSemHeads};
pub use branch::{LeftBranchLength, RightBranch, RightBranchLength};
pub use coord::{CoLenPar, CoPar};
pub use edges::{EdgeSpec, Edges, Heavy, Neighbours, WEdges, WSEdges, WordEdges, WordNeighbours};
pub use fragment::{HeadTree, Lexicalize, NGramTree};
pub use headchain::{HeadInfo, Heads, WSHeads};
pub use rule::{Level, NGram, NNGram, Rule, RuleConfig};
pub use scalar::{BinnedLogCondP, InterpLogCondP, NLogCondP, NLogP};
pub use word::{WProj, Word};

use crate::tree::HeadType;

/// Head type as written by templates that number syntactic heads first
#[inline]
pub(crate) fn head_code(head_type: HeadType) -> u8 {
    match head_type {
        HeadType::Syntactic => 0,
        HeadType::Semantic => 1,
    }
}

/// Head type as written by the rule and projection templates
#[inline]
pub(crate) fn semantic_first_code(head_type: HeadType) -> u8 {
    1 - head_code(head_type)
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::corpus::Parse;
    use crate::feature::{FeatureCounts, Template, render_key};
    use crate::symbol::SymbolPool;
    use crate::treebank::parse_tree;

    pub fn parse_with_scores(text: &str, logprob: f64, logcondprob: f64) -> Parse {
        let pool = SymbolPool::new();
        let tree = parse_tree(text, &pool, false).unwrap();
        Parse {
            tree,
            logprob,
            logcondprob,
            text: text.to_string(),
        }
    }

    pub fn parse(text: &str) -> Parse {
        parse_with_scores(text, 0.0, 0.0)
    }

    /// Rendered instances and their counts, sorted by rendering
    pub fn rendered<T: Template>(template: &T, parse: &Parse) -> Vec<(String, f64)> {
        let mut counts = FeatureCounts::new();
        template.enumerate_into(parse, &mut counts);
        let mut out: Vec<(String, f64)> = counts
            .iter()
            .map(|(key, value)| (render_key(key, &parse.tree.symbols), value))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Rendered instances only, sorted
    pub fn keys<T: Template>(template: &T, parse: &Parse) -> Vec<String> {
        rendered(template, parse).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_head_codes() {
        use super::*;
        assert_eq!(head_code(HeadType::Syntactic), 0);
        assert_eq!(semantic_first_code(HeadType::Syntactic), 1);
        assert_eq!(semantic_first_code(HeadType::Semantic), 0);
    }
}
