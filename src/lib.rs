//! spfeatures: feature extraction for n-best parse reranking
//!
//! Turns the n-best phrase-structure parses of each sentence into sparse
//! feature vectors for a discriminative reranker, and scores parses with
//! trained weights.

// Trees and input
pub mod corpus; // N-best and gold readers
pub mod heads; // Syntactic and semantic head finding
pub mod io; // Gzip-aware streams, %g formatting
pub mod symbol; // Interned category and word symbols
pub mod tree; // Arena trees with per-node annotations
pub mod treebank; // Bracketed tree parser

// Features
pub mod catalogue; // Named feature sets
pub mod feature; // Feature keys, counts, the Template trait
pub mod normalize; // Absolute and relative counts
pub mod registry; // Discovery, pruning, id assignment
pub mod templates; // The feature template families

// Pipeline
pub mod config;
pub mod driver; // Extraction passes and counts files
pub mod error;
pub mod precrec; // Labelled-edge precision/recall counts
pub mod scorer; // Weights and best-parse selection

// Re-exports for convenience
pub use config::{ConfigError, ExtractConfig, OutputMode, ScoreConfig};
pub use corpus::{CorpusError, CorpusReader, NbestReader, Parse, Sentence};
pub use driver::{CorpusFiles, extract};
pub use error::{Error, Result};
pub use feature::{FeatureKey, Id, Template, Value};
pub use normalize::CountMode;
pub use registry::{Collect, FeatureRegistry, RegistryError};
pub use scorer::{Scorer, Weights, WeightsError};
pub use symbol::{Sym, SymbolPool};
pub use tree::{HeadType, NodeId, Tree};
pub use treebank::{TreeError, parse_tree};
