//! Feature extraction over training and evaluation corpora
//!
//! Extraction makes two passes. The first tallies candidate instances over
//! the training corpus; pruning then fixes their ids and writes the
//! definitions. The second writes a feature-counts file for the training
//! corpus and for every further corpus:
//!
//! ```text
//! S=<nsentences>
//! G=<gold edges> N=<nparses> P=<edges> W=<common> id id=value ..., P=...,
//! ```

use crate::catalogue;
use crate::config::{ConfigError, ExtractConfig};
use crate::corpus::{CorpusError, CorpusReader, Sentence};
use crate::error::Error;
use crate::feature::Id;
use crate::io::{create_output, format_g};
use crate::normalize::CountMode;
use crate::precrec::Edges;
use crate::registry::{Collect, FeatureRegistry};
use crate::symbol::SymbolPool;
use std::io::{self, Write};
use std::path::PathBuf;

/// An n-best corpus, its gold trees, and the counts file written for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFiles {
    pub nbest: PathBuf,
    pub gold: PathBuf,
    pub counts: PathBuf,
}

impl CorpusFiles {
    /// Group `nbest gold counts nbest gold counts ...` into triples
    pub fn from_paths(paths: &[PathBuf]) -> Result<Vec<Self>, ConfigError> {
        if paths.is_empty() || paths.len() % 3 != 0 {
            return Err(ConfigError::FileTriples(paths.len()));
        }
        Ok(paths
            .chunks_exact(3)
            .map(|triple| Self {
                nbest: triple[0].clone(),
                gold: triple[1].clone(),
                counts: triple[2].clone(),
            })
            .collect())
    }

    fn open(&self, symbols: &SymbolPool, lowercase: bool) -> Result<CorpusReader, CorpusError> {
        CorpusReader::open(&self.nbest, &self.gold, symbols, lowercase)
    }
}

/// Tally instances over every sentence, returning the number of sentences
pub fn discover(
    registry: &mut FeatureRegistry,
    sentences: impl IntoIterator<Item = Result<Sentence, CorpusError>>,
    collect: Collect,
) -> Result<usize, CorpusError> {
    let mut nsentences = 0;
    for sentence in sentences {
        registry.discover(&sentence?, collect);
        nsentences += 1;
        if nsentences % 1000 == 0 {
            log::debug!("Discovery reached sentence {nsentences}");
        }
    }
    Ok(nsentences)
}

/// Write one sentence's line of a feature-counts file
pub fn write_sentence(
    registry: &FeatureRegistry,
    sentence: &Sentence,
    mode: CountMode,
    out: &mut dyn Write,
) -> io::Result<()> {
    let gold = sentence.gold.as_ref().map(Edges::new).unwrap_or_default();
    write!(out, "G={} N={}", gold.nedges(), sentence.nparses())?;
    let values = registry.feature_values(sentence, mode);
    for (parse, parse_values) in sentence.parses.iter().zip(&values) {
        let edges = Edges::new(&parse.tree);
        write!(out, " P={} W={}", edges.nedges(), edges.common(&gold))?;
        for (&id, &value) in parse_values {
            if value == 1.0 {
                write!(out, " {id}")?;
            } else {
                write!(out, " {id}={}", format_g(value))?;
            }
        }
        out.write_all(b",")?;
    }
    writeln!(out)
}

/// Write a complete feature-counts file for `corpus`
pub fn write_features(
    registry: &FeatureRegistry,
    corpus: CorpusReader,
    mode: CountMode,
    out: &mut dyn Write,
) -> Result<(), Error> {
    writeln!(out, "S={}", corpus.nsentences())?;
    for sentence in corpus {
        write_sentence(registry, &sentence?, mode, out)?;
    }
    out.flush()?;
    Ok(())
}

/// Extract features: discover over the first corpus, write the definitions
/// to `definitions`, then write a counts file for every corpus.
///
/// Returns the number of feature ids assigned. Every corpus is read twice or
/// more, so none of the n-best or gold paths can be `-`.
pub fn extract(
    config: &ExtractConfig,
    corpora: &[CorpusFiles],
    definitions: &mut dyn Write,
) -> Result<Id, Error> {
    config.validate()?;
    let Some(train) = corpora.first() else {
        return Err(ConfigError::FileTriples(0).into());
    };

    let symbols = SymbolPool::new();
    let mut registry = catalogue::build(&config.feature_set, symbols.clone())?;

    let corpus = train.open(&symbols, config.lowercase)?;
    log::info!(
        "Discovering features over {} sentences of {}",
        corpus.nsentences(),
        train.nbest.display()
    );
    let nsentences = discover(&mut registry, corpus, config.collect())?;
    let nids = registry.prune_and_renumber(config.mincount, definitions)?;
    definitions.flush()?;
    log::info!(
        "Kept {nids} features seen in at least {} of {nsentences} sentences",
        config.mincount
    );

    for files in corpora {
        let corpus = files.open(&symbols, config.lowercase)?;
        let mut out = create_output(&files.counts)?;
        write_features(&registry, corpus, config.count_mode(), &mut out)?;
        log::info!("Wrote feature counts to {}", files.counts.display());
    }
    Ok(nids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::NLogP;
    use std::io::{BufRead, Cursor};
    use tempfile::tempdir;

    const NBEST: &str = "2 s1
-10.5
(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))
-12.0
(S1 (S (NP (DT The)) (VP (NN dog) (VBZ barks)) (. .)))
1 s2
-3.0
(S1 (NP (NNS Cats)))
";

    const GOLD: &str = "2
s1 (S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))
s2 (S1 (NP (NNS Cats)))
";

    fn corpus(symbols: &SymbolPool) -> CorpusReader {
        CorpusReader::new(
            Box::new(Cursor::new(NBEST)),
            Box::new(Cursor::new(GOLD)),
            symbols,
            false,
        )
        .unwrap()
    }

    fn logp_registry(symbols: &SymbolPool) -> FeatureRegistry {
        let mut registry = FeatureRegistry::new(symbols.clone());
        registry.push(NLogP);
        registry.read_feature_ids(&b"0\tNLogP 0\n"[..]).unwrap();
        registry
    }

    fn counts(mode: CountMode) -> String {
        let symbols = SymbolPool::new();
        let registry = logp_registry(&symbols);
        let mut out = Vec::new();
        write_features(&registry, corpus(&symbols), mode, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_absolute_counts_file() {
        assert_eq!(
            counts(CountMode::Absolute),
            "S=2\nG=3 N=2 P=3 W=3 0=10.5, P=3 W=1 0=12,\nG=1 N=1 P=1 W=1 0=3,\n"
        );
    }

    #[test]
    fn test_relative_counts_file() {
        assert_eq!(
            counts(CountMode::Relative),
            "S=2\nG=3 N=2 P=3 W=3, P=3 W=1 0=1.5,\nG=1 N=1 P=1 W=1,\n"
        );
    }

    #[test]
    fn test_unit_values_print_bare_ids() {
        let symbols = SymbolPool::new();
        let registry = logp_registry(&symbols);
        let nbest = NBEST.replace("-10.5", "-1");
        let mut sentences = CorpusReader::new(
            Box::new(Cursor::new(nbest)),
            Box::new(Cursor::new(GOLD)),
            &symbols,
            false,
        )
        .unwrap();
        let first = sentences.next().unwrap().unwrap();
        let mut out = Vec::new();
        write_sentence(&registry, &first, CountMode::Absolute, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "G=3 N=2 P=3 W=3 0, P=3 W=1 0=12,\n");
    }

    #[test]
    fn test_discover_counts_sentences() {
        let symbols = SymbolPool::new();
        let mut registry = FeatureRegistry::new(symbols.clone());
        registry.push(NLogP);
        let collect = Collect {
            correct: false,
            incorrect: true,
        };
        assert_eq!(discover(&mut registry, corpus(&symbols), collect).unwrap(), 2);
        let mut defs = Vec::new();
        assert_eq!(registry.prune_and_renumber(1, &mut defs).unwrap(), 1);
        assert_eq!(defs, b"0\tNLogP 0\n");
    }

    #[test]
    fn test_file_triples() {
        let paths: Vec<PathBuf> = ["a", "b", "c", "d", "e", "f"].iter().map(PathBuf::from).collect();
        let corpora = CorpusFiles::from_paths(&paths).unwrap();
        assert_eq!(corpora.len(), 2);
        assert_eq!(corpora[1].counts, PathBuf::from("f"));
        assert!(matches!(
            CorpusFiles::from_paths(&paths[..4]),
            Err(ConfigError::FileTriples(4))
        ));
        assert!(CorpusFiles::from_paths(&[]).is_err());
    }

    #[test]
    fn test_extract_end_to_end() {
        let dir = tempdir().unwrap();
        let nbest = dir.path().join("train.nbest");
        let gold = dir.path().join("train.gold");
        std::fs::write(&nbest, NBEST).unwrap();
        std::fs::write(&gold, GOLD).unwrap();
        let corpora = vec![CorpusFiles {
            nbest,
            gold,
            counts: dir.path().join("train.gz"),
        }];
        let config = ExtractConfig {
            collect_correct: true,
            collect_incorrect: true,
            mincount: 1,
            ..ExtractConfig::default()
        };

        let mut defs = Vec::new();
        let nids = extract(&config, &corpora, &mut defs).unwrap();
        assert!(nids > 0);
        let lines: Vec<&str> = std::str::from_utf8(&defs).unwrap().lines().collect();
        assert_eq!(lines.len(), nids as usize);
        assert!(lines[0].starts_with("0\t"));

        let written: Vec<String> = crate::io::open_input(&corpora[0].counts)
            .unwrap()
            .lines()
            .map(Result::unwrap)
            .collect();
        assert_eq!(written.len(), 3);
        assert_eq!(written[0], "S=2");
        assert!(written[1].starts_with("G=3 N=2 P=3 W=3"));
        assert!(written[2].starts_with("G=1 N=1 P=1 W=1"));
    }

    #[test]
    fn test_extract_rejects_missing_collection() {
        let mut defs = Vec::new();
        let result = extract(&ExtractConfig::default(), &[], &mut defs);
        assert!(matches!(result, Err(Error::Config(ConfigError::NothingToCollect))));
    }
}
