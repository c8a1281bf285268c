//! Scoring parses with trained feature weights
//!
//! A parse's score is the dot product of its feature values with the weight
//! vector. [`Scorer`] restores a registry from a definitions file, loads
//! the weights, and writes one of the [`OutputMode`] reports per sentence.

use crate::catalogue;
use crate::config::{OutputMode, ScoreConfig};
use crate::corpus::{NbestReader, Parse, Sentence};
use crate::error::Error;
use crate::feature::{Id, Value};
use crate::io::format_g;
use crate::normalize::CountMode;
use crate::registry::FeatureRegistry;
use crate::symbol::SymbolPool;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Error type for weights files
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("Weights error: {0}")]
    Io(#[from] io::Error),

    #[error("Weights error at line {line_num}: malformed weight `{token}`")]
    Malformed { line_num: usize, token: String },

    #[error("Weights error at line {line_num}: feature id {id} is above the largest id {max_id}")]
    OutOfRange { line_num: usize, id: Id, max_id: Id },

    #[error("Weights error at line {line_num}: feature id {id} is weighted twice")]
    Repeated { line_num: usize, id: Id },
}

/// Dense weight vector indexed by feature id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weights {
    weights: Vec<Value>,
}

impl Weights {
    /// Read whitespace-separated `id=weight` tokens. Ids not mentioned
    /// weigh 0.
    pub fn read(reader: impl BufRead, max_id: Id) -> Result<Self, WeightsError> {
        let size = max_id as usize + 1;
        let mut weights = vec![0.0; size];
        let mut seen = vec![false; size];
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = line_num + 1;
            for token in line.split_whitespace() {
                let malformed = || WeightsError::Malformed {
                    line_num,
                    token: token.to_string(),
                };
                let (id, weight) = token.split_once('=').ok_or_else(malformed)?;
                let id = atoi::atoi::<Id>(id.as_bytes())
                    .filter(|_| id.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(malformed)?;
                let weight: Value = weight.parse().map_err(|_| malformed())?;
                if id > max_id {
                    return Err(WeightsError::OutOfRange { line_num, id, max_id });
                }
                let slot = id as usize;
                if seen[slot] {
                    return Err(WeightsError::Repeated { line_num, id });
                }
                seen[slot] = true;
                weights[slot] = weight;
            }
        }
        let nweighted = seen.iter().filter(|&&s| s).count();
        log::info!("Read {nweighted} weights for {size} features");
        Ok(Self { weights })
    }

    pub fn get(&self, id: Id) -> Value {
        self.weights.get(id as usize).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Dot product of `values` with the weights
    pub fn score(&self, values: &BTreeMap<Id, Value>) -> Value {
        values.iter().map(|(&id, &v)| v * self.get(id)).sum()
    }
}

/// A restored registry together with its weights
pub struct Scorer {
    registry: FeatureRegistry,
    weights: Weights,
    mode: CountMode,
}

impl Scorer {
    pub fn new(registry: FeatureRegistry, weights: Weights, mode: CountMode) -> Self {
        Self {
            registry,
            weights,
            mode,
        }
    }

    /// Build the configured feature set and restore its ids from
    /// `definitions` before reading `weights`
    pub fn load(
        config: &ScoreConfig,
        definitions: impl BufRead,
        weights: impl BufRead,
    ) -> Result<Self, Error> {
        config.validate()?;
        let mut registry = catalogue::build(&config.feature_set, SymbolPool::new())?;
        let max_id = registry.read_feature_ids(definitions)?;
        log::info!("Restored feature ids up to {max_id}");
        let weights = Weights::read(weights, max_id)?;
        Ok(Self::new(registry, weights, config.count_mode()))
    }

    pub fn symbols(&self) -> &SymbolPool {
        self.registry.symbols()
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Score of every parse of `sentence`
    pub fn scores(&self, sentence: &Sentence) -> Vec<Value> {
        self.registry
            .feature_values(sentence, self.mode)
            .iter()
            .map(|values| self.weights.score(values))
            .collect()
    }

    /// The highest-scoring parse. Earlier parses win ties.
    pub fn best_parse<'a>(&self, sentence: &'a Sentence) -> Option<&'a Parse> {
        let mut best: Option<(usize, Value)> = None;
        for (i, score) in self.scores(sentence).into_iter().enumerate() {
            if best.is_none_or(|(_, max)| score > max) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| &sentence.parses[i])
    }

    pub fn write_best_tree(&self, sentence: &Sentence, out: &mut dyn Write) -> io::Result<()> {
        match self.best_parse(sentence) {
            Some(parse) => writeln!(out, "{}", parse.text),
            None => {
                log::warn!("Sentence {} has no parses", sentence.label);
                writeln!(out)
            }
        }
    }

    /// Every parse with its score and log probability, best first
    pub fn write_ranked_trees(&self, sentence: &Sentence, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{} {}", sentence.nparses(), sentence.label)?;
        let mut ranked: Vec<(Value, &Parse)> =
            self.scores(sentence).into_iter().zip(&sentence.parses).collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (score, parse) in ranked {
            writeln!(out, "{} {}", format_g(score), format_g(parse.logprob))?;
            writeln!(out, "{}", parse.text)?;
        }
        Ok(())
    }

    /// `label parse id value` for every weighted feature other than id 0
    pub fn write_features_debug(&self, sentence: &Sentence, out: &mut dyn Write) -> io::Result<()> {
        let values = self.registry.feature_values(sentence, self.mode);
        for (i, parse_values) in values.iter().enumerate() {
            for (&id, &value) in parse_values {
                if id != 0 && self.weights.get(id) != 0.0 {
                    writeln!(out, "{} {i} {id} {}", sentence.label, format_g(value))?;
                }
            }
        }
        Ok(())
    }

    pub fn write(&self, sentence: &Sentence, mode: OutputMode, out: &mut dyn Write) -> io::Result<()> {
        match mode {
            OutputMode::BestTree => self.write_best_tree(sentence, out),
            OutputMode::RankedTrees => self.write_ranked_trees(sentence, out),
            OutputMode::FeatureValues => self.write_features_debug(sentence, out),
        }
    }

    /// Score every sentence of an n-best stream
    pub fn run(
        &self,
        nbest: impl BufRead,
        lowercase: bool,
        mode: OutputMode,
        out: &mut dyn Write,
    ) -> Result<usize, Error> {
        let mut nsentences = 0;
        for sentence in NbestReader::new(nbest, self.symbols().clone(), lowercase) {
            self.write(&sentence?, mode, out)?;
            nsentences += 1;
        }
        out.flush()?;
        log::info!("Scored {nsentences} sentences");
        Ok(nsentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::NLogP;
    use std::io::Cursor;

    const NBEST: &str = "3 s1
-10.5
(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))
-12
(S1 (S (NP (DT The)) (VP (NN dog) (VBZ barks)) (. .)))
-9
(S1 (FRAG (NP (DT The) (NN dog) (VBZ barks)) (. .)))
0 empty
";

    fn scorer(weight: &str) -> Scorer {
        let mut registry = FeatureRegistry::new(SymbolPool::new());
        registry.push(NLogP);
        let max_id = registry.read_feature_ids(&b"0\tNLogP 0\n"[..]).unwrap();
        let weights = Weights::read(Cursor::new(weight), max_id).unwrap();
        Scorer::new(registry, weights, CountMode::Absolute)
    }

    fn output(scorer: &Scorer, mode: OutputMode) -> String {
        let mut out = Vec::new();
        scorer.run(Cursor::new(NBEST), false, mode, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_weights() {
        let weights = Weights::read(Cursor::new("0=1.5 2=-3\n\n1=0.25\n"), 3).unwrap();
        assert_eq!(weights.len(), 4);
        assert_eq!(weights.get(0), 1.5);
        assert_eq!(weights.get(1), 0.25);
        assert_eq!(weights.get(2), -3.0);
        assert_eq!(weights.get(3), 0.0);
        assert_eq!(weights.score(&BTreeMap::from([(0, 2.0), (2, 1.0)])), 0.0);
    }

    #[test]
    fn test_weights_errors() {
        assert!(matches!(
            Weights::read(Cursor::new("0=1\n5=2\n"), 3),
            Err(WeightsError::OutOfRange { line_num: 2, id: 5, max_id: 3 })
        ));
        assert!(matches!(
            Weights::read(Cursor::new("1=0 1=2\n"), 3),
            Err(WeightsError::Repeated { line_num: 1, id: 1 })
        ));
        assert!(matches!(
            Weights::read(Cursor::new("1:2\n"), 3),
            Err(WeightsError::Malformed { line_num: 1, .. })
        ));
        assert!(matches!(
            Weights::read(Cursor::new("1=x\n"), 3),
            Err(WeightsError::Malformed { .. })
        ));
    }

    #[test]
    fn test_best_tree_follows_weights() {
        // NLogP is -logprob, so a negative weight prefers likely parses
        let likely = output(&scorer("0=-1"), OutputMode::BestTree);
        assert_eq!(
            likely,
            "(S1 (FRAG (NP (DT The) (NN dog) (VBZ barks)) (. .)))\n\n"
        );
        let unlikely = output(&scorer("0=1"), OutputMode::BestTree);
        assert!(unlikely.starts_with("(S1 (S (NP (DT The)) (VP"));
    }

    #[test]
    fn test_ties_go_to_first_parse() {
        let best = output(&scorer("0=0"), OutputMode::BestTree);
        assert!(best.starts_with("(S1 (S (NP (DT The) (NN dog))"));
    }

    #[test]
    fn test_ranked_trees() {
        let ranked = output(&scorer("0=-1"), OutputMode::RankedTrees);
        let lines: Vec<&str> = ranked.lines().collect();
        assert_eq!(lines[0], "3 s1");
        assert_eq!(lines[1], "-9 -9");
        assert_eq!(lines[3], "-10.5 -10.5");
        assert_eq!(lines[5], "-12 -12");
        assert_eq!(lines[6], "(S1 (S (NP (DT The)) (VP (NN dog) (VBZ barks)) (. .)))");
        assert_eq!(lines[7], "0 empty");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_debug_features_skip_id_zero() {
        assert_eq!(output(&scorer("0=-1"), OutputMode::FeatureValues), "");
    }

    #[test]
    fn test_debug_features_list_weighted_ids() {
        let mut registry = FeatureRegistry::new(SymbolPool::new());
        registry.push(NLogP);
        registry.push(crate::templates::NLogCondP);
        let max_id = registry
            .read_feature_ids(&b"0\tNLogP 0\n1\tNLogCondP 0\n"[..])
            .unwrap();
        let weights = Weights::read(Cursor::new("1=2"), max_id).unwrap();
        let scorer = Scorer::new(registry, weights, CountMode::Absolute);
        let text = output(&scorer, OutputMode::FeatureValues);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.starts_with("s1 ") && l.split(' ').nth(2) == Some("1")));
        assert!(lines[2].starts_with("s1 2 1 "));
    }
}
