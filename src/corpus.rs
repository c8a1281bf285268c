//! N-best and gold corpus readers
//!
//! An n-best stream is a sequence of blocks, each a `<nparses> <label>`
//! header followed by `nparses` pairs of a log-probability line and a
//! one-line bracketed tree. A gold stream starts with the number of
//! sentences, then has one `<label> <tree>` line per sentence.
//! [`CorpusReader`] walks both in step and checks that labels agree.

use crate::io::open_input;
use crate::symbol::SymbolPool;
use crate::tree::Tree;
use crate::treebank::{TreeError, parse_tree};
use std::io::{self, BufRead, Lines};
use std::path::Path;
use thiserror::Error;

/// Error type for corpus reading failures
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus error: {0}")]
    Io(#[from] io::Error),

    #[error("Corpus error at line {line_num}: {message}")]
    Format { line_num: usize, message: String },

    #[error("Corpus error at line {line_num}: {source}")]
    Tree {
        line_num: usize,
        #[source]
        source: TreeError,
    },

    #[error("Corpus error: n-best label `{nbest}` does not match gold label `{gold}`")]
    LabelMismatch { nbest: String, gold: String },

    #[error("Corpus error: expected {expected} sentences, n-best stream ended after {read}")]
    Truncated { expected: usize, read: usize },
}

/// One candidate parse
#[derive(Debug, Clone)]
pub struct Parse {
    pub tree: Tree,
    pub logprob: f64,
    pub logcondprob: f64,
    /// The bracketed tree as read
    pub text: String,
}

/// A sentence with its candidate parses and optional gold tree
#[derive(Debug, Clone)]
pub struct Sentence {
    pub label: String,
    pub parses: Vec<Parse>,
    pub gold: Option<Tree>,
}

impl Sentence {
    /// Build a sentence, filling in each parse's log conditional probability
    pub fn new(label: String, mut parses: Vec<Parse>, gold: Option<Tree>) -> Self {
        let max = parses
            .iter()
            .map(|p| p.logprob)
            .fold(f64::NEG_INFINITY, f64::max);
        let logsum = max + parses.iter().map(|p| (p.logprob - max).exp()).sum::<f64>().ln();
        for parse in &mut parses {
            parse.logcondprob = parse.logprob - logsum;
        }
        Self { label, parses, gold }
    }

    pub fn nparses(&self) -> usize {
        self.parses.len()
    }
}

/// Upper bound on parses reserved ahead of reading a block
const MAX_PREALLOCATED_PARSES: usize = 1024;

fn format_error(line_num: usize, message: impl Into<String>) -> CorpusError {
    CorpusError::Format {
        line_num,
        message: message.into(),
    }
}

/// Reader over n-best blocks
pub struct NbestReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
    symbols: SymbolPool,
    lowercase: bool,
}

impl<R: BufRead> NbestReader<R> {
    pub fn new(reader: R, symbols: SymbolPool, lowercase: bool) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
            symbols,
            lowercase,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, CorpusError> {
        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        return Ok(Some(line));
                    }
                }
            }
        }
    }

    fn required_line(&mut self, what: &str) -> Result<String, CorpusError> {
        self.next_line()?
            .ok_or_else(|| format_error(self.line_num, format!("unexpected end of input, expected {what}")))
    }

    fn read_block(&mut self, header: &str) -> Result<Sentence, CorpusError> {
        let mut fields = header.split_whitespace();
        let nparses: usize = fields
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| format_error(self.line_num, format!("bad n-best header `{header}`")))?;
        let label = fields.next().unwrap_or_default().to_string();

        let mut parses = Vec::with_capacity(nparses.min(MAX_PREALLOCATED_PARSES));
        for _ in 0..nparses {
            let line = self.required_line("a log probability")?;
            let logprob: f64 = line
                .split_whitespace()
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| format_error(self.line_num, format!("bad log probability `{line}`")))?;
            let text = self.required_line("a tree")?;
            let tree = parse_tree(&text, &self.symbols, self.lowercase).map_err(|source| {
                CorpusError::Tree {
                    line_num: self.line_num,
                    source,
                }
            })?;
            parses.push(Parse {
                tree,
                logprob,
                logcondprob: 0.0,
                text: text.trim().to_string(),
            });
        }
        Ok(Sentence::new(label, parses, None))
    }
}

impl<R: BufRead> Iterator for NbestReader<R> {
    type Item = Result<Sentence, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_line() {
            Ok(None) => None,
            Ok(Some(header)) => Some(self.read_block(&header)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Reader over a gold stream
pub struct GoldReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
    nsentences: usize,
    symbols: SymbolPool,
    lowercase: bool,
}

impl<R: BufRead> GoldReader<R> {
    /// Create a reader, consuming the sentence-count header
    pub fn new(reader: R, symbols: SymbolPool, lowercase: bool) -> Result<Self, CorpusError> {
        let mut lines = reader.lines();
        let mut line_num = 0;
        let nsentences = loop {
            line_num += 1;
            let line = lines
                .next()
                .ok_or_else(|| format_error(line_num, "missing sentence count"))??;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            break line
                .parse()
                .map_err(|_| format_error(line_num, format!("bad sentence count `{line}`")))?;
        };
        Ok(Self {
            lines,
            line_num,
            nsentences,
            symbols,
            lowercase,
        })
    }

    pub fn nsentences(&self) -> usize {
        self.nsentences
    }
}

impl<R: BufRead> Iterator for GoldReader<R> {
    type Item = Result<(String, Tree), CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_num += 1;
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((label, text)) = line.split_once(char::is_whitespace) else {
                return Some(Err(format_error(self.line_num, "gold line has no tree")));
            };
            return Some(
                parse_tree(text.trim_start(), &self.symbols, self.lowercase)
                    .map(|tree| (label.to_string(), tree))
                    .map_err(|source| CorpusError::Tree {
                        line_num: self.line_num,
                        source,
                    }),
            );
        }
    }
}

/// Paired n-best and gold streams
pub struct CorpusReader {
    nbest: NbestReader<Box<dyn BufRead>>,
    gold: GoldReader<Box<dyn BufRead>>,
    read: usize,
}

impl CorpusReader {
    pub fn new(
        nbest: Box<dyn BufRead>,
        gold: Box<dyn BufRead>,
        symbols: &SymbolPool,
        lowercase: bool,
    ) -> Result<Self, CorpusError> {
        Ok(Self {
            nbest: NbestReader::new(nbest, symbols.clone(), lowercase),
            gold: GoldReader::new(gold, symbols.clone(), lowercase)?,
            read: 0,
        })
    }

    pub fn open(
        nbest: impl AsRef<Path>,
        gold: impl AsRef<Path>,
        symbols: &SymbolPool,
        lowercase: bool,
    ) -> Result<Self, CorpusError> {
        Self::new(open_input(nbest)?, open_input(gold)?, symbols, lowercase)
    }

    /// Number of sentences announced by the gold header
    pub fn nsentences(&self) -> usize {
        self.gold.nsentences()
    }

    fn read_sentence(&mut self) -> Result<Sentence, CorpusError> {
        let truncated = CorpusError::Truncated {
            expected: self.nsentences(),
            read: self.read,
        };
        let (gold_label, gold) = match self.gold.next() {
            Some(item) => item?,
            None => return Err(truncated),
        };
        let mut sentence = match self.nbest.next() {
            Some(item) => item?,
            None => return Err(truncated),
        };
        if sentence.label != gold_label {
            return Err(CorpusError::LabelMismatch {
                nbest: sentence.label,
                gold: gold_label,
            });
        }
        sentence.gold = Some(gold);
        self.read += 1;
        Ok(sentence)
    }
}

impl Iterator for CorpusReader {
    type Item = Result<Sentence, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.read >= self.nsentences() {
            return None;
        }
        let sentence = self.read_sentence();
        if sentence.is_err() {
            self.read = self.nsentences();
        }
        Some(sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

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

    fn reader(nbest: &str, gold: &str) -> CorpusReader {
        CorpusReader::new(
            Box::new(Cursor::new(nbest.to_string())),
            Box::new(Cursor::new(gold.to_string())),
            &SymbolPool::new(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_read_nbest_blocks() {
        let sentences: Vec<Sentence> =
            NbestReader::new(Cursor::new(NBEST), SymbolPool::new(), false)
                .collect::<Result<_, _>>()
                .unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].label, "s1");
        assert_eq!(sentences[0].nparses(), 2);
        assert_eq!(sentences[1].parses[0].tree.len(), 1);
        assert!(sentences[0].gold.is_none());
    }

    #[test]
    fn test_logcondprob_normalizes() {
        let sentences: Vec<Sentence> =
            NbestReader::new(Cursor::new(NBEST), SymbolPool::new(), false)
                .collect::<Result<_, _>>()
                .unwrap();
        let total: f64 = sentences[0].parses.iter().map(|p| p.logcondprob.exp()).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(sentences[1].parses[0].logcondprob.abs() < 1e-12);
        let diff = sentences[0].parses[0].logcondprob - sentences[0].parses[1].logcondprob;
        assert!((diff - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_paired_reader() {
        let corpus = reader(NBEST, GOLD);
        assert_eq!(corpus.nsentences(), 2);
        let sentences: Vec<Sentence> = corpus.collect::<Result<_, _>>().unwrap();
        assert_eq!(sentences.len(), 2);
        assert!(sentences.iter().all(|s| s.gold.is_some()));
        assert_eq!(
            sentences[0].parses[0].text,
            "(S1 (S (NP (DT The) (NN dog)) (VP (VBZ barks)) (. .)))"
        );
    }

    #[test]
    fn test_label_mismatch() {
        let gold = GOLD.replace("s2 ", "s3 ");
        let result: Result<Vec<Sentence>, _> = reader(NBEST, &gold).collect();
        assert!(matches!(result, Err(CorpusError::LabelMismatch { .. })));
    }

    #[test]
    fn test_truncated_nbest() {
        let gold = GOLD.replacen('2', "3", 1) + "s3 (S1 (NP (NN x)))\n";
        let result: Result<Vec<Sentence>, _> = reader(NBEST, &gold).collect();
        assert!(matches!(
            result,
            Err(CorpusError::Truncated { expected: 3, read: 2 })
        ));
    }

    #[test]
    fn test_huge_parse_count_fails_at_end_of_input() {
        let nbest = "99999999999999 s1\n-1.0\n(S1 (NP (NN x)))\n";
        let mut sentences = NbestReader::new(Cursor::new(nbest), SymbolPool::new(), false);
        assert!(matches!(
            sentences.next(),
            Some(Err(CorpusError::Format { line_num: 4, .. }))
        ));
    }

    #[test]
    fn test_bad_logprob_line() {
        let nbest = NBEST.replace("-10.5", "oops");
        let mut sentences = NbestReader::new(Cursor::new(nbest), SymbolPool::new(), false);
        assert!(matches!(
            sentences.next(),
            Some(Err(CorpusError::Format { line_num: 2, .. }))
        ));
    }
}
