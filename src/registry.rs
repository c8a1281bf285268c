//! Feature registry
//!
//! Every template shares one lifecycle, implemented once here over the
//! template's key type:
//!
//! 1. **Discovery** tallies, per instance, the number of ambiguous sentences
//!    in which it is informative.
//! 2. **Prune and renumber** keeps instances seen in at least `mincount`
//!    sentences and gives them ids from a counter shared by all templates,
//!    in registration order.
//! 3. **Persist and restore** write and read `id<TAB>identifier instance`
//!    lines.
//! 4. **Counting** resolves instances to ids and normalizes the values of
//!    one sentence.
//!
//! [`FeatureClass`] carries a [`Template`] through these states and is
//! stored type-erased as a [`FeatureTemplate`] in the [`FeatureRegistry`].

use crate::corpus::Sentence;
use crate::feature::{FeatureCounts, Id, KeyError, Template, Value, read_key, render_key};
use crate::normalize::{CountMode, normalize};
use crate::symbol::SymbolPool;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::collections::hash_map::Entry;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Error type for registry failures
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry error: {0}")]
    Io(#[from] io::Error),

    #[error("Registry error at line {line_num}: malformed feature definition `{line}`")]
    Malformed { line_num: usize, line: String },

    #[error("Registry error at line {line_num}: can't find feature identifier {identifier} in feature list")]
    UnknownIdentifier { line_num: usize, identifier: String },

    #[error("Registry error at line {line_num}: {source}")]
    Instance {
        line_num: usize,
        #[source]
        source: KeyError,
    },

    #[error("Registry error at line {line_num}: duplicate feature, id = {id}, f = `{instance}`")]
    DuplicateFeature {
        line_num: usize,
        id: Id,
        instance: String,
    },
}

/// Which parses discovery collects features from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Collect {
    pub correct: bool,
    pub incorrect: bool,
}

/// Per-sentence values, one id map per parse
pub type ParseValues = Vec<BTreeMap<Id, Value>>;

/// Type-erased lifecycle of one template
pub trait FeatureTemplate {
    fn identifier(&self) -> &str;

    /// Tally the informative instances of one sentence
    fn discover(&mut self, sentence: &Sentence, collect: Collect);

    /// Keep instances tallied at least `mincount` times, number them from
    /// `next_id`, write their definitions and return the next free id
    fn prune_and_renumber(
        &mut self,
        mincount: u32,
        next_id: Id,
        symbols: &SymbolPool,
        out: &mut dyn Write,
    ) -> io::Result<Id>;

    /// Write `id<TAB>identifier instance` lines, sorted by id
    fn export_ids(&self, symbols: &SymbolPool, out: &mut dyn Write) -> io::Result<()>;

    /// Give the rendered `instance` the id `id`. Returns false if the
    /// instance already has an id.
    fn restore(&mut self, instance: &str, id: Id, symbols: &SymbolPool) -> Result<bool, KeyError>;

    /// Add this template's normalized values for `sentence` to `values`
    fn feature_values(&self, sentence: &Sentence, mode: CountMode, values: &mut ParseValues);

    /// Number of instances tallied or numbered
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
enum Table<F> {
    Discovering(FxHashMap<F, u32>),
    Numbered(FxHashMap<F, Id>),
}

/// A template together with its instance table
pub struct FeatureClass<T: Template> {
    template: T,
    table: Table<T::Feature>,
}

impl<T: Template> FeatureClass<T> {
    pub fn new(template: T) -> Self {
        Self {
            template,
            table: Table::Discovering(FxHashMap::default()),
        }
    }

    pub fn template(&self) -> &T {
        &self.template
    }

    /// Id of `feature`, once numbered
    pub fn id(&self, feature: &T::Feature) -> Option<Id> {
        match &self.table {
            Table::Numbered(ids) => ids.get(feature).copied(),
            Table::Discovering(_) => None,
        }
    }

    /// Discovery tally of `feature`
    pub fn tally(&self, feature: &T::Feature) -> u32 {
        match &self.table {
            Table::Discovering(tallies) => tallies.get(feature).copied().unwrap_or(0),
            Table::Numbered(_) => 0,
        }
    }

    /// Count every parse of `sentence`, grouping values by instance
    fn parse_values(&self, sentence: &Sentence) -> FxHashMap<T::Feature, Vec<(usize, Value)>> {
        let mut feature_values: FxHashMap<T::Feature, Vec<(usize, Value)>> = FxHashMap::default();
        for (i, parse) in sentence.parses.iter().enumerate() {
            let mut counts = FeatureCounts::new();
            self.template.enumerate_into(parse, &mut counts);
            for (feature, value) in counts.into_entries() {
                feature_values.entry(feature).or_default().push((i, value));
            }
        }
        feature_values
    }
}

impl<T: Template> FeatureTemplate for FeatureClass<T> {
    fn identifier(&self) -> &str {
        self.template.identifier()
    }

    fn discover(&mut self, sentence: &Sentence, collect: Collect) {
        let nparses = sentence.nparses();
        if nparses <= 1 {
            return;
        }
        let feature_values = self.parse_values(sentence);
        let Table::Discovering(tallies) = &mut self.table else {
            log::debug!("{}: already numbered, discovery ignored", self.template.identifier());
            return;
        };
        for (feature, parse_values) in feature_values {
            let first = parse_values[0].1;
            let pseudo_constant =
                parse_values.len() == nparses && parse_values.iter().all(|&(_, v)| v == first);
            if pseudo_constant {
                continue;
            }
            // parse values are in parse order, so parse 0 comes first if present
            let on_parse0 = parse_values.first().filter(|&&(i, _)| i == 0).map(|&(_, v)| v);
            let correct = collect.correct && on_parse0.is_none_or(|v| v == 0.0);
            let incorrect = collect.incorrect
                && (on_parse0.is_some_and(|v| v != 0.0) || parse_values.len() > 1);
            if correct || incorrect {
                *tallies.entry(feature).or_insert(0) += 1;
            }
        }
    }

    fn prune_and_renumber(
        &mut self,
        mincount: u32,
        next_id: Id,
        symbols: &SymbolPool,
        out: &mut dyn Write,
    ) -> io::Result<Id> {
        let table = std::mem::replace(&mut self.table, Table::Numbered(FxHashMap::default()));
        let (mut kept, seen): (Vec<T::Feature>, usize) = match table {
            Table::Discovering(tallies) => {
                let seen = tallies.len();
                let kept = tallies
                    .into_iter()
                    .filter(|&(_, tally)| tally >= mincount)
                    .map(|(feature, _)| feature)
                    .collect();
                (kept, seen)
            }
            Table::Numbered(ids) => {
                let seen = ids.len();
                (ids.into_keys().collect(), seen)
            }
        };
        kept.sort_unstable();
        log::debug!(
            "{}: kept {} of {} features",
            self.template.identifier(),
            kept.len(),
            seen
        );

        let mut id = next_id;
        let mut ids = FxHashMap::default();
        ids.reserve(kept.len());
        for feature in kept {
            ids.insert(feature, id);
            id += 1;
        }
        self.table = Table::Numbered(ids);
        self.export_ids(symbols, out)?;
        Ok(id)
    }

    fn export_ids(&self, symbols: &SymbolPool, out: &mut dyn Write) -> io::Result<()> {
        let Table::Numbered(ids) = &self.table else {
            return Ok(());
        };
        let mut numbered: Vec<(Id, &T::Feature)> = ids.iter().map(|(f, &id)| (id, f)).collect();
        numbered.sort_unstable_by_key(|&(id, _)| id);
        let identifier = self.template.identifier();
        for (id, feature) in numbered {
            writeln!(out, "{id}\t{identifier} {}", render_key(feature, symbols))?;
        }
        Ok(())
    }

    fn restore(&mut self, instance: &str, id: Id, symbols: &SymbolPool) -> Result<bool, KeyError> {
        let feature: T::Feature = read_key(instance, symbols)?;
        if let Table::Discovering(_) = self.table {
            self.table = Table::Numbered(FxHashMap::default());
        }
        match &mut self.table {
            Table::Numbered(ids) => match ids.entry(feature) {
                Entry::Occupied(_) => Ok(false),
                Entry::Vacant(entry) => {
                    entry.insert(id);
                    Ok(true)
                }
            },
            Table::Discovering(_) => Ok(false),
        }
    }

    fn feature_values(&self, sentence: &Sentence, mode: CountMode, values: &mut ParseValues) {
        let Table::Numbered(ids) = &self.table else {
            return;
        };
        let nparses = sentence.nparses();
        let mut id_values: FxHashMap<Id, Vec<Value>> = FxHashMap::default();
        for (feature, parse_values) in self.parse_values(sentence) {
            let Some(&id) = ids.get(&feature) else {
                continue;
            };
            let per_parse = id_values.entry(id).or_insert_with(|| vec![0.0; nparses]);
            for (i, value) in parse_values {
                per_parse[i] += value;
            }
        }
        for (id, mut per_parse) in id_values {
            normalize(&mut per_parse, mode);
            for (i, value) in per_parse.into_iter().enumerate() {
                if value != 0.0 {
                    values[i].insert(id, value);
                }
            }
        }
    }

    fn len(&self) -> usize {
        match &self.table {
            Table::Discovering(tallies) => tallies.len(),
            Table::Numbered(ids) => ids.len(),
        }
    }
}

/// Ordered collection of feature templates sharing one id space
pub struct FeatureRegistry {
    templates: Vec<Box<dyn FeatureTemplate>>,
    symbols: SymbolPool,
}

impl FeatureRegistry {
    pub fn new(symbols: SymbolPool) -> Self {
        Self {
            templates: Vec::new(),
            symbols,
        }
    }

    pub fn symbols(&self) -> &SymbolPool {
        &self.symbols
    }

    /// Register `template`. Returns false, registering nothing, if a
    /// template with the same identifier is already present.
    pub fn push<T: Template + 'static>(&mut self, template: T) -> bool {
        if self.contains(template.identifier()) {
            log::debug!("Skipping duplicate feature class {}", template.identifier());
            return false;
        }
        self.templates.push(Box::new(FeatureClass::new(template)));
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.templates.iter().any(|t| t.identifier() == identifier)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.identifier())
    }

    pub fn templates(&self) -> &[Box<dyn FeatureTemplate>] {
        &self.templates
    }

    /// Tally informative instances of one sentence in every template
    pub fn discover(&mut self, sentence: &Sentence, collect: Collect) {
        if sentence.nparses() <= 1 {
            log::trace!("Skipping unambiguous sentence {}", sentence.label);
            return;
        }
        for template in &mut self.templates {
            template.discover(sentence, collect);
        }
    }

    /// Prune and number every template from id 0, writing the definitions.
    /// Returns the number of ids assigned.
    pub fn prune_and_renumber(&mut self, mincount: u32, out: &mut dyn Write) -> io::Result<Id> {
        let mut next_id = 0;
        for template in &mut self.templates {
            next_id = template.prune_and_renumber(mincount, next_id, &self.symbols, out)?;
        }
        out.flush()?;
        Ok(next_id)
    }

    pub fn write_feature_ids(&self, out: &mut dyn Write) -> io::Result<()> {
        for template in &self.templates {
            template.export_ids(&self.symbols, out)?;
        }
        out.flush()
    }

    /// Restore ids from a definitions stream and return the largest id read
    pub fn read_feature_ids(&mut self, reader: impl BufRead) -> Result<Id, RegistryError> {
        let index: FxHashMap<String, usize> = self
            .templates
            .iter()
            .enumerate()
            .map(|(i, t)| (t.identifier().to_string(), i))
            .collect();

        let mut max_id = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let Some((id, identifier, instance)) = split_definition(&line) else {
                return Err(RegistryError::Malformed { line_num, line });
            };
            let Some(&t) = index.get(identifier) else {
                return Err(RegistryError::UnknownIdentifier {
                    line_num,
                    identifier: identifier.to_string(),
                });
            };
            let inserted = self.templates[t]
                .restore(instance, id, &self.symbols)
                .map_err(|source| RegistryError::Instance { line_num, source })?;
            if !inserted {
                return Err(RegistryError::DuplicateFeature {
                    line_num,
                    id,
                    instance: instance.to_string(),
                });
            }
            max_id = max_id.max(id);
        }
        Ok(max_id)
    }

    /// Normalized id values of every parse of `sentence`
    pub fn feature_values(&self, sentence: &Sentence, mode: CountMode) -> ParseValues {
        let mut values = vec![BTreeMap::new(); sentence.nparses()];
        for template in &self.templates {
            template.feature_values(sentence, mode, &mut values);
        }
        values
    }
}

/// Split `id<TAB>identifier instance` into its three fields
fn split_definition(line: &str) -> Option<(Id, &str, &str)> {
    let bytes = line.as_bytes();
    let id_end = memchr::memchr2(b'\t', b' ', bytes)?;
    let id = atoi::atoi::<Id>(&bytes[..id_end]).filter(|_| {
        bytes[..id_end].iter().all(u8::is_ascii_digit)
    })?;
    let rest = line[id_end..].trim_start();
    let identifier_end = memchr::memchr2(b' ', b'\t', rest.as_bytes()).unwrap_or(rest.len());
    let identifier = &rest[..identifier_end];
    if identifier.is_empty() {
        return None;
    }
    Some((id, identifier, &rest[identifier_end..]))
}
