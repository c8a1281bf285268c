//! Feature instances and the per-template contract
//!
//! A [`Template`] walks one candidate parse and adds concrete instances of
//! its [`Template::Feature`] type to a [`FeatureCounts`]. Instances render to
//! text for the definitions file and are read back through a [`KeyReader`]:
//! integers and symbols are single tokens, sequences and pairs are
//! parenthesized, and tree fragments take the rest of the line verbatim.
//!
//! The shared helpers used by the template walks live here too.

use crate::corpus::Parse;
use crate::symbol::{Sym, SymbolPool, sym};
use crate::tree::{NodeId, Tree};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use thiserror::Error;

/// Feature id, unique across a registry
pub type Id = u32;

/// Feature value
pub type Value = f64;

/// Error reading a rendered feature instance
#[derive(Debug, Error)]
#[error("Feature error: {message} in `{text}`")]
pub struct KeyError {
    pub text: String,
    pub message: String,
}

/// A feature instance that can be counted, ordered and written out
pub trait FeatureKey: Ord + Hash + Clone {
    fn render(&self, symbols: &SymbolPool, out: &mut String);

    fn read(reader: &mut KeyReader<'_>) -> Result<Self, KeyError>;
}

/// Token cursor over one rendered instance
pub struct KeyReader<'a> {
    text: &'a str,
    pos: usize,
    symbols: &'a SymbolPool,
}

impl<'a> KeyReader<'a> {
    pub fn new(text: &'a str, symbols: &'a SymbolPool) -> Self {
        Self {
            text,
            pos: 0,
            symbols,
        }
    }

    pub fn error(&self, message: impl Into<String>) -> KeyError {
        KeyError {
            text: self.text.to_string(),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    pub fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.text[self.pos..].chars().next()
    }

    pub fn expect(&mut self, ch: char) -> Result<(), KeyError> {
        if self.peek() != Some(ch) {
            return Err(self.error(format!("expected `{ch}`")));
        }
        self.pos += ch.len_utf8();
        Ok(())
    }

    /// Next atom, with backslash escapes removed
    pub fn token(&mut self) -> Result<String, KeyError> {
        self.skip_whitespace();
        let mut token = String::new();
        let mut chars = self.text[self.pos..].char_indices();
        let mut end = self.text.len() - self.pos;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => token.push(escaped),
                    None => return Err(self.error("dangling escape")),
                },
                '(' | ')' => {
                    end = i;
                    break;
                }
                c if c.is_whitespace() => {
                    end = i;
                    break;
                }
                c => token.push(c),
            }
        }
        if end == 0 {
            return Err(self.error("expected a token"));
        }
        self.pos += end;
        Ok(token)
    }

    /// Everything left on the line, trimmed
    pub fn rest(&mut self) -> &'a str {
        let rest = self.text[self.pos..].trim();
        self.pos = self.text.len();
        rest
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    pub fn symbols(&self) -> &'a SymbolPool {
        self.symbols
    }
}

/// Read a complete instance from `text`, rejecting trailing input
pub fn read_key<F: FeatureKey>(text: &str, symbols: &SymbolPool) -> Result<F, KeyError> {
    let mut reader = KeyReader::new(text, symbols);
    let key = F::read(&mut reader)?;
    if !reader.at_end() {
        return Err(reader.error("trailing input"));
    }
    Ok(key)
}

/// Render an instance to a fresh string
pub fn render_key<F: FeatureKey>(key: &F, symbols: &SymbolPool) -> String {
    let mut out = String::new();
    key.render(symbols, &mut out);
    out
}

impl FeatureKey for i32 {
    fn render(&self, _symbols: &SymbolPool, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn read(reader: &mut KeyReader<'_>) -> Result<Self, KeyError> {
        let token = reader.token()?;
        token
            .parse()
            .map_err(|_| reader.error(format!("`{token}` is not an integer")))
    }
}

impl FeatureKey for Sym {
    fn render(&self, symbols: &SymbolPool, out: &mut String) {
        for c in symbols.resolve(*self).chars() {
            if c == '\\' || c == '(' || c == ')' || c.is_whitespace() {
                out.push('\\');
            }
            out.push(c);
        }
    }

    fn read(reader: &mut KeyReader<'_>) -> Result<Self, KeyError> {
        let token = reader.token()?;
        Ok(reader.symbols().intern(&token))
    }
}

impl<T: FeatureKey> FeatureKey for Vec<T> {
    fn render(&self, symbols: &SymbolPool, out: &mut String) {
        out.push('(');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            item.render(symbols, out);
        }
        out.push(')');
    }

    fn read(reader: &mut KeyReader<'_>) -> Result<Self, KeyError> {
        reader.expect('(')?;
        let mut items = Vec::new();
        while reader.peek() != Some(')') {
            if reader.at_end() {
                return Err(reader.error("unterminated sequence"));
            }
            items.push(T::read(reader)?);
        }
        reader.expect(')')?;
        Ok(items)
    }
}

impl<A: FeatureKey, B: FeatureKey> FeatureKey for (A, B) {
    fn render(&self, symbols: &SymbolPool, out: &mut String) {
        out.push('(');
        self.0.render(symbols, out);
        out.push(' ');
        self.1.render(symbols, out);
        out.push(')');
    }

    fn read(reader: &mut KeyReader<'_>) -> Result<Self, KeyError> {
        reader.expect('(')?;
        let first = A::read(reader)?;
        let second = B::read(reader)?;
        reader.expect(')')?;
        Ok((first, second))
    }
}

/// A bracketed tree fragment, used verbatim as a key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fragment(pub String);

impl FeatureKey for Fragment {
    fn render(&self, _symbols: &SymbolPool, out: &mut String) {
        out.push_str(&self.0);
    }

    fn read(reader: &mut KeyReader<'_>) -> Result<Self, KeyError> {
        let rest = reader.rest();
        if rest.is_empty() {
            return Err(reader.error("empty tree fragment"));
        }
        Ok(Fragment(rest.to_string()))
    }
}

/// Instance counts for one parse
#[derive(Debug, Clone)]
pub struct FeatureCounts<F> {
    counts: FxHashMap<F, Value>,
}

impl<F> Default for FeatureCounts<F> {
    fn default() -> Self {
        Self {
            counts: FxHashMap::default(),
        }
    }
}

impl<F: FeatureKey> FeatureCounts<F> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn incr(&mut self, feature: F) {
        self.add(feature, 1.0);
    }

    #[inline]
    pub fn add(&mut self, feature: F, value: Value) {
        *self.counts.entry(feature).or_insert(0.0) += value;
    }

    pub fn get(&self, feature: &F) -> Option<Value> {
        self.counts.get(feature).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&F, Value)> {
        self.counts.iter().map(|(f, &v)| (f, v))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (F, Value)> {
        self.counts.into_iter()
    }
}

/// One feature family: an identifier and a walk over a candidate parse
pub trait Template {
    type Feature: FeatureKey;

    /// Configuration-encoding name, unique within a registry
    fn identifier(&self) -> &str;

    /// Add every instance found in `parse` to `counts`
    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<Self::Feature>);
}

/// Map a count to one of the buckets 0, 1, 2, 4 and 5
#[inline]
pub fn quantize(v: usize) -> i32 {
    match v {
        0 => 0,
        1 => 1,
        2 => 2,
        3 | 4 => 4,
        _ => 5,
    }
}

/// [`quantize`] as a symbol
#[inline]
pub fn symbol_quantize(v: usize) -> Sym {
    match v {
        0 => sym::ZERO,
        1 => sym::ONE,
        2 => sym::TWO,
        3 | 4 => sym::FOUR,
        _ => sym::FIVE,
    }
}

/// The last `n` characters of `s`, or `s` itself if `n` is 0 or `s` is short
pub fn suffix(symbols: &SymbolPool, s: Sym, n: usize) -> Sym {
    if n == 0 {
        return s;
    }
    let text = symbols.resolve(s);
    let len = text.chars().count();
    if len <= n {
        return s;
    }
    let start = text
        .char_indices()
        .nth(len - n)
        .map_or(text.len(), |(i, _)| i);
    symbols.intern(&text[start..])
}

/// False, with a warning, if the root span disagrees with the number of
/// preterminals
pub fn spans_preterminals(tree: &Tree) -> bool {
    let right = tree.node(tree.root).right;
    if right != tree.len() {
        log::warn!(
            "Skipping tree whose root spans {right} words but has {} preterminals",
            tree.len()
        );
        return false;
    }
    true
}

/// True for nodes labelled NP, ROOT, S or SBAR
#[inline]
pub fn is_bounding(tree: &Tree, node: Option<NodeId>) -> bool {
    node.is_some_and(|n| {
        let cat = tree.cat(n);
        cat == sym::NP || cat == sym::ROOT || cat == sym::S || cat == sym::SBAR
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_buckets() {
        let buckets: Vec<i32> = (0..8).map(quantize).collect();
        assert_eq!(buckets, vec![0, 1, 2, 4, 4, 5, 5, 5]);
        assert_eq!(quantize(1000), 5);
        assert_eq!(symbol_quantize(3), sym::FOUR);
        assert_eq!(symbol_quantize(0), sym::ZERO);
    }

    #[test]
    fn test_suffix() {
        let pool = SymbolPool::new();
        let running = pool.intern("running");
        assert_eq!(suffix(&pool, running, 0), running);
        assert_eq!(&*pool.resolve(suffix(&pool, running, 3)), "ing");
        assert_eq!(suffix(&pool, running, 7), running);
        assert_eq!(&*pool.resolve(suffix(&pool, pool.intern("café"), 2)), "fé");
    }

    #[test]
    fn test_render_nested_keys() {
        let pool = SymbolPool::new();
        let key: (i32, Vec<Sym>) = (4, vec![sym::NP, pool.intern("-LRB-"), pool.intern("a b")]);
        let text = render_key(&key, &pool);
        assert_eq!(text, "(4 (NP -LRB- a\\ b))");
        let back: (i32, Vec<Sym>) = read_key(&text, &pool).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_escaped_parentheses() {
        let pool = SymbolPool::new();
        let key = vec![pool.intern("("), pool.intern(")"), pool.intern("\\")];
        let text = render_key(&key, &pool);
        assert_eq!(text, "(\\( \\) \\\\)");
        assert_eq!(read_key::<Vec<Sym>>(&text, &pool).unwrap(), key);
    }

    #[test]
    fn test_fragment_takes_rest_of_line() {
        let pool = SymbolPool::new();
        let key: Fragment = read_key(" (NP (DT the) (NN dog)) ", &pool).unwrap();
        assert_eq!(key.0, "(NP (DT the) (NN dog))");
    }

    #[test]
    fn test_read_errors() {
        let pool = SymbolPool::new();
        assert!(read_key::<i32>("x", &pool).is_err());
        assert!(read_key::<Vec<Sym>>("(NP VP", &pool).is_err());
        assert!(read_key::<i32>("1 2", &pool).is_err());
        assert!(read_key::<Fragment>("  ", &pool).is_err());
    }

    #[test]
    fn test_counts_accumulate() {
        let mut counts = FeatureCounts::new();
        counts.incr(3);
        counts.incr(3);
        counts.add(1, -0.5);
        assert_eq!(counts.get(&3), Some(2.0));
        assert_eq!(counts.get(&1), Some(-0.5));
        assert_eq!(counts.len(), 2);
    }
}
