//! Symbol interning
//!
//! Categories, words and feature markers are interned into a shared
//! [`SymbolPool`] so that equality and ordering are integer comparisons.
//! A fresh pool is seeded with [`WELL_KNOWN`] in order, which makes the
//! handles in [`sym`] valid constants for every pool.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const SYMBOL_POOL_CAPACITY: usize = 5000;

/// Strings interned by every new pool, in handle order (first is 1).
pub const WELL_KNOWN: [&str; 28] = [
    "_", "*CHILD*", "*ADJ*", "*CONJ*", "*HEAD*", "*LASTADJ*", "*LASTCONJ*", "*NONROOT*",
    "*POSTHEAD*", "*PREHEAD*", "DT", "NP", "ROOT", "S", "SBAR", "SINV", "VB", "VP", "0", "1",
    "2", "4", "5", "CC", "CONJP", "PRT", "ADVP", "-NONE-",
];

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Sym(NonZeroU32); // 0 reserved as "invalid"

impl Sym {
    const fn well_known(index: u32) -> Sym {
        match NonZeroU32::new(index) {
            Some(n) => Sym(n),
            None => panic!("symbol 0 is reserved"),
        }
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0.get()
    }
}

/// Handles of the [`WELL_KNOWN`] symbols.
pub mod sym {
    use super::Sym;

    pub const ENDMARKER: Sym = Sym::well_known(1);
    pub const CHILDMARKER: Sym = Sym::well_known(2);
    pub const ADJUNCTMARKER: Sym = Sym::well_known(3);
    pub const CONJUNCTMARKER: Sym = Sym::well_known(4);
    pub const HEADMARKER: Sym = Sym::well_known(5);
    pub const LASTADJUNCTMARKER: Sym = Sym::well_known(6);
    pub const LASTCONJUNCTMARKER: Sym = Sym::well_known(7);
    pub const NONROOTMARKER: Sym = Sym::well_known(8);
    pub const POSTHEADMARKER: Sym = Sym::well_known(9);
    pub const PREHEADMARKER: Sym = Sym::well_known(10);
    pub const DT: Sym = Sym::well_known(11);
    pub const NP: Sym = Sym::well_known(12);
    pub const ROOT: Sym = Sym::well_known(13);
    pub const S: Sym = Sym::well_known(14);
    pub const SBAR: Sym = Sym::well_known(15);
    pub const SINV: Sym = Sym::well_known(16);
    pub const VB: Sym = Sym::well_known(17);
    pub const VP: Sym = Sym::well_known(18);
    pub const ZERO: Sym = Sym::well_known(19);
    pub const ONE: Sym = Sym::well_known(20);
    pub const TWO: Sym = Sym::well_known(21);
    pub const FOUR: Sym = Sym::well_known(22);
    pub const FIVE: Sym = Sym::well_known(23);
    pub const CC: Sym = Sym::well_known(24);
    pub const CONJP: Sym = Sym::well_known(25);
    pub const PRT: Sym = Sym::well_known(26);
    pub const ADVP: Sym = Sym::well_known(27);
    pub const NONE: Sym = Sym::well_known(28);
}

/// Shared, cloneable string interner. Clones intern into the same table.
#[derive(Clone, Debug)]
pub struct SymbolPool(Arc<Mutex<Interner>>);

impl Default for SymbolPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolPool {
    pub fn new() -> Self {
        let mut interner = Interner::with_capacity(SYMBOL_POOL_CAPACITY);
        for text in WELL_KNOWN {
            interner.get_or_intern(text);
        }
        Self(Arc::new(Mutex::new(interner)))
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Interner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn intern(&self, text: &str) -> Sym {
        self.lock().get_or_intern(text)
    }

    #[inline]
    pub fn resolve(&self, sym: Sym) -> Arc<str> {
        self.lock().resolve(sym)
    }

    /// Number of distinct symbols interned so far.
    pub fn len(&self) -> usize {
        self.lock().slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Interner {
    map: HashMap<Arc<str>, Sym, FxBuildHasher>,
    slab: Vec<Arc<str>>, // index = Sym-1
}

impl Interner {
    fn with_capacity(cap: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(cap, FxBuildHasher),
            slab: Vec::with_capacity(cap),
        }
    }

    fn get_or_intern(&mut self, text: &str) -> Sym {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }
        let sym = Sym::well_known(self.slab.len() as u32 + 1);
        let owned: Arc<str> = Arc::from(text);
        self.map.insert(owned.clone(), sym);
        self.slab.push(owned);
        sym
    }

    #[inline]
    fn resolve(&self, sym: Sym) -> Arc<str> {
        self.slab[(sym.index() - 1) as usize].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interner_basic() {
        let pool = SymbolPool::new();
        let sym1 = pool.intern("dog");
        let sym2 = pool.intern("cat");
        let sym3 = pool.intern("dog");

        assert_eq!(sym1, sym3);
        assert_ne!(sym1, sym2);
        assert_eq!(&*pool.resolve(sym2), "cat");
    }

    #[test]
    fn test_well_known_handles() {
        let pool = SymbolPool::new();
        assert_eq!(pool.intern("_"), sym::ENDMARKER);
        assert_eq!(pool.intern("*PREHEAD*"), sym::PREHEADMARKER);
        assert_eq!(pool.intern("NP"), sym::NP);
        assert_eq!(pool.intern("5"), sym::FIVE);
        assert_eq!(pool.intern("-NONE-"), sym::NONE);
        assert_eq!(pool.len(), WELL_KNOWN.len());
    }

    #[test]
    fn test_clone_shares_table() {
        let pool1 = SymbolPool::new();
        let sym1 = pool1.intern("café");
        let pool2 = pool1.clone();
        assert_eq!(pool2.intern("café"), sym1);
        assert_eq!(&*pool2.resolve(sym1), "café");
    }

    #[test]
    fn test_order_follows_interning() {
        let pool = SymbolPool::new();
        let a = pool.intern("zebra");
        let b = pool.intern("aardvark");
        assert!(a < b);
    }
}
