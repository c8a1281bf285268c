//! Log-probability features
//!
//! These read the parser's scores rather than the tree: the negative log
//! probability, the negative log conditional probability, and binned
//! versions of the latter.

use crate::corpus::Parse;
use crate::feature::{FeatureCounts, Template};

/// `-logprob` on feature 0
#[derive(Debug, Clone, Default)]
pub struct NLogP;

impl Template for NLogP {
    type Feature = i32;

    fn identifier(&self) -> &str {
        "NLogP"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        counts.add(0, -parse.logprob);
    }
}

/// `-logcondprob` on feature 0
#[derive(Debug, Clone, Default)]
pub struct NLogCondP;

impl Template for NLogCondP {
    type Feature = i32;

    fn identifier(&self) -> &str {
        "NLogCondP"
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        counts.add(0, -parse.logcondprob);
    }
}

/// Bin of `-logcondprob` in log base `base`, clamped to `1..=nbins`
fn bin(parse: &Parse, nbins: i32, log_base: f64) -> (i32, f64) {
    let scaled = -parse.logcondprob / log_base;
    ((scaled as i32).clamp(1, nbins.max(1)), scaled)
}

/// Counts parses by log conditional probability bin
#[derive(Debug, Clone)]
pub struct BinnedLogCondP {
    nbins: i32,
    log_base: f64,
    identifier: String,
}

impl BinnedLogCondP {
    pub fn new(nbins: i32, base: f64) -> Self {
        Self {
            nbins,
            log_base: base.ln(),
            identifier: format!("BinnedLogCondP:{nbins}:{base}"),
        }
    }
}

impl Default for BinnedLogCondP {
    fn default() -> Self {
        Self::new(7, 2.0)
    }
}

impl Template for BinnedLogCondP {
    type Feature = i32;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        let (bin, _) = bin(parse, self.nbins, self.log_base);
        counts.incr(bin);
    }
}

/// Like [`BinnedLogCondP`], but each bin carries the scaled value itself
#[derive(Debug, Clone)]
pub struct InterpLogCondP {
    nbins: i32,
    log_base: f64,
    identifier: String,
}

impl InterpLogCondP {
    pub fn new(nbins: i32, base: f64) -> Self {
        Self {
            nbins,
            log_base: base.ln(),
            identifier: format!("InterpLogCondP:{nbins}:{base}"),
        }
    }
}

impl Default for InterpLogCondP {
    fn default() -> Self {
        Self::new(7, 2.0)
    }
}

impl Template for InterpLogCondP {
    type Feature = i32;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn enumerate_into(&self, parse: &Parse, counts: &mut FeatureCounts<i32>) {
        let (bin, scaled) = bin(parse, self.nbins, self.log_base);
        counts.add(bin, scaled);
    }
}
