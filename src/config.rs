//! Run configuration
//!
//! Plain settings built by the binaries from their command lines and passed
//! explicitly to the driver and the scorer.

use crate::catalogue;
use crate::normalize::CountMode;
use crate::registry::Collect;
use thiserror::Error;

/// Feature set used when none is named
pub const DEFAULT_FEATURE_SET: &str = "nfeatures";

/// Minimum number of informative sentences for an instance to be kept
pub const DEFAULT_MINCOUNT: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: unknown feature set `{0}`")]
    UnknownFeatureSet(String),

    #[error("Config error: neither -c nor -i given, so no features would be collected")]
    NothingToCollect,

    #[error("Config error: unknown output mode {0}, expected 0, 1 or 2")]
    UnknownMode(u8),

    #[error("Config error: expected n-best, gold and output files in groups of three, got {0} paths")]
    FileTriples(usize),
}

/// Settings for feature extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub absolute_counts: bool,
    /// Collect features from the best-scoring (correct) parses
    pub collect_correct: bool,
    /// Collect features from the other parses
    pub collect_incorrect: bool,
    pub lowercase: bool,
    pub mincount: u32,
    pub feature_set: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            absolute_counts: false,
            collect_correct: false,
            collect_incorrect: false,
            lowercase: false,
            mincount: DEFAULT_MINCOUNT,
            feature_set: DEFAULT_FEATURE_SET.to_string(),
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.collect_correct && !self.collect_incorrect {
            return Err(ConfigError::NothingToCollect);
        }
        check_feature_set(&self.feature_set)
    }

    pub fn count_mode(&self) -> CountMode {
        CountMode::from_absolute(self.absolute_counts)
    }

    pub fn collect(&self) -> Collect {
        Collect {
            correct: self.collect_correct,
            incorrect: self.collect_incorrect,
        }
    }
}

/// What `best-parses` writes for each sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// The highest-scoring tree
    #[default]
    BestTree = 0,
    /// Every parse with its score, best first
    RankedTrees = 1,
    /// Every feature value with a nonzero weight
    FeatureValues = 2,
}

impl TryFrom<u8> for OutputMode {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(Self::BestTree),
            1 => Ok(Self::RankedTrees),
            2 => Ok(Self::FeatureValues),
            _ => Err(ConfigError::UnknownMode(code)),
        }
    }
}

/// Settings for scoring parses with trained weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreConfig {
    pub absolute_counts: bool,
    pub lowercase: bool,
    pub mode: OutputMode,
    pub feature_set: String,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            absolute_counts: true,
            lowercase: false,
            mode: OutputMode::BestTree,
            feature_set: DEFAULT_FEATURE_SET.to_string(),
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_feature_set(&self.feature_set)
    }

    pub fn count_mode(&self) -> CountMode {
        CountMode::from_absolute(self.absolute_counts)
    }
}

fn check_feature_set(name: &str) -> Result<(), ConfigError> {
    if catalogue::is_known(name) {
        Ok(())
    } else {
        Err(ConfigError::UnknownFeatureSet(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_needs_a_collection() {
        let config = ExtractConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::NothingToCollect)));

        let config = ExtractConfig {
            collect_incorrect: true,
            ..ExtractConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.count_mode(), CountMode::Relative);
        assert_eq!(
            config.collect(),
            Collect {
                correct: false,
                incorrect: true
            }
        );
    }

    #[test]
    fn test_unknown_feature_set() {
        let config = ScoreConfig {
            feature_set: "nosuchset".to_string(),
            ..ScoreConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Config error: unknown feature set `nosuchset`");
    }

    #[test]
    fn test_scoring_defaults_to_absolute_counts() {
        let config = ScoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.count_mode(), CountMode::Absolute);
    }

    #[test]
    fn test_output_modes() {
        assert_eq!(OutputMode::try_from(1).unwrap(), OutputMode::RankedTrees);
        assert!(matches!(OutputMode::try_from(3), Err(ConfigError::UnknownMode(3))));
    }
}
