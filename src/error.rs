//! Crate-level error type
//!
//! Each layer reports its own error enum; [`Error`] gathers them so the
//! driver and the binaries can propagate any of them with `?`.

use crate::config::ConfigError;
use crate::corpus::CorpusError;
use crate::registry::RegistryError;
use crate::scorer::WeightsError;
use crate::treebank::TreeError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Weights(#[from] WeightsError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
