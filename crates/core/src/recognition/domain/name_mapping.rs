use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::shared::constants::UNKNOWN_NAME;

#[derive(Error, Debug)]
pub enum NameMappingError {
    #[error("failed to read name mapping {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid name mapping {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected STEM=NAME, got '{0}'")]
    InvalidPair(String),
}

/// Maps reference image file stems to display names.
///
/// Lookup is exact and case-sensitive; unmapped stems resolve to
/// `"Unknown"`. On disk the mapping is a flat JSON object:
/// `{"digital photo": "Name1"}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct NameMapping {
    names: HashMap<String, String>,
}

impl NameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, NameMappingError> {
        let json = fs::read_to_string(path).map_err(|source| NameMappingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| NameMappingError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a `STEM=NAME` pair. Only the first `=` separates.
    pub fn parse_pair(pair: &str) -> Result<(String, String), NameMappingError> {
        match pair.split_once('=') {
            Some((stem, name)) if !stem.is_empty() && !name.is_empty() => {
                Ok((stem.to_string(), name.to_string()))
            }
            _ => Err(NameMappingError::InvalidPair(pair.to_string())),
        }
    }

    pub fn insert(&mut self, stem: impl Into<String>, name: impl Into<String>) {
        self.names.insert(stem.into(), name.into());
    }

    pub fn display_name(&self, stem: &str) -> &str {
        self.names.get(stem).map_or(UNKNOWN_NAME, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>, N: Into<String>> FromIterator<(S, N)> for NameMapping {
    fn from_iter<I: IntoIterator<Item = (S, N)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (stem, name) in iter {
            mapping.insert(stem, name);
        }
        mapping
    }
}
