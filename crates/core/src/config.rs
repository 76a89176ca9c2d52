//! Extraction settings shared (immutably) by every task of a batch.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

pub const MAX_THREADS: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
    #[error("unknown language '{0}' (expected c or cpp)")]
    UnknownLanguage(String),
    #[error("unknown traversal '{0}' (expected root-terminal or terminal-terminal)")]
    UnknownTraversal(String),
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceLanguage {
    C,
    #[default]
    Cpp,
}

impl SourceLanguage {
    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            SourceLanguage::C => tree_sitter_c::LANGUAGE.into(),
            SourceLanguage::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    /// File extensions picked up when scanning an input directory.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SourceLanguage::C => &["c", "h"],
            SourceLanguage::Cpp => &["cpp", "cc", "cxx", "hpp", "hh", "h", "c"],
        }
    }

    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceLanguage::C => "c",
            SourceLanguage::Cpp => "cpp",
        })
    }
}

impl FromStr for SourceLanguage {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "c" => Ok(SourceLanguage::C),
            "cpp" | "c++" => Ok(SourceLanguage::Cpp),
            other => Err(ConfigError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Which node sequences are enumerated per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalMode {
    /// One context per root-to-terminal branch.
    RootTerminal,
    /// One context per bounded pair of terminals.
    #[default]
    TerminalTerminal,
}

impl FromStr for TraversalMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "root-terminal" | "rt" => Ok(TraversalMode::RootTerminal),
            "terminal-terminal" | "tpt" => Ok(TraversalMode::TerminalTerminal),
            other => Err(ConfigError::UnknownTraversal(other.to_string())),
        }
    }
}

/// How terminal tokens are spelled in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenEncoding {
    /// Identifiers, types and constants by value; strings by type.
    #[default]
    ValueFirst,
    /// Identifiers masked by type; types and constants by value; strings hashed.
    TypeFirst,
}

impl FromStr for TokenEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "value-first" | "0" => Ok(TokenEncoding::ValueFirst),
            "type-first" | "1" => Ok(TokenEncoding::TypeFirst),
            other => Err(ConfigError::UnknownEncoding(other.to_string())),
        }
    }
}

/// How the structural part of a context is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathEncoding {
    /// Concatenated 3-digit node ids, reversible.
    #[default]
    Ids,
    /// A single hash of the concatenated ids.
    Hashed,
}

impl FromStr for PathEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ids" => Ok(PathEncoding::Ids),
            "hashed" | "hash" => Ok(PathEncoding::Hashed),
            other => Err(ConfigError::UnknownEncoding(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub max_path_length: usize,
    pub max_path_width: usize,
    pub num_threads: usize,
    /// Files handed to a worker per submitted task.
    pub batch_size: usize,
    pub traversal: TraversalMode,
    pub token_encoding: TokenEncoding,
    pub path_encoding: PathEncoding,
    pub language: SourceLanguage,
    /// Label lines with `task|status|id` instead of just `task`.
    pub export_vectors: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_path_length: 8,
            max_path_width: 2,
            num_threads: 1,
            batch_size: 1,
            traversal: TraversalMode::default(),
            token_encoding: TokenEncoding::default(),
            path_encoding: PathEncoding::default(),
            language: SourceLanguage::default(),
            export_vectors: false,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_range("max_path_length", self.max_path_length, 1, usize::MAX)?;
        check_range("max_path_width", self.max_path_width, 1, usize::MAX)?;
        check_range("num_threads", self.num_threads, 1, MAX_THREADS)?;
        check_range("batch_size", self.batch_size, 1, usize::MAX)?;
        Ok(())
    }

    /// Reads a JSON config; omitted fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

fn check_range(
    field: &'static str,
    value: usize,
    min: usize,
    max: usize,
) -> std::result::Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
