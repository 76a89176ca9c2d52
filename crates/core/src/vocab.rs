//! Hash → terminal text mapping, built per worker and merged at the end.
//!
//! On disk the first line holds the entry count; every entry then starts with
//! [`RECORD_MARKER`] followed by `<hash> <text>`. Lines without the marker
//! continue the text of the previous entry, so multi-line values survive.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::error::{ExtractError, Result};
use crate::util::hash_text;

/// ASCII record separator; never produced by source text in practice.
pub const RECORD_MARKER: char = '\u{1e}';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    entries: BTreeMap<u64, String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: u64, text: impl Into<String>) {
        self.entries.insert(hash, text.into());
    }

    /// Hashes `text`, records it and returns the hash.
    pub fn record_text(&mut self, text: &str) -> u64 {
        let hash = hash_text(text);
        self.entries
            .entry(hash)
            .or_insert_with(|| text.to_string());
        hash
    }

    pub fn get(&self, hash: u64) -> Option<&str> {
        self.entries.get(&hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds `other` in; its values replace ours on equal hashes.
    pub fn merge(&mut self, other: Vocabulary) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(hash, text)| (*hash, text.as_str()))
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}", self.entries.len())?;
        for (hash, text) in &self.entries {
            writeln!(out, "{RECORD_MARKER}{hash} {text}")?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut input: R) -> Result<Self> {
        let mut content = String::new();
        input.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let body = content.strip_suffix('\n').unwrap_or(content);
        let mut lines = body.split('\n');

        let header = lines.next().unwrap_or_default();
        let expected: usize = header
            .trim()
            .parse()
            .map_err(|_| ExtractError::Format(format!("bad vocabulary header '{header}'")))?;

        let mut vocab = Self::default();
        let mut current: Option<(u64, String)> = None;
        for line in lines {
            if let Some(record) = line.strip_prefix(RECORD_MARKER) {
                if let Some((hash, text)) = current.take() {
                    vocab.entries.insert(hash, text);
                }
                let (hash, text) = record.split_once(' ').ok_or_else(|| {
                    ExtractError::Format(format!("vocabulary record without text: '{record}'"))
                })?;
                let hash = hash.parse::<u64>().map_err(|_| {
                    ExtractError::Format(format!("bad vocabulary hash '{hash}'"))
                })?;
                current = Some((hash, text.to_string()));
            } else {
                let (_, text) = current.as_mut().ok_or_else(|| {
                    ExtractError::Format("continuation line before first record".to_string())
                })?;
                text.push('\n');
                text.push_str(line);
            }
        }
        if let Some((hash, text)) = current {
            vocab.entries.insert(hash, text);
        }

        if vocab.len() != expected {
            return Err(ExtractError::Format(format!(
                "vocabulary header says {expected} entries, found {}",
                vocab.len()
            )));
        }
        Ok(vocab)
    }
}
