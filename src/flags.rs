//! Annotation flags embedded in documentation text.
//!
//! Binding annotations ride along in doc comments as lines of the form
//! `@nobind` or `@rename: region_of`. The extractor pulls them out and
//! hands back the cleaned description text.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref FLAG_LINE: Regex =
        Regex::new(r"^\s*@([A-Za-z_][A-Za-z0-9_.-]*)(?:\s*:\s*(.*?))?\s*$").unwrap();
}

/// Annotation flags attached to an entity. Bare flags store an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeMap<String, String>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of a flag, `None` when the flag is not set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Folds `other` into `self`, later values winning per flag.
    pub fn merge(&mut self, other: FlagSet) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Splits annotation lines out of documentation text.
///
/// Flag names are lowercased. `@rename: region_of` stores `region_of`;
/// a bare `@nobind` stores an empty value. Lines that are not annotations
/// come back joined as the cleaned description.
pub fn extract_flags(text: &str) -> (FlagSet, String) {
    let mut flags = FlagSet::new();
    let mut kept = Vec::new();
    for line in text.lines() {
        if let Some(caps) = FLAG_LINE.captures(line) {
            let name = caps[1].to_lowercase();
            let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            flags.insert(name, value);
        } else {
            kept.push(line);
        }
    }
    (flags, kept.join("\n").trim().to_string())
}
