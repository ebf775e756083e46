//! Name conflict tracking.
//!
//! The same short name can land as a function in one namespace and an enum
//! in another. The tracker records every declared name as fragments merge;
//! what to do about collisions is a rendering decision made downstream.
//! Recording is append-only and never fails.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Location;

/// Entity kind of a recorded declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Typedef,
    Enum,
    Global,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymbolKind::Function => "function",
            SymbolKind::Typedef => "typedef",
            SymbolKind::Enum => "enum",
            SymbolKind::Global => "global",
        };
        write!(f, "{}", label)
    }
}

/// One recorded declaration occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// The declared (unqualified) name.
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Append-only record of every declared name seen during a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictTracker {
    entries: Vec<ConflictEntry>,
}

impl ConflictTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one declaration occurrence. Duplicates are kept.
    pub fn record(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        location: Option<Location>,
    ) {
        self.entries.push(ConflictEntry {
            name: name.into(),
            kind,
            location,
        });
    }

    pub fn entries(&self) -> &[ConflictEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All recorded occurrences of a declared name.
    pub fn occurrences(&self, name: &str) -> Vec<&ConflictEntry> {
        self.entries.iter().filter(|e| e.name == name).collect()
    }

    /// Names recorded under more than one distinct kind, sorted. Repeated
    /// declarations of the same kind are legitimate (overloads, repeated
    /// typedefs) and do not show up here.
    pub fn cross_kind_conflicts(&self) -> Vec<&str> {
        let mut kinds_by_name: BTreeMap<&str, BTreeSet<SymbolKind>> = BTreeMap::new();
        for entry in &self.entries {
            kinds_by_name
                .entry(&entry.name)
                .or_default()
                .insert(entry.kind);
        }
        kinds_by_name
            .into_iter()
            .filter(|(_, kinds)| kinds.len() > 1)
            .map(|(name, _)| name)
            .collect()
    }
}
