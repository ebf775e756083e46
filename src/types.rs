//! Entity models for the symbol database.
//!
//! Everything is keyed by fully-qualified name (`::`-joined path from the
//! root namespace). Entities are built once per run by the parsers, mutated
//! only by the merge step in [`crate::db::SymbolDatabase`], and dropped when
//! the database is exported.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flags::FlagSet;

/// Joins a namespace path and a leaf name with `::`.
pub fn join_path(namespace: &str, leaf: &str) -> String {
    if namespace.is_empty() {
        leaf.to_string()
    } else {
        format!("{}::{}", namespace, leaf)
    }
}

/// Everything before the last `::`, empty for root-level names.
pub fn parent_path(qualified: &str) -> &str {
    match qualified.rfind("::") {
        Some(idx) => &qualified[..idx],
        None => "",
    }
}

/// The last `::` segment of a qualified name.
pub fn leaf_name(qualified: &str) -> &str {
    match qualified.rfind("::") {
        Some(idx) => &qualified[idx + 2..],
        None => qualified,
    }
}

/// Source position of a declaration, as reported by the XML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single function parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value expression, when the declaration has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A concrete function declaration with a resolved return type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Full declaration text, e.g. `Vec2 obe::lerp(Vec2 a, Vec2 b, float t)`.
    pub signature: String,
    pub return_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub description: String,
    #[serde(default, skip_serializing_if = "FlagSet::is_empty")]
    pub flags: FlagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Generated call sites must coerce explicitly. Set once the name has
    /// been seen as an unresolvable placeholder; never cleared afterwards.
    pub force_cast: bool,
    pub templated: bool,
    pub is_static: bool,
    pub is_const: bool,
}

/// A function reference whose return type could not be resolved, typically
/// a definition expanded from an external macro. Healed in place when a
/// concrete declaration for the same qualified name arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderFunction {
    pub name: String,
    pub force_cast: bool,
}

/// Two or more concrete declarations sharing one qualified name.
///
/// Order is first-seen parse order, so declaration order in the input
/// documents determines display order downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionOverloads {
    pub name: String,
    /// Set-level marker; covers every overload of the name.
    pub force_cast: bool,
    pub overloads: Vec<Function>,
}

impl FunctionOverloads {
    /// Promotes a single stored declaration into a set of two. The set
    /// inherits the prior entry's `force_cast`.
    pub fn from_pair(existing: Function, incoming: Function) -> Self {
        FunctionOverloads {
            name: existing.name.clone(),
            force_cast: existing.force_cast,
            overloads: vec![existing, incoming],
        }
    }
}

/// What the database stores under a function's qualified name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionEntry {
    Function(Function),
    Placeholder(PlaceholderFunction),
    Overloads(FunctionOverloads),
}

impl FunctionEntry {
    pub fn name(&self) -> &str {
        match self {
            FunctionEntry::Function(f) => &f.name,
            FunctionEntry::Placeholder(p) => &p.name,
            FunctionEntry::Overloads(set) => &set.name,
        }
    }

    pub fn force_cast(&self) -> bool {
        match self {
            FunctionEntry::Function(f) => f.force_cast,
            FunctionEntry::Placeholder(p) => p.force_cast,
            FunctionEntry::Overloads(set) => set.force_cast,
        }
    }

    pub fn set_force_cast(&mut self, value: bool) {
        match self {
            FunctionEntry::Function(f) => f.force_cast = value,
            FunctionEntry::Placeholder(p) => p.force_cast = value,
            FunctionEntry::Overloads(set) => set.force_cast = value,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, FunctionEntry::Placeholder(_))
    }

    pub fn is_overloads(&self) -> bool {
        matches!(self, FunctionEntry::Overloads(_))
    }

    /// Number of concrete declarations behind the entry. Placeholders
    /// count zero.
    pub fn overload_count(&self) -> usize {
        match self {
            FunctionEntry::Function(_) => 1,
            FunctionEntry::Placeholder(_) => 0,
            FunctionEntry::Overloads(set) => set.overloads.len(),
        }
    }
}

/// What the function parser yields for one member declaration. The parser
/// never produces an overload set; sets only come out of merging.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFunction {
    Function(Function),
    Placeholder(PlaceholderFunction),
}

impl ParsedFunction {
    pub fn name(&self) -> &str {
        match self {
            ParsedFunction::Function(f) => &f.name,
            ParsedFunction::Placeholder(p) => &p.name,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            ParsedFunction::Function(f) => f.location.as_ref(),
            ParsedFunction::Placeholder(_) => None,
        }
    }
}

/// A `typedef` / `using` alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Typedef {
    pub name: String,
    /// Full declaration text, e.g. `using obe::Graphics::Color = sf::Color`.
    pub definition: String,
    /// The aliased type.
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "FlagSet::is_empty")]
    pub flags: FlagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// One enumerator of an enum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub description: String,
}

/// An enum declaration. Zero values is legal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
    pub description: String,
    #[serde(default, skip_serializing_if = "FlagSet::is_empty")]
    pub flags: FlagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A global variable declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Global {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "FlagSet::is_empty")]
    pub flags: FlagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A namespace entry.
///
/// Member entities are not stored here: membership is derived from the
/// global tables by matching each key's parent path, so a namespace view
/// always reflects every fragment merged so far. Only the child-namespace
/// links are materialized, and those are recomputed on every registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Leaf name, e.g. `Collision`.
    pub name: String,
    /// Fully-qualified path, e.g. `obe::Collision`.
    pub path: String,
    /// Qualified path of the enclosing namespace, empty at the root level.
    pub parent_path: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "FlagSet::is_empty")]
    pub flags: FlagSet,
    /// Child namespaces, leaf name to qualified path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Namespace {
            name: leaf_name(&path).to_string(),
            parent_path: parent_path(&path).to_string(),
            path,
            description: String::new(),
            flags: FlagSet::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }
}

/// Options for a database build run.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Abort on the first invalid declaration instead of skipping it.
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("obe::Collision", "Trajectory"), "obe::Collision::Trajectory");
        assert_eq!(join_path("", "obe"), "obe");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("obe::Collision::Trajectory"), "obe::Collision");
        assert_eq!(parent_path("obe"), "");
        assert_eq!(parent_path(""), "");
    }

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("obe::Collision::Trajectory"), "Trajectory");
        assert_eq!(leaf_name("obe"), "obe");
    }

    #[test]
    fn test_namespace_new_derives_paths() {
        let ns = Namespace::new("obe::Animation::Easing").with_description("Easing curves");
        assert_eq!(ns.name, "Easing");
        assert_eq!(ns.parent_path, "obe::Animation");
        assert_eq!(ns.path, "obe::Animation::Easing");
        assert_eq!(ns.description, "Easing curves");

        let root = Namespace::new("obe");
        assert_eq!(root.name, "obe");
        assert_eq!(root.parent_path, "");
    }

    #[test]
    fn test_entry_force_cast_all_variants() {
        let mut entry = FunctionEntry::Function(Function {
            name: "lerp".to_string(),
            ..Default::default()
        });
        assert!(!entry.force_cast());
        entry.set_force_cast(true);
        assert!(entry.force_cast());

        let mut entry = FunctionEntry::Placeholder(PlaceholderFunction {
            name: "lerp".to_string(),
            force_cast: false,
        });
        entry.set_force_cast(true);
        assert!(entry.force_cast());

        let mut entry = FunctionEntry::Overloads(FunctionOverloads {
            name: "lerp".to_string(),
            force_cast: false,
            overloads: vec![Function::default(), Function::default()],
        });
        entry.set_force_cast(true);
        assert!(entry.force_cast());
    }

    #[test]
    fn test_overloads_from_pair_inherits_force_cast() {
        let healed = Function {
            name: "make".to_string(),
            force_cast: true,
            ..Default::default()
        };
        let incoming = Function {
            name: "make".to_string(),
            ..Default::default()
        };
        let set = FunctionOverloads::from_pair(healed, incoming);
        assert!(set.force_cast);
        assert_eq!(set.overloads.len(), 2);
        assert_eq!(set.name, "make");
    }

    #[test]
    fn test_entry_overload_count() {
        let single = FunctionEntry::Function(Function::default());
        assert_eq!(single.overload_count(), 1);
        let placeholder = FunctionEntry::Placeholder(PlaceholderFunction::default());
        assert_eq!(placeholder.overload_count(), 0);
        assert!(placeholder.is_placeholder());
    }

    #[test]
    fn test_entry_serde_tag() {
        let entry = FunctionEntry::Placeholder(PlaceholderFunction {
            name: "bind".to_string(),
            force_cast: true,
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"kind\":\"placeholder\""));
        let back: FunctionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_location_display() {
        let loc = Location {
            file: "src/Engine.hpp".to_string(),
            line: 12,
            column: 4,
        };
        assert_eq!(loc.to_string(), "src/Engine.hpp:12");
    }
}
