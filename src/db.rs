//! The symbol database and its merge rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conflicts::{ConflictTracker, SymbolKind};
use crate::types::{
    leaf_name, parent_path, Enum, FunctionEntry, FunctionOverloads, Global, Location, Namespace,
    ParsedFunction, Typedef,
};

/// All symbols of one build run, keyed by fully-qualified name.
///
/// The database is an explicitly passed context object: every write goes
/// through `&mut self`, which serializes the merge phase. Namespace
/// membership is derived from the global tables, never copied into the
/// namespaces, so scoped views stay consistent with global truth no matter
/// how fragments are ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolDatabase {
    functions: BTreeMap<String, FunctionEntry>,
    typedefs: BTreeMap<String, Typedef>,
    enums: BTreeMap<String, Enum>,
    globals: BTreeMap<String, Global>,
    namespaces: BTreeMap<String, Namespace>,
    conflicts: ConflictTracker,
}

/// Borrowed view of one namespace and the entities directly inside it.
///
/// Filtered out of the global tables on demand; recomputing it is pure, so
/// a view taken after any number of fragments reflects all of them.
#[derive(Debug, PartialEq, Serialize)]
pub struct NamespaceView<'a> {
    pub namespace: &'a Namespace,
    pub functions: BTreeMap<&'a str, &'a FunctionEntry>,
    pub typedefs: BTreeMap<&'a str, &'a Typedef>,
    pub enums: BTreeMap<&'a str, &'a Enum>,
    pub globals: BTreeMap<&'a str, &'a Global>,
}

/// Summary counters for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbStats {
    pub namespaces: usize,
    pub functions: usize,
    pub overload_sets: usize,
    pub placeholders: usize,
    pub typedefs: usize,
    pub enums: usize,
    pub globals: usize,
    pub conflicted_names: usize,
}

fn scoped<'a, T>(table: &'a BTreeMap<String, T>, path: &str) -> BTreeMap<&'a str, &'a T> {
    table
        .iter()
        .filter(|(key, _)| parent_path(key) == path)
        .map(|(key, value)| (key.as_str(), value))
        .collect()
}

impl SymbolDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn functions(&self) -> &BTreeMap<String, FunctionEntry> {
        &self.functions
    }

    pub fn typedefs(&self) -> &BTreeMap<String, Typedef> {
        &self.typedefs
    }

    pub fn enums(&self) -> &BTreeMap<String, Enum> {
        &self.enums
    }

    pub fn globals(&self) -> &BTreeMap<String, Global> {
        &self.globals
    }

    pub fn namespaces(&self) -> &BTreeMap<String, Namespace> {
        &self.namespaces
    }

    pub fn conflicts(&self) -> &ConflictTracker {
        &self.conflicts
    }

    /// Records a declared name for conflict diagnostics.
    pub fn record_conflict(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        location: Option<Location>,
    ) {
        self.conflicts.record(name, kind, location);
    }

    /// Merges one parsed function declaration under its qualified name.
    ///
    /// A concrete declaration inserts fresh, heals a placeholder (the
    /// healed entry is marked `force_cast`), or extends the name into an
    /// overload set in first-seen order. A placeholder never displaces an
    /// existing entry of any kind; it only marks it `force_cast`.
    ///
    /// Merging the same declarations in any order produces the same set of
    /// entries, so fragment processing order does not change the database
    /// content.
    pub fn merge_function(&mut self, qualified_name: &str, parsed: ParsedFunction) {
        let merged = match (self.functions.remove(qualified_name), parsed) {
            (None, ParsedFunction::Function(function)) => FunctionEntry::Function(function),
            (None, ParsedFunction::Placeholder(placeholder)) => {
                FunctionEntry::Placeholder(placeholder)
            }
            (Some(FunctionEntry::Placeholder(_)), ParsedFunction::Function(mut function)) => {
                function.force_cast = true;
                FunctionEntry::Function(function)
            }
            (Some(FunctionEntry::Function(existing)), ParsedFunction::Function(function)) => {
                FunctionEntry::Overloads(FunctionOverloads::from_pair(existing, function))
            }
            (Some(FunctionEntry::Overloads(mut set)), ParsedFunction::Function(function)) => {
                set.overloads.push(function);
                FunctionEntry::Overloads(set)
            }
            (Some(mut existing), ParsedFunction::Placeholder(_)) => {
                existing.set_force_cast(true);
                existing
            }
        };
        self.functions.insert(qualified_name.to_string(), merged);
    }

    /// Typedefs have no overload concept: a repeated qualified name
    /// replaces the prior entry, last write winning.
    pub fn insert_typedef(&mut self, qualified_name: impl Into<String>, typedef: Typedef) {
        self.typedefs.insert(qualified_name.into(), typedef);
    }

    /// Last write wins, as for typedefs.
    pub fn insert_enum(&mut self, qualified_name: impl Into<String>, enumeration: Enum) {
        self.enums.insert(qualified_name.into(), enumeration);
    }

    /// Last write wins, as for typedefs.
    pub fn insert_global(&mut self, qualified_name: impl Into<String>, global: Global) {
        self.globals.insert(qualified_name.into(), global);
    }

    /// Registers a namespace under its path (last write wins) and
    /// recomputes all child links.
    pub fn register_namespace(&mut self, namespace: Namespace) {
        self.namespaces.insert(namespace.path.clone(), namespace);
        self.relink_namespaces();
    }

    /// Rebuilds every namespace's `children` mapping from the namespace
    /// table. The pass clears first, so it is idempotent, and running it
    /// after each registration makes child-before-parent fragment order
    /// work.
    pub fn relink_namespaces(&mut self) {
        let paths: Vec<String> = self.namespaces.keys().cloned().collect();
        for namespace in self.namespaces.values_mut() {
            namespace.children.clear();
        }
        for path in paths {
            let parent = parent_path(&path).to_string();
            if parent.is_empty() {
                continue;
            }
            let leaf = leaf_name(&path).to_string();
            if let Some(parent_ns) = self.namespaces.get_mut(&parent) {
                parent_ns.children.insert(leaf, path);
            }
        }
    }

    /// Scoped view of one namespace, `None` when the path is unknown.
    /// Members are the entities whose qualified name has the namespace as
    /// its direct parent; entities of nested namespaces are not included.
    pub fn namespace_view(&self, path: &str) -> Option<NamespaceView<'_>> {
        let namespace = self.namespaces.get(path)?;
        Some(NamespaceView {
            namespace,
            functions: scoped(&self.functions, path),
            typedefs: scoped(&self.typedefs, path),
            enums: scoped(&self.enums, path),
            globals: scoped(&self.globals, path),
        })
    }

    pub fn stats(&self) -> DbStats {
        let mut stats = DbStats {
            namespaces: self.namespaces.len(),
            functions: self.functions.len(),
            typedefs: self.typedefs.len(),
            enums: self.enums.len(),
            globals: self.globals.len(),
            conflicted_names: self.conflicts.cross_kind_conflicts().len(),
            ..Default::default()
        };
        for entry in self.functions.values() {
            match entry {
                FunctionEntry::Overloads(_) => stats.overload_sets += 1,
                FunctionEntry::Placeholder(_) => stats.placeholders += 1,
                FunctionEntry::Function(_) => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Function, PlaceholderFunction};

    fn concrete(name: &str, ret: &str) -> ParsedFunction {
        ParsedFunction::Function(Function {
            name: name.to_string(),
            return_type: ret.to_string(),
            signature: format!("{} {}()", ret, name),
            ..Default::default()
        })
    }

    fn placeholder(name: &str) -> ParsedFunction {
        ParsedFunction::Placeholder(PlaceholderFunction {
            name: name.to_string(),
            force_cast: false,
        })
    }

    #[test]
    fn test_first_concrete_inserts() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::lerp", concrete("lerp", "double"));
        let entry = db.functions().get("obe::lerp").unwrap();
        assert!(matches!(entry, FunctionEntry::Function(_)));
        assert!(!entry.force_cast());
    }

    #[test]
    fn test_second_concrete_builds_set_in_order() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::lerp", concrete("lerp", "double"));
        db.merge_function("obe::lerp", concrete("lerp", "float"));
        match db.functions().get("obe::lerp").unwrap() {
            FunctionEntry::Overloads(set) => {
                assert_eq!(set.overloads[0].return_type, "double");
                assert_eq!(set.overloads[1].return_type, "float");
            }
            other => panic!("expected overload set, got {:?}", other),
        }
    }

    #[test]
    fn test_third_concrete_appends() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::make", concrete("make", "A"));
        db.merge_function("obe::make", concrete("make", "B"));
        db.merge_function("obe::make", concrete("make", "C"));
        match db.functions().get("obe::make").unwrap() {
            FunctionEntry::Overloads(set) => {
                let rets: Vec<&str> =
                    set.overloads.iter().map(|f| f.return_type.as_str()).collect();
                assert_eq!(rets, vec!["A", "B", "C"]);
            }
            other => panic!("expected overload set, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholder_healed_by_concrete() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::bind", placeholder("bind"));
        db.merge_function("obe::bind", concrete("bind", "void"));
        let entry = db.functions().get("obe::bind").unwrap();
        assert!(matches!(entry, FunctionEntry::Function(_)));
        assert!(entry.force_cast());
        assert_eq!(entry.overload_count(), 1);
    }

    #[test]
    fn test_placeholder_never_displaces() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::bind", concrete("bind", "void"));
        db.merge_function("obe::bind", placeholder("bind"));
        match db.functions().get("obe::bind").unwrap() {
            FunctionEntry::Function(f) => {
                assert_eq!(f.return_type, "void");
                assert!(f.force_cast);
            }
            other => panic!("expected concrete function, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholder_marks_overload_set() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::make", concrete("make", "A"));
        db.merge_function("obe::make", concrete("make", "B"));
        db.merge_function("obe::make", placeholder("make"));
        let entry = db.functions().get("obe::make").unwrap();
        assert!(entry.is_overloads());
        assert!(entry.force_cast());
        assert_eq!(entry.overload_count(), 2);
    }

    #[test]
    fn test_repeated_placeholder_marks_placeholder() {
        let mut db = SymbolDatabase::new();
        db.merge_function("obe::ext", placeholder("ext"));
        db.merge_function("obe::ext", placeholder("ext"));
        let entry = db.functions().get("obe::ext").unwrap();
        assert!(entry.is_placeholder());
        assert!(entry.force_cast());
    }

    #[test]
    fn test_typedef_last_write_wins() {
        let mut db = SymbolDatabase::new();
        db.insert_typedef(
            "obe::Color",
            Typedef {
                name: "Color".to_string(),
                ty: "sf::Color".to_string(),
                ..Default::default()
            },
        );
        db.insert_typedef(
            "obe::Color",
            Typedef {
                name: "Color".to_string(),
                ty: "Rgba".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(db.typedefs().len(), 1);
        assert_eq!(db.typedefs()["obe::Color"].ty, "Rgba");
    }

    #[test]
    fn test_relink_builds_children() {
        let mut db = SymbolDatabase::new();
        // Child registered before its parent exists.
        db.register_namespace(Namespace::new("obe::Collision"));
        db.register_namespace(Namespace::new("obe"));
        db.register_namespace(Namespace::new("obe::Animation"));
        let root = &db.namespaces()["obe"];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children["Collision"], "obe::Collision");
        assert_eq!(root.children["Animation"], "obe::Animation");
    }

    #[test]
    fn test_relink_idempotent() {
        let mut db = SymbolDatabase::new();
        db.register_namespace(Namespace::new("obe"));
        db.register_namespace(Namespace::new("obe::Collision"));
        let before = db.namespaces().clone();
        db.relink_namespaces();
        db.relink_namespaces();
        assert_eq!(db.namespaces(), &before);
    }

    #[test]
    fn test_view_filters_exact_parent() {
        let mut db = SymbolDatabase::new();
        db.register_namespace(Namespace::new("obe"));
        db.register_namespace(Namespace::new("obe::Collision"));
        db.merge_function("obe::lerp", concrete("lerp", "double"));
        db.merge_function("obe::Collision::overlap", concrete("overlap", "bool"));

        let view = db.namespace_view("obe").unwrap();
        assert!(view.functions.contains_key("obe::lerp"));
        assert!(!view.functions.contains_key("obe::Collision::overlap"));

        let view = db.namespace_view("obe::Collision").unwrap();
        assert_eq!(view.functions.len(), 1);
        assert!(view.functions.contains_key("obe::Collision::overlap"));

        assert!(db.namespace_view("missing").is_none());
    }

    #[test]
    fn test_stats_counts() {
        let mut db = SymbolDatabase::new();
        db.register_namespace(Namespace::new("obe"));
        db.merge_function("obe::a", concrete("a", "void"));
        db.merge_function("obe::b", concrete("b", "int"));
        db.merge_function("obe::b", concrete("b", "float"));
        db.merge_function("obe::c", placeholder("c"));
        db.insert_enum("obe::E", Enum::default());
        db.record_conflict("E", SymbolKind::Enum, None);
        db.record_conflict("E", SymbolKind::Function, None);

        let stats = db.stats();
        assert_eq!(stats.namespaces, 1);
        assert_eq!(stats.functions, 3);
        assert_eq!(stats.overload_sets, 1);
        assert_eq!(stats.placeholders, 1);
        assert_eq!(stats.enums, 1);
        assert_eq!(stats.conflicted_names, 1);
    }
}
