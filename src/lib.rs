//! # doxdb
//!
//! Cross-referenced C++ symbol database builder for Doxygen XML.
//!
//! Doxygen splits a codebase's public surface into one XML document per
//! namespace. doxdb ingests those fragments in any order and assembles a
//! single database of fully-qualified symbols ready for documentation
//! rendering or binding generation.
//!
//! ## Features
//!
//! - Parses Doxygen namespace fragments (`namespace*.xml`) in any order
//! - Merges repeated function declarations into ordered overload sets
//! - Heals placeholder functions once a concrete declaration shows up,
//!   marking healed names as needing explicit call-site casts
//! - Records name conflicts across namespaces for downstream reporting
//! - Derives per-namespace views from one global symbol table, so views
//!   never go stale
//!
//! ## Example
//!
//! ```
//! use doxdb::{parse_namespace_fragment, BuildOptions, SymbolDatabase};
//!
//! let fragment = r#"
//! <doxygen>
//!   <compounddef kind="namespace">
//!     <compoundname>obe::Input</compoundname>
//!     <sectiondef kind="func">
//!       <memberdef kind="function">
//!         <type>bool</type>
//!         <name>is_pressed</name>
//!       </memberdef>
//!     </sectiondef>
//!   </compounddef>
//! </doxygen>"#;
//!
//! let mut db = SymbolDatabase::new();
//! parse_namespace_fragment(fragment, &mut db, &BuildOptions::default()).unwrap();
//! assert!(db.functions().contains_key("obe::Input::is_pressed"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub mod conflicts;
pub mod db;
pub mod error;
pub mod flags;
pub mod fragment;
pub mod parser;
pub mod types;
pub mod xml;

pub use conflicts::{ConflictEntry, ConflictTracker, SymbolKind};
pub use db::{DbStats, NamespaceView, SymbolDatabase};
pub use error::{DbError, Result};
pub use flags::{extract_flags, FlagSet};
pub use fragment::parse_namespace_fragment;
pub use types::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds a symbol database from the given files and directories.
///
/// Directories are walked in file-name order, keeping only Doxygen
/// namespace documents (`namespace*.xml`); explicitly listed files are
/// taken as-is. Finding no fragment at all is an error, as is any
/// unreadable or malformed fragment.
pub fn build_database(paths: &[PathBuf], options: &BuildOptions) -> Result<SymbolDatabase> {
    let files = collect_fragment_files(paths);
    if files.is_empty() {
        let searched = if paths.is_empty() {
            "no input paths".to_string()
        } else {
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        return Err(DbError::NoInput(searched));
    }

    let mut db = SymbolDatabase::new();
    for file in &files {
        log::debug!("parsing fragment {}", file.display());
        let source = fs::read_to_string(file)?;
        let namespace = parse_namespace_fragment(&source, &mut db, options)?;
        log::debug!("merged namespace {} from {}", namespace, file.display());
    }
    Ok(db)
}

/// Walk order is sorted by file name so repeated runs see declarations,
/// and therefore overloads, in the same order.
fn collect_fragment_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_namespace_fragment(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn is_namespace_fragment(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    name.starts_with("namespace") && name.ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_namespace_fragment() {
        assert!(is_namespace_fragment(Path::new(
            "docs/xml/namespaceobe_1_1Utils_1_1Math.xml"
        )));
        assert!(is_namespace_fragment(Path::new("namespace_root.xml")));
        assert!(!is_namespace_fragment(Path::new("classobe_1_1Engine.xml")));
        assert!(!is_namespace_fragment(Path::new("namespaces.html")));
        assert!(!is_namespace_fragment(Path::new("index.xml")));
    }

    #[test]
    fn test_build_database_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_database(&[dir.path().to_path_buf()], &BuildOptions::default())
            .unwrap_err();
        assert!(matches!(err, DbError::NoInput(_)));
    }

    #[test]
    fn test_build_database_missing_file_is_io_error() {
        let err = build_database(
            &[PathBuf::from("/nonexistent/namespace_x.xml")],
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Io(_)));
    }
}
