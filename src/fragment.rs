//! Namespace fragment processing.
//!
//! Doxygen emits one XML document per namespace. Each fragment carries the
//! namespace compound definition plus member sections; processing one
//! registers the namespace and merges every declaration into the database.
//! Fragments arrive in arbitrary order and may cover the same namespace
//! partially, so everything downstream of the parse is a merge, never a
//! plain insert.

use roxmltree::{Document, Node};

use crate::conflicts::SymbolKind;
use crate::db::SymbolDatabase;
use crate::error::{DbError, Result};
use crate::parser;
use crate::types::{join_path, BuildOptions, Namespace};
use crate::xml;

/// Parses one namespace fragment into the database. Returns the qualified
/// namespace path on success.
///
/// A fragment without a compound definition or compound name is malformed
/// and fails the whole build. A declaration the leaf parsers reject is
/// logged and skipped so the rest of the fragment still lands, unless
/// `options.strict` promotes it to a fatal error.
pub fn parse_namespace_fragment(
    source: &str,
    db: &mut SymbolDatabase,
    options: &BuildOptions,
) -> Result<String> {
    let doc = Document::parse(source)?;
    let compound = doc
        .root()
        .descendants()
        .find(|n| n.has_tag_name("compounddef"))
        .ok_or_else(|| DbError::MalformedInput("fragment has no compounddef node".to_string()))?;
    let path = xml::child_text(compound, "compoundname")
        .ok_or_else(|| DbError::MalformedInput("compounddef has no compoundname".to_string()))?;

    let (flags, description) = parser::parse_docs(compound);
    db.register_namespace(
        Namespace::new(path.clone())
            .with_description(description)
            .with_flags(flags),
    );

    for section in compound.children().filter(|n| n.has_tag_name("sectiondef")) {
        match section.attribute("kind") {
            Some("func") => merge_functions(&path, section, db, options)?,
            Some("typedef") => merge_typedefs(&path, section, db, options)?,
            Some("enum") => merge_enums(&path, section, db, options)?,
            Some("var") => merge_globals(&path, section, db, options)?,
            _ => {}
        }
    }

    Ok(path)
}

fn members<'a, 'input>(
    section: Node<'a, 'input>,
    kind: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    section
        .children()
        .filter(move |n| n.has_tag_name("memberdef") && n.attribute("kind") == Some(kind))
}

fn skip_or_fail(namespace: &str, kind: &str, err: DbError, options: &BuildOptions) -> Result<()> {
    if options.strict {
        return Err(err);
    }
    log::warn!("skipping {} declaration in {}: {}", kind, namespace, err);
    Ok(())
}

fn merge_functions(
    namespace: &str,
    section: Node,
    db: &mut SymbolDatabase,
    options: &BuildOptions,
) -> Result<()> {
    for member in members(section, "function") {
        match parser::parse_function(member) {
            Ok(parsed) => {
                let qualified = join_path(namespace, parsed.name());
                db.record_conflict(
                    parsed.name(),
                    SymbolKind::Function,
                    parsed.location().cloned(),
                );
                db.merge_function(&qualified, parsed);
            }
            Err(err) => skip_or_fail(namespace, "function", err, options)?,
        }
    }
    Ok(())
}

fn merge_typedefs(
    namespace: &str,
    section: Node,
    db: &mut SymbolDatabase,
    options: &BuildOptions,
) -> Result<()> {
    for member in members(section, "typedef") {
        match parser::parse_typedef(member) {
            Ok(typedef) => {
                let qualified = join_path(namespace, &typedef.name);
                db.record_conflict(
                    typedef.name.clone(),
                    SymbolKind::Typedef,
                    typedef.location.clone(),
                );
                db.insert_typedef(qualified, typedef);
            }
            Err(err) => skip_or_fail(namespace, "typedef", err, options)?,
        }
    }
    Ok(())
}

fn merge_enums(
    namespace: &str,
    section: Node,
    db: &mut SymbolDatabase,
    options: &BuildOptions,
) -> Result<()> {
    for member in members(section, "enum") {
        match parser::parse_enum(member) {
            Ok(enumeration) => {
                let qualified = join_path(namespace, &enumeration.name);
                db.record_conflict(
                    enumeration.name.clone(),
                    SymbolKind::Enum,
                    enumeration.location.clone(),
                );
                db.insert_enum(qualified, enumeration);
            }
            Err(err) => skip_or_fail(namespace, "enum", err, options)?,
        }
    }
    Ok(())
}

fn merge_globals(
    namespace: &str,
    section: Node,
    db: &mut SymbolDatabase,
    options: &BuildOptions,
) -> Result<()> {
    for member in members(section, "variable") {
        match parser::parse_global(member) {
            Ok(Some(global)) => {
                let qualified = join_path(namespace, &global.name);
                db.record_conflict(
                    global.name.clone(),
                    SymbolKind::Global,
                    global.location.clone(),
                );
                db.insert_global(qualified, global);
            }
            Ok(None) => {
                log::debug!("skipping unrepresentable variable in {}", namespace);
            }
            Err(err) => skip_or_fail(namespace, "variable", err, options)?,
        }
    }
    Ok(())
}
