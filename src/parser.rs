//! Leaf parsers for Doxygen member declarations.
//!
//! One parser per member kind, each taking a `memberdef` node and yielding
//! a complete typed entity or failing with a declaration error. Parsers
//! never touch the database: merging and conflict recording happen in the
//! fragment layer, which keeps this phase read-only.

use std::collections::HashMap;

use roxmltree::Node;

use crate::error::{DbError, Result};
use crate::flags::{extract_flags, FlagSet};
use crate::types::{
    Enum, EnumValue, Function, Global, Parameter, ParsedFunction, PlaceholderFunction, Typedef,
};
use crate::xml;

/// Description handling shared by all member kinds. Annotation flags can
/// sit in the brief or the detailed block; the stored description is the
/// cleaned brief text.
pub(crate) fn parse_docs(node: Node) -> (FlagSet, String) {
    let brief = xml::child(node, "briefdescription")
        .map(xml::para_text)
        .unwrap_or_default();
    let detailed = xml::child(node, "detaileddescription")
        .map(xml::para_text)
        .unwrap_or_default();
    let (mut flags, description) = extract_flags(&brief);
    let (detail_flags, _) = extract_flags(&detailed);
    flags.merge(detail_flags);
    (flags, description)
}

/// Parameter docs live apart from the `<param>` nodes, in the detailed
/// description's `kind="param"` parameter list; retval and exception
/// lists can repeat the same names. Returns declared name to description.
fn param_descriptions(node: Node) -> HashMap<String, String> {
    let mut docs = HashMap::new();
    if let Some(detailed) = xml::child(node, "detaileddescription") {
        for list in detailed.descendants().filter(|n| {
            n.has_tag_name("parameterlist") && n.attribute("kind") == Some("param")
        }) {
            for item in list
                .descendants()
                .filter(|n| n.has_tag_name("parameteritem"))
            {
                let description = item
                    .descendants()
                    .find(|n| n.has_tag_name("parameterdescription"))
                    .map(xml::para_text)
                    .unwrap_or_default();
                for name_node in item
                    .descendants()
                    .filter(|n| n.has_tag_name("parametername"))
                {
                    docs.insert(xml::text_of(name_node), description.clone());
                }
            }
        }
    }
    docs
}

/// Parses a function member.
///
/// A declaration without a resolvable return type (no `<type>` text, as
/// happens with definitions expanded from external macros) yields a
/// placeholder instead of a concrete function. A missing `<name>` is an
/// error.
pub fn parse_function(node: Node) -> Result<ParsedFunction> {
    let name = xml::child_text(node, "name")
        .ok_or_else(|| DbError::Declaration("function declaration has no name".to_string()))?;

    let return_type = xml::child_text(node, "type").unwrap_or_default();
    if return_type.is_empty() {
        return Ok(ParsedFunction::Placeholder(PlaceholderFunction {
            name,
            force_cast: false,
        }));
    }

    let (flags, description) = parse_docs(node);
    let docs = param_descriptions(node);
    let parameters: Vec<Parameter> = node
        .children()
        .filter(|n| n.has_tag_name("param"))
        .map(|param| {
            let param_name = xml::child_text(param, "declname").unwrap_or_default();
            Parameter {
                description: docs.get(&param_name).cloned(),
                name: param_name,
                ty: xml::child_text(param, "type").unwrap_or_default(),
                default: xml::child_text(param, "defval"),
            }
        })
        .collect();

    let signature = match xml::child_text(node, "definition") {
        Some(definition) => format!(
            "{}{}",
            definition,
            xml::child_text(node, "argsstring").unwrap_or_default()
        ),
        None => {
            let args: Vec<String> = parameters
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name).trim().to_string())
                .collect();
            format!("{} {}({})", return_type, name, args.join(", "))
        }
    };

    Ok(ParsedFunction::Function(Function {
        signature,
        return_type,
        parameters,
        description,
        flags,
        location: xml::parse_location(node),
        force_cast: false,
        templated: node.children().any(|n| n.has_tag_name("templateparamlist")),
        is_static: node.attribute("static") == Some("yes"),
        is_const: node.attribute("const") == Some("yes"),
        name,
    }))
}

/// Parses a typedef member. Name and aliased type are both required:
/// a partial alias must not reach the database.
pub fn parse_typedef(node: Node) -> Result<Typedef> {
    let name = xml::child_text(node, "name")
        .ok_or_else(|| DbError::Declaration("typedef declaration has no name".to_string()))?;
    let ty = xml::child_text(node, "type")
        .ok_or_else(|| DbError::Declaration(format!("typedef {} has no aliased type", name)))?;
    let (flags, description) = parse_docs(node);
    let definition =
        xml::child_text(node, "definition").unwrap_or_else(|| format!("using {} = {}", name, ty));
    Ok(Typedef {
        name,
        definition,
        ty,
        description,
        flags,
        location: xml::parse_location(node),
    })
}

/// Parses an enum member. An enum with no enumerators is legal.
pub fn parse_enum(node: Node) -> Result<Enum> {
    let name = xml::child_text(node, "name")
        .ok_or_else(|| DbError::Declaration("enum declaration has no name".to_string()))?;
    let (flags, description) = parse_docs(node);
    let values = node
        .children()
        .filter(|n| n.has_tag_name("enumvalue"))
        .map(|value| EnumValue {
            name: xml::child_text(value, "name").unwrap_or_default(),
            description: xml::child(value, "briefdescription")
                .map(xml::para_text)
                .unwrap_or_default(),
        })
        .collect();
    Ok(Enum {
        name,
        values,
        description,
        flags,
        location: xml::parse_location(node),
    })
}

/// Parses a global variable member. A variable whose type cannot be
/// represented yields `Ok(None)`; the caller skips it.
pub fn parse_global(node: Node) -> Result<Option<Global>> {
    let name = xml::child_text(node, "name")
        .ok_or_else(|| DbError::Declaration("variable declaration has no name".to_string()))?;
    let ty = match xml::child_text(node, "type") {
        Some(ty) => ty,
        None => return Ok(None),
    };
    let (flags, description) = parse_docs(node);
    Ok(Some(Global {
        name,
        ty,
        initializer: xml::child_text(node, "initializer"),
        description,
        flags,
        location: xml::parse_location(node),
    }))
}
