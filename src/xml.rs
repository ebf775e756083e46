//! Small helpers over roxmltree nodes for the Doxygen XML shapes the
//! parsers care about: tag lookup, flattened text and source locations.

use roxmltree::Node;

use crate::types::Location;

/// First direct child element with the given tag name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Text of the first direct child with the given tag name.
/// `None` when the child is absent or its text is empty.
pub fn child_text(node: Node, name: &str) -> Option<String> {
    let text = text_of(child(node, name)?);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Flattened text content of a node, including text nested in child
/// elements. Doxygen splits type strings around `<ref>` nodes, so
/// `<type>const <ref>Vec2</ref> &amp;</type>` comes back as `const Vec2 &`.
pub fn text_of(node: Node) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if descendant.is_text() {
            if let Some(text) = descendant.text() {
                out.push_str(text);
            }
        }
    }
    out.trim().to_string()
}

/// Joined text of a description node's `<para>` children. Falls back to
/// the node's own flattened text when it holds bare text instead.
pub fn para_text(node: Node) -> String {
    let paras: Vec<String> = node
        .children()
        .filter(|n| n.has_tag_name("para"))
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect();
    if paras.is_empty() {
        text_of(node)
    } else {
        paras.join("\n")
    }
}

/// Reads a declaration's `<location file=.. line=.. column=..>` child.
/// `None` when the node carries no location or no file attribute.
pub fn parse_location(node: Node) -> Option<Location> {
    let loc = child(node, "location")?;
    let file = loc.attribute("file")?.to_string();
    let line = loc
        .attribute("line")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let column = loc
        .attribute("column")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    Some(Location { file, line, column })
}
