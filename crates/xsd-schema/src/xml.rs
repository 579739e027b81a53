//! XML tree helpers
//!
//! Thin layer over `roxmltree` providing what the pipeline needs from the
//! XML tree: XML-Schema child lookups by relative path, stable node paths and
//! line numbers for diagnostics.

use roxmltree::Node;
use xsd_ir::{DefinitionLocation, XML_SCHEMA_NS};

/// Whether `node` is the XML-Schema element `xs:{local}`
#[must_use]
pub fn is_xs(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XML_SCHEMA_NS)
        && node.tag_name().name() == local
}

/// Whether `node` is an element in the XML-Schema namespace
#[must_use]
pub fn is_xs_element(node: Node<'_, '_>) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(XML_SCHEMA_NS)
}

/// Child elements `xs:{local}` of `node`, in document order
#[must_use]
pub fn xs_children<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Vec<Node<'a, 'input>> {
    node.children().filter(|child| is_xs(*child, local)).collect()
}

/// First child element `xs:{local}` of `node`
#[must_use]
pub fn xs_child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_xs(*child, local))
}

/// Elements matching a relative path of XML-Schema steps
///
/// `xs_path(node, &["complexContent", "extension"])` is the equivalent of the
/// XPath `./xs:complexContent/xs:extension`.
#[must_use]
pub fn xs_path<'a, 'input>(node: Node<'a, 'input>, steps: &[&str]) -> Vec<Node<'a, 'input>> {
    let mut current = vec![node];
    for step in steps {
        current = current
            .into_iter()
            .flat_map(|n| xs_children(n, step))
            .collect();
    }
    current
}

/// Element children of `node` that belong to the XML-Schema namespace
#[must_use]
pub fn xs_element_children<'a, 'input>(node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    node.children().filter(|child| is_xs_element(*child)).collect()
}

/// Tag name as written in the document (`prefix:local` when a prefix is bound)
#[must_use]
pub fn display_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag.namespace().and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", tag.name()),
        _ => tag.name().to_string(),
    }
}

/// Stable structural path of an element
///
/// Steps carry a 1-based position only when the element has siblings with
/// the same name, e.g. `/xs:schema/xs:complexType[2]/xs:sequence/xs:element[1]`.
#[must_use]
pub fn node_path(node: Node<'_, '_>) -> String {
    let mut steps: Vec<String> = node
        .ancestors()
        .filter(Node::is_element)
        .map(path_step)
        .collect();
    steps.reverse();
    format!("/{}", steps.join("/"))
}

fn path_step(node: Node<'_, '_>) -> String {
    let name = display_name(node);
    let Some(parent) = node.parent() else {
        return name;
    };

    let mut position = 0;
    let mut count = 0;
    for sibling in parent.children().filter(|c| c.is_element()) {
        if sibling.tag_name() == node.tag_name() {
            count += 1;
            if sibling == node {
                position = count;
            }
        }
    }

    if count > 1 {
        format!("{name}[{position}]")
    } else {
        name
    }
}

/// 1-based line on which `node` starts
#[must_use]
pub fn line_number(node: Node<'_, '_>) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

/// Diagnostic location of `node` within `document`
#[must_use]
pub fn location(node: Node<'_, '_>, document: &str) -> DefinitionLocation {
    DefinitionLocation::new(node_path(node), document, line_number(node))
}
