//! Textual references to qualified names

use crate::xml;
use crate::{Error, Result};
use roxmltree::Node;
use xsd_ir::EntityName;

/// Namespace that unprefixed declarations and references at `node` belong to
///
/// The nearest `targetNamespace` on the node or its ancestors wins. Without
/// one, the node's own namespace is used.
#[must_use]
pub fn target_namespace(node: Node<'_, '_>) -> String {
    node.ancestors()
        .filter(Node::is_element)
        .find_map(|n| n.attribute("targetNamespace"))
        .or_else(|| node.tag_name().namespace())
        .unwrap_or_default()
        .to_string()
}

/// Resolve `local` or `prefix:local` found at `node` into a qualified name
///
/// Prefixes are looked up among the namespace bindings in scope at `node`.
pub fn parse_reference(node: Node<'_, '_>, text: &str, document: &str) -> Result<EntityName> {
    let reference = text.trim();
    let invalid =
        |reason: &str| Error::invalid_reference(reference, reason, xml::location(node, document));

    let mut parts = reference.split(':');
    let (prefix, local) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), None, _) => (None, local),
        (Some(prefix), Some(local), None) => (Some(prefix), local),
        _ => return Err(invalid("expected 'local' or 'prefix:local'")),
    };

    if local.is_empty() {
        return Err(invalid("empty local name"));
    }

    let namespace = match prefix {
        None => target_namespace(node),
        Some("") => return Err(invalid("empty namespace prefix")),
        Some(prefix) => node
            .lookup_namespace_uri(Some(prefix))
            .ok_or_else(|| invalid(&format!("namespace prefix '{prefix}' is not bound")))?
            .to_string(),
    };

    Ok(EntityName::qualified(namespace, local))
}

/// Resolve the reference held by attribute `attribute` of `node`, if present
pub fn attribute_reference(
    node: Node<'_, '_>,
    attribute: &str,
    document: &str,
) -> Result<Option<EntityName>> {
    node.attribute(attribute)
        .map(|text| parse_reference(node, text, document))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;
    use xsd_ir::XML_SCHEMA_NS;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:library" targetNamespace="urn:library">
  <xs:element name="book" type="tns:Book"/>
  <xs:element name="title" type="xs:string"/>
  <xs:element name="plain" type=" Book "/>
</xs:schema>"#;

    fn elements<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
        xml::xs_children(doc.root_element(), "element")
    }

    #[test]
    fn test_prefixed_reference() {
        let doc = Document::parse(SCHEMA).unwrap();
        let nodes = elements(&doc);

        assert_eq!(
            parse_reference(nodes[0], "tns:Book", "lib.xsd").unwrap(),
            EntityName::qualified("urn:library", "Book")
        );
        assert_eq!(
            parse_reference(nodes[1], "xs:string", "lib.xsd").unwrap(),
            EntityName::qualified(XML_SCHEMA_NS, "string")
        );
    }

    #[test]
    fn test_unprefixed_reference_uses_target_namespace() {
        let doc = Document::parse(SCHEMA).unwrap();
        let plain = elements(&doc)[2];

        let name = attribute_reference(plain, "type", "lib.xsd").unwrap().unwrap();
        assert_eq!(name, EntityName::qualified("urn:library", "Book"));
        assert!(attribute_reference(plain, "ref", "lib.xsd").unwrap().is_none());
    }

    #[test]
    fn test_target_namespace_fallback() {
        let doc = Document::parse(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="a"/></xs:schema>"#).unwrap();
        let element = elements(&doc)[0];

        assert_eq!(target_namespace(element), XML_SCHEMA_NS);
    }

    #[test]
    fn test_unbound_prefix() {
        let doc = Document::parse(SCHEMA).unwrap();

        match parse_reference(elements(&doc)[0], "other:Book", "lib.xsd") {
            Err(Error::InvalidReference { reference, reason, location }) => {
                assert_eq!(reference, "other:Book");
                assert!(reason.contains("'other'"));
                assert_eq!(location.line, 3);
            }
            other => panic!("Expected InvalidReference error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_references() {
        let doc = Document::parse(SCHEMA).unwrap();
        let node = elements(&doc)[0];

        for text in ["", "tns:", ":Book", "a:b:c"] {
            match parse_reference(node, text, "lib.xsd") {
                Err(Error::InvalidReference { .. }) => {}
                other => panic!("Expected InvalidReference error for {text:?}, got {other:?}"),
            }
        }
    }
}
