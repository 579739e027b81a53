//! Definition extraction
//!
//! Walks a structurally valid schema tree and records every declaration as
//! an unresolved definition. No reference is followed here; names are only
//! parsed and checked for shape.

use crate::definition::{Definitions, ElementDefinition, TypeDefinition, TypeDefinitionKind};
use crate::{names, xml};
use crate::{Error, Result};
use roxmltree::Node;
use std::num::IntErrorKind;
use tracing::trace;
use xsd_ir::{DefinitionLocation, EntityName, MaxOccurs};

/// Compositors that are recognized but not supported
const UNSUPPORTED_COMPOSITORS: [&str; 3] = ["choice", "all", "group"];

/// Extracts definitions from one schema document
#[derive(Debug, Clone)]
pub struct DefinitionExtractor {
    document: String,
}

impl DefinitionExtractor {
    /// Create an extractor for the document identified by `document`
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }

    /// Identifier of the document being extracted
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Extract all type and root element definitions below `root`
    ///
    /// Simple types are visited first, then complex types, then elements.
    /// Inline types are hoisted into the type registry as they are found.
    pub fn extract<'a, 'input>(&self, root: Node<'a, 'input>) -> Result<Definitions<'a, 'input>> {
        let mut definitions = Definitions::default();

        for node in xml::xs_children(root, "simpleType") {
            let name = self.global_type_name(node)?;
            let definition = self.extract_simple_type(node, name)?;
            self.register_type(&mut definitions, definition)?;
        }

        for node in xml::xs_children(root, "complexType") {
            let name = self.global_type_name(node)?;
            let definition = self.extract_complex_type(node, name, &mut definitions)?;
            self.register_type(&mut definitions, definition)?;
        }

        for node in xml::xs_children(root, "element") {
            let element = self.extract_element(node, true, &mut definitions)?;
            if definitions.root_elements.contains(&element.name) {
                return Err(Error::invalid_element(
                    format!("Element {} is declared more than once", element.name),
                    element.location,
                ));
            }
            definitions.root_elements.add(element.name.clone(), element)?;
        }

        Ok(definitions)
    }

    /// Extract an `xs:simpleType` declaration
    pub fn extract_simple_type<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        name: EntityName,
    ) -> Result<TypeDefinition<'a, 'input>> {
        let location = xml::location(node, &self.document);
        let restrictions = xml::xs_children(node, "restriction");
        let lists = xml::xs_children(node, "list");

        let kind = match (restrictions.as_slice(), lists.as_slice()) {
            ([restriction], []) => TypeDefinitionKind::Restriction {
                base: self.required_reference(*restriction, "base", "Restriction does not define a base type")?,
                node: *restriction,
            },
            ([], [list]) => TypeDefinitionKind::List {
                base: self.required_reference(*list, "itemType", "List does not define an item type")?,
                node: *list,
            },
            _ => {
                return Err(Error::invalid_type(
                    "Simple type must contain exactly one restriction or list",
                    location,
                ));
            }
        };

        trace!(%name, "Extracted simple type");
        Ok(TypeDefinition {
            location,
            name,
            kind,
        })
    }

    /// Extract an `xs:complexType` declaration and its members
    ///
    /// Inline types of the members are registered in `definitions`.
    pub fn extract_complex_type<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        name: EntityName,
        definitions: &mut Definitions<'a, 'input>,
    ) -> Result<TypeDefinition<'a, 'input>> {
        let location = xml::location(node, &self.document);

        if let Some(content) = xml::xs_child(node, "simpleContent") {
            return Err(Error::invalid_type(
                "Simple content is not supported",
                xml::location(content, &self.document),
            ));
        }

        let (base, scope) = match xml::xs_child(node, "complexContent") {
            Some(content) => {
                if let Some(restriction) = xml::xs_child(content, "restriction") {
                    return Err(Error::invalid_type(
                        "Complex content restriction is not supported",
                        xml::location(restriction, &self.document),
                    ));
                }
                let extension = xml::xs_child(content, "extension").ok_or_else(|| {
                    Error::invalid_type(
                        "Complex content must contain an extension",
                        xml::location(content, &self.document),
                    )
                })?;
                let base = self.required_reference(extension, "base", "Extension does not define a base type")?;
                // Every complex type already derives from anyType
                let base = (!base.is_any_type()).then_some(base);
                (base, extension)
            }
            None => (None, node),
        };

        for compositor in UNSUPPORTED_COMPOSITORS {
            if let Some(found) = xml::xs_child(scope, compositor) {
                return Err(Error::invalid_type(
                    format!("Compositor '{compositor}' is not supported, members must be declared in a sequence"),
                    xml::location(found, &self.document),
                ));
            }
        }

        let sequence = xml::xs_child(scope, "sequence").ok_or_else(|| {
            Error::invalid_type("Complex type does not declare a member sequence", location.clone())
        })?;

        let mut members = Vec::new();
        for particle in sequence.children().filter(Node::is_element) {
            if xml::is_xs(particle, "element") {
                members.push(self.extract_element(particle, false, definitions)?);
            } else if !xml::is_xs(particle, "annotation") {
                return Err(Error::invalid_type(
                    format!(
                        "Particle '{}' is not supported inside a sequence",
                        xml::display_name(particle)
                    ),
                    xml::location(particle, &self.document),
                ));
            }
        }

        trace!(%name, members = members.len(), "Extracted complex type");
        Ok(TypeDefinition {
            location,
            name,
            kind: TypeDefinitionKind::Complex { base, members },
        })
    }

    /// Extract an `xs:element` declaration
    ///
    /// Root elements get a name qualified with the target namespace, members
    /// a local name. An inline type is hoisted into `definitions` under a
    /// synthesized name.
    pub fn extract_element<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        is_root: bool,
        definitions: &mut Definitions<'a, 'input>,
    ) -> Result<ElementDefinition> {
        let location = xml::location(node, &self.document);

        let local = node
            .attribute("name")
            .ok_or_else(|| Error::invalid_element("Element does not define a name", location.clone()))?;
        let name = if is_root {
            EntityName::qualified(names::target_namespace(node), local)
        } else {
            EntityName::local(local)
        };

        let min_occurs = match node.attribute("minOccurs") {
            Some(text) => occurrence_bound("minOccurs", text, &location)?,
            None => 1,
        };
        let max_occurs = match node.attribute("maxOccurs").map(str::trim) {
            Some("unbounded") => MaxOccurs::Unbounded,
            Some(text) => MaxOccurs::Bounded(occurrence_bound("maxOccurs", text, &location)?),
            None => MaxOccurs::default(),
        };
        if !max_occurs.allows(min_occurs) {
            return Err(Error::invalid_element(
                format!("Element {name} has minOccurs {min_occurs} greater than maxOccurs {max_occurs}"),
                location,
            ));
        }

        let type_name = if let Some(reference) = names::attribute_reference(node, "type", &self.document)? {
            reference
        } else if let Some(inline) = xml::xs_child(node, "complexType") {
            let inline_name = EntityName::anonymous(&xml::node_path(inline));
            let definition = self.extract_complex_type(inline, inline_name.clone(), definitions)?;
            self.register_type(definitions, definition)?;
            inline_name
        } else if let Some(inline) = xml::xs_child(node, "simpleType") {
            let inline_name = EntityName::anonymous(&xml::node_path(inline));
            let definition = self.extract_simple_type(inline, inline_name.clone())?;
            self.register_type(definitions, definition)?;
            inline_name
        } else {
            EntityName::any_type()
        };

        trace!(%name, %type_name, "Extracted element");
        Ok(ElementDefinition {
            location,
            name,
            type_name,
            min_occurs,
            max_occurs,
        })
    }

    fn global_type_name(&self, node: Node<'_, '_>) -> Result<EntityName> {
        let local = node.attribute("name").ok_or_else(|| {
            Error::invalid_type("Top-level type does not define a name", xml::location(node, &self.document))
        })?;
        Ok(EntityName::qualified(names::target_namespace(node), local))
    }

    fn required_reference(&self, node: Node<'_, '_>, attribute: &str, missing: &str) -> Result<EntityName> {
        names::attribute_reference(node, attribute, &self.document)?
            .ok_or_else(|| Error::invalid_type(missing, xml::location(node, &self.document)))
    }

    fn register_type<'a, 'input>(
        &self,
        definitions: &mut Definitions<'a, 'input>,
        definition: TypeDefinition<'a, 'input>,
    ) -> Result<()> {
        if definitions.types.contains(&definition.name) {
            return Err(Error::invalid_type(
                format!("Type {} is declared more than once", definition.name),
                definition.location,
            ));
        }
        definitions.types.add(definition.name.clone(), definition)?;
        Ok(())
    }
}

fn occurrence_bound(attribute: &str, text: &str, location: &DefinitionLocation) -> Result<u64> {
    text.trim().parse::<u64>().map_err(|e| {
        let message = match e.kind() {
            IntErrorKind::PosOverflow => {
                format!("{attribute} value '{text}' exceeds the supported maximum of {}", u64::MAX)
            }
            _ => format!("Invalid {attribute} value '{text}'"),
        };
        Error::invalid_element(message, location.clone())
    })
}
