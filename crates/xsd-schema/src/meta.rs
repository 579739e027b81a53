//! Structural validation against the embedded schema-of-schemas
//!
//! The rules live in `resources/meta_schema.yaml`, compiled into the binary
//! and parsed once per process on first use.

use crate::xml;
use crate::{Error, Result};
use regex::Regex;
use roxmltree::Node;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, trace};

const META_SCHEMA_YAML: &str = include_str!("../resources/meta_schema.yaml");

static META_SCHEMA: OnceLock<std::result::Result<MetaSchema, String>> = OnceLock::new();

/// Serializable rule file format
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetaSchemaFile {
    value_types: HashMap<String, String>,
    elements: HashMap<String, ElementRule>,
}

/// Rules for one element of the XML Schema namespace
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementRule {
    /// Unqualified attributes allowed on the element, with their value type
    pub attributes: HashMap<String, String>,
    /// Attributes that must be present wherever the element appears
    pub required: Vec<String>,
    /// Permitted child elements
    pub children: Vec<String>,
    /// Groups of children of which at most one may appear
    pub exclusive: Vec<Vec<String>>,
    /// Groups of children of which at least one must appear
    pub required_child: Vec<Vec<String>>,
    /// Content is free-form (annotation payloads)
    pub any_content: bool,
    /// Overrides for elements placed directly under `xs:schema`
    pub top_level: PlacementRule,
    /// Overrides for elements placed anywhere else
    pub nested: PlacementRule,
}

/// Attribute constraints that depend on where an element is placed
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementRule {
    pub required: Vec<String>,
    pub forbidden: Vec<String>,
}

/// Compiled schema-of-schemas
#[derive(Debug)]
pub struct MetaSchema {
    value_types: HashMap<String, Regex>,
    elements: HashMap<String, ElementRule>,
}

/// The process-wide compiled schema-of-schemas
pub fn meta_schema() -> Result<&'static MetaSchema> {
    META_SCHEMA
        .get_or_init(|| MetaSchema::from_yaml(META_SCHEMA_YAML))
        .as_ref()
        .map_err(|message| Error::Internal(format!("Embedded schema-of-schemas is invalid: {message}")))
}

/// Check that `root` is an `xs:schema` element
pub fn check_root(root: Node<'_, '_>, document: &str) -> Result<()> {
    if xml::is_xs(root, "schema") {
        Ok(())
    } else {
        Err(Error::invalid_document(
            format!(
                "Expected an XML Schema 'schema' root element, found '{}'",
                xml::display_name(root)
            ),
            xml::location(root, document),
        ))
    }
}

impl MetaSchema {
    /// Parse and compile a rule set
    ///
    /// Every value type referenced by an attribute and every permitted child
    /// must itself be defined.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, String> {
        let file: MetaSchemaFile = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

        let mut value_types = HashMap::with_capacity(file.value_types.len());
        for (name, pattern) in file.value_types {
            let regex = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| format!("value type '{name}': {e}"))?;
            value_types.insert(name, regex);
        }

        for (name, rule) in &file.elements {
            for (attribute, value_type) in &rule.attributes {
                if !value_types.contains_key(value_type) {
                    return Err(format!(
                        "attribute '{attribute}' of '{name}' uses unknown value type '{value_type}'"
                    ));
                }
            }
            let grouped = rule.exclusive.iter().chain(&rule.required_child).flatten();
            for child in rule.children.iter().chain(grouped) {
                if !file.elements.contains_key(child) || !rule.children.contains(child) {
                    return Err(format!("'{name}' names unknown child '{child}'"));
                }
            }
        }

        debug!(
            value_types = value_types.len(),
            elements = file.elements.len(),
            "Compiled schema-of-schemas"
        );

        Ok(Self {
            value_types,
            elements: file.elements,
        })
    }

    /// Rules for an element, by local name
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementRule> {
        self.elements.get(name)
    }

    /// Validate the subtree rooted at `root`, stopping at the first violation
    pub fn validate(&self, root: Node<'_, '_>, document: &str) -> Result<()> {
        check_root(root, document)?;
        self.check_element(root, document)
    }

    fn check_element(&self, node: Node<'_, '_>, document: &str) -> Result<()> {
        let name = node.tag_name().name();
        let rule = self.elements.get(name).ok_or_else(|| {
            Error::invalid_document(
                format!("Unknown XML Schema element '{}'", xml::display_name(node)),
                xml::location(node, document),
            )
        })?;
        trace!(element = name, "Validating structure");

        self.check_attributes(node, rule, document)?;
        self.check_children(node, rule, document)
    }

    fn check_attributes(&self, node: Node<'_, '_>, rule: &ElementRule, document: &str) -> Result<()> {
        let invalid = |message: String| Error::invalid_document(message, xml::location(node, document));
        let element = xml::display_name(node);
        let top_level = node
            .parent_element()
            .is_some_and(|parent| xml::is_xs(parent, "schema") || xml::is_xs(parent, "redefine"));
        let placement = if top_level { &rule.top_level } else { &rule.nested };

        for attribute in node.attributes() {
            // Qualified attributes from other vocabularies are always allowed
            if attribute.namespace().is_some() {
                continue;
            }
            let name = attribute.name();
            let value_type = rule
                .attributes
                .get(name)
                .ok_or_else(|| invalid(format!("Attribute '{name}' is not allowed on '{element}'")))?;
            if placement.forbidden.iter().any(|f| f == name) {
                let place = if top_level { "a top-level" } else { "a nested" };
                return Err(invalid(format!("Attribute '{name}' is not allowed on {place} '{element}'")));
            }
            let pattern = self
                .value_types
                .get(value_type)
                .ok_or_else(|| Error::Internal(format!("Unknown value type '{value_type}'")))?;
            if !pattern.is_match(attribute.value().trim()) {
                return Err(invalid(format!(
                    "Attribute '{name}' of '{element}' has invalid value '{}', expected {value_type}",
                    attribute.value()
                )));
            }
        }

        for required in rule.required.iter().chain(&placement.required) {
            if node.attribute(required.as_str()).is_none() {
                return Err(invalid(format!(
                    "Element '{element}' is missing required attribute '{required}'"
                )));
            }
        }

        Ok(())
    }

    fn check_children(&self, node: Node<'_, '_>, rule: &ElementRule, document: &str) -> Result<()> {
        if rule.any_content {
            return Ok(());
        }

        let element = xml::display_name(node);
        let mut present: HashMap<&str, usize> = HashMap::new();

        for child in node.children() {
            if child.is_text() {
                if child.text().is_some_and(|text| !text.trim().is_empty()) {
                    return Err(Error::invalid_document(
                        format!("Unexpected text content in '{element}'"),
                        xml::location(node, document),
                    ));
                }
                continue;
            }
            if !child.is_element() {
                continue;
            }

            let invalid = |message: String| Error::invalid_document(message, xml::location(child, document));
            let child_name = xml::display_name(child);
            if !xml::is_xs_element(child) {
                return Err(invalid(format!(
                    "Element '{child_name}' from a foreign namespace is not allowed in '{element}'"
                )));
            }

            let local = child.tag_name().name();
            if !self.elements.contains_key(local) {
                return Err(invalid(format!("Unknown XML Schema element '{child_name}'")));
            }
            if !rule.children.iter().any(|c| c == local) {
                return Err(invalid(format!("Element '{child_name}' is not allowed in '{element}'")));
            }

            *present.entry(local).or_default() += 1;
            self.check_element(child, document)?;
        }

        let invalid = |message: String| Error::invalid_document(message, xml::location(node, document));
        for group in &rule.exclusive {
            let count: usize = group.iter().filter_map(|c| present.get(c.as_str())).sum();
            if count > 1 {
                return Err(invalid(format!(
                    "Element '{element}' may contain at most one of [{}]",
                    group.join(", ")
                )));
            }
        }
        for group in &rule.required_child {
            if !group.iter().any(|c| present.contains_key(c.as_str())) {
                return Err(invalid(format!(
                    "Element '{element}' must contain one of [{}]",
                    group.join(", ")
                )));
            }
        }

        Ok(())
    }
}
