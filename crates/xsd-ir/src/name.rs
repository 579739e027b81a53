//! Name identities for definitions and entities

use serde::{Serialize, Serializer};
use std::fmt;

/// The XML Schema namespace URI.
pub const XML_SCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Prefix of the synthesized names given to anonymous declarations.
pub const ANONYMOUS_PREFIX: &str = "##anon##";

/// Identity of a definition or entity.
///
/// `Qualified` names identify globally declared entities independently of the
/// document they came from. `Local` names are only unique within one
/// document: they name nested member elements, and anonymous types whose raw
/// text is synthesized from the declaring node's path.
///
/// The two variants never compare equal, even when their text coincides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityName {
    /// A (namespace URI, local name) pair.
    Qualified { namespace: String, local: String },

    /// A document-local name.
    Local(String),
}

impl EntityName {
    /// Create a qualified name.
    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self::Qualified {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a document-local name from raw text.
    pub fn local(raw: impl Into<String>) -> Self {
        Self::Local(raw.into())
    }

    /// Create the synthesized name of an anonymous declaration at `node_path`.
    #[must_use]
    pub fn anonymous(node_path: &str) -> Self {
        Self::Local(format!("{ANONYMOUS_PREFIX}{node_path}"))
    }

    /// Name of the `anyType` ur-type.
    #[must_use]
    pub fn any_type() -> Self {
        Self::qualified(XML_SCHEMA_NS, "anyType")
    }

    /// Namespace URI of a qualified name.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Qualified { namespace, .. } => Some(namespace),
            Self::Local(_) => None,
        }
    }

    /// Local part of a qualified name, or the raw text of a local name.
    #[must_use]
    pub fn local_part(&self) -> &str {
        match self {
            Self::Qualified { local, .. } => local,
            Self::Local(raw) => raw,
        }
    }

    /// Whether this is a qualified name.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified { .. })
    }

    /// Whether this name was synthesized for an anonymous declaration.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Local(raw) if raw.starts_with(ANONYMOUS_PREFIX))
    }

    /// Whether this name lives in the XML Schema namespace.
    #[must_use]
    pub fn in_schema_namespace(&self) -> bool {
        self.namespace() == Some(XML_SCHEMA_NS)
    }

    /// Whether this is the name of `anyType`.
    #[must_use]
    pub fn is_any_type(&self) -> bool {
        self.in_schema_namespace() && self.local_part() == "anyType"
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified { namespace, local } if namespace.is_empty() => f.write_str(local),
            Self::Qualified { namespace, local } => write!(f, "{{{namespace}}}{local}"),
            Self::Local(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for EntityName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_qualified_and_local_never_equal() {
        let qualified = EntityName::qualified("", "Item");
        let local = EntityName::local("Item");

        assert_ne!(qualified, local);

        let mut set = HashSet::new();
        set.insert(qualified);
        set.insert(local);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_qualified_equality_is_per_component() {
        let a = EntityName::qualified("urn:a", "Item");
        let b = EntityName::qualified("urn:a", "Item");
        let c = EntityName::qualified("urn:b", "Item");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_joined_text_does_not_collide() {
        // A separator-joined key would make these two identical.
        let a = EntityName::qualified("urn:a\0b", "c");
        let b = EntityName::qualified("urn:a", "b\0c");
        assert_ne!(a, b);
    }

    #[test]
    fn test_anonymous_name() {
        let name = EntityName::anonymous("/xs:schema/xs:element/xs:complexType");

        assert!(name.is_anonymous());
        assert!(!name.is_qualified());
        assert_eq!(name.to_string(), "##anon##/xs:schema/xs:element/xs:complexType");
    }

    #[test]
    fn test_any_type() {
        let name = EntityName::any_type();

        assert!(name.is_any_type());
        assert!(name.in_schema_namespace());
        assert_eq!(name.namespace(), Some(XML_SCHEMA_NS));
        assert_eq!(name.local_part(), "anyType");
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityName::qualified("urn:x", "Node").to_string(), "{urn:x}Node");
        assert_eq!(EntityName::qualified("", "Node").to_string(), "Node");
        assert_eq!(EntityName::local("child").to_string(), "child");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&EntityName::qualified("urn:x", "Node")).unwrap();
        assert_eq!(json, r#""{urn:x}Node""#);
    }
}
