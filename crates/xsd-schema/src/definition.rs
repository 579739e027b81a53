//! Unresolved definitions
//!
//! Definitions are what the extractor reads off the XML tree. References to
//! other declarations are still names here; the resolver turns them into
//! links. Definitions borrow from the parsed document and are dropped once
//! the schema has been resolved.

use roxmltree::Node;
use xsd_ir::{DefinitionLocation, EntityName, MaxOccurs, Registry};

/// A type declaration, global or hoisted from an inline declaration
#[derive(Debug, Clone)]
pub struct TypeDefinition<'a, 'input> {
    pub location: DefinitionLocation,
    pub name: EntityName,
    pub kind: TypeDefinitionKind<'a, 'input>,
}

/// Shape of a type declaration
#[derive(Debug, Clone)]
pub enum TypeDefinitionKind<'a, 'input> {
    /// `xs:simpleType/xs:restriction`; `node` is the restriction element
    Restriction {
        base: EntityName,
        node: Node<'a, 'input>,
    },

    /// `xs:simpleType/xs:list`; `base` is the item type
    List {
        base: EntityName,
        node: Node<'a, 'input>,
    },

    /// `xs:complexType`, optionally extending another complex type
    Complex {
        base: Option<EntityName>,
        members: Vec<ElementDefinition>,
    },
}

/// An element declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDefinition {
    pub location: DefinitionLocation,
    pub name: EntityName,
    pub type_name: EntityName,
    pub min_occurs: u64,
    pub max_occurs: MaxOccurs,
}

/// Everything extracted from one schema document
#[derive(Debug, Default)]
pub struct Definitions<'a, 'input> {
    /// Named and hoisted anonymous types, in registration order
    pub types: Registry<TypeDefinition<'a, 'input>>,
    /// Globally declared elements, in document order
    pub root_elements: Registry<ElementDefinition>,
}

impl TypeDefinition<'_, '_> {
    /// Name of the declared base type, if any
    #[must_use]
    pub fn base_type_name(&self) -> Option<&EntityName> {
        match &self.kind {
            TypeDefinitionKind::Restriction { base, .. } | TypeDefinitionKind::List { base, .. } => {
                Some(base)
            }
            TypeDefinitionKind::Complex { base, .. } => base.as_ref(),
        }
    }

    /// Whether this declares a simple type
    #[must_use]
    pub fn is_simple(&self) -> bool {
        !self.is_complex()
    }

    /// Whether this declares a complex type
    #[must_use]
    pub fn is_complex(&self) -> bool {
        matches!(self.kind, TypeDefinitionKind::Complex { .. })
    }

    /// Member declarations of a complex type, in declaration order
    #[must_use]
    pub fn members(&self) -> &[ElementDefinition] {
        match &self.kind {
            TypeDefinitionKind::Complex { members, .. } => members,
            _ => &[],
        }
    }
}
