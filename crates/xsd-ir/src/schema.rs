//! The published schema artifact

use crate::entity::{Element, Type};
use crate::name::EntityName;
use crate::registry::ReadOnlyRegistry;
use crate::summary::SchemaSummary;
use std::sync::Arc;

/// A fully resolved schema
///
/// Holds every type declared by the document (named types and hoisted
/// anonymous types) and every globally declared root element. Built-in types
/// are not listed; they are reachable through the entities that use them.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: ReadOnlyRegistry<Arc<Type>>,
    root_elements: ReadOnlyRegistry<Arc<Element>>,
}

impl Schema {
    /// Create a schema from resolved registries
    #[must_use]
    pub fn new(
        types: ReadOnlyRegistry<Arc<Type>>,
        root_elements: ReadOnlyRegistry<Arc<Element>>,
    ) -> Self {
        Self {
            types,
            root_elements,
        }
    }

    /// Declared types, in registration order
    #[must_use]
    pub fn types(&self) -> &ReadOnlyRegistry<Arc<Type>> {
        &self.types
    }

    /// Root elements, in document order
    #[must_use]
    pub fn root_elements(&self) -> &ReadOnlyRegistry<Arc<Element>> {
        &self.root_elements
    }

    /// Look up a declared type by name
    #[must_use]
    pub fn type_named(&self, name: &EntityName) -> Option<&Arc<Type>> {
        self.types.lookup(name)
    }

    /// Look up a root element by name
    #[must_use]
    pub fn root_element(&self, name: &EntityName) -> Option<&Arc<Element>> {
        self.root_elements.lookup(name)
    }

    /// Serializable overview of the schema
    #[must_use]
    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::built_in_type;
    use crate::entity::MaxOccurs;
    use crate::location::DefinitionLocation;
    use crate::name::XML_SCHEMA_NS;
    use crate::registry::Registry;

    #[test]
    fn test_schema_lookups() {
        let string = built_in_type(&EntityName::qualified(XML_SCHEMA_NS, "string")).unwrap();
        let order_name = EntityName::qualified("urn:shop", "Order");
        let order = Arc::new(Type::complex(
            DefinitionLocation::new("/xs:schema/xs:complexType", "shop.xsd", 2),
            order_name.clone(),
            None,
        ));
        order
            .fill_members(vec![Element::member(
                None,
                EntityName::local("id"),
                &string,
                1,
                MaxOccurs::Bounded(1),
            )])
            .unwrap();

        let mut types = Registry::new();
        types.add(order_name.clone(), order.clone()).unwrap();

        let root_name = EntityName::qualified("urn:shop", "order");
        let mut roots = Registry::new();
        roots
            .add(
                root_name.clone(),
                Arc::new(Element::new(None, root_name.clone(), order.clone(), 1, MaxOccurs::Bounded(1))),
            )
            .unwrap();

        let schema = Schema::new(types.into_read_only(), roots.into_read_only());

        assert_eq!(schema.types().len(), 1);
        assert!(Arc::ptr_eq(schema.type_named(&order_name).unwrap(), &order));
        let root = schema.root_element(&root_name).unwrap();
        assert!(Arc::ptr_eq(&root.ty().unwrap(), &order));
        assert!(schema.type_named(&EntityName::qualified("urn:shop", "Missing")).is_none());
    }

    #[test]
    fn test_default_schema_is_empty() {
        let schema = Schema::default();
        assert!(schema.types().is_empty());
        assert!(schema.root_elements().is_empty());
    }
}
