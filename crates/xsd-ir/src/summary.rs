//! Serializable summaries of a resolved schema
//!
//! The entity graph itself is linked (and may be recursive), so it is not
//! serialized directly. A summary flattens it: links become names.

use crate::entity::{Element, Type};
use crate::location::DefinitionLocation;
use crate::schema::Schema;
use serde::Serialize;

/// Flattened view of a [`Schema`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub types: Vec<TypeSummary>,
    pub root_elements: Vec<ElementSummary>,
}

/// Flattened view of a [`Type`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<DefinitionLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ElementSummary>,
}

/// Flattened view of an [`Element`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSummary {
    pub name: String,
    pub type_name: String,
    pub min_occurs: u64,
    /// `None` when unbounded
    pub max_occurs: Option<u64>,
}

impl SchemaSummary {
    /// Summarize a schema
    #[must_use]
    pub fn of(schema: &Schema) -> Self {
        Self {
            types: schema
                .types()
                .values()
                .map(|ty| TypeSummary::of(ty))
                .collect(),
            root_elements: schema
                .root_elements()
                .values()
                .map(|element| ElementSummary::of(element))
                .collect(),
        }
    }
}

impl TypeSummary {
    /// Summarize a type
    #[must_use]
    pub fn of(ty: &Type) -> Self {
        Self {
            name: ty.name().to_string(),
            kind: ty.kind_label(),
            base: ty.base_type().map(|base| base.name().to_string()),
            location: ty.location().cloned(),
            members: ty.members().iter().map(ElementSummary::of).collect(),
        }
    }
}

impl ElementSummary {
    /// Summarize an element
    #[must_use]
    pub fn of(element: &Element) -> Self {
        Self {
            name: element.name().to_string(),
            type_name: element.type_name().to_string(),
            min_occurs: element.min_occurs(),
            max_occurs: element.max_occurs().as_option(),
        }
    }
}
