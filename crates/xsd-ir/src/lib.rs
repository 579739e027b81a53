#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # xsd-ir
//!
//! Resolved entity model for XML Schema documents.
//!
//! This crate holds the output side of the parse-then-resolve pipeline: the
//! name identities used as keys everywhere, the ordered registries that store
//! definitions and entities, and the linked `Type`/`Element` graph published
//! as a [`Schema`].

/// Process-wide cache of built-in XML Schema types.
pub mod builtin;
/// Resolved types and elements.
pub mod entity;
/// Source locations attached to definitions and entities.
pub mod location;
/// Name identities (qualified vs. document-local).
pub mod name;
/// Ordered, name-keyed stores and their read-only snapshots.
pub mod registry;
/// The published schema artifact.
pub mod schema;
/// Serializable summaries of a resolved schema.
pub mod summary;

pub use builtin::{any_type, built_in_type, is_built_in_type_name, BUILT_IN_TYPE_NAMES};
pub use entity::{ComplexType, Derivation, Element, MaxOccurs, SimpleType, Type, TypeKind};
pub use location::{DefinitionLocation, UNKNOWN_DOCUMENT};
pub use name::{EntityName, ANONYMOUS_PREFIX, XML_SCHEMA_NS};
pub use registry::{ReadOnlyRegistry, Registry};
pub use schema::Schema;
pub use summary::{ElementSummary, SchemaSummary, TypeSummary};

use thiserror::Error;

/// Errors raised by the entity model.
///
/// These signal programming errors in the pipeline driving the model rather
/// than problems with a user's document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unregistered name: {name}")]
    NotFound { name: EntityName },

    #[error("Registry already contains name: {name}")]
    DuplicateName { name: EntityName },

    #[error("Members of complex type {name} were already filled")]
    MembersAlreadyFilled { name: EntityName },

    #[error("Type {name} is not a complex type")]
    NotComplex { name: EntityName },
}

impl Error {
    /// Build a not-found error for a registry lookup.
    pub fn not_found(name: &EntityName) -> Self {
        Self::NotFound { name: name.clone() }
    }

    /// Build a duplicate-name error for a registry insert.
    pub fn duplicate_name(name: &EntityName) -> Self {
        Self::DuplicateName { name: name.clone() }
    }
}

/// Crate-local result type for entity model operations.
pub type Result<T> = std::result::Result<T, Error>;
