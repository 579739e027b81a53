//! # xsd-schema
//!
//! Parse-then-resolve pipeline for XML Schema documents.
//!
//! A document is checked against an embedded schema-of-schemas, its
//! declarations are extracted into unresolved definitions, and the
//! definitions are resolved into the linked entity graph of [`xsd_ir`]:
//!
//! ```text
//! XML text -> structural validation -> DefinitionExtractor
//!          -> TypeResolver (pass 1: types and base chains,
//!                           pass 2: complex type members,
//!                           then root elements)
//!          -> Schema
//! ```
//!
//! Base-type chains must be acyclic, but complex type members may refer back
//! to their owner or its ancestors.

pub mod config;
pub mod context;
pub mod definition;
pub mod extractor;
pub mod meta;
pub mod names;
pub mod parser;
pub mod resolver;
pub mod xml;

pub use config::ParserConfig;
pub use context::{ParsingContext, ResolutionState};
pub use definition::{Definitions, ElementDefinition, TypeDefinition, TypeDefinitionKind};
pub use extractor::DefinitionExtractor;
pub use meta::MetaSchema;
pub use parser::Parser;
pub use resolver::TypeResolver;
pub use xsd_ir::{DefinitionLocation, EntityName, Schema};

use std::fmt;
use thiserror::Error;

/// Errors that abort a parse
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to load schema from {document}: {message}")]
    Load { document: String, message: String },

    #[error("Invalid document: {message} at {location}")]
    InvalidDocument {
        message: String,
        location: DefinitionLocation,
    },

    #[error("Invalid element definition: {message} at {location}")]
    InvalidElementDefinition {
        message: String,
        location: DefinitionLocation,
    },

    #[error("Invalid type definition: {message} at {location}")]
    InvalidTypeDefinition {
        message: String,
        location: DefinitionLocation,
    },

    #[error("Invalid reference '{reference}' at {location}: {reason}")]
    InvalidReference {
        reference: String,
        reason: String,
        location: DefinitionLocation,
    },

    #[error("Type {name} was not defined in the document, referenced as {referenced_by} at {location}")]
    MissingDefinition {
        name: EntityName,
        referenced_by: String,
        location: DefinitionLocation,
    },

    #[error("Circular reference detected, cycle root is {name} ({chain}) at {location}")]
    CircularReference {
        name: EntityName,
        chain: CycleChain,
        location: DefinitionLocation,
    },

    #[error("Registry error: {0}")]
    Registry(#[from] xsd_ir::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Names on a base-type cycle, starting and ending at the cycle root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleChain(pub Vec<EntityName>);

impl fmt::Display for CycleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a load error for a document
    pub fn load(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create a structural validation error
    pub fn invalid_document(message: impl Into<String>, location: DefinitionLocation) -> Self {
        Self::InvalidDocument {
            message: message.into(),
            location,
        }
    }

    /// Create an element definition error
    pub fn invalid_element(message: impl Into<String>, location: DefinitionLocation) -> Self {
        Self::InvalidElementDefinition {
            message: message.into(),
            location,
        }
    }

    /// Create a type definition error
    pub fn invalid_type(message: impl Into<String>, location: DefinitionLocation) -> Self {
        Self::InvalidTypeDefinition {
            message: message.into(),
            location,
        }
    }

    /// Create a malformed reference error
    pub fn invalid_reference(
        reference: impl Into<String>,
        reason: impl Into<String>,
        location: DefinitionLocation,
    ) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
            location,
        }
    }

    /// Create a missing definition error
    pub fn missing_definition(
        name: &EntityName,
        referenced_by: impl Into<String>,
        location: DefinitionLocation,
    ) -> Self {
        Self::MissingDefinition {
            name: name.clone(),
            referenced_by: referenced_by.into(),
            location,
        }
    }

    /// Location of the offending node, if the error has one
    #[must_use]
    pub fn location(&self) -> Option<&DefinitionLocation> {
        match self {
            Self::InvalidDocument { location, .. }
            | Self::InvalidElementDefinition { location, .. }
            | Self::InvalidTypeDefinition { location, .. }
            | Self::InvalidReference { location, .. }
            | Self::MissingDefinition { location, .. }
            | Self::CircularReference { location, .. } => Some(location),
            Self::Load { .. } | Self::Registry(_) | Self::Internal(_) => None,
        }
    }
}

/// Crate-local result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
