//! Per-parse state

use crate::definition::Definitions;
use crate::resolver::TypeResolver;
use crate::Result;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::debug;
use xsd_ir::{EntityName, Registry, Schema, Type};

/// Mutable bookkeeping of a running resolution
#[derive(Debug, Default)]
pub struct ResolutionState {
    /// Resolved document types, in resolution order
    pub types: Registry<Arc<Type>>,
    /// Names currently being resolved, outermost first
    pub resolving: IndexSet<EntityName>,
    /// Complex types whose members have not been filled yet
    pub member_buffers: IndexMap<EntityName, Arc<Type>>,
}

/// Everything one parse works with
///
/// Created per document and dropped when the parse ends. Never shared.
#[derive(Debug)]
pub struct ParsingContext<'a, 'input> {
    pub document: String,
    pub definitions: Definitions<'a, 'input>,
    pub state: ResolutionState,
}

impl<'a, 'input> ParsingContext<'a, 'input> {
    /// Create a context over extracted definitions
    pub fn new(document: impl Into<String>, definitions: Definitions<'a, 'input>) -> Self {
        Self {
            document: document.into(),
            definitions,
            state: ResolutionState::default(),
        }
    }

    /// Document the definitions were extracted from
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Resolve the definitions into a schema, consuming the context
    pub fn resolve(mut self) -> Result<Schema> {
        debug!(
            document = %self.document,
            types = self.definitions.types.len(),
            "Resolving definitions"
        );
        TypeResolver::new(&self.definitions)
            .resolve(&mut self.state)
            .inspect_err(|e| {
                debug!(
                    document = %self.document,
                    resolved = self.state.types.len(),
                    error = %e,
                    "Resolution failed"
                );
            })
    }
}
