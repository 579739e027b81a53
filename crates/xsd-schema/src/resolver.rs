//! Two-pass type resolution
//!
//! Pass 1 creates every type together with its base chain. Base chains must
//! be acyclic, so a name met again while it is still being resolved is an
//! error. Pass 2 fills the members of complex types by plain lookup: every
//! type exists by then, which lets members refer back to their owner.
//! Root elements are resolved last, also by lookup.

use crate::context::ResolutionState;
use crate::definition::{Definitions, ElementDefinition, TypeDefinition, TypeDefinitionKind};
use crate::{CycleChain, Error, Result};
use std::sync::Arc;
use tracing::{debug, trace};
use xsd_ir::{built_in_type, Derivation, Element, EntityName, Registry, Schema, Type};

/// Resolves extracted definitions into linked entities
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'d, 'a, 'input> {
    definitions: &'d Definitions<'a, 'input>,
}

impl<'d, 'a, 'input> TypeResolver<'d, 'a, 'input> {
    /// Create a resolver over `definitions`
    #[must_use]
    pub fn new(definitions: &'d Definitions<'a, 'input>) -> Self {
        Self { definitions }
    }

    /// Run both passes and resolve the root elements
    pub fn resolve(&self, state: &mut ResolutionState) -> Result<Schema> {
        debug!(types = self.definitions.types.len(), "Resolving types and base chains");
        for definition in self.definitions.types.values() {
            self.resolve_type(state, definition)?;
        }

        debug!(buffers = state.member_buffers.len(), "Filling complex type members");
        self.resolve_members(state)?;

        debug!(
            elements = self.definitions.root_elements.len(),
            "Resolving root elements"
        );
        let root_elements = self.resolve_root_elements(state)?;

        let types = std::mem::take(&mut state.types);
        Ok(Schema::new(types.into_read_only(), root_elements.into_read_only()))
    }

    /// Resolve one type definition, memoized by name
    ///
    /// Fails with [`Error::CircularReference`] when the base chain leads back
    /// to a type that is still being resolved. Nothing from a failed chain is
    /// registered.
    pub fn resolve_type(
        &self,
        state: &mut ResolutionState,
        definition: &TypeDefinition<'a, 'input>,
    ) -> Result<Arc<Type>> {
        if let Some(resolved) = state.types.lookup(&definition.name) {
            trace!(name = %definition.name, "Type already resolved");
            return Ok(Arc::clone(resolved));
        }

        if let Some(index) = state.resolving.get_index_of(&definition.name) {
            let mut chain: Vec<EntityName> = state.resolving.iter().skip(index).cloned().collect();
            chain.push(definition.name.clone());
            return Err(Error::CircularReference {
                name: definition.name.clone(),
                chain: CycleChain(chain),
                location: definition.location.clone(),
            });
        }

        state.resolving.insert(definition.name.clone());
        let built = self.build_type(state, definition);
        state.resolving.shift_remove(&definition.name);
        let ty = built?;

        state.types.add(definition.name.clone(), Arc::clone(&ty))?;
        trace!(name = %definition.name, kind = ty.kind_label(), "Resolved type");
        Ok(ty)
    }

    fn build_type(
        &self,
        state: &mut ResolutionState,
        definition: &TypeDefinition<'a, 'input>,
    ) -> Result<Arc<Type>> {
        match &definition.kind {
            TypeDefinitionKind::Restriction { base, .. } => {
                self.build_simple(state, definition, base, Derivation::Restriction)
            }
            TypeDefinitionKind::List { base, .. } => {
                self.build_simple(state, definition, base, Derivation::List)
            }
            TypeDefinitionKind::Complex { base, .. } => {
                self.build_complex(state, definition, base.as_ref())
            }
        }
    }

    fn build_simple(
        &self,
        state: &mut ResolutionState,
        definition: &TypeDefinition<'a, 'input>,
        base: &EntityName,
        derivation: Derivation,
    ) -> Result<Arc<Type>> {
        let base = self.resolve_base(state, definition, base)?;
        if !base.is_simple() {
            return Err(Error::invalid_type(
                format!(
                    "Simple type {} cannot derive from complex type {}",
                    definition.name,
                    base.name()
                ),
                definition.location.clone(),
            ));
        }

        Ok(Arc::new(Type::simple(
            definition.location.clone(),
            definition.name.clone(),
            derivation,
            base,
        )))
    }

    fn build_complex(
        &self,
        state: &mut ResolutionState,
        definition: &TypeDefinition<'a, 'input>,
        base: Option<&EntityName>,
    ) -> Result<Arc<Type>> {
        let base = base
            .map(|name| self.resolve_base(state, definition, name))
            .transpose()?;
        if let Some(base) = base.as_ref().filter(|base| !base.is_complex()) {
            return Err(Error::invalid_type(
                format!(
                    "Complex type {} cannot extend simple type {}",
                    definition.name,
                    base.name()
                ),
                definition.location.clone(),
            ));
        }

        let ty = Arc::new(Type::complex(
            definition.location.clone(),
            definition.name.clone(),
            base,
        ));
        if state
            .member_buffers
            .insert(definition.name.clone(), Arc::clone(&ty))
            .is_some()
        {
            return Err(Error::Internal(format!(
                "Member buffer for {} opened twice",
                definition.name
            )));
        }
        Ok(ty)
    }

    /// Resolve the base named by `definition`
    ///
    /// Built-in simple bases come from the process-wide cache. Document
    /// types are resolved on demand.
    fn resolve_base(
        &self,
        state: &mut ResolutionState,
        definition: &TypeDefinition<'a, 'input>,
        base: &EntityName,
    ) -> Result<Arc<Type>> {
        if definition.is_simple() {
            if let Some(built_in) = built_in_type(base) {
                return Ok(built_in);
            }
        }

        if let Some(resolved) = state.types.lookup(base) {
            return Ok(Arc::clone(resolved));
        }

        if let Some(pending) = self.definitions.types.lookup(base) {
            return self.resolve_type(state, pending);
        }

        // Rejected by the caller, complex types cannot extend built-ins
        if let Some(built_in) = built_in_type(base) {
            return Ok(built_in);
        }

        Err(Error::missing_definition(
            base,
            format!("base type of {}", definition.name),
            definition.location.clone(),
        ))
    }

    /// Fill the members of every complex type
    pub fn resolve_members(&self, state: &mut ResolutionState) -> Result<()> {
        for definition in self.definitions.types.values().filter(|d| d.is_complex()) {
            let owner = state.member_buffers.shift_remove(&definition.name).ok_or_else(|| {
                Error::Internal(format!("No open member buffer for {}", definition.name))
            })?;

            let members = definition
                .members()
                .iter()
                .map(|member| self.resolve_element(state, member, Some(&definition.name)))
                .collect::<Result<Vec<_>>>()?;

            trace!(name = %definition.name, members = members.len(), "Filled members");
            owner
                .fill_members(members)
                .map_err(|e| Error::Internal(e.to_string()))?;
        }

        match state.member_buffers.keys().next() {
            Some(open) => Err(Error::Internal(format!(
                "Member buffer for {open} was never filled"
            ))),
            None => Ok(()),
        }
    }

    /// Resolve every root element by type lookup
    pub fn resolve_root_elements(&self, state: &ResolutionState) -> Result<Registry<Arc<Element>>> {
        let mut root_elements = Registry::new();
        for definition in self.definitions.root_elements.values() {
            let element = self.resolve_element(state, definition, None)?;
            root_elements.add(definition.name.clone(), Arc::new(element))?;
        }
        Ok(root_elements)
    }

    /// Resolve one element against already resolved types
    ///
    /// `owner` names the complex type a member element belongs to. Members
    /// refer to their type weakly, root elements own theirs.
    pub fn resolve_element(
        &self,
        state: &ResolutionState,
        definition: &ElementDefinition,
        owner: Option<&EntityName>,
    ) -> Result<Element> {
        let ty = built_in_type(&definition.type_name)
            .or_else(|| state.types.lookup(&definition.type_name).cloned())
            .ok_or_else(|| {
                let referenced_by = match owner {
                    Some(owner) => format!("type of member {} of {owner}", definition.name),
                    None => format!("type of element {}", definition.name),
                };
                Error::missing_definition(
                    &definition.type_name,
                    referenced_by,
                    definition.location.clone(),
                )
            })?;

        let location = Some(definition.location.clone());
        let name = definition.name.clone();
        Ok(match owner {
            Some(_) => Element::member(location, name, &ty, definition.min_occurs, definition.max_occurs),
            None => Element::new(location, name, ty, definition.min_occurs, definition.max_occurs),
        })
    }
}
