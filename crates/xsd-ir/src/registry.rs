//! Ordered, name-keyed registries

use crate::name::EntityName;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Ordered mapping from names to values
///
/// Insertion order is preserved and names are unique. Used for every
/// collection of definitions and resolved entities.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: IndexMap<EntityName, T>,
}

impl<T> Registry<T> {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Register a value, failing if the name is already taken
    pub fn add(&mut self, name: EntityName, value: T) -> Result<&T> {
        if self.items.contains_key(&name) {
            return Err(Error::duplicate_name(&name));
        }
        let (index, _) = self.items.insert_full(name, value);
        Ok(&self.items[index])
    }

    /// Get a value by name
    pub fn get(&self, name: &EntityName) -> Result<&T> {
        self.items.get(name).ok_or_else(|| Error::not_found(name))
    }

    /// Get a value by name, if registered
    #[must_use]
    pub fn lookup(&self, name: &EntityName) -> Option<&T> {
        self.items.get(name)
    }

    /// Check if a name is registered
    #[must_use]
    pub fn contains(&self, name: &EntityName) -> bool {
        self.items.contains_key(name)
    }

    /// Number of registered values
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityName, &T)> {
        self.items.iter()
    }

    /// Iterate names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &EntityName> {
        self.items.keys()
    }

    /// Iterate values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Freeze this registry into a read-only view
    #[must_use]
    pub fn into_read_only(self) -> ReadOnlyRegistry<T> {
        ReadOnlyRegistry {
            items: Arc::new(self.items),
        }
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = (&'a EntityName, &'a T);
    type IntoIter = indexmap::map::Iter<'a, EntityName, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Frozen snapshot of a [`Registry`]
///
/// Exposes lookup and iteration only. Cloning a view is cheap and shares the
/// same snapshot; the view never reflects later changes to the registry it
/// was taken from.
#[derive(Debug)]
pub struct ReadOnlyRegistry<T> {
    items: Arc<IndexMap<EntityName, T>>,
}

impl<T: Clone> ReadOnlyRegistry<T> {
    /// Take a snapshot of the current contents of `registry`
    #[must_use]
    pub fn snapshot(registry: &Registry<T>) -> Self {
        Self {
            items: Arc::new(registry.items.clone()),
        }
    }
}

impl<T> ReadOnlyRegistry<T> {
    /// Get a value by name
    pub fn get(&self, name: &EntityName) -> Result<&T> {
        self.items.get(name).ok_or_else(|| Error::not_found(name))
    }

    /// Get a value by name, if registered
    #[must_use]
    pub fn lookup(&self, name: &EntityName) -> Option<&T> {
        self.items.get(name)
    }

    /// Check if a name is registered
    #[must_use]
    pub fn contains(&self, name: &EntityName) -> bool {
        self.items.contains_key(name)
    }

    /// Number of registered values
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityName, &T)> {
        self.items.iter()
    }

    /// Iterate names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &EntityName> {
        self.items.keys()
    }

    /// Iterate values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }
}

impl<T> Clone for ReadOnlyRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for ReadOnlyRegistry<T> {
    fn default() -> Self {
        Registry::new().into_read_only()
    }
}

impl<T> From<Registry<T>> for ReadOnlyRegistry<T> {
    fn from(registry: Registry<T>) -> Self {
        registry.into_read_only()
    }
}

impl<'a, T> IntoIterator for &'a ReadOnlyRegistry<T> {
    type Item = (&'a EntityName, &'a T);
    type IntoIter = indexmap::map::Iter<'a, EntityName, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
