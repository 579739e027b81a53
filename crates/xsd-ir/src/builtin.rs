//! Built-in XML Schema types
//!
//! Built-in types are process-wide singletons keyed by qualified name. The
//! cache is created on first use and each entry is created at most once, on
//! the first request for its name; every later request for the same name
//! returns the same `Arc`. The cache is never cleared.

use crate::entity::Type;
use crate::name::{EntityName, XML_SCHEMA_NS};
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Local names of the types XML Schema defines itself
pub const BUILT_IN_TYPE_NAMES: &[&str] = &[
    // ur-types
    "anyType",
    "anySimpleType",
    "anyAtomicType",
    // primitives
    "string",
    "boolean",
    "decimal",
    "float",
    "double",
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
    // derived from string
    "normalizedString",
    "token",
    "language",
    "NMTOKEN",
    "NMTOKENS",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    // derived from decimal
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "positiveInteger",
    // derived from duration and dateTime
    "dayTimeDuration",
    "yearMonthDuration",
    "dateTimeStamp",
];

static BUILT_IN_TYPES: OnceLock<DashMap<EntityName, Arc<Type>>> = OnceLock::new();

/// Whether `name` names a built-in type
#[must_use]
pub fn is_built_in_type_name(name: &EntityName) -> bool {
    name.in_schema_namespace() && BUILT_IN_TYPE_NAMES.contains(&name.local_part())
}

/// Get the shared instance of a built-in type
///
/// Returns `None` if `name` is not a built-in type name.
#[must_use]
pub fn built_in_type(name: &EntityName) -> Option<Arc<Type>> {
    if !is_built_in_type_name(name) {
        return None;
    }

    let cache = BUILT_IN_TYPES.get_or_init(DashMap::new);
    let entry = cache.entry(name.clone()).or_insert_with(|| {
        trace!(%name, "Creating built-in type");
        Arc::new(Type::built_in(name.clone()))
    });
    Some(Arc::clone(entry.value()))
}

/// Shared instance of `anyType`
#[must_use]
pub fn any_type() -> Arc<Type> {
    let name = EntityName::qualified(XML_SCHEMA_NS, "anyType");
    let cache = BUILT_IN_TYPES.get_or_init(DashMap::new);
    let entry = cache
        .entry(name.clone())
        .or_insert_with(|| Arc::new(Type::built_in(name)));
    Arc::clone(entry.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn xs(local: &str) -> EntityName {
        EntityName::qualified(XML_SCHEMA_NS, local)
    }

    #[test]
    fn test_same_name_same_instance() {
        let a = built_in_type(&xs("string")).unwrap();
        let b = built_in_type(&xs("string")).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_built_in());
        assert_eq!(a.name(), &xs("string"));
    }

    #[test]
    fn test_different_names_different_instances() {
        let a = built_in_type(&xs("int")).unwrap();
        let b = built_in_type(&xs("long")).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_any_type_is_shared() {
        let a = any_type();
        let b = built_in_type(&EntityName::any_type()).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unknown_names_are_not_built_in() {
        assert!(built_in_type(&xs("strnig")).is_none());
        assert!(built_in_type(&EntityName::qualified("urn:x", "string")).is_none());
        assert!(built_in_type(&EntityName::local("string")).is_none());
        assert!(!is_built_in_type_name(&xs("Node")));
    }

    #[test]
    fn test_concurrent_first_use_yields_one_instance() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| built_in_type(&xs("gMonthDay")).unwrap()))
            .collect();
        let types: Vec<Arc<Type>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for ty in &types[1..] {
            assert!(Arc::ptr_eq(ty, &types[0]));
        }
    }
}
