//! Resolved types and elements
//!
//! Entities are linked directly to each other: an element holds the type it
//! was declared with, a derived type holds its base. Types are shared through
//! `Arc`, so two references to the same name resolve to the same instance and
//! identity can be checked with [`Arc::ptr_eq`].
//!
//! Complex types may contain members whose type is the complex type itself
//! (or an ancestor). The member list is therefore filled after the type has
//! been created, exactly once, through [`Type::fill_members`]. Members hold
//! their type through a [`Weak`] reference so recursive shapes do not keep
//! themselves alive; the registry that owns the types (usually a
//! [`Schema`](crate::Schema)) holds the strong references. Built-in types
//! live in a process-wide cache and never expire.

use crate::location::DefinitionLocation;
use crate::name::EntityName;
use crate::{Error, Result};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// A resolved type
#[derive(Debug)]
pub struct Type {
    location: Option<DefinitionLocation>,
    name: EntityName,
    kind: TypeKind,
}

/// Closed set of type shapes
#[derive(Debug)]
pub enum TypeKind {
    /// Primitive defined by XML Schema itself; terminal, no base
    BuiltIn,

    /// Simple type derived from another simple type
    Simple(SimpleType),

    /// Complex type with an ordered member sequence
    Complex(ComplexType),
}

/// How a simple type derives from its base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// `xs:restriction`
    Restriction,
    /// `xs:list`; the base is the item type
    List,
}

/// A simple type derived by restriction or list
#[derive(Debug)]
pub struct SimpleType {
    derivation: Derivation,
    base: Arc<Type>,
}

/// A complex type
pub struct ComplexType {
    base: Option<Arc<Type>>,
    members: OnceLock<Vec<Element>>,
}

/// Upper occurrence bound of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxOccurs {
    /// At most this many occurrences
    Bounded(u64),
    /// `maxOccurs="unbounded"`
    Unbounded,
}

/// A resolved element
#[derive(Clone)]
pub struct Element {
    location: Option<DefinitionLocation>,
    name: EntityName,
    type_name: EntityName,
    ty: TypeLink,
    min_occurs: u64,
    max_occurs: MaxOccurs,
}

/// How an element refers to its type
#[derive(Clone)]
enum TypeLink {
    Owned(Arc<Type>),
    Borrowed(Weak<Type>),
}

impl Type {
    /// Create a built-in type
    #[must_use]
    pub fn built_in(name: EntityName) -> Self {
        Self {
            location: None,
            name,
            kind: TypeKind::BuiltIn,
        }
    }

    /// Create a simple type
    ///
    /// The base must itself be simple (built-in or derived).
    pub fn simple(
        location: DefinitionLocation,
        name: EntityName,
        derivation: Derivation,
        base: Arc<Type>,
    ) -> Self {
        debug_assert!(base.is_simple(), "simple type base must be simple");
        Self {
            location: Some(location),
            name,
            kind: TypeKind::Simple(SimpleType { derivation, base }),
        }
    }

    /// Create a complex type with an unfilled member list
    ///
    /// Any base must itself be complex.
    pub fn complex(location: DefinitionLocation, name: EntityName, base: Option<Arc<Type>>) -> Self {
        debug_assert!(
            base.as_ref().is_none_or(|b| b.is_complex()),
            "complex type base must be complex"
        );
        Self {
            location: Some(location),
            name,
            kind: TypeKind::Complex(ComplexType {
                base,
                members: OnceLock::new(),
            }),
        }
    }

    /// Type name
    #[must_use]
    pub fn name(&self) -> &EntityName {
        &self.name
    }

    /// Where the type was declared; `None` for built-in types
    #[must_use]
    pub fn location(&self) -> Option<&DefinitionLocation> {
        self.location.as_ref()
    }

    /// Shape of the type
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Base type, if any
    #[must_use]
    pub fn base_type(&self) -> Option<&Arc<Type>> {
        match &self.kind {
            TypeKind::BuiltIn => None,
            TypeKind::Simple(simple) => Some(&simple.base),
            TypeKind::Complex(complex) => complex.base.as_ref(),
        }
    }

    /// Whether this is a simple type (built-in or derived)
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self.kind, TypeKind::BuiltIn | TypeKind::Simple(_))
    }

    /// Whether this is a complex type
    #[must_use]
    pub fn is_complex(&self) -> bool {
        matches!(self.kind, TypeKind::Complex(_))
    }

    /// Whether this is a built-in type
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        matches!(self.kind, TypeKind::BuiltIn)
    }

    /// Complex type details, if complex
    #[must_use]
    pub fn as_complex(&self) -> Option<&ComplexType> {
        match &self.kind {
            TypeKind::Complex(complex) => Some(complex),
            _ => None,
        }
    }

    /// Simple type details, if derived
    #[must_use]
    pub fn as_simple(&self) -> Option<&SimpleType> {
        match &self.kind {
            TypeKind::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    /// Short label for the shape of this type
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match &self.kind {
            TypeKind::BuiltIn => "BuiltInType",
            TypeKind::Simple(simple) => match simple.derivation {
                Derivation::Restriction => "RestrictionType",
                Derivation::List => "ListType",
            },
            TypeKind::Complex(_) => "ComplexType",
        }
    }

    /// Members of a complex type, in declaration order
    ///
    /// Empty for simple types.
    #[must_use]
    pub fn members(&self) -> &[Element] {
        self.as_complex().map_or(&[][..], ComplexType::members)
    }

    /// Fill the member list of a complex type
    pub fn fill_members(&self, members: Vec<Element>) -> Result<()> {
        let complex = self.as_complex().ok_or_else(|| Error::NotComplex {
            name: self.name.clone(),
        })?;
        complex
            .members
            .set(members)
            .map_err(|_| Error::MembersAlreadyFilled {
                name: self.name.clone(),
            })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind_label(), self.name)?;
        if let Some(location) = &self.location {
            write!(f, " defined at {location}")?;
        }
        Ok(())
    }
}

impl SimpleType {
    /// Derivation method
    #[must_use]
    pub fn derivation(&self) -> Derivation {
        self.derivation
    }

    /// Base type (the item type for lists)
    #[must_use]
    pub fn base(&self) -> &Arc<Type> {
        &self.base
    }
}

impl ComplexType {
    /// Base type, if the type extends another complex type
    #[must_use]
    pub fn base(&self) -> Option<&Arc<Type>> {
        self.base.as_ref()
    }

    /// Members in declaration order
    ///
    /// Empty until the member list has been filled.
    #[must_use]
    pub fn members(&self) -> &[Element] {
        self.members.get().map_or(&[][..], Vec::as_slice)
    }

    /// Find a member by its local name
    #[must_use]
    pub fn member(&self, local: &str) -> Option<&Element> {
        self.members().iter().find(|m| m.name.local_part() == local)
    }

    /// Whether the member list has been filled
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.members.get().is_some()
    }
}

// Members may point back at the owning type, so only their names are printed.
impl fmt::Debug for ComplexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexType")
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .field("members", &self.members.get())
            .finish()
    }
}

impl MaxOccurs {
    /// The bound as an option; `None` means unbounded
    #[must_use]
    pub fn as_option(self) -> Option<u64> {
        match self {
            Self::Bounded(max) => Some(max),
            Self::Unbounded => None,
        }
    }

    /// Whether `count` occurrences stay within this bound
    #[must_use]
    pub fn allows(self, count: u64) -> bool {
        match self {
            Self::Bounded(max) => count <= max,
            Self::Unbounded => true,
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl Element {
    /// Create an element that keeps its type alive
    ///
    /// Used for root elements, which nothing points back to.
    #[must_use]
    pub fn new(
        location: Option<DefinitionLocation>,
        name: EntityName,
        ty: Arc<Type>,
        min_occurs: u64,
        max_occurs: MaxOccurs,
    ) -> Self {
        Self {
            location,
            name,
            type_name: ty.name().clone(),
            ty: TypeLink::Owned(ty),
            min_occurs,
            max_occurs,
        }
    }

    /// Create a member element of a complex type
    ///
    /// The type is referenced weakly, since it may be the owning type itself.
    #[must_use]
    pub fn member(
        location: Option<DefinitionLocation>,
        name: EntityName,
        ty: &Arc<Type>,
        min_occurs: u64,
        max_occurs: MaxOccurs,
    ) -> Self {
        Self {
            location,
            name,
            type_name: ty.name().clone(),
            ty: TypeLink::Borrowed(Arc::downgrade(ty)),
            min_occurs,
            max_occurs,
        }
    }

    /// Element name
    #[must_use]
    pub fn name(&self) -> &EntityName {
        &self.name
    }

    /// Where the element was declared
    #[must_use]
    pub fn location(&self) -> Option<&DefinitionLocation> {
        self.location.as_ref()
    }

    /// Declared type
    ///
    /// `None` once the registry owning a member's type has been dropped.
    #[must_use]
    pub fn ty(&self) -> Option<Arc<Type>> {
        match &self.ty {
            TypeLink::Owned(ty) => Some(Arc::clone(ty)),
            TypeLink::Borrowed(ty) => ty.upgrade(),
        }
    }

    /// Name of the declared type
    #[must_use]
    pub fn type_name(&self) -> &EntityName {
        &self.type_name
    }

    /// Lower occurrence bound
    #[must_use]
    pub fn min_occurs(&self) -> u64 {
        self.min_occurs
    }

    /// Upper occurrence bound
    #[must_use]
    pub fn max_occurs(&self) -> MaxOccurs {
        self.max_occurs
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("ty", &self.type_name)
            .field("min_occurs", &self.min_occurs)
            .field("max_occurs", &self.max_occurs)
            .finish()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element {}", self.name)?;
        if let Some(location) = &self.location {
            write!(f, " defined at {location}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::XML_SCHEMA_NS;

    fn location(line: u32) -> DefinitionLocation {
        DefinitionLocation::new("/xs:schema/xs:complexType", "test.xsd", line)
    }

    fn string_type() -> Arc<Type> {
        Arc::new(Type::built_in(EntityName::qualified(XML_SCHEMA_NS, "string")))
    }

    #[test]
    fn test_simple_type_base() {
        let base = string_type();
        let code = Type::simple(
            location(3),
            EntityName::qualified("urn:x", "Code"),
            Derivation::Restriction,
            base.clone(),
        );

        assert!(code.is_simple());
        assert!(!code.is_complex());
        assert!(Arc::ptr_eq(code.base_type().unwrap(), &base));
        assert_eq!(code.kind_label(), "RestrictionType");
        assert!(code.members().is_empty());
    }

    #[test]
    fn test_built_in_has_no_base_or_location() {
        let ty = string_type();
        assert!(ty.is_built_in());
        assert!(ty.is_simple());
        assert!(ty.base_type().is_none());
        assert!(ty.location().is_none());
    }

    #[test]
    fn test_complex_members_fill_once() {
        let node = Arc::new(Type::complex(
            location(5),
            EntityName::qualified("urn:x", "Node"),
            None,
        ));
        assert!(!node.as_complex().unwrap().is_filled());
        assert!(node.members().is_empty());

        let child = Element::member(
            Some(location(7)),
            EntityName::local("child"),
            &node,
            0,
            MaxOccurs::Unbounded,
        );
        node.fill_members(vec![child]).unwrap();

        assert!(node.as_complex().unwrap().is_filled());
        let member = node.as_complex().unwrap().member("child").unwrap();
        assert!(Arc::ptr_eq(&member.ty().unwrap(), &node));
        assert_eq!(member.type_name(), node.name());

        let err = node.fill_members(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::MembersAlreadyFilled { .. }));
        assert_eq!(node.members().len(), 1);
    }

    #[test]
    fn test_fill_members_on_simple_type_fails() {
        let ty = string_type();
        assert!(matches!(
            ty.fill_members(Vec::new()),
            Err(Error::NotComplex { .. })
        ));
    }

    #[test]
    fn test_recursive_debug_terminates() {
        let node = Arc::new(Type::complex(
            location(5),
            EntityName::qualified("urn:x", "Node"),
            None,
        ));
        let child = Element::member(None, EntityName::local("child"), &node, 0, MaxOccurs::Unbounded);
        node.fill_members(vec![child]).unwrap();

        let rendered = format!("{node:?}");
        assert!(rendered.contains("child"));
    }

    #[test]
    fn test_recursive_type_is_freed() {
        let node = Arc::new(Type::complex(
            location(5),
            EntityName::qualified("urn:x", "Node"),
            None,
        ));
        let child = Element::member(None, EntityName::local("child"), &node, 0, MaxOccurs::Unbounded);
        node.fill_members(vec![child.clone()]).unwrap();
        assert_eq!(Arc::strong_count(&node), 1);

        let weak = Arc::downgrade(&node);
        drop(node);

        assert!(weak.upgrade().is_none());
        assert!(child.ty().is_none());
        assert_eq!(child.type_name(), &EntityName::qualified("urn:x", "Node"));
    }

    #[test]
    fn test_owned_element_keeps_type_alive() {
        let order = Arc::new(Type::complex(location(2), EntityName::qualified("urn:x", "Order"), None));
        let root = Element::new(
            None,
            EntityName::qualified("urn:x", "order"),
            Arc::clone(&order),
            1,
            MaxOccurs::Bounded(1),
        );
        drop(order);

        let ty = root.ty().unwrap();
        assert_eq!(ty.name(), &EntityName::qualified("urn:x", "Order"));
    }

    #[test]
    fn test_max_occurs() {
        assert_eq!(MaxOccurs::default(), MaxOccurs::Bounded(1));
        assert_eq!(MaxOccurs::Bounded(7).as_option(), Some(7));
        assert_eq!(MaxOccurs::Unbounded.as_option(), None);
        assert!(MaxOccurs::Unbounded.allows(u64::MAX));
        assert!(!MaxOccurs::Bounded(2).allows(3));
        assert_eq!(MaxOccurs::Unbounded.to_string(), "unbounded");
    }

    #[test]
    fn test_type_display() {
        let ty = Type::complex(location(9), EntityName::qualified("urn:x", "Order"), None);
        assert_eq!(
            ty.to_string(),
            "ComplexType {urn:x}Order defined at /xs:schema/xs:complexType in test.xsd on line 9"
        );
    }
}
