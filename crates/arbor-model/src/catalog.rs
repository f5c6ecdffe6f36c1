//! # Type Catalog Interface
//!
//! Defines `TypeCatalog`, the lookup contract from a type name to its
//! structural description, and the definition types it serves:
//! `TypeDefinition`, `ElementDefinition`, `TypeRef` and `Representation`.
//!
//! The catalog is consumed, not owned: a host populates it from whatever
//! schema source it has (a compiled specification, a loader, a test
//! fixture) and the projection engine performs read-only lookups against
//! it. `MemoryCatalog` is the in-memory reference implementation.
//!
//! ## Thread Safety
//!
//! Catalogs are shared behind `Arc<dyn TypeCatalog>` across every
//! traversal of a projected tree. Lookups must therefore be safe to run
//! concurrently; `MemoryCatalog` is immutable after construction.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Lookup from a type name to its structural definition.
pub trait TypeCatalog: Send + Sync {
    /// Resolve a type name, returning `None` when the catalog does not
    /// know the type.
    fn provide(&self, type_name: &str) -> Option<Arc<TypeDefinition>>;
}

/// One declared type of an element, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// The type name, or a canonical identifier when `is_reference` is set.
    pub name: String,
    /// Whether this entry refers to a named definition rather than an
    /// inline type. Choice-suffix matching only considers references.
    pub is_reference: bool,
}

impl TypeRef {
    /// An inline (non-reference) declared type.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            is_reference: false,
        }
    }

    /// A declared type referring to a named definition.
    pub fn reference(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            is_reference: true,
        }
    }
}

/// How an element's content is represented in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Representation {
    /// Ordinary nested element content.
    #[default]
    Element,
    /// Content carried as an attribute of the enclosing element.
    Attribute,
    /// The concrete type is named by an explicit type-indicating child.
    TypeAttr,
    /// Markup subtree to be flattened into a single text value.
    RichText,
}

/// Declared shape of one child element within a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// The element's base name.
    pub name: String,
    /// Whether the element may repeat.
    pub is_collection: bool,
    /// Whether the element is polymorphic, with the concrete type chosen
    /// per instance by a type-name suffix on the element name.
    pub is_choice: bool,
    /// Whether the element's content is a self-describing top-level
    /// addressable entity.
    pub is_resource: bool,
    /// Representation hint for the element's content.
    pub representation: Representation,
    /// The declared candidate types, in declaration order.
    pub types: Vec<TypeRef>,
    /// Fallback type for `TypeAttr` elements with no explicit indicator.
    pub default_type: Option<String>,
}

impl ElementDefinition {
    /// A singular element with one inline declared type.
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            is_collection: false,
            is_choice: false,
            is_resource: false,
            representation: Representation::Element,
            types: vec![TypeRef::new(type_name)],
            default_type: None,
        }
    }

    /// A polymorphic element with the given permissible types.
    pub fn choice(name: &str, permitted: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            is_collection: false,
            is_choice: true,
            is_resource: false,
            representation: Representation::Element,
            types: permitted.iter().map(|t| TypeRef::reference(t)).collect(),
            default_type: None,
        }
    }

    /// An element containing a self-describing top-level entity.
    pub fn resource(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            is_collection: false,
            is_choice: false,
            is_resource: true,
            representation: Representation::Element,
            types: Vec::new(),
            default_type: None,
        }
    }

    /// Mark the element as repeating.
    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    /// Override the representation hint.
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Replace the declared types.
    pub fn with_types(mut self, types: Vec<TypeRef>) -> Self {
        self.types = types;
        self
    }

    /// Set the fallback type for `TypeAttr` elements.
    pub fn with_default_type(mut self, type_name: &str) -> Self {
        self.default_type = Some(type_name.to_owned());
        self
    }

    /// Synthesize the singular element definition occupied by the root of
    /// a projected tree.
    pub fn for_root(definition: &TypeDefinition, node_name: &str) -> Self {
        Self {
            name: node_name.to_owned(),
            is_collection: false,
            is_choice: false,
            is_resource: definition.is_resource,
            representation: Representation::Element,
            types: vec![TypeRef::new(&definition.name)],
            default_type: None,
        }
    }
}

/// Structural description of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// The type's name.
    pub name: String,
    /// Whether the type is abstract. Abstract types never type a node.
    pub is_abstract: bool,
    /// Whether the type is a top-level addressable entity.
    pub is_resource: bool,
    /// Declared child elements, in declaration order.
    pub elements: Vec<ElementDefinition>,
}

impl TypeDefinition {
    /// A concrete, non-resource type with no elements.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            is_abstract: false,
            is_resource: false,
            elements: Vec::new(),
        }
    }

    /// Mark the type abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark the type as a top-level addressable entity.
    pub fn resource(mut self) -> Self {
        self.is_resource = true;
        self
    }

    /// Append a declared child element.
    pub fn with_element(mut self, element: ElementDefinition) -> Self {
        self.elements.push(element);
        self
    }
}

/// In-memory [`TypeCatalog`] populated programmatically.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    types: HashMap<String, Arc<TypeDefinition>>,
}

impl MemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, keyed by its type name. Chainable.
    pub fn with(mut self, definition: TypeDefinition) -> Self {
        self.insert(definition);
        self
    }

    /// Add a definition, keyed by its type name.
    pub fn insert(&mut self, definition: TypeDefinition) {
        self.types
            .insert(definition.name.clone(), Arc::new(definition));
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeCatalog for MemoryCatalog {
    fn provide(&self, type_name: &str) -> Option<Arc<TypeDefinition>> {
        self.types.get(type_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_catalog_lookup() {
        let catalog = MemoryCatalog::new()
            .with(TypeDefinition::new("Record").resource())
            .with(TypeDefinition::new("string"));

        assert_eq!(catalog.len(), 2);
        let record = catalog.provide("Record").unwrap();
        assert!(record.is_resource);
        assert!(!record.is_abstract);
        assert!(catalog.provide("Missing").is_none());
    }

    #[test]
    fn test_lookup_is_shared() {
        let catalog = MemoryCatalog::new().with(TypeDefinition::new("Record"));
        let a = catalog.provide("Record").unwrap();
        let b = catalog.provide("Record").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_choice_declares_references() {
        let element = ElementDefinition::choice("value", &["string", "integer"]);
        assert!(element.is_choice);
        assert_eq!(element.types.len(), 2);
        assert!(element.types.iter().all(|t| t.is_reference));
    }

    #[test]
    fn test_for_root_is_singular() {
        let definition = TypeDefinition::new("Record").resource();
        let root = ElementDefinition::for_root(&definition, "record");
        assert_eq!(root.name, "record");
        assert!(!root.is_collection);
        assert!(root.is_resource);
        assert_eq!(root.types[0].name, "Record");
    }

    #[test]
    fn test_builder_flags() {
        let element = ElementDefinition::new("item", "string")
            .collection()
            .with_representation(Representation::TypeAttr)
            .with_default_type("string");
        assert!(element.is_collection);
        assert_eq!(element.representation, Representation::TypeAttr);
        assert_eq!(element.default_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_definitions_serialize() {
        let definition = TypeDefinition::new("Record")
            .with_element(ElementDefinition::choice("value", &["string"]));
        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["name"], "Record");
        assert_eq!(json["elements"][0]["is_choice"], true);
    }
}
