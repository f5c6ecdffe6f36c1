//! # Source Tree Interface
//!
//! Defines `SourceNode`, the read-only contract for untyped hierarchical
//! document trees produced by an external parser, plus `TreeNode`, an owned
//! in-memory implementation with a builder API.
//!
//! The core never mutates a source node. Implementations own their data and
//! hand out `Arc` handles; traversal is demand-driven, so an implementation
//! backed by a streaming parser only needs to materialize the children that
//! are actually visited.
//!
//! ## Name Filters
//!
//! `children(filter)` takes an optional name filter. A plain filter matches
//! children by exact name. A filter ending in `*` matches any child whose
//! name starts with the stem — this is how polymorphic element lookups find
//! suffixed names like `valueString` under the base name `value`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to a source node.
pub type SourceRef = Arc<dyn SourceNode>;

/// An opaque annotation attached to a source node.
///
/// Annotations are looked up by their concrete `TypeId`; use
/// [`annotations_of`] to recover the typed values.
pub type Annotation = Arc<dyn Any + Send + Sync>;

/// Owned iterator over a node's children.
pub type SourceChildren = Box<dyn Iterator<Item = SourceRef> + Send>;

/// Read-only contract for one node of an untyped document tree.
pub trait SourceNode: Send + Sync {
    /// The element name of this node.
    fn name(&self) -> &str;

    /// The text value of this node, if it carries one.
    fn text(&self) -> Option<&str>;

    /// Enumerate child nodes, optionally filtered by name.
    ///
    /// See the module documentation for the filter matching rules.
    fn children(&self, filter: Option<&str>) -> SourceChildren;

    /// A human-readable location of this node within the document,
    /// assigned by the parser.
    fn location(&self) -> &str;

    /// The intrinsic type indicator carried by self-describing content,
    /// if any. Top-level addressable entities use this to name their own
    /// concrete type.
    fn kind_indicator(&self) -> Option<&str> {
        None
    }

    /// All annotations of the given concrete type attached to this node.
    fn annotations(&self, kind: TypeId) -> Vec<Annotation> {
        let _ = kind;
        Vec::new()
    }
}

/// Downcast a node's annotation bag to a concrete annotation type.
pub fn annotations_of<T: Any + Send + Sync>(node: &dyn SourceNode) -> Vec<Arc<T>> {
    node.annotations(TypeId::of::<T>())
        .into_iter()
        .filter_map(|a| a.downcast::<T>().ok())
        .collect()
}

/// Whether `name` matches a child-name filter.
///
/// A trailing `*` in the filter makes it a prefix match on the stem;
/// otherwise the match is exact.
pub fn name_matches(filter: &str, name: &str) -> bool {
    match filter.strip_suffix('*') {
        Some(stem) => name.starts_with(stem),
        None => name == filter,
    }
}

/// A fragment of flattened markup attached to a source node as an
/// annotation. Rich-text subtrees concatenate these in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextFragment(pub String);

/// Builder for an owned in-memory source tree.
///
/// Nodes are assembled bottom-up with the chainable builder methods, then
/// [`sealed`](TreeNode::seal) into an immutable [`SourceRef`]. Sealing
/// assigns each node a location string of the form
/// `root.child[0].grandchild[1]`, where the index counts earlier siblings
/// with the same name.
///
/// ```
/// use arbor_model::{SourceNode, TreeNode};
///
/// let root = TreeNode::container("record")
///     .push(TreeNode::valued("name", "Ada"))
///     .push(TreeNode::valued("name", "Countess"))
///     .seal();
///
/// let names: Vec<String> = root
///     .children(Some("name"))
///     .map(|c| c.location().to_string())
///     .collect();
/// assert_eq!(names, ["record.name[0]", "record.name[1]"]);
/// ```
#[derive(Default)]
pub struct TreeNode {
    name: String,
    text: Option<String>,
    kind: Option<String>,
    children: Vec<TreeNode>,
    annotations: Vec<Annotation>,
}

impl TreeNode {
    /// A node with a name and no text value.
    pub fn container(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// A node with a name and a text value.
    pub fn valued(name: &str, text: &str) -> Self {
        Self {
            name: name.to_owned(),
            text: Some(text.to_owned()),
            ..Self::default()
        }
    }

    /// Set the intrinsic type indicator for self-describing content.
    pub fn of_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_owned());
        self
    }

    /// Attach an annotation value.
    pub fn annotate<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.annotations.push(Arc::new(value));
        self
    }

    /// Append a child node.
    pub fn push(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Seal the tree, assigning locations rooted at this node's name.
    pub fn seal(self) -> SourceRef {
        let root = self.name.clone();
        self.seal_at(&root)
    }

    /// Seal the tree, assigning locations rooted at an explicit location.
    pub fn seal_at(self, location: &str) -> SourceRef {
        Arc::new(self.into_sealed(location.to_owned()))
    }

    fn into_sealed(self, location: String) -> Sealed {
        let mut slots: HashMap<String, usize> = HashMap::new();
        let children = self
            .children
            .into_iter()
            .map(|child| {
                let slot = slots.entry(child.name.clone()).or_insert(0);
                let child_location = format!("{location}.{}[{}]", child.name, *slot);
                *slot += 1;
                Arc::new(child.into_sealed(child_location))
            })
            .collect();

        Sealed {
            name: self.name,
            text: self.text,
            kind: self.kind,
            location,
            annotations: self.annotations,
            children,
        }
    }
}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("name", &self.name)
            .field("text", &self.text)
            .field("kind", &self.kind)
            .field("children", &self.children.len())
            .field("annotations", &self.annotations.len())
            .finish()
    }
}

/// The immutable form of a [`TreeNode`] after sealing.
struct Sealed {
    name: String,
    text: Option<String>,
    kind: Option<String>,
    location: String,
    annotations: Vec<Annotation>,
    children: Vec<Arc<Sealed>>,
}

impl SourceNode for Sealed {
    fn name(&self) -> &str {
        &self.name
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self, filter: Option<&str>) -> SourceChildren {
        let selected: Vec<SourceRef> = self
            .children
            .iter()
            .filter(|c| filter.map_or(true, |f| name_matches(f, &c.name)))
            .map(|c| Arc::clone(c) as SourceRef)
            .collect();
        Box::new(selected.into_iter())
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn kind_indicator(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    fn annotations(&self, kind: TypeId) -> Vec<Annotation> {
        self.annotations
            .iter()
            .filter(|a| a.as_ref().type_id() == kind)
            .cloned()
            .collect()
    }
}
