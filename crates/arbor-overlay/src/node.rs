//! # Typed Nodes and Lazy Child Enumeration
//!
//! Defines `TypedNode`, one untyped source node overlaid with its resolved
//! type metadata, and `Children`, the demand-driven iterator implementing
//! the child-enumeration contract.
//!
//! A typed node is created on first traversal of a tree position and is
//! immutable afterwards. Nothing is precomputed: enumerating children
//! resolves each child's instance type as it is yielded, so memory stays
//! bounded by the depth and breadth actually visited and arbitrarily large
//! source trees can be walked.
//!
//! ## Invariants
//!
//! - A node's short path is unique among its siblings and a strict textual
//!   extension of its parent's path.
//! - A node never holds a resolved type definition that is abstract; an
//!   abstract root type fails construction under every policy.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use arbor_model::{
    annotations_of, parse_literal, Annotation, Diagnostic, ElementDefinition, PrimitiveKind,
    Representation, RichTextFragment, Severity, SourceChildren, SourceNode, SourceRef, TreeNode,
    TypeCatalog, Value,
};

use crate::policy::{ErrorMode, OverlaySettings};
use crate::resolve::{find_by_suffixed_name, resolve_instance_type};
use crate::rules::{RuleState, StructuralRule};
use crate::OverlayError;

const RICH_TEXT_TYPE: &str = "xhtml";
const RICH_TEXT_HOST: &str = "div";

/// Shared, immutable context for every node of one projected tree.
pub(crate) struct OverlayContext {
    pub(crate) catalog: Arc<dyn TypeCatalog>,
    pub(crate) settings: OverlaySettings,
    pub(crate) rules: Vec<Arc<StructuralRule>>,
}

impl OverlayContext {
    /// Deliver a structural diagnostic through the sink. Under the strict
    /// policy the diagnostic escalates to a fatal error.
    pub(crate) fn raise(
        &self,
        severity: Severity,
        message: String,
        location: Option<String>,
    ) -> Result<(), OverlayError> {
        let diagnostic = Diagnostic {
            severity,
            message,
            location,
        };
        if let Some(sink) = &self.settings.sink {
            sink(&diagnostic);
        }
        if self.settings.error_mode == ErrorMode::Strict {
            return Err(OverlayError::Typing(diagnostic));
        }
        Ok(())
    }

    /// Deliver a conversion diagnostic. Never escalates; the caller keeps
    /// the unconverted raw text instead.
    pub(crate) fn note(&self, message: String, location: Option<String>) {
        let diagnostic = Diagnostic::error(message, location);
        if let Some(sink) = &self.settings.sink {
            sink(&diagnostic);
        }
    }
}

/// A source node overlaid with resolved type metadata.
///
/// Cheap to clone and safe to share across threads; all shared state is
/// immutable.
#[derive(Clone)]
pub struct TypedNode {
    source: SourceRef,
    instance_type: Option<String>,
    definition: Option<ElementDefinition>,
    short_path: String,
    ctx: Arc<OverlayContext>,
}

impl TypedNode {
    /// Project a root source node.
    ///
    /// The root type comes from `type_name` when given, otherwise from the
    /// source's intrinsic type indicator. With neither available the
    /// strict policy fails with [`OverlayError::MissingRootType`]; other
    /// policies produce an untyped root. A type name the catalog cannot
    /// provide fails under strict and produces a typed-but-undefined root
    /// otherwise. An abstract root type is always fatal.
    pub fn root(
        source: SourceRef,
        type_name: Option<&str>,
        catalog: Arc<dyn TypeCatalog>,
        settings: OverlaySettings,
    ) -> Result<Self, OverlayError> {
        let rules = annotations_of::<StructuralRule>(source.as_ref());
        let ctx = Arc::new(OverlayContext {
            catalog,
            settings,
            rules,
        });

        let short_path = source.name().to_owned();
        let root_type = type_name
            .map(str::to_owned)
            .or_else(|| source.kind_indicator().map(str::to_owned));

        let Some(root_type) = root_type else {
            if ctx.settings.error_mode == ErrorMode::Strict {
                return Err(OverlayError::MissingRootType {
                    location: source.location().to_owned(),
                });
            }
            debug!(location = %source.location(), "projecting untyped root");
            return Ok(Self {
                source,
                instance_type: None,
                definition: None,
                short_path,
                ctx,
            });
        };

        let Some(type_definition) = ctx.catalog.provide(&root_type) else {
            if ctx.settings.error_mode == ErrorMode::Strict {
                return Err(OverlayError::UnknownRootType {
                    type_name: root_type,
                });
            }
            return Ok(Self {
                source,
                instance_type: Some(root_type),
                definition: None,
                short_path,
                ctx,
            });
        };

        if type_definition.is_abstract {
            return Err(OverlayError::AbstractRootType {
                type_name: type_definition.name.clone(),
            });
        }

        let definition = ElementDefinition::for_root(&type_definition, source.name());
        debug!(instance_type = %root_type, path = %short_path, "projected root");
        Ok(Self {
            source,
            instance_type: Some(root_type),
            definition: Some(definition),
            short_path,
            ctx,
        })
    }

    /// The node's resolved name: the declared element name when a
    /// definition matched, otherwise the source name.
    pub fn name(&self) -> &str {
        self.definition
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or_else(|| self.source.name())
    }

    /// The resolved concrete instance type, when resolution succeeded.
    pub fn instance_type(&self) -> Option<&str> {
        self.instance_type.as_deref()
    }

    /// The element definition this node occupies, when one matched.
    pub fn definition(&self) -> Option<&ElementDefinition> {
        self.definition.as_ref()
    }

    /// The sibling-unique short path of this node.
    pub fn short_path(&self) -> &str {
        &self.short_path
    }

    /// The underlying source location.
    pub fn location(&self) -> &str {
        self.source.location()
    }

    /// Annotations of the given concrete type on the underlying source node.
    pub fn annotations(&self, kind: TypeId) -> Vec<Annotation> {
        self.source.annotations(kind)
    }

    /// Read the node's typed value.
    ///
    /// Returns `None` when the source carries no text. An untyped node
    /// returns the raw text unconverted. A non-primitive instance type
    /// with text raises a type diagnostic (fatal under strict) and yields
    /// `None`. A logical-model "primitive" under an absolute identifier
    /// converts using the declared type of its `value` element. Conversion
    /// failures degrade to the raw text plus a diagnostic.
    pub fn value(&self) -> Result<Option<Value>, OverlayError> {
        let Some(text) = self.source.text() else {
            return Ok(None);
        };

        let Some(instance_type) = self.instance_type.as_deref() else {
            return Ok(Some(Value::String(text.to_owned())));
        };

        if is_absolute_identifier(instance_type) {
            let value_kind = self.ctx.catalog.provide(instance_type).and_then(|def| {
                def.elements
                    .iter()
                    .find(|e| e.name == "value")
                    .and_then(|e| e.types.first())
                    .and_then(|t| PrimitiveKind::of(&t.name))
            });
            return Ok(Some(match value_kind {
                Some(kind) => self.convert(text, kind),
                None => Value::String(text.to_owned()),
            }));
        }

        let Some(kind) = PrimitiveKind::of(instance_type) else {
            self.ctx.raise(
                Severity::Error,
                format!("since type {instance_type} is not a primitive, it cannot have a value"),
                Some(self.location().to_owned()),
            )?;
            return Ok(None);
        };

        Ok(Some(self.convert(text, kind)))
    }

    fn convert(&self, text: &str, kind: PrimitiveKind) -> Value {
        match parse_literal(text, kind) {
            Ok(value) => value,
            Err(err) => {
                self.ctx
                    .note(err.to_string(), Some(self.location().to_owned()));
                Value::String(text.to_owned())
            }
        }
    }

    /// Enumerate child nodes lazily, optionally filtered by name.
    ///
    /// Filtering by the base name of a polymorphic element matches its
    /// suffixed instances. Each yielded item is the next child or the
    /// fatal error that halted enumeration under the strict policy.
    pub fn children(&self, filter: Option<&str>) -> Children {
        // Opaque markup: only the host element enumerates further, since
        // the markup tags below it have no declared types.
        if self.instance_type.as_deref() == Some(RICH_TEXT_TYPE) && self.name() != RICH_TEXT_HOST {
            return Children::empty(self.clone());
        }

        let definitions = self.child_definitions();

        if self.definition.is_some() && definitions.is_empty() {
            // The node's declared type is itself unknown or structureless.
            if self.ctx.settings.error_mode == ErrorMode::Strict {
                if let Some(instance_type) = self.instance_type.as_deref() {
                    if let Err(err) = self.ctx.raise(
                        Severity::Error,
                        format!("encountered unknown type '{instance_type}'"),
                        Some(self.location().to_owned()),
                    ) {
                        return Children::failed(self.clone(), err);
                    }
                }
            }
            if self.ctx.settings.error_mode != ErrorMode::Passthrough {
                return Children::empty(self.clone());
            }
            // Pass the untyped members through, but with no type
            // information there is nothing for the structural rules to do.
            return Children::open(self.clone(), definitions, filter, false);
        }

        Children::open(self.clone(), definitions, filter, true)
    }

    fn child_definitions(&self) -> Vec<ElementDefinition> {
        let Some(instance_type) = self.instance_type.as_deref() else {
            return Vec::new();
        };
        match self.ctx.catalog.provide(instance_type) {
            Some(definition) => definition.elements.clone(),
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for TypedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedNode")
            .field("name", &self.name())
            .field("instance_type", &self.instance_type)
            .field("short_path", &self.short_path)
            .field("location", &self.source.location())
            .finish()
    }
}

impl fmt::Display for TypedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(instance_type) = &self.instance_type {
            write!(f, "[{instance_type}] ")?;
        }
        f.write_str(self.source.location())
    }
}

/// Lazy iterator over a node's typed children.
///
/// Yields `Result` items: under the strict policy a structural failure is
/// yielded once as an error and enumeration halts.
pub struct Children {
    parent: TypedNode,
    definitions: Vec<ElementDefinition>,
    source_iter: Option<SourceChildren>,
    run_rules: bool,
    name_indices: HashMap<String, usize>,
    rule_states: Vec<Option<RuleState>>,
    pending_failure: Option<OverlayError>,
    halted: bool,
}

impl Children {
    fn empty(parent: TypedNode) -> Self {
        Self::with_iter(parent, Vec::new(), None, false)
    }

    fn failed(parent: TypedNode, failure: OverlayError) -> Self {
        let mut children = Self::with_iter(parent, Vec::new(), None, false);
        children.pending_failure = Some(failure);
        children
    }

    fn open(
        parent: TypedNode,
        definitions: Vec<ElementDefinition>,
        filter: Option<&str>,
        run_rules: bool,
    ) -> Self {
        let source_iter = match filter {
            None => parent.source.children(None),
            Some(name) => {
                let choice = find_by_suffixed_name(&definitions, name)
                    .map(|d| d.is_choice)
                    .unwrap_or(false);
                if choice {
                    let pattern = format!("{name}*");
                    parent.source.children(Some(pattern.as_str()))
                } else {
                    parent.source.children(Some(name))
                }
            }
        };
        Self::with_iter(parent, definitions, Some(source_iter), run_rules)
    }

    fn with_iter(
        parent: TypedNode,
        definitions: Vec<ElementDefinition>,
        source_iter: Option<SourceChildren>,
        run_rules: bool,
    ) -> Self {
        let rule_slots = parent.ctx.rules.len();
        Self {
            parent,
            definitions,
            source_iter,
            run_rules,
            name_indices: HashMap::new(),
            rule_states: std::iter::repeat_with(|| None).take(rule_slots).collect(),
            pending_failure: None,
            halted: false,
        }
    }

    fn project(&mut self, scan: SourceRef) -> Result<Option<TypedNode>, OverlayError> {
        let ctx = Arc::clone(&self.parent.ctx);
        let info = find_by_suffixed_name(&self.definitions, scan.name()).cloned();

        let instance_type = match &info {
            Some(info) => resolve_instance_type(&ctx, scan.as_ref(), info)?,
            None => None,
        };

        // Definitions exist for this level, but none matched this child.
        if !self.definitions.is_empty() && info.is_none() {
            let strict = ctx.settings.error_mode == ErrorMode::Strict;
            let severity = if strict {
                Severity::Error
            } else {
                Severity::Warning
            };
            ctx.raise(
                severity,
                format!(
                    "encountered unknown element '{}' at location '{}' while parsing",
                    scan.name(),
                    scan.location()
                ),
                Some(scan.location().to_owned()),
            )?;

            if ctx.settings.error_mode != ErrorMode::Passthrough {
                return Ok(None);
            }
        }

        // Per-name occurrence index; dropped elements above do not
        // advance it. Counting per name keeps indexed paths unique even
        // when same-named siblings are not adjacent.
        let index = {
            let slot = self.name_indices.entry(scan.name().to_owned()).or_insert(0);
            let index = *slot;
            *slot += 1;
            index
        };

        let short_path = match &info {
            Some(info) if !info.is_collection => {
                format!("{}.{}", self.parent.short_path, info.name)
            }
            _ => format!("{}.{}[{}]", self.parent.short_path, scan.name(), index),
        };

        // A rich-text subtree flattens to one synthetic text-valued child;
        // its real descendants are not enumerated further.
        let rich_text = instance_type.as_deref() == Some(RICH_TEXT_TYPE)
            && info
                .as_ref()
                .map_or(false, |i| i.representation == Representation::RichText);
        let source = if rich_text {
            let mut markup = String::new();
            collect_rich_text(scan.as_ref(), &mut markup);
            TreeNode::valued(scan.name(), &markup).seal_at(scan.location())
        } else {
            scan
        };

        trace!(path = %short_path, instance_type = ?instance_type, "projected child");
        Ok(Some(TypedNode {
            source,
            instance_type,
            definition: info,
            short_path,
            ctx,
        }))
    }
}

impl Iterator for Children {
    type Item = Result<TypedNode, OverlayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        if let Some(failure) = self.pending_failure.take() {
            self.halted = true;
            return Some(Err(failure));
        }

        loop {
            let scan = self.source_iter.as_mut()?.next()?;
            match self.project(scan) {
                Ok(Some(child)) => {
                    if self.run_rules {
                        for (slot, rule) in self.parent.ctx.rules.iter().enumerate() {
                            let carried = self.rule_states[slot].take();
                            self.rule_states[slot] = rule.run(&child, &self.parent, carried);
                        }
                    }
                    return Some(Ok(child));
                }
                Ok(None) => continue,
                Err(failure) => {
                    self.halted = true;
                    return Some(Err(failure));
                }
            }
        }
    }
}

/// Concatenate the rich-text fragments of all descendants, in document
/// order.
fn collect_rich_text(node: &dyn SourceNode, out: &mut String) {
    for child in node.children(None) {
        for fragment in annotations_of::<RichTextFragment>(child.as_ref()) {
            out.push_str(&fragment.0);
        }
        collect_rich_text(child.as_ref(), out);
    }
}

/// Whether a type name is an absolute identifier (`scheme:rest`), marking
/// a logical-model primitive rather than a plain type name.
fn is_absolute_identifier(name: &str) -> bool {
    match name.split_once(':') {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {
            scheme
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
