//! # Validation Engine Integration Tests
//!
//! Drives assertion graphs — including self- and mutually-referential
//! ones — against typed node sequences projected from in-memory trees.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use arbor_assert::{
    Assertion, Finding, Fixed, IssueSeverity, Predicate, ReferenceAssertion, Schema, Trace,
    TraceSink, ValidationContext, ValidationResult,
};
use arbor_model::{ElementDefinition, MemoryCatalog, TreeNode, TypeDefinition, Value};
use arbor_overlay::{ErrorMode, OverlaySettings, TypedNode};

/// Project a small record and return its typed children.
fn record_children() -> Vec<TypedNode> {
    let catalog = Arc::new(
        MemoryCatalog::new()
            .with(
                TypeDefinition::new("Record")
                    .resource()
                    .with_element(ElementDefinition::new("active", "boolean"))
                    .with_element(ElementDefinition::new("name", "string").collection()),
            )
            .with(TypeDefinition::new("boolean"))
            .with(TypeDefinition::new("string")),
    );
    let source = TreeNode::container("record")
        .push(TreeNode::valued("active", "true"))
        .push(TreeNode::valued("name", "Ada"))
        .push(TreeNode::valued("name", "Lovelace"))
        .seal();
    let root = TypedNode::root(
        source,
        Some("Record"),
        catalog,
        OverlaySettings::new(ErrorMode::Strict),
    )
    .unwrap();
    root.children(None).collect::<Result<Vec<_>, _>>().unwrap()
}

// ---- direct assertions over projected nodes ----

#[test]
fn predicates_inspect_typed_values() {
    let children = record_children();
    let ctx = ValidationContext::new();

    let all_typed = Predicate::new("all-typed", "every node must carry a type", |input| {
        input.iter().all(|n| n.instance_type().is_some())
    });
    assert!(all_typed.validate(&children, &ctx).is_success());

    let active_is_bool = Predicate::new("active-true", "active must read true", |input| {
        input
            .iter()
            .find(|n| n.name() == "active")
            .and_then(|n| n.value().ok().flatten())
            == Some(Value::Bool(true))
    });
    assert!(active_is_bool.validate(&children, &ctx).is_success());
}

#[test]
fn failed_predicate_reports_first_node_path() {
    let children = record_children();
    let ctx = ValidationContext::new();

    let impossible = Predicate::new("none", "expected nothing", |input| input.is_empty());
    let result = impossible.validate(&children, &ctx);

    assert!(!result.is_success());
    assert_eq!(
        result.findings()[0].location.as_deref(),
        Some("record.active")
    );
}

#[test]
fn schema_aggregates_passes_and_failures() {
    let children = record_children();
    let ctx = ValidationContext::new();

    let schema = Schema::new(vec![
        Arc::new(Predicate::new("nonempty", "no nodes matched", |input| {
            !input.is_empty()
        })),
        Arc::new(Fixed::failure("known gap", IssueSeverity::Warning)),
        Arc::new(Fixed::failure("hard failure", IssueSeverity::Error)),
    ]);
    let result = schema.validate(&children, &ctx);

    assert_eq!(result.passes(), 1);
    assert_eq!(result.findings().len(), 2);
    assert!(!result.is_success());
}

// ---- tracing ----

#[test]
fn trace_reports_label_and_matched_sequence() {
    let children = record_children();
    let observed: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&observed);
    let sink: TraceSink = Arc::new(move |label: &str, input: &[TypedNode]| {
        log.lock().unwrap().push((label.to_owned(), input.len()));
    });
    let ctx = ValidationContext::new().with_trace(sink);

    let result = Trace::new("record-children").validate(&children, &ctx);
    assert!(result.is_success());

    let recorded = observed.lock().unwrap();
    assert_eq!(*recorded, [("record-children".to_owned(), 3)]);
}

// ---- lazy dereferencing and cycles ----

#[test]
fn reference_resolution_is_cached_with_one_side_effect() {
    let effects = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&effects);
    let target = Arc::new(Schema::with_id(
        "http://example.org/schema/leaf",
        vec![Arc::new(Fixed::success())],
    ));
    let handed_out = Arc::clone(&target);
    let reference = ReferenceAssertion::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        handed_out
    });

    assert_eq!(effects.load(Ordering::SeqCst), 0);
    let first = reference.resolve();
    let second = reference.resolve();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &target));
    assert_eq!(effects.load(Ordering::SeqCst), 1);
}

#[test]
fn self_referential_schema_validates_without_looping() {
    let effects = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&effects);

    let schema: Arc<Schema> = Arc::new_cyclic(|weak: &Weak<Schema>| {
        let weak = weak.clone();
        let reference = ReferenceAssertion::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            weak.upgrade().expect("cycle target alive")
        })
        .with_uri("http://example.org/schema/self");
        Schema::with_id(
            "http://example.org/schema/self",
            vec![Arc::new(Fixed::success()), Arc::new(reference)],
        )
    });

    // Construction resolves nothing.
    assert_eq!(effects.load(Ordering::SeqCst), 0);

    let ctx = ValidationContext::new();
    let result = schema.validate(&record_children(), &ctx);

    // The cycle's second visit contributes nothing; one pass remains.
    assert!(result.is_success());
    assert_eq!(result.passes(), 1);
    assert_eq!(effects.load(Ordering::SeqCst), 1);
}

#[test]
fn mutually_referential_schemas_terminate() {
    let a: Arc<Schema> = Arc::new_cyclic(|weak_a: &Weak<Schema>| {
        let weak_a = weak_a.clone();
        let b = Arc::new(Schema::with_id(
            "http://example.org/schema/b",
            vec![
                Arc::new(Fixed::success()),
                Arc::new(ReferenceAssertion::new(move || {
                    weak_a.upgrade().expect("cycle target alive")
                })),
            ],
        ));
        Schema::with_id(
            "http://example.org/schema/a",
            vec![
                Arc::new(Fixed::success()),
                Arc::new(ReferenceAssertion::direct(b)),
            ],
        )
    });

    let ctx = ValidationContext::new();
    let result = a.validate(&record_children(), &ctx);
    assert!(result.is_success());
    assert_eq!(result.passes(), 2);
}

#[test]
fn distinct_inputs_are_distinct_guard_pairs() {
    let children = record_children();
    let schema = Schema::new(vec![Arc::new(Fixed::success())]);
    let ctx = ValidationContext::new();

    // The same schema over different node sequences evaluates each time.
    assert_eq!(schema.validate(&children[..1], &ctx).passes(), 1);
    assert_eq!(schema.validate(&children[1..], &ctx).passes(), 1);
}

// ---- serialization ----

#[test]
fn reference_renders_as_single_ref_key() {
    let target = Arc::new(Schema::with_id(
        "http://example.org/schema/leaf",
        vec![Arc::new(Fixed::success())],
    ));
    let reference = ReferenceAssertion::direct(target);
    let rendered = reference.to_json().unwrap();
    assert_eq!(
        rendered,
        serde_json::json!({ "$ref": "http://example.org/schema/leaf" })
    );
}

#[test]
fn schema_rendering_propagates_missing_identifier() {
    let anonymous = Arc::new(Schema::new(vec![Arc::new(Fixed::success())]));
    let schema = Schema::with_id(
        "http://example.org/schema/outer",
        vec![Arc::new(ReferenceAssertion::direct(anonymous))],
    );
    assert!(schema.to_json().is_err());
}

// ---- cancellation ----

#[test]
fn cancellation_stops_contributing_but_keeps_merged_outcomes() {
    let children = record_children();
    let flag = Arc::new(AtomicBool::new(false));
    let ctx = ValidationContext::new().with_cancellation(Arc::clone(&flag));

    let tripwire = Arc::clone(&flag);
    let schema = Schema::new(vec![
        Arc::new(Predicate::new("first", "first failed", move |_| {
            // Simulates an external deadline firing mid-evaluation.
            tripwire.store(true, Ordering::Relaxed);
            true
        })),
        Arc::new(Fixed::failure("never reached", IssueSeverity::Error)),
    ]);

    let result = schema.validate(&children, &ctx);
    assert_eq!(result.passes(), 1);
    assert!(result.findings().is_empty());
}

#[test]
fn pre_cancelled_context_yields_empty_results() {
    let children = record_children();
    let flag = Arc::new(AtomicBool::new(true));
    let ctx = ValidationContext::new().with_cancellation(flag);

    let schema = Schema::new(vec![Arc::new(Fixed::failure(
        "unreachable",
        IssueSeverity::Error,
    ))]);
    let result = schema.validate(&children, &ctx);
    assert_eq!(result, ValidationResult::new());
}

// ---- result merging across independent validations ----

#[test]
fn results_merge_across_assertions() {
    let children = record_children();
    let ctx = ValidationContext::new();

    let a = Predicate::new("a", "a failed", |_| true).validate(&children, &ctx);
    let b = Fixed::failure("b failed", IssueSeverity::Error).validate(&children, &ctx);

    let merged = a.clone().merge(b.clone());
    let reversed = b.merge(a);
    assert_eq!(merged.outcome_multiset(), reversed.outcome_multiset());
    assert_eq!(merged.passes(), 1);
    assert_eq!(
        merged.findings(),
        [Finding::error("b failed", None)]
    );
}
