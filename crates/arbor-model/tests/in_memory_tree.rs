//! # In-Memory Tree Fixture Tests
//!
//! Exercises the reference implementations together the way a host does:
//! build a source tree with the builder API, assemble a catalog, and check
//! that the sealed tree honors the source-node contract end to end.

use arbor_model::{
    annotations_of, ElementDefinition, MemoryCatalog, RichTextFragment, SourceRef, TypeCatalog,
    TypeDefinition, TreeNode,
};

/// A small self-describing document with repeated and nested elements.
fn document() -> SourceRef {
    TreeNode::container("record")
        .of_kind("Record")
        .push(TreeNode::valued("active", "true"))
        .push(TreeNode::valued("name", "Ada"))
        .push(TreeNode::valued("name", "Lovelace"))
        .push(
            TreeNode::container("text").push(
                TreeNode::container("div")
                    .annotate(RichTextFragment("<p>Analyst</p>".into())),
            ),
        )
        .seal()
}

fn catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with(
            TypeDefinition::new("Record")
                .resource()
                .with_element(ElementDefinition::new("active", "boolean"))
                .with_element(ElementDefinition::new("name", "string").collection()),
        )
        .with(TypeDefinition::new("boolean"))
        .with(TypeDefinition::new("string"))
}

#[test]
fn sealed_tree_reports_stable_locations() {
    let root = document();
    assert_eq!(root.location(), "record");

    let locations: Vec<String> = root
        .children(None)
        .map(|c| c.location().to_owned())
        .collect();
    assert_eq!(
        locations,
        [
            "record.active[0]",
            "record.name[0]",
            "record.name[1]",
            "record.text[0]",
        ]
    );
}

#[test]
fn kind_indicator_names_the_entity_type() {
    let root = document();
    assert_eq!(root.kind_indicator(), Some("Record"));

    let definition = catalog().provide("Record").unwrap();
    assert!(definition.is_resource);
    assert_eq!(definition.elements.len(), 2);
}

#[test]
fn filters_select_children_without_mutation() {
    let root = document();

    let names: Vec<String> = root
        .children(Some("name"))
        .filter_map(|c| c.text().map(str::to_owned))
        .collect();
    assert_eq!(names, ["Ada", "Lovelace"]);

    // A second traversal sees the same data: the tree is immutable.
    assert_eq!(root.children(Some("name")).count(), 2);
    assert_eq!(root.children(None).count(), 4);
}

#[test]
fn annotations_survive_sealing() {
    let root = document();
    let text = root.children(Some("text")).next().unwrap();
    let div = text.children(Some("div")).next().unwrap();

    let fragments = annotations_of::<RichTextFragment>(div.as_ref());
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].0, "<p>Analyst</p>");
}

#[test]
fn catalog_misses_are_none_not_errors() {
    let catalog = catalog();
    assert!(catalog.provide("Observation").is_none());
    assert!(catalog.provide("").is_none());
}
