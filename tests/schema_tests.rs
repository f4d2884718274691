// tests/schema_tests.rs

mod common;

use common::{document, RESISTOR};
use kisexp::schema::SchemaRegistry;

#[test]
fn hundred_properties_share_one_entry() {
    let mut text = String::from("(kicad_symbol_lib (symbol \"R\"");
    for i in 0..100 {
        text.push_str(&format!(" (property \"P{}\" \"{}\" (at 0 0 0))", i, i));
    }
    text.push_str("))");
    let doc = document(&text);

    let mut registry = SchemaRegistry::new();
    registry.aggregate_tree(doc.root());

    let property = registry.get("kicad_symbol_lib/symbol/property").unwrap();
    assert_eq!(registry.node(property).instance_count(), 100);
    assert_eq!(registry.describe(property), "property #100 {String/String/Node}");
    let at = registry.get("kicad_symbol_lib/symbol/property/at").unwrap();
    assert_eq!(registry.describe(at), "at #100 {Integer/.../Integer}");
    // root, lib, symbol, property, at
    assert_eq!(registry.len(), 5);
}

#[test]
fn one_entry_per_distinct_path() {
    let doc = document(RESISTOR);
    let mut registry = SchemaRegistry::new();
    registry.aggregate_tree(doc.root());
    // The root entry is the only one without a document path.
    assert_eq!(registry.len(), doc.paths().len() + 1);
    for path in doc.paths() {
        assert!(registry.get(&path).is_some(), "{}", path);
    }
}

#[test]
fn aggregating_twice_only_adds_instances() {
    let mut registry = SchemaRegistry::new();
    let first = document(RESISTOR);
    registry.aggregate_tree(first.root());
    let entries = registry.len();

    let second = document(RESISTOR);
    registry.aggregate_tree(second.root());
    assert_eq!(registry.len(), entries);

    let pin = registry.get("kicad_symbol_lib/symbol/symbol/pin").unwrap();
    let ids: Vec<_> = registry.node(pin).instances().iter().map(|i| i.node).collect();
    assert_eq!(ids.len(), 2);
    assert!(first.node(ids[0]).is_some());
    assert!(second.node(ids[1]).is_some());
}

#[test]
fn render_shows_the_symbol_library_shape() {
    let doc = document(RESISTOR);
    let mut registry = SchemaRegistry::new();
    registry.aggregate_tree(doc.root());
    let rendered = registry.render();
    assert!(rendered.starts_with("/ #0 {}\n  kicad_symbol_lib #1 {Node/.../Node}\n"));
    assert!(rendered.contains("\n    symbol #1 {String/Node/.../Node}\n"));
    assert!(rendered.contains("\n      symbol #2 {String/Node}\n"));
    assert!(rendered.contains(&format!("\n{}color #1 {{Integer/.../Integer}}\n", "  ".repeat(6))));
}

#[test]
fn registry_serializes_to_json() {
    let doc = document("(a (b 1))");
    let mut registry = SchemaRegistry::new();
    registry.aggregate_tree(doc.root());
    let json: serde_json::Value = serde_json::to_value(&registry).unwrap();
    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[2]["name"], "b");
    assert_eq!(nodes[2]["instances"][0]["signature"], "Integer");
}
