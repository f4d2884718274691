// tests/tree_tests.rs

mod common;

use common::{document, RESISTOR};
use kisexp::syntax::parse_str;
use kisexp::tree::{build, walk, Document, Element, Node, Visitor, Walk};
use kisexp::value::Atom;
use kisexp::ErrorType;

fn assert_paths_extend_parent(node: &Node) {
    for child in node.child_nodes() {
        assert_eq!(&child.path()[..child.path().len() - 1], node.path());
        assert_eq!(child.path().last().map(String::as_str), Some(child.name()));
        assert_paths_extend_parent(child);
    }
}

#[test]
fn every_path_extends_its_parent() {
    let doc = document(RESISTOR);
    assert_eq!(doc.root().path(), ["kicad_symbol_lib".to_string()]);
    assert_paths_extend_parent(doc.root());
}

#[test]
fn quoted_heads_become_path_segments() {
    let doc = document(r#"(lib ("quoted tag" 1))"#);
    let child = doc.root().child_nodes().next().unwrap();
    assert_eq!(child.path_str(), "lib/quoted tag");
    assert_eq!(child.head(), &Atom::String("quoted tag".to_string()));
}

#[test]
fn build_keeps_atoms_and_rejects_malformed_lists() {
    let value = parse_str("42").unwrap();
    assert!(matches!(build(&value, &[]).unwrap(), Element::Atom(Atom::Integer(42))));

    for text in ["(a ())", "(a (1 2))", "(a ((b) c))"] {
        let value = parse_str(text).unwrap();
        let err = build(&value, &[]).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnsupportedValue, "{}", text);
    }

    let err = Document::from_value(&parse_str("\"just a string\"").unwrap()).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::UnsupportedValue);
}

#[test]
fn dump_lists_paths_and_indented_atoms() {
    let doc = document("(lib (version 1) (sym \"R\" (pin 1.5)))");
    assert_eq!(
        doc.dump(),
        "lib\nlib/version\n    1\nlib/sym\n    \"R\"\nlib/sym/pin\n    1.5\n"
    );
}

#[test]
fn paths_are_distinct_and_sorted() {
    let doc = document(RESISTOR);
    let paths: Vec<String> = doc.paths().into_iter().collect();
    assert!(paths.windows(2).all(|w| w[0] < w[1]));
    assert!(paths.contains(&"kicad_symbol_lib/symbol/symbol/pin/name/effects/font/size".to_string()));
    assert_eq!(
        paths.iter().filter(|p| p.as_str() == "kicad_symbol_lib/symbol/symbol").count(),
        1
    );
}

#[test]
fn node_handles_resolve_only_in_their_document() {
    let first = document("(a (b))");
    let second = document("(a (b))");
    let b = first.find("/a/b")[0];
    assert!(first.node(b.id()).is_some());
    assert!(second.node(b.id()).is_none());
    assert_ne!(first.root().id(), second.root().id());
}

#[test]
fn walker_skips_pruned_subtrees() {
    struct Counter {
        entered: Vec<String>,
        left: usize,
    }
    impl<'a> Visitor<'a> for Counter {
        fn on_node(&mut self, node: &'a Node) -> Walk {
            self.entered.push(node.path_str());
            if node.name() == "skip" {
                Walk::Skip
            } else {
                Walk::Descend
            }
        }
        fn on_leave(&mut self, _node: &'a Node) {
            self.left += 1;
        }
    }

    let doc = document("(r (skip (hidden)) (keep (shown)))");
    let mut counter = Counter {
        entered: Vec::new(),
        left: 0,
    };
    walk(doc.root(), &mut counter);
    assert_eq!(counter.entered, ["r", "r/skip", "r/keep", "r/keep/shown"]);
    assert_eq!(counter.left, 3);
}
