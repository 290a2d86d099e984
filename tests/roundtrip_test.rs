//! Serialization round-trip tests.
//!
//! The contract: deserialize(serialize(tree)) reports zero structural
//! differences, for element and zone trees alike, including classifications
//! and features added by labeling passes.

mod common;

use std::fs;

use tempfile::TempDir;

use common::{page, visible, TreeFixture};
use zonal::label::content::ContentLabeler;
use zonal::label::{PunctuationSentences, WhitespaceTokenizer};
use zonal::tree::feature::FeatureValue;
use zonal::xml::{read_element_tree, read_zone_tree, write_element_tree, write_zone_tree};
use zonal::{Error, NodeId, VocabularyRules, ZoneTreeBuilder};

fn fixture_elements() -> zonal::ElementTree {
    let mut fx = TreeFixture::new();
    let body = fx.add(None, "body", &["BreakDown"], (0, 24), visible());
    let p = fx.add(Some(body), "p", &["SignificantBlock"], (0, 12), visible());
    fx.add(Some(p), "span", &["SignificantInline", "Hidden"], (6, 12), visible());
    fx.add(Some(body), "p", &["SignificantBlock"], (12, 24), visible());
    let mut tree = fx.finish();

    // Decorate with the fields the builder does not touch.
    {
        let node = tree.node_mut(body).unwrap();
        node.payload
            .attributes
            .insert("class".to_string(), "hero & \"main\"".to_string());
        node.payload
            .attributes
            .insert("data-note".to_string(), "<careful>".to_string());
        node.payload
            .styles
            .insert("display".to_string(), "block".to_string());
        node.payload.outer_html = zonal::Span::new(0, 100);
        node.payload.inner_html = zonal::Span::new(6, 93);
        node.set_display_order(Some(0));
        node.features.set("depth", FeatureValue::Int(0));
        node.features
            .set("ratio", FeatureValue::Decimal(2.0 / 3.0));
        node.features
            .set("note", FeatureValue::Text("a < b & c".to_string()));
        node.features.set("visited", FeatureValue::Flag(true));
    }
    tree.node_mut(p).unwrap().set_display_order(Some(1));
    tree
}

#[test]
fn test_element_tree_round_trip() {
    let tree = fixture_elements();
    let xml = write_element_tree(&tree);
    let restored = read_element_tree(&xml).expect("round trip parses");
    let differences = tree.structural_diff(&restored);
    assert!(
        differences.is_empty(),
        "unexpected differences: {:?}",
        differences
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_labeled_zone_tree_round_trip() {
    let elements = fixture_elements();
    let rules = VocabularyRules::default();
    let mut zones = ZoneTreeBuilder::new(&rules)
        .build(&elements, &page("First half sentence one. Rest of it."))
        .expect("zones build");

    let tokenizer = WhitespaceTokenizer;
    let detector = PunctuationSentences;
    ContentLabeler::new(&tokenizer, &detector)
        .execute_zones(&mut zones)
        .expect("labeling runs");

    let xml = write_zone_tree(&zones);
    let restored = read_zone_tree(&xml).expect("round trip parses");
    let differences = zones.structural_diff(&restored);
    assert!(
        differences.is_empty(),
        "unexpected differences: {:?}",
        differences
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_round_trip_through_disk() {
    let tree = fixture_elements();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("elements.xml");
    fs::write(&path, write_element_tree(&tree)).unwrap();
    let restored = read_element_tree(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(tree.structural_diff(&restored).is_empty());
}

#[test]
fn test_structural_diff_reports_named_fields() {
    let tree = fixture_elements();
    let mut other = read_element_tree(&write_element_tree(&tree)).unwrap();
    other.node_mut(NodeId(1)).unwrap().payload.tag = "div".to_string();
    other.node_mut(NodeId(3)).unwrap().classes.add("extra");

    let differences = tree.structural_diff(&other);
    assert_eq!(differences.len(), 2);
    assert!(differences.iter().any(|d| d.field == "tag" && d.node == Some(NodeId(1))));
    assert!(differences
        .iter()
        .any(|d| d.field == "classifications" && d.node == Some(NodeId(3))));
}

// ============================================================================
// Malformed documents
// ============================================================================

#[test]
fn test_missing_id_is_a_deserialize_error() {
    let xml = r#"<?xml version="1.0"?>
<element-tree>
  <element tag="body"></element>
</element-tree>"#;
    assert!(matches!(
        read_element_tree(xml),
        Err(Error::Deserialize(_))
    ));
}

#[test]
fn test_unknown_zone_kind_is_a_deserialize_error() {
    let xml = r#"<?xml version="1.0"?>
<zone-tree>
  <zone id="0" kind="mystery"></zone>
</zone-tree>"#;
    assert!(matches!(read_zone_tree(xml), Err(Error::Deserialize(_))));
}

#[test]
fn test_dangling_child_reference_fails_linking() {
    let xml = r#"<?xml version="1.0"?>
<zone-tree>
  <zone id="0" kind="unknown">
    <elements>0</elements>
    <children>7</children>
  </zone>
</zone-tree>"#;
    assert!(matches!(
        read_zone_tree(xml),
        Err(Error::MissingNode(NodeId(7)))
    ));
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let xml = r#"<?xml version="1.0"?>
<zone-tree>
  <zone id="0" kind="unknown"><elements>0</elements></zone>
  <zone id="0" kind="inline"><elements>1</elements></zone>
</zone-tree>"#;
    assert!(matches!(
        read_zone_tree(xml),
        Err(Error::DuplicateId(NodeId(0)))
    ));
}
