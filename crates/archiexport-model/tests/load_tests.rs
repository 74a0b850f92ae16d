//! Loading tests against a model shaped like Archi's own output

use std::fs;

use archiexport_model::{Bounds, Layer, Model, ModelError, ViewKind};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SAMPLE_MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<archimate:model xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:archimate="http://www.archimatetool.com/archimate" name="archiPKG" id="id-model" version="5.0.0">
  <folder name="Business" id="f-business" type="business">
    <element xsi:type="archimate:BusinessActor" name="Customer" id="e-customer"/>
    <element xsi:type="archimate:BusinessService" name="Order Service" id="e-order"/>
  </folder>
  <folder name="Application" id="f-app" type="application">
    <element xsi:type="archimate:ApplicationComponent" name="Web Shop" id="e-shop">
      <documentation>Public storefront</documentation>
    </element>
  </folder>
  <folder name="Relations" id="f-rel" type="relations">
    <element xsi:type="archimate:ServingRelationship" id="r-1" source="e-order" target="e-customer"/>
  </folder>
  <folder name="Views" id="f-views" type="diagrams">
    <element xsi:type="archimate:ArchimateDiagramModel" name="Layer 1" id="v-1">
      <child xsi:type="archimate:DiagramObject" id="n-customer" archimateElement="e-customer">
        <bounds x="24" y="36" width="120" height="55"/>
      </child>
      <child xsi:type="archimate:Group" id="n-group" name="Shop">
        <bounds x="200" y="100" width="300" height="200"/>
        <child xsi:type="archimate:DiagramObject" id="n-order" name="" archimateElement="e-order">
          <bounds x="20" y="30"/>
          <sourceConnection xsi:type="archimate:Connection" id="c-1" source="n-order" target="n-customer" archimateRelationship="r-1"/>
        </child>
      </child>
    </element>
    <element xsi:type="archimate:ArchimateDiagramModel" name="Layer-2!" id="v-2"/>
    <element xsi:type="archimate:SketchModel" name="Layer_1" id="v-3"/>
    <element xsi:type="archimate:ArchimateDiagramModel" id="v-4">
      <child xsi:type="archimate:DiagramObject" id="n-shop" archimateElement="e-shop" name="Shop Frontend">
        <bounds x="0" y="0" width="140" height="60"/>
      </child>
    </element>
  </folder>
</archimate:model>
"#;

fn write_sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("archiPKG.archimate");
    fs::write(&path, SAMPLE_MODEL).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);

    let model = Model::load(&path).unwrap();
    assert_eq!(model.name, "archiPKG");
    assert_eq!(model.path, path);
    assert_eq!(model.element_count(), 4);
    model.close();
}

#[test]
fn test_views_keep_document_order() {
    let model = Model::parse(SAMPLE_MODEL.as_bytes(), "sample.archimate").unwrap();
    let names: Vec<&str> = model.all_views().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Layer 1", "Layer-2!", "Layer_1", "Untitled"]);

    let kinds: Vec<ViewKind> = model.all_views().iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ViewKind::ArchimateDiagram,
            ViewKind::ArchimateDiagram,
            ViewKind::Sketch,
            ViewKind::ArchimateDiagram
        ]
    );
}

#[test]
fn test_nested_bounds_are_absolute() {
    let model = Model::parse(SAMPLE_MODEL.as_bytes(), "sample.archimate").unwrap();
    let view = model.view_by_name("Layer 1").unwrap();

    let order = view.find_node("n-order").unwrap();
    // (200,100) group origin + (20,30) relative offset, default size
    assert_eq!(order.bounds, Bounds::new(220.0, 130.0, 120.0, 55.0));
    assert_eq!(view.node_count(), 3);
}

#[test]
fn test_labels_resolve_through_elements() {
    let model = Model::parse(SAMPLE_MODEL.as_bytes(), "sample.archimate").unwrap();
    let view = model.view_by_name("Layer 1").unwrap();

    let customer = view.find_node("n-customer").unwrap();
    assert_eq!(customer.label, "Customer");
    assert_eq!(customer.element_type, "BusinessActor");
    assert_eq!(customer.layer(), Layer::Business);

    // Empty own name falls back to the element name
    let order = view.find_node("n-order").unwrap();
    assert_eq!(order.label, "Order Service");

    let group = view.find_node("n-group").unwrap();
    assert_eq!(group.label, "Shop");
    assert_eq!(group.element_type, "Group");
    assert_eq!(group.layer(), Layer::Other);

    // Own name wins over the element name
    let shop = model.all_views()[3].find_node("n-shop").unwrap();
    assert_eq!(shop.label, "Shop Frontend");
    assert_eq!(shop.layer(), Layer::Application);
}

#[test]
fn test_connections_collected_on_view() {
    let model = Model::parse(SAMPLE_MODEL.as_bytes(), "sample.archimate").unwrap();
    let view = model.view_by_name("Layer 1").unwrap();

    assert_eq!(view.connections.len(), 1);
    let conn = &view.connections[0];
    assert_eq!(conn.source, "n-order");
    assert_eq!(conn.target, "n-customer");
    assert_eq!(conn.relationship_ref.as_deref(), Some("r-1"));
}

#[test]
fn test_empty_views() {
    let model = Model::parse(SAMPLE_MODEL.as_bytes(), "sample.archimate").unwrap();
    let view = model.view_by_name("Layer-2!").unwrap();
    assert!(view.is_empty());
    assert_eq!(view.node_count(), 0);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Model::load(dir.path().join("missing.archimate"));
    assert!(matches!(result, Err(ModelError::NotFound(_))));
}

#[test]
fn test_load_malformed_xml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.archimate");
    fs::write(
        &path,
        r#"<archimate:model xmlns:archimate="x"><folder></model>"#,
    )
    .unwrap();

    let result = Model::load(&path);
    assert!(matches!(result, Err(ModelError::Xml(_))));
}
