//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Gxport.
//! The Gxport project belongs to the Dunimd project team.

use chrono::{TimeZone, Utc};
use gxport::{
    GxDataType, GxEdge, GxGraphSchema, GxNode, GxPropertyMap, GxPropertyTypeInfo,
    GxPropertyValue, GxScalar, GxSchema,
};

fn read_cell(cell: &str) -> String {
    let line = format!("{cell}\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());
    reader.records().next().unwrap().unwrap()[0].to_string()
}

#[test]
fn test_boundary_values_survive_a_csv_reader() {
    let cases = vec![
        (GxDataType::Int, GxScalar::Int(i32::MAX)),
        (GxDataType::Long, GxScalar::Long(i64::MIN)),
        (GxDataType::Double, GxScalar::Double(f64::MAX)),
        (GxDataType::Double, GxScalar::Double(f64::MIN_POSITIVE)),
        (GxDataType::String, GxScalar::String(String::new())),
        (GxDataType::String, "comma, \"quote\"\r\nbreak".into()),
        (GxDataType::Boolean, GxScalar::Bool(true)),
        (
            GxDataType::Date,
            GxScalar::Date(Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap()),
        ),
        (
            GxDataType::Date,
            GxScalar::Date(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap()),
        ),
        (
            GxDataType::Date,
            GxScalar::Date(Utc.with_ymd_and_hms(-1, 12, 31, 23, 59, 59).unwrap()),
        ),
        (GxDataType::Double, GxScalar::Double(f64::from(0.1f32))),
    ];

    for (data_type, value) in cases {
        let cell = data_type.format(&value).unwrap();
        let parsed = data_type.parse(&read_cell(&cell)).unwrap();
        assert_eq!(parsed, value, "cell {cell}");
    }
}

#[test]
fn test_dates_are_utc_rfc3339() {
    let date = GxScalar::Date(Utc.with_ymd_and_hms(2021, 7, 1, 8, 30, 0).unwrap());
    assert_eq!(GxDataType::Date.format(&date).unwrap(), "2021-07-01T08:30:00Z");
}

#[test]
fn test_dates_outside_four_digit_years_keep_their_sign() {
    let far_future = GxScalar::Date(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap());
    let far_past = GxScalar::Date(Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap());

    let future_cell = GxDataType::Date.format(&far_future).unwrap();
    let past_cell = GxDataType::Date.format(&far_past).unwrap();
    assert_eq!(future_cell, "+10000-01-01T00:00:00Z");
    assert_eq!(past_cell, "-0001-01-01T00:00:00Z");
    assert_eq!(GxDataType::Date.parse(&future_cell).unwrap(), far_future);
    assert_eq!(GxDataType::Date.parse(&past_cell).unwrap(), far_past);
    assert_eq!(
        GxDataType::Date.to_json(&far_future).unwrap(),
        serde_json::json!("+10000-01-01T00:00:00Z")
    );
}

#[test]
fn test_float_widened_into_double_column_keeps_its_value() {
    let mut graph = GxGraphSchema::new();
    graph
        .record_node(&GxNode::new("n1", "Reading").with_property("value", 0.1f32))
        .unwrap();
    graph
        .record_node(&GxNode::new("n2", "Reading").with_property("value", 2.5f64))
        .unwrap();
    let column = graph.node_schema("Reading").unwrap().get("value").unwrap().clone();
    assert_eq!(column.data_type(), GxDataType::Double);

    let cell = GxDataType::Double.format(&GxScalar::Float(0.1)).unwrap();
    assert_eq!(
        GxDataType::Double.parse(&read_cell(&cell)).unwrap(),
        GxScalar::Double(f64::from(0.1f32))
    );
}

#[test]
fn test_json_integer_beyond_long_is_malformed() {
    let err = GxScalar::from_json(&serde_json::json!(18446744073709551615u64)).unwrap_err();
    assert!(matches!(err, gxport::GxError::MalformedValue { .. }));
}

#[test]
fn test_list_cell_is_distinct_from_scalar_cell() {
    let scalar = GxDataType::String.format(&"a".into()).unwrap();
    let list = GxDataType::String.format_list(&["a".into()]).unwrap();
    assert_eq!(scalar, "a");
    assert_eq!(list, "\"a\"");

    let pair = GxDataType::String.format_list(&["a".into(), "b".into()]).unwrap();
    assert_eq!(pair, "\"a;b\"");
    assert_eq!(
        GxDataType::String.parse_list(&read_cell(&pair)).unwrap(),
        vec![GxScalar::from("a"), GxScalar::from("b")]
    );
}

#[test]
fn test_registry_keeps_first_seen_order() {
    let mut schema = GxSchema::new();
    for props in [
        GxPropertyMap::from_iter([("b", 1)]),
        GxPropertyMap::from_iter([("a", 2), ("b", 3)]),
        GxPropertyMap::from_iter([("c", 4)]),
    ] {
        schema.record_observed_keys(&props).unwrap();
    }

    let names: Vec<&str> = schema
        .columns_in_order()
        .iter()
        .map(GxPropertyTypeInfo::name_without_data_type)
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn test_registry_reports_type_conflict() {
    let mut graph = GxGraphSchema::new();
    graph
        .record_node(&GxNode::new("n1", "Person").with_property("age", 30))
        .unwrap();
    let err = graph
        .record_node(&GxNode::new("n2", "Person").with_property("age", "thirty"))
        .unwrap_err();

    assert!(err.is_type_conflict());
    assert!(err.to_string().contains("age"));
}

#[test]
fn test_multi_value_columns_are_annotated() {
    let mut graph = GxGraphSchema::new();
    graph
        .record_node(
            &GxNode::new("n1", "Post")
                .with_property("tags", GxPropertyValue::sequence(["a", "b"]))
                .with_property("score", 1.5f32),
        )
        .unwrap();
    let schema = graph.node_schema("Post").unwrap();

    let headers: Vec<String> = schema
        .columns_in_order()
        .iter()
        .map(GxPropertyTypeInfo::name_with_data_type)
        .collect();
    assert_eq!(headers, vec!["tags:String[]", "score:Float"]);
}

#[test]
fn test_export_config_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("export.json");

    let mut graph = GxGraphSchema::new();
    graph
        .record_node(&GxNode::new("n1", "Person").with_property("name", "Alice"))
        .unwrap();
    graph
        .record_edge(&GxEdge::new("e1", "KNOWS", "n1", "n2").with_property("since", 2020))
        .unwrap();
    graph.save(&path).unwrap();

    let loaded = GxGraphSchema::load(&path).unwrap();
    assert_eq!(loaded, graph);
    assert_eq!(
        loaded.edge_schema("KNOWS").unwrap().get("since").unwrap().data_type(),
        GxDataType::Int
    );
}

#[test]
fn test_declared_columns_default_to_untyped() {
    let json = r#"{"nodes": {"Person": [{"property": "name", "dataType": "String"}, {"property": "nick"}]}}"#;
    let graph = GxGraphSchema::from_json(json).unwrap();
    let schema = graph.node_schema("Person").unwrap();

    assert_eq!(schema.len(), 2);
    assert_eq!(schema.get("nick").unwrap().data_type(), GxDataType::None);
    assert_eq!(schema.get("nick").unwrap().name_with_data_type(), "nick:String");
    assert!(graph.edges.is_empty());
}
