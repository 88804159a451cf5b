//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Gxport.
//! The Gxport project belongs to the Dunimd project team.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use gxport::export::LINE_SEPARATOR;
use gxport::{
    read_exported_csv, GxCsvPrinter, GxEdge, GxGraphSchema, GxJsonPrinter, GxNode, GxPrinter,
    GxPrinterState, GxPropertyValue, GxRecordSink, GxSchema,
};
use proptest::prelude::*;

fn print_nodes(printer: &mut dyn GxPrinter, schema: &GxSchema, nodes: &[GxNode]) {
    printer.print_header_mandatory_columns(&["~id", "~label"]).unwrap();
    printer
        .print_header_remaining_columns(schema.columns_in_order())
        .unwrap();
    for node in nodes {
        printer.print_start_row().unwrap();
        printer.print_node(&node.id, &node.label).unwrap();
        printer.print_properties(&node.properties).unwrap();
        printer.print_end_row().unwrap();
    }
    printer.close().unwrap();
}

fn person_schema(nodes: &[GxNode]) -> Arc<GxSchema> {
    let mut graph = GxGraphSchema::new();
    for node in nodes {
        graph.record_node(node).unwrap();
    }
    Arc::new(graph.node_schema("Person").cloned().unwrap_or_default())
}

fn csv_text(nodes: &[GxNode], type_definitions: bool) -> String {
    let schema = person_schema(nodes);
    let mut printer =
        GxCsvPrinter::new(Vec::new(), Arc::clone(&schema)).with_type_definitions(type_definitions);
    print_nodes(&mut printer, &schema, nodes);
    assert_eq!(printer.state(), GxPrinterState::Closed);
    String::from_utf8(printer.into_inner()).unwrap()
}

fn sample_nodes() -> Vec<GxNode> {
    vec![
        GxNode::new("n1", "Person")
            .with_property("name", "Alice")
            .with_property("age", 30),
        GxNode::new("n2", "Person").with_property("name", "Bob"),
    ]
}

#[test]
fn test_nodes_export_aligns_missing_properties() {
    let text = csv_text(&sample_nodes(), false);
    let expected = ["~id,~label,name,age", "n1,Person,Alice,30", "n2,Person,Bob,"]
        .map(|line| format!("{line}{LINE_SEPARATOR}"))
        .concat();
    assert_eq!(text, expected);
}

#[test]
fn test_edge_export_writes_endpoints() {
    let edge = GxEdge::new("e1", "KNOWS", "n1", "n2").with_property("since", 2020);
    let mut graph = GxGraphSchema::new();
    graph.record_edge(&edge).unwrap();
    let schema = Arc::new(graph.edge_schema("KNOWS").cloned().unwrap());

    let mut printer = GxCsvPrinter::new(Vec::new(), Arc::clone(&schema));
    printer
        .print_header_mandatory_columns(&["~id", "~label", "~from", "~to"])
        .unwrap();
    printer
        .print_header_remaining_columns(schema.columns_in_order())
        .unwrap();
    printer.print_start_row().unwrap();
    printer.print_edge("e1", "KNOWS", "n1", "n2").unwrap();
    printer.print_properties(&edge.properties).unwrap();
    printer.print_end_row().unwrap();
    printer.close().unwrap();

    let text = String::from_utf8(printer.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["~id,~label,~from,~to,since", "e1,KNOWS,n1,n2,2020"]);
}

#[test]
fn test_list_property_exports_as_one_cell() {
    let nodes = vec![GxNode::new("n1", "Person").with_property("tags", GxPropertyValue::sequence(["a", "b"]))];
    let text = csv_text(&nodes, true);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["~id,~label,tags:String[]", "n1,Person,\"a;b\""]);
}

#[test]
fn test_repeated_exports_are_byte_identical() {
    assert_eq!(csv_text(&sample_nodes(), true), csv_text(&sample_nodes(), true));
}

#[test]
fn test_absent_property_matches_node_without_it() {
    let with_other = vec![
        GxNode::new("n1", "Person").with_property("age", 30),
        GxNode::new("n2", "Person").with_property("name", "Bob"),
    ];
    let text = csv_text(&with_other, false);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "n1,Person,30,");
    assert_eq!(lines[2], "n2,Person,,Bob");
}

#[test]
fn test_csv_read_back_restores_properties() {
    let nodes = vec![
        GxNode::new("n1", "Person")
            .with_property("tags", GxPropertyValue::sequence(["x;y", "z"]))
            .with_property("note", "line\nbreak, \"quoted\""),
        GxNode::new("n2", "Person").with_property("tags", GxPropertyValue::sequence(["w"])),
    ];
    let schema = person_schema(&nodes);
    let text = csv_text(&nodes, false);

    let records = read_exported_csv(text.as_bytes(), &schema, 2, true).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].properties, nodes[0].properties);
    assert_eq!(records[1].properties, nodes[1].properties);
}

#[test]
fn test_json_printer_writes_one_object_per_row() {
    let nodes = sample_nodes();
    let schema = person_schema(&nodes);
    let mut printer = GxJsonPrinter::new(Vec::new(), Arc::clone(&schema));
    print_nodes(&mut printer, &schema, &nodes);

    let text = String::from_utf8(printer.into_inner()).unwrap();
    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["age"], 30);
    assert_eq!(rows[1]["~id"], "n2");
    assert!(rows[1].get("age").is_none());
}

/// One byte stream written by several printers, the way stdout is.
#[derive(Clone, Default)]
struct SharedStream(Arc<Mutex<Vec<u8>>>);

impl Write for SharedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_labels_sharing_one_stream_keep_whole_rows() {
    let pad = "x".repeat(64);
    let nodes: Vec<GxNode> = (0..400)
        .map(|i| {
            let label = if i % 2 == 0 { "AAAA" } else { "BBBB" };
            GxNode::new(format!("id{i:05}"), label).with_property("pad", pad.as_str())
        })
        .collect();
    let mut graph = GxGraphSchema::new();
    for node in &nodes {
        graph.record_node(node).unwrap();
    }

    let stream = SharedStream::default();
    let mut printers: Vec<(&str, GxCsvPrinter<GxRecordSink<SharedStream>>)> = ["AAAA", "BBBB"]
        .into_iter()
        .map(|label| {
            let schema = Arc::new(graph.node_schema(label).cloned().unwrap());
            (label, GxCsvPrinter::new(GxRecordSink::new(stream.clone()), schema))
        })
        .collect();

    for node in &nodes {
        let (_, printer) = printers
            .iter_mut()
            .find(|(label, _)| *label == node.label)
            .unwrap();
        if printer.state() == GxPrinterState::Idle {
            printer.print_header_mandatory_columns(&["~id", "~label"]).unwrap();
            let schema = Arc::clone(printer.schema());
            printer.print_header_remaining_columns(schema.columns_in_order()).unwrap();
        }
        printer.print_start_row().unwrap();
        printer.print_node(&node.id, &node.label).unwrap();
        printer.print_properties(&node.properties).unwrap();
        printer.print_end_row().unwrap();
    }
    for (_, printer) in &mut printers {
        printer.close().unwrap();
    }

    let bytes = stream.0.lock().unwrap().clone();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes.as_slice());
    let mut headers = 0;
    let mut rows = 0;
    for record in reader.records() {
        let record = record.unwrap();
        assert_eq!(record.len(), 3);
        if &record[0] == "~id" {
            headers += 1;
            assert_eq!(&record[2], "pad");
        } else {
            rows += 1;
            assert!(record[0].starts_with("id"));
            assert!(matches!(&record[1], "AAAA" | "BBBB"));
            assert_eq!(&record[2], pad.as_str());
        }
    }
    assert_eq!((headers, rows), (2, 400));
}

#[test]
fn test_float_in_double_column_prints_the_same_in_csv_and_json() {
    let nodes = vec![
        GxNode::new("n1", "Person").with_property("score", 0.1f32),
        GxNode::new("n2", "Person").with_property("score", 2.5f64),
    ];
    let schema = person_schema(&nodes);

    let csv_rows = csv_text(&nodes, true);
    let lines: Vec<&str> = csv_rows.lines().collect();
    let widened = f64::from(0.1f32);
    assert_eq!(lines[0], "~id,~label,score:Double");
    assert_eq!(lines[1], format!("n1,Person,{widened}"));

    let mut printer = GxJsonPrinter::new(Vec::new(), Arc::clone(&schema));
    print_nodes(&mut printer, &schema, &nodes);
    let text = String::from_utf8(printer.into_inner()).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["score"].as_f64(), Some(widened));
    assert_eq!(lines[1].rsplit(',').next().unwrap().parse::<f64>().unwrap(), widened);
}

fn node_strategy() -> impl Strategy<Value = GxNode> {
    (
        "[a-z0-9,\"]{1,8}",
        proptest::option::of(any::<i32>()),
        proptest::option::of("\\PC{0,12}"),
        proptest::option::of(proptest::collection::vec("[a-z;\\\\]{0,4}", 0..4)),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(id, age, name, tags, active)| {
            let mut node = GxNode::new(id, "Person");
            if let Some(age) = age {
                node.properties.insert("age", age);
            }
            if let Some(name) = name {
                node.properties.insert("name", name);
            }
            if let Some(tags) = tags {
                node.properties.insert("tags", GxPropertyValue::sequence(tags));
            }
            if let Some(active) = active {
                node.properties.insert("active", active);
            }
            node
        })
}

proptest! {
    #[test]
    fn test_every_row_has_the_header_width(nodes in proptest::collection::vec(node_strategy(), 0..16)) {
        let text = csv_text(&nodes, true);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let width = reader.headers().unwrap().len();
        prop_assert_eq!(width, 2 + person_schema(&nodes).len());

        let mut rows = 0;
        for record in reader.records() {
            prop_assert_eq!(record.unwrap().len(), width);
            rows += 1;
        }
        prop_assert_eq!(rows, nodes.len());
    }
}
