//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Gxport.
//! The Gxport project belongs to the Dunimd project team.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gxport::export::MANIFEST_FILE_NAME;
use gxport::{
    compute_file_hash, GxDirectories, GxEdge, GxError, GxExportConfig, GxExportJob, GxGraphSchema,
    GxInMemorySource, GxJsonlSource, GxManifest, GxNode, GxPropertyTypeInfo, GxSchema,
};

fn nodes() -> Vec<GxNode> {
    vec![
        GxNode::new("n1", "Person")
            .with_property("name", "Alice")
            .with_property("age", 30),
        GxNode::new("c1", "City").with_property("name", "Paris"),
        GxNode::new("n2", "Person").with_property("name", "Bob"),
        GxNode::new("n3", "Person")
            .with_property("age", 41)
            .with_property("email", "carol@example.com"),
    ]
}

fn edges() -> Vec<GxEdge> {
    vec![
        GxEdge::new("e1", "KNOWS", "n1", "n2").with_property("since", 2020),
        GxEdge::new("e2", "LIVES_IN", "n1", "c1"),
    ]
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_export_graph_writes_files_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::new(GxExportConfig::new(dir.path()));

    let report = job
        .export_graph(
            &GxInMemorySource::split(nodes(), 2),
            &GxInMemorySource::single(edges()),
        )
        .unwrap();

    assert_eq!(report.stats.records_written, 6);
    assert_eq!(
        lines(&dir.path().join("nodes").join("Person-0.csv")),
        vec!["~id,~label,name,age,email", "n1,Person,Alice,30,"]
    );
    assert_eq!(
        lines(&dir.path().join("nodes").join("Person-1.csv")),
        vec![
            "~id,~label,name,age,email",
            "n2,Person,Bob,,",
            "n3,Person,,41,carol@example.com"
        ]
    );
    assert_eq!(
        lines(&dir.path().join("edges").join("KNOWS-0.csv")),
        vec!["~id,~label,~from,~to,since", "e1,KNOWS,n1,n2,2020"]
    );

    let manifest_path = dir.path().join(MANIFEST_FILE_NAME);
    let manifest = GxManifest::from_json(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    assert_eq!(Some(&manifest), report.manifest.as_ref());
    assert_eq!(manifest.files.len(), report.files.len());
    assert_eq!(manifest.total_records, 6);
    for file in &manifest.files {
        let path = dir.path().join(&file.path);
        assert_eq!(file.hash, compute_file_hash(&path).unwrap());
        assert_eq!(file.size, fs::metadata(&path).unwrap().len());
    }
}

#[test]
fn test_parallel_and_sequential_exports_match() {
    let parallel_dir = tempfile::tempdir().unwrap();
    let sequential_dir = tempfile::tempdir().unwrap();

    for (dir, parallel) in [(&parallel_dir, true), (&sequential_dir, false)] {
        let job = GxExportJob::new(
            GxExportConfig::new(dir.path())
                .with_parallel(parallel)
                .with_manifest(false),
        );
        job.export_graph(
            &GxInMemorySource::split(nodes(), 4),
            &GxInMemorySource::split(edges(), 2),
        )
        .unwrap();
    }

    for relative in [
        "nodes/Person-0.csv",
        "nodes/City-1.csv",
        "nodes/Person-3.csv",
        "edges/LIVES_IN-1.csv",
    ] {
        assert_eq!(
            fs::read(parallel_dir.path().join(relative)).unwrap(),
            fs::read(sequential_dir.path().join(relative)).unwrap(),
            "{relative}"
        );
    }
    assert!(!parallel_dir.path().join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_saved_export_config_selects_columns() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::new(GxExportConfig::new(dir.path().join("out")));
    let node_source = GxInMemorySource::single(nodes());
    let edge_source = GxInMemorySource::single(edges());

    let config_path = dir.path().join("export-config.json");
    job.create_export_config(&node_source, &edge_source)
        .unwrap()
        .save(&config_path)
        .unwrap();

    let mut declared = GxGraphSchema::load(&config_path).unwrap();
    let person = declared.nodes["Person"].clone();
    declared.nodes.insert(
        "Person".to_string(),
        GxSchema::from_columns(vec![person.get("name").unwrap().clone()]).unwrap(),
    );

    job.export_graph_with_schema(&node_source, &edge_source, &declared)
        .unwrap();
    assert_eq!(
        lines(&dir.path().join("out").join("nodes").join("Person-0.csv")),
        vec!["~id,~label,name", "n1,Person,Alice", "n2,Person,Bob", "n3,Person,"]
    );
}

#[test]
fn test_type_conflict_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::new(GxExportConfig::new(dir.path()));
    let conflicting = vec![
        GxNode::new("n1", "Person").with_property("age", 30),
        GxNode::new("n2", "Person").with_property("age", "thirty"),
    ];

    let err = job
        .export_graph(
            &GxInMemorySource::single(conflicting),
            &GxInMemorySource::<GxEdge>::default(),
        )
        .unwrap_err();

    assert!(err.is_type_conflict());
    assert!(!dir.path().join("nodes").exists());
    assert!(!dir.path().join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_jsonl_shards_export_with_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir_all(&input).unwrap();
    fs::write(
        input.join("nodes-0.jsonl"),
        "{\"id\":\"n1\",\"label\":\"Post\",\"properties\":{\"tags\":[\"a\",\"b\"],\"score\":1.5}}\n",
    )
    .unwrap();
    fs::write(
        input.join("nodes-1.jsonl"),
        "\n{\"id\":\"n2\",\"label\":\"Post\",\"properties\":{\"score\":2}}\n",
    )
    .unwrap();
    let config_path = dir.path().join("export.yaml");
    fs::write(
        &config_path,
        format!(
            "root_directory: {}\ninclude_type_definitions: true\nwrite_manifest: false\n",
            dir.path().join("out").display()
        ),
    )
    .unwrap();

    let job = GxExportJob::new(GxExportConfig::load(&config_path).unwrap());
    let node_source: GxJsonlSource<GxNode> =
        GxJsonlSource::new([input.join("nodes-0.jsonl"), input.join("nodes-1.jsonl")]);
    let report = job
        .export_graph(&node_source, &GxInMemorySource::<GxEdge>::default())
        .unwrap();

    assert!(report.manifest.is_none());
    let out = dir.path().join("out").join("nodes");
    assert_eq!(
        lines(&out.join("Post-0.csv")),
        vec!["~id,~label,tags:String[],score:Double", "n1,Post,\"a;b\",1.5"]
    );
    assert_eq!(
        lines(&out.join("Post-1.csv")),
        vec!["~id,~label,tags:String[],score:Double", "n2,Post,,2"]
    );
}

/// Flat layout: every file directly under the root, named by lowercased label.
struct FlatDirectories {
    root: PathBuf,
}

impl GxDirectories for FlatDirectories {
    fn root_directory(&self) -> &Path {
        &self.root
    }

    fn results_directory(&self, _name: &str) -> PathBuf {
        self.root.clone()
    }

    fn edges_directory(&self) -> PathBuf {
        self.root.clone()
    }

    fn nodes_directory(&self) -> PathBuf {
        self.root.clone()
    }

    fn create_file_path(&self, directory: &Path, name: &str, index: usize, extension: &str) -> PathBuf {
        directory.join(format!("{}.{}.{}", name.to_lowercase(), index, extension))
    }
}

#[test]
fn test_custom_directories_control_file_paths() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::with_directories(
        GxExportConfig::new(dir.path()),
        Arc::new(FlatDirectories {
            root: dir.path().to_path_buf(),
        }),
    );

    let report = job
        .export_graph(
            &GxInMemorySource::single(nodes()),
            &GxInMemorySource::single(edges()),
        )
        .unwrap();

    assert!(dir.path().join("person.0.csv").exists());
    assert!(dir.path().join("lives_in.0.csv").exists());
    let manifest = report.manifest.unwrap();
    assert!(manifest.files.iter().any(|f| f.path == "city.0.csv"));
}

#[test]
fn test_labels_with_the_same_file_name_fail_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::new(GxExportConfig::new(dir.path()).with_parallel(false));
    let nodes = vec![
        GxNode::new("n1", "a b").with_property("x", 1),
        GxNode::new("n2", "a_b").with_property("y", "s"),
    ];

    let err = job
        .export_graph(
            &GxInMemorySource::single(nodes),
            &GxInMemorySource::<GxEdge>::default(),
        )
        .unwrap_err();

    assert!(matches!(err, GxError::Schema { .. }));
    assert!(err.to_string().contains("a_b-0.csv"), "{err}");
    assert!(!dir.path().join("nodes").exists());
    assert!(!dir.path().join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_node_and_edge_labels_sharing_a_flat_file_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::with_directories(
        GxExportConfig::new(dir.path()),
        Arc::new(FlatDirectories {
            root: dir.path().to_path_buf(),
        }),
    );

    let err = job
        .export_graph(
            &GxInMemorySource::single(vec![GxNode::new("n1", "Link")]),
            &GxInMemorySource::single(vec![GxEdge::new("e1", "LINK", "n1", "n1")]),
        )
        .unwrap_err();

    assert!(matches!(err, GxError::Schema { .. }));
    assert!(!dir.path().join("link.0.csv").exists());
}

#[test]
fn test_query_results_land_under_results_directory() {
    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::new(GxExportConfig::new(dir.path()));
    let rows = GxInMemorySource::single(vec![
        gxport::GxQueryRow::new()
            .with_property("label", "Person")
            .with_property("count", 3),
        gxport::GxQueryRow::new().with_property("label", "City"),
    ]);

    let schema = GxSchema::from_columns(vec![
        GxPropertyTypeInfo::declared("label", gxport::GxDataType::String, false),
        GxPropertyTypeInfo::declared("count", gxport::GxDataType::Long, false),
    ])
    .unwrap();
    let files = job.export_query_results("label counts", &rows, &schema).unwrap();

    assert_eq!(files[0].records, 2);
    assert_eq!(
        lines(&dir.path().join("results").join("label_counts").join("label_counts-0.csv")),
        vec!["label,count", "Person,3", "City,"]
    );
}

#[cfg(feature = "compression")]
#[test]
fn test_gzip_export_is_listed_in_manifest() {
    use std::io::Read;

    let dir = tempfile::tempdir().unwrap();
    let job = GxExportJob::new(GxExportConfig::new(dir.path()).with_output(gxport::GxOutput::Gzip));
    let report = job
        .export_graph(
            &GxInMemorySource::single(nodes()),
            &GxInMemorySource::<GxEdge>::default(),
        )
        .unwrap();

    let manifest = report.manifest.unwrap();
    assert!(manifest.files.iter().all(|f| f.path.ends_with(".csv.gz")));
    let mut text = String::new();
    flate2::read::GzDecoder::new(fs::File::open(dir.path().join("nodes").join("City-0.csv.gz")).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), vec!["~id,~label,name", "c1,City,Paris"]);
}
