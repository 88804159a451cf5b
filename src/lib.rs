//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Gxport.
//! The Gxport project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Gxport Core Library
//!
//! This is the main library entry point for Gxport, a property graph
//! exporter. It writes nodes, edges and query results as CSV or JSON lines
//! files in which every row of a file has the same columns, even though
//! each element carries its own property set.
//!
//! ## Module Overview
//!
//! - **record**: Nodes, edges, query rows and their property values
//! - **schema**: Data types, column type info and per-label column registries
//! - **export**: Printers, output targets, element writers and the manifest
//! - **source**: Sharded, repeatable element inputs
//! - **config**: Export configuration loaded from JSON or YAML
//! - **job**: The two-pass export job
//!
//! ## Feature Flags
//!
//! - `parallel`: Scans and writes shards concurrently with Rayon
//! - `compression`: Gzip and Zstandard file outputs
//! - `full`: Enables all features (default)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gxport::{GxExportConfig, GxExportJob, GxInMemorySource, GxNode, GxEdge};
//!
//! let nodes = vec![
//!     GxNode::new("n1", "Person").with_property("name", "Alice").with_property("age", 30),
//!     GxNode::new("n2", "Person").with_property("name", "Bob"),
//! ];
//! let edges = vec![GxEdge::new("e1", "KNOWS", "n1", "n2").with_property("since", 2020)];
//!
//! let job = GxExportJob::new(GxExportConfig::new("out"));
//! let report = job.export_graph(&GxInMemorySource::single(nodes), &GxInMemorySource::single(edges))?;
//! // out/nodes/Person-0.csv:
//! // ~id,~label,name,age
//! // n1,Person,Alice,30
//! // n2,Person,Bob,
//! # Ok::<(), gxport::GxError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Scan**: Every shard is read once to build the column registry of each label
//! 2. **Freeze**: Registries are shared read-only with the writers
//! 3. **Write**: Each shard writes its own file per label through a printer
//! 4. **Manifest**: Written files are hashed and listed in `manifest.json`
//!
//! A registry saved from the scan pass (an export config) can be edited and
//! fed back to skip step 1.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, GxError>`. Type conflicts between
//! observations of the same property are reported, never coerced.

pub mod config;
pub mod errors;
pub mod export;
pub mod job;
pub mod record;
pub mod schema;
pub mod source;

pub use config::GxExportConfig;
pub use errors::{GxError, Result};
pub use export::{
    compute_file_hash, read_exported_csv, GxCsvPrinter, GxCsvRecord, GxDirectories,
    GxElement, GxElementKind, GxElementWriter, GxExportDirectories, GxFileStats, GxFormat,
    GxJsonPrinter, GxLabelWriters, GxManifest, GxManifestFile, GxOutput, GxPrinter,
    GxPrinterState, GxRecordSink, GxShardTarget, GxTargetConfig, GxWriteStats,
};
pub use job::{GxExportJob, GxExportReport};
pub use record::{GxEdge, GxNode, GxPropertyKey, GxPropertyMap, GxPropertyValue, GxQueryRow, GxScalar};
pub use schema::{
    freeze_label_schemas, GxDataType, GxFrozenSchemas, GxGraphSchema, GxLabelSchemas,
    GxPropertyTypeInfo, GxSchema,
};
pub use source::{GxElementSource, GxInMemorySource, GxJsonlSource};
