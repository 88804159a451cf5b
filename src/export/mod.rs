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

//! # Data Export Module
//!
//! This module turns graph elements into files: one file per label and
//! shard, each row aligned to the label's column registry.
//!
//! ## Module Components
//!
//! - **Printer** ([printer.rs](printer/index.html)): Printer contract and lifecycle
//! - **CSV** ([csv.rs](csv/index.html)): CSV rows with optional typed headers, and read-back
//! - **JSON** ([json.rs](json/index.html)): JSON lines
//! - **Target** ([target.rs](target/index.html)): Directory layout, sinks and printer creation
//! - **Writer** ([writer.rs](writer/index.html)): Per-label file writers
//! - **Manifest** ([manifest.rs](manifest/index.html)): Inventory of written files
//!
//! ## Supported Outputs
//!
//! - **file**: Plain files under the export root
//! - **stdout**: Standard output, nothing written to disk; each header line
//!   or row reaches the stream whole
//! - **gzip** / **zstd**: Compressed files (with the `compression` feature)
//!
//! ## Usage Patterns
//!
//! ```rust
//! use std::sync::Arc;
//! use gxport::export::{GxExportDirectories, GxFormat, GxOutput, GxTargetConfig};
//!
//! let config = GxTargetConfig::new(
//!     Arc::new(GxExportDirectories::new("out")),
//!     GxFormat::Csv,
//!     GxOutput::File,
//! );
//! let mut target = config.create_printer_for_nodes("Person", 0, schema)?;
//! target.printer.print_header_mandatory_columns(&["~id", "~label"])?;
//! ```

pub mod csv;
pub mod json;
pub mod manifest;
pub mod printer;
pub mod target;
pub mod writer;

pub use self::csv::{read_exported_csv, GxCsvPrinter, GxCsvRecord, GxCsvRow};
pub use self::json::GxJsonPrinter;
pub use manifest::{compute_file_hash, GxManifest, GxManifestFile, MANIFEST_FILE_NAME};
pub use printer::{GxOutputSink, GxPrinter, GxPrinterState, LINE_SEPARATOR};
pub use target::{
    sanitize_file_name, GxDirectories, GxExportDirectories, GxFormat, GxOutput, GxRecordSink,
    GxShardTarget, GxSink, GxTargetConfig,
};
pub use writer::{
    GxElement, GxElementKind, GxElementWriter, GxFileStats, GxLabelWriters, GxWriteStats,
};
