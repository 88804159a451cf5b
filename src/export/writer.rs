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

//! # Element Writer Module
//!
//! Drives printers for whole files of nodes, edges or query rows.
//!
//! A [`GxElementWriter`] owns one file: it writes the header on creation and
//! one row per handled element. [`GxLabelWriters`] fans the elements of one
//! shard out to one writer per label, opening files on first use. Two labels
//! never share a file: a label whose path is already taken is rejected
//! before the file is created.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{GxError, Result};
use crate::export::printer::GxPrinter;
use crate::export::target::{GxShardTarget, GxTargetConfig};
use crate::record::{GxEdge, GxNode, GxPropertyMap, GxQueryRow};
use crate::schema::{GxFrozenSchemas, GxSchema};

pub const NODE_IDENTITY_COLUMNS: &[&str] = &["~id", "~label"];
pub const EDGE_IDENTITY_COLUMNS: &[&str] = &["~id", "~label", "~from", "~to"];

/// Element kind of an output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GxElementKind {
    Nodes,
    Edges,
    Queries,
}

impl GxElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GxElementKind::Nodes => "nodes",
            GxElementKind::Edges => "edges",
            GxElementKind::Queries => "queries",
        }
    }
}

/// A record that can be written as one row.
pub trait GxElement: Send + Sync {
    const KIND: GxElementKind;

    /// Header names of the identity cells, in row order.
    fn identity_columns() -> &'static [&'static str];

    /// Label routing the element to a file. Query rows have none and are
    /// routed by query name.
    fn label(&self) -> Option<&str>;

    fn properties(&self) -> &GxPropertyMap;

    fn print_identity(&self, printer: &mut dyn GxPrinter) -> Result<()>;
}

impl GxElement for GxNode {
    const KIND: GxElementKind = GxElementKind::Nodes;

    fn identity_columns() -> &'static [&'static str] {
        NODE_IDENTITY_COLUMNS
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn properties(&self) -> &GxPropertyMap {
        &self.properties
    }

    fn print_identity(&self, printer: &mut dyn GxPrinter) -> Result<()> {
        printer.print_node(&self.id, &self.label)
    }
}

impl GxElement for GxEdge {
    const KIND: GxElementKind = GxElementKind::Edges;

    fn identity_columns() -> &'static [&'static str] {
        EDGE_IDENTITY_COLUMNS
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn properties(&self) -> &GxPropertyMap {
        &self.properties
    }

    fn print_identity(&self, printer: &mut dyn GxPrinter) -> Result<()> {
        printer.print_edge(&self.id, &self.label, &self.from, &self.to)
    }
}

impl GxElement for GxQueryRow {
    const KIND: GxElementKind = GxElementKind::Queries;

    fn identity_columns() -> &'static [&'static str] {
        &[]
    }

    fn label(&self) -> Option<&str> {
        None
    }

    fn properties(&self) -> &GxPropertyMap {
        &self.properties
    }

    fn print_identity(&self, _printer: &mut dyn GxPrinter) -> Result<()> {
        Ok(())
    }
}

/// Result of one closed output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GxFileStats {
    pub kind: GxElementKind,
    pub name: String,
    pub shard: usize,
    pub path: PathBuf,
    pub records: usize,
}

/// Totals over a set of files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GxWriteStats {
    pub records_written: usize,
    pub files_created: usize,
}

impl GxWriteStats {
    pub fn from_files(files: &[GxFileStats]) -> Self {
        GxWriteStats {
            records_written: files.iter().map(|f| f.records).sum(),
            files_created: files.len(),
        }
    }
}

/// Writes the elements of one label and shard to one file.
pub struct GxElementWriter<E: GxElement> {
    name: String,
    shard: usize,
    target: GxShardTarget,
    records: usize,
    _element: std::marker::PhantomData<fn(&E)>,
}

impl<E: GxElement> GxElementWriter<E> {
    /// Opens the file for `name` and writes its header.
    pub fn open(
        config: &GxTargetConfig,
        name: &str,
        shard: usize,
        schema: Arc<GxSchema>,
    ) -> Result<Self> {
        let mut target = match E::KIND {
            GxElementKind::Nodes => config.create_printer_for_nodes(name, shard, Arc::clone(&schema)),
            GxElementKind::Edges => config.create_printer_for_edges(name, shard, Arc::clone(&schema)),
            GxElementKind::Queries => {
                config.create_printer_for_queries(name, shard, Arc::clone(&schema))
            }
        }?;
        if let Err(err) = write_header(target.printer.as_mut(), E::identity_columns(), &schema) {
            if let Err(close_err) = target.printer.close() {
                log::warn!("Failed to close {}: {}", target.path.display(), close_err);
            }
            return Err(err);
        }
        Ok(GxElementWriter {
            name: name.to_string(),
            shard,
            target,
            records: 0,
            _element: std::marker::PhantomData,
        })
    }

    pub fn handle(&mut self, element: &E) -> Result<()> {
        let printer = self.target.printer.as_mut();
        printer.print_start_row()?;
        element.print_identity(printer)?;
        printer.print_properties(element.properties())?;
        printer.print_end_row()?;
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn close(mut self) -> Result<GxFileStats> {
        self.target.printer.close()?;
        log::debug!(
            "Closed {} ({} records)",
            self.target.path.display(),
            self.records
        );
        Ok(GxFileStats {
            kind: E::KIND,
            name: self.name,
            shard: self.shard,
            path: self.target.path,
            records: self.records,
        })
    }
}

fn write_header(printer: &mut dyn GxPrinter, identity: &[&str], schema: &GxSchema) -> Result<()> {
    if !identity.is_empty() {
        printer.print_header_mandatory_columns(identity)?;
    }
    printer.print_header_remaining_columns(schema.columns_in_order())
}

/// One writer per label for the elements of one shard.
pub struct GxLabelWriters<E: GxElement> {
    config: GxTargetConfig,
    schemas: Arc<GxFrozenSchemas>,
    query_name: Option<String>,
    shard: usize,
    writers: BTreeMap<String, GxElementWriter<E>>,
    paths: HashMap<PathBuf, String>,
}

impl<E: GxElement> GxLabelWriters<E> {
    pub fn new(config: GxTargetConfig, schemas: Arc<GxFrozenSchemas>, shard: usize) -> Self {
        GxLabelWriters {
            config,
            schemas,
            query_name: None,
            shard,
            writers: BTreeMap::new(),
            paths: HashMap::new(),
        }
    }

    /// Writers for the rows of one named query, which all share `schema`.
    pub fn for_query(
        config: GxTargetConfig,
        name: &str,
        schema: Arc<GxSchema>,
        shard: usize,
    ) -> Self {
        let mut schemas = GxFrozenSchemas::new();
        schemas.insert(name.to_string(), schema);
        GxLabelWriters {
            config,
            schemas: Arc::new(schemas),
            query_name: Some(name.to_string()),
            shard,
            writers: BTreeMap::new(),
            paths: HashMap::new(),
        }
    }

    pub fn handle(&mut self, element: &E) -> Result<()> {
        let name = element
            .label()
            .or(self.query_name.as_deref())
            .ok_or_else(|| GxError::validation(format!("{} element has no label", E::KIND.as_str())))?;
        if !self.writers.contains_key(name) {
            let schema = self.schemas.get(name).ok_or_else(|| {
                GxError::schema(format!("no schema for {} label '{}'", E::KIND.as_str(), name))
            })?;
            let schema = Arc::clone(schema);
            if self.config.output().is_file_backed() {
                let path = self.config.file_path(E::KIND, name, self.shard);
                if let Some(other) = self.paths.get(&path) {
                    return Err(GxError::schema(format!(
                        "{} labels '{}' and '{}' both resolve to {}",
                        E::KIND.as_str(),
                        other,
                        name,
                        path.display()
                    )));
                }
                self.paths.insert(path, name.to_string());
            }
            let writer = GxElementWriter::open(&self.config, name, self.shard, schema)?;
            self.writers.insert(name.to_string(), writer);
        }
        match self.writers.get_mut(name) {
            Some(writer) => writer.handle(element),
            None => Err(GxError::internal(format!("writer for '{name}' was not opened"))),
        }
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// Closes every writer, even after a failure, and reports the first
    /// error.
    pub fn close_all(self) -> Result<Vec<GxFileStats>> {
        let mut files = Vec::with_capacity(self.writers.len());
        let mut first_error = None;
        for (label, writer) in self.writers {
            match writer.close() {
                Ok(stats) => files.push(stats),
                Err(err) => {
                    log::warn!("Failed to close writer for label '{}': {}", label, err);
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(files),
        }
    }
}
