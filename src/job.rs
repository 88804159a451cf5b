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

//! # Export Job Module
//!
//! Runs a whole export in two passes.
//!
//! The scan pass visits every shard and builds one column registry per
//! label. Shards are scanned independently and their registries merged in
//! shard order, so column order does not depend on scheduling. The write
//! pass freezes the registries and gives each shard its own writers. Before
//! any file is created the job resolves the path of every label and shard and
//! fails if two of them coincide.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use gxport::{GxExportConfig, GxExportJob, GxInMemorySource};
//!
//! let job = GxExportJob::new(GxExportConfig::new("out"));
//! let report = job.export_graph(&GxInMemorySource::single(nodes), &GxInMemorySource::single(edges))?;
//! println!("{} records in {} files", report.stats.records_written, report.stats.files_created);
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::GxExportConfig;
use crate::errors::{GxError, Result};
use crate::export::manifest::{GxManifest, MANIFEST_FILE_NAME};
use crate::export::target::{GxDirectories, GxTargetConfig};
use crate::export::writer::{GxElement, GxElementKind, GxFileStats, GxLabelWriters, GxWriteStats};
use crate::record::{GxEdge, GxNode, GxQueryRow};
use crate::schema::{
    freeze_label_schemas, merge_label_schemas, GxGraphSchema, GxLabelSchemas, GxSchema,
};
use crate::source::GxElementSource;

/// Outcome of a graph export.
#[derive(Clone, Debug, Serialize)]
pub struct GxExportReport {
    pub schema: GxGraphSchema,
    pub files: Vec<GxFileStats>,
    pub stats: GxWriteStats,
    /// Present when a manifest was written.
    pub manifest: Option<GxManifest>,
}

pub struct GxExportJob {
    config: GxExportConfig,
    target: GxTargetConfig,
}

impl GxExportJob {
    pub fn new(config: GxExportConfig) -> Self {
        let target = config.target_config();
        GxExportJob { config, target }
    }

    /// A job writing through a custom directory layout.
    pub fn with_directories(config: GxExportConfig, directories: Arc<dyn GxDirectories>) -> Self {
        let target = GxTargetConfig::new(directories, config.format, config.output)
            .with_headers(config.include_headers)
            .with_type_definitions(config.include_type_definitions);
        GxExportJob { config, target }
    }

    pub fn config(&self) -> &GxExportConfig {
        &self.config
    }

    pub fn target_config(&self) -> &GxTargetConfig {
        &self.target
    }

    /// Builds the registries of every label in `source`.
    pub fn scan<E: GxElement>(&self, source: &dyn GxElementSource<E>) -> Result<GxLabelSchemas> {
        let shards = self.run_shards(source.shard_count(), |index| scan_shard(source, index));
        let mut merged = GxLabelSchemas::new();
        for shard in shards {
            merge_label_schemas(&mut merged, &shard?)?;
        }
        log::debug!(
            "Scanned {} shards of {}: {} labels",
            source.shard_count(),
            E::KIND.as_str(),
            merged.len()
        );
        Ok(merged)
    }

    /// Builds the single registry shared by the rows of a query.
    pub fn scan_query_results(&self, source: &dyn GxElementSource<GxQueryRow>) -> Result<GxSchema> {
        Ok(self.scan(source)?.remove("").unwrap_or_default())
    }

    /// Scans nodes and edges without writing anything. The result can be
    /// saved and later passed to [`GxExportJob::export_graph_with_schema`].
    pub fn create_export_config(
        &self,
        nodes: &dyn GxElementSource<GxNode>,
        edges: &dyn GxElementSource<GxEdge>,
    ) -> Result<GxGraphSchema> {
        Ok(GxGraphSchema {
            nodes: self.scan(nodes)?,
            edges: self.scan(edges)?,
        })
    }

    pub fn export_nodes(
        &self,
        source: &dyn GxElementSource<GxNode>,
        schemas: &GxLabelSchemas,
    ) -> Result<Vec<GxFileStats>> {
        let mut planned = HashMap::new();
        self.plan_paths(GxElementKind::Nodes, schemas, source.shard_count(), &mut planned)?;
        let schemas = Arc::new(freeze_label_schemas(schemas));
        self.write_pass(source, |shard| {
            GxLabelWriters::new(self.target.clone(), Arc::clone(&schemas), shard)
        })
    }

    pub fn export_edges(
        &self,
        source: &dyn GxElementSource<GxEdge>,
        schemas: &GxLabelSchemas,
    ) -> Result<Vec<GxFileStats>> {
        let mut planned = HashMap::new();
        self.plan_paths(GxElementKind::Edges, schemas, source.shard_count(), &mut planned)?;
        let schemas = Arc::new(freeze_label_schemas(schemas));
        self.write_pass(source, |shard| {
            GxLabelWriters::new(self.target.clone(), Arc::clone(&schemas), shard)
        })
    }

    pub fn export_query_results(
        &self,
        name: &str,
        source: &dyn GxElementSource<GxQueryRow>,
        schema: &GxSchema,
    ) -> Result<Vec<GxFileStats>> {
        let schema = Arc::new(schema.clone());
        self.write_pass(source, |shard| {
            GxLabelWriters::for_query(self.target.clone(), name, Arc::clone(&schema), shard)
        })
    }

    /// Scans, then writes, nodes and edges.
    pub fn export_graph(
        &self,
        nodes: &dyn GxElementSource<GxNode>,
        edges: &dyn GxElementSource<GxEdge>,
    ) -> Result<GxExportReport> {
        let schema = self.create_export_config(nodes, edges)?;
        self.export_graph_with_schema(nodes, edges, &schema)
    }

    /// Writes nodes and edges against a declared schema, skipping the scan.
    pub fn export_graph_with_schema(
        &self,
        nodes: &dyn GxElementSource<GxNode>,
        edges: &dyn GxElementSource<GxEdge>,
        schema: &GxGraphSchema,
    ) -> Result<GxExportReport> {
        log::info!(
            "Starting export: {}, {}",
            self.target.format_description(),
            self.target.output_description()
        );
        let mut planned = HashMap::new();
        self.plan_paths(GxElementKind::Nodes, &schema.nodes, nodes.shard_count(), &mut planned)?;
        self.plan_paths(GxElementKind::Edges, &schema.edges, edges.shard_count(), &mut planned)?;
        let mut files = self.export_nodes(nodes, &schema.nodes)?;
        files.extend(self.export_edges(edges, &schema.edges)?);
        let stats = GxWriteStats::from_files(&files);

        let manifest = if self.config.output.is_file_backed() && self.config.write_manifest {
            let root = self.target.directories().root_directory();
            fs::create_dir_all(root)?;
            let manifest = GxManifest::from_file_stats(root, self.config.format, &files)?;
            manifest.write_to(root.join(MANIFEST_FILE_NAME))?;
            Some(manifest)
        } else {
            None
        };

        log::info!(
            "Export finished: {} records in {} files",
            stats.records_written,
            stats.files_created
        );
        Ok(GxExportReport {
            schema: schema.clone(),
            files,
            stats,
            manifest,
        })
    }

    /// Records the file of every label and shard in `planned`, failing on
    /// the first path claimed twice. Stdout has no paths to check.
    fn plan_paths(
        &self,
        kind: GxElementKind,
        schemas: &GxLabelSchemas,
        shard_count: usize,
        planned: &mut HashMap<PathBuf, (GxElementKind, String, usize)>,
    ) -> Result<()> {
        if !self.config.output.is_file_backed() {
            return Ok(());
        }
        for label in schemas.keys() {
            for shard in 0..shard_count {
                let path = self.target.file_path(kind, label, shard);
                if let Some((other_kind, other, other_shard)) = planned.get(&path) {
                    return Err(GxError::schema(format!(
                        "{} label '{}' (shard {}) and {} label '{}' (shard {}) both resolve to {}",
                        other_kind.as_str(),
                        other,
                        other_shard,
                        kind.as_str(),
                        label,
                        shard,
                        path.display()
                    )));
                }
                planned.insert(path, (kind, label.clone(), shard));
            }
        }
        Ok(())
    }

    fn write_pass<E, F>(&self, source: &dyn GxElementSource<E>, writers_for: F) -> Result<Vec<GxFileStats>>
    where
        E: GxElement,
        F: Fn(usize) -> GxLabelWriters<E> + Sync,
    {
        let count = source.shard_count();
        log::info!("Exporting {} from {} shards", E::KIND.as_str(), count);
        let shards = self.run_shards(count, |index| {
            let mut writers = writers_for(index);
            let written = source.for_each_in_shard(index, &mut |element: E| writers.handle(&element));
            let closed = writers.close_all();
            match (written, closed) {
                (Ok(()), closed) => closed,
                (Err(err), Ok(_)) => Err(err),
                (Err(err), Err(close_err)) => {
                    log::warn!("Shard {} also failed to close: {}", index, close_err);
                    Err(err)
                }
            }
        });

        let mut files = Vec::new();
        let mut first_error = None;
        for shard in shards {
            match shard {
                Ok(stats) => files.extend(stats),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        let stats = GxWriteStats::from_files(&files);
        log::info!(
            "Exported {} {} records to {} files",
            stats.records_written,
            E::KIND.as_str(),
            stats.files_created
        );
        Ok(files)
    }

    /// Runs `task` once per shard and returns the results in shard order.
    fn run_shards<T, F>(&self, count: usize, task: F) -> Vec<Result<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel && count > 1 {
                use rayon::prelude::*;
                return (0..count).into_par_iter().map(&task).collect();
            }
        }
        (0..count).map(task).collect()
    }
}

fn scan_shard<E: GxElement>(source: &dyn GxElementSource<E>, index: usize) -> Result<GxLabelSchemas> {
    let mut schemas = GxLabelSchemas::new();
    source.for_each_in_shard(index, &mut |element: E| {
        schemas
            .entry(element.label().unwrap_or_default().to_string())
            .or_default()
            .record_observed_keys(element.properties())
    })?;
    Ok(schemas)
}
