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

//! # Schema Registry Module
//!
//! Ordered registries of property columns.
//!
//! A [`GxSchema`] is append-only: a key is placed at the position of its first
//! observation and is never moved or removed. Rows are aligned against this
//! order, so the registry must be complete before the first row of a file is
//! written. Exports either scan the source first or load a declared
//! [`GxGraphSchema`] saved by an earlier scan.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{GxError, Result};
use crate::record::{GxEdge, GxNode, GxPropertyKey, GxPropertyMap, GxPropertyValue};
use crate::schema::GxPropertyTypeInfo;

/// Per-label registries of one element kind, ordered by label.
pub type GxLabelSchemas = BTreeMap<String, GxSchema>;

/// Read-only registries handed to the writers of every shard.
pub type GxFrozenSchemas = BTreeMap<String, Arc<GxSchema>>;

/// Freezes each label's registry once so every writer shares it.
pub fn freeze_label_schemas(schemas: &GxLabelSchemas) -> GxFrozenSchemas {
    schemas
        .iter()
        .map(|(label, schema)| (label.clone(), Arc::new(schema.clone())))
        .collect()
}

/// Ordered mapping from property key to column type info.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GxPropertyTypeInfo>", into = "Vec<GxPropertyTypeInfo>")]
pub struct GxSchema {
    columns: Vec<GxPropertyTypeInfo>,
    index: HashMap<GxPropertyKey, usize>,
}

impl GxSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from declared columns. Duplicate keys are rejected.
    pub fn from_columns(columns: Vec<GxPropertyTypeInfo>) -> Result<Self> {
        let mut schema = GxSchema::new();
        for column in columns {
            if schema.index.contains_key(column.property()) {
                return Err(GxError::schema(format!(
                    "duplicate column '{}'",
                    column.property()
                )));
            }
            schema.push(column);
        }
        Ok(schema)
    }

    /// Records every property of one element, appending unseen keys in the
    /// element's order and widening the types of known ones.
    pub fn record_observed_keys(&mut self, properties: &GxPropertyMap) -> Result<()> {
        for (key, value) in properties.iter() {
            self.record_property(key, value)?;
        }
        Ok(())
    }

    pub fn record_property(&mut self, key: &GxPropertyKey, value: &GxPropertyValue) -> Result<()> {
        match self.index.get(key) {
            Some(&pos) => self.columns[pos].accept(value),
            None => {
                let mut column = GxPropertyTypeInfo::new(key.clone());
                column.accept(value)?;
                self.push(column);
                Ok(())
            }
        }
    }

    /// Folds a registry built from a later part of the same stream into this
    /// one. Shared keys keep their position; unseen keys are appended in
    /// `other`'s order.
    pub fn merge(&mut self, other: &GxSchema) -> Result<()> {
        for column in &other.columns {
            match self.index.get(column.property()) {
                Some(&pos) => self.columns[pos].merge(column)?,
                None => self.push(column.clone()),
            }
        }
        Ok(())
    }

    pub fn columns_in_order(&self) -> &[GxPropertyTypeInfo] {
        &self.columns
    }

    pub fn get(&self, key: &str) -> Option<&GxPropertyTypeInfo> {
        self.index.get(key).map(|&pos| &self.columns[pos])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn push(&mut self, column: GxPropertyTypeInfo) {
        self.index.insert(column.property().clone(), self.columns.len());
        self.columns.push(column);
    }
}

impl TryFrom<Vec<GxPropertyTypeInfo>> for GxSchema {
    type Error = GxError;

    fn try_from(columns: Vec<GxPropertyTypeInfo>) -> Result<Self> {
        GxSchema::from_columns(columns)
    }
}

impl From<GxSchema> for Vec<GxPropertyTypeInfo> {
    fn from(schema: GxSchema) -> Self {
        schema.columns
    }
}

/// Merges per-shard scan results in shard order.
pub fn merge_label_schemas(target: &mut GxLabelSchemas, other: &GxLabelSchemas) -> Result<()> {
    for (label, schema) in other {
        target.entry(label.clone()).or_default().merge(schema)?;
    }
    Ok(())
}

/// Registries for every node label and edge label of a graph.
///
/// Serialized as JSON this is the export config: it can be edited (columns
/// removed, types declared) and fed back to skip the scan pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GxGraphSchema {
    #[serde(default)]
    pub nodes: GxLabelSchemas,
    #[serde(default)]
    pub edges: GxLabelSchemas,
}

impl GxGraphSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_node(&mut self, node: &GxNode) -> Result<()> {
        self.nodes
            .entry(node.label.clone())
            .or_default()
            .record_observed_keys(&node.properties)
    }

    pub fn record_edge(&mut self, edge: &GxEdge) -> Result<()> {
        self.edges
            .entry(edge.label.clone())
            .or_default()
            .record_observed_keys(&edge.properties)
    }

    pub fn node_schema(&self, label: &str) -> Option<&GxSchema> {
        self.nodes.get(label)
    }

    pub fn edge_schema(&self, label: &str) -> Option<&GxSchema> {
        self.edges.get(label)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GxError::schema(format!("invalid export config: {e}")))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
