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

use std::fs::{self, File};
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{GxError, Result};
use crate::export::target::GxFormat;
use crate::export::writer::{GxElementKind, GxFileStats};

pub const MANIFEST_VERSION: &str = "1.0.0";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GxManifestFile {
    /// Path relative to the export root, `/`-separated.
    pub path: String,
    pub kind: GxElementKind,
    pub name: String,
    pub shard: usize,
    pub records: usize,
    pub size: u64,
    pub hash: String,
}

/// Inventory of the files produced by one export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GxManifest {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub format: GxFormat,
    pub total_records: usize,
    pub total_size: u64,
    pub files: Vec<GxManifestFile>,
}

impl GxManifest {
    pub fn new(format: GxFormat) -> Self {
        GxManifest {
            version: MANIFEST_VERSION.to_string(),
            created_at: Utc::now(),
            format,
            total_records: 0,
            total_size: 0,
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, file: GxManifestFile) {
        self.total_records += file.records;
        self.total_size += file.size;
        self.files.push(file);
    }

    /// Hashes and measures every written file.
    pub fn from_file_stats(root: &Path, format: GxFormat, files: &[GxFileStats]) -> Result<Self> {
        let mut manifest = GxManifest::new(format);
        for stats in files {
            let relative = stats.path.strip_prefix(root).unwrap_or(&stats.path);
            manifest.add_file(GxManifestFile {
                path: relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
                kind: stats.kind,
                name: stats.name.clone(),
                shard: stats.shard,
                records: stats.records,
                size: fs::metadata(&stats.path)?.len(),
                hash: compute_file_hash(&stats.path)?,
            });
        }
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GxError::internal(format!("Failed to serialize manifest: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GxError::validation(format!("Invalid manifest JSON: {}", e)))
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// BLAKE3 hex digest of a file's bytes.
pub fn compute_file_hash(path: impl AsRef<Path>) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}
