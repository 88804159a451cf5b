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

//! # Export Configuration Module
//!
//! Settings of one export job, loadable from JSON or YAML.
//!
//! ```yaml
//! root_directory: out
//! format: csv
//! output: gzip
//! include_type_definitions: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{GxError, Result};
use crate::export::{GxExportDirectories, GxFormat, GxOutput, GxTargetConfig};

/// Configuration for an export job. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GxExportConfig {
    /// Directory receiving `nodes/`, `edges/`, `results/` and the manifest.
    pub root_directory: PathBuf,
    pub format: GxFormat,
    pub output: GxOutput,
    pub include_headers: bool,
    /// Annotate header names as `name:Type`.
    pub include_type_definitions: bool,
    /// Write shards concurrently when the `parallel` feature is built.
    pub parallel: bool,
    /// Write `manifest.json` after a successful file-backed export.
    pub write_manifest: bool,
}

impl Default for GxExportConfig {
    fn default() -> Self {
        GxExportConfig {
            root_directory: PathBuf::from("export"),
            format: GxFormat::Csv,
            output: GxOutput::File,
            include_headers: true,
            include_type_definitions: false,
            parallel: true,
            write_manifest: true,
        }
    }
}

impl GxExportConfig {
    pub fn new(root_directory: impl Into<PathBuf>) -> Self {
        GxExportConfig {
            root_directory: root_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: GxFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: GxOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    pub fn with_type_definitions(mut self, include_type_definitions: bool) -> Self {
        self.include_type_definitions = include_type_definitions;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_manifest(mut self, write_manifest: bool) -> Self {
        self.write_manifest = write_manifest;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GxExportConfig = serde_json::from_str(json)
            .map_err(|e| GxError::validation(format!("Invalid export config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: GxExportConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GxError::validation(format!("Invalid export config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file, picking the parser from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Err(GxError::validation(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.is_file_backed() && self.root_directory.as_os_str().is_empty() {
            return Err(GxError::validation(
                "root_directory must be set for file outputs",
            ));
        }
        Ok(())
    }

    /// Target configuration writing under [`GxExportConfig::root_directory`].
    pub fn target_config(&self) -> GxTargetConfig {
        GxTargetConfig::new(
            Arc::new(GxExportDirectories::new(&self.root_directory)),
            self.format,
            self.output,
        )
        .with_headers(self.include_headers)
        .with_type_definitions(self.include_type_definitions)
    }
}
