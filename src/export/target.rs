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

//! # Export Target Module
//!
//! Resolves where each output file goes and what writes it.
//!
//! [`GxTargetConfig`] combines a [`GxDirectories`] layout, an output
//! [`GxFormat`] and a byte-level [`GxOutput`]. Each call produces a fresh
//! [`GxShardTarget`] whose printer owns its own sink, so targets can be
//! handed to different threads.
//!
//! Stdout is the one stream shared by every printer of an export. Its
//! printers write through a [`GxRecordSink`], which passes each header line
//! or row to the stream in a single locked write, so records never split
//! each other.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::export::csv::GxCsvPrinter;
use crate::export::json::GxJsonPrinter;
use crate::export::printer::{GxOutputSink, GxPrinter};
use crate::export::writer::GxElementKind;
use crate::schema::GxSchema;

/// Row format of the exported files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GxFormat {
    #[default]
    Csv,
    Json,
}

impl GxFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            GxFormat::Csv => "csv",
            GxFormat::Json => "json",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GxFormat::Csv => "CSV",
            GxFormat::Json => "JSON lines",
        }
    }

    pub fn create_printer(
        &self,
        sink: Box<dyn GxOutputSink>,
        schema: Arc<GxSchema>,
        include_headers: bool,
        include_type_definitions: bool,
    ) -> Box<dyn GxPrinter> {
        match self {
            GxFormat::Csv => Box::new(
                GxCsvPrinter::new(sink, schema)
                    .with_headers(include_headers)
                    .with_type_definitions(include_type_definitions),
            ),
            GxFormat::Json => Box::new(GxJsonPrinter::new(sink, schema)),
        }
    }
}

/// Destination of the printed bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GxOutput {
    #[default]
    File,
    Stdout,
    #[cfg(feature = "compression")]
    Gzip,
    #[cfg(feature = "compression")]
    Zstd,
}

impl GxOutput {
    pub fn name(&self) -> &'static str {
        match self {
            GxOutput::File => "file",
            GxOutput::Stdout => "stdout",
            #[cfg(feature = "compression")]
            GxOutput::Gzip => "gzip",
            #[cfg(feature = "compression")]
            GxOutput::Zstd => "zstd",
        }
    }

    /// Suffix appended after the format extension.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            GxOutput::File | GxOutput::Stdout => "",
            #[cfg(feature = "compression")]
            GxOutput::Gzip => ".gz",
            #[cfg(feature = "compression")]
            GxOutput::Zstd => ".zst",
        }
    }

    pub fn is_file_backed(&self) -> bool {
        !matches!(self, GxOutput::Stdout)
    }

    pub fn decorate_path(&self, path: PathBuf) -> PathBuf {
        let suffix = self.file_suffix();
        if suffix.is_empty() {
            return path;
        }
        let mut decorated = path.into_os_string();
        decorated.push(suffix);
        PathBuf::from(decorated)
    }

    /// Opens the sink for `path`. Stdout ignores the path.
    pub fn create_sink(&self, path: &Path) -> Result<GxSink> {
        Ok(match self {
            GxOutput::File => GxSink::File(BufWriter::new(File::create(path)?)),
            GxOutput::Stdout => GxSink::Stdout(GxRecordSink::new(io::stdout())),
            #[cfg(feature = "compression")]
            GxOutput::Gzip => GxSink::Gzip(flate2::write::GzEncoder::new(
                BufWriter::new(File::create(path)?),
                flate2::Compression::default(),
            )),
            #[cfg(feature = "compression")]
            GxOutput::Zstd => GxSink::Zstd(zstd::Encoder::new(
                BufWriter::new(File::create(path)?),
                0,
            )?),
        })
    }
}

/// Buffers one record at a time in front of a stream shared with other
/// printers.
///
/// The stream receives each finished record through a single `write_all`.
/// For [`io::Stdout`] that call holds the process-wide stdout lock.
#[derive(Debug)]
pub struct GxRecordSink<W: Write + Send> {
    stream: W,
    record: Vec<u8>,
}

impl<W: Write + Send> GxRecordSink<W> {
    pub fn new(stream: W) -> Self {
        GxRecordSink {
            stream,
            record: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write + Send> Write for GxRecordSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.record.extend_from_slice(buf);
        Ok(buf.len())
    }

    /// Flushes the stream only; a partial record stays buffered.
    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl<W: Write + Send> GxOutputSink for GxRecordSink<W> {
    fn end_record(&mut self) -> io::Result<()> {
        if !self.record.is_empty() {
            self.stream.write_all(&self.record)?;
            self.record.clear();
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.end_record()?;
        self.stream.flush()
    }
}

/// Byte sink behind a printer.
pub enum GxSink {
    File(BufWriter<File>),
    Stdout(GxRecordSink<io::Stdout>),
    #[cfg(feature = "compression")]
    Gzip(flate2::write::GzEncoder<BufWriter<File>>),
    #[cfg(feature = "compression")]
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl Write for GxSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            GxSink::File(w) => w.write(buf),
            GxSink::Stdout(w) => w.write(buf),
            #[cfg(feature = "compression")]
            GxSink::Gzip(w) => w.write(buf),
            #[cfg(feature = "compression")]
            GxSink::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            GxSink::File(w) => w.flush(),
            GxSink::Stdout(w) => w.flush(),
            #[cfg(feature = "compression")]
            GxSink::Gzip(w) => w.flush(),
            #[cfg(feature = "compression")]
            GxSink::Zstd(w) => w.flush(),
        }
    }
}

impl GxOutputSink for GxSink {
    fn end_record(&mut self) -> io::Result<()> {
        match self {
            GxSink::Stdout(w) => w.end_record(),
            _ => Ok(()),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        match self {
            GxSink::File(w) => w.flush(),
            GxSink::Stdout(w) => w.finish(),
            #[cfg(feature = "compression")]
            GxSink::Gzip(w) => {
                w.try_finish()?;
                w.get_mut().flush()
            }
            #[cfg(feature = "compression")]
            GxSink::Zstd(w) => {
                w.do_finish()?;
                w.get_mut().flush()
            }
        }
    }
}

/// Directory layout of an export.
pub trait GxDirectories: Send + Sync {
    fn root_directory(&self) -> &Path;

    /// Directory holding the shards of the named query.
    fn results_directory(&self, name: &str) -> PathBuf;

    fn edges_directory(&self) -> PathBuf;

    fn nodes_directory(&self) -> PathBuf;

    /// Full path of shard `index` of `name` inside `directory`.
    fn create_file_path(&self, directory: &Path, name: &str, index: usize, extension: &str)
        -> PathBuf;
}

/// Filesystem layout: `<root>/nodes`, `<root>/edges` and
/// `<root>/results/<name>`, with files named `<name>-<index>.<ext>`.
#[derive(Clone, Debug)]
pub struct GxExportDirectories {
    root: PathBuf,
}

impl GxExportDirectories {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GxExportDirectories { root: root.into() }
    }
}

impl GxDirectories for GxExportDirectories {
    fn root_directory(&self) -> &Path {
        &self.root
    }

    fn results_directory(&self, name: &str) -> PathBuf {
        self.root.join("results").join(sanitize_file_name(name))
    }

    fn edges_directory(&self) -> PathBuf {
        self.root.join("edges")
    }

    fn nodes_directory(&self) -> PathBuf {
        self.root.join("nodes")
    }

    fn create_file_path(&self, directory: &Path, name: &str, index: usize, extension: &str) -> PathBuf {
        directory.join(format!("{}-{}.{}", sanitize_file_name(name), index, extension))
    }
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

/// An opened output file and the printer writing it.
pub struct GxShardTarget {
    pub path: PathBuf,
    pub printer: Box<dyn GxPrinter>,
}

/// Creates printers for the files of an export.
#[derive(Clone)]
pub struct GxTargetConfig {
    directories: Arc<dyn GxDirectories>,
    format: GxFormat,
    output: GxOutput,
    include_headers: bool,
    include_type_definitions: bool,
}

impl GxTargetConfig {
    pub fn new(directories: Arc<dyn GxDirectories>, format: GxFormat, output: GxOutput) -> Self {
        GxTargetConfig {
            directories,
            format,
            output,
            include_headers: true,
            include_type_definitions: false,
        }
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    pub fn with_type_definitions(mut self, include_type_definitions: bool) -> Self {
        self.include_type_definitions = include_type_definitions;
        self
    }

    pub fn directories(&self) -> &Arc<dyn GxDirectories> {
        &self.directories
    }

    pub fn format(&self) -> GxFormat {
        self.format
    }

    pub fn output(&self) -> GxOutput {
        self.output
    }

    pub fn format_description(&self) -> String {
        format!("{} ({})", self.format.description(), self.format.extension())
    }

    pub fn output_description(&self) -> String {
        if self.output.is_file_backed() {
            format!(
                "{} under {}",
                self.output.name(),
                self.directories.root_directory().display()
            )
        } else {
            self.output.name().to_string()
        }
    }

    /// Path of shard `index` of `name`, including the output suffix.
    pub fn file_path(&self, kind: GxElementKind, name: &str, index: usize) -> PathBuf {
        let directory = match kind {
            GxElementKind::Nodes => self.directories.nodes_directory(),
            GxElementKind::Edges => self.directories.edges_directory(),
            GxElementKind::Queries => self.directories.results_directory(name),
        };
        self.output.decorate_path(self.directories.create_file_path(
            &directory,
            name,
            index,
            self.format.extension(),
        ))
    }

    pub fn create_printer_for_queries(
        &self,
        name: &str,
        index: usize,
        schema: Arc<GxSchema>,
    ) -> Result<GxShardTarget> {
        self.create_printer(self.file_path(GxElementKind::Queries, name, index), schema)
    }

    pub fn create_printer_for_edges(
        &self,
        name: &str,
        index: usize,
        schema: Arc<GxSchema>,
    ) -> Result<GxShardTarget> {
        self.create_printer(self.file_path(GxElementKind::Edges, name, index), schema)
    }

    pub fn create_printer_for_nodes(
        &self,
        name: &str,
        index: usize,
        schema: Arc<GxSchema>,
    ) -> Result<GxShardTarget> {
        self.create_printer(self.file_path(GxElementKind::Nodes, name, index), schema)
    }

    fn create_printer(&self, path: PathBuf, schema: Arc<GxSchema>) -> Result<GxShardTarget> {
        if self.output.is_file_backed() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        let sink = self.output.create_sink(&path)?;
        let printer = self.format.create_printer(
            Box::new(sink),
            schema,
            self.include_headers,
            self.include_type_definitions,
        );
        log::debug!("Opened {} target {}", self.format.description(), path.display());
        Ok(GxShardTarget { path, printer })
    }
}
