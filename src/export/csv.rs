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

//! # CSV Printer Module
//!
//! Streams graph elements as CSV rows aligned to a frozen column registry.
//!
//! Cells are written as they arrive. Every row carries the identity cells of
//! its kind followed by one cell per registry column, so a header and the
//! rows under it always have the same number of cells.

use std::io::Read;
use std::slice;
use std::sync::Arc;

use crate::errors::{GxError, Result};
use crate::export::printer::{
    GxOutputSink, GxPrinter, GxPrinterLifecycle, GxPrinterState, LINE_SEPARATOR,
};
use crate::record::{GxPropertyMap, GxPropertyValue};
use crate::schema::data_type::quote_text;
use crate::schema::{GxDataType, GxPropertyTypeInfo, GxSchema};

/// Separator state of one CSV line.
#[derive(Debug, Default)]
pub struct GxCsvRow {
    cells: usize,
}

impl GxCsvRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Separator to emit before the next cell.
    pub fn separator(&mut self) -> &'static str {
        self.cells += 1;
        if self.cells == 1 {
            ""
        } else {
            ","
        }
    }

    pub fn cells(&self) -> usize {
        self.cells
    }
}

/// CSV printer for one output file.
pub struct GxCsvPrinter<W: GxOutputSink> {
    sink: W,
    schema: Arc<GxSchema>,
    include_headers: bool,
    include_type_definitions: bool,
    lifecycle: GxPrinterLifecycle,
    row: GxCsvRow,
    width: Option<usize>,
}

impl<W: GxOutputSink> GxCsvPrinter<W> {
    pub fn new(sink: W, schema: Arc<GxSchema>) -> Self {
        GxCsvPrinter {
            sink,
            schema,
            include_headers: true,
            include_type_definitions: false,
            lifecycle: GxPrinterLifecycle::new(),
            row: GxCsvRow::new(),
            width: None,
        }
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    /// Annotates header names as `name:Type`.
    pub fn with_type_definitions(mut self, include_type_definitions: bool) -> Self {
        self.include_type_definitions = include_type_definitions;
        self
    }

    pub fn schema(&self) -> &Arc<GxSchema> {
        &self.schema
    }

    /// Returns the sink. Call [`GxPrinter::close`] first to finish it.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_cell(&mut self, text: &str) -> Result<()> {
        let separator = self.row.separator();
        self.sink.write_all(separator.as_bytes())?;
        self.sink.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_value(&mut self, column: &GxPropertyTypeInfo, value: &GxPropertyValue) -> Result<()> {
        let cell = match value {
            GxPropertyValue::Scalar(scalar) => column
                .effective_type(slice::from_ref(scalar))
                .format(scalar)?,
            GxPropertyValue::Sequence(items) => {
                column.effective_type(items).format_list(items)?
            }
        };
        self.write_cell(&cell)
    }

    fn finish_line(&mut self) -> Result<()> {
        let actual = self.row.cells();
        match self.width {
            Some(expected) if expected != actual => {
                return Err(GxError::RowShape { expected, actual });
            }
            Some(_) => {}
            None => self.width = Some(actual),
        }
        self.sink.write_all(LINE_SEPARATOR.as_bytes())?;
        self.sink.end_record()?;
        self.row = GxCsvRow::new();
        Ok(())
    }
}

impl<W: GxOutputSink> GxPrinter for GxCsvPrinter<W> {
    fn print_header_mandatory_columns(&mut self, columns: &[&str]) -> Result<()> {
        if !self.include_headers {
            return Ok(());
        }
        if self.lifecycle.begin_header()? {
            self.row = GxCsvRow::new();
        }
        for column in columns {
            self.write_cell(&quote_text(column))?;
        }
        Ok(())
    }

    fn print_header_remaining_columns(&mut self, columns: &[GxPropertyTypeInfo]) -> Result<()> {
        if !self.include_headers {
            return Ok(());
        }
        if self.lifecycle.begin_header()? {
            self.row = GxCsvRow::new();
        }
        for column in columns {
            let name = if self.include_type_definitions {
                column.name_with_data_type()
            } else {
                column.name_without_data_type().to_string()
            };
            self.write_cell(&quote_text(&name))?;
        }
        self.finish_line()?;
        self.lifecycle.end_header();
        Ok(())
    }

    fn print_properties(&mut self, properties: &GxPropertyMap) -> Result<()> {
        self.lifecycle.require_row()?;
        let schema = Arc::clone(&self.schema);
        for column in schema.columns_in_order() {
            match properties.get(column.name_without_data_type()) {
                Some(value) => self.write_value(column, value)?,
                None => self.write_cell("")?,
            }
        }
        Ok(())
    }

    fn print_edge(&mut self, id: &str, label: &str, from: &str, to: &str) -> Result<()> {
        self.lifecycle.require_row()?;
        for cell in [id, label, from, to] {
            self.write_cell(&quote_text(cell))?;
        }
        Ok(())
    }

    fn print_node(&mut self, id: &str, label: &str) -> Result<()> {
        self.lifecycle.require_row()?;
        self.write_cell(&quote_text(id))?;
        self.write_cell(&quote_text(label))
    }

    fn print_start_row(&mut self) -> Result<()> {
        self.lifecycle.start_row()?;
        self.row = GxCsvRow::new();
        Ok(())
    }

    fn print_end_row(&mut self) -> Result<()> {
        self.lifecycle.require_row()?;
        self.lifecycle.end_row();
        self.finish_line()
    }

    fn close(&mut self) -> Result<()> {
        if self.lifecycle.close() {
            self.sink.finish()?;
        }
        Ok(())
    }

    fn state(&self) -> GxPrinterState {
        self.lifecycle.state()
    }
}

/// One data row read back from an exported CSV file.
#[derive(Clone, Debug, PartialEq)]
pub struct GxCsvRecord {
    pub identity: Vec<String>,
    pub properties: GxPropertyMap,
}

/// Reads an exported CSV stream back against the registry it was written
/// with.
///
/// Empty cells read back as absent properties, so an empty string and a
/// missing value cannot be told apart. Cells of multi-valued columns are
/// split into sequences.
pub fn read_exported_csv<R: Read>(
    reader: R,
    schema: &GxSchema,
    identity_columns: usize,
    has_headers: bool,
) -> Result<Vec<GxCsvRecord>> {
    let expected = identity_columns + schema.len();
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(reader);
    if has_headers {
        let actual = csv_reader.headers()?.len();
        if actual != expected {
            return Err(GxError::RowShape { expected, actual });
        }
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        if row.len() != expected {
            return Err(GxError::RowShape {
                expected,
                actual: row.len(),
            });
        }
        let identity = row.iter().take(identity_columns).map(str::to_string).collect();
        let mut properties = GxPropertyMap::new();
        for (column, field) in schema.columns_in_order().iter().zip(row.iter().skip(identity_columns)) {
            if field.is_empty() || column.data_type() == GxDataType::None {
                continue;
            }
            let value = if column.is_multi_value() {
                GxPropertyValue::Sequence(column.data_type().parse_list(field)?)
            } else {
                GxPropertyValue::Scalar(column.data_type().parse(field)?)
            };
            properties.insert(column.property().clone(), value);
        }
        records.push(GxCsvRecord {
            identity,
            properties,
        });
    }
    Ok(records)
}
