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

//! # JSON Printer Module
//!
//! Writes one JSON object per line. Identity fields use the same `~id`,
//! `~label`, `~from` and `~to` names as the CSV header; absent properties
//! are omitted instead of written as empty cells.

use std::slice;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::{GxError, Result};
use crate::export::printer::{GxOutputSink, GxPrinter, GxPrinterLifecycle, GxPrinterState};
use crate::record::{GxPropertyMap, GxPropertyValue};
use crate::schema::{GxPropertyTypeInfo, GxSchema};

pub struct GxJsonPrinter<W: GxOutputSink> {
    sink: W,
    schema: Arc<GxSchema>,
    lifecycle: GxPrinterLifecycle,
    object: Map<String, Value>,
}

impl<W: GxOutputSink> GxJsonPrinter<W> {
    pub fn new(sink: W, schema: Arc<GxSchema>) -> Self {
        GxJsonPrinter {
            sink,
            schema,
            lifecycle: GxPrinterLifecycle::new(),
            object: Map::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn ensure_open(&self) -> Result<()> {
        if self.lifecycle.state() == GxPrinterState::Closed {
            Err(GxError::printer("printer is closed"))
        } else {
            Ok(())
        }
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.object.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn property_json(column: &GxPropertyTypeInfo, value: &GxPropertyValue) -> Result<Value> {
    match value {
        GxPropertyValue::Scalar(scalar) => column
            .effective_type(slice::from_ref(scalar))
            .to_json(scalar),
        GxPropertyValue::Sequence(items) => {
            let data_type = column.effective_type(items);
            let values = items
                .iter()
                .map(|item| data_type.to_json(item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
    }
}

impl<W: GxOutputSink> GxPrinter for GxJsonPrinter<W> {
    fn print_header_mandatory_columns(&mut self, _columns: &[&str]) -> Result<()> {
        self.ensure_open()
    }

    fn print_header_remaining_columns(&mut self, _columns: &[GxPropertyTypeInfo]) -> Result<()> {
        self.ensure_open()
    }

    fn print_properties(&mut self, properties: &GxPropertyMap) -> Result<()> {
        self.lifecycle.require_row()?;
        let schema = Arc::clone(&self.schema);
        for column in schema.columns_in_order() {
            let name = column.name_without_data_type();
            if let Some(value) = properties.get(name) {
                if self.object.contains_key(name) {
                    return Err(GxError::schema(format!(
                        "property '{name}' collides with an identity field"
                    )));
                }
                let json = property_json(column, value)?;
                self.object.insert(name.to_string(), json);
            }
        }
        Ok(())
    }

    fn print_edge(&mut self, id: &str, label: &str, from: &str, to: &str) -> Result<()> {
        self.lifecycle.require_row()?;
        self.insert("~id", id);
        self.insert("~label", label);
        self.insert("~from", from);
        self.insert("~to", to);
        Ok(())
    }

    fn print_node(&mut self, id: &str, label: &str) -> Result<()> {
        self.lifecycle.require_row()?;
        self.insert("~id", id);
        self.insert("~label", label);
        Ok(())
    }

    fn print_start_row(&mut self) -> Result<()> {
        self.lifecycle.start_row()?;
        self.object = Map::new();
        Ok(())
    }

    fn print_end_row(&mut self) -> Result<()> {
        self.lifecycle.require_row()?;
        self.lifecycle.end_row();
        let object = Value::Object(std::mem::take(&mut self.object));
        serde_json::to_writer(&mut self.sink, &object)?;
        self.sink.write_all(b"\n")?;
        self.sink.end_record()?;
        Ok(())
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
