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

//! # Printer Module
//!
//! The format-independent printer contract.
//!
//! A printer owns one output sink and moves through
//! `Idle -> HeaderWritten -> RowsInProgress -> Closed`. The header is
//! optional. Each row is bracketed by [`GxPrinter::print_start_row`] and
//! [`GxPrinter::print_end_row`]; identity cells come first, then the property
//! cells in registry order. Printers stream straight to their sink and keep
//! no rows in memory.

use std::io::{self, Write};

use crate::errors::{GxError, Result};
use crate::record::GxPropertyMap;
use crate::schema::GxPropertyTypeInfo;

/// Line terminator of the current platform.
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Lifecycle state of a printer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GxPrinterState {
    Idle,
    HeaderWritten,
    RowsInProgress,
    Closed,
}

/// A byte sink that may need a trailer written when it is done.
pub trait GxOutputSink: Write + Send {
    /// Marks the end of a header line or row. Sinks shared between printers
    /// hand the finished record to their stream here.
    fn end_record(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Flushes buffered bytes and completes the stream encoding.
    fn finish(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl GxOutputSink for Vec<u8> {}

impl<S: GxOutputSink + ?Sized> GxOutputSink for Box<S> {
    fn end_record(&mut self) -> io::Result<()> {
        (**self).end_record()
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Row writer for one output file.
pub trait GxPrinter: Send {
    /// Writes the identity column names that open the header line.
    fn print_header_mandatory_columns(&mut self, columns: &[&str]) -> Result<()>;

    /// Writes one header cell per registry column and ends the header line.
    fn print_header_remaining_columns(&mut self, columns: &[GxPropertyTypeInfo]) -> Result<()>;

    /// Writes the property cells of the open row in registry order.
    fn print_properties(&mut self, properties: &GxPropertyMap) -> Result<()>;

    fn print_edge(&mut self, id: &str, label: &str, from: &str, to: &str) -> Result<()>;

    fn print_node(&mut self, id: &str, label: &str) -> Result<()>;

    fn print_start_row(&mut self) -> Result<()>;

    fn print_end_row(&mut self) -> Result<()>;

    /// Flushes and releases the sink. Calling it again does nothing.
    fn close(&mut self) -> Result<()>;

    fn state(&self) -> GxPrinterState;
}

/// State machine shared by the printer implementations.
#[derive(Debug)]
pub(crate) struct GxPrinterLifecycle {
    state: GxPrinterState,
    header_open: bool,
    row_open: bool,
}

impl GxPrinterLifecycle {
    pub(crate) fn new() -> Self {
        GxPrinterLifecycle {
            state: GxPrinterState::Idle,
            header_open: false,
            row_open: false,
        }
    }

    pub(crate) fn state(&self) -> GxPrinterState {
        self.state
    }

    /// Returns true when this call opened the header line.
    pub(crate) fn begin_header(&mut self) -> Result<bool> {
        match self.state {
            GxPrinterState::Idle if self.header_open => Ok(false),
            GxPrinterState::Idle => {
                self.header_open = true;
                Ok(true)
            }
            other => Err(GxError::printer(format!(
                "header cannot be written in state {other:?}"
            ))),
        }
    }

    pub(crate) fn end_header(&mut self) {
        self.header_open = false;
        self.state = GxPrinterState::HeaderWritten;
    }

    pub(crate) fn start_row(&mut self) -> Result<()> {
        if self.state == GxPrinterState::Closed {
            return Err(GxError::printer("printer is closed"));
        }
        if self.header_open {
            return Err(GxError::printer("header line was not finished"));
        }
        if self.row_open {
            return Err(GxError::printer("previous row was not ended"));
        }
        self.row_open = true;
        self.state = GxPrinterState::RowsInProgress;
        Ok(())
    }

    pub(crate) fn require_row(&self) -> Result<()> {
        if self.row_open {
            Ok(())
        } else {
            Err(GxError::printer("no row is open"))
        }
    }

    pub(crate) fn end_row(&mut self) {
        self.row_open = false;
    }

    /// Returns true the first time it is called.
    pub(crate) fn close(&mut self) -> bool {
        if self.state == GxPrinterState::Closed {
            return false;
        }
        self.state = GxPrinterState::Closed;
        self.header_open = false;
        self.row_open = false;
        true
    }
}
