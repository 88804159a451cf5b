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

//! # Gxport Error Module
//!
//! This module defines the error type shared by every stage of an export:
//! schema discovery, value formatting, printing and sink management.
//!
//! ## Error Categories
//!
//! - **TypeConflict**: A property key observed with two incompatible data types
//! - **MalformedValue**: A value that does not fit the data type of its column
//! - **Io**: Filesystem failures while opening, writing or closing a sink
//! - **Schema**: Malformed or inconsistent schema registries
//! - **Validation**: Invalid parameters or configuration
//! - **Printer**: Printer calls made in the wrong state
//! - **RowShape**: A data row whose cell count differs from the header
//! - **Serde**: JSON and YAML (de)serialization failures
//! - **Csv**: Failures while reading exported CSV back
//! - **Internal**: Unexpected internal failures
//!
//! None of these are recovered from inside the crate. The caller decides
//! whether a failure aborts the whole export or only skips a shard.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Gxport.
pub type Result<T> = std::result::Result<T, GxError>;

/// Canonical error enumeration for Gxport.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum GxError {
    /// Errors originating from filesystem or stream IO.
    #[error("io error: {0}")]
    Io(String),

    /// A property was observed with a data type that cannot merge with the
    /// type already recorded for it.
    #[error("type conflict for property '{property}': recorded as {existing}, observed {observed}")]
    TypeConflict {
        property: String,
        existing: String,
        observed: String,
    },

    /// A value whose runtime shape does not match its declared data type.
    #[error("malformed {data_type} value: {message}")]
    MalformedValue { data_type: String, message: String },

    /// Errors caused by a malformed or inconsistent schema.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Printer methods invoked out of order, or after close.
    #[error("printer error: {message}")]
    Printer { message: String },

    /// A row was ended with a different number of cells than the header.
    #[error("row has {actual} cells, expected {expected}")]
    RowShape { expected: usize, actual: usize },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors raised while reading CSV back.
    #[error("csv error: {0}")]
    Csv(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for GxError {
    fn from(err: io::Error) -> Self {
        GxError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GxError {
    fn from(err: serde_json::Error) -> Self {
        GxError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for GxError {
    fn from(err: serde_yaml::Error) -> Self {
        GxError::Serde(err.to_string())
    }
}

impl From<csv::Error> for GxError {
    fn from(err: csv::Error) -> Self {
        GxError::Csv(err.to_string())
    }
}

impl GxError {
    /// Helper to construct type conflict errors.
    pub fn type_conflict(
        property: impl Into<String>,
        existing: impl Into<String>,
        observed: impl Into<String>,
    ) -> Self {
        GxError::TypeConflict {
            property: property.into(),
            existing: existing.into(),
            observed: observed.into(),
        }
    }

    /// Helper to construct malformed value errors.
    pub fn malformed(data_type: impl Into<String>, message: impl Into<String>) -> Self {
        GxError::MalformedValue {
            data_type: data_type.into(),
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        GxError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        GxError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct printer state errors.
    pub fn printer<T: Into<String>>(message: T) -> Self {
        GxError::Printer {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        GxError::Internal(message.into())
    }

    /// Returns true for conflicts detected by the schema registry.
    pub fn is_type_conflict(&self) -> bool {
        matches!(self, GxError::TypeConflict { .. })
    }
}
