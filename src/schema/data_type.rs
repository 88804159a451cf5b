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

//! # Data Type Module
//!
//! Column data types and their canonical CSV text.
//!
//! ## Cell Conventions
//!
//! - Scalars are written as plain text. Strings are wrapped in double quotes
//!   only when they contain a comma, a double quote or a line break; the
//!   empty string is written as `""` so that it never reads like an absent
//!   property (a zero-length cell)
//! - Lists join their elements with `;`. Inside string lists `\` and `;` are
//!   escaped with a backslash. A list cell is always wrapped in double
//!   quotes, so `["a"]` becomes `"a"` while the scalar `a` stays `a`
//! - Dates are RFC 3339 in UTC with a `Z` suffix; fractional seconds appear
//!   only when non-zero. Years outside `0000..=9999` carry an explicit sign
//!   (`+10000-01-01T00:00:00Z`, `-0001-01-01T00:00:00Z`)
//! - Floats use the shortest text that parses back to the same value. A
//!   `Float` in a `Double` column is widened first, so the text is that of
//!   the `f64` it becomes
//!
//! `parse` and `parse_list` invert `format` and `format_list` for a field as
//! returned by a CSV reader, i.e. with the outer quoting already removed.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{GxError, Result};
use crate::record::GxScalar;

const LIST_SEPARATOR: char = ';';
const LIST_ESCAPE: char = '\\';
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Data type of a property column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GxDataType {
    /// No value seen yet, or only empty lists.
    #[default]
    None,
    #[serde(rename = "Bool", alias = "Boolean")]
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Date,
}

impl GxDataType {
    /// Column type name used in type-annotated headers.
    pub fn type_name(&self) -> &'static str {
        match self {
            GxDataType::None | GxDataType::String => "String",
            GxDataType::Boolean => "Bool",
            GxDataType::Byte => "Byte",
            GxDataType::Short => "Short",
            GxDataType::Int => "Int",
            GxDataType::Long => "Long",
            GxDataType::Float => "Float",
            GxDataType::Double => "Double",
            GxDataType::Date => "Date",
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            GxDataType::Byte | GxDataType::Short | GxDataType::Int | GxDataType::Long
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, GxDataType::Float | GxDataType::Double)
    }

    fn rank(&self) -> u8 {
        match self {
            GxDataType::Byte | GxDataType::Float => 0,
            GxDataType::Short | GxDataType::Double => 1,
            GxDataType::Int => 2,
            GxDataType::Long => 3,
            _ => 0,
        }
    }

    /// Smallest type holding both `self` and `observed` without loss, or
    /// `None` when they conflict.
    ///
    /// Integers widen to the wider integer, floats to `Double`, and
    /// `Byte`/`Short`/`Int` mixed with a float to `Double`. `Long` mixed with
    /// a float conflicts, as does any other pair of distinct types.
    pub fn broaden(self, observed: GxDataType) -> Option<GxDataType> {
        if self == observed || observed == GxDataType::None {
            return Some(self);
        }
        if self == GxDataType::None {
            return Some(observed);
        }
        if self.is_integral() && observed.is_integral() {
            return Some(if self.rank() >= observed.rank() { self } else { observed });
        }
        if self.is_floating() && observed.is_floating() {
            return Some(GxDataType::Double);
        }
        let mixed = (self.is_integral() && observed.is_floating())
            || (self.is_floating() && observed.is_integral());
        if mixed && self != GxDataType::Long && observed != GxDataType::Long {
            return Some(GxDataType::Double);
        }
        None
    }

    /// True when `value` can be written to a column of this type.
    pub fn accepts(&self, value: &GxScalar) -> bool {
        *self != GxDataType::None && self.broaden(value.data_type()) == Some(*self)
    }

    /// Formats one value as a CSV cell.
    pub fn format(&self, value: &GxScalar) -> Result<String> {
        let text = self.render(value)?;
        if text.is_empty() {
            return Ok("\"\"".to_string());
        }
        Ok(quote_text(&text).into_owned())
    }

    /// Formats a list of values as a single CSV cell.
    pub fn format_list(&self, values: &[GxScalar]) -> Result<String> {
        let mut joined = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                joined.push(LIST_SEPARATOR);
            }
            let text = self.render(value)?;
            if *self == GxDataType::String {
                escape_list_element(&text, &mut joined);
            } else {
                joined.push_str(&text);
            }
        }
        Ok(quote_always(&joined))
    }

    /// Parses a field written by [`GxDataType::format`].
    pub fn parse(&self, field: &str) -> Result<GxScalar> {
        let fail = |err: &dyn fmt::Display| {
            GxError::malformed(self.type_name(), format!("cannot parse '{field}': {err}"))
        };
        match self {
            GxDataType::None => Err(GxError::malformed(
                self.type_name(),
                "column has no resolved type",
            )),
            GxDataType::Boolean => match field {
                "true" => Ok(GxScalar::Bool(true)),
                "false" => Ok(GxScalar::Bool(false)),
                _ => Err(fail(&"expected 'true' or 'false'")),
            },
            GxDataType::Byte => field.parse().map(GxScalar::Byte).map_err(|e| fail(&e)),
            GxDataType::Short => field.parse().map(GxScalar::Short).map_err(|e| fail(&e)),
            GxDataType::Int => field.parse().map(GxScalar::Int).map_err(|e| fail(&e)),
            GxDataType::Long => field.parse().map(GxScalar::Long).map_err(|e| fail(&e)),
            GxDataType::Float => field.parse().map(GxScalar::Float).map_err(|e| fail(&e)),
            GxDataType::Double => field.parse().map(GxScalar::Double).map_err(|e| fail(&e)),
            GxDataType::String => Ok(GxScalar::String(field.to_string())),
            GxDataType::Date => parse_date(field).map(GxScalar::Date).map_err(|e| fail(&e)),
        }
    }

    /// Parses a field written by [`GxDataType::format_list`].
    ///
    /// An empty field is an empty list.
    pub fn parse_list(&self, field: &str) -> Result<Vec<GxScalar>> {
        if field.is_empty() {
            return Ok(Vec::new());
        }
        split_list(field)?
            .iter()
            .map(|element| self.parse(element))
            .collect()
    }

    /// Renders a value as JSON after checking it fits this column.
    pub fn to_json(&self, value: &GxScalar) -> Result<Value> {
        self.check(value)?;
        Ok(value.to_json())
    }

    fn check(&self, value: &GxScalar) -> Result<()> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(GxError::malformed(
                self.type_name(),
                format!("{} value {:?} does not fit the column", value.data_type(), value),
            ))
        }
    }

    /// Canonical text of a value, without any CSV quoting.
    fn render(&self, value: &GxScalar) -> Result<String> {
        self.check(value)?;
        Ok(match value {
            GxScalar::Bool(b) => b.to_string(),
            GxScalar::Byte(v) => v.to_string(),
            GxScalar::Short(v) => v.to_string(),
            GxScalar::Int(v) => v.to_string(),
            GxScalar::Long(v) => v.to_string(),
            GxScalar::Float(v) if *self == GxDataType::Double => f64::from(*v).to_string(),
            GxScalar::Float(v) => v.to_string(),
            GxScalar::Double(v) => v.to_string(),
            GxScalar::String(s) => s.clone(),
            GxScalar::Date(d) => format_date(d),
        })
    }
}

impl fmt::Display for GxDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// RFC 3339 text of a UTC date, signed when the year has more than four
/// digits or is negative.
pub(crate) fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(field: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(field) {
        Ok(date) => Ok(date.with_timezone(&Utc)),
        Err(err) => match field.strip_suffix('Z') {
            Some(body) if body.starts_with(['+', '-']) => {
                NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f").map(|d| d.and_utc())
            }
            _ => Err(err),
        },
    }
}

fn needs_quotes(text: &str) -> bool {
    text.contains([',', '"', '\n', '\r'])
}

/// Quotes free text (ids, labels, header names) only when CSV requires it.
pub(crate) fn quote_text(text: &str) -> Cow<'_, str> {
    if needs_quotes(text) {
        Cow::Owned(quote_always(text))
    } else {
        Cow::Borrowed(text)
    }
}

fn quote_always(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn escape_list_element(text: &str, out: &mut String) {
    for ch in text.chars() {
        if ch == LIST_SEPARATOR || ch == LIST_ESCAPE {
            out.push(LIST_ESCAPE);
        }
        out.push(ch);
    }
}

fn split_list(field: &str) -> Result<Vec<String>> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut chars = field.chars();
    while let Some(ch) = chars.next() {
        match ch {
            LIST_ESCAPE => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => {
                    return Err(GxError::malformed(
                        "list",
                        format!("dangling escape at end of '{field}'"),
                    ))
                }
            },
            LIST_SEPARATOR => elements.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    elements.push(current);
    Ok(elements)
}
