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

//! # Gxport Record Module
//!
//! This module provides the element records that flow from a source into a
//! printer: nodes, edges and ad-hoc query rows, each carrying an ordered
//! property map.
//!
//! ## Design Principles
//!
//! - **Shape resolved once**: A property value is either a scalar or a
//!   sequence of scalars. The distinction is made when the value is read from
//!   the source, never re-inspected while formatting
//! - **Typed scalars**: Every scalar carries its own runtime type, so the
//!   schema registry can infer column types without guessing from text
//! - **Ordered maps**: Property maps keep insertion order, which makes the
//!   first-seen column order of an export deterministic
//! - **Ephemeral**: Records are built per source row, printed, and dropped
//!
//! ## Usage Example
//!
//! ```rust
//! use gxport::record::{GxNode, GxEdge, GxPropertyValue};
//!
//! let alice = GxNode::new("n1", "Person")
//!     .with_property("name", "Alice")
//!     .with_property("age", 30);
//!
//! let knows = GxEdge::new("e1", "KNOWS", "n1", "n2")
//!     .with_property("since", 2020)
//!     .with_property("tags", GxPropertyValue::sequence(["close", "work"]));
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{GxError, Result};
use crate::schema::data_type::format_date;
use crate::schema::GxDataType;

/// Identifier naming a property across all elements of one kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GxPropertyKey(String);

impl GxPropertyKey {
    pub fn new(name: impl Into<String>) -> Self {
        GxPropertyKey(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GxPropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for GxPropertyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GxPropertyKey {
    fn from(name: &str) -> Self {
        GxPropertyKey(name.to_string())
    }
}

impl From<String> for GxPropertyKey {
    fn from(name: String) -> Self {
        GxPropertyKey(name)
    }
}

/// A single typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum GxScalar {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(DateTime<Utc>),
}

impl GxScalar {
    /// The narrowest data type that holds this value.
    pub fn data_type(&self) -> GxDataType {
        match self {
            GxScalar::Bool(_) => GxDataType::Boolean,
            GxScalar::Byte(_) => GxDataType::Byte,
            GxScalar::Short(_) => GxDataType::Short,
            GxScalar::Int(_) => GxDataType::Int,
            GxScalar::Long(_) => GxDataType::Long,
            GxScalar::Float(_) => GxDataType::Float,
            GxScalar::Double(_) => GxDataType::Double,
            GxScalar::String(_) => GxDataType::String,
            GxScalar::Date(_) => GxDataType::Date,
        }
    }

    /// Integral values widened to `i64`, or `None` for other variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GxScalar::Byte(v) => Some(i64::from(*v)),
            GxScalar::Short(v) => Some(i64::from(*v)),
            GxScalar::Int(v) => Some(i64::from(*v)),
            GxScalar::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric values widened to `f64`, or `None` for other variants.
    ///
    /// `Long` is excluded because the conversion is lossy.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GxScalar::Byte(v) => Some(f64::from(*v)),
            GxScalar::Short(v) => Some(f64::from(*v)),
            GxScalar::Int(v) => Some(f64::from(*v)),
            GxScalar::Float(v) => Some(f64::from(*v)),
            GxScalar::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts a JSON scalar. Integers that fit `i32` become `Int`, wider
    /// integers `Long`, other numbers `Double`. Integers above `i64::MAX`
    /// are rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(GxScalar::Bool(*b)),
            Value::String(s) => Ok(GxScalar::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(match i32::try_from(i) {
                        Ok(small) => GxScalar::Int(small),
                        Err(_) => GxScalar::Long(i),
                    })
                } else if n.is_u64() {
                    Err(GxError::malformed("Long", format!("{n} is out of range")))
                } else if let Some(f) = n.as_f64() {
                    Ok(GxScalar::Double(f))
                } else {
                    Err(GxError::malformed("Long", format!("{n} is out of range")))
                }
            }
            other => Err(GxError::malformed(
                "scalar",
                format!("unsupported json value {other}"),
            )),
        }
    }

    /// Renders the value as JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            GxScalar::Bool(b) => Value::Bool(*b),
            GxScalar::Byte(v) => Value::from(*v),
            GxScalar::Short(v) => Value::from(*v),
            GxScalar::Int(v) => Value::from(*v),
            GxScalar::Long(v) => Value::from(*v),
            GxScalar::Float(v) => serde_json::Number::from_f64(f64::from(*v))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            GxScalar::Double(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            GxScalar::String(s) => Value::String(s.clone()),
            GxScalar::Date(d) => Value::String(format_date(d)),
        }
    }
}

impl From<bool> for GxScalar {
    fn from(v: bool) -> Self {
        GxScalar::Bool(v)
    }
}

impl From<i8> for GxScalar {
    fn from(v: i8) -> Self {
        GxScalar::Byte(v)
    }
}

impl From<i16> for GxScalar {
    fn from(v: i16) -> Self {
        GxScalar::Short(v)
    }
}

impl From<i32> for GxScalar {
    fn from(v: i32) -> Self {
        GxScalar::Int(v)
    }
}

impl From<i64> for GxScalar {
    fn from(v: i64) -> Self {
        GxScalar::Long(v)
    }
}

impl From<f32> for GxScalar {
    fn from(v: f32) -> Self {
        GxScalar::Float(v)
    }
}

impl From<f64> for GxScalar {
    fn from(v: f64) -> Self {
        GxScalar::Double(v)
    }
}

impl From<&str> for GxScalar {
    fn from(v: &str) -> Self {
        GxScalar::String(v.to_string())
    }
}

impl From<String> for GxScalar {
    fn from(v: String) -> Self {
        GxScalar::String(v)
    }
}

impl From<DateTime<Utc>> for GxScalar {
    fn from(v: DateTime<Utc>) -> Self {
        GxScalar::Date(v)
    }
}

/// A property value as stored on one element: a scalar, or an ordered
/// sequence of scalars when the source property is multi-valued.
#[derive(Clone, Debug, PartialEq)]
pub enum GxPropertyValue {
    Scalar(GxScalar),
    Sequence(Vec<GxScalar>),
}

impl GxPropertyValue {
    /// Builds a sequence value from anything convertible to scalars.
    pub fn sequence<T, I>(values: I) -> Self
    where
        T: Into<GxScalar>,
        I: IntoIterator<Item = T>,
    {
        GxPropertyValue::Sequence(values.into_iter().map(Into::into).collect())
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, GxPropertyValue::Sequence(_))
    }

    /// Converts a JSON value. `null` means the property is absent and yields
    /// `Ok(None)`; objects and nested arrays are rejected.
    pub fn from_json(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let mut scalars = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Array(_) | Value::Object(_) | Value::Null => {
                            return Err(GxError::malformed(
                                "list",
                                format!("list elements must be scalars, got {item}"),
                            ))
                        }
                        scalar => scalars.push(GxScalar::from_json(scalar)?),
                    }
                }
                Ok(Some(GxPropertyValue::Sequence(scalars)))
            }
            Value::Object(_) => Err(GxError::malformed(
                "property",
                format!("nested objects are not supported: {value}"),
            )),
            scalar => Ok(Some(GxPropertyValue::Scalar(GxScalar::from_json(scalar)?))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            GxPropertyValue::Scalar(s) => s.to_json(),
            GxPropertyValue::Sequence(items) => {
                Value::Array(items.iter().map(GxScalar::to_json).collect())
            }
        }
    }
}

macro_rules! scalar_property_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for GxPropertyValue {
                fn from(value: $ty) -> Self {
                    GxPropertyValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_property_from!(GxScalar, bool, i8, i16, i32, i64, f32, f64, &str, String, DateTime<Utc>);

impl From<Vec<GxScalar>> for GxPropertyValue {
    fn from(values: Vec<GxScalar>) -> Self {
        GxPropertyValue::Sequence(values)
    }
}

/// Insertion-ordered property map of one element.
///
/// Lookups go through a hash index; iteration follows insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GxPropertyMap {
    entries: Vec<(GxPropertyKey, GxPropertyValue)>,
    index: HashMap<GxPropertyKey, usize>,
}

impl GxPropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing (in place) any previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<GxPropertyKey>,
        value: impl Into<GxPropertyValue>,
    ) -> Option<GxPropertyValue> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&GxPropertyValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GxPropertyKey, &GxPropertyValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &GxPropertyKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Builds a map from a JSON object, dropping `null` members.
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let mut properties = GxPropertyMap::new();
        for (key, value) in map {
            let converted = GxPropertyValue::from_json(value).map_err(|err| match err {
                GxError::MalformedValue { data_type, message } => GxError::MalformedValue {
                    data_type,
                    message: format!("property '{key}': {message}"),
                },
                other => other,
            })?;
            if let Some(converted) = converted {
                properties.insert(key.as_str(), converted);
            }
        }
        Ok(properties)
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_json()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for GxPropertyMap
where
    K: Into<GxPropertyKey>,
    V: Into<GxPropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = GxPropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl TryFrom<Map<String, Value>> for GxPropertyMap {
    type Error = GxError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        GxPropertyMap::from_json_map(&map)
    }
}

impl From<GxPropertyMap> for Map<String, Value> {
    fn from(map: GxPropertyMap) -> Self {
        map.to_json_map()
    }
}

impl Serialize for GxPropertyMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GxPropertyMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        GxPropertyMap::from_json_map(&map).map_err(serde::de::Error::custom)
    }
}

/// A graph vertex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GxNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub properties: GxPropertyMap,
}

impl GxNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        GxNode {
            id: id.into(),
            label: label.into(),
            properties: GxPropertyMap::new(),
        }
    }

    pub fn with_property(
        mut self,
        key: impl Into<GxPropertyKey>,
        value: impl Into<GxPropertyValue>,
    ) -> Self {
        self.properties.insert(key, value);
        self
    }
}

/// A directed graph edge between two vertex ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GxEdge {
    pub id: String,
    pub label: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub properties: GxPropertyMap,
}

impl GxEdge {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        GxEdge {
            id: id.into(),
            label: label.into(),
            from: from.into(),
            to: to.into(),
            properties: GxPropertyMap::new(),
        }
    }

    pub fn with_property(
        mut self,
        key: impl Into<GxPropertyKey>,
        value: impl Into<GxPropertyValue>,
    ) -> Self {
        self.properties.insert(key, value);
        self
    }
}

/// One result row of an ad-hoc named query. It has no identity columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GxQueryRow {
    #[serde(default)]
    pub properties: GxPropertyMap,
}

impl GxQueryRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(
        mut self,
        key: impl Into<GxPropertyKey>,
        value: impl Into<GxPropertyValue>,
    ) -> Self {
        self.properties.insert(key, value);
        self
    }
}
