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

use serde::{Deserialize, Serialize};

use crate::errors::{GxError, Result};
use crate::record::{GxPropertyKey, GxPropertyValue, GxScalar};
use crate::schema::GxDataType;

/// Inferred type and header names of one property column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GxPropertyTypeInfo {
    property: GxPropertyKey,
    #[serde(default)]
    data_type: GxDataType,
    #[serde(default)]
    is_multi_value: bool,
}

impl GxPropertyTypeInfo {
    /// A column with no observed values yet.
    pub fn new(property: impl Into<GxPropertyKey>) -> Self {
        GxPropertyTypeInfo {
            property: property.into(),
            data_type: GxDataType::None,
            is_multi_value: false,
        }
    }

    /// A column with a declared type.
    pub fn declared(
        property: impl Into<GxPropertyKey>,
        data_type: GxDataType,
        is_multi_value: bool,
    ) -> Self {
        GxPropertyTypeInfo {
            property: property.into(),
            data_type,
            is_multi_value,
        }
    }

    pub fn property(&self) -> &GxPropertyKey {
        &self.property
    }

    pub fn data_type(&self) -> GxDataType {
        self.data_type
    }

    pub fn is_multi_value(&self) -> bool {
        self.is_multi_value
    }

    pub fn name_without_data_type(&self) -> &str {
        self.property.as_str()
    }

    /// `name:Type`, or `name:Type[]` for multi-valued columns.
    pub fn name_with_data_type(&self) -> String {
        let suffix = if self.is_multi_value { "[]" } else { "" };
        format!("{}:{}{}", self.property, self.data_type.type_name(), suffix)
    }

    /// Widens the column type to cover `value`.
    ///
    /// On conflict the column is left unchanged.
    pub fn accept(&mut self, value: &GxPropertyValue) -> Result<()> {
        let (data_type, multi) = match value {
            GxPropertyValue::Scalar(scalar) => (self.widen(scalar.data_type())?, false),
            GxPropertyValue::Sequence(items) => {
                let mut data_type = self.data_type;
                for item in items {
                    data_type = data_type
                        .broaden(item.data_type())
                        .ok_or_else(|| self.conflict(item.data_type()))?;
                }
                (data_type, true)
            }
        };
        self.data_type = data_type;
        self.is_multi_value |= multi;
        Ok(())
    }

    /// Folds another observation of the same property into this one.
    pub fn merge(&mut self, other: &GxPropertyTypeInfo) -> Result<()> {
        if other.property != self.property {
            return Err(GxError::schema(format!(
                "cannot merge column '{}' into '{}'",
                other.property, self.property
            )));
        }
        self.data_type = self.widen(other.data_type)?;
        self.is_multi_value |= other.is_multi_value;
        Ok(())
    }

    /// Type used to render `values` in this column. A column that never saw
    /// a value takes the type of the values themselves.
    pub fn effective_type(&self, values: &[GxScalar]) -> GxDataType {
        if self.data_type != GxDataType::None {
            return self.data_type;
        }
        values.iter().fold(GxDataType::None, |acc, value| {
            acc.broaden(value.data_type()).unwrap_or(acc)
        })
    }

    fn widen(&self, observed: GxDataType) -> Result<GxDataType> {
        self.data_type
            .broaden(observed)
            .ok_or_else(|| self.conflict(observed))
    }

    fn conflict(&self, observed: GxDataType) -> GxError {
        GxError::type_conflict(
            self.property.as_str(),
            self.data_type.type_name(),
            observed.type_name(),
        )
    }
}
