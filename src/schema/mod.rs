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

//! # Schema Module
//!
//! Property schema discovery for graph exports.
//!
//! ## Module Components
//!
//! - **Data Type** ([data_type.rs](data_type/index.html)): Column types, widening rules and cell text
//! - **Property** ([property.rs](property/index.html)): Type info and header names of one column
//! - **Registry** ([registry.rs](registry/index.html)): Ordered column registries per label
//!
//! ## Usage Patterns
//!
//! ```rust
//! use gxport::schema::{GxGraphSchema, GxSchema};
//! use gxport::record::GxNode;
//!
//! let mut graph = GxGraphSchema::new();
//! graph.record_node(&GxNode::new("n1", "Person").with_property("name", "Alice"))?;
//! graph.save("export/config.json")?;
//! ```

pub mod data_type;
pub mod property;
pub mod registry;

pub use data_type::GxDataType;
pub use property::GxPropertyTypeInfo;
pub use registry::{
    freeze_label_schemas, merge_label_schemas, GxFrozenSchemas, GxGraphSchema, GxLabelSchemas,
    GxSchema,
};
