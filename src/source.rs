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

//! # Element Source Module
//!
//! Sharded inputs for an export.
//!
//! An export reads each source twice: once to discover the column registry
//! and once to write. A source must therefore yield the same elements in
//! the same order every time a shard is visited.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::errors::{GxError, Result};

/// A sharded, repeatable stream of elements.
pub trait GxElementSource<E>: Sync {
    fn shard_count(&self) -> usize;

    /// Visits every element of shard `index` in order, stopping at the first
    /// error returned by `visit`.
    fn for_each_in_shard(&self, index: usize, visit: &mut dyn FnMut(E) -> Result<()>) -> Result<()>;
}

fn shard_out_of_range(index: usize, count: usize) -> GxError {
    GxError::validation(format!("shard {index} out of range, source has {count} shards"))
}

/// Elements held in memory, already split into shards.
#[derive(Clone, Debug)]
pub struct GxInMemorySource<E> {
    shards: Vec<Vec<E>>,
}

impl<E> Default for GxInMemorySource<E> {
    fn default() -> Self {
        GxInMemorySource { shards: Vec::new() }
    }
}

impl<E> GxInMemorySource<E> {
    pub fn new(shards: Vec<Vec<E>>) -> Self {
        GxInMemorySource { shards }
    }

    pub fn single(elements: Vec<E>) -> Self {
        GxInMemorySource {
            shards: vec![elements],
        }
    }

    /// Splits `elements` into `shard_count` contiguous shards of near equal
    /// size.
    pub fn split(elements: Vec<E>, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let per_shard = elements.len().div_ceil(shard_count).max(1);
        let mut shards: Vec<Vec<E>> = (0..shard_count).map(|_| Vec::new()).collect();
        for (i, element) in elements.into_iter().enumerate() {
            shards[i / per_shard].push(element);
        }
        GxInMemorySource { shards }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Clone + Send + Sync> GxElementSource<E> for GxInMemorySource<E> {
    fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn for_each_in_shard(&self, index: usize, visit: &mut dyn FnMut(E) -> Result<()>) -> Result<()> {
        let shard = self
            .shards
            .get(index)
            .ok_or_else(|| shard_out_of_range(index, self.shards.len()))?;
        for element in shard {
            visit(element.clone())?;
        }
        Ok(())
    }
}

/// One JSON-lines file per shard.
///
/// Nodes are read from `{"id", "label", "properties"}` objects, edges add
/// `"from"` and `"to"`, query rows carry only `"properties"`. Blank lines
/// are skipped.
#[derive(Clone, Debug)]
pub struct GxJsonlSource<E> {
    paths: Vec<PathBuf>,
    _element: PhantomData<fn() -> E>,
}

impl<E> GxJsonlSource<E> {
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        GxJsonlSource {
            paths: paths.into_iter().map(Into::into).collect(),
            _element: PhantomData,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn read_jsonl<E: DeserializeOwned>(path: &Path, visit: &mut dyn FnMut(E) -> Result<()>) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for (idx, line) in reader.lines().enumerate() {
        let text = line?;
        if text.trim().is_empty() {
            continue;
        }
        let element = serde_json::from_str::<E>(&text).map_err(|e| {
            GxError::validation(format!("{}:{}: {}", path.display(), idx + 1, e))
        })?;
        visit(element)?;
    }
    Ok(())
}

impl<E: DeserializeOwned> GxElementSource<E> for GxJsonlSource<E> {
    fn shard_count(&self) -> usize {
        self.paths.len()
    }

    fn for_each_in_shard(&self, index: usize, visit: &mut dyn FnMut(E) -> Result<()>) -> Result<()> {
        let path = self
            .paths
            .get(index)
            .ok_or_else(|| shard_out_of_range(index, self.paths.len()))?;
        read_jsonl(path, visit)
    }
}
