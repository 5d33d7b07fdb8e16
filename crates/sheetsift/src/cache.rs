//! Memoized loading
//!
//! Re-running a pipeline with new filter choices should not reparse the
//! workbook. [`LoadCache`] keys each load by a hash of the file content
//! plus the options, so the same bytes loaded the same way are parsed
//! once and shared afterwards.

use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

use ahash::{AHashMap, RandomState};
use sheetsift_core::{SheetSelector, Table};

use crate::error::LoadError;
use crate::loader::{load_bytes, LoadOptions, Source};

/// Fixed seeds so content hashes agree across cache instances
const SEEDS: (u64, u64, u64, u64) = (
    0x5345_4554_5349_4654,
    0x6c6f_6164_2d63_6163,
    0x6865_2d6b_6579_2d31,
    0x7368_6565_7473_6966,
);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    content_hash: u64,
    content_len: usize,
    sheet: SheetSelector,
    header_row: usize,
    unmerge_cells: bool,
    skip_blank_rows: bool,
}

/// Loaded tables keyed by workbook content and load options
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: AHashMap<CacheKey, Arc<Table>>,
    hits: usize,
    misses: usize,
}

impl LoadCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table, reusing an earlier result for the same content and options
    pub fn load<'a>(
        &mut self,
        source: impl Into<Source<'a>>,
        options: &LoadOptions,
    ) -> Result<Arc<Table>, LoadError> {
        let bytes = source.into().read()?;
        let key = CacheKey {
            content_hash: content_hash(&bytes),
            content_len: bytes.len(),
            sheet: options.sheet.clone(),
            header_row: options.header_row,
            unmerge_cells: options.unmerge_cells,
            skip_blank_rows: options.skip_blank_rows,
        };

        if let Some(table) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("load cache hit for sheet {}", options.sheet);
            return Ok(Arc::clone(table));
        }

        self.misses += 1;
        let table = Arc::new(load_bytes(&bytes, options)?);
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads answered from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Loads that had to parse the workbook
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drop every cached table
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn content_hash(bytes: &[u8]) -> u64 {
    let state = RandomState::with_seeds(SEEDS.0, SEEDS.1, SEEDS.2, SEEDS.3);
    let mut hasher = state.build_hasher();
    hasher.write(bytes);
    hasher.finish()
}
