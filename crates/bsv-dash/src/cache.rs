//! Insert-only render cache: series name -> sample -> rendered series.

use std::collections::{BTreeSet, HashMap};

use bsv_core::SampleId;
use bsv_observe::SeriesHandle;
use serde::Serialize;

use crate::{DashError, DashResult};

/// Per-series buckets of rendered series, filled one whole sample at a time.
///
/// The set of series names is fixed at construction. A sample is either in
/// every bucket or in none, and an entry once inserted is never replaced or
/// evicted, so a handle read for a sample is the same handle on every read.
#[derive(Debug, Default)]
pub struct RenderCache {
    names: Vec<String>,
    buckets: HashMap<String, HashMap<SampleId, SeriesHandle>>,
    samples: BTreeSet<SampleId>,
}

/// Size of the cache, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub series: usize,
    pub samples: usize,
    pub entries: usize,
}

impl RenderCache {
    /// One empty bucket per name; names must be unique.
    pub fn new<I, S>(names: I) -> DashResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cache = Self::default();
        for name in names {
            let name = name.into();
            if cache.buckets.contains_key(&name) {
                return Err(DashError::DuplicateSeries { name });
            }
            cache.buckets.insert(name.clone(), HashMap::new());
            cache.names.push(name);
        }
        Ok(cache)
    }

    /// Series names in registration order.
    pub fn series_names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, id: SampleId) -> bool {
        self.samples.contains(&id)
    }

    pub fn get(&self, series: &str, id: SampleId) -> Option<&SeriesHandle> {
        self.buckets.get(series)?.get(&id)
    }

    /// Cached samples, ascending.
    pub fn samples(&self) -> impl Iterator<Item = SampleId> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Store every series of one sample.
    ///
    /// `series` must cover each bucket exactly once. Entries already cached
    /// for `id` are kept; the sample is rejected whole if any handle names an
    /// unknown series or a bucket is left uncovered.
    pub fn insert_sample(&mut self, id: SampleId, series: Vec<SeriesHandle>) -> DashResult<()> {
        let mut by_name: HashMap<&str, &SeriesHandle> = HashMap::with_capacity(series.len());
        for handle in &series {
            if !self.buckets.contains_key(&handle.series) {
                return Err(DashError::InvalidConfig {
                    what: format!("series '{}' has no cache bucket", handle.series),
                });
            }
            if by_name.insert(handle.series.as_str(), handle).is_some() {
                return Err(DashError::DuplicateSeries {
                    name: handle.series.clone(),
                });
            }
        }
        if let Some(missing) = self.names.iter().find(|n| !by_name.contains_key(n.as_str())) {
            return Err(DashError::InvalidConfig {
                what: format!("sample {id} produced no series '{missing}'"),
            });
        }

        for (name, handle) in by_name {
            if let Some(bucket) = self.buckets.get_mut(name) {
                bucket.entry(id).or_insert_with(|| SeriesHandle::clone(handle));
            }
        }
        self.samples.insert(id);
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            series: self.names.len(),
            samples: self.samples.len(),
            entries: self.buckets.values().map(HashMap::len).sum(),
        }
    }
}
