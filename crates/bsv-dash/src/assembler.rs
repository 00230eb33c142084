//! Selection handling: diff against the cache, compute what is new, assemble
//! one overlay per series name.

use std::sync::Arc;

use bsv_core::timing::Timer;
use bsv_core::{SampleId, Selection};
use bsv_observe::{
    DefaultStyle, Layout, ObservableSource, ObserveResult, Overlay, SeriesHandle,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::cache::RenderCache;
use crate::config::DashboardConfig;
use crate::{DashError, DashResult};

/// Counters over the lifetime of an assembler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub events: u64,
    /// Samples computed and cached.
    pub computed: u64,
    /// Selected samples served from the cache.
    pub reused: u64,
    /// Per-sample computation failures (a retried sample counts again).
    pub failed: u64,
}

/// Owns the observables and the render cache for one dashboard session.
pub struct LayoutAssembler {
    observables: Vec<Box<dyn ObservableSource>>,
    config: DashboardConfig,
    sample_count: usize,
    cache: RenderCache,
    stats: SessionStats,
}

impl LayoutAssembler {
    /// Register `observables` over a sample table of `sample_count` rows.
    ///
    /// Series names must be unique across all observables.
    pub fn new(
        observables: Vec<Box<dyn ObservableSource>>,
        config: DashboardConfig,
        sample_count: usize,
    ) -> DashResult<Self> {
        config.validate()?;
        let cache = RenderCache::new(
            observables
                .iter()
                .flat_map(|o| o.series().iter().map(|s| s.name.clone())),
        )?;
        tracing::debug!(
            observables = observables.len(),
            series = cache.series_names().len(),
            sample_count,
            "dashboard assembled"
        );
        Ok(Self {
            observables,
            config,
            sample_count,
            cache,
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn observables(&self) -> &[Box<dyn ObservableSource>] {
        &self.observables
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Handle one selection event.
    ///
    /// An empty selection yields placeholders and leaves the cache alone.
    /// Otherwise every selected index is bounds-checked before anything is
    /// computed, each uncached index is computed once across all observables
    /// and merged whole, and the layout reuses cached handles.
    ///
    /// If some indices fail to compute or to merge into the cache, the others
    /// are still cached and the error lists every failure; failed indices
    /// stay uncached.
    pub fn on_selection(&mut self, selection: &Selection) -> DashResult<Layout> {
        self.stats.events += 1;
        if selection.is_empty() {
            tracing::info!("empty selection, showing placeholders");
            return Ok(self.placeholder_layout());
        }

        for id in selection.iter() {
            if id.as_usize() >= self.sample_count {
                return Err(DashError::IndexOutOfRange {
                    index: id,
                    len: self.sample_count,
                });
            }
        }

        let timer = Timer::start("selection");
        let new = selection.unseen(|id| self.cache.contains(id));
        let reused = selection.len() - new.len();

        let style = &self.config.default_style;
        let observables = &self.observables;
        let results: Vec<(SampleId, ObserveResult<Vec<SeriesHandle>>)> = if self.config.parallel {
            new.par_iter()
                .map(|&id| (id, compute_sample(observables, id, style)))
                .collect()
        } else {
            new.iter()
                .map(|&id| (id, compute_sample(observables, id, style)))
                .collect()
        };

        let mut failures: Vec<(SampleId, DashError)> = Vec::new();
        let mut computed = 0u64;
        for (id, result) in results {
            let merged = result
                .map_err(DashError::from)
                .and_then(|series| self.cache.insert_sample(id, series));
            match merged {
                Ok(()) => computed += 1,
                Err(err) => {
                    tracing::warn!(sample = %id, error = %err, "sample computation failed");
                    failures.push((id, err));
                }
            }
        }

        self.stats.computed += computed;
        self.stats.reused += reused as u64;
        self.stats.failed += failures.len() as u64;
        tracing::info!(
            selected = selection.len(),
            computed,
            reused,
            failed = failures.len(),
            elapsed_s = timer.stop(),
            "selection handled"
        );

        if !failures.is_empty() {
            return Err(DashError::Computation { failures });
        }
        Ok(self.assemble(selection))
    }

    /// One placeholder overlay per declared series, no computation.
    pub fn placeholder_layout(&self) -> Layout {
        let style = &self.config.default_style;
        let mut layout = Layout::new(self.config.columns);
        for observable in &self.observables {
            for series in observable.placeholders(style) {
                let mut overlay = Overlay::new(series.series.clone(), self.config.legend_position);
                overlay.push(Arc::new(series));
                layout.panels.push(overlay);
            }
        }
        layout
    }

    fn assemble(&self, selection: &Selection) -> Layout {
        let mut layout = Layout::new(self.config.columns);
        for name in self.cache.series_names() {
            let mut overlay = Overlay::new(name.clone(), self.config.legend_position);
            for id in selection.iter() {
                if let Some(handle) = self.cache.get(name, id) {
                    overlay.push(Arc::clone(handle));
                }
            }
            layout.panels.push(overlay);
        }
        layout
    }
}

/// Realize one sample across every observable, registration order.
///
/// Either every series of the sample is produced or an error is returned;
/// nothing is cached from a partial result.
fn compute_sample(
    observables: &[Box<dyn ObservableSource>],
    id: SampleId,
    style: &DefaultStyle,
) -> ObserveResult<Vec<SeriesHandle>> {
    let timer = Timer::start("sample compute");
    let mut out = Vec::new();
    for observable in observables {
        out.extend(observable.realize(id, style)?.into_iter().map(Arc::new));
    }
    tracing::debug!(sample = %id, series = out.len(), "sample computed");
    timer.stop_and_log();
    Ok(out)
}
