//! Observables over pre-tabulated data, and the interface shared with live ones.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bsv_core::{LabelMap, SampleId};
use serde::{Deserialize, Serialize};

use crate::dataset::{KeyedArrays, RowTable, SeriesDataset, WideTable};
use crate::layout::{Layout, LegendPosition, Overlay};
use crate::series::{RenderedSeries, SeriesHandle, SeriesSpec};
use crate::style::{DefaultStyle, PlotOptions, SeriesKind};
use crate::{ObserveError, ObserveResult};

/// Series name -> (sample -> rendered series).
pub type SeriesBatch = HashMap<String, BTreeMap<SampleId, SeriesHandle>>;

/// A single value shared by every series, or one value per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    /// Expand to exactly `n` values.
    ///
    /// A single value (or a one-element list) is broadcast; a list must
    /// otherwise have exactly `n` entries.
    pub fn resolve(self, n: usize, what: &'static str) -> ObserveResult<Vec<T>> {
        match self {
            OneOrMany::One(v) => Ok(vec![v; n]),
            OneOrMany::Many(v) if v.len() == n => Ok(v),
            OneOrMany::Many(v) if v.len() == 1 => Ok(vec![v[0].clone(); n]),
            OneOrMany::Many(v) => Err(ObserveError::LengthMismatch {
                what,
                expected: n,
                actual: v.len(),
            }),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(v: T) -> Self {
        OneOrMany::One(v)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(v: Vec<T>) -> Self {
        OneOrMany::Many(v)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(v: &str) -> Self {
        OneOrMany::One(v.to_string())
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(v: Vec<&str>) -> Self {
        OneOrMany::Many(v.into_iter().map(str::to_string).collect())
    }
}

/// Names, kinds, options and labels common to every observable.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    names: OneOrMany<String>,
    kinds: OneOrMany<SeriesKind>,
    options: Option<OneOrMany<PlotOptions>>,
    labels: Option<LabelMap>,
}

impl SeriesConfig {
    pub fn new(names: impl Into<OneOrMany<String>>) -> Self {
        Self {
            names: names.into(),
            kinds: OneOrMany::One(SeriesKind::default()),
            options: None,
            labels: None,
        }
    }

    pub fn kind(mut self, kinds: impl Into<OneOrMany<SeriesKind>>) -> Self {
        self.kinds = kinds.into();
        self
    }

    pub fn options(mut self, options: impl Into<OneOrMany<PlotOptions>>) -> Self {
        self.options = Some(options.into());
        self
    }

    pub fn labels(mut self, labels: LabelMap) -> Self {
        self.labels = Some(labels);
        self
    }

    pub(crate) fn resolve(self) -> ObserveResult<(Vec<SeriesSpec>, Option<LabelMap>)> {
        let names = self.names.into_vec();
        if names.is_empty() {
            return Err(ObserveError::NoSeries);
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ObserveError::DuplicateSeries(name.clone()));
            }
        }

        let n = names.len();
        let kinds = self.kinds.resolve(n, "plot kinds")?;
        let options = match self.options {
            Some(opts) => opts.resolve(n, "plot options")?.into_iter().map(Some).collect(),
            None => vec![None; n],
        };

        let specs = names
            .into_iter()
            .zip(kinds)
            .zip(options)
            .map(|((name, kind), options)| SeriesSpec {
                name,
                kind,
                options,
                axes: None,
            })
            .collect();
        Ok((specs, self.labels))
    }
}

/// Anything that can realize named series for a sample.
///
/// Implementations must be deterministic: realizing the same sample twice
/// yields equal series. Callers rely on that to realize each sample once.
pub trait ObservableSource: Send + Sync {
    /// Declared series, in order.
    fn series(&self) -> &[SeriesSpec];

    fn labels(&self) -> Option<&LabelMap>;

    /// Realize every declared series for one sample, in declared order.
    fn realize(&self, id: SampleId, style: &DefaultStyle) -> ObserveResult<Vec<RenderedSeries>>;

    fn names(&self) -> Vec<&str> {
        self.series().iter().map(|s| s.name.as_str()).collect()
    }

    /// Short human-readable summary.
    fn describe(&self) -> String {
        let names = self.names();
        if names.len() > 1 {
            let mut out = String::from("Grouped Observables");
            for (i, name) in names.iter().enumerate() {
                out.push_str(&format!("\n\t- Observable {}: {}", i + 1, name));
            }
            out
        } else {
            format!("Observable\nName: {}", names.join(""))
        }
    }

    /// Realize `indices` for every series.
    fn generate(&self, indices: &[SampleId], style: &DefaultStyle) -> ObserveResult<SeriesBatch> {
        let mut batch: SeriesBatch = self
            .series()
            .iter()
            .map(|s| (s.name.clone(), BTreeMap::new()))
            .collect();
        for &id in indices {
            let realized = self.realize(id, style)?;
            tracing::debug!(sample = %id, series = realized.len(), "realized sample");
            for series in realized {
                if let Some(bucket) = batch.get_mut(&series.series) {
                    bucket.insert(id, Arc::new(series));
                }
            }
        }
        Ok(batch)
    }

    /// One empty placeholder per declared series.
    fn placeholders(&self, style: &DefaultStyle) -> Vec<RenderedSeries> {
        self.series()
            .iter()
            .map(|spec| RenderedSeries::placeholder(spec, self.labels(), style))
            .collect()
    }

    /// `generate` plus one overlay per series, panels side by side.
    fn render(&self, indices: &[SampleId], style: &DefaultStyle) -> ObserveResult<Layout> {
        let batch = self.generate(indices, style)?;
        let mut layout = Layout::new(self.series().len());
        for spec in self.series() {
            let mut overlay = Overlay::new(spec.name.clone(), LegendPosition::Right);
            if let Some(bucket) = batch.get(&spec.name) {
                for id in indices {
                    if let Some(series) = bucket.get(id) {
                        overlay.push(Arc::clone(series));
                    }
                }
            }
            layout.panels.push(overlay);
        }
        Ok(layout)
    }
}

/// Dataset input accepted by `Observable::new`.
#[derive(Debug, Clone)]
pub enum ObservableData {
    /// One dataset per series name, in order.
    PerSeries(Vec<SeriesDataset>),
    /// One wide table whose columns back successive series names.
    Wide(WideTable),
}

impl From<SeriesDataset> for ObservableData {
    fn from(d: SeriesDataset) -> Self {
        ObservableData::PerSeries(vec![d])
    }
}

impl From<KeyedArrays> for ObservableData {
    fn from(d: KeyedArrays) -> Self {
        ObservableData::PerSeries(vec![d.into()])
    }
}

impl From<RowTable> for ObservableData {
    fn from(d: RowTable) -> Self {
        ObservableData::PerSeries(vec![d.into()])
    }
}

impl From<Vec<SeriesDataset>> for ObservableData {
    fn from(d: Vec<SeriesDataset>) -> Self {
        ObservableData::PerSeries(d)
    }
}

impl From<WideTable> for ObservableData {
    fn from(d: WideTable) -> Self {
        ObservableData::Wide(d)
    }
}

/// Observable backed by pre-tabulated per-sample data.
#[derive(Debug, Clone)]
pub struct Observable {
    specs: Vec<SeriesSpec>,
    datasets: Vec<SeriesDataset>,
    labels: Option<LabelMap>,
}

impl Observable {
    pub fn new(config: SeriesConfig, data: impl Into<ObservableData>) -> ObserveResult<Self> {
        let (mut specs, labels) = config.resolve()?;

        let datasets = match data.into() {
            ObservableData::PerSeries(sets) => sets,
            ObservableData::Wide(table) => {
                if table.columns().len() != specs.len() {
                    return Err(ObserveError::LengthMismatch {
                        what: "wide table columns",
                        expected: specs.len(),
                        actual: table.columns().len(),
                    });
                }
                table.into_datasets()?
            }
        };
        if datasets.len() != specs.len() {
            return Err(ObserveError::LengthMismatch {
                what: "datasets",
                expected: specs.len(),
                actual: datasets.len(),
            });
        }

        for (spec, dataset) in specs.iter_mut().zip(&datasets) {
            match dataset.field_names().as_slice() {
                [x, y] => spec.axes = Some((x.clone(), y.clone())),
                other => {
                    return Err(ObserveError::SeriesShape {
                        series: spec.name.clone(),
                        fields: other.to_vec(),
                    });
                }
            }
        }

        Ok(Self {
            specs,
            datasets,
            labels,
        })
    }

    pub fn datasets(&self) -> &[SeriesDataset] {
        &self.datasets
    }

    /// Number of samples every dataset covers.
    pub fn sample_len(&self) -> usize {
        self.datasets.iter().map(SeriesDataset::len).min().unwrap_or(0)
    }
}

impl ObservableSource for Observable {
    fn series(&self) -> &[SeriesSpec] {
        &self.specs
    }

    fn labels(&self) -> Option<&LabelMap> {
        self.labels.as_ref()
    }

    fn realize(&self, id: SampleId, style: &DefaultStyle) -> ObserveResult<Vec<RenderedSeries>> {
        self.specs
            .iter()
            .zip(&self.datasets)
            .map(|(spec, dataset)| -> ObserveResult<RenderedSeries> {
                let frame = dataset.unpack(id).map_err(|err| match err {
                    ObserveError::IndexOutOfRange { index, len, .. } => {
                        ObserveError::IndexOutOfRange {
                            what: spec.name.clone(),
                            index,
                            len,
                        }
                    }
                    other => other,
                })?;
                RenderedSeries::build(spec, id, &frame, self.labels.as_ref(), style)
            })
            .collect()
    }
}
