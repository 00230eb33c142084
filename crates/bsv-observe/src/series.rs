//! Rendered series: what one series looks like for one sample.

use std::sync::Arc;

use bsv_core::{LabelMap, Real, SampleId, resolve_label};
use serde::Serialize;

use crate::dataset::{Cell, SeriesFrame};
use crate::style::{DefaultStyle, PlotOptions, SeriesKind};
use crate::{ObserveError, ObserveResult};

/// Legend key of the placeholder shown when nothing is selected.
pub const PLACEHOLDER_KEY: &str = "None";

/// Static description of one named series of an observable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub kind: SeriesKind,
    pub options: Option<PlotOptions>,
    /// (key, value) field names, when known before any sample is computed.
    pub axes: Option<(String, String)>,
}

impl SeriesSpec {
    pub fn new(name: impl Into<String>, kind: SeriesKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: None,
            axes: None,
        }
    }

    fn base_options(
        &self,
        title: String,
        axes: Option<(&str, &str)>,
        labels: Option<&LabelMap>,
        style: &DefaultStyle,
    ) -> PlotOptions {
        let mut base = style.as_options();
        base.title = Some(title);
        if let Some((x, y)) = axes {
            base.xlabel = Some(resolve_label(x, labels));
            base.ylabel = Some(resolve_label(y, labels));
        }
        match &self.options {
            Some(user) => user.layered_over(&base),
            None => base,
        }
    }
}

/// Paired x/y values of a rendered series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesData {
    pub x: Vec<Real>,
    pub y: Vec<Real>,
}

impl SeriesData {
    /// Pair two cells; a scalar paired with a sequence is broadcast.
    pub fn from_cells(series: &str, x: &Cell, y: &Cell) -> ObserveResult<Self> {
        let (xs, ys) = match (x, y) {
            (Cell::Scalar(a), Cell::Series(b)) => (vec![*a; b.len()], b.clone()),
            (Cell::Series(a), Cell::Scalar(b)) => (a.clone(), vec![*b; a.len()]),
            _ if x.len() == y.len() => (x.as_slice().to_vec(), y.as_slice().to_vec()),
            _ => {
                return Err(ObserveError::DataLengthMismatch {
                    series: series.to_string(),
                    x_len: x.len(),
                    y_len: y.len(),
                });
            }
        };
        Ok(Self { x: xs, y: ys })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (Real, Real)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// One series for one sample, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSeries {
    /// Declared series name this belongs to.
    pub series: String,
    /// `None` for the no-selection placeholder.
    pub sample: Option<SampleId>,
    pub kind: SeriesKind,
    pub x_field: String,
    pub y_field: String,
    pub data: SeriesData,
    /// Default style, title and axis labels, with user options on top.
    pub options: PlotOptions,
}

/// Shared handle; the render cache hands out the same handle for a sample
/// on every selection.
pub type SeriesHandle = Arc<RenderedSeries>;

impl RenderedSeries {
    pub fn build(
        spec: &SeriesSpec,
        sample: SampleId,
        frame: &SeriesFrame,
        labels: Option<&LabelMap>,
        style: &DefaultStyle,
    ) -> ObserveResult<Self> {
        let ((x_field, x), (y_field, y)) = frame.pair(&spec.name)?;
        let data = SeriesData::from_cells(&spec.name, x, y)?;
        let options = spec.base_options(
            spec.name.clone(),
            Some((x_field.as_str(), y_field.as_str())),
            labels,
            style,
        );
        Ok(Self {
            series: spec.name.clone(),
            sample: Some(sample),
            kind: spec.kind,
            x_field: x_field.clone(),
            y_field: y_field.clone(),
            data,
            options,
        })
    }

    /// Empty series standing in for a series while nothing is selected.
    pub fn placeholder(spec: &SeriesSpec, labels: Option<&LabelMap>, style: &DefaultStyle) -> Self {
        let axes = spec.axes.as_ref().map(|(x, y)| (x.as_str(), y.as_str()));
        let options = spec.base_options(
            format!("{} - No Selection", spec.name),
            axes,
            labels,
            style,
        );
        let (x_field, y_field) = spec.axes.clone().unwrap_or_default();
        Self {
            series: spec.name.clone(),
            sample: None,
            kind: spec.kind,
            x_field,
            y_field,
            data: SeriesData::default(),
            options,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.sample.is_none()
    }

    pub fn legend_key(&self) -> String {
        match self.sample {
            Some(id) => id.to_string(),
            None => PLACEHOLDER_KEY.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        self.options.title.as_deref().unwrap_or(&self.series)
    }

    pub fn xlabel(&self) -> &str {
        self.options.xlabel.as_deref().unwrap_or(&self.x_field)
    }

    pub fn ylabel(&self) -> &str {
        self.options.ylabel.as_deref().unwrap_or(&self.y_field)
    }
}
