//! Renderer interface and a renderer that produces a serializable scene.

use bsv_observe::{
    Layout, LegendPosition, Overlay, PlotOptions, RenderedSeries, SeriesKind,
};
use serde::Serialize;

/// Turns a layout into back-end drawables.
///
/// Series are dispatched on their kind; overlays combine the drawables of one
/// panel; the grid arranges panels.
pub trait Renderer {
    type Drawable;
    type Panel;
    type Output;

    fn curve(&mut self, series: &RenderedSeries) -> Self::Drawable;

    fn scatter(&mut self, series: &RenderedSeries) -> Self::Drawable;

    fn overlay(&mut self, overlay: &Overlay, drawables: Vec<Self::Drawable>) -> Self::Panel;

    fn grid(&mut self, layout: &Layout, panels: Vec<Self::Panel>) -> Self::Output;

    fn draw(&mut self, series: &RenderedSeries) -> Self::Drawable {
        match series.kind {
            SeriesKind::Curve => self.curve(series),
            SeriesKind::Scatter => self.scatter(series),
        }
    }

    fn render(&mut self, layout: &Layout) -> Self::Output {
        let panels = layout
            .panels
            .iter()
            .map(|overlay| {
                let drawables = overlay.entries.iter().map(|e| self.draw(&e.series)).collect();
                self.overlay(overlay, drawables)
            })
            .collect();
        self.grid(layout, panels)
    }
}

/// How a scene series is marked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mark", rename_all = "snake_case")]
pub enum Mark {
    Line { width: f64 },
    Points { size: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSeries {
    pub key: String,
    pub kind: SeriesKind,
    #[serde(flatten)]
    pub mark: Mark,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePanel {
    pub series: String,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub placeholder: bool,
    pub legend: LegendPosition,
    /// Panel frame, from the first entry's options.
    pub options: PlotOptions,
    pub entries: Vec<SceneSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub columns: usize,
    pub shared_axes: bool,
    pub panels: Vec<ScenePanel>,
}

/// Renders to plain data, for dumping or handing to an external plotter.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    pub line_width: f64,
    pub marker_size: f64,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            marker_size: 6.0,
        }
    }
}

impl SceneRenderer {
    fn series(&self, series: &RenderedSeries, mark: Mark) -> SceneSeries {
        SceneSeries {
            key: series.legend_key(),
            kind: series.kind,
            mark,
            x: series.data.x.clone(),
            y: series.data.y.clone(),
            color: series.options.color.clone(),
        }
    }
}

impl Renderer for SceneRenderer {
    type Drawable = SceneSeries;
    type Panel = ScenePanel;
    type Output = Scene;

    fn curve(&mut self, series: &RenderedSeries) -> SceneSeries {
        let width = series.options.line_width.unwrap_or(self.line_width);
        self.series(series, Mark::Line { width })
    }

    fn scatter(&mut self, series: &RenderedSeries) -> SceneSeries {
        let size = series.options.marker_size.unwrap_or(self.marker_size);
        self.series(series, Mark::Points { size })
    }

    fn overlay(&mut self, overlay: &Overlay, drawables: Vec<SceneSeries>) -> ScenePanel {
        let first = overlay.entries.first().map(|e| &e.series);
        ScenePanel {
            series: overlay.series_name.clone(),
            title: overlay.title().to_string(),
            xlabel: first.map(|s| s.xlabel().to_string()).unwrap_or_default(),
            ylabel: first.map(|s| s.ylabel().to_string()).unwrap_or_default(),
            placeholder: overlay.is_placeholder(),
            legend: overlay.legend_position,
            options: first.map(|s| s.options.clone()).unwrap_or_default(),
            entries: drawables,
        }
    }

    fn grid(&mut self, layout: &Layout, panels: Vec<ScenePanel>) -> Scene {
        Scene {
            columns: layout.columns,
            shared_axes: layout.shared_axes(),
            panels,
        }
    }
}
