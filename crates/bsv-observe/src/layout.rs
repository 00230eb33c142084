//! Overlays and panel grids.

use serde::{Deserialize, Serialize};

use crate::series::SeriesHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
    Hidden,
}

/// One legend entry of an overlay: a sample's series under its legend key.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub key: String,
    pub series: SeriesHandle,
}

/// All selected samples of one series name, drawn on shared axes.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub series_name: String,
    pub entries: Vec<LegendEntry>,
    pub legend_position: LegendPosition,
}

impl Overlay {
    pub fn new(series_name: impl Into<String>, legend_position: LegendPosition) -> Self {
        Self {
            series_name: series_name.into(),
            entries: Vec::new(),
            legend_position,
        }
    }

    pub fn push(&mut self, series: SeriesHandle) {
        self.entries.push(LegendEntry {
            key: series.legend_key(),
            series,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Panel title, taken from the first entry.
    pub fn title(&self) -> &str {
        self.entries
            .first()
            .map(|e| e.series.title())
            .unwrap_or(&self.series_name)
    }

    pub fn is_placeholder(&self) -> bool {
        self.entries.iter().all(|e| e.series.is_placeholder())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }
}

/// Panels (one overlay each) arranged in a fixed-column grid.
///
/// Panels never share axis ranges; each observable keeps its own scale.
#[derive(Debug, Clone)]
pub struct Layout {
    pub columns: usize,
    pub panels: Vec<Overlay>,
}

impl Layout {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            panels: Vec::new(),
        }
    }

    pub fn shared_axes(&self) -> bool {
        false
    }

    pub fn panel(&self, series_name: &str) -> Option<&Overlay> {
        self.panels.iter().find(|p| p.series_name == series_name)
    }

    pub fn panel_names(&self) -> Vec<&str> {
        self.panels.iter().map(|p| p.series_name.as_str()).collect()
    }

    /// Panels grouped into grid rows of `columns` panels.
    pub fn rows(&self) -> impl Iterator<Item = &[Overlay]> {
        self.panels.chunks(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{RenderedSeries, SeriesSpec};
    use crate::style::{DefaultStyle, SeriesKind};
    use std::sync::Arc;

    fn placeholder(name: &str) -> SeriesHandle {
        Arc::new(RenderedSeries::placeholder(
            &SeriesSpec::new(name, SeriesKind::Scatter),
            None,
            &DefaultStyle::default(),
        ))
    }

    #[test]
    fn grid_rows_chunk_by_columns() {
        let mut layout = Layout::new(2);
        for name in ["A", "B", "C"] {
            let mut overlay = Overlay::new(name, LegendPosition::Right);
            overlay.push(placeholder(name));
            layout.panels.push(overlay);
        }
        let rows: Vec<usize> = layout.rows().map(<[Overlay]>::len).collect();
        assert_eq!(rows, vec![2, 1]);
        assert!(!layout.shared_axes());
        assert_eq!(layout.panel_names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn placeholder_overlay() {
        let mut overlay = Overlay::new("A", LegendPosition::Right);
        overlay.push(placeholder("A"));
        assert!(overlay.is_placeholder());
        assert_eq!(overlay.keys(), vec!["None"]);
        assert_eq!(overlay.title(), "A - No Selection");
    }

    #[test]
    fn zero_columns_is_clamped() {
        assert_eq!(Layout::new(0).columns, 1);
    }
}
