//! Series kinds and rendering options.

use serde::{Deserialize, Serialize};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    #[default]
    Curve,
    Scatter,
}

/// User-facing rendering options.
///
/// Every field is optional; `layered_over` fills unset fields from a base
/// so user options always win over defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xlabel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ylabel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xlim: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ylim: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logx: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontscale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framewise: Option<bool>,
}

impl PlotOptions {
    /// These options with every unset field taken from `base`.
    pub fn layered_over(&self, base: &PlotOptions) -> PlotOptions {
        PlotOptions {
            title: self.title.clone().or_else(|| base.title.clone()),
            xlabel: self.xlabel.clone().or_else(|| base.xlabel.clone()),
            ylabel: self.ylabel.clone().or_else(|| base.ylabel.clone()),
            color: self.color.clone().or_else(|| base.color.clone()),
            bgcolor: self.bgcolor.clone().or_else(|| base.bgcolor.clone()),
            line_width: self.line_width.or(base.line_width),
            marker_size: self.marker_size.or(base.marker_size),
            alpha: self.alpha.or(base.alpha),
            xlim: self.xlim.or(base.xlim),
            ylim: self.ylim.or(base.ylim),
            logx: self.logx.or(base.logx),
            logy: self.logy.or(base.logy),
            height: self.height.or(base.height),
            width: self.width.or(base.width),
            padding: self.padding.or(base.padding),
            fontscale: self.fontscale.or(base.fontscale),
            framewise: self.framewise.or(base.framewise),
        }
    }
}

/// The fixed style every rendered series starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultStyle {
    pub height: u32,
    pub width: u32,
    pub padding: f64,
    pub fontscale: f64,
    /// Rescale axes on every redraw.
    pub framewise: bool,
}

impl Default for DefaultStyle {
    fn default() -> Self {
        Self {
            height: 400,
            width: 500,
            padding: 0.1,
            fontscale: 1.1,
            framewise: true,
        }
    }
}

impl DefaultStyle {
    pub fn as_options(&self) -> PlotOptions {
        PlotOptions {
            height: Some(self.height),
            width: Some(self.width),
            padding: Some(self.padding),
            fontscale: Some(self.fontscale),
            framewise: Some(self.framewise),
            ..PlotOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_options_win_over_base() {
        let base = DefaultStyle::default().as_options();
        let user = PlotOptions {
            height: Some(250),
            color: Some("red".into()),
            ..PlotOptions::default()
        };
        let merged = user.layered_over(&base);
        assert_eq!(merged.height, Some(250));
        assert_eq!(merged.width, Some(500));
        assert_eq!(merged.color.as_deref(), Some("red"));
        assert_eq!(merged.framewise, Some(true));
    }

    #[test]
    fn options_parse_from_yaml() {
        let opts: PlotOptions = serde_yaml::from_str("xlim: [-1.0, 1.0]\nbgcolor: '#151515'\n").unwrap();
        assert_eq!(opts.xlim, Some((-1.0, 1.0)));
        assert_eq!(opts.bgcolor.as_deref(), Some("#151515"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(serde_yaml::from_str::<PlotOptions>("colour: red\n").is_err());
    }
}
