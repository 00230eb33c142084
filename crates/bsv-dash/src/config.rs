//! Dashboard configuration.

use std::path::Path;

use bsv_observe::{DefaultStyle, LegendPosition};
use serde::{Deserialize, Serialize};

use crate::{DashError, DashResult};

/// Rendering and back-end settings handed to the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Panels per grid row.
    pub columns: usize,
    pub legend_position: LegendPosition,
    /// Compute newly selected samples on the rayon pool.
    pub parallel: bool,
    pub default_style: DefaultStyle,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            legend_position: LegendPosition::Right,
            parallel: false,
            default_style: DefaultStyle::default(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> DashResult<()> {
        if self.columns == 0 {
            return Err(DashError::InvalidConfig {
                what: "columns must be at least 1".to_string(),
            });
        }
        let style = &self.default_style;
        if style.height == 0 || style.width == 0 {
            return Err(DashError::InvalidConfig {
                what: format!("plot size must be non-zero, got {}x{}", style.width, style.height),
            });
        }
        if !style.padding.is_finite() || style.padding < 0.0 {
            return Err(DashError::InvalidConfig {
                what: format!("padding must be finite and non-negative, got {}", style.padding),
            });
        }
        if !style.fontscale.is_finite() || style.fontscale <= 0.0 {
            return Err(DashError::InvalidConfig {
                what: format!("fontscale must be positive, got {}", style.fontscale),
            });
        }
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> DashResult<Self> {
        let config: DashboardConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> DashResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DashError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = DashboardConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.columns, 2);
        assert_eq!(config.default_style.height, 400);
        assert!(config.default_style.framewise);
    }

    #[test]
    fn partial_yaml_overrides() {
        let config = DashboardConfig::from_yaml_str(
            "columns: 3\nlegend_position: bottom\ndefault_style:\n  width: 640\n",
        )
        .unwrap();
        assert_eq!(config.columns, 3);
        assert_eq!(config.legend_position, LegendPosition::Bottom);
        assert_eq!(config.default_style.width, 640);
        assert_eq!(config.default_style.height, 400);
    }

    #[test]
    fn zero_columns_rejected() {
        let err = DashboardConfig::from_yaml_str("columns: 0").unwrap_err();
        assert!(matches!(err, DashError::InvalidConfig { .. }));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = DashboardConfig::from_yaml_str("colums: 3").unwrap_err();
        assert!(matches!(err, DashError::Yaml(_)));
    }

    #[test]
    fn missing_file_names_path() {
        let path = Path::new("/definitely/not/here/dashboard.yaml");
        let err = DashboardConfig::load_yaml(path).unwrap_err();
        assert!(err.to_string().contains("dashboard.yaml"));
    }
}
