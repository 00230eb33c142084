//! Session files: everything needed to build and drive a dashboard.
//!
//! ```yaml
//! paramnames: chains/run.paramnames
//! chains: [chains/run_1.txt, chains/run_2.txt]
//! dashboard: { columns: 2 }
//! observables:
//!   - kind: static
//!     names: [Spectrum]
//!     data: spectrum.json
//!   - kind: waveform
//!     names: [Sine, Cosine, Sawtooth]
//!     frequency: freq
//!     phase: phi
//!     amplitude: amp
//! selections: [[], [0], [0, 1]]
//! ```
//!
//! Relative paths are resolved against the session file's directory; chain
//! entries may be glob patterns.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bsv_core::{LabelMap, Selection};
use bsv_dash::{DashboardConfig, LayoutAssembler};
use bsv_observe::{
    LiveObservable, Observable, ObservableData, ObservableSource, OneOrMany, PlotOptions,
    SeriesConfig, SeriesDataset, SeriesKind, WideTable,
};
use bsv_table::{SampleTable, load_chains, load_paramnames};
use serde::Deserialize;

use crate::error::{AppError, AppResult, read_file};
use crate::waveform::{self, WAVEFORM_SERIES, WaveformArgs, WaveformSpec};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionFile {
    #[serde(default)]
    pub paramnames: Option<PathBuf>,
    #[serde(default)]
    pub chains: Vec<PathBuf>,
    #[serde(default)]
    pub params_only: bool,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub observables: Vec<ObservableEntry>,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// Fields shared by every observable entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesEntry {
    pub names: OneOrMany<String>,
    #[serde(default)]
    pub plot: Option<OneOrMany<SeriesKind>>,
    #[serde(default)]
    pub options: Option<OneOrMany<PlotOptions>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObservableEntry {
    Static {
        #[serde(flatten)]
        series: SeriesEntry,
        /// One JSON dataset file per name, or a single wide table file whose
        /// columns back the names in order.
        data: OneOrMany<PathBuf>,
    },
    Waveform {
        #[serde(flatten)]
        series: SeriesEntry,
        #[serde(flatten)]
        spec: WaveformSpec,
    },
}

/// A loaded session, ready to replay.
pub struct Session {
    pub table: Option<Arc<SampleTable>>,
    pub assembler: LayoutAssembler,
    pub selections: Vec<Selection>,
}

impl SeriesEntry {
    fn config(&self, labels: Option<&LabelMap>) -> SeriesConfig {
        let mut config = SeriesConfig::new(self.names.clone());
        if let Some(plot) = &self.plot {
            config = config.kind(plot.clone());
        }
        if let Some(options) = &self.options {
            config = config.options(options.clone());
        }
        if let Some(labels) = labels {
            config = config.labels(labels.clone());
        }
        config
    }

    fn name_count(&self) -> usize {
        self.names.clone().into_vec().len()
    }
}

pub fn parse_session(content: &str) -> AppResult<SessionFile> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn load_session(path: &Path) -> AppResult<Session> {
    let file = parse_session(&read_file(path)?)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    build_session(file, base)
}

pub fn build_session(file: SessionFile, base: &Path) -> AppResult<Session> {
    let resolve = |p: &Path| -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            base.join(p)
        }
    };

    let params = file
        .paramnames
        .as_deref()
        .map(|p| load_paramnames(&resolve(p)))
        .transpose()?;
    let labels = params.as_ref().map(|p| &p.labels);

    let table = if file.chains.is_empty() {
        None
    } else {
        let params = params.as_ref().ok_or_else(|| {
            AppError::Session("chains need a paramnames file for their columns".to_string())
        })?;
        let chains: Vec<PathBuf> = file.chains.iter().map(|p| resolve(p)).collect();
        Some(Arc::new(load_chains(&chains, &params.names, file.params_only)?))
    };

    let mut observables: Vec<Box<dyn ObservableSource>> = Vec::new();
    let mut static_len: Option<usize> = None;
    for entry in &file.observables {
        match entry {
            ObservableEntry::Static { series, data } => {
                let paths = data.clone().into_vec();
                let data: ObservableData = if paths.len() == 1 && series.name_count() > 1 {
                    load_wide_table(&resolve(&paths[0]))?.into()
                } else {
                    paths
                        .iter()
                        .map(|p| load_dataset(&resolve(p)))
                        .collect::<AppResult<Vec<_>>>()?
                        .into()
                };
                let observable = Observable::new(series.config(labels), data)?;
                let len = observable.sample_len();
                if let Some(table) = &table
                    && len != table.len()
                {
                    return Err(AppError::Session(format!(
                        "static observable '{}' covers {len} samples, chains have {}",
                        observable.names().join(", "),
                        table.len()
                    )));
                }
                static_len = Some(static_len.map_or(len, |l| l.min(len)));
                observables.push(Box::new(observable));
            }
            ObservableEntry::Waveform { series, spec } => {
                if series.name_count() != WAVEFORM_SERIES {
                    return Err(AppError::Session(format!(
                        "waveform produces {WAVEFORM_SERIES} curves, got {} names",
                        series.name_count()
                    )));
                }
                let table = table.as_ref().ok_or_else(|| {
                    AppError::Session("waveform observables need chains".to_string())
                })?;
                for column in [&spec.frequency, &spec.phase, &spec.amplitude] {
                    table.column_index(column)?;
                }
                let args = WaveformArgs {
                    table: Arc::clone(table),
                    spec: spec.clone(),
                };
                let live = LiveObservable::with_args(series.config(labels), args, waveform::compute)?
                    .named("waveform");
                observables.push(Box::new(live));
            }
        }
    }

    let sample_count = match (&table, static_len) {
        (Some(table), _) => table.len(),
        (None, Some(len)) => len,
        (None, None) => {
            return Err(AppError::Session(
                "no chains and no static observables: sample count unknown".to_string(),
            ));
        }
    };

    let assembler = LayoutAssembler::new(observables, file.dashboard, sample_count)?;
    tracing::info!(
        series = assembler.cache().series_names().len(),
        sample_count,
        selections = file.selections.len(),
        "session built"
    );
    Ok(Session {
        table,
        assembler,
        selections: file.selections,
    })
}

fn load_json(path: &Path) -> AppResult<serde_json::Value> {
    Ok(serde_json::from_str(&read_file(path)?)?)
}

fn load_dataset(path: &Path) -> AppResult<SeriesDataset> {
    Ok(SeriesDataset::from_json(&load_json(path)?)?)
}

/// A single file behind several names must be a wide table.
fn load_wide_table(path: &Path) -> AppResult<WideTable> {
    WideTable::from_json(&load_json(path)?).map_err(|err| {
        AppError::Session(format!(
            "'{}' backs several series and must be a wide table: {err}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsv_observe::ObserveError;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        dir.push(format!("{}_{}", prefix, nanos));
        dir
    }

    fn write_chains(dir: &Path) {
        fs::create_dir_all(dir).expect("failed to create temp dir");
        fs::write(dir.join("run.paramnames"), "freq\tf\nphi\t\\phi\namp\tA\n")
            .expect("failed to write paramnames");
        fs::write(dir.join("run_1.txt"), "1 3.0 1.0 0.0 1.0\n1 2.5 2.0 0.5 0.5\n")
            .expect("failed to write chain");
        fs::write(dir.join("run_2.txt"), "2 2.0 3.0 1.0 2.0\n").expect("failed to write chain");
    }

    #[test]
    fn static_and_waveform_session() {
        let dir = unique_temp_dir("bsv_cli_session");
        write_chains(&dir);
        fs::write(dir.join("points.json"), r#"{"x": [0, 1, 2], "y": [1, 4, 9]}"#)
            .expect("failed to write dataset");
        let yaml = r#"
paramnames: run.paramnames
chains: [run_1.txt, run_2.txt]
params_only: true
dashboard: { columns: 3 }
observables:
  - kind: static
    names: Points
    plot: Scatter
    data: points.json
  - kind: waveform
    names: [Sine, Cosine, Sawtooth]
    frequency: freq
    phase: phi
    amplitude: amp
    points: 16
selections: [[], [2, 0], [0]]
"#;
        let session = build_session(parse_session(yaml).unwrap(), &dir).unwrap();
        let mut assembler = session.assembler;
        assert_eq!(session.table.as_ref().unwrap().len(), 3);
        assert_eq!(assembler.sample_count(), 3);

        let layouts: Vec<_> = session
            .selections
            .iter()
            .map(|s| assembler.on_selection(s).unwrap())
            .collect();
        assert_eq!(
            layouts[1].panel_names(),
            vec!["Points", "Sine", "Cosine", "Sawtooth"]
        );
        assert_eq!(layouts[1].panel("Sine").unwrap().keys(), vec!["2", "0"]);
        assert_eq!(layouts[2].panel("Sine").unwrap().len(), 1);
        assert_eq!(assembler.stats().computed, 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn waveform_needs_three_names() {
        let dir = unique_temp_dir("bsv_cli_session_names");
        write_chains(&dir);
        let yaml = r#"
paramnames: run.paramnames
chains: [run_1.txt]
params_only: true
observables:
  - kind: waveform
    names: [Sine, Cosine]
    frequency: freq
    phase: phi
    amplitude: amp
"#;
        let err = build_session(parse_session(yaml).unwrap(), &dir).err().unwrap();
        assert!(matches!(err, AppError::Session(_)));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn waveform_column_must_exist() {
        let dir = unique_temp_dir("bsv_cli_session_columns");
        write_chains(&dir);
        let yaml = r#"
paramnames: run.paramnames
chains: [run_1.txt]
params_only: true
observables:
  - kind: waveform
    names: [Sine, Cosine, Sawtooth]
    frequency: omega
    phase: phi
    amplitude: amp
"#;
        let err = build_session(parse_session(yaml).unwrap(), &dir).err().unwrap();
        assert!(matches!(err, AppError::Table(_)));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn static_only_session_uses_shortest_dataset() {
        let dir = unique_temp_dir("bsv_cli_session_static");
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        fs::write(dir.join("a.json"), r#"{"x": [0, 1, 2], "y": [5, 6, 7]}"#)
            .expect("failed to write dataset");
        fs::write(dir.join("b.json"), r#"{"x": [0, 1], "y": [8, 9]}"#)
            .expect("failed to write dataset");
        let yaml = "observables:\n  - kind: static\n    names: [A, B]\n    data: [a.json, b.json]\n";
        let session = build_session(parse_session(yaml).unwrap(), &dir).unwrap();
        assert_eq!(session.assembler.sample_count(), 2);
        assert!(session.table.is_none());
        assert_eq!(session.assembler.cache().series_names(), ["A", "B"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn one_plain_dataset_for_several_names_rejected() {
        let dir = unique_temp_dir("bsv_cli_session_shared");
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        fs::write(dir.join("a.json"), r#"{"x": [0, 1], "y": [5, 6]}"#)
            .expect("failed to write dataset");
        let yaml = "observables:\n  - kind: static\n    names: [A, B]\n    data: a.json\n";
        let err = build_session(parse_session(yaml).unwrap(), &dir).err().unwrap();
        assert!(matches!(err, AppError::Session(ref msg) if msg.contains("wide table")));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn dataset_count_must_match_names() {
        let dir = unique_temp_dir("bsv_cli_session_count");
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        fs::write(dir.join("a.json"), r#"{"x": [0, 1], "y": [5, 6]}"#)
            .expect("failed to write dataset");
        let yaml =
            "observables:\n  - kind: static\n    names: [A, B, C]\n    data: [a.json, a.json]\n";
        let err = build_session(parse_session(yaml).unwrap(), &dir).err().unwrap();
        assert!(matches!(err, AppError::Observe(ObserveError::LengthMismatch { .. })));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn wide_table_backs_several_names() {
        let dir = unique_temp_dir("bsv_cli_session_wide");
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        let wide = r#"{
            "columns": ["Lower", "Upper"],
            "rows": [
                [{"x": [0, 1], "y": [1, 2]}, {"x": [0, 1], "y": [3, 4]}],
                [{"x": [0, 1], "y": [5, 6]}, {"x": [0, 1], "y": [7, 8]}]
            ]
        }"#;
        fs::write(dir.join("bands.json"), wide).expect("failed to write dataset");
        let yaml =
            "observables:\n  - kind: static\n    names: [Low, High]\n    data: bands.json\n";
        let mut session = build_session(parse_session(yaml).unwrap(), &dir).unwrap();
        assert_eq!(session.assembler.sample_count(), 2);
        let layout = session
            .assembler
            .on_selection(&Selection::from_indices([1]).unwrap())
            .unwrap();
        let high = &layout.panel("High").unwrap().entries[0].series;
        assert_eq!(high.data.y, vec![7.0, 8.0]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn static_length_must_match_chains() {
        let dir = unique_temp_dir("bsv_cli_session_len");
        write_chains(&dir);
        fs::write(dir.join("short.json"), r#"{"x": [0, 1], "y": [1, 4]}"#)
            .expect("failed to write dataset");
        let yaml = r#"
paramnames: run.paramnames
chains: [run_1.txt, run_2.txt]
observables:
  - kind: static
    names: Short
    data: short.json
"#;
        let err = build_session(parse_session(yaml).unwrap(), &dir).err().unwrap();
        assert!(matches!(err, AppError::Session(ref msg) if msg.contains("Short")));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn demo_session_replays() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/waveform/session.yaml");
        let mut session = load_session(&path).unwrap();
        assert_eq!(session.assembler.sample_count(), 5);
        assert_eq!(
            session.assembler.cache().series_names(),
            ["Peaks", "Lower Band", "Upper Band", "Sine", "Cosine", "Sawtooth"]
        );
        for selection in &session.selections {
            session.assembler.on_selection(selection).unwrap();
        }
        assert_eq!(session.assembler.stats().computed, 4);
        assert_eq!(session.assembler.stats().reused, 3);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(parse_session("observables: []\nselection: [[0]]\n").is_err());
    }
}
