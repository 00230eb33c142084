//! Built-in `waveform` live computation.
//!
//! For each sample, reads frequency, phase and amplitude from the sample
//! table and produces sine, cosine and sawtooth curves over one unit of time.

use std::f64::consts::TAU;
use std::sync::Arc;

use bsv_core::SampleId;
use bsv_observe::{ComputeError, SeriesFrame};
use bsv_table::SampleTable;
use serde::Deserialize;

/// Number of curves a waveform observable produces.
pub const WAVEFORM_SERIES: usize = 3;

/// Column names feeding a waveform, and its resolution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaveformSpec {
    pub frequency: String,
    pub phase: String,
    pub amplitude: String,
    #[serde(default = "default_points")]
    pub points: usize,
}

fn default_points() -> usize {
    200
}

/// Static arguments of every waveform call.
#[derive(Debug, Clone)]
pub struct WaveformArgs {
    pub table: Arc<SampleTable>,
    pub spec: WaveformSpec,
}

pub fn compute(id: SampleId, args: &WaveformArgs) -> Result<Vec<SeriesFrame>, ComputeError> {
    let row = args.table.row(id)?;
    let column = |name: &str| -> Result<f64, ComputeError> {
        row.get(name)
            .ok_or_else(|| format!("sample table has no column '{name}'").into())
    };
    let frequency = column(&args.spec.frequency)?;
    let phase = column(&args.spec.phase)?;
    let amplitude = column(&args.spec.amplitude)?;

    let n = args.spec.points.max(2);
    let t: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let wave = |f: fn(f64) -> f64| -> Vec<f64> {
        t.iter()
            .map(|&ti| amplitude * f(TAU * frequency * ti + phase))
            .collect()
    };

    Ok(vec![
        SeriesFrame::new().with("t", t.clone()).with("sin", wave(f64::sin)),
        SeriesFrame::new().with("t", t.clone()).with("cos", wave(f64::cos)),
        SeriesFrame::new().with("t", t.clone()).with("sawtooth", wave(sawtooth)),
    ])
}

/// Unit sawtooth with period `TAU`, rising from -1 to 1.
fn sawtooth(x: f64) -> f64 {
    2.0 * (x / TAU).rem_euclid(1.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(points: usize) -> WaveformArgs {
        let table = SampleTable::new(
            vec!["freq".into(), "phi".into(), "amp".into()],
            vec![vec![1.0, 0.0, 2.0], vec![2.0, TAU / 4.0, 1.0]],
        )
        .unwrap();
        WaveformArgs {
            table: Arc::new(table),
            spec: WaveformSpec {
                frequency: "freq".into(),
                phase: "phi".into(),
                amplitude: "amp".into(),
                points,
            },
        }
    }

    #[test]
    fn three_curves_over_unit_time() {
        let frames = compute(SampleId::from_index(0), &args(5)).unwrap();
        assert_eq!(frames.len(), WAVEFORM_SERIES);
        let names: Vec<String> = frames.iter().map(|f| f.field_names()[1].clone()).collect();
        assert_eq!(names, vec!["sin", "cos", "sawtooth"]);

        let cos = frames[1].get("cos").unwrap().as_slice();
        assert!((cos[0] - 2.0).abs() < 1e-12);
        assert!((cos[4] - 2.0).abs() < 1e-12);
        assert!((cos[2] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn phase_shifts_the_sine() {
        let frames = compute(SampleId::from_index(1), &args(3)).unwrap();
        let sin = frames[0].get("sin").unwrap().as_slice();
        assert!((sin[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sawtooth_rises_linearly() {
        assert!((sawtooth(0.0) + 1.0).abs() < 1e-12);
        assert!(sawtooth(TAU / 2.0).abs() < 1e-12);
        assert!((sawtooth(TAU + TAU / 4.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn missing_column_is_a_compute_error() {
        let mut a = args(3);
        a.spec.amplitude = "nope".into();
        let err = compute(SampleId::from_index(0), &a).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn out_of_range_sample_fails() {
        assert!(compute(SampleId::from_index(9), &args(3)).is_err());
    }
}
