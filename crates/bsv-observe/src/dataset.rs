//! Per-series datasets and their per-sample unpacking.
//!
//! A dataset holds the data behind one named series for every sample. Two
//! shapes are supported, decided when the dataset is built:
//!
//! - `KeyedArrays`: field name -> one cell per sample
//! - `RowTable`: one row per sample, each cell a whole sequence
//!
//! A `WideTable` backs several series at once and splits into one keyed
//! dataset per column.
//!
//! Unpacking a dataset at a sample yields a `SeriesFrame`, the small ordered
//! field -> cell mapping from which a rendered series is built.

use std::collections::HashSet;

use bsv_core::{Real, SampleId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ObserveError, ObserveResult};

/// One value of a dataset field for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Scalar(Real),
    Series(Vec<Real>),
}

impl Cell {
    pub fn len(&self) -> usize {
        match self {
            Cell::Scalar(_) => 1,
            Cell::Series(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[Real] {
        match self {
            Cell::Scalar(v) => std::slice::from_ref(v),
            Cell::Series(v) => v,
        }
    }
}

impl From<Real> for Cell {
    fn from(v: Real) -> Self {
        Cell::Scalar(v)
    }
}

impl From<Vec<Real>> for Cell {
    fn from(v: Vec<Real>) -> Self {
        Cell::Series(v)
    }
}

/// Ordered field -> cell mapping for one sample of one series.
///
/// This is both what unpacking produces and what a live computation returns
/// for each of its series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesFrame {
    fields: Vec<(String, Cell)>,
}

impl SeriesFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing an existing field of the same name in place.
    pub fn with(mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.push(name, cell);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        let name = name.into();
        let cell = cell.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = cell,
            None => self.fields.push((name, cell)),
        }
    }

    pub fn fields(&self) -> &[(String, Cell)] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The (key dimension, value dimension) pair; anything but exactly two
    /// fields is a shape error for `series`.
    pub fn pair(&self, series: &str) -> ObserveResult<(&(String, Cell), &(String, Cell))> {
        match self.fields.as_slice() {
            [x, y] => Ok((x, y)),
            _ => Err(ObserveError::SeriesShape {
                series: series.to_string(),
                fields: self.field_names(),
            }),
        }
    }
}

/// Field name -> equal-length column of per-sample cells.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedArrays {
    fields: Vec<(String, Vec<Cell>)>,
    len: usize,
}

impl KeyedArrays {
    pub fn new<K: Into<String>>(fields: Vec<(K, Vec<Cell>)>) -> ObserveResult<Self> {
        let fields: Vec<(String, Vec<Cell>)> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        check_unique(fields.iter().map(|(n, _)| n.as_str()))?;

        let len = fields.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, column) in &fields {
            if column.len() != len {
                return Err(ObserveError::RaggedDataset {
                    field: name.clone(),
                    expected: len,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { fields, len })
    }

    /// Build from plain scalar columns, one value per sample.
    pub fn from_columns<K: Into<String>>(columns: Vec<(K, Vec<Real>)>) -> ObserveResult<Self> {
        Self::new(
            columns
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().map(Cell::Scalar).collect()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.clone()).collect()
    }
}

/// One row per sample; each column is a field and each cell a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable {
    columns: Vec<String>,
    rows: Vec<Vec<Vec<Real>>>,
}

impl RowTable {
    pub fn new<K: Into<String>>(columns: Vec<K>, rows: Vec<Vec<Vec<Real>>>) -> ObserveResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_unique(columns.iter().map(String::as_str))?;
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ObserveError::RaggedDataset {
                    field: format!("row {i}"),
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// A table whose every cell is itself a small series frame.
///
/// Each column backs one named series: column `c` becomes the dataset whose
/// sample `i` is the frame at row `i`, column `c`. This lets one wide table
/// back several series without repackaging.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    columns: Vec<String>,
    rows: Vec<Vec<SeriesFrame>>,
}

impl WideTable {
    pub fn new<K: Into<String>>(columns: Vec<K>, rows: Vec<Vec<SeriesFrame>>) -> ObserveResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_unique(columns.iter().map(String::as_str))?;
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ObserveError::RaggedDataset {
                    field: format!("row {i}"),
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Parse `{"columns": [...], "rows": [[{"x": [...], "y": [...]}, ...], ...]}`,
    /// each row holding one field -> cell object per column.
    pub fn from_json(value: &Value) -> ObserveResult<Self> {
        let map = match value {
            Value::Object(map) if is_row_table_object(map) => map,
            other => return Err(unsupported(other)),
        };
        let columns = string_array(&map["columns"])?;
        let rows = array(&map["rows"])?
            .iter()
            .map(|row| -> ObserveResult<Vec<SeriesFrame>> {
                array(row)?.iter().map(frame).collect()
            })
            .collect::<ObserveResult<Vec<_>>>()?;
        Self::new(columns, rows)
    }

    /// Split into one keyed dataset per column, in column order.
    ///
    /// Every frame of a column must carry the same field names as its first
    /// row; the column name is reported on mismatch.
    pub fn into_datasets(self) -> ObserveResult<Vec<SeriesDataset>> {
        let mut out = Vec::with_capacity(self.columns.len());
        for (c, column) in self.columns.iter().enumerate() {
            let names = self
                .rows
                .first()
                .map(|row| row[c].field_names())
                .unwrap_or_default();
            let mut fields: Vec<(String, Vec<Cell>)> = names
                .iter()
                .map(|n| (n.clone(), Vec::with_capacity(self.rows.len())))
                .collect();

            for row in &self.rows {
                let frame = &row[c];
                if frame.field_names() != names {
                    return Err(ObserveError::SeriesShape {
                        series: column.clone(),
                        fields: frame.field_names(),
                    });
                }
                for ((_, cells), (_, cell)) in fields.iter_mut().zip(frame.fields()) {
                    cells.push(cell.clone());
                }
            }
            out.push(SeriesDataset::Keyed(KeyedArrays::new(fields)?));
        }
        Ok(out)
    }
}

/// The data behind one series, shape fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesDataset {
    Keyed(KeyedArrays),
    Rows(RowTable),
}

impl From<KeyedArrays> for SeriesDataset {
    fn from(d: KeyedArrays) -> Self {
        SeriesDataset::Keyed(d)
    }
}

impl From<RowTable> for SeriesDataset {
    fn from(d: RowTable) -> Self {
        SeriesDataset::Rows(d)
    }
}

impl SeriesDataset {
    /// Number of samples covered.
    pub fn len(&self) -> usize {
        match self {
            SeriesDataset::Keyed(d) => d.len(),
            SeriesDataset::Rows(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field_names(&self) -> Vec<String> {
        match self {
            SeriesDataset::Keyed(d) => d.field_names(),
            SeriesDataset::Rows(d) => d.columns.clone(),
        }
    }

    /// Select sample `id`, field order preserved.
    ///
    /// Keyed arrays yield one cell per field; row tables yield the row's
    /// sequence cells re-pivoted into one entry per column.
    pub fn unpack(&self, id: SampleId) -> ObserveResult<SeriesFrame> {
        let index = id.as_usize();
        let len = self.len();
        if index >= len {
            return Err(ObserveError::IndexOutOfRange {
                what: "dataset".to_string(),
                index,
                len,
            });
        }

        let fields = match self {
            SeriesDataset::Keyed(d) => d
                .fields
                .iter()
                .map(|(name, column)| (name.clone(), column[index].clone()))
                .collect(),
            SeriesDataset::Rows(d) => d
                .columns
                .iter()
                .zip(&d.rows[index])
                .map(|(name, cell)| (name.clone(), Cell::Series(cell.clone())))
                .collect(),
        };
        Ok(SeriesFrame { fields })
    }

    /// Decide the shape of untyped (JSON) dataset input.
    ///
    /// - `{"x": [...], "y": [...]}` -> keyed arrays (cells are numbers or
    ///   arrays of numbers)
    /// - `{"columns": [...], "rows": [[[...], ...], ...]}` -> row table
    /// - `[{"x": [...], "y": [...]}, ...]` -> row table from records
    pub fn from_json(value: &Value) -> ObserveResult<Self> {
        match value {
            Value::Object(map) if is_row_table_object(map) => {
                let columns = string_array(&map["columns"])?;
                let rows = array(&map["rows"])?
                    .iter()
                    .map(|row| -> ObserveResult<Vec<Vec<Real>>> {
                        array(row)?.iter().map(number_array).collect()
                    })
                    .collect::<ObserveResult<Vec<Vec<Vec<Real>>>>>()?;
                Ok(RowTable::new(columns, rows)?.into())
            }
            Value::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(name, column)| -> ObserveResult<(String, Vec<Cell>)> {
                        let cells = array(column)?
                            .iter()
                            .map(cell)
                            .collect::<ObserveResult<Vec<_>>>()?;
                        Ok((name.clone(), cells))
                    })
                    .collect::<ObserveResult<Vec<_>>>()?;
                Ok(KeyedArrays::new(fields)?.into())
            }
            Value::Array(records) if records.iter().all(Value::is_object) => {
                let columns: Vec<String> = match records.first() {
                    Some(Value::Object(first)) => first.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                let rows = records
                    .iter()
                    .map(|record| -> ObserveResult<Vec<Vec<Real>>> {
                        columns
                            .iter()
                            .map(|c| match record.get(c) {
                                Some(v) => number_array(v),
                                None => Err(unsupported(record)),
                            })
                            .collect()
                    })
                    .collect::<ObserveResult<Vec<Vec<Vec<Real>>>>>()?;
                Ok(RowTable::new(columns, rows)?.into())
            }
            other => Err(unsupported(other)),
        }
    }
}

fn check_unique<'a>(names: impl Iterator<Item = &'a str>) -> ObserveResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ObserveError::UnsupportedDatasetShape {
                found: format!("duplicate field '{name}'"),
            });
        }
    }
    Ok(())
}

fn is_row_table_object(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 2
        && map.contains_key("rows")
        && map
            .get("columns")
            .and_then(Value::as_array)
            .is_some_and(|cols| cols.iter().all(Value::is_string))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn unsupported(value: &Value) -> ObserveError {
    ObserveError::UnsupportedDatasetShape {
        found: json_kind(value).to_string(),
    }
}

fn array(value: &Value) -> ObserveResult<&Vec<Value>> {
    value.as_array().ok_or_else(|| unsupported(value))
}

fn string_array(value: &Value) -> ObserveResult<Vec<String>> {
    array(value)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(|| unsupported(v)))
        .collect()
}

fn number(value: &Value) -> ObserveResult<Real> {
    value.as_f64().ok_or_else(|| unsupported(value))
}

fn number_array(value: &Value) -> ObserveResult<Vec<Real>> {
    array(value)?.iter().map(number).collect()
}

fn frame(value: &Value) -> ObserveResult<SeriesFrame> {
    let map = value.as_object().ok_or_else(|| unsupported(value))?;
    let mut out = SeriesFrame::new();
    for (name, v) in map {
        out.push(name.clone(), cell(v)?);
    }
    Ok(out)
}

fn cell(value: &Value) -> ObserveResult<Cell> {
    match value {
        Value::Number(_) => Ok(Cell::Scalar(number(value)?)),
        Value::Array(_) => Ok(Cell::Series(number_array(value)?)),
        other => Err(unsupported(other)),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn keyed_case() -> impl Strategy<Value = (Vec<Vec<Real>>, usize)> {
        (1usize..6, 1usize..8).prop_flat_map(|(fields, len)| {
            (vec(vec(-1e6f64..1e6, len), fields), 0..len)
        })
    }

    fn rows_case() -> impl Strategy<Value = (usize, Vec<Vec<Vec<Real>>>, usize)> {
        (1usize..5, 1usize..6).prop_flat_map(|(width, len)| {
            (
                Just(width),
                vec(vec(vec(-1e3f64..1e3, 0..5), width), len),
                0..len,
            )
        })
    }

    proptest! {
        #[test]
        fn keyed_unpack_selects_ith_cells((columns, index) in keyed_case()) {
            // Reverse-numbered names so declared order differs from sorted order.
            let width = columns.len();
            let named: Vec<(String, Vec<Real>)> = columns
                .into_iter()
                .enumerate()
                .map(|(f, column)| (format!("f{}", width - f), column))
                .collect();
            let dataset: SeriesDataset = KeyedArrays::from_columns(named.clone()).unwrap().into();

            let frame = dataset.unpack(SampleId::from_index(index as u32)).unwrap();
            prop_assert_eq!(frame.len(), width);
            for ((name, column), (field, cell)) in named.iter().zip(frame.fields()) {
                prop_assert_eq!(field, name);
                prop_assert_eq!(cell, &Cell::Scalar(column[index]));
            }
        }

        #[test]
        fn row_unpack_selects_ith_row((width, rows, index) in rows_case()) {
            let columns: Vec<String> = (0..width).map(|c| format!("c{}", width - c)).collect();
            let dataset: SeriesDataset = RowTable::new(columns.clone(), rows.clone()).unwrap().into();

            let frame = dataset.unpack(SampleId::from_index(index as u32)).unwrap();
            prop_assert_eq!(frame.field_names(), columns);
            for ((_, cell), expected) in frame.fields().iter().zip(&rows[index]) {
                prop_assert_eq!(cell, &Cell::Series(expected.clone()));
            }
        }

        #[test]
        fn unpack_past_the_end_fails((columns, _) in keyed_case(), extra in 0u32..4) {
            let len = columns[0].len();
            let named: Vec<(String, Vec<Real>)> = columns
                .into_iter()
                .enumerate()
                .map(|(f, column)| (format!("f{f}"), column))
                .collect();
            let dataset: SeriesDataset = KeyedArrays::from_columns(named).unwrap().into();
            let past = SampleId::from_index(len as u32 + extra);
            let is_out_of_range = matches!(
                dataset.unpack(past),
                Err(ObserveError::IndexOutOfRange { .. })
            );
            prop_assert!(is_out_of_range);
        }
    }
}
