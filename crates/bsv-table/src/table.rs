//! Row-addressable sample table.

use std::collections::HashSet;

use bsv_core::{Real, SampleId, Selection};
use serde::Serialize;

use crate::{TableError, TableResult};

/// Ordered collection of parameter samples.
///
/// Values are stored row-major in one flat buffer; every row has exactly one
/// value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    columns: Vec<String>,
    values: Vec<Real>,
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct SampleRow<'a> {
    pub id: SampleId,
    columns: &'a [String],
    values: &'a [Real],
}

impl<'a> SampleRow<'a> {
    pub fn get(&self, column: &str) -> Option<Real> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    pub fn values(&self) -> &'a [Real] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Real)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Min/max/mean of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub min: Real,
    pub max: Real,
    pub mean: Real,
}

/// The selected rows of a table, with their sample index as leading column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedRows {
    pub columns: Vec<String>,
    pub rows: Vec<(SampleId, Vec<Real>)>,
}

impl SampleTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Real>>) -> TableResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }

        let width = columns.len();
        let mut values = Vec::with_capacity(width * rows.len());
        for (row, data) in rows.into_iter().enumerate() {
            if data.len() != width {
                return Err(TableError::RowWidth {
                    row,
                    expected: width,
                    actual: data.len(),
                });
            }
            values.extend(data);
        }

        Ok(Self { columns, values })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.values.len() / self.columns.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> TableResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub fn row(&self, id: SampleId) -> TableResult<SampleRow<'_>> {
        let index = id.check_bound("sample table row", self.len())?;
        let width = self.columns.len();
        Ok(SampleRow {
            id,
            columns: &self.columns,
            values: &self.values[index * width..(index + 1) * width],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = SampleRow<'_>> {
        let width = self.columns.len().max(1);
        self.values
            .chunks(width)
            .enumerate()
            .map(move |(i, values)| SampleRow {
                id: SampleId::from_index(i as u32),
                columns: &self.columns,
                values,
            })
    }

    pub fn value(&self, id: SampleId, column: &str) -> TableResult<Real> {
        let col = self.column_index(column)?;
        Ok(self.row(id)?.values[col])
    }

    pub fn column(&self, name: &str) -> TableResult<Vec<Real>> {
        let col = self.column_index(name)?;
        let width = self.columns.len();
        Ok(self.values.iter().skip(col).step_by(width).copied().collect())
    }

    pub fn summarize(&self) -> Vec<ColumnSummary> {
        let n = self.len();
        self.columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let mut min = Real::INFINITY;
                let mut max = Real::NEG_INFINITY;
                let mut sum = 0.0;
                for row in self.values.chunks(self.columns.len()) {
                    let v = row[col];
                    min = min.min(v);
                    max = max.max(v);
                    sum += v;
                }
                ColumnSummary {
                    name: name.clone(),
                    min,
                    max,
                    mean: if n > 0 { sum / n as Real } else { Real::NAN },
                }
            })
            .collect()
    }

    /// Rows of `selection` restricted to `columns` (all columns when empty).
    pub fn select(&self, selection: &Selection, columns: &[&str]) -> TableResult<SelectedRows> {
        let picked: Vec<usize> = if columns.is_empty() {
            (0..self.columns.len()).collect()
        } else {
            columns
                .iter()
                .map(|c| self.column_index(c))
                .collect::<TableResult<_>>()?
        };

        let mut rows = Vec::with_capacity(selection.len());
        for id in selection.iter() {
            let row = self.row(id)?;
            rows.push((id, picked.iter().map(|&c| row.values[c]).collect()));
        }

        let mut names = Vec::with_capacity(picked.len() + 1);
        names.push("index".to_string());
        names.extend(picked.iter().map(|&c| self.columns[c].clone()));

        Ok(SelectedRows {
            columns: names,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_table() -> SampleTable {
        SampleTable::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec![1.0, 2.0, 3.0],
                vec![4.0, 5.0, 6.0],
                vec![7.0, 8.0, 9.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rows_are_indexed_in_order() {
        let table = abc_table();
        assert_eq!(table.len(), 3);
        let row = table.row(SampleId::from_index(1)).unwrap();
        assert_eq!(row.get("B"), Some(5.0));
        assert_eq!(row.get("Z"), None);
        let ids: Vec<u32> = table.rows().map(|r| r.id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn column_extraction() {
        let table = abc_table();
        assert_eq!(table.column("C").unwrap(), vec![3.0, 6.0, 9.0]);
        assert!(matches!(
            table.column("Q"),
            Err(TableError::UnknownColumn(name)) if name == "Q"
        ));
    }

    #[test]
    fn out_of_range_row_is_index_error() {
        let table = abc_table();
        let err = table.row(SampleId::from_index(3)).unwrap_err();
        assert!(matches!(err, TableError::Core(_)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = SampleTable::new(vec!["a".into(), "b".into()], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            TableError::RowWidth {
                row: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = SampleTable::new(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));
    }

    #[test]
    fn select_prepends_index_column() {
        let table = abc_table();
        let sel = Selection::from_indices([2, 0]).unwrap();
        let picked = table.select(&sel, &["C", "A"]).unwrap();
        assert_eq!(picked.columns, vec!["index", "C", "A"]);
        assert_eq!(picked.rows[0], (SampleId::from_index(2), vec![9.0, 7.0]));
        assert_eq!(picked.rows[1], (SampleId::from_index(0), vec![3.0, 1.0]));
    }

    #[test]
    fn summary_matches_columns() {
        let summary = abc_table().summarize();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].min, 1.0);
        assert_eq!(summary[0].max, 7.0);
        assert_eq!(summary[0].mean, 4.0);
    }
}
