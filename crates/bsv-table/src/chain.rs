//! Loaders for MCMC chain output.
//!
//! A run produces a `.paramnames` file (one `name<TAB>latex` pair per line)
//! and one or more whitespace-separated chain files whose columns are
//! `weight`, `-LogLkl`, then one column per parameter.
//!
//! Every chain value must be finite; `inf` and `nan` are parse errors.

use std::fs;
use std::path::{Path, PathBuf};

use bsv_core::{LabelMap, Real, ensure_finite};

use crate::table::SampleTable;
use crate::{TableError, TableResult};

/// Leading bookkeeping columns of every chain row.
pub const CHAIN_PREFIX_COLUMNS: [&str; 2] = ["weight", "-LogLkl"];

/// Ordered parameter names plus their LaTeX labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamNames {
    pub names: Vec<String>,
    pub labels: LabelMap,
}

fn read(path: &Path) -> TableResult<String> {
    fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_paramnames(content: &str, source_name: &str) -> TableResult<ParamNames> {
    let mut out = ParamNames::default();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split('\t').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(TableError::Parse {
                source_name: source_name.to_string(),
                line: i + 1,
                what: "missing parameter name".to_string(),
            });
        }
        if let Some(latex) = parts.next().filter(|l| !l.is_empty()) {
            out.labels.insert(name, latex);
        }
        out.names.push(name.to_string());
    }
    Ok(out)
}

pub fn load_paramnames(path: &Path) -> TableResult<ParamNames> {
    let content = read(path)?;
    parse_paramnames(&content, &path.display().to_string())
}

/// Parse one chain file into rows of `expected_width` values.
pub fn parse_chain(
    content: &str,
    source_name: &str,
    expected_width: usize,
) -> TableResult<Vec<Vec<Real>>> {
    let mut rows = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parse_err = |what: String| TableError::Parse {
            source_name: source_name.to_string(),
            line: i + 1,
            what,
        };

        let mut row = Vec::with_capacity(expected_width);
        for token in line.split_whitespace() {
            let v: Real = token
                .parse()
                .map_err(|_| parse_err(format!("not a number: {token:?}")))?;
            row.push(ensure_finite(v, "chain value").map_err(|e| parse_err(e.to_string()))?);
        }
        if row.len() != expected_width {
            return Err(parse_err(format!(
                "expected {expected_width} values, found {}",
                row.len()
            )));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Expand glob patterns (`run_*.txt`) into their matches, sorted.
///
/// Entries without `*`, `?` or `[` are kept as given. A pattern matching no
/// file is an error.
pub fn expand_chain_paths(patterns: &[PathBuf]) -> TableResult<Vec<PathBuf>> {
    let mut out = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let text = pattern.to_string_lossy();
        if !text.contains(['*', '?', '[']) {
            out.push(pattern.clone());
            continue;
        }
        let bad = |what: String| TableError::Pattern {
            pattern: text.to_string(),
            what,
        };
        let mut matches = glob::glob(&text)
            .map_err(|e| bad(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| bad(e.to_string()))?;
        if matches.is_empty() {
            return Err(bad("no files match".to_string()));
        }
        matches.sort();
        out.extend(matches);
    }
    Ok(out)
}

/// Stack the given chain files, in order, into one sample table.
///
/// Glob patterns are expanded first (see `expand_chain_paths`). With
/// `params_only` the `weight` and `-LogLkl` columns are dropped.
pub fn load_chains(
    paths: &[PathBuf],
    params: &[String],
    params_only: bool,
) -> TableResult<SampleTable> {
    let paths = expand_chain_paths(paths)?;
    let width = CHAIN_PREFIX_COLUMNS.len() + params.len();
    let mut rows = Vec::new();
    for path in &paths {
        let content = read(path)?;
        let parsed = parse_chain(&content, &path.display().to_string(), width)?;
        tracing::debug!(path = %path.display(), rows = parsed.len(), "loaded chain file");
        rows.extend(parsed);
    }
    if rows.is_empty() {
        return Err(TableError::Empty);
    }

    let columns: Vec<String> = if params_only {
        for row in &mut rows {
            row.drain(..CHAIN_PREFIX_COLUMNS.len());
        }
        params.to_vec()
    } else {
        CHAIN_PREFIX_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(params.iter().cloned())
            .collect()
    };

    tracing::info!(files = paths.len(), rows = rows.len(), "chains loaded");
    SampleTable::new(columns, rows)
}
