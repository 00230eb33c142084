use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bsv_core::{SampleId, Selection};
use bsv_table::{TableError, load_chains, load_paramnames};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn paramnames_and_two_chains_stack_in_order() {
    let dir = unique_temp_dir("bsv_table_chains");
    fs::create_dir_all(&dir).expect("failed to create temp dir");

    let paramnames = dir.join("run.paramnames");
    fs::write(&paramnames, "omega_b\t\\omega_{b}\nh\th\n").expect("failed to write paramnames");

    let chain1 = dir.join("run_1.txt");
    fs::write(&chain1, "1 10.0 0.022 0.67\n2 11.0 0.023 0.68\n").expect("failed to write chain");
    let chain2 = dir.join("run_2.txt");
    fs::write(&chain2, "1 12.0 0.024 0.69\n").expect("failed to write chain");

    let params = load_paramnames(&paramnames).expect("failed to load paramnames");
    assert_eq!(params.names, vec!["omega_b", "h"]);
    assert_eq!(params.labels.resolve("omega_b"), "$$\\omega_{b}$$");

    let full = load_chains(&[chain1.clone(), chain2.clone()], &params.names, false)
        .expect("failed to load chains");
    assert_eq!(full.columns(), ["weight", "-LogLkl", "omega_b", "h"]);
    assert_eq!(full.len(), 3);
    assert_eq!(full.value(SampleId::from_index(2), "h").unwrap(), 0.69);

    let only = load_chains(&[chain1, chain2], &params.names, true).expect("failed to load chains");
    assert_eq!(only.columns(), ["omega_b", "h"]);
    assert_eq!(only.column("omega_b").unwrap(), vec![0.022, 0.023, 0.024]);

    let picked = only
        .select(&Selection::from_indices([1]).unwrap(), &[])
        .unwrap();
    assert_eq!(picked.columns, vec!["index", "omega_b", "h"]);
    assert_eq!(picked.rows[0].1, vec![0.023, 0.68]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_chain_file_is_io_error() {
    let dir = unique_temp_dir("bsv_table_missing");
    let err = load_chains(&[dir.join("nope.txt")], &["a".to_string()], true).unwrap_err();
    assert!(matches!(err, TableError::Io { .. }));
}

#[test]
fn empty_chain_set_is_rejected() {
    let err = load_chains(&[], &["a".to_string()], true).unwrap_err();
    assert!(matches!(err, TableError::Empty));
}

#[test]
fn glob_pattern_loads_matches_sorted() {
    let dir = unique_temp_dir("bsv_table_glob");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    fs::write(dir.join("run_2.txt"), "1 12.0 0.3\n").expect("failed to write chain");
    fs::write(dir.join("run_1.txt"), "1 10.0 0.1\n1 11.0 0.2\n").expect("failed to write chain");
    fs::write(dir.join("notes.md"), "not a chain\n").expect("failed to write notes");

    let table = load_chains(&[dir.join("run_*.txt")], &["h".to_string()], true)
        .expect("failed to load chains");
    assert_eq!(table.column("h").unwrap(), vec![0.1, 0.2, 0.3]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn glob_without_matches_is_pattern_error() {
    let dir = unique_temp_dir("bsv_table_glob_empty");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let err = load_chains(&[dir.join("run_*.txt")], &["h".to_string()], true).unwrap_err();
    assert!(matches!(err, TableError::Pattern { .. }));
    let _ = fs::remove_dir_all(&dir);
}
