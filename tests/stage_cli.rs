//! The hidden `stage` subcommand, run on its own.

#![cfg(unix)]

mod common;

use common::{run_txpipe, stderr, stdout};
use pretty_assertions::assert_eq;

#[test]
fn performance_stage_splits_entity_and_region_summaries() {
    let out = run_txpipe(
        &["stage", "performance"],
        "Ann Lee, A9, T1, OR, 250000, -1,000.00\n\
         Ann Lee, A9, T2, WA, 260000, 999.99\n\
         Max Poe, A4, T3, OR, 100000, 0\n",
    );

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "Ann Lee, A9, -1,000.00\nMax Poe, A4, 0.00\n");
    assert_eq!(stderr(&out), "OR, -1,000.00\nWA, +999.99\n");
}

#[test]
fn rating_stage_averages() {
    let out = run_txpipe(&["stage", "rating"], "A1, OR, 4.5\nA1, OR, 3.5\nA2, WA, 1.0");

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "A1, 4.0\nA2, 1.0\n");
    assert_eq!(stderr(&out), "OR, 4.0\nWA, 1.0\n");
}

#[test]
fn short_record_fails_with_empty_channels() {
    let out = run_txpipe(&["stage", "rating"], "A1, OR, 4.5\nA1 OR\n");

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    assert_eq!(stderr(&out), "");
}

#[test]
fn strict_flag_applies_to_stage() {
    let out = run_txpipe(&["stage", "rating", "--strict"], "A1, OR, 4.5x\n");
    assert_eq!(out.status.code(), Some(1));

    let out = run_txpipe(&["stage", "rating"], "A1, OR, 4.5x\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "A1, 0.0\n");
}

#[test]
fn empty_input_produces_no_output() {
    let out = run_txpipe(&["stage", "performance"], "");

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "");
    assert_eq!(stderr(&out), "");
}

#[test]
fn blank_line_is_a_short_record() {
    let out = run_txpipe(&["stage", "rating"], "A1, OR, 4.5\n\nA2, WA, 1.0\n");

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    assert_eq!(stderr(&out), "");
}
