mod common;

use common::{Event, RecordingReporter};
use datachecker_core::{CheckKind, Engine, ScanConfig};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Duplicate trio fixture: `a`, `b/c`, `d/e/f`, each 7 bytes of "hello\n!".
fn create_trio(root: &Path) {
    fs::create_dir_all(root.join("b")).unwrap();
    fs::create_dir_all(root.join("d/e")).unwrap();
    fs::write(root.join("a"), "hello\n!").unwrap();
    fs::write(root.join("b/c"), "hello\n!").unwrap();
    fs::write(root.join("d/e/f"), "hello\n!").unwrap();
}

fn run_duplicates(root: &Path, parallel: bool) -> RecordingReporter {
    let config = ScanConfig {
        duplicate_files_parallel: parallel,
        ..ScanConfig::default()
    };
    let reporter = RecordingReporter::new();
    {
        let engine = Engine::new(config, &reporter).unwrap();
        engine.run_single(root, CheckKind::Duplicates).unwrap();
    }
    reporter
}

fn assert_trio_cluster(reporter: &RecordingReporter, root: &Path) {
    let clusters = reporter.clusters();
    assert_eq!(clusters.len(), 1, "expected exactly one cluster");
    let (size, members) = &clusters[0];
    assert_eq!(*size, 7);

    let got: HashSet<_> = members.iter().cloned().collect();
    let root = fs::canonicalize(root).unwrap();
    let want: HashSet<_> = [root.join("a"), root.join("b/c"), root.join("d/e/f")]
        .into_iter()
        .collect();
    assert_eq!(got, want);

    // two duplicate copies of 7 bytes
    assert_eq!(reporter.wasted_totals(), vec![14]);
    assert_eq!(reporter.totals_for(CheckKind::Duplicates), Some(3));
}

#[test]
fn duplicate_trio_single_threaded() {
    let tmp = tempdir().unwrap();
    create_trio(tmp.path());
    let reporter = run_duplicates(tmp.path(), false);
    assert_trio_cluster(&reporter, tmp.path());
}

#[test]
fn duplicate_trio_parallel() {
    let tmp = tempdir().unwrap();
    create_trio(tmp.path());
    let reporter = run_duplicates(tmp.path(), true);
    assert_trio_cluster(&reporter, tmp.path());
}

#[test]
fn pipelines_agree_on_a_mixed_tree() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("pair_1.bin"), vec![0xaa; 4096]).unwrap();
    fs::write(root.join("sub/pair_2.bin"), vec![0xaa; 4096]).unwrap();
    // same size, different content — hash stage must separate them
    fs::write(root.join("decoy.bin"), vec![0xbb; 4096]).unwrap();
    fs::write(root.join("unique.txt"), "only one of these").unwrap();

    for parallel in [false, true] {
        let reporter = run_duplicates(root, parallel);
        let clusters = reporter.clusters();
        assert_eq!(clusters.len(), 1, "parallel={parallel}");
        assert_eq!(clusters[0].1.len(), 2);
        assert_eq!(reporter.wasted_totals(), vec![4096]);
    }
}

#[test]
fn zero_byte_files_are_never_duplicates() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("empty_1"), "").unwrap();
    fs::write(tmp.path().join("empty_2"), "").unwrap();

    let reporter = run_duplicates(tmp.path(), false);
    assert!(reporter.clusters().is_empty());
    assert_eq!(reporter.totals_for(CheckKind::Duplicates), Some(0));
}

#[test]
fn same_size_different_content_is_not_a_duplicate() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("x"), "1234567").unwrap();
    fs::write(tmp.path().join("y"), "7654321").unwrap();

    for parallel in [false, true] {
        let reporter = run_duplicates(tmp.path(), parallel);
        assert!(reporter.clusters().is_empty(), "parallel={parallel}");
    }
}

#[test]
fn empty_input_directory_reports_zero_everywhere() {
    let tmp = tempdir().unwrap();
    let reporter = RecordingReporter::new();
    {
        let engine = Engine::new(ScanConfig::default(), &reporter).unwrap();
        let summary = engine.run(tmp.path()).unwrap();
        assert_eq!(summary.checks_run, 21);
        assert_eq!(summary.findings, 0);
        assert_eq!(summary.wasted_bytes, 0);
    }
    for kind in CheckKind::ALL {
        assert_eq!(reporter.totals_for(kind), Some(0), "check {}", kind.name());
    }
}

#[test]
fn missing_root_maps_to_exit_one() {
    let tmp = tempdir().unwrap();
    let reporter = RecordingReporter::new();
    let engine = Engine::new(ScanConfig::default(), &reporter).unwrap();
    let err = engine.run(&tmp.path().join("nope")).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn cached_second_run_performs_no_stats() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("one.txt"), "1").unwrap();
    fs::write(root.join("sub/hollow.txt"), "").unwrap();

    let mut config = common::quiet_config();
    config.empty_files = true;
    config.enable_cache = true;

    let reporter = RecordingReporter::new();
    let engine = Engine::new(config, &reporter).unwrap();

    engine.run(root).unwrap();
    let stats_after_first = engine.cache().stat_calls();
    assert!(stats_after_first > 0);
    assert_eq!(reporter.findings(CheckKind::EmptyFiles).len(), 1);

    // identical report, zero new stat syscalls
    engine.run(root).unwrap();
    assert_eq!(engine.cache().stat_calls(), stats_after_first);
    assert_eq!(reporter.findings(CheckKind::EmptyFiles).len(), 2);
}

#[test]
fn disabled_cache_stats_every_run() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("f.txt"), "x").unwrap();

    let mut config = common::quiet_config();
    config.empty_files = true;
    config.enable_cache = false;

    let reporter = RecordingReporter::new();
    let engine = Engine::new(config, &reporter).unwrap();
    engine.run(tmp.path()).unwrap();
    let first = engine.cache().stat_calls();
    engine.run(tmp.path()).unwrap();
    assert_eq!(engine.cache().stat_calls(), first * 2);
    assert!(engine.cache().is_empty());
}

#[test]
fn first_walking_check_feeds_later_checks_from_the_cache() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("keep.txt"), "data").unwrap();
    fs::write(root.join("hollow.txt"), "").unwrap();

    // duplicates walks first and fills the cache; empty-files then runs
    // against cached stats only
    let mut config = common::quiet_config();
    config.duplicate_files = true;
    config.empty_files = true;

    let reporter = RecordingReporter::new();
    let engine = Engine::new(config, &reporter).unwrap();
    engine.run(root).unwrap();

    let empties = reporter.findings(CheckKind::EmptyFiles);
    assert_eq!(empties.len(), 1);
    assert!(empties[0].0.ends_with("hollow.txt"));

    let events = reporter.events();
    let dup_section = events
        .iter()
        .position(|e| *e == Event::Section(CheckKind::Duplicates))
        .unwrap();
    let empty_section = events
        .iter()
        .position(|e| *e == Event::Section(CheckKind::EmptyFiles))
        .unwrap();
    assert!(dup_section < empty_section, "fixed check order violated");
}
