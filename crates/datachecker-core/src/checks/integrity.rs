//! Sidecar hash files. A sidecar `<target>.<alg>` is the witness for its
//! sibling: empty means "populate me", a full-length hex body means "verify
//! me". The sidecar is never deleted or truncated; the only write the engine
//! ever performs is filling an empty sidecar with the digest.

use crate::checks::{CheckTotals, EntryFilter};
use crate::config::ScanConfig;
use crate::engine::Engine;
use crate::error::Error;
use crate::hasher::{self, HashAlgorithm};
use crate::reporter::{CheckKind, Reporter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};

pub fn run(engine: &Engine, root: &Path) -> Result<CheckTotals, Error> {
    let config = engine.config();

    let mut sidecars: Vec<(PathBuf, &'static HashAlgorithm)> = Vec::new();
    let walk_errors = engine.for_each_entry(root, EntryFilter::Files, |path, _| {
        if let Some(algo) = sidecar_algorithm(path) {
            sidecars.push((path.to_path_buf(), algo));
        }
    })?;
    debug!("{} hash sidecars found", sidecars.len());

    let matches = if config.integrity_files_parallel {
        run_parallel(engine, config, sidecars)
    } else {
        let mut count = 0u64;
        for (sidecar, algo) in sidecars {
            count += process_sidecar(config, engine.reporter(), &sidecar, algo);
        }
        count
    };

    Ok(CheckTotals {
        matches: matches + walk_errors,
        wasted_bytes: 0,
    })
}

/// Same pool discipline as the duplicate hash stage: permit before spawn,
/// release at worker exit, failures confined to their file.
fn run_parallel(
    engine: &Engine,
    config: &ScanConfig,
    sidecars: Vec<(PathBuf, &'static HashAlgorithm)>,
) -> u64 {
    let counter = AtomicU64::new(0);
    let reporter = engine.reporter();

    rayon::scope(|scope| {
        for (sidecar, algo) in sidecars {
            let permit = engine.semaphore().acquire();
            let counter = &counter;
            scope.spawn(move |_| {
                let _permit = permit;
                let found = process_sidecar(config, reporter, &sidecar, algo);
                counter.fetch_add(found, Ordering::Relaxed);
            });
        }
    });

    counter.into_inner()
}

/// Recognize `<target>.<alg>` by its extension, case-insensitively.
fn sidecar_algorithm(path: &Path) -> Option<&'static HashAlgorithm> {
    let ext = path.extension()?.to_str()?;
    HashAlgorithm::from_extension(ext)
}

/// Drive one sidecar through its state machine. Returns the number of
/// events reported (always 1: created, verified, mismatch, or an error).
fn process_sidecar(
    config: &ScanConfig,
    reporter: &dyn Reporter,
    sidecar: &Path,
    algo: &'static HashAlgorithm,
) -> u64 {
    let kind = CheckKind::Integrity;
    let target = sidecar.with_extension("");

    if !target.exists() {
        reporter.finding(kind, sidecar, "target not found");
        return 1;
    }

    let witness_len = match fs::metadata(sidecar) {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            error!("cannot stat {}: {err}", sidecar.display());
            reporter.error(&format!("cannot stat {}: {err}", sidecar.display()));
            return 1;
        }
    };

    if witness_len == 0 {
        return match hasher::digest_hex(algo, &target, config.buffer_size) {
            Ok(hex) => match fs::write(sidecar, &hex) {
                Ok(()) => {
                    reporter.finding(kind, sidecar, &format!("created ({})", algo.tag()));
                    1
                }
                Err(err) => {
                    reporter.error(&format!("cannot write {}: {err}", sidecar.display()));
                    1
                }
            },
            Err(err) => {
                reporter.error(&format!("cannot hash {}: {err}", target.display()));
                1
            }
        };
    }

    if witness_len != algo.hex_len() as u64 {
        reporter.finding(kind, sidecar, "read error: unexpected digest length");
        return 1;
    }

    let stored = match fs::read(sidecar) {
        Ok(body) => body,
        Err(err) => {
            reporter.error(&format!("cannot read {}: {err}", sidecar.display()));
            return 1;
        }
    };
    let stored = match hex::decode(&stored) {
        Ok(bytes) => bytes,
        Err(_) => {
            reporter.finding(kind, sidecar, "read error: digest is not hex");
            return 1;
        }
    };

    let mut computed = Vec::with_capacity(algo.digest_len());
    if let Err(err) = hasher::digest_of(algo, &target, config.buffer_size, &mut computed) {
        reporter.error(&format!("cannot hash {}: {err}", target.display()));
        return 1;
    }

    if stored == computed {
        reporter.ok(kind, sidecar, &format!("verified ({})", algo.tag()));
    } else {
        reporter.finding(kind, sidecar, &format!("mismatch ({})", algo.tag()));
    }
    1
}
