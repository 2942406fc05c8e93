//! Duplicate detection. Two files are duplicates iff they are byte-identical;
//! size is a hard prefilter and the parallel pipeline's BLAKE3 stage is only
//! an accelerator — confirmation is always a byte comparison.

use crate::checks::{CheckTotals, EntryFilter};
use crate::engine::Engine;
use crate::error::Error;
use crate::hasher;
use crate::reporter::Reporter;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub fn run(engine: &Engine, root: &Path) -> Result<CheckTotals, Error> {
    let config = engine.config();

    // Stage 1: group by size, zero-byte files excluded.
    let mut by_size: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    let walk_errors = engine.for_each_entry(root, EntryFilter::Files, |path, stat| {
        if stat.size > 0 {
            by_size.entry(stat.size).or_default().push(path.to_path_buf());
        }
    })?;

    // Stage 2: singleton sizes cannot have duplicates.
    let mut groups: Vec<(u64, Vec<PathBuf>)> =
        by_size.into_iter().filter(|(_, paths)| paths.len() > 1).collect();
    debug!("{} size groups with more than one file", groups.len());

    let mut totals = CheckTotals {
        matches: walk_errors,
        wasted_bytes: 0,
    };

    // Each group is consumed and freed before the next one starts, bounding
    // peak memory to one group plus its buckets.
    while let Some((size, group)) = groups.pop() {
        let buckets = if config.duplicate_files_parallel {
            hash_stage(engine, group)
        } else {
            vec![group]
        };

        for bucket in buckets {
            let (clusters, read_errors) =
                cluster_identical(bucket, config.buffer_size, engine.reporter());
            totals.matches += read_errors;
            for cluster in clusters {
                totals.wasted_bytes += size * (cluster.len() as u64 - 1);
                totals.matches += cluster.len() as u64;
                engine.reporter().duplicate_cluster(size, &cluster);
            }
        }
    }

    if totals.wasted_bytes > 0 {
        engine.reporter().wasted(totals.wasted_bytes);
    }
    Ok(totals)
}

/// Parallel hash stage: one worker per path, bounded by the engine's
/// semaphore. The permit is taken on the submitting thread, so submission
/// stalls once every permit is held; workers release on completion. A worker
/// that fails logs and drops its file — the pool is never poisoned.
fn hash_stage(engine: &Engine, paths: Vec<PathBuf>) -> Vec<Vec<PathBuf>> {
    let buckets: DashMap<[u8; 32], Vec<PathBuf>> = DashMap::new();
    let buffer_size = engine.config().buffer_size;

    rayon::scope(|scope| {
        for path in paths {
            let permit = engine.semaphore().acquire();
            let buckets = &buckets;
            scope.spawn(move |_| {
                let _permit = permit;
                match hasher::blake3_of(&path, buffer_size) {
                    Ok(digest) => buckets.entry(digest).or_default().push(path),
                    Err(err) => error!("cannot hash {}: {err}", path.display()),
                }
            });
        }
    });

    buckets
        .into_iter()
        .map(|(_, paths)| paths)
        .filter(|paths| paths.len() > 1)
        .collect()
}

/// Stage 3: incremental clustering by byte comparison. Each cluster is
/// represented by its head; equality is transitive, so comparing a candidate
/// against heads only is sufficient. Returns surviving clusters (more than
/// one member, head first) and the number of read errors reported.
fn cluster_identical(
    paths: Vec<PathBuf>,
    buffer_size: usize,
    reporter: &dyn Reporter,
) -> (Vec<Vec<PathBuf>>, u64) {
    let mut clusters: Vec<Vec<PathBuf>> = Vec::new();
    let mut errors = 0u64;

    'next_path: for path in paths {
        for cluster in clusters.iter_mut() {
            match byte_equal(&path, &cluster[0], buffer_size) {
                Ok(true) => {
                    cluster.push(path);
                    continue 'next_path;
                }
                Ok(false) => {}
                Err(err) => {
                    reporter.error(&format!("cannot compare {}: {err}", path.display()));
                    errors += 1;
                    continue 'next_path;
                }
            }
        }
        clusters.push(vec![path]);
    }

    clusters.retain(|cluster| cluster.len() > 1);
    (clusters, errors)
}

/// Byte-by-byte comparison over one paired buffer split in half, one half
/// per reader. Callers prefilter by size, so inequality is the only early
/// exit; equal content to EOF on both sides means equal.
pub fn byte_equal(a: &Path, b: &Path, buffer_size: usize) -> io::Result<bool> {
    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;

    // even length, so the two halves are the same size and the readers
    // advance in lockstep
    let mut paired = vec![0u8; (buffer_size.max(2) / 2) * 2];
    let half = paired.len() / 2;
    let (buf_a, buf_b) = paired.split_at_mut(half);

    loop {
        let read_a = read_full(&mut file_a, buf_a)?;
        let read_b = read_full(&mut file_b, buf_b)?;
        if read_a != read_b {
            return Ok(false);
        }
        if buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a < buf_a.len() {
            // both hit EOF on this round with equal content
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; a short count means EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
