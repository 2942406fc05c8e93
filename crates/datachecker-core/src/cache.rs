use crate::walker::{EntryKind, FileStat};
use dashmap::DashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide absolute-path → stat mapping. The first check that drives a
/// walk fills it; every later check reads it instead of touching the
/// filesystem again. Keys are owned copies because walker paths are reused.
///
/// Single-writer during a walk, read-only afterwards; entries are never
/// evicted within a run. When disabled, nothing is stored and every lookup
/// hits the filesystem.
pub struct PathStatCache {
    entries: DashMap<PathBuf, FileStat>,
    stat_calls: AtomicU64,
    enabled: bool,
}

impl PathStatCache {
    pub fn new(enabled: bool) -> PathStatCache {
        PathStatCache {
            entries: DashMap::new(),
            stat_calls: AtomicU64::new(0),
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of real stat syscalls performed through this cache, including
    /// those recorded on behalf of the walker. Lets callers observe that a
    /// second pass over cached entries touches the filesystem zero times.
    pub fn stat_calls(&self) -> u64 {
        self.stat_calls.load(Ordering::Relaxed)
    }

    /// Record a stat performed elsewhere (the walker stats each entry while
    /// classifying it) and store its result.
    pub fn record_walked(&self, path: &Path, stat: FileStat) {
        self.stat_calls.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.entries.insert(path.to_path_buf(), stat);
        }
    }

    /// Cached stat if present, otherwise one filesystem query. Directories
    /// that fail the query with is-a-directory yield a synthetic directory
    /// stat rather than an error.
    pub fn fetch_or_insert(&self, path: &Path) -> io::Result<FileStat> {
        if self.enabled {
            if let Some(stat) = self.entries.get(path) {
                return Ok(*stat);
            }
        }
        self.stat_calls.fetch_add(1, Ordering::Relaxed);
        let stat = match fs::symlink_metadata(path) {
            Ok(metadata) => FileStat::from_metadata(&metadata),
            Err(err) if err.kind() == io::ErrorKind::IsADirectory => FileStat::directory(),
            Err(err) => return Err(err),
        };
        if self.enabled {
            self.entries.insert(path.to_path_buf(), stat);
        }
        Ok(stat)
    }

    pub fn iter_all(&self) -> impl Iterator<Item = (PathBuf, FileStat)> + '_ {
        self.entries.iter().map(|r| (r.key().clone(), *r.value()))
    }

    pub fn iter_files(&self) -> impl Iterator<Item = (PathBuf, FileStat)> + '_ {
        self.iter_all().filter(|(_, s)| s.kind == EntryKind::File)
    }

    pub fn iter_dirs(&self) -> impl Iterator<Item = (PathBuf, FileStat)> + '_ {
        self.iter_all().filter(|(_, s)| s.kind == EntryKind::Directory)
    }
}
