//! Cheap per-file predicates plus the two walker-driven checks that need
//! only names and stats: temporary files and links.

use crate::checks::{CheckContext, CheckTotals, EntryFilter};
use crate::engine::Engine;
use crate::error::Error;
use crate::reporter::CheckKind;
use crate::tables;
use crate::walker::{now_ns, EntryKind, FileStat};
use std::fs;
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Walker-driven: report every file matching a temporary pattern.
pub fn run_temporary(engine: &Engine, root: &Path) -> Result<CheckTotals, Error> {
    let mut matches = 0u64;
    let walk_errors = engine.for_each_entry(root, EntryFilter::Files, |path, _| {
        let name = file_name(path);
        let full = path.to_string_lossy();
        if tables::TEMPORARY_PATTERNS
            .iter()
            .any(|p| p.matches(&name, &full))
        {
            engine
                .reporter()
                .finding(CheckKind::Temporary, path, "temporary file");
            matches += 1;
        }
    })?;
    Ok(CheckTotals {
        matches: matches + walk_errors,
        wasted_bytes: 0,
    })
}

/// Walker-driven: report every symlink; warn when its target is unreadable.
pub fn run_links(engine: &Engine, root: &Path) -> Result<CheckTotals, Error> {
    let mut matches = 0u64;
    let walk_errors = engine.for_each_entry(root, EntryFilter::All, |path, stat| {
        if stat.kind != EntryKind::Symlink {
            return;
        }
        match fs::read_link(path) {
            Ok(dest) => {
                engine.reporter().finding(
                    CheckKind::Links,
                    path,
                    &format!("link to {}", dest.display()),
                );
                if !path.exists() {
                    engine
                        .reporter()
                        .warning(&format!("broken link: {}", path.display()));
                }
            }
            Err(err) => {
                engine
                    .reporter()
                    .warning(&format!("unreadable link {}: {err}", path.display()));
            }
        }
        matches += 1;
    })?;
    Ok(CheckTotals {
        matches: matches + walk_errors,
        wasted_bytes: 0,
    })
}

pub fn compressed(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    match lower_extension(path) {
        Some(ext) if tables::COMPRESSED_EXTENSIONS.contains(&ext.as_str()) => {
            ctx.finding(path, "compressed file");
            1
        }
        _ => 0,
    }
}

pub fn legacy(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    match lower_extension(path) {
        Some(ext) if tables::LEGACY_EXTENSIONS.contains(&ext.as_str()) => {
            ctx.finding(path, "legacy format");
            1
        }
        _ => 0,
    }
}

pub fn empty(ctx: &CheckContext, path: &Path, stat: &FileStat) -> u64 {
    if stat.size == 0 {
        ctx.finding(path, "empty file");
        1
    } else {
        0
    }
}

pub fn large(ctx: &CheckContext, path: &Path, stat: &FileStat) -> u64 {
    if stat.size > ctx.config.large_file_size {
        ctx.finding(path, &format!("large file ({} bytes)", stat.size));
        1
    } else {
        0
    }
}

pub fn last_access(ctx: &CheckContext, path: &Path, stat: &FileStat) -> u64 {
    let now = now_ns();
    if stat.accessed_ns > 0
        && stat.accessed_ns <= now
        && now - stat.accessed_ns > ctx.config.last_access_time
    {
        ctx.finding(path, "not accessed for a long time");
        1
    } else {
        0
    }
}

/// Timestamps in the future are always wrong, whichever clock wrote them.
pub fn wrong_dates(ctx: &CheckContext, path: &Path, stat: &FileStat) -> u64 {
    let now = now_ns();
    let future = [stat.accessed_ns, stat.created_ns, stat.modified_ns]
        .into_iter()
        .any(|ts| ts > now);
    if future {
        ctx.finding(path, "timestamp in the future");
        1
    } else {
        0
    }
}
