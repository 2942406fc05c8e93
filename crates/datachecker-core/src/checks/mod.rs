//! The check catalogue and its dispatch table.
//!
//! Checks come in two shapes. Whole-tree checks own their traversal (and get
//! the engine so they can reach the cache, the semaphore, and the matcher);
//! per-entry checks are plain functions over one path + stat, driven by the
//! engine's shared iteration. The table below fixes the execution order —
//! the first check that walks populates the cache for everything after it.

pub mod confidential;
pub mod dirs;
pub mod duplicates;
pub mod files;
pub mod integrity;
pub mod json;
pub mod magic;
pub mod names;

use crate::config::ScanConfig;
use crate::engine::Engine;
use crate::error::Error;
use crate::reporter::{CheckKind, Reporter};
use crate::walker::{EntryKind, FileStat};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    Files,
    Dirs,
    FilesAndDirs,
    All,
}

impl EntryFilter {
    pub fn matches(self, kind: EntryKind) -> bool {
        match self {
            EntryFilter::Files => kind == EntryKind::File,
            EntryFilter::Dirs => kind == EntryKind::Directory,
            EntryFilter::FilesAndDirs => {
                kind == EntryKind::File || kind == EntryKind::Directory
            }
            EntryFilter::All => true,
        }
    }
}

/// Everything a per-entry check needs.
pub struct CheckContext<'a> {
    pub config: &'a ScanConfig,
    pub reporter: &'a dyn Reporter,
    pub kind: CheckKind,
}

impl CheckContext<'_> {
    pub fn finding(&self, path: &Path, message: &str) {
        self.reporter.finding(self.kind, path, message);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CheckTotals {
    pub matches: u64,
    pub wasted_bytes: u64,
}

pub enum Runner {
    WholeTree(fn(&Engine, &Path) -> Result<CheckTotals, Error>),
    PerEntry {
        filter: EntryFilter,
        run: fn(&CheckContext, &Path, &FileStat) -> u64,
    },
}

pub struct CheckDef {
    pub kind: CheckKind,
    pub enabled: fn(&ScanConfig) -> bool,
    pub runner: Runner,
}

/// Fixed execution order.
pub const CHECKS: &[CheckDef] = &[
    CheckDef {
        kind: CheckKind::Duplicates,
        enabled: |c| c.duplicate_files,
        runner: Runner::WholeTree(duplicates::run),
    },
    CheckDef {
        kind: CheckKind::Links,
        enabled: |c| c.link_files,
        runner: Runner::WholeTree(files::run_links),
    },
    CheckDef {
        kind: CheckKind::Integrity,
        enabled: |c| c.integrity_files,
        runner: Runner::WholeTree(integrity::run),
    },
    CheckDef {
        kind: CheckKind::Temporary,
        enabled: |c| c.temporary_files,
        runner: Runner::WholeTree(files::run_temporary),
    },
    CheckDef {
        kind: CheckKind::Confidential,
        enabled: |c| c.confidential_files,
        runner: Runner::WholeTree(confidential::run),
    },
    CheckDef {
        kind: CheckKind::Compressed,
        enabled: |c| c.compressed_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: files::compressed,
        },
    },
    CheckDef {
        kind: CheckKind::DuplicateChars,
        enabled: |c| c.duplicate_chars,
        runner: Runner::PerEntry {
            filter: EntryFilter::FilesAndDirs,
            run: names::duplicate_chars,
        },
    },
    CheckDef {
        kind: CheckKind::EmptyFiles,
        enabled: |c| c.empty_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: files::empty,
        },
    },
    CheckDef {
        kind: CheckKind::LargeFiles,
        enabled: |c| c.large_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: files::large,
        },
    },
    CheckDef {
        kind: CheckKind::LastAccess,
        enabled: |c| c.last_access_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: files::last_access,
        },
    },
    CheckDef {
        kind: CheckKind::Legacy,
        enabled: |c| c.legacy_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: files::legacy,
        },
    },
    CheckDef {
        kind: CheckKind::MagicNumbers,
        enabled: |c| c.magic_numbers,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: magic::validate,
        },
    },
    CheckDef {
        kind: CheckKind::NoExtension,
        enabled: |c| c.no_extension_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: magic::no_extension,
        },
    },
    CheckDef {
        kind: CheckKind::JsonParse,
        enabled: |c| c.json_files,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: json::parse,
        },
    },
    CheckDef {
        kind: CheckKind::WrongDates,
        enabled: |c| c.wrong_dates,
        runner: Runner::PerEntry {
            filter: EntryFilter::Files,
            run: files::wrong_dates,
        },
    },
    CheckDef {
        kind: CheckKind::EmptyDirs,
        enabled: |c| c.empty_dirs,
        runner: Runner::PerEntry {
            filter: EntryFilter::Dirs,
            run: dirs::empty,
        },
    },
    CheckDef {
        kind: CheckKind::ManyItemsDirs,
        enabled: |c| c.many_items_dirs,
        runner: Runner::PerEntry {
            filter: EntryFilter::Dirs,
            run: dirs::many_items,
        },
    },
    CheckDef {
        kind: CheckKind::OneItemDirs,
        enabled: |c| c.one_item_dirs,
        runner: Runner::PerEntry {
            filter: EntryFilter::Dirs,
            run: dirs::one_item,
        },
    },
    CheckDef {
        kind: CheckKind::NameSize,
        enabled: |c| c.name_size,
        runner: Runner::PerEntry {
            filter: EntryFilter::FilesAndDirs,
            run: names::name_size,
        },
    },
    CheckDef {
        kind: CheckKind::PathSize,
        enabled: |c| c.path_size,
        runner: Runner::PerEntry {
            filter: EntryFilter::FilesAndDirs,
            run: names::path_size,
        },
    },
    CheckDef {
        kind: CheckKind::UnportableChars,
        enabled: |c| c.unportable_chars,
        runner: Runner::PerEntry {
            filter: EntryFilter::FilesAndDirs,
            run: names::unportable_chars,
        },
    },
];
