#![allow(dead_code)]

use datachecker_core::{CheckKind, Reporter, ScanConfig};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Section(CheckKind),
    Ok(CheckKind, PathBuf, String),
    Finding(CheckKind, PathBuf, String),
    Warning(String),
    Error(String),
    Cluster(u64, Vec<PathBuf>),
    Wasted(u64),
    Totals(CheckKind, u64),
}

/// In-memory reporter for asserting on exactly what the engine emitted.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> RecordingReporter {
        RecordingReporter::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn findings(&self, kind: CheckKind) -> Vec<(PathBuf, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finding(k, path, message) if k == kind => Some((path, message)),
                _ => None,
            })
            .collect()
    }

    pub fn oks(&self, kind: CheckKind) -> Vec<(PathBuf, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Ok(k, path, message) if k == kind => Some((path, message)),
                _ => None,
            })
            .collect()
    }

    pub fn clusters(&self) -> Vec<(u64, Vec<PathBuf>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Cluster(size, members) => Some((size, members)),
                _ => None,
            })
            .collect()
    }

    pub fn wasted_totals(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Wasted(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    pub fn totals_for(&self, kind: CheckKind) -> Option<u64> {
        self.events().into_iter().find_map(|e| match e {
            Event::Totals(k, count) if k == kind => Some(count),
            _ => None,
        })
    }
}

impl Reporter for RecordingReporter {
    fn section(&self, check: CheckKind) {
        self.events.lock().unwrap().push(Event::Section(check));
    }

    fn ok(&self, check: CheckKind, path: &Path, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Ok(check, path.to_path_buf(), message.to_string()));
    }

    fn finding(&self, check: CheckKind, path: &Path, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Finding(check, path.to_path_buf(), message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Error(message.to_string()));
    }

    fn duplicate_cluster(&self, size: u64, members: &[PathBuf]) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Cluster(size, members.to_vec()));
    }

    fn wasted(&self, bytes: u64) {
        self.events.lock().unwrap().push(Event::Wasted(bytes));
    }

    fn totals(&self, check: CheckKind, count: u64) {
        self.events.lock().unwrap().push(Event::Totals(check, count));
    }
}

/// Defaults with every check switched off; tests flip on what they exercise.
pub fn quiet_config() -> ScanConfig {
    let mut config = ScanConfig::default();
    config.duplicate_files = false;
    config.link_files = false;
    config.integrity_files = false;
    config.temporary_files = false;
    config.confidential_files = false;
    config.compressed_files = false;
    config.duplicate_chars = false;
    config.empty_files = false;
    config.large_files = false;
    config.last_access_files = false;
    config.legacy_files = false;
    config.magic_numbers = false;
    config.no_extension_files = false;
    config.json_files = false;
    config.wrong_dates = false;
    config.empty_dirs = false;
    config.many_items_dirs = false;
    config.one_item_dirs = false;
    config.name_size = false;
    config.path_size = false;
    config.unportable_chars = false;
    config
}
