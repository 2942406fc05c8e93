use crate::tables;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

pub const CONFIG_FILE: &str = "config.json";

/// Engine configuration. The on-disk form is a single JSON document whose
/// keys are the SCREAMING_SNAKE_CASE spellings of these fields; unknown keys
/// are rejected so typos surface instead of silently doing nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ScanConfig {
    /// Scan root used when the host passes no directory.
    pub input_folder: Option<String>,

    /// Per-file read buffer in bytes; halved for paired-buffer comparison.
    pub buffer_size: usize,
    /// Share stats between checks through the path/stat cache.
    pub enable_cache: bool,
    /// Worker-pool permits; 0 means detect CPU count.
    pub max_jobs: usize,
    pub duplicate_files_parallel: bool,
    pub integrity_files_parallel: bool,

    /// Literal byte patterns for the confidential scanner.
    pub patterns: Vec<String>,
    /// Base64-encoded byte patterns for the confidential scanner.
    pub pattern_base64_bytes: Vec<String>,
    /// Glob patterns excluded from every walk.
    pub ignore_patterns: Vec<String>,

    pub large_file_size: u64,
    /// Nanoseconds since last access before a file counts as stale.
    pub last_access_time: u64,
    pub max_items_directory: usize,
    pub max_dir_file_name_size: usize,
    pub max_full_path_size: usize,

    pub duplicate_files: bool,
    pub link_files: bool,
    pub integrity_files: bool,
    pub temporary_files: bool,
    pub confidential_files: bool,
    pub compressed_files: bool,
    pub duplicate_chars: bool,
    pub empty_files: bool,
    pub large_files: bool,
    pub last_access_files: bool,
    pub legacy_files: bool,
    pub magic_numbers: bool,
    pub no_extension_files: bool,
    pub json_files: bool,
    pub wrong_dates: bool,
    pub empty_dirs: bool,
    pub many_items_dirs: bool,
    pub one_item_dirs: bool,
    pub name_size: bool,
    pub path_size: bool,
    pub unportable_chars: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            input_folder: None,
            buffer_size: 64 * 1024,
            enable_cache: true,
            max_jobs: 0,
            duplicate_files_parallel: true,
            integrity_files_parallel: true,
            patterns: tables::DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect(),
            pattern_base64_bytes: tables::DEFAULT_PATTERN_BASE64
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore_patterns: Vec::new(),
            large_file_size: 100 * 1024 * 1024,
            last_access_time: 365 * 24 * 60 * 60 * 1_000_000_000,
            max_items_directory: 1000,
            max_dir_file_name_size: 255,
            max_full_path_size: 4096,
            duplicate_files: true,
            link_files: true,
            integrity_files: true,
            temporary_files: true,
            confidential_files: true,
            compressed_files: true,
            duplicate_chars: true,
            empty_files: true,
            large_files: true,
            last_access_files: true,
            legacy_files: true,
            magic_numbers: true,
            no_extension_files: true,
            json_files: true,
            wrong_dates: true,
            empty_dirs: true,
            many_items_dirs: true,
            one_item_dirs: true,
            name_size: true,
            path_size: true,
            unportable_chars: true,
        }
    }
}

impl ScanConfig {
    /// Load from `path`. A missing file yields the defaults silently; a file
    /// that exists but does not parse (bad JSON, unknown key, wrong type)
    /// yields the defaults with a single warning.
    pub fn load_or_default(path: &Path) -> ScanConfig {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return ScanConfig::default(),
            Err(err) => {
                warn!("cannot read {}: {err}; using defaults", path.display());
                return ScanConfig::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!("invalid configuration in {}: {err}; using defaults", path.display());
                ScanConfig::default()
            }
        }
    }

    /// Write the default configuration to `path`. Refuses to overwrite.
    pub fn write_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        let rendered = serde_json::to_string_pretty(&ScanConfig::default())
            .expect("default configuration serializes");
        fs::write(path, rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_round_trip_through_json() {
        let rendered = serde_json::to_string(&ScanConfig::default()).unwrap();
        let parsed: ScanConfig = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.buffer_size, 64 * 1024);
        assert!(parsed.enable_cache);
        assert!(rendered.contains("\"BUFFER_SIZE\""));
        assert!(rendered.contains("\"DUPLICATE_FILES_PARALLEL\""));
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let parsed: ScanConfig =
            serde_json::from_str(r#"{"BUFFER_SIZE": 4096, "ENABLE_CACHE": false}"#).unwrap();
        assert_eq!(parsed.buffer_size, 4096);
        assert!(!parsed.enable_cache);
        assert!(parsed.duplicate_files);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<ScanConfig>(r#"{"BUFER_SIZE": 4096}"#);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let config = ScanConfig::load_or_default(&path);
        assert_eq!(config.buffer_size, ScanConfig::default().buffer_size);
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::load_or_default(&dir.path().join("absent.json"));
        assert!(config.enable_cache);
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        ScanConfig::write_default(&path).unwrap();
        let err = ScanConfig::write_default(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        let reloaded = ScanConfig::load_or_default(&path);
        assert_eq!(reloaded.max_items_directory, 1000);
    }
}
