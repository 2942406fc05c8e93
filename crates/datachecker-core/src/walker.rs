use crate::error::Error;
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// Snapshot of one stat call. Times are nanoseconds since the Unix epoch,
/// zero where the platform cannot supply a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    pub size: u64,
    pub accessed_ns: u64,
    pub created_ns: u64,
    pub modified_ns: u64,
}

impl FileStat {
    pub fn from_metadata(metadata: &fs::Metadata) -> FileStat {
        let kind = kind_of(&metadata.file_type());
        if kind == EntryKind::Directory {
            return FileStat::directory();
        }
        FileStat {
            kind,
            size: metadata.len(),
            accessed_ns: time_ns(metadata.accessed()),
            created_ns: time_ns(metadata.created()),
            modified_ns: time_ns(metadata.modified()),
        }
    }

    /// Directory stats carry the kind and nothing else.
    pub fn directory() -> FileStat {
        FileStat {
            kind: EntryKind::Directory,
            size: 0,
            accessed_ns: 0,
            created_ns: 0,
            modified_ns: 0,
        }
    }
}

fn kind_of(file_type: &fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

fn time_ns(time: io::Result<SystemTime>) -> u64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}

/// Current wall clock as nanoseconds since the Unix epoch.
pub fn now_ns() -> u64 {
    time_ns(Ok(SystemTime::now()))
}

/// One traversal result. The path is absolute (root realpath + relative part).
#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub stat: FileStat,
}

/// A per-entry failure the caller reports and steps over.
#[derive(Debug)]
pub struct WalkError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.source.kind() {
            io::ErrorKind::PermissionDenied => {
                write!(f, "access denied: {}", self.path.display())
            }
            io::ErrorKind::ResourceBusy => write!(f, "file busy: {}", self.path.display()),
            _ => write!(f, "{}: {}", self.path.display(), self.source),
        }
    }
}

/// Depth-first recursive traversal yielding files, directories (pre-order),
/// symlinks, and other entry kinds. Symlinks are never followed. Entries
/// matching an ignore glob are skipped entirely: never statted, never yielded.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    stack: Vec<(PathBuf, fs::ReadDir)>,
    ignore: Vec<Pattern>,
}

impl Walker {
    /// Canonicalize and open the root. Failure here is fatal for the run:
    /// permission problems map to exit 3, anything else to exit 1.
    pub fn new(root: &Path, ignore_globs: &[String]) -> Result<Walker, Error> {
        let canonical = fs::canonicalize(root).map_err(|source| root_error(root, source))?;
        let top = fs::read_dir(&canonical).map_err(|source| root_error(root, source))?;

        let ignore = ignore_globs
            .iter()
            .filter_map(|g| match Pattern::new(g) {
                Ok(p) => Some(p),
                Err(err) => {
                    error!("invalid ignore pattern '{g}': {err}");
                    None
                }
            })
            .collect();

        let stack = vec![(canonical.clone(), top)];
        Ok(Walker {
            root: canonical,
            stack,
            ignore,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ignored(&self, path: &Path) -> bool {
        self.ignore.iter().any(|p| p.matches_path(path))
    }
}

impl Iterator for Walker {
    type Item = Result<Entry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (dir, frame) = self.stack.last_mut()?;
            let dirent = match frame.next() {
                Some(Ok(dirent)) => dirent,
                Some(Err(source)) => {
                    let path = dir.clone();
                    return Some(Err(WalkError { path, source }));
                }
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let path = dirent.path();
            if self.ignored(&path) {
                continue;
            }

            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(source) => return Some(Err(WalkError { path, source })),
            };
            let stat = FileStat::from_metadata(&metadata);

            if stat.kind == EntryKind::Directory {
                match fs::read_dir(&path) {
                    Ok(next) => {
                        self.stack.push((path.clone(), next));
                        return Some(Ok(Entry {
                            kind: EntryKind::Directory,
                            path,
                            stat,
                        }));
                    }
                    // Yield the directory error, keep walking siblings.
                    Err(source) => return Some(Err(WalkError { path, source })),
                }
            }

            return Some(Ok(Entry {
                kind: stat.kind,
                path,
                stat,
            }));
        }
    }
}

fn root_error(root: &Path, source: io::Error) -> Error {
    if source.kind() == io::ErrorKind::PermissionDenied {
        Error::RootAccessDenied {
            path: root.to_path_buf(),
            source,
        }
    } else {
        Error::InputUnreadable {
            path: root.to_path_buf(),
            source,
        }
    }
}
