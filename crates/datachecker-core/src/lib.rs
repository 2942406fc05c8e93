pub mod cache;
pub mod checks;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod matcher;
pub mod pool;
pub mod reporter;
pub mod tables;
pub mod walker;

pub use config::ScanConfig;
pub use engine::{Engine, RunSummary};
pub use error::Error;
pub use reporter::{CheckKind, Reporter, SilentReporter};
pub use walker::{Entry, EntryKind, FileStat, Walker};
