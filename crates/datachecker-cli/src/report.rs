use colored::*;
use datachecker_core::{CheckKind, Reporter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Terminal reporter. Holds a mutex across each emission so lines from
/// parallel workers never interleave; color choices live here and nowhere
/// in the core.
pub struct TermReporter {
    lock: Mutex<()>,
}

impl TermReporter {
    pub fn new() -> TermReporter {
        TermReporter { lock: Mutex::new(()) }
    }
}

impl Reporter for TermReporter {
    fn section(&self, check: CheckKind) {
        let _guard = self.lock.lock().unwrap();
        println!();
        println!("{}", format!("-- {} --", check.name()).bold());
    }

    fn ok(&self, _check: CheckKind, path: &Path, message: &str) {
        let _guard = self.lock.lock().unwrap();
        println!("  {} {}: {}", "ok".green(), path.display(), message);
    }

    fn finding(&self, _check: CheckKind, path: &Path, message: &str) {
        let _guard = self.lock.lock().unwrap();
        println!("  {} {}: {}", "!".yellow().bold(), path.display(), message);
    }

    fn warning(&self, message: &str) {
        let _guard = self.lock.lock().unwrap();
        println!("  {} {}", "warning:".yellow(), message);
    }

    fn error(&self, message: &str) {
        let _guard = self.lock.lock().unwrap();
        println!("  {} {}", "error:".red().bold(), message);
    }

    fn duplicate_cluster(&self, size: u64, members: &[PathBuf]) {
        let _guard = self.lock.lock().unwrap();
        println!(
            "  {} ({} files of {} bytes)",
            "duplicates".yellow().bold(),
            members.len(),
            size,
        );
        for member in members {
            println!("    {}", member.display());
        }
    }

    fn wasted(&self, bytes: u64) {
        let _guard = self.lock.lock().unwrap();
        println!("  {} {} bytes wasted", "total:".bold(), bytes.to_string().red());
    }

    fn totals(&self, check: CheckKind, count: u64) {
        let _guard = self.lock.lock().unwrap();
        let (singular, plural) = check.total_labels();
        if count == 0 {
            println!("  {} no {} found", "OK".green().bold(), plural);
        } else if count == 1 {
            println!("  {} 1 {}", "total:".bold(), singular);
        } else {
            println!("  {} {} {}", "total:".bold(), count, plural);
        }
    }
}
