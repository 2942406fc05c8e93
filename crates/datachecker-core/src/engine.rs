use crate::cache::PathStatCache;
use crate::checks::{self, CheckContext, CheckTotals, EntryFilter, Runner};
use crate::config::ScanConfig;
use crate::error::Error;
use crate::matcher::AcMatcher;
use crate::pool::{resolve_max_jobs, Semaphore};
use crate::reporter::{CheckKind, Reporter};
use crate::walker::{FileStat, Walker};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Owns the shared machinery of a run: configuration, the path/stat cache,
/// the worker-pool semaphore, and the compiled confidential matcher. Checks
/// receive it by reference; nothing here is process-global.
pub struct Engine<'r> {
    config: ScanConfig,
    cache: PathStatCache,
    semaphore: Semaphore,
    matcher: Option<AcMatcher>,
    reporter: &'r dyn Reporter,
}

#[derive(Debug)]
pub struct RunSummary {
    pub checks_run: usize,
    pub findings: u64,
    pub wasted_bytes: u64,
    pub duration: Duration,
}

impl<'r> Engine<'r> {
    /// Build an engine. Pattern decoding happens here so that a bad base64
    /// entry aborts before any file is touched.
    pub fn new(config: ScanConfig, reporter: &'r dyn Reporter) -> Result<Engine<'r>, Error> {
        let matcher = checks::confidential::build_matcher(&config)?;
        let semaphore = Semaphore::new(resolve_max_jobs(config.max_jobs));
        let cache = PathStatCache::new(config.enable_cache);
        Ok(Engine {
            config,
            cache,
            semaphore,
            matcher,
            reporter,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn cache(&self) -> &PathStatCache {
        &self.cache
    }

    pub fn semaphore(&self) -> &Semaphore {
        &self.semaphore
    }

    pub fn matcher(&self) -> Option<&AcMatcher> {
        self.matcher.as_ref()
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter
    }

    /// Run every enabled check over `root` in the fixed order.
    pub fn run(&self, root: &Path) -> Result<RunSummary, Error> {
        self.run_checks(root, None)
    }

    /// Run exactly one check, ignoring the enable flags.
    pub fn run_single(&self, root: &Path, kind: CheckKind) -> Result<RunSummary, Error> {
        self.run_checks(root, Some(kind))
    }

    fn run_checks(&self, root: &Path, only: Option<CheckKind>) -> Result<RunSummary, Error> {
        // Surface an unreadable root before any check emits a header.
        let probe = Walker::new(root, &self.config.ignore_patterns)?;
        let root = probe.root().to_path_buf();
        drop(probe);

        info!("scanning {}", root.display());
        let started = Instant::now();
        let mut summary = RunSummary {
            checks_run: 0,
            findings: 0,
            wasted_bytes: 0,
            duration: Duration::ZERO,
        };

        for def in checks::CHECKS {
            match only {
                Some(kind) if def.kind != kind => continue,
                None if !(def.enabled)(&self.config) => continue,
                _ => {}
            }

            self.reporter.section(def.kind);
            let check_start = Instant::now();
            let totals = match &def.runner {
                Runner::WholeTree(run) => run(self, &root)?,
                Runner::PerEntry { filter, run } => {
                    self.run_per_entry(&root, def.kind, *filter, *run)?
                }
            };
            debug!(
                "{} finished in {:.3}s with {} matches",
                def.kind.name(),
                check_start.elapsed().as_secs_f64(),
                totals.matches,
            );
            self.reporter.totals(def.kind, totals.matches);

            summary.checks_run += 1;
            summary.findings += totals.matches;
            summary.wasted_bytes += totals.wasted_bytes;
        }

        summary.duration = started.elapsed();
        info!(
            "scan finished in {:.2}s — {} checks, {} findings",
            summary.duration.as_secs_f64(),
            summary.checks_run,
            summary.findings,
        );
        Ok(summary)
    }

    fn run_per_entry(
        &self,
        root: &Path,
        kind: CheckKind,
        filter: EntryFilter,
        run: fn(&CheckContext, &Path, &FileStat) -> u64,
    ) -> Result<CheckTotals, Error> {
        let ctx = CheckContext {
            config: &self.config,
            reporter: self.reporter,
            kind,
        };
        let mut totals = CheckTotals::default();
        let errors = self.for_each_entry(root, filter, |path, stat| {
            totals.matches += run(&ctx, path, stat);
        })?;
        totals.matches += errors;
        Ok(totals)
    }

    /// Shared iteration for every check. When the cache has been populated by
    /// an earlier check, entries come from it and the filesystem stays cold;
    /// otherwise this drives a fresh walk, records each entry in the cache,
    /// and reports per-entry walk errors without aborting. Returns the number
    /// of errors reported, which the caller folds into the check totals.
    pub fn for_each_entry(
        &self,
        root: &Path,
        filter: EntryFilter,
        mut f: impl FnMut(&Path, &FileStat),
    ) -> Result<u64, Error> {
        if self.cache.enabled() && !self.cache.is_empty() {
            for (path, stat) in self.cache.iter_all() {
                if filter.matches(stat.kind) {
                    f(&path, &stat);
                }
            }
            return Ok(0);
        }

        let mut errors = 0u64;
        for item in Walker::new(root, &self.config.ignore_patterns)? {
            match item {
                Ok(entry) => {
                    self.cache.record_walked(&entry.path, entry.stat);
                    if filter.matches(entry.kind) {
                        f(&entry.path, &entry.stat);
                    }
                }
                Err(err) => {
                    self.reporter.error(&err.to_string());
                    errors += 1;
                }
            }
        }
        Ok(errors)
    }
}
