//! Directory shape checks: item counts only, all driven by one `read_dir`
//! per directory entry.

use crate::checks::CheckContext;
use crate::walker::FileStat;
use std::fs;
use std::path::Path;

fn item_count(ctx: &CheckContext, path: &Path) -> Option<usize> {
    match fs::read_dir(path) {
        Ok(entries) => Some(entries.count()),
        Err(err) => {
            ctx.reporter
                .error(&format!("cannot read {}: {err}", path.display()));
            None
        }
    }
}

pub fn empty(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    match item_count(ctx, path) {
        Some(0) => {
            ctx.finding(path, "empty directory");
            1
        }
        Some(_) => 0,
        None => 1,
    }
}

pub fn many_items(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    match item_count(ctx, path) {
        Some(count) if count > ctx.config.max_items_directory => {
            ctx.finding(path, &format!("{count} items"));
            1
        }
        Some(_) => 0,
        None => 1,
    }
}

pub fn one_item(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    match item_count(ctx, path) {
        Some(1) => {
            ctx.finding(path, "single item");
            1
        }
        Some(_) => 0,
        None => 1,
    }
}
