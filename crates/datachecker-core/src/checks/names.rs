//! Name and path hygiene: oversized names, oversized full paths, characters
//! that break on other filesystems, and doubled characters or extensions.

use crate::checks::CheckContext;
use crate::walker::FileStat;
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Characters rejected by at least one mainstream filesystem.
const UNPORTABLE: &[char] = &['<', '>', ':', '"', '\\', '|', '?', '*'];

/// Separators that read as typos when doubled.
const DOUBLED_SEPARATORS: &[char] = &[' ', '.', '-', '_', ','];

pub fn name_size(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    let name = file_name(path);
    let len = name.chars().count();
    if len > ctx.config.max_dir_file_name_size {
        ctx.finding(path, &format!("name is {len} characters"));
        1
    } else {
        0
    }
}

pub fn path_size(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    let len = path.to_string_lossy().chars().count();
    if len > ctx.config.max_full_path_size {
        ctx.finding(path, &format!("path is {len} characters"));
        1
    } else {
        0
    }
}

pub fn unportable_chars(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    let name = file_name(path);
    let bad_char = name
        .chars()
        .any(|c| UNPORTABLE.contains(&c) || c.is_control());
    let bad_edge = name.starts_with(' ') || name.ends_with(' ') || name.ends_with('.');
    if bad_char || bad_edge {
        ctx.finding(path, "unportable characters in name");
        1
    } else {
        0
    }
}

/// Doubled separator runs (`a..b`, `x  y`) and duplicated final extensions
/// (`x.tar.tar`) both indicate a renaming accident.
pub fn duplicate_chars(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    let name = file_name(path);

    let mut previous: Option<char> = None;
    let doubled = name.chars().any(|c| {
        let hit = previous == Some(c) && DOUBLED_SEPARATORS.contains(&c);
        previous = Some(c);
        hit
    });
    if doubled {
        ctx.finding(path, "doubled characters in name");
        return 1;
    }

    if let Some((stem, ext)) = name.rsplit_once('.') {
        if let Some((_, inner_ext)) = stem.rsplit_once('.') {
            if !inner_ext.is_empty() && inner_ext.eq_ignore_ascii_case(ext) {
                ctx.finding(path, "duplicated extension");
                return 1;
            }
        }
    }

    0
}
