//! JSON well-formedness. Parses without building a tree; files above the
//! memory cap are reported and skipped instead of read.

use crate::checks::CheckContext;
use crate::walker::FileStat;
use serde::de::IgnoredAny;
use std::fs;
use std::path::Path;

/// Upper bound on how much JSON the check will pull into memory.
pub const MAX_JSON_BYTES: u64 = 64 * 1024 * 1024;

pub fn parse(ctx: &CheckContext, path: &Path, stat: &FileStat) -> u64 {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return 0;
    }

    if stat.size > MAX_JSON_BYTES {
        ctx.finding(path, "too large to validate");
        return 1;
    }

    let body = match fs::read(path) {
        Ok(body) => body,
        Err(err) => {
            ctx.reporter
                .error(&format!("cannot read {}: {err}", path.display()));
            return 1;
        }
    };

    match serde_json::from_slice::<IgnoredAny>(&body) {
        Ok(_) => 0,
        Err(err) => {
            ctx.finding(path, &format!("invalid JSON: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::reporter::{CheckKind, SilentReporter};
    use crate::walker::EntryKind;
    use tempfile::tempdir;

    fn ctx<'a>(config: &'a ScanConfig) -> CheckContext<'a> {
        CheckContext {
            config,
            reporter: &SilentReporter,
            kind: CheckKind::JsonParse,
        }
    }

    fn stat(size: u64) -> FileStat {
        FileStat {
            kind: EntryKind::File,
            size,
            accessed_ns: 0,
            created_ns: 0,
            modified_ns: 0,
        }
    }

    #[test]
    fn valid_and_invalid_documents() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let c = ctx(&config);

        let good = tmp.path().join("good.json");
        fs::write(&good, r#"{"a": [1, 2, {"b": null}]}"#).unwrap();
        assert_eq!(parse(&c, &good, &stat(26)), 0);

        let bad = tmp.path().join("bad.json");
        fs::write(&bad, r#"{"a": [1, 2"#).unwrap();
        assert_eq!(parse(&c, &bad, &stat(11)), 1);

        let not_json = tmp.path().join("data.yaml");
        fs::write(&not_json, "also: not checked").unwrap();
        assert_eq!(parse(&c, &not_json, &stat(17)), 0);
    }

    #[test]
    fn oversized_json_is_skipped_not_read() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let c = ctx(&config);
        let path = tmp.path().join("huge.json");
        fs::write(&path, "{}").unwrap();
        // stat claims the file exceeds the cap; the body is never read
        assert_eq!(parse(&c, &path, &stat(MAX_JSON_BYTES + 1)), 1);
    }
}
