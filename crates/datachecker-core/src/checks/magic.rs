//! Magic-number validation. Extensions with a fixed signature are compared
//! byte-for-byte at offset zero; container formats get a window at a known
//! offset and a validator predicate. Extensionless files run the tables in
//! reverse to infer what they are.

use crate::checks::CheckContext;
use crate::walker::FileStat;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

pub struct SimpleSignature {
    pub ext: &'static str,
    pub signature: &'static [u8],
}

/// Fixed signatures at offset 0, keyed by lowercase extension.
pub const SIMPLE_SIGNATURES: &[SimpleSignature] = &[
    SimpleSignature { ext: "7z", signature: &[0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c] },
    SimpleSignature { ext: "bmp", signature: b"BM" },
    SimpleSignature { ext: "bz2", signature: b"BZh" },
    SimpleSignature { ext: "class", signature: &[0xca, 0xfe, 0xba, 0xbe] },
    SimpleSignature { ext: "dll", signature: b"MZ" },
    SimpleSignature { ext: "exe", signature: b"MZ" },
    SimpleSignature { ext: "flac", signature: b"fLaC" },
    SimpleSignature { ext: "gz", signature: &[0x1f, 0x8b] },
    SimpleSignature { ext: "ico", signature: &[0x00, 0x00, 0x01, 0x00] },
    SimpleSignature { ext: "jpeg", signature: &[0xff, 0xd8, 0xff] },
    SimpleSignature { ext: "jpg", signature: &[0xff, 0xd8, 0xff] },
    SimpleSignature { ext: "mid", signature: b"MThd" },
    SimpleSignature { ext: "ogg", signature: b"OggS" },
    SimpleSignature { ext: "otf", signature: b"OTTO" },
    SimpleSignature { ext: "pcap", signature: &[0xd4, 0xc3, 0xb2, 0xa1] },
    SimpleSignature { ext: "pdf", signature: b"%PDF" },
    SimpleSignature {
        ext: "png",
        signature: &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a],
    },
    SimpleSignature { ext: "psd", signature: b"8BPS" },
    SimpleSignature { ext: "rar", signature: &[0x52, 0x61, 0x72, 0x21, 0x1a, 0x07] },
    SimpleSignature { ext: "rtf", signature: b"{\\rtf" },
    SimpleSignature { ext: "so", signature: &[0x7f, 0x45, 0x4c, 0x46] },
    SimpleSignature { ext: "sqlite", signature: b"SQLite format 3\0" },
    SimpleSignature { ext: "sqlite3", signature: b"SQLite format 3\0" },
    SimpleSignature { ext: "ttf", signature: &[0x00, 0x01, 0x00, 0x00] },
    SimpleSignature { ext: "wasm", signature: &[0x00, 0x61, 0x73, 0x6d] },
    SimpleSignature { ext: "woff", signature: b"wOFF" },
    SimpleSignature { ext: "woff2", signature: b"wOF2" },
    SimpleSignature { ext: "xz", signature: &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00] },
    SimpleSignature { ext: "zst", signature: &[0x28, 0xb5, 0x2f, 0xfd] },
];

pub struct CompositeFormat {
    pub exts: &'static [&'static str],
    pub label: &'static str,
    pub offset: u64,
    pub window: usize,
    pub validate: fn(&[u8]) -> bool,
}

/// Formats that need more than a prefix compare: a window at an offset and a
/// predicate over it.
pub const COMPOSITE_FORMATS: &[CompositeFormat] = &[
    CompositeFormat {
        exts: &["avi"],
        label: "avi",
        offset: 0,
        window: 12,
        validate: |w| &w[..4] == b"RIFF" && &w[8..12] == b"AVI ",
    },
    CompositeFormat {
        exts: &["wav"],
        label: "wav",
        offset: 0,
        window: 12,
        validate: |w| &w[..4] == b"RIFF" && &w[8..12] == b"WAVE",
    },
    CompositeFormat {
        exts: &["webp"],
        label: "webp",
        offset: 0,
        window: 12,
        validate: |w| &w[..4] == b"RIFF" && &w[8..12] == b"WEBP",
    },
    CompositeFormat {
        exts: &["avif"],
        label: "avif",
        offset: 4,
        window: 8,
        validate: |w| &w[..8] == b"ftypavif",
    },
    CompositeFormat {
        exts: &["mp4"],
        label: "mp4",
        offset: 4,
        window: 8,
        validate: |w| &w[..4] == b"ftyp",
    },
    CompositeFormat {
        exts: &["mov"],
        label: "mov",
        offset: 4,
        window: 8,
        validate: |w| {
            (&w[..4] == b"ftyp" && &w[4..6] == b"qt")
                || &w[..4] == b"moov"
                || &w[..4] == b"mdat"
                || &w[..4] == b"wide"
        },
    },
    CompositeFormat {
        exts: &["zip", "docx", "xlsx", "pptx", "jar"],
        label: "zip",
        offset: 0,
        window: 4,
        validate: |w| {
            w.starts_with(b"PK\x03\x04")
                || w.starts_with(b"PK\x05\x06")
                || w.starts_with(b"PK\x07\x08")
        },
    },
    CompositeFormat {
        exts: &["eot"],
        label: "eot",
        offset: 34,
        window: 2,
        validate: |w| w == b"LP",
    },
    CompositeFormat {
        exts: &["gif"],
        label: "gif",
        offset: 0,
        window: 6,
        validate: |w| w == b"GIF87a" || w == b"GIF89a",
    },
    CompositeFormat {
        exts: &["htm", "html"],
        label: "html",
        offset: 0,
        window: 15,
        validate: |w| {
            w.starts_with(b"<html>") || w.starts_with(b"<HTML>") || w == b"<!DOCTYPE html>"
        },
    },
    CompositeFormat {
        exts: &["iso"],
        label: "iso",
        offset: 32769,
        window: 5,
        validate: |w| w == b"CD001",
    },
    CompositeFormat {
        exts: &["mp3"],
        label: "mp3",
        offset: 0,
        window: 3,
        validate: |w| {
            w == b"ID3"
                || w.starts_with(&[0xff, 0xfb])
                || w.starts_with(&[0xff, 0xfa])
                || w.starts_with(&[0xff, 0xf3])
                || w.starts_with(&[0xff, 0xf2])
        },
    },
    CompositeFormat {
        exts: &["tar"],
        label: "tar",
        offset: 257,
        window: 5,
        validate: |w| w == b"ustar",
    },
    CompositeFormat {
        exts: &["tif", "tiff"],
        label: "tiff",
        offset: 0,
        window: 4,
        validate: |w| w == b"II\x2a\x00" || w == b"MM\x00\x2a",
    },
];

fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Read `len` bytes at `offset`; `None` means the file ends first.
fn read_window(path: &Path, offset: u64, len: usize) -> io::Result<Option<Vec<u8>>> {
    let mut file = File::open(path)?;
    if offset > 0 {
        file.seek(SeekFrom::Start(offset))?;
    }
    let mut window = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = file.read(&mut window[filled..])?;
        if n == 0 {
            return Ok(None);
        }
        filled += n;
    }
    Ok(Some(window))
}

/// Per-entry check: validate recognized extensions against their signature.
pub fn validate(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    let Some(ext) = lower_extension(path) else {
        return 0;
    };

    if let Some(simple) = SIMPLE_SIGNATURES.iter().find(|s| s.ext == ext) {
        return match read_window(path, 0, simple.signature.len()) {
            Ok(Some(window)) if window == simple.signature => 0,
            Ok(Some(_)) => {
                ctx.finding(path, "magic mismatch");
                1
            }
            Ok(None) => {
                ctx.finding(path, "read error: shorter than its signature");
                1
            }
            Err(err) => {
                ctx.reporter
                    .error(&format!("cannot read {}: {err}", path.display()));
                1
            }
        };
    }

    if let Some(format) = COMPOSITE_FORMATS.iter().find(|f| f.exts.contains(&ext.as_str())) {
        return match read_window(path, format.offset, format.window) {
            Ok(Some(window)) if (format.validate)(&window) => 0,
            Ok(Some(_)) => {
                ctx.finding(path, "magic mismatch");
                1
            }
            Ok(None) => {
                ctx.finding(path, "read error: shorter than its signature window");
                1
            }
            Err(err) => {
                ctx.reporter
                    .error(&format!("cannot read {}: {err}", path.display()));
                1
            }
        };
    }

    0
}

/// Per-entry check: infer the format of extensionless files from the tables
/// in reverse — signatures at growing window sizes first, composites after.
pub fn no_extension(ctx: &CheckContext, path: &Path, _stat: &FileStat) -> u64 {
    if path.extension().is_some() {
        return 0;
    }
    match infer_format(path) {
        Ok(Some(label)) => {
            ctx.finding(path, &format!("no extension (detected {label})"));
            1
        }
        Ok(None) => {
            ctx.finding(path, "format unknown");
            1
        }
        Err(err) => {
            ctx.reporter
                .error(&format!("cannot read {}: {err}", path.display()));
            1
        }
    }
}

/// First matching format label, if any.
pub fn infer_format(path: &Path) -> io::Result<Option<&'static str>> {
    let mut file = File::open(path)?;
    let mut head = [0u8; 16];
    let mut filled = 0;
    while filled < head.len() {
        let n = file.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    drop(file);

    for window in 2..=16usize {
        if window > filled {
            break;
        }
        for simple in SIMPLE_SIGNATURES {
            if simple.signature.len() == window && head[..window] == *simple.signature {
                return Ok(Some(simple.ext));
            }
        }
    }

    for format in COMPOSITE_FORMATS {
        if let Some(window) = read_window(path, format.offset, format.window)? {
            if (format.validate)(&window) {
                return Ok(Some(format.label));
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::reporter::{CheckKind, SilentReporter};
    use std::fs;
    use tempfile::tempdir;

    fn ctx<'a>(config: &'a ScanConfig) -> CheckContext<'a> {
        CheckContext {
            config,
            reporter: &SilentReporter,
            kind: CheckKind::MagicNumbers,
        }
    }

    fn stat() -> FileStat {
        FileStat {
            kind: crate::walker::EntryKind::File,
            size: 1,
            accessed_ns: 0,
            created_ns: 0,
            modified_ns: 0,
        }
    }

    #[test]
    fn png_with_wrong_bytes_is_a_mismatch() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let bad = tmp.path().join("photo.png");
        fs::write(&bad, b"definitely not a png").unwrap();
        assert_eq!(validate(&ctx(&config), &bad, &stat()), 1);

        let good = tmp.path().join("real.png");
        let mut body = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        body.extend_from_slice(b"IHDR etc");
        fs::write(&good, &body).unwrap();
        assert_eq!(validate(&ctx(&config), &good, &stat()), 0);
    }

    #[test]
    fn zip_local_header_is_accepted() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let zip = tmp.path().join("archive.zip");
        fs::write(&zip, b"PK\x03\x04rest of archive").unwrap();
        assert_eq!(validate(&ctx(&config), &zip, &stat()), 0);

        let docx = tmp.path().join("report.docx");
        fs::write(&docx, b"PK\x03\x04zipped xml").unwrap();
        assert_eq!(validate(&ctx(&config), &docx, &stat()), 0);

        let fake = tmp.path().join("fake.zip");
        fs::write(&fake, b"not zipped").unwrap();
        assert_eq!(validate(&ctx(&config), &fake, &stat()), 1);
    }

    #[test]
    fn tar_signature_sits_at_offset_257() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let tar = tmp.path().join("backup.tar");
        let mut body = vec![0u8; 512];
        body[257..262].copy_from_slice(b"ustar");
        fs::write(&tar, &body).unwrap();
        assert_eq!(validate(&ctx(&config), &tar, &stat()), 0);

        // too short to contain the window
        let stub = tmp.path().join("stub.tar");
        fs::write(&stub, b"short").unwrap();
        assert_eq!(validate(&ctx(&config), &stub, &stat()), 1);
    }

    #[test]
    fn riff_family_distinguishes_members() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();

        let wav = tmp.path().join("sound.wav");
        fs::write(&wav, b"RIFF\x10\x00\x00\x00WAVEfmt ").unwrap();
        assert_eq!(validate(&ctx(&config), &wav, &stat()), 0);

        let mislabeled = tmp.path().join("sound.avi");
        fs::write(&mislabeled, b"RIFF\x10\x00\x00\x00WAVEfmt ").unwrap();
        assert_eq!(validate(&ctx(&config), &mislabeled, &stat()), 1);
    }

    #[test]
    fn unrecognized_extension_yields_nothing() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let txt = tmp.path().join("notes.txt");
        fs::write(&txt, b"free-form text").unwrap();
        assert_eq!(validate(&ctx(&config), &txt, &stat()), 0);
    }

    #[test]
    fn extensionless_files_get_inferred() {
        let tmp = tempdir().unwrap();

        let png = tmp.path().join("mystery");
        let mut body = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        body.extend_from_slice(b"rest");
        fs::write(&png, &body).unwrap();
        assert_eq!(infer_format(&png).unwrap(), Some("png"));

        let gif = tmp.path().join("animated");
        fs::write(&gif, b"GIF89a\x01\x02").unwrap();
        assert_eq!(infer_format(&gif).unwrap(), Some("gif"));

        let plain = tmp.path().join("README");
        fs::write(&plain, b"just words").unwrap();
        assert_eq!(infer_format(&plain).unwrap(), None);
    }

    #[test]
    fn no_extension_skips_files_with_extensions() {
        let tmp = tempdir().unwrap();
        let config = ScanConfig::default();
        let named = tmp.path().join("file.txt");
        fs::write(&named, b"x").unwrap();
        assert_eq!(no_extension(&ctx(&config), &named, &stat()), 0);

        let bare = tmp.path().join("LICENSE");
        fs::write(&bare, b"MIT").unwrap();
        assert_eq!(no_extension(&ctx(&config), &bare, &stat()), 1);
    }
}
