//! Chunked file hashing over the algorithm family in [`algo`].

pub mod algo;

pub use algo::{HashAlgorithm, StreamingHasher, ALGORITHMS};

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Stream `path` through `algo` in `buffer_size` chunks, writing the raw
/// digest into `out` (replacing its contents). The file is opened read-only;
/// open and read failures surface unchanged for the caller to classify.
pub fn digest_of(
    algo: &HashAlgorithm,
    path: &Path,
    buffer_size: usize,
    out: &mut Vec<u8>,
) -> io::Result<()> {
    let mut file = File::open(path)?;
    let mut hasher = algo.hasher();
    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    hasher.finalize_into(out);
    Ok(())
}

/// Digest rendered as lowercase hex, the sidecar on-disk form.
pub fn digest_hex(algo: &HashAlgorithm, path: &Path, buffer_size: usize) -> io::Result<String> {
    let mut out = Vec::with_capacity(algo.digest_len());
    digest_of(algo, path, buffer_size, &mut out)?;
    Ok(hex::encode(out))
}

/// 32-byte BLAKE3 digest, the key of the parallel duplicate pipeline's
/// hash stage.
pub fn blake3_of(path: &Path, buffer_size: usize) -> io::Result<[u8; 32]> {
    let algo = HashAlgorithm::from_extension("blake3").expect("blake3 is registered");
    let mut out = Vec::with_capacity(32);
    digest_of(algo, path, buffer_size, &mut out)?;
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&out);
    Ok(digest)
}
