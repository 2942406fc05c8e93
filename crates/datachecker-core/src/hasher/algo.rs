//! Registry of digest algorithms recognized as sidecar extensions.
//!
//! Everything except BLAKE3 rides the RustCrypto `digest` traits behind one
//! `DynDigest` box; BLAKE3 keeps its own hasher type. Truncated variants
//! (`sha-256t192`) compute the base digest and cut it to length.

use ascon_hash::AsconHash;
use blake2::{Blake2b, Blake2s};
use digest::consts::{U16, U20, U28, U32, U48, U64};
use digest::{Digest, DynDigest};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlgoKind {
    Ascon256,
    Blake2b128,
    Blake2b160,
    Blake2b256,
    Blake2b384,
    Blake2b512,
    Blake2s128,
    Blake2s160,
    Blake2s224,
    Blake2s256,
    Blake3,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha256T192,
    Sha384,
    Sha512,
    Sha512T224,
    Sha512T256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashAlgorithm {
    tag: &'static str,
    digest_len: usize,
    kind: AlgoKind,
}

/// Every recognized algorithm tag. Sidecar extensions are matched against
/// the tag with dashes removed, so both `file.sha-256` and `file.sha256`
/// name the same algorithm.
pub const ALGORITHMS: &[HashAlgorithm] = &[
    HashAlgorithm { tag: "ascon256", digest_len: 32, kind: AlgoKind::Ascon256 },
    HashAlgorithm { tag: "blake2b-128", digest_len: 16, kind: AlgoKind::Blake2b128 },
    HashAlgorithm { tag: "blake2b-160", digest_len: 20, kind: AlgoKind::Blake2b160 },
    HashAlgorithm { tag: "blake2b-256", digest_len: 32, kind: AlgoKind::Blake2b256 },
    HashAlgorithm { tag: "blake2b-384", digest_len: 48, kind: AlgoKind::Blake2b384 },
    HashAlgorithm { tag: "blake2b-512", digest_len: 64, kind: AlgoKind::Blake2b512 },
    HashAlgorithm { tag: "blake2s-128", digest_len: 16, kind: AlgoKind::Blake2s128 },
    HashAlgorithm { tag: "blake2s-160", digest_len: 20, kind: AlgoKind::Blake2s160 },
    HashAlgorithm { tag: "blake2s-224", digest_len: 28, kind: AlgoKind::Blake2s224 },
    HashAlgorithm { tag: "blake2s-256", digest_len: 32, kind: AlgoKind::Blake2s256 },
    HashAlgorithm { tag: "blake3", digest_len: 32, kind: AlgoKind::Blake3 },
    HashAlgorithm { tag: "md5", digest_len: 16, kind: AlgoKind::Md5 },
    HashAlgorithm { tag: "sha1", digest_len: 20, kind: AlgoKind::Sha1 },
    HashAlgorithm { tag: "sha-224", digest_len: 28, kind: AlgoKind::Sha224 },
    HashAlgorithm { tag: "sha-256", digest_len: 32, kind: AlgoKind::Sha256 },
    HashAlgorithm { tag: "sha-256t192", digest_len: 24, kind: AlgoKind::Sha256T192 },
    HashAlgorithm { tag: "sha-384", digest_len: 48, kind: AlgoKind::Sha384 },
    HashAlgorithm { tag: "sha-512", digest_len: 64, kind: AlgoKind::Sha512 },
    HashAlgorithm { tag: "sha-512_224", digest_len: 28, kind: AlgoKind::Sha512T224 },
    HashAlgorithm { tag: "sha-512_256", digest_len: 32, kind: AlgoKind::Sha512T256 },
    HashAlgorithm { tag: "sha-512t224", digest_len: 28, kind: AlgoKind::Sha512T224 },
    HashAlgorithm { tag: "sha-512t256", digest_len: 32, kind: AlgoKind::Sha512T256 },
    HashAlgorithm { tag: "sha3-224", digest_len: 28, kind: AlgoKind::Sha3_224 },
    HashAlgorithm { tag: "sha3-256", digest_len: 32, kind: AlgoKind::Sha3_256 },
    HashAlgorithm { tag: "sha3-384", digest_len: 48, kind: AlgoKind::Sha3_384 },
    HashAlgorithm { tag: "sha3-512", digest_len: 64, kind: AlgoKind::Sha3_512 },
];

fn normalize(tag: &str) -> String {
    tag.to_ascii_lowercase().replace('-', "")
}

impl HashAlgorithm {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn digest_len(&self) -> usize {
        self.digest_len
    }

    /// Length of the hex rendering stored in a populated sidecar.
    pub fn hex_len(&self) -> usize {
        self.digest_len * 2
    }

    /// Look up by sidecar extension, case-insensitive, dash-insensitive.
    pub fn from_extension(ext: &str) -> Option<&'static HashAlgorithm> {
        let wanted = normalize(ext);
        ALGORITHMS.iter().find(|a| normalize(a.tag) == wanted)
    }

    pub fn hasher(&self) -> StreamingHasher {
        let state = match self.kind {
            AlgoKind::Ascon256 => boxed::<AsconHash>(),
            AlgoKind::Blake2b128 => boxed::<Blake2b<U16>>(),
            AlgoKind::Blake2b160 => boxed::<Blake2b<U20>>(),
            AlgoKind::Blake2b256 => boxed::<Blake2b<U32>>(),
            AlgoKind::Blake2b384 => boxed::<Blake2b<U48>>(),
            AlgoKind::Blake2b512 => boxed::<Blake2b<U64>>(),
            AlgoKind::Blake2s128 => boxed::<Blake2s<U16>>(),
            AlgoKind::Blake2s160 => boxed::<Blake2s<U20>>(),
            AlgoKind::Blake2s224 => boxed::<Blake2s<U28>>(),
            AlgoKind::Blake2s256 => boxed::<Blake2s<U32>>(),
            AlgoKind::Blake3 => State::Blake3(Box::new(blake3::Hasher::new())),
            AlgoKind::Md5 => boxed::<Md5>(),
            AlgoKind::Sha1 => boxed::<Sha1>(),
            AlgoKind::Sha224 => boxed::<Sha224>(),
            AlgoKind::Sha256 | AlgoKind::Sha256T192 => boxed::<Sha256>(),
            AlgoKind::Sha384 => boxed::<Sha384>(),
            AlgoKind::Sha512 => boxed::<Sha512>(),
            AlgoKind::Sha512T224 => boxed::<Sha512_224>(),
            AlgoKind::Sha512T256 => boxed::<Sha512_256>(),
            AlgoKind::Sha3_224 => boxed::<Sha3_224>(),
            AlgoKind::Sha3_256 => boxed::<Sha3_256>(),
            AlgoKind::Sha3_384 => boxed::<Sha3_384>(),
            AlgoKind::Sha3_512 => boxed::<Sha3_512>(),
        };
        StreamingHasher {
            state,
            digest_len: self.digest_len,
        }
    }
}

fn boxed<D>() -> State
where
    D: Digest + DynDigest + 'static,
{
    State::Rust(Box::new(D::new()))
}

enum State {
    Rust(Box<dyn DynDigest>),
    Blake3(Box<blake3::Hasher>),
}

/// Uniform chunked hashing front over the whole family.
pub struct StreamingHasher {
    state: State,
    digest_len: usize,
}

impl StreamingHasher {
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Rust(d) => d.update(data),
            State::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Write the final digest into `out` (replacing its contents). Output
    /// length is exactly the algorithm's digest length; truncated variants
    /// cut the base digest here.
    pub fn finalize_into(self, out: &mut Vec<u8>) {
        out.clear();
        match self.state {
            State::Rust(d) => {
                let full = d.finalize();
                out.extend_from_slice(&full[..self.digest_len]);
            }
            State::Blake3(h) => {
                out.extend_from_slice(h.finalize().as_bytes());
            }
        }
    }
}
