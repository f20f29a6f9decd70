use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use attest_types::Fingerprint;

/// Read size used when fingerprinting a stream.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 fingerprint of raw document bytes.
///
/// This is the same digest the submitting client computes, so a gateway
/// may recompute it to cross-check what it relays.
pub fn fingerprint(data: &[u8]) -> Fingerprint {
    Fingerprint::from_digest(Sha256::digest(data).into())
}

/// Fingerprint everything readable from `reader`, in fixed-size chunks.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint::from_digest(hasher.finalize().into()))
}

/// Fingerprint a file on disk.
pub fn fingerprint_file(path: &Path) -> io::Result<Fingerprint> {
    fingerprint_reader(File::open(path)?)
}
