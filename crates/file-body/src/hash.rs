//! Content hashing capability for file bodies.

use std::fmt;
use std::io;
use std::path::Path;

use fileferry_http::{HashKind, Signature};
use sha2::{Digest, Sha256, Sha512};

use crate::{FileBody, StreamFile, HASH_CHUNK_SIZE};

/// A resettable, feed-input/finalize digest.
pub trait ContentHasher {
    fn reset(&mut self);
    fn input(&mut self, data: &[u8]);
    /// The digest over everything fed since the last reset. Idempotent.
    fn result(&self) -> Vec<u8>;
    fn kind(&self) -> HashKind;
}

/// SHA-256 [`ContentHasher`].
#[derive(Default)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl ContentHasher for Sha256Hasher {
    fn reset(&mut self) {
        self.inner = Sha256::new();
    }

    fn input(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn result(&self) -> Vec<u8> {
        self.inner.clone().finalize().to_vec()
    }

    fn kind(&self) -> HashKind {
        HashKind::Sha256
    }
}

impl fmt::Debug for Sha256Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sha256Hasher")
    }
}

/// SHA-512 [`ContentHasher`].
#[derive(Default)]
pub struct Sha512Hasher {
    inner: Sha512,
}

impl ContentHasher for Sha512Hasher {
    fn reset(&mut self) {
        self.inner = Sha512::new();
    }

    fn input(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn result(&self) -> Vec<u8> {
        self.inner.clone().finalize().to_vec()
    }

    fn kind(&self) -> HashKind {
        HashKind::Sha512
    }
}

impl fmt::Debug for Sha512Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sha512Hasher")
    }
}

/// File bodies that carry a content hasher.
///
/// Presence of this capability is what switches an engine onto its signed
/// code path; engines bind it statically through their integrity policy.
pub trait HashedBody: FileBody {
    type Hasher: ContentHasher;

    fn hasher(&mut self) -> &mut Self::Hasher;
}

/// A [`StreamFile`] paired with a content hasher.
#[derive(Debug, Default)]
pub struct HashedFile<H = Sha256Hasher> {
    file: StreamFile,
    hasher: H,
}

impl<H: ContentHasher + Default> HashedFile<H> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: ContentHasher> FileBody for HashedFile<H> {
    fn assign(&mut self, path: &Path) {
        self.file.assign(path);
    }

    fn create(&mut self) -> io::Result<()> {
        self.file.create()
    }

    fn exists(&self) -> bool {
        self.file.exists()
    }

    fn open(&mut self, read_only: bool) -> io::Result<()> {
        self.file.open(read_only)
    }

    fn close(&mut self) {
        self.file.close();
    }

    fn destroy(&mut self) -> io::Result<()> {
        self.file.destroy()
    }

    fn is_open(&self) -> bool {
        self.file.is_open()
    }

    fn is_read_only(&self) -> bool {
        self.file.is_read_only()
    }

    fn size(&self) -> u64 {
        self.file.size()
    }

    fn position(&self) -> u64 {
        self.file.position()
    }

    fn set_position(&mut self, from_end: bool, offset: u64) -> io::Result<u64> {
        self.file.set_position(from_end, offset)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read_chunk(buf)
    }

    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_chunk(buf)
    }
}

impl<H: ContentHasher> HashedBody for HashedFile<H> {
    type Hasher = H;

    fn hasher(&mut self) -> &mut H {
        &mut self.hasher
    }
}

/// Streams `body` from its current cursor to EOF through its hasher in
/// [`HASH_CHUNK_SIZE`] chunks and returns the resulting signature.
///
/// The cursor is restored afterwards and the content is never held in
/// memory. This single routine backs both the client's request signing and
/// the server's response signing.
pub fn digest_stream<B: HashedBody + ?Sized>(body: &mut B) -> io::Result<Signature> {
    let mut buffer = [0u8; HASH_CHUNK_SIZE];
    let origin = body.position();

    body.hasher().reset();

    let mut remaining = body.size().saturating_sub(origin);
    while remaining > 0 {
        let chunk = remaining.min(buffer.len() as u64) as usize;
        let read = body.read_chunk(&mut buffer[..chunk])?;
        if read == 0 {
            break;
        }
        body.hasher().input(&buffer[..read]);
        remaining -= read as u64;
    }

    body.set_position(false, origin)?;

    let kind = body.hasher().kind();
    Ok(Signature::new(kind, body.hasher().result()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn hashed_fixture(dir: &TempDir, name: &str, data: &[u8]) -> HashedFile {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        let mut body = HashedFile::new();
        body.assign(&path);
        body.open(true).unwrap();
        body
    }

    #[test]
    fn digest_matches_known_vector() {
        let dir = TempDir::new().unwrap();
        let mut body = hashed_fixture(&dir, "vector.bin", b"hello world");

        let signature = digest_stream(&mut body).unwrap();
        assert_eq!(signature.kind(), HashKind::Sha256);
        assert_eq!(
            hex::encode(signature.digest()),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn digest_restores_the_cursor() {
        let dir = TempDir::new().unwrap();
        // Larger than one chunk so the loop actually iterates.
        let data = vec![0x5au8; HASH_CHUNK_SIZE * 3 + 17];
        let mut body = hashed_fixture(&dir, "big.bin", &data);

        body.set_position(false, 10).unwrap();
        digest_stream(&mut body).unwrap();
        assert_eq!(body.position(), 10);
    }

    #[test]
    fn digest_covers_cursor_to_eof_only() {
        let dir = TempDir::new().unwrap();
        let mut body = hashed_fixture(&dir, "tail.bin", b"abcdef");

        body.set_position(false, 3).unwrap();
        let tail = digest_stream(&mut body).unwrap();

        let expected = Sha256::digest(b"def");
        assert_eq!(tail.digest(), expected.as_slice());
    }

    #[test]
    fn digest_of_empty_stream() {
        let dir = TempDir::new().unwrap();
        let mut body = hashed_fixture(&dir, "empty.bin", b"");

        let signature = digest_stream(&mut body).unwrap();
        let expected = Sha256::digest(b"");
        assert_eq!(signature.digest(), expected.as_slice());
    }

    #[test]
    fn sha512_variant_tags_its_kind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.bin");
        std::fs::write(&path, b"payload").unwrap();

        let mut body: HashedFile<Sha512Hasher> = HashedFile::new();
        body.assign(&path);
        body.open(true).unwrap();

        let signature = digest_stream(&mut body).unwrap();
        assert_eq!(signature.kind(), HashKind::Sha512);
        assert_eq!(signature.digest().len(), 64);
    }

    #[test]
    fn hasher_result_is_idempotent() {
        let mut hasher = Sha256Hasher::default();
        hasher.input(b"abc");
        let first = hasher.result();
        let second = hasher.result();
        assert_eq!(first, second);

        hasher.reset();
        hasher.input(b"abc");
        assert_eq!(hasher.result(), first);
    }
}
