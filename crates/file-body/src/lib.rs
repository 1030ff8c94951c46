//! Streaming file bodies for the transfer engines.
//!
//! A [`FileBody`] is a seekable byte container backed by a file, plugged
//! into an HTTP message as both body source (uploads, GET responses) and
//! body sink (downloads, PUT requests). The optional hash capability
//! ([`HashedBody`]) is what enables signed transfers; its presence is a
//! trait bound resolved at engine instantiation, not a runtime check.

mod hash;
mod stream_file;

pub use hash::{
    digest_stream, ContentHasher, HashedBody, HashedFile, Sha256Hasher, Sha512Hasher,
};
pub use stream_file::StreamFile;

use std::io;
use std::path::Path;

/// Chunk size for the streaming digest pass.
pub const HASH_CHUNK_SIZE: usize = 64;

/// A seekable byte container backed by a file.
///
/// Fallible operations return `io::Result`; state predicates are plain
/// booleans. Engines treat an `Err` from `create`/`open` as "no body
/// available" and classify it through their normal status paths.
pub trait FileBody {
    /// Binds this body to `path`, closing any currently open handle.
    fn assign(&mut self, path: &Path);

    /// Creates (or truncates) the bound file, read-write.
    fn create(&mut self) -> io::Result<()>;

    /// True when the bound path exists on disk.
    fn exists(&self) -> bool;

    /// Opens the bound file; `read_only` selects the access mode.
    fn open(&mut self, read_only: bool) -> io::Result<()>;

    /// Drops the open handle; the file itself is retained.
    fn close(&mut self);

    /// Closes and unlinks the bound file.
    fn destroy(&mut self) -> io::Result<()>;

    fn is_open(&self) -> bool;

    fn is_read_only(&self) -> bool;

    /// Current file size in bytes, freshly queried; 0 when unknowable.
    fn size(&self) -> u64;

    /// Current cursor position; 0 when closed.
    fn position(&self) -> u64;

    /// Moves the cursor to `offset` from the start, or back from the end
    /// when `from_end` is set. Returns the new absolute position.
    fn set_position(&mut self, from_end: bool, offset: u64) -> io::Result<u64>;

    /// Reads up to `buf.len()` bytes at the cursor, advancing it.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes `buf` at the cursor, advancing it.
    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<usize>;
}
