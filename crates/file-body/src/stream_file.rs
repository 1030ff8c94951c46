//! File-backed implementation of the body contract.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::FileBody;

/// A [`FileBody`] over a real file, using blocking `std::fs` I/O.
///
/// `Default` yields an unassigned, closed body; `assign` binds it to a path
/// and `create`/`open` produce the handle the chunk operations work on.
#[derive(Debug, Default)]
pub struct StreamFile {
    path: PathBuf,
    file: Option<File>,
    read_only: bool,
}

impl StreamFile {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "file body not open"))
    }
}

impl FileBody for StreamFile {
    fn assign(&mut self, path: &Path) {
        self.file = None;
        self.read_only = false;
        self.path = path.to_path_buf();
    }

    fn create(&mut self) -> io::Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file body has no assigned path",
            ));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        self.file = Some(file);
        self.read_only = false;
        Ok(())
    }

    fn exists(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.exists()
    }

    fn open(&mut self, read_only: bool) -> io::Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file body has no assigned path",
            ));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(!read_only)
            .open(&self.path)?;
        self.file = Some(file);
        self.read_only = read_only;
        Ok(())
    }

    fn close(&mut self) {
        self.file = None;
    }

    fn destroy(&mut self) -> io::Result<()> {
        self.file = None;
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn size(&self) -> u64 {
        match &self.file {
            Some(file) => file.metadata().map(|m| m.len()).unwrap_or(0),
            None => std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        }
    }

    fn position(&self) -> u64 {
        match &self.file {
            // Seek is implemented for &File, so the cursor is readable
            // without a mutable handle.
            Some(file) => (&*file).stream_position().unwrap_or(0),
            None => 0,
        }
    }

    fn set_position(&mut self, from_end: bool, offset: u64) -> io::Result<u64> {
        let target = if from_end {
            SeekFrom::End(-(offset as i64))
        } else {
            SeekFrom::Start(offset)
        };
        self.handle()?.seek(target)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle()?.read(buf)
    }

    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle()?.write(buf)
    }
}
