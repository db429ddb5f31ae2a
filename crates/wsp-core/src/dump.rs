//! Memory images on disk.
//!
//! A dump is a flat copy of the station's memory: byte offset equals device
//! address, [`MEMORY_SIZE`] bytes in total. [`DumpFile`] serves it back as a
//! read-only [`StationMemory`], so every command works offline.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use wsp_types::layout::{BLOCK_SIZE, MEMORY_SIZE};

use crate::error::{Error, Result};
use crate::traits::StationMemory;

/// A memory image read through `Read + Seek`.
#[derive(Debug)]
pub struct DumpFile<R = BufReader<File>> {
    reader: R,
    path: Option<PathBuf>,
}

impl DumpFile {
    /// Open a dump file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < MEMORY_SIZE as u64 {
            debug!(
                "Dump {} is {} bytes, expected {}; trailing reads will be short",
                path.display(),
                len,
                MEMORY_SIZE
            );
        }
        Ok(Self {
            reader: BufReader::new(file),
            path: Some(path.to_path_buf()),
        })
    }
}

impl<R: Read + Seek> DumpFile<R> {
    /// Wrap any seekable reader, e.g. a `Cursor` over an in-memory image.
    pub fn from_reader(reader: R) -> Self {
        Self { reader, path: None }
    }

    /// Path the dump was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Consume and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> StationMemory for DumpFile<R> {
    fn read_block(&mut self, address: u16) -> Result<[u8; BLOCK_SIZE]> {
        let wanted = BLOCK_SIZE.min(MEMORY_SIZE - usize::from(address));
        self.reader.seek(SeekFrom::Start(u64::from(address)))?;

        let mut block = [0u8; BLOCK_SIZE];
        let mut filled = 0;
        while filled < wanted {
            match self.reader.read(&mut block[filled..wanted]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        if filled < wanted {
            return Err(Error::ShortRead {
                address,
                expected: wanted,
                actual: filled,
            });
        }

        trace!("dump 0x{:04X}: {:02X?}", address, &block[..wanted]);
        Ok(block)
    }
}
