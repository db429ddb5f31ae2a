//! Transport abstraction over station memory.
//!
//! This module provides the [`StationMemory`] trait that abstracts over the
//! USB device, dump files, and the mock station used in tests.

use wsp_types::layout::BLOCK_SIZE;

use crate::error::{Error, Result};

/// Block-level access to a station's 64 KiB memory.
///
/// Reads are always 32 bytes. Addresses above `HISTORY_END - 32` return
/// the bytes that exist followed by zeros. Writes are optional; read-only
/// transports keep the default implementations, which fail with
/// [`Error::Unsupported`].
///
/// # Example
///
/// ```
/// use wsp_core::{MockStation, StationMemory, Result};
///
/// fn magic<M: StationMemory>(memory: &mut M) -> Result<[u8; 2]> {
///     let block = memory.read_block(0)?;
///     Ok([block[0], block[1]])
/// }
///
/// let mut station = MockStation::new();
/// assert_eq!(magic(&mut station).unwrap(), [0x55, 0xAA]);
/// ```
pub trait StationMemory {
    /// Read the 32 bytes starting at `address`.
    fn read_block(&mut self, address: u16) -> Result<[u8; BLOCK_SIZE]>;

    /// Write a single byte.
    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let _ = (address, value);
        Err(Error::unsupported("write_byte on a read-only transport"))
    }

    /// Write the 32 bytes starting at `address`.
    fn write_block(&mut self, address: u16, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        let _ = (address, data);
        Err(Error::unsupported("write_block on a read-only transport"))
    }
}

impl<T: StationMemory + ?Sized> StationMemory for &mut T {
    fn read_block(&mut self, address: u16) -> Result<[u8; BLOCK_SIZE]> {
        (**self).read_block(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        (**self).write_byte(address, value)
    }

    fn write_block(&mut self, address: u16, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        (**self).write_block(address, data)
    }
}

impl<T: StationMemory + ?Sized> StationMemory for Box<T> {
    fn read_block(&mut self, address: u16) -> Result<[u8; BLOCK_SIZE]> {
        (**self).read_block(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        (**self).write_byte(address, value)
    }

    fn write_block(&mut self, address: u16, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        (**self).write_block(address, data)
    }
}
