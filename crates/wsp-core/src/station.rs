//! Station access on top of a [`StationMemory`] transport.
//!
//! [`Station`] adds the protocol rules the raw transport knows nothing
//! about: bounded retries for every transfer, settings validation through
//! the magic number, and chunk decoding.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use wsp_types::layout::{
    is_chunk_address, BLOCK_SIZE, HISTORY_CHUNK_SIZE, MAGIC_NUMBER, MEMORY_SIZE,
    SETTINGS_BLOCK_SIZE,
};
use wsp_types::{StationSettings, WeatherRecord};

use crate::error::{Error, Result};
use crate::retry::{with_retry, RetryConfig};
use crate::traits::StationMemory;

/// Progress of a memory dump, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DumpProgress {
    pub bytes_written: usize,
    pub total_bytes: usize,
}

/// Callback invoked after every block of a dump.
pub type DumpCallback = Arc<dyn Fn(DumpProgress) + Send + Sync>;

/// A weather station reachable through some transport.
///
/// # Example
///
/// ```
/// use wsp_core::{MockStation, Station};
///
/// let mut station = Station::new(MockStation::new());
/// let settings = station.read_settings().unwrap();
/// assert!(settings.has_valid_magic());
/// ```
#[derive(Debug)]
pub struct Station<M> {
    memory: M,
    retry: RetryConfig,
}

impl<M: StationMemory> Station<M> {
    /// Wrap a transport with the default retry policy (3 attempts).
    pub fn new(memory: M) -> Self {
        Self::with_retry(memory, RetryConfig::default())
    }

    /// Wrap a transport with a custom retry policy.
    pub fn with_retry(memory: M, retry: RetryConfig) -> Self {
        Self { memory, retry }
    }

    /// The retry policy in use.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Borrow the transport.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutably borrow the transport.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consume the station and return the transport.
    pub fn into_inner(self) -> M {
        self.memory
    }

    /// Read 32 bytes at `address`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the transport's last error once attempts are exhausted.
    pub fn read_block(&mut self, address: u16) -> Result<[u8; BLOCK_SIZE]> {
        let memory = &mut self.memory;
        let block = with_retry(&self.retry, "read_block", || memory.read_block(address))?;
        trace!("0x{:04X}: {:02X?}", address, block);
        Ok(block)
    }

    /// Read and decode the settings block.
    ///
    /// The station rewrites its memory in place, so a read can catch it
    /// mid-update. The block is accepted only once offsets 0 and 1 hold the
    /// magic number; the whole read is repeated up to the configured number
    /// of attempts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSettings`] if the magic number never
    /// matches, or the transport error if a block cannot be read.
    pub fn read_settings(&mut self) -> Result<StationSettings> {
        let attempts = self.retry.max_attempts.max(1);
        let mut found = [0u8; 2];

        for attempt in 1..=attempts {
            debug!("Reading settings block (attempt {}/{})", attempt, attempts);

            let mut raw = [0u8; SETTINGS_BLOCK_SIZE];
            for (i, chunk) in raw.chunks_exact_mut(BLOCK_SIZE).enumerate() {
                let block = self.read_block((i * BLOCK_SIZE) as u16)?;
                chunk.copy_from_slice(&block);
            }

            found = [raw[0], raw[1]];
            if found == MAGIC_NUMBER {
                let settings = StationSettings::from_bytes(&raw)?;
                debug!(
                    "Settings: read period {} min, {} records, current position 0x{:04X}",
                    settings.read_period, settings.data_count, settings.current_pos
                );
                return Ok(settings);
            }

            warn!(
                "Bad magic number {:02X} {:02X} (attempt {}/{})",
                found[0], found[1], attempt, attempts
            );
        }

        Err(Error::MalformedSettings { found, attempts })
    }

    /// Read and decode the history chunk at `address`.
    ///
    /// Only the lower 16 bytes of the 32-byte transfer are used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if `address` is not a chunk
    /// boundary in the history ring, otherwise the transport error.
    pub fn read_record(&mut self, address: u16) -> Result<WeatherRecord> {
        if !is_chunk_address(address) {
            return Err(Error::InvalidAddress(u32::from(address)));
        }
        let block = self.read_block(address)?;
        Ok(WeatherRecord::from_bytes(&block[..HISTORY_CHUNK_SIZE])?)
    }

    /// Copy the full memory image to `writer`.
    ///
    /// Returns the number of bytes written, always [`MEMORY_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns the first read or write error.
    pub fn dump<W: Write>(&mut self, mut writer: W, progress: Option<DumpCallback>) -> Result<usize> {
        info!("Dumping {} bytes of station memory", MEMORY_SIZE);

        let mut written = 0;
        while written < MEMORY_SIZE {
            let block = self.read_block(written as u16)?;
            let len = BLOCK_SIZE.min(MEMORY_SIZE - written);
            writer.write_all(&block[..len])?;
            written += len;

            if let Some(cb) = &progress {
                cb(DumpProgress {
                    bytes_written: written,
                    total_bytes: MEMORY_SIZE,
                });
            }
        }
        writer.flush()?;

        debug!("Dump complete: {} bytes", written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRecord, MockStation, MockStationBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_read_settings() {
        let mut station = Station::new(MockStationBuilder::new().read_period(5).build());
        let settings = station.read_settings().unwrap();
        assert_eq!(settings.read_period, 5);
        assert_eq!(station.memory().read_count(), 8);
    }

    #[test]
    fn test_read_settings_retries_bad_magic() {
        let mock = MockStationBuilder::new().unsettled_reads(2).build();
        let mut station = Station::new(mock);
        let settings = station.read_settings().unwrap();
        assert!(settings.has_valid_magic());
        assert_eq!(station.memory().read_count(), 24);
    }

    #[test]
    fn test_read_settings_malformed() {
        let mock = MockStationBuilder::new().magic([0x55, 0x00]).build();
        let mut station = Station::new(mock);
        let err = station.read_settings().unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedSettings {
                found: [0x55, 0x00],
                attempts: 3
            }
        ));
    }

    #[test]
    fn test_read_settings_either_magic_byte_wrong() {
        let mock = MockStationBuilder::new().magic([0x00, 0xAA]).build();
        let mut station = Station::new(mock);
        assert!(station.read_settings().is_err());
    }

    #[test]
    fn test_read_block_retries_transient_failure() {
        let mut mock = MockStation::new();
        mock.set_transient_failures(0x0100, 2);
        let mut station = Station::new(mock);
        assert!(station.read_block(0x0100).is_ok());
        assert_eq!(station.memory().read_count(), 3);
    }

    #[test]
    fn test_read_block_gives_up() {
        let mut mock = MockStation::new();
        mock.fail_address(0x0100);
        let mut station = Station::new(mock);
        assert!(matches!(
            station.read_block(0x0100),
            Err(Error::ReadFailed { address: 0x0100, .. })
        ));
        assert_eq!(station.memory().read_count(), 3);
    }

    #[test]
    fn test_read_record() {
        let mock = MockStationBuilder::new()
            .record(MockRecord::default().outdoor_temp(-31))
            .build();
        let mut station = Station::new(mock);
        let record = station.read_record(0x0100).unwrap();
        assert_eq!(record.outdoor_temp, -31);
    }

    #[test]
    fn test_read_record_rejects_unaligned() {
        let mut station = Station::new(MockStation::new());
        assert!(matches!(
            station.read_record(0x0108),
            Err(Error::InvalidAddress(0x0108))
        ));
        assert!(matches!(
            station.read_record(0x0020),
            Err(Error::InvalidAddress(0x0020))
        ));
    }

    #[test]
    fn test_dump_writes_full_image() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), 10)
            .build();
        let expected = mock.memory().to_vec();
        let mut station = Station::new(mock);

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let callback: DumpCallback = Arc::new(move |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        });

        let mut out = Vec::new();
        let written = station.dump(&mut out, Some(callback)).unwrap();
        assert_eq!(written, MEMORY_SIZE);
        assert_eq!(out, expected);
        assert_eq!(calls.load(Ordering::Relaxed), MEMORY_SIZE / BLOCK_SIZE);
    }
}
