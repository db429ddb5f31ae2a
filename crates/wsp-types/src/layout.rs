//! Memory map of Fineoffset weather stations.
//!
//! The station exposes a flat 64 KiB address space. The first 256 bytes are
//! the settings block; the rest is a ring of 4080 history chunks of 16 bytes
//! each. All transfers are 32 bytes long.
//!
//! Addresses are `u16` because that is what the wire protocol carries.
//! [`HISTORY_END`] is one past the last address and therefore only fits a
//! `u32`.

/// Size of one device transfer in bytes.
pub const BLOCK_SIZE: usize = 32;

/// Size of the fixed settings block at address 0.
pub const SETTINGS_BLOCK_SIZE: usize = 256;

/// Size of one history chunk.
pub const HISTORY_CHUNK_SIZE: usize = 16;

/// Number of history chunks the ring can hold.
pub const HISTORY_MAX: u16 = 4080;

/// Address of the first history chunk.
pub const HISTORY_START: u16 = SETTINGS_BLOCK_SIZE as u16;

/// One past the address of the last history chunk (`0x10000`).
pub const HISTORY_END: u32 = HISTORY_START as u32 + HISTORY_MAX as u32 * HISTORY_CHUNK_SIZE as u32;

/// Total size of a memory image, which is also the size of a dump file.
pub const MEMORY_SIZE: usize = HISTORY_END as usize;

/// Bytes at offset 0 and 1 once the station has settled its memory.
pub const MAGIC_NUMBER: [u8; 2] = [0x55, 0xAA];

/// Status bit set while the outdoor sensor is out of contact.
pub const LOST_SENSOR_CONTACT_BIT: u8 = 6;

/// Status bit set when the rain tick counter has wrapped.
pub const RAIN_COUNTER_OVERFLOW_BIT: u8 = 7;

/// Value the host writes to [`offsets::DATA_REFRESHED`] after changing settings.
pub const SETTINGS_CHANGED: u8 = 0xAA;

/// Settings block offsets used by the write path.
pub mod offsets {
    /// Minutes between stored readings.
    pub const READ_PERIOD: u16 = 16;
    /// Signed hour offset from CET.
    pub const TIMEZONE: u16 = 24;
    /// Change-notification flag.
    pub const DATA_REFRESHED: u16 = 26;
    /// Stored reading count, little-endian u16.
    pub const DATA_COUNT: u16 = 27;
    /// Current write position, little-endian u16.
    pub const CURRENT_POS: u16 = 30;
}

const RING_BYTES: i64 = HISTORY_MAX as i64 * HISTORY_CHUNK_SIZE as i64;

/// Move `steps` chunks backwards (negative: forwards) through the ring.
///
/// Stepping below [`HISTORY_START`] continues from the top of the ring, i.e.
/// an address `a` below the start maps to `HISTORY_END - (HISTORY_START - a)`.
///
/// ```
/// use wsp_types::layout::{step_back, HISTORY_END, HISTORY_START};
///
/// assert_eq!(u32::from(step_back(HISTORY_START, 1)), HISTORY_END - 16);
/// assert_eq!(step_back(0x0120, 2), 0x0100);
/// ```
#[must_use]
pub fn step_back(address: u16, steps: i64) -> u16 {
    let offset = i64::from(address) - i64::from(HISTORY_START);
    let wrapped = (offset - steps * HISTORY_CHUNK_SIZE as i64).rem_euclid(RING_BYTES);
    // Always below HISTORY_END - HISTORY_CHUNK_SIZE + 1, so it fits.
    (wrapped + i64::from(HISTORY_START)) as u16
}

/// Address of the chunk written before the one at `address`.
#[must_use]
pub fn previous_address(address: u16) -> u16 {
    step_back(address, 1)
}

/// Address of the chunk written after the one at `address`.
#[must_use]
pub fn next_address(address: u16) -> u16 {
    step_back(address, -1)
}

/// Whether `address` is the start of a history chunk.
#[must_use]
pub fn is_chunk_address(address: u16) -> bool {
    address >= HISTORY_START && usize::from(address - HISTORY_START) % HISTORY_CHUNK_SIZE == 0
}

/// Logical 1-based history index of the chunk at `address`.
///
/// While the ring is still filling (`data_count < HISTORY_MAX`) the index is
/// the chunk's position from [`HISTORY_START`]. Once full, the oldest live
/// chunk sits right after `current_pos` and gets index 1, so the newest
/// chunk (at `current_pos`) is always [`HISTORY_MAX`].
#[must_use]
pub fn history_index(address: u16, data_count: u16, current_pos: u16) -> u16 {
    let base = if data_count < HISTORY_MAX {
        HISTORY_START
    } else {
        next_address(current_pos)
    };
    let distance = (i64::from(address) - i64::from(base)).rem_euclid(RING_BYTES);
    (distance / HISTORY_CHUNK_SIZE as i64) as u16 + 1
}
