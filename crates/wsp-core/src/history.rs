//! History reconstruction.
//!
//! The station keeps its readings in a ring of 4080 chunks and only stores
//! the minutes elapsed since the previous reading. Absolute timestamps are
//! rebuilt by walking backwards from the newest chunk (at `current_pos`)
//! and subtracting each record's delay from the station clock.
//!
//! # Index Convention
//!
//! **History indices are 1-based**, oldest first:
//! - While the ring is filling, index = position from `HISTORY_START`.
//! - Once full, the oldest live record is 1 and the newest is 4080.
//!
//! # Missing records
//!
//! A chunk that cannot be read after all retries becomes a `None` slot. Its
//! delay is unknown, so older timestamps are computed as if it were 0.

use std::sync::Arc;

use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, info, warn};

use wsp_types::layout::{HISTORY_MAX, history_index, previous_address, step_back};
use wsp_types::{HistoryItem, StationSettings};

use crate::error::Result;
use crate::station::Station;
use crate::traits::StationMemory;

/// Progress information for a history walk.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistoryProgress {
    /// Chunks visited so far, failed ones included.
    pub records_read: usize,
    /// Chunks the walk will visit.
    pub total_records: usize,
    /// Overall progress (0.0 to 1.0).
    pub overall_progress: f32,
}

impl HistoryProgress {
    fn new(records_read: usize, total_records: usize) -> Self {
        let overall_progress = if total_records == 0 {
            1.0
        } else {
            records_read as f32 / total_records as f32
        };
        Self {
            records_read,
            total_records,
            overall_progress,
        }
    }
}

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(HistoryProgress) + Send + Sync>;

/// Options for reading history.
#[derive(Clone, Default)]
pub struct HistoryOptions {
    /// Records to read, newest first. `None` reads everything stored.
    /// Larger values are clamped to the stored count.
    pub count: Option<u16>,
    /// Locate rain reference records by assuming a fixed read period
    /// instead of searching the loaded history.
    pub quick_rain: bool,
    /// Zone for the station clock. `None` uses the host's local zone.
    pub utc_offset: Option<UtcOffset>,
    /// Progress callback (optional).
    pub progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for HistoryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryOptions")
            .field("count", &self.count)
            .field("quick_rain", &self.quick_rain)
            .field("utc_offset", &self.utc_offset)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl HistoryOptions {
    /// Create new history options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read only the newest `count` records.
    #[must_use]
    pub fn count(mut self, count: u16) -> Self {
        self.count = Some(count);
        self
    }

    /// Read every stored record. Turns quick rain off.
    #[must_use]
    pub fn all(mut self) -> Self {
        self.count = None;
        self.quick_rain = false;
        self
    }

    /// Enable or disable quick rain lookups.
    #[must_use]
    pub fn quick_rain(mut self, enabled: bool) -> Self {
        self.quick_rain = enabled;
        self
    }

    /// Resolve the station clock at a fixed offset.
    #[must_use]
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    /// Set a progress callback.
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(HistoryProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Records the walk will visit given the stored count.
    #[must_use]
    pub fn records_to_read(&self, data_count: u16) -> u16 {
        let stored = data_count.min(HISTORY_MAX);
        match self.count {
            Some(count) => count.min(stored),
            None => stored,
        }
    }

    /// Whether quick rain applies: it is off when the whole history is read.
    #[must_use]
    pub fn uses_quick_rain(&self, data_count: u16) -> bool {
        self.quick_rain && self.records_to_read(data_count) < data_count.min(HISTORY_MAX)
    }

    fn resolve(&self, settings: &StationSettings) -> Result<OffsetDateTime> {
        let at = match self.utc_offset {
            Some(offset) => settings.datetime.to_offset(offset)?,
            None => settings.datetime.to_local()?,
        };
        Ok(at)
    }
}

/// A reconstructed stretch of history, oldest first.
///
/// Serializes with missing slots as `null`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct History {
    slots: Vec<Option<HistoryItem>>,
    data_count: u16,
    current_pos: u16,
    read_period: u8,
    quick_rain: bool,
}

impl History {
    /// Every slot in order, `None` where the chunk could not be read.
    pub fn slots(&self) -> &[Option<HistoryItem>] {
        &self.slots
    }

    /// Readable items in order.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &HistoryItem> {
        self.slots.iter().flatten()
    }

    /// Number of slots, missing ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots whose chunk could not be read.
    pub fn missing(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// The newest readable item.
    pub fn newest(&self) -> Option<&HistoryItem> {
        self.items().next_back()
    }

    /// Position of the newest readable item in [`slots`](Self::slots).
    pub fn newest_position(&self) -> Option<usize> {
        self.slots.iter().rposition(Option::is_some)
    }

    /// The item stored at device `address`, if it was loaded.
    pub fn find_address(&self, address: u16) -> Option<&HistoryItem> {
        self.items().find(|item| item.address == address)
    }

    /// Whether rain windows use the fixed read period.
    pub fn quick_rain(&self) -> bool {
        self.quick_rain
    }

    /// Stored record count at the time of reading.
    pub fn data_count(&self) -> u16 {
        self.data_count
    }

    /// Write position at the time of reading.
    pub fn current_pos(&self) -> u16 {
        self.current_pos
    }

    /// Minutes between readings at the time of reading.
    pub fn read_period(&self) -> u8 {
        self.read_period
    }
}

impl<M: StationMemory> Station<M> {
    /// Read and time-stamp history records, newest `options.count` first,
    /// returned oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error only if the station clock cannot be resolved.
    /// Unreadable chunks become `None` slots.
    pub fn read_history(
        &mut self,
        settings: &StationSettings,
        options: &HistoryOptions,
    ) -> Result<History> {
        let base = options.resolve(settings)?;
        let total = options.records_to_read(settings.data_count);
        info!(
            "Reading {} of {} history records from 0x{:04X}",
            total, settings.data_count, settings.current_pos
        );

        let mut slots = Vec::with_capacity(usize::from(total));
        let mut address = settings.current_pos;
        let mut elapsed = Duration::ZERO;

        for i in 0..usize::from(total) {
            let index = history_index(address, settings.data_count, settings.current_pos);
            match self.read_record(address) {
                Ok(record) => {
                    slots.push(Some(HistoryItem {
                        index,
                        address,
                        timestamp: base - elapsed,
                        record,
                    }));
                    elapsed += Duration::minutes(i64::from(record.delay));
                }
                Err(e) => {
                    warn!("No data for record {} at 0x{:04X}: {}", index, address, e);
                    slots.push(None);
                }
            }

            if let Some(cb) = &options.progress_callback {
                cb(HistoryProgress::new(i + 1, usize::from(total)));
            }
            address = previous_address(address);
        }
        slots.reverse();

        let history = History {
            slots,
            data_count: settings.data_count,
            current_pos: settings.current_pos,
            read_period: settings.read_period,
            quick_rain: options.uses_quick_rain(settings.data_count),
        };
        debug!(
            "History spans {} slots, {} missing",
            history.len(),
            history.missing()
        );
        Ok(history)
    }

    /// Find the record roughly `seconds` before `current` assuming one
    /// record every read period.
    ///
    /// The record is taken from `history` when loaded, otherwise read from
    /// the station. Its timestamp is `current.timestamp - seconds`. Returns
    /// `None` when the step would leave the stored history, the read period
    /// is zero, or the chunk cannot be read.
    pub fn quick_rain_reference(
        &mut self,
        history: &History,
        current: &HistoryItem,
        seconds: i64,
    ) -> Option<HistoryItem> {
        let period = i64::from(history.read_period) * 60;
        if period == 0 || seconds < 0 {
            return None;
        }
        let steps = seconds / period;
        if steps >= i64::from(history.data_count.min(HISTORY_MAX)) {
            debug!("Quick rain: {} steps exceed stored history", steps);
            return None;
        }

        let address = step_back(current.address, steps);
        let record = match history.find_address(address) {
            Some(item) => item.record,
            None => match self.read_record(address) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Quick rain: cannot read 0x{:04X}: {}", address, e);
                    return None;
                }
            },
        };

        Some(HistoryItem {
            index: history_index(address, history.data_count, history.current_pos),
            address,
            timestamp: current.timestamp - Duration::seconds(seconds),
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRecord, MockStation, MockStationBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;
    use wsp_types::BcdDate;

    fn utc() -> HistoryOptions {
        HistoryOptions::new().utc_offset(UtcOffset::UTC)
    }

    fn read(mock: MockStation, options: &HistoryOptions) -> History {
        let mut station = Station::new(mock);
        let settings = station.read_settings().unwrap();
        station.read_history(&settings, options).unwrap()
    }

    #[test]
    fn test_single_record() {
        let mock = MockStationBuilder::new()
            .record(MockRecord::default())
            .build();
        let history = read(mock, &utc());

        assert_eq!(history.len(), 1);
        let item = history.newest().unwrap();
        assert_eq!(item.index, 1);
        assert_eq!(item.address, 0x0100);
        assert_eq!(item.timestamp, datetime!(2010-05-14 9:30 UTC));
    }

    #[test]
    fn test_timestamps_subtract_newer_delays() {
        let mock = MockStationBuilder::new()
            .record(MockRecord::default().delay(10))
            .record(MockRecord::default().delay(20))
            .record(MockRecord::default().delay(30))
            .build();
        let history = read(mock, &utc());

        let stamps: Vec<_> = history.items().map(|i| i.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                datetime!(2010-05-14 8:40 UTC),
                datetime!(2010-05-14 9:00 UTC),
                datetime!(2010-05-14 9:30 UTC),
            ]
        );
        let indices: Vec<_> = history.items().map(|i| i.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_count_clamped_to_data_count() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), 3)
            .build();
        let history = read(mock, &utc().count(100));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_count_limits_to_newest() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), 5)
            .build();
        let history = read(mock, &utc().count(2));
        let addresses: Vec<_> = history.items().map(|i| i.address).collect();
        assert_eq!(addresses, vec![0x0130, 0x0140]);
    }

    #[test]
    fn test_corrupt_data_count_walks_ring_once() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), usize::from(HISTORY_MAX))
            .data_count(5000)
            .build();
        let history = read(mock, &utc());
        assert_eq!(history.len(), usize::from(HISTORY_MAX));

        let mut addresses: Vec<_> = history.items().map(|i| i.address).collect();
        addresses.sort_unstable();
        addresses.dedup();
        assert_eq!(addresses.len(), usize::from(HISTORY_MAX));

        assert_eq!(utc().count(5000).records_to_read(5000), HISTORY_MAX);
        assert!(!utc().quick_rain(true).uses_quick_rain(5000));
    }

    #[test]
    fn test_empty_station() {
        let history = read(MockStation::new(), &utc());
        assert!(history.is_empty());
        assert!(history.newest().is_none());
    }

    #[test]
    fn test_walk_wraps_below_start() {
        let mock = MockStationBuilder::new()
            .start_address(0xFFE0)
            .records(MockRecord::default(), 3)
            .build();
        let history = read(mock, &utc());
        let addresses: Vec<_> = history.items().map(|i| i.address).collect();
        assert_eq!(addresses, vec![0xFFE0, 0xFFF0, 0x0100]);
        let indices: Vec<_> = history.items().map(|i| i.index).collect();
        assert_eq!(indices, vec![4079, 4080, 1]);
    }

    #[test]
    fn test_full_ring_indices() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default().delay(1), usize::from(HISTORY_MAX) + 10)
            .build();
        let history = read(mock, &utc().count(3));
        let indices: Vec<_> = history.items().map(|i| i.index).collect();
        assert_eq!(indices, vec![4078, 4079, 4080]);
        assert_eq!(history.newest().unwrap().address, 0x0100 + 9 * 16);
    }

    #[test]
    fn test_missing_chunk_is_none_and_contributes_no_delay() {
        let mut mock = MockStationBuilder::new()
            .record(MockRecord::default().delay(10))
            .record(MockRecord::default().delay(20))
            .record(MockRecord::default().delay(30))
            .build();
        mock.fail_address(0x0110);
        let history = read(mock, &utc());

        assert_eq!(history.len(), 3);
        assert_eq!(history.missing(), 1);
        assert!(history.slots()[1].is_none());
        // Only the newest record's delay separates it from the oldest.
        assert_eq!(
            history.slots()[0].unwrap().timestamp,
            datetime!(2010-05-14 9:00 UTC)
        );
    }

    #[test]
    fn test_transient_failure_recovers() {
        let mut mock = MockStationBuilder::new()
            .records(MockRecord::default(), 2)
            .build();
        mock.set_transient_failures(0x0100, 2);
        let history = read(mock, &utc());
        assert_eq!(history.missing(), 0);
    }

    #[test]
    fn test_progress_callback() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), 4)
            .build();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let options = utc().with_progress(move |p| {
            seen.fetch_add(1, Ordering::Relaxed);
            assert!(p.records_read <= p.total_records);
        });
        read(mock, &options);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_quick_rain_forced_off_for_full_read() {
        let options = HistoryOptions::new().quick_rain(true);
        assert!(!options.uses_quick_rain(10));
        assert!(options.clone().count(1).uses_quick_rain(10));
        assert!(!options.count(1).all().uses_quick_rain(10));
    }

    #[test]
    fn test_quick_rain_reference_reads_unloaded_chunk() {
        let mock = MockStationBuilder::new()
            .read_period(30)
            .records(MockRecord::default().delay(30), 4)
            .build();
        let mut station = Station::new(mock);
        let settings = station.read_settings().unwrap();
        let options = utc().count(1).quick_rain(true);
        let history = station.read_history(&settings, &options).unwrap();
        assert!(history.quick_rain());

        let current = *history.newest().unwrap();
        let reference = station
            .quick_rain_reference(&history, &current, 3600)
            .unwrap();
        assert_eq!(reference.address, 0x0110);
        assert_eq!(reference.timestamp, datetime!(2010-05-14 8:30 UTC));
    }

    #[test]
    fn test_quick_rain_reference_beyond_history() {
        let mock = MockStationBuilder::new()
            .read_period(30)
            .records(MockRecord::default(), 2)
            .build();
        let mut station = Station::new(mock);
        let settings = station.read_settings().unwrap();
        let history = station.read_history(&settings, &utc().count(1)).unwrap();
        let current = *history.newest().unwrap();
        assert!(station
            .quick_rain_reference(&history, &current, 24 * 3600)
            .is_none());
    }

    #[test]
    fn test_local_time_resolution() {
        let mock = MockStationBuilder::new()
            .datetime(BcdDate {
                year: 2011,
                month: 1,
                day: 15,
                hour: 12,
                minute: 0,
            })
            .record(MockRecord::default())
            .build();
        let history = read(mock, &HistoryOptions::new());
        let item = history.newest().unwrap();
        assert_eq!(item.timestamp.hour(), 12);
    }

    #[test]
    fn test_history_serializes_missing_as_null() {
        let mut mock = MockStationBuilder::new()
            .records(MockRecord::default(), 2)
            .build();
        mock.fail_address(0x0100);
        let mut station = Station::new(mock);
        let settings = station.read_settings().unwrap();
        let history = station.read_history(&settings, &utc().all()).unwrap();

        let json = serde_json::to_value(&history).unwrap();
        assert!(json["slots"][0].is_null());
        assert_eq!(json["slots"][1]["address"], 0x0110);
        assert_eq!(json["data_count"], 2);
    }
}
