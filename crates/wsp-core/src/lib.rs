//! Station access and history reconstruction for Fineoffset USB weather
//! stations (WH1080, WH1081, WH3080 and rebadged variants).
//!
//! This crate sits on top of [`wsp_types`] and adds everything that needs
//! memory access: reading the settings block with magic-number validation,
//! walking the circular history ring, placing records in time, and deriving
//! dew point, wind chill, relative pressure and rain windows.
//!
//! # Features
//!
//! - **Transports**: any [`StationMemory`]; [`DumpFile`] serves a memory
//!   image from disk, [`MockStation`] an in-memory one for tests
//! - **Settings**: read with bounded retries, write read period, timezone
//!   and memory reset
//! - **History**: newest-first walk over the 4080-chunk ring with
//!   wrap-around and 1-based logical indices
//! - **Derived metrics**: dew point, wind chill, Beaufort, relative pressure,
//!   rain over the last hour and day
//! - **Dumps**: copy the full 64 KiB image with progress reporting
//!
//! # Quick Start
//!
//! ```
//! use wsp_core::{HistoryOptions, MockRecord, MockStationBuilder, Station};
//!
//! let mock = MockStationBuilder::new()
//!     .records(MockRecord::default(), 3)
//!     .build();
//! let mut station = Station::new(mock);
//!
//! let settings = station.read_settings().unwrap();
//! let history = station
//!     .read_history(&settings, &HistoryOptions::new().count(2))
//!     .unwrap();
//! assert_eq!(history.len(), 2);
//!
//! let newest = history.newest().unwrap();
//! println!("{} {:.1} °C", newest.timestamp, newest.record.outdoor_temperature());
//! ```

pub mod commands;
pub mod dump;
pub mod error;
pub mod history;
pub mod mock;
pub mod retry;
pub mod settings;
pub mod station;
pub mod traits;
pub mod weather;

// Core exports
pub use dump::DumpFile;
pub use error::{Error, Result};
pub use history::{History, HistoryOptions, HistoryProgress, ProgressCallback};
pub use mock::{MockRecord, MockStation, MockStationBuilder};
pub use retry::{with_retry, RetryConfig};
pub use station::{DumpCallback, DumpProgress, Station};
pub use traits::StationMemory;
pub use weather::RainTotals;

// Re-export from wsp-types
pub use wsp_types::layout;
pub use wsp_types::{
    BcdDate, HistoryItem, ParseError, StationSettings, WeatherRecord, WindDirection,
};
