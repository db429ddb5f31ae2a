//! Command-line interface for Fineoffset USB weather station memory images.
//!
//! Stations such as the WH1080, WH1081 and WH3080 keep a settings block and
//! a ring of up to 4080 readings in their memory. `wsp` decodes a memory
//! dump of such a station and prints reports or history records.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `summary` | Indoor and outdoor values of the newest record (default) |
//! | `status` | Read period, data count, memory position, station clock |
//! | `settings` | Unit and display settings |
//! | `alarms` | Alarm thresholds and their enabled state |
//! | `maxmin` | Recorded extremes with their dates |
//! | `history` | History records as text, JSON, CSV, EasyWeather or a template |
//! | `format-list` | Directives accepted by `history --template` |
//! | `dump` | Copy the memory image to a file |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Templates
//!
//! `history --template` renders each record through `%` directives, for
//! example `wsp history -c 3 -t "%N %T C %H%%\n"`. See [`template`].
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/wsp/config.toml` (or platform
//! equivalent): `infile`, `altitude`, `quick_rain`, `format` and
//! `no_color`. Flags override the file.
//!
//! # Environment Variables
//!
//! - `WSP_INFILE`: Memory dump to read (overridden by `--infile`)
//! - `WSP_STYLE`: Output style (`minimal`, `rich`, `plain`)
//! - `NO_COLOR`: Disable colored output when set

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod style;
pub mod template;
pub mod util;

// Re-export core dependencies for convenience
pub use wsp_core;
pub use wsp_types;
