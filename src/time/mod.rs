//! # Time Handling
//!
//! Everything the player needs to know about wall-clock time:
//!
//! - `window`: whether a live event has started or ended, and how long to
//!   wait until it does
//! - `clock`: the source of "now", swappable for tests
//! - `offset`: parsing of `1h2m3s` style playback offsets
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use livecast::time::TimeWindow;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let window = TimeWindow::evaluate(true, Some(start), None, now);
//! assert_eq!(window.has_started, Some(false));
//! assert_eq!(window.has_ended, None);
//! ```

/// Sources of the current time
pub mod clock;

/// Playback offset parsing
pub mod offset;

/// Live window evaluation
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use offset::parse_offset;
pub use window::{delay_till, TimeWindow, MAX_TIMER_DELAY};
