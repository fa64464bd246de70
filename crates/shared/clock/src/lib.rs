//! Tiller Clock
//!
//! Time sources for the pulse cycle:
//!
//! - [`SystemClock`]: wall-clock time, used in production
//! - [`ManualClock`]: frozen time that only moves when told to, used in tests
//!
//! ## Usage
//!
//! ```ignore
//! use tiller_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::new(start);
//! clock.advance(Duration::seconds(30));
//! assert_eq!(clock.now(), start + Duration::seconds(30));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use tiller_ports::Clock;
