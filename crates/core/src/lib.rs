//! Call-rate control primitives: debounced and throttled invocation.
//!
//! [`Debounced`] wraps an operation and coalesces bursts of call requests
//! into a bounded number of invocations, firing on the leading and/or
//! trailing edge of a wait window, with an optional ceiling on how long an
//! invocation can be deferred while calls keep resetting the window.
//! Throttling is the same controller with a fixed configuration
//! (`leading = true`, `trailing = true`, ceiling = window).
//!
//! Timing is injected: controllers read an explicit [`Clock`] and register
//! expiry callbacks with an explicit [`Scheduler`], so behavior is fully
//! deterministic under the manual implementations in [`testing`].

pub mod clock;
pub mod config;
pub mod controller;
pub mod scheduler;
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use config::{DebounceConfig, ThrottleConfig};
pub use controller::Debounced;
pub use scheduler::{Scheduler, TimerCallback, TimerHandle};
