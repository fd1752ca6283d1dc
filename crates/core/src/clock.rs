use std::time::{Duration, Instant};

/// Monotonic time source for invocation controllers.
///
/// Readings are offsets from an arbitrary per-clock epoch. Real clocks never
/// regress; test clocks may, and the controller treats a regressed reading
/// as "the window has elapsed".
pub trait Clock: Send + Sync {
	/// Current offset from the clock's epoch.
	fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`], with the epoch fixed at construction.
#[derive(Debug)]
pub struct SystemClock {
	origin: Instant,
}

impl SystemClock {
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
		}
	}
}

impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SystemClock {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}
