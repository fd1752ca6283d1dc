use std::time::Duration;

use cadence_core::Clock;
use tokio::time::Instant;

/// [`Clock`] backed by the tokio clock, with the epoch fixed at
/// construction.
///
/// Follows the mocked clock under `start_paused` test runtimes, which keeps
/// controllers and tokio-backed schedulers on one timeline.
#[derive(Debug, Clone)]
pub struct TokioClock {
	origin: Instant,
}

impl TokioClock {
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
		}
	}
}

impl Default for TokioClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for TokioClock {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}
