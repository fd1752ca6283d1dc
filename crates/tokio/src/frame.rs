use std::sync::Arc;
use std::time::Duration;

use cadence_core::{Scheduler, TimerCallback, TimerHandle};
use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::registry::TimerRegistry;

/// Frame-synchronized [`Scheduler`].
///
/// Callbacks fire on the next multiple of the frame period after the
/// scheduler's construction instant, emulating display-refresh pacing; the
/// delay hint is ignored.
#[derive(Clone)]
pub struct FrameScheduler {
	origin: Instant,
	period: Duration,
	live: Arc<Mutex<TimerRegistry>>,
}

impl FrameScheduler {
	/// 60 frames per second.
	pub const DEFAULT_PERIOD: Duration = Duration::from_micros(16_667);

	pub fn new(period: Duration) -> Self {
		debug_assert!(!period.is_zero());
		Self {
			origin: Instant::now(),
			period,
			live: Arc::new(Mutex::new(TimerRegistry::default())),
		}
	}

	/// Number of registrations that have neither fired nor been dropped.
	pub fn live(&self) -> usize {
		self.live.lock().len()
	}

	fn delay_to_next_frame(&self) -> Duration {
		let elapsed = self.origin.elapsed();
		let periods = elapsed.as_nanos() / self.period.as_nanos() + 1;
		let boundary = Duration::from_nanos((periods * self.period.as_nanos()) as u64);
		boundary - elapsed
	}
}

impl Default for FrameScheduler {
	fn default() -> Self {
		Self::new(Self::DEFAULT_PERIOD)
	}
}

impl Scheduler for FrameScheduler {
	fn schedule(&self, _delay_hint: Duration, callback: TimerCallback) -> TimerHandle {
		let (id, token) = self.live.lock().insert();
		let live = Arc::clone(&self.live);
		let delay = self.delay_to_next_frame();
		trace!(id, delay = ?delay, "frame callback armed");
		tokio::spawn(async move {
			tokio::select! {
				_ = token.cancelled() => {}
				_ = sleep(delay) => {
					live.lock().complete(id);
					callback();
				}
			}
		});
		TimerHandle::new(id)
	}

	fn unschedule(&self, handle: TimerHandle) {
		self.live.lock().cancel(handle.id());
	}

	fn frame_synced(&self) -> bool {
		true
	}
}
