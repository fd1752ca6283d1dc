use std::sync::Arc;
use std::time::Duration;

use cadence_core::{Scheduler, TimerCallback, TimerHandle};
use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::trace;

use crate::registry::TimerRegistry;

/// Fixed-delay [`Scheduler`] backed by tokio timers.
///
/// Each registration spawns a task on the current runtime, so `schedule`
/// must be called from within a runtime context. Cloned handles share one
/// registry.
#[derive(Clone, Default)]
pub struct TokioScheduler {
	live: Arc<Mutex<TimerRegistry>>,
}

impl TokioScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of registrations that have neither fired nor been dropped.
	pub fn live(&self) -> usize {
		self.live.lock().len()
	}
}

impl Scheduler for TokioScheduler {
	fn schedule(&self, delay_hint: Duration, callback: TimerCallback) -> TimerHandle {
		let (id, token) = self.live.lock().insert();
		let live = Arc::clone(&self.live);
		trace!(id, delay = ?delay_hint, "timer armed");
		tokio::spawn(async move {
			tokio::select! {
				_ = token.cancelled() => {}
				_ = sleep(delay_hint) => {
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
}
