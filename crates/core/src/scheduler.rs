use std::time::Duration;

/// Callback registered with a [`Scheduler`], run once when the registration
/// fires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque identifier for a live scheduler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
	pub const fn new(id: u64) -> Self {
		Self(id)
	}

	pub const fn id(self) -> u64 {
		self.0
	}
}

/// Deferred-callback capability injected into invocation controllers.
///
/// Implementations pace either by a fixed delay or by display refresh; the
/// controller treats them interchangeably. `unschedule` on a handle that has
/// already fired, was already unscheduled, or was never issued must be a
/// no-op, never an error.
pub trait Scheduler: Send + Sync {
	/// Registers `callback` to run after roughly `delay_hint`.
	///
	/// Frame-synced implementations ignore the hint and fire on the next
	/// frame boundary instead.
	fn schedule(&self, delay_hint: Duration, callback: TimerCallback) -> TimerHandle;

	/// Drops a registration. No-op when the handle is not live.
	fn unschedule(&self, handle: TimerHandle);

	/// Whether callbacks are paced by display refresh instead of the delay
	/// hint.
	fn frame_synced(&self) -> bool {
		false
	}
}
