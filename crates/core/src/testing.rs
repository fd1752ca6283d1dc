//! Manually driven clock and scheduler for deterministic tests.
//!
//! [`ManualClock`] and [`ManualScheduler`] share a reading: advancing the
//! scheduler moves the clock to each registration's deadline before firing
//! its callback, so a controller observes exactly the timestamps a real
//! timer wheel would hand it, without sleeping. The clock can also be set
//! backwards to exercise clock-regression behavior.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::scheduler::{Scheduler, TimerCallback, TimerHandle};

/// Manually advanced [`Clock`]. Cloned handles share one reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	now: Arc<Mutex<Duration>>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Moves the clock forward.
	pub fn advance(&self, by: Duration) {
		*self.now.lock() += by;
	}

	/// Sets the absolute reading, forwards or backwards.
	pub fn set(&self, to: Duration) {
		*self.now.lock() = to;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Duration {
		*self.now.lock()
	}
}

struct Registration {
	handle: TimerHandle,
	due: Duration,
	callback: TimerCallback,
}

#[derive(Default)]
struct SchedulerState {
	next_id: u64,
	registrations: Vec<Registration>,
}

/// Manually driven [`Scheduler`] paired with a [`ManualClock`].
///
/// Registrations fire in deadline order when the clock is advanced through
/// them; callbacks run without any internal lock held, so a callback may
/// schedule or unschedule freely, and registrations it adds are honored
/// within the same run when they fall before the target deadline.
#[derive(Clone)]
pub struct ManualScheduler {
	clock: ManualClock,
	state: Arc<Mutex<SchedulerState>>,
	frame_period: Option<Duration>,
}

impl ManualScheduler {
	/// Fixed-delay scheduler sharing `clock`.
	pub fn new(clock: ManualClock) -> Self {
		Self {
			clock,
			state: Arc::new(Mutex::new(SchedulerState::default())),
			frame_period: None,
		}
	}

	/// Frame-synchronized scheduler firing on multiples of `period`.
	pub fn frame(clock: ManualClock, period: Duration) -> Self {
		debug_assert!(!period.is_zero());
		Self {
			clock,
			state: Arc::new(Mutex::new(SchedulerState::default())),
			frame_period: Some(period),
		}
	}

	/// Number of live registrations.
	pub fn scheduled(&self) -> usize {
		self.state.lock().registrations.len()
	}

	/// Advances the clock to `deadline`, firing every registration due on
	/// the way in deadline order.
	pub fn run_until(&self, deadline: Duration) {
		loop {
			let next = {
				let mut state = self.state.lock();
				let idx = state
					.registrations
					.iter()
					.enumerate()
					.filter(|(_, r)| r.due <= deadline)
					.min_by_key(|(_, r)| (r.due, r.handle.id()))
					.map(|(idx, _)| idx);
				match idx {
					Some(idx) => state.registrations.remove(idx),
					None => break,
				}
			};
			if next.due > self.clock.now() {
				self.clock.set(next.due);
			}
			(next.callback)();
		}
		if deadline > self.clock.now() {
			self.clock.set(deadline);
		}
	}

	/// Advances the clock by `by`, firing due registrations.
	pub fn advance(&self, by: Duration) {
		let deadline = self.clock.now() + by;
		self.run_until(deadline);
	}

	fn next_frame_boundary(&self, now: Duration, period: Duration) -> Duration {
		let periods = now.as_nanos() / period.as_nanos() + 1;
		Duration::from_nanos((periods * period.as_nanos()) as u64)
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&self, delay_hint: Duration, callback: TimerCallback) -> TimerHandle {
		let now = self.clock.now();
		let due = match self.frame_period {
			Some(period) => self.next_frame_boundary(now, period),
			None => now + delay_hint,
		};
		let mut state = self.state.lock();
		state.next_id += 1;
		let handle = TimerHandle::new(state.next_id);
		state.registrations.push(Registration {
			handle,
			due,
			callback,
		});
		handle
	}

	fn unschedule(&self, handle: TimerHandle) {
		self.state
			.lock()
			.registrations
			.retain(|r| r.handle != handle);
	}

	fn frame_synced(&self) -> bool {
		self.frame_period.is_some()
	}
}
