//! Debounced invocation controller.
//!
//! [`Debounced`] owns all pending-call state and timing decisions for one
//! wrapped operation. Each call request either invokes the operation
//! synchronously, merges into the pending deferred invocation, or forces an
//! invocation because the deferral ceiling was exceeded. The scheduler fires
//! the expiry callback, which re-reads the clock and re-decides: a window
//! extended by intervening calls is re-armed for the remaining wait instead
//! of closing.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::{DebounceConfig, ThrottleConfig};
use crate::scheduler::{Scheduler, TimerHandle};

#[cfg(test)]
mod tests;

type Shared<T, R> = Arc<Mutex<State<T, R>>>;

/// Debounced wrapper around an operation `FnMut(T) -> R`.
///
/// Handles are cheaply cloneable and share one controller. Operations on one
/// controller are serialized by an internal mutex; the wrapped operation
/// must not call back into its own handle.
///
/// A panic in the wrapped operation propagates to whichever caller triggered
/// that invocation. State committed before the operation ran (timer cleared,
/// pending call consumed) stays committed.
pub struct Debounced<T, R = ()> {
	inner: Shared<T, R>,
}

impl<T, R> Clone for Debounced<T, R> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T, R> fmt::Debug for Debounced<T, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.lock();
		f.debug_struct("Debounced")
			.field("wait", &state.wait)
			.field("waiting", &state.timer.is_some())
			.finish_non_exhaustive()
	}
}

struct State<T, R> {
	func: Box<dyn FnMut(T) -> R + Send>,
	clock: Arc<dyn Clock>,
	scheduler: Arc<dyn Scheduler>,
	/// Effective window; zero when `wait` was omitted.
	wait: Duration,
	leading: bool,
	trailing: bool,
	/// Deferral ceiling, clamped to at least `wait`.
	max_wait: Option<Duration>,
	/// `wait` was omitted and the scheduler paces by frames.
	use_frames: bool,
	/// Most recent call payload not yet consumed by an invocation.
	pending: Option<T>,
	/// Live registration; present iff the controller is waiting.
	timer: Option<TimerHandle>,
	/// Bumped whenever the live registration is replaced or dropped, so a
	/// superseded expiry callback that already fired cannot act.
	epoch: u64,
	last_call: Option<Duration>,
	last_invoke: Duration,
	result: Option<R>,
}

impl<T, R> Debounced<T, R>
where
	T: Send + 'static,
	R: Clone + Send + 'static,
{
	/// Builds a debounced wrapper around `func`.
	pub fn new<F>(
		func: F,
		config: DebounceConfig,
		clock: Arc<dyn Clock>,
		scheduler: Arc<dyn Scheduler>,
	) -> Self
	where
		F: FnMut(T) -> R + Send + 'static,
	{
		let wait = config.wait.unwrap_or_default();
		let use_frames = config.wait.is_none() && scheduler.frame_synced();
		let max_wait = config.max_wait.map(|m| m.max(wait));
		Self {
			inner: Arc::new(Mutex::new(State {
				func: Box::new(func),
				clock,
				scheduler,
				wait,
				leading: config.leading,
				trailing: config.trailing,
				max_wait,
				use_frames,
				pending: None,
				timer: None,
				epoch: 0,
				last_call: None,
				last_invoke: Duration::ZERO,
				result: None,
			})),
		}
	}

	/// Builds a throttled wrapper: at most one invocation per window.
	pub fn throttled<F>(
		func: F,
		wait: Option<Duration>,
		config: ThrottleConfig,
		clock: Arc<dyn Clock>,
		scheduler: Arc<dyn Scheduler>,
	) -> Self
	where
		F: FnMut(T) -> R + Send + 'static,
	{
		Self::new(func, config.into_debounce(wait), clock, scheduler)
	}

	/// Records a call request and invokes, defers, or merges it.
	///
	/// Returns the most recent result of the wrapped operation; unchanged
	/// when this call did not invoke, `None` until the operation has run at
	/// least once.
	pub fn invoke(&self, input: T) -> Option<R> {
		let mut state = self.inner.lock();
		let now = state.clock.now();
		let invoking = state.should_invoke(now);

		state.pending = Some(input);
		state.last_call = Some(now);

		if invoking {
			if state.timer.is_none() {
				return State::leading_edge(&mut state, &self.inner, now);
			}
			if state.max_wait.is_some() {
				// Call landed inside an open window with the deferral
				// ceiling exceeded: restart the window and fire now.
				debug!(at = ?now, "deferral ceiling exceeded, forcing invocation");
				let wait = state.wait;
				State::arm(&mut state, &self.inner, wait);
				if let Some(input) = state.pending.take() {
					return Some(state.run(input, now));
				}
			}
			// Due with an open window and no ceiling: the clock regressed.
			// Not actually due; fall through without invoking.
		}
		if state.timer.is_none() {
			let wait = state.wait;
			State::arm(&mut state, &self.inner, wait);
		}
		state.result.clone()
	}

	/// Abandons the pending call and any scheduled invocation.
	///
	/// Idempotent and safe in any state. The memoized result is kept.
	pub fn cancel(&self) {
		let mut state = self.inner.lock();
		state.disarm();
		state.last_invoke = Duration::ZERO;
		state.last_call = None;
		state.pending = None;
		trace!("cancelled");
	}

	/// Closes a pending window immediately instead of waiting for the timer.
	///
	/// On an idle controller this returns the memoized result unchanged.
	pub fn flush(&self) -> Option<R> {
		let mut state = self.inner.lock();
		if state.timer.is_none() {
			return state.result.clone();
		}
		let now = state.clock.now();
		State::trailing_edge(&mut state, now)
	}

	/// Whether an invocation window is currently open.
	pub fn pending(&self) -> bool {
		self.inner.lock().timer.is_some()
	}

	/// Result of the most recent invocation, if the operation has run.
	pub fn last_result(&self) -> Option<R> {
		self.inner.lock().result.clone()
	}
}

impl<T, R> State<T, R>
where
	T: Send + 'static,
	R: Clone + Send + 'static,
{
	/// True when enough time has passed for a call request to invoke: first
	/// call ever, window elapsed since the last call, clock regression, or
	/// deferral ceiling reached.
	fn should_invoke(&self, now: Duration) -> bool {
		let Some(last_call) = self.last_call else {
			return true;
		};
		match now.checked_sub(last_call) {
			// Clock went backwards; treat the window as elapsed.
			None => true,
			Some(elapsed) if elapsed >= self.wait => true,
			Some(_) => self.max_wait.is_some_and(|max| {
				now.checked_sub(self.last_invoke)
					.is_some_and(|since| since >= max)
			}),
		}
	}

	/// Delay to re-arm with when the timer fired before the window closed.
	fn remaining_wait(&self, now: Duration) -> Duration {
		let since_call = self
			.last_call
			.map_or(Duration::ZERO, |t| now.saturating_sub(t));
		let waiting = self.wait.saturating_sub(since_call);
		match self.max_wait {
			Some(max) => waiting.min(max.saturating_sub(now.saturating_sub(self.last_invoke))),
			None => waiting,
		}
	}

	/// Runs the wrapped operation and memoizes its result.
	fn run(&mut self, input: T, now: Duration) -> R {
		self.last_invoke = now;
		let result = (self.func)(input);
		self.result = Some(result.clone());
		result
	}

	/// Opens a window at `now`: arms the trailing timer and, with leading
	/// enabled, invokes immediately.
	fn leading_edge(state: &mut Self, shared: &Shared<T, R>, now: Duration) -> Option<R> {
		state.last_invoke = now;
		let wait = state.wait;
		Self::arm(state, shared, wait);
		trace!(at = ?now, leading = state.leading, "window opened");
		if state.leading {
			if let Some(input) = state.pending.take() {
				return Some(state.run(input, now));
			}
		}
		state.result.clone()
	}

	/// Closes the window at `now`: invokes the pending call if trailing is
	/// enabled and one arrived since the window opened, otherwise just
	/// drops it.
	fn trailing_edge(state: &mut Self, now: Duration) -> Option<R> {
		state.disarm();
		trace!(at = ?now, "window closed");
		match state.pending.take() {
			Some(input) if state.trailing => Some(state.run(input, now)),
			_ => state.result.clone(),
		}
	}

	/// Registers the expiry callback `delay` from now, replacing any live
	/// registration. Frame-synced schedulers ignore the hint.
	fn arm(state: &mut Self, shared: &Shared<T, R>, delay: Duration) {
		state.disarm();
		state.epoch = state.epoch.wrapping_add(1);
		let expected = state.epoch;
		let weak = Arc::downgrade(shared);
		let hint = if state.use_frames {
			Duration::ZERO
		} else {
			delay
		};
		let handle = state
			.scheduler
			.schedule(hint, Box::new(move || Self::timer_expired(&weak, expected)));
		state.timer = Some(handle);
	}

	/// Drops the live registration, if any, and invalidates its callback.
	fn disarm(&mut self) {
		if let Some(handle) = self.timer.take() {
			self.scheduler.unschedule(handle);
			self.epoch = self.epoch.wrapping_add(1);
		}
	}

	/// Scheduler callback: close the window if it is due, or re-arm for the
	/// remainder when an intervening call extended it.
	fn timer_expired(shared: &Weak<Mutex<Self>>, expected: u64) {
		let Some(shared) = shared.upgrade() else {
			return;
		};
		let mut state = shared.lock();
		if state.epoch != expected {
			// Superseded or cancelled while this callback was in flight.
			return;
		}
		state.timer = None;
		let now = state.clock.now();
		if state.should_invoke(now) {
			let _ = Self::trailing_edge(&mut state, now);
		} else {
			let delay = state.remaining_wait(now);
			Self::arm(&mut state, &shared, delay);
		}
	}
}
