//! Tokio-backed timing for cadence controllers.
//!
//! [`TokioScheduler`] paces by fixed delay, [`FrameScheduler`] by frame
//! period. [`debounced`] and [`throttled`] wire an operation to a
//! [`TokioClock`] and the matching scheduler, choosing frame pacing when no
//! wait was configured.

mod clock;
mod delay;
mod frame;
mod registry;


use std::sync::Arc;
use std::time::Duration;

use cadence_core::{Clock, DebounceConfig, Debounced, Scheduler, ThrottleConfig};

pub use clock::TokioClock;
pub use delay::TokioScheduler;
pub use frame::FrameScheduler;

/// Debounces `func` on the current runtime.
///
/// With `config.wait` set, a fixed-delay scheduler paces the window;
/// without it, invocations settle on frame boundaries.
pub fn debounced<T, R, F>(func: F, config: DebounceConfig) -> Debounced<T, R>
where
	F: FnMut(T) -> R + Send + 'static,
	T: Send + 'static,
	R: Clone + Send + 'static,
{
	Debounced::new(func, config, default_clock(), scheduler_for(config.wait))
}

/// Throttles `func` on the current runtime: at most one invocation per
/// window.
pub fn throttled<T, R, F>(func: F, wait: Option<Duration>, config: ThrottleConfig) -> Debounced<T, R>
where
	F: FnMut(T) -> R + Send + 'static,
	T: Send + 'static,
	R: Clone + Send + 'static,
{
	Debounced::throttled(func, wait, config, default_clock(), scheduler_for(wait))
}

fn default_clock() -> Arc<dyn Clock> {
	Arc::new(TokioClock::new())
}

fn scheduler_for(wait: Option<Duration>) -> Arc<dyn Scheduler> {
	match wait {
		Some(_) => Arc::new(TokioScheduler::new()),
		None => Arc::new(FrameScheduler::default()),
	}
}
