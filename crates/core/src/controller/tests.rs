use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::Debounced;
use crate::clock::Clock;
use crate::config::{DebounceConfig, ThrottleConfig};
use crate::testing::{ManualClock, ManualScheduler};

/// Invocation log: (timestamp, payload) per run of the wrapped operation.
type Log = Arc<Mutex<Vec<(Duration, &'static str)>>>;

fn ms(n: u64) -> Duration {
	Duration::from_millis(n)
}

fn build(
	config: DebounceConfig,
	clock: ManualClock,
	scheduler: ManualScheduler,
) -> (Debounced<&'static str, usize>, Log) {
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&log);
	let reader = clock.clone();
	let debounced = Debounced::new(
		move |arg: &'static str| {
			let mut entries = sink.lock();
			entries.push((reader.now(), arg));
			entries.len()
		},
		config,
		Arc::new(clock),
		Arc::new(scheduler),
	);
	(debounced, log)
}

fn harness(config: DebounceConfig) -> (Debounced<&'static str, usize>, ManualScheduler, ManualClock, Log) {
	let clock = ManualClock::new();
	let scheduler = ManualScheduler::new(clock.clone());
	let (debounced, log) = build(config, clock.clone(), scheduler.clone());
	(debounced, scheduler, clock, log)
}

#[test]
fn trailing_burst_coalesces_into_one_invocation() {
	let (debounced, scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(100)));

	assert_eq!(debounced.invoke("a"), None);
	assert!(debounced.pending());

	scheduler.run_until(ms(50));
	assert_eq!(debounced.invoke("b"), None);

	// The timer armed at t=0 fires at t=100 and re-arms for the remainder.
	scheduler.run_until(ms(149));
	assert_eq!(*log.lock(), vec![]);
	assert!(debounced.pending());

	scheduler.run_until(ms(150));
	assert_eq!(*log.lock(), vec![(ms(150), "b")]);
	assert!(!debounced.pending());
	assert_eq!(debounced.last_result(), Some(1));
}

#[test]
fn zero_wait_defers_to_next_tick() {
	let (debounced, scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(0)));

	assert_eq!(debounced.invoke("a"), None);
	assert!(debounced.pending());

	scheduler.run_until(ms(0));
	assert_eq!(*log.lock(), vec![(ms(0), "a")]);
}

#[test]
fn leading_only_invokes_once_per_window() {
	let config = DebounceConfig {
		leading: true,
		trailing: false,
		..DebounceConfig::with_wait(ms(100))
	};
	let (debounced, scheduler, _clock, log) = harness(config);

	assert_eq!(debounced.invoke("a"), Some(1));
	scheduler.run_until(ms(30));
	assert_eq!(debounced.invoke("b"), Some(1));
	scheduler.run_until(ms(60));
	assert_eq!(debounced.invoke("c"), Some(1));

	scheduler.run_until(ms(400));
	assert_eq!(*log.lock(), vec![(ms(0), "a")]);

	// The window has long closed; the next call opens a fresh one.
	assert_eq!(debounced.invoke("d"), Some(2));
	assert_eq!(*log.lock(), vec![(ms(0), "a"), (ms(400), "d")]);
}

#[test]
fn leading_and_trailing_invoke_twice_for_a_burst() {
	let config = DebounceConfig {
		leading: true,
		..DebounceConfig::with_wait(ms(100))
	};
	let (debounced, scheduler, _clock, log) = harness(config);

	assert_eq!(debounced.invoke("a"), Some(1));
	scheduler.run_until(ms(50));
	assert_eq!(debounced.invoke("b"), Some(1));

	scheduler.run_until(ms(300));
	assert_eq!(*log.lock(), vec![(ms(0), "a"), (ms(150), "b")]);
}

#[test]
fn leading_and_trailing_skip_trailing_for_a_single_call() {
	let config = DebounceConfig {
		leading: true,
		..DebounceConfig::with_wait(ms(100))
	};
	let (debounced, scheduler, _clock, log) = harness(config);

	assert_eq!(debounced.invoke("a"), Some(1));
	scheduler.run_until(ms(300));

	// The leading edge consumed the only call; nothing new to invoke.
	assert_eq!(*log.lock(), vec![(ms(0), "a")]);
	assert!(!debounced.pending());
}

#[test]
fn max_wait_bounds_deferral_under_continuous_calls() {
	let config = DebounceConfig {
		max_wait: Some(ms(200)),
		..DebounceConfig::with_wait(ms(100))
	};
	let (debounced, scheduler, _clock, log) = harness(config);

	let args = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9"];
	for (i, arg) in args.into_iter().enumerate() {
		scheduler.run_until(ms(50 * i as u64));
		debounced.invoke(arg);
	}
	scheduler.run_until(ms(600));

	assert_eq!(
		*log.lock(),
		vec![(ms(200), "c3"), (ms(400), "c7"), (ms(550), "c9")]
	);
}

#[test]
fn max_wait_smaller_than_wait_is_clamped_up() {
	let config = DebounceConfig {
		max_wait: Some(ms(10)),
		..DebounceConfig::with_wait(ms(100))
	};
	let (debounced, scheduler, _clock, log) = harness(config);

	for (i, arg) in ["c0", "c1", "c2", "c3"].into_iter().enumerate() {
		scheduler.run_until(ms(30 * i as u64));
		debounced.invoke(arg);
	}
	scheduler.run_until(ms(100));

	// An unclamped 10ms ceiling would have forced an invocation at t=30.
	assert_eq!(*log.lock(), vec![(ms(100), "c3")]);
}

#[test]
fn late_timer_with_ceiling_forces_inline_invocation() {
	let config = DebounceConfig {
		max_wait: Some(ms(300)),
		..DebounceConfig::with_wait(ms(100))
	};
	let (debounced, scheduler, clock, log) = harness(config);

	assert_eq!(debounced.invoke("a"), None);
	// The window expires without the timer having run yet.
	clock.set(ms(105));
	assert_eq!(debounced.invoke("b"), Some(1));
	assert_eq!(*log.lock(), vec![(ms(105), "b")]);
	assert!(debounced.pending());

	// The restarted window closes with nothing pending.
	scheduler.run_until(ms(400));
	assert_eq!(*log.lock(), vec![(ms(105), "b")]);
	assert_eq!(scheduler.scheduled(), 0);
}

#[test]
fn clock_regression_without_ceiling_falls_through() {
	let (debounced, scheduler, clock, log) = harness(DebounceConfig::with_wait(ms(100)));

	clock.set(ms(50));
	assert_eq!(debounced.invoke("a"), None);
	clock.set(ms(10));
	// Ready by the regression rule, but the window is open and there is no
	// ceiling: nothing is invoked and the timer stays live.
	assert_eq!(debounced.invoke("b"), None);
	assert_eq!(*log.lock(), vec![]);
	assert!(debounced.pending());

	scheduler.run_until(ms(150));
	assert_eq!(*log.lock(), vec![(ms(150), "b")]);
}

#[test]
fn cancel_drops_pending_call_and_timer() {
	let (debounced, scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(100)));

	debounced.invoke("a");
	assert!(debounced.pending());
	debounced.cancel();
	assert!(!debounced.pending());

	scheduler.run_until(ms(500));
	assert_eq!(*log.lock(), vec![]);
	assert_eq!(scheduler.scheduled(), 0);

	// The controller is reusable after cancellation.
	debounced.invoke("b");
	scheduler.run_until(ms(600));
	assert_eq!(*log.lock(), vec![(ms(600), "b")]);
}

#[test]
fn cancel_is_idempotent_and_keeps_the_result() {
	let (debounced, scheduler, _clock, _log) = harness(DebounceConfig::with_wait(ms(100)));

	debounced.invoke("a");
	scheduler.run_until(ms(100));
	assert_eq!(debounced.last_result(), Some(1));

	debounced.cancel();
	debounced.cancel();
	assert_eq!(debounced.last_result(), Some(1));
}

#[test]
fn flush_on_idle_controller_has_no_side_effects() {
	let (debounced, _scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(100)));

	assert_eq!(debounced.flush(), None);
	assert_eq!(*log.lock(), vec![]);
	assert!(!debounced.pending());
}

#[test]
fn flush_while_waiting_invokes_immediately() {
	let (debounced, scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(100)));

	debounced.invoke("a");
	assert_eq!(debounced.flush(), Some(1));
	assert_eq!(*log.lock(), vec![(ms(0), "a")]);
	assert!(!debounced.pending());
	assert_eq!(scheduler.scheduled(), 0);

	// Idempotent once idle.
	assert_eq!(debounced.flush(), Some(1));
	assert_eq!(*log.lock(), vec![(ms(0), "a")]);
}

#[test]
fn calls_that_do_not_invoke_return_the_memoized_result() {
	let (debounced, scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(100)));

	assert_eq!(debounced.invoke("a"), None);
	scheduler.run_until(ms(200));
	assert_eq!(*log.lock(), vec![(ms(100), "a")]);

	// Due again, but leading is disabled: the previous result comes back.
	assert_eq!(debounced.invoke("b"), Some(1));
	scheduler.run_until(ms(300));
	assert_eq!(debounced.last_result(), Some(2));
	assert_eq!(*log.lock(), vec![(ms(100), "a"), (ms(300), "b")]);
}

#[test]
fn cloned_handles_share_one_controller() {
	let (debounced, _scheduler, _clock, log) = harness(DebounceConfig::with_wait(ms(100)));
	let other = debounced.clone();

	debounced.invoke("a");
	assert!(other.pending());
	assert_eq!(other.flush(), Some(1));
	assert!(!debounced.pending());
	assert_eq!(*log.lock(), vec![(ms(0), "a")]);
}

#[test]
fn frame_sync_settles_bursts_on_the_next_frame_boundary() {
	let clock = ManualClock::new();
	let scheduler = ManualScheduler::frame(clock.clone(), ms(16));
	let (debounced, log) = build(DebounceConfig::default(), clock.clone(), scheduler.clone());

	clock.set(ms(2));
	debounced.invoke("a");
	clock.set(ms(10));
	debounced.invoke("b");
	scheduler.run_until(ms(16));
	assert_eq!(*log.lock(), vec![(ms(16), "b")]);
	assert!(!debounced.pending());

	clock.set(ms(20));
	debounced.invoke("c");
	scheduler.run_until(ms(48));
	assert_eq!(*log.lock(), vec![(ms(16), "b"), (ms(32), "c")]);
}

#[test]
fn throttle_invokes_on_both_edges_of_a_saturated_window() {
	let clock = ManualClock::new();
	let scheduler = ManualScheduler::new(clock.clone());
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&log);
	let reader = clock.clone();
	let throttled: Debounced<&'static str, usize> = Debounced::throttled(
		move |arg| {
			let mut entries = sink.lock();
			entries.push((reader.now(), arg));
			entries.len()
		},
		Some(ms(100)),
		ThrottleConfig::default(),
		Arc::new(clock.clone()),
		Arc::new(scheduler.clone()),
	);

	for (i, arg) in ["c0", "c1", "c2", "c3"].into_iter().enumerate() {
		scheduler.run_until(ms(30 * i as u64));
		throttled.invoke(arg);
	}
	scheduler.run_until(ms(300));

	// Leading invocation at t=0, trailing forced at the window boundary
	// with the most recent arguments.
	assert_eq!(*log.lock(), vec![(ms(0), "c0"), (ms(100), "c3")]);
}

#[test]
fn throttle_never_gaps_longer_than_the_window() {
	let clock = ManualClock::new();
	let scheduler = ManualScheduler::new(clock.clone());
	let log: Log = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&log);
	let reader = clock.clone();
	let throttled: Debounced<&'static str, usize> = Debounced::throttled(
		move |arg| {
			let mut entries = sink.lock();
			entries.push((reader.now(), arg));
			entries.len()
		},
		Some(ms(100)),
		ThrottleConfig::default(),
		Arc::new(clock.clone()),
		Arc::new(scheduler.clone()),
	);

	for i in 0..10u64 {
		scheduler.run_until(ms(50 * i));
		throttled.invoke("x");
	}
	scheduler.run_until(ms(800));

	let times: Vec<Duration> = log.lock().iter().map(|(at, _)| *at).collect();
	assert!(!times.is_empty());
	for pair in times.windows(2) {
		assert!(pair[1] - pair[0] <= ms(100), "gap exceeded window: {pair:?}");
	}
}
