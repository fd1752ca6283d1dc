use std::time::Duration;

/// Timing and edge policy for a debounced operation.
///
/// `wait: None` requests frame-sync pacing when the scheduler supports it;
/// the effective window is then zero and each burst settles on the next
/// frame boundary. A configured `max_wait` smaller than `wait` is clamped up
/// to `wait` at construction.
#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
	/// Coalescing window. `None` defers to frame pacing where available.
	pub wait: Option<Duration>,
	/// Invoke on the first call of a burst.
	pub leading: bool,
	/// Invoke with the most recent call once the window closes.
	pub trailing: bool,
	/// Ceiling on total deferral while calls keep resetting the window.
	pub max_wait: Option<Duration>,
}

impl Default for DebounceConfig {
	fn default() -> Self {
		Self {
			wait: None,
			leading: false,
			trailing: true,
			max_wait: None,
		}
	}
}

impl DebounceConfig {
	/// Fixed-window configuration with the default edge policy.
	pub fn with_wait(wait: Duration) -> Self {
		Self {
			wait: Some(wait),
			..Self::default()
		}
	}
}

/// Edge policy for a throttled operation.
///
/// Throttling is a debounce preset: both edges default to enabled and the
/// deferral ceiling is pinned to the window, which forces an invocation at
/// every window boundary.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
	/// Invoke on the first call of a burst.
	pub leading: bool,
	/// Invoke with the most recent call once the window closes.
	pub trailing: bool,
}

impl Default for ThrottleConfig {
	fn default() -> Self {
		Self {
			leading: true,
			trailing: true,
		}
	}
}

impl ThrottleConfig {
	pub(crate) fn into_debounce(self, wait: Option<Duration>) -> DebounceConfig {
		DebounceConfig {
			wait,
			leading: self.leading,
			trailing: self.trailing,
			max_wait: Some(wait.unwrap_or_default()),
		}
	}
}
