use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

/// Live registrations for a tokio-backed scheduler.
#[derive(Default)]
pub(crate) struct TimerRegistry {
	next_id: u64,
	tokens: HashMap<u64, CancellationToken>,
}

impl TimerRegistry {
	/// Allocates an id and a cancellation token for a new registration.
	pub(crate) fn insert(&mut self) -> (u64, CancellationToken) {
		self.next_id += 1;
		let token = CancellationToken::new();
		self.tokens.insert(self.next_id, token.clone());
		(self.next_id, token)
	}

	/// Marks a registration as fired.
	pub(crate) fn complete(&mut self, id: u64) {
		self.tokens.remove(&id);
	}

	/// Cancels a registration. No-op when the id is not live.
	pub(crate) fn cancel(&mut self, id: u64) {
		if let Some(token) = self.tokens.remove(&id) {
			token.cancel();
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.tokens.len()
	}
}
