// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::actor::shared::ActorId;

/// Type-erased handle used to terminate actors during shutdown.
pub(crate) trait Terminate: Send + Sync {
	fn id(&self) -> ActorId;

	fn name(&self) -> &str;

	/// Delivers the termination signal. `false` if the actor already finished.
	fn terminate(&self) -> bool;
}

/// Live actors of one system.
///
/// Entries are weak: an actor nobody can reach any more is dropped and
/// removes itself.
#[derive(Default)]
pub(crate) struct Registry {
	actors: DashMap<ActorId, Weak<dyn Terminate>>,
}

impl Registry {
	pub(crate) fn insert(&self, id: ActorId, actor: Weak<dyn Terminate>) {
		self.actors.insert(id, actor);
	}

	pub(crate) fn remove(&self, id: ActorId) {
		self.actors.remove(&id);
	}

	pub(crate) fn len(&self) -> usize {
		self.actors.len()
	}

	pub(crate) fn live(&self) -> Vec<Arc<dyn Terminate>> {
		self.actors.iter().filter_map(|entry| entry.value().upgrade()).collect()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, Ordering};

	use super::*;

	struct Stub {
		id: ActorId,
		terminated: AtomicBool,
	}

	impl Terminate for Stub {
		fn id(&self) -> ActorId {
			self.id
		}

		fn name(&self) -> &str {
			"stub"
		}

		fn terminate(&self) -> bool {
			!self.terminated.swap(true, Ordering::SeqCst)
		}
	}

	#[test]
	fn test_live_skips_dropped_actors() {
		let registry = Registry::default();
		let kept = Arc::new(Stub {
			id: ActorId::new(1),
			terminated: AtomicBool::new(false),
		});
		let dropped = Arc::new(Stub {
			id: ActorId::new(2),
			terminated: AtomicBool::new(false),
		});

		let weak = Arc::downgrade(&kept);
		registry.insert(kept.id, weak);
		let weak = Arc::downgrade(&dropped);
		registry.insert(dropped.id, weak);
		drop(dropped);

		let live = registry.live();
		assert_eq!(live.len(), 1);
		assert_eq!(live[0].id(), ActorId::new(1));
		assert!(live[0].terminate());
		assert!(!live[0].terminate());

		registry.remove(ActorId::new(1));
		registry.remove(ActorId::new(2));
		assert_eq!(registry.len(), 0);
	}
}
