// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Actor run state.
//!
//! ```text
//! ready ──> about_to_block ──> blocked
//!   ^             │               │
//!   └─────────────┴───────────────┘   (enqueue / race lost)
//! ready ──> done                       (terminal)
//! ```
//!
//! The actor itself moves `ready → about_to_block`, `about_to_block → blocked`
//! and `ready → done`. Enqueuers move `about_to_block → ready` and
//! `blocked → ready`; only the latter obliges them to reschedule the actor.

use std::sync::atomic::{AtomicU8, Ordering, fence};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
	/// Eligible to run or currently running.
	Ready = 0,
	/// Transient: mailbox looked empty, final check pending.
	AboutToBlock = 1,
	/// Sleeping until an enqueue re-arms the actor.
	Blocked = 2,
	/// Terminal.
	Done = 3,
}

impl ActorState {
	fn from_u8(value: u8) -> Self {
		match value {
			0 => ActorState::Ready,
			1 => ActorState::AboutToBlock,
			2 => ActorState::Blocked,
			3 => ActorState::Done,
			other => fatal!("corrupted actor state {other}"),
		}
	}
}

/// [`ActorState`] stored behind an atomic so enqueuers can race the actor.
#[derive(Debug)]
pub struct AtomicActorState {
	inner: AtomicU8,
}

impl AtomicActorState {
	pub fn new() -> Self {
		Self {
			inner: AtomicU8::new(ActorState::Ready as u8),
		}
	}

	pub fn load(&self) -> ActorState {
		ActorState::from_u8(self.inner.load(Ordering::SeqCst))
	}

	pub fn is_done(&self) -> bool {
		self.load() == ActorState::Done
	}

	/// Returns the previous state on success, the observed state on failure.
	pub fn compare_exchange(&self, current: ActorState, new: ActorState) -> Result<ActorState, ActorState> {
		self.inner
			.compare_exchange(current as u8, new as u8, Ordering::SeqCst, Ordering::SeqCst)
			.map(ActorState::from_u8)
			.map_err(ActorState::from_u8)
	}

	/// `ready → about_to_block`. Only the running actor calls this.
	pub fn prepare_block(&self) {
		let previous = ActorState::from_u8(self.inner.swap(ActorState::AboutToBlock as u8, Ordering::SeqCst));
		if previous != ActorState::Ready {
			fatal!("actor moved to about_to_block from {previous:?}");
		}
		// pairs with the fence in `ActorShared::enqueue`
		fence(Ordering::SeqCst);
	}

	/// Backs out of `about_to_block` after the final mailbox check found work.
	pub fn cancel_block(&self) {
		// a concurrent enqueue may already have flipped us back
		let _ = self.compare_exchange(ActorState::AboutToBlock, ActorState::Ready);
	}

	/// `about_to_block → blocked`.
	///
	/// Returns [`ActorState::Blocked`] when the transition happened, otherwise
	/// the state observed instead. [`ActorState::Ready`] means an enqueue won the
	/// race and the actor must look at its mailbox again; anything else is a
	/// contract violation left to the caller to report.
	pub fn try_block(&self) -> ActorState {
		match self.compare_exchange(ActorState::AboutToBlock, ActorState::Blocked) {
			Ok(_) => ActorState::Blocked,
			Err(observed) => observed,
		}
	}

	/// Re-arm path taken by enqueuers after pushing a message.
	///
	/// Returns `true` when this call moved the actor out of `blocked`, in which
	/// case the caller must hand the actor back to its execution resource.
	pub fn wake(&self) -> bool {
		let mut current = self.load();
		loop {
			match current {
				ActorState::Ready | ActorState::Done => return false,
				ActorState::AboutToBlock | ActorState::Blocked => {
					match self.compare_exchange(current, ActorState::Ready) {
						Ok(previous) => return previous == ActorState::Blocked,
						Err(observed) => current = observed,
					}
				}
			}
		}
	}

	/// `ready → done`, exactly once.
	pub fn finish(&self) {
		let previous = ActorState::from_u8(self.inner.swap(ActorState::Done as u8, Ordering::SeqCst));
		if previous != ActorState::Ready {
			fatal!("actor finished from {previous:?}");
		}
	}
}

impl Default for AtomicActorState {
	fn default() -> Self {
		Self::new()
	}
}
