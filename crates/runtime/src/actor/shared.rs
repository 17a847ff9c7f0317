// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! State shared between an actor and everyone holding a reference to it.

use std::{
	fmt,
	sync::atomic::{Ordering, fence},
};

use parking_lot::{Condvar, Mutex};

use crate::actor::{
	mailbox::{Envelope, Mailbox, PushError},
	state::{ActorState, AtomicActorState},
};

/// Identifier of a spawned actor, unique within one actor system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(u64);

impl ActorId {
	pub const fn new(id: u64) -> Self {
		Self(id)
	}

	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// The mailbox and run state of one actor.
pub struct ActorShared<M> {
	id: ActorId,
	name: String,
	mailbox: Mailbox<M>,
	state: AtomicActorState,
	parker: Parker,
}

impl<M> ActorShared<M> {
	pub(crate) fn new(id: ActorId, name: String, mailbox_capacity: usize) -> Self {
		Self {
			id,
			name,
			mailbox: Mailbox::new(mailbox_capacity),
			state: AtomicActorState::new(),
			parker: Parker::new(),
		}
	}

	pub fn id(&self) -> ActorId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn mailbox(&self) -> &Mailbox<M> {
		&self.mailbox
	}

	pub fn state(&self) -> &AtomicActorState {
		&self.state
	}

	pub(crate) fn parker(&self) -> &Parker {
		&self.parker
	}

	/// Pushes an envelope and re-arms the actor if it went to sleep.
	///
	/// Returns `Ok(true)` when the actor moved from `blocked` to `ready` and has
	/// to be handed back to its execution resource by the caller.
	pub(crate) fn enqueue(&self, envelope: Envelope<M>) -> Result<bool, PushError<M>> {
		self.mailbox.push(envelope)?;
		// pairs with the fence in `AtomicActorState::prepare_block`
		fence(Ordering::SeqCst);
		Ok(self.state.wake())
	}
}

/// Parks a dedicated thread while its actor is blocked.
pub(crate) struct Parker {
	lock: Mutex<()>,
	cond: Condvar,
}

impl Parker {
	fn new() -> Self {
		Self {
			lock: Mutex::new(()),
			cond: Condvar::new(),
		}
	}

	pub(crate) fn park_while_blocked(&self, state: &AtomicActorState) {
		let mut guard = self.lock.lock();
		while state.load() == ActorState::Blocked {
			self.cond.wait(&mut guard);
		}
	}

	pub(crate) fn unpark(&self) {
		let _guard = self.lock.lock();
		self.cond.notify_all();
	}
}
