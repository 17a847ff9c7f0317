// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Actor execution context.
//!
//! The context provides actors with access to:
//! - Their own identity and a reference for receiving messages
//! - Cooperative yielding
//! - Nested synchronous receive (nestable actors only)

use std::ops::ControlFlow;

use crate::{
	actor::{
		fetch::{FetchSource, fetch_messages},
		fiber::{Suspend, YieldReason},
		mailbox::{ActorRef, Envelope},
		shared::ActorId,
	},
	error::ReceiveError,
};

/// What a context needs from the actor it belongs to.
///
/// Fetching through this trait bypasses the stash: a nested receive only ever
/// looks at mailbox content it has not inspected yet.
pub(crate) trait Plumb<M>: FetchSource<M> {
	fn id(&self) -> ActorId;

	fn name(&self) -> &str;

	fn self_ref(&self) -> Option<ActorRef<M>>;

	fn nestable(&self) -> bool;

	/// Sets an envelope aside for redelivery after the nested receive.
	fn stash(&mut self, envelope: Envelope<M>);

	fn stashed_exit(&self) -> bool;

	fn take_stashed(&mut self, filter: &mut dyn FnMut(&M) -> bool) -> Option<M>;
}

/// Context provided to actors during execution.
pub struct Context<'a, M> {
	plumbing: &'a mut dyn Plumb<M>,
	suspender: &'a mut dyn Suspend,
}

impl<'a, M: Send + 'static> Context<'a, M> {
	pub(crate) fn new(plumbing: &'a mut dyn Plumb<M>, suspender: &'a mut dyn Suspend) -> Self {
		Self {
			plumbing,
			suspender,
		}
	}

	pub fn id(&self) -> ActorId {
		self.plumbing.id()
	}

	pub fn name(&self) -> &str {
		self.plumbing.name()
	}

	/// Get a reference to send messages to self.
	///
	/// `None` once every external reference is gone and the actor is being
	/// torn down.
	pub fn self_ref(&self) -> Option<ActorRef<M>> {
		self.plumbing.self_ref()
	}

	/// Whether [`receive`](Self::receive) is available to this actor.
	pub fn is_nestable(&self) -> bool {
		self.plumbing.nestable()
	}

	/// Give up the worker between two messages.
	///
	/// Context-switching actors suspend with reason `ready`; dedicated actors
	/// yield their thread. Event-based actors run to the end of their batch
	/// anyway, so this is a no-op for them.
	pub fn yield_now(&mut self) {
		self.suspender.suspend(YieldReason::Ready);
	}

	/// Waits for the first message accepted by `filter`.
	///
	/// Messages rejected by `filter` are kept and handed to
	/// [`Actor::handle`](crate::Actor::handle) afterwards, in arrival order and
	/// before anything newer. A termination request arriving in the meantime
	/// aborts the wait with [`ReceiveError::Terminated`]. It stays in arrival
	/// order too: once the handler returns, the messages kept ahead of it are
	/// handled first, then [`Actor::on_exit`](crate::Actor::on_exit) runs.
	pub fn receive<F>(&mut self, mut filter: F) -> Result<M, ReceiveError>
	where
		F: FnMut(&M) -> bool,
	{
		if !self.plumbing.nestable() {
			return Err(ReceiveError::NotNestable);
		}
		if self.plumbing.stashed_exit() {
			return Err(ReceiveError::Terminated);
		}
		if let Some(message) = self.plumbing.take_stashed(&mut filter) {
			return Ok(message);
		}

		loop {
			let mut outcome = None;
			let _ = fetch_messages(&mut *self.plumbing, &mut *self.suspender, |plumbing, _, envelope| {
				match envelope {
					Envelope::Message {
						message,
						..
					} if filter(&message) => {
						outcome = Some(Ok(message));
						ControlFlow::Break(())
					}
					Envelope::Exit => {
						plumbing.stash(Envelope::Exit);
						outcome = Some(Err(ReceiveError::Terminated));
						ControlFlow::Break(())
					}
					other => {
						plumbing.stash(other);
						ControlFlow::Continue(())
					}
				}
			});

			if let Some(outcome) = outcome {
				return outcome;
			}
		}
	}
}
