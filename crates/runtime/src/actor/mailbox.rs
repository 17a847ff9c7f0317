// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Mailboxes and actor references.

use std::{fmt, sync::Arc};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use parking_lot::RwLock;

use crate::{
	actor::shared::{ActorId, ActorShared},
	error::SendError,
};

/// Delivery priority of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
	#[default]
	Normal,
	High,
}

/// A unit of work dequeued from a mailbox.
pub enum Envelope<M> {
	Message {
		message: M,
		priority: Priority,
	},
	/// Request to terminate, delivered like any other message.
	Exit,
}

impl<M> Envelope<M> {
	pub fn new(message: M) -> Self {
		Self::with_priority(message, Priority::Normal)
	}

	pub fn with_priority(message: M, priority: Priority) -> Self {
		Envelope::Message {
			message,
			priority,
		}
	}

	/// Exit never overtakes anything, so it reports normal priority.
	pub fn priority(&self) -> Priority {
		match self {
			Envelope::Message {
				priority,
				..
			} => *priority,
			Envelope::Exit => Priority::Normal,
		}
	}

	pub fn message(&self) -> Option<&M> {
		match self {
			Envelope::Message {
				message,
				..
			} => Some(message),
			Envelope::Exit => None,
		}
	}

	pub fn into_message(self) -> Option<M> {
		match self {
			Envelope::Message {
				message,
				..
			} => Some(message),
			Envelope::Exit => None,
		}
	}

	pub fn is_exit(&self) -> bool {
		matches!(self, Envelope::Exit)
	}
}

impl<M: fmt::Debug> fmt::Debug for Envelope<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Envelope::Message {
				message,
				priority,
			} => f.debug_struct("Message").field("message", message).field("priority", priority).finish(),
			Envelope::Exit => f.write_str("Exit"),
		}
	}
}

/// The two mailbox operations the execution core relies on.
pub trait MailboxFacade<M> {
	/// Non-blocking dequeue.
	fn try_pop(&self) -> Option<Envelope<M>>;

	/// Best-effort hint that a `try_pop` may still yield something.
	fn can_fetch_more(&self) -> bool;
}

/// Why a mailbox refused an envelope.
#[derive(Debug)]
pub enum PushError<M> {
	/// The bounded queue is at capacity.
	Full(Envelope<M>),
	/// An exit request is pending, nothing else is accepted until it is taken.
	ExitPending(Envelope<M>),
}

impl<M> PushError<M> {
	pub fn into_envelope(self) -> Envelope<M> {
		match self {
			PushError::Full(envelope) | PushError::ExitPending(envelope) => envelope,
		}
	}
}

/// Multi-producer, single-consumer FIFO mailbox.
///
/// An exit request does not take a queue slot, so it gets through a full
/// mailbox. It is still handed out by [`try_pop`](MailboxFacade::try_pop) only
/// after every message accepted before it. Pushes are refused while it is
/// pending.
pub struct Mailbox<M> {
	tx: Sender<Envelope<M>>,
	rx: Receiver<Envelope<M>>,
	// writers hold this while raising the flag, pushers while enqueueing
	exit: RwLock<bool>,
}

impl<M> Mailbox<M> {
	/// Creates a mailbox. A capacity of 0 means unbounded.
	pub fn new(capacity: usize) -> Self {
		let (tx, rx) = if capacity == 0 {
			unbounded()
		} else {
			bounded(capacity)
		};

		Self {
			tx,
			rx,
			exit: RwLock::new(false),
		}
	}

	/// Enqueues an envelope, handing it back when it cannot be accepted.
	pub fn push(&self, envelope: Envelope<M>) -> Result<(), PushError<M>> {
		if envelope.is_exit() {
			*self.exit.write() = true;
			return Ok(());
		}

		let exit = self.exit.read();
		if *exit {
			return Err(PushError::ExitPending(envelope));
		}
		self.tx.try_send(envelope).map_err(|err| match err {
			TrySendError::Full(envelope) | TrySendError::Disconnected(envelope) => PushError::Full(envelope),
		})
	}

	/// Whether an exit request is waiting to be taken.
	pub fn exit_pending(&self) -> bool {
		*self.exit.read()
	}

	pub fn len(&self) -> usize {
		self.rx.len() + usize::from(self.exit_pending())
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<M> MailboxFacade<M> for Mailbox<M> {
	fn try_pop(&self) -> Option<Envelope<M>> {
		if let Ok(envelope) = self.rx.try_recv() {
			return Some(envelope);
		}
		if !self.exit_pending() {
			return None;
		}

		// every push accepted before the flag went up is visible by now
		let mut exit = self.exit.write();
		match self.rx.try_recv() {
			Ok(envelope) => Some(envelope),
			Err(_) => {
				*exit = false;
				Some(Envelope::Exit)
			}
		}
	}

	fn can_fetch_more(&self) -> bool {
		!self.rx.is_empty() || self.exit_pending()
	}
}

/// Implemented by composed actors to let references enqueue and re-arm them.
pub(crate) trait Deliver<M>: Send + Sync {
	fn shared(&self) -> &ActorShared<M>;

	/// Hands a freshly woken actor back to its execution resource.
	fn rearm(&self);
}

/// A handle for sending messages to an actor.
///
/// Sending performs the re-arm half of the blocking protocol: when the push
/// moves the actor out of `blocked`, the actor is rescheduled.
pub struct ActorRef<M> {
	inner: Arc<dyn Deliver<M>>,
}

impl<M: Send + 'static> ActorRef<M> {
	pub(crate) fn new(inner: Arc<dyn Deliver<M>>) -> Self {
		Self {
			inner,
		}
	}

	pub fn id(&self) -> ActorId {
		self.inner.shared().id()
	}

	pub fn name(&self) -> &str {
		self.inner.shared().name()
	}

	/// Send a message with normal priority.
	pub fn send(&self, msg: M) -> Result<(), SendError<M>> {
		self.send_with_priority(msg, Priority::Normal)
	}

	pub fn send_with_priority(&self, msg: M, priority: Priority) -> Result<(), SendError<M>> {
		let shared = self.inner.shared();
		if shared.state().is_done() {
			return Err(SendError::Terminated(msg));
		}

		match shared.enqueue(Envelope::with_priority(msg, priority)) {
			Ok(true) => {
				self.inner.rearm();
				Ok(())
			}
			Ok(false) => Ok(()),
			Err(PushError::Full(envelope)) => envelope.into_message().map_or(Ok(()), |msg| Err(SendError::Full(msg))),
			Err(PushError::ExitPending(envelope)) => {
				envelope.into_message().map_or(Ok(()), |msg| Err(SendError::Terminated(msg)))
			}
		}
	}

	/// Ask the actor to terminate. Returns `false` if it already finished.
	///
	/// Messages already accepted are handled first. Sends are refused with
	/// [`SendError::Terminated`] until the actor has taken the request.
	pub fn stop(&self) -> bool {
		let shared = self.inner.shared();
		if shared.state().is_done() {
			return false;
		}
		if let Ok(true) = shared.enqueue(Envelope::Exit) {
			self.inner.rearm();
		}
		true
	}

	pub fn is_terminated(&self) -> bool {
		self.inner.shared().state().is_done()
	}

	/// Number of envelopes waiting in the mailbox.
	pub fn pending(&self) -> usize {
		self.inner.shared().mailbox().len()
	}
}

impl<M> Clone for ActorRef<M> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<M> fmt::Debug for ActorRef<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let shared = self.inner.shared();
		f.debug_struct("ActorRef").field("id", &shared.id()).field("name", &shared.name()).finish()
	}
}
