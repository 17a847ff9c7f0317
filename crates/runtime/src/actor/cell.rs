// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Binds an [`Actor`] behavior to its mailbox and invocation policies.
//!
//! The cell is driven in one of two ways:
//! - [`ActorCell::run`] is a trampoline for suspendable execution: it loops
//!   through [`fetch_messages`] and only returns once the actor is done
//! - [`ActorCell::resume_event`] drains the mailbox with
//!   [`try_fetch_messages`] and performs the blocking exchange itself

use std::{
	ops::ControlFlow,
	sync::{Arc, Weak},
};

use tracing::debug;

use crate::{
	actor::{
		context::{Context, Plumb},
		fetch::{FetchSource, fetch_messages, try_fetch_messages},
		fiber::{Suspend, YieldReason},
		mailbox::{ActorRef, Deliver, Envelope, MailboxFacade},
		shared::{ActorId, ActorShared},
		state::{ActorState, AtomicActorState},
		traits::{Actor, Flow},
	},
	policy::{InvokeKind, ResumeResult, invoke::InvokePolicy, priority::PriorityPolicy},
};

/// Suspender for code that must never suspend.
///
/// Yielding is a no-op. Blocking is reported by
/// [`ActorCell::resume_event`] instead, never through this path.
pub(crate) struct NoSuspend;

impl Suspend for NoSuspend {
	fn suspend(&mut self, reason: YieldReason) {
		if reason != YieldReason::Ready {
			fatal!("event-based actor tried to suspend with {reason:?}");
		}
	}
}

pub(crate) struct Plumbing<M, P, I> {
	shared: Arc<ActorShared<M>>,
	this: Weak<dyn Deliver<M>>,
	priority: P,
	invoke: I,
}

impl<M, P, I> FetchSource<M> for Plumbing<M, P, I>
where
	P: PriorityPolicy<M>,
{
	fn try_pop(&mut self) -> Option<Envelope<M>> {
		self.priority.next_message(self.shared.mailbox())
	}

	fn can_fetch_more(&self) -> bool {
		self.priority.has_cached() || self.shared.mailbox().can_fetch_more()
	}

	fn state(&self) -> &AtomicActorState {
		self.shared.state()
	}
}

impl<M, P, I> Plumb<M> for Plumbing<M, P, I>
where
	M: Send + 'static,
	P: PriorityPolicy<M>,
	I: InvokePolicy<M>,
{
	fn id(&self) -> ActorId {
		self.shared.id()
	}

	fn name(&self) -> &str {
		self.shared.name()
	}

	fn self_ref(&self) -> Option<ActorRef<M>> {
		self.this.upgrade().map(ActorRef::new)
	}

	fn nestable(&self) -> bool {
		I::KIND == InvokeKind::Nestable
	}

	fn stash(&mut self, envelope: Envelope<M>) {
		self.invoke.stash(envelope);
	}

	fn stashed_exit(&self) -> bool {
		self.invoke.stashed_exit()
	}

	fn take_stashed(&mut self, filter: &mut dyn FnMut(&M) -> bool) -> Option<M> {
		self.invoke.take_matching(filter)
	}
}

pub(crate) struct ActorCell<A: Actor, P, I> {
	actor: A,
	state: Option<A::State>,
	plumbing: Plumbing<A::Message, P, I>,
	finished: bool,
}

impl<A, P, I> ActorCell<A, P, I>
where
	A: Actor,
	P: PriorityPolicy<A::Message>,
	I: InvokePolicy<A::Message>,
{
	pub(crate) fn new(actor: A, shared: Arc<ActorShared<A::Message>>, this: Weak<dyn Deliver<A::Message>>) -> Self {
		Self {
			actor,
			state: None,
			plumbing: Plumbing {
				shared,
				this,
				priority: P::default(),
				invoke: I::default(),
			},
			finished: false,
		}
	}

	fn id(&self) -> ActorId {
		self.plumbing.shared.id()
	}

	fn start(&mut self, suspender: &mut dyn Suspend) -> Flow {
		debug!(actor = %self.id(), name = self.plumbing.shared.name(), "actor starting");
		let Self {
			actor,
			state,
			plumbing,
			..
		} = self;

		let mut ctx = Context::new(plumbing, suspender);
		let mut initial = actor.init(&mut ctx);
		let flow = actor.pre_start(&mut initial, &mut ctx);
		*state = Some(initial);
		flow
	}

	fn invoke(&mut self, envelope: Envelope<A::Message>, suspender: &mut dyn Suspend) -> Flow {
		let Self {
			actor,
			state,
			plumbing,
			..
		} = self;
		let Some(state) = state.as_mut() else {
			fatal!("actor {} invoked before start", plumbing.shared.id());
		};

		let mut ctx = Context::new(plumbing, suspender);
		match envelope {
			Envelope::Message {
				message,
				..
			} => actor.handle(state, message, &mut ctx),
			Envelope::Exit => actor.on_exit(state, &mut ctx),
		}
	}

	fn idle(&mut self, suspender: &mut dyn Suspend) -> Flow {
		let Self {
			actor,
			state,
			plumbing,
			..
		} = self;
		let Some(state) = state.as_mut() else {
			fatal!("actor {} idled before start", plumbing.shared.id());
		};

		let mut ctx = Context::new(plumbing, suspender);
		actor.idle(state, &mut ctx)
	}

	fn finish(&mut self) {
		if let Some(state) = self.state.as_mut() {
			self.actor.post_stop(state);
		}
		self.finished = true;
		self.plumbing.shared.state().finish();
		debug!(actor = %self.id(), "actor finished");
	}

	/// Trampoline for suspendable execution. Returns once the actor is done.
	pub(crate) fn run(mut self, suspender: &mut dyn Suspend) -> YieldReason {
		if self.start(&mut *suspender) == Flow::Stop {
			self.finish();
			return YieldReason::Done;
		}

		loop {
			if !self.can_fetch_more() {
				match self.idle(&mut *suspender) {
					Flow::Stop => break,
					Flow::Yield => {
						suspender.suspend(YieldReason::Ready);
						continue;
					}
					Flow::Continue => continue,
					Flow::Park => {}
				}
			}

			let flow = fetch_messages(&mut self, &mut *suspender, |cell, suspender, envelope| {
				match cell.invoke(envelope, &mut *suspender) {
					Flow::Stop => ControlFlow::Break(()),
					Flow::Yield => {
						suspender.suspend(YieldReason::Ready);
						ControlFlow::Continue(())
					}
					Flow::Continue | Flow::Park => ControlFlow::Continue(()),
				}
			});
			if flow.is_break() {
				break;
			}
		}

		self.finish();
		YieldReason::Done
	}

	/// One event-based resume: drain, then either finish or go to sleep.
	pub(crate) fn resume_event(&mut self) -> ResumeResult {
		if self.finished {
			fatal!("actor {} resumed after completion", self.id());
		}

		if self.state.is_none() && self.start(&mut NoSuspend) == Flow::Stop {
			self.finish();
			return ResumeResult::ActorDone;
		}

		loop {
			let flow = try_fetch_messages(&mut *self, |cell, envelope| match cell.invoke(envelope, &mut NoSuspend) {
				Flow::Stop => ControlFlow::Break(()),
				Flow::Continue | Flow::Yield | Flow::Park => ControlFlow::Continue(()),
			});
			if flow.is_break() || self.idle(&mut NoSuspend) == Flow::Stop {
				self.finish();
				return ResumeResult::ActorDone;
			}

			let state = self.plumbing.shared.state();
			state.prepare_block();
			if self.can_fetch_more() {
				state.cancel_block();
				continue;
			}

			match state.try_block() {
				ActorState::Blocked => return ResumeResult::ActorBlocked,
				ActorState::Ready => continue,
				other => fatal!("actor {} observed {other:?} while blocking", self.id()),
			}
		}
	}
}

impl<A, P, I> FetchSource<A::Message> for ActorCell<A, P, I>
where
	A: Actor,
	P: PriorityPolicy<A::Message>,
	I: InvokePolicy<A::Message>,
{
	fn try_pop(&mut self) -> Option<Envelope<A::Message>> {
		match self.plumbing.invoke.unstash() {
			Some(envelope) => Some(envelope),
			None => self.plumbing.try_pop(),
		}
	}

	fn can_fetch_more(&self) -> bool {
		self.plumbing.invoke.has_stashed() || self.plumbing.can_fetch_more()
	}

	fn state(&self) -> &AtomicActorState {
		self.plumbing.shared.state()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::sync::{Arc, Mutex, Weak};

	use super::*;
	use crate::{
		actor::{fiber::ExecutionContext, mailbox::Deliver},
		policy::{invoke::Sequential, priority::NotPrioritizing},
	};

	/// Logs every hook it sees and stops on `0`.
	pub(crate) struct Scripted {
		pub(crate) log: Arc<Mutex<Vec<String>>>,
	}

	impl Actor for Scripted {
		type State = ();
		type Message = u32;

		fn init(&self, _ctx: &mut Context<'_, u32>) -> Self::State {
			self.log.lock().unwrap().push("init".into());
		}

		fn handle(&self, _state: &mut (), msg: u32, _ctx: &mut Context<'_, u32>) -> Flow {
			self.log.lock().unwrap().push(format!("handle {msg}"));
			if msg == 0 {
				Flow::Stop
			} else {
				Flow::Continue
			}
		}

		fn post_stop(&self, _state: &mut ()) {
			self.log.lock().unwrap().push("post_stop".into());
		}
	}

	pub(crate) fn detached_shared() -> (Arc<ActorShared<u32>>, Weak<dyn Deliver<u32>>) {
		struct Nobody;
		impl Deliver<u32> for Nobody {
			fn shared(&self) -> &ActorShared<u32> {
				unreachable!()
			}

			fn rearm(&self) {}
		}

		let shared = Arc::new(ActorShared::new(ActorId::new(1), "scripted".into(), 0));
		let this: Weak<dyn Deliver<u32>> = Weak::<Nobody>::new();
		(shared, this)
	}

	fn event_cell() -> (ActorCell<Scripted, NotPrioritizing, Sequential>, Arc<ActorShared<u32>>, Arc<Mutex<Vec<String>>>) {
		let log = Arc::new(Mutex::new(Vec::new()));
		let (shared, this) = detached_shared();
		let cell = ActorCell::new(
			Scripted {
				log: log.clone(),
			},
			shared.clone(),
			this,
		);
		(cell, shared, log)
	}

	#[test]
	fn test_event_resume_with_empty_mailbox_blocks() {
		let (mut cell, shared, log) = event_cell();

		assert_eq!(cell.resume_event(), ResumeResult::ActorBlocked);
		assert_eq!(shared.state().load(), ActorState::Blocked);
		assert_eq!(*log.lock().unwrap(), vec!["init"]);
	}

	#[test]
	fn test_event_resume_drains_then_blocks() {
		let (mut cell, shared, log) = event_cell();
		shared.enqueue(Envelope::new(1)).ok();
		shared.enqueue(Envelope::new(2)).ok();

		assert_eq!(cell.resume_event(), ResumeResult::ActorBlocked);
		assert_eq!(*log.lock().unwrap(), vec!["init", "handle 1", "handle 2"]);

		assert_eq!(shared.enqueue(Envelope::new(3)).ok(), Some(true));
		assert_eq!(cell.resume_event(), ResumeResult::ActorBlocked);
		assert_eq!(log.lock().unwrap().last().map(String::as_str), Some("handle 3"));
	}

	#[test]
	fn test_event_resume_stop_finishes() {
		let (mut cell, shared, log) = event_cell();
		shared.enqueue(Envelope::new(0)).ok();
		shared.enqueue(Envelope::new(5)).ok();

		assert_eq!(cell.resume_event(), ResumeResult::ActorDone);
		assert!(shared.state().is_done());
		assert_eq!(*log.lock().unwrap(), vec!["init", "handle 0", "post_stop"]);
	}

	#[test]
	fn test_exit_runs_on_exit_and_stops() {
		let (mut cell, shared, log) = event_cell();
		shared.enqueue(Envelope::new(1)).ok();
		shared.enqueue(Envelope::Exit).ok();

		assert_eq!(cell.resume_event(), ResumeResult::ActorDone);
		// messages accepted before the exit are handled first
		assert_eq!(*log.lock().unwrap(), vec!["init", "handle 1", "post_stop"]);
	}

	#[test]
	fn test_trampoline_completes_inside_context() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let (shared, this) = detached_shared();
		let cell: ActorCell<Scripted, NotPrioritizing, Sequential> = ActorCell::new(
			Scripted {
				log: log.clone(),
			},
			shared.clone(),
			this,
		);
		shared.enqueue(Envelope::new(4)).ok();
		shared.enqueue(Envelope::new(0)).ok();

		let mut ctx = ExecutionContext::new(ExecutionContext::DEFAULT_STACK_SIZE, move |suspender| cell.run(suspender));
		assert_eq!(ctx.enter(), YieldReason::Done);
		assert_eq!(*log.lock().unwrap(), vec!["init", "handle 4", "handle 0", "post_stop"]);
	}

	#[test]
	fn test_trampoline_suspends_blocked_on_empty_mailbox() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let (shared, this) = detached_shared();
		let cell: ActorCell<Scripted, NotPrioritizing, Sequential> = ActorCell::new(
			Scripted {
				log: log.clone(),
			},
			shared.clone(),
			this,
		);

		let mut ctx = ExecutionContext::new(ExecutionContext::DEFAULT_STACK_SIZE, move |suspender| cell.run(suspender));
		assert_eq!(ctx.enter(), YieldReason::Blocked);
		assert_eq!(shared.state().load(), ActorState::AboutToBlock);
		assert_eq!(shared.state().try_block(), ActorState::Blocked);

		assert_eq!(shared.enqueue(Envelope::new(0)).ok(), Some(true));
		assert_eq!(ctx.enter(), YieldReason::Done);
		assert!(shared.state().is_done());
	}
}
