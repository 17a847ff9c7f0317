// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Resume drivers.
//!
//! All three variants share the `resume` contract: a call returns
//! [`ResumeResult::ActorDone`] exactly once, or [`ResumeResult::ActorBlocked`]
//! after the `about_to_block → blocked` exchange succeeded.

use std::thread;

use crate::{
	actor::{
		cell::ActorCell,
		fiber::{ExecutionContext, Suspend, YieldReason},
		shared::Parker,
		state::{ActorState, AtomicActorState},
		traits::Actor,
	},
	policy::{ResumeKind, ResumeResult, invoke::InvokePolicy, priority::PriorityPolicy},
};

pub(crate) trait ResumePolicy: Send + 'static {
	const KIND: ResumeKind;

	fn resume(&mut self, state: &AtomicActorState) -> ResumeResult;

	/// Drives the actor to completion on the calling thread, parking it
	/// whenever the actor blocks.
	fn run_detached(&mut self, state: &AtomicActorState, parker: &Parker) {
		while self.resume(state) == ResumeResult::ActorBlocked {
			parker.park_while_blocked(state);
		}
	}
}

/// Single-shot resume: drains what is available and never suspends.
pub(crate) struct EventBasedResume<A: Actor, P, I> {
	cell: ActorCell<A, P, I>,
}

impl<A, P, I> EventBasedResume<A, P, I>
where
	A: Actor,
	P: PriorityPolicy<A::Message> + 'static,
	I: InvokePolicy<A::Message> + 'static,
{
	pub(crate) fn new(cell: ActorCell<A, P, I>) -> Self {
		Self {
			cell,
		}
	}
}

impl<A, P, I> ResumePolicy for EventBasedResume<A, P, I>
where
	A: Actor,
	P: PriorityPolicy<A::Message> + 'static,
	I: InvokePolicy<A::Message> + 'static,
{
	const KIND: ResumeKind = ResumeKind::EventBased;

	fn resume(&mut self, _state: &AtomicActorState) -> ResumeResult {
		self.cell.resume_event()
	}
}

/// Runs the actor inside an [`ExecutionContext`] that suspends on an empty
/// mailbox.
pub(crate) struct ContextSwitchingResume {
	fiber: ExecutionContext,
}

impl ContextSwitchingResume {
	pub(crate) fn new<A, P, I>(cell: ActorCell<A, P, I>, stack_size: usize) -> Self
	where
		A: Actor,
		P: PriorityPolicy<A::Message> + 'static,
		I: InvokePolicy<A::Message> + 'static,
	{
		Self {
			fiber: ExecutionContext::new(stack_size, move |suspender| cell.run(suspender)),
		}
	}
}

impl ResumePolicy for ContextSwitchingResume {
	const KIND: ResumeKind = ResumeKind::ContextSwitching;

	fn resume(&mut self, state: &AtomicActorState) -> ResumeResult {
		if self.fiber.is_done() {
			fatal!("context-switching actor resumed after completion");
		}
		drive(&mut self.fiber, state)
	}
}

/// Enters `fiber` until the actor finishes or really goes to sleep.
pub(crate) fn drive(fiber: &mut ExecutionContext, state: &AtomicActorState) -> ResumeResult {
	loop {
		match fiber.enter() {
			YieldReason::Done => return ResumeResult::ActorDone,
			YieldReason::Ready => continue,
			YieldReason::Blocked => match state.try_block() {
				ActorState::Blocked => return ResumeResult::ActorBlocked,
				// an enqueue won the race, look at the mailbox again
				ActorState::Ready => continue,
				other => fatal!("context switched out as blocked while {other:?}"),
			},
		}
	}
}

/// For actors that own a thread: the loop runs directly on it and suspension
/// parks the thread.
pub(crate) struct NoResume<A: Actor, P, I> {
	cell: Option<ActorCell<A, P, I>>,
}

impl<A, P, I> NoResume<A, P, I>
where
	A: Actor,
	P: PriorityPolicy<A::Message> + 'static,
	I: InvokePolicy<A::Message> + 'static,
{
	pub(crate) fn new(cell: ActorCell<A, P, I>) -> Self {
		Self {
			cell: Some(cell),
		}
	}
}

impl<A, P, I> ResumePolicy for NoResume<A, P, I>
where
	A: Actor,
	P: PriorityPolicy<A::Message> + 'static,
	I: InvokePolicy<A::Message> + 'static,
{
	const KIND: ResumeKind = ResumeKind::NoResume;

	fn resume(&mut self, state: &AtomicActorState) -> ResumeResult {
		if state.is_done() {
			ResumeResult::ActorDone
		} else {
			ResumeResult::ActorBlocked
		}
	}

	fn run_detached(&mut self, state: &AtomicActorState, parker: &Parker) {
		let Some(cell) = self.cell.take() else {
			fatal!("dedicated actor started twice");
		};
		cell.run(&mut ThreadSuspender {
			state,
			parker,
		});
	}
}

/// Suspends by parking the current OS thread.
struct ThreadSuspender<'s> {
	state: &'s AtomicActorState,
	parker: &'s Parker,
}

impl Suspend for ThreadSuspender<'_> {
	fn suspend(&mut self, reason: YieldReason) {
		match reason {
			YieldReason::Ready => thread::yield_now(),
			YieldReason::Blocked => match self.state.try_block() {
				ActorState::Blocked => self.parker.park_while_blocked(self.state),
				ActorState::Ready => {}
				other => fatal!("thread parked as blocked while {other:?}"),
			},
			YieldReason::Done => {}
		}
	}
}
