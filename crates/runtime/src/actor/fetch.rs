// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Mailbox fetch protocols.
//!
//! [`fetch_messages`] is the only place an execution context suspends for lack
//! of work. Before suspending it announces `about_to_block` and checks the
//! mailbox one last time, so an enqueue racing with the emptiness check either
//! shows up in that check or flips the state back to `ready`, which the resume
//! driver observes when its `about_to_block → blocked` exchange fails.

use std::ops::ControlFlow;

use crate::actor::{
	fiber::{Suspend, YieldReason},
	mailbox::Envelope,
	state::AtomicActorState,
};

/// Where fetched envelopes come from.
pub(crate) trait FetchSource<M> {
	fn try_pop(&mut self) -> Option<Envelope<M>>;

	fn can_fetch_more(&self) -> bool;

	fn state(&self) -> &AtomicActorState;
}

/// Waits for at least one envelope, then drains the source into `handler`.
///
/// Returns early with `Break` as soon as the handler breaks.
pub(crate) fn fetch_messages<M, C, F>(source: &mut C, suspender: &mut dyn Suspend, mut handler: F) -> ControlFlow<()>
where
	C: FetchSource<M> + ?Sized,
	F: FnMut(&mut C, &mut dyn Suspend, Envelope<M>) -> ControlFlow<()>,
{
	let mut next = source.try_pop();
	while next.is_none() {
		if !source.can_fetch_more() {
			source.state().prepare_block();
			if source.can_fetch_more() {
				source.state().cancel_block();
			} else {
				suspender.suspend(YieldReason::Blocked);
			}
		}
		next = source.try_pop();
	}

	while let Some(envelope) = next {
		handler(&mut *source, &mut *suspender, envelope)?;
		next = source.try_pop();
	}
	ControlFlow::Continue(())
}

/// Drains whatever is available right now. Never suspends.
pub(crate) fn try_fetch_messages<M, C, F>(source: &mut C, mut handler: F) -> ControlFlow<()>
where
	C: FetchSource<M> + ?Sized,
	F: FnMut(&mut C, Envelope<M>) -> ControlFlow<()>,
{
	while let Some(envelope) = source.try_pop() {
		handler(&mut *source, envelope)?;
	}
	ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
	use std::{
		cell::{Cell, RefCell},
		collections::VecDeque,
		rc::Rc,
	};

	use super::*;
	use crate::actor::state::ActorState;

	#[derive(Default)]
	struct Script {
		queue: RefCell<VecDeque<u32>>,
		/// Delivered by a fake producer once the actor has really gone to sleep.
		after_block: RefCell<VecDeque<u32>>,
		/// Delivered by a fake producer while the actor is in `about_to_block`.
		during_about_to_block: Cell<Option<u32>>,
		state: AtomicActorState,
	}

	#[derive(Clone)]
	struct ScriptedSource(Rc<Script>);

	impl ScriptedSource {
		fn new(queue: &[u32]) -> Self {
			let script = Script::default();
			script.queue.borrow_mut().extend(queue);
			Self(Rc::new(script))
		}
	}

	impl FetchSource<u32> for ScriptedSource {
		fn try_pop(&mut self) -> Option<Envelope<u32>> {
			self.0.queue.borrow_mut().pop_front().map(Envelope::new)
		}

		fn can_fetch_more(&self) -> bool {
			if self.0.state.load() == ActorState::AboutToBlock {
				if let Some(msg) = self.0.during_about_to_block.take() {
					self.0.queue.borrow_mut().push_back(msg);
				}
			}
			!self.0.queue.borrow().is_empty()
		}

		fn state(&self) -> &AtomicActorState {
			&self.0.state
		}
	}

	/// Plays the resume driver: performs the blocking exchange, then lets the
	/// scripted producer deliver.
	struct Driver {
		script: Rc<Script>,
		reasons: Vec<(YieldReason, ActorState)>,
	}

	impl Suspend for Driver {
		fn suspend(&mut self, reason: YieldReason) {
			let state = &self.script.state;
			self.reasons.push((reason, state.load()));
			assert_eq!(state.try_block(), ActorState::Blocked);
			if let Some(msg) = self.script.after_block.borrow_mut().pop_front() {
				self.script.queue.borrow_mut().push_back(msg);
				assert!(state.wake());
			}
		}
	}

	fn collect(source: &mut ScriptedSource, driver: &mut Driver) -> Vec<u32> {
		let mut seen = Vec::new();
		let _ = fetch_messages(source, driver, |_, _, envelope| {
			seen.extend(envelope.into_message());
			ControlFlow::Continue(())
		});
		seen
	}

	fn driver_for(source: &ScriptedSource) -> Driver {
		Driver {
			script: source.0.clone(),
			reasons: Vec::new(),
		}
	}

	#[test]
	fn test_drains_without_suspending() {
		let mut source = ScriptedSource::new(&[1, 2, 3]);
		let mut driver = driver_for(&source);

		assert_eq!(collect(&mut source, &mut driver), vec![1, 2, 3]);
		assert!(driver.reasons.is_empty());
		assert_eq!(source.0.state.load(), ActorState::Ready);
	}

	#[test]
	fn test_suspends_blocked_only_from_about_to_block() {
		let mut source = ScriptedSource::new(&[]);
		source.0.after_block.borrow_mut().push_back(7);
		let mut driver = driver_for(&source);

		assert_eq!(collect(&mut source, &mut driver), vec![7]);
		assert_eq!(driver.reasons, vec![(YieldReason::Blocked, ActorState::AboutToBlock)]);
		assert_eq!(source.0.state.load(), ActorState::Ready);
	}

	#[test]
	fn test_arrival_during_about_to_block_cancels_sleep() {
		let mut source = ScriptedSource::new(&[]);
		source.0.during_about_to_block.set(Some(9));
		let mut driver = driver_for(&source);

		assert_eq!(collect(&mut source, &mut driver), vec![9]);
		assert!(driver.reasons.is_empty());
		assert_eq!(source.0.state.load(), ActorState::Ready);
	}

	#[test]
	fn test_handler_break_stops_draining() {
		let mut source = ScriptedSource::new(&[1, 2, 3]);
		let mut seen = Vec::new();
		let flow = try_fetch_messages(&mut source, |_, envelope| {
			let msg = envelope.into_message().unwrap();
			seen.push(msg);
			if msg == 2 {
				ControlFlow::Break(())
			} else {
				ControlFlow::Continue(())
			}
		});

		assert!(flow.is_break());
		assert_eq!(seen, vec![1, 2]);
		assert_eq!(*source.0.queue.borrow(), VecDeque::from([3]));
	}

	#[test]
	fn test_try_fetch_on_empty_source_returns_immediately() {
		let mut source = ScriptedSource::new(&[]);
		let flow = try_fetch_messages(&mut source, |_, _| ControlFlow::Continue(()));
		assert!(flow.is_continue());
		assert_eq!(source.0.state.load(), ActorState::Ready);
	}
}
