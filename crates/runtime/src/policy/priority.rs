// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::VecDeque;

use crate::{
	actor::mailbox::{Envelope, MailboxFacade, Priority},
	policy::PriorityKind,
};

/// Decides which envelope leaves the mailbox next.
pub(crate) trait PriorityPolicy<M>: Default + Send {
	const KIND: PriorityKind;

	fn next_message<B>(&mut self, mailbox: &B) -> Option<Envelope<M>>
	where
		B: MailboxFacade<M> + ?Sized;

	/// Envelopes already taken out of the mailbox but not delivered yet.
	fn has_cached(&self) -> bool;
}

/// Plain FIFO.
#[derive(Debug, Default)]
pub(crate) struct NotPrioritizing;

impl<M> PriorityPolicy<M> for NotPrioritizing {
	const KIND: PriorityKind = PriorityKind::NotPrioritizing;

	fn next_message<B>(&mut self, mailbox: &B) -> Option<Envelope<M>>
	where
		B: MailboxFacade<M> + ?Sized,
	{
		mailbox.try_pop()
	}

	fn has_cached(&self) -> bool {
		false
	}
}

/// Moves everything available into two lanes and serves the high lane first.
/// Order within a lane is arrival order. An exit is held back until both lanes
/// are empty, and nothing more is pulled from the mailbox while it waits.
pub(crate) struct Prioritizing<M> {
	high: VecDeque<Envelope<M>>,
	normal: VecDeque<Envelope<M>>,
	exit: bool,
}

impl<M> Default for Prioritizing<M> {
	fn default() -> Self {
		Self {
			high: VecDeque::new(),
			normal: VecDeque::new(),
			exit: false,
		}
	}
}

impl<M: Send> PriorityPolicy<M> for Prioritizing<M> {
	const KIND: PriorityKind = PriorityKind::Prioritizing;

	fn next_message<B>(&mut self, mailbox: &B) -> Option<Envelope<M>>
	where
		B: MailboxFacade<M> + ?Sized,
	{
		while !self.exit {
			let Some(envelope) = mailbox.try_pop() else {
				break;
			};
			match envelope {
				Envelope::Exit => self.exit = true,
				envelope if envelope.priority() == Priority::High => self.high.push_back(envelope),
				envelope => self.normal.push_back(envelope),
			}
		}

		if let Some(envelope) = self.high.pop_front().or_else(|| self.normal.pop_front()) {
			return Some(envelope);
		}
		if std::mem::take(&mut self.exit) {
			return Some(Envelope::Exit);
		}
		None
	}

	fn has_cached(&self) -> bool {
		self.exit || !self.high.is_empty() || !self.normal.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::actor::mailbox::Mailbox;

	fn drain<P: PriorityPolicy<&'static str>>(policy: &mut P, mailbox: &Mailbox<&'static str>) -> Vec<&'static str> {
		std::iter::from_fn(|| policy.next_message(mailbox)).filter_map(Envelope::into_message).collect()
	}

	#[test]
	fn test_high_priority_overtakes_pending_normal() {
		let mailbox = Mailbox::new(0);
		mailbox.push(Envelope::with_priority("low-1", Priority::Normal)).unwrap();
		mailbox.push(Envelope::with_priority("high", Priority::High)).unwrap();
		mailbox.push(Envelope::with_priority("low-2", Priority::Normal)).unwrap();

		let mut policy = Prioritizing::default();
		assert_eq!(drain(&mut policy, &mailbox), vec!["high", "low-1", "low-2"]);
		assert!(!PriorityPolicy::<&str>::has_cached(&policy));
	}

	#[test]
	fn test_late_high_priority_still_overtakes_cached_normal() {
		let mailbox = Mailbox::new(0);
		mailbox.push(Envelope::new("low-1")).unwrap();
		mailbox.push(Envelope::new("low-2")).unwrap();

		let mut policy = Prioritizing::default();
		assert_eq!(policy.next_message(&mailbox).and_then(Envelope::into_message), Some("low-1"));
		assert!(PriorityPolicy::<&str>::has_cached(&policy));

		mailbox.push(Envelope::with_priority("high", Priority::High)).unwrap();
		assert_eq!(drain(&mut policy, &mailbox), vec!["high", "low-2"]);
	}

	#[test]
	fn test_exit_is_served_after_both_lanes() {
		let mailbox = Mailbox::new(0);
		mailbox.push(Envelope::new("low-1")).unwrap();
		mailbox.push(Envelope::with_priority("high", Priority::High)).unwrap();
		mailbox.push(Envelope::Exit).unwrap();

		let mut policy = Prioritizing::default();
		let order: Vec<_> = std::iter::from_fn(|| policy.next_message(&mailbox))
			.map(|envelope| envelope.into_message().unwrap_or("exit"))
			.collect();
		assert_eq!(order, vec!["high", "low-1", "exit"]);
		assert!(!PriorityPolicy::<&str>::has_cached(&policy));
	}

	#[test]
	fn test_not_prioritizing_keeps_arrival_order() {
		let mailbox = Mailbox::new(0);
		mailbox.push(Envelope::new("low-1")).unwrap();
		mailbox.push(Envelope::with_priority("high", Priority::High)).unwrap();
		mailbox.push(Envelope::new("low-2")).unwrap();

		assert_eq!(drain(&mut NotPrioritizing, &mailbox), vec!["low-1", "high", "low-2"]);
	}
}
