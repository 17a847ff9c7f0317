// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::VecDeque;

use crate::{actor::mailbox::Envelope, policy::InvokeKind};

/// Bookkeeping for envelopes skipped by a nested receive.
pub(crate) trait InvokePolicy<M>: Default + Send {
	const KIND: InvokeKind;

	fn stash(&mut self, envelope: Envelope<M>);

	/// Oldest stashed envelope, delivered before any newer mailbox content.
	fn unstash(&mut self) -> Option<Envelope<M>>;

	fn has_stashed(&self) -> bool;

	fn stashed_exit(&self) -> bool;

	fn take_matching(&mut self, filter: &mut dyn FnMut(&M) -> bool) -> Option<M>;
}

/// One message is fully handled before the next is fetched.
#[derive(Debug, Default)]
pub(crate) struct Sequential;

impl<M> InvokePolicy<M> for Sequential {
	const KIND: InvokeKind = InvokeKind::Sequential;

	fn stash(&mut self, _envelope: Envelope<M>) {
		fatal!("sequential actors cannot skip messages");
	}

	fn unstash(&mut self) -> Option<Envelope<M>> {
		None
	}

	fn has_stashed(&self) -> bool {
		false
	}

	fn stashed_exit(&self) -> bool {
		false
	}

	fn take_matching(&mut self, _filter: &mut dyn FnMut(&M) -> bool) -> Option<M> {
		None
	}
}

pub(crate) struct Nestable<M> {
	stash: VecDeque<Envelope<M>>,
}

impl<M> Default for Nestable<M> {
	fn default() -> Self {
		Self {
			stash: VecDeque::new(),
		}
	}
}

impl<M: Send> InvokePolicy<M> for Nestable<M> {
	const KIND: InvokeKind = InvokeKind::Nestable;

	fn stash(&mut self, envelope: Envelope<M>) {
		self.stash.push_back(envelope);
	}

	fn unstash(&mut self) -> Option<Envelope<M>> {
		self.stash.pop_front()
	}

	fn has_stashed(&self) -> bool {
		!self.stash.is_empty()
	}

	fn stashed_exit(&self) -> bool {
		self.stash.iter().any(Envelope::is_exit)
	}

	fn take_matching(&mut self, filter: &mut dyn FnMut(&M) -> bool) -> Option<M> {
		let position = self.stash.iter().position(|envelope| envelope.message().is_some_and(|msg| filter(msg)))?;
		self.stash.remove(position).and_then(Envelope::into_message)
	}
}
