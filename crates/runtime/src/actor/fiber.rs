// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Suspendable execution contexts.
//!
//! An [`ExecutionContext`] owns a private stack on which a trampoline runs.
//! [`ExecutionContext::enter`] switches onto that stack until the trampoline
//! either returns or calls [`Suspend::suspend`]; the next `enter` continues at
//! exactly that point with all locals intact.
//!
//! Code running inside a context must not hold a `tracing` span guard across a
//! suspension: the context may be re-entered from a different worker thread.

use generator::{Generator, Gn};

/// Why a context handed control back to whoever entered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YieldReason {
	/// The trampoline returned.
	Done,
	/// Voluntary yield, more work is pending.
	Ready,
	/// The mailbox is empty and the actor is about to sleep.
	Blocked,
}

/// Hands control from inside a context back to its caller.
pub trait Suspend {
	fn suspend(&mut self, reason: YieldReason);
}

struct ScopeSuspender<F: FnMut(YieldReason)>(F);

impl<F: FnMut(YieldReason)> Suspend for ScopeSuspender<F> {
	fn suspend(&mut self, reason: YieldReason) {
		(self.0)(reason)
	}
}

/// A stackful continuation bound to one trampoline.
///
/// Dropping a context that has not run to completion unwinds its stack.
pub struct ExecutionContext {
	fiber: Generator<'static, (), YieldReason>,
}

impl ExecutionContext {
	/// Default stack size for actor contexts, in machine words.
	pub const DEFAULT_STACK_SIZE: usize = 0x8000;

	/// Creates a context that will run `trampoline` on first [`enter`](Self::enter).
	///
	/// `stack_size` is given in machine words.
	pub fn new<F>(stack_size: usize, trampoline: F) -> Self
	where
		F: FnOnce(&mut dyn Suspend) -> YieldReason + Send + 'static,
	{
		let fiber = Gn::<()>::new_scoped_opt(stack_size, move |mut scope| {
			let mut suspender = ScopeSuspender(|reason| {
				let _ = scope.yield_(reason);
			});
			trampoline(&mut suspender)
		});

		Self {
			fiber,
		}
	}

	/// Switches into the context until it suspends or finishes.
	///
	/// Entering a context that already reported [`YieldReason::Done`] is a
	/// contract violation and aborts.
	pub fn enter(&mut self) -> YieldReason {
		match self.fiber.resume() {
			Some(reason) => reason,
			None => fatal!("execution context entered after completion"),
		}
	}

	pub fn is_done(&self) -> bool {
		self.fiber.is_done()
	}
}

#[cfg(test)]
mod tests {
	use std::{
		sync::{
			Arc,
			atomic::{AtomicUsize, Ordering},
		},
		thread,
	};

	use super::*;

	#[test]
	fn test_runs_to_done() {
		let mut ctx = ExecutionContext::new(ExecutionContext::DEFAULT_STACK_SIZE, |_| YieldReason::Done);
		assert!(!ctx.is_done());
		assert_eq!(ctx.enter(), YieldReason::Done);
		assert!(ctx.is_done());
	}

	#[test]
	fn test_resumes_at_suspension_point() {
		let counter = Arc::new(AtomicUsize::new(0));
		let observed = counter.clone();

		let mut ctx = ExecutionContext::new(ExecutionContext::DEFAULT_STACK_SIZE, move |suspender| {
			let mut local = 10;
			for _ in 0..3 {
				local += 1;
				observed.fetch_add(1, Ordering::SeqCst);
				suspender.suspend(YieldReason::Ready);
			}
			assert_eq!(local, 13);
			suspender.suspend(YieldReason::Blocked);
			YieldReason::Done
		});

		for expected in 1..=3 {
			assert_eq!(ctx.enter(), YieldReason::Ready);
			assert_eq!(counter.load(Ordering::SeqCst), expected);
		}
		assert_eq!(ctx.enter(), YieldReason::Blocked);
		assert_eq!(ctx.enter(), YieldReason::Done);
		assert!(ctx.is_done());
	}

	#[test]
	fn test_reentered_from_another_thread() {
		let mut ctx = ExecutionContext::new(ExecutionContext::DEFAULT_STACK_SIZE, |suspender| {
			let values = vec![1, 2, 3];
			suspender.suspend(YieldReason::Blocked);
			assert_eq!(values.iter().sum::<i32>(), 6);
			YieldReason::Done
		});

		assert_eq!(ctx.enter(), YieldReason::Blocked);
		let reason = thread::spawn(move || ctx.enter()).join().unwrap();
		assert_eq!(reason, YieldReason::Done);
	}

	#[test]
	fn test_drop_suspended_context_releases_captures() {
		let token = Arc::new(());
		let held = token.clone();

		let mut ctx = ExecutionContext::new(ExecutionContext::DEFAULT_STACK_SIZE, move |suspender| {
			let _held = held;
			suspender.suspend(YieldReason::Blocked);
			YieldReason::Done
		});
		assert_eq!(ctx.enter(), YieldReason::Blocked);
		assert_eq!(Arc::strong_count(&token), 2);

		drop(ctx);
		assert_eq!(Arc::strong_count(&token), 1);
	}
}
