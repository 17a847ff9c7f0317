// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Core actor trait and associated types.
//!
//! This module defines the fundamental abstractions for the actor model:
//! - [`Actor`]: The trait that all actors must implement
//! - [`Flow`]: Control flow after each hook
//! - [`ActorConfig`]: Per-actor configuration

use crate::actor::context::Context;

/// What the actor wants to do after handling a message.
///
/// How each variant is honoured depends on the resume strategy the actor was
/// spawned with:
/// - **Context switching**: `Yield` suspends the execution context with
///   reason `ready` and the driver re-enters it right away
/// - **Event based**: messages are drained in one go, so `Yield` behaves like
///   `Continue`
/// - **Dedicated thread**: `Yield` yields the OS thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	/// Keep processing messages immediately.
	Continue,

	/// Give other work a chance to run.
	Yield,

	/// Sleep until a message arrives.
	Park,

	/// Stop this actor permanently.
	///
	/// The actor's `post_stop` hook will be called and its state moves to
	/// `done`.
	Stop,
}

/// Configuration for actor behavior.
#[derive(Debug, Clone, Default)]
pub struct ActorConfig {
	/// Mailbox capacity. 0 = unbounded.
	///
	/// Default: 0 (unbounded)
	pub mailbox_capacity: usize,

	/// Stack size of the execution context, in machine words.
	///
	/// Only used by context-switching actors. `None` uses the system default.
	pub stack_size: Option<usize>,
}

impl ActorConfig {
	/// Create a new config with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the mailbox capacity. 0 = unbounded.
	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		self.mailbox_capacity = capacity;
		self
	}

	/// Override the execution context stack size, in machine words.
	pub fn stack_size(mut self, words: usize) -> Self {
		self.stack_size = Some(words);
		self
	}
}

/// The core actor abstraction.
///
/// Actors are isolated units of computation that:
/// - Own their state exclusively (no shared mutable state)
/// - Process messages one at a time (no internal concurrency)
/// - Communicate with other actors only via message passing
///
/// # Lifecycle
///
/// 1. `init()` - Create initial state
/// 2. `pre_start()` - Called before processing begins
/// 3. Loop: `handle()` messages, `idle()` when empty, `on_exit()` when asked
///    to terminate
/// 4. `post_stop()` - Cleanup after actor stops
///
/// # Example
///
/// ```ignore
/// struct Counter;
///
/// enum CounterMsg {
///     Increment,
///     Get { reply: ActorRef<i64> },
/// }
///
/// impl Actor for Counter {
///     type State = i64;
///     type Message = CounterMsg;
///
///     fn init(&self, _ctx: &mut Context<'_, Self::Message>) -> Self::State {
///         0
///     }
///
///     fn handle(&self, state: &mut i64, msg: CounterMsg, _ctx: &mut Context<'_, CounterMsg>) -> Flow {
///         match msg {
///             CounterMsg::Increment => *state += 1,
///             CounterMsg::Get { reply } => { let _ = reply.send(*state); }
///         }
///         Flow::Continue
///     }
/// }
/// ```
pub trait Actor: Send + 'static {
	/// The actor's internal state (owned, not shared).
	///
	/// Cooperative actors may be resumed on any worker, hence `Send`.
	type State: Send + 'static;

	/// Messages this actor can receive.
	type Message: Send + 'static;

	/// Create initial state. Called once, on the actor's first run.
	fn init(&self, ctx: &mut Context<'_, Self::Message>) -> Self::State;

	/// Handle a single message. This is the core of the actor.
	///
	/// Return `Flow` to control scheduling:
	/// - `Continue`: Process next message immediately
	/// - `Yield`: Give other actors a chance to run
	/// - `Park`: Sleep until a message arrives
	/// - `Stop`: Terminate this actor
	fn handle(&self, state: &mut Self::State, msg: Self::Message, ctx: &mut Context<'_, Self::Message>) -> Flow;

	/// Called when the mailbox is empty.
	///
	/// Default: Park (sleep until message arrives)
	#[allow(unused_variables)]
	fn idle(&self, state: &mut Self::State, ctx: &mut Context<'_, Self::Message>) -> Flow {
		Flow::Park
	}

	/// Called once before message processing begins. `Stop` ends the actor
	/// before it handles anything.
	#[allow(unused_variables)]
	fn pre_start(&self, state: &mut Self::State, ctx: &mut Context<'_, Self::Message>) -> Flow {
		Flow::Continue
	}

	/// Called when a termination request is dequeued.
	///
	/// Default: Stop
	#[allow(unused_variables)]
	fn on_exit(&self, state: &mut Self::State, ctx: &mut Context<'_, Self::Message>) -> Flow {
		Flow::Stop
	}

	/// Called once after the actor stops.
	#[allow(unused_variables)]
	fn post_stop(&self, state: &mut Self::State) {}

	/// Actor configuration. Override for custom settings.
	fn config(&self) -> ActorConfig {
		ActorConfig::default()
	}
}
