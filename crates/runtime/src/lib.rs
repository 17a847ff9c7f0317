// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Cooperative execution core for actors.
//!
//! Actors are driven to completion on a shared pool of workers instead of a
//! thread each. The two moving parts are:
//! - the resume protocol ([`policy::ResumeResult`], [`actor::fiber`]) which runs
//!   an actor until its mailbox is empty and hands the worker back without
//!   losing concurrently arriving messages
//! - strategy assembly ([`spawn`]) which picks one scheduling, priority,
//!   resume and invocation policy per actor from its [`SpawnOptions`]

/// Reports a broken state-machine contract and aborts the process.
///
/// Invariant violations are never turned into return values: the caller has no
/// way to resume a half-transitioned actor.
macro_rules! fatal {
	($($arg:tt)*) => {{
		tracing::error!($($arg)*);
		std::process::abort()
	}};
}

pub mod actor;
pub mod error;
pub mod policy;
pub mod scheduler;
pub mod spawn;

pub use actor::{
	context::Context,
	fiber::{ExecutionContext, Suspend, YieldReason},
	mailbox::{ActorRef, Envelope, Mailbox, MailboxFacade, Priority, PushError},
	shared::ActorId,
	state::{ActorState, AtomicActorState},
	system::{ActorSystem, ActorSystemBuilder, ActorSystemConfig},
	traits::{Actor, ActorConfig, Flow},
};
pub use error::{ReceiveError, RuntimeError, SendError, SpawnError};
pub use policy::{InvokeKind, PriorityKind, ResumeKind, ResumeResult, SchedulingKind, Strategy};
pub use scheduler::{Resumable, Scheduler, WorkerContext, manual::ManualScheduler, pool::WorkerPool};
pub use spawn::options::SpawnOptions;
