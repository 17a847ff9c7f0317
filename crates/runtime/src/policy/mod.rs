// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Strategy axes.
//!
//! Every actor is composed from exactly one variant per axis, chosen once from
//! its [`SpawnOptions`]:
//!
//! | Axis | Variants |
//! |---|---|
//! | scheduling | [`Cooperative`](scheduling::Cooperative), [`Dedicated`](scheduling::Dedicated) |
//! | priority | [`Prioritizing`](priority::Prioritizing), [`NotPrioritizing`](priority::NotPrioritizing) |
//! | resume | [`EventBasedResume`](resume::EventBasedResume), [`ContextSwitchingResume`](resume::ContextSwitchingResume), [`NoResume`](resume::NoResume) |
//! | invocation | [`Sequential`](invoke::Sequential), [`Nestable`](invoke::Nestable) |

pub(crate) mod invoke;
pub(crate) mod priority;
pub(crate) mod resume;
pub(crate) mod scheduling;

use crate::{error::SpawnError, spawn::options::SpawnOptions};

/// Outcome of one `resume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResumeResult {
	/// The actor finished. Its slot may be reclaimed; it is never resumed again.
	ActorDone,
	/// The actor is asleep and will be rescheduled by the enqueue that wakes it.
	ActorBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingKind {
	/// Shares the worker pool.
	Cooperative,
	/// Runs on its own thread.
	Dedicated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityKind {
	Prioritizing,
	NotPrioritizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResumeKind {
	/// Drains the mailbox and returns, never suspends.
	EventBased,
	/// Suspends its execution context on an empty mailbox.
	ContextSwitching,
	/// Drives its own loop on a dedicated thread.
	NoResume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
	Sequential,
	/// Supports nested synchronous receive.
	Nestable,
}

/// The variant chosen on each axis for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
	pub scheduling: SchedulingKind,
	pub priority: PriorityKind,
	pub resume: ResumeKind,
	pub invoke: InvokeKind,
}

impl Strategy {
	/// Picks one variant per axis, rejecting options a top-level spawn cannot
	/// carry.
	pub fn select(options: SpawnOptions) -> Result<Self, SpawnError> {
		if options.contains(SpawnOptions::MONITOR) {
			return Err(SpawnError::TopLevelRelation {
				flag: "monitor",
			});
		}
		if options.contains(SpawnOptions::LINK) {
			return Err(SpawnError::TopLevelRelation {
				flag: "link",
			});
		}

		let detached = options.contains(SpawnOptions::DETACHED);
		let blocking = options.contains(SpawnOptions::BLOCKING_API);

		Ok(Self {
			scheduling: if detached {
				SchedulingKind::Dedicated
			} else {
				SchedulingKind::Cooperative
			},
			priority: if options.contains(SpawnOptions::PRIORITY_AWARE) {
				PriorityKind::Prioritizing
			} else {
				PriorityKind::NotPrioritizing
			},
			resume: match (blocking, detached) {
				(false, _) => ResumeKind::EventBased,
				(true, false) => ResumeKind::ContextSwitching,
				(true, true) => ResumeKind::NoResume,
			},
			invoke: if blocking {
				InvokeKind::Nestable
			} else {
				InvokeKind::Sequential
			},
		})
	}
}
