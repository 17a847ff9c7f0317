// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The seam between actors and whoever runs them.
//!
//! Cooperative actors are handed to a [`Scheduler`] when spawned and whenever
//! an enqueue wakes them from `blocked`. The scheduler picks a worker and calls
//! [`Resumable::resume`] on it.

pub mod manual;
pub mod pool;

use std::sync::Arc;

use crate::{actor::shared::ActorId, policy::ResumeResult};

/// Identifies the worker a resume runs on.
#[derive(Debug, Clone)]
pub struct WorkerContext {
	id: usize,
	name: String,
}

impl WorkerContext {
	pub fn new(id: usize, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
		}
	}

	pub fn id(&self) -> usize {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

/// An actor as seen by a scheduler.
pub trait Resumable: Send + Sync {
	fn id(&self) -> ActorId;

	fn name(&self) -> &str;

	/// Runs the actor until it finishes or blocks.
	///
	/// A job is scheduled at most once per wakeup, so implementations never see
	/// two concurrent calls for the same actor.
	fn resume(&self, worker: &WorkerContext) -> ResumeResult;
}

/// Accepts actors that are ready to run.
pub trait Scheduler: Send + Sync {
	fn schedule(&self, job: Arc<dyn Resumable>);
}
