// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A scheduler that only runs actors when told to.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
	actor::shared::ActorId,
	policy::ResumeResult,
	scheduler::{Resumable, Scheduler, WorkerContext},
};

/// Queues scheduled actors and resumes them on the caller's thread.
///
/// Useful for deterministic tests of the resume protocol.
pub struct ManualScheduler {
	queue: Mutex<VecDeque<Arc<dyn Resumable>>>,
	worker: WorkerContext,
}

impl ManualScheduler {
	pub fn new() -> Self {
		Self {
			queue: Mutex::new(VecDeque::new()),
			worker: WorkerContext::new(0, "manual"),
		}
	}

	/// Number of actors waiting to be resumed.
	pub fn pending(&self) -> usize {
		self.queue.lock().len()
	}

	/// Resumes the oldest scheduled actor.
	pub fn run_next(&self) -> Option<(ActorId, ResumeResult)> {
		// release the queue before resuming, the actor may schedule others
		let job = self.queue.lock().pop_front()?;
		let result = job.resume(&self.worker);
		Some((job.id(), result))
	}

	/// Resumes actors until nothing is scheduled. Returns how many resumes ran.
	pub fn run_until_idle(&self) -> usize {
		let mut runs = 0;
		while self.run_next().is_some() {
			runs += 1;
		}
		runs
	}
}

impl Default for ManualScheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&self, job: Arc<dyn Resumable>) {
		self.queue.lock().push_back(job);
	}
}
