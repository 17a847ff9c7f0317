// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::Arc,
	thread::{self, JoinHandle},
};

use tracing::debug;

use crate::{
	error::SpawnError,
	policy::SchedulingKind,
	scheduler::{Resumable, Scheduler},
};

/// A composed actor as seen by its scheduling policy.
pub(crate) trait ActorJob: Resumable + 'static {
	/// Runs the actor on the current thread until it is done.
	fn run_detached(&self);

	/// Wakes a thread parked in [`run_detached`](Self::run_detached).
	fn unpark(&self);
}

/// How the execution resource was obtained.
pub(crate) enum Launched {
	Scheduled,
	Thread(JoinHandle<()>),
}

pub(crate) trait SchedulingPolicy: Send + Sync + 'static {
	const KIND: SchedulingKind;

	/// Hands a freshly assembled actor to its execution resource.
	fn launch<J: ActorJob>(&self, job: Arc<J>) -> Result<Launched, SpawnError>;

	/// Hands an actor woken from `blocked` back to its execution resource.
	fn rearm<J: ActorJob>(&self, job: Arc<J>);
}

pub(crate) struct Cooperative {
	scheduler: Arc<dyn Scheduler>,
}

impl Cooperative {
	pub(crate) fn new(scheduler: Arc<dyn Scheduler>) -> Self {
		Self {
			scheduler,
		}
	}
}

impl SchedulingPolicy for Cooperative {
	const KIND: SchedulingKind = SchedulingKind::Cooperative;

	fn launch<J: ActorJob>(&self, job: Arc<J>) -> Result<Launched, SpawnError> {
		self.scheduler.schedule(job);
		Ok(Launched::Scheduled)
	}

	fn rearm<J: ActorJob>(&self, job: Arc<J>) {
		self.scheduler.schedule(job);
	}
}

pub(crate) struct Dedicated {
	thread_name: String,
}

impl Dedicated {
	pub(crate) fn new(thread_name: String) -> Self {
		Self {
			thread_name,
		}
	}
}

impl SchedulingPolicy for Dedicated {
	const KIND: SchedulingKind = SchedulingKind::Dedicated;

	fn launch<J: ActorJob>(&self, job: Arc<J>) -> Result<Launched, SpawnError> {
		let name = job.name().to_string();
		let thread_name = self.thread_name.clone();

		thread::Builder::new()
			.name(thread_name)
			.spawn(move || {
				debug!(actor = %job.id(), "dedicated actor starting");
				job.run_detached();
				debug!(actor = %job.id(), "dedicated actor stopped");
			})
			.map(Launched::Thread)
			.map_err(|source| SpawnError::Thread {
				name,
				source,
			})
	}

	fn rearm<J: ActorJob>(&self, job: Arc<J>) {
		job.unpark();
	}
}
