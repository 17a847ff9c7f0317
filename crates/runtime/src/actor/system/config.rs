// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, time::Duration};

use crate::{
	actor::{fiber::ExecutionContext, system::ActorSystem},
	error::RuntimeError,
	scheduler::Scheduler,
};

/// Configuration for an [`ActorSystem`].
#[derive(Debug, Clone)]
pub struct ActorSystemConfig {
	/// Number of worker threads in an owned pool.
	///
	/// Default: number of logical CPUs
	pub workers: usize,

	/// Execution context stack size for context-switching actors, in machine
	/// words.
	pub stack_size: usize,

	/// Prefix for worker and dedicated actor thread names.
	pub thread_name: String,

	/// How long `shutdown` waits for actors to finish.
	pub shutdown_timeout: Duration,
}

impl Default for ActorSystemConfig {
	fn default() -> Self {
		Self {
			workers: num_cpus::get(),
			stack_size: ExecutionContext::DEFAULT_STACK_SIZE,
			thread_name: "spindle".to_string(),
			shutdown_timeout: Duration::from_secs(5),
		}
	}
}

#[derive(Debug, Default)]
pub struct ActorSystemBuilder {
	config: ActorSystemConfig,
}

impl ActorSystemBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn workers(mut self, workers: usize) -> Self {
		self.config.workers = workers;
		self
	}

	pub fn stack_size(mut self, words: usize) -> Self {
		self.config.stack_size = words;
		self
	}

	pub fn thread_name(mut self, name: impl Into<String>) -> Self {
		self.config.thread_name = name.into();
		self
	}

	pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.config.shutdown_timeout = timeout;
		self
	}

	pub fn config(&self) -> &ActorSystemConfig {
		&self.config
	}

	/// Builds a system that owns a worker pool.
	pub fn build(self) -> Result<ActorSystem, RuntimeError> {
		ActorSystem::with_pool(self.config)
	}

	/// Builds a system that hands cooperative actors to `scheduler`.
	pub fn build_with_scheduler(self, scheduler: Arc<dyn Scheduler>) -> ActorSystem {
		ActorSystem::with_scheduler(self.config, scheduler)
	}
}
