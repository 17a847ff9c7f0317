// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The actor system: spawns actors and shuts them down.

mod config;
pub(crate) mod registry;

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
	thread::{self, JoinHandle},
	time::{Duration, Instant},
};

pub use config::{ActorSystemBuilder, ActorSystemConfig};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
	actor::{mailbox::ActorRef, shared::ActorId, system::registry::Registry, traits::Actor},
	error::{RuntimeError, SpawnError},
	policy::scheduling::Launched,
	scheduler::{Scheduler, pool::WorkerPool},
	spawn::{
		assembly::{SpawnEnv, assemble},
		options::SpawnOptions,
	},
};

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(5);

struct Inner {
	config: ActorSystemConfig,
	scheduler: Arc<dyn Scheduler>,
	pool: Option<Arc<WorkerPool>>,
	registry: Arc<Registry>,
	next_id: AtomicU64,
	threads: Mutex<Vec<JoinHandle<()>>>,
	shut_down: AtomicBool,
}

/// Owns the scheduler and every actor spawned through it.
///
/// Cheap to clone; clones share the same actors.
#[derive(Clone)]
pub struct ActorSystem {
	inner: Arc<Inner>,
}

impl ActorSystem {
	pub fn builder() -> ActorSystemBuilder {
		ActorSystemBuilder::new()
	}

	/// A system with default configuration and its own worker pool.
	pub fn new() -> Result<Self, RuntimeError> {
		Self::builder().build()
	}

	pub(crate) fn with_pool(config: ActorSystemConfig) -> Result<Self, RuntimeError> {
		let pool = Arc::new(WorkerPool::new(config.workers, &config.thread_name)?);
		let scheduler: Arc<dyn Scheduler> = pool.clone();
		Ok(Self::from_parts(config, scheduler, Some(pool)))
	}

	pub(crate) fn with_scheduler(config: ActorSystemConfig, scheduler: Arc<dyn Scheduler>) -> Self {
		Self::from_parts(config, scheduler, None)
	}

	fn from_parts(config: ActorSystemConfig, scheduler: Arc<dyn Scheduler>, pool: Option<Arc<WorkerPool>>) -> Self {
		Self {
			inner: Arc::new(Inner {
				config,
				scheduler,
				pool,
				registry: Arc::new(Registry::default()),
				next_id: AtomicU64::new(1),
				threads: Mutex::new(Vec::new()),
				shut_down: AtomicBool::new(false),
			}),
		}
	}

	pub fn config(&self) -> &ActorSystemConfig {
		&self.inner.config
	}

	/// Number of actors that have not finished yet.
	pub fn live_actors(&self) -> usize {
		self.inner.registry.len()
	}

	/// Spawns `actor` with the strategy composition selected by `options`.
	pub fn spawn<A: Actor>(
		&self,
		name: &str,
		actor: A,
		options: SpawnOptions,
	) -> Result<ActorRef<A::Message>, SpawnError> {
		if self.inner.shut_down.load(Ordering::SeqCst) {
			return Err(SpawnError::ShutDown);
		}

		let id = ActorId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
		let spawned = assemble(
			actor,
			options,
			SpawnEnv {
				id,
				name: name.to_string(),
				scheduler: &self.inner.scheduler,
				stack_size: self.inner.config.stack_size,
				thread_name: format!("{}-{}", self.inner.config.thread_name, name),
				registry: &self.inner.registry,
			},
		)?;

		if let Launched::Thread(handle) = spawned.launched {
			self.inner.threads.lock().push(handle);
		}

		debug!(actor = %id, name, ?options, "actor spawned");
		Ok(spawned.actor_ref)
	}

	/// Asks every live actor to terminate and waits for them.
	///
	/// An owned worker pool is stopped even when the timeout expires. Dedicated
	/// threads are joined only once every actor finished.
	pub fn shutdown(&self) -> Result<(), RuntimeError> {
		if self.inner.shut_down.swap(true, Ordering::SeqCst) {
			return Ok(());
		}
		info!(live = self.live_actors(), "actor system shutting down");

		for actor in self.inner.registry.live() {
			if actor.terminate() {
				debug!(actor = %actor.id(), name = actor.name(), "termination requested");
			}
		}

		let deadline = Instant::now() + self.inner.config.shutdown_timeout;
		while self.live_actors() > 0 && Instant::now() < deadline {
			thread::sleep(SHUTDOWN_POLL_INTERVAL);
		}
		let remaining = self.live_actors();

		if remaining == 0 {
			let threads: Vec<_> = self.inner.threads.lock().drain(..).collect();
			for handle in threads {
				if handle.join().is_err() {
					warn!("dedicated actor thread panicked");
				}
			}
		}

		if let Some(pool) = &self.inner.pool {
			pool.shutdown();
		}

		if remaining > 0 {
			warn!(remaining, "actors still running after shutdown timeout");
			return Err(RuntimeError::ShutdownTimeout {
				remaining,
			});
		}

		info!("actor system stopped");
		Ok(())
	}
}
