// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Actor assembly: one concrete actor type per strategy composition.
//!
//! The factory below is keyed on the selected [`Strategy`]. Each arm
//! monomorphizes a [`ComposedActor`] over its scheduling policy and a resume
//! policy that owns an [`ActorCell`] with the chosen priority and invocation
//! policies.

use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{debug, error, trace, trace_span};

use crate::{
	actor::{
		cell::ActorCell,
		mailbox::{ActorRef, Deliver, Envelope},
		shared::{ActorId, ActorShared},
		system::registry::{Registry, Terminate},
		traits::Actor,
	},
	error::SpawnError,
	policy::{
		InvokeKind, PriorityKind, ResumeKind, ResumeResult, SchedulingKind, Strategy,
		invoke::{Nestable, Sequential},
		priority::{NotPrioritizing, Prioritizing, PriorityPolicy},
		resume::{ContextSwitchingResume, EventBasedResume, NoResume, ResumePolicy},
		scheduling::{ActorJob, Cooperative, Dedicated, Launched, SchedulingPolicy},
	},
	scheduler::{Resumable, Scheduler, WorkerContext},
	spawn::options::SpawnOptions,
};

/// Everything a spawn needs from the system it happens in.
pub(crate) struct SpawnEnv<'e> {
	pub(crate) id: ActorId,
	pub(crate) name: String,
	pub(crate) scheduler: &'e Arc<dyn Scheduler>,
	pub(crate) stack_size: usize,
	pub(crate) thread_name: String,
	pub(crate) registry: &'e Arc<Registry>,
}

pub(crate) struct Spawned<M> {
	pub(crate) actor_ref: ActorRef<M>,
	pub(crate) launched: Launched,
}

/// One actor with its four policies.
pub(crate) struct ComposedActor<M, S, R> {
	shared: Arc<ActorShared<M>>,
	scheduling: S,
	resume: Mutex<R>,
	registry: Arc<Registry>,
	this: Weak<Self>,
}

impl<M, S, R> ComposedActor<M, S, R>
where
	M: Send + 'static,
	S: SchedulingPolicy,
	R: ResumePolicy,
{
	fn retire(&self) {
		self.registry.remove(self.shared.id());
	}

	/// Runs `f`, turning a panic in actor code into a finished actor.
	fn contain<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
		match catch_unwind(AssertUnwindSafe(f)) {
			Ok(value) => Some(value),
			Err(_) => {
				error!(actor = %self.shared.id(), name = self.shared.name(), "actor panicked");
				self.shared.state().finish();
				None
			}
		}
	}
}

impl<M, S, R> Resumable for ComposedActor<M, S, R>
where
	M: Send + 'static,
	S: SchedulingPolicy,
	R: ResumePolicy,
{
	fn id(&self) -> ActorId {
		self.shared.id()
	}

	fn name(&self) -> &str {
		self.shared.name()
	}

	fn resume(&self, worker: &WorkerContext) -> ResumeResult {
		let state = self.shared.state();

		// dedicated actors drive themselves
		if S::KIND == SchedulingKind::Dedicated {
			return if state.is_done() {
				ResumeResult::ActorDone
			} else {
				ResumeResult::ActorBlocked
			};
		}

		if state.is_done() {
			fatal!("actor {} resumed after completion", self.shared.id());
		}

		let span = trace_span!("resume", actor = %self.shared.id(), worker = worker.id());
		let _enter = span.enter();

		// the worker that returned `ActorBlocked` may still be unwinding out of
		// this lock when an enqueue reschedules us
		let result = self.contain(|| self.resume.lock().resume(state)).unwrap_or(ResumeResult::ActorDone);
		trace!(?result, "resume returned");

		if result == ResumeResult::ActorDone {
			self.retire();
		}
		result
	}
}

impl<M, S, R> ActorJob for ComposedActor<M, S, R>
where
	M: Send + 'static,
	S: SchedulingPolicy,
	R: ResumePolicy,
{
	fn run_detached(&self) {
		let _ = self.contain(|| self.resume.lock().run_detached(self.shared.state(), self.shared.parker()));
		self.retire();
	}

	fn unpark(&self) {
		self.shared.parker().unpark();
	}
}

impl<M, S, R> Deliver<M> for ComposedActor<M, S, R>
where
	M: Send + 'static,
	S: SchedulingPolicy,
	R: ResumePolicy,
{
	fn shared(&self) -> &ActorShared<M> {
		&self.shared
	}

	fn rearm(&self) {
		match self.this.upgrade() {
			Some(this) => self.scheduling.rearm(this),
			None => debug!(actor = %self.shared.id(), "woken while being dropped"),
		}
	}
}

impl<M, S, R> Terminate for ComposedActor<M, S, R>
where
	M: Send + 'static,
	S: SchedulingPolicy,
	R: ResumePolicy,
{
	fn id(&self) -> ActorId {
		self.shared.id()
	}

	fn name(&self) -> &str {
		self.shared.name()
	}

	fn terminate(&self) -> bool {
		if self.shared.state().is_done() {
			return false;
		}
		if let Ok(true) = self.shared.enqueue(Envelope::Exit) {
			self.rearm();
		}
		true
	}
}

impl<M, S, R> Drop for ComposedActor<M, S, R> {
	fn drop(&mut self) {
		self.registry.remove(self.shared.id());
	}
}

/// Builds the actor selected by `options` and hands it to its execution
/// resource.
pub(crate) fn assemble<A: Actor>(
	actor: A,
	options: SpawnOptions,
	env: SpawnEnv<'_>,
) -> Result<Spawned<A::Message>, SpawnError> {
	let strategy = Strategy::select(options)?;
	debug!(actor = %env.id, name = %env.name, ?strategy, "assembling actor");

	match strategy.priority {
		PriorityKind::Prioritizing => with_priority::<A, Prioritizing<A::Message>>(actor, strategy, env),
		PriorityKind::NotPrioritizing => with_priority::<A, NotPrioritizing>(actor, strategy, env),
	}
}

fn with_priority<A, P>(actor: A, strategy: Strategy, env: SpawnEnv<'_>) -> Result<Spawned<A::Message>, SpawnError>
where
	A: Actor,
	P: PriorityPolicy<A::Message> + 'static,
{
	let config = actor.config();
	let stack_size = config.stack_size.unwrap_or(env.stack_size);
	let capacity = config.mailbox_capacity;

	match (strategy.scheduling, strategy.resume, strategy.invoke) {
		(SchedulingKind::Cooperative, ResumeKind::EventBased, InvokeKind::Sequential) => {
			let scheduling = Cooperative::new(env.scheduler.clone());
			compose(scheduling, env, capacity, |shared, this| {
				EventBasedResume::new(ActorCell::<A, P, Sequential>::new(actor, shared, this))
			})
		}
		(SchedulingKind::Dedicated, ResumeKind::EventBased, InvokeKind::Sequential) => {
			let scheduling = Dedicated::new(env.thread_name.clone());
			compose(scheduling, env, capacity, |shared, this| {
				EventBasedResume::new(ActorCell::<A, P, Sequential>::new(actor, shared, this))
			})
		}
		(SchedulingKind::Cooperative, ResumeKind::ContextSwitching, InvokeKind::Nestable) => {
			let scheduling = Cooperative::new(env.scheduler.clone());
			compose(scheduling, env, capacity, |shared, this| {
				let cell = ActorCell::<A, P, Nestable<A::Message>>::new(actor, shared, this);
				ContextSwitchingResume::new(cell, stack_size)
			})
		}
		(SchedulingKind::Dedicated, ResumeKind::NoResume, InvokeKind::Nestable) => {
			let scheduling = Dedicated::new(env.thread_name.clone());
			compose(scheduling, env, capacity, |shared, this| {
				NoResume::new(ActorCell::<A, P, Nestable<A::Message>>::new(actor, shared, this))
			})
		}
		(scheduling, resume, invoke) => {
			fatal!("incoherent strategy {scheduling:?}/{resume:?}/{invoke:?}")
		}
	}
}

fn compose<M, S, R, F>(scheduling: S, env: SpawnEnv<'_>, capacity: usize, build: F) -> Result<Spawned<M>, SpawnError>
where
	M: Send + 'static,
	S: SchedulingPolicy,
	R: ResumePolicy,
	F: FnOnce(Arc<ActorShared<M>>, Weak<dyn Deliver<M>>) -> R,
{
	let id = env.id;
	let shared = Arc::new(ActorShared::new(id, env.name, capacity));
	let registry = env.registry.clone();

	let composed = Arc::new_cyclic(|this: &Weak<ComposedActor<M, S, R>>| {
		let deliver: Weak<dyn Deliver<M>> = this.clone();
		ComposedActor {
			shared: shared.clone(),
			scheduling,
			resume: Mutex::new(build(shared, deliver)),
			registry,
			this: this.clone(),
		}
	});

	let terminate = Arc::downgrade(&composed);
	env.registry.insert(id, terminate);

	// a failed launch drops `composed`, which unregisters it
	let launched = composed.scheduling.launch(composed.clone())?;
	trace!(actor = %id, resume = ?R::KIND, scheduling = ?S::KIND, "actor launched");

	Ok(Spawned {
		actor_ref: ActorRef::new(composed),
		launched,
	})
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;
	use crate::{
		actor::{context::Context, traits::Flow},
		scheduler::manual::ManualScheduler,
	};

	struct Counter {
		seen: Arc<AtomicUsize>,
	}

	impl Actor for Counter {
		type State = ();
		type Message = usize;

		fn init(&self, _ctx: &mut Context<'_, usize>) -> Self::State {}

		fn handle(&self, _state: &mut (), msg: usize, _ctx: &mut Context<'_, usize>) -> Flow {
			self.seen.fetch_add(msg, Ordering::SeqCst);
			Flow::Continue
		}
	}

	fn spawn(
		options: SpawnOptions,
		scheduler: &Arc<ManualScheduler>,
		registry: &Arc<Registry>,
	) -> Result<(ActorRef<usize>, Arc<AtomicUsize>), SpawnError> {
		let seen = Arc::new(AtomicUsize::new(0));
		let dyn_scheduler: Arc<dyn Scheduler> = scheduler.clone();
		let spawned = assemble(
			Counter {
				seen: seen.clone(),
			},
			options,
			SpawnEnv {
				id: ActorId::new(1),
				name: "counter".into(),
				scheduler: &dyn_scheduler,
				stack_size: 0x4000,
				thread_name: "counter".into(),
				registry,
			},
		)?;
		Ok((spawned.actor_ref, seen))
	}

	#[test]
	fn test_rejects_monitor_before_building_anything() {
		let scheduler = Arc::new(ManualScheduler::new());
		let registry = Arc::new(Registry::default());

		let err = spawn(SpawnOptions::MONITOR, &scheduler, &registry).unwrap_err();
		assert!(matches!(err, SpawnError::TopLevelRelation { .. }));
		assert_eq!(scheduler.pending(), 0);
		assert_eq!(registry.len(), 0);
	}

	#[test]
	fn test_cooperative_actor_is_scheduled_and_registered() {
		let scheduler = Arc::new(ManualScheduler::new());
		let registry = Arc::new(Registry::default());

		let (actor, seen) = spawn(SpawnOptions::empty(), &scheduler, &registry).unwrap();
		assert_eq!(scheduler.pending(), 1);
		assert_eq!(registry.len(), 1);

		actor.send(5).unwrap();
		assert_eq!(scheduler.run_next(), Some((actor.id(), ResumeResult::ActorBlocked)));
		assert_eq!(seen.load(Ordering::SeqCst), 5);

		// wakes from blocked, so it is scheduled again
		actor.send(2).unwrap();
		assert_eq!(scheduler.pending(), 1);
		assert_eq!(scheduler.run_next(), Some((actor.id(), ResumeResult::ActorBlocked)));
		assert_eq!(seen.load(Ordering::SeqCst), 7);
	}

	#[test]
	fn test_dropping_last_reference_unregisters() {
		let scheduler = Arc::new(ManualScheduler::new());
		let registry = Arc::new(Registry::default());

		let (actor, _) = spawn(SpawnOptions::BLOCKING_API, &scheduler, &registry).unwrap();
		scheduler.run_until_idle();
		assert_eq!(registry.len(), 1);

		drop(actor);
		assert_eq!(registry.len(), 0);
	}
}
