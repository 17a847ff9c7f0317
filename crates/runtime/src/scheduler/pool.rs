// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! M:N worker pool.

use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;
use tracing::{debug, error, trace, trace_span};

use crate::{
	error::RuntimeError,
	scheduler::{Resumable, Scheduler, WorkerContext},
};

/// Interval for checking shutdown while waiting for work.
const SHUTDOWN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// A fixed set of named threads resuming actors from one shared queue.
pub struct WorkerPool {
	tx: Sender<Arc<dyn Resumable>>,
	shutdown: Arc<AtomicBool>,
	workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
	/// Starts `workers` threads named `{thread_name}-{index}`.
	pub fn new(workers: usize, thread_name: &str) -> Result<Self, RuntimeError> {
		let (tx, rx) = unbounded::<Arc<dyn Resumable>>();
		let shutdown = Arc::new(AtomicBool::new(false));

		let mut handles = Vec::with_capacity(workers);
		for index in 0..workers.max(1) {
			let worker = WorkerContext::new(index, format!("{thread_name}-{index}"));
			let rx = rx.clone();
			let worker_shutdown = shutdown.clone();

			let spawned = thread::Builder::new()
				.name(worker.name().to_string())
				.spawn(move || worker_loop(worker, rx, worker_shutdown));

			match spawned {
				Ok(handle) => handles.push(handle),
				Err(err) => {
					shutdown.store(true, Ordering::SeqCst);
					for handle in handles {
						let _ = handle.join();
					}
					return Err(RuntimeError::WorkerThread(err));
				}
			}
		}

		debug!(workers = handles.len(), "worker pool started");
		Ok(Self {
			tx,
			shutdown,
			workers: Mutex::new(handles),
		})
	}

	pub fn workers(&self) -> usize {
		self.workers.lock().len()
	}

	/// Stops the workers and waits for them. Jobs still queued are dropped.
	pub fn shutdown(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		let handles: Vec<_> = self.workers.lock().drain(..).collect();
		for handle in handles {
			if handle.join().is_err() {
				error!("worker thread panicked");
			}
		}
		debug!("worker pool stopped");
	}
}

impl Scheduler for WorkerPool {
	fn schedule(&self, job: Arc<dyn Resumable>) {
		if self.tx.send(job).is_err() {
			error!("worker pool queue disconnected");
		}
	}
}

impl Drop for WorkerPool {
	fn drop(&mut self) {
		self.shutdown.store(true, Ordering::SeqCst);
	}
}

fn worker_loop(worker: WorkerContext, rx: Receiver<Arc<dyn Resumable>>, shutdown: Arc<AtomicBool>) {
	let span = trace_span!("worker", worker = worker.id());
	let _enter = span.enter();
	trace!("worker started");

	while !shutdown.load(Ordering::SeqCst) {
		let job = match rx.recv_timeout(SHUTDOWN_CHECK_INTERVAL) {
			Ok(job) => job,
			Err(RecvTimeoutError::Timeout) => continue,
			Err(RecvTimeoutError::Disconnected) => break,
		};

		let outcome = catch_unwind(AssertUnwindSafe(|| job.resume(&worker)));
		if outcome.is_err() {
			error!(actor = %job.id(), name = job.name(), "actor panicked, dropping it");
		}
	}

	// release actors that never got to run again
	while rx.try_recv().is_ok() {}
	trace!("worker stopped");
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use spindle_testing::util::wait::wait_for;

	use super::*;
	use crate::{actor::shared::ActorId, policy::ResumeResult};

	struct Counting {
		resumes: AtomicUsize,
		panics: bool,
	}

	impl Resumable for Counting {
		fn id(&self) -> ActorId {
			ActorId::new(7)
		}

		fn name(&self) -> &str {
			"counting"
		}

		fn resume(&self, _worker: &WorkerContext) -> ResumeResult {
			self.resumes.fetch_add(1, Ordering::SeqCst);
			if self.panics {
				panic!("boom");
			}
			ResumeResult::ActorDone
		}
	}

	#[test]
	fn test_runs_scheduled_jobs() {
		let pool = WorkerPool::new(2, "test-worker").unwrap();
		assert_eq!(pool.workers(), 2);

		let job = Arc::new(Counting {
			resumes: AtomicUsize::new(0),
			panics: false,
		});
		for _ in 0..10 {
			pool.schedule(job.clone());
		}

		wait_for(|| job.resumes.load(Ordering::SeqCst) == 10, "all jobs should run");
		pool.shutdown();
		assert_eq!(pool.workers(), 0);
	}

	#[test]
	fn test_survives_panicking_actor() {
		let pool = WorkerPool::new(1, "test-worker").unwrap();
		let bad = Arc::new(Counting {
			resumes: AtomicUsize::new(0),
			panics: true,
		});
		let good = Arc::new(Counting {
			resumes: AtomicUsize::new(0),
			panics: false,
		});

		pool.schedule(bad.clone());
		pool.schedule(good.clone());

		wait_for(|| good.resumes.load(Ordering::SeqCst) == 1, "healthy job should run after the panic");
		assert_eq!(bad.resumes.load(Ordering::SeqCst), 1);
		pool.shutdown();
	}
}
