// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Collects values observed by actors so tests can assert on delivery.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::wait::wait_for;

/// A cloneable, thread-safe append-only log.
#[derive(Debug)]
pub struct Recorder<T> {
	entries: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
	fn clone(&self) -> Self {
		Self {
			entries: self.entries.clone(),
		}
	}
}

impl<T> Default for Recorder<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Recorder<T> {
	pub fn new() -> Self {
		Self {
			entries: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn record(&self, value: T) {
		self.entries.lock().push(value);
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Blocks until at least `count` values were recorded.
	pub fn wait_for_len(&self, count: usize) {
		wait_for(|| self.len() >= count, &format!("expected {count} recorded values"));
	}
}

impl<T: Clone> Recorder<T> {
	pub fn snapshot(&self) -> Vec<T> {
		self.entries.lock().clone()
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use super::*;

	#[test]
	fn test_records_across_threads() {
		let recorder = Recorder::new();
		let handles: Vec<_> = (0..4)
			.map(|i| {
				let recorder = recorder.clone();
				thread::spawn(move || recorder.record(i))
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		recorder.wait_for_len(4);
		let mut seen = recorder.snapshot();
		seen.sort();
		assert_eq!(seen, vec![0, 1, 2, 3]);
	}
}
