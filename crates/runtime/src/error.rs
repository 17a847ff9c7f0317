// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fmt, io};

use thiserror::Error;

/// Spawn requests that cannot be turned into a running actor.
#[derive(Debug, Error)]
pub enum SpawnError {
	/// Monitor and link relations must be established after construction.
	#[error("top-level spawns cannot carry the {flag} flag")]
	TopLevelRelation {
		flag: &'static str,
	},

	#[error("failed to start dedicated thread for actor {name}: {source}")]
	Thread {
		name: String,
		#[source]
		source: io::Error,
	},

	#[error("actor system is shut down")]
	ShutDown,
}

/// Errors surfaced by a nested receive inside a message handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReceiveError {
	#[error("nested receive requires the blocking API")]
	NotNestable,

	#[error("actor was asked to terminate while awaiting a reply")]
	Terminated,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
	#[error(transparent)]
	Spawn(#[from] SpawnError),

	#[error("failed to start worker thread: {0}")]
	WorkerThread(#[source] io::Error),

	#[error("shutdown timed out with {remaining} actor(s) still running")]
	ShutdownTimeout {
		remaining: usize,
	},
}

/// A message that could not be enqueued, handed back to the sender.
pub enum SendError<M> {
	/// The receiving actor already finished.
	Terminated(M),
	/// The receiving actor's bounded mailbox is at capacity.
	Full(M),
}

impl<M> SendError<M> {
	pub fn into_inner(self) -> M {
		match self {
			SendError::Terminated(msg) | SendError::Full(msg) => msg,
		}
	}
}

impl<M> fmt::Debug for SendError<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SendError::Terminated(_) => f.write_str("Terminated(..)"),
			SendError::Full(_) => f.write_str("Full(..)"),
		}
	}
}

impl<M> fmt::Display for SendError<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SendError::Terminated(_) => write!(f, "sending to a terminated actor"),
			SendError::Full(_) => write!(f, "actor mailbox is full"),
		}
	}
}

impl<M> std::error::Error for SendError<M> {}
