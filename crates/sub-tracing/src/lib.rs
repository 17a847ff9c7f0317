// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Installs the process-wide `tracing` subscriber.

mod builder;

pub use builder::{Format, TracingBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TracingError {
	#[error("invalid filter directive: {0}")]
	Filter(#[from] tracing_subscriber::filter::ParseError),

	#[error("a global subscriber is already installed")]
	AlreadyInstalled,
}
