// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing_subscriber::{EnvFilter, fmt};

use crate::TracingError;

/// Output format of the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
	Pretty,
	#[default]
	Compact,
	Json,
}

/// Builder for the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	filter: String,
	format: Format,
	thread_names: bool,
	test_writer: bool,
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self {
			filter: "info".to_string(),
			format: Format::default(),
			thread_names: true,
			test_writer: false,
		}
	}

	/// Starts from the `RUST_LOG` directive, falling back to `info`.
	pub fn from_env() -> Self {
		let mut builder = Self::new();
		if let Ok(directive) = std::env::var(EnvFilter::DEFAULT_ENV) {
			builder.filter = directive;
		}
		builder
	}

	/// Filter directive, e.g. `spindle_runtime=trace,info`.
	pub fn with_filter(mut self, directive: impl Into<String>) -> Self {
		self.filter = directive.into();
		self
	}

	pub fn with_format(mut self, format: Format) -> Self {
		self.format = format;
		self
	}

	pub fn with_thread_names(mut self, enabled: bool) -> Self {
		self.thread_names = enabled;
		self
	}

	/// Route output through the test harness so it is captured per test.
	pub fn with_test_writer(mut self) -> Self {
		self.test_writer = true;
		self
	}

	pub fn filter(&self) -> &str {
		&self.filter
	}

	pub fn format(&self) -> Format {
		self.format
	}

	/// Installs the subscriber globally.
	pub fn try_init(self) -> Result<(), TracingError> {
		let filter = EnvFilter::try_new(&self.filter)?;
		let builder = fmt().with_env_filter(filter).with_thread_names(self.thread_names);

		let result = match (self.format, self.test_writer) {
			(Format::Pretty, false) => builder.pretty().try_init(),
			(Format::Pretty, true) => builder.pretty().with_test_writer().try_init(),
			(Format::Compact, false) => builder.compact().try_init(),
			(Format::Compact, true) => builder.compact().with_test_writer().try_init(),
			(Format::Json, false) => builder.json().try_init(),
			(Format::Json, true) => builder.json().with_test_writer().try_init(),
		};
		result.map_err(|_| TracingError::AlreadyInstalled)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let builder = TracingBuilder::new();
		assert_eq!(builder.filter(), "info");
		assert_eq!(builder.format(), Format::Compact);
	}

	#[test]
	fn test_invalid_directive_is_rejected() {
		let err = TracingBuilder::new().with_filter("spindle=notalevel").try_init().unwrap_err();
		assert!(matches!(err, TracingError::Filter(_)));
	}

	#[test]
	fn test_second_install_reports_error() {
		let first = TracingBuilder::new().with_filter("warn").with_test_writer().try_init();
		let second = TracingBuilder::new().with_filter("warn").with_test_writer().try_init();

		// another test in this binary may have won the first install
		assert!(first.is_ok() || matches!(first, Err(TracingError::AlreadyInstalled)));
		assert!(matches!(second, Err(TracingError::AlreadyInstalled)));
	}
}
