// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod recorder;
pub mod util;

use std::sync::Once;

use spindle_sub_tracing::TracingBuilder;

/// Installs a test-friendly subscriber once per test binary.
///
/// Honours `RUST_LOG`; silent unless asked otherwise.
pub fn init_test_tracing() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		let builder = match std::env::var("RUST_LOG") {
			Ok(_) => TracingBuilder::from_env(),
			Err(_) => TracingBuilder::new().with_filter("off"),
		};
		// another harness may have installed one already
		let _ = builder.with_test_writer().try_init();
	});
}
