// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use bitflags::bitflags;

bitflags! {
	/// Flags fixed at spawn time that select an actor's strategy composition.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct SpawnOptions: u8 {
		/// Run on a dedicated thread instead of the shared worker pool.
		const DETACHED = 1 << 0;
		/// Allow handlers to suspend, enabling nested `receive`.
		const BLOCKING_API = 1 << 1;
		/// Deliver high-priority messages before normal ones.
		const PRIORITY_AWARE = 1 << 2;
		/// Rejected on top-level spawns.
		const MONITOR = 1 << 3;
		/// Rejected on top-level spawns.
		const LINK = 1 << 4;
	}
}
