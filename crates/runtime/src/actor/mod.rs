// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Actor model primitives.
//!
//! - [`traits`]: the [`Actor`](traits::Actor) behavior trait and [`Flow`](traits::Flow)
//! - [`state`]: the atomic four-state machine shared with enqueuers
//! - [`fiber`]: suspendable execution contexts
//! - [`mailbox`]: the mailbox facade, envelopes and [`ActorRef`](mailbox::ActorRef)
//! - [`fetch`]: blocking and non-blocking mailbox fetch protocols
//! - [`system`]: the actor system that spawns and shuts down actors

pub(crate) mod cell;
pub mod context;
pub(crate) mod fetch;
pub mod fiber;
pub mod mailbox;
pub mod shared;
pub mod state;
pub mod system;
pub mod traits;
