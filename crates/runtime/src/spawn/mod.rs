// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Spawn options and actor assembly.

pub(crate) mod assembly;
pub mod options;
