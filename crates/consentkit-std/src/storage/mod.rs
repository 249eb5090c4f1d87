// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Storage backend implementations.

pub mod file;

pub use file::FileStorage;
