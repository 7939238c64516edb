// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: frame access, project files, dataset export.

pub mod export;
pub mod frames;
pub mod probe;
pub mod serialization;
