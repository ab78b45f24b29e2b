// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster-facing assistant and the edge DNS providers built on it.

pub mod assistant;
pub mod dns;
