// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # k8gb-sync - GSLB DNS synchronization for Kubernetes
//!
//! k8gb-sync keeps the edge DNS delegation of a cluster in step with its
//! `Gslb` resources and watches the split-brain heartbeat that tells whether
//! data observed from peer clusters can be trusted.
//!
//! ## Overview
//!
//! For every `Gslb` the controller:
//!
//! - Derives the cluster-local `Ingress` and stamps the strategy annotations
//! - Publishes an NS delegation plus glue A record through an external-dns `DNSEndpoint`
//! - Checks the age of the split-brain TXT heartbeat at the edge DNS server
//! - Resolves the targets peer clusters publish for each host
//!
//! ## Modules
//!
//! - [`crd`] - `Gslb` and external-dns `DNSEndpoint` resource types
//! - [`config`] - Operator configuration from flags and environment
//! - [`cluster_api`] - Narrow store seam over the Kubernetes API
//! - [`dns_query`] - Outbound DNS queries
//! - [`providers`] - Cluster assistant and pluggable edge DNS providers
//! - [`reconcilers`] - The `Gslb` reconciliation pass and its outcome policy
//! - [`context`] - Shared controller context
//!
//! ## Example
//!
//! ```rust,no_run
//! use k8gb_sync::config::Config;
//! use k8gb_sync::context::Context;
//!
//! # async fn run(config: Config) -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let ctx = Context::from_client(config, &client)?;
//! println!("using {} edge DNS", ctx.provider);
//! # Ok(())
//! # }
//! ```

pub mod cluster_api;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod dns_query;
pub mod gslb_errors;
pub mod labels;
pub mod metrics;
pub mod providers;
pub mod reconcilers;

#[cfg(test)]
mod test_support;
