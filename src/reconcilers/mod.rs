// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation for `Gslb` resources.
//!
//! # Reconciliation Architecture
//!
//! The controller follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - `Gslb` changes and changes to the `Ingress` objects it owns
//! 2. **Reconcile** - Derive the `Ingress` and publish the zone delegation
//! 3. **Verify** - Check the split-brain heartbeat before trusting peer data
//! 4. **Status** - Report peer targets and heartbeat state on the `Gslb`
//!
//! Every pass requeues after a fixed delay: DNS propagation and load balancer
//! assignment are not observable through watch events.
//!
//! # Example: Running the reconciler
//!
//! ```rust,no_run
//! use k8gb_sync::context::Context;
//! use k8gb_sync::crd::Gslb;
//! use k8gb_sync::reconcilers::reconcile_gslb;
//! use std::sync::Arc;
//!
//! async fn run_once(ctx: Arc<Context>, gslb: Gslb) -> anyhow::Result<()> {
//!     let action = reconcile_gslb(Arc::new(gslb), ctx).await?;
//!     println!("next: {action:?}");
//!     Ok(())
//! }
//! ```

pub mod finalizers;
pub mod gslb;
pub mod ingress;
pub mod result;

pub use gslb::reconcile_gslb;
pub use result::{ReconcileError, ReconcileResultHandler};
