// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Gslb` reconciliation pass.
//!
//! One pass, in order:
//!
//! 1. Deleted Gslb: finalize the provider, drop the finalizer, stop.
//! 2. Ensure the finalizer.
//! 3. Derive and persist the `Ingress`.
//! 4. Publish the zone delegation through the DNS provider.
//! 5. Check the split-brain heartbeat; peer data is not trusted while it is stale.
//! 6. Resolve peer targets for every host and record them in the status.
//! 7. Requeue after the fixed delay.

use super::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use super::ingress::{derive_ingress, reconcile_ingress};
use super::result::{ReconcileError, ReconcileResultHandler};
use crate::constants::{GSLB_FINALIZER, KIND_GSLB};
use crate::context::Context;
use crate::crd::{Gslb, GslbStatus};
use crate::gslb_errors::GslbError;
use kube::runtime::controller::Action;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Split-brain status value when the heartbeat is fresh.
pub const SPLIT_BRAIN_FRESH: &str = "Fresh";

/// Reconcile one `Gslb`.
///
/// # Errors
///
/// Returns a [`ReconcileError`] for failures the controller's error policy
/// should back off on. Propagation lag is absorbed and requeued after the
/// fixed delay instead.
pub async fn reconcile_gslb(gslb: Arc<Gslb>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let handler = ReconcileResultHandler::new(KIND_GSLB, ctx.config.requeue_delay());
    let mut gslb = (*gslb).clone();
    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();
    let provider = &ctx.provider;
    debug!(namespace = %namespace, name = %name, provider = %provider, "Reconciling Gslb");

    if gslb.metadata.deletion_timestamp.is_some() {
        if has_finalizer(&gslb, GSLB_FINALIZER) {
            info!(namespace = %namespace, name = %name, "Gslb is being deleted; finalizing DNS provider");
            if let Err(e) = provider.finalize(&gslb).await {
                return handler.requeue_now_with_error(e);
            }
            if let Err(source) =
                remove_finalizer(ctx.clients.gslbs.as_ref(), &gslb, GSLB_FINALIZER).await
            {
                return handler.requeue_now_with_error(finalizer_error(&namespace, &name, source));
            }
        }
        return handler.stop();
    }

    if let Err(source) = ensure_finalizer(ctx.clients.gslbs.as_ref(), &gslb, GSLB_FINALIZER).await {
        return handler.requeue_now_with_error(finalizer_error(&namespace, &name, source));
    }

    let ingress = match derive_ingress(&mut gslb) {
        Ok(ingress) => ingress,
        Err(e) => return handler.requeue_now_with_error(e),
    };
    if let Err(e) = reconcile_ingress(ctx.clients.ingresses.as_ref(), &ingress).await {
        return handler.requeue_now_with_error(e);
    }

    if let Err(e) = provider.synchronize_delegation(&gslb).await {
        return if e.is_propagation_lag() {
            handler.requeue_delay_with_error(e)
        } else {
            handler.requeue_now_with_error(e)
        };
    }

    if let Err(e) = provider.split_brain_check(&gslb).await {
        update_status(
            &ctx,
            &gslb,
            GslbStatus {
                split_brain: Some(format!("{}: {e}", e.status_reason())),
                ..current_status(&gslb)
            },
        )
        .await;
        return handler.requeue_delay_with_error(e);
    }

    let mut peer_targets = BTreeMap::new();
    for host in gslb_hosts(&gslb) {
        let targets = provider.resolve_peer_targets(&host).await;
        info!(namespace = %namespace, name = %name, host = %host, targets = ?targets, "Peer targets");
        peer_targets.insert(host, targets);
    }
    update_status(
        &ctx,
        &gslb,
        GslbStatus {
            peer_targets,
            split_brain: Some(SPLIT_BRAIN_FRESH.to_string()),
            observed_generation: gslb.metadata.generation,
        },
    )
    .await;

    handler.requeue_delay()
}

/// Hosts of the Gslb's ingress rules, in rule order, without blanks.
#[must_use]
pub fn gslb_hosts(gslb: &Gslb) -> Vec<String> {
    gslb.spec
        .ingress
        .rules
        .iter()
        .flatten()
        .filter_map(|rule| rule.host.clone())
        .filter(|host| !host.is_empty())
        .collect()
}

fn current_status(gslb: &Gslb) -> GslbStatus {
    gslb.status.clone().unwrap_or_default()
}

fn finalizer_error(namespace: &str, name: &str, source: kube::Error) -> GslbError {
    GslbError::Persistence {
        operation: "patch",
        kind: KIND_GSLB,
        namespace: namespace.to_string(),
        name: name.to_string(),
        source,
    }
}

/// Status is informational; failing to write it never fails the pass.
async fn update_status(ctx: &Context, gslb: &Gslb, status: GslbStatus) {
    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();
    if gslb.status.as_ref() == Some(&status) {
        return;
    }
    let value = match serde_json::to_value(&status) {
        Ok(value) => value,
        Err(e) => {
            warn!(namespace = %namespace, name = %name, error = %e, "Failed to serialize Gslb status");
            return;
        }
    };
    if let Err(e) = ctx.clients.gslbs.patch_status(&namespace, &name, value).await {
        warn!(namespace = %namespace, name = %name, error = %e, "Failed to update Gslb status");
    }
}

#[cfg(test)]
#[path = "gslb_tests.rs"]
mod gslb_tests;
