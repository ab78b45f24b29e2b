// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for Kubernetes resources.
//!
//! # Example
//!
//! ```rust,ignore
//! use k8gb_sync::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
//!
//! if gslb.metadata.deletion_timestamp.is_some() {
//!     // clean up, then
//!     remove_finalizer(clients.gslbs.as_ref(), &gslb, GSLB_FINALIZER).await?;
//! } else {
//!     ensure_finalizer(clients.gslbs.as_ref(), &gslb, GSLB_FINALIZER).await?;
//! }
//! ```

use crate::cluster_api::ResourceStore;
use kube::{Resource, ResourceExt};
use tracing::info;

/// Returns true if `finalizer` is present on `resource`.
#[must_use]
pub fn has_finalizer<K: Resource>(resource: &K, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|existing| existing == finalizer))
}

/// Add a finalizer to a resource if not already present.
///
/// Idempotent: nothing is patched when the finalizer is already there.
///
/// # Errors
///
/// Returns the API error if the patch fails.
pub async fn ensure_finalizer<K>(
    store: &dyn ResourceStore<K>,
    resource: &K,
    finalizer: &str,
) -> Result<(), kube::Error>
where
    K: Resource<DynamicType = ()> + Send + Sync,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    info!(
        "Adding finalizer {} to {}/{} {}",
        finalizer,
        namespace,
        name,
        K::kind(&())
    );

    let mut finalizers = resource.finalizers().to_vec();
    finalizers.push(finalizer.to_string());
    store.patch_finalizers(&namespace, &name, &finalizers).await?;
    Ok(())
}

/// Remove a finalizer from a resource.
///
/// Idempotent: nothing is patched when the finalizer is already absent.
///
/// # Errors
///
/// Returns the API error if the patch fails.
pub async fn remove_finalizer<K>(
    store: &dyn ResourceStore<K>,
    resource: &K,
    finalizer: &str,
) -> Result<(), kube::Error>
where
    K: Resource<DynamicType = ()> + Send + Sync,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    info!(
        "Removing finalizer {} from {}/{} {}",
        finalizer,
        namespace,
        name,
        K::kind(&())
    );

    let finalizers: Vec<String> = resource
        .finalizers()
        .iter()
        .filter(|f| *f != finalizer)
        .cloned()
        .collect();
    store.patch_finalizers(&namespace, &name, &finalizers).await?;
    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
