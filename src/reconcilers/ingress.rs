// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Derivation and persistence of the cluster-local `Ingress` of a `Gslb`.

use crate::cluster_api::ResourceStore;
use crate::constants::{KIND_GSLB, KIND_INGRESS};
use crate::crd::Gslb;
use crate::gslb_errors::{GslbError, Result};
use crate::labels::{PRIMARY_GEO_TAG_ANNOTATION, STRATEGY_ANNOTATION};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use tracing::{debug, error, info};

/// Build the `Ingress` for `gslb`.
///
/// The strategy annotations are stamped onto `gslb` first, then copied to the
/// ingress along with the embedded spec. The ingress is controller-owned by the
/// Gslb so it is garbage collected with it.
///
/// # Errors
///
/// Returns [`GslbError::InvalidResource`] when the Gslb has no name or UID.
pub fn derive_ingress(gslb: &mut Gslb) -> Result<Ingress> {
    let strategy = gslb.spec.strategy.r#type.clone();
    let primary = gslb
        .spec
        .strategy
        .primary_geo_tag
        .clone()
        .filter(|tag| !tag.is_empty());
    let annotations = gslb.annotations_mut();
    annotations.insert(STRATEGY_ANNOTATION.to_string(), strategy);
    if let Some(primary) = primary {
        annotations.insert(PRIMARY_GEO_TAG_ANNOTATION.to_string(), primary);
    }

    let owner = gslb
        .controller_owner_ref(&())
        .ok_or_else(|| GslbError::InvalidResource {
            kind: KIND_GSLB,
            namespace: gslb.namespace().unwrap_or_default(),
            name: gslb.name_any(),
            reason: "name and uid are required to own the derived Ingress".to_string(),
        })?;

    Ok(Ingress {
        metadata: ObjectMeta {
            name: gslb.metadata.name.clone(),
            namespace: gslb.metadata.namespace.clone(),
            annotations: gslb.metadata.annotations.clone(),
            owner_references: Some(vec![owner]),
            ..ObjectMeta::default()
        },
        spec: Some(gslb.spec.ingress.clone()),
        status: None,
    })
}

/// Create `ingress`, or overwrite the spec and annotations of the existing one.
///
/// # Errors
///
/// Returns [`GslbError::Persistence`] wrapping the API error.
pub async fn reconcile_ingress(store: &dyn ResourceStore<Ingress>, ingress: &Ingress) -> Result<()> {
    let namespace = ingress.namespace().unwrap_or_default();
    let name = ingress.name_any();
    let persistence = |operation: &'static str, source: kube::Error| {
        error!(namespace = %namespace, name = %name, operation, error = %source, "Failed to persist Ingress");
        GslbError::Persistence {
            operation,
            kind: KIND_INGRESS,
            namespace: namespace.clone(),
            name: name.clone(),
            source,
        }
    };

    match store
        .get(&namespace, &name)
        .await
        .map_err(|e| persistence("get", e))?
    {
        None => {
            info!(namespace = %namespace, name = %name, "Creating a new Ingress");
            store
                .create(ingress)
                .await
                .map_err(|e| persistence("create", e))?;
        }
        Some(mut found) => {
            found.spec.clone_from(&ingress.spec);
            found.metadata.annotations.clone_from(&ingress.metadata.annotations);
            store
                .replace(&found)
                .await
                .map_err(|e| persistence("update", e))?;
            debug!(namespace = %namespace, name = %name, "Updated Ingress");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod ingress_tests;
