// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Narrow cluster API access used by the synchronization core.
//!
//! The core only touches single objects addressed by exact namespace and name.
//! Listing and watching are the runtime controller's job. Each
//! consumer receives a [`ResourceStore`] per kind, so tests can substitute
//! in-memory stores without a running API server.
//!
//! # Example
//!
//! ```rust,no_run
//! use k8gb_sync::cluster_api::{KubeStore, ResourceStore};
//! use k8s_openapi::api::core::v1::Service;
//! use kube::Client;
//!
//! async fn example(client: Client) -> Result<(), kube::Error> {
//!     let services: KubeStore<Service> = KubeStore::new(client);
//!     let svc = services.get("k8gb", "k8gb-coredns-lb").await?;
//!     println!("service present: {}", svc.is_some());
//!     Ok(())
//! }
//! ```

use crate::constants::FIELD_MANAGER;
use crate::crd::{DNSEndpoint, Gslb};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Single-object access to one namespaced resource kind.
///
/// Errors are returned untouched from the API client; callers add context.
#[async_trait]
pub trait ResourceStore<K>: Send + Sync
where
    K: Send + Sync,
{
    /// Fetch `namespace/name`; `Ok(None)` when absent.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, kube::Error>;

    /// Create the object in its own namespace.
    async fn create(&self, object: &K) -> Result<K, kube::Error>;

    /// Replace an existing object; its resource version must be set.
    async fn replace(&self, object: &K) -> Result<K, kube::Error>;

    /// Delete `namespace/name`. Deleting an absent object is an error here.
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), kube::Error>;

    /// Merge-patch the finalizer list of `namespace/name`.
    async fn patch_finalizers(
        &self,
        namespace: &str,
        name: &str,
        finalizers: &[String],
    ) -> Result<K, kube::Error>;

    /// Merge-patch the status subresource of `namespace/name`.
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: serde_json::Value,
    ) -> Result<(), kube::Error>;
}

/// [`ResourceStore`] backed by the Kubernetes API.
pub struct KubeStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    /// Wrap a kube client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
{
    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl<K> ResourceStore<K> for KubeStore<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, kube::Error> {
        debug!(namespace = %namespace, name = %name, kind = %K::kind(&()), "Getting resource");
        self.api(namespace).get_opt(name).await
    }

    async fn create(&self, object: &K) -> Result<K, kube::Error> {
        let namespace = object.namespace().unwrap_or_default();
        debug!(namespace = %namespace, name = %object.name_any(), kind = %K::kind(&()), "Creating resource");
        self.api(&namespace)
            .create(&PostParams::default(), object)
            .await
    }

    async fn replace(&self, object: &K) -> Result<K, kube::Error> {
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();
        debug!(namespace = %namespace, name = %name, kind = %K::kind(&()), "Replacing resource");
        self.api(&namespace)
            .replace(&name, &PostParams::default(), object)
            .await
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), kube::Error> {
        debug!(namespace = %namespace, name = %name, kind = %K::kind(&()), "Deleting resource");
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
    }

    async fn patch_finalizers(
        &self,
        namespace: &str,
        name: &str,
        finalizers: &[String],
    ) -> Result<K, kube::Error> {
        let patch = json!({ "metadata": { "finalizers": finalizers } });
        self.api(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: serde_json::Value,
    ) -> Result<(), kube::Error> {
        let patch = json!({ "status": status });
        self.api(namespace)
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map(|_| ())
    }
}

/// Stores for every kind the synchronization core touches.
#[derive(Clone)]
pub struct ClusterClients {
    /// Gslb finalizer and status patches
    pub gslbs: Arc<dyn ResourceStore<Gslb>>,
    /// Edge DNS load balancer services
    pub services: Arc<dyn ResourceStore<Service>>,
    /// Derived ingresses
    pub ingresses: Arc<dyn ResourceStore<Ingress>>,
    /// Delegation records
    pub dns_endpoints: Arc<dyn ResourceStore<DNSEndpoint>>,
}

impl ClusterClients {
    /// Build API-backed stores sharing one client.
    #[must_use]
    pub fn from_client(client: &Client) -> Self {
        Self {
            gslbs: Arc::new(KubeStore::<Gslb>::new(client.clone())),
            services: Arc::new(KubeStore::<Service>::new(client.clone())),
            ingresses: Arc::new(KubeStore::<Ingress>::new(client.clone())),
            dns_endpoints: Arc::new(KubeStore::<DNSEndpoint>::new(client.clone())),
        }
    }
}

/// Returns true when the API error means "object does not exist".
#[must_use]
pub fn is_api_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}
