// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory doubles for the cluster API and DNS seams.

use crate::cluster_api::{ClusterClients, ResourceStore};
use crate::config::{Config, InfobloxConfig};
use crate::crd::{Gslb, GslbSpec, Strategy};
use crate::dns_query::{DnsAnswer, DnsQuerier};
use crate::gslb_errors::{GslbError, Result};
use async_trait::async_trait;
use hickory_client::rr::RecordType;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, IngressBackend, IngressRule, IngressServiceBackend,
    IngressSpec, ServiceBackendPort,
};
use kube::api::ObjectMeta;
use kube::error::ErrorResponse;
use kube::{Resource, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

type Key = (String, String);

/// Store keeping objects in a map and counting writes.
pub struct MemoryStore<K> {
    objects: Mutex<BTreeMap<Key, K>>,
    statuses: Mutex<BTreeMap<Key, serde_json::Value>>,
    fail_with: Mutex<Option<u16>>,
    creates: Mutex<usize>,
    replaces: Mutex<usize>,
    deletes: Mutex<usize>,
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            statuses: Mutex::new(BTreeMap::new()),
            fail_with: Mutex::new(None),
            creates: Mutex::new(0),
            replaces: Mutex::new(0),
            deletes: Mutex::new(0),
        }
    }
}

impl<K> MemoryStore<K>
where
    K: Resource + Clone,
{
    pub fn insert(&self, object: K) {
        let key = (object.namespace().unwrap_or_default(), object.name_any());
        self.objects.lock().unwrap().insert(key, object);
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Last status patched onto `namespace/name`.
    pub fn status(&self, namespace: &str, name: &str) -> Option<serde_json::Value> {
        self.statuses
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Make every subsequent call fail with an API error of this code.
    pub fn fail_with(&self, code: u16) {
        *self.fail_with.lock().unwrap() = Some(code);
    }

    pub fn create_count(&self) -> usize {
        *self.creates.lock().unwrap()
    }

    pub fn replace_count(&self) -> usize {
        *self.replaces.lock().unwrap()
    }

    pub fn delete_count(&self) -> usize {
        *self.deletes.lock().unwrap()
    }

    fn check_failure(&self) -> std::result::Result<(), kube::Error> {
        match *self.fail_with.lock().unwrap() {
            Some(code) => Err(api_error(code)),
            None => Ok(()),
        }
    }
}

pub fn api_error(code: u16) -> kube::Error {
    let reason = if code == 404 { "NotFound" } else { "InternalError" };
    kube::Error::Api(Box::new(ErrorResponse {
        status: Some(kube::core::response::StatusSummary::Failure),
        message: format!("simulated {code}"),
        reason: reason.to_string(),
        code,
        metadata: None,
        details: None,
    }))
}

#[async_trait]
impl<K> ResourceStore<K> for MemoryStore<K>
where
    K: Resource + Clone + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> std::result::Result<Option<K>, kube::Error> {
        self.check_failure()?;
        Ok(self.stored(namespace, name))
    }

    async fn create(&self, object: &K) -> std::result::Result<K, kube::Error> {
        self.check_failure()?;
        let key = (object.namespace().unwrap_or_default(), object.name_any());
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(api_error(409));
        }
        let mut created = object.clone();
        created.meta_mut().resource_version = Some("1".to_string());
        created.meta_mut().uid = Some(format!("uid-{}-{}", key.0, key.1));
        objects.insert(key, created.clone());
        *self.creates.lock().unwrap() += 1;
        Ok(created)
    }

    async fn replace(&self, object: &K) -> std::result::Result<K, kube::Error> {
        self.check_failure()?;
        let key = (object.namespace().unwrap_or_default(), object.name_any());
        let mut objects = self.objects.lock().unwrap();
        let Some(current) = objects.get(&key) else {
            return Err(api_error(404));
        };
        if current.meta().resource_version != object.meta().resource_version {
            return Err(api_error(409));
        }
        let next_version = current
            .meta()
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let mut replaced = object.clone();
        replaced.meta_mut().resource_version = Some(next_version.to_string());
        objects.insert(key, replaced.clone());
        *self.replaces.lock().unwrap() += 1;
        Ok(replaced)
    }

    async fn delete(&self, namespace: &str, name: &str) -> std::result::Result<(), kube::Error> {
        self.check_failure()?;
        let removed = self
            .objects
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()));
        match removed {
            Some(_) => {
                *self.deletes.lock().unwrap() += 1;
                Ok(())
            }
            None => Err(api_error(404)),
        }
    }

    async fn patch_finalizers(
        &self,
        namespace: &str,
        name: &str,
        finalizers: &[String],
    ) -> std::result::Result<K, kube::Error> {
        self.check_failure()?;
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get_mut(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| api_error(404))?;
        object.meta_mut().finalizers = Some(finalizers.to_vec());
        Ok(object.clone())
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: serde_json::Value,
    ) -> std::result::Result<(), kube::Error> {
        self.check_failure()?;
        let key = (namespace.to_string(), name.to_string());
        if !self.objects.lock().unwrap().contains_key(&key) {
            return Err(api_error(404));
        }
        self.statuses.lock().unwrap().insert(key, status);
        Ok(())
    }
}

enum Scripted {
    Answers(Vec<DnsAnswer>),
    Fail(String),
}

/// DNS querier answering from a script keyed by server, name and type.
///
/// Unscripted queries return an empty answer.
#[derive(Default)]
pub struct FakeQuerier {
    script: Mutex<HashMap<(String, String, RecordType), Scripted>>,
    calls: Mutex<Vec<(String, String, RecordType)>>,
}

impl FakeQuerier {
    pub fn answer_a(&self, server: &str, name: &str, addresses: &[&str]) {
        let answers = addresses
            .iter()
            .map(|address| DnsAnswer {
                name: name.to_string(),
                ttl: 30,
                record_type: RecordType::A,
                data: (*address).to_string(),
            })
            .collect();
        self.script.lock().unwrap().insert(
            (server.to_string(), name.to_string(), RecordType::A),
            Scripted::Answers(answers),
        );
    }

    pub fn answer_txt(&self, server: &str, name: &str, value: &str) {
        let answer = DnsAnswer {
            name: name.to_string(),
            ttl: 30,
            record_type: RecordType::TXT,
            data: format!("\"{value}\""),
        };
        self.script.lock().unwrap().insert(
            (server.to_string(), name.to_string(), RecordType::TXT),
            Scripted::Answers(vec![answer]),
        );
    }

    pub fn fail(&self, server: &str, name: &str, record_type: RecordType, reason: &str) {
        self.script.lock().unwrap().insert(
            (server.to_string(), name.to_string(), record_type),
            Scripted::Fail(reason.to_string()),
        );
    }

    pub fn servers_queried(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(server, _, _)| server.clone())
            .collect()
    }
}

#[async_trait]
impl DnsQuerier for FakeQuerier {
    async fn query(
        &self,
        server: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsAnswer>> {
        let key = (server.to_string(), name.to_string(), record_type);
        self.calls.lock().unwrap().push(key.clone());
        match self.script.lock().unwrap().get(&key) {
            Some(Scripted::Answers(answers)) => Ok(answers.clone()),
            Some(Scripted::Fail(reason)) => Err(GslbError::Query {
                server: server.to_string(),
                name: name.to_string(),
                record_type: record_type.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Memory stores for every kind plus a [`ClusterClients`] view of them.
pub struct MemoryCluster {
    pub gslbs: Arc<MemoryStore<Gslb>>,
    pub services: Arc<MemoryStore<Service>>,
    pub ingresses: Arc<MemoryStore<k8s_openapi::api::networking::v1::Ingress>>,
    pub dns_endpoints: Arc<MemoryStore<crate::crd::DNSEndpoint>>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self {
            gslbs: Arc::new(MemoryStore::default()),
            services: Arc::new(MemoryStore::default()),
            ingresses: Arc::new(MemoryStore::default()),
            dns_endpoints: Arc::new(MemoryStore::default()),
        }
    }

    pub fn clients(&self) -> ClusterClients {
        ClusterClients {
            gslbs: self.gslbs.clone(),
            services: self.services.clone(),
            ingresses: self.ingresses.clone(),
            dns_endpoints: self.dns_endpoints.clone(),
        }
    }
}

/// Configuration for cluster `eu` with one peer `us`.
pub fn test_config() -> Config {
    Config {
        k8gb_namespace: "k8gb".to_string(),
        cluster_geo_tag: "eu".to_string(),
        ext_clusters_geo_tags: vec!["us".to_string()],
        edge_dns_server: "10.0.0.53".to_string(),
        edge_dns_zone: "example.com".to_string(),
        dns_zone: "cloud.example.com".to_string(),
        edge_dns_type: None,
        route53_enabled: false,
        ns1_enabled: false,
        coredns_exposed: true,
        reconcile_requeue_seconds: 30,
        fake_dns_enabled: false,
        metrics_bind_address: "127.0.0.1:0".to_string(),
        infoblox: InfobloxConfig {
            grid_host: None,
            wapi_version: "2.3.1".to_string(),
            wapi_port: 443,
            username: None,
            password: None,
        },
    }
}

/// `roundrobin` Gslb named `test-gslb` for host `roundrobin.cloud.example.com`.
pub fn test_gslb() -> Gslb {
    let mut gslb = Gslb::new(
        "test-gslb",
        GslbSpec {
            ingress: IngressSpec {
                rules: Some(vec![IngressRule {
                    host: Some("roundrobin.cloud.example.com".to_string()),
                    http: Some(HTTPIngressRuleValue {
                        paths: vec![HTTPIngressPath {
                            path: Some("/".to_string()),
                            path_type: "Prefix".to_string(),
                            backend: IngressBackend {
                                service: Some(IngressServiceBackend {
                                    name: "frontend-podinfo".to_string(),
                                    port: Some(ServiceBackendPort {
                                        name: Some("http".to_string()),
                                        number: None,
                                    }),
                                }),
                                resource: None,
                            },
                        }],
                    }),
                }]),
                ..IngressSpec::default()
            },
            strategy: Strategy {
                r#type: "roundRobin".to_string(),
                ..Strategy::default()
            },
        },
    );
    gslb.metadata = ObjectMeta {
        name: Some("test-gslb".to_string()),
        namespace: Some("test-gslb".to_string()),
        uid: Some("5b9c1e0a-0000-4000-8000-000000000001".to_string()),
        generation: Some(1),
        ..ObjectMeta::default()
    };
    gslb
}
