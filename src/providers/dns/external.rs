// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! external-dns backed providers (NS1, Route53, Infoblox, CoreDNS).
//!
//! All of them publish one `DNSEndpoint` named `k8gb-ns-<type>` in the operator
//! namespace. external-dns picks it up and writes the records to the edge DNS.

use super::{check_split_brain, ns_server_name, ns_server_names_ext, resolve_peer_targets, DnsProvider};
use crate::config::{Config, EdgeDnsType};
use crate::constants::DNS_ENDPOINT_NAME_PREFIX;
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, Gslb};
use crate::gslb_errors::Result;
use crate::labels::{
    DNS_TYPE_LABEL, K8S_MANAGED_BY, K8S_PART_OF, MANAGED_BY_K8GB_SYNC, PART_OF_K8GB,
};
use crate::providers::assistant::GslbAssistant;
use async_trait::async_trait;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Provider publishing delegation through an external-dns `DNSEndpoint`.
pub struct ExternalDnsProvider {
    dns_type: EdgeDnsType,
    config: Config,
    assistant: Arc<GslbAssistant>,
    endpoint_name: String,
}

impl ExternalDnsProvider {
    #[must_use]
    pub fn new(dns_type: EdgeDnsType, config: Config, assistant: Arc<GslbAssistant>) -> Self {
        Self {
            endpoint_name: endpoint_name(dns_type),
            dns_type,
            config,
            assistant,
        }
    }

    /// Name of the `DNSEndpoint` this provider owns.
    #[must_use]
    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// The CoreDNS backend always publishes the load balancer of its own service.
    fn uses_exposed_coredns(&self) -> bool {
        self.config.coredns_exposed || self.dns_type == EdgeDnsType::CoreDns
    }

    /// Build the delegation record for `gslb` pointing at `addresses`.
    #[must_use]
    pub fn delegation_record(&self, gslb: &Gslb, addresses: Vec<String>) -> DNSEndpoint {
        let ttl = i64::from(gslb.spec.strategy.dns_ttl());
        let local_ns = ns_server_name(&self.config);

        let mut ns_targets = ns_server_names_ext(&self.config);
        ns_targets.push(local_ns.clone());
        ns_targets.sort();
        ns_targets.dedup();

        let dns_type = self.dns_type.as_str().to_string();
        DNSEndpoint {
            metadata: ObjectMeta {
                name: Some(self.endpoint_name.clone()),
                namespace: Some(self.config.k8gb_namespace.clone()),
                labels: Some(BTreeMap::from([
                    (DNS_TYPE_LABEL.to_string(), dns_type.clone()),
                    (K8S_MANAGED_BY.to_string(), MANAGED_BY_K8GB_SYNC.to_string()),
                    (K8S_PART_OF.to_string(), PART_OF_K8GB.to_string()),
                ])),
                annotations: Some(BTreeMap::from([(DNS_TYPE_LABEL.to_string(), dns_type)])),
                ..ObjectMeta::default()
            },
            spec: DNSEndpointSpec {
                endpoints: vec![
                    Endpoint {
                        dns_name: self.config.dns_zone.clone(),
                        targets: ns_targets,
                        record_type: "NS".to_string(),
                        record_ttl: ttl,
                        ..Endpoint::default()
                    },
                    Endpoint {
                        dns_name: local_ns,
                        targets: addresses,
                        record_type: "A".to_string(),
                        record_ttl: ttl,
                        ..Endpoint::default()
                    },
                ],
            },
        }
    }
}

/// `k8gb-ns-<type>`.
#[must_use]
pub fn endpoint_name(dns_type: EdgeDnsType) -> String {
    format!("{DNS_ENDPOINT_NAME_PREFIX}{dns_type}")
}

impl fmt::Display for ExternalDnsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dns_type.as_str().to_uppercase())
    }
}

#[async_trait]
impl DnsProvider for ExternalDnsProvider {
    fn edge_dns_type(&self) -> EdgeDnsType {
        self.dns_type
    }

    async fn synchronize_delegation(&self, gslb: &Gslb) -> Result<()> {
        info!(provider = %self, name = %self.endpoint_name, "Creating/updating DNSEndpoint");
        let addresses = if self.uses_exposed_coredns() {
            self.assistant.resolve_local_exposed_addresses().await?
        } else {
            self.assistant.resolve_ingress_exposed_addresses(gslb).await?
        };
        let record = self.delegation_record(gslb, addresses);
        self.assistant
            .persist_external_record(&self.config.k8gb_namespace, &record)
            .await
    }

    async fn finalize(&self, _gslb: &Gslb) -> Result<()> {
        self.assistant.remove_external_record(&self.endpoint_name).await
    }

    async fn resolve_peer_targets(&self, host: &str) -> Vec<String> {
        resolve_peer_targets(&self.to_string(), &self.config, &self.assistant, host).await
    }

    async fn split_brain_check(&self, gslb: &Gslb) -> Result<()> {
        check_split_brain(&self.to_string(), &self.config, &self.assistant, gslb).await
    }
}

#[cfg(test)]
#[path = "external_tests.rs"]
mod external_tests;
