// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster-facing assistant.
//!
//! The assistant is the only component that talks to the outside world. It
//! reads services and ingresses, upserts and deletes `DNSEndpoint` records, and
//! issues DNS queries against the edge server and the peer clusters'
//! nameservers. It keeps no state between calls; every operation re-reads
//! ground truth and nothing is retried here.

use crate::cluster_api::{is_api_not_found, ClusterClients};
use crate::constants::{
    COREDNS_EXT_SERVICE_NAME, KIND_DNS_ENDPOINT, KIND_INGRESS, KIND_SERVICE,
    LOCAL_TARGETS_PREFIX, PRESENTATION_RDATA_FIELD, SPLIT_BRAIN_TIMESTAMP_FORMAT,
};
use crate::crd::{DNSEndpoint, Gslb};
use crate::dns_query::{with_dns_port, DnsQuerier, ResolverTarget};
use crate::gslb_errors::{GslbError, Result};
use crate::metrics;
use chrono::{NaiveDateTime, Utc};
use hickory_client::rr::RecordType;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outbound operations on behalf of the DNS providers.
pub struct GslbAssistant {
    clients: ClusterClients,
    querier: Arc<dyn DnsQuerier>,
    resolver: ResolverTarget,
    k8gb_namespace: String,
    edge_dns_server: String,
}

impl GslbAssistant {
    /// Create an assistant.
    ///
    /// `resolver` picks the nameserver for split-brain and peer queries;
    /// hostname resolution always goes to `edge_dns_server` on port 53.
    #[must_use]
    pub fn new(
        clients: ClusterClients,
        querier: Arc<dyn DnsQuerier>,
        resolver: ResolverTarget,
        k8gb_namespace: impl Into<String>,
        edge_dns_server: impl Into<String>,
    ) -> Self {
        Self {
            clients,
            querier,
            resolver,
            k8gb_namespace: k8gb_namespace.into(),
            edge_dns_server: edge_dns_server.into(),
        }
    }

    /// Addresses of the load balancer in front of the cluster's edge CoreDNS.
    ///
    /// Only the first load balancer ingress entry is considered. A hostname
    /// entry is resolved against the edge DNS server.
    ///
    /// # Errors
    ///
    /// - [`GslbError::NotFound`] when the service does not exist yet
    /// - [`GslbError::NoLoadBalancerIngress`] when no address has been assigned
    /// - [`GslbError::Query`] when the hostname cannot be resolved
    /// - [`GslbError::Persistence`] when the API read fails
    pub async fn resolve_local_exposed_addresses(&self) -> Result<Vec<String>> {
        let namespace = &self.k8gb_namespace;
        let service = self
            .clients
            .services
            .get(namespace, COREDNS_EXT_SERVICE_NAME)
            .await
            .map_err(|source| GslbError::Persistence {
                operation: "get",
                kind: KIND_SERVICE,
                namespace: namespace.clone(),
                name: COREDNS_EXT_SERVICE_NAME.to_string(),
                source,
            })?
            .ok_or_else(|| {
                warn!(namespace = %namespace, name = COREDNS_EXT_SERVICE_NAME, "Edge CoreDNS service not found");
                GslbError::NotFound {
                    kind: KIND_SERVICE,
                    namespace: namespace.clone(),
                    name: COREDNS_EXT_SERVICE_NAME.to_string(),
                }
            })?;

        let first = service
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|entries| entries.first())
            .ok_or_else(|| GslbError::NoLoadBalancerIngress {
                kind: KIND_SERVICE,
                namespace: namespace.clone(),
                name: COREDNS_EXT_SERVICE_NAME.to_string(),
            })?;

        if let Some(hostname) = first.hostname.as_deref().filter(|h| !h.is_empty()) {
            return self.dig(hostname).await;
        }
        match first.ip.as_deref().filter(|ip| !ip.is_empty()) {
            Some(ip) => Ok(vec![ip.to_string()]),
            None => Err(GslbError::NoLoadBalancerIngress {
                kind: KIND_SERVICE,
                namespace: namespace.clone(),
                name: COREDNS_EXT_SERVICE_NAME.to_string(),
            }),
        }
    }

    /// Addresses published in the status of the Gslb's own `Ingress`.
    ///
    /// Literal IPs and resolved hostnames are aggregated in status order. An
    /// ingress without load balancer entries yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`GslbError::NotFound`] when the ingress does not exist
    /// - [`GslbError::Query`] when a hostname entry cannot be resolved
    /// - [`GslbError::Persistence`] when the API read fails
    pub async fn resolve_ingress_exposed_addresses(&self, gslb: &Gslb) -> Result<Vec<String>> {
        let namespace = gslb.namespace().unwrap_or_default();
        let name = gslb.name_any();
        let ingress = self
            .clients
            .ingresses
            .get(&namespace, &name)
            .await
            .map_err(|source| GslbError::Persistence {
                operation: "get",
                kind: KIND_INGRESS,
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?
            .ok_or_else(|| GslbError::NotFound {
                kind: KIND_INGRESS,
                namespace: namespace.clone(),
                name: name.clone(),
            })?;

        let entries = ingress
            .status
            .and_then(|status| status.load_balancer)
            .and_then(|lb| lb.ingress)
            .unwrap_or_default();

        let mut addresses = Vec::new();
        for entry in entries {
            if let Some(ip) = entry.ip.filter(|ip| !ip.is_empty()) {
                addresses.push(ip);
            }
            if let Some(hostname) = entry.hostname.filter(|h| !h.is_empty()) {
                let resolved = self.dig(&hostname).await.inspect_err(|e| {
                    warn!(namespace = %namespace, name = %name, hostname = %hostname, error = %e, "Can't resolve ingress hostname");
                })?;
                addresses.extend(resolved);
            }
        }
        Ok(addresses)
    }

    /// Create or update a `DNSEndpoint`.
    ///
    /// An existing record keeps its identity and metadata; only its spec is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::Persistence`] wrapping the API error.
    pub async fn persist_external_record(&self, namespace: &str, record: &DNSEndpoint) -> Result<()> {
        let name = record.name_any();
        let store = &self.clients.dns_endpoints;
        let persistence = |operation: &'static str| {
            let name = name.clone();
            move |source| GslbError::Persistence {
                operation,
                kind: KIND_DNS_ENDPOINT,
                namespace: namespace.to_string(),
                name,
                source,
            }
        };

        match store.get(namespace, &name).await.map_err(persistence("get"))? {
            Some(mut existing) => {
                existing.spec = record.spec.clone();
                store
                    .replace(&existing)
                    .await
                    .map_err(persistence("update"))?;
                debug!(namespace = %namespace, name = %name, "Updated DNSEndpoint");
                metrics::record_dns_endpoint_write(&name, "updated");
            }
            None => {
                let mut created = record.clone();
                created.metadata.namespace = Some(namespace.to_string());
                store
                    .create(&created)
                    .await
                    .map_err(persistence("create"))?;
                info!(namespace = %namespace, name = %name, "Created DNSEndpoint");
                metrics::record_dns_endpoint_write(&name, "created");
            }
        }
        Ok(())
    }

    /// Delete a `DNSEndpoint` from the operator namespace; absence is success.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::Persistence`] for failures other than not-found.
    pub async fn remove_external_record(&self, name: &str) -> Result<()> {
        let namespace = &self.k8gb_namespace;
        match self.clients.dns_endpoints.delete(namespace, name).await {
            Ok(()) => {
                info!(namespace = %namespace, name = %name, "Deleted DNSEndpoint");
                metrics::record_dns_endpoint_write(name, "deleted");
                Ok(())
            }
            Err(e) if is_api_not_found(&e) => {
                debug!(namespace = %namespace, name = %name, "DNSEndpoint already absent");
                Ok(())
            }
            Err(source) => Err(GslbError::Persistence {
                operation: "delete",
                kind: KIND_DNS_ENDPOINT,
                namespace: namespace.clone(),
                name: name.to_string(),
                source,
            }),
        }
    }

    /// Verify the split-brain TXT marker at `fqdn` is no older than `threshold`.
    ///
    /// Returns the age of the marker on success.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::StaleOrMissingRecord`] when the query fails, the
    /// record is absent or unparsable, or it is older than `threshold`.
    pub async fn check_split_brain_freshness(&self, fqdn: &str, threshold: Duration) -> Result<Duration> {
        let server = self.resolver.address_for(&self.edge_dns_server);
        let stale = |reason: String| GslbError::StaleOrMissingRecord {
            fqdn: fqdn.to_string(),
            threshold,
            reason,
        };

        let answers = self
            .querier
            .query(&server, fqdn, RecordType::TXT)
            .await
            .map_err(|e| stale(e.to_string()))?;
        let answer = answers
            .first()
            .ok_or_else(|| stale(format!("no TXT record at edge DNS server {server}")))?;

        let parsed = parse_split_brain_timestamp(&answer.to_string()).map_err(stale)?;
        let age = evaluate_freshness(parsed, Utc::now().naive_utc(), threshold).map_err(stale)?;
        debug!(fqdn = %fqdn, age_secs = age.as_secs(), "Split brain TXT record is fresh");
        Ok(age)
    }

    /// Resolve the targets peers publish for `host`.
    ///
    /// Peers are queried one at a time for `localtargets-<host>.` and their
    /// addresses concatenated in peer order.
    ///
    /// # Errors
    ///
    /// The first unreachable peer aborts the walk with
    /// [`GslbError::PartialResolution`] carrying the targets gathered so far.
    pub async fn resolve_external_cluster_targets(
        &self,
        host: &str,
        peer_servers: &[String],
    ) -> Result<Vec<String>> {
        let name = ensure_trailing_dot(&format!("{LOCAL_TARGETS_PREFIX}{host}"));
        let mut targets = Vec::new();
        for peer in peer_servers {
            let server = self.resolver.address_for(peer);
            match self.querier.query(&server, &name, RecordType::A).await {
                Ok(answers) => {
                    debug!(server = %server, name = %name, count = answers.len(), "Resolved peer targets");
                    targets.extend(answers.into_iter().map(|answer| answer.data));
                }
                Err(source) => {
                    return Err(GslbError::PartialResolution {
                        server: peer.clone(),
                        resolved: targets,
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(targets)
    }

    async fn dig(&self, hostname: &str) -> Result<Vec<String>> {
        let answers = self
            .querier
            .query(
                &with_dns_port(&self.edge_dns_server),
                &ensure_trailing_dot(hostname),
                RecordType::A,
            )
            .await?;
        Ok(answers.into_iter().map(|answer| answer.data).collect())
    }
}

/// Extract the timestamp from the presentation form of a TXT answer.
///
/// # Errors
///
/// Returns a description when the field is missing or not a timestamp.
pub fn parse_split_brain_timestamp(presentation: &str) -> std::result::Result<NaiveDateTime, String> {
    let field = presentation
        .split('\t')
        .nth(PRESENTATION_RDATA_FIELD)
        .ok_or_else(|| format!("malformed TXT record '{presentation}'"))?;
    let value = field.trim_matches('"');
    NaiveDateTime::parse_from_str(value, SPLIT_BRAIN_TIMESTAMP_FORMAT)
        .map_err(|e| format!("can't parse timestamp '{value}': {e}"))
}

/// Age of `parsed` at `now`, rejected when strictly above `threshold`.
///
/// A marker from the future counts as fresh.
///
/// # Errors
///
/// Returns a description when the marker has expired.
pub fn evaluate_freshness(
    parsed: NaiveDateTime,
    now: NaiveDateTime,
    threshold: Duration,
) -> std::result::Result<Duration, String> {
    let age = (now - parsed).to_std().unwrap_or(Duration::ZERO);
    if age > threshold {
        return Err(format!(
            "split brain TXT record expired the time threshold: ({}s old)",
            age.as_secs()
        ));
    }
    Ok(age)
}

fn ensure_trailing_dot(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

#[cfg(test)]
#[path = "assistant_tests.rs"]
mod assistant_tests;
