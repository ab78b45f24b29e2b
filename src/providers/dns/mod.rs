// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pluggable edge DNS providers.
//!
//! Every provider publishes the zone delegation for this cluster and resolves
//! the targets of peer clusters. The variant is chosen once at start-up by
//! [`factory::ProviderFactory`] from the configured [`EdgeDnsType`].
//!
//! # Naming
//!
//! Nameserver names follow `gslb-ns-<dns zone with dashes>-<geo tag>.<edge zone>`.
//! For the zone `cloud.example.com`, geo tag `eu` and edge zone `example.com`
//! this is `gslb-ns-cloud-example-com-eu.example.com`.

pub mod empty;
pub mod external;
pub mod factory;
pub mod infoblox;

use crate::config::{Config, EdgeDnsType};
use crate::crd::Gslb;
use crate::gslb_errors::Result;
use crate::metrics;
use crate::providers::assistant::GslbAssistant;
use async_trait::async_trait;
use kube::ResourceExt;
use std::fmt;
use tracing::{debug, warn};

pub use factory::ProviderFactory;

/// An edge DNS backend.
///
/// `Display` yields the upper-cased provider tag (`ROUTE53`, `NOEDGEDNS`, ...)
/// used in logs and metric labels.
#[async_trait]
pub trait DnsProvider: Send + Sync + fmt::Display {
    /// Backend this provider publishes to.
    fn edge_dns_type(&self) -> EdgeDnsType;

    /// Publish the NS delegation and glue A record for this cluster.
    ///
    /// Nothing is written when the exposed addresses cannot be resolved.
    async fn synchronize_delegation(&self, gslb: &Gslb) -> Result<()>;

    /// Remove what [`DnsProvider::synchronize_delegation`] published. Idempotent.
    async fn finalize(&self, gslb: &Gslb) -> Result<()>;

    /// Targets peer clusters publish for `host`.
    ///
    /// Errors are logged and swallowed; an empty list means no reachable
    /// targets were found.
    async fn resolve_peer_targets(&self, host: &str) -> Vec<String>;

    /// Check the split-brain heartbeat of `gslb` against its threshold.
    async fn split_brain_check(&self, gslb: &Gslb) -> Result<()>;
}

/// Nameserver name of the cluster with `geo_tag`.
#[must_use]
pub fn ns_server_name_for(config: &Config, geo_tag: &str) -> String {
    let dns_zone = config.dns_zone.replace('.', "-");
    format!("gslb-ns-{dns_zone}-{geo_tag}.{}", config.edge_dns_zone)
}

/// Nameserver name of this cluster.
#[must_use]
pub fn ns_server_name(config: &Config) -> String {
    ns_server_name_for(config, &config.cluster_geo_tag)
}

/// Nameserver names of the peer clusters, in configuration order.
#[must_use]
pub fn ns_server_names_ext(config: &Config) -> Vec<String> {
    config
        .peer_geo_tags()
        .map(|tag| ns_server_name_for(config, tag))
        .collect()
}

/// FQDN of the split-brain heartbeat TXT record for `gslb_name`.
#[must_use]
pub fn split_brain_fqdn(config: &Config, gslb_name: &str) -> String {
    format!(
        "{gslb_name}-heartbeat-{}.{}",
        config.cluster_geo_tag, config.edge_dns_zone
    )
}

pub(crate) async fn resolve_peer_targets(
    provider: &str,
    config: &Config,
    assistant: &GslbAssistant,
    host: &str,
) -> Vec<String> {
    let peers = ns_server_names_ext(config);
    match assistant.resolve_external_cluster_targets(host, &peers).await {
        Ok(targets) => {
            debug!(provider = %provider, host = %host, targets = ?targets, "Resolved peer targets");
            targets
        }
        Err(e) => {
            warn!(provider = %provider, host = %host, error = %e, "Peer target resolution failed; returning no targets");
            metrics::record_peer_resolution_failure(provider);
            Vec::new()
        }
    }
}

pub(crate) async fn check_split_brain(
    provider: &str,
    config: &Config,
    assistant: &GslbAssistant,
    gslb: &Gslb,
) -> Result<()> {
    let fqdn = split_brain_fqdn(config, &gslb.name_any());
    let threshold = gslb.spec.strategy.split_brain_threshold();
    let result = assistant.check_split_brain_freshness(&fqdn, threshold).await;
    metrics::record_split_brain_check(provider, result.is_ok());
    result.map(|_| ())
}
