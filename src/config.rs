// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! The configuration is parsed once at start-up from command line flags with
//! environment variable fallbacks, validated, and then passed explicitly to every
//! component that needs it. There is no global configuration state.

use crate::constants::{
    DEFAULT_INFOBLOX_PORT, DEFAULT_METRICS_BIND_ADDRESS, DEFAULT_RECONCILE_REQUEUE_SECS,
};
use crate::dns_query::ResolverTarget;
use clap::{Args, Parser, ValueEnum};
use std::fmt;
use std::time::Duration;

/// Edge DNS backend the delegation records are published to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EdgeDnsType {
    /// No edge DNS; delegation is managed out of band.
    #[value(name = "noedgedns")]
    NoEdgeDns,
    /// NS1 through external-dns.
    #[value(name = "ns1")]
    Ns1,
    /// AWS Route53 through external-dns.
    #[value(name = "route53")]
    Route53,
    /// Infoblox grid through external-dns.
    #[value(name = "infoblox")]
    Infoblox,
    /// The cluster's own CoreDNS exposed through a load balancer.
    #[value(name = "coredns")]
    CoreDns,
}

impl EdgeDnsType {
    /// Lower-case provider tag used in resource names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoEdgeDns => "noedgedns",
            Self::Ns1 => "ns1",
            Self::Route53 => "route53",
            Self::Infoblox => "infoblox",
            Self::CoreDns => "coredns",
        }
    }
}

impl fmt::Display for EdgeDnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infoblox grid connection settings.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct InfobloxConfig {
    /// Infoblox grid host name
    #[arg(long = "infoblox-grid-host", env = "INFOBLOX_GRID_HOST")]
    pub grid_host: Option<String>,

    /// Infoblox WAPI version
    #[arg(
        long = "infoblox-wapi-version",
        env = "INFOBLOX_WAPI_VERSION",
        default_value = "2.3.1"
    )]
    pub wapi_version: String,

    /// Infoblox WAPI port
    #[arg(long = "infoblox-wapi-port", env = "INFOBLOX_WAPI_PORT", default_value_t = DEFAULT_INFOBLOX_PORT)]
    pub wapi_port: u16,

    /// Infoblox WAPI user name
    #[arg(long = "infoblox-wapi-username", env = "EXTERNAL_DNS_INFOBLOX_WAPI_USERNAME")]
    pub username: Option<String>,

    /// Infoblox WAPI password
    #[arg(
        long = "infoblox-wapi-password",
        env = "EXTERNAL_DNS_INFOBLOX_WAPI_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,
}

/// Complete controller configuration.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Namespace the controller runs in; delegation records are written here
    #[arg(long, env = "POD_NAMESPACE", default_value = "k8gb")]
    pub k8gb_namespace: String,

    /// Geo tag of this cluster (e.g. "eu")
    #[arg(long, env = "CLUSTER_GEO_TAG")]
    pub cluster_geo_tag: String,

    /// Comma separated geo tags of the peer clusters
    #[arg(long, env = "EXT_GSLB_CLUSTERS_GEO_TAGS", value_delimiter = ',')]
    pub ext_clusters_geo_tags: Vec<String>,

    /// Edge DNS server queried for hostname resolution and the split-brain marker
    #[arg(long, env = "EDGE_DNS_SERVER")]
    pub edge_dns_server: String,

    /// Zone hosted on the edge DNS server under which nameserver names live
    #[arg(long, env = "EDGE_DNS_ZONE")]
    pub edge_dns_zone: String,

    /// Zone delegated to the clusters' own nameservers
    #[arg(long, env = "DNS_ZONE")]
    pub dns_zone: String,

    /// Edge DNS backend; derived from the backend-specific flags when unset
    #[arg(long, env = "EDGE_DNS_TYPE", value_enum)]
    pub edge_dns_type: Option<EdgeDnsType>,

    /// Publish through Route53
    #[arg(long, env = "ROUTE53_ENABLED")]
    pub route53_enabled: bool,

    /// Publish through NS1
    #[arg(long, env = "NS1_ENABLED")]
    pub ns1_enabled: bool,

    /// The edge CoreDNS service is exposed through its own load balancer
    #[arg(long, env = "COREDNS_EXPOSED")]
    pub coredns_exposed: bool,

    /// Fixed delay between reconciliation passes in seconds
    #[arg(long, env = "RECONCILE_REQUEUE_SECONDS", default_value_t = DEFAULT_RECONCILE_REQUEUE_SECS)]
    pub reconcile_requeue_seconds: u64,

    /// Query the loopback fake DNS server instead of the edge servers (testing only)
    #[arg(long, env = "FAKE_DNS_ENABLED")]
    pub fake_dns_enabled: bool,

    /// Bind address of the Prometheus metrics endpoint
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: String,

    #[command(flatten)]
    pub infoblox: InfobloxConfig,
}

impl Config {
    /// Resolve the effective edge DNS backend.
    ///
    /// An explicit `EDGE_DNS_TYPE` wins. Otherwise Infoblox is selected when a grid
    /// host is configured, then Route53, then NS1, falling back to no edge DNS.
    #[must_use]
    pub fn resolved_edge_dns_type(&self) -> EdgeDnsType {
        if let Some(explicit) = self.edge_dns_type {
            return explicit;
        }
        if self
            .infoblox
            .grid_host
            .as_deref()
            .is_some_and(|host| !host.is_empty())
        {
            EdgeDnsType::Infoblox
        } else if self.route53_enabled {
            EdgeDnsType::Route53
        } else if self.ns1_enabled {
            EdgeDnsType::Ns1
        } else {
            EdgeDnsType::NoEdgeDns
        }
    }

    /// Peer geo tags with blanks removed.
    pub fn peer_geo_tags(&self) -> impl Iterator<Item = &str> {
        self.ext_clusters_geo_tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
    }

    /// Fixed requeue delay used by the outcome policy.
    #[must_use]
    pub fn requeue_delay(&self) -> Duration {
        Duration::from_secs(self.reconcile_requeue_seconds)
    }

    /// Nameserver selection for split-brain and peer queries.
    #[must_use]
    pub fn resolver_target(&self) -> ResolverTarget {
        if self.fake_dns_enabled {
            ResolverTarget::fake()
        } else {
            ResolverTarget::Edge
        }
    }

    /// Check the configuration for values the controller cannot work with.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        for (flag, value) in [
            ("CLUSTER_GEO_TAG", &self.cluster_geo_tag),
            ("EDGE_DNS_SERVER", &self.edge_dns_server),
            ("EDGE_DNS_ZONE", &self.edge_dns_zone),
            ("DNS_ZONE", &self.dns_zone),
            ("POD_NAMESPACE", &self.k8gb_namespace),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{flag} must not be empty"));
            }
        }
        if self.peer_geo_tags().any(|tag| tag == self.cluster_geo_tag) {
            return Err(format!(
                "EXT_GSLB_CLUSTERS_GEO_TAGS must not contain the local geo tag '{}'",
                self.cluster_geo_tag
            ));
        }
        if self.reconcile_requeue_seconds == 0 {
            return Err("RECONCILE_REQUEUE_SECONDS must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
