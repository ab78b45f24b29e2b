// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions consumed and produced by the controller.
//!
//! # Resource Types
//!
//! - [`Gslb`] - Desired state for one logical set of hostnames balanced across clusters.
//!   Owned by users; the controller only mutates its annotations and status.
//! - [`DNSEndpoint`] - external-dns resource carrying the NS delegation and glue A
//!   records. Produced by the controller, consumed by external-dns.
//!
//! # Example: Creating a Gslb
//!
//! ```rust,no_run
//! use k8gb_sync::crd::{GslbSpec, Strategy};
//! use k8s_openapi::api::networking::v1::IngressSpec;
//!
//! let spec = GslbSpec {
//!     ingress: IngressSpec::default(),
//!     strategy: Strategy {
//!         r#type: "roundRobin".to_string(),
//!         weight: None,
//!         primary_geo_tag: None,
//!         dns_ttl_seconds: Some(30),
//!         split_brain_threshold_seconds: Some(300),
//!     },
//! };
//! ```

use crate::constants::{DEFAULT_DNS_TTL_SECS, DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS};
use k8s_openapi::api::networking::v1::IngressSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Load-balancing strategy descriptor of a [`Gslb`].
///
/// The strategy computation itself lives outside this controller; only the
/// fields the synchronization engine needs are interpreted here.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Strategy type, e.g. `roundRobin`, `failover`, `geoip`.
    pub r#type: String,

    /// Relative weight of this cluster for weighted strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,

    /// Geo tag of the primary cluster for the failover strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_geo_tag: Option<String>,

    /// TTL of synthesized DNS records in seconds (default 30).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 2_147_483_647))]
    pub dns_ttl_seconds: Option<u32>,

    /// Maximum age of the split-brain heartbeat before peer data is distrusted
    /// (default 300).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_brain_threshold_seconds: Option<u64>,
}

impl Strategy {
    /// Record TTL, falling back to the default.
    #[must_use]
    pub fn dns_ttl(&self) -> u32 {
        self.dns_ttl_seconds.unwrap_or(DEFAULT_DNS_TTL_SECS)
    }

    /// Split-brain freshness threshold, falling back to the default.
    #[must_use]
    pub fn split_brain_threshold(&self) -> Duration {
        Duration::from_secs(
            self.split_brain_threshold_seconds
                .unwrap_or(DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS),
        )
    }
}

/// `Gslb` spec: an ingress to expose plus the strategy used to balance it.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8gb.absa.oss",
    version = "v1beta1",
    kind = "Gslb",
    namespaced,
    doc = "Gslb declares hostnames served by several clusters. Each cluster derives an Ingress from it and publishes DNS delegation records through external-dns."
)]
#[kube(status = "GslbStatus")]
#[kube(printcolumn = r#"{"name":"Strategy", "type":"string", "jsonPath":".spec.strategy.type"}"#)]
#[serde(rename_all = "camelCase")]
pub struct GslbSpec {
    /// Ingress spec copied verbatim into the derived cluster-local `Ingress`.
    pub ingress: IngressSpec,

    /// Load-balancing strategy.
    pub strategy: Strategy,
}

/// Observed state of a [`Gslb`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GslbStatus {
    /// Targets resolved from peer clusters, keyed by host.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub peer_targets: BTreeMap<String, Vec<String>>,

    /// Outcome of the last split-brain freshness check (`Fresh` or the error reason).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_brain: Option<String>,

    /// The generation last processed by the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// A single external-dns endpoint: one DNS name, one record type, many targets.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Endpoint {
    /// Fully qualified name of the record.
    #[serde(rename = "dnsName")]
    pub dns_name: String,

    /// Record targets (addresses or names depending on the type).
    #[serde(default)]
    pub targets: Vec<String>,

    /// Record type (`A`, `NS`, `TXT`, ...).
    #[serde(rename = "recordType")]
    pub record_type: String,

    /// Record TTL in seconds; 0 lets the provider choose.
    #[serde(rename = "recordTTL", default)]
    pub record_ttl: i64,

    /// Identifier distinguishing records with the same name and type.
    #[serde(rename = "setIdentifier", default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    /// Provider-independent labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// external-dns `DNSEndpoint` spec.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "externaldns.k8s.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    namespaced,
    doc = "DNSEndpoint is the external-dns CRD; the controller writes one per provider holding the zone delegation records."
)]
pub struct DNSEndpointSpec {
    /// Endpoints published by this resource.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
