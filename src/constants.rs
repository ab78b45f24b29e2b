// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the k8gb synchronization controller.
//!
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group of the `Gslb` CRD
pub const API_GROUP: &str = "k8gb.absa.oss";

/// Kind name for `Gslb` resource
pub const KIND_GSLB: &str = "Gslb";

/// Kind name for external-dns `DNSEndpoint` resource
pub const KIND_DNS_ENDPOINT: &str = "DNSEndpoint";

/// Kind name for the derived `Ingress`
pub const KIND_INGRESS: &str = "Ingress";

/// Kind name for the edge DNS `Service`
pub const KIND_SERVICE: &str = "Service";

/// Finalizer placed on every `Gslb` so delegation records are removed on delete
pub const GSLB_FINALIZER: &str = "k8gb.absa.oss/finalizer";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries against edge DNS servers
pub const DNS_PORT: u16 = 53;

/// Loopback resolver used in place of real edge servers when fake DNS is enabled
pub const FAKE_DNS_SERVER: &str = "127.0.0.1:7753";

/// Name of the load balancer service exposing the cluster-local CoreDNS
pub const COREDNS_EXT_SERVICE_NAME: &str = "k8gb-coredns-lb";

/// Prefix of the name every cluster publishes its local targets under
pub const LOCAL_TARGETS_PREFIX: &str = "localtargets-";

/// Prefix of every delegation `DNSEndpoint` name (`k8gb-ns-<provider>`)
pub const DNS_ENDPOINT_NAME_PREFIX: &str = "k8gb-ns-";

/// Layout of the split-brain heartbeat timestamp (UTC, no zone suffix)
pub const SPLIT_BRAIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Index of the rdata field in a tab-separated record presentation
pub const PRESENTATION_RDATA_FIELD: usize = 4;

// ============================================================================
// Strategy Defaults
// ============================================================================

/// Default TTL of synthesized records when the strategy leaves it unset
pub const DEFAULT_DNS_TTL_SECS: u32 = 30;

/// Default split-brain threshold when the strategy leaves it unset (5 minutes)
pub const DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS: u64 = 300;

// ============================================================================
// Controller Constants
// ============================================================================

/// Default fixed requeue delay between reconciliation passes
pub const DEFAULT_RECONCILE_REQUEUE_SECS: u64 = 30;

/// Requeue delay after a pass returned an error to the controller
pub const ERROR_REQUEUE_SECS: u64 = 5;

/// Worker threads of the controller runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Field manager name used for finalizer patches
pub const FIELD_MANAGER: &str = "k8gb-sync";

/// Default Infoblox WAPI port
pub const DEFAULT_INFOBLOX_PORT: u16 = 443;

/// Default bind address of the metrics endpoint
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";
