// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for GSLB DNS synchronization.
//!
//! This module provides the structured errors returned by:
//! - The cluster-facing assistant (Kubernetes API reads/writes and outbound DNS queries)
//! - The DNS provider factory and its providers
//! - The ingress reconciliation glue
//!
//! None of these layers retry on their own. Every error bubbles up to the
//! reconcile outcome policy, which decides whether the next pass runs after the
//! fixed requeue delay or immediately with framework backoff.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the synchronization core.
#[derive(Error, Debug)]
pub enum GslbError {
    /// An expected Kubernetes object does not exist (yet).
    ///
    /// Usually benign: the caller creates the object or retries on a later pass.
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        /// Kind of the missing object (e.g. `Service`, `Ingress`)
        kind: &'static str,
        /// Namespace that was searched
        namespace: String,
        /// Name that was searched
        name: String,
    },

    /// The object exists but no load balancer address has been assigned to it.
    ///
    /// Normal right after creation; treated like [`GslbError::NotFound`].
    #[error("no load balancer ingress entries found for {kind} {namespace}/{name}")]
    NoLoadBalancerIngress {
        /// Kind of the object (e.g. `Service`)
        kind: &'static str,
        /// Namespace of the object
        namespace: String,
        /// Name of the object
        name: String,
    },

    /// DNS query transport or response failure.
    #[error("DNS {record_type} query for {name} against {server} failed: {reason}")]
    Query {
        /// Nameserver address (`host:port`) that was queried
        server: String,
        /// Queried name
        name: String,
        /// Queried record type
        record_type: String,
        /// Underlying failure
        reason: String,
    },

    /// The split-brain TXT marker is absent, unparsable or older than the threshold.
    ///
    /// Data observed in other clusters must not be trusted while this error holds.
    #[error("split brain TXT record {fqdn} rejected (threshold {threshold:?}): {reason}")]
    StaleOrMissingRecord {
        /// FQDN of the heartbeat TXT record
        fqdn: String,
        /// Configured freshness threshold
        threshold: Duration,
        /// Why the record was rejected
        reason: String,
    },

    /// A Kubernetes API call failed for a reason other than absence.
    #[error("failed to {operation} {kind} {namespace}/{name}: {source}")]
    Persistence {
        /// API verb (`get`, `create`, `update`, `delete`)
        operation: &'static str,
        /// Kind of the object
        kind: &'static str,
        /// Namespace of the object
        namespace: String,
        /// Name of the object
        name: String,
        /// Error returned by the API client, untouched
        #[source]
        source: kube::Error,
    },

    /// A DNS provider could not be constructed.
    #[error("cannot construct {provider} DNS provider: {reason}")]
    Construction {
        /// Provider tag (e.g. `INFOBLOX`)
        provider: String,
        /// Violated precondition
        reason: String,
    },

    /// Peer target resolution stopped at the first unreachable peer.
    ///
    /// `resolved` holds the targets gathered before the failure. It is never a
    /// complete answer and must not be mistaken for "peer has zero targets".
    #[error("peer target resolution aborted at {server} after {} target(s): {source}", resolved.len())]
    PartialResolution {
        /// Peer edge server that failed
        server: String,
        /// Targets accumulated from earlier peers
        resolved: Vec<String>,
        /// Failure of the peer query
        #[source]
        source: Box<GslbError>,
    },

    /// A resource is missing metadata required to derive objects from it.
    #[error("invalid {kind} {namespace}/{name}: {reason}")]
    InvalidResource {
        /// Kind of the resource
        kind: &'static str,
        /// Namespace of the resource
        namespace: String,
        /// Name of the resource
        name: String,
        /// What is missing
        reason: String,
    },
}

impl GslbError {
    /// Returns true when the error only signals that something does not exist yet.
    ///
    /// Not-found conditions are expected while load balancers are provisioned and
    /// DNS propagates; they should be retried after the fixed requeue delay and
    /// never surfaced as operator-facing failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::NoLoadBalancerIngress { .. } => true,
            Self::PartialResolution { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the error reflects DNS propagation lag rather than an API hiccup.
    ///
    /// Propagation-lag errors are requeued after the fixed delay; everything else
    /// is handed to the framework's backoff.
    #[must_use]
    pub fn is_propagation_lag(&self) -> bool {
        match self {
            Self::NotFound { .. }
            | Self::NoLoadBalancerIngress { .. }
            | Self::Query { .. }
            | Self::StaleOrMissingRecord { .. }
            | Self::PartialResolution { .. } => true,
            Self::Persistence { .. } | Self::Construction { .. } | Self::InvalidResource { .. } => {
                false
            }
        }
    }

    /// Returns the status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::NoLoadBalancerIngress { .. } => "LoadBalancerPending",
            Self::Query { .. } => "DnsQueryFailed",
            Self::StaleOrMissingRecord { .. } => "SplitBrainRecordStale",
            Self::Persistence { .. } => "PersistenceFailed",
            Self::Construction { .. } => "ProviderConstructionFailed",
            Self::PartialResolution { .. } => "PeerResolutionIncomplete",
            Self::InvalidResource { .. } => "InvalidResource",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = GslbError> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "gslb_errors_tests.rs"]
mod gslb_errors_tests;
