// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across the controller.
//!
//! Annotations on the `Gslb` resource are the only place provider metadata is
//! persisted; the derived `Ingress` copies them verbatim.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_K8GB: &str = "k8gb";

/// Value for `app.kubernetes.io/managed-by`
pub const MANAGED_BY_K8GB_SYNC: &str = "k8gb-sync";

// ============================================================================
// Gslb Annotations
// ============================================================================

/// Load-balancing strategy type stamped on the `Gslb` and its `Ingress`
pub const STRATEGY_ANNOTATION: &str = "k8gb.io/strategy";

/// Primary geo tag stamped on the `Gslb` and its `Ingress` (failover strategy)
pub const PRIMARY_GEO_TAG_ANNOTATION: &str = "k8gb.io/primary-geotag";

// ============================================================================
// DNSEndpoint Labels / Annotations
// ============================================================================

/// Provider type of a delegation `DNSEndpoint` (set as label and annotation)
pub const DNS_TYPE_LABEL: &str = "k8gb.absa.oss/dnstype";
