// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for GSLB error types.

#[cfg(test)]
mod tests {
    use crate::gslb_errors::GslbError;
    use std::time::Duration;

    fn query_error() -> GslbError {
        GslbError::Query {
            server: "10.0.0.53:53".to_string(),
            name: "localtargets-app.cloud.example.com.".to_string(),
            record_type: "A".to_string(),
            reason: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_not_found_error_message() {
        let error = GslbError::NotFound {
            kind: "Service",
            namespace: "k8gb".to_string(),
            name: "k8gb-coredns-lb".to_string(),
        };

        assert_eq!(error.to_string(), "Service k8gb/k8gb-coredns-lb not found");
        assert!(error.is_not_found());
        assert_eq!(error.status_reason(), "NotFound");
    }

    #[test]
    fn test_no_load_balancer_ingress_counts_as_not_found() {
        let error = GslbError::NoLoadBalancerIngress {
            kind: "Service",
            namespace: "k8gb".to_string(),
            name: "k8gb-coredns-lb".to_string(),
        };

        assert!(error.is_not_found());
        assert!(error.is_propagation_lag());
        assert_eq!(
            error.to_string(),
            "no load balancer ingress entries found for Service k8gb/k8gb-coredns-lb"
        );
    }

    #[test]
    fn test_query_error_message() {
        assert_eq!(
            query_error().to_string(),
            "DNS A query for localtargets-app.cloud.example.com. against 10.0.0.53:53 failed: connection refused"
        );
        assert!(!query_error().is_not_found());
    }

    #[test]
    fn test_stale_record_carries_threshold_and_fqdn() {
        let error = GslbError::StaleOrMissingRecord {
            fqdn: "test-gslb-heartbeat-eu.example.com".to_string(),
            threshold: Duration::from_secs(300),
            reason: "record is 600s old".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("test-gslb-heartbeat-eu.example.com"));
        assert!(message.contains("300s"));
        assert_eq!(error.status_reason(), "SplitBrainRecordStale");
        assert!(error.is_propagation_lag());
    }

    #[test]
    fn test_persistence_error_is_not_propagation_lag() {
        let error = GslbError::Persistence {
            operation: "update",
            kind: "DNSEndpoint",
            namespace: "k8gb".to_string(),
            name: "k8gb-ns-route53".to_string(),
            source: kube::Error::Service("apiserver unavailable".into()),
        };

        assert!(!error.is_propagation_lag());
        assert!(!error.is_not_found());
        assert!(error
            .to_string()
            .starts_with("failed to update DNSEndpoint k8gb/k8gb-ns-route53"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_partial_resolution_reports_count_and_source() {
        let error = GslbError::PartialResolution {
            server: "gslb-ns-us.example.com".to_string(),
            resolved: vec!["10.0.1.9".to_string(), "10.0.1.10".to_string()],
            source: Box::new(query_error()),
        };

        assert!(error
            .to_string()
            .starts_with("peer target resolution aborted at gslb-ns-us.example.com after 2 target(s)"));
        assert_eq!(error.status_reason(), "PeerResolutionIncomplete");
    }

    #[test]
    fn test_construction_error_message() {
        let error = GslbError::Construction {
            provider: "INFOBLOX".to_string(),
            reason: "grid host is empty".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "cannot construct INFOBLOX DNS provider: grid host is empty"
        );
        assert!(!error.is_propagation_lag());
    }
}
