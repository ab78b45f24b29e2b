// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for provider selection.

#[cfg(test)]
mod tests {
    use crate::config::EdgeDnsType;
    use crate::dns_query::DnsQuerier;
    use crate::gslb_errors::GslbError;
    use crate::providers::dns::ProviderFactory;
    use crate::test_support::{test_config, FakeQuerier, MemoryCluster};
    use std::sync::Arc;

    fn querier() -> Arc<dyn DnsQuerier> {
        Arc::new(FakeQuerier::default())
    }

    #[test]
    fn test_missing_client_is_construction_error() {
        let err = ProviderFactory::new(test_config())
            .with_querier(querier())
            .provider()
            .err()
            .unwrap();
        assert!(matches!(err, GslbError::Construction { ref reason, .. } if reason == "no cluster client supplied"));
    }

    #[test]
    fn test_missing_querier_is_construction_error() {
        let cluster = MemoryCluster::new();
        let err = ProviderFactory::new(test_config())
            .with_clients(cluster.clients())
            .provider()
            .err()
            .unwrap();
        assert!(matches!(err, GslbError::Construction { ref reason, .. } if reason == "no DNS querier supplied"));
    }

    #[test]
    fn test_selects_provider_per_edge_dns_type() {
        let cluster = MemoryCluster::new();
        for (dns_type, display) in [
            (EdgeDnsType::Ns1, "NS1"),
            (EdgeDnsType::Route53, "ROUTE53"),
            (EdgeDnsType::CoreDns, "COREDNS"),
            (EdgeDnsType::NoEdgeDns, "NOEDGEDNS"),
        ] {
            let mut config = test_config();
            config.edge_dns_type = Some(dns_type);
            let provider = ProviderFactory::new(config)
                .with_clients(cluster.clients())
                .with_querier(querier())
                .provider()
                .unwrap();
            assert_eq!(provider.to_string(), display);
            assert_eq!(provider.edge_dns_type(), dns_type);
        }
    }

    #[test]
    fn test_infoblox_requires_grid_settings() {
        let cluster = MemoryCluster::new();
        let mut config = test_config();
        config.edge_dns_type = Some(EdgeDnsType::Infoblox);

        let err = ProviderFactory::new(config.clone())
            .with_clients(cluster.clients())
            .with_querier(querier())
            .provider()
            .err()
            .unwrap();
        assert!(matches!(err, GslbError::Construction { ref provider, .. } if provider == "INFOBLOX"));

        config.infoblox.grid_host = Some("grid.example.com".to_string());
        config.infoblox.username = Some("admin".to_string());
        config.infoblox.password = Some("secret".to_string());
        let provider = ProviderFactory::new(config)
            .with_clients(cluster.clients())
            .with_querier(querier())
            .provider()
            .unwrap();
        assert_eq!(provider.to_string(), "INFOBLOX");
    }
}
