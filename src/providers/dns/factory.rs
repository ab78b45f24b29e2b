// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider selection.

use super::empty::EmptyDnsProvider;
use super::external::ExternalDnsProvider;
use super::infoblox::InfobloxDnsProvider;
use super::DnsProvider;
use crate::cluster_api::ClusterClients;
use crate::config::{Config, EdgeDnsType};
use crate::dns_query::DnsQuerier;
use crate::gslb_errors::{GslbError, Result};
use crate::providers::assistant::GslbAssistant;
use std::sync::Arc;
use tracing::info;

/// Builds the provider for the configured edge DNS backend.
///
/// The cluster clients and the DNS querier must both be supplied before
/// [`ProviderFactory::provider`] is called.
pub struct ProviderFactory {
    config: Config,
    clients: Option<ClusterClients>,
    querier: Option<Arc<dyn DnsQuerier>>,
}

impl ProviderFactory {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clients: None,
            querier: None,
        }
    }

    #[must_use]
    pub fn with_clients(mut self, clients: ClusterClients) -> Self {
        self.clients = Some(clients);
        self
    }

    #[must_use]
    pub fn with_querier(mut self, querier: Arc<dyn DnsQuerier>) -> Self {
        self.querier = Some(querier);
        self
    }

    /// Build the provider.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::Construction`] when a collaborator is missing or the
    /// Infoblox grid settings are invalid.
    pub fn provider(&self) -> Result<Arc<dyn DnsProvider>> {
        let dns_type = self.config.resolved_edge_dns_type();
        let missing = |what: &str| GslbError::Construction {
            provider: dns_type.as_str().to_uppercase(),
            reason: format!("no {what} supplied"),
        };
        let clients = self.clients.clone().ok_or_else(|| missing("cluster client"))?;
        let querier = self.querier.clone().ok_or_else(|| missing("DNS querier"))?;

        let assistant = Arc::new(GslbAssistant::new(
            clients,
            querier,
            self.config.resolver_target(),
            self.config.k8gb_namespace.clone(),
            self.config.edge_dns_server.clone(),
        ));

        let provider: Arc<dyn DnsProvider> = match dns_type {
            EdgeDnsType::Ns1 | EdgeDnsType::Route53 | EdgeDnsType::CoreDns => Arc::new(
                ExternalDnsProvider::new(dns_type, self.config.clone(), assistant),
            ),
            EdgeDnsType::Infoblox => {
                Arc::new(InfobloxDnsProvider::new(self.config.clone(), assistant)?)
            }
            EdgeDnsType::NoEdgeDns => {
                Arc::new(EmptyDnsProvider::new(self.config.clone(), assistant))
            }
        };
        info!(provider = %provider, "Selected DNS provider");
        Ok(provider)
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod factory_tests;
