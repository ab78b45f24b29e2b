// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the Gslb controller.
//!
//! The controller receives an `Arc<Context>` holding:
//! - The validated operator configuration
//! - Per-kind cluster stores
//! - The DNS provider selected at start-up

use crate::cluster_api::ClusterClients;
use crate::config::Config;
use crate::dns_query::HickoryQuerier;
use crate::gslb_errors::Result;
use crate::providers::dns::{DnsProvider, ProviderFactory};
use kube::Client;
use std::sync::Arc;

/// Shared context passed to every reconciliation pass.
#[derive(Clone)]
pub struct Context {
    /// Operator configuration
    pub config: Config,

    /// Cluster API stores
    pub clients: ClusterClients,

    /// Edge DNS provider
    pub provider: Arc<dyn DnsProvider>,
}

impl Context {
    #[must_use]
    pub fn new(config: Config, clients: ClusterClients, provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            config,
            clients,
            provider,
        }
    }

    /// Wire API-backed stores, the hickory querier and the configured provider.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the provider cannot be built.
    pub fn from_client(config: Config, client: &Client) -> Result<Self> {
        let clients = ClusterClients::from_client(client);
        let provider = ProviderFactory::new(config.clone())
            .with_clients(clients.clone())
            .with_querier(Arc::new(HickoryQuerier))
            .provider()?;
        Ok(Self::new(config, clients, provider))
    }
}
