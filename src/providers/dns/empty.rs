// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider for installations without a managed edge DNS.
//!
//! Delegation is configured out of band, so nothing is published or removed.
//! Peer targets are still resolved through the peers' nameservers.

use super::{resolve_peer_targets, DnsProvider};
use crate::config::{Config, EdgeDnsType};
use crate::crd::Gslb;
use crate::gslb_errors::Result;
use crate::providers::assistant::GslbAssistant;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct EmptyDnsProvider {
    config: Config,
    assistant: Arc<GslbAssistant>,
}

impl EmptyDnsProvider {
    #[must_use]
    pub fn new(config: Config, assistant: Arc<GslbAssistant>) -> Self {
        Self { config, assistant }
    }
}

impl fmt::Display for EmptyDnsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NOEDGEDNS")
    }
}

#[async_trait]
impl DnsProvider for EmptyDnsProvider {
    fn edge_dns_type(&self) -> EdgeDnsType {
        EdgeDnsType::NoEdgeDns
    }

    async fn synchronize_delegation(&self, gslb: &Gslb) -> Result<()> {
        debug!(gslb = %gslb.metadata.name.as_deref().unwrap_or_default(), "No edge DNS; skipping delegation");
        Ok(())
    }

    async fn finalize(&self, _gslb: &Gslb) -> Result<()> {
        Ok(())
    }

    async fn resolve_peer_targets(&self, host: &str) -> Vec<String> {
        resolve_peer_targets(&self.to_string(), &self.config, &self.assistant, host).await
    }

    async fn split_brain_check(&self, _gslb: &Gslb) -> Result<()> {
        Ok(())
    }
}
