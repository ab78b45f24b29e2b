// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Infoblox provider.
//!
//! Records are published through external-dns like the other backends, but the
//! grid settings external-dns needs are validated when the provider is built so
//! a misconfigured installation fails at start-up instead of on every pass.

use super::external::ExternalDnsProvider;
use super::DnsProvider;
use crate::config::{Config, EdgeDnsType, InfobloxConfig};
use crate::crd::Gslb;
use crate::gslb_errors::{GslbError, Result};
use crate::providers::assistant::GslbAssistant;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use url::Url;

const PROVIDER: &str = "INFOBLOX";

pub struct InfobloxDnsProvider {
    inner: ExternalDnsProvider,
    wapi_url: Url,
}

impl InfobloxDnsProvider {
    /// Validate the grid settings and build the provider.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::Construction`] when a grid setting is missing or
    /// does not form a valid WAPI URL.
    pub fn new(config: Config, assistant: Arc<GslbAssistant>) -> Result<Self> {
        let wapi_url = wapi_url(&config.infoblox)?;
        info!(wapi_url = %wapi_url, "Infoblox grid configured");
        Ok(Self {
            inner: ExternalDnsProvider::new(EdgeDnsType::Infoblox, config, assistant),
            wapi_url,
        })
    }

    /// WAPI base URL of the grid.
    #[must_use]
    pub fn wapi_url(&self) -> &Url {
        &self.wapi_url
    }
}

fn construction(reason: impl Into<String>) -> GslbError {
    GslbError::Construction {
        provider: PROVIDER.to_string(),
        reason: reason.into(),
    }
}

/// `https://<grid host>:<port>/wapi/v<version>/`, after checking credentials.
///
/// # Errors
///
/// Returns [`GslbError::Construction`] naming the first invalid setting.
pub fn wapi_url(infoblox: &InfobloxConfig) -> Result<Url> {
    let host = infoblox
        .grid_host
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| construction("grid host is empty"))?;
    if infoblox.wapi_version.trim().is_empty() {
        return Err(construction("WAPI version is empty"));
    }
    if infoblox.wapi_port == 0 {
        return Err(construction("WAPI port must be greater than zero"));
    }
    if infoblox.username.as_deref().unwrap_or_default().is_empty() {
        return Err(construction("WAPI username is empty"));
    }
    if infoblox.password.as_deref().unwrap_or_default().is_empty() {
        return Err(construction("WAPI password is empty"));
    }

    let raw = format!(
        "https://{host}:{}/wapi/v{}/",
        infoblox.wapi_port,
        infoblox.wapi_version.trim()
    );
    Url::parse(&raw).map_err(|e| construction(format!("invalid WAPI URL {raw}: {e}")))
}

impl fmt::Display for InfobloxDnsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(PROVIDER)
    }
}

#[async_trait]
impl DnsProvider for InfobloxDnsProvider {
    fn edge_dns_type(&self) -> EdgeDnsType {
        EdgeDnsType::Infoblox
    }

    async fn synchronize_delegation(&self, gslb: &Gslb) -> Result<()> {
        self.inner.synchronize_delegation(gslb).await
    }

    async fn finalize(&self, gslb: &Gslb) -> Result<()> {
        self.inner.finalize(gslb).await
    }

    async fn resolve_peer_targets(&self, host: &str) -> Vec<String> {
        self.inner.resolve_peer_targets(host).await
    }

    async fn split_brain_check(&self, gslb: &Gslb) -> Result<()> {
        self.inner.split_brain_check(gslb).await
    }
}

#[cfg(test)]
#[path = "infoblox_tests.rs"]
mod infoblox_tests;
