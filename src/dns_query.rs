// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Outbound DNS queries against edge and peer nameservers.
//!
//! Queries go over UDP with the hickory synchronous client, run on the blocking
//! thread pool so the reconcile task is never stalled. Answers are returned in
//! their zone-file presentation form, which is what the split-brain marker
//! parser consumes.

use crate::constants::{DNS_PORT, FAKE_DNS_SERVER};
use crate::gslb_errors::{GslbError, Result};
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use tracing::debug;

/// One answer record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsAnswer {
    /// Owner name as returned by the server
    pub name: String,
    /// Record TTL in seconds
    pub ttl: u32,
    /// Record type
    pub record_type: RecordType,
    /// Presentation form of the rdata (an address for `A`, a quoted string for `TXT`)
    pub data: String,
}

impl DnsAnswer {
    /// Convert a hickory record; `None` for records without rdata.
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let data = record.data().map(presentation_data)?;
        Some(Self {
            name: record.name().to_string(),
            ttl: record.ttl(),
            record_type: record.record_type(),
            data,
        })
    }
}

/// Tab-separated zone-file line: `name ttl class type rdata`.
impl fmt::Display for DnsAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\tIN\t{}\t{}",
            self.name, self.ttl, self.record_type, self.data
        )
    }
}

fn presentation_data(rdata: &RData) -> String {
    match rdata {
        RData::A(address) => address.0.to_string(),
        RData::TXT(txt) => {
            let joined: String = txt
                .txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk))
                .collect();
            format!("\"{joined}\"")
        }
        other => other.to_string(),
    }
}

/// Issues a single DNS query.
#[async_trait]
pub trait DnsQuerier: Send + Sync {
    /// Query `name` for `record_type` at `server` (`host:port`).
    ///
    /// Only answers of the requested type are returned. An empty answer section
    /// is not an error.
    async fn query(
        &self,
        server: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsAnswer>>;
}

/// [`DnsQuerier`] using the hickory UDP client.
#[derive(Clone, Copy, Debug, Default)]
pub struct HickoryQuerier;

#[async_trait]
impl DnsQuerier for HickoryQuerier {
    async fn query(
        &self,
        server: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsAnswer>> {
        let server_str = server.to_string();
        let name_str = name.to_string();
        let query_error = |reason: String| GslbError::Query {
            server: server.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            reason,
        };

        debug!(server = %server, name = %name, record_type = %record_type, "Querying DNS");

        tokio::task::spawn_blocking(move || -> std::result::Result<Vec<DnsAnswer>, String> {
            let server_addr = server_str
                .to_socket_addrs()
                .map_err(|e| format!("invalid server address {server_str}: {e}"))?
                .next()
                .ok_or_else(|| format!("server address {server_str} resolved to nothing"))?;

            let conn = UdpClientConnection::new(server_addr)
                .map_err(|e| format!("failed to create UDP connection: {e}"))?;
            let client = SyncClient::new(conn);

            let fqdn =
                Name::from_str(&name_str).map_err(|e| format!("invalid name {name_str}: {e}"))?;

            let response = client
                .query(&fqdn, DNSClass::IN, record_type)
                .map_err(|e| e.to_string())?;

            Ok(response
                .answers()
                .iter()
                .filter(|r| r.record_type() == record_type)
                .filter_map(DnsAnswer::from_record)
                .collect())
        })
        .await
        .map_err(|e| query_error(format!("DNS query task failed: {e}")))?
        .map_err(query_error)
    }
}

/// Which nameserver the split-brain and peer queries are sent to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolverTarget {
    /// The named server on the standard DNS port.
    Edge,
    /// Always this fixed address, whatever server is named.
    Fixed(String),
}

impl ResolverTarget {
    /// Loopback fake resolver used by local test installations.
    #[must_use]
    pub fn fake() -> Self {
        Self::Fixed(FAKE_DNS_SERVER.to_string())
    }

    /// Socket address to query for `server`.
    #[must_use]
    pub fn address_for(&self, server: &str) -> String {
        match self {
            Self::Edge => with_dns_port(server),
            Self::Fixed(address) => address.clone(),
        }
    }
}

/// `server:53`; IPv6 literals are bracketed.
#[must_use]
pub fn with_dns_port(server: &str) -> String {
    match server.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, DNS_PORT).to_string(),
        Err(_) => format!("{server}:{DNS_PORT}"),
    }
}

#[cfg(test)]
#[path = "dns_query_tests.rs"]
mod dns_query_tests;
