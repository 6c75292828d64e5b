// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DNS "A" record reconciliation against an external DNS management API.

pub mod provider;
pub mod unify;

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use thiserror::Error;

pub use provider::{DnsRecordProvider, ReconcileAction, ReconcileOutcome};
pub use unify::UnifyClient;

/// Record type managed by the provider
pub const RECORD_TYPE_A: &str = "A";

#[derive(Error, Debug)]
pub enum DnsError {
    #[error("Failed to connect to DNS API: {0}")]
    Connection(String),

    #[error("DNS API rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("DNS API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode DNS API response: {0}")]
    Decode(String),

    #[error("Invalid DNS API request: {0}")]
    InvalidRequest(String),
}

/// A static DNS record as stored by the DNS API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DnsRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fully-qualified domain name; the identity of the record
    pub key: String,
    pub record_type: String,
    pub value: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl DnsRecord {
    /// A new, not yet persisted "A" record
    pub fn a(domain_name: &str, ipv4: Ipv4Addr) -> Self {
        Self {
            id: None,
            key: domain_name.to_string(),
            record_type: RECORD_TYPE_A.to_string(),
            value: ipv4.to_string(),
            enabled: true,
        }
    }

    pub fn is_a_record_for(&self, domain_name: &str) -> bool {
        self.record_type == RECORD_TYPE_A && self.key.eq_ignore_ascii_case(domain_name)
    }
}

fn default_enabled() -> bool {
    true
}

/// Minimal CRUD surface of a DNS management API
#[async_trait::async_trait]
pub trait DnsApi: Send + Sync {
    /// Look up the "A" record for a domain name
    async fn find_a_record(&self, domain_name: &str) -> Result<Option<DnsRecord>, DnsError>;

    /// Create a record, returning it with its assigned identifier
    async fn create_record(&self, record: &DnsRecord) -> Result<DnsRecord, DnsError>;

    /// Replace an existing record, identified by its `id`
    async fn update_record(&self, record: &DnsRecord) -> Result<DnsRecord, DnsError>;

    /// Delete the record with the given identifier
    async fn delete_record(&self, id: &str) -> Result<(), DnsError>;
}
