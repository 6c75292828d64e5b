// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-before-write reconciliation of a single "A" record.

use super::{DnsApi, DnsError, DnsRecord};
use std::net::Ipv4Addr;
use tracing::{debug, info, instrument};

/// What a reconcile call did to the remote record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub record: DnsRecord,
    pub action: ReconcileAction,
}

/// Converges the DNS API onto a desired `(domain, ipv4)` pair.
/// Failures are returned as-is; retrying is left to the caller.
pub struct DnsRecordProvider<A> {
    api: A,
}

impl<A: DnsApi> DnsRecordProvider<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create the record when absent, update it when the address differs
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        domain_name: &str,
        ipv4: Ipv4Addr,
    ) -> Result<ReconcileOutcome, DnsError> {
        let desired = DnsRecord::a(domain_name, ipv4);

        match self.api.find_a_record(domain_name).await? {
            None => {
                info!("Creating A record {} -> {}", domain_name, ipv4);
                let record = self.api.create_record(&desired).await?;
                Ok(ReconcileOutcome {
                    record,
                    action: ReconcileAction::Created,
                })
            }
            Some(existing) if existing.value == desired.value && existing.enabled => {
                debug!("A record {} already points to {}", domain_name, ipv4);
                Ok(ReconcileOutcome {
                    record: existing,
                    action: ReconcileAction::Unchanged,
                })
            }
            Some(existing) => {
                info!(
                    "Updating A record {} from {} (enabled: {}) to {}",
                    domain_name, existing.value, existing.enabled, ipv4
                );
                // a disabled record does not resolve, so it counts as drift
                let updated = DnsRecord {
                    value: desired.value,
                    enabled: true,
                    ..existing
                };
                let record = self.api.update_record(&updated).await?;
                Ok(ReconcileOutcome {
                    record,
                    action: ReconcileAction::Updated,
                })
            }
        }
    }

    /// Delete the record for a domain; returns whether anything was removed
    #[instrument(skip(self))]
    pub async fn remove(&self, domain_name: &str) -> Result<bool, DnsError> {
        let Some(existing) = self.api.find_a_record(domain_name).await? else {
            debug!("No A record for {}, nothing to remove", domain_name);
            return Ok(false);
        };

        let Some(id) = existing.id.as_deref() else {
            return Err(DnsError::Decode(format!(
                "A record for {} has no identifier",
                domain_name
            )));
        };

        info!("Deleting A record {} ({})", domain_name, existing.value);
        self.api.delete_record(id).await?;
        Ok(true)
    }
}
