// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One deployment pass: bind the cluster, compose the desired state, apply it
//! and reconcile the DNS record side by side.

use crate::config::ComponentConfig;
use crate::dns::{DnsApi, DnsRecordProvider, ReconcileOutcome, UnifyClient};
use crate::error::Result;
use crate::kubernetes::{apply_state, bind_cluster, ensure_crds_served, ingress_ipv4};
use crate::outputs::Outputs;
use crate::resources::{self, AdminCredentials, SecretResolution};
use kube::Client;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{info, instrument};

/// Render the desired state as YAML without touching the cluster or reading
/// configured secrets
pub fn render(config: &ComponentConfig) -> Result<String> {
    let state = resources::compose_with(
        config,
        &AdminCredentials::generate(),
        SecretResolution::Redacted,
    )?;
    state.to_yaml()
}

/// Full pass against the configured cluster and DNS API
pub async fn up(config: &ComponentConfig, show_secrets: bool) -> Result<Outputs> {
    let dns = DnsRecordProvider::new(UnifyClient::from_config(&config.unify)?);
    let client = bind_cluster(config.cluster.kubeconfig.as_ref(), &config.service.namespace).await?;
    run(&client, config, &dns, show_secrets).await
}

/// Apply the desired state and reconcile DNS concurrently; the first failure
/// aborts the pass
#[instrument(skip_all, fields(fqdn = %config.fqdn()))]
pub async fn run<A: DnsApi>(
    client: &Client,
    config: &ComponentConfig,
    dns: &DnsRecordProvider<A>,
    show_secrets: bool,
) -> Result<Outputs> {
    let namespace = config.service.namespace.as_str();

    let credentials = resources::credentials::load_or_generate(client, namespace).await?;
    let state = resources::compose(config, &credentials)?;
    info!("Composed {} objects for namespace {}", state.len(), namespace);

    ensure_crds_served(client, config.tls.is_some()).await?;

    let certificate_timeout =
        Duration::from_secs(config.tls.as_ref().map_or(0, |t| t.ready_timeout_secs));

    let (applied, ipv4) = tokio::try_join!(
        apply_state(client, &state, certificate_timeout),
        publish_dns(client, config, dns),
    )?;
    info!("Applied {} objects", applied.len());

    Ok(Outputs::new(config.fqdn(), &credentials, ipv4, show_secrets))
}

async fn publish_dns<A: DnsApi>(
    client: &Client,
    config: &ComponentConfig,
    dns: &DnsRecordProvider<A>,
) -> Result<Ipv4Addr> {
    let ipv4 = match config.unify.ipv4 {
        Some(ip) => ip,
        None => ingress_ipv4(client, &config.ingress).await?,
    };

    let outcome = dns.reconcile(config.fqdn(), ipv4).await?;
    info!("DNS record {} -> {}: {:?}", config.fqdn(), ipv4, outcome.action);
    Ok(ipv4)
}

/// Reconcile only the DNS record; the cluster is contacted only when the
/// address has to be read from the ingress load balancer
pub async fn dns_only(config: &ComponentConfig) -> Result<ReconcileOutcome> {
    let dns = DnsRecordProvider::new(UnifyClient::from_config(&config.unify)?);

    let ipv4 = match config.unify.ipv4 {
        Some(ip) => ip,
        None => {
            let client =
                bind_cluster(config.cluster.kubeconfig.as_ref(), &config.service.namespace)
                    .await?;
            ingress_ipv4(&client, &config.ingress).await?
        }
    };

    Ok(dns.reconcile(config.fqdn(), ipv4).await?)
}

/// Delete the DNS record for the service domain, if present
pub async fn remove_dns(config: &ComponentConfig) -> Result<bool> {
    let dns = DnsRecordProvider::new(UnifyClient::from_config(&config.unify)?);
    Ok(dns.remove(config.fqdn()).await?)
}
