// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Address lookup of the ingress controller's LoadBalancer Service

use crate::config::IngressConfig;
use crate::error::{DeployError, Result};
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client};
use std::net::Ipv4Addr;
use tracing::{info, instrument};

/// First IPv4 ingress address published in the Service's load balancer status
#[instrument(skip(client))]
pub async fn ingress_ipv4(client: &Client, ingress: &IngressConfig) -> Result<Ipv4Addr> {
    let services: Api<Service> = Api::namespaced(client.clone(), &ingress.service_namespace);
    let service = services.get(&ingress.service_name).await?;

    let ipv4 = service
        .status
        .and_then(|s| s.load_balancer)
        .and_then(|lb| lb.ingress)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| i.ip)
        .find_map(|ip| ip.parse::<Ipv4Addr>().ok())
        .ok_or_else(|| {
            DeployError::IngressAddressError(format!(
                "Service {}/{} has no IPv4 load balancer ingress",
                ingress.service_namespace, ingress.service_name
            ))
        })?;

    info!(
        "Ingress {}/{} is reachable at {}",
        ingress.service_namespace, ingress.service_name, ipv4
    );
    Ok(ipv4)
}
