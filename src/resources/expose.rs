// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exposure of the workload: cluster Service, optional certificate and the
//! Traefik route publishing it under the configured domain.

use super::namespaced_meta;
use crate::constants::names;
use crate::error::{DeployError, Result};
use crate::types::certificate::IssuerRef;
use crate::types::ingress_route::{Route, RouteService, RouteTls};
use crate::types::{Certificate, CertificateSpec, IngressRoute, IngressRouteSpec};
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

/// Service selecting exactly the pods of the given StatefulSet
pub fn service(statefulset: &StatefulSet, namespace: &str) -> Result<Service> {
    let selector = statefulset
        .spec
        .as_ref()
        .and_then(|s| s.selector.match_labels.clone())
        .ok_or_else(|| {
            DeployError::GraphError(format!(
                "StatefulSet {} has no label selector",
                statefulset.name_any()
            ))
        })?;

    Ok(Service {
        metadata: namespaced_meta(names::SERVICE, namespace),
        spec: Some(ServiceSpec {
            selector: Some(selector),
            ports: Some(vec![ServicePort {
                name: Some("http".to_string()),
                port: 80,
                target_port: Some(IntOrString::String("http".to_string())),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// cert-manager certificate for the service domain
pub fn certificate(fqdn: &str, cluster_issuer: &str, namespace: &str) -> Certificate {
    let mut certificate = Certificate::new(
        names::CERTIFICATE,
        CertificateSpec {
            secret_name: names::CERTIFICATE_SECRET.to_string(),
            dns_names: vec![fqdn.to_string()],
            issuer_ref: IssuerRef::cluster_issuer(cluster_issuer),
        },
    );
    certificate.metadata.namespace = Some(namespace.to_string());
    certificate
}

/// Route for the service domain; TLS falls back to the ingress default
/// certificate when no dedicated certificate is declared
pub fn ingress_route(
    fqdn: &str,
    entry_point: &str,
    service: &Service,
    certificate: Option<&Certificate>,
) -> Result<IngressRoute> {
    let has_http_port = service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .is_some_and(|ports| ports.iter().any(|p| p.name.as_deref() == Some("http")));
    if !has_http_port {
        return Err(DeployError::GraphError(format!(
            "Service {} exposes no http port",
            service.name_any()
        )));
    }

    let tls = RouteTls {
        secret_name: certificate.map(|c| c.spec.secret_name.clone()),
    };

    let mut route = IngressRoute::new(
        names::INGRESS_ROUTE,
        IngressRouteSpec {
            entry_points: vec![entry_point.to_string()],
            routes: vec![Route::host(
                fqdn,
                vec![RouteService {
                    name: service.name_any(),
                    namespace: service.namespace(),
                    port: "http".to_string(),
                }],
            )],
            tls: Some(tls),
        },
    );

    route.metadata.namespace = service.namespace();
    Ok(route)
}
