// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Traefik HTTP router mapping a host rule onto services
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "traefik.io", version = "v1alpha1", kind = "IngressRoute")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct IngressRouteSpec {
    pub entry_points: Vec<String>,
    pub routes: Vec<Route>,
    /// An empty section selects Traefik's default certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouteTls>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub kind: String,
    #[serde(rename = "match")]
    pub match_rule: String,
    pub services: Vec<RouteService>,
}

impl Route {
    /// Rule matching requests for a single host
    pub fn host(fqdn: &str, services: Vec<RouteService>) -> Self {
        Self {
            kind: "Rule".to_string(),
            match_rule: format!("Host(`{}`)", fqdn),
            services,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteService {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub port: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteTls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}
