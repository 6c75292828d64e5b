// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checks run before anything is applied

use crate::error::{DeployError, Result};
use crate::types::{Certificate, IngressRoute};
use kube::{discovery::Discovery, Client, Resource};
use tracing::{info, instrument};

/// A custom resource kind the deployment submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCrd {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl RequiredCrd {
    fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self {
            group: K::group(&()).to_string(),
            version: K::version(&()).to_string(),
            kind: K::kind(&()).to_string(),
        }
    }
}

impl std::fmt::Display for RequiredCrd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.kind, self.group, self.version)
    }
}

/// The CRDs a pass needs; the certificate CRD only when TLS is managed here
pub fn required_crds(manage_certificate: bool) -> Vec<RequiredCrd> {
    let mut crds = vec![RequiredCrd::of::<IngressRoute>()];
    if manage_certificate {
        crds.push(RequiredCrd::of::<Certificate>());
    }
    crds
}

/// Fail fast unless every required CRD is served by the cluster
#[instrument(skip(client))]
pub async fn ensure_crds_served(client: &Client, manage_certificate: bool) -> Result<()> {
    let required = required_crds(manage_certificate);
    let groups: Vec<&str> = required.iter().map(|c| c.group.as_str()).collect();

    let discovery = Discovery::new(client.clone())
        .filter(&groups)
        .run()
        .await?;

    for crd in &required {
        if !is_served(&discovery, crd) {
            return Err(DeployError::MissingCrd(crd.to_string()));
        }
        info!("CRD {} is available", crd);
    }

    Ok(())
}

fn is_served(discovery: &Discovery, crd: &RequiredCrd) -> bool {
    discovery
        .groups()
        .filter(|group| group.name() == crd.group)
        .any(|group| {
            group
                .versioned_resources(&crd.version)
                .iter()
                .any(|(ar, _)| ar.kind == crd.kind)
        })
}
