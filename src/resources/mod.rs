// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired-state graph of the cluster objects making up a Paperless deployment.

pub mod configure;
pub mod credentials;
pub mod expose;
pub mod workload;

use crate::config::ComponentConfig;
use crate::error::{DeployError, Result};
use crate::types::{Certificate, IngressRoute};
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, Service};
use kube::api::ObjectMeta;
use kube::Resource;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

pub use credentials::AdminCredentials;

/// Placeholder written in place of secret values that are never shown
pub const REDACTED: &str = "<redacted>";

/// How secret values referenced by the configuration are obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretResolution {
    /// Read from the process environment; missing variables are errors
    Environment,
    /// Replaced by a placeholder, for output that is only displayed
    Redacted,
}

/// A single desired cluster object
#[derive(Clone, Debug)]
pub enum ClusterObject {
    Namespace(Namespace),
    ConfigMap(ConfigMap),
    Secret(Secret),
    StatefulSet(StatefulSet),
    Service(Service),
    Certificate(Certificate),
    IngressRoute(IngressRoute),
}

impl ClusterObject {
    pub fn kind(&self) -> &'static str {
        match self {
            ClusterObject::Namespace(_) => "Namespace",
            ClusterObject::ConfigMap(_) => "ConfigMap",
            ClusterObject::Secret(_) => "Secret",
            ClusterObject::StatefulSet(_) => "StatefulSet",
            ClusterObject::Service(_) => "Service",
            ClusterObject::Certificate(_) => "Certificate",
            ClusterObject::IngressRoute(_) => "IngressRoute",
        }
    }

    fn meta(&self) -> &ObjectMeta {
        match self {
            ClusterObject::Namespace(o) => o.meta(),
            ClusterObject::ConfigMap(o) => o.meta(),
            ClusterObject::Secret(o) => o.meta(),
            ClusterObject::StatefulSet(o) => o.meta(),
            ClusterObject::Service(o) => o.meta(),
            ClusterObject::Certificate(o) => o.meta(),
            ClusterObject::IngressRoute(o) => o.meta(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        let meta = self.meta();
        ResourceKey {
            kind: self.kind(),
            namespace: meta.namespace.clone(),
            name: meta.name.clone().unwrap_or_default(),
        }
    }

    /// Serialize the object as a YAML manifest
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            ClusterObject::Namespace(o) => serde_yaml::to_string(o)?,
            ClusterObject::ConfigMap(o) => serde_yaml::to_string(o)?,
            ClusterObject::Secret(o) => serde_yaml::to_string(&redacted_secret(o))?,
            ClusterObject::StatefulSet(o) => serde_yaml::to_string(o)?,
            ClusterObject::Service(o) => serde_yaml::to_string(o)?,
            ClusterObject::Certificate(o) => serde_yaml::to_string(o)?,
            ClusterObject::IngressRoute(o) => serde_yaml::to_string(o)?,
        };
        Ok(yaml)
    }
}

/// Secret values are never printed; only their keys are kept
fn redacted_secret(secret: &Secret) -> Secret {
    let string_data = secret.string_data.as_ref().map(|data| {
        data.keys()
            .map(|k| (k.clone(), REDACTED.to_string()))
            .collect()
    });
    Secret {
        string_data,
        data: None,
        ..secret.clone()
    }
}

/// Identity of a cluster object: (kind, namespace, name)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub kind: &'static str,
    pub namespace: Option<String>,
    pub name: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DesiredResource {
    pub object: ClusterObject,
    pub depends_on: Vec<ResourceKey>,
}

/// Ordered set of desired objects with explicit dependency edges.
/// Edges can only point at objects declared earlier, so declaration order is
/// always a valid apply order.
#[derive(Clone, Debug, Default)]
pub struct DesiredState {
    resources: Vec<DesiredResource>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object depending on previously declared objects
    pub fn declare(
        &mut self,
        object: ClusterObject,
        depends_on: Vec<ResourceKey>,
    ) -> Result<ResourceKey> {
        let key = object.key();

        if key.name.is_empty() {
            return Err(DeployError::GraphError(format!(
                "{} declared without a name",
                key.kind
            )));
        }
        if self.get(&key).is_some() {
            return Err(DeployError::GraphError(format!("{} declared twice", key)));
        }
        if let Some(missing) = depends_on.iter().find(|dep| self.get(dep).is_none()) {
            return Err(DeployError::GraphError(format!(
                "{} depends on undeclared {}",
                key, missing
            )));
        }

        debug!("Declared {}", key);
        self.resources.push(DesiredResource { object, depends_on });
        Ok(key)
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&ClusterObject> {
        self.resources
            .iter()
            .map(|r| &r.object)
            .find(|o| &o.key() == key)
    }

    pub fn resources(&self) -> &[DesiredResource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Render all objects as a multi-document YAML stream
    pub fn to_yaml(&self) -> Result<String> {
        let mut out = String::new();
        for resource in &self.resources {
            out.push_str("---\n");
            out.push_str(&resource.object.to_yaml()?);
        }
        Ok(out)
    }
}

/// Labels selecting the Paperless pods
pub fn app_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(
        crate::constants::APP_LABEL_KEY.to_string(),
        crate::constants::APP_LABEL_VALUE.to_string(),
    )])
}

/// Metadata for an object in the application namespace
pub(crate) fn namespaced_meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

/// Build the complete desired state for a Paperless deployment
pub fn compose(config: &ComponentConfig, credentials: &AdminCredentials) -> Result<DesiredState> {
    compose_with(config, credentials, SecretResolution::Environment)
}

/// Build the desired state, choosing how configured secrets are resolved
pub fn compose_with(
    config: &ComponentConfig,
    credentials: &AdminCredentials,
    secrets: SecretResolution,
) -> Result<DesiredState> {
    let namespace = config.service.namespace.as_str();
    let mut state = DesiredState::new();

    let ns_key = state.declare(
        ClusterObject::Namespace(Namespace {
            metadata: ObjectMeta {
                name: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }),
        vec![],
    )?;

    let (config_map, config_secret) = configure::configure(config, credentials, secrets)?;
    let config_map_key = state.declare(ClusterObject::ConfigMap(config_map), vec![ns_key.clone()])?;
    let secret_key = state.declare(ClusterObject::Secret(config_secret), vec![ns_key.clone()])?;

    let certificate = config
        .tls
        .as_ref()
        .map(|tls| expose::certificate(config.fqdn(), &tls.cluster_issuer, namespace));
    let certificate_key = match &certificate {
        Some(c) => Some(state.declare(
            ClusterObject::Certificate(c.clone()),
            vec![ns_key.clone()],
        )?),
        None => None,
    };

    let statefulset = workload::statefulset(config, &config_map_key.name, &secret_key.name)?;
    let sts_key = state.declare(
        ClusterObject::StatefulSet(statefulset.clone()),
        vec![config_map_key, secret_key],
    )?;

    let service = expose::service(&statefulset, namespace)?;
    let service_key = state.declare(ClusterObject::Service(service.clone()), vec![sts_key])?;

    let ingress = expose::ingress_route(
        config.fqdn(),
        &config.ingress.entry_point,
        &service,
        certificate.as_ref(),
    )?;
    let mut ingress_deps = vec![service_key];
    ingress_deps.extend(certificate_key);
    state.declare(ClusterObject::IngressRoute(ingress), ingress_deps)?;

    Ok(state)
}
