// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Component configuration, loaded from a YAML document and validated against
//! a closed schema.

use crate::error::{DeployError, Result};
use secrecy::{Secret, SecretString};
use serde::Deserialize;
use std::env;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use url::Url;

/// Root configuration of a Paperless deployment
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ComponentConfig {
    pub service: ServiceConfig,
    pub paperless: PaperlessConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub entraid: Option<EntraIdConfig>,
    pub unify: UnifyConfig,
    #[serde(default)]
    pub ingress: IngressConfig,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServiceConfig {
    pub domain_name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PaperlessConfig {
    pub version: String,
    #[serde(default = "default_paperless_port")]
    pub port: u16,
    #[serde(default = "default_data_size_gb")]
    pub data_size_gb: u32,
    #[serde(default = "default_media_size_gb")]
    pub media_size_gb: u32,
    #[serde(default = "default_storage_class")]
    pub storage_class: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RedisConfig {
    #[serde(default = "default_redis_version")]
    pub version: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            version: default_redis_version(),
            port: default_redis_port(),
        }
    }
}

/// Microsoft Entra ID OpenID Connect application
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EntraIdConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: EnvVarRef,
}

/// UniFi network controller hosting the static DNS records
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UnifyConfig {
    pub url: Url,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default = "default_api_token")]
    pub api_token: EnvVarRef,
    /// Fixed record address; resolved from the ingress load balancer when unset
    #[serde(default)]
    pub ipv4: Option<Ipv4Addr>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IngressConfig {
    #[serde(default = "default_ingress_namespace")]
    pub service_namespace: String,
    #[serde(default = "default_ingress_service")]
    pub service_name: String,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            service_namespace: default_ingress_namespace(),
            service_name: default_ingress_service(),
            entry_point: default_entry_point(),
        }
    }
}

/// Dedicated cert-manager certificate instead of the ingress default
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TlsConfig {
    pub cluster_issuer: String,
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClusterConfig {
    #[serde(default)]
    pub kubeconfig: Option<KubeconfigSource>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Wrapped {
    config: ComponentConfig,
}

/// Where the target cluster's kubeconfig is published
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KubeconfigSource {
    /// Stored in a Secret of the current cluster context
    Secret(SecretKeyRef),
    /// A kubeconfig file on disk
    Path(PathBuf),
    /// The kubeconfig document itself, in an environment variable
    Envvar(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SecretKeyRef {
    pub namespace: String,
    pub name: String,
    pub key: String,
}

/// Reference to a secret value held in an environment variable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvVarRef {
    pub envvar: String,
}

impl EnvVarRef {
    pub fn new(envvar: impl Into<String>) -> Self {
        Self {
            envvar: envvar.into(),
        }
    }

    /// Read the referenced variable from the process environment
    pub fn value(&self) -> Result<SecretString> {
        env::var(&self.envvar)
            .map(Secret::new)
            .map_err(|_| DeployError::MissingEnvVar(self.envvar.clone()))
    }
}

impl ComponentConfig {
    /// Load and validate configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DeployError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(raw).map_err(|e| DeployError::ConfigError(e.to_string()))?;

        // Accept the object bare or nested under a single `config:` key
        let wrapped = value
            .as_mapping()
            .is_some_and(|m| m.len() == 1 && m.contains_key("config"));

        let config = if wrapped {
            serde_yaml::from_str::<Wrapped>(raw).map(|w| w.config)
        } else {
            serde_yaml::from_str::<ComponentConfig>(raw)
        }
        .map_err(|e| DeployError::ConfigError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.service.domain_name.trim().is_empty() {
            return Err(DeployError::ConfigError(
                "service.domain-name must not be empty".to_string(),
            ));
        }
        if self.service.namespace.trim().is_empty() {
            return Err(DeployError::ConfigError(
                "service.namespace must not be empty".to_string(),
            ));
        }
        if self.paperless.version.trim().is_empty() {
            return Err(DeployError::ConfigError(
                "paperless.version must not be empty".to_string(),
            ));
        }
        if self.paperless.data_size_gb == 0 || self.paperless.media_size_gb == 0 {
            return Err(DeployError::ConfigError(
                "paperless storage sizes must be at least 1 GB".to_string(),
            ));
        }
        if !matches!(self.unify.url.scheme(), "http" | "https") {
            return Err(DeployError::ConfigError(format!(
                "unify.url must be an http(s) URL, got {}",
                self.unify.url
            )));
        }
        Ok(())
    }

    /// Fully-qualified domain name the service is published under
    pub fn fqdn(&self) -> &str {
        &self.service.domain_name
    }
}

fn default_namespace() -> String {
    "paperless".to_string()
}

fn default_paperless_port() -> u16 {
    8000
}

fn default_data_size_gb() -> u32 {
    10
}

fn default_media_size_gb() -> u32 {
    50
}

fn default_storage_class() -> String {
    "data-hostpath-retained".to_string()
}

fn default_redis_version() -> String {
    "7".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_true() -> bool {
    true
}

fn default_site() -> String {
    "default".to_string()
}

fn default_api_token() -> EnvVarRef {
    EnvVarRef::new("UNIFY_API_TOKEN")
}

fn default_ingress_namespace() -> String {
    "traefik".to_string()
}

fn default_ingress_service() -> String {
    "traefik".to_string()
}

fn default_entry_point() -> String {
    "websecure".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    300
}
