// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::dns::DnsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("Required CRD not served by the cluster: {0}")]
    MissingCrd(String),

    #[error("Invalid desired state: {0}")]
    GraphError(String),

    #[error("Certificate not ready: {0}")]
    CertificateNotReady(String),

    #[error("Failed to resolve ingress address: {0}")]
    IngressAddressError(String),

    #[error("DNS reconciliation failed: {0}")]
    DnsError(#[from] DnsError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DeployError {
    fn from(e: serde_json::Error) -> Self {
        DeployError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for DeployError {
    fn from(e: serde_yaml::Error) -> Self {
        DeployError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
