// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target cluster client creation from a published kubeconfig

use crate::config::{KubeconfigSource, SecretKeyRef};
use crate::error::{DeployError, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config as KConfig};
use std::env;
use tracing::{info, instrument};

/// Create a client for the target cluster, defaulting to the given namespace
#[instrument(skip(source))]
pub async fn bind_cluster(source: Option<&KubeconfigSource>, namespace: &str) -> Result<Client> {
    let mut config = match source {
        None => {
            info!("Using kubeconfig inferred from the environment");
            KConfig::infer().await.map_err(|e| {
                DeployError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?
        }
        Some(KubeconfigSource::Secret(secret_ref)) => {
            let bootstrap = Client::try_default().await?;
            let kubeconfig = read_published_kubeconfig(&bootstrap, secret_ref).await?;
            config_from_kubeconfig(&kubeconfig).await?
        }
        Some(KubeconfigSource::Path(path)) => {
            info!("Reading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                DeployError::KubeconfigError(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            from_parsed(kubeconfig).await?
        }
        Some(KubeconfigSource::Envvar(var)) => {
            info!("Reading kubeconfig from environment variable {}", var);
            let kubeconfig =
                env::var(var).map_err(|_| DeployError::MissingEnvVar(var.clone()))?;
            config_from_kubeconfig(&kubeconfig).await?
        }
    };

    config.default_namespace = namespace.to_string();
    info!("Bound to cluster {} (namespace {})", config.cluster_url, namespace);

    Client::try_from(config)
        .map_err(|e| DeployError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Read a kubeconfig another deployment published into a Secret
#[instrument(skip(client))]
pub async fn read_published_kubeconfig(
    client: &Client,
    secret_ref: &SecretKeyRef,
) -> Result<String> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &secret_ref.namespace);

    info!(
        "Getting kubeconfig secret '{}/{}'...",
        secret_ref.namespace, secret_ref.name
    );

    let secret = secrets.get(&secret_ref.name).await.map_err(|e| {
        DeployError::KubeconfigError(format!(
            "Failed to get kubeconfig secret {}/{}: {}",
            secret_ref.namespace, secret_ref.name, e
        ))
    })?;

    let Some(data) = secret.data.as_ref() else {
        return Err(DeployError::KubeconfigError(format!(
            "Kubeconfig secret {}/{} has no data",
            secret_ref.namespace, secret_ref.name
        )));
    };

    let Some(kubeconfig_data) = data.get(&secret_ref.key) else {
        return Err(DeployError::KubeconfigError(format!(
            "Kubeconfig secret {}/{} does not contain '{}' key",
            secret_ref.namespace, secret_ref.name, secret_ref.key
        )));
    };

    String::from_utf8(kubeconfig_data.0.clone()).map_err(|e| {
        DeployError::KubeconfigError(format!(
            "Failed to decode kubeconfig in {}/{}: {}",
            secret_ref.namespace, secret_ref.name, e
        ))
    })
}

/// Build a client config from a kubeconfig document
pub async fn config_from_kubeconfig(kubeconfig: &str) -> Result<KConfig> {
    let parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| DeployError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;
    from_parsed(parsed).await
}

async fn from_parsed(kubeconfig: Kubeconfig) -> Result<KConfig> {
    KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| DeployError::KubeconfigError(format!("Failed to create config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
  - name: homelab
    cluster:
      server: https://10.0.10.10:6443
      insecure-skip-tls-verify: true
contexts:
  - name: homelab
    context:
      cluster: homelab
      user: deployer
current-context: homelab
users:
  - name: deployer
    user:
      token: abc123
"#;

    fn secret_ref() -> SecretKeyRef {
        SecretKeyRef {
            namespace: "pulumi".to_string(),
            name: "kubernetes-outputs".to_string(),
            key: "kube-config".to_string(),
        }
    }

    fn secret_json(key: &str, value: &str) -> String {
        serde_json::to_string(&Secret {
            metadata: crate::resources::namespaced_meta("kubernetes-outputs", "pulumi"),
            data: Some(BTreeMap::from([(
                key.to_string(),
                ByteString(value.as_bytes().to_vec()),
            )])),
            ..Default::default()
        })
        .unwrap()
    }

    const SECRET_PATH: &str = "/api/v1/namespaces/pulumi/secrets/kubernetes-outputs";

    #[tokio::test]
    async fn test_read_published_kubeconfig() {
        let client = MockService::new()
            .on_get(SECRET_PATH, 200, &secret_json("kube-config", KUBECONFIG))
            .into_client();

        let kubeconfig = read_published_kubeconfig(&client, &secret_ref()).await.unwrap();
        assert_eq!(kubeconfig, KUBECONFIG);
    }

    #[tokio::test]
    async fn test_read_published_kubeconfig_missing_key() {
        let client = MockService::new()
            .on_get(SECRET_PATH, 200, &secret_json("value", KUBECONFIG))
            .into_client();

        let err = read_published_kubeconfig(&client, &secret_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::KubeconfigError(ref m) if m.contains("kube-config")));
    }

    #[tokio::test]
    async fn test_read_published_kubeconfig_missing_secret() {
        let client = MockService::new().into_client();

        let err = read_published_kubeconfig(&client, &secret_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::KubeconfigError(_)));
    }

    #[tokio::test]
    async fn test_config_from_kubeconfig() {
        let config = config_from_kubeconfig(KUBECONFIG).await.unwrap();
        assert_eq!(config.cluster_url.to_string(), "https://10.0.10.10:6443/");
    }

    #[tokio::test]
    async fn test_config_from_invalid_kubeconfig() {
        let err = config_from_kubeconfig("clusters: 42").await.unwrap_err();
        assert!(matches!(err, DeployError::KubeconfigError(_)));
    }
}
