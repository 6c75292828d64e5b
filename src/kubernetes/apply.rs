// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply of the desired state, in declaration order

use crate::constants::FIELD_MANAGER;
use crate::error::{DeployError, Result};
use crate::resources::{ClusterObject, DesiredState, ResourceKey};
use crate::types::Certificate;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::wait::await_condition;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Apply every object of the desired state; returns the applied keys in order.
/// A Certificate must report Ready within `certificate_timeout` before any
/// later object is applied.
#[instrument(skip(client, state))]
pub async fn apply_state(
    client: &Client,
    state: &DesiredState,
    certificate_timeout: Duration,
) -> Result<Vec<ResourceKey>> {
    let mut applied = Vec::with_capacity(state.len());

    for resource in state.resources() {
        let key = resource.object.key();
        debug!("Applying {} (depends on {:?})", key, resource.depends_on);

        match &resource.object {
            ClusterObject::Namespace(o) => {
                let api: Api<Namespace> = Api::all(client.clone());
                server_side_apply(&api, o).await?;
            }
            ClusterObject::ConfigMap(o) => {
                server_side_apply(&namespaced_api(client, o), o).await?;
            }
            ClusterObject::Secret(o) => {
                server_side_apply(&namespaced_api(client, o), o).await?;
            }
            ClusterObject::StatefulSet(o) => {
                server_side_apply(&namespaced_api(client, o), o).await?;
            }
            ClusterObject::Service(o) => {
                server_side_apply(&namespaced_api(client, o), o).await?;
            }
            ClusterObject::Certificate(o) => {
                let api = namespaced_api(client, o);
                server_side_apply(&api, o).await?;
                wait_for_certificate(api, &o.name_any(), certificate_timeout).await?;
            }
            ClusterObject::IngressRoute(o) => {
                server_side_apply(&namespaced_api(client, o), o).await?;
            }
        }

        info!("Applied {}", key);
        applied.push(key);
    }

    Ok(applied)
}

fn namespaced_api<K>(client: &Client, object: &K) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match object.meta().namespace.as_deref() {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::default_namespaced(client.clone()),
    }
}

async fn server_side_apply<K>(api: &Api<K>, object: &K) -> Result<K>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug,
{
    let name = object.meta().name.clone().ok_or_else(|| {
        DeployError::GraphError("cannot apply an object without a name".to_string())
    })?;

    let params = PatchParams::apply(FIELD_MANAGER).force();
    Ok(api.patch(&name, &params, &Patch::Apply(object)).await?)
}

/// Block until cert-manager reports the certificate as issued
#[instrument(skip(api))]
pub async fn wait_for_certificate(
    api: Api<Certificate>,
    name: &str,
    timeout: Duration,
) -> Result<Certificate> {
    info!(
        "Waiting up to {}s for certificate {} to become ready...",
        timeout.as_secs(),
        name
    );

    let ready = |certificate: Option<&Certificate>| certificate.is_some_and(Certificate::is_ready);

    match tokio::time::timeout(timeout, await_condition(api, name, ready)).await {
        Ok(Ok(Some(certificate))) => {
            info!("Certificate {} is ready", name);
            Ok(certificate)
        }
        Ok(Ok(None)) => Err(DeployError::CertificateNotReady(format!(
            "certificate {} was deleted while waiting",
            name
        ))),
        Ok(Err(e)) => Err(DeployError::CertificateNotReady(format!(
            "failed to watch certificate {}: {}",
            name, e
        ))),
        Err(_) => Err(DeployError::CertificateNotReady(format!(
            "certificate {} not ready after {}s",
            name,
            timeout.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{full_config, minimal_config};
    use crate::resources::{compose, AdminCredentials};
    use crate::test_utils::MockService;
    use secrecy::Secret as SecretValue;
    use serde_json::json;

    const CERTIFICATES_PATH: &str = "/apis/cert-manager.io/v1/namespaces/documents/certificates";

    fn credentials() -> AdminCredentials {
        AdminCredentials {
            username: "admin".to_string(),
            password: SecretValue::new("password".to_string()),
            secret_key: SecretValue::new("secret-key".to_string()),
        }
    }

    fn certificate_list(ready: &str) -> String {
        json!({
            "apiVersion": "cert-manager.io/v1",
            "kind": "CertificateList",
            "metadata": { "resourceVersion": "1" },
            "items": [{
                "apiVersion": "cert-manager.io/v1",
                "kind": "Certificate",
                "metadata": { "name": "certificate", "namespace": "documents" },
                "spec": {
                    "secretName": "certificate",
                    "dnsNames": ["docs.example.com"],
                    "issuerRef": { "name": "lets-encrypt", "kind": "ClusterIssuer" },
                },
                "status": { "conditions": [{ "type": "Ready", "status": ready }] },
            }],
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_apply_in_declaration_order() {
        let mock = MockService::new();
        let client = mock.clone().into_client();
        let state = compose(&minimal_config(), &credentials()).unwrap();

        let applied = apply_state(&client, &state, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(applied.len(), state.len());
        assert_eq!(
            mock.patched_paths(),
            vec![
                "/api/v1/namespaces/paperless",
                "/api/v1/namespaces/paperless/configmaps/config",
                "/api/v1/namespaces/paperless/secrets/config-secret",
                "/apis/apps/v1/namespaces/paperless/statefulsets/paperless",
                "/api/v1/namespaces/paperless/services/paperless",
                "/apis/traefik.io/v1alpha1/namespaces/paperless/ingressroutes/ingress",
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_uses_forced_server_side_apply() {
        let mock = MockService::new();
        let client = mock.clone().into_client();
        let state = compose(&minimal_config(), &credentials()).unwrap();

        apply_state(&client, &state, Duration::from_secs(1))
            .await
            .unwrap();

        for request in mock.requests() {
            let query = request.query.unwrap_or_default();
            assert!(query.contains("fieldManager=paperless-deploy"), "{}", query);
            assert!(query.contains("force=true"), "{}", query);
        }
        let sts = mock
            .requests()
            .into_iter()
            .find(|r| r.path.ends_with("/statefulsets/paperless"))
            .unwrap();
        assert_eq!(sts.json()["kind"], "StatefulSet");
        assert_eq!(sts.json()["apiVersion"], "apps/v1");
    }

    #[tokio::test]
    async fn test_apply_waits_for_certificate_before_workload() {
        std::env::set_var("TEST_ENTRAID_SECRET", "entra-secret");
        let mock = MockService::new().on_get(CERTIFICATES_PATH, 200, &certificate_list("True"));
        let client = mock.clone().into_client();
        let state = compose(&full_config(), &credentials()).unwrap();

        apply_state(&client, &state, Duration::from_secs(5))
            .await
            .unwrap();

        let requests: Vec<_> = mock
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        let cert_get = requests
            .iter()
            .position(|r| r == &format!("GET {}", CERTIFICATES_PATH))
            .unwrap();
        let sts_patch = requests
            .iter()
            .position(|r| r.ends_with("/statefulsets/paperless"))
            .unwrap();
        assert!(cert_get < sts_patch);
    }

    #[tokio::test]
    async fn test_apply_stops_when_certificate_not_ready() {
        std::env::set_var("TEST_ENTRAID_SECRET", "entra-secret");
        let mock = MockService::new().on_get(CERTIFICATES_PATH, 200, &certificate_list("False"));
        let client = mock.clone().into_client();
        let state = compose(&full_config(), &credentials()).unwrap();

        let err = apply_state(&client, &state, Duration::from_millis(500))
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::CertificateNotReady(_)));
        assert!(!mock
            .patched_paths()
            .iter()
            .any(|p| p.ends_with("/statefulsets/paperless")));
    }

    #[tokio::test]
    async fn test_apply_surfaces_api_errors() {
        let mock = MockService::new().on_patch(
            "/api/v1/namespaces/paperless/configmaps/config",
            422,
            &json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": "invalid",
                "reason": "Invalid",
                "code": 422
            })
            .to_string(),
        );
        let client = mock.clone().into_client();
        let state = compose(&minimal_config(), &credentials()).unwrap();

        let err = apply_state(&client, &state, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::KubeError(_)));
        assert_eq!(mock.patched_paths().len(), 2);
    }
}
