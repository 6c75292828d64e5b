// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Paperless configuration: plain settings in a ConfigMap, credentials in a Secret.

use super::{namespaced_meta, AdminCredentials, SecretResolution, REDACTED};
use crate::config::{ComponentConfig, EntraIdConfig};
use crate::constants::{env, names};
use crate::error::Result;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use secrecy::ExposeSecret;
use serde_json::json;
use std::collections::BTreeMap;

const OIDC_PROVIDER_APP: &str = "allauth.socialaccount.providers.openid_connect";
const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const USERINFO_URL: &str = "https://graph.microsoft.com/oidc/userinfo";

/// Build the ConfigMap and Secret consumed by the Paperless container
pub fn configure(
    config: &ComponentConfig,
    credentials: &AdminCredentials,
    secrets: SecretResolution,
) -> Result<(ConfigMap, Secret)> {
    let namespace = config.service.namespace.as_str();

    let mut data = BTreeMap::from([
        (
            env::REDIS.to_string(),
            format!("redis://localhost:{}", config.redis.port),
        ),
        (env::URL.to_string(), format!("https://{}", config.fqdn())),
        (env::PORT.to_string(), config.paperless.port.to_string()),
        (env::ADMIN_USER.to_string(), credentials.username.clone()),
    ]);

    let mut string_data = BTreeMap::from([
        (
            env::SECRET_KEY.to_string(),
            credentials.secret_key.expose_secret().clone(),
        ),
        (
            env::ADMIN_PASSWORD.to_string(),
            credentials.password.expose_secret().clone(),
        ),
    ]);

    if let Some(entraid) = &config.entraid {
        data.insert(env::APPS.to_string(), OIDC_PROVIDER_APP.to_string());
        data.insert(
            env::ACCOUNT_EMAIL_VERIFICATION.to_string(),
            "none".to_string(),
        );
        data.insert(env::OIDC_DEFAULT_GROUP.to_string(), "readers".to_string());

        let providers = match secrets {
            SecretResolution::Environment => {
                let client_secret = entraid.client_secret.value()?;
                socialaccount_providers(entraid, client_secret.expose_secret())?
            }
            SecretResolution::Redacted => socialaccount_providers(entraid, REDACTED)?,
        };
        string_data.insert(env::SOCIALACCOUNT_PROVIDERS.to_string(), providers);
    }

    let config_map = ConfigMap {
        metadata: namespaced_meta(names::CONFIG_MAP, namespace),
        data: Some(data),
        ..Default::default()
    };

    let secret = Secret {
        metadata: namespaced_meta(names::CONFIG_SECRET, namespace),
        string_data: Some(string_data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    };

    Ok((config_map, secret))
}

/// django-allauth provider settings for the Entra ID tenant
fn socialaccount_providers(entraid: &EntraIdConfig, client_secret: &str) -> Result<String> {
    let tenant = format!("{}/{}", LOGIN_BASE_URL, entraid.tenant_id);

    let providers = json!({
        "openid_connect": {
            "APPS": [
                {
                    "provider_id": "microsoft",
                    "name": "Microsoft Entra ID",
                    "client_id": entraid.client_id,
                    "secret": client_secret,
                    "settings": {
                        "server_url": format!("{}/v2.0", tenant),
                        "authorization_url": format!("{}/oauth2/v2.0/authorize", tenant),
                        "access_token_url": format!("{}/oauth2/v2.0/token", tenant),
                        "userinfo_url": USERINFO_URL,
                        "jwks_uri": format!("{}/discovery/v2.0/keys", tenant),
                        "scope": ["openid", "email", "profile"],
                        "extra_data": ["email", "name", "preferred_username"],
                    },
                }
            ]
        }
    });

    Ok(serde_json::to_string(&providers)?)
}
