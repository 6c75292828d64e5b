// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Admin credentials and the Django secret key, generated once and then reused
//! from the live Secret so repeated runs do not rotate them.

use crate::constants::{credentials::*, env, names};
use crate::error::Result;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{Secret as SecretValue, SecretString};
use tracing::{info, instrument};

#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
    pub secret_key: SecretString,
}

impl AdminCredentials {
    /// Fresh random password and secret key
    pub fn generate() -> Self {
        Self {
            username: ADMIN_USERNAME.to_string(),
            password: SecretValue::new(random_password(PASSWORD_LENGTH)),
            secret_key: SecretValue::new(random_password(PASSWORD_LENGTH)),
        }
    }

    /// Credentials previously stored in the configuration Secret, if complete
    pub fn from_secret(secret: &Secret) -> Option<Self> {
        let read = |key: &str| -> Option<String> {
            secret
                .data
                .as_ref()
                .and_then(|d| d.get(key))
                .and_then(|v| String::from_utf8(v.0.clone()).ok())
                .filter(|v| !v.is_empty())
        };

        Some(Self {
            username: ADMIN_USERNAME.to_string(),
            password: SecretValue::new(read(env::ADMIN_PASSWORD)?),
            secret_key: SecretValue::new(read(env::SECRET_KEY)?),
        })
    }
}

/// Alphanumeric random string without special characters
fn random_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Reuse the credentials stored in the namespace, or generate new ones
#[instrument(skip(client))]
pub async fn load_or_generate(client: &Client, namespace: &str) -> Result<AdminCredentials> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    match secrets.get_opt(names::CONFIG_SECRET).await? {
        Some(secret) => {
            if let Some(credentials) = AdminCredentials::from_secret(&secret) {
                info!("Reusing admin credentials from {}/{}", namespace, names::CONFIG_SECRET);
                return Ok(credentials);
            }
            info!(
                "Secret {}/{} holds no complete credentials, generating new ones",
                namespace,
                names::CONFIG_SECRET
            );
        }
        None => info!("No existing credentials in {}, generating new ones", namespace),
    }

    Ok(AdminCredentials::generate())
}
