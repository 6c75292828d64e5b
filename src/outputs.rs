// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Values published at the end of a deployment pass

use crate::error::Result;
use crate::resources::AdminCredentials;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::net::Ipv4Addr;

const MASK: &str = "[secret]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Outputs {
    pub fqdn: String,
    pub admin_username: String,
    pub admin_password: String,
    pub ipv4: Ipv4Addr,
}

impl Outputs {
    /// The admin password is masked unless `show_secrets` is set
    pub fn new(
        fqdn: &str,
        credentials: &AdminCredentials,
        ipv4: Ipv4Addr,
        show_secrets: bool,
    ) -> Self {
        let admin_password = if show_secrets {
            credentials.password.expose_secret().clone()
        } else {
            MASK.to_string()
        };

        Self {
            fqdn: fqdn.to_string(),
            admin_username: credentials.username.clone(),
            admin_password,
            ipv4,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
