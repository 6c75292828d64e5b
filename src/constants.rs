// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "paperless-deploy";

/// Label key/value pair selecting the Paperless pods
pub const APP_LABEL_KEY: &str = "app";
pub const APP_LABEL_VALUE: &str = "paperless";

/// Object names inside the application namespace
pub mod names {
    pub const CONFIG_MAP: &str = "config";
    pub const CONFIG_SECRET: &str = "config-secret";
    pub const STATEFUL_SET: &str = "paperless";
    pub const SERVICE: &str = "paperless";
    pub const INGRESS_ROUTE: &str = "ingress";
    pub const CERTIFICATE: &str = "certificate";
    pub const CERTIFICATE_SECRET: &str = "certificate";
    pub const DATA_VOLUME: &str = "data";
    pub const MEDIA_VOLUME: &str = "media";
}

/// Container images, tagged with the configured versions
pub mod images {
    pub const PAPERLESS: &str = "ghcr.io/paperless-ngx/paperless-ngx";
    pub const REDIS: &str = "docker.io/library/redis";
}

/// Paperless environment variable keys
pub mod env {
    pub const REDIS: &str = "PAPERLESS_REDIS";
    pub const URL: &str = "PAPERLESS_URL";
    pub const PORT: &str = "PAPERLESS_PORT";
    pub const ADMIN_USER: &str = "PAPERLESS_ADMIN_USER";
    pub const ADMIN_PASSWORD: &str = "PAPERLESS_ADMIN_PASSWORD";
    pub const SECRET_KEY: &str = "PAPERLESS_SECRET_KEY";
    pub const APPS: &str = "PAPERLESS_APPS";
    pub const ACCOUNT_EMAIL_VERIFICATION: &str = "PAPERLESS_ACCOUNT_EMAIL_VERIFICATION";
    pub const OIDC_DEFAULT_GROUP: &str = "PAPERLESS_OIDC_DEFAULT_GROUP";
    pub const SOCIALACCOUNT_PROVIDERS: &str = "PAPERLESS_SOCIALACCOUNT_PROVIDERS";
}

/// Generated admin credentials
pub mod credentials {
    pub const ADMIN_USERNAME: &str = "admin";
    pub const PASSWORD_LENGTH: usize = 64;
}
