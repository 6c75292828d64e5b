// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client for the static DNS records of a UniFi network controller.

use super::{DnsApi, DnsError, DnsRecord};
use crate::config::UnifyConfig;
use http::header::ACCEPT;
use http::StatusCode;
use reqwest::{Method, Request, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

pub struct UnifyClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    api_token: SecretString,
}

impl UnifyClient {
    /// Build a client; `verify_ssl = false` accepts any server certificate
    pub fn new(
        base_url: Url,
        site: &str,
        api_token: SecretString,
        verify_ssl: bool,
    ) -> Result<Self, DnsError> {
        if base_url.cannot_be_a_base() {
            return Err(DnsError::InvalidRequest(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| DnsError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            site: site.to_string(),
            api_token,
        })
    }

    /// Build a client from configuration, reading the API token from the environment
    pub fn from_config(config: &UnifyConfig) -> crate::error::Result<Self> {
        let api_token = config.api_token.value()?;
        Ok(Self::new(
            config.url.clone(),
            &config.site,
            api_token,
            config.verify_ssl,
        )?)
    }

    fn records_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "proxy",
                "network",
                "v2",
                "api",
                "site",
                self.site.as_str(),
                "static-dns",
            ]);
        }
        url
    }

    fn record_url(&self, id: &str) -> Url {
        let mut url = self.records_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.api_token.expose_secret())
            .header(ACCEPT, "application/json")
    }

    pub(crate) fn list_request(&self) -> Result<Request, DnsError> {
        self.request(Method::GET, self.records_url())
            .build()
            .map_err(invalid_request)
    }

    pub(crate) fn create_request(&self, record: &DnsRecord) -> Result<Request, DnsError> {
        self.request(Method::POST, self.records_url())
            .json(record)
            .build()
            .map_err(invalid_request)
    }

    pub(crate) fn update_request(&self, record: &DnsRecord) -> Result<Request, DnsError> {
        let id = record.id.as_deref().ok_or_else(|| {
            DnsError::InvalidRequest(format!("record {} has no identifier", record.key))
        })?;
        self.request(Method::PUT, self.record_url(id))
            .json(record)
            .build()
            .map_err(invalid_request)
    }

    pub(crate) fn delete_request(&self, id: &str) -> Result<Request, DnsError> {
        self.request(Method::DELETE, self.record_url(id))
            .build()
            .map_err(invalid_request)
    }

    async fn execute(&self, request: Request) -> Result<Response, DnsError> {
        debug!("{} {}", request.method(), request.url());

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| DnsError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, body))
    }
}

/// Map a non-2xx response onto the matching error kind
pub(crate) fn classify_failure(status: StatusCode, body: String) -> DnsError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DnsError::Unauthorized {
            status: status.as_u16(),
        },
        _ => DnsError::Api {
            status: status.as_u16(),
            body,
        },
    }
}

fn invalid_request(e: reqwest::Error) -> DnsError {
    DnsError::InvalidRequest(e.to_string())
}

fn decode_error(e: reqwest::Error) -> DnsError {
    DnsError::Decode(e.to_string())
}

#[async_trait::async_trait]
impl DnsApi for UnifyClient {
    #[instrument(skip(self))]
    async fn find_a_record(&self, domain_name: &str) -> Result<Option<DnsRecord>, DnsError> {
        let response = self.execute(self.list_request()?).await?;
        let records: Vec<DnsRecord> = response.json().await.map_err(decode_error)?;

        Ok(records
            .into_iter()
            .find(|r| r.is_a_record_for(domain_name)))
    }

    #[instrument(skip(self, record), fields(domain = %record.key))]
    async fn create_record(&self, record: &DnsRecord) -> Result<DnsRecord, DnsError> {
        let response = self.execute(self.create_request(record)?).await?;
        response.json().await.map_err(decode_error)
    }

    #[instrument(skip(self, record), fields(domain = %record.key))]
    async fn update_record(&self, record: &DnsRecord) -> Result<DnsRecord, DnsError> {
        let response = self.execute(self.update_request(record)?).await?;
        response.json().await.map_err(decode_error)
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: &str) -> Result<(), DnsError> {
        self.execute(self.delete_request(id)?).await?;
        Ok(())
    }
}
