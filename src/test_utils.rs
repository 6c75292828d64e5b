// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the Kubernetes API server and the DNS API.

use crate::dns::{DnsApi, DnsError, DnsRecord};
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request received by the mock API server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
/// PATCH requests without a predefined response echo the submitted object back,
/// which is what a server-side apply of a new object returns.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("PATCH".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "paperless")
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Paths of the PATCH requests received so far
    pub fn patched_paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "PATCH")
            .map(|r| r.path)
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes();
            requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path,
                query,
                body: body.clone(),
            });

            let (status, body) = match response {
                Some((status, body)) => (status, body.into_bytes()),
                None if method == "PATCH" => (200, body.to_vec()),
                None => (404, not_found_json("resource", "unknown").into_bytes()),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

#[derive(Default)]
struct FakeDnsState {
    records: Vec<DnsRecord>,
    next_id: u32,
    lookups: usize,
    creates: usize,
    updates: usize,
    deletes: usize,
    failure: Option<DnsError>,
}

/// In-memory DNS API counting every call it receives
#[derive(Default)]
pub struct FakeDnsApi {
    state: Mutex<FakeDnsState>,
}

impl FakeDnsApi {
    /// Seed a record, assigning it an identifier
    pub fn insert(&self, mut record: DnsRecord) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        record.id = Some(format!("record-{}", state.next_id));
        state.records.push(record);
    }

    /// Make the next call fail with the given error
    pub fn fail_with(&self, error: DnsError) {
        self.state.lock().unwrap().failure = Some(error);
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }

    pub fn mutations(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.creates + state.updates + state.deletes
    }
}

#[async_trait::async_trait]
impl DnsApi for FakeDnsApi {
    async fn find_a_record(&self, domain_name: &str) -> Result<Option<DnsRecord>, DnsError> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        if let Some(e) = state.failure.take() {
            return Err(e);
        }
        Ok(state
            .records
            .iter()
            .find(|r| r.is_a_record_for(domain_name))
            .cloned())
    }

    async fn create_record(&self, record: &DnsRecord) -> Result<DnsRecord, DnsError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.failure.take() {
            return Err(e);
        }
        state.creates += 1;
        state.next_id += 1;
        let created = DnsRecord {
            id: Some(format!("record-{}", state.next_id)),
            ..record.clone()
        };
        state.records.push(created.clone());
        Ok(created)
    }

    async fn update_record(&self, record: &DnsRecord) -> Result<DnsRecord, DnsError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.failure.take() {
            return Err(e);
        }
        state.updates += 1;
        let Some(existing) = state.records.iter_mut().find(|r| r.id == record.id) else {
            return Err(DnsError::Api {
                status: 404,
                body: "no such record".to_string(),
            });
        };
        *existing = record.clone();
        Ok(record.clone())
    }

    async fn delete_record(&self, id: &str) -> Result<(), DnsError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.failure.take() {
            return Err(e);
        }
        state.deletes += 1;
        state.records.retain(|r| r.id.as_deref() != Some(id));
        Ok(())
    }
}
