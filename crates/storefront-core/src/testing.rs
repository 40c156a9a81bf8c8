//! Scripted backend for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::api::{ApiRequest, Transport, TransportError, TransportResponse};

type Handler = dyn Fn(&ApiRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Answers every request with a closure and records what it was sent.
pub(crate) struct MockBackend {
    handler: Box<Handler>,
    delays: HashMap<String, Duration>,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockBackend {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            delays: HashMap::new(),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Hold responses for `path` back by `delay`.
    pub fn with_delay(self: Arc<Self>, path: &str, delay: Duration) -> Arc<Self> {
        let mut backend = Arc::try_unwrap(self).unwrap_or_else(|_| panic!("backend already shared"));
        backend.delays.insert(path.to_string(), delay);
        Arc::new(backend)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delays.get(&request.path) {
            tokio::time::sleep(*delay).await;
        }
        (self.handler)(request)
    }
}

pub(crate) fn json_response(
    status: u16,
    body: serde_json::Value,
) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(status, body.to_string()))
}

/// Login payload for user 1 (ana@example.com) with the given role names.
pub(crate) fn auth_body(access: &str, refresh: &str, roles: &[&str]) -> serde_json::Value {
    let roles: Vec<_> = roles
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"id": i + 1, "name": name, "guard_name": "api"}))
        .collect();
    json!({
        "message": "Login successful",
        "data": {
            "user": {"id": 1, "name": "Ana", "email": "ana@example.com", "status": "active", "roles": roles},
            "access_token": access,
            "token_type": "Bearer",
            "expires_at": "2030-01-01T00:00:00.000000Z",
            "refresh_token": refresh,
            "refresh_expires_at": "2030-02-01T00:00:00.000000Z"
        }
    })
}
