use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use serde_json::Value;

use crate::revalidation::auth::{AuthError, Principal, SessionAuthenticator, StaticTokenAuthenticator};
use crate::revalidation::invalidator::{CacheError, CacheInvalidator, PathScope};
use crate::revalidation::request::BodyPolicy;
use crate::revalidation::service::RevalidationService;

pub(super) const OPERATOR_TOKEN: &str = "ops-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Call {
    Tag(String),
    Path(String, PathScope),
}

#[derive(Default)]
pub(super) struct RecordingCache {
    calls: Mutex<Vec<Call>>,
}

impl RecordingCache {
    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("cache mutex poisoned").clone()
    }
}

impl CacheInvalidator for RecordingCache {
    fn invalidate_tag(&self, tag: &str) -> Result<(), CacheError> {
        self.calls
            .lock()
            .expect("cache mutex poisoned")
            .push(Call::Tag(tag.to_string()));
        Ok(())
    }

    fn invalidate_path(&self, path: &str, scope: PathScope) -> Result<(), CacheError> {
        self.calls
            .lock()
            .expect("cache mutex poisoned")
            .push(Call::Path(path.to_string(), scope));
        Ok(())
    }
}

pub(super) struct FailingCache;

impl CacheInvalidator for FailingCache {
    fn invalidate_tag(&self, _tag: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("tag store offline".to_string()))
    }

    fn invalidate_path(&self, _path: &str, _scope: PathScope) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("path store offline".to_string()))
    }
}

pub(super) struct UnavailableAuth;

impl SessionAuthenticator for UnavailableAuth {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, AuthError> {
        Err(AuthError::Unavailable("session store timed out".to_string()))
    }
}

pub(super) fn authenticator() -> StaticTokenAuthenticator {
    StaticTokenAuthenticator::new([OPERATOR_TOKEN], "payload-token")
}

pub(super) fn build_service(
    policy: BodyPolicy,
) -> (
    RevalidationService<StaticTokenAuthenticator, RecordingCache>,
    Arc<RecordingCache>,
) {
    let cache = Arc::new(RecordingCache::default());
    let service = RevalidationService::new(Arc::new(authenticator()), cache.clone(), policy);
    (service, cache)
}

pub(super) fn authorized_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {OPERATOR_TOKEN}")).expect("valid header"),
    );
    headers
}

pub(super) fn default_calls() -> Vec<Call> {
    vec![
        Call::Tag("global_header".to_string()),
        Call::Tag("global_footer".to_string()),
        Call::Path("/".to_string(), PathScope::Layout),
    ]
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
