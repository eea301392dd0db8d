//! End-to-end tests: the real HTTP transport against an in-process fake
//! service that stores envelopes the way the remote service would.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use sot_client::{key::SecretKey, AesGcmCodec, Client, EnvelopeCodec, Outcome, Settings};

const READ_TOKEN: &str = "read-token";
const WRITE_TOKEN: &str = "write-token";
const KEY: [u8; 32] = [0x24; 32];

#[derive(Clone, Default)]
struct FakeService {
    values: Arc<Mutex<HashMap<String, String>>>,
    attributes: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeService {
    fn record(&self, what: String) {
        self.requests.lock().unwrap().push(what);
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn bearer_is(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {token}"))
}

async fn show(
    State(svc): State<FakeService>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    svc.record(format!(
        "show {key} attribute={}",
        query.get("attribute").map(String::as_str).unwrap_or("-")
    ));
    if !bearer_is(&headers, READ_TOKEN) {
        return error(StatusCode::UNAUTHORIZED, "invalid token");
    }
    if key == "corrupt" {
        return Json(json!({ "value": STANDARD.encode([0u8; 40]) })).into_response();
    }
    match svc.stored(&key) {
        Some(value) => Json(json!({ "value": value })).into_response(),
        None => error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn store(
    State(svc): State<FakeService>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    svc.record("store".into());
    if !bearer_is(&headers, WRITE_TOKEN) {
        return error(StatusCode::UNAUTHORIZED, "invalid token");
    }
    let (Some(key), Some(value)) = (body["key"].as_str(), body["value"].as_str()) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "key and value required");
    };
    let mut values = svc.values.lock().unwrap();
    if values.contains_key(key) {
        return error(StatusCode::CONFLICT, "key already exists");
    }
    values.insert(key.to_owned(), value.to_owned());
    Json(json!({})).into_response()
}

async fn update(
    State(svc): State<FakeService>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    svc.record("update".into());
    if !bearer_is(&headers, WRITE_TOKEN) {
        return error(StatusCode::UNAUTHORIZED, "invalid token");
    }
    let Some(key) = body["key"].as_str() else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "key required");
    };
    let mut values = svc.values.lock().unwrap();
    if !values.contains_key(key) {
        // No `error` field: the client falls back to its generic message.
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    }
    if let Some(value) = body["value"].as_str() {
        values.insert(key.to_owned(), value.to_owned());
    } else if let Some(attributes) = body.get("attributes") {
        svc.attributes
            .lock()
            .unwrap()
            .insert(key.to_owned(), attributes.clone());
    }
    Json(json!({})).into_response()
}

async fn destroy(
    State(svc): State<FakeService>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    svc.record("destroy".into());
    if !bearer_is(&headers, WRITE_TOKEN) {
        return error(StatusCode::UNAUTHORIZED, "invalid token");
    }
    let key = body["key"].as_str().unwrap_or_default();
    match svc.values.lock().unwrap().remove(key) {
        Some(_) => Json(json!({})).into_response(),
        None => error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn spawn_service(svc: FakeService) -> String {
    let router = Router::new()
        .route("/api/show/:key", get(show))
        .route("/api/store", post(store))
        .route("/api/update", put(update))
        .route("/api/destroy", delete(destroy))
        .with_state(svc);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/")
}

fn settings(api_url: &str, overrides: &[(&str, Option<&str>)]) -> Settings {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("SOT_API_URL".to_owned(), api_url.to_owned()),
        ("SOT_CRYPT_KEY".to_owned(), STANDARD.encode(KEY)),
        ("SOT_INT_TOKEN".to_owned(), READ_TOKEN.to_owned()),
        ("VESSOT_INT_TOKEN".to_owned(), WRITE_TOKEN.to_owned()),
        ("SOT_HTTP_TIMEOUT_SECS".to_owned(), "5".to_owned()),
    ]);
    for (name, value) in overrides {
        match value {
            Some(v) => vars.insert((*name).to_owned(), (*v).to_owned()),
            None => vars.remove(*name),
        };
    }
    Settings::from_map(vars).unwrap()
}

async fn client(overrides: &[(&str, Option<&str>)]) -> (Client, FakeService) {
    let svc = FakeService::default();
    let url = spawn_service(svc.clone()).await;
    let client = Client::from_settings(settings(&url, overrides)).unwrap();
    (client, svc)
}

fn codec() -> AesGcmCodec {
    AesGcmCodec::new(SecretKey::from_bytes(KEY))
}

#[tokio::test]
async fn store_sends_only_envelopes() {
    let (client, svc) = client(&[]).await;

    let outcome = client.store("foo", "bar").await;
    assert_eq!(outcome, Outcome::ok(200));

    let stored = svc.stored("foo").unwrap();
    assert_ne!(stored, "bar");
    assert_eq!(codec().open(&stored).unwrap(), b"bar");
}

#[tokio::test]
async fn store_then_show_round_trips() {
    let (client, _svc) = client(&[]).await;

    assert!(client.store("foo", "bar").await.success);
    assert_eq!(client.show("foo").await, Outcome::ok_with_value(200, "bar"));
}

#[tokio::test]
async fn show_missing_key_reports_404() {
    let (client, _svc) = client(&[]).await;
    assert_eq!(
        client.show("missing").await,
        Outcome::failure(404, "not found")
    );
}

#[tokio::test]
async fn show_corrupted_value_keeps_status() {
    let (client, _svc) = client(&[]).await;
    let outcome = client.show("corrupt").await;
    assert_eq!(outcome.status_code, 200);
    assert!(!outcome.success);
    assert_eq!(
        outcome.error,
        "Decryption failed: decryption failed or data was tampered with"
    );
}

#[tokio::test]
async fn show_sends_attribute_selector() {
    let (client, svc) = client(&[]).await;
    assert!(client.store("foo", "bar").await.success);

    let outcome = client.show_attribute("foo", "owner & team").await;
    assert!(outcome.success);
    assert!(svc
        .requests
        .lock()
        .unwrap()
        .contains(&"show foo attribute=owner & team".to_owned()));
}

#[tokio::test]
async fn keys_with_reserved_characters_survive_the_path() {
    let (client, svc) = client(&[]).await;
    let key = "team/db password?x=1";

    assert!(client.store(key, "s3cret").await.success);
    assert!(svc.stored(key).is_some());
    assert_eq!(client.show(key).await.value, "s3cret");
}

#[tokio::test]
async fn dot_keys_never_reach_another_route() {
    let (client, svc) = client(&[]).await;

    for key in [".", ".."] {
        let outcome = client.show(key).await;
        assert_eq!(outcome.status_code, 0, "key: {key}");
        assert!(!outcome.success);
    }
    assert_eq!(svc.request_count(), 0);

    assert!(client.store("...", "dots").await.success);
    assert_eq!(client.show("...").await.value, "dots");
}

#[tokio::test]
async fn update_replaces_value() {
    let (client, _svc) = client(&[]).await;
    assert!(client.store("foo", "bar").await.success);

    assert_eq!(client.update("foo", "baz").await, Outcome::ok(200));
    assert_eq!(client.show("foo").await.value, "baz");
}

#[tokio::test]
async fn update_attributes_are_sent_as_given() {
    let (client, svc) = client(&[]).await;
    assert!(client.store("foo", "bar").await.success);

    let outcome = client
        .update_attributes("foo", json!({"owner": "ops"}))
        .await;
    assert!(outcome.success);
    assert_eq!(
        svc.attributes.lock().unwrap().get("foo"),
        Some(&json!({"owner": "ops"}))
    );
    assert_eq!(client.show("foo").await.value, "bar");
}

#[tokio::test]
async fn update_missing_key_uses_fallback_message() {
    let (client, _svc) = client(&[]).await;
    assert_eq!(
        client.update("nope", "baz").await,
        Outcome::failure(404, "API request failed")
    );
}

#[tokio::test]
async fn destroy_removes_value() {
    let (client, _svc) = client(&[]).await;
    assert!(client.store("foo", "bar").await.success);

    assert_eq!(client.destroy("foo").await, Outcome::ok(200));
    assert_eq!(client.show("foo").await.status_code, 404);
    assert_eq!(client.destroy("foo").await, Outcome::failure(404, "not found"));
}

#[tokio::test]
async fn destroy_with_attributes_succeeds() {
    let (client, _svc) = client(&[]).await;
    assert!(client.store("foo", "bar").await.success);
    let outcome = client
        .destroy_with_attributes("foo", json!({"reason": "rotated"}))
        .await;
    assert!(outcome.success);
}

#[tokio::test]
async fn missing_write_token_never_reaches_the_service() {
    let (client, svc) = client(&[("VESSOT_INT_TOKEN", None)]).await;

    assert_eq!(
        client.store("k", "v").await,
        Outcome::failure(0, "VESSOT_INT_TOKEN environment variable not set")
    );
    assert_eq!(client.destroy("k").await.status_code, 0);
    assert_eq!(svc.request_count(), 0);
}

#[tokio::test]
async fn wrong_key_length_never_reaches_the_service() {
    let short = STANDARD.encode([1u8; 31]);
    let (client, svc) = client(&[("SOT_CRYPT_KEY", Some(short.as_str()))]).await;

    let outcome = client.store("k", "v").await;
    assert_eq!(outcome.status_code, 0);
    assert!(!outcome.success);
    assert!(outcome.error.contains("SOT_CRYPT_KEY"));
    assert_eq!(svc.request_count(), 0);
}

#[tokio::test]
async fn read_and_write_tokens_are_not_interchangeable() {
    let (client, _svc) = client(&[("SOT_INT_TOKEN", Some(WRITE_TOKEN))]).await;
    assert!(client.store("foo", "bar").await.success);
    assert_eq!(
        client.show("foo").await,
        Outcome::failure(401, "invalid token")
    );
}

#[tokio::test]
async fn unreachable_service_is_status_zero() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::from_settings(settings(&format!("http://{addr}/api"), &[])).unwrap();
    let outcome = client.show("foo").await;
    assert_eq!(outcome.status_code, 0);
    assert!(!outcome.success);
    assert!(!outcome.error.is_empty());
}

#[tokio::test]
async fn concurrent_stores_use_distinct_nonces() {
    let (client, svc) = client(&[]).await;
    let client = Arc::new(client);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.store(&format!("k{i}"), "same").await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().success);
    }

    let envelopes: std::collections::HashSet<String> =
        (0..8).filter_map(|i| svc.stored(&format!("k{i}"))).collect();
    assert_eq!(envelopes.len(), 8);
    for env in &envelopes {
        assert_eq!(codec().open(env).unwrap(), b"same");
    }
}
