#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use uuid::Uuid;

use tokengate::modules::auth::TokenService;
use tokengate::modules::auth::tokens::TokenLifetimes;
use tokengate::modules::users::{DirectoryUser, InMemoryDirectory};
use tokengate::router::init_router;
use tokengate::state::AppState;
use tokengate_auth::{Algorithm, TokenCodec};
use tokengate_cache::MemorySessionStore;
use tokengate_config::ServerConfig;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const TEST_EMAIL: &str = "ada@example.com";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: MemorySessionStore,
    pub user: DirectoryUser,
}

pub fn test_user() -> DirectoryUser {
    DirectoryUser {
        id: Uuid::new_v4(),
        email: TEST_EMAIL.to_string(),
        name: "Ada Lovelace".to_string(),
        password_hash: bcrypt::hash(TEST_PASSWORD, 4).unwrap(),
    }
}

pub fn hmac_codec() -> TokenCodec {
    TokenCodec::hmac(Algorithm::HS256, TEST_SECRET, Duration::from_secs(30)).unwrap()
}

pub fn setup_with_codec(codec: TokenCodec) -> TestApp {
    let store = MemorySessionStore::new();
    let user = test_user();
    let directory = InMemoryDirectory::new([user.clone()]).unwrap();

    let tokens = TokenService::new(
        Arc::new(codec),
        Arc::new(store.clone()),
        "test",
        TokenLifetimes::default(),
    );
    let state = AppState::new(tokens, Arc::new(directory), ServerConfig::default());

    TestApp {
        router: init_router(state.clone()),
        state,
        store,
        user,
    }
}

pub fn setup() -> TestApp {
    setup_with_codec(hmac_codec())
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn login_body() -> Value {
    json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD })
}

/// Sign arbitrary claims with the shared test secret.
pub fn sign_hs256(claims: &Value, secret: &[u8]) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret),
    )
    .unwrap()
}

/// Let detached tasks such as session prolongation run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
