#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use stockroom::application::engine::Storefront;
use stockroom::infrastructure::in_memory::{InMemoryItemStore, InMemoryOrderStore};
use stockroom::infrastructure::jwt::{Claims, JwtConfig, JwtIdentityProvider};
use stockroom::interfaces::http::{AppState, router};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-at-least-32-chars";

pub fn generate_catalog_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["name", "description", "price", "image_url", "stock"])?;

    for i in 1..=rows {
        wtr.write_record([
            format!("Item {i}").as_str(),
            "generated",
            "1.25",
            "item.png",
            &i.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn storefront() -> Storefront {
    Storefront::new(
        Box::new(InMemoryItemStore::new()),
        Box::new(InMemoryOrderStore::new()),
    )
}

pub fn app() -> Router {
    app_with(Arc::new(storefront()))
}

pub fn app_with(shop: Arc<Storefront>) -> Router {
    app_with_timeout(shop, std::time::Duration::from_secs(5))
}

pub fn app_with_timeout(shop: Arc<Storefront>, request_timeout: std::time::Duration) -> Router {
    let config = JwtConfig::new(SECRET).unwrap();
    let state = AppState::new(shop, Arc::new(JwtIdentityProvider::new(&config)));
    router(state, request_timeout)
}

pub fn token(sub: &str, role: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        role: role.to_string(),
        email: Some(format!("{sub}@example.com")),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Sends one request through the router and returns the status and JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
