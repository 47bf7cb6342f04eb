//! Shared harness for router tests.
//!
//! Every test app owns an in-memory SQLite database with the real migrations
//! applied and two accounts: `admin` (administrator) and `clerk` (staff).

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use invoicely_api::{AppState, create_router};
use invoicely_core::auth::hash_password;
use invoicely_db::migration::{Migrator, MigratorTrait};
use invoicely_db::{CreateUserInput, UserRepository};
use invoicely_shared::config::InvoiceConfig;
use invoicely_shared::{JwtConfig, JwtService};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "admin123";
pub const CLERK_PASSWORD: &str = "clerk123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admin_id: Uuid,
    pub clerk_id: Uuid,
}

pub async fn spawn() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let users = UserRepository::new(db.clone());
    let admin = users
        .create(account("admin", ADMIN_PASSWORD, true))
        .await
        .expect("Failed to create admin");
    let clerk = users
        .create(account("clerk", CLERK_PASSWORD, false))
        .await
        .expect("Failed to create clerk");

    let jwt = JwtService::new(JwtConfig {
        secret: "router-test-secret".to_string(),
        ..JwtConfig::default()
    });
    let state = AppState::new(db, jwt, InvoiceConfig::default());

    TestApp {
        router: create_router(state.clone()),
        state,
        admin_id: admin.id,
        clerk_id: clerk.id,
    }
}

fn account(username: &str, password: &str, is_admin: bool) -> CreateUserInput {
    CreateUserInput {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash_password(password).expect("Failed to hash password"),
        first_name: None,
        last_name: None,
        phone: None,
        is_admin,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Logs in and returns the full login response.
    pub async fn login_response(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Logs in and returns the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self.login_response(username, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_PASSWORD).await
    }

    pub async fn clerk_token(&self) -> String {
        self.login("clerk", CLERK_PASSWORD).await
    }
}

/// Reads a decimal serialized as a JSON string.
pub fn money(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected a decimal string, got {value}"))
        .parse()
        .unwrap()
}
