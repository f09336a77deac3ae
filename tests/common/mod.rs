#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use accounts_api::config::SecurityConfig;
use accounts_api::database::{MemoryUserStore, NewUser, StoreError, User, UserStore};
use accounts_api::{app, AppState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const DEFAULT_PASSWORD: &str = "password123";

/// Wraps the memory store and counts every call that reaches it
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryUserStore,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.hit();
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.hit();
        self.inner.find_user_by_id(id).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.hit();
        self.inner.create_user(new_user).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.hit();
        self.inner.list_users().await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

pub struct TestServer {
    pub base_url: String,
    pub store: CountingStore,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the production router on an ephemeral port with a fresh store
    pub async fn spawn() -> Result<Self> {
        let store = CountingStore::default();
        let security = SecurityConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_secret_is_default: false,
            jwt_expiry_hours: 24,
            default_user_password: DEFAULT_PASSWORD.to_string(),
        };
        let app = app(AppState::new(&security, Arc::new(store.clone())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind ephemeral port")?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            store,
            client: reqwest::Client::new(),
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /users and return the created user
    pub async fn register(&self, email: &str, name: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/users"))
            .json(&json!({ "email": email, "name": name }))
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == reqwest::StatusCode::CREATED,
            "register failed: {}",
            res.status()
        );
        Ok(res.json().await?)
    }

    /// POST /login with the default password and return the token
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": DEFAULT_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == reqwest::StatusCode::OK,
            "login failed: {}",
            res.status()
        );
        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response had no token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
