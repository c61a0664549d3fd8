#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use nirognet::{
    app::build_app,
    config::{AppConfig, JwtConfig},
    state::AppState,
    users::{NewUser, RepoError, User, UserPatch, UserRepo},
};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

/// In-memory store with the same uniqueness and atomicity guarantees as
/// the Postgres one: every operation runs under a single lock.
#[derive(Default)]
pub struct MemoryUserRepo {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl MemoryUserRepo {
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.inner.lock().unwrap().rows.get(&id).cloned()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.rows.values().any(|u| u.email == new_user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        inner.next_id += 1;
        let user = new_user.into_user(inner.next_id);
        inner.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(user);
        Ok(Some(user.clone()))
    }

    async fn replace_password_hash(
        &self,
        id: i64,
        expected: &str,
        new_hash: &str,
    ) -> Result<bool, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.rows.get_mut(&id) {
            Some(user) if user.password_hash == expected => {
                user.password_hash = new_hash.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        max_connections: 1,
        jwt: JwtConfig {
            secret: SECRET.into(),
            ttl_days: 30,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repo: Arc<MemoryUserRepo>,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryUserRepo::default());
        let state = AppState::from_parts(repo.clone(), &test_config());
        Self {
            router: build_app(state.clone()),
            state,
            repo,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn register(&self, email: &str, password: &str) -> StatusCode {
        self.call(
            Method::POST,
            "/api/register",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
        .0
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in, returning the access token.
    pub async fn signed_in(&self, email: &str, password: &str) -> String {
        assert_eq!(self.register(email, password).await, StatusCode::CREATED);
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }
}
