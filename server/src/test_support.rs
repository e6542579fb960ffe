//! Shared test doubles and fixtures for the auth gateway and routes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use axum::http::{HeaderMap, HeaderValue, header};
use serde_json::Value;

use session::{AuthSession, AuthUser, SESSION_COOKIE, encode_session};

use crate::config::Config;
use crate::services::gateway::{AuthApi, ServiceError, SignUpOutcome, TokenGrant};
use crate::state::AppState;

pub fn test_config() -> Config {
    Config {
        service_url: "https://project.supabase.co".to_owned(),
        anon_key: "anon".to_owned(),
        port: 3000,
        cookie_secure: false,
        client_dist: "client/dist".into(),
    }
}

/// App state over a shared fake, so tests keep a handle for assertions.
pub fn state_over(api: Arc<FakeApi>) -> AppState {
    AppState { api, config: Arc::new(test_config()) }
}

/// Request headers carrying an encoded session cookie.
pub fn headers_with_session(access: &str, refresh: &str) -> HeaderMap {
    let value = encode_session(&session_with(access, refresh));
    let mut headers = HeaderMap::new();
    let raw = format!("{SESSION_COOKIE}={value}");
    headers.insert(header::COOKIE, HeaderValue::from_str(&raw).expect("header"));
    headers
}

/// Collect a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// All `Set-Cookie` header values on a response.
pub fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().expect("utf8").to_owned())
        .collect()
}

pub fn sample_user() -> AuthUser {
    AuthUser {
        id: "u1".to_owned(),
        email: Some("a@b.com".to_owned()),
        email_confirmed_at: Some("2025-01-02T03:04:05Z".to_owned()),
        last_sign_in_at: Some("2025-06-07T08:09:10Z".to_owned()),
    }
}

pub fn session_with(access: &str, refresh: &str) -> AuthSession {
    AuthSession { access_token: access.to_owned(), refresh_token: refresh.to_owned() }
}

pub fn unauthorized() -> ServiceError {
    ServiceError { code: None, message: "invalid token".to_owned(), status: Some(401) }
}

pub fn outage() -> ServiceError {
    ServiceError { code: None, message: "upstream down".to_owned(), status: Some(500) }
}

fn invalid_grant() -> ServiceError {
    ServiceError {
        code: Some("invalid_grant".to_owned()),
        message: "Invalid Refresh Token".to_owned(),
        status: Some(400),
    }
}

/// Configurable fake of the external service. Accepts a fixed set of access
/// tokens, optionally honors one refresh token (rotating to `renewed`), and
/// keeps tables as in-memory rows. Counts calls so tests can assert which
/// paths ran.
pub struct FakeApi {
    pub user: AuthUser,
    pub valid_access: HashSet<String>,
    pub valid_refresh: Option<String>,
    pub renewed: AuthSession,
    pub get_user_failure: Option<ServiceError>,
    pub sign_in: Option<TokenGrant>,
    pub sign_up: Option<SignUpOutcome>,
    pub tables: Mutex<HashMap<String, Vec<Value>>>,
    pub get_user_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub deletes: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeApi {
    #[must_use]
    pub fn accepting(token: &str) -> Self {
        Self {
            user: sample_user(),
            valid_access: HashSet::from([token.to_owned()]),
            valid_refresh: None,
            renewed: session_with("renewed-access", "renewed-refresh"),
            get_user_failure: None,
            sign_in: None,
            sign_up: None,
            tables: Mutex::new(HashMap::new()),
            get_user_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            deletes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn rejecting() -> Self {
        let mut api = Self::accepting("__none__");
        api.valid_access.clear();
        api
    }

    #[must_use]
    pub fn failing(error: ServiceError) -> Self {
        let mut api = Self::rejecting();
        api.get_user_failure = Some(error);
        api
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: &str) -> Self {
        self.valid_refresh = Some(refresh.to_owned());
        // The renewed access token verifies once the rotation happened.
        self.valid_access.insert(self.renewed.access_token.clone());
        self
    }

    #[must_use]
    pub fn with_sign_in(mut self, grant: TokenGrant) -> Self {
        self.valid_access.insert(grant.session.access_token.clone());
        self.sign_in = Some(grant);
        self
    }

    #[must_use]
    pub fn with_sign_up(mut self, outcome: SignUpOutcome) -> Self {
        self.sign_up = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_table(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.lock().unwrap().insert(table.to_owned(), rows);
        self
    }

    pub fn get_user_count(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

fn row_matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, expected)| match row.get(column) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

#[async_trait::async_trait]
impl AuthApi for FakeApi {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ServiceError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.get_user_failure {
            return Err(error.clone());
        }
        if self.valid_access.contains(access_token) {
            Ok(self.user.clone())
        } else {
            Err(unauthorized())
        }
    }

    async fn password_sign_in(&self, _: &str, _: &str) -> Result<TokenGrant, ServiceError> {
        self.sign_in.clone().ok_or_else(|| ServiceError {
            code: Some("invalid_grant".to_owned()),
            message: "Invalid login credentials".to_owned(),
            status: Some(400),
        })
    }

    async fn sign_up(&self, _: &str, _: &str) -> Result<SignUpOutcome, ServiceError> {
        self.sign_up.clone().ok_or_else(|| ServiceError {
            code: None,
            message: "User already registered".to_owned(),
            status: Some(422),
        })
    }

    async fn sign_out(&self, _: &str) -> Result<(), ServiceError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ServiceError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match &self.valid_refresh {
            Some(valid) if valid == refresh_token => Ok(self.renewed.clone()),
            _ => Err(invalid_grant()),
        }
    }

    async fn select_rows(
        &self,
        _: &str,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<Value>, ServiceError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| row_matches(r, filters)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_row(&self, _: &str, table: &str, row: &Value) -> Result<Value, ServiceError> {
        let mut stored = row.clone();
        if let Some(object) = stored.as_object_mut() {
            object.insert("id".to_owned(), Value::from(1));
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_owned())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_rows(
        &self,
        _: &str,
        table: &str,
        filters: &[(String, String)],
        patch: &Value,
    ) -> Result<Vec<Value>, ServiceError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| row_matches(r, filters)) {
                if let (Some(object), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
                    for (key, value) in changes {
                        object.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete_rows(
        &self,
        _: &str,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<(), ServiceError> {
        self.deletes.lock().unwrap().push((table.to_owned(), filters.to_vec()));
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !row_matches(r, filters));
        }
        Ok(())
    }
}
