//! Auth gateway client — typed access to the external auth/data service.
//!
//! ARCHITECTURE
//! ============
//! [`AuthApi`] is the provider-neutral trait the rest of the server is
//! written against; [`RestAuthApi`] implements it over the service's REST
//! surface (token grants and user verification under `/auth/v1`, row CRUD
//! with equality filters under `/rest/v1`). Handlers receive the trait
//! object so tests can substitute a fake service.
//!
//! ERROR HANDLING
//! ==============
//! The service reports failures in several body shapes. Everything is
//! normalized into one [`ServiceError`] carrying the machine-readable code
//! (when the service sent one), the message, and the HTTP status, before it
//! crosses into application logic.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use serde::Deserialize;
use serde_json::Value;

use session::{AuthSession, AuthUser};

use crate::config::Config;

/// Service code for "no rows found" on a single-row read.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Service code for "relation does not exist".
pub const MISSING_TABLE_CODE: &str = "42P01";

// =============================================================================
// ERROR NORMALIZATION
// =============================================================================

/// Normalized failure from the external service.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Machine-readable code, when the service sent one.
    pub code: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// HTTP status of the failing call, absent for transport failures.
    pub status: Option<u16>,
}

impl ServiceError {
    /// The call was rejected for lack of a valid credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }

    /// The presented grant (credentials or refresh token) was rejected.
    #[must_use]
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self.status, Some(400 | 401 | 403 | 422))
    }

    /// The queried relation does not exist in the schema.
    #[must_use]
    pub fn is_missing_table(&self) -> bool {
        self.code.as_deref() == Some(MISSING_TABLE_CODE)
    }

    fn transport(error: &reqwest::Error) -> Self {
        Self {
            code: None,
            message: format!("service request failed: {error}"),
            status: error.status().map(|s| s.as_u16()),
        }
    }
}

/// Normalize a non-success response body into a [`ServiceError`].
///
/// Accepts the shapes the service actually produces: `{code, message}`
/// (row API), `{error, error_description}` (token grants), and `{msg}`
/// (auth API), falling back to the raw body.
pub(crate) fn error_from_body(status: u16, body: &str) -> ServiceError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| -> Option<String> {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    let code = field("code").or_else(|| field("error_code")).or_else(|| field("error"));
    let message = field("message")
        .or_else(|| field("error_description"))
        .or_else(|| field("msg"))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("service returned status {status}")
            } else {
                body.trim().to_owned()
            }
        });

    ServiceError { code, message, status: Some(status) }
}

// =============================================================================
// WIRE SHAPES
// =============================================================================

/// A successful token grant: the session plus the user it belongs to.
#[derive(Clone, Debug)]
pub struct TokenGrant {
    pub session: AuthSession,
    pub user: Option<AuthUser>,
}

/// Outcome of a sign-up: always a user, and a session only when the
/// service signs the account in immediately (no email confirmation step).
#[derive(Clone, Debug)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

#[derive(Debug, Deserialize)]
struct GrantResponse {
    access_token: String,
    refresh_token: String,
    user: Option<AuthUser>,
}

/// Normalize the sign-up response, which is grant-shaped when the account
/// is usable immediately and user-shaped while confirmation is pending.
pub(crate) fn parse_sign_up(body: &Value) -> SignUpOutcome {
    if let Ok(grant) = GrantResponse::deserialize(body) {
        return SignUpOutcome {
            user: grant.user,
            session: Some(AuthSession {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
            }),
        };
    }
    let user = body
        .get("user")
        .cloned()
        .or_else(|| Some(body.clone()))
        .and_then(|v| AuthUser::deserialize(v).ok());
    SignUpOutcome { user, session: None }
}

/// The row API returns representations as arrays; a single-row insert is
/// the first element.
pub(crate) fn single_row(body: Value) -> Option<Value> {
    match body {
        Value::Array(mut rows) if !rows.is_empty() => Some(rows.remove(0)),
        Value::Array(_) => None,
        other => Some(other),
    }
}

// =============================================================================
// AUTH API TRAIT
// =============================================================================

/// Provider-neutral async interface to the auth/data service. Enables
/// substituting a fake service in tests.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Verify an access token with the service and resolve its user. Always
    /// a round-trip; a forged or stale token cannot pass.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ServiceError>;

    /// Exchange email + password for a session.
    async fn password_sign_in(&self, email: &str, password: &str)
    -> Result<TokenGrant, ServiceError>;

    /// Register a new account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ServiceError>;

    /// Revoke the session behind the access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError>;

    /// Exchange a refresh token for a rotated session.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ServiceError>;

    /// Select rows from a table matching all equality filters.
    async fn select_rows(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<Value>, ServiceError>;

    /// Insert one row and return its stored representation.
    async fn insert_row(
        &self,
        access_token: &str,
        table: &str,
        row: &Value,
    ) -> Result<Value, ServiceError>;

    /// Patch rows matching all equality filters; returns the updated
    /// representations (empty when nothing matched).
    async fn update_rows(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(String, String)],
        patch: &Value,
    ) -> Result<Vec<Value>, ServiceError>;

    /// Delete rows matching all equality filters.
    async fn delete_rows(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<(), ServiceError>;
}

// =============================================================================
// REST IMPLEMENTATION
// =============================================================================

/// [`AuthApi`] over the service's REST surface.
pub struct RestAuthApi {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestAuthApi {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.service_url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, url: String, bearer: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body))
    }

    fn eq_filters(filters: &[(String, String)]) -> Vec<(String, String)> {
        filters.iter().map(|(col, v)| (col.clone(), format!("eq.{v}"))).collect()
    }
}

#[async_trait::async_trait]
impl AuthApi for RestAuthApi {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ServiceError> {
        let response = self
            .request(reqwest::Method::GET, self.auth_url("user"), access_token)
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Self::check(response)
            .await?
            .json::<AuthUser>()
            .await
            .map_err(|e| ServiceError::transport(&e))
    }

    async fn password_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, ServiceError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("token"), &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        let grant: GrantResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Ok(TokenGrant {
            session: AuthSession {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
            },
            user: grant.user,
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ServiceError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("signup"), &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        let body: Value = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Ok(parse_sign_up(&body))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("logout"), access_token)
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Self::check(response).await.map(|_| ())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ServiceError> {
        tracing::debug!("exchanging refresh token for a rotated session");
        let response = self
            .request(reqwest::Method::POST, self.auth_url("token"), &self.anon_key)
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        let grant: GrantResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Ok(AuthSession { access_token: grant.access_token, refresh_token: grant.refresh_token })
    }

    async fn select_rows(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<Value>, ServiceError> {
        let mut query = Self::eq_filters(filters);
        query.push(("select".to_owned(), "*".to_owned()));
        let response = self
            .request(reqwest::Method::GET, self.rest_url(table), access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Self::check(response)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ServiceError::transport(&e))
    }

    async fn insert_row(
        &self,
        access_token: &str,
        table: &str,
        row: &Value,
    ) -> Result<Value, ServiceError> {
        let response = self
            .request(reqwest::Method::POST, self.rest_url(table), access_token)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        let body: Value = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        single_row(body).ok_or(ServiceError {
            code: None,
            message: "insert returned no representation".to_owned(),
            status: None,
        })
    }

    async fn update_rows(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(String, String)],
        patch: &Value,
    ) -> Result<Vec<Value>, ServiceError> {
        let response = self
            .request(reqwest::Method::PATCH, self.rest_url(table), access_token)
            .header("Prefer", "return=representation")
            .query(&Self::eq_filters(filters))
            .json(patch)
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Self::check(response)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ServiceError::transport(&e))
    }

    async fn delete_rows(
        &self,
        access_token: &str,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<(), ServiceError> {
        let response = self
            .request(reqwest::Method::DELETE, self.rest_url(table), access_token)
            .query(&Self::eq_filters(filters))
            .send()
            .await
            .map_err(|e| ServiceError::transport(&e))?;
        Self::check(response).await.map(|_| ())
    }
}
