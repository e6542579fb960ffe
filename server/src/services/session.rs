//! Session synchronization core.
//!
//! ARCHITECTURE
//! ============
//! Everything here is written against the [`CookieStore`] capability and the
//! [`AuthApi`] trait, so the same flow serves the gate context and the
//! per-request handler context. Verification always round-trips to the
//! service; the cookie is never trusted as proof of identity, only as the
//! carrier of tokens to be verified.
//!
//! The refresh path is where the contexts are kept agreeable: when the
//! access token has expired but the refresh token is still good, the rotated
//! session is written back through the adapter immediately, so the mutation
//! rides out on whatever response the current context produces.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use session::{
    AuthSession, AuthUser, CookieOptions, CookieStore, SESSION_COOKIE, decode_session,
    encode_session,
};

use super::gateway::{AuthApi, ServiceError};

/// A verified user together with the session that proved it — the session
/// is the post-refresh one when a rotation happened mid-verification.
#[derive(Clone, Debug)]
pub struct Verified {
    pub user: AuthUser,
    pub session: AuthSession,
}

/// Read the stored session from the cookie, if present and decodable.
pub fn stored_session(cookies: &dyn CookieStore) -> Option<AuthSession> {
    let raw = cookies.get(SESSION_COOKIE)?;
    decode_session(&raw).ok()
}

/// Write a session through the adapter with the standard attributes.
pub fn establish(cookies: &dyn CookieStore, session: &AuthSession) {
    cookies.set(SESSION_COOKIE, &encode_session(session), &CookieOptions::session());
}

/// Remove the session cookie (uniform empty-value, max-age-zero convention).
pub fn clear(cookies: &dyn CookieStore) {
    cookies.remove(SESSION_COOKIE);
}

/// Resolve the current user, refreshing the session when needed.
///
/// Absence is not an error: a missing cookie, an undecodable cookie (which
/// is also removed), or a dead refresh token all resolve to `Ok(None)`.
/// Only a service failure that leaves the answer unknown is an `Err`.
///
/// # Errors
///
/// Returns the normalized [`ServiceError`] when verification could not be
/// completed for reasons other than an invalid session.
pub async fn verified_user(
    api: &dyn AuthApi,
    cookies: &dyn CookieStore,
) -> Result<Option<Verified>, ServiceError> {
    let Some(raw) = cookies.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(session) = decode_session(&raw) else {
        tracing::warn!("undecodable session cookie, clearing");
        clear(cookies);
        return Ok(None);
    };

    match api.get_user(&session.access_token).await {
        Ok(user) => Ok(Some(Verified { user, session })),
        Err(error) if error.is_unauthorized() => refresh_and_retry(api, cookies, &session).await,
        Err(error) => Err(error),
    }
}

/// Resolve just the current user. Most callers need nothing else.
///
/// # Errors
///
/// Same contract as [`verified_user`].
pub async fn current_user(
    api: &dyn AuthApi,
    cookies: &dyn CookieStore,
) -> Result<Option<AuthUser>, ServiceError> {
    Ok(verified_user(api, cookies).await?.map(|v| v.user))
}

async fn refresh_and_retry(
    api: &dyn AuthApi,
    cookies: &dyn CookieStore,
    stale: &AuthSession,
) -> Result<Option<Verified>, ServiceError> {
    tracing::debug!("access token rejected, attempting refresh");
    let renewed = match api.refresh(&stale.refresh_token).await {
        Ok(renewed) => renewed,
        Err(error) if error.is_invalid_grant() => {
            tracing::debug!("refresh token rejected, session is over");
            clear(cookies);
            return Ok(None);
        }
        Err(error) => return Err(error),
    };

    // Write the rotated session back before re-verifying, so the mutation
    // rides the current response even if the retry fails transiently.
    establish(cookies, &renewed);

    match api.get_user(&renewed.access_token).await {
        Ok(user) => Ok(Some(Verified { user, session: renewed })),
        Err(error) if error.is_unauthorized() => {
            clear(cookies);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
