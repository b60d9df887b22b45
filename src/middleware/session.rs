//! Cookie-backed session context, extracted per request and committed explicitly.
//!
//! Handlers receive a [`Session`], change it (`login`, `logout`, flashes) and
//! hand it back through [`Session::respond`], which persists the record and
//! sets or clears the `wallet_session` cookie on the response.

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Cookie, HeaderMapExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::AuthAppService;
use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::models::{Flash, SessionData};

pub const SESSION_COOKIE_NAME: &str = "wallet_session";

/// Cookie and storage settings for sessions.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub secret_key: String,
    pub ttl_seconds: u64,
    pub cookie_secure: bool,
}

impl SessionSettings {
    fn cookie(&self, token: &str) -> AppResult<HeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl_seconds
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("session cookie: {}", e)))
    }

    fn clear_cookie(&self) -> AppResult<HeaderValue> {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("session cookie: {}", e)))
    }
}

/// Per-request session context.
#[derive(Debug, Default)]
pub struct Session {
    /// Token of the loaded record; `None` for anonymous requests without one.
    token: Option<String>,
    data: SessionData,
    dirty: bool,
    /// Tokens whose records must be removed on commit.
    stale: Vec<String>,
    clear_cookie: bool,
}

impl Session {
    /// Resolve the session for a request's cookie token, if any.
    pub async fn load(state: &AppState, token: Option<&str>) -> AppResult<Self> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Self::default());
        };
        let key = AuthAppService::session_store_key(&state.session_settings.secret_key, token)?;
        match state.sessions().load(&key).await {
            Ok(Some(data)) => Ok(Self {
                token: Some(token.to_string()),
                data,
                ..Self::default()
            }),
            Ok(None) => {
                debug!("unknown or expired session cookie");
                Ok(Self::default())
            }
            // An undecodable record is treated as no session at all.
            Err(AppError::Serialization(e)) => {
                warn!(error = %e, "discarding unreadable session record");
                state.sessions().delete(&key).await?;
                Ok(Self {
                    clear_cookie: true,
                    ..Self::default()
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.data.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.user_id.is_some()
    }

    /// The authenticated user, or [`AppError::LoginRequired`].
    pub fn require_user(&self) -> AppResult<Uuid> {
        self.data.user_id.ok_or(AppError::LoginRequired)
    }

    /// Mark the session authenticated as `user_id`. The token is rotated so a
    /// pre-login token never carries an authenticated session.
    pub fn login(&mut self, user_id: Uuid) {
        if let Some(old) = self.token.take() {
            self.stale.push(old);
        }
        self.data.user_id = Some(user_id);
        self.dirty = true;
    }

    /// Drop everything: the stored record, the data, and the cookie.
    pub fn logout(&mut self) {
        if let Some(old) = self.token.take() {
            self.stale.push(old);
        }
        self.data = SessionData::default();
        self.dirty = false;
        self.clear_cookie = true;
    }

    pub fn push_flash(&mut self, flash: Flash) {
        self.data.flashes.push(flash);
        self.dirty = true;
    }

    /// Drain queued flashes; they are shown once.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        self.dirty = true;
        std::mem::take(&mut self.data.flashes)
    }

    /// Persist changes and return the `Set-Cookie` value to send, if any.
    pub async fn commit(self, state: &AppState) -> AppResult<Option<HeaderValue>> {
        let settings = &state.session_settings;
        for token in &self.stale {
            let key = AuthAppService::session_store_key(&settings.secret_key, token)?;
            state.sessions().delete(&key).await?;
        }

        if !self.dirty {
            return if self.clear_cookie {
                Ok(Some(settings.clear_cookie()?))
            } else {
                Ok(None)
            };
        }

        if self.data.is_empty() {
            return match self.token {
                Some(token) => {
                    let key = AuthAppService::session_store_key(&settings.secret_key, &token)?;
                    state.sessions().delete(&key).await?;
                    Ok(Some(settings.clear_cookie()?))
                }
                None if self.clear_cookie => Ok(Some(settings.clear_cookie()?)),
                None => Ok(None),
            };
        }

        let token = self
            .token
            .unwrap_or_else(AuthAppService::generate_session_token);
        let key = AuthAppService::session_store_key(&settings.secret_key, &token)?;
        state
            .sessions()
            .save(&key, &self.data, settings.ttl_seconds)
            .await?;
        Ok(Some(settings.cookie(&token)?))
    }

    /// Commit and attach the cookie to `response`.
    pub async fn respond(self, state: &AppState, response: impl IntoResponse) -> AppResult<Response> {
        let cookie = self.commit(state).await?;
        let mut response = response.into_response();
        if let Some(cookie) = cookie {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Ok(response)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = parts.headers.typed_get::<Cookie>();
        let token = cookies.as_ref().and_then(|c| c.get(SESSION_COOKIE_NAME));
        Session::load(state, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemorySessionStore, InMemoryUserRepository, SessionStore};
    use std::sync::Arc;

    fn state_with(store: InMemorySessionStore) -> AppState {
        AppState {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(store),
            session_settings: SessionSettings {
                secret_key: "test-secret".to_string(),
                ttl_seconds: 60,
                cookie_secure: false,
            },
        }
    }

    fn token_from(cookie: &HeaderValue) -> String {
        let raw = cookie.to_str().unwrap();
        let first = raw.split(';').next().unwrap();
        first
            .strip_prefix(&format!("{SESSION_COOKIE_NAME}="))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn untouched_anonymous_session_sets_no_cookie() {
        let store = InMemorySessionStore::new();
        let state = state_with(store.clone());
        let session = Session::load(&state, None).await.unwrap();
        assert!(!session.is_authenticated());
        assert!(session.commit(&state).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn login_persists_and_reloads() {
        let store = InMemorySessionStore::new();
        let state = state_with(store.clone());
        let user_id = Uuid::new_v4();

        let mut session = Session::load(&state, None).await.unwrap();
        session.login(user_id);
        let cookie = session.commit(&state).await.unwrap().unwrap();
        assert!(cookie.to_str().unwrap().contains("HttpOnly"));

        let token = token_from(&cookie);
        let reloaded = Session::load(&state, Some(&token)).await.unwrap();
        assert_eq!(reloaded.user_id(), Some(user_id));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn login_rotates_existing_token() {
        let store = InMemorySessionStore::new();
        let state = state_with(store.clone());

        let mut session = Session::default();
        session.push_flash(Flash::success("welcome"));
        let first = token_from(&session.commit(&state).await.unwrap().unwrap());

        let mut session = Session::load(&state, Some(&first)).await.unwrap();
        session.login(Uuid::new_v4());
        let second = token_from(&session.commit(&state).await.unwrap().unwrap());

        assert_ne!(first, second);
        assert!(!Session::load(&state, Some(&first)).await.unwrap().is_authenticated());
        assert!(Session::load(&state, Some(&second)).await.unwrap().is_authenticated());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn logout_deletes_record_and_clears_cookie() {
        let store = InMemorySessionStore::new();
        let state = state_with(store.clone());

        let mut session = Session::default();
        session.login(Uuid::new_v4());
        let token = token_from(&session.commit(&state).await.unwrap().unwrap());

        let mut session = Session::load(&state, Some(&token)).await.unwrap();
        session.logout();
        let cookie = session.commit(&state).await.unwrap().unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
        assert!(store.is_empty().await);

        let mut again = Session::load(&state, Some(&token)).await.unwrap();
        assert!(!again.is_authenticated());
        again.logout();
        assert!(again.commit(&state).await.is_ok());
    }

    #[tokio::test]
    async fn consumed_flashes_drop_empty_record() {
        let store = InMemorySessionStore::new();
        let state = state_with(store.clone());

        let mut session = Session::default();
        session.push_flash(Flash::error("nope"));
        let token = token_from(&session.commit(&state).await.unwrap().unwrap());

        let mut session = Session::load(&state, Some(&token)).await.unwrap();
        assert_eq!(session.take_flashes(), vec![Flash::error("nope")]);
        assert!(session.take_flashes().is_empty());
        session.commit(&state).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn raw_token_is_not_the_store_key() {
        let store = InMemorySessionStore::new();
        let state = state_with(store.clone());
        let mut session = Session::default();
        session.login(Uuid::new_v4());
        let token = token_from(&session.commit(&state).await.unwrap().unwrap());
        assert!(store.load(&token).await.unwrap().is_none());
    }

    /// Store whose records never decode, tracking deletes.
    #[derive(Default)]
    struct CorruptStore {
        deleted: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl SessionStore for CorruptStore {
        async fn load(&self, _key: &str) -> AppResult<Option<SessionData>> {
            let err = serde_json::from_str::<SessionData>("{not json").unwrap_err();
            Err(AppError::Serialization(err))
        }

        async fn save(&self, _key: &str, _data: &SessionData, _ttl: u64) -> AppResult<()> {
            Ok(())
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn unreadable_record_is_dropped_and_logout_still_works() {
        let store = Arc::new(CorruptStore::default());
        let state = AppState {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: store.clone(),
            session_settings: SessionSettings {
                secret_key: "test-secret".to_string(),
                ttl_seconds: 60,
                cookie_secure: false,
            },
        };

        let mut session = Session::load(&state, Some("garbled")).await.unwrap();
        assert!(!session.is_authenticated());
        let key = AuthAppService::session_store_key("test-secret", "garbled").unwrap();
        assert_eq!(*store.deleted.lock().unwrap(), vec![key]);

        session.logout();
        let cookie = session.commit(&state).await.unwrap().unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn secure_flag_follows_settings() {
        let settings = SessionSettings {
            secret_key: "s".to_string(),
            ttl_seconds: 10,
            cookie_secure: true,
        };
        let cookie = settings.cookie("abc").unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "wallet_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=10; Secure"
        );
    }
}
