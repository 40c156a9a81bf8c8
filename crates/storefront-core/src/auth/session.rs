//! Authenticated API session.
//!
//! `SessionManager` owns the access/refresh token pair and is the only
//! component that mutates it. Every authenticated call goes through
//! [`SessionManager::execute`], which attaches the bearer credential and, on a
//! 401, refreshes the access token once and replays the call.
//!
//! Concurrent 401s share a single refresh exchange: the first caller becomes
//! the leader and performs the exchange, later callers queue a oneshot
//! receiver and are released in arrival order once the leader settles.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{
    server_message, ApiError, ApiRequest, Transport, TransportError, TransportResponse,
};
use crate::models::{decode_data, ChangePasswordRequest, ProfileUpdate, RegisterRequest, User};

use super::credentials::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use super::roles::Role;
use super::tokens::{AccessToken, RefreshToken};

// ============================================================================
// Endpoints
// ============================================================================

pub const CUSTOMER_LOGIN_PATH: &str = "/auth/customer/login";
pub const ADMIN_LOGIN_PATH: &str = "/auth/admin/login";
pub const REGISTER_PATH: &str = "/auth/customer/register";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/customer/logout";
pub const LOGOUT_ALL_PATH: &str = "/auth/logout-all";
pub const PROFILE_PATH: &str = "/auth/customer/profile";
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

const LOGIN_FAILED: &str = "Login failed. Check your credentials.";
const ADMIN_LOGIN_FAILED: &str = "Admin login failed.";
const REGISTRATION_FAILED: &str = "Registration failed.";

// ============================================================================
// Wire types
// ============================================================================

/// Successful login/registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

/// Refresh exchange payload. The server may or may not rotate the refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Wrapped { user: User },
    Bare(User),
}

impl ProfileBody {
    fn into_user(self) -> User {
        match self {
            ProfileBody::Wrapped { user } | ProfileBody::Bare(user) => user,
        }
    }
}

/// Expiry timestamps are informational; an unparseable one is dropped rather
/// than failing the whole login.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

// ============================================================================
// Session state
// ============================================================================

/// Whether anyone is signed in, and as what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unauthenticated,
    Authenticated(Role),
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }
}

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    user: Option<User>,
    role: Role,
    access_expires_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct RefreshGate {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<Option<String>>>,
}

/// Held by the caller performing the refresh exchange. Dropping it without
/// settling (the leader's future was cancelled) reopens the gate and fails
/// the queued callers instead of leaving them parked forever.
struct RefreshLease<'a> {
    manager: &'a SessionManager,
    settled: bool,
}

impl RefreshLease<'_> {
    fn settle(mut self, token: Option<String>) {
        self.settled = true;
        self.manager.release_waiters(token);
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Token refresh abandoned before completing");
            self.manager.abandon_waiters();
        }
    }
}

// ============================================================================
// Session manager
// ============================================================================

pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    state: Mutex<SessionState>,
    gate: Mutex<RefreshGate>,
}

fn storage_error(err: anyhow::Error) -> ApiError {
    ApiError::Storage(format!("{:#}", err))
}

impl SessionManager {
    /// Create an empty (unauthenticated) session over the given transport and store.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            store,
            state: Mutex::new(SessionState::default()),
            gate: Mutex::new(RefreshGate::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn gate(&self) -> MutexGuard<'_, RefreshGate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Accessors =====

    pub fn status(&self) -> AuthStatus {
        let state = self.state();
        if state.access_token.is_some() {
            AuthStatus::Authenticated(state.role)
        } else {
            AuthStatus::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.status() == AuthStatus::Authenticated(Role::Admin)
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user.clone()
    }

    /// Expiry of the current access token, when the server reported one
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        self.state().access_expires_at
    }

    /// True while a refresh exchange is in flight
    pub fn is_refreshing(&self) -> bool {
        self.gate().refreshing
    }

    // ===== Request pipeline =====

    /// Add the bearer credential if an access token is set.
    pub fn attach_credentials(&self, request: &mut ApiRequest) {
        if let Some(ref token) = self.state().access_token {
            request.set_bearer(token.as_str());
        }
    }

    /// Send an authenticated request, recovering once from access-token expiry.
    ///
    /// Returns the response only for 2xx statuses; every other outcome maps
    /// to an [`ApiError`].
    pub async fn execute(&self, mut request: ApiRequest) -> Result<TransportResponse, ApiError> {
        self.attach_credentials(&mut request);
        let outcome = self.transport.send(&request).await;
        self.handle_response(request, outcome).await
    }

    /// Inspect the outcome of a completed call.
    pub async fn handle_response(
        &self,
        request: ApiRequest,
        outcome: Result<TransportResponse, TransportError>,
    ) -> Result<TransportResponse, ApiError> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %request.method, path = %request.path, error = %e, "Server unreachable");
                return Err(e.into());
            }
        };

        if !response.is_unauthorized() {
            return Self::settle(&request, response);
        }

        if request.is_retry() {
            warn!(method = %request.method, path = %request.path, "Request rejected again after refresh");
            return Err(ApiError::Unauthorized);
        }

        debug!(method = %request.method, path = %request.path, "Access token rejected, recovering");
        let token = self.recover_unauthorized(&request).await?;

        let retry = request.into_retry(token);
        let outcome = self.transport.send(&retry).await;
        match outcome {
            Ok(response) if response.is_unauthorized() => {
                warn!(method = %retry.method, path = %retry.path, "Request rejected again after refresh");
                Err(ApiError::Unauthorized)
            }
            Ok(response) => Self::settle(&retry, response),
            Err(e) => Err(e.into()),
        }
    }

    fn settle(request: &ApiRequest, response: TransportResponse) -> Result<TransportResponse, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            let err = ApiError::from_status(response.status, &response.body);
            warn!(method = %request.method, path = %request.path, error = %err, "API error");
            Err(err)
        }
    }

    /// Obtain a fresh access token for a request that just got a 401.
    async fn recover_unauthorized(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let waiter = {
            let mut gate = self.gate();
            if gate.refreshing {
                let (tx, rx) = oneshot::channel();
                gate.waiters.push_back(tx);
                debug!(queued = gate.waiters.len(), "Refresh already in flight, queueing request");
                Some(rx)
            } else {
                if let Some(current) = self.newer_access_token(request) {
                    debug!("Access token changed since the request was sent, replaying");
                    return Ok(current);
                }
                gate.refreshing = true;
                None
            }
        };

        match waiter {
            Some(rx) => match rx.await {
                Ok(Some(token)) => Ok(token),
                Ok(None) => Err(ApiError::SessionExpired),
                Err(_) => Err(ApiError::Unauthorized),
            },
            None => {
                let lease = RefreshLease {
                    manager: self,
                    settled: false,
                };
                let outcome = self.exchange_refresh_token().await;
                lease.settle(outcome.as_ref().ok().cloned());
                outcome
            }
        }
    }

    /// The current access token, if it differs from the one the request carried.
    fn newer_access_token(&self, request: &ApiRequest) -> Option<String> {
        let state = self.state();
        let current = state.access_token.as_ref()?;
        if request.bearer() == Some(current.as_str()) {
            None
        } else {
            Some(current.as_str().to_string())
        }
    }

    fn release_waiters(&self, token: Option<String>) {
        let waiters = {
            let mut gate = self.gate();
            gate.refreshing = false;
            std::mem::take(&mut gate.waiters)
        };
        if !waiters.is_empty() {
            debug!(count = waiters.len(), refreshed = token.is_some(), "Releasing queued requests");
        }
        for waiter in waiters {
            // A receiver that went away was cancelled by its caller
            let _ = waiter.send(token.clone());
        }
    }

    fn abandon_waiters(&self) {
        let mut gate = self.gate();
        gate.refreshing = false;
        gate.waiters.clear();
    }

    /// Trade the refresh token for a new access token.
    ///
    /// Any failure ends the session: both tokens are erased and
    /// `SessionExpired` is returned.
    #[instrument(skip(self))]
    async fn exchange_refresh_token(&self) -> Result<String, ApiError> {
        let refresh_token = self.state().refresh_token.clone();
        let Some(refresh_token) = refresh_token else {
            warn!("No refresh token available, ending session");
            self.end_session();
            return Err(ApiError::SessionExpired);
        };

        info!("Refreshing access token");
        let request = ApiRequest::post(REFRESH_PATH)
            .json_value(serde_json::json!({ "refresh_token": refresh_token.as_str() }));

        let result = match self.transport.send(&request).await {
            Ok(response) if response.is_success() => decode_data::<RefreshResponse>(&response.body),
            Ok(response) => Err(ApiError::from_status(response.status, &response.body)),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(tokens) => {
                let access = tokens.access_token.clone();
                self.store_refreshed(tokens);
                info!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.end_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    fn store_refreshed(&self, tokens: RefreshResponse) {
        if let Err(e) = self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token) {
            error!(error = %format!("{:#}", e), "Failed to persist refreshed access token");
        }
        if let Some(ref refresh) = tokens.refresh_token {
            if let Err(e) = self.store.set(REFRESH_TOKEN_KEY, refresh) {
                error!(error = %format!("{:#}", e), "Failed to persist rotated refresh token");
            }
        }

        let mut state = self.state();
        state.access_token = Some(AccessToken::new(tokens.access_token));
        if let Some(refresh) = tokens.refresh_token {
            state.refresh_token = Some(RefreshToken::new(refresh));
        }
        state.access_expires_at = tokens.expires_at;
    }

    // ===== Session lifecycle =====

    /// Customer login.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.authenticate(CUSTOMER_LOGIN_PATH, body, LOGIN_FAILED).await
    }

    /// Admin login. The role still comes from the returned user's roles.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.authenticate(ADMIN_LOGIN_PATH, body, ADMIN_LOGIN_FAILED).await
    }

    /// Create a customer account and sign in with it.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, ApiError> {
        let body = serde_json::to_value(registration)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode registration: {}", e)))?;
        self.authenticate(REGISTER_PATH, body, REGISTRATION_FAILED).await
    }

    #[instrument(skip(self, body, fallback))]
    async fn authenticate(
        &self,
        path: &str,
        body: serde_json::Value,
        fallback: &str,
    ) -> Result<User, ApiError> {
        let request = ApiRequest::post(path).json_value(body);
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            let err = match response.status {
                401 | 403 | 422 => ApiError::InvalidCredentials(
                    server_message(&response.body).unwrap_or_else(|| fallback.to_string()),
                ),
                status => ApiError::from_status(status, &response.body),
            };
            warn!(status = response.status, error = %err, "Authentication rejected");
            return Err(err);
        }

        let auth: AuthResponse = decode_data(&response.body)?;
        self.persist_pair(&auth.access_token, &auth.refresh_token)?;

        let role = Role::from_roles(&auth.user.roles);
        info!(user_id = auth.user.id, role = role.display_name(), "Authenticated");

        let mut state = self.state();
        *state = SessionState {
            access_token: Some(AccessToken::new(auth.access_token)),
            refresh_token: Some(RefreshToken::new(auth.refresh_token)),
            user: Some(auth.user.clone()),
            role,
            access_expires_at: auth.expires_at,
        };
        Ok(auth.user)
    }

    fn persist_pair(&self, access: &str, refresh: &str) -> Result<(), ApiError> {
        self.store
            .set(ACCESS_TOKEN_KEY, access)
            .map_err(storage_error)?;
        self.store
            .set(REFRESH_TOKEN_KEY, refresh)
            .map_err(storage_error)?;
        Ok(())
    }

    /// Notify the backend (best effort), then erase both tokens.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.sign_out(LOGOUT_PATH).await
    }

    /// Revoke every session of this account (best effort), then erase both tokens.
    pub async fn logout_all(&self) -> Result<(), ApiError> {
        self.sign_out(LOGOUT_ALL_PATH).await
    }

    async fn sign_out(&self, path: &str) -> Result<(), ApiError> {
        let mut request = ApiRequest::post(path);
        self.attach_credentials(&mut request);

        // Not hydrated (e.g. restore failed offline): use the stored token
        if request.bearer().is_none() {
            match self.store.get(ACCESS_TOKEN_KEY) {
                Ok(Some(token)) => request.set_bearer(token),
                Ok(None) => {}
                Err(e) => warn!(error = %format!("{:#}", e), "Failed to read stored access token"),
            }
        }

        if request.bearer().is_some() {
            match self.transport.send(&request).await {
                Ok(response) if response.is_success() => debug!(%path, "Backend logout acknowledged"),
                Ok(response) => {
                    warn!(status = response.status, %path, "Backend logout rejected, clearing local session anyway")
                }
                Err(e) => warn!(error = %e, %path, "Backend logout failed, clearing local session anyway"),
            }
        }

        self.clear_session()?;
        info!("Logged out");
        Ok(())
    }

    /// Reset in-memory state and erase both persisted tokens.
    pub fn clear_session(&self) -> Result<(), ApiError> {
        *self.state() = SessionState::default();

        let access = self.store.delete(ACCESS_TOKEN_KEY);
        let refresh = self.store.delete(REFRESH_TOKEN_KEY);
        access.and(refresh).map_err(storage_error)
    }

    fn end_session(&self) {
        if let Err(e) = self.clear_session() {
            error!(error = %e, "Failed to erase stored tokens");
        }
    }

    /// Hydrate the session from the credential store at startup.
    ///
    /// With no stored access token this makes no network call. Otherwise the
    /// profile endpoint is used as a liveness check; a rejected token erases
    /// the stored pair. An unreachable server leaves the stored tokens in
    /// place for the next start and reports `NetworkUnreachable`.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Result<AuthStatus, ApiError> {
        let Some(access) = self.store.get(ACCESS_TOKEN_KEY).map_err(storage_error)? else {
            debug!("No stored access token");
            return Ok(AuthStatus::Unauthenticated);
        };

        let refresh = match self.store.get(REFRESH_TOKEN_KEY) {
            Ok(refresh) => refresh,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Failed to read stored refresh token");
                None
            }
        };

        {
            let mut state = self.state();
            state.access_token = Some(AccessToken::new(access));
            state.refresh_token = refresh.map(RefreshToken::new);
        }

        match self.profile().await {
            Ok(user) => {
                info!(user_id = user.id, "Session restored");
                Ok(self.status())
            }
            Err(ApiError::NetworkUnreachable(reason)) => {
                warn!(%reason, "Cannot verify stored session, server unreachable");
                *self.state() = SessionState::default();
                Err(ApiError::NetworkUnreachable(reason))
            }
            Err(e) => {
                info!(error = %e, "Stored session is no longer valid");
                self.clear_session()?;
                Ok(AuthStatus::Unauthenticated)
            }
        }
    }

    // ===== Profile =====

    /// Fetch the signed-in user and refresh the cached copy and role.
    pub async fn profile(&self) -> Result<User, ApiError> {
        let response = self.execute(ApiRequest::get(PROFILE_PATH)).await?;
        let user = decode_data::<ProfileBody>(&response.body)?.into_user();
        self.remember_user(&user);
        Ok(user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request = ApiRequest::put(PROFILE_PATH).json(update)?;
        let response = self.execute(request).await?;
        let user = decode_data::<ProfileBody>(&response.body)?.into_user();
        self.remember_user(&user);
        Ok(user)
    }

    pub async fn change_password(&self, change: &ChangePasswordRequest) -> Result<(), ApiError> {
        let request = ApiRequest::post(CHANGE_PASSWORD_PATH).json(change)?;
        self.execute(request).await?;
        info!("Password changed");
        Ok(())
    }

    fn remember_user(&self, user: &User) {
        let mut state = self.state();
        // Some endpoints omit roles; keep the last known role then
        if !user.roles.is_empty() || state.user.is_none() {
            state.role = Role::from_roles(&user.roles);
        }
        state.user = Some(user.clone());
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("status", &self.status())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
