//! Client session context
//!
//! One explicit `SessionContext` per client: created with `new`, started
//! with `init`, stopped with `teardown`. It owns the token store and the
//! transport, keeps the in-memory session state, and routes authenticated
//! calls through `request`, which refreshes the access token at most once
//! per call and shares a single in-flight refresh between concurrent calls.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::core::protocol::{
    AdminSummary, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse,
};
use crate::core::session::error::SessionError;
use crate::core::session::storage::{
    ACCESS_TOKEN_KEY, ADMIN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, TokenStore,
};
use crate::core::session::token;
use crate::core::session::transport::{
    ApiRequest, ApiResponse, AuthTransport, LOGIN_PATH, LOGOUT_PATH, ME_PATH, REFRESH_PATH,
};

/// Seconds before `exp` at which a stored access token is treated as expired
pub const DEFAULT_EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub expiry_margin_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
        }
    }
}

/// What the dashboard knows about the current session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub admin: Option<AdminSummary>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<SessionError>,
}

/// A request in flight together with whether it already caused a refresh
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub request: ApiRequest,
    pub refresh_attempted: bool,
}

impl Attempt {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            refresh_attempted: false,
        }
    }

    /// Same request, marked as having used its one refresh
    pub fn after_refresh(self) -> Self {
        Self {
            refresh_attempted: true,
            ..self
        }
    }

    fn may_refresh(&self) -> bool {
        !self.refresh_attempted && !self.request.is_refresh()
    }
}

type RefreshFuture = Shared<LocalBoxFuture<'static, Result<String, SessionError>>>;

struct Inner<T, S> {
    transport: T,
    store: S,
    config: SessionConfig,
    state: RefCell<SessionState>,
    refresh: RefCell<Option<RefreshFuture>>,
    /// Bumped by teardown and logout; a refresh started earlier must not write
    generation: Cell<u64>,
    active: Cell<bool>,
}

impl<T, S: TokenStore> Inner<T, S> {
    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        f(&mut self.state.borrow_mut());
    }

    fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// Forget any in-flight refresh and disown its outcome
    fn cancel_refresh(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.refresh.borrow_mut().take();
    }

    /// Drop every stored token and forget the identity
    fn clear_session(&self) {
        for key in SESSION_KEYS {
            self.store.remove(key);
        }
        self.update(|state| {
            state.admin = None;
            state.is_authenticated = false;
        });
    }

    fn remember(&self, admin: &AdminSummary) {
        if let Ok(json) = serde_json::to_string(admin) {
            self.store.set(ADMIN_KEY, &json);
        }
        self.update(|state| {
            state.admin = Some(admin.clone());
            state.is_authenticated = true;
            state.error = None;
        });
    }
}

/// Client session cache
pub struct SessionContext<T, S> {
    inner: Rc<Inner<T, S>>,
}

impl<T, S> Clone for SessionContext<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, S> SessionContext<T, S>
where
    T: AuthTransport + 'static,
    S: TokenStore + 'static,
{
    pub fn new(transport: T, store: S, config: SessionConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                transport,
                store,
                config,
                state: RefCell::new(SessionState::default()),
                refresh: RefCell::new(None),
                generation: Cell::new(0),
                active: Cell::new(false),
            }),
        }
    }

    /// Start the session: restore the cached identity, then confirm it
    pub async fn init(&self) -> SessionState {
        self.inner.active.set(true);

        let cached = self
            .inner
            .store
            .get(ADMIN_KEY)
            .and_then(|json| serde_json::from_str::<AdminSummary>(&json).ok());
        self.inner.update(|state| state.admin = cached);

        self.check_auth().await;
        self.state()
    }

    /// Stop the session without touching durable storage
    pub fn teardown(&self) {
        self.inner.active.set(false);
        self.inner.cancel_refresh();
        self.inner.update(|state| *state = SessionState::default());
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn admin(&self) -> Option<AdminSummary> {
        self.inner.state.borrow().admin.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    pub fn clear_error(&self) {
        self.inner.update(|state| state.error = None);
    }

    /// Exchange credentials for tokens and remember the identity
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminSummary, SessionError> {
        self.inner.update(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.send_login(email, password).await;

        match &result {
            Ok(response) => {
                let store = &self.inner.store;
                store.set(ACCESS_TOKEN_KEY, &response.access_token);
                store.set(REFRESH_TOKEN_KEY, &response.refresh_token);
                self.inner.remember(&response.admin);
            }
            Err(err) => {
                let err = err.clone();
                self.inner.update(|state| {
                    state.is_authenticated = false;
                    state.error = Some(err);
                });
            }
        }
        self.inner.update(|state| state.is_loading = false);

        result.map(|response| response.admin)
    }

    async fn send_login(&self, email: &str, password: &str) -> Result<LoginResponse, SessionError> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let response = self.inner.transport.send(&request, None).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        response.json()
    }

    /// Decide whether the stored session is usable
    ///
    /// A missing, undecodable or nearly expired access token ends the session
    /// locally without any network call. Otherwise the server confirms the
    /// identity through `GET /auth/me`.
    pub async fn check_auth(&self) -> bool {
        let Some(access_token) = self.inner.access_token() else {
            self.inner.clear_session();
            return false;
        };

        let now = chrono::Utc::now().timestamp();
        if !token::is_fresh(&access_token, now, self.inner.config.expiry_margin_secs) {
            self.inner.clear_session();
            return false;
        }

        self.inner.update(|state| state.is_loading = true);
        let result = self.request(ApiRequest::get(ME_PATH)).await;
        self.inner.update(|state| state.is_loading = false);

        match result.and_then(|response| response.json::<AdminSummary>()) {
            Ok(admin) => {
                self.inner.remember(&admin);
                true
            }
            Err(err) => {
                if matches!(
                    err,
                    SessionError::Authentication(_) | SessionError::Authorization(_)
                ) {
                    self.inner.clear_session();
                }
                self.inner.update(|state| {
                    state.is_authenticated = false;
                    state.error = Some(err);
                });
                false
            }
        }
    }

    /// Send an authenticated request
    ///
    /// A 401 triggers one refresh and one retry with the new access token.
    /// When the stored token already changed while the call was in flight,
    /// the retry uses it without refreshing again. A failed refresh, or a
    /// retry that is still unauthorized, ends the session.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let mut attempt = Attempt::new(request);

        loop {
            let sent_with = self.inner.access_token();
            let response = self
                .inner
                .transport
                .send(&attempt.request, sent_with.as_deref())
                .await?;

            if response.is_success() {
                return Ok(response);
            }

            if response.status != 401 {
                return Err(response.into_error());
            }

            if !attempt.may_refresh() {
                if attempt.refresh_attempted {
                    self.inner.clear_session();
                }
                return Err(response.into_error());
            }

            let current = self.inner.access_token();
            if current.is_none() || current == sent_with {
                self.refresh_access_token().await?;
            }
            attempt = attempt.after_refresh();
        }
    }

    /// Get a new access token, joining a refresh already in flight
    pub async fn refresh_access_token(&self) -> Result<String, SessionError> {
        let refresh = {
            let mut slot = self.inner.refresh.borrow_mut();
            match slot.as_ref() {
                Some(in_flight) => in_flight.clone(),
                None => {
                    let started = Self::start_refresh(Rc::clone(&self.inner));
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let result = refresh.clone().await;

        let mut slot = self.inner.refresh.borrow_mut();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&refresh)) {
            slot.take();
        }

        result
    }

    fn start_refresh(inner: Rc<Inner<T, S>>) -> RefreshFuture {
        let generation = inner.generation.get();
        async move {
            let result = Self::perform_refresh(&inner).await;
            if inner.generation.get() != generation {
                tracing::debug!("Discarding refresh outcome of an ended session");
                return result;
            }
            match &result {
                Ok(access_token) => inner.store.set(ACCESS_TOKEN_KEY, access_token),
                Err(_) => inner.clear_session(),
            }
            result
        }
        .boxed_local()
        .shared()
    }

    async fn perform_refresh(inner: &Inner<T, S>) -> Result<String, SessionError> {
        let refresh_token = inner
            .store
            .get(REFRESH_TOKEN_KEY)
            .ok_or_else(SessionError::session_expired)?;

        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh_token })?;
        let response = inner.transport.send(&request, None).await?;
        if !response.is_success() {
            return Err(match response.into_error() {
                SessionError::Authentication(_) => SessionError::session_expired(),
                other => other,
            });
        }

        let refreshed: RefreshResponse = response.json()?;
        Ok(refreshed.access_token)
    }

    /// End the session. Safe to call any number of times.
    pub async fn logout(&self) {
        let access_token = self.inner.access_token();
        // The server only expires its cookie; the outcome does not matter
        let _ = self
            .inner
            .transport
            .send(&ApiRequest::post(LOGOUT_PATH), access_token.as_deref())
            .await;

        self.inner.cancel_refresh();
        self.inner.clear_session();
        self.inner.update(|state| {
            state.error = None;
            state.is_loading = false;
        });
    }
}
