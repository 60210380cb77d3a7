//! Auth context for the dashboard
//!
//! Wraps the client [`SessionContext`] in reactive signals and provides it to
//! the component tree. On the server the session is always anonymous; in the
//! browser it persists to `localStorage` and talks to the API with `fetch`.

use leptos::prelude::*;

use crate::core::protocol::AdminSummary;
use crate::core::session::{ApiRequest, ApiResponse, SessionConfig, SessionContext, SessionError};

#[cfg(feature = "hydrate")]
type ClientSession =
    SessionContext<super::browser::FetchTransport, super::browser::LocalStorageStore>;
#[cfg(not(feature = "hydrate"))]
type ClientSession =
    SessionContext<crate::core::session::OfflineTransport, crate::core::session::MemoryTokenStore>;

fn client_session() -> ClientSession {
    #[cfg(feature = "hydrate")]
    {
        SessionContext::new(
            super::browser::FetchTransport::default(),
            super::browser::LocalStorageStore,
            SessionConfig::default(),
        )
    }
    #[cfg(not(feature = "hydrate"))]
    {
        SessionContext::new(
            crate::core::session::OfflineTransport,
            crate::core::session::MemoryTokenStore::new(),
            SessionConfig::default(),
        )
    }
}

/// Auth context providing session state and actions
#[derive(Clone, Copy)]
pub struct AuthContext {
    session: StoredValue<ClientSession, LocalStorage>,
    pub admin: RwSignal<Option<AdminSummary>>,
    pub is_authenticated: RwSignal<bool>,
    /// Initial check still running, or an auth operation in flight
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<SessionError>>,
    /// Set once the stored session has been checked
    pub checked: RwSignal<bool>,
}

impl AuthContext {
    fn session(&self) -> Option<ClientSession> {
        self.session.try_get_value()
    }

    /// Copy the session state into the signals
    fn sync(&self) {
        let Some(state) = self.session().map(|s| s.state()) else {
            return;
        };
        self.admin.set(state.admin);
        self.is_authenticated.set(state.is_authenticated);
        self.loading.set(state.is_loading);
        self.error.set(state.error);
    }

    pub fn clear_error(&self) {
        if let Some(session) = self.session() {
            session.clear_error();
        }
        self.error.set(None);
    }

    pub async fn init(&self) {
        if let Some(session) = self.session() {
            self.loading.set(true);
            session.init().await;
            self.sync();
        }
        self.loading.set(false);
        self.checked.set(true);
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AdminSummary, SessionError> {
        let session = self.session().ok_or_else(SessionError::session_expired)?;
        self.loading.set(true);
        let result = session.login(email, password).await;
        self.sync();
        result
    }

    pub async fn check_auth(&self) -> bool {
        let Some(session) = self.session() else {
            return false;
        };
        let authenticated = session.check_auth().await;
        self.sync();
        authenticated
    }

    /// Authenticated API call; a forced logout shows up in the signals
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let session = self.session().ok_or_else(SessionError::session_expired)?;
        let result = session.request(request).await;
        self.sync();
        result
    }

    pub async fn logout(&self) {
        if let Some(session) = self.session() {
            session.logout().await;
        }
        self.sync();
    }

    #[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
    fn teardown(&self) {
        if let Some(session) = self.session() {
            session.teardown();
        }
    }
}

/// Provide auth context to the component tree
pub fn provide_auth_context() -> AuthContext {
    // Anonymous on both server and client until hydration, so markup matches
    let ctx = AuthContext {
        session: StoredValue::new_local(client_session()),
        admin: RwSignal::new(None),
        is_authenticated: RwSignal::new(false),
        loading: RwSignal::new(false),
        error: RwSignal::new(None),
        checked: RwSignal::new(false),
    };

    // The session only lives in the browser; restore it after hydration
    #[cfg(feature = "hydrate")]
    {
        Effect::new(move |_| {
            leptos::task::spawn_local(async move { ctx.init().await });
        });
        on_cleanup(move || ctx.teardown());
    }

    provide_context(ctx);
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthContext {
    expect_context::<AuthContext>()
}
