//! Client-side admin session
//!
//! Compiled into both the server and the WebAssembly build. The dashboard
//! talks to the backend only through a [`SessionContext`], which caches
//! tokens in a [`TokenStore`] and sends requests over an [`AuthTransport`].

pub mod context;
pub mod error;
pub mod storage;
pub mod token;
pub mod transport;

pub use context::{
    Attempt, DEFAULT_EXPIRY_MARGIN_SECS, SessionConfig, SessionContext, SessionState,
};
pub use error::SessionError;
pub use storage::{
    ACCESS_TOKEN_KEY, ADMIN_KEY, MemoryTokenStore, REFRESH_TOKEN_KEY, TokenStore,
};
pub use transport::{ApiRequest, ApiResponse, AuthTransport, HttpMethod, OfflineTransport};
