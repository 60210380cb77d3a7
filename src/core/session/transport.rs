//! Request/response values and the transport seam used by the session

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::protocol::ApiError;
use crate::core::session::error::SessionError;

pub const LOGIN_PATH: &str = "/auth/login";
pub const ME_PATH: &str = "/auth/me";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum HttpMethod {
    #[display("GET")]
    Get,
    #[display("POST")]
    Post,
    #[display("PATCH")]
    Patch,
    #[display("DELETE")]
    Delete,
}

/// An API call, relative to the backend origin
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, SessionError> {
        let value = serde_json::to_value(body)
            .map_err(|e| SessionError::Validation(format!("Cannot encode request: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// The refresh call itself never triggers another refresh
    pub fn is_refresh(&self) -> bool {
        self.path == REFRESH_PATH
    }
}

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SessionError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| SessionError::Network(format!("Unexpected response: {e}")))
    }

    /// Map a failed response to its error category, keeping the server message
    pub fn into_error(self) -> SessionError {
        let message = serde_json::from_value::<ApiError>(self.body)
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", self.status));
        SessionError::from_status(self.status, message)
    }
}

/// Sends API requests on behalf of the session
///
/// Transport failures are `Err(SessionError::Network)`; any HTTP status,
/// including errors, comes back as `Ok(ApiResponse)`.
#[allow(async_fn_in_trait)]
pub trait AuthTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ApiResponse, SessionError>;
}

/// Transport used while rendering on the server; the session there is
/// always anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl AuthTransport for OfflineTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        _access_token: Option<&str>,
    ) -> Result<ApiResponse, SessionError> {
        Err(SessionError::Network(format!(
            "{} {} is unavailable during server rendering",
            request.method, request.path
        )))
    }
}
