//! Common reusable UI components

pub mod message;

pub use message::{AccessDenied, ErrorBanner, FormError, SessionErrorView};
