//! Authentication UI: context, login form and browser plumbing

#[cfg(feature = "hydrate")]
pub mod browser;
mod context;
mod login_form;

pub use context::{AuthContext, provide_auth_context, use_auth_context};
pub use login_form::LoginForm;
