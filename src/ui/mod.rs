pub mod auth;
pub mod common;
pub mod pages;

pub use auth::{AuthContext, LoginForm, provide_auth_context, use_auth_context};
pub use pages::{AdminsPage, DashboardPage, LoginPage, LogoutPage, NotFoundPage};
