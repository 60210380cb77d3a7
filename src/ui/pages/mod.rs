//! Application pages
//!
//! - `/` login
//! - `/dashboard` overview
//! - `/dashboard/admins` admin management
//! - `/logout`

mod admins;
mod dashboard;
mod login;
mod logout;
mod not_found;

pub use admins::{AdminsPage, can_manage};
pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use logout::LogoutPage;
pub use not_found::NotFoundPage;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::ui::auth::AuthContext;

/// Send the visitor to the login page once the session check says no
pub(crate) fn redirect_when_signed_out(auth: AuthContext) {
    Effect::new(move |_| {
        if auth.checked.get() && !auth.is_authenticated.get() {
            let navigate = use_navigate();
            navigate("/", Default::default());
        }
    });
}
