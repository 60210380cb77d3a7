//! Login page, redirects to the dashboard once signed in

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::ui::auth::{LoginForm, use_auth_context};

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth_context();

    // Covers both a restored session and a fresh login
    Effect::new(move |_| {
        if auth.is_authenticated.get() {
            let navigate = use_navigate();
            navigate("/dashboard", Default::default());
        }
    });

    view! {
        <main class="login-page">
            <LoginForm/>
        </main>
    }
}
