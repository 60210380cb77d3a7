//! Logout page: ends the session and returns to the login page

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use crate::ui::auth::use_auth_context;

#[component]
pub fn LogoutPage() -> impl IntoView {
    let auth = use_auth_context();
    let navigate = use_navigate();

    Effect::new(move |_| {
        let navigate = navigate.clone();
        spawn_local(async move {
            auth.logout().await;
            navigate("/", Default::default());
        });
    });

    view! { <p class="logout-message">"Signing out..."</p> }
}
