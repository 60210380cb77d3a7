//! Login form component

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::context::use_auth_context;
use crate::ui::common::SessionErrorView;

/// Email/password sign-in form
#[component]
pub fn LoginForm(
    /// Callback when login is successful
    #[prop(optional, into)]
    on_success: Option<Callback<()>>,
) -> impl IntoView {
    let auth = use_auth_context();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let field_error = RwSignal::new(None::<String>);

    let validate = move || {
        let value = email.get_untracked();
        let value = value.trim();
        if value.is_empty() || password.get_untracked().is_empty() {
            field_error.set(Some("Email and password are required".to_string()));
            false
        } else if !value.contains('@') {
            field_error.set(Some("Please enter a valid email".to_string()));
            false
        } else {
            field_error.set(None);
            true
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        auth.clear_error();

        if !validate() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();

        spawn_local(async move {
            // Failures are already recorded in the auth context
            if auth.login(email_val.trim(), &password_val).await.is_ok() {
                password.set(String::new());
                if let Some(callback) = on_success {
                    callback.run(());
                }
            }
        });
    };

    view! {
        <form on:submit=on_submit class="login-form">
            <h1>"Shopfront admin"</h1>
            <p class="login-subtitle">"Sign in to manage the store"</p>

            <SessionErrorView error=auth.error on_dismiss=Callback::new(move |_| auth.clear_error())/>
            {move || field_error.get().map(|error| view! { <p class="form-error">{error}</p> })}

            <label for="email">"Email"</label>
            <input
                type="email"
                id="email"
                name="email"
                autocomplete="username"
                prop:value=move || email.get()
                on:input=move |ev| email.set(event_target_value(&ev))
            />

            <label for="password">"Password"</label>
            <input
                type="password"
                id="password"
                name="password"
                autocomplete="current-password"
                prop:value=move || password.get()
                on:input=move |ev| password.set(event_target_value(&ev))
            />

            <button type="submit" disabled=move || auth.loading.get()>
                {move || if auth.loading.get() { "Signing in..." } else { "Sign in" }}
            </button>
        </form>
    }
}
