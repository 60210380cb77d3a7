//! Components for showing session errors
//!
//! Validation and credential problems render inline next to the form,
//! network problems as a dismissible banner and authorization problems as an
//! access-denied panel.

use leptos::prelude::*;

use crate::core::session::SessionError;

/// Inline error under a form
#[component]
pub fn FormError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div class="form-error" role="alert">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// Dismissible banner for network failures
#[component]
pub fn ErrorBanner(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div class="error-banner" role="alert">
                <span>{move || message.get().unwrap_or_default()}</span>
                <button type="button" class="error-banner-close" on:click=move |_| on_dismiss.run(())>
                    "Dismiss"
                </button>
            </div>
        </Show>
    }
}

#[component]
pub fn AccessDenied(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="access-denied">
            <h2>"Access denied"</h2>
            <p>{message}</p>
        </div>
    }
}

/// Render any session error the way its category calls for
#[component]
pub fn SessionErrorView(
    #[prop(into)] error: Signal<Option<SessionError>>,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    move || {
        error.get().map(|err| match err {
            SessionError::Authorization(message) => {
                view! { <AccessDenied message=message/> }.into_any()
            }
            SessionError::Network(message) => {
                view! { <ErrorBanner message=Some(message) on_dismiss=on_dismiss/> }.into_any()
            }
            SessionError::Validation(message) | SessionError::Authentication(message) => {
                view! { <FormError message=Some(message)/> }.into_any()
            }
        })
    }
}
