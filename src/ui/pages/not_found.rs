use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <main class="not-found">
            <h1>"Page not found"</h1>
            <A href="/dashboard">"Back to the dashboard"</A>
        </main>
    }
}
