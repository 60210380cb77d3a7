//! Dashboard overview page

use leptos::prelude::*;
use leptos_router::components::A;

use super::redirect_when_signed_out;
use crate::ui::auth::use_auth_context;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth_context();
    redirect_when_signed_out(auth);

    let greeting = move || {
        auth.admin
            .get()
            .map(|admin| format!("Signed in as {} ({})", admin.name, admin.role))
            .unwrap_or_else(|| "Checking your session...".to_string())
    };

    view! {
        <main class="dashboard">
            <header class="dashboard-header">
                <h1>"Dashboard"</h1>
                <nav>
                    <A href="/dashboard/admins">"Admins"</A>
                    <A href="/logout">"Sign out"</A>
                </nav>
            </header>
            <p class="dashboard-greeting">{greeting}</p>
        </main>
    }
}
