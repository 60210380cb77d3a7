//! Admin management page
//!
//! Everyone signed in sees the list; only super admins get the create form
//! and the per-row controls, which stay disabled on their own row.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use uuid::Uuid;

use super::redirect_when_signed_out;
use crate::core::protocol::{AdminListEntry, AdminRole, AdminSummary, CreateAdminRequest};
use crate::core::session::{ApiRequest, SessionError};
use crate::ui::auth::{AuthContext, use_auth_context};
use crate::ui::common::SessionErrorView;

/// Whether `current` may toggle or delete `admin`; nobody manages their own record
pub fn can_manage(admin: &AdminListEntry, current: &AdminSummary) -> bool {
    admin.id != current.id
}

async fn fetch_admins(auth: AuthContext) -> Result<Vec<AdminListEntry>, SessionError> {
    auth.request(ApiRequest::get("/api/admins")).await?.json()
}

#[component]
pub fn AdminsPage() -> impl IntoView {
    let auth = use_auth_context();
    redirect_when_signed_out(auth);

    let admins = RwSignal::new(Vec::<AdminListEntry>::new());
    let page_error = RwSignal::new(None::<SessionError>);

    let reload = move || {
        spawn_local(async move {
            match fetch_admins(auth).await {
                Ok(list) => {
                    admins.set(list);
                    page_error.set(None);
                }
                Err(err) => page_error.set(Some(err)),
            }
        });
    };

    Effect::new(move |_| {
        if auth.is_authenticated.get() {
            reload();
        }
    });

    let run_action = move |request: ApiRequest| {
        spawn_local(async move {
            match auth.request(request).await {
                Ok(_) => reload(),
                Err(err) => page_error.set(Some(err)),
            }
        });
    };

    let is_super_admin = move || {
        auth.admin
            .get()
            .is_some_and(|current| current.role.is_super_admin())
    };

    view! {
        <main class="admins-page">
            <header class="dashboard-header">
                <h1>"Admins"</h1>
                <nav>
                    <A href="/dashboard">"Dashboard"</A>
                    <A href="/logout">"Sign out"</A>
                </nav>
            </header>

            <SessionErrorView error=page_error on_dismiss=Callback::new(move |_| page_error.set(None))/>

            <Show when=is_super_admin>
                <CreateAdminForm on_created=Callback::new(move |_| reload())/>
            </Show>

            <table class="admins-table">
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Email"</th>
                        <th>"Role"</th>
                        <th>"Status"</th>
                        <Show when=is_super_admin><th>"Actions"</th></Show>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || admins.get()
                        key=|admin| (admin.id, admin.is_active)
                        children=move |admin| {
                            let row = admin.clone();
                            let locked = move || {
                                auth.admin
                                    .get()
                                    .is_none_or(|current| !can_manage(&row, &current))
                            };
                            let id: Uuid = admin.id;
                            let toggle_label = if admin.is_active { "Deactivate" } else { "Activate" };
                            view! {
                                <tr>
                                    <td>{admin.name.clone()}</td>
                                    <td>{admin.email.clone()}</td>
                                    <td>{admin.role.to_string()}</td>
                                    <td>{if admin.is_active { "active" } else { "inactive" }}</td>
                                    <Show when=is_super_admin>
                                        <td>
                                            <button
                                                disabled=locked.clone()
                                                on:click=move |_| {
                                                    run_action(ApiRequest::patch(format!("/api/admins/{id}/status")))
                                                }
                                            >
                                                {toggle_label}
                                            </button>
                                            <button
                                                class="danger"
                                                disabled=locked.clone()
                                                on:click=move |_| {
                                                    run_action(ApiRequest::delete(format!("/api/admins/{id}")))
                                                }
                                            >
                                                "Delete"
                                            </button>
                                        </td>
                                    </Show>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </main>
    }
}

#[component]
fn CreateAdminForm(#[prop(into)] on_created: Callback<()>) -> impl IntoView {
    let auth = use_auth_context();

    let email = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let super_admin = RwSignal::new(false);
    let error = RwSignal::new(None::<SessionError>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let body = CreateAdminRequest {
            email: email.get_untracked(),
            password: password.get_untracked(),
            name: name.get_untracked(),
            role: if super_admin.get_untracked() {
                AdminRole::SuperAdmin
            } else {
                AdminRole::Admin
            },
        };

        spawn_local(async move {
            let result = match ApiRequest::post("/api/admins").json(&body) {
                Ok(request) => auth.request(request).await.map(|_| ()),
                Err(err) => Err(err),
            };
            match result {
                Ok(()) => {
                    email.set(String::new());
                    name.set(String::new());
                    password.set(String::new());
                    super_admin.set(false);
                    error.set(None);
                    on_created.run(());
                }
                Err(err) => error.set(Some(err)),
            }
        });
    };

    view! {
        <form class="create-admin-form" on:submit=on_submit>
            <h2>"Add an admin"</h2>
            <SessionErrorView error=error on_dismiss=Callback::new(move |_| error.set(None))/>
            <input
                type="text"
                placeholder="Name"
                prop:value=move || name.get()
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <input
                type="email"
                placeholder="Email"
                prop:value=move || email.get()
                on:input=move |ev| email.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password"
                autocomplete="new-password"
                prop:value=move || password.get()
                on:input=move |ev| password.set(event_target_value(&ev))
            />
            <label>
                <input
                    type="checkbox"
                    prop:checked=move || super_admin.get()
                    on:change=move |ev| super_admin.set(event_target_checked(&ev))
                />
                "Super admin"
            </label>
            <button type="submit">"Create"</button>
        </form>
    }
}
