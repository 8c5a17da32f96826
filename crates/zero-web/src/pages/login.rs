//! Login / Signup Page

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use leptos::{ev::SubmitEvent, prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, hooks::use_navigate};
use zero_core::PendingRedirect;
use zero_core::login::{self, LoginForm, PASSWORD_MIN_LENGTH};

use crate::context::AppContext;
use crate::delay::BrowserDelay;

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let navigate = use_navigate();
    let form = RwSignal::new(LoginForm::new());

    // Outlives the page's reactive owner so a late submission still sees it
    let pending = Arc::new(Mutex::new(PendingRedirect::<TimeoutHandle>::new()));
    on_cleanup({
        let pending = Arc::clone(&pending);
        move || {
            if let Some(handle) = lock(&pending).dispose() {
                handle.clear();
            }
        }
    });

    let submitting = move || form.with(LoginForm::is_submitting);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some((mode, credentials)) = form.try_update(LoginForm::begin_submit).flatten() else {
            return;
        };

        let ctx = ctx.clone();
        let navigate = navigate.clone();
        let pending = Arc::clone(&pending);
        spawn_local(async move {
            let client = ctx.client.as_ref();
            let redirect = login::submit(
                client,
                client,
                &BrowserDelay,
                mode,
                &credentials,
                |state| form.update(|f| f.state = state),
            )
            .await;
            ctx.persist_session();

            let Some(redirect) = redirect else {
                return;
            };
            let scheduled = lock(&pending).schedule(|| {
                set_timeout_with_handle(
                    move || navigate(redirect.to, NavigateOptions::default()),
                    redirect.after,
                )
                .inspect_err(|e| tracing::error!(error = ?e, "failed to schedule navigation"))
                .ok()
            });
            if !scheduled {
                tracing::debug!("login page left before submission finished, not navigating");
            }
        });
    };

    view! {
        <div class="login">
            <div class="login-card">
                <h1>"Zero Agent"</h1>
                <p class="subtitle">{move || form.with(|f| f.mode.subtitle())}</p>

                <form on:submit=on_submit>
                    <div class="field">
                        <label for="email">"Email"</label>
                        <input
                            id="email"
                            type="email"
                            required
                            placeholder="you@example.com"
                            prop:value=move || form.with(|f| f.email.clone())
                            on:input=move |ev| form.update(|f| f.set_email(event_target_value(&ev)))
                            disabled=submitting
                        />
                    </div>

                    <div class="field">
                        <label for="password">"Password"</label>
                        <input
                            id="password"
                            type="password"
                            required
                            minlength=PASSWORD_MIN_LENGTH.to_string()
                            placeholder="••••••••"
                            prop:value=move || form.with(|f| f.password.clone())
                            on:input=move |ev| form.update(|f| f.set_password(event_target_value(&ev)))
                            disabled=submitting
                        />
                    </div>

                    {move || form.with(|f| {
                        f.state.error().map(|msg| view! { <div class="message error">{msg.to_string()}</div> })
                    })}
                    {move || form.with(|f| {
                        f.state.success().map(|msg| view! { <div class="message success">{msg.to_string()}</div> })
                    })}

                    <button type="submit" class="btn btn-primary" disabled=submitting>
                        {move || form.with(LoginForm::button_label)}
                    </button>
                </form>

                <button
                    type="button"
                    class="btn btn-link"
                    on:click=move |_| form.update(LoginForm::toggle_mode)
                    disabled=submitting
                >
                    {move || form.with(|f| f.mode.toggle_label())}
                </button>
            </div>
        </div>
    }
}

fn lock<T>(pending: &Mutex<T>) -> MutexGuard<'_, T> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
