//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::context::AppContext;
use crate::pages::{DashboardPage, LoginPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    match AppContext::from_build_env() {
        Ok(ctx) => {
            provide_context(ctx);
            view! {
                <Router>
                    <main class="app">
                        <Routes fallback=|| view! { <p>"Page not found"</p> }>
                            <Route path=path!("/") view=LoginPage />
                            <Route path=path!("/dashboard") view=DashboardPage />
                        </Routes>
                    </main>
                </Router>
            }
            .into_any()
        }
        Err(e) => {
            tracing::error!(error = %e, "frontend is not configured");
            view! { <ConfigError message=e.to_string() /> }.into_any()
        }
    }
}

/// Shown instead of the app when the build carries no project endpoints
#[component]
fn ConfigError(message: String) -> impl IntoView {
    view! {
        <main class="app">
            <div class="config-error">
                <h1>"zero-agent"</h1>
                <p>"This build is missing its configuration."</p>
                <pre>{message}</pre>
            </div>
        </main>
    }
}
