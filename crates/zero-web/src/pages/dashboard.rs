//! Dashboard Page

use leptos::{prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, hooks::use_navigate};
use zero_core::dashboard::{
    self, DashboardState, InstalledSection, MSG_NO_AGENT, MSG_NO_SKILLS,
};
use zero_core::{InstalledSkill, Skill};

use crate::components::{AgentCard, CatalogModal, NoticeBanner, SkillCard};
use crate::context::AppContext;
use crate::storage;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let navigate = use_navigate();
    let state = RwSignal::new(DashboardState::loading());

    {
        let ctx = ctx.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            let client = ctx.client.as_ref();
            let (resolution, catalog) = dashboard::mount(client, client, ctx.catalog.as_ref()).await;
            let redirect = state
                .try_update(|s| {
                    s.set_catalog(catalog);
                    s.apply_resolution(resolution)
                })
                .flatten();

            // The client may have refreshed or dropped the stored session
            ctx.persist_session();
            if let Some(redirect) = redirect {
                navigate(redirect.to, NavigateOptions::default());
            }
        });
    }

    let install = Callback::new({
        let ctx = ctx.clone();
        move |skill: Skill| {
            let ctx = ctx.clone();
            let agent = state.with_untracked(|s| s.agent.clone());
            spawn_local(async move {
                let outcome = dashboard::install(ctx.client.as_ref(), agent.as_ref(), &skill).await;
                ctx.persist_session();
                state.update(|s| s.apply_outcome(outcome));
            });
        }
    });

    let uninstall = Callback::new({
        let ctx = ctx.clone();
        move |skill: InstalledSkill| {
            let Some(agent) = state.with_untracked(|s| s.agent.clone()) else {
                return;
            };
            let ctx = ctx.clone();
            spawn_local(async move {
                let outcome =
                    dashboard::uninstall(ctx.client.as_ref(), &agent, &skill, confirm_in_browser).await;
                ctx.persist_session();
                state.update(|s| s.apply_outcome(outcome));
            });
        }
    });

    let toggle_catalog = Callback::new(move |()| state.update(DashboardState::toggle_catalog));
    let dismiss = Callback::new(move |()| state.update(DashboardState::dismiss_notice));

    let on_sign_out = move |_| {
        let ctx = ctx.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            let redirect = dashboard::sign_out(ctx.client.as_ref()).await;
            storage::clear_session();
            navigate(redirect.to, NavigateOptions::default());
        });
    };

    view! {
        <div class="dashboard">
            <header class="dashboard-header">
                <h1>"Zero Agent"</h1>
                <div class="account">
                    <span class="email">{move || state.with(|s| s.user_email().to_string())}</span>
                    <button class="btn" on:click=on_sign_out>"Sign out"</button>
                </div>
            </header>

            {move || state.with(|s| s.notice.clone()).map(|notice| {
                view! { <NoticeBanner notice=notice on_dismiss=dismiss /> }
            })}

            <Show
                when=move || !state.with(|s| s.loading)
                fallback=|| view! { <p class="loading">"Loading..."</p> }
            >
                {move || state.with(|s| s.agent.clone().map(|agent| {
                    let count = s.installed.len();
                    view! { <AgentCard agent=agent installed_count=count /> }
                }))}

                <section class="installed">
                    <div class="section-header">
                        <h2>"Installed Skills"</h2>
                        <button class="btn btn-primary" on:click=move |_| toggle_catalog.run(())>
                            "Browse Skills"
                        </button>
                    </div>
                    {move || state.with(|s| match s.installed_section() {
                        InstalledSection::NoAgent => {
                            view! { <p class="empty">{MSG_NO_AGENT}</p> }.into_any()
                        }
                        InstalledSection::Empty => {
                            view! { <p class="empty">{MSG_NO_SKILLS}</p> }.into_any()
                        }
                        InstalledSection::Cards(rows) => {
                            let cards = rows
                                .iter()
                                .cloned()
                                .map(|row| view! { <SkillCard skill=row on_uninstall=uninstall /> })
                                .collect_view();
                            view! { <div class="skill-grid">{cards}</div> }.into_any()
                        }
                    })}
                </section>
            </Show>

            {move || {
                state
                    .with(|s| s.catalog_open.then(|| s.catalog_entries()))
                    .map(|entries| {
                        view! {
                            <CatalogModal entries=entries on_install=install on_close=toggle_catalog />
                        }
                    })
            }}
        </div>
    }
}

fn confirm_in_browser(skill: &InstalledSkill) -> bool {
    let prompt = dashboard::confirm_uninstall_prompt(skill);
    window().confirm_with_message(&prompt).unwrap_or(false)
}
