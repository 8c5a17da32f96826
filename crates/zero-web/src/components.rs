//! UI Components

use leptos::prelude::*;
use zero_core::dashboard::{CatalogEntry, Notice};
use zero_core::{Agent, InstalledSkill, Skill};

/// The user's agent
#[component]
pub fn AgentCard(agent: Agent, installed_count: usize) -> impl IntoView {
    let created = agent.created_at.format("%Y-%m-%d").to_string();

    view! {
        <section class="agent-card">
            <h2>{agent.name}</h2>
            <dl>
                <dt>"Agent ID"</dt>
                <dd class="mono">{agent.agent_id}</dd>
                <dt>"Created"</dt>
                <dd>{created}</dd>
                <dt>"Skills"</dt>
                <dd>{installed_count}</dd>
            </dl>
        </section>
    }
}

/// One installed skill with its uninstall action
#[component]
pub fn SkillCard(skill: InstalledSkill, #[prop(into)] on_uninstall: Callback<InstalledSkill>) -> impl IntoView {
    let installed = skill.installed_at.format("%Y-%m-%d").to_string();
    let name = skill.skill_name.clone();

    view! {
        <div class="skill-card">
            <h3>{name}</h3>
            <p class="meta">"Installed " {installed}</p>
            <button class="btn btn-danger" on:click=move |_| on_uninstall.run(skill.clone())>
                "Uninstall"
            </button>
        </div>
    }
}

/// Info or error banner
#[component]
pub fn NoticeBanner(notice: Notice, #[prop(into)] on_dismiss: Callback<()>) -> impl IntoView {
    let class = if notice.is_error() { "notice notice-error" } else { "notice notice-info" };

    view! {
        <div class=class>
            <span>{notice.text().to_string()}</span>
            <button class="btn btn-link" on:click=move |_| on_dismiss.run(())>"×"</button>
        </div>
    }
}

/// Catalog modal; already-installed skills cannot be installed again
#[component]
pub fn CatalogModal(
    entries: Vec<CatalogEntry>,
    #[prop(into)] on_install: Callback<Skill>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let empty = entries.is_empty();
    let rows = entries
        .into_iter()
        .map(|entry| view! { <CatalogRow entry=entry on_install=on_install /> })
        .collect_view();

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.run(())>
            <div class="modal" on:click=|ev| ev.stop_propagation()>
                <header class="modal-header">
                    <h2>"Skill Catalog"</h2>
                    <button class="btn btn-link" on:click=move |_| on_close.run(())>"×"</button>
                </header>
                <Show when=move || empty>
                    <p class="empty">"No skills available"</p>
                </Show>
                <div class="catalog">{rows}</div>
            </div>
        </div>
    }
}

#[component]
fn CatalogRow(entry: CatalogEntry, on_install: Callback<Skill>) -> impl IntoView {
    let CatalogEntry { skill, installed } = entry;
    let (icon, name, description, category) = (
        skill.icon.clone(),
        skill.name.clone(),
        skill.description.clone(),
        skill.category.clone(),
    );

    view! {
        <div class="catalog-row">
            <span class="icon">{icon}</span>
            <div class="details">
                <h3>{name}</h3>
                <p>{description}</p>
                <span class="category">{category}</span>
            </div>
            <button
                class="btn btn-primary"
                disabled=installed
                on:click=move |_| on_install.run(skill.clone())
            >
                {if installed { "Installed" } else { "Install" }}
            </button>
        </div>
    }
}
