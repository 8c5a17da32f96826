//! Session persistence in `localStorage`

use web_sys::Storage;
use zero_core::AuthSession;

const SESSION_KEY: &str = "zero-agent.session";

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Session saved by a previous page load, if any
pub fn load_session() -> Option<AuthSession> {
    let raw = local_storage()?.get_item(SESSION_KEY).ok().flatten()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable stored session");
            clear_session();
            None
        }
    }
}

/// Persist `session`, or remove the stored one when `None`
pub fn save_session(session: Option<&AuthSession>) {
    let Some(session) = session else {
        clear_session();
        return;
    };
    let Some(storage) = local_storage() else {
        return;
    };
    match serde_json::to_string(session) {
        Ok(raw) => {
            if storage.set_item(SESSION_KEY, &raw).is_err() {
                tracing::warn!("failed to persist session");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode session"),
    }
}

pub fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}
