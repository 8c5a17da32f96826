//! Login / Signup Screen Logic
//!
//! ```text
//!   Idle ──submit──▶ Submitting ──▶ Succeeded(msg) ──timer──▶ /dashboard
//!    ▲                    │
//!    │                    └───────▶ Failed(msg)
//!    └──── field edit / mode toggle
//! ```
//!
//! Sign-up runs agent provisioning before navigating, but a failed
//! provisioning never holds the user back.

use std::time::Duration;

use crate::model::Credentials;
use crate::provision::{DEFAULT_MAX_ATTEMPTS, provision};
use crate::screen::{Redirect, ScreenState, route};
use crate::service::{AgentStore, Delay, IdentityProvider};

/// Enforced by the password input only
pub const PASSWORD_MIN_LENGTH: usize = 6;

pub const SIGN_UP_REDIRECT_DELAY: Duration = Duration::from_millis(1500);
pub const SIGN_IN_REDIRECT_DELAY: Duration = Duration::from_millis(1000);

pub const MSG_SETTING_UP: &str = "Account created! Setting up your agent...";
pub const MSG_ACCOUNT_CREATED: &str = "Account created! Redirecting...";
pub const MSG_AGENT_PENDING: &str = "Account created! Redirecting... (Agent setup pending)";
pub const MSG_SIGNED_IN: &str = "Login successful! Redirecting...";

/// Whether the form registers a new account or signs in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }

    pub const fn subtitle(self) -> &'static str {
        match self {
            Self::SignIn => "Welcome back",
            Self::SignUp => "Create your AI agent account",
        }
    }

    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::SignIn => "Don't have an account? Sign up",
            Self::SignUp => "Already have an account? Sign in",
        }
    }
}

/// Form fields plus the screen state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub state: ScreenState,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    /// Switch between sign-in and sign-up, clearing any message
    pub fn toggle_mode(&mut self) {
        if self.is_submitting() {
            return;
        }
        self.mode = self.mode.toggled();
        self.state = ScreenState::Idle;
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.reset_message();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.reset_message();
    }

    fn reset_message(&mut self) {
        if !self.is_submitting() {
            self.state = ScreenState::Idle;
        }
    }

    /// Move to `Submitting` and hand out the credentials, unless a
    /// submission is already running
    pub fn begin_submit(&mut self) -> Option<(AuthMode, Credentials)> {
        if self.is_submitting() {
            return None;
        }
        self.state = ScreenState::Submitting;
        Some((self.mode, Credentials::new(&self.email, &self.password)))
    }

    pub const fn button_label(&self) -> &'static str {
        match (self.mode, self.is_submitting()) {
            (AuthMode::SignIn, false) => "Sign In",
            (AuthMode::SignUp, false) => "Create Account",
            (AuthMode::SignIn, true) => "Signing in...",
            (AuthMode::SignUp, true) => "Creating account...",
        }
    }
}

/// Run a submission.
///
/// Every state change is passed to `report`. Returns the navigation to
/// schedule, or `None` when the action halted.
pub async fn submit<I, S, D>(
    identity: &I,
    store: &S,
    delay: &D,
    mode: AuthMode,
    credentials: &Credentials,
    mut report: impl FnMut(ScreenState),
) -> Option<Redirect>
where
    I: IdentityProvider + ?Sized,
    S: AgentStore + ?Sized,
    D: Delay + ?Sized,
{
    report(ScreenState::Submitting);

    match mode {
        AuthMode::SignUp => sign_up(identity, store, delay, credentials, &mut report).await,
        AuthMode::SignIn => sign_in(identity, credentials, &mut report).await,
    }
}

async fn sign_up<I, S, D>(
    identity: &I,
    store: &S,
    delay: &D,
    credentials: &Credentials,
    report: &mut impl FnMut(ScreenState),
) -> Option<Redirect>
where
    I: IdentityProvider + ?Sized,
    S: AgentStore + ?Sized,
    D: Delay + ?Sized,
{
    let response = match identity.sign_up(credentials).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "authentication error");
            report(ScreenState::Failed(e.user_message()));
            return None;
        }
    };

    let Some(user) = response.user else {
        tracing::warn!("sign-up returned no user");
        report(ScreenState::Idle);
        return None;
    };

    report(ScreenState::Succeeded(MSG_SETTING_UP.into()));

    let result = provision(store, delay, &user.id, &credentials.email, DEFAULT_MAX_ATTEMPTS).await;
    let message = if result.created {
        MSG_ACCOUNT_CREATED
    } else {
        MSG_AGENT_PENDING
    };
    report(ScreenState::Succeeded(message.into()));

    Some(Redirect::delayed(route::DASHBOARD, SIGN_UP_REDIRECT_DELAY))
}

async fn sign_in<I>(
    identity: &I,
    credentials: &Credentials,
    report: &mut impl FnMut(ScreenState),
) -> Option<Redirect>
where
    I: IdentityProvider + ?Sized,
{
    if let Err(e) = identity.sign_in_with_password(credentials).await {
        tracing::error!(error = %e, "authentication error");
        report(ScreenState::Failed(e.user_message()));
        return None;
    }

    report(ScreenState::Succeeded(MSG_SIGNED_IN.into()));
    Some(Redirect::delayed(route::DASHBOARD, SIGN_IN_REDIRECT_DELAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard;
    use crate::memory::{Fault, MemoryBackend, RecordingDelay};
    use crate::screen::PendingRedirect;

    async fn run(
        backend: &MemoryBackend,
        mode: AuthMode,
        email: &str,
        password: &str,
    ) -> (Option<Redirect>, Vec<ScreenState>) {
        let mut states = Vec::new();
        let redirect = submit(
            backend,
            backend,
            &RecordingDelay::new(),
            mode,
            &Credentials::new(email, password),
            |s| states.push(s),
        )
        .await;
        (redirect, states)
    }

    #[tokio::test]
    async fn test_sign_in_success_schedules_navigation() {
        let backend = MemoryBackend::new();
        backend.add_account("a@b.com", "secret1");

        let (redirect, states) = run(&backend, AuthMode::SignIn, "a@b.com", "secret1").await;

        assert_eq!(
            redirect,
            Some(Redirect::delayed(route::DASHBOARD, SIGN_IN_REDIRECT_DELAY))
        );
        assert_eq!(
            states,
            vec![
                ScreenState::Submitting,
                ScreenState::Succeeded(MSG_SIGNED_IN.into())
            ]
        );
    }

    #[tokio::test]
    async fn test_sign_in_failure_shows_provider_message() {
        let backend = MemoryBackend::new();
        backend.add_account("a@b.com", "secret1");

        let (redirect, states) = run(&backend, AuthMode::SignIn, "a@b.com", "nope").await;

        assert_eq!(redirect, None);
        assert_eq!(
            states.last(),
            Some(&ScreenState::Failed("Invalid login credentials".into()))
        );
    }

    #[tokio::test]
    async fn test_sign_up_failure_halts_before_provisioning() {
        let backend = MemoryBackend::new();
        backend.add_account("a@b.com", "secret1");

        let (redirect, states) = run(&backend, AuthMode::SignUp, "a@b.com", "secret1").await;

        assert_eq!(redirect, None);
        assert_eq!(
            states.last(),
            Some(&ScreenState::Failed("User already registered".into()))
        );
        assert!(backend.agent_insert_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_navigates_even_when_provisioning_fails() {
        let backend = MemoryBackend::new();
        backend.fail_agent_inserts(10);

        let (redirect, states) = run(&backend, AuthMode::SignUp, "a@b.com", "secret1").await;

        assert_eq!(
            redirect,
            Some(Redirect::delayed(route::DASHBOARD, SIGN_UP_REDIRECT_DELAY))
        );
        assert_eq!(
            states.last(),
            Some(&ScreenState::Succeeded(MSG_AGENT_PENDING.into()))
        );
        assert_eq!(backend.agent_insert_attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_sign_up_scenario_reaches_dashboard_with_agent() {
        let backend = MemoryBackend::new();

        let (redirect, states) = run(&backend, AuthMode::SignUp, "a@b.com", "secret1").await;

        assert_eq!(redirect.map(|r| r.to), Some(route::DASHBOARD));
        assert_eq!(
            states,
            vec![
                ScreenState::Submitting,
                ScreenState::Succeeded(MSG_SETTING_UP.into()),
                ScreenState::Succeeded(MSG_ACCOUNT_CREATED.into()),
            ]
        );
        assert!(backend.agent_insert_attempts().len() <= 3);

        let (resolution, _) = dashboard::mount(&backend, &backend, &backend).await;
        let mut dash = dashboard::DashboardState::default();
        assert_eq!(dash.apply_resolution(resolution), None);
        assert_eq!(dash.agent.map(|a| a.name).as_deref(), Some("a's Agent"));
    }

    #[tokio::test]
    async fn test_redirect_dropped_when_screen_left_during_provisioning() {
        let backend = MemoryBackend::new();
        backend.fail_agent_inserts(1);
        let mut pending = PendingRedirect::new();

        let (redirect, _) = run(&backend, AuthMode::SignUp, "a@b.com", "secret1").await;
        assert_eq!(backend.agent_insert_attempts().len(), 2);

        // unmounted before the submission resolved: nothing was scheduled yet
        assert_eq!(pending.dispose(), None);
        let redirect = redirect.unwrap();
        assert!(!pending.schedule(|| Some(redirect)));
        assert_eq!(pending.dispose(), None);
    }

    #[tokio::test]
    async fn test_provider_outage_uses_generic_message() {
        let backend = MemoryBackend::new();
        backend.set_fault(Fault::SignIn, true);

        let (redirect, states) = run(&backend, AuthMode::SignIn, "a@b.com", "secret1").await;

        assert_eq!(redirect, None);
        assert!(matches!(states.last(), Some(ScreenState::Failed(msg)) if msg.contains("unavailable")));
    }

    #[test]
    fn test_form_edits_and_toggle_clear_messages() {
        let mut form = LoginForm::new();
        form.state = ScreenState::Failed("Invalid login credentials".into());

        form.set_email("a@b.com");
        assert_eq!(form.state, ScreenState::Idle);

        form.state = ScreenState::Succeeded("done".into());
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::SignUp);
        assert_eq!(form.state, ScreenState::Idle);
        assert_eq!(form.button_label(), "Create Account");
    }

    #[test]
    fn test_begin_submit_is_exclusive() {
        let mut form = LoginForm::new();
        form.set_email("a@b.com");
        form.set_password("secret1");

        let (mode, creds) = form.begin_submit().unwrap();
        assert_eq!(mode, AuthMode::SignIn);
        assert_eq!(creds, Credentials::new("a@b.com", "secret1"));
        assert_eq!(form.button_label(), "Signing in...");

        assert!(form.begin_submit().is_none());
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::SignIn);
    }
}
