//! Supabase Client
//!
//! Implementation of `IdentityProvider` and `AgentStore` over the project's
//! GoTrue (`/auth/v1`) and PostgREST (`/rest/v1`) endpoints.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use zero_core::{
    error::{ClientError, Result},
    model::{
        Agent, AuthSession, Credentials, InstalledSkill, NewAgent, NewInstalledSkill,
        SignUpResponse, User,
    },
    service::{AgentStore, IdentityProvider},
};

use crate::config::ClientConfig;

/// Ask PostgREST for a single object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST code for "single object requested, zero rows found"
const NO_ROWS_CODE: &str = "PGRST116";

const AGENTS: &str = "agents";
const AGENT_SKILLS: &str = "agent_skills";

/// Error body returned by GoTrue. Field names vary between versions.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// HTTP client for a hosted Supabase project
pub struct SupabaseClient {
    http: reqwest::Client,
    url: String,
    anon_key: String,
    session: RwLock<Option<AuthSession>>,
}

impl SupabaseClient {
    /// Create a client for the project at `url`
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(&ClientConfig::from_env()?))
    }

    /// Current session, if signed in
    pub fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the session, e.g. with one restored from browser storage
    pub fn set_session(&self, session: Option<AuthSession>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Token for table calls: the user's access token, else the anon key
    fn bearer(&self) -> String {
        self.session()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.url)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }

    fn request(&self, method: Method, url: &str, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    fn table_request(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, &self.table_url(table), &self.bearer())
    }

    /// Send a table call. When the access token has expired, refresh the
    /// session once and resend with the new token.
    async fn send_table<F>(&self, method: Method, table: &str, build: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let response = send(build(self.table_request(method.clone(), table))).await?;
        if response.status() != StatusCode::UNAUTHORIZED || !self.can_refresh() {
            return Ok(response);
        }

        tracing::info!(table, "access token rejected, refreshing session");
        if let Err(e) = self.refresh_session().await {
            tracing::warn!(error = %e, "session refresh failed");
            return Ok(response);
        }
        send(build(self.table_request(method, table))).await
    }

    fn can_refresh(&self) -> bool {
        self.session().is_some_and(|s| s.refresh_token.is_some())
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// A rejected refresh token ends the session.
    pub async fn refresh_session(&self) -> Result<AuthSession> {
        let refresh_token = self
            .session()
            .and_then(|s| s.refresh_token)
            .ok_or(ClientError::NotAuthenticated)?;

        let response = send(
            self.request(
                Method::POST,
                &self.auth_url("token?grant_type=refresh_token"),
                &self.anon_key,
            )
            .json(&serde_json::json!({ "refresh_token": refresh_token })),
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            if status.is_client_error() {
                self.set_session(None);
            }
            return Err(auth_error(response).await);
        }

        let session: AuthSession = decode(response).await?;
        self.set_session(Some(session.clone()));
        tracing::debug!(user_id = %session.user.id, "session refreshed");
        Ok(session)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Response> {
        send(self.request(Method::GET, &self.auth_url("user"), access_token)).await
    }

    async fn insert<T: serde::Serialize + Sync>(&self, table: &str, row: &T) -> Result<()> {
        let response = self
            .send_table(Method::POST, table, |r| {
                r.header("Prefer", "return=minimal").json(row)
            })
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(database_error(response).await)
        }
    }
}

async fn send(request: RequestBuilder) -> Result<Response> {
    request
        .send()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Map a failed auth response. 5xx is a transport problem; everything else is
/// a provider message meant for the user.
async fn auth_error(response: Response) -> ClientError {
    let status = response.status();
    if status.is_server_error() {
        return ClientError::Network(format!("auth service returned {status}"));
    }

    let body: AuthErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .msg
        .or(body.error_description)
        .or(body.message)
        .or(body.error)
        .unwrap_or_default();

    ClientError::Auth {
        message,
        code: body.error_code,
    }
}

async fn database_error(response: Response) -> ClientError {
    let status = response.status();
    match response.json::<PostgrestErrorBody>().await {
        Ok(body) => ClientError::Database {
            code: body.code,
            message: body.message.unwrap_or_else(|| status.to_string()),
            details: body.details,
        },
        Err(_) => ClientError::Network(format!("data service returned {status}")),
    }
}

/// GoTrue answers sign-up with a session when auto-confirm is on, and with
/// the bare user (or `{user, session: null}`) when email confirmation is
/// required.
fn parse_sign_up(body: serde_json::Value) -> Result<SignUpResponse> {
    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body)?;
        return Ok(SignUpResponse {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let user = match body.get("user").cloned() {
        Some(serde_json::Value::Null) => return Ok(SignUpResponse::default()),
        Some(user) => user,
        None => body,
    };

    Ok(SignUpResponse {
        user: Some(serde_json::from_value(user)?),
        session: None,
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for SupabaseClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpResponse> {
        let response = send(
            self.request(Method::POST, &self.auth_url("signup"), &self.anon_key)
                .json(credentials),
        )
        .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        let signed_up = parse_sign_up(decode(response).await?)?;
        if signed_up.session.is_some() {
            self.set_session(signed_up.session.clone());
        }
        tracing::debug!(confirmed = signed_up.session.is_some(), "signed up");
        Ok(signed_up)
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession> {
        let response = send(
            self.request(
                Method::POST,
                &self.auth_url("token?grant_type=password"),
                &self.anon_key,
            )
            .json(credentials),
        )
        .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        let session: AuthSession = decode(response).await?;
        self.set_session(Some(session.clone()));
        tracing::debug!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        self.set_session(None);

        let response = send(self.request(
            Method::POST,
            &self.auth_url("logout"),
            &session.access_token,
        ))
        .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(auth_error(response).await),
        }
    }

    async fn get_user(&self) -> Result<Option<User>> {
        let Some(session) = self.session() else {
            return Ok(None);
        };

        let mut response = self.fetch_user(&session.access_token).await?;

        if response.status() == StatusCode::UNAUTHORIZED && session.refresh_token.is_some() {
            match self.refresh_session().await {
                Ok(refreshed) => response = self.fetch_user(&refreshed.access_token).await?,
                Err(e) => tracing::info!(error = %e, "session refresh failed"),
            }
        }

        match response.status() {
            s if s.is_success() => Ok(Some(decode(response).await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::info!("stored session rejected, clearing it");
                self.set_session(None);
                Ok(None)
            }
            _ => Err(auth_error(response).await),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AgentStore for SupabaseClient {
    async fn insert_agent(&self, agent: &NewAgent) -> Result<()> {
        self.insert(AGENTS, agent).await
    }

    async fn agent_for_user(&self, user_id: &str) -> Result<Option<Agent>> {
        let query = [("user_id", format!("eq.{user_id}")), ("select", "*".into())];
        let response = self
            .send_table(Method::GET, AGENTS, |r| {
                r.query(&query).header(ACCEPT, SINGLE_OBJECT)
            })
            .await?;

        if response.status().is_success() {
            return Ok(Some(decode(response).await?));
        }

        match database_error(response).await {
            ClientError::Database { code: Some(code), .. } if code == NO_ROWS_CODE => Ok(None),
            err => Err(err),
        }
    }

    async fn installed_skills(&self, agent_id: &str) -> Result<Vec<InstalledSkill>> {
        let query = [
            ("agent_id", format!("eq.{agent_id}")),
            ("select", "*".into()),
            ("order", "installed_at.desc".into()),
        ];
        let response = self
            .send_table(Method::GET, AGENT_SKILLS, |r| r.query(&query))
            .await?;

        if response.status().is_success() {
            decode(response).await
        } else {
            Err(database_error(response).await)
        }
    }

    async fn install_skill(&self, skill: &NewInstalledSkill) -> Result<()> {
        self.insert(AGENT_SKILLS, skill).await
    }

    async fn uninstall_skill(&self, installed_id: &str) -> Result<()> {
        let query = [("id", format!("eq.{installed_id}"))];
        let response = self
            .send_table(Method::DELETE, AGENT_SKILLS, |r| r.query(&query))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(database_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn session_body(token: &str) -> String {
        json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "user": { "id": "u-1", "email": "a@b.com", "aud": "authenticated" }
        })
        .to_string()
    }

    async fn signed_in(server: &mut mockito::ServerGuard) -> SupabaseClient {
        let _mock = server
            .mock("POST", Matcher::Regex("^/auth/v1/token".into()))
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .with_status(200)
            .with_body(session_body("tok-1"))
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        client
            .sign_in_with_password(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_and_authorizes_user_lookup() {
        let mut server = mockito::Server::new_async().await;
        let client = signed_in(&mut server).await;
        assert_eq!(client.session().map(|s| s.access_token).as_deref(), Some("tok-1"));

        let user_mock = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer tok-1")
            .match_header("apikey", "anon")
            .with_status(200)
            .with_body(json!({ "id": "u-1", "email": "a@b.com" }).to_string())
            .create_async()
            .await;

        let user = client.get_user().await.unwrap().unwrap();
        assert_eq!(user.id, "u-1");
        user_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sign_in_failure_carries_provider_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex("^/auth/v1/token".into()))
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(
                json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })
                    .to_string(),
            )
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        let err = client
            .sign_in_with_password(&Credentials::new("a@b.com", "nope"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Invalid login credentials");
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_weak_password_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/signup")
            .with_status(422)
            .with_body(
                json!({
                    "code": 422,
                    "error_code": "weak_password",
                    "msg": "Password should be at least 6 characters."
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        let err = client
            .sign_up(&Credentials::new("a@b.com", "123"))
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            ClientError::Auth { code: Some(code), .. } if code == "weak_password"
        ));
        assert_eq!(err.to_string(), "Password should be at least 6 characters.");
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation_returns_user_only() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/signup")
            .with_status(200)
            .with_body(json!({ "id": "u-2", "email": "a@b.com", "confirmation_sent_at": "2024-05-01T10:00:00Z" }).to_string())
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        let response = client
            .sign_up(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(response.user.map(|u| u.id).as_deref(), Some("u-2"));
        assert!(response.session.is_none());
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_agent_insert_is_detected() {
        let mut server = mockito::Server::new_async().await;
        let client = signed_in(&mut server).await;

        let mock = server
            .mock("POST", "/rest/v1/agents")
            .match_header("authorization", "Bearer tok-1")
            .match_header("prefer", "return=minimal")
            .match_body(Matcher::PartialJson(json!({ "user_id": "u-1", "name": "a's Agent" })))
            .with_status(409)
            .with_body(
                json!({
                    "code": "23505",
                    "details": "Key (user_id)=(u-1) already exists.",
                    "hint": null,
                    "message": "duplicate key value violates unique constraint \"agents_user_id_key\""
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = client
            .insert_agent(&NewAgent {
                user_id: "u-1".into(),
                agent_id: "AGENT_1_ABCDEFGH".into(),
                name: "a's Agent".into(),
            })
            .await
            .unwrap_err();

        assert!(err.is_duplicate_key());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_agent_row_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Regex("^/rest/v1/agents".into()))
            .match_query(Matcher::UrlEncoded("user_id".into(), "eq.u-1".into()))
            .match_header("accept", SINGLE_OBJECT)
            .with_status(406)
            .with_body(
                json!({
                    "code": "PGRST116",
                    "details": "The result contains 0 rows",
                    "hint": null,
                    "message": "JSON object requested, multiple (or no) rows returned"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        assert_eq!(client.agent_for_user("u-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_installed_skills_are_requested_newest_first() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/rest/v1/agent_skills".into()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("agent_id".into(), "eq.ag-1".into()),
                Matcher::UrlEncoded("order".into(), "installed_at.desc".into()),
            ]))
            .with_status(200)
            .with_body(
                json!([
                    { "id": "r-2", "skill_id": "email", "skill_name": "Email Digest",
                      "installed_at": "2024-05-02T00:00:00+00:00", "agent_id": "ag-1" },
                    { "id": "r-1", "skill_id": "web-search", "skill_name": "Web Search",
                      "installed_at": "2024-05-01T00:00:00+00:00", "agent_id": "ag-1" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        let rows = client.installed_skills("ag-1").await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].skill_id, "email");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_uninstall_deletes_by_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", Matcher::Regex("^/rest/v1/agent_skills".into()))
            .match_query(Matcher::UrlEncoded("id".into(), "eq.r-1".into()))
            .with_status(204)
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        client.uninstall_skill("r-1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_without_session_skips_request() {
        let client = SupabaseClient::new("http://127.0.0.1:9", "anon");
        assert_eq!(client.get_user().await.unwrap(), None);
    }

    async fn mock_refresh(server: &mut mockito::ServerGuard, status: usize, body: String) -> mockito::Mock {
        server
            .mock("POST", Matcher::Regex("^/auth/v1/token".into()))
            .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .match_body(Matcher::PartialJson(json!({ "refresh_token": "refresh" })))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_rejected_session_is_cleared() {
        let mut server = mockito::Server::new_async().await;
        let client = signed_in(&mut server).await;
        let _user = server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .with_body(json!({ "msg": "invalid JWT" }).to_string())
            .create_async()
            .await;
        let refresh = mock_refresh(
            &mut server,
            400,
            json!({ "error": "invalid_grant", "error_description": "Invalid Refresh Token" }).to_string(),
        )
        .await;

        assert_eq!(client.get_user().await.unwrap(), None);
        assert!(client.session().is_none());
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_for_user_lookup() {
        let mut server = mockito::Server::new_async().await;
        let client = signed_in(&mut server).await;
        let _expired = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer tok-1")
            .with_status(401)
            .with_body(json!({ "msg": "JWT expired" }).to_string())
            .create_async()
            .await;
        let _fresh = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer tok-2")
            .with_status(200)
            .with_body(json!({ "id": "u-1", "email": "a@b.com" }).to_string())
            .create_async()
            .await;
        let _refresh = mock_refresh(&mut server, 200, session_body("tok-2")).await;

        let user = client.get_user().await.unwrap().unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(client.session().map(|s| s.access_token).as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_for_table_calls() {
        let mut server = mockito::Server::new_async().await;
        let client = signed_in(&mut server).await;
        let expired = server
            .mock("POST", "/rest/v1/agent_skills")
            .match_header("authorization", "Bearer tok-1")
            .with_status(401)
            .with_body(json!({ "code": "PGRST301", "message": "JWT expired" }).to_string())
            .create_async()
            .await;
        let fresh = server
            .mock("POST", "/rest/v1/agent_skills")
            .match_header("authorization", "Bearer tok-2")
            .match_body(Matcher::PartialJson(json!({ "skill_id": "web-search" })))
            .with_status(201)
            .create_async()
            .await;
        let refresh = mock_refresh(&mut server, 200, session_body("tok-2")).await;

        client
            .install_skill(&NewInstalledSkill {
                agent_id: "ag-1".into(),
                skill_id: "web-search".into(),
                skill_name: "Web Search".into(),
            })
            .await
            .unwrap();

        expired.assert_async().await;
        refresh.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_token_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", Matcher::Regex("^/rest/v1/agent_skills".into()))
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(json!({ "code": "PGRST301", "message": "JWT expired" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "anon");
        let err = client.uninstall_skill("r-1").await.unwrap_err();

        assert!(matches!(err, ClientError::Database { .. }));
        mock.assert_async().await;
    }

    #[test]
    fn test_sign_up_with_null_user() {
        let parsed = parse_sign_up(json!({ "user": null, "session": null })).unwrap();
        assert_eq!(parsed, SignUpResponse::default());
    }
}
