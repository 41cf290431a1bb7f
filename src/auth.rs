//! Account session: login, signup, profile, and the locally cached token.
//!
//! The bearer token is persisted to a credentials file under the config
//! directory so a restart keeps the session; the user record itself is
//! always re-fetched from the server.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Transport;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedCredentials {
    pub token: String,
}

/// File-backed token cache, one JSON file under the config dir.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn open_default() -> Result<Self> {
        let mut path = config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        path.push("curio");
        fs::create_dir_all(&path)?;
        path.push("credentials.json");
        Ok(Self { path })
    }

    pub fn load(&self) -> Result<SavedCredentials> {
        if !self.path.exists() {
            return Err(anyhow!("No saved credentials found"));
        }
        let contents = fs::read_to_string(&self.path)?;
        let creds: SavedCredentials = serde_json::from_str(&contents)?;
        Ok(creds)
    }

    pub fn save(&self, creds: &SavedCredentials) -> Result<()> {
        let contents = serde_json::to_string_pretty(creds)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthOutcome {
    pub succeeded: bool,
    pub message: Option<String>,
}

impl AuthOutcome {
    fn ok() -> Self {
        Self {
            succeeded: true,
            message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            succeeded: false,
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

pub struct AuthStore {
    transport: Arc<dyn Transport>,
    credentials: Option<CredentialStore>,
    token: Option<String>,
    user: Option<User>,
}

impl AuthStore {
    /// Restores a previously saved token if one exists. The session only
    /// counts as authenticated once `check` has confirmed the token and
    /// loaded the user record.
    pub fn new(transport: Arc<dyn Transport>, credentials: Option<CredentialStore>) -> Self {
        let token = credentials
            .as_ref()
            .and_then(|store| store.load().ok())
            .map(|c| c.token);
        if token.is_some() {
            transport.set_token(token.clone());
        }
        Self {
            transport,
            credentials,
            token,
            user: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        let body = json!({ "email": email, "password": password });
        match self.transport.post("/auth/login", &[], Some(body)).await {
            Ok(payload) => {
                // Token key depends on backend revision.
                let token = ["accessToken", "token", "jwt"]
                    .iter()
                    .find_map(|key| payload.get(*key).and_then(Value::as_str))
                    .map(str::to_string);
                let user = payload
                    .get("user")
                    .cloned()
                    .and_then(|v| serde_json::from_value::<User>(v).ok());

                let (Some(token), Some(user)) = (token, user) else {
                    return AuthOutcome::failed("email or password does not match".to_string());
                };

                if let Some(store) = &self.credentials {
                    if let Err(e) = store.save(&SavedCredentials {
                        token: token.clone(),
                    }) {
                        tracing::warn!("could not persist credentials: {e}");
                    }
                }
                self.transport.set_token(Some(token.clone()));
                self.token = Some(token);
                self.user = Some(user);
                AuthOutcome::ok()
            }
            Err(err) => AuthOutcome::failed(
                err.server_message().unwrap_or("login failed").to_string(),
            ),
        }
    }

    /// Create an account, then sign straight in with the same credentials.
    pub async fn signup(&mut self, request: &SignupRequest) -> AuthOutcome {
        let body = match serde_json::to_value(request) {
            Ok(body) => body,
            Err(e) => return AuthOutcome::failed(format!("invalid signup request: {e}")),
        };
        match self.transport.post("/auth/signup", &[], Some(body)).await {
            Ok(_) => {
                let login = self.login(&request.email, &request.password).await;
                if login.succeeded {
                    AuthOutcome::ok()
                } else {
                    AuthOutcome::failed(
                        "account created, but automatic sign-in failed".to_string(),
                    )
                }
            }
            Err(err) => AuthOutcome::failed(
                err.server_message().unwrap_or("signup failed").to_string(),
            ),
        }
    }

    /// Confirm the stored token against the server and load the user.
    /// Any failure drops the session.
    pub async fn check(&mut self) -> bool {
        if self.token.is_none() {
            return false;
        }
        self.transport.set_token(self.token.clone());
        match self.transport.get("/user/me", &[]).await {
            Ok(payload) => match serde_json::from_value::<User>(payload) {
                Ok(user) => {
                    self.user = Some(user);
                    true
                }
                Err(_) => {
                    self.logout();
                    false
                }
            },
            Err(_) => {
                self.logout();
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
        self.transport.set_token(None);
        if let Some(store) = &self.credentials {
            if let Err(e) = store.clear() {
                tracing::warn!("could not clear saved credentials: {e}");
            }
        }
    }

    pub async fn update_profile(&mut self, profile: Value) -> AuthOutcome {
        match self.transport.put("/user/me", &[], Some(profile)).await {
            Ok(payload) => {
                if let Ok(user) = serde_json::from_value::<User>(payload) {
                    self.user = Some(user);
                }
                AuthOutcome::ok()
            }
            Err(err) => AuthOutcome::failed(
                err.server_message()
                    .unwrap_or("profile update failed")
                    .to_string(),
            ),
        }
    }

    /// Delete the account, then drop the local session.
    pub async fn withdraw(&mut self) -> AuthOutcome {
        match self.transport.delete("/user/me", &[]).await {
            Ok(_) => {
                self.logout();
                AuthOutcome::ok()
            }
            Err(err) => AuthOutcome::failed(
                err.server_message()
                    .unwrap_or("account deletion failed")
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use serde_json::json;

    fn fresh_store(fake: Arc<FakeTransport>) -> AuthStore {
        // No credentials file: tests never touch the real config dir.
        AuthStore::new(fake, None)
    }

    #[tokio::test]
    async fn login_accepts_any_known_token_key() {
        for key in ["accessToken", "token", "jwt"] {
            let fake = FakeTransport::new();
            let mut auth = fresh_store(fake.clone());

            fake.push_ok(json!({
                key: "tok-123",
                "user": { "id": 1, "nickname": "mira", "email": "m@x.io" }
            }));
            let outcome = auth.login("m@x.io", "pw").await;

            assert!(outcome.succeeded, "key {key} should be accepted");
            assert!(auth.is_authenticated());
            assert_eq!(fake.token().as_deref(), Some("tok-123"));
        }
    }

    #[tokio::test]
    async fn login_without_user_payload_fails() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());

        fake.push_ok(json!({ "accessToken": "tok-123" }));
        let outcome = auth.login("m@x.io", "pw").await;

        assert!(!outcome.succeeded);
        assert!(!auth.is_authenticated());
        assert_eq!(
            outcome.message.as_deref(),
            Some("email or password does not match")
        );
    }

    #[tokio::test]
    async fn login_failure_surfaces_server_message() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());

        fake.push_status(401, Some("account locked"));
        let outcome = auth.login("m@x.io", "pw").await;
        assert_eq!(outcome.message.as_deref(), Some("account locked"));
    }

    #[tokio::test]
    async fn check_failure_drops_session() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());
        auth.token = Some("stale".to_string());

        fake.push_status(401, None);
        assert!(!auth.check().await);
        assert!(!auth.is_authenticated());
        assert_eq!(fake.token(), None);
    }

    #[tokio::test]
    async fn check_success_loads_user() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());
        auth.token = Some("tok".to_string());

        fake.push_ok(json!({ "id": 4, "nickname": "kit", "email": "k@x.io" }));
        assert!(auth.check().await);
        assert!(auth.is_authenticated());
        assert_eq!(auth.user().unwrap().nickname, "kit");
    }

    #[tokio::test]
    async fn signup_auto_logs_in() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());

        fake.push_ok(json!(null)); // signup
        fake.push_ok(json!({
            "accessToken": "tok-9",
            "user": { "id": 9, "nickname": "new", "email": "n@x.io" }
        }));

        let outcome = auth
            .signup(&SignupRequest {
                email: "n@x.io".to_string(),
                password: "pw".to_string(),
                nickname: "new".to_string(),
            })
            .await;

        assert!(outcome.succeeded);
        assert!(auth.is_authenticated());

        let calls = fake.calls();
        assert_eq!(calls[0].path, "/auth/signup");
        assert_eq!(calls[1].path, "/auth/login");
    }

    #[tokio::test]
    async fn update_profile_replaces_cached_user() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());
        auth.token = Some("tok".to_string());
        auth.user = Some(User {
            id: 4,
            nickname: "kit".to_string(),
            email: "k@x.io".to_string(),
        });

        fake.push_ok(json!({ "id": 4, "nickname": "kat", "email": "k@x.io" }));
        let outcome = auth.update_profile(json!({ "nickname": "kat" })).await;

        assert!(outcome.succeeded);
        assert_eq!(auth.user().unwrap().nickname, "kat");
        assert_eq!(fake.calls()[0].path, "/user/me");
    }

    #[tokio::test]
    async fn withdraw_drops_session() {
        let fake = FakeTransport::new();
        let mut auth = fresh_store(fake.clone());
        auth.token = Some("tok".to_string());
        auth.user = Some(User::default());

        fake.push_ok(json!(null));
        let outcome = auth.withdraw().await;

        assert!(outcome.succeeded);
        assert!(!auth.is_authenticated());
        assert_eq!(fake.token(), None);
    }
}
