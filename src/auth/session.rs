use std::sync::{Arc, RwLock};

use crate::api::api_client::ApiClient;
use crate::error::AuthError;
use crate::storage::database::Database;

const KEY_ACCESS: &str = "access_token";
const KEY_REFRESH: &str = "refresh_token";
const KEY_USERNAME: &str = "username";
const KEY_IS_COACH: &str = "is_coach";

/// Something that can hand out the bearer token for write requests.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, for tools and tests that authenticate out of band.
pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub is_coach: bool,
}

struct AuthState {
    access: String,
    refresh: String,
    user: User,
}

pub struct SessionManager {
    api: ApiClient,
    db: Arc<Database>,
    auth: RwLock<Option<AuthState>>,
}

impl SessionManager {
    pub fn new(api: ApiClient, db: Arc<Database>) -> Self {
        let restored = Self::restore_auth(&db);
        Self {
            api,
            db,
            auth: RwLock::new(restored),
        }
    }

    fn restore_auth(db: &Database) -> Option<AuthState> {
        let access = db.get_setting(KEY_ACCESS)?;
        let username = db.get_setting(KEY_USERNAME)?;
        if access.is_empty() || username.is_empty() {
            return None;
        }
        let refresh = db.get_setting(KEY_REFRESH).unwrap_or_default();
        let is_coach = db
            .get_setting(KEY_IS_COACH)
            .map(|v| v == "true")
            .unwrap_or(false);

        log::info!("Restored session for {}", username);
        Some(AuthState {
            access,
            refresh,
            user: User { username, is_coach },
        })
    }

    fn persist_auth(&self, state: &AuthState) -> Result<(), AuthError> {
        self.db.set_setting(KEY_ACCESS, &state.access)?;
        self.db.set_setting(KEY_REFRESH, &state.refresh)?;
        self.db.set_setting(KEY_USERNAME, &state.user.username)?;
        self.db
            .set_setting(KEY_IS_COACH, &state.user.is_coach.to_string())?;
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let resp = match self.api.login(username, password).await {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("Login failed for {}: {}", username, e);
                return Err(e);
            }
        };

        let state = AuthState {
            access: resp.access,
            refresh: resp.refresh,
            user: User {
                username: resp.username,
                is_coach: resp.is_coach,
            },
        };
        self.persist_auth(&state)?;

        let user = state.user.clone();
        if let Ok(mut guard) = self.auth.write() {
            *guard = Some(state);
        }
        log::info!("Logged in as {} (coach: {})", user.username, user.is_coach);
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        for key in [KEY_ACCESS, KEY_REFRESH, KEY_USERNAME, KEY_IS_COACH] {
            self.db.delete_setting(key)?;
        }
        if let Ok(mut guard) = self.auth.write() {
            *guard = None;
        }
        log::info!("Logged out");
        Ok(())
    }

    pub fn user(&self) -> Option<User> {
        self.auth
            .read()
            .ok()?
            .as_ref()
            .map(|state| state.user.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.user().is_some()
    }

    /// Editing is only offered to coaches.
    pub fn can_edit(&self) -> bool {
        self.user().map(|u| u.is_coach).unwrap_or(false)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.auth
            .read()
            .ok()?
            .as_ref()
            .map(|state| state.refresh.clone())
    }
}

impl TokenSource for SessionManager {
    fn access_token(&self) -> Option<String> {
        self.auth
            .read()
            .ok()?
            .as_ref()
            .map(|state| state.access.clone())
    }
}
