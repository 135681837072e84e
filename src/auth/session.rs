use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::models::{SessionSnapshot, User, UserPatch};
use crate::error::{AppError, AuthError};
use crate::storage::{self, KeyValueStore, TOKEN_KEY, USER_KEY};
use crate::Result;

/// Mock session store. Credentials are never verified: the single stored
/// user record is the whole "account database".
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    user: Option<User>,
    logged_in: bool,
}

impl SessionStore {
    /// Opens the store and loads whatever session is on disk.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut store = Self {
            storage,
            user: None,
            logged_in: false,
        };
        store.load_user()?;
        Ok(store)
    }

    pub fn register(&mut self, email: &str, password: &str, name: Option<&str>) -> Result<(User, String)> {
        validate_credentials(email, password)?;

        let name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        let user = User::new(email.trim().to_string(), name);
        storage::save(self.storage.as_ref(), USER_KEY, &user)?;
        let token = self.issue_token()?;

        info!(user_id = %user.id, "Registered user {}", user.email);
        self.user = Some(user.clone());
        self.logged_in = true;
        Ok((user, token))
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<(User, String)> {
        validate_credentials(email, password)?;
        let email = email.trim();

        let user = match storage::load::<User>(self.storage.as_ref(), USER_KEY)? {
            Some(existing) if existing.email != email => {
                warn!("Login rejected for {}: does not match stored account", email);
                return Err(AuthError::InvalidCredentials.into());
            }
            Some(existing) => existing,
            None => {
                let user = User::new(email.to_string(), None);
                storage::save(self.storage.as_ref(), USER_KEY, &user)?;
                info!(user_id = %user.id, "Created account on first login for {}", email);
                user
            }
        };

        let token = self.issue_token()?;
        info!(user_id = %user.id, "Login successful for {}", user.email);
        self.user = Some(user.clone());
        self.logged_in = true;
        Ok((user, token))
    }

    /// Drops the session token. The user record stays on disk.
    pub fn logout(&mut self) -> Result<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.user = None;
        self.logged_in = false;
        info!("Logged out");
        Ok(())
    }

    pub fn update_user(&mut self, mut patch: UserPatch) -> Result<Option<User>> {
        patch.validate()?;
        if let Some(email) = patch.email.as_mut() {
            *email = email.trim().to_string();
        }

        let mut user = match storage::load::<User>(self.storage.as_ref(), USER_KEY)? {
            Some(user) => user,
            None => return Ok(None),
        };

        user.apply(patch);
        storage::save(self.storage.as_ref(), USER_KEY, &user)?;
        self.user = Some(user.clone());
        Ok(Some(user))
    }

    pub fn load_user(&mut self) -> Result<SessionSnapshot> {
        self.logged_in = self.storage.get(TOKEN_KEY)?.is_some();
        self.user = storage::load(self.storage.as_ref(), USER_KEY)?;
        Ok(self.snapshot())
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The logged-in user, or `NotLoggedIn`.
    pub fn require_user(&self) -> Result<&User> {
        match (&self.user, self.logged_in) {
            (Some(user), true) => Ok(user),
            _ => Err(AuthError::NotLoggedIn.into()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            is_logged_in: self.logged_in,
        }
    }

    fn issue_token(&self) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        self.storage.set(TOKEN_KEY, &token)?;
        Ok(token)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError("A valid email address is required".into()));
    }
    if password.is_empty() {
        return Err(AppError::ValidationError("Password must not be empty".into()));
    }
    Ok(())
}
