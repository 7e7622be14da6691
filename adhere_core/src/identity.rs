//! User directory and session identity.
//!
//! The user directory is a flat array under the `users` key (passwords are
//! stored alongside, faithful to the original system's mock directory). The
//! active session lives under `current_user` with the password stripped.

use crate::repo::{generate_id, Collection, Record};
use crate::storage::Backend;
use crate::{Error, Result, StoredUser, User, UserRole};
use std::sync::Arc;

const USERS_KEY: &str = "users";
const CURRENT_USER_KEY: &str = "current_user";

impl Record for StoredUser {
    fn id(&self) -> &str {
        &self.user.id
    }
}

/// Partial profile update (shallow merge into the session user)
#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub contact: Option<String>,
    pub emergency_contact: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

/// Manages user records and session identity
pub struct IdentityStore {
    backend: Arc<dyn Backend>,
}

impl IdentityStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn directory(&self) -> Collection<StoredUser> {
        Collection::new(USERS_KEY)
    }

    /// Create a new account and open a session for it.
    ///
    /// The email is trimmed and lowercased before the duplicate check, so
    /// `Alice@Example.com` and `alice@example.com ` are the same account.
    pub fn signup(&self, email: &str, password: &str, name: &str, role: UserRole) -> Result<User> {
        let normalized_email = email.trim().to_lowercase();
        tracing::debug!("Signing up {}", normalized_email);

        let directory = self.directory();
        let mut users = directory.load(self.backend.as_ref());

        if users.iter().any(|u| u.user.email == normalized_email) {
            return Err(Error::Auth("User already exists".into()));
        }

        let user = User {
            id: generate_id("user"),
            email: normalized_email,
            name: name.to_string(),
            role,
            age: None,
            contact: None,
            emergency_contact: None,
            timezone: std::env::var("TZ").ok(),
            language: Some("en".into()),
        };

        users.push(StoredUser {
            user: user.clone(),
            password: password.to_string(),
        });
        directory.store(self.backend.as_ref(), &users)?;

        self.set_current_user(&user)?;
        tracing::info!("Created user {}", user.email);
        Ok(user)
    }

    /// Authenticate against the directory and open a session
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let normalized_email = email.trim().to_lowercase();
        tracing::debug!("Attempting login for {}", normalized_email);

        let users = self.directory().load(self.backend.as_ref());
        let found = users
            .iter()
            .find(|u| u.user.email == normalized_email)
            .ok_or_else(|| Error::Auth("Email not found".into()))?;

        if found.password != password {
            return Err(Error::Auth("Incorrect password".into()));
        }

        self.set_current_user(&found.user)?;
        tracing::info!("Login successful for {}", found.user.email);
        Ok(found.user.clone())
    }

    /// Close the current session
    pub fn logout(&self) -> Result<()> {
        self.backend.remove(CURRENT_USER_KEY)
    }

    /// The active session user, if any.
    ///
    /// An unparseable session record is treated as logged out.
    pub fn current_user(&self) -> Option<User> {
        let raw = self.backend.read(CURRENT_USER_KEY).ok().flatten()?;
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Failed to parse session user: {}. Treating as logged out.", e);
                None
            }
        }
    }

    /// Apply a partial profile update to the session user and the directory
    pub fn update_profile(&self, patch: ProfilePatch) -> Result<User> {
        let mut user = self
            .current_user()
            .ok_or_else(|| Error::Auth("Not logged in".into()))?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(age) = patch.age {
            user.age = Some(age);
        }
        if let Some(contact) = patch.contact {
            user.contact = Some(contact);
        }
        if let Some(emergency_contact) = patch.emergency_contact {
            user.emergency_contact = Some(emergency_contact);
        }
        if let Some(timezone) = patch.timezone {
            user.timezone = Some(timezone);
        }
        if let Some(language) = patch.language {
            user.language = Some(language);
        }

        self.set_current_user(&user)?;

        let directory = self.directory();
        directory.update_by_id(self.backend.as_ref(), &user.id, |stored| {
            stored.user = user.clone();
        })?;

        Ok(user)
    }

    fn set_current_user(&self, user: &User) -> Result<()> {
        let contents = serde_json::to_string(user)?;
        self.backend.write(CURRENT_USER_KEY, &contents)
    }
}
