//! User identity resolution for session sync.
//!
//! The chat client never manages credentials itself; it asks an
//! [`IdentityProvider`] who is signed in and keys remote documents by the
//! returned `user_id`.

pub const USER_ID_ENV_VAR: &str = "PLUME_USER_ID";
pub const USER_NAME_ENV_VAR: &str = "PLUME_USER_NAME";
pub const USER_EMAIL_ENV_VAR: &str = "PLUME_USER_EMAIL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl UserIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
        }
    }

    /// Name to greet the user with; falls back to the stable id.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

pub trait IdentityProvider {
    /// Returns the signed-in user, or `None` when the session is anonymous.
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Reads the identity from `PLUME_USER_ID` and friends. An unset or blank
/// user id means anonymous; conversations then stay local-only.
#[derive(Debug, Default)]
pub struct EnvIdentityProvider;

impl IdentityProvider for EnvIdentityProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        let user_id = non_blank_env(USER_ID_ENV_VAR)?;
        Some(UserIdentity {
            user_id,
            display_name: non_blank_env(USER_NAME_ENV_VAR),
            email: non_blank_env(USER_EMAIL_ENV_VAR),
        })
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fixed identity for tests.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    identity: Option<UserIdentity>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn signed_in(identity: UserIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        self.identity.clone()
    }
}
