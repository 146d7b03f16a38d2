use std::sync::Arc;

use ktap_shared::{AuthResponse, User};
use parking_lot::RwLock;
use tracing::info;

#[derive(Debug, Default)]
struct Actor {
    token: Option<String>,
    user: Option<User>,
}

/// The current actor, handed to whoever needs it.
///
/// Clones share state. Create one per client (or per test) rather than
/// reaching for a global.
#[derive(Debug, Clone, Default)]
pub struct Session {
    actor: Arc<RwLock<Actor>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session that already holds a token, e.g. restored from storage.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::default();
        session.actor.write().token = Some(token.into());
        session
    }

    pub fn login(&self, auth: AuthResponse) {
        info!(user = %auth.user.username, "logged in");
        let mut actor = self.actor.write();
        actor.token = Some(auth.token);
        actor.user = Some(auth.user);
    }

    /// Fill in the profile once `/auth/me` answers.
    pub fn set_user(&self, user: User) {
        self.actor.write().user = Some(user);
    }

    pub fn logout(&self) {
        let mut actor = self.actor.write();
        actor.token = None;
        actor.user = None;
    }

    pub fn token(&self) -> Option<String> {
        self.actor.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.actor.read().user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.actor.read().token.is_some()
    }

    pub fn is_author(&self, author: &User) -> bool {
        self.actor
            .read()
            .user
            .as_ref()
            .is_some_and(|u| u.id == author.id)
    }

    /// Returns false when nobody is logged in.
    pub fn set_balance(&self, balance: i64) -> bool {
        match self.actor.write().user.as_mut() {
            Some(user) => {
                user.balance = balance;
                true
            }
            None => false,
        }
    }
}
