use std::fmt::Debug;
use std::sync::RwLock;
use tracing::{debug, error};

/// Read access to the signed-in identity.
///
/// Components depend on this instead of reading cookies or local storage, so
/// tests can substitute their own identity.
pub trait Session: Debug + Send + Sync {
    fn token(&self) -> Option<String>;

    fn current_user_id(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.current_user_id().is_some()
    }
}

/// A session that can also be written by the auth screens
pub trait SessionStore: Session {
    fn sign_in(&self, token: String, user_id: String);

    fn sign_out(&self);

    /// Replaces the token when the server hands out a fresh one
    fn refresh_token(&self, token: String);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Identity {
    token: Option<String>,
    user_id: Option<String>,
}

/// Process-local session, the stand-in for the browser's cookie and storage
#[derive(Debug, Default)]
pub struct MemorySession {
    identity: RwLock<Identity>,
}

impl MemorySession {
    pub fn new() -> Self {
        MemorySession::default()
    }

    pub fn signed_in(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        MemorySession {
            identity: RwLock::new(Identity {
                token: Some(token.into()),
                user_id: Some(user_id.into()),
            }),
        }
    }

    fn read(&self) -> Identity {
        match self.identity.read() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                error!("Failed to acquire read lock for session: {}", e);
                Identity::default()
            }
        }
    }

    fn write(&self, update: impl FnOnce(&mut Identity)) {
        match self.identity.write() {
            Ok(mut guard) => update(&mut guard),
            Err(e) => error!("Failed to acquire write lock for session: {}", e),
        }
    }
}

impl Session for MemorySession {
    fn token(&self) -> Option<String> {
        self.read().token
    }

    fn current_user_id(&self) -> Option<String> {
        self.read().user_id
    }
}

impl SessionStore for MemorySession {
    fn sign_in(&self, token: String, user_id: String) {
        debug!("Signing in user {}", user_id);
        self.write(|identity| {
            identity.token = Some(token);
            identity.user_id = Some(user_id);
        });
    }

    fn sign_out(&self) {
        self.write(|identity| *identity = Identity::default());
    }

    fn refresh_token(&self, token: String) {
        self.write(|identity| identity.token = Some(token));
    }
}
