//! Secure TODO Vault - Authentication Session Store
//!
//! Keeps its own failed-attempt count, driven by login outcomes. The
//! gatekeeper's counter remains the one that decides lockout; this one only
//! feeds [`AuthSessionStore::should_timeout`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::biometrics::{AuthGatekeeper, AuthOptions};
use crate::clock::Clock;
use crate::models::AuthSession;

/// Observable store state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSessionState {
    pub session: AuthSession,
    pub is_loading: bool,
    /// User-safe message from the last failed login
    pub last_error: Option<String>,
}

/// Authentication session store
pub struct AuthSessionStore {
    gatekeeper: Arc<AuthGatekeeper>,
    clock: Arc<dyn Clock>,
    state: RwLock<AuthSessionState>,
}

impl AuthSessionStore {
    pub fn new(gatekeeper: Arc<AuthGatekeeper>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gatekeeper,
            clock,
            state: RwLock::new(AuthSessionState::default()),
        }
    }

    /// Authenticate with default prompt copy
    pub async fn login(&self) -> bool {
        self.login_with(&AuthOptions::default()).await
    }

    /// Authenticate; returns whether the session is now authenticated
    pub async fn login_with(&self, options: &AuthOptions) -> bool {
        self.state.write().is_loading = true;

        let result = self.gatekeeper.authenticate(options).await;
        let now = self.clock.now();

        let mut state = self.state.write();
        state.is_loading = false;
        state.session.last_auth_time = Some(now);

        if result.success {
            state.session.is_authenticated = true;
            state.session.failed_attempts = 0;
            state.last_error = None;
            true
        } else {
            state.session.failed_attempts += 1;
            state.last_error = result.error;
            false
        }
    }

    /// Drop the session
    pub fn logout(&self) {
        let mut state = self.state.write();
        state.session = AuthSession::default();
        state.last_error = None;
    }

    pub fn check_auth_status(&self) -> bool {
        self.state.read().session.is_authenticated
    }

    pub fn increment_failed_attempts(&self) {
        self.state.write().session.failed_attempts += 1;
    }

    pub fn reset_failed_attempts(&self) {
        self.state.write().session.failed_attempts = 0;
    }

    /// Too many recent failures: at least `max_attempts` and the last one
    /// within the lockout window (or never timestamped)
    pub fn should_timeout(&self) -> bool {
        let config = self.gatekeeper.config();
        let state = self.state.read();
        let session = &state.session;

        if session.failed_attempts < config.max_attempts {
            return false;
        }

        match session.last_auth_time {
            None => true,
            Some(last) => {
                self.clock.now() - last < config.lockout_window()
            }
        }
    }

    /// Seconds left in the gatekeeper's lockout, for countdown display
    pub fn lockout_remaining_secs(&self) -> Option<u64> {
        self.gatekeeper.lockout_remaining_secs()
    }

    pub fn session(&self) -> AuthSession {
        self.state.read().session.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }
}
