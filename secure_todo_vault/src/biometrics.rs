//! Secure TODO Vault - Biometric Authentication
//!
//! Wraps the platform biometric / device-credential prompt with a
//! failed-attempt lockout. Lockout is evaluated by comparing wall-clock
//! timestamps; nothing here runs a timer.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::PlatformError;
use crate::sanitize::sanitize_error_message;

/// Platform error code reported when the user dismisses the prompt
pub const USER_CANCEL: &str = "user_cancel";

const CANCELLED_MESSAGE: &str = "Authentication cancelled";
const FAILED_MESSAGE: &str = "Authentication failed. Please try again.";
const SYSTEM_ERROR_PIN_MESSAGE: &str = "Authentication system error. Please use your device PIN.";
const SYSTEM_ERROR_MESSAGE: &str = "Authentication system error. Please try again.";

/// Biometric kind, in descending preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BiometricKind {
    /// Face recognition
    Facial,
    /// Fingerprint
    Fingerprint,
    /// Iris scan
    Iris,
}

impl BiometricKind {
    /// Preference order when several kinds are supported
    pub const PRIORITY: [BiometricKind; 3] = [
        BiometricKind::Facial,
        BiometricKind::Fingerprint,
        BiometricKind::Iris,
    ];
}

/// Request handed to the platform prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt_message: String,
    pub cancel_label: String,
    pub fallback_label: String,
    /// Allow the device PIN / passcode instead of a biometric
    pub allow_device_fallback: bool,
}

/// Outcome reported by the platform prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOutcome {
    pub success: bool,
    /// Platform error code, e.g. [`USER_CANCEL`]
    pub error: Option<String>,
}

impl PromptOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(code.into()),
        }
    }
}

/// Platform biometric capability
#[async_trait]
pub trait BiometricCapability: Send + Sync {
    async fn has_hardware(&self) -> Result<bool, PlatformError>;
    async fn is_enrolled(&self) -> Result<bool, PlatformError>;
    async fn supported_kinds(&self) -> Result<HashSet<BiometricKind>, PlatformError>;
    async fn authenticate(&self, request: &PromptRequest) -> Result<PromptOutcome, PlatformError>;
}

/// Result of a capability probe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BiometricAvailability {
    pub available: bool,
    /// `None` when no usable biometric exists
    pub biometric_type: Option<BiometricKind>,
}

impl BiometricAvailability {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            biometric_type: None,
        }
    }

    pub fn with_kind(kind: BiometricKind) -> Self {
        Self {
            available: true,
            biometric_type: Some(kind),
        }
    }
}

/// Caller overrides for the prompt copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthOptions {
    pub prompt_message: Option<String>,
    pub cancel_label: Option<String>,
    pub fallback_label: Option<String>,
}

/// Authentication result surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    /// User-safe message on failure
    pub error: Option<String>,
}

impl AuthResult {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    /// Lock after this many consecutive failures
    pub max_attempts: u32,
    /// Lockout window (milliseconds)
    pub lockout_duration_ms: u64,
    /// Prompt when a biometric is available
    pub biometric_prompt: String,
    /// Prompt when only the device PIN is available
    pub pin_prompt: String,
    pub cancel_label: String,
    pub fallback_label: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            lockout_duration_ms: 30_000,
            biometric_prompt: "Authenticate to access your TODO list".into(),
            pin_prompt: "Use your device PIN to access your TODO list".into(),
            cancel_label: "Cancel".into(),
            fallback_label: "Use PIN".into(),
        }
    }
}

impl AuthConfig {
    /// Lockout window; values past what `Duration` holds saturate at its maximum
    pub fn lockout_window(&self) -> Duration {
        i64::try_from(self.lockout_duration_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or_else(|| Duration::milliseconds(i64::MAX))
    }
}

/// Lockout state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutState {
    /// Consecutive failed attempts
    pub failed_attempts: u32,
    /// Locked until
    pub locked_until: Option<DateTime<Utc>>,
}

/// Lockout message for the given number of seconds
pub fn lockout_message(seconds: u64) -> String {
    format!(
        "Too many failed attempts. Please wait {} seconds before trying again.",
        seconds
    )
}

/// Whole seconds left, rounded up
fn ceil_seconds(remaining: Duration) -> u64 {
    let millis = remaining.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}

/// Authentication gatekeeper
pub struct AuthGatekeeper {
    platform: Arc<dyn BiometricCapability>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
    state: Mutex<LockoutState>,
}

impl AuthGatekeeper {
    /// Create new gatekeeper
    pub fn new(platform: Arc<dyn BiometricCapability>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        Self {
            platform,
            clock,
            config,
            state: Mutex::new(LockoutState::default()),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Probe hardware, enrollment and supported kinds. Never fails.
    pub async fn check_biometric_availability(&self) -> BiometricAvailability {
        match self.probe_availability().await {
            Ok(availability) => availability,
            Err(e) => {
                log::warn!(
                    "[AuthGatekeeper] biometric availability check failed: {}",
                    sanitize_error_message(&e.to_string())
                );
                BiometricAvailability::unavailable()
            }
        }
    }

    async fn probe_availability(&self) -> Result<BiometricAvailability, PlatformError> {
        if !self.platform.has_hardware().await? || !self.platform.is_enrolled().await? {
            return Ok(BiometricAvailability::unavailable());
        }

        let supported = self.platform.supported_kinds().await?;
        Ok(BiometricKind::PRIORITY
            .into_iter()
            .find(|kind| supported.contains(kind))
            .map(BiometricAvailability::with_kind)
            .unwrap_or_else(BiometricAvailability::unavailable))
    }

    /// Hardware probe; platform errors read as `false`
    pub async fn has_hardware(&self) -> bool {
        self.platform.has_hardware().await.unwrap_or_else(|e| {
            log::warn!("[AuthGatekeeper] hardware check failed: {}", sanitize_error_message(&e.to_string()));
            false
        })
    }

    /// Enrollment probe; platform errors read as `false`
    pub async fn is_enrolled(&self) -> bool {
        self.platform.is_enrolled().await.unwrap_or_else(|e| {
            log::warn!("[AuthGatekeeper] enrollment check failed: {}", sanitize_error_message(&e.to_string()));
            false
        })
    }

    /// Run the platform prompt, subject to the lockout window
    pub async fn authenticate(&self, options: &AuthOptions) -> AuthResult {
        if let Some(remaining) = self.lockout_remaining_secs() {
            return AuthResult::failure(lockout_message(remaining));
        }

        let availability = self.check_biometric_availability().await;
        let request = self.prompt_request(options, availability.available);

        match self.platform.authenticate(&request).await {
            Ok(outcome) if outcome.success => {
                self.reset();
                AuthResult::success()
            }
            Ok(outcome) => self.record_failure(outcome.error.as_deref()),
            Err(e) => {
                log::warn!(
                    "[AuthGatekeeper] authentication error: {}",
                    sanitize_error_message(&e.to_string())
                );
                self.system_error_result().await
            }
        }
    }

    fn prompt_request(&self, options: &AuthOptions, biometric_available: bool) -> PromptRequest {
        fn pick(custom: &Option<String>, default: &str) -> String {
            custom
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        let default_prompt = if biometric_available {
            &self.config.biometric_prompt
        } else {
            &self.config.pin_prompt
        };

        PromptRequest {
            prompt_message: pick(&options.prompt_message, default_prompt),
            cancel_label: pick(&options.cancel_label, &self.config.cancel_label),
            fallback_label: pick(&options.fallback_label, &self.config.fallback_label),
            allow_device_fallback: true,
        }
    }

    fn record_failure(&self, code: Option<&str>) -> AuthResult {
        let mut state = self.state.lock();
        state.failed_attempts += 1;

        if state.failed_attempts >= self.config.max_attempts {
            let window = self.config.lockout_window();
            let until = self
                .clock
                .now()
                .checked_add_signed(window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            state.locked_until = Some(until);
            log::warn!(
                "[AuthGatekeeper] {} failed attempts, locked for {} ms",
                state.failed_attempts,
                self.config.lockout_duration_ms
            );
            return AuthResult::failure(lockout_message(ceil_seconds(window)));
        }

        if code == Some(USER_CANCEL) {
            AuthResult::failure(CANCELLED_MESSAGE)
        } else {
            AuthResult::failure(FAILED_MESSAGE)
        }
    }

    /// The prompt itself broke; counters and lockout stay untouched
    async fn system_error_result(&self) -> AuthResult {
        match self.platform.is_enrolled().await {
            Ok(true) => AuthResult::failure(SYSTEM_ERROR_PIN_MESSAGE),
            Ok(false) => AuthResult::failure(SYSTEM_ERROR_MESSAGE),
            Err(e) => {
                log::warn!(
                    "[AuthGatekeeper] fallback enrollment check failed: {}",
                    sanitize_error_message(&e.to_string())
                );
                AuthResult::failure(SYSTEM_ERROR_MESSAGE)
            }
        }
    }

    fn reset(&self) {
        *self.state.lock() = LockoutState::default();
    }

    /// Seconds left in the lockout window, clearing an elapsed window
    pub fn lockout_remaining_secs(&self) -> Option<u64> {
        let mut state = self.state.lock();
        let until = state.locked_until?;
        let now = self.clock.now();

        if now >= until {
            *state = LockoutState::default();
            log::info!("[AuthGatekeeper] lockout window elapsed");
            return None;
        }

        Some(ceil_seconds(until - now))
    }

    /// Check if locked out
    pub fn is_locked(&self) -> bool {
        self.lockout_remaining_secs().is_some()
    }

    /// Current failed-attempt count
    pub fn failed_attempts(&self) -> u32 {
        self.state.lock().failed_attempts
    }

    /// Snapshot of the lockout state
    pub fn lockout_state(&self) -> LockoutState {
        *self.state.lock()
    }

    /// Carry lockout over from an earlier gatekeeper, e.g. a previous process
    pub fn restore_lockout(&self, restored: LockoutState) {
        *self.state.lock() = restored;
    }
}
