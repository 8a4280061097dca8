//! Aggregate configuration.
//!
//! Every section has defaults, so a partial document is enough:
//!
//! ```json
//! { "session": { "ttl_secs": 3600 }, "max_sessions_per_user": 5 }
//! ```
//!
//! Fields missing from the document keep their defaults. Loading the
//! document from a file, the environment or a CLI is left to the caller.

use serde::{Deserialize, Serialize};
use warden_reconnect::ReconnectConfig;
use warden_session::{GuardConfig, SessionConfig};

use crate::WardenError;

/// Top-level Warden settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub session: SessionConfig,
    pub reconnect: ReconnectConfig,
    pub guard: GuardConfig,
    /// A login is refused once the user holds this many live sessions.
    ///
    /// Default: 3.
    pub max_sessions_per_user: usize,
    /// Header checked first when resolving the client address. Set by a
    /// trusted edge proxy.
    ///
    /// Default: `p9s-user-ip`.
    pub client_ip_header: String,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            reconnect: ReconnectConfig::default(),
            guard: GuardConfig::default(),
            max_sessions_per_user: 3,
            client_ip_header: "p9s-user-ip".to_string(),
        }
    }
}

impl WardenConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    /// [`WardenError::Config`] if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(document: &str) -> Result<Self, WardenError> {
        let config: Self = serde_json::from_str(document)?;
        Ok(config.validated())
    }

    /// Clamps values that would make no sense at runtime.
    pub fn validated(mut self) -> Self {
        self.reconnect = self.reconnect.validated();
        self.max_sessions_per_user = self.max_sessions_per_user.max(1);
        self.client_ip_header = self.client_ip_header.to_ascii_lowercase();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_carries_documented_constants() {
        let config = WardenConfig::default();

        assert_eq!(config.session.ttl_secs, 7200);
        assert_eq!(config.reconnect.base_delay_ms, 50);
        assert_eq!(config.reconnect.max_delay_ms, 30_000);
        assert_eq!(config.reconnect.jitter_ceiling_ms, 200);
        assert_eq!(config.reconnect.alert_every, 5);
        assert!(config.guard.require_primary);
        assert_eq!(config.max_sessions_per_user, 3);
        assert_eq!(config.client_ip_header, "p9s-user-ip");
    }

    #[test]
    fn test_from_json_empty_object_is_default() {
        let config = WardenConfig::from_json("{}").unwrap();
        assert_eq!(config, WardenConfig::default());
    }

    #[test]
    fn test_from_json_partial_overrides() {
        let config = WardenConfig::from_json(
            r#"{ "max_sessions_per_user": 5, "guard": { "require_primary": false } }"#,
        )
        .unwrap();

        assert_eq!(config.max_sessions_per_user, 5);
        assert!(!config.guard.require_primary);
        assert_eq!(config.session.ttl_secs, 7200);
    }

    #[test]
    fn test_from_json_clamps_zero_session_limit() {
        let config = WardenConfig::from_json(r#"{ "max_sessions_per_user": 0 }"#).unwrap();
        assert_eq!(config.max_sessions_per_user, 1);
    }

    #[test]
    fn test_from_json_lowercases_ip_header() {
        let config = WardenConfig::from_json(r#"{ "client_ip_header": "X-Client-IP" }"#).unwrap();
        assert_eq!(config.client_ip_header, "x-client-ip");
    }

    #[test]
    fn test_from_json_wrong_type_is_config_error() {
        let err = WardenConfig::from_json(r#"{ "max_sessions_per_user": "many" }"#).unwrap_err();
        assert!(matches!(err, WardenError::Config(_)));
    }
}
