//! Read-only configuration surface of the authority.
//! Values may come from embedding code, a deserialized config file, or the
//! process environment via [`Config::from_env`].

use crate::model::UserStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the default authentication driver. When unset (or naming an
    /// absent driver) the most recently registered driver is used.
    pub auth_driver: Option<String>,
    /// Access-token lifetime in seconds.
    pub access_token_ttl: u64,
    /// Status assigned to newly created non-sentinel users.
    pub new_user_status: UserStatus,
    /// Roles attached to newly created non-sentinel users.
    pub new_user_roles: Vec<String>,
    pub signup_enabled: bool,
    pub signup_confirmation_required: bool,
    pub signup_admins_notification_enabled: bool,
    pub user_status_change_notification_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_driver: None,
            access_token_ttl: 86_400,
            new_user_status: UserStatus::Waiting,
            new_user_roles: vec!["user".to_string()],
            signup_enabled: false,
            signup_confirmation_required: true,
            signup_admins_notification_enabled: true,
            user_status_change_notification_enabled: true,
        }
    }
}

impl Config {
    /// Overlay defaults with `AUTHORIUM_*` environment variables.
    /// Unparsable values are ignored rather than fatal.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("AUTHORIUM_AUTH_DRIVER") {
            if !v.is_empty() {
                cfg.auth_driver = Some(v);
            }
        }
        if let Ok(v) = std::env::var("AUTHORIUM_ACCESS_TOKEN_TTL") {
            if let Ok(secs) = v.parse::<u64>() {
                cfg.access_token_ttl = secs;
            }
        }
        if let Ok(v) = std::env::var("AUTHORIUM_NEW_USER_STATUS") {
            match v.as_str() {
                "active" => cfg.new_user_status = UserStatus::Active,
                "waiting" => cfg.new_user_status = UserStatus::Waiting,
                "disabled" => cfg.new_user_status = UserStatus::Disabled,
                _ => {}
            }
        }
        if let Ok(v) = std::env::var("AUTHORIUM_NEW_USER_ROLES") {
            let roles: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !roles.is_empty() {
                cfg.new_user_roles = roles;
            }
        }
        if let Ok(v) = std::env::var("AUTHORIUM_SIGNUP_ENABLED") {
            cfg.signup_enabled = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("AUTHORIUM_SIGNUP_CONFIRMATION_REQUIRED") {
            cfg.signup_confirmation_required = v == "1" || v.eq_ignore_ascii_case("true");
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.access_token_ttl, 86_400);
        assert_eq!(cfg.new_user_status, UserStatus::Waiting);
        assert_eq!(cfg.new_user_roles, vec!["user".to_string()]);
        assert!(!cfg.signup_enabled);
        assert!(cfg.signup_confirmation_required);
    }

    #[test]
    fn deserializes_with_partial_input() {
        let cfg: Config =
            serde_json::from_str(r#"{"signup_enabled": true, "access_token_ttl": 60}"#).unwrap();
        assert!(cfg.signup_enabled);
        assert_eq!(cfg.access_token_ttl, 60);
        assert_eq!(cfg.new_user_status, UserStatus::Waiting);
    }
}
