//! Unified error model for the authority and its drivers.
//! One closed taxonomy is shared by the API surface, the driver contracts
//! and the token store, so callers can match on kinds instead of strings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthError {
    /// No driver of the required kind has been registered yet.
    NoDriverRegistered { message: String },
    /// A driver was requested by name but no such driver is registered.
    DriverNotRegistered { message: String },
    /// A second registration attempt for a set-once driver slot.
    DriverRegistered { message: String },
    UserNotFound,
    RoleNotFound { name: String },
    UserExists { login: String },
    RoleAlreadyExists { name: String },
    /// Login failed format/validation rules; carries the rule violation.
    UserCreateError { message: String },
    UserNotActive,
    UserNotConfirmed,
    /// Driver-reported credential failure.
    Authentication { message: String },
    /// Driver-reported registration failure.
    SignUp { message: String },
    /// Token absent, expired or revoked. Deliberately carries no detail.
    InvalidAccessToken,
    SignupDisabled,
    /// Sentinel users cannot be saved.
    UserModifyForbidden { message: String },
    /// Referential-integrity guard on user deletion.
    UserDeleteForbidden { message: String },
    /// Referential-integrity guard on role deletion.
    RoleDeleteForbidden { message: String },
    /// A lifecycle event listener failed; the firing operation is aborted.
    Listener { event: String, message: String },
    /// Storage-driver I/O failure, propagated unchanged.
    Storage { message: String },
}

impl AuthError {
    pub fn no_driver<S: Into<String>>(msg: S) -> Self {
        AuthError::NoDriverRegistered { message: msg.into() }
    }
    pub fn driver_not_registered<S: Into<String>>(msg: S) -> Self {
        AuthError::DriverNotRegistered { message: msg.into() }
    }
    pub fn driver_registered<S: Into<String>>(msg: S) -> Self {
        AuthError::DriverRegistered { message: msg.into() }
    }
    pub fn role_not_found<S: Into<String>>(name: S) -> Self {
        AuthError::RoleNotFound { name: name.into() }
    }
    pub fn user_exists<S: Into<String>>(login: S) -> Self {
        AuthError::UserExists { login: login.into() }
    }
    pub fn role_exists<S: Into<String>>(name: S) -> Self {
        AuthError::RoleAlreadyExists { name: name.into() }
    }
    pub fn user_create<S: Into<String>>(msg: S) -> Self {
        AuthError::UserCreateError { message: msg.into() }
    }
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        AuthError::Authentication { message: msg.into() }
    }
    pub fn sign_up<S: Into<String>>(msg: S) -> Self {
        AuthError::SignUp { message: msg.into() }
    }
    pub fn user_modify_forbidden<S: Into<String>>(msg: S) -> Self {
        AuthError::UserModifyForbidden { message: msg.into() }
    }
    pub fn user_delete_forbidden<S: Into<String>>(msg: S) -> Self {
        AuthError::UserDeleteForbidden { message: msg.into() }
    }
    pub fn role_delete_forbidden<S: Into<String>>(msg: S) -> Self {
        AuthError::RoleDeleteForbidden { message: msg.into() }
    }
    pub fn listener<S: Into<String>>(event: S, err: &anyhow::Error) -> Self {
        AuthError::Listener { event: event.into(), message: err.to_string() }
    }
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        AuthError::Storage { message: msg.into() }
    }

    /// True for the lookup-miss kinds callers routinely handle
    /// ("create if not found" patterns).
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthError::UserNotFound | AuthError::RoleNotFound { .. })
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NoDriverRegistered { message }
            | AuthError::DriverNotRegistered { message }
            | AuthError::DriverRegistered { message }
            | AuthError::UserCreateError { message }
            | AuthError::Authentication { message }
            | AuthError::SignUp { message }
            | AuthError::UserModifyForbidden { message }
            | AuthError::UserDeleteForbidden { message }
            | AuthError::RoleDeleteForbidden { message }
            | AuthError::Storage { message } => write!(f, "{}", message),
            AuthError::UserNotFound => write!(f, "user is not found"),
            AuthError::RoleNotFound { name } => write!(f, "role '{}' is not found", name),
            AuthError::UserExists { login } => write!(f, "user '{}' already exists", login),
            AuthError::RoleAlreadyExists { name } => write!(f, "role '{}' already exists", name),
            AuthError::UserNotActive => write!(f, "user is not active"),
            AuthError::UserNotConfirmed => write!(f, "user sign-up is not confirmed"),
            AuthError::InvalidAccessToken => write!(f, "invalid access token"),
            AuthError::SignupDisabled => write!(f, "sign-up is disabled"),
            AuthError::Listener { event, message } => {
                write!(f, "listener for '{}' failed: {}", event, message)
            }
        }
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = Result<T, AuthError>;
