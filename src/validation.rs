//! Format rules for user-supplied identifiers.

use crate::error::{AuthError, AuthResult};
use once_cell::sync::Lazy;
use regex::Regex;

static LOGIN_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-_@]{1,64}$").unwrap());

static NICKNAME_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-_]{0,31}$").unwrap());

pub fn validate_login(login: &str) -> AuthResult<()> {
    if LOGIN_RULE.is_match(login) {
        Ok(())
    } else {
        Err(AuthError::user_create(format!(
            "login '{}' must start with a letter or digit and contain 2 to 65 characters from [A-Za-z0-9.-_@]",
            login
        )))
    }
}

pub fn validate_nickname(nickname: &str) -> AuthResult<()> {
    if NICKNAME_RULE.is_match(nickname) {
        Ok(())
    } else {
        Err(AuthError::user_create(format!(
            "nickname '{}' must start with a letter or digit and contain 1 to 32 characters from [A-Za-z0-9.-_]",
            nickname
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rule() {
        assert!(validate_login("bob@example.org").is_ok());
        assert!(validate_login("a1").is_ok());
        assert!(validate_login("user.name-x_y@host").is_ok());
        assert!(validate_login("").is_err());
        assert!(validate_login("a").is_err()); // too short
        assert!(validate_login(".starts-with-dot").is_err());
        assert!(validate_login("spaces are bad").is_err());
        assert!(validate_login(&"x".repeat(70)).is_err());
    }

    #[test]
    fn nickname_rule() {
        assert!(validate_nickname("bob").is_ok());
        assert!(validate_nickname("b").is_ok());
        assert!(validate_nickname("bob@host").is_err()); // no '@' in nicknames
        assert!(validate_nickname(&"x".repeat(33)).is_err());
    }
}
