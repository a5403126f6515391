//! Login/password authentication driver. Credentials arrive as a JSON
//! object with `login` and `password` fields; verification happens against
//! the stored PHC hash. Misses and mismatches produce the same error so
//! callers cannot probe which logins exist.

use crate::api::Authority;
use crate::driver::Authentication;
use crate::error::{AuthError, AuthResult};
use crate::model::User;
use crate::security;
use serde_json::Value;

const BAD_CREDENTIALS: &str = "invalid login or password";

#[derive(Default)]
pub struct PasswordDriver;

impl PasswordDriver {
    pub fn new() -> Self {
        Self
    }
}

fn credentials(data: &Value) -> AuthResult<(&str, &str)> {
    let login = data.get("login").and_then(Value::as_str);
    let password = data.get("password").and_then(Value::as_str);
    match (login, password) {
        (Some(l), Some(p)) if !l.is_empty() => Ok((l, p)),
        _ => Err(AuthError::authentication(
            "credentials must carry 'login' and 'password' strings",
        )),
    }
}

impl Authentication for PasswordDriver {
    fn name(&self) -> &str {
        "password"
    }

    fn description(&self) -> &str {
        "login and password verified against the stored hash"
    }

    fn sign_up(&self, authority: &Authority, data: &Value) -> AuthResult<User> {
        let (login, password) = credentials(data).map_err(|e| AuthError::sign_up(e.to_string()))?;
        authority.create_user(login, Some(password)).map_err(|e| match e {
            AuthError::UserExists { .. } | AuthError::UserCreateError { .. } => {
                AuthError::sign_up(e.to_string())
            }
            other => other,
        })
    }

    fn sign_in(&self, authority: &Authority, data: &Value) -> AuthResult<User> {
        let (login, password) = credentials(data)?;
        let user = match authority.get_user(login) {
            Ok(user) => user,
            Err(e) if e.is_not_found() => return Err(AuthError::authentication(BAD_CREDENTIALS)),
            Err(e) => return Err(e),
        };
        if user.password_hash().is_empty()
            || !security::verify_password(user.password_hash(), password)
        {
            return Err(AuthError::authentication(BAD_CREDENTIALS));
        }
        Ok(user)
    }

    fn sign_out(&self, _authority: &Authority, _user: &User) -> AuthResult<()> {
        // Stateless driver, nothing to tear down.
        Ok(())
    }
}
