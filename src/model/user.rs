//! User entity: identity, profile, role membership and relationship sets.

use crate::error::{AuthError, AuthResult};
use crate::model::AuthEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const ANONYMOUS_USER_LOGIN: &str = "anonymous@anonymous.anonymous";
pub const SYSTEM_USER_LOGIN: &str = "system@system.system";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Waiting,
    Disabled,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Waiting => "waiting",
            UserStatus::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    uid: String,
    login: String,
    /// PHC hash string; empty when no password is set.
    #[serde(default)]
    password: String,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    timezone: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    last_ip: Option<String>,
    #[serde(default)]
    profile_is_public: bool,
    #[serde(default)]
    is_confirmed: bool,
    #[serde(default)]
    confirmation_hash: Option<String>,
    status: UserStatus,
    #[serde(default)]
    roles: BTreeSet<String>,
    #[serde(default)]
    sign_in_count: u64,
    #[serde(default)]
    last_sign_in: Option<DateTime<Utc>>,
    #[serde(default)]
    last_activity: Option<DateTime<Utc>>,
    created: DateTime<Utc>,
    #[serde(default)]
    follows: BTreeSet<String>,
    #[serde(default)]
    followers: BTreeSet<String>,
    #[serde(default)]
    blocked_users: BTreeSet<String>,
    #[serde(skip, default)]
    is_new: bool,
    #[serde(skip, default)]
    modified: bool,
}

impl User {
    pub fn new(uid: impl Into<String>, login: impl Into<String>, password_hash: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            login: login.into(),
            password: password_hash.unwrap_or_default(),
            nickname: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            description: String::new(),
            timezone: String::new(),
            gender: String::new(),
            phone: String::new(),
            urls: Vec::new(),
            birth_date: None,
            country: None,
            city: None,
            last_ip: None,
            profile_is_public: false,
            is_confirmed: false,
            confirmation_hash: None,
            status: UserStatus::Waiting,
            roles: BTreeSet::new(),
            sign_in_count: 0,
            last_sign_in: None,
            last_activity: None,
            created: Utc::now(),
            follows: BTreeSet::new(),
            followers: BTreeSet::new(),
            blocked_users: BTreeSet::new(),
            is_new: true,
            modified: false,
        }
    }

    pub fn login(&self) -> &str { &self.login }
    pub fn nickname(&self) -> &str { &self.nickname }
    pub fn email(&self) -> &str { &self.email }
    pub fn first_name(&self) -> &str { &self.first_name }
    pub fn last_name(&self) -> &str { &self.last_name }
    pub fn description(&self) -> &str { &self.description }
    pub fn timezone(&self) -> &str { &self.timezone }
    pub fn gender(&self) -> &str { &self.gender }
    pub fn phone(&self) -> &str { &self.phone }
    pub fn urls(&self) -> &[String] { &self.urls }
    pub fn birth_date(&self) -> Option<DateTime<Utc>> { self.birth_date }
    pub fn country(&self) -> Option<&str> { self.country.as_deref() }
    pub fn city(&self) -> Option<&str> { self.city.as_deref() }
    pub fn last_ip(&self) -> Option<&str> { self.last_ip.as_deref() }
    pub fn profile_is_public(&self) -> bool { self.profile_is_public }
    pub fn is_confirmed(&self) -> bool { self.is_confirmed }
    pub fn confirmation_hash(&self) -> Option<&str> { self.confirmation_hash.as_deref() }
    pub fn status(&self) -> UserStatus { self.status }
    pub fn password_hash(&self) -> &str { &self.password }
    pub fn sign_in_count(&self) -> u64 { self.sign_in_count }
    pub fn last_sign_in(&self) -> Option<DateTime<Utc>> { self.last_sign_in }
    pub fn last_activity(&self) -> Option<DateTime<Utc>> { self.last_activity }
    pub fn created(&self) -> DateTime<Utc> { self.created }
    pub fn follows(&self) -> &BTreeSet<String> { &self.follows }
    pub fn followers(&self) -> &BTreeSet<String> { &self.followers }
    pub fn blocked_users(&self) -> &BTreeSet<String> { &self.blocked_users }
    pub fn is_new(&self) -> bool { self.is_new }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_anonymous(&self) -> bool { self.login == ANONYMOUS_USER_LOGIN }
    pub fn is_system(&self) -> bool { self.login == SYSTEM_USER_LOGIN }
    pub fn is_sentinel(&self) -> bool { self.is_anonymous() || self.is_system() }
    pub fn is_admin(&self) -> bool { self.has_role(&["admin"]) }
    pub fn is_dev(&self) -> bool { self.has_role(&["dev"]) }

    /// Active within the last three minutes.
    pub fn is_online(&self) -> bool {
        self.last_activity
            .map(|t| (Utc::now() - t).num_seconds() < 180)
            .unwrap_or(false)
    }

    /// Effective role names. The anonymous sentinel always carries at least
    /// the `anonymous` role, regardless of persisted data.
    pub fn role_names(&self) -> BTreeSet<String> {
        let mut names = self.roles.clone();
        if self.is_anonymous() {
            names.insert("anonymous".to_string());
        }
        names
    }

    /// True if the user holds any of the given roles. The system sentinel
    /// satisfies every check.
    pub fn has_role(&self, names: &[&str]) -> bool {
        if self.is_system() {
            return true;
        }
        let own = self.role_names();
        names.iter().any(|n| own.contains(*n))
    }

    pub fn set_nickname(&mut self, v: impl Into<String>) { self.nickname = v.into(); self.modified = true; }
    pub fn set_email(&mut self, v: impl Into<String>) { self.email = v.into(); self.modified = true; }
    pub fn set_first_name(&mut self, v: impl Into<String>) { self.first_name = v.into(); self.modified = true; }
    pub fn set_last_name(&mut self, v: impl Into<String>) { self.last_name = v.into(); self.modified = true; }
    pub fn set_description(&mut self, v: impl Into<String>) { self.description = v.into(); self.modified = true; }
    pub fn set_timezone(&mut self, v: impl Into<String>) { self.timezone = v.into(); self.modified = true; }
    pub fn set_gender(&mut self, v: impl Into<String>) { self.gender = v.into(); self.modified = true; }
    pub fn set_phone(&mut self, v: impl Into<String>) { self.phone = v.into(); self.modified = true; }
    pub fn set_urls(&mut self, v: Vec<String>) { self.urls = v; self.modified = true; }
    pub fn set_birth_date(&mut self, v: Option<DateTime<Utc>>) { self.birth_date = v; self.modified = true; }
    pub fn set_country(&mut self, v: Option<String>) { self.country = v; self.modified = true; }
    pub fn set_city(&mut self, v: Option<String>) { self.city = v; self.modified = true; }
    pub fn set_last_ip(&mut self, v: Option<String>) { self.last_ip = v; self.modified = true; }
    pub fn set_profile_is_public(&mut self, v: bool) { self.profile_is_public = v; self.modified = true; }

    /// Stamp `last_activity` with the current time.
    pub fn touch_activity(&mut self) {
        self.last_activity = Some(Utc::now());
        self.modified = true;
    }

    pub fn add_role(&mut self, name: impl Into<String>) {
        if self.roles.insert(name.into()) {
            self.modified = true;
        }
    }

    pub fn remove_role(&mut self, name: &str) {
        if self.roles.remove(name) {
            self.modified = true;
        }
    }

    pub fn is_follows(&self, uid: &str) -> bool { self.follows.contains(uid) }
    pub fn is_followed_by(&self, uid: &str) -> bool { self.followers.contains(uid) }
    pub fn is_blocked(&self, uid: &str) -> bool { self.blocked_users.contains(uid) }

    /// Relationship guard: a user cannot follow or block itself, the
    /// anonymous identity, or the system identity.
    pub fn check_relation(&self, other: &User) -> AuthResult<()> {
        if other.is_anonymous() {
            return Err(AuthError::user_modify_forbidden(
                "the anonymous user cannot participate in relationships",
            ));
        }
        if other.is_system() {
            return Err(AuthError::user_modify_forbidden(
                "the system user cannot participate in relationships",
            ));
        }
        if other.uid == self.uid {
            return Err(AuthError::user_modify_forbidden(
                "a user cannot reference itself in a relationship",
            ));
        }
        Ok(())
    }

    pub(crate) fn set_login(&mut self, v: impl Into<String>) { self.login = v.into(); self.modified = true; }
    pub(crate) fn set_password_hash(&mut self, v: impl Into<String>) { self.password = v.into(); self.modified = true; }
    pub(crate) fn set_status_raw(&mut self, v: UserStatus) { self.status = v; self.modified = true; }
    pub(crate) fn set_roles(&mut self, v: BTreeSet<String>) { self.roles = v; self.modified = true; }
    pub(crate) fn set_confirmed(&mut self, v: bool) { self.is_confirmed = v; self.modified = true; }
    pub(crate) fn set_confirmation_hash(&mut self, v: Option<String>) { self.confirmation_hash = v; self.modified = true; }
    pub(crate) fn bump_sign_in(&mut self, at: DateTime<Utc>) {
        self.sign_in_count += 1;
        self.last_sign_in = Some(at);
        self.modified = true;
    }
    pub(crate) fn follows_mut(&mut self) -> &mut BTreeSet<String> { self.modified = true; &mut self.follows }
    pub(crate) fn followers_mut(&mut self) -> &mut BTreeSet<String> { self.modified = true; &mut self.followers }
    pub(crate) fn blocked_mut(&mut self) -> &mut BTreeSet<String> { self.modified = true; &mut self.blocked_users }
    pub(crate) fn mark_saved(&mut self) {
        self.is_new = false;
        self.modified = false;
    }
}

/// Identity comparison: two snapshots of the same stored user are equal.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for User {}

fn string_set(values: &BTreeSet<String>) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

impl AuthEntity for User {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn entity_type(&self) -> &'static str {
        "user"
    }

    fn is_modified(&self) -> bool {
        self.modified
    }

    fn has_field(&self, name: &str) -> bool {
        matches!(
            name,
            "uid" | "login"
                | "nickname"
                | "email"
                | "first_name"
                | "last_name"
                | "description"
                | "timezone"
                | "gender"
                | "phone"
                | "urls"
                | "birth_date"
                | "country"
                | "city"
                | "last_ip"
                | "profile_is_public"
                | "is_confirmed"
                | "confirmation_hash"
                | "status"
                | "roles"
                | "sign_in_count"
                | "last_sign_in"
                | "last_activity"
                | "created"
                | "follows"
                | "followers"
                | "blocked_users"
        )
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        let v = match name {
            "uid" => Value::String(self.uid.clone()),
            "login" => Value::String(self.login.clone()),
            "nickname" => Value::String(self.nickname.clone()),
            "email" => Value::String(self.email.clone()),
            "first_name" => Value::String(self.first_name.clone()),
            "last_name" => Value::String(self.last_name.clone()),
            "description" => Value::String(self.description.clone()),
            "timezone" => Value::String(self.timezone.clone()),
            "gender" => Value::String(self.gender.clone()),
            "phone" => Value::String(self.phone.clone()),
            "urls" => Value::Array(self.urls.iter().cloned().map(Value::String).collect()),
            "birth_date" => serde_json::to_value(self.birth_date).ok()?,
            "country" => serde_json::to_value(&self.country).ok()?,
            "city" => serde_json::to_value(&self.city).ok()?,
            "last_ip" => serde_json::to_value(&self.last_ip).ok()?,
            "profile_is_public" => Value::Bool(self.profile_is_public),
            "is_confirmed" => Value::Bool(self.is_confirmed),
            "confirmation_hash" => serde_json::to_value(&self.confirmation_hash).ok()?,
            "status" => Value::String(self.status.as_str().to_string()),
            "roles" => string_set(&self.role_names()),
            "sign_in_count" => Value::from(self.sign_in_count),
            "last_sign_in" => serde_json::to_value(self.last_sign_in).ok()?,
            "last_activity" => serde_json::to_value(self.last_activity).ok()?,
            "created" => serde_json::to_value(self.created).ok()?,
            "follows" => string_set(&self.follows),
            "followers" => string_set(&self.followers),
            "blocked_users" => string_set(&self.blocked_users),
            _ => return None,
        };
        Some(v)
    }

    fn set_field(&mut self, name: &str, value: Value) -> AuthResult<()> {
        fn expect_str(name: &str, value: Value) -> AuthResult<String> {
            match value {
                Value::String(s) => Ok(s),
                other => Err(AuthError::storage(format!(
                    "user field '{}' expects a string, got {}",
                    name, other
                ))),
            }
        }

        match name {
            "nickname" => self.set_nickname(expect_str(name, value)?),
            "email" => self.set_email(expect_str(name, value)?),
            "first_name" => self.set_first_name(expect_str(name, value)?),
            "last_name" => self.set_last_name(expect_str(name, value)?),
            "description" => self.set_description(expect_str(name, value)?),
            "timezone" => self.set_timezone(expect_str(name, value)?),
            "gender" => self.set_gender(expect_str(name, value)?),
            "phone" => self.set_phone(expect_str(name, value)?),
            "country" => self.set_country(Some(expect_str(name, value)?)),
            "city" => self.set_city(Some(expect_str(name, value)?)),
            "last_ip" => self.set_last_ip(Some(expect_str(name, value)?)),
            "profile_is_public" => match value {
                Value::Bool(b) => self.set_profile_is_public(b),
                other => {
                    return Err(AuthError::storage(format!(
                        "user field 'profile_is_public' expects a bool, got {}",
                        other
                    )))
                }
            },
            "status" => {
                let status: UserStatus = serde_json::from_value(value)
                    .map_err(|e| AuthError::storage(format!("invalid user status: {}", e)))?;
                self.set_status_raw(status);
            }
            "roles" => {
                let roles: BTreeSet<String> = serde_json::from_value(value)
                    .map_err(|e| AuthError::storage(format!("invalid role list: {}", e)))?;
                self.set_roles(roles);
            }
            "urls" => {
                let urls: Vec<String> = serde_json::from_value(value)
                    .map_err(|e| AuthError::storage(format!("invalid url list: {}", e)))?;
                self.set_urls(urls);
            }
            "uid" | "login" | "created" => {
                return Err(AuthError::storage(format!(
                    "user field '{}' is read-only",
                    name
                )))
            }
            other => {
                return Err(AuthError::storage(format!(
                    "user has no writable field '{}'",
                    other
                )))
            }
        }
        Ok(())
    }

    fn add_to_field(&mut self, name: &str, value: Value) -> AuthResult<()> {
        match (name, value) {
            ("roles", Value::String(s)) => {
                self.add_role(s);
                Ok(())
            }
            ("urls", Value::String(s)) => {
                self.urls.push(s);
                self.modified = true;
                Ok(())
            }
            (other, _) => Err(AuthError::storage(format!(
                "user has no generic set-valued field '{}'; relationship sets \
                 are mutated through the authority",
                other
            ))),
        }
    }

    fn remove_from_field(&mut self, name: &str, value: &Value) -> AuthResult<()> {
        match (name, value) {
            ("roles", Value::String(s)) => {
                self.remove_role(s);
                Ok(())
            }
            ("urls", Value::String(s)) => {
                self.urls.retain(|u| u != s);
                self.modified = true;
                Ok(())
            }
            (other, _) => Err(AuthError::storage(format!(
                "user has no generic set-valued field '{}'; relationship sets \
                 are mutated through the authority",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain_user(uid: &str, login: &str) -> User {
        User::new(uid, login, None)
    }

    #[test]
    fn sentinel_detection() {
        assert!(plain_user("user:1", ANONYMOUS_USER_LOGIN).is_anonymous());
        assert!(plain_user("user:2", SYSTEM_USER_LOGIN).is_system());
        assert!(!plain_user("user:3", "bob@example.org").is_sentinel());
    }

    #[test]
    fn anonymous_always_has_anonymous_role() {
        let anon = plain_user("user:1", ANONYMOUS_USER_LOGIN);
        assert!(anon.role_names().contains("anonymous"));
        assert!(anon.has_role(&["anonymous"]));
        assert!(!anon.has_role(&["admin"]));
    }

    #[test]
    fn system_satisfies_every_role_check() {
        let sys = plain_user("user:1", SYSTEM_USER_LOGIN);
        assert!(sys.has_role(&["admin"]));
        assert!(sys.has_role(&["no-such-role"]));
    }

    #[test]
    fn has_role_is_a_disjunction() {
        let mut u = plain_user("user:1", "bob@example.org");
        u.add_role("dev");
        assert!(u.has_role(&["admin", "dev"]));
        assert!(!u.has_role(&["admin", "editor"]));
    }

    #[test]
    fn relationship_guard() {
        let a = plain_user("user:1", "a@example.org");
        let b = plain_user("user:2", "b@example.org");
        let anon = plain_user("user:3", ANONYMOUS_USER_LOGIN);
        let sys = plain_user("user:4", SYSTEM_USER_LOGIN);
        assert!(a.check_relation(&b).is_ok());
        assert!(a.check_relation(&a).is_err());
        assert!(a.check_relation(&anon).is_err());
        assert!(a.check_relation(&sys).is_err());
    }

    #[test]
    fn field_access_roundtrip() {
        let mut u = plain_user("user:1", "bob@example.org");
        u.set_field("email", json!("bob@mail.test")).unwrap();
        assert_eq!(u.get_field("email"), Some(json!("bob@mail.test")));
        u.set_field("status", json!("active")).unwrap();
        assert_eq!(u.status(), UserStatus::Active);
        assert!(u.set_field("login", json!("x@y.z")).is_err());
        assert!(u.set_field("created", json!("now")).is_err());
        u.add_to_field("roles", json!("editor")).unwrap();
        assert!(u.has_role(&["editor"]));
        u.remove_from_field("roles", &json!("editor")).unwrap();
        assert!(!u.has_role(&["editor"]));
        assert!(u.add_to_field("follows", json!("user:2")).is_err());
    }

    #[test]
    fn equality_is_identity() {
        let mut a = plain_user("user:1", "bob@example.org");
        let b = plain_user("user:1", "bob@example.org");
        a.set_email("x@y.z");
        assert_eq!(a, b);
        assert_ne!(a, plain_user("user:2", "bob@example.org"));
    }
}
