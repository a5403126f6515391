//! Driver contracts: pluggable authentication backends and the single
//! storage backend, plus the composable query predicate they evaluate.

use crate::api::Authority;
use crate::error::AuthResult;
use crate::model::{AuthEntity, Role, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Authentication backend, registered by name. Several may coexist; the
/// authority selects one explicitly per call or via the configured default.
/// Methods receive the owning authority so drivers can reach storage and
/// password primitives without ambient globals.
pub trait Authentication: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Register a new user from driver-specific data.
    fn sign_up(&self, authority: &Authority, data: &Value) -> AuthResult<User>;

    /// Authenticate an existing user from driver-specific credentials.
    fn sign_in(&self, authority: &Authority, data: &Value) -> AuthResult<User>;

    /// Best-effort side-channel cleanup when a user signs out.
    fn sign_out(&self, authority: &Authority, user: &User) -> AuthResult<()>;
}

#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Login(&'a str),
    Nickname(&'a str),
    Uid(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub enum RoleLookup<'a> {
    Name(&'a str),
    Uid(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Composable predicate over entity fields, evaluated by drivers through
/// the generic field-access trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Query {
    All,
    /// Field equals value.
    Eq(String, Value),
    /// Set- or array-valued field contains value.
    Contains(String, Value),
    /// Field value is not one of the given values.
    Nin(String, Vec<Value>),
    And(Vec<Query>),
    Or(Vec<Query>),
}

impl Query {
    pub fn matches(&self, entity: &dyn AuthEntity) -> bool {
        match self {
            Query::All => true,
            Query::Eq(field, value) => entity.get_field(field).as_ref() == Some(value),
            Query::Contains(field, value) => match entity.get_field(field) {
                Some(Value::Array(items)) => items.iter().any(|v| v == value),
                _ => false,
            },
            Query::Nin(field, values) => match entity.get_field(field) {
                Some(v) => !values.contains(&v),
                None => true,
            },
            Query::And(parts) => parts.iter().all(|q| q.matches(entity)),
            Query::Or(parts) => parts.iter().any(|q| q.matches(entity)),
        }
    }
}

/// Total order over JSON field values, for driver-side sorting.
/// Nulls first, then bools, numbers, strings, everything else last.
pub fn compare_field_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Storage backend. Exactly one per process lifetime; entity persistence
/// and querying are delegated through it, while the authority enforces
/// uniqueness and lifecycle invariants on top.
///
/// `create_*` return fresh, unsaved entities; persistence happens through
/// the explicit `save_*` calls. Lookups return `Ok(None)` on a miss — the
/// authority maps misses to the not-found error kinds.
pub trait Storage: Send + Sync {
    fn name(&self) -> &str;

    fn create_user(&self, login: &str, password_hash: Option<&str>) -> AuthResult<User>;
    fn get_user(&self, lookup: UserLookup<'_>) -> AuthResult<Option<User>>;
    fn save_user(&self, user: &User) -> AuthResult<()>;
    fn delete_user(&self, user: &User) -> AuthResult<()>;
    fn find_users(
        &self,
        query: &Query,
        sort: &[(String, SortOrder)],
        limit: usize,
        skip: usize,
    ) -> AuthResult<Vec<User>>;
    fn count_users(&self, query: &Query) -> AuthResult<usize>;

    fn create_role(&self, name: &str, description: &str) -> AuthResult<Role>;
    fn get_role(&self, lookup: RoleLookup<'_>) -> AuthResult<Option<Role>>;
    fn save_role(&self, role: &Role) -> AuthResult<()>;
    fn delete_role(&self, role: &Role) -> AuthResult<()>;
    fn find_roles(
        &self,
        query: &Query,
        sort: &[(String, SortOrder)],
        limit: usize,
        skip: usize,
    ) -> AuthResult<Vec<Role>>;
    fn count_roles(&self, query: &Query) -> AuthResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use serde_json::json;

    fn user_with_roles(uid: &str, roles: &[&str]) -> User {
        let mut u = User::new(uid, format!("{}@example.org", uid), None);
        for r in roles {
            u.add_role(*r);
        }
        u
    }

    #[test]
    fn eq_and_contains() {
        let u = user_with_roles("user:1", &["admin"]);
        assert!(Query::Eq("login".into(), json!("user:1@example.org")).matches(&u));
        assert!(Query::Contains("roles".into(), json!("admin")).matches(&u));
        assert!(!Query::Contains("roles".into(), json!("dev")).matches(&u));
        assert!(!Query::Eq("login".into(), json!("other")).matches(&u));
    }

    #[test]
    fn boolean_composition() {
        let u = user_with_roles("user:1", &["admin"]);
        let q = Query::And(vec![
            Query::Contains("roles".into(), json!("admin")),
            Query::Eq("status".into(), json!("waiting")),
        ]);
        assert!(q.matches(&u));
        let q = Query::Or(vec![
            Query::Eq("status".into(), json!("active")),
            Query::Contains("roles".into(), json!("admin")),
        ]);
        assert!(q.matches(&u));
        let q = Query::Nin("login".into(), vec![json!("user:1@example.org")]);
        assert!(!q.matches(&u));
    }

    #[test]
    fn value_ordering() {
        use std::cmp::Ordering::*;
        assert_eq!(compare_field_values(&json!(1), &json!(2)), Less);
        assert_eq!(compare_field_values(&json!("a"), &json!("b")), Less);
        assert_eq!(compare_field_values(&json!(null), &json!("x")), Less);
        assert_eq!(compare_field_values(&json!(true), &json!(false)), Greater);
    }
}
