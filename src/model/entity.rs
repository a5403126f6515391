//! Generic field access over auth entities.
//!
//! Storage drivers sort and filter over arbitrary field names; the query
//! matcher evaluates predicates without knowing the concrete entity type.
//! Both go through this trait instead of a class hierarchy.

use crate::error::AuthResult;
use serde_json::Value;

pub trait AuthEntity {
    fn uid(&self) -> &str;

    /// `"user"` or `"role"`.
    fn entity_type(&self) -> &'static str;

    /// True when the entity carries changes not yet persisted.
    fn is_modified(&self) -> bool;

    fn has_field(&self, name: &str) -> bool;

    /// Field value as JSON, `None` for unknown fields.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Set a field from a JSON value. Fails on unknown fields, read-only
    /// fields and type mismatches.
    fn set_field(&mut self, name: &str, value: Value) -> AuthResult<()>;

    /// Append a value to a set-valued field.
    fn add_to_field(&mut self, name: &str, value: Value) -> AuthResult<()>;

    /// Remove a value from a set-valued field. Missing values are ignored.
    fn remove_from_field(&mut self, name: &str, value: &Value) -> AuthResult<()>;
}
